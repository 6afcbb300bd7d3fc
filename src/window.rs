//! Shell-window veto geometry
//!
//! An object at heliocentric distance `d` AU drifts by roughly `3600 / d`
//! arcsec per day from Earth's orbital parallax. A target shell
//! `target_dist ± shell_width` therefore maps to a band of total sky-plane
//! displacement over the revisit baseline; tracklets outside the band are
//! vetoed.

use crate::error::{Result, VetoError};
use serde::{Deserialize, Serialize};

/// Parallax-induced drift (arcsec per day per AU of inverse distance)
pub const PARALLAX_ARCSEC_PER_DAY_AU: f64 = 3600.0;

/// Default target shell center (AU)
pub const DEFAULT_TARGET_DIST_AU: f64 = 600.0;

/// Default shell half-width (AU)
pub const DEFAULT_SHELL_WIDTH_AU: f64 = 20.0;

/// Default revisit baseline (days)
pub const DEFAULT_BASELINE_DAYS: f64 = 2.0;

/// Default tolerance added on both sides of the window (arcsec)
pub const DEFAULT_MARGIN_ARCSEC: f64 = 0.1;

/// Total parallax displacement (arcsec) over `baseline_days` at `distance_au`
pub fn parallax_displacement(distance_au: f64, baseline_days: f64) -> f64 {
    PARALLAX_ARCSEC_PER_DAY_AU / distance_au * baseline_days
}

/// Geometry of the target shell and revisit cadence
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShellGeometry {
    /// Shell center distance (AU)
    pub target_dist: f64,
    /// Shell half-width (AU)
    pub shell_width: f64,
    /// Revisit baseline (days)
    pub baseline_days: f64,
    /// Margin added to each window edge (arcsec)
    pub margin: f64,
}

impl Default for ShellGeometry {
    fn default() -> Self {
        Self {
            target_dist: DEFAULT_TARGET_DIST_AU,
            shell_width: DEFAULT_SHELL_WIDTH_AU,
            baseline_days: DEFAULT_BASELINE_DAYS,
            margin: DEFAULT_MARGIN_ARCSEC,
        }
    }
}

impl ShellGeometry {
    /// Validate geometry
    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("target_dist", self.target_dist),
            ("shell_width", self.shell_width),
            ("baseline_days", self.baseline_days),
            ("margin", self.margin),
        ];
        if let Some((name, value)) = fields.iter().find(|(_, v)| !v.is_finite()) {
            return Err(VetoError::invalid(format!(
                "{name} must be finite, got {value}"
            )));
        }

        if self.target_dist <= 0.0 {
            return Err(VetoError::invalid(format!(
                "target_dist must be > 0 AU, got {}",
                self.target_dist
            )));
        }

        if self.shell_width < 0.0 || self.shell_width >= self.target_dist {
            return Err(VetoError::invalid(format!(
                "shell_width must be in [0, target_dist), got {} (target_dist = {})",
                self.shell_width, self.target_dist
            )));
        }

        if self.baseline_days <= 0.0 {
            return Err(VetoError::invalid(format!(
                "baseline_days must be > 0, got {}",
                self.baseline_days
            )));
        }

        if self.margin < 0.0 {
            return Err(VetoError::invalid(format!(
                "margin must be >= 0 arcsec, got {}",
                self.margin
            )));
        }

        Ok(())
    }

    /// Near edge of the shell (AU)
    pub fn inner_dist(&self) -> f64 {
        self.target_dist - self.shell_width
    }

    /// Far edge of the shell (AU)
    pub fn outer_dist(&self) -> f64 {
        self.target_dist + self.shell_width
    }

    /// Acceptance window implied by this geometry
    pub fn window(&self) -> Result<VetoWindow> {
        self.validate()?;
        Ok(VetoWindow {
            limit_min: parallax_displacement(self.outer_dist(), self.baseline_days) - self.margin,
            limit_max: parallax_displacement(self.inner_dist(), self.baseline_days) + self.margin,
        })
    }
}

/// Closed acceptance interval on total displacement (arcsec over the baseline)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VetoWindow {
    pub limit_min: f64,
    pub limit_max: f64,
}

impl VetoWindow {
    /// Whether a tracklet with this displacement survives the veto
    pub fn accepts(&self, displacement: f64) -> bool {
        displacement >= self.limit_min && displacement <= self.limit_max
    }

    /// Number of accepted displacements
    pub fn count_accepted(&self, displacements: &[f64]) -> usize {
        displacements.iter().filter(|&&d| self.accepts(d)).count()
    }

    /// Window width (arcsec)
    pub fn width(&self) -> f64 {
        self.limit_max - self.limit_min
    }

    /// Length of the overlap between the window and `[low, high]`
    pub fn overlap(&self, low: f64, high: f64) -> f64 {
        (self.limit_max.min(high) - self.limit_min.max(low)).max(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parallax_displacement_at_one_au() {
        assert_eq!(parallax_displacement(1.0, 1.0), 3600.0);
        assert_eq!(parallax_displacement(600.0, 2.0), 12.0);
    }

    #[test]
    fn test_default_window_edges() {
        let window = ShellGeometry::default().window().unwrap();
        assert!((window.limit_min - 11.512_903_225_806_452).abs() < 1e-12);
        assert!((window.limit_max - 12.513_793_103_448_275).abs() < 1e-12);
    }

    #[test]
    fn test_window_is_closed() {
        let window = VetoWindow {
            limit_min: 1.0,
            limit_max: 2.0,
        };
        assert!(window.accepts(1.0));
        assert!(window.accepts(2.0));
        assert!(!window.accepts(0.999_999));
        assert!(!window.accepts(2.000_001));
    }

    #[test]
    fn test_count_accepted() {
        let window = VetoWindow {
            limit_min: 0.0,
            limit_max: 1.0,
        };
        assert_eq!(window.count_accepted(&[-1.0, 0.0, 0.5, 1.0, 1.5]), 3);
    }

    #[test]
    fn test_overlap() {
        let window = VetoWindow {
            limit_min: 10.0,
            limit_max: 12.0,
        };
        assert_eq!(window.overlap(-100.0, 100.0), 2.0);
        assert_eq!(window.overlap(11.0, 100.0), 1.0);
        assert_eq!(window.overlap(20.0, 30.0), 0.0);
    }

    #[test]
    fn test_shell_width_must_be_below_target() {
        let geometry = ShellGeometry {
            shell_width: 600.0,
            ..ShellGeometry::default()
        };
        assert!(matches!(
            geometry.window(),
            Err(VetoError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_rejects_non_positive_baseline() {
        let geometry = ShellGeometry {
            baseline_days: 0.0,
            ..ShellGeometry::default()
        };
        assert!(geometry.validate().is_err());
    }

    #[test]
    fn test_rejects_negative_margin_and_nan() {
        let negative = ShellGeometry {
            margin: -0.1,
            ..ShellGeometry::default()
        };
        assert!(negative.validate().is_err());

        let nan = ShellGeometry {
            target_dist: f64::NAN,
            ..ShellGeometry::default()
        };
        assert!(nan.validate().is_err());
    }
}

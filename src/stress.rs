//! Dirty-data stress test for the shell-window veto
//!
//! Spurious tracklets do not obey orbital mechanics: their total sky-plane
//! displacement over the baseline is drawn from a wide uniform distribution.
//! The fraction that lands inside the veto window is the background leakage
//! `f_bg`; everything else is rejected.

use crate::error::{Result, VetoError};
use crate::rng;
use crate::window::{
    ShellGeometry, VetoWindow, DEFAULT_BASELINE_DAYS, DEFAULT_MARGIN_ARCSEC,
    DEFAULT_SHELL_WIDTH_AU, DEFAULT_TARGET_DIST_AU,
};
use serde::{Deserialize, Serialize};

/// Default number of spurious tracklets
pub const DEFAULT_N_ARTIFACTS: usize = 5000;

/// Default seed; with the other defaults it yields `f_bg = 0.0064`
pub const DEFAULT_STRESS_SEED: u64 = 99;

/// Default lower bound of the uniform displacement range (arcsec)
pub const DEFAULT_DISP_MIN: f64 = -100.0;

/// Default upper bound of the uniform displacement range (arcsec)
pub const DEFAULT_DISP_MAX: f64 = 100.0;

/// Smallest displacement span accepted, relative to the range's magnitude
pub const MIN_RELATIVE_SPAN: f64 = 1e-9;

/// Parameters of one stress-test run
///
/// # Example
/// ```
/// use parallax_veto::stress::StressConfig;
///
/// let config = StressConfig::default();
/// assert_eq!(config.n_artifacts, 5000);
/// assert_eq!(config.seed, 99);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StressConfig {
    /// Target shell center distance (AU)
    pub target_dist: f64,
    /// Half-width of the target shell (AU)
    pub shell_width: f64,
    /// Revisit baseline (days)
    pub baseline_days: f64,
    /// Margin added to each window edge (arcsec)
    pub margin: f64,
    /// Number of spurious tracklets
    pub n_artifacts: usize,
    pub seed: u64,
    /// Minimum total displacement (arcsec over the baseline)
    pub disp_min: f64,
    /// Maximum total displacement (arcsec over the baseline)
    pub disp_max: f64,
}

impl Default for StressConfig {
    fn default() -> Self {
        Self {
            target_dist: DEFAULT_TARGET_DIST_AU,
            shell_width: DEFAULT_SHELL_WIDTH_AU,
            baseline_days: DEFAULT_BASELINE_DAYS,
            margin: DEFAULT_MARGIN_ARCSEC,
            n_artifacts: DEFAULT_N_ARTIFACTS,
            seed: DEFAULT_STRESS_SEED,
            disp_min: DEFAULT_DISP_MIN,
            disp_max: DEFAULT_DISP_MAX,
        }
    }
}

impl StressConfig {
    /// Shell geometry shared with the baseline simulator
    pub fn geometry(&self) -> ShellGeometry {
        ShellGeometry {
            target_dist: self.target_dist,
            shell_width: self.shell_width,
            baseline_days: self.baseline_days,
            margin: self.margin,
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.n_artifacts == 0 {
            return Err(VetoError::invalid("n_artifacts must be > 0, got 0"));
        }

        if !(self.disp_min.is_finite() && self.disp_max.is_finite()) {
            return Err(VetoError::invalid(format!(
                "displacement range must be finite, got [{}, {}]",
                self.disp_min, self.disp_max
            )));
        }

        if self.disp_min >= self.disp_max {
            return Err(VetoError::invalid(format!(
                "disp_min must be < disp_max, got [{}, {}]",
                self.disp_min, self.disp_max
            )));
        }

        let span = self.disp_max - self.disp_min;
        if !span.is_finite() {
            return Err(VetoError::invalid(format!(
                "displacement range width overflows, got [{}, {}]",
                self.disp_min, self.disp_max
            )));
        }

        let magnitude = self.disp_min.abs().max(self.disp_max.abs());
        if span < magnitude * MIN_RELATIVE_SPAN {
            return Err(VetoError::invalid(format!(
                "displacement range [{}, {}] is too narrow to resolve",
                self.disp_min, self.disp_max
            )));
        }

        self.geometry().validate()
    }
}

/// Printed and serialized outcome of a stress test
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StressSummary {
    pub n_artifacts: usize,
    pub disp_min: f64,
    pub disp_max: f64,
    pub baseline_days: f64,
    pub window: VetoWindow,
    /// Spurious tracklets accepted by the veto
    pub n_passed: usize,
    /// Fraction of spurious tracklets accepted
    pub f_bg: f64,
    /// `1 - f_bg`
    pub rejection_rate: f64,
    /// Analytic acceptance fraction of the uniform distribution
    pub expected_f_bg: f64,
}

/// Samples plus summary of a stress test
#[derive(Debug, Clone)]
pub struct StressReport {
    /// Total displacement per spurious tracklet (arcsec)
    pub displacements: Vec<f64>,
    pub summary: StressSummary,
}

/// Probability that a uniform draw on `[disp_min, disp_max]` lands in `window`
pub fn expected_pass_fraction(window: &VetoWindow, disp_min: f64, disp_max: f64) -> f64 {
    if disp_max <= disp_min {
        return 0.0;
    }
    window.overlap(disp_min, disp_max) / (disp_max - disp_min)
}

/// Run the stress test
pub fn run_stress_test(config: &StressConfig) -> Result<StressReport> {
    config.validate()?;
    let window = config.geometry().window()?;

    let mut rng = rng::seeded_rng(config.seed);
    let displacements =
        rng::uniform_vec(&mut rng, config.disp_min, config.disp_max, config.n_artifacts);

    let n_passed = window.count_accepted(&displacements);
    let f_bg = n_passed as f64 / config.n_artifacts as f64;
    let summary = StressSummary {
        n_artifacts: config.n_artifacts,
        disp_min: config.disp_min,
        disp_max: config.disp_max,
        baseline_days: config.baseline_days,
        window,
        n_passed,
        f_bg,
        rejection_rate: 1.0 - f_bg,
        expected_f_bg: expected_pass_fraction(&window, config.disp_min, config.disp_max),
    };

    tracing::info!(
        n = config.n_artifacts,
        seed = config.seed,
        passed = n_passed,
        f_bg,
        "stress test complete"
    );

    Ok(StressReport {
        displacements,
        summary,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_run_reproduces_published_leakage() {
        let report = run_stress_test(&StressConfig::default()).unwrap();
        assert_eq!(report.summary.n_passed, 32);
        assert_eq!(report.summary.f_bg, 0.0064);
        assert_eq!(format!("{:.4}", report.summary.rejection_rate), "0.9936");
        assert_eq!(report.displacements.len(), 5000);
    }

    #[test]
    fn test_rejection_is_complement() {
        let config = StressConfig {
            n_artifacts: 777,
            seed: 3,
            ..StressConfig::default()
        };
        let summary = run_stress_test(&config).unwrap().summary;
        assert_eq!(summary.rejection_rate, 1.0 - summary.f_bg);
        assert!((0.0..=1.0).contains(&summary.f_bg));
    }

    #[test]
    fn test_zero_artifacts_rejected() {
        let config = StressConfig {
            n_artifacts: 0,
            ..StressConfig::default()
        };
        assert!(matches!(
            run_stress_test(&config),
            Err(VetoError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_inverted_range_rejected() {
        let config = StressConfig {
            disp_min: 10.0,
            disp_max: -10.0,
            ..StressConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_overflowing_range_width_rejected() {
        let config = StressConfig {
            disp_min: -1e308,
            disp_max: 1e308,
            ..StressConfig::default()
        };
        let err = run_stress_test(&config).unwrap_err();
        assert!(err.to_string().contains("overflows"));

        let wide = StressConfig {
            disp_min: -1e200,
            disp_max: 1e200,
            n_artifacts: 100,
            ..StressConfig::default()
        };
        let summary = run_stress_test(&wide).unwrap().summary;
        assert!(summary.f_bg.is_finite());
    }

    #[test]
    fn test_unresolvable_narrow_range_rejected() {
        let config = StressConfig {
            disp_min: 11.6,
            disp_max: 11.600_000_000_000_1,
            ..StressConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(VetoError::InvalidParameter(_))
        ));

        let tiny_near_zero = StressConfig {
            disp_min: 0.0,
            disp_max: 1e-6,
            ..StressConfig::default()
        };
        assert!(tiny_near_zero.validate().is_ok());
    }

    #[test]
    fn test_range_inside_window_passes_everything() {
        let config = StressConfig {
            disp_min: 11.6,
            disp_max: 12.4,
            n_artifacts: 100,
            ..StressConfig::default()
        };
        let summary = run_stress_test(&config).unwrap().summary;
        assert_eq!(summary.n_passed, 100);
        assert_eq!(summary.f_bg, 1.0);
        assert_eq!(summary.rejection_rate, 0.0);
        assert_eq!(summary.expected_f_bg, 1.0);
    }

    #[test]
    fn test_expected_fraction_default() {
        let window = StressConfig::default().geometry().window().unwrap();
        let expected = expected_pass_fraction(&window, -100.0, 100.0);
        assert!((expected - window.width() / 200.0).abs() < 1e-15);
        assert!(expected > 0.004 && expected < 0.006);
    }

    #[test]
    fn test_toml_overrides_keep_defaults() {
        let config: StressConfig = toml::from_str("n_artifacts = 10\nseed = 1\n").unwrap();
        assert_eq!(config.n_artifacts, 10);
        assert_eq!(config.disp_max, DEFAULT_DISP_MAX);
    }
}

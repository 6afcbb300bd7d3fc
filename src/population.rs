//! Synthetic tracklet populations
//!
//! Each baseline population samples heliocentric distances uniformly over its
//! own range and converts them to total parallax displacement with Gaussian
//! astrometric noise. The stress test's spurious tracklets carry no distance.

use crate::error::{Result, VetoError};
use crate::rng;
use crate::window::parallax_displacement;
use rand::Rng;
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which population a tracklet was drawn from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PopulationKind {
    /// Main-belt asteroids (background)
    MainBelt,
    /// Ordinary trans-Neptunian objects (background)
    OrdinaryTno,
    /// Objects inside the target shell
    Signal,
    /// Tracklets that do not follow orbital motion at all
    Spurious,
}

impl PopulationKind {
    /// Whether this population is the one the veto should keep
    pub fn is_signal(self) -> bool {
        matches!(self, PopulationKind::Signal)
    }

    /// Legend label
    pub fn label(self) -> &'static str {
        match self {
            PopulationKind::MainBelt => "Noise (Main Belt)",
            PopulationKind::OrdinaryTno => "Noise (Ordinary TNOs)",
            PopulationKind::Signal => "Target (shell candidate)",
            PopulationKind::Spurious => "Spurious tracklets",
        }
    }
}

impl fmt::Display for PopulationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PopulationKind::MainBelt => "main_belt",
            PopulationKind::OrdinaryTno => "ordinary_tno",
            PopulationKind::Signal => "signal",
            PopulationKind::Spurious => "spurious",
        };
        f.write_str(name)
    }
}

/// Closed distance interval (AU) a population is drawn from
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DistanceRange {
    pub min: f64,
    pub max: f64,
}

impl DistanceRange {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Validate range; `name` identifies the population in the error
    pub fn validate(&self, name: &str) -> Result<()> {
        if !(self.min.is_finite() && self.max.is_finite()) {
            return Err(VetoError::invalid(format!(
                "{name} distance range must be finite, got [{}, {}]",
                self.min, self.max
            )));
        }
        if self.min <= 0.0 || self.min >= self.max {
            return Err(VetoError::invalid(format!(
                "{name} distance range must satisfy 0 < min < max, got [{}, {}]",
                self.min, self.max
            )));
        }
        Ok(())
    }
}

/// Samples drawn for one population
#[derive(Debug, Clone, PartialEq)]
pub struct PopulationSample {
    pub kind: PopulationKind,
    /// Heliocentric distance per tracklet (AU); empty for spurious tracklets
    pub distances: Vec<f64>,
    /// Total sky-plane displacement over the baseline (arcsec)
    pub displacements: Vec<f64>,
}

impl PopulationSample {
    pub fn len(&self) -> usize {
        self.displacements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.displacements.is_empty()
    }
}

/// Observed displacement for each distance: parallax drift plus `N(0, sigma)` noise
///
/// All noise terms are drawn after the distances, one per tracklet in order.
pub fn parallax_motion<R: Rng + ?Sized>(
    rng: &mut R,
    distances: &[f64],
    baseline_days: f64,
    sigma: f64,
) -> Result<Vec<f64>> {
    if !(sigma.is_finite() && sigma >= 0.0) {
        return Err(VetoError::invalid(format!(
            "sigma must be finite and >= 0 arcsec, got {sigma}"
        )));
    }
    let noise = Normal::new(0.0, sigma)
        .map_err(|e| VetoError::invalid(format!("bad noise distribution: {e}")))?;

    Ok(distances
        .iter()
        .map(|&d| parallax_displacement(d, baseline_days) + noise.sample(rng))
        .collect())
}

/// Draw `n` tracklets of `kind` with distances uniform on `range`
pub fn sample_population<R: Rng + ?Sized>(
    rng: &mut R,
    kind: PopulationKind,
    range: DistanceRange,
    n: usize,
    baseline_days: f64,
    sigma: f64,
) -> Result<PopulationSample> {
    let distances = rng::uniform_vec(rng, range.min, range.max, n);
    let displacements = parallax_motion(rng, &distances, baseline_days, sigma)?;
    tracing::debug!(
        population = %kind,
        n,
        min_au = range.min,
        max_au = range.max,
        "sampled population"
    );

    Ok(PopulationSample {
        kind,
        distances,
        displacements,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::seeded_rng;

    #[test]
    fn test_zero_noise_is_pure_parallax() {
        let mut rng = seeded_rng(1);
        let motion = parallax_motion(&mut rng, &[600.0, 3.0], 2.0, 0.0).unwrap();
        assert_eq!(motion, vec![12.0, 2400.0]);
    }

    #[test]
    fn test_negative_sigma_rejected() {
        let mut rng = seeded_rng(1);
        let err = parallax_motion(&mut rng, &[1.0], 2.0, -1.0).unwrap_err();
        assert!(matches!(err, VetoError::InvalidParameter(_)));
    }

    #[test]
    fn test_sample_population_distances_in_range() {
        let mut rng = seeded_rng(0);
        let range = DistanceRange::new(30.0, 100.0);
        let sample =
            sample_population(&mut rng, PopulationKind::OrdinaryTno, range, 500, 2.0, 0.05)
                .unwrap();
        assert_eq!(sample.len(), 500);
        assert!(sample
            .distances
            .iter()
            .all(|d| (30.0..100.0).contains(d)));
        // 3600/100*2 = 72 arcsec at the far edge; noise is tiny
        assert!(sample.displacements.iter().all(|m| *m > 70.0));
    }

    #[test]
    fn test_distance_range_validation() {
        assert!(DistanceRange::new(2.0, 3.5).validate("main_belt").is_ok());
        assert!(DistanceRange::new(0.0, 3.5).validate("main_belt").is_err());
        assert!(DistanceRange::new(4.0, 3.5).validate("main_belt").is_err());
        assert!(DistanceRange::new(1.0, f64::INFINITY)
            .validate("main_belt")
            .is_err());
    }

    #[test]
    fn test_only_signal_is_signal() {
        assert!(PopulationKind::Signal.is_signal());
        assert!(!PopulationKind::MainBelt.is_signal());
        assert!(!PopulationKind::Spurious.is_signal());
        assert_eq!(PopulationKind::OrdinaryTno.to_string(), "ordinary_tno");
    }
}

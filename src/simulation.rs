//! Baseline simulator for the shell-conditional parallax veto
//!
//! Three synthetic populations are drawn in a fixed order (main belt,
//! ordinary TNOs, target shell) from one seeded generator. The veto keeps a
//! tracklet when its noisy parallax displacement falls inside the shell
//! window; recovery is measured on the shell population and rejection on the
//! two background populations.

use crate::error::{Result, VetoError};
use crate::population::{sample_population, DistanceRange, PopulationKind, PopulationSample};
use crate::rng;
use crate::window::{
    ShellGeometry, VetoWindow, DEFAULT_BASELINE_DAYS, DEFAULT_MARGIN_ARCSEC,
    DEFAULT_SHELL_WIDTH_AU, DEFAULT_TARGET_DIST_AU,
};
use serde::{Deserialize, Serialize};

/// Main-belt heliocentric distances (AU)
pub const MAIN_BELT_RANGE: DistanceRange = DistanceRange::new(2.0, 3.5);

/// Ordinary TNO heliocentric distances (AU)
pub const TNO_RANGE: DistanceRange = DistanceRange::new(30.0, 100.0);

/// Parameters of one baseline simulation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationConfig {
    /// Target shell center distance (AU)
    pub target_dist: f64,
    /// Half-width of the target shell (AU)
    pub shell_width: f64,
    /// Revisit baseline (days)
    pub baseline_days: f64,
    /// Margin added to each window edge (arcsec)
    pub margin: f64,
    /// Astrometric noise standard deviation (arcsec)
    pub sigma: f64,
    pub n_mba: usize,
    pub n_tno: usize,
    pub n_signal: usize,
    pub seed: u64,
    pub main_belt_range: DistanceRange,
    pub tno_range: DistanceRange,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            target_dist: DEFAULT_TARGET_DIST_AU,
            shell_width: DEFAULT_SHELL_WIDTH_AU,
            baseline_days: DEFAULT_BASELINE_DAYS,
            margin: DEFAULT_MARGIN_ARCSEC,
            sigma: 0.05,
            n_mba: 5000,
            n_tno: 2000,
            n_signal: 1000,
            seed: 0,
            main_belt_range: MAIN_BELT_RANGE,
            tno_range: TNO_RANGE,
        }
    }
}

impl SimulationConfig {
    pub fn geometry(&self) -> ShellGeometry {
        ShellGeometry {
            target_dist: self.target_dist,
            shell_width: self.shell_width,
            baseline_days: self.baseline_days,
            margin: self.margin,
        }
    }

    /// Distances covered by the target shell
    pub fn signal_range(&self) -> DistanceRange {
        let geometry = self.geometry();
        DistanceRange::new(geometry.inner_dist(), geometry.outer_dist())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        for (name, n) in [
            ("n_mba", self.n_mba),
            ("n_tno", self.n_tno),
            ("n_signal", self.n_signal),
        ] {
            if n == 0 {
                return Err(VetoError::invalid(format!("{name} must be > 0, got 0")));
            }
        }

        if !(self.sigma.is_finite() && self.sigma >= 0.0) {
            return Err(VetoError::invalid(format!(
                "sigma must be finite and >= 0 arcsec, got {}",
                self.sigma
            )));
        }

        self.geometry().validate()?;
        self.main_belt_range.validate("main_belt")?;
        self.tno_range.validate("tno")?;
        // Zero-width shells sample a single distance
        if self.shell_width > 0.0 {
            self.signal_range().validate("signal")?;
        }
        Ok(())
    }

    fn draws(&self) -> [(PopulationKind, DistanceRange, usize); 3] {
        [
            (PopulationKind::MainBelt, self.main_belt_range, self.n_mba),
            (PopulationKind::OrdinaryTno, self.tno_range, self.n_tno),
            (PopulationKind::Signal, self.signal_range(), self.n_signal),
        ]
    }
}

/// Veto outcome for one population
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PopulationOutcome {
    pub kind: PopulationKind,
    pub n: usize,
    pub passed: usize,
}

/// Printed and serialized outcome of a baseline simulation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationSummary {
    pub target_dist: f64,
    pub shell_width: f64,
    pub baseline_days: f64,
    pub window: VetoWindow,
    pub populations: Vec<PopulationOutcome>,
    /// Fraction of shell objects kept by the veto
    pub recovery_rate: f64,
    /// Fraction of background objects removed by the veto
    pub rejection_rate: f64,
}

impl SimulationSummary {
    pub fn outcome(&self, kind: PopulationKind) -> Option<&PopulationOutcome> {
        self.populations.iter().find(|p| p.kind == kind)
    }
}

/// Samples plus summary of a baseline simulation
#[derive(Debug, Clone)]
pub struct SimulationReport {
    pub populations: Vec<PopulationSample>,
    pub summary: SimulationSummary,
}

impl SimulationReport {
    /// All displacements of background populations
    pub fn background_displacements(&self) -> Vec<f64> {
        self.populations
            .iter()
            .filter(|p| !p.kind.is_signal())
            .flat_map(|p| p.displacements.iter().copied())
            .collect()
    }

    /// All displacements of the target-shell population
    pub fn signal_displacements(&self) -> Vec<f64> {
        self.populations
            .iter()
            .filter(|p| p.kind.is_signal())
            .flat_map(|p| p.displacements.iter().copied())
            .collect()
    }
}

/// Run the baseline simulation
pub fn run_simulation(config: &SimulationConfig) -> Result<SimulationReport> {
    config.validate()?;
    let window = config.geometry().window()?;
    let mut rng = rng::seeded_rng(config.seed);

    let mut populations = Vec::with_capacity(3);
    for (kind, range, n) in config.draws() {
        populations.push(sample_population(
            &mut rng,
            kind,
            range,
            n,
            config.baseline_days,
            config.sigma,
        )?);
    }

    let outcomes: Vec<PopulationOutcome> = populations
        .iter()
        .map(|p| PopulationOutcome {
            kind: p.kind,
            n: p.len(),
            passed: window.count_accepted(&p.displacements),
        })
        .collect();

    let (signal, background): (Vec<&PopulationOutcome>, Vec<&PopulationOutcome>) =
        outcomes.iter().partition(|o| o.kind.is_signal());
    let signal_n: usize = signal.iter().map(|o| o.n).sum();
    let signal_passed: usize = signal.iter().map(|o| o.passed).sum();
    let background_n: usize = background.iter().map(|o| o.n).sum();
    let background_passed: usize = background.iter().map(|o| o.passed).sum();

    let recovery_rate = signal_passed as f64 / signal_n as f64;
    let rejection_rate = (background_n - background_passed) as f64 / background_n as f64;

    tracing::info!(
        seed = config.seed,
        signal_passed,
        background_passed,
        recovery_rate,
        rejection_rate,
        "baseline simulation complete"
    );

    Ok(SimulationReport {
        populations,
        summary: SimulationSummary {
            target_dist: config.target_dist,
            shell_width: config.shell_width,
            baseline_days: config.baseline_days,
            window,
            populations: outcomes,
            recovery_rate,
            rejection_rate,
        },
    })
}

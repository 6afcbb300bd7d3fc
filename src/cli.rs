//! CLI argument parsing for parallax-veto

use crate::error::{Result, VetoError};
use crate::plot::FigureOptions;
use crate::simulation::SimulationConfig;
use crate::stress::StressConfig;
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};

/// Output format for run summaries
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text format (default)
    Text,
    /// JSON format for machine parsing
    Json,
}

/// Figure produced by the baseline simulator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum PlotKind {
    /// Displacement histogram of background vs shell populations (default)
    #[default]
    Histogram,
    /// Log-log scatter of distance vs displacement per population
    Scatter,
}

#[derive(Parser, Debug)]
#[command(name = "parallax-veto")]
#[command(version)]
#[command(about = "Monte Carlo simulations of a shell-window parallax veto", long_about = None)]
pub struct Cli {
    /// Enable debug tracing on stderr (honours RUST_LOG)
    #[arg(long, global = true)]
    pub debug: bool,

    /// Summary output format
    #[arg(long = "format", value_enum, default_value = "text", global = true)]
    pub format: OutputFormat,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Baseline simulation: main belt, ordinary TNOs and shell targets vs the veto
    Simulate(SimulateArgs),
    /// Dirty-data stress test: uniform spurious tracklets vs the veto
    StressTest(StressTestArgs),
}

/// Shell geometry shared by both commands
#[derive(Args, Debug, Clone, Default)]
pub struct GeometryArgs {
    /// Target shell center distance (AU) [default: 600]
    #[arg(long = "target-dist", value_name = "AU", allow_negative_numbers = true)]
    pub target_dist: Option<f64>,

    /// Half-width of target shell (AU) [default: 20]
    #[arg(long = "shell-width", value_name = "AU", allow_negative_numbers = true)]
    pub shell_width: Option<f64>,

    /// Revisit baseline (days) [default: 2]
    #[arg(long = "baseline-days", value_name = "DAYS", allow_negative_numbers = true)]
    pub baseline_days: Option<f64>,

    /// Margin added to each veto window edge (arcsec) [default: 0.1]
    #[arg(long = "margin", value_name = "ARCSEC", allow_negative_numbers = true)]
    pub margin: Option<f64>,
}

/// Figure output options
#[derive(Args, Debug, Clone)]
pub struct FigureArgs {
    /// Output figure path (.svg for vector output, otherwise bitmap)
    #[arg(long = "out", value_name = "PATH")]
    pub out: Option<PathBuf>,

    /// Output resolution in dots per inch
    #[arg(long = "dpi", value_name = "DPI", default_value = "600", allow_negative_numbers = true)]
    pub dpi: i64,
}

impl FigureArgs {
    /// Resolve to validated figure options, using `default_out` when `--out` is absent
    pub fn to_options(&self, default_out: &str) -> Result<FigureOptions> {
        let dpi = u32::try_from(self.dpi)
            .map_err(|_| VetoError::invalid(format!("dpi must be positive, got {}", self.dpi)))?;
        let options = FigureOptions {
            out: self
                .out
                .clone()
                .unwrap_or_else(|| PathBuf::from(default_out)),
            dpi,
        };
        options.validate()?;
        Ok(options)
    }
}

#[derive(Args, Debug)]
pub struct SimulateArgs {
    #[command(flatten)]
    pub geometry: GeometryArgs,

    /// Astrometric noise sigma (arcsec) [default: 0.05]
    #[arg(long = "sigma", value_name = "ARCSEC", allow_negative_numbers = true)]
    pub sigma: Option<f64>,

    /// Number of main-belt background objects [default: 5000]
    #[arg(long = "n-mba", value_name = "N", allow_negative_numbers = true)]
    pub n_mba: Option<i64>,

    /// Number of ordinary TNO background objects [default: 2000]
    #[arg(long = "n-tno", value_name = "N", allow_negative_numbers = true)]
    pub n_tno: Option<i64>,

    /// Number of target-shell objects [default: 1000]
    #[arg(long = "n-signal", value_name = "N", allow_negative_numbers = true)]
    pub n_signal: Option<i64>,

    /// RNG seed [default: 0]
    #[arg(long = "seed", value_name = "SEED")]
    pub seed: Option<u64>,

    /// Figure kind
    #[arg(long = "plot", value_enum, default_value = "histogram")]
    pub plot: PlotKind,

    /// TOML file with simulation parameters (flags take precedence)
    #[arg(long = "config", value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[command(flatten)]
    pub figure: FigureArgs,
}

impl SimulateArgs {
    /// Defaults, then config file, then command-line flags
    pub fn to_config(&self) -> Result<SimulationConfig> {
        let mut config: SimulationConfig = match &self.config {
            Some(path) => load_config(path)?,
            None => SimulationConfig::default(),
        };

        let g = &self.geometry;
        override_with(&mut config.target_dist, g.target_dist);
        override_with(&mut config.shell_width, g.shell_width);
        override_with(&mut config.baseline_days, g.baseline_days);
        override_with(&mut config.margin, g.margin);
        override_with(&mut config.sigma, self.sigma);
        override_with(&mut config.seed, self.seed);
        override_count(&mut config.n_mba, self.n_mba, "n_mba")?;
        override_count(&mut config.n_tno, self.n_tno, "n_tno")?;
        override_count(&mut config.n_signal, self.n_signal, "n_signal")?;

        config.validate()?;
        Ok(config)
    }
}

#[derive(Args, Debug)]
pub struct StressTestArgs {
    #[command(flatten)]
    pub geometry: GeometryArgs,

    /// Number of spurious tracklets [default: 5000]
    #[arg(long = "n-artifacts", value_name = "N", allow_negative_numbers = true)]
    pub n_artifacts: Option<i64>,

    /// RNG seed [default: 99]
    #[arg(long = "seed", value_name = "SEED")]
    pub seed: Option<u64>,

    /// Min total displacement (arcsec over baseline) [default: -100]
    #[arg(long = "disp-min", value_name = "ARCSEC", allow_negative_numbers = true)]
    pub disp_min: Option<f64>,

    /// Max total displacement (arcsec over baseline) [default: 100]
    #[arg(long = "disp-max", value_name = "ARCSEC", allow_negative_numbers = true)]
    pub disp_max: Option<f64>,

    /// TOML file with stress-test parameters (flags take precedence)
    #[arg(long = "config", value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[command(flatten)]
    pub figure: FigureArgs,
}

impl StressTestArgs {
    /// Defaults, then config file, then command-line flags
    pub fn to_config(&self) -> Result<StressConfig> {
        let mut config: StressConfig = match &self.config {
            Some(path) => load_config(path)?,
            None => StressConfig::default(),
        };

        let g = &self.geometry;
        override_with(&mut config.target_dist, g.target_dist);
        override_with(&mut config.shell_width, g.shell_width);
        override_with(&mut config.baseline_days, g.baseline_days);
        override_with(&mut config.margin, g.margin);
        override_with(&mut config.seed, self.seed);
        override_with(&mut config.disp_min, self.disp_min);
        override_with(&mut config.disp_max, self.disp_max);
        override_count(&mut config.n_artifacts, self.n_artifacts, "n_artifacts")?;

        config.validate()?;
        Ok(config)
    }
}

/// Read a TOML parameter file
pub fn load_config<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let text = std::fs::read_to_string(path).map_err(|e| VetoError::io(path, e))?;
    toml::from_str(&text)
        .map_err(|e| VetoError::invalid(format!("config file {}: {e}", path.display())))
}

fn override_with<T>(slot: &mut T, value: Option<T>) {
    if let Some(v) = value {
        *slot = v;
    }
}

/// Sizes arrive signed so that zero and negatives fail as invalid parameters
fn override_count(slot: &mut usize, value: Option<i64>, name: &str) -> Result<()> {
    if let Some(n) = value {
        if n <= 0 {
            return Err(VetoError::invalid(format!("{name} must be > 0, got {n}")));
        }
        *slot = usize::try_from(n)
            .map_err(|_| VetoError::invalid(format!("{name} is too large: {n}")))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stress_args(cli: Cli) -> StressTestArgs {
        match cli.command {
            Command::StressTest(args) => args,
            other => panic!("expected stress-test, got {other:?}"),
        }
    }

    fn simulate_args(cli: Cli) -> SimulateArgs {
        match cli.command {
            Command::Simulate(args) => args,
            other => panic!("expected simulate, got {other:?}"),
        }
    }

    #[test]
    fn test_cli_stress_defaults() {
        let cli = Cli::parse_from(["parallax-veto", "stress-test"]);
        assert!(!cli.debug);
        assert_eq!(cli.format, OutputFormat::Text);
        let args = stress_args(cli);
        assert_eq!(args.to_config().unwrap(), StressConfig::default());
        let figure = args
            .figure
            .to_options("figure4_spurious_tracklets_hist.png")
            .unwrap();
        assert_eq!(figure.dpi, 600);
        assert_eq!(
            figure.out,
            PathBuf::from("figure4_spurious_tracklets_hist.png")
        );
    }

    #[test]
    fn test_cli_stress_overrides() {
        let cli = Cli::parse_from([
            "parallax-veto",
            "stress-test",
            "--n-artifacts",
            "200",
            "--disp-min",
            "-50",
            "--disp-max",
            "50",
            "--seed",
            "7",
        ]);
        let config = stress_args(cli).to_config().unwrap();
        assert_eq!(config.n_artifacts, 200);
        assert_eq!(config.disp_min, -50.0);
        assert_eq!(config.disp_max, 50.0);
        assert_eq!(config.seed, 7);
    }

    #[test]
    fn test_cli_negative_count_is_invalid_parameter() {
        let cli = Cli::parse_from(["parallax-veto", "stress-test", "--n-artifacts", "-5"]);
        let err = stress_args(cli).to_config().unwrap_err();
        assert!(matches!(err, VetoError::InvalidParameter(_)));
    }

    #[test]
    fn test_cli_zero_count_is_invalid_parameter() {
        let cli = Cli::parse_from(["parallax-veto", "simulate", "--n-tno", "0"]);
        let err = simulate_args(cli).to_config().unwrap_err();
        assert!(err.to_string().contains("n_tno"));
    }

    #[test]
    fn test_cli_global_flags_after_subcommand() {
        let cli = Cli::parse_from(["parallax-veto", "simulate", "--debug", "--format", "json"]);
        assert!(cli.debug);
        assert_eq!(cli.format, OutputFormat::Json);
    }

    #[test]
    fn test_cli_simulate_plot_kind() {
        let cli = Cli::parse_from(["parallax-veto", "simulate", "--plot", "scatter"]);
        assert_eq!(simulate_args(cli).plot, PlotKind::Scatter);
    }

    #[test]
    fn test_cli_bad_dpi() {
        let cli = Cli::parse_from(["parallax-veto", "simulate", "--dpi", "0"]);
        let args = simulate_args(cli);
        assert!(args.figure.to_options("x.png").is_err());
    }

    #[test]
    fn test_config_file_then_flags() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stress.toml");
        std::fs::write(&path, "n_artifacts = 1234\nseed = 5\n").unwrap();

        let path_str = path.to_str().unwrap();
        let cli = Cli::parse_from([
            "parallax-veto",
            "stress-test",
            "--config",
            path_str,
            "--seed",
            "6",
        ]);
        let config = stress_args(cli).to_config().unwrap();
        assert_eq!(config.n_artifacts, 1234);
        assert_eq!(config.seed, 6);
    }

    #[test]
    fn test_config_unknown_key_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sim.toml");
        std::fs::write(&path, "n_signals = 3\n").unwrap();
        let err = load_config::<SimulationConfig>(&path).unwrap_err();
        assert!(matches!(err, VetoError::InvalidParameter(_)));
    }

    #[test]
    fn test_missing_config_is_io_error() {
        let err = load_config::<StressConfig>(Path::new("/nonexistent/stress.toml")).unwrap_err();
        assert!(matches!(err, VetoError::Io { .. }));
    }
}

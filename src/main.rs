use anyhow::Result;
use clap::Parser;
use parallax_veto::cli::{Cli, Command, OutputFormat, SimulateArgs, StressTestArgs};
use parallax_veto::{plot, report, simulation, stress};
use std::path::Path;
use tracing_subscriber::EnvFilter;

/// Initialize tracing subscriber for debug output
fn init_tracing(debug: bool) {
    if debug {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::from_default_env().add_directive(tracing::Level::TRACE.into()),
            )
            .with_writer(std::io::stderr)
            .init();
    }
}

/// Report the written figure; JSON mode keeps stdout a single document
fn announce_saved(path: &Path, format: OutputFormat) {
    match format {
        OutputFormat::Text => println!("Saved: {}", path.display()),
        OutputFormat::Json => eprintln!("Saved: {}", path.display()),
    }
}

fn run_simulate(args: &SimulateArgs, format: OutputFormat) -> Result<()> {
    let config = args.to_config()?;
    let figure = args.figure.to_options(plot::DEFAULT_SIMULATION_OUT)?;

    let result = simulation::run_simulation(&config)?;
    print!("{}", report::render_simulation(&result.summary, format)?);

    plot::render_simulation_figure(&result, args.plot, &figure)?;
    announce_saved(&figure.out, format);
    Ok(())
}

fn run_stress_test(args: &StressTestArgs, format: OutputFormat) -> Result<()> {
    let config = args.to_config()?;
    let figure = args.figure.to_options(plot::DEFAULT_STRESS_OUT)?;

    let result = stress::run_stress_test(&config)?;
    print!("{}", report::render_stress(&result.summary, format)?);

    plot::render_stress_figure(&result, &figure)?;
    announce_saved(&figure.out, format);
    Ok(())
}

fn main() -> Result<()> {
    let args = Cli::parse();

    // Initialize tracing if --debug flag is set
    init_tracing(args.debug);

    match &args.command {
        Command::Simulate(sim) => run_simulate(sim, args.format)?,
        Command::StressTest(stress) => run_stress_test(stress, args.format)?,
    }

    Ok(())
}

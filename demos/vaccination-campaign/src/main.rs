use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use ixa_vaccination::log::{info, LogLevels};
use ixa_vaccination::{VaccinationError, VaccinationParameters};

mod campaign;

/// Vaccinates a synthetic population and reports doses and protection over time
#[derive(Parser, Debug)]
struct Args {
    /// Path to the campaign parameters
    #[arg(short, long, default_value = "config.json")]
    config: PathBuf,

    /// Random seed, overriding the one in the config file
    #[arg(short, long)]
    random_seed: Option<u64>,

    /// Directory for report output
    #[arg(short, long, default_value = ".")]
    output_dir: PathBuf,

    /// Log levels, e.g. `info` or `warn,ixa_vaccination::history=trace`
    #[arg(short, long, default_value = "info")]
    log_level: String,
}

fn run(args: Args) -> Result<(), VaccinationError> {
    LogLevels::parse(&args.log_level)?.apply();

    let mut parameters = VaccinationParameters::load(&args.config)?;
    if let Some(seed) = args.random_seed {
        parameters.seed = seed;
    }
    info!("Loaded parameters from {}", args.config.display());

    let summary = campaign::run(&parameters, &args.output_dir)?;
    info!(
        "Vaccinated {} of {} people; {} protected on day {}; {} report rows",
        summary.vaccinated,
        parameters.population,
        summary.protected_at_end,
        parameters.max_day,
        summary.report_rows
    );
    Ok(())
}

fn main() -> ExitCode {
    match run(Args::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}

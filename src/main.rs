use std::{error::Error, process};

use clap::{command, Parser};
use log::{debug, error, info, LevelFilter};

use llama_rng::{config::ProviderConfig, factory, stats::Summary, Provider};

/// Build profile reported in the startup line of a debug build.
#[cfg(debug_assertions)]
const BUILD_PROFILE: &str = "debug";
/// Build profile reported in the startup line of an optimized build.
#[cfg(not(debug_assertions))]
const BUILD_PROFILE: &str = "release";

/// Group name for mutually exclusive logging options.
const ARGS_GROUP_LOGGING: &str = "logging";

/// Command line arguments as parsed by `clap`.
///
/// The provider itself is configured through `LLAMA_RNG_*` environment
/// variables, exactly as it would be inside the inference process.
#[derive(Clone, Debug, Default, Hash, PartialEq, Eq, PartialOrd, Ord, Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Number of values to draw
    #[arg(short = 'n', long, default_value_t = 1000)]
    count: usize,

    /// Print every value as it is drawn
    #[arg(short, long, default_value_t = false)]
    print: bool,

    /// Suppresses all output except warnings and errors.
    #[arg(short, long, default_value_t = false, group = ARGS_GROUP_LOGGING)]
    quiet: bool,

    /// Enable verbose logging
    ///
    /// Specify twice for trace logging.
    #[arg(short, long, action = clap::ArgAction::Count, group = ARGS_GROUP_LOGGING)]
    verbose: u8,
}

/// Initializes the logger facade.
///
/// The logging level is determined as follows, in order of precedence from
/// highest to lowest:
/// 1. Command line arguments
/// 2. `RUST_LOG` environment variable
/// 3. Hard coded default
fn init_logger(config: &Args) {
    let mut logger = env_logger::Builder::from_env(
        env_logger::Env::default().filter_or(env_logger::DEFAULT_FILTER_ENV, "info"),
    );

    if config.quiet || config.verbose > 0 {
        let level = match config.verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        };

        logger.filter_module("llama_rng", level);
    }

    logger.init();
}

/// Draws the requested number of values and prints their summary.
///
/// Stops at the first failure: providers never retry, and neither does this.
fn run(args: &Args) -> Result<(), Box<dyn Error>> {
    let config = ProviderConfig::from_env()?;
    let mut provider = factory::from_config(&config)?;

    let mut values = Vec::with_capacity(args.count);
    for _ in 0..args.count {
        let value = provider.generate()?;
        if args.print {
            println!("{}", value.value());
        }
        values.push(value.value());
    }

    match Summary::from_values(&values) {
        Some(summary) => println!("{}: {summary}", provider.name()),
        None => println!("{}: no values drawn", provider.name()),
    }

    Ok(())
}

fn main() {
    let args = Args::parse();
    init_logger(&args);

    debug!("Command {:#?}", args);

    let cmd = command!();
    let name = cmd.get_name().to_string();
    let version = cmd.get_version().unwrap_or("UNKNOWN").to_string();
    info!("starting {name}/{version}; {BUILD_PROFILE}");

    if let Err(e) = run(&args) {
        error!("{e}");
        process::exit(1);
    }
}

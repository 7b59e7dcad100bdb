//! Keyprobe - console key-combination capture utility
//!
//! Drives the capture helper through every key/modifier combination and
//! keeps the results in a JSON store.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::{error, info, warn};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use keyprobe::{
    capture::{locate_helper, CaptureDriver, HelperCommand},
    config::Config,
    keyboard::{full_space, Combination, SystemSimulator},
    logging,
    report::{GapReport, PatternReport},
    store,
    sweep::{full_sweep, OutputPaths, RetryOutcome, RetryPlan, RunSummary},
};

/// Set once simulation begins; interrupts before that cancel the run
static CAPTURING: AtomicBool = AtomicBool::new(false);

#[derive(Parser)]
#[command(name = "keyprobe", version)]
#[command(about = "Capture console input codes for every key/modifier combination")]
struct Cli {
    /// Config file (defaults to the platform config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Result store path; the text report is written beside it
    #[arg(long, global = true)]
    store: Option<PathBuf>,
    /// Capture helper binary
    #[arg(long, global = true)]
    helper: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Capture every combination and overwrite the store
    Sweep {
        /// Seconds to wait before simulation starts
        #[arg(long, default_value_t = 3)]
        countdown: u64,
    },
    /// Capture only the combinations missing from the store
    Retry {
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
        /// Seconds to wait before simulation starts
        #[arg(long, default_value_t = 3)]
        countdown: u64,
    },
    /// List combinations missing from the store
    Gaps {
        /// How many keys to rank as most problematic
        #[arg(long, default_value_t = 10)]
        top: usize,
    },
    /// Analyse patterns in the captured codes
    Patterns,
    /// Print the combination space
    Catalog,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            return ExitCode::FAILURE;
        }
    };

    if let Some(e) = logging::init(&config.paths.log) {
        warn!("Could not open log file {}: {}", config.paths.log.display(), e);
    }

    match run(cli, config) {
        Ok(code) => code,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => Config::load().context("Failed to load config")?,
    };

    if let Some(store) = &cli.store {
        config.paths.relocate_store(store.clone());
    }
    if let Some(helper) = &cli.helper {
        config.paths.helper = Some(helper.clone());
    }
    Ok(config)
}

fn run(cli: Cli, config: Config) -> Result<ExitCode> {
    match cli.command {
        Commands::Sweep { countdown } => run_sweep(&config, countdown),
        Commands::Retry { yes, countdown } => run_retry(&config, yes, countdown),
        Commands::Gaps { top } => Ok(run_gaps(&config, top)),
        Commands::Patterns => Ok(run_patterns(&config)),
        Commands::Catalog => {
            let space = full_space();
            println!("{} combinations", space.len());
            for combination in &space {
                println!("{}", combination.label());
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn output_paths(config: &Config) -> OutputPaths {
    OutputPaths::new(&config.paths.store).with_text(&config.paths.text_report)
}

/// Locate the helper and open the simulation backend, or explain why not
fn build_driver(config: &Config) -> Option<CaptureDriver<SystemSimulator>> {
    let helper = match locate_helper(config.paths.helper.as_deref()) {
        Ok(path) => path,
        Err(e) => {
            error!("{}", e);
            return None;
        }
    };
    info!("Using capture helper {}", helper.display());

    let simulator = match SystemSimulator::new() {
        Ok(sim) => sim,
        Err(e) => {
            error!("{}", e);
            return None;
        }
    };

    Some(CaptureDriver::new(
        HelperCommand::new(helper).args(&config.paths.helper_args),
        simulator,
        config.capture.clone(),
    ))
}

fn install_interrupt_handler() -> Result<()> {
    ctrlc::set_handler(|| {
        if CAPTURING.load(Ordering::SeqCst) {
            warn!("Interrupt ignored while capture is running");
        } else {
            error!("Cancelled by user");
            std::process::exit(1);
        }
    })
    .context("Failed to install interrupt handler")
}

fn countdown(seconds: u64) {
    for remaining in (1..=seconds).rev() {
        info!("Starting in {}... (Ctrl+C to cancel)", remaining);
        thread::sleep(Duration::from_secs(1));
    }
}

fn confirm_retry(missing: &[Combination]) -> bool {
    println!("{} combinations are missing:", missing.len());
    for combination in missing.iter().take(20) {
        println!("  {}", combination.label());
    }
    if missing.len() > 20 {
        println!("  ... and {} more", missing.len() - 20);
    }
    print!("This will simulate key presses on this machine. Proceed? [y/N] ");
    let _ = io::stdout().flush();

    let mut answer = String::new();
    if io::stdin().lock().read_line(&mut answer).is_err() {
        return false;
    }
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

fn log_summary(summary: &RunSummary) {
    info!("Successful: {}", summary.successful);
    info!("Failed:     {}", summary.failed());
    info!("Total:      {}", summary.total);
    for failure in &summary.failures {
        warn!("  not captured: {} ({})", failure.combination.label(), failure.reason);
    }
}

fn run_sweep(config: &Config, seconds: u64) -> Result<ExitCode> {
    let Some(mut driver) = build_driver(config) else {
        return Ok(ExitCode::FAILURE);
    };

    install_interrupt_handler()?;
    let space = full_space();
    info!("{} combinations will be captured", space.len());
    countdown(seconds);
    CAPTURING.store(true, Ordering::SeqCst);

    let report = full_sweep(&mut driver, &space, &output_paths(config))
        .context("Failed to write capture results")?;

    log_summary(&report.summary);
    Ok(ExitCode::SUCCESS)
}

fn run_retry(config: &Config, yes: bool, seconds: u64) -> Result<ExitCode> {
    let space = full_space();
    let plan = RetryPlan::prepare(&config.paths.store, &space);

    if plan.is_complete() {
        info!(
            "All {} combinations already captured in {}",
            space.len(),
            config.paths.store.display()
        );
        return Ok(ExitCode::SUCCESS);
    }

    let Some(mut driver) = build_driver(config) else {
        return Ok(ExitCode::FAILURE);
    };

    install_interrupt_handler()?;
    let outcome = plan
        .execute(&mut driver, &output_paths(config), |missing| {
            let approved = yes || confirm_retry(missing);
            if approved {
                countdown(seconds);
                CAPTURING.store(true, Ordering::SeqCst);
            }
            approved
        })
        .context("Failed to write merged results")?;

    match outcome {
        RetryOutcome::Complete => Ok(ExitCode::SUCCESS),
        RetryOutcome::Declined => {
            info!("Cancelled");
            Ok(ExitCode::FAILURE)
        }
        RetryOutcome::Ran(report) => {
            log_summary(&report.summary);
            info!(
                "Store now holds {} combinations",
                report.snapshot.total_combinations
            );
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn run_gaps(config: &Config, top: usize) -> ExitCode {
    match store::load_snapshot(&config.paths.store) {
        Ok(snapshot) => {
            print!("{}", GapReport::build(&snapshot, &full_space()).render(top));
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run_patterns(config: &Config) -> ExitCode {
    match store::load_snapshot(&config.paths.store) {
        Ok(snapshot) => {
            print!("{}", PatternReport::build(&snapshot).render());
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

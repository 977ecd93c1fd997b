use anyhow::Result;
use clap::{CommandFactory, Parser};
use clap_complete::{Generator, generate};
use colored::Colorize;
use filemon::cli::{Cli, Commands, ScanArgs};
use filemon::commands::{self, ExitStatus};
use filemon::output::{self, Verbosity};
use filemon::utils::thread_pool;
use filemon::FmContext;
use std::io;
use std::process;
use tracing_subscriber::EnvFilter;

/// Environment variable holding a tracing filter directive.
const LOG_ENV: &str = "FM_LOG";

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(status) => process::exit(status.code()),
        Err(e) => {
            eprintln!("{} {:#}", "Error:".red().bold(), e);
            process::exit(ExitStatus::Failure.code());
        }
    }
}

fn init_logging(verbose: bool) {
    let fallback = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: Cli) -> Result<ExitStatus> {
    if let Commands::Completion { shell } = cli.command {
        print_completions(shell, &mut Cli::command());
        return Ok(ExitStatus::Success);
    }

    output::set_verbosity(Verbosity::from_flags(cli.verbose, cli.quiet));

    let ctx = FmContext::new()?;
    output::set_color(ctx.config.output.color && !cli.no_color);

    match cli.command {
        Commands::Baseline { scan, reset } => {
            configure_workers(&ctx, &scan)?;
            commands::baseline::execute(&ctx, &scan, reset)
        }
        Commands::Check { scan, reset } => {
            configure_workers(&ctx, &scan)?;
            commands::check::execute(&ctx, &scan, reset)
        }
        Commands::Reset { storage } => Ok(commands::reset::execute(
            &ctx.baseline_locations(&storage.baseline_files),
        )),
        Commands::Completion { .. } => Ok(ExitStatus::Success),
    }
}

/// `--threads` wins over `[performance] parallel_threads`.
fn configure_workers(ctx: &FmContext, scan: &ScanArgs) -> Result<()> {
    match scan.threads {
        Some(0) => anyhow::bail!("--threads must be at least 1"),
        Some(n) => thread_pool::init_thread_pool(n),
        None => thread_pool::configure_from_config(&ctx.config),
    }
}

fn print_completions<G: Generator>(g: G, cmd: &mut clap::Command) {
    generate(g, cmd, cmd.get_name().to_string(), &mut io::stdout());
}

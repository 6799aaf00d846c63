use std::process;

use chrono::Local;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use fitplan::cli::commands::{Cli, Commands};
use fitplan::cli::{self, GlobalOpts};
use fitplan::schedule::planner;

fn main() {
    let cli_args = Cli::parse();
    init_logging(cli_args.verbose);

    let today = match cli_args.today.as_deref() {
        Some(s) => match planner::parse_date("today", s) {
            Ok(d) => d,
            Err(e) => process::exit(cli::finish(Err(e), cli_args.json)),
        },
        None => Local::now().date_naive(),
    };
    let opts = GlobalOpts {
        json: cli_args.json,
        milestone: cli_args.milestone.clone(),
        today,
    };

    let exit_code = match cli_args.command {
        Commands::Init => cli::init::run(opts.json),
        Commands::Milestone(cmd) => cli::milestone::run(cmd, &opts),
        Commands::Task(cmd) => cli::task::run(cmd, &opts),
        Commands::Status => cli::status::run(&opts),
    };

    process::exit(exit_code);
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();
}

mod cli;
mod commands;
mod config;
mod paths;
mod progress;
mod task;
mod ui;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use clap_complete::generate;
use cli::{Cli, Command, ConnectionArgs};
use std::io;

/// Global context for the application
pub struct Context {
    pub verbose: u8,
    pub quiet: bool,
    pub overrides: config::Overrides,
}

impl From<ConnectionArgs> for config::Overrides {
    fn from(args: ConnectionArgs) -> Self {
        Self {
            csp_url: args.csp_url,
            api_key: args.api_key,
            timeout_secs: args.timeout,
            page_limit: args.page_limit.map(|limit| limit as usize),
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    let log_level = match cli.verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };

    env_logger::Builder::new()
        .filter_level(if cli.quiet {
            log::LevelFilter::Error
        } else {
            log_level
        })
        .format_timestamp(None)
        .init();

    let ctx = Context {
        verbose: cli.verbose,
        quiet: cli.quiet,
        overrides: cli.connection.into(),
    };

    match cli.command {
        Command::Apply(args) => commands::apply::run(&ctx, args),
        Command::Info(args) => commands::info::run(&ctx, args),
        Command::NextAvailable(args) => commands::next_available::run(&ctx, args),
        Command::Resources(args) => commands::resources::run(args),
        Command::Completions { shell } => {
            let mut cmd = Cli::command();
            generate(shell, &mut cmd, "ddictl", &mut io::stdout());
            Ok(())
        }
    }
}

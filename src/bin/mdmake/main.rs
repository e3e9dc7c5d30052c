//! mdmake CLI - a meta-build orchestrator for makefile project trees

use anyhow::Result;
use clap::{CommandFactory, Parser};
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use cli::Cli;
use mdmake::util::diagnostic;
use mdmake::util::shell::Shell;

/// Exit status when mdmake is called without arguments.
const USAGE_EXIT: i32 = 2;

fn main() {
    if std::env::args_os().len() <= 1 {
        if let Err(e) = Cli::command().print_help() {
            eprintln!("error: {:#}", e);
        }
        std::process::exit(USAGE_EXIT);
    }

    let cli = Cli::parse();
    let shell = commands::run::shell_for(&cli);

    if let Err(e) = run(cli, &shell) {
        match e.downcast_ref::<mdmake::Error>() {
            Some(err) => diagnostic::emit(&err.to_diagnostic(), shell.use_color()),
            None => eprintln!("error: {:#}", e),
        }
        std::process::exit(1);
    }
}

fn run(cli: Cli, shell: &Shell) -> Result<()> {
    // Set up logging
    let filter = if cli.verbose {
        EnvFilter::new("mdmake=debug")
    } else {
        EnvFilter::new("mdmake=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    commands::run::execute(cli, shell)
}

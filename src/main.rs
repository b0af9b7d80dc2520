use std::process::ExitCode;

use clap::Parser;
use prism_setup::cli::{Cli, Command};
use prism_setup::{authconfig, publish, telemetry};

fn main() -> ExitCode {
    let cli = Cli::parse();
    telemetry::init();

    let result = match &cli.command {
        Command::PublishBlueprints(args) => publish::run(&cli.connection, args),
        Command::Authconfig(args) => authconfig::run(&cli.connection, args),
    };
    telemetry::report(result)
}

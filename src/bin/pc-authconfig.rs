use std::process::ExitCode;

use clap::Parser;
use prism_setup::cli::{AuthconfigArgs, ConnectionArgs};
use prism_setup::{authconfig, telemetry};

/// Register AutoDC as a Prism Central authconfig directory
#[derive(Parser, Debug)]
#[command(name = "pc-authconfig", version)]
struct Args {
    #[command(flatten)]
    connection: ConnectionArgs,
    #[command(flatten)]
    authconfig: AuthconfigArgs,
}

fn main() -> ExitCode {
    let args = Args::parse();
    telemetry::init();
    telemetry::report(authconfig::run(&args.connection, &args.authconfig))
}

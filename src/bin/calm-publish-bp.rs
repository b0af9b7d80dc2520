use std::process::ExitCode;

use clap::Parser;
use prism_setup::cli::{ConnectionArgs, PublishArgs};
use prism_setup::{publish, telemetry};

/// Publish blueprints into the Calm marketplace
#[derive(Parser, Debug)]
#[command(name = "calm-publish-bp", version)]
struct Args {
    #[command(flatten)]
    connection: ConnectionArgs,
    #[command(flatten)]
    publish: PublishArgs,
}

fn main() -> ExitCode {
    let args = Args::parse();
    telemetry::init();
    telemetry::report(publish::run(&args.connection, &args.publish))
}

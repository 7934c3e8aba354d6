//! Binary to render a code template from a JSON Schema.
//!
//! Usage: `crudilize user < user.schema.json > user.js`
//!
//! Logs go to stderr so the rendered output on stdout stays clean.

use std::io::stdin;
use std::process;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crudilize::cli::Cli;
use crudilize::{StdoutSink, run};

fn init_tracing(default_filter: &str) {
    let filter: EnvFilter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
}

fn main() {
    let cli: Cli = Cli::parse();
    init_tracing(cli.log_filter());

    let settings = cli.into_settings();
    if let Err(failed) = run(&settings, stdin().lock(), &mut StdoutSink) {
        tracing::debug!(stage = %failed.stage, "run failed");
        eprintln!("error: {failed}");
        process::exit(1);
    }
}

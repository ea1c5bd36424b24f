use anyhow::{Context, Result};
use clap::Parser;
use std::io;
use std::process::ExitCode;

use hoptrace::cli::Args;
use hoptrace::config::Config;
use hoptrace::error::TraceError;
use hoptrace::export::export_json;
use hoptrace::lookup::resolve_destination;
use hoptrace::probe::{Prober, SocketPair, SystemClock};
use hoptrace::state::Session;
use hoptrace::trace::TraceEngine;

/// Exit status for invalid arguments (matches clap's usage errors)
const EXIT_INVALID_ARGS: u8 = 2;

fn main() -> ExitCode {
    let args = Args::parse();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(if args.verbose { "debug" } else { "warn" })
        .with_writer(io::stderr)
        .init();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", TraceError::InvalidArgument(e));
        return ExitCode::from(EXIT_INVALID_ARGS);
    }

    match run(&args) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            let code = e
                .downcast_ref::<TraceError>()
                .map(TraceError::exit_code)
                .unwrap_or(1);
            ExitCode::from(code)
        }
    }
}

fn run(args: &Args) -> Result<Session> {
    let config = Config::from(args);

    // Resolve before touching any socket
    let target = resolve_destination(&args.destination)?;

    let sockets =
        SocketPair::open(config.port, config.timeout).context("Failed to open probe sockets")?;
    let engine = TraceEngine::new(Prober::new(sockets, SystemClock::new()), target, config);

    if args.json {
        let session = engine.run(&mut io::sink())?;
        export_json(&session, io::stdout().lock())?;
        Ok(session)
    } else {
        let session = engine
            .run(&mut io::stdout().lock())
            .context("Failed to write trace output")?;
        Ok(session)
    }
}

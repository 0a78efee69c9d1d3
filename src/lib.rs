// src/lib.rs

pub mod cli;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod logging;
pub mod pattern;
pub mod quote;
pub mod relay;

use tokio::sync::mpsc;
use tracing::info;

use crate::cli::CliArgs;
use crate::engine::{DispatchEvent, Dispatcher, DispatcherOptions};
use crate::errors::Result;
use crate::exec::RealSpawner;
use crate::pattern::MatchExpr;
use crate::relay::ConsoleRelay;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - matchexpr compilation
/// - the dispatcher event channel
/// - the real spawner (primary spawned here, before the loop starts)
/// - the console output relay
///
/// Returns the exit code the process should end with.
pub async fn run(args: CliArgs) -> Result<i32> {
    let matcher = MatchExpr::parse(&args.matchexpr)?;

    if args.verbose {
        info!("Outwatch started...");
        info!(command = %args.command, "Command");
        info!(matchexpr = %matcher, "Match Expression");
        info!(execute = %args.execute, "Execute command");
        info!(shell = %args.shell_path, "Using shell");
    }

    let (events_tx, events_rx) = mpsc::channel::<DispatchEvent>(64);

    let mut spawner = RealSpawner::new(args.shell_path.clone(), events_tx);
    spawner.spawn_primary(&args.command)?;

    let options = DispatcherOptions {
        stop_on_match: args.stop_on_match,
        exit_on_match: args.exit_on_match,
        verbose: args.verbose,
    };
    let relay = ConsoleRelay::new(args.no_color);

    let dispatcher = Dispatcher::new(
        matcher,
        args.execute.clone(),
        options,
        relay,
        spawner,
        events_rx,
    );
    dispatcher.run().await
}

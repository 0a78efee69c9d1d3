// src/engine/dispatcher.rs

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::errors::Result;
use crate::exec::SpawnerBackend;
use crate::pattern::MatchExpr;
use crate::quote::secondary_command;
use crate::relay::RelaySink;

/// Which pipe of a process a line came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamSource {
    Stdout,
    Stderr,
}

/// Events sent into the dispatcher from the stream readers and process
/// waiters.
///
/// The idea is that:
/// - the primary command's pipe readers send `PrimaryLine`
/// - each secondary command's pipe readers send `SecondaryLine`
/// - the primary waiter sends `PrimaryClosed`
/// - each secondary waiter sends `SecondaryClosed`
#[derive(Debug, Clone)]
pub enum DispatchEvent {
    PrimaryLine { source: StreamSource, text: String },
    SecondaryLine { source: StreamSource, text: String },
    PrimaryClosed { code: i32 },
    SecondaryClosed { code: i32 },
}

/// Options that influence how matches are handled.
#[derive(Debug, Clone, Copy, Default)]
pub struct DispatcherOptions {
    /// Stop matching once a match has been found. In-flight executes still
    /// run to completion.
    pub stop_on_match: bool,
    /// Exit the whole session once the first matched batch has drained.
    pub exit_on_match: bool,
    /// Log match and spawn decisions (helps debug shell escaping issues).
    pub verbose: bool,
}

/// Mutable coordinator state. Only the dispatcher reads or writes it, and
/// only within a single event-handling turn, so test-and-increment and
/// decrement-and-check-zero are atomic with respect to other events.
#[derive(Debug)]
struct DispatchState {
    /// Once true, no further matches trigger new spawns.
    stopped: bool,
    /// Number of secondary commands currently running.
    in_flight: usize,
    primary_exit_code: Option<i32>,
    primary_closed: bool,
    /// When the in-flight count next reaches zero, end the session.
    ///
    /// Starts true: once any triggered batch fully drains, the session ends
    /// even if the primary is still running.
    exit_after_batch: bool,
}

impl DispatchState {
    fn new() -> Self {
        Self {
            stopped: false,
            in_flight: 0,
            primary_exit_code: None,
            primary_closed: false,
            exit_after_batch: true,
        }
    }
}

/// The match-and-dispatch coordinator.
///
/// Consumes [`DispatchEvent`]s from a single mpsc channel, relays lines
/// through the [`RelaySink`], spawns secondary commands through the
/// [`SpawnerBackend`], and resolves the session's final exit code.
pub struct Dispatcher<R: RelaySink, S: SpawnerBackend> {
    matcher: MatchExpr,
    execute: String,
    options: DispatcherOptions,
    relay: R,
    spawner: S,
    events_rx: mpsc::Receiver<DispatchEvent>,
    state: DispatchState,
}

impl<R: RelaySink, S: SpawnerBackend> Dispatcher<R, S> {
    pub fn new(
        matcher: MatchExpr,
        execute: String,
        options: DispatcherOptions,
        relay: R,
        spawner: S,
        events_rx: mpsc::Receiver<DispatchEvent>,
    ) -> Self {
        Self {
            matcher,
            execute,
            options,
            relay,
            spawner,
            events_rx,
            state: DispatchState::new(),
        }
    }

    /// Main event loop. Returns the exit code the process should end with.
    pub async fn run(mut self) -> Result<i32> {
        debug!(matchexpr = %self.matcher, "dispatcher started");

        while let Some(event) = self.events_rx.recv().await {
            let outcome = match event {
                DispatchEvent::PrimaryLine { source, text } => {
                    self.handle_primary_line(source, &text).await?
                }
                DispatchEvent::SecondaryLine { source, text } => {
                    self.relay_line(source, &text);
                    None
                }
                DispatchEvent::PrimaryClosed { code } => self.handle_primary_closed(code),
                DispatchEvent::SecondaryClosed { code } => {
                    self.handle_secondary_closed(code).await?
                }
            };

            if let Some(code) = outcome {
                debug!(exit_code = code, "dispatcher finished");
                return Ok(code);
            }
        }

        // All event senders dropped without a completion event; treat as an
        // aborted primary.
        warn!("event channel closed before the primary command completed");
        Ok(self.state.primary_exit_code.unwrap_or(-1))
    }

    /// Relay a primary line, then test it for a match unless matching has
    /// been stopped. Lines arriving after `stopped` are still relayed.
    async fn handle_primary_line(
        &mut self,
        source: StreamSource,
        text: &str,
    ) -> Result<Option<i32>> {
        self.relay_line(source, text);

        if self.state.stopped || !self.matcher.is_match(text) {
            return Ok(None);
        }

        if self.options.verbose {
            info!(line = %text, "found matching data for line");
        }

        if self.options.exit_on_match || self.options.stop_on_match {
            self.state.stopped = true;
        }

        // Increment before the spawn is issued; the backend guarantees a
        // matching SecondaryClosed event even when the spawn itself fails.
        self.state.in_flight += 1;

        let command = secondary_command(text, &self.execute);
        if self.options.verbose {
            info!(command = %command, "about to run command");
        }

        self.spawner.spawn_secondary(command).await?;
        Ok(None)
    }

    fn handle_primary_closed(&mut self, code: i32) -> Option<i32> {
        debug!(exit_code = code, "primary command closed");
        self.state.primary_exit_code = Some(code);
        self.state.primary_closed = true;
        self.state.exit_after_batch = true;

        if self.state.in_flight == 0 {
            Some(code)
        } else {
            // Drain: already-triggered executes must run to completion.
            debug!(in_flight = self.state.in_flight, "waiting for in-flight executes");
            None
        }
    }

    async fn handle_secondary_closed(&mut self, code: i32) -> Result<Option<i32>> {
        debug!(exit_code = code, "execute command closed");
        self.state.in_flight = self.state.in_flight.saturating_sub(1);

        let should_exit = self.options.exit_on_match || self.state.exit_after_batch;
        if should_exit && self.state.in_flight == 0 {
            self.spawner.terminate_primary().await?;
            return Ok(Some(self.resolve_exit_code(code)));
        }

        Ok(None)
    }

    /// The primary's exit code wins when it is known and non-zero; otherwise
    /// the last execute command's code is used. A zero primary code is not
    /// decisive, so callers still see a failing execute command.
    fn resolve_exit_code(&self, secondary_code: i32) -> i32 {
        match self.state.primary_exit_code {
            Some(code) if code != 0 => code,
            _ => secondary_code,
        }
    }

    fn relay_line(&mut self, source: StreamSource, text: &str) {
        match source {
            StreamSource::Stdout => self.relay.stdout_line(text),
            StreamSource::Stderr => self.relay.stderr_line(text),
        }
    }
}

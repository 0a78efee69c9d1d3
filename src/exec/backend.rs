// src/exec/backend.rs

//! Pluggable spawner backend abstraction.
//!
//! The dispatcher talks to a `SpawnerBackend` instead of spawning processes
//! directly. This makes the coordinator's concurrency logic testable with a
//! fake spawner while keeping the production implementation in [`command`].
//!
//! - [`RealSpawner`] is the default implementation. It runs real shell
//!   processes via `tokio::process` and feeds their output and exit codes
//!   back over the dispatcher's event channel.
//! - Tests can provide their own `SpawnerBackend` that records spawned
//!   commands and emits `SecondaryClosed` events directly.

use std::future::Future;
use std::pin::Pin;

use tokio::sync::mpsc;

use crate::engine::DispatchEvent;
use crate::errors::Result;

use super::command::{self, PrimaryHandle, DEFAULT_SEPARATOR};

/// Trait abstracting how the dispatcher starts and stops processes.
pub trait SpawnerBackend: Send {
    /// Start one secondary command for a matched line.
    ///
    /// The implementation must guarantee that exactly one
    /// `SecondaryClosed` event is eventually delivered per call, even when
    /// the spawn itself fails.
    fn spawn_secondary(
        &mut self,
        command: String,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>>;

    /// Request termination of the primary command. Must be idempotent; a
    /// finished or never-started primary is a no-op.
    fn terminate_primary(&mut self) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>>;
}

/// Real spawner used in production.
pub struct RealSpawner {
    shell: String,
    separator: u8,
    events_tx: mpsc::Sender<DispatchEvent>,
    primary: Option<PrimaryHandle>,
}

impl RealSpawner {
    pub fn new(shell: String, events_tx: mpsc::Sender<DispatchEvent>) -> Self {
        Self {
            shell,
            separator: DEFAULT_SEPARATOR,
            events_tx,
            primary: None,
        }
    }

    /// Start the primary command. Called once, before the dispatcher loop.
    pub fn spawn_primary(&mut self, command: &str) -> Result<()> {
        let handle = command::spawn_primary(
            &self.shell,
            command,
            self.separator,
            self.events_tx.clone(),
        )?;
        self.primary = Some(handle);
        Ok(())
    }
}

impl SpawnerBackend for RealSpawner {
    fn spawn_secondary(
        &mut self,
        command: String,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        let shell = self.shell.clone();
        let separator = self.separator;
        let events_tx = self.events_tx.clone();

        Box::pin(async move {
            command::spawn_secondary(&shell, &command, separator, events_tx);
            Ok(())
        })
    }

    fn terminate_primary(&mut self) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        let primary = self.primary.clone();
        Box::pin(async move {
            if let Some(handle) = primary {
                handle.terminate();
            }
            Ok(())
        })
    }
}

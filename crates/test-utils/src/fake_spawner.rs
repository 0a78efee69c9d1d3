use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;

use outwatch::engine::DispatchEvent;
use outwatch::errors::Result;
use outwatch::exec::SpawnerBackend;

/// A fake spawner that:
/// - records every secondary command it was asked to run
/// - counts primary termination requests
/// - optionally emits `SecondaryClosed` immediately, simulating an execute
///   command that finishes on its own.
///
/// With `manual()` the test drives completion itself by sending
/// `SecondaryClosed` events on the dispatcher channel, which is how drain
/// and concurrency scenarios are exercised.
pub struct FakeSpawner {
    events_tx: mpsc::Sender<DispatchEvent>,
    spawned: Arc<Mutex<Vec<String>>>,
    terminations: Arc<AtomicUsize>,
    auto_complete_code: Option<i32>,
}

impl FakeSpawner {
    /// Auto-completing spawner: every spawn immediately reports exit code 0.
    pub fn new(events_tx: mpsc::Sender<DispatchEvent>) -> Self {
        Self {
            events_tx,
            spawned: Arc::new(Mutex::new(Vec::new())),
            terminations: Arc::new(AtomicUsize::new(0)),
            auto_complete_code: Some(0),
        }
    }

    /// Auto-complete each spawn with the given exit code instead of 0.
    pub fn completing_with(mut self, code: i32) -> Self {
        self.auto_complete_code = Some(code);
        self
    }

    /// Never auto-complete; the test sends `SecondaryClosed` itself.
    pub fn manual(mut self) -> Self {
        self.auto_complete_code = None;
        self
    }

    /// Shared handle to the list of spawned command strings.
    pub fn spawned_handle(&self) -> Arc<Mutex<Vec<String>>> {
        Arc::clone(&self.spawned)
    }

    /// Shared handle to the primary-termination counter.
    pub fn terminations_handle(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.terminations)
    }
}

impl SpawnerBackend for FakeSpawner {
    fn spawn_secondary(
        &mut self,
        command: String,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        let tx = self.events_tx.clone();
        let spawned = Arc::clone(&self.spawned);
        let auto_complete_code = self.auto_complete_code;

        Box::pin(async move {
            {
                let mut guard = spawned.lock().unwrap();
                guard.push(command);
            }

            if let Some(code) = auto_complete_code {
                tx.send(DispatchEvent::SecondaryClosed { code }).await?;
            }
            Ok(())
        })
    }

    fn terminate_primary(&mut self) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        let terminations = Arc::clone(&self.terminations);
        Box::pin(async move {
            terminations.fetch_add(1, Ordering::SeqCst);
            Ok(())
        })
    }
}

// src/exec/command.rs

use std::process::Stdio;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tokio::sync::{mpsc, Notify};
use tracing::{debug, error};

use crate::engine::{DispatchEvent, StreamSource};

/// Default line separator for pipe splitting.
pub const DEFAULT_SEPARATOR: u8 = b'\n';

/// Which process a pipe belongs to; decides the event variant emitted per
/// line.
#[derive(Debug, Clone, Copy)]
pub(crate) enum LineOrigin {
    Primary,
    Secondary,
}

/// Handle to the running primary command.
///
/// Holds only the termination signal; the child itself is owned by its
/// waiter task so the exit code can be observed exactly once.
#[derive(Debug, Clone)]
pub struct PrimaryHandle {
    kill: Arc<Notify>,
}

impl PrimaryHandle {
    /// Request forced termination. Idempotent: signalling an
    /// already-finished process is a no-op.
    pub fn terminate(&self) {
        self.kill.notify_one();
    }
}

/// Build a shell invocation appropriate for the platform.
fn shell_command(shell: &str, command: &str) -> Command {
    let mut cmd = if cfg!(windows) {
        let mut c = Command::new("cmd");
        c.arg("/C").arg(command);
        c
    } else {
        let mut c = Command::new(shell);
        c.arg("-c").arg(command);
        c
    };
    cmd.stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    cmd
}

/// Start the primary command and wire its pipes and exit into the event
/// channel. The returned handle is the only way to terminate it early.
pub fn spawn_primary(
    shell: &str,
    command: &str,
    separator: u8,
    events_tx: mpsc::Sender<DispatchEvent>,
) -> Result<PrimaryHandle> {
    let mut child = shell_command(shell, command)
        .spawn()
        .with_context(|| format!("spawning primary command '{command}'"))?;

    let readers = spawn_pipe_readers(&mut child, LineOrigin::Primary, separator, &events_tx);

    let kill = Arc::new(Notify::new());
    let handle = PrimaryHandle { kill: Arc::clone(&kill) };

    tokio::spawn(async move {
        let code = tokio::select! {
            status = child.wait() => exit_code_of(status),
            _ = kill.notified() => {
                debug!("terminating primary command");
                // start_kill fails when the child already exited; that's the
                // idempotent no-op case.
                let _ = child.start_kill();
                exit_code_of(child.wait().await)
            }
        };
        // Close follows the pipes: every produced line is delivered before
        // the completion event.
        for reader in readers {
            let _ = reader.await;
        }
        let _ = events_tx
            .send(DispatchEvent::PrimaryClosed { code })
            .await;
    });

    Ok(handle)
}

/// Start one secondary command in the background. Fire-and-forget: every
/// invocation eventually emits exactly one `SecondaryClosed` event, spawn
/// failures included (they surface as exit code -1, not as dispatcher
/// errors).
pub fn spawn_secondary(
    shell: &str,
    command: &str,
    separator: u8,
    events_tx: mpsc::Sender<DispatchEvent>,
) {
    let mut cmd = shell_command(shell, command);
    let command = command.to_string();

    tokio::spawn(async move {
        let mut child = match cmd.spawn() {
            Ok(child) => child,
            Err(err) => {
                error!(command = %command, error = %err, "failed to spawn execute command");
                let _ = events_tx
                    .send(DispatchEvent::SecondaryClosed { code: -1 })
                    .await;
                return;
            }
        };

        let readers = spawn_pipe_readers(&mut child, LineOrigin::Secondary, separator, &events_tx);

        let code = exit_code_of(child.wait().await);
        for reader in readers {
            let _ = reader.await;
        }
        let _ = events_tx
            .send(DispatchEvent::SecondaryClosed { code })
            .await;
    });
}

fn spawn_pipe_readers(
    child: &mut tokio::process::Child,
    origin: LineOrigin,
    separator: u8,
    events_tx: &mpsc::Sender<DispatchEvent>,
) -> Vec<tokio::task::JoinHandle<()>> {
    let mut readers = Vec::with_capacity(2);
    if let Some(stdout) = child.stdout.take() {
        readers.push(spawn_line_reader(
            stdout,
            origin,
            StreamSource::Stdout,
            separator,
            events_tx.clone(),
        ));
    }
    if let Some(stderr) = child.stderr.take() {
        readers.push(spawn_line_reader(
            stderr,
            origin,
            StreamSource::Stderr,
            separator,
            events_tx.clone(),
        ));
    }
    readers
}

/// Split one pipe into lines on `separator` and forward each as an event.
/// Lines are delivered in production order; the task ends when the pipe
/// closes.
fn spawn_line_reader<R>(
    stream: R,
    origin: LineOrigin,
    source: StreamSource,
    separator: u8,
    events_tx: mpsc::Sender<DispatchEvent>,
) -> tokio::task::JoinHandle<()>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut segments = BufReader::new(stream).split(separator);
        while let Ok(Some(segment)) = segments.next_segment().await {
            let text = String::from_utf8_lossy(&segment).into_owned();
            let event = match origin {
                LineOrigin::Primary => DispatchEvent::PrimaryLine { source, text },
                LineOrigin::Secondary => DispatchEvent::SecondaryLine { source, text },
            };
            if events_tx.send(event).await.is_err() {
                break;
            }
        }
    })
}

fn exit_code_of(status: std::io::Result<std::process::ExitStatus>) -> i32 {
    match status {
        Ok(status) => status.code().unwrap_or(-1),
        Err(err) => {
            error!(error = %err, "waiting on child process failed");
            -1
        }
    }
}

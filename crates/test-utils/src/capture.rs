use std::sync::{Arc, Mutex};

use outwatch::relay::RelaySink;

/// Relay sink that records lines instead of printing them.
///
/// Clones share the underlying buffers, so a test can keep one handle while
/// the dispatcher owns another.
#[derive(Clone, Default)]
pub struct CapturingRelay {
    pub stdout: Arc<Mutex<Vec<String>>>,
    pub stderr: Arc<Mutex<Vec<String>>>,
}

impl CapturingRelay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stdout_lines(&self) -> Vec<String> {
        self.stdout.lock().unwrap().clone()
    }

    pub fn stderr_lines(&self) -> Vec<String> {
        self.stderr.lock().unwrap().clone()
    }
}

impl RelaySink for CapturingRelay {
    fn stdout_line(&mut self, line: &str) {
        self.stdout.lock().unwrap().push(line.to_string());
    }

    fn stderr_line(&mut self, line: &str) {
        self.stderr.lock().unwrap().push(line.to_string());
    }
}

// src/exec/mod.rs

//! Process spawning layer.
//!
//! This module owns all interaction with real OS processes, using
//! `tokio::process::Command`, and reports back to the dispatcher via
//! [`DispatchEvent`](crate::engine::DispatchEvent)s.
//!
//! - [`command`] runs the primary and secondary processes and splits their
//!   pipes into line events.
//! - [`backend`] holds the [`SpawnerBackend`] trait the dispatcher talks to,
//!   so tests can substitute a fake spawner.

pub mod backend;
pub mod command;

pub use backend::{RealSpawner, SpawnerBackend};

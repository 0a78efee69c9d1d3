// src/engine/mod.rs

//! Match-and-dispatch engine.
//!
//! The [`dispatcher`] module owns the coordinator state machine that reacts
//! to:
//! - lines from the primary command (relay + pattern test + spawn decision)
//! - lines from secondary commands (relay only)
//! - primary and secondary completion events (exit-code resolution, drain)

pub mod dispatcher;

pub use dispatcher::{
    DispatchEvent, Dispatcher, DispatcherOptions, StreamSource,
};

//! Overlay demo
//!
//! Line-driven stand-in for a host app screen. Commands typed at the prompt
//! call the consumer API or inject the signals the native layer would send,
//! and a simulated window shows what would be on screen.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod commands;
pub mod session;

pub use commands::Command;
pub use session::{DemoError, DemoSession, Flow, sample_trip};

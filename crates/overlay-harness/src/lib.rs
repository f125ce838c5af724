//! Deterministic test harness for the overlay core.
//!
//! Simulated implementations of the [`overlay_core::Renderer`] and
//! [`overlay_core::PermissionProvider`] traits with call recording and fault
//! injection, plus a reference model used by the property tests.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod model;
pub mod sim_permission;
pub mod sim_renderer;

pub use model::{ModelOutcome, ModelOverlay, Operation, trip_details};
pub use sim_permission::{GrantBehavior, SimPermission};
pub use sim_renderer::{RendererCall, RendererOp, SimRenderer};

//! Overlay lifecycle core
//!
//! Coordinates a single system overlay window that is either a compact bubble
//! or a detailed trip card, driven by consumer requests, taps reported by the
//! window itself, and the host app moving between foreground and background.
//!
//! # Architecture
//!
//! The window and the OS permission are external collaborators reached through
//! the [`Renderer`] and [`PermissionProvider`] traits. Everything else is
//! in-memory state owned by the [`OverlayCoordinator`], which commits a new
//! state only after the renderer confirms it.
//!
//! Inbound signals (native events, app state changes) are queued through a
//! [`SignalSender`] and handled one at a time by the [`OverlayRuntime`].
//! External observers subscribe to native events via the [`EventRouter`].
//!
//! # Components
//!
//! - [`OverlayService`]: composition root and consumer API
//! - [`OverlayCoordinator`]: state machine (show/hide protocols, rollback)
//! - [`PermissionGate`]: permission check before every show
//! - [`EventRouter`]: subscription tokens for native events
//! - [`LifecycleObserver`]: foreground detection
//! - [`OverlayRuntime`]: inbound signal loop

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod config;
pub mod coordinator;
pub mod error;
pub mod event;
pub mod lifecycle;
pub mod model;
pub mod permission;
pub mod renderer;
pub mod router;
pub mod runtime;
pub mod service;

pub use config::{HideFailurePolicy, OverlayConfig};
pub use coordinator::OverlayCoordinator;
pub use error::{OverlayError, RenderError, SignalError};
pub use event::{OverlayEvent, OverlayEventKind, Signal};
pub use lifecycle::{AppState, LifecycleObserver};
pub use model::{
    BubbleContext, CardUpdate, OverlaySnapshot, OverlayState, OverlayUpdate, OverlayVariant,
    TripDetails,
};
pub use permission::{PermissionGate, PermissionProvider, PermissionStatus};
pub use renderer::Renderer;
pub use router::{EventRouter, Handler, Subscription};
pub use runtime::{OverlayRuntime, SignalSender};
pub use service::OverlayService;

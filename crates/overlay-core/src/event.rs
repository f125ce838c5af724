//! Inbound signals.
//!
//! Native events come from the rendering layer (taps and buttons on the
//! overlay window). App state transitions come from the host platform. Both
//! travel through the same channel to the runtime.

use std::{fmt, str::FromStr};

use crate::{error::SignalError, lifecycle::AppState};

/// Name of a native overlay event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OverlayEventKind {
    /// Bubble tapped.
    BubbleClicked,
    /// Accept button on the card.
    TripAccepted,
    /// Card dismissed without a decision.
    TripIgnored,
    /// Decline button on the card.
    TripDeclined,
}

impl OverlayEventKind {
    /// All event kinds.
    pub const ALL: [Self; 4] =
        [Self::BubbleClicked, Self::TripAccepted, Self::TripIgnored, Self::TripDeclined];

    /// Name used by the native bridge.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::BubbleClicked => "onBubbleClicked",
            Self::TripAccepted => "onTripAccepted",
            Self::TripIgnored => "onTripIgnored",
            Self::TripDeclined => "onTripDeclined",
        }
    }
}

impl fmt::Display for OverlayEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OverlayEventKind {
    type Err = SignalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| SignalError::UnknownEvent(s.to_string()))
    }
}

/// Native overlay event with its payload.
#[derive(Debug, Clone, PartialEq)]
pub enum OverlayEvent {
    /// Bubble tapped.
    BubbleClicked,

    /// Trip accepted.
    TripAccepted {
        /// Final fare, when the native layer reports one.
        final_fare: Option<f64>,
    },

    /// Trip ignored.
    TripIgnored,

    /// Trip declined.
    TripDeclined,
}

impl OverlayEvent {
    /// Build an event from its bridge name and optional fare payload.
    ///
    /// The fare is ignored for events other than `onTripAccepted`.
    pub fn from_native(name: &str, final_fare: Option<f64>) -> Result<Self, SignalError> {
        Ok(match name.parse::<OverlayEventKind>()? {
            OverlayEventKind::BubbleClicked => Self::BubbleClicked,
            OverlayEventKind::TripAccepted => Self::TripAccepted { final_fare },
            OverlayEventKind::TripIgnored => Self::TripIgnored,
            OverlayEventKind::TripDeclined => Self::TripDeclined,
        })
    }

    /// Kind of this event.
    pub fn kind(&self) -> OverlayEventKind {
        match self {
            Self::BubbleClicked => OverlayEventKind::BubbleClicked,
            Self::TripAccepted { .. } => OverlayEventKind::TripAccepted,
            Self::TripIgnored => OverlayEventKind::TripIgnored,
            Self::TripDeclined => OverlayEventKind::TripDeclined,
        }
    }
}

/// Anything the runtime reacts to.
#[derive(Debug, Clone, PartialEq)]
pub enum Signal {
    /// Event from the overlay window.
    Native(OverlayEvent),
    /// App lifecycle transition.
    AppState(AppState),
}

//! Overlay data model.
//!
//! The overlay is either a compact bubble carrying a badge count or a detailed
//! trip card. "No overlay" is represented by `Option::<OverlayVariant>::None`
//! wherever a current variant is stored.

/// Trip information displayed on the card and cached behind the bubble.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TripDetails {
    /// Pickup address.
    pub pickup_address: String,
    /// Dropoff address.
    pub dropoff_address: String,
    /// Trip distance, formatted for display.
    pub distance: String,
    /// Trip duration, formatted for display.
    pub duration: String,
    /// Base fare, formatted for display.
    pub base_fare: String,
    /// Customer name.
    pub customer_name: String,
    /// Requested car type.
    pub car_type: String,
}

impl TripDetails {
    /// Apply the fields present in `update`, leaving the rest untouched.
    pub fn apply(&mut self, update: &CardUpdate) {
        if let Some(fare) = &update.base_fare {
            self.base_fare.clone_from(fare);
        }
        if let Some(pickup) = &update.pickup_address {
            self.pickup_address.clone_from(pickup);
        }
        if let Some(dropoff) = &update.dropoff_address {
            self.dropoff_address.clone_from(dropoff);
        }
    }
}

/// Content of the overlay window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OverlayVariant {
    /// Compact bubble.
    Bubble {
        /// Badge shown on the bubble. Zero hides the badge.
        badge_count: u32,
    },

    /// Detailed trip card.
    Card(TripDetails),
}

impl OverlayVariant {
    /// Coordinator state corresponding to this variant being displayed.
    pub fn state(&self) -> OverlayState {
        match self {
            Self::Bubble { .. } => OverlayState::ShowingBubble,
            Self::Card(_) => OverlayState::ShowingCard,
        }
    }
}

/// Coordinator state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayState {
    /// No overlay displayed.
    Hidden,
    /// Bubble displayed.
    ShowingBubble,
    /// Trip card displayed.
    ShowingCard,
}

impl OverlayState {
    /// State for an optional current variant.
    pub fn of(current: Option<&OverlayVariant>) -> Self {
        current.map_or(Self::Hidden, OverlayVariant::state)
    }
}

/// Last `(trip, badge_count)` pair supplied to a bubble show request.
///
/// Kept independently of the displayed variant so the bubble can be restored
/// after the card is dismissed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BubbleContext {
    /// Trip the bubble stands for.
    pub trip: TripDetails,
    /// Badge count to restore.
    pub badge_count: u32,
}

/// Fields of a visible card that can be updated in place.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CardUpdate {
    /// New base fare.
    pub base_fare: Option<String>,
    /// New pickup address.
    pub pickup_address: Option<String>,
    /// New dropoff address.
    pub dropoff_address: Option<String>,
}

/// Partial update applied to the visible overlay without a hide/show cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OverlayUpdate {
    /// Change the bubble badge.
    Badge {
        /// New badge count.
        badge_count: u32,
    },

    /// Change card fields.
    Card(CardUpdate),
}

/// Copy of the coordinator's state.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OverlaySnapshot {
    /// Variant currently recorded as displayed.
    pub current: Option<OverlayVariant>,
    /// Cached bubble context.
    pub bubble_context: Option<BubbleContext>,
}

impl OverlaySnapshot {
    /// State derived from the current variant.
    pub fn state(&self) -> OverlayState {
        OverlayState::of(self.current.as_ref())
    }
}

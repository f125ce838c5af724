//! Command parsing for the demo prompt.
//!
//! Each line of input is parsed into a [`Command`]. Commands start with `/`.

use overlay_core::AppState;

/// Parsed command from user input.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Report whether the overlay permission is granted.
    CheckPermission,

    /// Open the permission grant flow.
    RequestPermission,

    /// Show the bubble for the sample trip.
    ShowBubble {
        /// Badge count.
        badge_count: u32,
    },

    /// Show the card for the sample trip.
    ShowCard,

    /// Hide the overlay.
    Hide,

    /// Change the badge of the visible bubble.
    UpdateBadge {
        /// New badge count.
        badge_count: u32,
    },

    /// Change the fare on the visible card.
    UpdateFare {
        /// New fare, formatted for display.
        fare: String,
    },

    /// Simulate a tap on the bubble.
    Click,

    /// Simulate the accept button.
    Accept {
        /// Final fare reported with the event.
        final_fare: Option<f64>,
    },

    /// Simulate the ignore button.
    Ignore,

    /// Simulate the decline button.
    Decline,

    /// Simulate the host app changing state.
    AppState(AppState),

    /// Log the recorded overlay state.
    State,

    /// Log the list of commands.
    Help,

    /// Quit the demo.
    Quit,

    /// Blank line.
    Empty,

    /// Unknown or invalid command.
    Unknown {
        /// The original input.
        input: String,
    },

    /// Command with missing or invalid arguments.
    InvalidArgs {
        /// Command name.
        command: String,
        /// Error message.
        error: String,
    },
}

/// One line per command, for `/help`.
pub const HELP: &[&str] = &[
    "/check            report the overlay permission",
    "/request          open the permission grant flow",
    "/bubble <n>       show the bubble with badge n",
    "/card             show the trip card",
    "/hide             hide the overlay",
    "/badge <n>        set the bubble badge to n",
    "/fare <amount>    set the fare on the card",
    "/click            tap the bubble",
    "/accept [fare]    accept the trip",
    "/ignore           ignore the trip",
    "/decline          decline the trip",
    "/fg /bg /inactive move the app between states",
    "/state            show the recorded state",
    "/quit             exit",
];

/// Parse a user input string into a command.
pub fn parse(input: &str) -> Command {
    let input = input.trim();

    if input.is_empty() {
        return Command::Empty;
    }

    let Some(cmd_str) = input.strip_prefix('/') else {
        return Command::Unknown { input: input.to_string() };
    };

    let parts: Vec<&str> = cmd_str.split_whitespace().collect();
    let command = parts.first().copied().unwrap_or("");

    match command {
        "check" => Command::CheckPermission,
        "request" => Command::RequestPermission,

        "bubble" => match parts.get(1) {
            Some(n) => match n.parse::<u32>() {
                Ok(badge_count) => Command::ShowBubble { badge_count },
                Err(_) => invalid("bubble", "Invalid badge count"),
            },
            None => Command::ShowBubble { badge_count: 1 },
        },

        "card" => Command::ShowCard,
        "hide" => Command::Hide,

        "badge" => match parts.get(1) {
            Some(n) => match n.parse::<u32>() {
                Ok(badge_count) => Command::UpdateBadge { badge_count },
                Err(_) => invalid("badge", "Invalid badge count"),
            },
            None => invalid("badge", "Usage: /badge <n>"),
        },

        "fare" => match parts.get(1) {
            Some(fare) => Command::UpdateFare { fare: (*fare).to_string() },
            None => invalid("fare", "Usage: /fare <amount>"),
        },

        "click" => Command::Click,

        "accept" => match parts.get(1) {
            Some(fare) => match fare.parse::<f64>() {
                Ok(fare) if fare.is_finite() => Command::Accept { final_fare: Some(fare) },
                _ => invalid("accept", "Invalid fare"),
            },
            None => Command::Accept { final_fare: None },
        },

        "ignore" => Command::Ignore,
        "decline" => Command::Decline,

        "fg" => Command::AppState(AppState::Active),
        "bg" => Command::AppState(AppState::Background),
        "inactive" => Command::AppState(AppState::Inactive),

        "state" => Command::State,
        "help" | "h" => Command::Help,
        "quit" | "q" => Command::Quit,

        _ => Command::Unknown { input: input.to_string() },
    }
}

fn invalid(command: &str, error: &str) -> Command {
    Command::InvalidArgs { command: command.into(), error: error.into() }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_bubble() {
        assert_eq!(parse("/bubble 3"), Command::ShowBubble { badge_count: 3 });
        assert_eq!(parse("/bubble"), Command::ShowBubble { badge_count: 1 });
    }

    #[test]
    fn parse_bubble_invalid_count() {
        let parsed = parse("/bubble -2");
        assert!(matches!(parsed, Command::InvalidArgs { command, .. } if command == "bubble"));
    }

    #[test]
    fn parse_badge_missing_count() {
        let parsed = parse("/badge");
        assert!(matches!(parsed, Command::InvalidArgs { command, .. } if command == "badge"));
    }

    #[test]
    fn parse_accept_with_and_without_fare() {
        assert_eq!(parse("/accept"), Command::Accept { final_fare: None });
        assert_eq!(parse("/accept 42.5"), Command::Accept { final_fare: Some(42.5) });
    }

    #[test]
    fn parse_accept_rejects_non_finite_fare() {
        for input in ["/accept nan", "/accept inf", "/accept -infinity", "/accept abc"] {
            let parsed = parse(input);
            assert!(
                matches!(&parsed, Command::InvalidArgs { command, .. } if command == "accept"),
                "{input} parsed as {parsed:?}"
            );
        }
    }

    #[test]
    fn parse_app_states() {
        assert_eq!(parse("/fg"), Command::AppState(AppState::Active));
        assert_eq!(parse("/bg"), Command::AppState(AppState::Background));
        assert_eq!(parse("/inactive"), Command::AppState(AppState::Inactive));
    }

    #[test]
    fn parse_fare() {
        assert_eq!(parse("/fare ₹75"), Command::UpdateFare { fare: "₹75".into() });
    }

    #[test]
    fn parse_quit() {
        assert_eq!(parse("/quit"), Command::Quit);
        assert_eq!(parse("/q"), Command::Quit);
    }

    #[test]
    fn parse_plain_text_is_unknown() {
        assert_eq!(parse("show it"), Command::Unknown { input: "show it".into() });
        assert!(matches!(parse("/explode"), Command::Unknown { .. }));
    }

    #[test]
    fn parse_empty() {
        assert_eq!(parse("   "), Command::Empty);
    }
}

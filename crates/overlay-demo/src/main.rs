//! Overlay demo
//!
//! Reads commands from stdin and drives an overlay service backed by a
//! simulated window. Type `/help` for the command list.

use std::time::Duration;

use clap::{Parser, ValueEnum};
use overlay_core::{HideFailurePolicy, OverlayConfig, OverlayService, OverlayState};
use overlay_demo::{DemoError, DemoSession, Flow, commands};
use overlay_harness::{GrantBehavior, SimPermission, SimRenderer};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// Initial state of the overlay permission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum PermissionArg {
    Granted,
    Denied,
}

/// What a failed hide does to the recorded state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum HideFailureArg {
    Retain,
    Force,
}

impl From<HideFailureArg> for HideFailurePolicy {
    fn from(arg: HideFailureArg) -> Self {
        match arg {
            HideFailureArg::Retain => Self::RetainState,
            HideFailureArg::Force => Self::ForceHidden,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "overlay-demo", version, about = "Drive the overlay coordinator from a prompt")]
struct Args {
    /// Log level when RUST_LOG is not set
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Initial overlay permission
    #[arg(long, value_enum, default_value_t = PermissionArg::Granted)]
    permission: PermissionArg,

    /// Grant the permission as soon as the grant flow opens
    #[arg(long)]
    auto_grant: bool,

    /// Delay added to every window operation, in milliseconds
    #[arg(long, default_value_t = 0)]
    latency_ms: u64,

    /// Probability that a window operation fails
    #[arg(long, default_value_t = 0.0)]
    failure_rate: f64,

    /// Seed for injected failures
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Do not re-show the overlay when the app returns to the foreground
    #[arg(long)]
    no_reassert: bool,

    /// What a failed hide does to the recorded state
    #[arg(long, value_enum, default_value_t = HideFailureArg::Retain)]
    hide_failure: HideFailureArg,
}

impl Args {
    fn config(&self) -> OverlayConfig {
        OverlayConfig {
            reassert_on_foreground: !self.no_reassert,
            hide_failure: self.hide_failure.into(),
            ..Default::default()
        }
    }

    fn permission(&self) -> SimPermission {
        match self.permission {
            PermissionArg::Granted => SimPermission::granted(),
            PermissionArg::Denied if self.auto_grant => {
                SimPermission::denied(GrantBehavior::Immediate)
            },
            PermissionArg::Denied => SimPermission::denied(GrantBehavior::Never),
        }
    }
}

fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();
}

#[tokio::main]
async fn main() -> Result<(), DemoError> {
    let args = Args::parse();
    init_tracing(&args.log_level);

    let permission = args.permission();
    let renderer = SimRenderer::new()
        .with_permission(permission.clone())
        .with_latency(Duration::from_millis(args.latency_ms))
        .with_failure_rate(args.failure_rate, args.seed);

    let (service, runtime) = OverlayService::new(renderer, permission, &args.config());
    let runtime_task = tokio::spawn(runtime.run());

    let session = DemoSession::new(service);
    let _subscriptions = session.watch_events();
    info!("overlay demo ready, type /help for commands");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match session.execute(commands::parse(&line)).await {
            Ok(Flow::Continue) => {},
            Ok(Flow::Quit) => break,
            Err(e) => warn!(error = %e, "command failed"),
        }
    }

    let state = session.service().state().await;
    if state != OverlayState::Hidden {
        info!(?state, "hiding overlay before exit");
    }
    if let Err(e) = session.shutdown().await {
        error!(error = %e, "failed to hide overlay on exit");
    }
    if let Err(e) = runtime_task.await {
        error!(error = %e, "overlay runtime task failed");
    }

    info!("overlay demo stopped");
    Ok(())
}

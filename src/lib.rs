//! facecue - landmark stream classification
//!
//! Turns per-frame face and hand landmarks from an external pose-estimation
//! model into debounced hand proximity states, two-hand gestures, and facial
//! expressions, after a one-time facial calibration.

pub mod calibration;
pub mod config;
pub mod confirmation;
pub mod expression;
pub mod geometry;
pub mod gesture;
pub mod landmarks;
pub mod proximity;
pub mod registry;
pub mod session;

pub use calibration::{BaselineKey, CalibrationProfile, Calibrator};
pub use config::{Config, ConfigError};
pub use confirmation::{ConfirmationMachine, StateChange};
pub use expression::Expression;
pub use geometry::Point3;
pub use gesture::Gesture;
pub use landmarks::{
    FaceLandmarks, Frame, Hand, HandLandmarks, LandmarkError, PerHand, RawFrame,
};
pub use proximity::{HandProximity, ProximityThresholds};
pub use registry::{SessionError, SessionRegistry};
pub use session::{CalibrationStatus, FrameResult, Session, SessionStatus};

/// Install the global tracing subscriber
///
/// Logs go to stderr and, when the log directory is writable, to
/// `~/.facecue/logs/facecue-debug.log`. `RUST_LOG` overrides the default
/// `info` filter.
pub fn init_logging() {
    use tracing_subscriber::prelude::*;

    /// Format timestamps using the system's local time via chrono
    struct LocalTimer;
    impl tracing_subscriber::fmt::time::FormatTime for LocalTimer {
        fn format_time(
            &self,
            w: &mut tracing_subscriber::fmt::format::Writer<'_>,
        ) -> std::fmt::Result {
            write!(w, "{}", chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f"))
        }
    }

    let log_dir = config::get_config_dir().join("logs");
    let _ = std::fs::create_dir_all(&log_dir);
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_dir.join("facecue-debug.log"))
        .ok();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    // Stdout is reserved for results in the replay binary, so logs use stderr
    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_timer(LocalTimer);

    if let Some(file) = log_file {
        let file_layer = tracing_subscriber::fmt::layer()
            .with_writer(std::sync::Mutex::new(file))
            .with_timer(LocalTimer)
            .with_ansi(false);
        let _ = tracing_subscriber::registry()
            .with(filter)
            .with(stderr_layer)
            .with(file_layer)
            .try_init();
    } else {
        let _ = tracing_subscriber::registry()
            .with(filter)
            .with(stderr_layer)
            .try_init();
    }
}

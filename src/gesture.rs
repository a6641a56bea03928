//! Two-handed gesture detection
//!
//! Compares each fingertip of the right hand with the same fingertip of the
//! left hand. When the tips are, on average, close together the hands are
//! held in a mirrored pose and a gesture is reported.

use crate::config::GestureConfig;
use crate::geometry::distance;
use crate::landmarks::{HandLandmarks, FINGERTIPS};
use serde::{Deserialize, Serialize};

/// Recognised two-hand gesture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gesture {
    /// Matching fingertips of both hands touching
    HandsTogether,
}

impl Gesture {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gesture::HandsTogether => "hands_together",
        }
    }
}

/// Mean distance between corresponding fingertips of two hands
pub fn mean_fingertip_distance(right: &HandLandmarks, left: &HandLandmarks) -> f64 {
    let total: f64 = FINGERTIPS
        .iter()
        .map(|&tip| distance(right.point(tip), left.point(tip)))
        .sum();
    total / FINGERTIPS.len() as f64
}

/// Detect a gesture from both hands; either hand missing means no gesture
pub fn detect_gesture(
    right: Option<&HandLandmarks>,
    left: Option<&HandLandmarks>,
    config: &GestureConfig,
) -> Option<Gesture> {
    let (right, left) = (right?, left?);
    let mean = mean_fingertip_distance(right, left);
    tracing::debug!("Mean fingertip distance: {:.4}", mean);

    if mean < config.hands_together_threshold {
        Some(Gesture::HandsTogether)
    } else {
        None
    }
}

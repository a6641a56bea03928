//! Hand-to-face proximity classification
//!
//! Each frame, every detected hand is classified as near to or far from the
//! face. The thresholds adapt to how close the face is to the camera: a
//! close face makes the same physical movement look larger on the image
//! plane, so depth is weighted more heavily and planar distance less.

use crate::config::ProximityConfig;
use crate::geometry::{midpoint, planar_distance, Point3};
use crate::landmarks::{
    FaceLandmarks, HandLandmarks, PerHand, INDEX_TIP, LEFT_EYE_OUTER, RIGHT_EYE_OUTER, WRIST,
};
use serde::{Deserialize, Serialize};

/// Proximity of a hand to the face
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HandProximity {
    Near,
    Far,
}

impl HandProximity {
    pub fn as_str(&self) -> &'static str {
        match self {
            HandProximity::Near => "near",
            HandProximity::Far => "far",
        }
    }
}

impl std::fmt::Display for HandProximity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Distance limits for one frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProximityThresholds {
    /// Planar distance below which a hand is near
    pub planar: f64,
    /// Depth difference below which a hand is near
    pub depth: f64,
}

impl ProximityThresholds {
    pub fn new(planar: f64, depth: f64) -> Self {
        Self { planar, depth }
    }

    /// Derive thresholds from the face's estimated depth
    pub fn for_face_depth(face_depth: f64, config: &ProximityConfig) -> Self {
        let weight_z = (face_depth.abs() * config.depth_weight_gain).min(config.max_depth_weight);
        let weight_xy = 1.0 - weight_z;
        Self {
            planar: (config.base_planar_threshold * weight_xy).max(config.min_planar_threshold),
            depth: (config.base_depth_threshold * weight_z).max(config.min_depth_threshold),
        }
    }
}

/// Reference point of a face: midpoint of the outer eye corners
pub fn face_reference(face: &FaceLandmarks) -> Point3 {
    midpoint(face.point(RIGHT_EYE_OUTER), face.point(LEFT_EYE_OUTER))
}

/// Reference point of a hand: midpoint of wrist and index fingertip
pub fn hand_reference(hand: &HandLandmarks) -> Point3 {
    midpoint(hand.point(WRIST), hand.point(INDEX_TIP))
}

/// Classify a single hand against the face
///
/// The depth check takes priority: a hand at the face's depth is near no
/// matter how far away it is on the image plane.
pub fn classify(face: Point3, hand: Point3, thresholds: ProximityThresholds) -> HandProximity {
    let depth_diff = (face.z - hand.z).abs();
    if depth_diff < thresholds.depth {
        return HandProximity::Near;
    }
    if planar_distance(face, hand) < thresholds.planar {
        HandProximity::Near
    } else {
        HandProximity::Far
    }
}

/// Classify every available hand; absent hands get no entry
pub fn classify_hands(
    face: Point3,
    hands: &PerHand<Point3>,
    thresholds: ProximityThresholds,
) -> PerHand<HandProximity> {
    hands.map(|&hand| classify(face, hand, thresholds))
}

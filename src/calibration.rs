//! One-time facial calibration
//!
//! Captures a baseline from the first frame with a detected face: the
//! vertical position of the eye line and each eyebrow's offset above it.
//! Brow offsets are measured relative to the eye line so that small head
//! tilts partially cancel out.
//!
//! The baseline gates expression detection. It lives only as long as the
//! session that owns it.

use crate::landmarks::{FaceLandmarks, LEFT_BROW, LEFT_EYE_OUTER, RIGHT_BROW, RIGHT_EYE_OUTER};
use serde::{Deserialize, Serialize};

/// Key naming one baseline measurement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BaselineKey {
    EyeCenterY,
    BrowDistRight,
    BrowDistLeft,
}

impl BaselineKey {
    pub const ALL: [BaselineKey; 3] = [
        BaselineKey::EyeCenterY,
        BaselineKey::BrowDistRight,
        BaselineKey::BrowDistLeft,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BaselineKey::EyeCenterY => "eye_center_y",
            BaselineKey::BrowDistRight => "brow_dist_right",
            BaselineKey::BrowDistLeft => "brow_dist_left",
        }
    }

    pub fn parse(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.as_str() == key)
    }
}

/// A complete calibration baseline
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CalibrationProfile {
    pub eye_center_y: f64,
    pub brow_dist_right: f64,
    pub brow_dist_left: f64,
}

impl CalibrationProfile {
    /// Measure a baseline from a face mesh
    pub fn from_face(face: &FaceLandmarks) -> Self {
        let eye_center_y = (face.point(RIGHT_EYE_OUTER).y + face.point(LEFT_EYE_OUTER).y) / 2.0;
        Self {
            eye_center_y,
            brow_dist_right: eye_center_y - face.point(RIGHT_BROW).y,
            brow_dist_left: eye_center_y - face.point(LEFT_BROW).y,
        }
    }

    pub fn value(&self, key: BaselineKey) -> f64 {
        match key {
            BaselineKey::EyeCenterY => self.eye_center_y,
            BaselineKey::BrowDistRight => self.brow_dist_right,
            BaselineKey::BrowDistLeft => self.brow_dist_left,
        }
    }
}

/// Holds the session's calibration baseline, if one has been captured
#[derive(Debug, Clone, Default)]
pub struct Calibrator {
    profile: Option<CalibrationProfile>,
}

impl Calibrator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_calibrated(&self) -> bool {
        self.profile.is_some()
    }

    /// Capture a baseline, replacing any previous one
    pub fn calibrate(&mut self, face: &FaceLandmarks) {
        let profile = CalibrationProfile::from_face(face);
        self.profile = Some(profile);
        tracing::info!(
            "Calibration captured: eye_center_y={:.4}, brow_dist_right={:.4}, brow_dist_left={:.4}",
            profile.eye_center_y,
            profile.brow_dist_right,
            profile.brow_dist_left
        );
    }

    /// Look up a baseline value by key name
    ///
    /// Unknown keys and an uncalibrated session both yield `None`.
    pub fn get(&self, key: &str) -> Option<f64> {
        let key = BaselineKey::parse(key)?;
        self.profile.map(|p| p.value(key))
    }

    pub fn profile(&self) -> Option<&CalibrationProfile> {
        self.profile.as_ref()
    }

    pub fn reset(&mut self) {
        if self.profile.take().is_some() {
            tracing::info!("Calibration reset");
        }
    }
}

//! Per-session frame processing
//!
//! A [`Session`] owns all state that survives between frames: the
//! calibration baseline and the per-hand debounce state. Each call to
//! [`Session::process`] runs the pipeline for one frame:
//!
//! 1. Face reference point and adaptive proximity thresholds
//! 2. Hand reference points for every detected hand
//! 3. Proximity classification
//! 4. Debounce, collecting confirmed state changes
//! 5. Gesture detection when both hands are present
//! 6. Expression detection if calibrated, otherwise calibration capture
//!
//! Without a face none of the steps run and hand states stay as they were.

use crate::calibration::Calibrator;
use crate::config::Config;
use crate::confirmation::{ConfirmationMachine, StateChange};
use crate::expression::{detect_expressions, Expression};
use crate::gesture::{detect_gesture, Gesture};
use crate::landmarks::{Frame, PerHand};
use crate::proximity::{
    classify_hands, face_reference, hand_reference, HandProximity, ProximityThresholds,
};
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Calibration progress as reported to callers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CalibrationStatus {
    /// No baseline yet and none captured by this frame
    Uncalibrated,
    /// The baseline was captured by this frame
    Calibrating,
    /// A baseline exists
    Calibrated,
}

/// Which landmark sets were present in a frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LandmarksDetected {
    pub face: bool,
    pub right_hand: bool,
    pub left_hand: bool,
}

impl LandmarksDetected {
    fn of(frame: &Frame) -> Self {
        Self {
            face: frame.face.is_some(),
            right_hand: frame.hands.right.is_some(),
            left_hand: frame.hands.left.is_some(),
        }
    }
}

/// Outcome of processing one frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameResult {
    /// Confirmed hand states after this frame
    pub hand_statuses: PerHand<HandProximity>,
    /// Gesture recognised in this frame
    pub gesture: Option<Gesture>,
    /// Expressions recognised in this frame, in detection order
    pub expressions: Vec<Expression>,
    pub calibration_status: CalibrationStatus,
    /// Hand state changes confirmed by this frame
    pub state_changes: Vec<StateChange>,
    pub landmarks_detected: LandmarksDetected,
}

/// Snapshot of a session for status queries
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SessionStatus {
    pub calibration_status: CalibrationStatus,
    pub hand_statuses: PerHand<HandProximity>,
}

/// State and pipeline for one user's landmark stream
#[derive(Debug, Clone)]
pub struct Session {
    config: Config,
    calibrator: Calibrator,
    confirmation: ConfirmationMachine,
}

impl Session {
    /// Creates a session with default thresholds
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    pub fn with_config(config: Config) -> Self {
        Self {
            confirmation: ConfirmationMachine::new(&config.confirmation),
            calibrator: Calibrator::new(),
            config,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn calibrator(&self) -> &Calibrator {
        &self.calibrator
    }

    pub fn hand_statuses(&self) -> PerHand<HandProximity> {
        self.confirmation.confirmed()
    }

    fn settled_calibration_status(&self) -> CalibrationStatus {
        if self.calibrator.is_calibrated() {
            CalibrationStatus::Calibrated
        } else {
            CalibrationStatus::Uncalibrated
        }
    }

    /// Run the pipeline for one frame observed at `now`
    pub fn process(&mut self, frame: &Frame, now: Instant) -> FrameResult {
        let landmarks_detected = LandmarksDetected::of(frame);

        let Some(face) = frame.face.as_ref() else {
            tracing::debug!("No face in frame, hand states frozen");
            return FrameResult {
                hand_statuses: self.hand_statuses(),
                gesture: None,
                expressions: Vec::new(),
                calibration_status: self.settled_calibration_status(),
                state_changes: Vec::new(),
                landmarks_detected,
            };
        };

        let face_point = face_reference(face);
        let thresholds = ProximityThresholds::for_face_depth(face_point.z, &self.config.proximity);

        let hand_points = frame.hands.map(hand_reference);
        let readings = classify_hands(face_point, &hand_points, thresholds);
        tracing::debug!(
            "Proximity readings: right={:?}, left={:?} (planar={:.3}, depth={:.3})",
            readings.right,
            readings.left,
            thresholds.planar,
            thresholds.depth
        );

        let state_changes = self.confirmation.observe(&readings, now);

        let gesture = detect_gesture(
            frame.hands.right.as_ref(),
            frame.hands.left.as_ref(),
            &self.config.gesture,
        );
        if let Some(gesture) = gesture {
            tracing::info!("Gesture detected: {}", gesture.as_str());
        }

        let (expressions, calibration_status) = if self.calibrator.is_calibrated() {
            let expressions = detect_expressions(
                face,
                &self.calibrator,
                &frame.hands,
                &self.config.expression,
            );
            (expressions, CalibrationStatus::Calibrated)
        } else {
            self.calibrator.calibrate(face);
            (Vec::new(), CalibrationStatus::Calibrating)
        };

        FrameResult {
            hand_statuses: self.hand_statuses(),
            gesture,
            expressions,
            calibration_status,
            state_changes,
            landmarks_detected,
        }
    }

    /// Discard the calibration baseline
    ///
    /// Hand states and debounce progress are kept.
    pub fn reset_calibration(&mut self) {
        self.calibrator.reset();
    }

    pub fn status(&self) -> SessionStatus {
        SessionStatus {
            calibration_status: self.settled_calibration_status(),
            hand_statuses: self.hand_statuses(),
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

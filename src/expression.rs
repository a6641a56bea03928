//! Facial expression detection
//!
//! Only runs once a calibration baseline exists. Lip-based expressions are
//! suppressed entirely while a hand covers the mouth, since the lip
//! landmarks are unreliable under occlusion.
//!
//! The lip compression threshold is a fixed value; the calibration baseline
//! gates detection but does not scale the threshold.

use crate::calibration::Calibrator;
use crate::config::ExpressionConfig;
use crate::landmarks::{
    FaceLandmarks, HandLandmarks, PerHand, LIP_REGION, LOWER_LIP_INNER, UPPER_LIP_INNER,
    UPPER_LIP_OUTER,
};
use serde::{Deserialize, Serialize};

/// Recognised facial expression
///
/// Serialises as its label, e.g. `"lips compressed"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Expression {
    /// Lips pressed together
    #[serde(rename = "lips compressed")]
    LipsCompressed,
}

impl Expression {
    pub fn as_str(&self) -> &'static str {
        match self {
            Expression::LipsCompressed => "lips compressed",
        }
    }
}

impl std::fmt::Display for Expression {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether any point of `hand` lies over one of the lip landmarks
///
/// Only the image plane is considered.
pub fn hand_covers_mouth(face: &FaceLandmarks, hand: &HandLandmarks, margin: f64) -> bool {
    LIP_REGION.iter().any(|&lip| {
        let lip = face.point(lip);
        hand.points()
            .iter()
            .any(|p| (p.x - lip.x).abs() < margin && (p.y - lip.y).abs() < margin)
    })
}

/// Whether any available hand covers the mouth
pub fn is_mouth_occluded(
    face: &FaceLandmarks,
    hands: &PerHand<HandLandmarks>,
    margin: f64,
) -> bool {
    hands
        .iter()
        .any(|(_, hand)| hand_covers_mouth(face, hand, margin))
}

/// Vertical gap between the outer lip reference and the inner lip line
pub fn lip_gap(face: &FaceLandmarks) -> f64 {
    let inner = (face.point(UPPER_LIP_INNER).y + face.point(LOWER_LIP_INNER).y) / 2.0;
    (face.point(UPPER_LIP_OUTER).y - inner).abs()
}

/// Detect expressions on a calibrated face
///
/// Returns an empty list when uncalibrated or when a hand covers the mouth.
pub fn detect_expressions(
    face: &FaceLandmarks,
    calibrator: &Calibrator,
    hands: &PerHand<HandLandmarks>,
    config: &ExpressionConfig,
) -> Vec<Expression> {
    if !calibrator.is_calibrated() {
        return Vec::new();
    }

    if is_mouth_occluded(face, hands, config.occlusion_margin) {
        tracing::debug!("Mouth occluded by hand, skipping lip expressions");
        return Vec::new();
    }

    let mut expressions = Vec::new();
    if lip_gap(face) < config.lip_compression_threshold {
        expressions.push(Expression::LipsCompressed);
    }
    expressions
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Point3;
    use crate::landmarks::{Hand, FACE_LANDMARK_COUNT, HAND_LANDMARK_COUNT};

    fn face_with_lips(outer_y: f64, upper_inner_y: f64, lower_inner_y: f64) -> FaceLandmarks {
        let mut points = vec![Point3::new(0.5, 0.3, 0.0); FACE_LANDMARK_COUNT];
        points[UPPER_LIP_OUTER] = Point3::new(0.5, outer_y, 0.0);
        points[UPPER_LIP_INNER] = Point3::new(0.5, upper_inner_y, 0.0);
        points[LOWER_LIP_INNER] = Point3::new(0.5, lower_inner_y, 0.0);
        FaceLandmarks::new(points).unwrap()
    }

    fn compressed_face() -> FaceLandmarks {
        face_with_lips(0.700, 0.705, 0.705)
    }

    fn calibrated(face: &FaceLandmarks) -> Calibrator {
        let mut calibrator = Calibrator::new();
        calibrator.calibrate(face);
        calibrator
    }

    fn hand_at(hand: Hand, x: f64, y: f64) -> HandLandmarks {
        HandLandmarks::new(hand, vec![Point3::new(x, y, 0.0); HAND_LANDMARK_COUNT]).unwrap()
    }

    #[test]
    fn test_uncalibrated_returns_nothing() {
        let face = compressed_face();
        let result = detect_expressions(
            &face,
            &Calibrator::new(),
            &PerHand::default(),
            &ExpressionConfig::default(),
        );
        assert!(result.is_empty());
    }

    #[test]
    fn test_lips_compressed_detected() {
        let face = compressed_face();
        let result = detect_expressions(
            &face,
            &calibrated(&face),
            &PerHand::default(),
            &ExpressionConfig::default(),
        );
        assert_eq!(result, vec![Expression::LipsCompressed]);
    }

    #[test]
    fn test_open_lips_not_compressed() {
        let face = face_with_lips(0.70, 0.72, 0.76);
        assert!((lip_gap(&face) - 0.04).abs() < 1e-12);
        let result = detect_expressions(
            &face,
            &calibrated(&face),
            &PerHand::default(),
            &ExpressionConfig::default(),
        );
        assert!(result.is_empty());
    }

    #[test]
    fn test_hand_over_mouth_suppresses_expressions() {
        let face = compressed_face();
        let lip = face.point(UPPER_LIP_INNER);
        let hands = PerHand::new(Some(hand_at(Hand::Right, lip.x + 0.01, lip.y + 0.01)), None);

        assert!(is_mouth_occluded(&face, &hands, 0.07));
        let result = detect_expressions(
            &face,
            &calibrated(&face),
            &hands,
            &ExpressionConfig::default(),
        );
        assert!(result.is_empty());
    }

    #[test]
    fn test_single_hand_point_is_enough_to_occlude() {
        let face = compressed_face();
        let lip = face.point(UPPER_LIP_OUTER);
        let mut points = vec![Point3::new(0.0, 0.0, 0.0); HAND_LANDMARK_COUNT];
        points[12] = Point3::new(lip.x - 0.02, lip.y + 0.03, 0.4);
        let hand = HandLandmarks::new(Hand::Left, points).unwrap();
        assert!(hand_covers_mouth(&face, &hand, 0.07));
    }

    #[test]
    fn test_distant_hand_does_not_occlude() {
        let face = compressed_face();
        let hands = PerHand::new(
            Some(hand_at(Hand::Right, 0.1, 0.1)),
            Some(hand_at(Hand::Left, 0.9, 0.1)),
        );
        assert!(!is_mouth_occluded(&face, &hands, 0.07));
        let result = detect_expressions(
            &face,
            &calibrated(&face),
            &hands,
            &ExpressionConfig::default(),
        );
        assert_eq!(result, vec![Expression::LipsCompressed]);
    }

    #[test]
    fn test_occlusion_needs_both_axes_close() {
        let face = compressed_face();
        let lip = face.point(UPPER_LIP_OUTER);
        // Horizontally aligned with the lips but well below them
        let hand = hand_at(Hand::Right, lip.x, lip.y + 0.2);
        assert!(!hand_covers_mouth(&face, &hand, 0.07));
    }

    #[test]
    fn test_expression_label_and_serialisation() {
        assert_eq!(Expression::LipsCompressed.as_str(), "lips compressed");
        assert_eq!(Expression::LipsCompressed.to_string(), "lips compressed");
        assert_eq!(
            serde_json::to_string(&Expression::LipsCompressed).unwrap(),
            "\"lips compressed\""
        );
        assert_eq!(
            serde_json::from_str::<Expression>("\"lips compressed\"").unwrap(),
            Expression::LipsCompressed
        );
    }
}

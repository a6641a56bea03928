//! Validated landmark sets supplied by the pose-estimation collaborator
//!
//! Detection itself happens outside this crate. Everything entering the
//! classification core goes through [`Frame::try_from`], which rejects
//! malformed sets before any session state is touched, so the detectors
//! can index landmarks directly.

use crate::geometry::Point3;
use serde::{Deserialize, Serialize};

// Face mesh indices
pub const UPPER_LIP_OUTER: usize = 0;
pub const UPPER_LIP_INNER: usize = 13;
pub const LOWER_LIP_INNER: usize = 14;
pub const RIGHT_EYE_OUTER: usize = 33;
pub const LEFT_BROW: usize = 63;
pub const RIGHT_BROW: usize = 70;
pub const LEFT_EYE_OUTER: usize = 263;

/// Lip landmarks used for both compression and occlusion checks
pub const LIP_REGION: [usize; 3] = [UPPER_LIP_OUTER, UPPER_LIP_INNER, LOWER_LIP_INNER];

/// Minimum number of points in a face mesh
pub const FACE_LANDMARK_COUNT: usize = 468;

// Hand indices
pub const WRIST: usize = 0;
pub const THUMB_TIP: usize = 4;
pub const INDEX_TIP: usize = 8;
pub const MIDDLE_TIP: usize = 12;
pub const RING_TIP: usize = 16;
pub const PINKY_TIP: usize = 20;

pub const FINGERTIPS: [usize; 5] = [THUMB_TIP, INDEX_TIP, MIDDLE_TIP, RING_TIP, PINKY_TIP];

/// Number of points in a hand skeleton
pub const HAND_LANDMARK_COUNT: usize = 21;

/// Landmark validation errors
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LandmarkError {
    #[error("Face landmark set has {found} points, at least {required} required")]
    TooFewFacePoints { found: usize, required: usize },

    #[error("{hand} hand landmark set has {found} points, expected {expected}")]
    WrongHandPointCount {
        hand: Hand,
        found: usize,
        expected: usize,
    },

    #[error("Non-finite coordinate in {set} landmark {index}")]
    NonFinite { set: &'static str, index: usize },
}

/// Which hand a reading belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Hand {
    Right,
    Left,
}

impl Hand {
    pub const ALL: [Hand; 2] = [Hand::Right, Hand::Left];

    pub fn as_str(&self) -> &'static str {
        match self {
            Hand::Right => "right",
            Hand::Left => "left",
        }
    }
}

impl std::fmt::Display for Hand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One optional value per hand
///
/// Absence means "no data for that hand", never a default reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PerHand<T> {
    pub right: Option<T>,
    pub left: Option<T>,
}

impl<T> Default for PerHand<T> {
    fn default() -> Self {
        Self {
            right: None,
            left: None,
        }
    }
}

impl<T> PerHand<T> {
    pub fn new(right: Option<T>, left: Option<T>) -> Self {
        Self { right, left }
    }

    pub fn get(&self, hand: Hand) -> Option<&T> {
        match hand {
            Hand::Right => self.right.as_ref(),
            Hand::Left => self.left.as_ref(),
        }
    }

    pub fn get_mut(&mut self, hand: Hand) -> &mut Option<T> {
        match hand {
            Hand::Right => &mut self.right,
            Hand::Left => &mut self.left,
        }
    }

    /// Present entries, right hand first
    pub fn iter(&self) -> impl Iterator<Item = (Hand, &T)> + '_ {
        Hand::ALL
            .into_iter()
            .filter_map(move |hand| self.get(hand).map(|value| (hand, value)))
    }

    pub fn map<U>(&self, mut f: impl FnMut(&T) -> U) -> PerHand<U> {
        PerHand {
            right: self.right.as_ref().map(&mut f),
            left: self.left.as_ref().map(&mut f),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.right.is_none() && self.left.is_none()
    }
}

fn check_finite(points: &[Point3], set: &'static str) -> Result<(), LandmarkError> {
    match points.iter().position(|p| !p.is_finite()) {
        Some(index) => Err(LandmarkError::NonFinite { set, index }),
        None => Ok(()),
    }
}

/// A validated face mesh
#[derive(Debug, Clone, PartialEq)]
pub struct FaceLandmarks(Vec<Point3>);

impl FaceLandmarks {
    pub fn new(points: Vec<Point3>) -> Result<Self, LandmarkError> {
        if points.len() < FACE_LANDMARK_COUNT {
            return Err(LandmarkError::TooFewFacePoints {
                found: points.len(),
                required: FACE_LANDMARK_COUNT,
            });
        }
        check_finite(&points, "face")?;
        Ok(Self(points))
    }

    /// Point at a face mesh index
    ///
    /// Panics if `index` is beyond the mesh; the named constants in this
    /// module are always in range.
    pub fn point(&self, index: usize) -> Point3 {
        self.0[index]
    }

    pub fn points(&self) -> &[Point3] {
        &self.0
    }
}

/// A validated 21-point hand skeleton
#[derive(Debug, Clone, PartialEq)]
pub struct HandLandmarks([Point3; HAND_LANDMARK_COUNT]);

impl HandLandmarks {
    pub fn new(hand: Hand, points: Vec<Point3>) -> Result<Self, LandmarkError> {
        let found = points.len();
        let points: [Point3; HAND_LANDMARK_COUNT] =
            points
                .try_into()
                .map_err(|_| LandmarkError::WrongHandPointCount {
                    hand,
                    found,
                    expected: HAND_LANDMARK_COUNT,
                })?;
        check_finite(
            &points,
            match hand {
                Hand::Right => "right hand",
                Hand::Left => "left hand",
            },
        )?;
        Ok(Self(points))
    }

    pub fn point(&self, index: usize) -> Point3 {
        self.0[index]
    }

    pub fn points(&self) -> &[Point3] {
        &self.0
    }
}

/// Landmark sets as they arrive from the collaborator, before validation
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RawFrame {
    pub face: Option<Vec<Point3>>,
    pub right_hand: Option<Vec<Point3>>,
    pub left_hand: Option<Vec<Point3>>,
}

/// One frame's validated landmark sets
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Frame {
    pub face: Option<FaceLandmarks>,
    pub hands: PerHand<HandLandmarks>,
}

impl Frame {
    pub fn new(
        face: Option<FaceLandmarks>,
        right_hand: Option<HandLandmarks>,
        left_hand: Option<HandLandmarks>,
    ) -> Self {
        Self {
            face,
            hands: PerHand::new(right_hand, left_hand),
        }
    }
}

impl TryFrom<RawFrame> for Frame {
    type Error = LandmarkError;

    fn try_from(raw: RawFrame) -> Result<Self, Self::Error> {
        let face = raw.face.map(FaceLandmarks::new).transpose()?;
        let right_hand = raw
            .right_hand
            .map(|points| HandLandmarks::new(Hand::Right, points))
            .transpose()?;
        let left_hand = raw
            .left_hand
            .map(|points| HandLandmarks::new(Hand::Left, points))
            .transpose()?;
        Ok(Frame::new(face, right_hand, left_hand))
    }
}

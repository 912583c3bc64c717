use serde::{Deserialize, Serialize};

use crate::error::GestureError;

/// Pose indices of the left/right shoulder, elbow and wrist.
const ARM_POSE_INDICES: std::ops::Range<usize> = 11..17;

/// Values per frame: (6 arm + 21 left hand + 21 right hand) points, 3 coordinates each.
pub const FEATURES: usize = (6 + 21 + 21) * 3;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
    #[serde(default)]
    pub z: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LandmarkGroup {
    Arm,
    LeftHand,
    RightHand,
}

impl LandmarkGroup {
    pub const ALL: [Self; 3] = [Self::Arm, Self::LeftHand, Self::RightHand];

    pub fn points(self) -> usize {
        match self {
            Self::Arm => ARM_POSE_INDICES.len(),
            Self::LeftHand | Self::RightHand => 21,
        }
    }

    pub fn width(self) -> usize { self.points() * 3 }

    pub fn name(self) -> &'static str {
        match self {
            Self::Arm => "arm",
            Self::LeftHand => "left hand",
            Self::RightHand => "right hand",
        }
    }
}

/// What the perception library reported for one frame. A missing group means
/// nothing was detected for it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FrameLandmarks {
    /// Full body pose (33 points); only the arm points are used.
    #[serde(default)]
    pub pose: Option<Vec<Landmark>>,
    #[serde(default)]
    pub left_hand: Option<Vec<Landmark>>,
    #[serde(default)]
    pub right_hand: Option<Vec<Landmark>>,
}

impl FrameLandmarks {
    /// The landmarks of `group`, or `None` when it was not detected.
    pub fn group(&self, group: LandmarkGroup) -> Result<Option<&[Landmark]>, GestureError> {
        match group {
            LandmarkGroup::Arm => match &self.pose {
                None => Ok(None),
                Some(pose) => pose.get(ARM_POSE_INDICES).map(Some).ok_or(GestureError::WrongLandmarkCount {
                    group: "pose",
                    expected: ARM_POSE_INDICES.end,
                    got: pose.len(),
                }),
            },
            LandmarkGroup::LeftHand => Ok(self.left_hand.as_deref()),
            LandmarkGroup::RightHand => Ok(self.right_hand.as_deref()),
        }
    }
}

pub(crate) fn flatten(points: &[Landmark]) -> Vec<f32> {
    points.iter().flat_map(|p| [p.x, p.y, p.z]).collect()
}

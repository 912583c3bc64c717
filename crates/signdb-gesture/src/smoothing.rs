//! Exponential moving average over landmark groups.
//!
//! Each group is smoothed on its own: `alpha * current + (1 - alpha) * previous`.
//! The first detection passes through unchanged, a frame without a detection
//! repeats the last smoothed value, and a group never seen yet reads as zeros.

use crate::error::GestureError;
use crate::landmarks::{flatten, FrameLandmarks, Landmark, LandmarkGroup, FEATURES};

#[derive(Debug, Clone)]
pub struct GroupSmoother {
    group: LandmarkGroup,
    alpha: f32,
    previous: Option<Vec<f32>>,
}

impl GroupSmoother {
    pub fn new(group: LandmarkGroup, alpha: f32) -> Result<Self, GestureError> {
        validate_alpha(alpha)?;
        Ok(Self { group, alpha, previous: None })
    }

    /// Feed one frame's detection for this group and return the smoothed values.
    pub fn update(&mut self, detection: Option<&[Landmark]>) -> Result<Vec<f32>, GestureError> {
        let Some(points) = detection else {
            return Ok(self.previous.clone().unwrap_or_else(|| vec![0.0; self.group.width()]));
        };
        if points.len() != self.group.points() {
            return Err(GestureError::WrongLandmarkCount {
                group: self.group.name(),
                expected: self.group.points(),
                got: points.len(),
            });
        }
        let current = flatten(points);
        let smoothed = match &self.previous {
            None => current,
            Some(prev) => current.iter().zip(prev).map(|(c, p)| self.alpha * c + (1.0 - self.alpha) * p).collect(),
        };
        self.previous = Some(smoothed.clone());
        Ok(smoothed)
    }

    pub fn reset(&mut self) {
        self.previous = None;
    }
}

/// Smooths arm, left hand and right hand independently and concatenates them
/// in that order.
#[derive(Debug, Clone)]
pub struct TemporalSmoother {
    groups: [GroupSmoother; 3],
}

impl TemporalSmoother {
    pub fn new(alpha: f32) -> Result<Self, GestureError> {
        let [arm, left, right] = LandmarkGroup::ALL;
        Ok(Self {
            groups: [GroupSmoother::new(arm, alpha)?, GroupSmoother::new(left, alpha)?, GroupSmoother::new(right, alpha)?],
        })
    }

    pub fn push(&mut self, frame: &FrameLandmarks) -> Result<Vec<f32>, GestureError> {
        let mut row = Vec::with_capacity(FEATURES);
        for smoother in &mut self.groups {
            row.extend(smoother.update(frame.group(smoother.group)?)?);
        }
        Ok(row)
    }

    /// Smooth a whole clip from a fresh state.
    pub fn smooth_sequence(&mut self, frames: &[FrameLandmarks]) -> Result<Vec<Vec<f32>>, GestureError> {
        self.reset();
        frames.iter().map(|f| self.push(f)).collect()
    }

    pub fn reset(&mut self) {
        self.groups.iter_mut().for_each(GroupSmoother::reset);
    }
}

fn validate_alpha(alpha: f32) -> Result<(), GestureError> {
    if alpha > 0.0 && alpha <= 1.0 { Ok(()) } else { Err(GestureError::InvalidAlpha(alpha)) }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hand(value: f32) -> Vec<Landmark> {
        vec![Landmark { x: value, y: value, z: value }; 21]
    }

    #[test]
    fn never_detected_is_zeros() {
        let mut s = GroupSmoother::new(LandmarkGroup::LeftHand, 0.5).expect("smoother");
        assert_eq!(s.update(None).expect("update"), vec![0.0; 63]);
    }

    #[test]
    fn alpha_one_tracks_input() {
        let mut s = GroupSmoother::new(LandmarkGroup::RightHand, 1.0).expect("smoother");
        s.update(Some(&hand(1.0))).expect("update");
        assert_eq!(s.update(Some(&hand(3.0))).expect("update"), vec![3.0; 63]);
    }

    #[test]
    fn rejects_alpha_outside_unit_interval() {
        assert!(matches!(GroupSmoother::new(LandmarkGroup::Arm, 0.0), Err(GestureError::InvalidAlpha(_))));
        assert!(matches!(TemporalSmoother::new(1.5), Err(GestureError::InvalidAlpha(_))));
    }

    #[test]
    fn wrong_point_count_is_rejected() {
        let mut s = GroupSmoother::new(LandmarkGroup::LeftHand, 0.5).expect("smoother");
        let err = s.update(Some(&hand(1.0)[..20])).unwrap_err();
        assert!(matches!(err, GestureError::WrongLandmarkCount { expected: 21, got: 20, .. }));
    }
}

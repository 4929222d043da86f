use crate::common::smpl;
use crate::common::types::Split;
use crate::error::{MogenError, Result};
use ndarray as nd;
use ndarray::prelude::*;

/// One raw motion sequence as stored in the corpus, with split/id metadata
/// attached after partitioning.
#[derive(Clone, Debug)]
pub struct MotionSequence {
    /// Per-frame axis-angle rotations, pelvis orientation first:
    /// `[frames, 3 + 3 * 21]`.
    pub rots: nd::Array2<f32>,
    /// Per-frame pelvis translation: `[frames, 3]`.
    pub trans: nd::Array2<f32>,
    /// Per-frame joint coordinates: `[frames, >=n_joints, 3]`.
    pub joint_positions: nd::Array3<f32>,
    pub fps: f32,
    pub id: String,
    pub split: Split,
    pub fname: String,
}

impl MotionSequence {
    /// Build a sequence and validate the frame-axis invariant.
    pub fn new(
        rots: nd::Array2<f32>,
        trans: nd::Array2<f32>,
        joint_positions: nd::Array3<f32>,
        fps: f32,
        id: String,
        split: Split,
        fname: String,
    ) -> Result<Self> {
        let frames = rots.nrows();
        if trans.nrows() != frames || joint_positions.dim().0 != frames {
            return Err(MogenError::ShapeMismatch(format!(
                "sequence {id}: rots cover {frames} frames but trans cover {} and joint_positions {}",
                trans.nrows(),
                joint_positions.dim().0
            )));
        }
        if rots.ncols() != 3 * (smpl::NUM_BODY_JOINTS + 1) {
            return Err(MogenError::ShapeMismatch(format!(
                "sequence {id}: expected {} rotation channels, got {}",
                3 * (smpl::NUM_BODY_JOINTS + 1),
                rots.ncols()
            )));
        }
        if trans.ncols() != 3 || joint_positions.dim().2 != 3 {
            return Err(MogenError::ShapeMismatch(format!(
                "sequence {id}: translations and joint positions must be 3D"
            )));
        }
        Ok(Self {
            rots,
            trans,
            joint_positions,
            fps,
            id,
            split,
            fname,
        })
    }

    /// Sequence duration in frames.
    pub fn num_frames(&self) -> usize {
        self.rots.nrows()
    }

    /// Pelvis orientation channels: `[frames, 3]`.
    pub fn pelvis_orient(&self) -> ArrayView2<f32> {
        self.rots.slice(s![.., 0..3])
    }

    /// Body pose without the pelvis: `[frames, 3 * 21]`.
    pub fn body_pose(&self) -> ArrayView2<f32> {
        self.rots.slice(s![.., 3..3 + 3 * smpl::NUM_BODY_JOINTS])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn zeros_sequence(frames: usize) -> Result<MotionSequence> {
        MotionSequence::new(
            nd::Array2::zeros((frames, 66)),
            nd::Array2::zeros((frames, 3)),
            nd::Array3::zeros((frames, 22, 3)),
            30.0,
            "seq".into(),
            Split::Train,
            "seq.npz".into(),
        )
    }

    #[test]
    fn accepts_consistent_frame_counts() {
        let seq = zeros_sequence(5).unwrap();
        assert_eq!(seq.num_frames(), 5);
        assert_eq!(seq.pelvis_orient().dim(), (5, 3));
        assert_eq!(seq.body_pose().dim(), (5, 63));
    }

    #[test]
    fn rejects_mismatched_frame_counts() {
        let err = MotionSequence::new(
            nd::Array2::zeros((5, 66)),
            nd::Array2::zeros((4, 3)),
            nd::Array3::zeros((5, 22, 3)),
            30.0,
            "seq".into(),
            Split::Train,
            "seq.npz".into(),
        );
        assert!(matches!(err, Err(MogenError::ShapeMismatch(_))));
    }

    #[test]
    fn rejects_wrong_rotation_width() {
        let err = MotionSequence::new(
            nd::Array2::zeros((5, 63)),
            nd::Array2::zeros((5, 3)),
            nd::Array3::zeros((5, 22, 3)),
            30.0,
            "seq".into(),
            Split::Train,
            "seq.npz".into(),
        );
        assert!(matches!(err, Err(MogenError::ShapeMismatch(_))));
    }
}

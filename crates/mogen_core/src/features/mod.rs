//! Name-driven registry of derived kinematic features.
//!
//! Every [`Feature`] maps one [`MotionSequence`] to a `[frames, width]`
//! tensor. The enum is the single source of truth for which names are
//! computable and how wide each one is; dispatch is a total `match`, so a
//! new variant without an extractor fails to compile.

use crate::common::metadata::BodyMetadata;
use crate::common::motion::MotionSequence;
use crate::common::smpl;
use crate::common::types::RotationRepr;
use crate::error::{MogenError, Result};
use crate::transforms::frames::{change_for, get_z_rot, local_to_global_orient, remove_z_rot, rot_diff};
use crate::transforms::rotation::{convert, to_matrices};
use ndarray as nd;
use ndarray::prelude::*;
use std::str::FromStr;
use strum_macros::{Display, EnumIter, EnumString};

/// Frame-level features computable from a raw motion sequence.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Display, EnumString, EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum Feature {
    BodyTransl,
    BodyTranslZ,
    BodyTranslDelta,
    BodyTranslDeltaPelv,
    BodyTranslDeltaPelvXy,
    BodyOrient,
    BodyOrientXy,
    BodyOrientDelta,
    BodyPose,
    BodyPoseDelta,
    BodyJoints,
    BodyJointsRel,
    BodyJointsVel,
    JointGlobalOris,
    JointAngVel,
    WristsAngVel,
    WristsAngVelEuler,
}

impl Feature {
    /// Resolve a feature name, failing with [`MogenError::UnknownFeature`]
    /// for anything outside the registry.
    pub fn parse(name: &str) -> Result<Feature> {
        Feature::from_str(name).map_err(|_| MogenError::UnknownFeature(name.to_owned()))
    }

    pub fn parse_all(names: &[String]) -> Result<Vec<Feature>> {
        names.iter().map(|n| Feature::parse(n)).collect()
    }
}

/// Per-sequence scalar metadata features.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Display, EnumString, EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum MetaFeature {
    NFramesOrig,
    Framerate,
}

/// Computes one feature tensor from a raw sequence; holds the configuration
/// every extractor shares.
#[derive(Clone, Debug)]
pub struct FeatureExtractor {
    n_body_joints: usize,
    rot_repr: RotationRepr,
    joint_parents: Vec<u32>,
    wrist_joints: [usize; 2],
}

impl FeatureExtractor {
    pub fn new(n_body_joints: usize, rot_repr: RotationRepr, body: &BodyMetadata) -> Self {
        Self {
            n_body_joints,
            rot_repr,
            joint_parents: body.joint_parents.clone(),
            wrist_joints: body.wrist_joints,
        }
    }

    pub fn rot_repr(&self) -> RotationRepr {
        self.rot_repr
    }

    /// Per-frame width of a feature under this extractor's configuration.
    pub fn width(&self, feature: Feature) -> usize {
        let w = self.rot_repr.width();
        match feature {
            Feature::BodyTransl | Feature::BodyTranslDelta | Feature::BodyTranslDeltaPelv | Feature::BodyTranslDeltaPelvXy => 3,
            Feature::BodyTranslZ => 1,
            Feature::BodyOrient | Feature::BodyOrientDelta => w,
            Feature::BodyOrientXy => RotationRepr::SixD.width(),
            Feature::BodyPose | Feature::BodyPoseDelta => smpl::NUM_BODY_JOINTS * w,
            Feature::BodyJoints | Feature::BodyJointsRel | Feature::BodyJointsVel => self.n_body_joints * 3,
            Feature::JointGlobalOris => (smpl::NUM_BODY_JOINTS + 1) * RotationRepr::RotMat.width(),
            Feature::JointAngVel => smpl::NUM_BODY_JOINTS * RotationRepr::SixD.width(),
            Feature::WristsAngVel => 2 * RotationRepr::SixD.width(),
            Feature::WristsAngVelEuler => 2 * RotationRepr::Euler.width(),
        }
    }

    /// Compute one feature over the whole sequence: `[frames, width]`.
    pub fn extract(&self, feature: Feature, seq: &MotionSequence) -> Result<nd::Array2<f32>> {
        match feature {
            Feature::BodyTransl => Ok(seq.trans.clone()),
            Feature::BodyTranslZ => Ok(seq.trans.slice(s![.., 2..3]).to_owned()),
            Feature::BodyTranslDelta => Ok(shift_delta(&seq.trans.view())),
            Feature::BodyTranslDeltaPelv => self.body_transl_delta_pelv(seq),
            Feature::BodyTranslDeltaPelvXy => self.body_transl_delta_pelv_xy(seq),
            Feature::BodyOrient => convert(&seq.pelvis_orient().to_owned(), RotationRepr::AxisAngle, self.rot_repr),
            Feature::BodyOrientXy => remove_z_rot(&seq.pelvis_orient().to_owned(), RotationRepr::AxisAngle),
            Feature::BodyOrientDelta => rot_diff(&seq.pelvis_orient().to_owned(), RotationRepr::AxisAngle, self.rot_repr),
            Feature::BodyPose => convert(&seq.body_pose().to_owned(), RotationRepr::AxisAngle, self.rot_repr),
            Feature::BodyPoseDelta => rot_diff(&seq.body_pose().to_owned(), RotationRepr::AxisAngle, self.rot_repr),
            Feature::BodyJoints => Ok(self.joints_flat(seq)),
            Feature::BodyJointsRel => self.body_joints_rel(seq),
            Feature::BodyJointsVel => {
                let joints = self.joints_flat(seq);
                Ok(shift_delta(&joints.view()))
            }
            Feature::JointGlobalOris => local_to_global_orient(
                &seq.pelvis_orient().to_owned(),
                &seq.body_pose().to_owned(),
                &self.joint_parents,
                RotationRepr::AxisAngle,
                RotationRepr::RotMat,
            ),
            Feature::JointAngVel => rot_diff(&seq.body_pose().to_owned(), RotationRepr::AxisAngle, RotationRepr::SixD),
            Feature::WristsAngVel => rot_diff(&self.wrist_pose(seq), RotationRepr::AxisAngle, RotationRepr::SixD),
            Feature::WristsAngVelEuler => rot_diff(&self.wrist_pose(seq), RotationRepr::AxisAngle, RotationRepr::Euler),
        }
    }

    pub fn extract_meta(&self, meta: MetaFeature, seq: &MotionSequence) -> f32 {
        match meta {
            MetaFeature::NFramesOrig => seq.num_frames() as f32,
            MetaFeature::Framerate => seq.fps,
        }
    }

    /// Translation delta re-expressed in the previous frame's pelvis frame:
    /// `v_i = R_{i-1}^T (t_i - t_{i-1})`.
    fn body_transl_delta_pelv(&self, seq: &MotionSequence) -> Result<nd::Array2<f32>> {
        let delta = shift_delta(&seq.trans.view());
        let mats = to_matrices(&seq.pelvis_orient().to_owned(), RotationRepr::AxisAngle)?;
        let mut local = change_for(&delta, &roll_frames(&mats), true)?;
        local.row_mut(0).fill(0.0);
        Ok(local)
    }

    /// Same as [`Self::body_transl_delta_pelv`] but against the yaw-only
    /// component of the previous frame's pelvis orientation.
    fn body_transl_delta_pelv_xy(&self, seq: &MotionSequence) -> Result<nd::Array2<f32>> {
        let delta = shift_delta(&seq.trans.view());
        let z_rot = get_z_rot(&seq.pelvis_orient().to_owned(), RotationRepr::AxisAngle)?;
        let mut local = change_for(&delta, &roll_frames(&z_rot), true)?;
        local.row_mut(0).fill(0.0);
        Ok(local)
    }

    /// Joint coordinates relative to the pelvis, rotated into its frame.
    fn body_joints_rel(&self, seq: &MotionSequence) -> Result<nd::Array2<f32>> {
        let mats = to_matrices(&seq.pelvis_orient().to_owned(), RotationRepr::AxisAngle)?;
        let frames = seq.num_frames();
        let mut out = nd::Array2::<f32>::zeros((frames, self.n_body_joints * 3));
        for i in 0..frames {
            let pelvis: nd::Array1<f32> = seq.joint_positions.slice(s![i, 0, ..]).to_owned();
            let rot = mogen_utils::interop::view_to_matrix3(mats.index_axis(nd::Axis(0), i));
            for j in 0..self.n_body_joints {
                let p: nd::ArrayView1<f32> = seq.joint_positions.slice(s![i, j, ..]);
                let centered = mogen_utils::interop::Vector3f::new(p[0] - pelvis[0], p[1] - pelvis[1], p[2] - pelvis[2]);
                let rel = rot.transpose() * centered;
                mogen_utils::interop::vector3_to_row(&rel, out.slice_mut(s![i, j * 3..(j + 1) * 3]));
            }
        }
        Ok(out)
    }

    /// First `n_body_joints` joint positions, flattened to `[frames, J * 3]`.
    fn joints_flat(&self, seq: &MotionSequence) -> nd::Array2<f32> {
        let frames = seq.num_frames();
        seq.joint_positions
            .slice(s![.., 0..self.n_body_joints, ..])
            .to_owned()
            .into_shape_with_order((frames, self.n_body_joints * 3))
            .expect("joint slice is contiguous")
    }

    /// Wrist channels of the body pose: `[frames, 2 * 3]` axis-angle.
    fn wrist_pose(&self, seq: &MotionSequence) -> nd::Array2<f32> {
        let body = seq.body_pose();
        let mut out = nd::Array2::<f32>::zeros((body.nrows(), 6));
        for (slot, &j) in self.wrist_joints.iter().enumerate() {
            out.slice_mut(s![.., slot * 3..(slot + 1) * 3])
                .assign(&body.slice(s![.., j * 3..(j + 1) * 3]));
        }
        out
    }
}

/// Shift-and-subtract along the frame axis with the first row forced to
/// zero; the wraparound value a circular shift would produce must never
/// survive.
fn shift_delta(x: &nd::ArrayView2<f32>) -> nd::Array2<f32> {
    let mut out = nd::Array2::<f32>::zeros(x.raw_dim());
    if x.nrows() > 1 {
        let diff = &x.slice(s![1.., ..]) - &x.slice(s![..-1, ..]);
        out.slice_mut(s![1.., ..]).assign(&diff);
    }
    out
}

/// Rotation frames shifted one step forward so frame `i` sees frame
/// `i - 1`'s rotation; row 0 wraps and is expected to be overridden.
fn roll_frames(mats: &nd::Array3<f32>) -> nd::Array3<f32> {
    let n = mats.dim().0;
    let mut rolled = nd::Array3::<f32>::zeros(mats.raw_dim());
    if n > 0 {
        rolled.slice_mut(s![0, .., ..]).assign(&mats.slice(s![n - 1, .., ..]));
        if n > 1 {
            rolled.slice_mut(s![1.., .., ..]).assign(&mats.slice(s![..-1, .., ..]));
        }
    }
    rolled
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::metadata::body_metadata;
    use crate::common::types::{BodyModel, Split};
    use approx::assert_abs_diff_eq;
    use ndarray::array;
    use strum::IntoEnumIterator;

    fn extractor() -> FeatureExtractor {
        FeatureExtractor::new(22, RotationRepr::SixD, &body_metadata(BodyModel::SmplH))
    }

    fn sequence_with_trans(trans: nd::Array2<f32>) -> MotionSequence {
        let frames = trans.nrows();
        MotionSequence::new(
            nd::Array2::zeros((frames, 66)),
            trans,
            nd::Array3::zeros((frames, 22, 3)),
            30.0,
            "seq".into(),
            Split::Train,
            "seq.npz".into(),
        )
        .unwrap()
    }

    #[test]
    fn unknown_feature_name_is_rejected() {
        let err = Feature::parse("nonexistent_feature");
        assert!(matches!(err, Err(MogenError::UnknownFeature(_))));
        assert_eq!(Feature::parse("body_transl_delta_pelv_xy").unwrap(), Feature::BodyTranslDeltaPelvXy);
    }

    #[test]
    fn transl_delta_matches_hand_computed_scenario() {
        let trans = array![
            [0.0_f32, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [1.0, 1.0, 0.0],
            [1.0, 1.0, 1.0],
            [2.0, 1.0, 1.0]
        ];
        let seq = sequence_with_trans(trans);
        let delta = extractor().extract(Feature::BodyTranslDelta, &seq).unwrap();
        let expected = array![
            [0.0_f32, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [0.0, 1.0, 0.0],
            [0.0, 0.0, 1.0],
            [1.0, 0.0, 0.0]
        ];
        assert_eq!(delta, expected);
    }

    #[test]
    fn every_velocity_feature_is_zero_at_frame_zero() {
        let mut rots = nd::Array2::<f32>::zeros((4, 66));
        rots.row_mut(1).fill(0.4); // nonzero frame 1 must not leak into frame 0
        let mut joints = nd::Array3::<f32>::zeros((4, 22, 3));
        joints.index_axis_mut(nd::Axis(0), 1).fill(2.0);
        let seq = MotionSequence::new(
            rots,
            array![[0.0_f32, 0.0, 0.0], [3.0, 1.0, 0.5], [3.0, 1.0, 0.5], [3.0, 1.0, 0.5]],
            joints,
            30.0,
            "seq".into(),
            Split::Train,
            "seq.npz".into(),
        )
        .unwrap();
        let ex = extractor();
        for feature in [
            Feature::BodyTranslDelta,
            Feature::BodyTranslDeltaPelv,
            Feature::BodyTranslDeltaPelvXy,
            Feature::BodyJointsVel,
        ] {
            let out = ex.extract(feature, &seq).unwrap();
            for v in out.row(0) {
                assert_abs_diff_eq!(*v, 0.0, epsilon = 1e-6);
            }
        }
        // rotational velocities are the identity at frame 0
        for feature in [Feature::JointAngVel, Feature::WristsAngVel] {
            let out = ex.extract(feature, &seq).unwrap();
            for chunk in out.row(0).to_owned().exact_chunks(6) {
                let expected = [1.0, 0.0, 0.0, 0.0, 1.0, 0.0];
                for (got, want) in chunk.iter().zip(expected) {
                    assert_abs_diff_eq!(*got, want, epsilon = 1e-6);
                }
            }
        }
    }

    #[test]
    fn transl_delta_pelv_uses_previous_frame_orientation() {
        // pelvis yawed 90 degrees from frame 1 on; step from frame 1 to 2 is
        // world +x, which is -y in the previous (yawed) pelvis frame
        let mut rots = nd::Array2::<f32>::zeros((3, 66));
        rots[(1, 2)] = std::f32::consts::FRAC_PI_2;
        rots[(2, 2)] = std::f32::consts::FRAC_PI_2;
        let seq = MotionSequence::new(
            rots,
            array![[0.0_f32, 0.0, 0.0], [0.0, 0.0, 0.0], [1.0, 0.0, 0.0]],
            nd::Array3::zeros((3, 22, 3)),
            30.0,
            "seq".into(),
            Split::Train,
            "seq.npz".into(),
        )
        .unwrap();
        let out = extractor().extract(Feature::BodyTranslDeltaPelv, &seq).unwrap();
        assert_abs_diff_eq!(out[(2, 0)], 0.0, epsilon = 1e-6);
        assert_abs_diff_eq!(out[(2, 1)], -1.0, epsilon = 1e-6);
    }

    #[test]
    fn joints_rel_centers_on_pelvis() {
        let mut joints = nd::Array3::<f32>::zeros((1, 22, 3));
        joints[(0, 0, 0)] = 5.0; // pelvis away from origin
        joints[(0, 3, 0)] = 6.0;
        let seq = MotionSequence::new(
            nd::Array2::zeros((1, 66)),
            nd::Array2::zeros((1, 3)),
            joints,
            30.0,
            "seq".into(),
            Split::Train,
            "seq.npz".into(),
        )
        .unwrap();
        let rel = extractor().extract(Feature::BodyJointsRel, &seq).unwrap();
        assert_abs_diff_eq!(rel[(0, 0)], 0.0, epsilon = 1e-6); // pelvis maps to origin
        assert_abs_diff_eq!(rel[(0, 9)], 1.0, epsilon = 1e-6);
    }

    #[test]
    fn widths_match_extracted_tensors() {
        let mut rots = nd::Array2::<f32>::zeros((3, 66));
        rots.row_mut(2).fill(0.1);
        let seq = MotionSequence::new(
            rots,
            nd::Array2::zeros((3, 3)),
            nd::Array3::zeros((3, 22, 3)),
            30.0,
            "seq".into(),
            Split::Train,
            "seq.npz".into(),
        )
        .unwrap();
        let ex = extractor();
        for feature in Feature::iter() {
            let out = ex.extract(feature, &seq).unwrap();
            assert_eq!(out.dim(), (3, ex.width(feature)), "width table wrong for {feature}");
        }
    }
}

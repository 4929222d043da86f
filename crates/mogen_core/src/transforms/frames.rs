use crate::common::types::RotationRepr;
use crate::error::{MogenError, Result};
use crate::transforms::rotation::{decode_one, encode_one, to_matrices};
use mogen_utils::interop::{row_to_vector3, vector3_to_row, view_to_matrix3};
use nalgebra as na;
use ndarray as nd;
use ndarray::prelude::*;

/// Re-express per-frame 3D vectors in per-frame rotating reference frames.
///
/// With `forward` the vectors move from the world frame into the local frame
/// (`R^T * v`); without it the change is inverted (`R * v`). One rotation
/// matrix per frame.
pub fn change_for(vectors: &nd::Array2<f32>, frames: &nd::Array3<f32>, forward: bool) -> Result<nd::Array2<f32>> {
    if vectors.nrows() != frames.dim().0 || vectors.ncols() != 3 {
        return Err(MogenError::ShapeMismatch(format!(
            "change_for needs [frames, 3] vectors and one rotation per frame, got {:?} and {:?}",
            vectors.dim(),
            frames.dim()
        )));
    }
    let mut out = nd::Array2::<f32>::zeros(vectors.raw_dim());
    for ((v, r), mut out_row) in vectors
        .axis_iter(nd::Axis(0))
        .zip(frames.axis_iter(nd::Axis(0)))
        .zip(out.axis_iter_mut(nd::Axis(0)))
    {
        let rot = view_to_matrix3(r);
        let v = row_to_vector3(v);
        let rotated = if forward { rot.transpose() * v } else { rot * v };
        vector3_to_row(&rotated, out_row.view_mut());
    }
    Ok(out)
}

/// Yaw component per frame: the rotation about the vertical (z) axis with
/// tilt and roll discarded, as `[frames, 3, 3]` matrices.
pub fn get_z_rot(orient: &nd::Array2<f32>, in_format: RotationRepr) -> Result<nd::Array3<f32>> {
    let mats = to_matrices(orient, in_format)?;
    let mut out = nd::Array3::<f32>::zeros(mats.raw_dim());
    for (m, mut o) in mats.axis_iter(nd::Axis(0)).zip(out.axis_iter_mut(nd::Axis(0))) {
        let yaw = yaw_of(m);
        let rz = na::Rotation3::from_euler_angles(0.0, 0.0, yaw);
        mogen_utils::interop::matrix3_to_view(rz.matrix(), o.view_mut());
    }
    Ok(out)
}

/// Orientation with its z-rotation projected out, in 6D form `[frames, 6]`.
pub fn remove_z_rot(orient: &nd::Array2<f32>, in_format: RotationRepr) -> Result<nd::Array2<f32>> {
    let mats = to_matrices(orient, in_format)?;
    let mut out = nd::Array2::<f32>::zeros((mats.dim().0, RotationRepr::SixD.width()));
    for (m, out_row) in mats.axis_iter(nd::Axis(0)).zip(out.axis_iter_mut(nd::Axis(0))) {
        let yaw = yaw_of(m);
        let rot = na::Rotation3::from_matrix_unchecked(view_to_matrix3(m));
        let residual = na::Rotation3::from_euler_angles(0.0, 0.0, -yaw) * rot;
        encode_one(&residual, RotationRepr::SixD, out_row);
    }
    Ok(out)
}

/// Frame-to-frame relative rotation `R_i * R_{i-1}^T` per joint, re-encoded
/// in `out_format`. The first frame has no predecessor and gets the identity
/// rotation, never a wraparound to the last frame.
pub fn rot_diff(seq: &nd::Array2<f32>, in_format: RotationRepr, out_format: RotationRepr) -> Result<nd::Array2<f32>> {
    let w_in = in_format.width();
    if seq.ncols() == 0 || seq.ncols() % w_in != 0 {
        return Err(MogenError::ShapeMismatch(format!(
            "rot_diff width {} is not a multiple of the {in_format} width {w_in}",
            seq.ncols()
        )));
    }
    let num_joints = seq.ncols() / w_in;
    let w_out = out_format.width();
    let mut out = nd::Array2::<f32>::zeros((seq.nrows(), num_joints * w_out));
    let identity = na::Rotation3::identity();
    for i in 0..seq.nrows() {
        for j in 0..num_joints {
            let delta = if i == 0 {
                identity
            } else {
                let cur = decode_one(seq.slice(s![i, j * w_in..(j + 1) * w_in]), in_format);
                let prev = decode_one(seq.slice(s![i - 1, j * w_in..(j + 1) * w_in]), in_format);
                na::Rotation3::from_matrix_unchecked(cur.matrix() * prev.matrix().transpose())
            };
            encode_one(&delta, out_format, out.slice_mut(s![i, j * w_out..(j + 1) * w_out]));
        }
    }
    Ok(out)
}

/// Forward-kinematics rotation composition: per joint, the global rotation is
/// the parent's global rotation composed with the joint's local one,
/// evaluated pelvis-first down the parent-index chain.
///
/// `root_orient` is `[frames, w_in]`, `body_pose` is `[frames, J * w_in]`,
/// `chain` has `J + 1` parent indices (pelvis entry unused). Output is
/// `[frames, (J + 1) * w_out]`.
pub fn local_to_global_orient(
    root_orient: &nd::Array2<f32>,
    body_pose: &nd::Array2<f32>,
    chain: &[u32],
    input_format: RotationRepr,
    output_format: RotationRepr,
) -> Result<nd::Array2<f32>> {
    let w_in = input_format.width();
    if root_orient.ncols() != w_in {
        return Err(MogenError::ShapeMismatch(format!(
            "root orientation must hold one {input_format} rotation, got width {}",
            root_orient.ncols()
        )));
    }
    if body_pose.ncols() % w_in != 0 || root_orient.nrows() != body_pose.nrows() {
        return Err(MogenError::ShapeMismatch(format!(
            "body pose {:?} does not match root orientation {:?}",
            body_pose.dim(),
            root_orient.dim()
        )));
    }
    let num_body_joints = body_pose.ncols() / w_in;
    if chain.len() != num_body_joints + 1 {
        return Err(MogenError::ShapeMismatch(format!(
            "kinematic chain covers {} joints but the pose holds {}",
            chain.len(),
            num_body_joints + 1
        )));
    }
    let w_out = output_format.width();
    let mut out = nd::Array2::<f32>::zeros((body_pose.nrows(), (num_body_joints + 1) * w_out));
    let mut globals: Vec<na::Rotation3<f32>> = vec![na::Rotation3::identity(); num_body_joints + 1];
    for i in 0..body_pose.nrows() {
        globals[0] = decode_one(root_orient.row(i), input_format);
        for j in 1..=num_body_joints {
            let local = decode_one(body_pose.slice(s![i, (j - 1) * w_in..j * w_in]), input_format);
            let parent = chain[j] as usize;
            globals[j] = globals[parent] * local;
        }
        for (j, global) in globals.iter().enumerate() {
            encode_one(global, output_format, out.slice_mut(s![i, j * w_out..(j + 1) * w_out]));
        }
    }
    Ok(out)
}

fn yaw_of(m: nd::ArrayView2<f32>) -> f32 {
    m[(1, 0)].atan2(m[(0, 0)])
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn rot_diff_first_frame_is_identity() {
        // frame 1 carries a large rotation; frame 0 must still come out as identity
        let seq = array![[0.0_f32, 0.0, 0.0], [1.4, -0.3, 0.8], [1.4, -0.3, 0.8]];
        let diffs = rot_diff(&seq, RotationRepr::AxisAngle, RotationRepr::SixD).unwrap();
        let expected = [1.0, 0.0, 0.0, 0.0, 1.0, 0.0];
        for (got, want) in diffs.row(0).iter().zip(expected) {
            assert_abs_diff_eq!(*got, want, epsilon = 1e-6);
        }
        // equal consecutive frames have identity deltas too
        for (got, want) in diffs.row(2).iter().zip(expected) {
            assert_abs_diff_eq!(*got, want, epsilon = 1e-5);
        }
    }

    #[test]
    fn rot_diff_recovers_incremental_yaw() {
        // yaw-only sequence: 0.0 -> 0.3 -> 0.7 rad about z
        let seq = array![[0.0_f32, 0.0, 0.0], [0.0, 0.0, 0.3], [0.0, 0.0, 0.7]];
        let diffs = rot_diff(&seq, RotationRepr::AxisAngle, RotationRepr::AxisAngle).unwrap();
        assert_abs_diff_eq!(diffs[(1, 2)], 0.3, epsilon = 1e-5);
        assert_abs_diff_eq!(diffs[(2, 2)], 0.4, epsilon = 1e-5);
        assert_abs_diff_eq!(diffs[(1, 0)], 0.0, epsilon = 1e-6);
    }

    #[test]
    fn change_for_rotates_into_local_frame() {
        // frame yawed 90 degrees: world x becomes local -y
        let vectors = array![[1.0_f32, 0.0, 0.0]];
        let orient = array![[0.0_f32, 0.0, std::f32::consts::FRAC_PI_2]];
        let frames = to_matrices(&orient, RotationRepr::AxisAngle).unwrap();
        let local = change_for(&vectors, &frames, true).unwrap();
        assert_abs_diff_eq!(local[(0, 0)], 0.0, epsilon = 1e-6);
        assert_abs_diff_eq!(local[(0, 1)], -1.0, epsilon = 1e-6);
        let world = change_for(&local, &frames, false).unwrap();
        assert_abs_diff_eq!(world[(0, 0)], 1.0, epsilon = 1e-6);
        assert_abs_diff_eq!(world[(0, 1)], 0.0, epsilon = 1e-6);
    }

    #[test]
    fn get_z_rot_discards_tilt() {
        let yaw = 0.6_f32;
        let tilted = na::Rotation3::from_euler_angles(0.0, 0.0, yaw) * na::Rotation3::from_euler_angles(0.4, 0.0, 0.0);
        let aa = tilted.scaled_axis();
        let orient = array![[aa.x, aa.y, aa.z]];
        let z_rot = get_z_rot(&orient, RotationRepr::AxisAngle).unwrap();
        let expected = na::Rotation3::from_euler_angles(0.0, 0.0, yaw);
        for r in 0..3 {
            for c in 0..3 {
                assert_abs_diff_eq!(z_rot[(0, r, c)], expected.matrix()[(r, c)], epsilon = 1e-5);
            }
        }
    }

    #[test]
    fn remove_z_rot_of_pure_yaw_is_identity() {
        let orient = array![[0.0_f32, 0.0, 1.2]];
        let residual = remove_z_rot(&orient, RotationRepr::AxisAngle).unwrap();
        let expected = [1.0, 0.0, 0.0, 0.0, 1.0, 0.0];
        for (got, want) in residual.row(0).iter().zip(expected) {
            assert_abs_diff_eq!(*got, want, epsilon = 1e-5);
        }
    }

    #[test]
    fn fk_composes_along_the_chain() {
        // three joints: root, child of root, child of joint 1, all yawed 0.2
        let root = array![[0.0_f32, 0.0, 0.2]];
        let body = array![[0.0_f32, 0.0, 0.2, 0.0, 0.0, 0.2]];
        let chain = [0u32, 0, 1];
        let globals = local_to_global_orient(&root, &body, &chain, RotationRepr::AxisAngle, RotationRepr::AxisAngle).unwrap();
        assert_abs_diff_eq!(globals[(0, 2)], 0.2, epsilon = 1e-5);
        assert_abs_diff_eq!(globals[(0, 5)], 0.4, epsilon = 1e-5);
        assert_abs_diff_eq!(globals[(0, 8)], 0.6, epsilon = 1e-5);
    }
}

use crate::common::types::RotationRepr;
use crate::error::{MogenError, Result};
use mogen_utils::interop::Vector3f;
use nalgebra as na;
use ndarray as nd;
use ndarray::prelude::*;
use std::str::FromStr;

/// Parse a `"from->to"` conversion mode over the declared representation set.
pub fn parse_mode(mode: &str) -> Result<(RotationRepr, RotationRepr)> {
    let mut parts = mode.split("->");
    let (from, to) = match (parts.next(), parts.next(), parts.next()) {
        (Some(from), Some(to), None) => (from, to),
        _ => return Err(MogenError::UnsupportedConversion(mode.to_owned())),
    };
    let from = RotationRepr::from_str(from).map_err(|_| MogenError::UnsupportedConversion(mode.to_owned()))?;
    let to = RotationRepr::from_str(to).map_err(|_| MogenError::UnsupportedConversion(mode.to_owned()))?;
    Ok((from, to))
}

/// Convert a flat per-frame batch of per-joint rotations between
/// representations, e.g. `transform_body_pose(&pose, "aa->6d")`.
///
/// Input is `[frames, joints * width_in]`; output is
/// `[frames, joints * width_out]` with the joint count inferred from the
/// input width.
pub fn transform_body_pose(pose: &nd::Array2<f32>, mode: &str) -> Result<nd::Array2<f32>> {
    let (from, to) = parse_mode(mode)?;
    convert(pose, from, to)
}

/// Typed-representation form of [`transform_body_pose`].
pub fn convert(pose: &nd::Array2<f32>, from: RotationRepr, to: RotationRepr) -> Result<nd::Array2<f32>> {
    let w_in = from.width();
    if pose.ncols() == 0 || pose.ncols() % w_in != 0 {
        return Err(MogenError::ShapeMismatch(format!(
            "pose width {} is not a multiple of the {from} width {w_in}",
            pose.ncols()
        )));
    }
    let num_joints = pose.ncols() / w_in;
    let w_out = to.width();
    let mut out = nd::Array2::<f32>::zeros((pose.nrows(), num_joints * w_out));
    for (row, mut out_row) in pose.axis_iter(nd::Axis(0)).zip(out.axis_iter_mut(nd::Axis(0))) {
        for j in 0..num_joints {
            let rot = decode_one(row.slice(s![j * w_in..(j + 1) * w_in]), from);
            encode_one(&rot, to, out_row.slice_mut(s![j * w_out..(j + 1) * w_out]));
        }
    }
    Ok(out)
}

/// Convert one rotation per frame into `[frames, 3, 3]` matrices.
pub fn to_matrices(orient: &nd::Array2<f32>, repr: RotationRepr) -> Result<nd::Array3<f32>> {
    if orient.ncols() != repr.width() {
        return Err(MogenError::ShapeMismatch(format!(
            "expected one {repr} rotation per frame ({} channels), got {}",
            repr.width(),
            orient.ncols()
        )));
    }
    let mut mats = nd::Array3::<f32>::zeros((orient.nrows(), 3, 3));
    for (row, mut out) in orient.axis_iter(nd::Axis(0)).zip(mats.axis_iter_mut(nd::Axis(0))) {
        let rot = decode_one(row, repr);
        mogen_utils::interop::matrix3_to_view(rot.matrix(), out.view_mut());
    }
    Ok(mats)
}

pub(crate) fn decode_one(chunk: ArrayView1<f32>, repr: RotationRepr) -> na::Rotation3<f32> {
    match repr {
        RotationRepr::AxisAngle => na::Rotation3::from_scaled_axis(Vector3f::new(chunk[0], chunk[1], chunk[2])),
        RotationRepr::Euler => na::Rotation3::from_euler_angles(chunk[0], chunk[1], chunk[2]),
        RotationRepr::RotMat => {
            let m = na::Matrix3::new(
                chunk[0], chunk[1], chunk[2], chunk[3], chunk[4], chunk[5], chunk[6], chunk[7], chunk[8],
            );
            na::Rotation3::from_matrix_unchecked(m)
        }
        RotationRepr::SixD => {
            // first two matrix columns, re-orthonormalized (Gram-Schmidt)
            let a1 = Vector3f::new(chunk[0], chunk[1], chunk[2]);
            let a2 = Vector3f::new(chunk[3], chunk[4], chunk[5]);
            let b1 = a1.normalize();
            let b2 = (a2 - b1.dot(&a2) * b1).normalize();
            let b3 = b1.cross(&b2);
            na::Rotation3::from_matrix_unchecked(na::Matrix3::from_columns(&[b1, b2, b3]))
        }
    }
}

pub(crate) fn encode_one(rot: &na::Rotation3<f32>, repr: RotationRepr, mut out: ArrayViewMut1<f32>) {
    let m = rot.matrix();
    match repr {
        RotationRepr::AxisAngle => {
            let aa = rot.scaled_axis();
            out[0] = aa.x;
            out[1] = aa.y;
            out[2] = aa.z;
        }
        RotationRepr::Euler => {
            let (roll, pitch, yaw) = rot.euler_angles();
            out[0] = roll;
            out[1] = pitch;
            out[2] = yaw;
        }
        RotationRepr::RotMat => {
            for i in 0..3 {
                for j in 0..3 {
                    out[i * 3 + j] = m[(i, j)];
                }
            }
        }
        RotationRepr::SixD => {
            for col in 0..2 {
                for row in 0..3 {
                    out[col * 3 + row] = m[(row, col)];
                }
            }
        }
    }
}

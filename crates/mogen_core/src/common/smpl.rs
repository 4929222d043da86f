//! Joint-tree constants shared by the SMPL family.
//!
//! The body tree (pelvis + 21 body joints) is identical across SMPL-H and
//! SMPL-X; the models differ only in the hand/face joints appended after it.

/// Body joints excluding the pelvis.
pub const NUM_BODY_JOINTS: usize = 21;

/// Total joints in an SMPL-H skeleton (body + 2x15 hand joints).
pub const NUM_JOINTS_SMPL_H: usize = 52;

/// Total joints in an SMPL-X skeleton.
pub const NUM_JOINTS_SMPL_X: usize = 55;

/// Parent index per joint for the body tree, pelvis first. The pelvis entry
/// is a self-reference and is never followed.
pub const PARENT_ID_PER_JOINT: [u32; NUM_BODY_JOINTS + 1] = [
    0, 0, 0, 0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 9, 9, 12, 13, 14, 16, 17, 18, 19,
];

pub const JOINT_NAMES: [&str; NUM_BODY_JOINTS + 1] = [
    "pelvis",
    "left_hip",
    "right_hip",
    "spine1",
    "left_knee",
    "right_knee",
    "spine2",
    "left_ankle",
    "right_ankle",
    "spine3",
    "left_foot",
    "right_foot",
    "neck",
    "left_collar",
    "right_collar",
    "head",
    "left_shoulder",
    "right_shoulder",
    "left_elbow",
    "right_elbow",
    "left_wrist",
    "right_wrist",
];

/// Wrist positions within the 21-joint body pose (pelvis excluded).
pub const WRIST_BODY_JOINTS: [usize; 2] = [19, 20];

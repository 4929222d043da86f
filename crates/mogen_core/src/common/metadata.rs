use super::{smpl, types::BodyModel};

/// Kinematic description of a body model, the only thing the dataset needs
/// from the external body-model collaborator.
#[derive(Clone, Debug)]
pub struct BodyMetadata {
    pub num_body_joints: usize,
    pub num_joints: usize,
    /// Parent index per joint of the body tree, pelvis first.
    pub joint_parents: Vec<u32>,
    pub joint_names: Vec<String>,
    /// Wrist positions within the pelvis-less body pose.
    pub wrist_joints: [usize; 2],
}

pub fn body_metadata(body_model: BodyModel) -> BodyMetadata {
    let num_joints = match body_model {
        BodyModel::SmplH => smpl::NUM_JOINTS_SMPL_H,
        BodyModel::SmplX => smpl::NUM_JOINTS_SMPL_X,
    };
    BodyMetadata {
        num_body_joints: smpl::NUM_BODY_JOINTS,
        num_joints,
        joint_parents: smpl::PARENT_ID_PER_JOINT.to_vec(),
        joint_names: smpl::JOINT_NAMES.map(std::string::ToString::to_string).to_vec(),
        wrist_joints: smpl::WRIST_BODY_JOINTS,
    }
}

//! Data pipeline for diffusion-based human motion synthesis.
//!
//! The crate turns raw SMPL-family motion sequences (axis-angle joint
//! rotations, pelvis translations, joint positions) into normalized feature
//! tensors for an external training loop:
//!
//! - [`transforms`] - rotation-representation conversions and
//!   reference-frame changes.
//! - [`features`] - the name-driven registry of derived kinematic features.
//! - [`dataset`] - per-split sample assembly, corpus statistics and the
//!   deterministic train/val/test split.
//! - [`codec`] - whole-file corpus archive reading and writing.
//! - [`common`] - shared types, the body-model metadata collaborator, the
//!   data config and the cluster submission interface.

pub mod codec;
pub mod common;
pub mod dataset;
pub mod error;
pub mod features;
pub mod transforms;

pub use common::config::DataConfig;
pub use common::motion::MotionSequence;
pub use common::types::{BodyModel, NormType, RotationRepr, Split};
pub use dataset::dataset::MotionDataset;
pub use dataset::module::MotionDataModule;
pub use dataset::sample::{FeatureBundle, MotionSample};
pub use error::{MogenError, Result};
pub use features::{Feature, FeatureExtractor};

use crate::common::types::Split;
use crate::features::Feature;
use ndarray as nd;
use std::collections::BTreeMap;

/// Source/target tensors of one feature, plus the normalized variants when
/// statistics were available.
#[derive(Clone, Debug)]
pub struct FeatureBundle {
    /// Full-frame-rate tensor.
    pub source: nd::Array2<f32>,
    /// Every 4th frame of `source`.
    pub target: nd::Array2<f32>,
    pub source_norm: Option<nd::Array2<f32>>,
    pub target_norm: Option<nd::Array2<f32>>,
}

/// One assembled sample as handed to the external training collator.
#[derive(Clone, Debug)]
pub struct MotionSample {
    pub features: BTreeMap<Feature, FeatureBundle>,
    pub n_frames_orig: usize,
    pub framerate: f32,
    pub length_s: usize,
    pub length_t: usize,
    /// Placeholder caption until the corpus carries real labels.
    pub text: String,
    pub fname: String,
    pub split: Split,
    pub id: String,
}

use crate::common::metadata::BodyMetadata;
use crate::common::motion::MotionSequence;
use crate::common::types::{NormType, RotationRepr};
use crate::dataset::sample::{FeatureBundle, MotionSample};
use crate::dataset::stats::{load_stats, normalize, Statistics};
use crate::error::{MogenError, Result};
use crate::features::{Feature, FeatureExtractor, MetaFeature};
use log::error;
use mogen_utils::array::{stride_indices, GatherRows};
use ndarray as nd;
use std::collections::BTreeMap;
use std::path::Path;
use strum::IntoEnumIterator;

/// Every 4th source frame forms the temporally subsampled target view.
pub const TARGET_STRIDE: usize = 4;

/// Caption attached to every sample until the corpus carries real labels.
const PLACEHOLDER_TEXT: &str = "faster";

/// Assembles per-sample feature dictionaries for one corpus split.
///
/// Read-only after construction; statistics are loaded from the configured
/// file when it exists at build time.
pub struct MotionDataset {
    data: Vec<MotionSequence>,
    extractor: FeatureExtractor,
    load_feats: Vec<Feature>,
    norm_type: NormType,
    stats: Option<Statistics>,
    do_augmentations: bool,
}

impl MotionDataset {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        data: Vec<MotionSequence>,
        n_body_joints: usize,
        stats_file: &Path,
        norm_type: NormType,
        body: &BodyMetadata,
        rot_repr: RotationRepr,
        load_feats: Vec<Feature>,
        do_augmentations: bool,
    ) -> Result<Self> {
        let stats = if stats_file.exists() {
            Some(load_stats(stats_file)?)
        } else {
            None
        };
        Ok(Self {
            data,
            extractor: FeatureExtractor::new(n_body_joints, rot_repr, body),
            load_feats,
            norm_type,
            stats,
            do_augmentations,
        })
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn stats(&self) -> Option<&Statistics> {
        self.stats.as_ref()
    }

    pub fn do_augmentations(&self) -> bool {
        self.do_augmentations
    }

    /// Assemble the requested features of one sequence: source tensors,
    /// every-4th-frame targets, normalized variants where statistics exist,
    /// and the sequence metadata.
    pub fn get(&self, idx: usize) -> Result<MotionSample> {
        let seq = self.sequence(idx)?;
        let duration = seq.num_frames();
        let target_idx = stride_indices(duration, TARGET_STRIDE);

        let mut features = BTreeMap::new();
        for &feature in &self.load_feats {
            let source = self.extractor.extract(feature, seq)?;
            let target = source.gather_rows(&target_idx);
            let source_norm = self.normalize_feats(&source, feature);
            let target_norm = source_norm.as_ref().map(|normed| normed.gather_rows(&target_idx));
            features.insert(
                feature,
                FeatureBundle {
                    source,
                    target,
                    source_norm,
                    target_norm,
                },
            );
        }

        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        Ok(MotionSample {
            features,
            n_frames_orig: self.extractor.extract_meta(MetaFeature::NFramesOrig, seq) as usize,
            framerate: self.extractor.extract_meta(MetaFeature::Framerate, seq),
            length_s: duration,
            length_t: duration,
            text: PLACEHOLDER_TEXT.to_owned(),
            fname: seq.fname.clone(),
            split: seq.split,
            id: seq.id.clone(),
        })
    }

    /// Every registered feature of one sequence, regardless of the requested
    /// subset. Drives statistics computation only.
    pub fn get_all_features(&self, idx: usize) -> Result<BTreeMap<Feature, nd::Array2<f32>>> {
        let seq = self.sequence(idx)?;
        Feature::iter()
            .map(|feature| Ok((feature, self.extractor.extract(feature, seq)?)))
            .collect()
    }

    /// Total per-frame width of the requested features, taken from one fully
    /// assembled sample; sizes an external model's input layer.
    pub fn features_dimensionality(&self) -> Result<usize> {
        let sample = self.get(0)?;
        Ok(sample.features.values().map(|bundle| bundle.source.ncols()).sum())
    }

    fn sequence(&self, idx: usize) -> Result<&MotionSequence> {
        self.data.get(idx).ok_or(MogenError::IndexOutOfBounds {
            idx,
            len: self.data.len(),
        })
    }

    /// Missing statistics for a feature are logged and skipped rather than
    /// failing the whole sample.
    fn normalize_feats(&self, feats: &nd::Array2<f32>, feature: Feature) -> Option<nd::Array2<f32>> {
        let stats = self.stats.as_ref()?;
        match stats.get(&feature) {
            Some(feature_stats) => Some(normalize(feats, feature_stats, self.norm_type)),
            None => {
                error!("tried to normalize {feature} but found no statistics for it; recompute the statistics file");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::metadata::body_metadata;
    use crate::common::types::{BodyModel, Split};
    use crate::dataset::stats::{save_stats, FeatureStats, Statistics};
    use approx::assert_abs_diff_eq;
    use ndarray::array;
    use std::path::PathBuf;

    fn sequence(frames: usize, id: &str) -> MotionSequence {
        let mut trans = nd::Array2::<f32>::zeros((frames, 3));
        for (i, mut row) in trans.axis_iter_mut(nd::Axis(0)).enumerate() {
            row[0] = i as f32;
        }
        MotionSequence::new(
            nd::Array2::zeros((frames, 66)),
            trans,
            nd::Array3::zeros((frames, 22, 3)),
            30.0,
            id.into(),
            Split::Train,
            format!("{id}.npz"),
        )
        .unwrap()
    }

    fn dataset(data: Vec<MotionSequence>, stats_file: &Path, load_feats: Vec<Feature>) -> MotionDataset {
        MotionDataset::new(
            data,
            22,
            stats_file,
            NormType::Std,
            &body_metadata(BodyModel::SmplH),
            RotationRepr::SixD,
            load_feats,
            false,
        )
        .unwrap()
    }

    fn missing_stats_path() -> PathBuf {
        PathBuf::from("does_not_exist_stats.npz")
    }

    #[test]
    fn target_takes_every_fourth_frame() {
        let ds = dataset(
            vec![sequence(20, "a")],
            &missing_stats_path(),
            vec![Feature::BodyTransl],
        );
        let sample = ds.get(0).unwrap();
        let bundle = &sample.features[&Feature::BodyTransl];
        assert_eq!(bundle.source.nrows(), 20);
        assert_eq!(bundle.target.nrows(), 5);
        for (row, src_frame) in [0usize, 4, 8, 12, 16].iter().enumerate() {
            assert_abs_diff_eq!(bundle.target[(row, 0)], *src_frame as f32, epsilon = 0.0);
        }
        assert!(bundle.source_norm.is_none());
        assert_eq!(sample.length_s, 20);
        assert_eq!(sample.text, "faster");
        assert_eq!(sample.id, "a");
    }

    #[test]
    fn normalization_applies_when_stats_cover_the_feature() {
        let dir = tempfile::tempdir().unwrap();
        let stats_file = dir.path().join("stats.npz");
        let mut stats = Statistics::new();
        stats.insert(
            Feature::BodyTransl,
            FeatureStats {
                min: array![0.0, 0.0, 0.0],
                max: array![1.0, 1.0, 1.0],
                mean: array![0.0, 0.0, 0.0],
                std: array![1.0, 1.0, 1.0],
            },
        );
        save_stats(&stats_file, &stats).unwrap();

        let ds = dataset(
            vec![sequence(8, "a")],
            &stats_file,
            vec![Feature::BodyTransl, Feature::BodyTranslDelta],
        );
        let sample = ds.get(0).unwrap();
        let bundle = &sample.features[&Feature::BodyTransl];
        // mean 0 / std 1 leaves values in place up to the epsilon guard
        let normed = bundle.source_norm.as_ref().unwrap();
        for (a, b) in bundle.source.iter().zip(normed.iter()) {
            assert_abs_diff_eq!(*a, *b, epsilon = 1e-3);
        }
        assert_eq!(bundle.target_norm.as_ref().unwrap().nrows(), 2);
        // the delta feature has no cached stats: logged and left unnormalized
        let delta = &sample.features[&Feature::BodyTranslDelta];
        assert!(delta.source_norm.is_none());
        assert!(delta.target_norm.is_none());
    }

    #[test]
    fn get_all_features_covers_the_whole_registry() {
        use strum::IntoEnumIterator;
        let ds = dataset(vec![sequence(6, "a")], &missing_stats_path(), vec![]);
        let all = ds.get_all_features(0).unwrap();
        assert_eq!(all.len(), Feature::iter().count());
    }

    #[test]
    fn features_dimensionality_sums_requested_widths() {
        let ds = dataset(
            vec![sequence(6, "a")],
            &missing_stats_path(),
            vec![Feature::BodyTransl, Feature::BodyOrient, Feature::BodyPose],
        );
        // 3 + 6 + 21 * 6
        assert_eq!(ds.features_dimensionality().unwrap(), 3 + 6 + 126);
    }

    #[test]
    fn out_of_bounds_index_is_reported() {
        let ds = dataset(vec![sequence(6, "a")], &missing_stats_path(), vec![Feature::BodyTransl]);
        assert!(matches!(ds.get(3), Err(MogenError::IndexOutOfBounds { idx: 3, len: 1 })));
    }
}

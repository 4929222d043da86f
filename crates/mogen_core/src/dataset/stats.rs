//! Per-feature corpus statistics with NPZ persistence.
//!
//! Statistics are computed once over the pooled train+val split and cached
//! to disk; when the configured file already exists its contents are trusted
//! as-is and loaded instead (no fingerprint check against the corpus).

use crate::common::types::NormType;
use crate::dataset::dataset::MotionDataset;
use crate::error::{MogenError, Result};
use crate::features::Feature;
use log::info;
use ndarray as nd;
use ndarray_npy::{NpzReader, NpzWriter};
use std::collections::BTreeMap;
use std::fs::File;
use std::path::Path;
use strum::IntoEnumIterator;

/// Guards against division by zero in both normalization modes.
pub const NORM_EPS: f32 = 1e-5;

/// Pointwise summary of one feature over every frame of every pooled sample.
#[derive(Clone, Debug, PartialEq)]
pub struct FeatureStats {
    pub min: nd::Array1<f32>,
    pub max: nd::Array1<f32>,
    pub mean: nd::Array1<f32>,
    pub std: nd::Array1<f32>,
}

pub type Statistics = BTreeMap<Feature, FeatureStats>;

/// Apply one feature's cached statistics to a `[frames, dim]` tensor.
pub fn normalize(feats: &nd::Array2<f32>, stats: &FeatureStats, norm_type: NormType) -> nd::Array2<f32> {
    match norm_type {
        NormType::Std => (feats - &stats.mean) / &(&stats.std + NORM_EPS),
        NormType::Norm => (feats - &stats.min) / &(&stats.max - &stats.min + NORM_EPS),
    }
}

/// Streaming per-dimension accumulator (Welford) in f64, so the variance
/// stays stable over corpus-scale frame counts. NaN input propagates into
/// every statistic it touches.
struct RunningStats {
    count: f64,
    mean: Vec<f64>,
    m2: Vec<f64>,
    min: Vec<f32>,
    max: Vec<f32>,
}

impl RunningStats {
    fn new(dim: usize) -> Self {
        Self {
            count: 0.0,
            mean: vec![0.0; dim],
            m2: vec![0.0; dim],
            min: vec![f32::INFINITY; dim],
            max: vec![f32::NEG_INFINITY; dim],
        }
    }

    fn update(&mut self, row: nd::ArrayView1<f32>) {
        self.count += 1.0;
        for (d, &v) in row.iter().enumerate() {
            if v.is_nan() || v < self.min[d] {
                self.min[d] = v;
            }
            if v.is_nan() || v > self.max[d] {
                self.max[d] = v;
            }
            let v = f64::from(v);
            let delta = v - self.mean[d];
            self.mean[d] += delta / self.count;
            self.m2[d] += delta * (v - self.mean[d]);
        }
    }

    #[allow(clippy::cast_possible_truncation)]
    fn finalize(self) -> FeatureStats {
        let denom = self.count - 1.0; // sample std, NaN for a single frame
        FeatureStats {
            min: nd::Array1::from_vec(self.min),
            max: nd::Array1::from_vec(self.max),
            mean: nd::Array1::from_iter(self.mean.iter().map(|&m| m as f32)),
            std: nd::Array1::from_iter(self.m2.iter().map(|&m2| (m2 / denom).sqrt() as f32)),
        }
    }
}

/// Compute-or-load the statistics artifact for the given pooled dataset.
///
/// When `stats_path` exists nothing is computed; the file is loaded whole
/// and trusted regardless of what corpus produced it.
pub fn calculate_feature_stats(dataset: &MotionDataset, stats_path: &Path) -> Result<Statistics> {
    if !stats_path.exists() {
        info!("no dataset statistics found, calculating and saving to {}", stats_path.display());
        let stats = compute_stats(dataset)?;
        save_stats(stats_path, &stats)?;
    }
    info!("loading feature statistics from {}", stats_path.display());
    load_stats(stats_path)
}

/// One pass over every registered feature of every sample in the pool.
pub fn compute_stats(dataset: &MotionDataset) -> Result<Statistics> {
    let mut accumulators: BTreeMap<Feature, RunningStats> = BTreeMap::new();
    for i in 0..dataset.len() {
        let all = dataset.get_all_features(i)?;
        for (feature, values) in all {
            let acc = accumulators
                .entry(feature)
                .or_insert_with(|| RunningStats::new(values.ncols()));
            for row in values.axis_iter(nd::Axis(0)) {
                acc.update(row);
            }
        }
    }
    Ok(accumulators.into_iter().map(|(feature, acc)| (feature, acc.finalize())).collect())
}

pub fn save_stats(path: &Path, stats: &Statistics) -> Result<()> {
    let file = File::create(path).map_err(|e| stats_err(path, &e))?;
    let mut npz = NpzWriter::new_compressed(file);
    for (feature, fs) in stats {
        npz.add_array(format!("{feature}.min"), &fs.min).map_err(|e| stats_err(path, &e))?;
        npz.add_array(format!("{feature}.max"), &fs.max).map_err(|e| stats_err(path, &e))?;
        npz.add_array(format!("{feature}.mean"), &fs.mean).map_err(|e| stats_err(path, &e))?;
        npz.add_array(format!("{feature}.std"), &fs.std).map_err(|e| stats_err(path, &e))?;
    }
    npz.finish().map_err(|e| stats_err(path, &e))?;
    Ok(())
}

/// Load the artifact whole. Features missing from the archive are simply
/// absent from the returned mapping; normalization degrades per feature.
pub fn load_stats(path: &Path) -> Result<Statistics> {
    let file = File::open(path).map_err(|e| stats_err(path, &e))?;
    let mut npz = NpzReader::new(file).map_err(|e| stats_err(path, &e))?;
    let mut stats = Statistics::new();
    for feature in Feature::iter() {
        let min: nd::Array1<f32> = match npz.by_name(&format!("{feature}.min")) {
            Ok(arr) => arr,
            Err(_) => continue,
        };
        let max = npz.by_name(&format!("{feature}.max")).map_err(|e| stats_err(path, &e))?;
        let mean = npz.by_name(&format!("{feature}.mean")).map_err(|e| stats_err(path, &e))?;
        let std = npz.by_name(&format!("{feature}.std")).map_err(|e| stats_err(path, &e))?;
        stats.insert(feature, FeatureStats { min, max, mean, std });
    }
    Ok(stats)
}

fn stats_err(path: &Path, e: &dyn std::fmt::Display) -> MogenError {
    MogenError::StatsIo {
        path: path.display().to_string(),
        reason: e.to_string(),
    }
}

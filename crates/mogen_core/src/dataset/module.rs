use crate::codec::corpus::{read_corpus, CorpusRecord};
use crate::common::config::DataConfig;
use crate::common::metadata::body_metadata;
use crate::common::motion::MotionSequence;
use crate::common::types::Split;
use crate::dataset::dataset::MotionDataset;
use crate::dataset::split::assign_splits;
use crate::dataset::stats::{calculate_feature_stats, Statistics};
use crate::error::Result;
use crate::features::Feature;
use log::info;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use strum::IntoEnumIterator;

/// Loads the corpus, assigns the deterministic split and owns one
/// [`MotionDataset`] per split, with statistics computed-or-loaded against
/// the pooled train+val data before the final assemblers are built.
pub struct MotionDataModule {
    datasets: BTreeMap<Split, MotionDataset>,
    stats: Statistics,
    nfeats: usize,
}

/// The small fixed corpus used instead of the full one in debug mode.
pub fn debug_corpus_path(datapath: &Path) -> PathBuf {
    datapath.parent().unwrap_or_else(|| Path::new(".")).join("debug_corpus.npz")
}

impl MotionDataModule {
    pub fn new(cfg: &DataConfig) -> Result<Self> {
        let load_feats = Feature::parse_all(&cfg.load_feats)?;
        let corpus_path = if cfg.debug {
            debug_corpus_path(&cfg.datapath)
        } else {
            cfg.datapath.clone()
        };
        let records = read_corpus(&corpus_path)?;

        let ids: Vec<String> = records.keys().cloned().collect();
        let assignment = assign_splits(&ids, cfg.split_seed);
        let body = body_metadata(cfg.body_model);

        let mut sequences: Vec<MotionSequence> = Vec::with_capacity(records.len());
        for (id, record) in records {
            let split = assignment[&id];
            sequences.push(into_sequence(record, id, split)?);
        }

        // statistics come from the pooled train+val data and must exist on
        // disk before the per-split assemblers load them
        let pool: Vec<MotionSequence> = sequences
            .iter()
            .filter(|seq| seq.split != Split::Test)
            .cloned()
            .collect();
        let pool_dataset = MotionDataset::new(
            pool,
            cfg.n_body_joints,
            &cfg.stats_file,
            cfg.norm_type,
            &body,
            cfg.rot_repr,
            load_feats.clone(),
            false,
        )?;
        let stats = calculate_feature_stats(&pool_dataset, &cfg.stats_file)?;

        let mut datasets = BTreeMap::new();
        for split in Split::iter() {
            let members: Vec<MotionSequence> = sequences.iter().filter(|seq| seq.split == split).cloned().collect();
            let dataset = MotionDataset::new(
                members,
                cfg.n_body_joints,
                &cfg.stats_file,
                cfg.norm_type,
                &body,
                cfg.rot_repr,
                load_feats.clone(),
                split != Split::Test,
            )?;
            info!("set up {split} set with {} items", dataset.len());
            datasets.insert(split, dataset);
        }

        let train = &datasets[&Split::Train];
        let nfeats = if train.is_empty() { 0 } else { train.features_dimensionality()? };

        Ok(Self { datasets, stats, nfeats })
    }

    pub fn dataset(&self, split: Split) -> &MotionDataset {
        &self.datasets[&split]
    }

    pub fn stats(&self) -> &Statistics {
        &self.stats
    }

    /// Total per-frame width of the requested features; sizes the model's
    /// input layer.
    pub fn nfeats(&self) -> usize {
        self.nfeats
    }
}

fn into_sequence(record: CorpusRecord, id: String, split: Split) -> Result<MotionSequence> {
    let fname = record.fname;
    MotionSequence::new(record.rots, record.trans, record.joint_positions, record.fps, id, split, fname)
}

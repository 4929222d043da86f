use crate::common::types::{BodyModel, NormType, RotationRepr};
use crate::error::{MogenError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Configuration of the data module, deserializable from the experiment's
/// JSON config.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DataConfig {
    /// Corpus archive holding every raw sequence.
    pub datapath: PathBuf,
    /// Where feature statistics are cached.
    pub stats_file: PathBuf,
    /// Feature names the training run requests.
    pub load_feats: Vec<String>,
    /// Swap in the small fixed corpus for fast iteration.
    #[serde(default)]
    pub debug: bool,
    #[serde(default = "default_split_seed")]
    pub split_seed: u64,
    #[serde(default = "default_n_body_joints")]
    pub n_body_joints: usize,
    #[serde(default)]
    pub norm_type: NormType,
    #[serde(default)]
    pub rot_repr: RotationRepr,
    #[serde(default)]
    pub body_model: BodyModel,
}

fn default_split_seed() -> u64 {
    42
}

fn default_n_body_joints() -> usize {
    22
}

impl DataConfig {
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        let reader = std::io::BufReader::new(file);
        serde_json::from_reader(reader).map_err(|e| MogenError::Config(format!("{}: {e}", path.display())))
    }
}

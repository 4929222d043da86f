use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};

/// Rotation representations understood by the transform library.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Display, EnumString, EnumIter, Serialize, Deserialize)]
pub enum RotationRepr {
    #[strum(serialize = "aa")]
    #[serde(rename = "aa")]
    AxisAngle,
    #[strum(serialize = "rot")]
    #[serde(rename = "rot")]
    RotMat,
    #[strum(serialize = "6d")]
    #[serde(rename = "6d")]
    SixD,
    #[strum(serialize = "euler")]
    #[serde(rename = "euler")]
    Euler,
}

impl RotationRepr {
    /// Number of scalars one rotation occupies in a flat per-frame layout.
    pub fn width(self) -> usize {
        match self {
            RotationRepr::AxisAngle | RotationRepr::Euler => 3,
            RotationRepr::RotMat => 9,
            RotationRepr::SixD => 6,
        }
    }
}

impl Default for RotationRepr {
    fn default() -> Self {
        RotationRepr::SixD
    }
}

/// Corpus split a sequence belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Display, EnumString, EnumIter, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Split {
    Train = 0,
    Val,
    Test,
}

/// Feature normalization mode.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Display, EnumString, Serialize, Deserialize)]
pub enum NormType {
    /// z-score: `(x - mean) / (std + eps)`
    #[strum(serialize = "std")]
    #[serde(rename = "std")]
    Std,
    /// min-max: `(x - min) / (max - min + eps)`
    #[strum(serialize = "norm")]
    #[serde(rename = "norm")]
    Norm,
}

impl Default for NormType {
    fn default() -> Self {
        NormType::Std
    }
}

/// Parametric body-model family a corpus was fitted with.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum BodyModel {
    SmplH,
    SmplX,
}

impl Default for BodyModel {
    fn default() -> Self {
        BodyModel::SmplH
    }
}

//! Typed interface to the external cluster submission collaborator. The
//! collaborator turns these descriptors into batch-scheduler submissions;
//! none of that machinery lives here.

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

/// One training job to be launched.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct JobDescriptor {
    pub expname: String,
    pub run_id: String,
    /// Extra command-line overrides appended verbatim.
    pub args: String,
    pub gpus: usize,
}

/// GPU architecture families the scheduler can match on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum GpuArch {
    Volta,
    Quadro,
    Rtx,
    Nvidia,
}

/// Resource constraints shared by every job of one submission.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ResourcePolicy {
    /// Minimum GPU memory in MB.
    pub gpu_min_mem: u32,
    pub gpu_archs: Vec<GpuArch>,
    pub bid_amount: u32,
    pub num_workers: usize,
    /// Host memory request in MB.
    pub memory_mb: u32,
}

impl Default for ResourcePolicy {
    fn default() -> Self {
        Self {
            gpu_min_mem: 32_000,
            gpu_archs: vec![GpuArch::Volta, GpuArch::Quadro, GpuArch::Rtx, GpuArch::Nvidia],
            bid_amount: 10,
            num_workers: 32,
            memory_mb: 128_000,
        }
    }
}

/// One entry of the known-device catalog.
#[derive(Clone, Copy, Debug)]
pub struct GpuSpec {
    pub device_name: &'static str,
    pub arch: GpuArch,
    pub mem_mb: u32,
}

pub const GPU_CATALOG: &[GpuSpec] = &[
    GpuSpec {
        device_name: "Tesla V100-PCIE-16GB",
        arch: GpuArch::Volta,
        mem_mb: 16_000,
    },
    GpuSpec {
        device_name: "Tesla V100-PCIE-32GB",
        arch: GpuArch::Volta,
        mem_mb: 32_000,
    },
    GpuSpec {
        device_name: "Tesla V100-SXM2-32GB",
        arch: GpuArch::Volta,
        mem_mb: 32_000,
    },
    GpuSpec {
        device_name: "NVIDIA A100-SXM4-80GB",
        arch: GpuArch::Nvidia,
        mem_mb: 80_000,
    },
    GpuSpec {
        device_name: "NVIDIA A100-SXM4-40GB",
        arch: GpuArch::Nvidia,
        mem_mb: 40_000,
    },
    GpuSpec {
        device_name: "Quadro RTX 6000",
        arch: GpuArch::Quadro,
        mem_mb: 24_000,
    },
];

/// Resolve a policy's architecture allow-list into concrete device names.
///
/// # Panics
/// Will panic if no catalog entry satisfies the policy.
pub fn select_gpus(policy: &ResourcePolicy) -> Vec<&'static str> {
    let names: Vec<&'static str> = GPU_CATALOG
        .iter()
        .filter(|spec| spec.mem_mb >= policy.gpu_min_mem && policy.gpu_archs.contains(&spec.arch))
        .map(|spec| spec.device_name)
        .collect();
    assert!(!names.is_empty(), "no suitable GPU model for min mem {} MB", policy.gpu_min_mem);
    names
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_policy_selects_large_devices() {
        let names = select_gpus(&ResourcePolicy::default());
        assert!(names.contains(&"Tesla V100-PCIE-32GB"));
        assert!(names.contains(&"NVIDIA A100-SXM4-80GB"));
        assert!(!names.contains(&"Tesla V100-PCIE-16GB")); // below 32 GB
    }

    #[test]
    fn arch_allow_list_filters() {
        let policy = ResourcePolicy {
            gpu_min_mem: 16_000,
            gpu_archs: vec![GpuArch::Quadro],
            ..ResourcePolicy::default()
        };
        assert_eq!(select_gpus(&policy), vec!["Quadro RTX 6000"]);
    }

    #[test]
    #[should_panic(expected = "no suitable GPU model")]
    fn impossible_policy_panics() {
        let policy = ResourcePolicy {
            gpu_min_mem: 200_000,
            ..ResourcePolicy::default()
        };
        select_gpus(&policy);
    }
}

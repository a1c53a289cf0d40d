use serde::{Deserialize, Serialize};

/// Execution site for a task: the originating device, the nearby edge
/// datacenter, or the remote cloud datacenter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tier {
    Local,
    Edge,
    Cloud,
}

impl Tier {
    /// All tiers in selection-precedence order (Local > Edge > Cloud).
    pub const ALL: [Tier; 3] = [Tier::Local, Tier::Edge, Tier::Cloud];

    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Local => "local",
            Tier::Edge => "edge",
            Tier::Cloud => "cloud",
        }
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Which tiers a scenario offloads across. Two-tier scenarios keep the
/// cloud out of the candidate set entirely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TierTopology {
    TwoTier,
    ThreeTier,
}

impl Default for TierTopology {
    fn default() -> Self {
        TierTopology::ThreeTier
    }
}

/// Opaque handle for a VM instance, assigned by the site manager that
/// reports it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InstanceId(pub u64);

impl std::fmt::Display for InstanceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One generated unit of computation.
///
/// Created by the workload generator with `assigned_tier` unset; the
/// orchestrator assigns the tier exactly once. Lengths are in million
/// instructions, data volumes in KB, times in simulation seconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskDescriptor {
    pub device_id: u32,
    pub app_type: usize,
    pub submission_time: f64,
    pub length_mi: f64,
    pub input_size_kb: f64,
    pub output_size_kb: f64,
    pub assigned_tier: Option<Tier>,
}

impl TaskDescriptor {
    /// Total data volume moved when the task is offloaded.
    pub fn data_size_kb(&self) -> f64 {
        self.input_size_kb + self.output_size_kb
    }
}

/// Result of one orchestrator invocation. Owned by the caller; the
/// orchestrator retains no reference to it.
///
/// `instance` is populated only by [`crate::orchestrator::Orchestrator::decide_with_instance`]
/// and only for remote tiers. A remote tier with `instance: None` means no
/// instance had enough headroom — a site-level rejection the caller must
/// respect.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlacementDecision {
    pub tier: Tier,
    pub instance: Option<InstanceId>,
}

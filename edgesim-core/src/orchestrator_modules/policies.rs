//! Offloading policies and their decision rules
//!
//! The policy set is closed: a scenario names one policy up front and an
//! unknown name is a fatal configuration error. Each rule is a pure
//! function of the task, its application profile and the current edge
//! load; infeasibility (no tier meets the deadline) is a defined outcome
//! with a best-effort fallback, never an error.

use std::str::FromStr;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::ApplicationProfile;
use crate::error::EdgeSimError;
use crate::types::{TaskDescriptor, Tier, TierTopology};

/// Edge utilization (percent) above which GREEDY_ENERGY spills to the cloud.
pub const GREEDY_EDGE_UTILIZATION_CUTOFF: f64 = 80.0;
/// Edge load fraction above which ENERGY_AWARE demands large energy savings.
pub const HIGH_LOAD_THRESHOLD: f64 = 0.8;
/// Edge load fraction above which ENERGY_AWARE demands moderate savings.
pub const MEDIUM_LOAD_THRESHOLD: f64 = 0.5;
/// Edge utilization (percent) above which the EADC edge score is penalized.
pub const EADC_EDGE_PENALTY_THRESHOLD: f64 = 85.0;

/// Placement policy for a scenario run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OffloadPolicy {
    /// Uniform pick over the candidate tier set
    Random,
    /// Never offload
    LocalOnly,
    /// Always offload to the edge
    EdgeOnly,
    /// Minimize device energy, spill to cloud on a busy edge
    GreedyEnergy,
    /// Feasibility-first completion-time minimization
    GreedyDeadline,
    /// Deadline-gated energy comparison, local vs edge
    EnergyAware,
    /// Energy-aware deadline-constrained weighted scoring over three tiers
    Eadc,
}

impl OffloadPolicy {
    pub const ALL: [OffloadPolicy; 7] = [
        OffloadPolicy::Random,
        OffloadPolicy::LocalOnly,
        OffloadPolicy::EdgeOnly,
        OffloadPolicy::GreedyEnergy,
        OffloadPolicy::GreedyDeadline,
        OffloadPolicy::EnergyAware,
        OffloadPolicy::Eadc,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OffloadPolicy::Random => "RANDOM",
            OffloadPolicy::LocalOnly => "LOCAL_ONLY",
            OffloadPolicy::EdgeOnly => "EDGE_ONLY",
            OffloadPolicy::GreedyEnergy => "GREEDY_ENERGY",
            OffloadPolicy::GreedyDeadline => "GREEDY_DEADLINE",
            OffloadPolicy::EnergyAware => "ENERGY_AWARE",
            OffloadPolicy::Eadc => "EADC",
        }
    }
}

impl std::fmt::Display for OffloadPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for OffloadPolicy {
    type Err = EdgeSimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "RANDOM" => Ok(OffloadPolicy::Random),
            "LOCAL_ONLY" => Ok(OffloadPolicy::LocalOnly),
            "EDGE_ONLY" => Ok(OffloadPolicy::EdgeOnly),
            "GREEDY_ENERGY" => Ok(OffloadPolicy::GreedyEnergy),
            "GREEDY_DEADLINE" => Ok(OffloadPolicy::GreedyDeadline),
            "ENERGY_AWARE" => Ok(OffloadPolicy::EnergyAware),
            "EADC" => Ok(OffloadPolicy::Eadc),
            other => Err(EdgeSimError::Configuration {
                message: format!("unknown orchestrator policy '{}'", other),
            }),
        }
    }
}

impl super::Orchestrator {
    /// Uniform pick over the scenario's candidate tiers.
    pub(super) fn random_decision<R: Rng + ?Sized>(&self, rng: &mut R) -> Tier {
        let draw: f64 = rng.gen();
        match self.topology() {
            TierTopology::TwoTier => {
                if draw < 0.5 {
                    Tier::Local
                } else {
                    Tier::Edge
                }
            }
            TierTopology::ThreeTier => {
                if draw < 0.33 {
                    Tier::Local
                } else if draw < 0.66 {
                    Tier::Edge
                } else {
                    Tier::Cloud
                }
            }
        }
    }

    /// GREEDY_ENERGY: run locally when that is the cheaper energy option,
    /// otherwise offload — to the edge while it has headroom, to the cloud
    /// once it is saturated.
    pub(super) fn greedy_energy_decision(
        &self,
        task: &TaskDescriptor,
        edge_utilization: f64,
    ) -> Tier {
        let local_energy = self.cost().local_compute_energy(task);
        let offload_energy = self.cost().offload_transfer_energy(task);

        if local_energy <= offload_energy {
            Tier::Local
        } else if edge_utilization < GREEDY_EDGE_UTILIZATION_CUTOFF {
            Tier::Edge
        } else {
            Tier::Cloud
        }
    }

    /// GREEDY_DEADLINE: feasibility first, then speed, with the edge as the
    /// default when nothing meets the deadline.
    pub(super) fn greedy_deadline_decision(
        &self,
        task: &TaskDescriptor,
        profile: &ApplicationProfile,
        edge_utilization: f64,
    ) -> Tier {
        let max_delay = profile.max_delay_secs;
        let local_time = self.cost().local_time(task);
        let edge_time = self.cost().edge_time_queued(task, edge_utilization);
        let cloud_time = self.cost().cloud_time(task);

        if edge_time <= max_delay && edge_time <= local_time && edge_time <= cloud_time {
            Tier::Edge
        } else if local_time <= max_delay && local_time <= cloud_time {
            Tier::Local
        } else if cloud_time <= max_delay {
            Tier::Cloud
        } else {
            Tier::Edge
        }
    }

    /// ENERGY_AWARE: two-tier deadline gate, then an energy comparison that
    /// gets stricter as the edge fills up.
    pub(super) fn energy_aware_decision(
        &self,
        task: &TaskDescriptor,
        profile: &ApplicationProfile,
        edge_utilization: f64,
    ) -> Tier {
        let max_delay = profile.max_delay_secs;
        let local_time = self.cost().local_time(task);
        let edge_time = self.cost().edge_time(task);
        let local_energy = self.cost().local_compute_energy(task);
        let edge_energy = self.cost().offload_transfer_energy(task);
        let edge_load = edge_utilization / 100.0;

        let local_meets_deadline = local_time <= max_delay;
        let edge_meets_deadline = edge_time <= max_delay;

        // Rule 1: exactly one option is feasible.
        if local_meets_deadline && !edge_meets_deadline {
            return Tier::Local;
        }
        if !local_meets_deadline && edge_meets_deadline {
            return Tier::Edge;
        }

        // Rule 2: neither is feasible, take the faster one.
        if !local_meets_deadline && !edge_meets_deadline {
            return if local_time < edge_time {
                Tier::Local
            } else {
                Tier::Edge
            };
        }

        // Rule 3: both feasible. A loaded edge must buy a real energy win.
        if edge_load > HIGH_LOAD_THRESHOLD {
            return if edge_energy < local_energy * 0.7 {
                Tier::Edge
            } else {
                Tier::Local
            };
        }
        if edge_load > MEDIUM_LOAD_THRESHOLD {
            return if edge_energy < local_energy * 0.8 {
                Tier::Edge
            } else {
                Tier::Local
            };
        }
        if edge_energy < local_energy {
            Tier::Edge
        } else {
            Tier::Local
        }
    }

    /// EADC: score every deadline-feasible tier on weighted normalized time
    /// and energy, with the weights adapted to the task type's delay
    /// sensitivity, and pick the lowest. Falls back to the fastest tier
    /// when nothing is feasible. Tie precedence is Local > Edge > Cloud.
    pub(super) fn eadc_decision(
        &self,
        task: &TaskDescriptor,
        profile: &ApplicationProfile,
        edge_utilization: f64,
    ) -> Tier {
        let cost = self.cost();
        let max_delay = profile.max_delay_secs;

        let local_time = cost.local_time(task);
        let edge_time = cost.edge_time_queued(task, edge_utilization);
        let cloud_time = cost.cloud_time(task);

        let local_energy = cost.local_power_energy(task);
        let edge_energy = cost.edge_power_energy(task);
        let cloud_energy = cost.cloud_power_energy(task);

        let (alpha, beta) = cost.adaptive_weights(profile.delay_sensitivity);
        let scored = |time: f64, energy: f64| {
            if time <= max_delay {
                cost.score(time, energy, max_delay, alpha, beta)
            } else {
                f64::INFINITY
            }
        };

        let local_score = scored(local_time, local_energy);
        let mut edge_score = scored(edge_time, edge_energy);
        let cloud_score = scored(cloud_time, cloud_energy);

        if edge_utilization > EADC_EDGE_PENALTY_THRESHOLD {
            edge_score *= 1.0 + (edge_utilization - EADC_EDGE_PENALTY_THRESHOLD) / 100.0;
        }

        let candidates = [
            (Tier::Local, local_score),
            (Tier::Edge, edge_score),
            (Tier::Cloud, cloud_score),
        ];

        // Strict comparison: the earlier tier in precedence order wins ties.
        let mut best: Option<(Tier, f64)> = None;
        for (tier, score) in candidates {
            if score.is_finite() && best.map_or(true, |(_, s)| score < s) {
                best = Some((tier, score));
            }
        }
        if let Some((tier, _)) = best {
            return tier;
        }

        // No feasible tier: best effort on raw completion time.
        let times = [
            (Tier::Local, local_time),
            (Tier::Edge, edge_time),
            (Tier::Cloud, cloud_time),
        ];
        let mut fastest = times[0];
        for &(tier, time) in &times[1..] {
            if time < fastest.1 {
                fastest = (tier, time);
            }
        }
        fastest.0
    }
}

pub mod cost;
pub mod instance;
pub mod policies;

use std::sync::atomic::{AtomicU64, Ordering};

use rand::Rng;
use serde::Serialize;

use crate::config::{ApplicationProfile, SimConfig};
use crate::error::{EdgeSimError, EdgeSimResult};
use crate::site::{InstanceCapacityQuery, SiteLoadQuery};
use crate::types::{PlacementDecision, TaskDescriptor, Tier, TierTopology};

// Re-export types from submodules
pub use cost::*;
pub use policies::*;

/// Assumed edge utilization (percent) when the load query fails. Keeps the
/// scenario running on a neutral estimate instead of aborting.
pub const NEUTRAL_ASSUMED_UTILIZATION: f64 = 50.0;

/// Offload decision engine: one per scenario run, invoked once per task at
/// its submission time. Stateless across calls apart from counters.
#[derive(Debug)]
pub struct Orchestrator {
    policy: OffloadPolicy,
    topology: TierTopology,
    cost: CostModel,
    profiles: Vec<ApplicationProfile>,
    stats: DecisionStats,
}

impl Orchestrator {
    /// Build the engine for a scenario. Fails fast on an unknown policy
    /// name or an empty profile table — never mid-run.
    pub fn from_config(config: &SimConfig) -> EdgeSimResult<Self> {
        let policy = config.scenario.orchestrator_policy.parse::<OffloadPolicy>()?;
        Self::new(
            policy,
            config.scenario.tier_topology,
            CostModel::from_config(config),
            config.applications.clone(),
        )
    }

    pub fn new(
        policy: OffloadPolicy,
        topology: TierTopology,
        cost: CostModel,
        profiles: Vec<ApplicationProfile>,
    ) -> EdgeSimResult<Self> {
        if profiles.is_empty() {
            return Err(EdgeSimError::Configuration {
                message: "application profile table is empty".to_string(),
            });
        }
        Ok(Self {
            policy,
            topology,
            cost,
            profiles,
            stats: DecisionStats::default(),
        })
    }

    pub fn policy(&self) -> OffloadPolicy {
        self.policy
    }

    pub fn topology(&self) -> TierTopology {
        self.topology
    }

    pub fn cost(&self) -> &CostModel {
        &self.cost
    }

    pub fn profiles(&self) -> &[ApplicationProfile] {
        &self.profiles
    }

    pub(crate) fn stats(&self) -> &DecisionStats {
        &self.stats
    }

    /// Select the execution tier for `task` and record it on the
    /// descriptor.
    ///
    /// Each task is decided exactly once, at its submission time;
    /// `task.app_type` must index the profile table this engine was built
    /// from. Infeasibility never surfaces as an error — every policy has a
    /// defined fallback.
    pub fn decide<R: Rng + ?Sized>(
        &self,
        task: &mut TaskDescriptor,
        loads: &dyn SiteLoadQuery,
        rng: &mut R,
    ) -> PlacementDecision {
        debug_assert!(
            task.assigned_tier.is_none(),
            "task {}@{} decided twice",
            task.device_id,
            task.submission_time
        );
        let profile = &self.profiles[task.app_type];

        let tier = match self.policy {
            OffloadPolicy::Random => self.random_decision(rng),
            OffloadPolicy::LocalOnly => Tier::Local,
            OffloadPolicy::EdgeOnly => Tier::Edge,
            OffloadPolicy::GreedyEnergy => {
                self.greedy_energy_decision(task, self.edge_utilization(loads))
            }
            OffloadPolicy::GreedyDeadline => {
                self.greedy_deadline_decision(task, profile, self.edge_utilization(loads))
            }
            OffloadPolicy::EnergyAware => {
                self.energy_aware_decision(task, profile, self.edge_utilization(loads))
            }
            OffloadPolicy::Eadc => {
                self.eadc_decision(task, profile, self.edge_utilization(loads))
            }
        };

        task.assigned_tier = Some(tier);
        self.stats.record_decision(tier);
        tracing::debug!(
            device = task.device_id,
            time = task.submission_time,
            policy = %self.policy,
            tier = %tier,
            "task placed"
        );

        PlacementDecision {
            tier,
            instance: None,
        }
    }

    /// Like [`Self::decide`], but also selects a VM instance on the chosen
    /// tier. A remote decision with `instance: None` is a site-level
    /// rejection.
    pub fn decide_with_instance<R: Rng + ?Sized>(
        &self,
        task: &mut TaskDescriptor,
        loads: &dyn SiteLoadQuery,
        capacity: &dyn InstanceCapacityQuery,
        rng: &mut R,
    ) -> PlacementDecision {
        let mut decision = self.decide(task, loads, rng);
        if decision.tier != Tier::Local {
            decision.instance = self.select_instance(task, decision.tier, capacity);
            if decision.instance.is_none() {
                self.stats.record_instance_rejection();
                tracing::warn!(
                    device = task.device_id,
                    time = task.submission_time,
                    tier = %decision.tier,
                    "no instance with enough headroom"
                );
            }
        }
        decision
    }

    /// Snapshot of the per-run counters for post-hoc analysis.
    pub fn stats_snapshot(&self) -> DecisionStatsSnapshot {
        self.stats.snapshot()
    }

    /// Current edge utilization, or the neutral assumption when the query
    /// fails. Failures are counted and logged, never propagated.
    fn edge_utilization(&self, loads: &dyn SiteLoadQuery) -> f64 {
        match loads.average_utilization(Tier::Edge) {
            Ok(utilization) => utilization.clamp(0.0, 100.0),
            Err(e) => {
                self.stats.record_load_query_fallback();
                tracing::warn!(
                    error = %e,
                    assumed = NEUTRAL_ASSUMED_UTILIZATION,
                    "edge load query failed, assuming neutral utilization"
                );
                NEUTRAL_ASSUMED_UTILIZATION
            }
        }
    }
}

/// Running counters for one scenario. Atomics keep the engine shareable
/// behind `&self`; the simulation itself is single-threaded.
#[derive(Debug, Default)]
pub struct DecisionStats {
    local: AtomicU64,
    edge: AtomicU64,
    cloud: AtomicU64,
    load_query_fallbacks: AtomicU64,
    capacity_query_failures: AtomicU64,
    instance_rejections: AtomicU64,
}

impl DecisionStats {
    fn record_decision(&self, tier: Tier) {
        let counter = match tier {
            Tier::Local => &self.local,
            Tier::Edge => &self.edge,
            Tier::Cloud => &self.cloud,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    fn record_load_query_fallback(&self) {
        self.load_query_fallbacks.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_capacity_query_failure(&self) {
        self.capacity_query_failures.fetch_add(1, Ordering::Relaxed);
    }

    fn record_instance_rejection(&self) {
        self.instance_rejections.fetch_add(1, Ordering::Relaxed);
    }

    fn snapshot(&self) -> DecisionStatsSnapshot {
        DecisionStatsSnapshot {
            local_decisions: self.local.load(Ordering::Relaxed),
            edge_decisions: self.edge.load(Ordering::Relaxed),
            cloud_decisions: self.cloud.load(Ordering::Relaxed),
            load_query_fallbacks: self.load_query_fallbacks.load(Ordering::Relaxed),
            capacity_query_failures: self.capacity_query_failures.load(Ordering::Relaxed),
            instance_rejections: self.instance_rejections.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time view of [`DecisionStats`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DecisionStatsSnapshot {
    pub local_decisions: u64,
    pub edge_decisions: u64,
    pub cloud_decisions: u64,
    pub load_query_fallbacks: u64,
    pub capacity_query_failures: u64,
    pub instance_rejections: u64,
}

impl DecisionStatsSnapshot {
    pub fn total_decisions(&self) -> u64 {
        self.local_decisions + self.edge_decisions + self.cloud_decisions
    }
}

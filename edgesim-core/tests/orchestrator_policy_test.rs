//! Integration tests for the offload decision engine
//!
//! Exercises every policy through the public API, with stub site managers
//! standing in for the external simulation.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use edgesim_core::config::{ApplicationProfile, SimConfig};
use edgesim_core::error::{EdgeSimError, EdgeSimResult};
use edgesim_core::orchestrator::Orchestrator;
use edgesim_core::site::{InstanceCapacity, InstanceCapacityQuery, SiteLoadQuery};
use edgesim_core::types::{InstanceId, TaskDescriptor, Tier, TierTopology};

/// Load query returning the same utilization for every tier.
struct StaticLoad(f64);

impl SiteLoadQuery for StaticLoad {
    fn average_utilization(&self, _tier: Tier) -> EdgeSimResult<f64> {
        Ok(self.0)
    }
}

/// Load query that always fails, to exercise the neutral fallback.
struct FailingLoad;

impl SiteLoadQuery for FailingLoad {
    fn average_utilization(&self, tier: Tier) -> EdgeSimResult<f64> {
        Err(EdgeSimError::LoadQuery {
            tier,
            message: "manager unreachable".to_string(),
        })
    }
}

struct StaticCapacity(Vec<InstanceCapacity>);

impl InstanceCapacityQuery for StaticCapacity {
    fn instances(&self, _tier: Tier) -> EdgeSimResult<Vec<InstanceCapacity>> {
        Ok(self.0.clone())
    }
}

fn profile(max_delay_secs: f64, delay_sensitivity: f64) -> ApplicationProfile {
    ApplicationProfile {
        name: "test-app".to_string(),
        poisson_interarrival_secs: 2.0,
        active_period_secs: 10.0,
        idle_period_secs: 5.0,
        task_length_mi: 1_000.0,
        input_size_kb: 100.0,
        output_size_kb: 50.0,
        delay_sensitivity,
        max_delay_secs,
    }
}

fn scenario(policy: &str, app: ApplicationProfile) -> SimConfig {
    let mut config = SimConfig::default();
    config.scenario.orchestrator_policy = policy.to_string();
    config.applications.push(app);
    config
}

fn task(length_mi: f64, input_kb: f64, output_kb: f64) -> TaskDescriptor {
    TaskDescriptor {
        device_id: 3,
        app_type: 0,
        submission_time: 12.5,
        length_mi,
        input_size_kb: input_kb,
        output_size_kb: output_kb,
        assigned_tier: None,
    }
}

fn rng() -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(17)
}

#[test]
fn unknown_policy_is_a_fatal_configuration_error() {
    let config = scenario("SHORTEST_QUEUE", profile(1.0, 0.5));
    let err = Orchestrator::from_config(&config).unwrap_err();
    assert!(err.to_string().contains("SHORTEST_QUEUE"));
}

#[test]
fn empty_profile_table_is_rejected() {
    let mut config = SimConfig::default();
    config.scenario.orchestrator_policy = "LOCAL_ONLY".to_string();
    assert!(Orchestrator::from_config(&config).is_err());
}

#[test]
fn fixed_policies_always_return_their_tier() {
    for (policy, expected) in [("LOCAL_ONLY", Tier::Local), ("EDGE_ONLY", Tier::Edge)] {
        let orchestrator = Orchestrator::from_config(&scenario(policy, profile(1.0, 0.5))).unwrap();
        let mut t = task(1_000.0, 100.0, 50.0);
        let decision = orchestrator.decide(&mut t, &StaticLoad(95.0), &mut rng());
        assert_eq!(decision.tier, expected);
        assert_eq!(t.assigned_tier, Some(expected));
    }
}

#[test]
fn random_two_tier_never_touches_the_cloud() {
    let mut config = scenario("RANDOM", profile(1.0, 0.5));
    config.scenario.tier_topology = TierTopology::TwoTier;
    let orchestrator = Orchestrator::from_config(&config).unwrap();

    let mut r = rng();
    for _ in 0..200 {
        let mut t = task(1_000.0, 100.0, 50.0);
        let decision = orchestrator.decide(&mut t, &StaticLoad(50.0), &mut r);
        assert_ne!(decision.tier, Tier::Cloud);
    }
}

#[test]
fn random_three_tier_reaches_every_tier() {
    let orchestrator = Orchestrator::from_config(&scenario("RANDOM", profile(1.0, 0.5))).unwrap();

    let mut r = rng();
    let mut seen = [false; 3];
    for _ in 0..300 {
        let mut t = task(1_000.0, 100.0, 50.0);
        match orchestrator.decide(&mut t, &StaticLoad(50.0), &mut r).tier {
            Tier::Local => seen[0] = true,
            Tier::Edge => seen[1] = true,
            Tier::Cloud => seen[2] = true,
        }
    }
    assert_eq!(seen, [true, true, true]);
}

/// Spec scenario: local energy 5.0 J, offload energy 3.0 J, edge at 90% —
/// the edge is attractive but saturated, so the task goes to the cloud.
#[test]
fn greedy_energy_spills_to_cloud_when_edge_is_saturated() {
    let mut config = scenario("GREEDY_ENERGY", profile(1.0, 0.5));
    // 1000 MI task: local = 1000 * 0.005 = 5.0 J
    config.energy.local_energy_per_mi_j = 0.005;
    // offload = 1000 KB * 0.002 + 1000 MI * 0.001 = 3.0 J
    config.energy.transmission_energy_per_kb_j = 0.002;
    config.energy.edge_energy_per_mi_j = 0.001;
    let orchestrator = Orchestrator::from_config(&config).unwrap();

    let mut t = task(1_000.0, 800.0, 200.0);
    let decision = orchestrator.decide(&mut t, &StaticLoad(90.0), &mut rng());
    assert_eq!(decision.tier, Tier::Cloud);

    // Same costs with a quiet edge: offloading goes to the edge instead.
    let mut t = task(1_000.0, 800.0, 200.0);
    let decision = orchestrator.decide(&mut t, &StaticLoad(40.0), &mut rng());
    assert_eq!(decision.tier, Tier::Edge);
}

#[test]
fn greedy_energy_stays_local_when_cheaper() {
    let mut config = scenario("GREEDY_ENERGY", profile(1.0, 0.5));
    config.energy.local_energy_per_mi_j = 1e-6;
    let orchestrator = Orchestrator::from_config(&config).unwrap();

    let mut t = task(1_000.0, 800.0, 200.0);
    let decision = orchestrator.decide(&mut t, &StaticLoad(10.0), &mut rng());
    assert_eq!(decision.tier, Tier::Local);
}

#[test]
fn greedy_deadline_prefers_fastest_feasible_edge() {
    // Default config: 1000 MI -> local 1.0s, edge ~0.11s, cloud ~0.39s
    let orchestrator =
        Orchestrator::from_config(&scenario("GREEDY_DEADLINE", profile(2.0, 0.5))).unwrap();

    let mut t = task(1_000.0, 100.0, 50.0);
    let decision = orchestrator.decide(&mut t, &StaticLoad(0.0), &mut rng());
    assert_eq!(decision.tier, Tier::Edge);
}

#[test]
fn greedy_deadline_falls_back_to_edge_when_nothing_is_feasible() {
    let mut config = scenario("GREEDY_DEADLINE", profile(0.001, 0.5));
    config.compute.cloud_mips = 1_000.0;
    let orchestrator = Orchestrator::from_config(&config).unwrap();

    let mut t = task(50_000.0, 5_000.0, 5_000.0);
    let decision = orchestrator.decide(&mut t, &StaticLoad(50.0), &mut rng());
    assert_eq!(decision.tier, Tier::Edge);
}

/// Spec scenario: local needs 2.0s against a 1.0s deadline, the edge
/// finishes in well under a second. Rule 1 precedence: the only feasible
/// tier wins no matter what the energy figures say.
#[test]
fn energy_aware_forces_the_only_feasible_tier() {
    let mut config = scenario("ENERGY_AWARE", profile(1.0, 0.5));
    config.scenario.tier_topology = TierTopology::TwoTier;
    // Make local energy absurdly cheap: the deadline must still win.
    config.energy.local_energy_per_mi_j = 1e-9;
    let orchestrator = Orchestrator::from_config(&config).unwrap();

    // 2000 MI at 1000 MIPS: local time 2.0s, infeasible.
    let mut t = task(2_000.0, 100.0, 50.0);
    let decision = orchestrator.decide(&mut t, &StaticLoad(99.0), &mut rng());
    assert_eq!(decision.tier, Tier::Edge);
}

#[test]
fn eadc_forces_the_only_feasible_tier() {
    let mut config = scenario("EADC", profile(1.0, 0.5));
    // Round-trip WAN propagation alone blows the 1.0s deadline.
    config.network.wan_propagation_delay_secs = 0.6;
    let orchestrator = Orchestrator::from_config(&config).unwrap();

    // Local time 2.0s infeasible, edge ~0.2s feasible, cloud >1.2s infeasible.
    let mut t = task(2_000.0, 100.0, 50.0);
    let decision = orchestrator.decide(&mut t, &StaticLoad(99.0), &mut rng());
    assert_eq!(decision.tier, Tier::Edge);
}

#[test]
fn energy_aware_best_effort_when_neither_tier_is_feasible() {
    let mut config = scenario("ENERGY_AWARE", profile(0.01, 0.5));
    config.scenario.tier_topology = TierTopology::TwoTier;
    // Starve the WLAN so offloading is slower than computing locally.
    config.network.wlan_bandwidth_mbps = 0.1;
    let orchestrator = Orchestrator::from_config(&config).unwrap();

    let mut t = task(2_000.0, 1_000.0, 1_000.0);
    let decision = orchestrator.decide(&mut t, &StaticLoad(0.0), &mut rng());
    // local 2.0s vs edge ~160s: both blown, local is faster
    assert_eq!(decision.tier, Tier::Local);
}

#[test]
fn eadc_infeasible_fallback_prefers_local_on_tied_times() {
    let mut config = scenario("EADC", profile(0.5, 0.5));
    // Same MIPS on device and edge, and a zero-data task: with no transfer
    // and no queuing the raw times tie exactly, and precedence keeps it local.
    config.compute.edge_mips = config.compute.mobile_mips;
    // Push the cloud past the deadline so no tier is feasible.
    config.network.wan_propagation_delay_secs = 0.6;
    let orchestrator = Orchestrator::from_config(&config).unwrap();

    let mut t = task(1_000.0, 0.0, 0.0);
    let decision = orchestrator.decide(&mut t, &StaticLoad(0.0), &mut rng());
    assert_eq!(decision.tier, Tier::Local);
}

#[test]
fn load_query_failure_falls_back_and_is_counted() {
    let orchestrator = Orchestrator::from_config(&scenario("EADC", profile(1.0, 0.5))).unwrap();

    let mut t = task(500.0, 100.0, 50.0);
    let decision = orchestrator.decide(&mut t, &FailingLoad, &mut rng());
    // The decision still lands on a tier under the assumed 50% load.
    assert!(t.assigned_tier.is_some());
    assert_eq!(t.assigned_tier, Some(decision.tier));

    let stats = orchestrator.stats_snapshot();
    assert_eq!(stats.load_query_fallbacks, 1);
    assert_eq!(stats.total_decisions(), 1);
}

#[test]
fn decision_counters_track_tiers() {
    let orchestrator = Orchestrator::from_config(&scenario("EDGE_ONLY", profile(1.0, 0.5))).unwrap();

    for _ in 0..5 {
        let mut t = task(1_000.0, 100.0, 50.0);
        orchestrator.decide(&mut t, &StaticLoad(10.0), &mut rng());
    }

    let stats = orchestrator.stats_snapshot();
    assert_eq!(stats.edge_decisions, 5);
    assert_eq!(stats.local_decisions, 0);
    assert_eq!(stats.total_decisions(), 5);
}

#[test]
fn decide_with_instance_selects_headroom_on_remote_tiers() {
    let orchestrator = Orchestrator::from_config(&scenario("EDGE_ONLY", profile(1.0, 0.5))).unwrap();
    let capacity = StaticCapacity(vec![
        InstanceCapacity {
            id: InstanceId(0),
            total_capacity: 100.0,
            used_capacity: 70.0,
            predicted_utilization: 15.0,
        },
        InstanceCapacity {
            id: InstanceId(1),
            total_capacity: 100.0,
            used_capacity: 20.0,
            predicted_utilization: 15.0,
        },
    ]);

    let mut t = task(1_000.0, 100.0, 50.0);
    let decision = orchestrator.decide_with_instance(&mut t, &StaticLoad(10.0), &capacity, &mut rng());
    assert_eq!(decision.tier, Tier::Edge);
    assert_eq!(decision.instance, Some(InstanceId(1)));
}

#[test]
fn decide_with_instance_reports_site_level_rejection() {
    let orchestrator = Orchestrator::from_config(&scenario("EDGE_ONLY", profile(1.0, 0.5))).unwrap();
    let capacity = StaticCapacity(vec![InstanceCapacity {
        id: InstanceId(0),
        total_capacity: 100.0,
        used_capacity: 98.0,
        predicted_utilization: 15.0,
    }]);

    let mut t = task(1_000.0, 100.0, 50.0);
    let decision = orchestrator.decide_with_instance(&mut t, &StaticLoad(10.0), &capacity, &mut rng());
    assert_eq!(decision.tier, Tier::Edge);
    assert_eq!(decision.instance, None);
    assert_eq!(orchestrator.stats_snapshot().instance_rejections, 1);
}

#[test]
fn local_decisions_never_ask_for_an_instance() {
    let orchestrator = Orchestrator::from_config(&scenario("LOCAL_ONLY", profile(1.0, 0.5))).unwrap();
    let capacity = StaticCapacity(vec![InstanceCapacity {
        id: InstanceId(0),
        total_capacity: 100.0,
        used_capacity: 0.0,
        predicted_utilization: 5.0,
    }]);

    let mut t = task(1_000.0, 100.0, 50.0);
    let decision = orchestrator.decide_with_instance(&mut t, &StaticLoad(10.0), &capacity, &mut rng());
    assert_eq!(decision.tier, Tier::Local);
    assert_eq!(decision.instance, None);
    assert_eq!(orchestrator.stats_snapshot().instance_rejections, 0);
}

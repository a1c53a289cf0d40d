//! Scenario configuration with TOML support
//!
//! One `SimConfig` is loaded per scenario run and passed explicitly to the
//! workload generator and the orchestrator — there is no global settings
//! singleton. All validation happens up front: a bad value aborts the
//! scenario before any task is generated or decided.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::error::{EdgeSimError, EdgeSimResult};
use crate::orchestrator::OffloadPolicy;
use crate::types::TierTopology;

/// Complete configuration for one scenario run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Scenario horizon and policy selection
    pub scenario: ScenarioConfig,

    /// Network bandwidth and propagation figures
    pub network: NetworkConfig,

    /// Per-tier processing capacity
    pub compute: ComputeConfig,

    /// Device energy model parameters
    pub energy: EnergyConfig,

    /// Application profile table, one row per task type
    #[serde(rename = "application")]
    pub applications: Vec<ApplicationProfile>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            scenario: ScenarioConfig::default(),
            network: NetworkConfig::default(),
            compute: ComputeConfig::default(),
            energy: EnergyConfig::default(),
            applications: Vec::new(),
        }
    }
}

/// Scenario-level settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioConfig {
    /// Total simulated time
    #[serde(with = "humantime_serde")]
    pub simulation_time: Duration,

    /// Leading window excluded from task generation
    #[serde(with = "humantime_serde")]
    pub warm_up_period: Duration,

    /// Orchestrator policy name, e.g. "EADC" or "GREEDY_ENERGY"
    pub orchestrator_policy: String,

    /// Candidate tier set for offloading
    pub tier_topology: TierTopology,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            simulation_time: Duration::from_secs(30 * 60),
            warm_up_period: Duration::from_secs(3 * 60),
            orchestrator_policy: "EADC".to_string(),
            tier_topology: TierTopology::ThreeTier,
        }
    }
}

impl ScenarioConfig {
    pub fn simulation_time_secs(&self) -> f64 {
        self.simulation_time.as_secs_f64()
    }

    pub fn warm_up_period_secs(&self) -> f64 {
        self.warm_up_period.as_secs_f64()
    }
}

/// Network figures consumed by the completion-time estimators. Bandwidth
/// sharing and queuing live in the external network model; these are the
/// nominal link parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// WLAN bandwidth between device and edge, Mbps
    pub wlan_bandwidth_mbps: f64,

    /// WAN bandwidth between device and cloud, Mbps
    pub wan_bandwidth_mbps: f64,

    /// One-way WAN propagation delay, seconds
    pub wan_propagation_delay_secs: f64,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            wlan_bandwidth_mbps: 200.0,
            wan_bandwidth_mbps: 15.0,
            wan_propagation_delay_secs: 0.15,
        }
    }
}

/// Processing capacity per tier, in million instructions per second.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ComputeConfig {
    pub mobile_mips: f64,
    pub edge_mips: f64,
    pub cloud_mips: f64,
}

impl Default for ComputeConfig {
    fn default() -> Self {
        Self {
            mobile_mips: 1_000.0,
            edge_mips: 10_000.0,
            cloud_mips: 100_000.0,
        }
    }
}

/// Device-side energy model.
///
/// Two models coexist: a radio/CPU power model (watts, multiplied by the
/// estimated active/transmit/idle durations) and a flat per-instruction
/// model. Which policies use which is documented on the cost model.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EnergyConfig {
    /// Device draw while waiting for a remote result, watts
    pub mobile_power_idle_w: f64,

    /// Device draw while executing locally, watts
    pub mobile_power_active_w: f64,

    /// Device draw while transmitting, watts
    pub mobile_power_transmit_w: f64,

    /// Local execution cost, joules per million instructions
    pub local_energy_per_mi_j: f64,

    /// Remote execution cost charged to the device, joules per million
    /// instructions
    pub edge_energy_per_mi_j: f64,

    /// Radio cost of moving data, joules per KB
    pub transmission_energy_per_kb_j: f64,
}

impl Default for EnergyConfig {
    fn default() -> Self {
        Self {
            mobile_power_idle_w: 0.5,
            mobile_power_active_w: 2.5,
            mobile_power_transmit_w: 1.5,
            local_energy_per_mi_j: 1e-4,
            edge_energy_per_mi_j: 1e-5,
            transmission_energy_per_kb_j: 5e-5,
        }
    }
}

/// One row of the application profile table. Loaded once per scenario and
/// shared read-only by the generator and the orchestrator.
///
/// `task_length_mi`, `input_size_kb` and `output_size_kb` are the means of
/// the exponential distributions individual tasks are sampled from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationProfile {
    pub name: String,

    /// Mean inter-arrival gap within an active burst, seconds
    pub poisson_interarrival_secs: f64,

    /// Length of each task-emitting burst, seconds
    pub active_period_secs: f64,

    /// Silent gap between bursts, seconds
    pub idle_period_secs: f64,

    /// Mean task length, million instructions
    pub task_length_mi: f64,

    /// Mean upload volume, KB
    pub input_size_kb: f64,

    /// Mean download volume, KB
    pub output_size_kb: f64,

    /// How strongly scoring favors time over energy for this type, in [0, 1]
    pub delay_sensitivity: f64,

    /// Deadline from submission to completion, seconds
    pub max_delay_secs: f64,
}

impl ApplicationProfile {
    /// Collect every violation in this profile. Callers aggregate the
    /// results across the whole table so a bad file reports all problems at
    /// once.
    pub fn validation_errors(&self) -> Vec<String> {
        let mut problems = Vec::new();
        if !(self.poisson_interarrival_secs > 0.0) || !self.poisson_interarrival_secs.is_finite() {
            problems.push(format!(
                "application '{}': poisson_interarrival_secs must be positive and finite",
                self.name
            ));
        }
        if !(self.active_period_secs >= 0.0) || !self.active_period_secs.is_finite() {
            problems.push(format!(
                "application '{}': active_period_secs must be non-negative and finite",
                self.name
            ));
        }
        if !(self.idle_period_secs >= 0.0) || !self.idle_period_secs.is_finite() {
            problems.push(format!(
                "application '{}': idle_period_secs must be non-negative and finite",
                self.name
            ));
        }
        if self.active_period_secs == 0.0 && self.idle_period_secs == 0.0 {
            problems.push(format!(
                "application '{}': active and idle periods cannot both be zero",
                self.name
            ));
        }
        if !(self.task_length_mi > 0.0) {
            problems.push(format!(
                "application '{}': task_length_mi must be positive",
                self.name
            ));
        }
        if !(self.input_size_kb > 0.0) || !(self.output_size_kb > 0.0) {
            problems.push(format!(
                "application '{}': input_size_kb and output_size_kb must be positive",
                self.name
            ));
        }
        if !(0.0..=1.0).contains(&self.delay_sensitivity) {
            problems.push(format!(
                "application '{}': delay_sensitivity must be within [0, 1]",
                self.name
            ));
        }
        if !(self.max_delay_secs > 0.0) {
            problems.push(format!(
                "application '{}': max_delay_secs must be positive",
                self.name
            ));
        }
        problems
    }
}

impl SimConfig {
    /// Load and validate a scenario configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> EdgeSimResult<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate a scenario configuration from TOML text.
    pub fn from_toml_str(content: &str) -> EdgeSimResult<Self> {
        let config: SimConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the whole configuration, reporting every violation in one
    /// aggregate error.
    pub fn validate(&self) -> EdgeSimResult<()> {
        let mut problems = Vec::new();

        if self.scenario.simulation_time <= self.scenario.warm_up_period {
            problems.push("scenario: simulation_time must exceed warm_up_period".to_string());
        }
        if let Err(e) = self.scenario.orchestrator_policy.parse::<OffloadPolicy>() {
            problems.push(e.to_string());
        }

        if !(self.network.wlan_bandwidth_mbps > 0.0) {
            problems.push("network: wlan_bandwidth_mbps must be positive".to_string());
        }
        if !(self.network.wan_bandwidth_mbps > 0.0) {
            problems.push("network: wan_bandwidth_mbps must be positive".to_string());
        }
        if !(self.network.wan_propagation_delay_secs >= 0.0) {
            problems.push("network: wan_propagation_delay_secs must be non-negative".to_string());
        }

        if !(self.compute.mobile_mips > 0.0)
            || !(self.compute.edge_mips > 0.0)
            || !(self.compute.cloud_mips > 0.0)
        {
            problems.push("compute: all MIPS figures must be positive".to_string());
        }

        if !(self.energy.mobile_power_idle_w >= 0.0)
            || !(self.energy.mobile_power_active_w > 0.0)
            || !(self.energy.mobile_power_transmit_w >= 0.0)
        {
            problems.push("energy: power draws must be non-negative, active draw positive".to_string());
        }
        if !(self.energy.local_energy_per_mi_j >= 0.0)
            || !(self.energy.edge_energy_per_mi_j >= 0.0)
            || !(self.energy.transmission_energy_per_kb_j >= 0.0)
        {
            problems.push("energy: per-unit energy costs must be non-negative".to_string());
        }

        if self.applications.is_empty() {
            problems.push("application profile table is empty".to_string());
        }
        for profile in &self.applications {
            problems.extend(profile.validation_errors());
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(EdgeSimError::Configuration {
                message: problems.join("; "),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample_profile() -> ApplicationProfile {
        ApplicationProfile {
            name: "augmented-reality".to_string(),
            poisson_interarrival_secs: 2.0,
            active_period_secs: 40.0,
            idle_period_secs: 20.0,
            task_length_mi: 2_000.0,
            input_size_kb: 1_500.0,
            output_size_kb: 25.0,
            delay_sensitivity: 0.9,
            max_delay_secs: 0.5,
        }
    }

    #[test]
    fn parses_minimal_toml_with_defaults() {
        let config = SimConfig::from_toml_str(
            r#"
            [scenario]
            simulation_time = "10m"
            warm_up_period = "1m"
            orchestrator_policy = "GREEDY_DEADLINE"
            tier_topology = "three_tier"

            [[application]]
            name = "health-monitor"
            poisson_interarrival_secs = 10.0
            active_period_secs = 45.0
            idle_period_secs = 90.0
            task_length_mi = 500.0
            input_size_kb = 20.0
            output_size_kb = 1250.0
            delay_sensitivity = 0.1
            max_delay_secs = 5.0
            "#,
        )
        .unwrap();

        assert_eq!(config.scenario.simulation_time_secs(), 600.0);
        assert_eq!(config.scenario.warm_up_period_secs(), 60.0);
        // Sections left out of the file fall back to defaults
        assert_eq!(config.network.wlan_bandwidth_mbps, 200.0);
        assert_eq!(config.compute.edge_mips, 10_000.0);
        assert_eq!(config.applications.len(), 1);
        assert_eq!(config.applications[0].max_delay_secs, 5.0);
    }

    #[test]
    fn rejects_unknown_policy() {
        let mut config = SimConfig::default();
        config.applications.push(sample_profile());
        config.scenario.orchestrator_policy = "FASTEST_FIRST".to_string();

        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("FASTEST_FIRST"));
    }

    #[test]
    fn aggregates_all_violations_into_one_error() {
        let mut config = SimConfig::default();
        let mut profile = sample_profile();
        profile.poisson_interarrival_secs = 0.0;
        profile.delay_sensitivity = 1.5;
        config.applications.push(profile);
        config.network.wan_bandwidth_mbps = -1.0;

        let err = config.validate().unwrap_err();
        let message = err.to_string();
        assert!(message.contains("poisson_interarrival_secs"));
        assert!(message.contains("delay_sensitivity"));
        assert!(message.contains("wan_bandwidth_mbps"));
    }

    #[test]
    fn rejects_empty_application_table() {
        let err = SimConfig::default().validate().unwrap_err();
        assert!(err.to_string().contains("application profile table is empty"));
    }

    #[test]
    fn loads_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scenario.toml");
        std::fs::write(
            &path,
            r#"
            [scenario]
            orchestrator_policy = "ENERGY_AWARE"
            tier_topology = "two_tier"

            [[application]]
            name = "infotainment"
            poisson_interarrival_secs = 7.0
            active_period_secs = 30.0
            idle_period_secs = 45.0
            task_length_mi = 1500.0
            input_size_kb = 250.0
            output_size_kb = 1000.0
            delay_sensitivity = 0.3
            max_delay_secs = 1.5
            "#,
        )
        .unwrap();

        let config = SimConfig::from_file(&path).unwrap();
        assert_eq!(config.scenario.tier_topology, TierTopology::TwoTier);
    }
}

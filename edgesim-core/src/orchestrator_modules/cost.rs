//! Per-tier completion-time and energy estimators
//!
//! Two energy models coexist, matching the two families of policies:
//! the per-instruction model charges a flat joule cost per million
//! instructions plus a radio cost per KB moved (GREEDY_ENERGY,
//! ENERGY_AWARE); the power model integrates the device's active,
//! transmit and idle draws over the estimated durations (EADC).

use crate::config::{ComputeConfig, EnergyConfig, NetworkConfig, SimConfig};
use crate::types::TaskDescriptor;

/// Base weight on normalized completion time in the EADC score.
pub const ALPHA: f64 = 0.5;
/// Base weight on normalized energy in the EADC score.
pub const BETA: f64 = 0.5;

/// Stateless estimator built from the scenario configuration.
#[derive(Debug, Clone)]
pub struct CostModel {
    network: NetworkConfig,
    compute: ComputeConfig,
    energy: EnergyConfig,
}

impl CostModel {
    pub fn new(network: NetworkConfig, compute: ComputeConfig, energy: EnergyConfig) -> Self {
        Self {
            network,
            compute,
            energy,
        }
    }

    pub fn from_config(config: &SimConfig) -> Self {
        Self::new(
            config.network.clone(),
            config.compute.clone(),
            config.energy.clone(),
        )
    }

    /// Time to move `data_kb` over the WLAN link, seconds.
    pub fn wlan_transmission_time(&self, data_kb: f64) -> f64 {
        (data_kb * 8.0) / (self.network.wlan_bandwidth_mbps * 1_000.0)
    }

    /// Time to move `data_kb` over the WAN link, including round-trip
    /// propagation, seconds.
    pub fn wan_transmission_time(&self, data_kb: f64) -> f64 {
        (data_kb * 8.0) / (self.network.wan_bandwidth_mbps * 1_000.0)
            + 2.0 * self.network.wan_propagation_delay_secs
    }

    /// Completion time when the task runs on the originating device. No
    /// network component and no queuing.
    pub fn local_time(&self, task: &TaskDescriptor) -> f64 {
        task.length_mi / self.compute.mobile_mips
    }

    /// Completion time on the edge: WLAN transfer plus processing.
    pub fn edge_time(&self, task: &TaskDescriptor) -> f64 {
        self.wlan_transmission_time(task.data_size_kb()) + task.length_mi / self.compute.edge_mips
    }

    /// Edge completion time inflated by a queuing-delay term proportional
    /// to the tier's current utilization (0-100).
    pub fn edge_time_queued(&self, task: &TaskDescriptor, edge_utilization: f64) -> f64 {
        let processing = task.length_mi / self.compute.edge_mips;
        let queuing = (edge_utilization / 100.0) * processing * 0.5;
        self.wlan_transmission_time(task.data_size_kb()) + processing + queuing
    }

    /// Completion time on the cloud: WAN transfer plus processing.
    pub fn cloud_time(&self, task: &TaskDescriptor) -> f64 {
        self.wan_transmission_time(task.data_size_kb()) + task.length_mi / self.compute.cloud_mips
    }

    /// Per-instruction model: energy burned executing on the device.
    pub fn local_compute_energy(&self, task: &TaskDescriptor) -> f64 {
        task.length_mi * self.energy.local_energy_per_mi_j
    }

    /// Per-instruction model: radio cost of shipping the task's data plus
    /// the remote execution cost charged to the device.
    pub fn offload_transfer_energy(&self, task: &TaskDescriptor) -> f64 {
        task.data_size_kb() * self.energy.transmission_energy_per_kb_j
            + task.length_mi * self.energy.edge_energy_per_mi_j
    }

    /// Power model: active draw over the local execution time.
    pub fn local_power_energy(&self, task: &TaskDescriptor) -> f64 {
        self.energy.mobile_power_active_w * self.local_time(task)
    }

    /// Power model: transmit draw during the transfer, idle draw while the
    /// remote tier computes.
    pub fn edge_power_energy(&self, task: &TaskDescriptor) -> f64 {
        self.remote_power_energy(task, task.data_size_kb())
    }

    /// Power model for the cloud: data volume scaled up for WAN protocol
    /// overhead.
    pub fn cloud_power_energy(&self, task: &TaskDescriptor) -> f64 {
        self.remote_power_energy(task, task.data_size_kb() * 1.5)
    }

    fn remote_power_energy(&self, task: &TaskDescriptor, data_kb: f64) -> f64 {
        let transmit_time = self.wlan_transmission_time(data_kb);
        let idle_time = task.length_mi / self.compute.edge_mips;
        self.energy.mobile_power_transmit_w * transmit_time
            + self.energy.mobile_power_idle_w * idle_time
    }

    /// Time/energy weights adapted to a task type's delay sensitivity:
    /// sensitive types weight time more heavily, insensitive types energy.
    pub fn adaptive_weights(&self, delay_sensitivity: f64) -> (f64, f64) {
        (
            ALPHA * (1.0 + delay_sensitivity),
            BETA * (1.0 - delay_sensitivity),
        )
    }

    /// Fixed energy normalizer for the EADC score.
    pub fn energy_normalizer(&self) -> f64 {
        self.energy.mobile_power_active_w * 10.0
    }

    /// Weighted EADC score for a deadline-feasible site.
    pub fn score(&self, time: f64, energy: f64, max_delay: f64, alpha: f64, beta: f64) -> f64 {
        alpha * (time / max_delay) + beta * (energy / self.energy_normalizer())
    }
}

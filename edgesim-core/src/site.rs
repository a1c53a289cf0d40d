//! Seams to the external site managers.
//!
//! The orchestrator never owns resource state. It observes the simulation
//! through these two capability traits, passed in per call, and must not
//! mutate anything through them. Utilization is sampled "as of now" by the
//! implementation — the orchestrator runs at the moment the simulated clock
//! reaches a task's submission time.

use serde::{Deserialize, Serialize};

use crate::error::EdgeSimResult;
use crate::types::{InstanceId, Tier};

/// Read-only view of a tier's aggregate load.
pub trait SiteLoadQuery {
    /// Average CPU utilization across the tier's instances, as a percentage
    /// in `[0, 100]`.
    ///
    /// Failures are recoverable: the orchestrator substitutes a neutral
    /// assumed load and keeps going.
    fn average_utilization(&self, tier: Tier) -> EdgeSimResult<f64>;
}

/// Read-only view of the individual instances hosted at a tier. Used only
/// for instance selection, never for tier selection.
pub trait InstanceCapacityQuery {
    fn instances(&self, tier: Tier) -> EdgeSimResult<Vec<InstanceCapacity>>;
}

/// Capacity report for a single VM instance, in the same percentage units
/// as the load query.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InstanceCapacity {
    pub id: InstanceId,
    pub total_capacity: f64,
    pub used_capacity: f64,
    /// Utilization this task is predicted to add if placed here.
    pub predicted_utilization: f64,
}

impl InstanceCapacity {
    pub fn spare_capacity(&self) -> f64 {
        self.total_capacity - self.used_capacity
    }
}

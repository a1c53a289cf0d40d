//! Spare-capacity instance selection within a chosen tier

use crate::site::InstanceCapacityQuery;
use crate::types::{InstanceId, TaskDescriptor, Tier};

impl super::Orchestrator {
    /// Pick the instance at `tier` with the greatest spare capacity that
    /// still has headroom for the task's predicted utilization.
    ///
    /// Local tasks run on the originating device and never get an
    /// instance. A remote tier where nothing qualifies yields `None` — a
    /// site-level rejection; the task must not be squeezed onto an
    /// overloaded instance.
    pub(super) fn select_instance(
        &self,
        task: &TaskDescriptor,
        tier: Tier,
        capacity: &dyn InstanceCapacityQuery,
    ) -> Option<InstanceId> {
        if tier == Tier::Local {
            return None;
        }

        let instances = match capacity.instances(tier) {
            Ok(instances) => instances,
            Err(e) => {
                self.stats().record_capacity_query_failure();
                tracing::warn!(
                    tier = %tier,
                    device = task.device_id,
                    error = %e,
                    "capacity query failed, no instance selected"
                );
                return None;
            }
        };

        let mut selected = None;
        let mut best_spare = 0.0;
        for instance in &instances {
            let spare = instance.spare_capacity();
            if instance.predicted_utilization <= spare && spare > best_spare {
                selected = Some(instance.id);
                best_spare = spare;
            }
        }
        selected
    }
}

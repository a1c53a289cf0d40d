/// Offload decision engine choosing an execution tier per task
///
/// This module is split into focused submodules:
/// - `policies`: the closed policy set and per-policy decision rules
/// - `cost`: per-tier completion-time and energy estimators
/// - `instance`: spare-capacity VM selection within a chosen tier
/// - `mod`: the `Orchestrator` coordinator and decision counters
// Re-export everything from the modular implementation
pub use crate::orchestrator_modules::*;

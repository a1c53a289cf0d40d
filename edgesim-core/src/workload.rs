//! Stochastic workload generation
//!
//! Each device alternates between an active burst, during which tasks
//! arrive as a Poisson process, and a fixed idle gap. The generator runs
//! once per scenario, before the simulation starts, and materializes the
//! complete task timeline. Output is deterministic for a given seed.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Exp};
use serde::Serialize;

use crate::config::{ApplicationProfile, SimConfig};
use crate::error::{EdgeSimError, EdgeSimResult};
use crate::types::TaskDescriptor;

/// Per-profile samplers, built once at construction so generation itself
/// cannot fail.
#[derive(Debug, Clone, Copy)]
struct ProfileSampler {
    interarrival: Exp<f64>,
    length: Exp<f64>,
    input_size: Exp<f64>,
    output_size: Exp<f64>,
}

impl ProfileSampler {
    fn new(profile: &ApplicationProfile) -> EdgeSimResult<Self> {
        let exp_with_mean = |mean: f64, field: &str| {
            Exp::new(1.0 / mean).map_err(|e| {
                EdgeSimError::configuration(format!(
                    "application '{}': {} -> {}",
                    profile.name, field, e
                ))
            })
        };
        Ok(Self {
            interarrival: exp_with_mean(profile.poisson_interarrival_secs, "poisson_interarrival_secs")?,
            length: exp_with_mean(profile.task_length_mi, "task_length_mi")?,
            input_size: exp_with_mean(profile.input_size_kb, "input_size_kb")?,
            output_size: exp_with_mean(profile.output_size_kb, "output_size_kb")?,
        })
    }
}

/// Materializes the task timeline for a device population.
#[derive(Debug)]
pub struct WorkloadGenerator {
    profiles: Vec<ApplicationProfile>,
    samplers: Vec<ProfileSampler>,
    simulation_time: f64,
    warm_up_period: f64,
}

/// Aggregate statistics over a generated timeline.
#[derive(Debug, Clone, Serialize)]
pub struct WorkloadSummary {
    pub total_tasks: usize,
    pub device_count: u32,
    pub tasks_per_app_type: Vec<usize>,
    pub first_submission: Option<f64>,
    pub last_submission: Option<f64>,
}

impl WorkloadGenerator {
    /// Build a generator for the scenario described by `config`.
    pub fn from_config(config: &SimConfig) -> EdgeSimResult<Self> {
        Self::new(
            config.applications.clone(),
            config.scenario.simulation_time_secs(),
            config.scenario.warm_up_period_secs(),
        )
    }

    /// Build a generator over an explicit profile table and time window.
    ///
    /// All profile violations are reported together in a single
    /// configuration error; a bad table never produces a partial task list.
    pub fn new(
        profiles: Vec<ApplicationProfile>,
        simulation_time: f64,
        warm_up_period: f64,
    ) -> EdgeSimResult<Self> {
        let mut problems = Vec::new();
        if profiles.is_empty() {
            problems.push("application profile table is empty".to_string());
        }
        if !(warm_up_period >= 0.0) || !warm_up_period.is_finite() {
            problems.push("warm_up_period must be non-negative and finite".to_string());
        }
        if !(simulation_time > warm_up_period) || !simulation_time.is_finite() {
            problems.push("simulation_time must exceed warm_up_period".to_string());
        }
        for profile in &profiles {
            problems.extend(profile.validation_errors());
        }
        if !problems.is_empty() {
            return Err(EdgeSimError::Configuration {
                message: problems.join("; "),
            });
        }

        let samplers = profiles
            .iter()
            .map(ProfileSampler::new)
            .collect::<EdgeSimResult<Vec<_>>>()?;

        Ok(Self {
            profiles,
            samplers,
            simulation_time,
            warm_up_period,
        })
    }

    /// Application type a device is bound to for the whole scenario:
    /// round-robin over the profile table, so the mix stays even for any
    /// device count.
    pub fn app_type_of_device(&self, device_id: u32) -> usize {
        device_id as usize % self.profiles.len()
    }

    pub fn profiles(&self) -> &[ApplicationProfile] {
        &self.profiles
    }

    /// Generate the complete, chronologically sorted task timeline for
    /// `device_count` devices. Deterministic for a given seed.
    pub fn generate(&self, device_count: u32, seed: u64) -> Vec<TaskDescriptor> {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut tasks = Vec::new();

        for device_id in 0..device_count {
            let app_type = self.app_type_of_device(device_id);
            let profile = &self.profiles[app_type];
            let sampler = &self.samplers[app_type];

            let mut t = self.warm_up_period;
            while t < self.simulation_time {
                // Active burst: Poisson arrivals until the burst window ends.
                // A gap may overshoot the window; the task at `t` still
                // counts and the draw that lands past `active_end` is not
                // emitted.
                let active_end = (t + profile.active_period_secs).min(self.simulation_time);
                while t < active_end {
                    tasks.push(TaskDescriptor {
                        device_id,
                        app_type,
                        submission_time: t,
                        length_mi: sampler.length.sample(&mut rng),
                        input_size_kb: sampler.input_size.sample(&mut rng),
                        output_size_kb: sampler.output_size.sample(&mut rng),
                        assigned_tier: None,
                    });
                    t += sampler.interarrival.sample(&mut rng);
                }

                // Idle gap: no arrivals. Anchored at the window end so the
                // burst cadence stays fixed at active + idle.
                t = active_end + profile.idle_period_secs;
            }
        }

        // Stable sort keeps generation order on equal timestamps, so ties
        // stay deterministic across runs.
        tasks.sort_by(|a, b| {
            a.submission_time
                .partial_cmp(&b.submission_time)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        tracing::info!(
            total_tasks = tasks.len(),
            device_count,
            simulation_time = self.simulation_time,
            "workload generation completed"
        );

        tasks
    }

    /// Summarize a generated timeline for logging and post-hoc analysis.
    pub fn summarize(&self, tasks: &[TaskDescriptor], device_count: u32) -> WorkloadSummary {
        let mut tasks_per_app_type = vec![0usize; self.profiles.len()];
        for task in tasks {
            if let Some(count) = tasks_per_app_type.get_mut(task.app_type) {
                *count += 1;
            }
        }
        WorkloadSummary {
            total_tasks: tasks.len(),
            device_count,
            tasks_per_app_type,
            first_submission: tasks.first().map(|t| t.submission_time),
            last_submission: tasks.last().map(|t| t.submission_time),
        }
    }
}

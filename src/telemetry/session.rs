//! Per-phase timing collection.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use chrono::Utc;
use tracing::debug;
use uuid::Uuid;

use crate::error::Result;
use crate::runner::PhaseKind;
use crate::steps::StepCategory;

use super::{EnvironmentTags, TimingBackend, TimingPoint, MEASUREMENT};

/// Duration sample for one step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Timing {
    pub step_name: String,
    pub category: StepCategory,
    pub duration_ms: u64,
}

/// Collects step durations for one phase and writes them as a single point.
pub struct TimingSession<'a> {
    backend: Option<&'a dyn TimingBackend>,
    run_id: String,
    tags: Vec<(String, String)>,
    started: HashMap<String, (StepCategory, Instant)>,
    samples: Vec<Timing>,
}

impl<'a> TimingSession<'a> {
    pub(crate) fn new(
        backend: Option<&'a dyn TimingBackend>,
        env: &EnvironmentTags,
        module: &str,
        command: &str,
        identifier: Option<&str>,
        phase: PhaseKind,
    ) -> Self {
        let run_id = Uuid::new_v4().to_string();
        let tags = vec![
            ("run_id".to_string(), run_id.clone()),
            ("module".to_string(), module.to_string()),
            ("command".to_string(), command.to_string()),
            ("phase".to_string(), phase.as_str().to_string()),
            (
                "identifier".to_string(),
                identifier.unwrap_or_default().to_string(),
            ),
            ("user".to_string(), env.user.clone()),
            ("os".to_string(), env.os.clone()),
            ("os_version".to_string(), env.os_version.clone()),
        ];

        Self {
            backend,
            run_id,
            tags,
            started: HashMap::new(),
            samples: Vec::new(),
        }
    }

    /// Generated id shared by every sample of this session.
    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    /// Mark the start of a step.
    pub fn step_started(&mut self, step_name: &str, category: StepCategory) {
        self.started
            .insert(step_name.to_string(), (category, Instant::now()));
    }

    /// Mark the end of a step and record its duration.
    ///
    /// Returns `None` if the step was never started.
    pub fn step_finished(&mut self, step_name: &str) -> Option<Duration> {
        let (category, start) = self.started.remove(step_name)?;
        let duration = start.elapsed();
        self.record(step_name, category, duration);
        Some(duration)
    }

    /// Record a sample measured elsewhere.
    pub fn record(&mut self, step_name: &str, category: StepCategory, duration: Duration) {
        self.samples.push(Timing {
            step_name: step_name.to_string(),
            category,
            duration_ms: u64::try_from(duration.as_millis()).unwrap_or(u64::MAX),
        });
    }

    /// Samples collected so far.
    pub fn samples(&self) -> &[Timing] {
        &self.samples
    }

    /// Build the point this session would write.
    pub fn to_point(&self) -> TimingPoint {
        // A repeated step name keeps its last duration.
        let mut fields: Vec<(String, i64)> = Vec::new();
        for sample in &self.samples {
            let value = i64::try_from(sample.duration_ms).unwrap_or(i64::MAX);
            match fields.iter_mut().find(|(name, _)| *name == sample.step_name) {
                Some(existing) => existing.1 = value,
                None => fields.push((sample.step_name.clone(), value)),
            }
        }

        TimingPoint {
            measurement: MEASUREMENT.to_string(),
            tags: self.tags.clone(),
            fields,
            timestamp_ms: Utc::now().timestamp_millis(),
        }
    }

    /// Write the phase's point and close the session.
    ///
    /// Nothing is written when telemetry is inactive or no step finished.
    pub fn finish(self) -> Result<()> {
        let Some(backend) = self.backend else {
            return Ok(());
        };
        if self.samples.is_empty() {
            debug!("No timings recorded for run {}", self.run_id);
            return Ok(());
        }
        backend.write(&self.to_point())
    }
}

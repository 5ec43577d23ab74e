//! Optional step timing telemetry.
//!
//! Timings are written to and averaged from an InfluxDB v2 bucket. They
//! only size the progress estimate; nothing else depends on them. Without
//! a complete [`TelemetryConfig`] every operation is a no-op.
//!
//! # Configuration
//!
//! All four variables must be set and non-empty:
//!
//! - `KICKSTARTDS_INFLUX_URL`
//! - `KICKSTARTDS_INFLUX_TOKEN`
//! - `KICKSTARTDS_INFLUX_ORG`
//! - `KICKSTARTDS_INFLUX_BUCKET`

pub mod environment;
pub mod influx;
pub mod session;

pub use environment::EnvironmentTags;
pub use influx::{parse_mean_csv, InfluxBackend, TimingPoint};
pub use session::{Timing, TimingSession};

use tracing::{debug, warn};

use crate::error::Result;
use crate::runner::PhaseKind;

/// Measurement name for per-phase timing points.
pub const MEASUREMENT: &str = "step_timings";

/// How far back averages are computed.
pub const AVERAGE_WINDOW_DAYS: u32 = 180;

/// Connection settings for the timing bucket.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TelemetryConfig {
    pub url: Option<String>,
    pub token: Option<String>,
    pub org: Option<String>,
    pub bucket: Option<String>,
}

impl TelemetryConfig {
    /// Read settings from `KICKSTARTDS_INFLUX_*` environment variables.
    pub fn from_env() -> Self {
        let var = |name: &str| std::env::var(name).ok();
        Self {
            url: var("KICKSTARTDS_INFLUX_URL"),
            token: var("KICKSTARTDS_INFLUX_TOKEN"),
            org: var("KICKSTARTDS_INFLUX_ORG"),
            bucket: var("KICKSTARTDS_INFLUX_BUCKET"),
        }
    }

    /// Whether all four settings are present and non-empty.
    pub fn is_complete(&self) -> bool {
        [&self.url, &self.token, &self.org, &self.bucket]
            .iter()
            .all(|v| v.as_deref().is_some_and(|s| !s.trim().is_empty()))
    }
}

/// Storage for timing points.
pub trait TimingBackend: Send + Sync {
    /// Persist one point.
    fn write(&self, point: &TimingPoint) -> Result<()>;

    /// Mean duration per step name for a module/command over the averaging window.
    fn query_averages(&self, module: &str, command: &str) -> Result<Vec<(String, f64)>>;
}

/// Entry point for timing reads and writes.
pub struct Telemetry {
    backend: Option<Box<dyn TimingBackend>>,
    tags: EnvironmentTags,
}

impl Telemetry {
    /// Telemetry that records nothing.
    pub fn disabled() -> Self {
        Self {
            backend: None,
            tags: EnvironmentTags::detect(),
        }
    }

    /// Build from settings; incomplete settings yield disabled telemetry.
    pub fn from_config(config: &TelemetryConfig) -> Self {
        if !config.is_complete() {
            debug!("Timing telemetry disabled: incomplete configuration");
            return Self::disabled();
        }
        match InfluxBackend::from_config(config) {
            Ok(backend) => Self::with_backend(Box::new(backend)),
            Err(e) => {
                warn!("Timing telemetry disabled: {}", e);
                Self::disabled()
            }
        }
    }

    /// Build from `KICKSTARTDS_INFLUX_*` environment variables.
    pub fn from_env() -> Self {
        Self::from_config(&TelemetryConfig::from_env())
    }

    /// Use a specific backend.
    pub fn with_backend(backend: Box<dyn TimingBackend>) -> Self {
        Self {
            backend: Some(backend),
            tags: EnvironmentTags::detect(),
        }
    }

    /// Override the environment tags attached to written points.
    pub fn with_tags(mut self, tags: EnvironmentTags) -> Self {
        self.tags = tags;
        self
    }

    /// Whether a backend is configured.
    pub fn is_active(&self) -> bool {
        self.backend.is_some()
    }

    /// Historical mean duration per step; empty when inactive.
    pub fn average_durations(&self, module: &str, command: &str) -> Result<Vec<(String, f64)>> {
        match &self.backend {
            Some(backend) => backend.query_averages(module, command),
            None => Ok(Vec::new()),
        }
    }

    /// Open a write session for one phase.
    pub fn start_session(
        &self,
        module: &str,
        command: &str,
        identifier: Option<&str>,
        phase: PhaseKind,
    ) -> TimingSession<'_> {
        TimingSession::new(
            self.backend.as_deref(),
            &self.tags,
            module,
            command,
            identifier,
            phase,
        )
    }
}

//! Event-driven progress estimation.
//!
//! [`ProgressEstimator`] turns historical per-step durations and live
//! events into bar positions. It knows nothing about terminals or
//! loggers; every event returns a [`ProgressFrame`] to render.

use std::collections::HashMap;
use std::time::Duration;

use crate::logging::LogMeta;
use crate::ui::format_duration;

/// Snapshot of the estimator's state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressBarState {
    pub step_index: usize,
    pub step_count: usize,
    pub current_step_name: Option<String>,
    pub elapsed_since_last_event_ms: u64,
    pub total_budget_ms: u64,
    pub consumed_budget_ms: u64,
}

/// What the bar should show after an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressFrame {
    /// Bar position in milliseconds of budget.
    pub position: u64,
    /// Bar length (the total budget) in milliseconds.
    pub length: u64,
    /// Step counter and name.
    pub message: String,
    /// Estimated time left, `+`-prefixed when over budget.
    pub remaining: String,
}

/// Progress state machine for one phase.
#[derive(Debug, Clone)]
pub struct ProgressEstimator {
    budgets: HashMap<String, u64>,
    total_budget_ms: u64,
    consumed_ms: u64,
    step_consumed_ms: u64,
    step_finished: bool,
    elapsed_since_event_ms: u64,
    wall_elapsed_ms: u64,
    step_index: usize,
    step_count: usize,
    current_step: Option<String>,
}

impl ProgressEstimator {
    /// Create an estimator from historical average durations per step name.
    pub fn new(averages: &[(String, f64)]) -> Self {
        let mut budgets: HashMap<String, u64> = HashMap::new();
        for (name, mean_ms) in averages {
            let ms = if mean_ms.is_finite() && *mean_ms > 0.0 {
                mean_ms.round() as u64
            } else {
                0
            };
            budgets.insert(name.clone(), ms);
        }
        let total_budget_ms = budgets.values().sum();

        Self {
            budgets,
            total_budget_ms,
            consumed_ms: 0,
            step_consumed_ms: 0,
            step_finished: false,
            elapsed_since_event_ms: 0,
            wall_elapsed_ms: 0,
            step_index: 0,
            step_count: 0,
            current_step: None,
        }
    }

    /// Periodic wall-clock tick.
    pub fn tick(&mut self, elapsed: Duration) -> ProgressFrame {
        let ms = duration_ms(elapsed);
        self.wall_elapsed_ms += ms;
        self.elapsed_since_event_ms += ms;
        self.advance_capped(ms);
        self.frame()
    }

    /// A log record arrived; its metadata identifies the active step.
    pub fn log_line(&mut self, meta: &LogMeta, elapsed: Duration) -> ProgressFrame {
        let ms = duration_ms(elapsed);
        self.wall_elapsed_ms += ms;

        if let Some(step) = meta.step {
            self.step_index = step;
        }
        if let Some(count) = meta.num_steps {
            self.step_count = count;
        }
        if let Some(name) = &meta.subcommand {
            if self.current_step.as_deref() != Some(name.as_str()) {
                self.current_step = Some(name.clone());
                self.step_consumed_ms = 0;
                self.step_finished = false;
            }
        }

        self.advance_capped(ms);
        self.elapsed_since_event_ms = 0;
        self.frame()
    }

    /// A step is starting; same bookkeeping as a log line carrying its meta.
    pub fn step_started(&mut self, meta: &LogMeta, elapsed: Duration) -> ProgressFrame {
        self.log_line(meta, elapsed)
    }

    /// The active step finished; jump to its expected cumulative position.
    pub fn step_complete(&mut self, elapsed: Duration) -> ProgressFrame {
        self.wall_elapsed_ms += duration_ms(elapsed);
        let rest = self.remaining_for_step();
        self.consume(rest);
        self.step_consumed_ms = 0;
        self.step_finished = true;
        self.elapsed_since_event_ms = 0;
        self.frame()
    }

    /// Sum of all historical step averages.
    pub fn total_budget_ms(&self) -> u64 {
        self.total_budget_ms
    }

    /// Budget already shown as done.
    pub fn consumed_ms(&self) -> u64 {
        self.consumed_ms
    }

    /// Wall time observed through events.
    pub fn wall_elapsed_ms(&self) -> u64 {
        self.wall_elapsed_ms
    }

    /// Current state snapshot.
    pub fn state(&self) -> ProgressBarState {
        ProgressBarState {
            step_index: self.step_index,
            step_count: self.step_count,
            current_step_name: self.current_step.clone(),
            elapsed_since_last_event_ms: self.elapsed_since_event_ms,
            total_budget_ms: self.total_budget_ms,
            consumed_budget_ms: self.consumed_ms,
        }
    }

    /// Render the current state.
    pub fn frame(&self) -> ProgressFrame {
        let message = match &self.current_step {
            Some(name) if self.step_count > 0 => {
                format!("[{}/{}] {}", self.step_index, self.step_count, name)
            }
            Some(name) => name.clone(),
            None => String::new(),
        };

        ProgressFrame {
            position: self.consumed_ms,
            length: self.total_budget_ms,
            message,
            remaining: remaining_label(self.total_budget_ms, self.wall_elapsed_ms),
        }
    }

    fn step_budget(&self) -> u64 {
        self.current_step
            .as_ref()
            .and_then(|name| self.budgets.get(name))
            .copied()
            .unwrap_or(0)
    }

    fn remaining_for_step(&self) -> u64 {
        if self.step_finished {
            return 0;
        }
        self.step_budget().saturating_sub(self.step_consumed_ms)
    }

    fn advance_capped(&mut self, ms: u64) {
        let capped = ms.min(self.remaining_for_step());
        self.consume(capped);
    }

    fn consume(&mut self, ms: u64) {
        let room = self.total_budget_ms.saturating_sub(self.consumed_ms);
        let ms = ms.min(room);
        self.consumed_ms += ms;
        self.step_consumed_ms += ms;
    }
}

/// Human-readable time left; `+{overrun}` once `elapsed` exceeds `total`.
pub fn remaining_label(total_ms: u64, elapsed_ms: u64) -> String {
    if elapsed_ms > total_ms {
        format!(
            "+{}",
            format_duration(Duration::from_millis(elapsed_ms - total_ms))
        )
    } else {
        format_duration(Duration::from_millis(total_ms - elapsed_ms))
    }
}

fn duration_ms(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}

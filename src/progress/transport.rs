//! Progress bar log sink.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

use crate::logging::{format_console, LogMeta, LogRecord, LogSink, SinkKind};
use crate::ui::Theme;

use super::estimator::{ProgressBarState, ProgressEstimator, ProgressFrame};
use super::{hide_cursor, show_cursor};

/// Interval between wall-clock ticks.
pub const TICK_INTERVAL: Duration = Duration::from_millis(100);

struct Shared {
    bar: ProgressBar,
    estimator: Mutex<ProgressEstimator>,
    last_event: Mutex<Instant>,
    theme: Theme,
}

impl Shared {
    fn take_elapsed(&self) -> Duration {
        let mut last = self.last_event.lock().unwrap_or_else(|e| e.into_inner());
        let now = Instant::now();
        let elapsed = now.duration_since(*last);
        *last = now;
        elapsed
    }

    fn update<F>(&self, event: F)
    where
        F: FnOnce(&mut ProgressEstimator, Duration) -> ProgressFrame,
    {
        let frame = {
            let mut estimator = self.estimator.lock().unwrap_or_else(|e| e.into_inner());
            let elapsed = self.take_elapsed();
            event(&mut estimator, elapsed)
        };
        self.render(&frame);
    }

    fn render(&self, frame: &ProgressFrame) {
        self.bar.set_length(frame.length.max(1));
        self.bar.set_position(frame.position);
        self.bar.set_prefix(frame.remaining.clone());
        self.bar.set_message(frame.message.clone());
    }
}

/// Log sink rendering one live progress bar for a phase.
///
/// Log lines are printed above the bar. A background ticker advances the
/// bar every [`TICK_INTERVAL`] until [`LogSink::close`] is called.
pub struct ProgressBarSink {
    shared: Arc<Shared>,
    stop: Mutex<Option<Sender<()>>>,
    ticker: Mutex<Option<JoinHandle<()>>>,
    manages_cursor: bool,
    closed: AtomicBool,
}

impl ProgressBarSink {
    /// Create a bar on stderr sized from historical averages and hide the cursor.
    pub fn new(averages: &[(String, f64)]) -> Self {
        let sink = Self::with_target(averages, ProgressDrawTarget::stderr(), true);
        hide_cursor();
        sink
    }

    /// Create a bar that never draws (for tests and non-terminal output).
    pub fn hidden(averages: &[(String, f64)]) -> Self {
        Self::with_target(averages, ProgressDrawTarget::hidden(), false)
    }

    fn with_target(
        averages: &[(String, f64)],
        target: ProgressDrawTarget,
        manages_cursor: bool,
    ) -> Self {
        let estimator = ProgressEstimator::new(averages);
        let bar = ProgressBar::with_draw_target(Some(estimator.total_budget_ms().max(1)), target);
        bar.set_style(
            ProgressStyle::default_bar()
                .template("{prefix:>8.dim} [{bar:40.magenta/dim}] {percent:>3}% {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("█▉░"),
        );

        let shared = Arc::new(Shared {
            bar,
            estimator: Mutex::new(estimator),
            last_event: Mutex::new(Instant::now()),
            theme: Theme::detect(),
        });
        {
            let frame = shared
                .estimator
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .frame();
            shared.render(&frame);
        }

        let (tx, rx) = mpsc::channel::<()>();
        let ticker_shared = Arc::clone(&shared);
        let ticker = thread::spawn(move || loop {
            match rx.recv_timeout(TICK_INTERVAL) {
                Err(RecvTimeoutError::Timeout) => ticker_shared.update(|est, e| est.tick(e)),
                _ => break,
            }
        });

        Self {
            shared,
            stop: Mutex::new(Some(tx)),
            ticker: Mutex::new(Some(ticker)),
            manages_cursor,
            closed: AtomicBool::new(false),
        }
    }

    /// Current estimator state.
    pub fn state(&self) -> ProgressBarState {
        self.shared
            .estimator
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .state()
    }

    /// Whether the bar has been torn down.
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

impl LogSink for ProgressBarSink {
    fn kind(&self) -> SinkKind {
        SinkKind::Progress
    }

    fn log(&self, record: &LogRecord) {
        if self.is_closed() {
            return;
        }
        let line = format_console(record, &self.shared.theme);
        self.shared.bar.println(line);
        self.shared.update(|est, e| est.log_line(&record.meta, e));
    }

    fn step_started(&self, meta: &LogMeta) {
        if self.is_closed() {
            return;
        }
        self.shared.update(|est, e| est.step_started(meta, e));
    }

    fn step_complete(&self) {
        if self.is_closed() {
            return;
        }
        self.shared.update(|est, e| est.step_complete(e));
    }

    fn close(&self) {
        if self.closed.swap(true, Ordering::SeqCst) {
            return;
        }

        // Dropping the sender wakes the ticker and ends its loop.
        self.stop.lock().unwrap_or_else(|e| e.into_inner()).take();
        if let Some(handle) = self.ticker.lock().unwrap_or_else(|e| e.into_inner()).take() {
            handle.join().ok();
        }

        self.shared.bar.finish_and_clear();
        if self.manages_cursor {
            show_cursor();
        }
    }
}

impl Drop for ProgressBarSink {
    fn drop(&mut self) {
        self.close();
    }
}

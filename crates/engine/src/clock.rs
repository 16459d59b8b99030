use std::time::Duration;

use tracing::warn;

use crate::config::LoopSettings;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepPlan {
    pub steps: u32,
    pub dropped_backlog: Duration,
}

/// Turns wall-clock frame times into update calls.
///
/// `extrapolation` gives the variable-rate factor (`1.0` for a frame that took
/// exactly one expected frame); `advance` gives a fixed-step plan with a cap on
/// steps per frame.
#[derive(Debug, Clone)]
pub struct FrameClock {
    expected: Duration,
    max_frame_delta: Duration,
    max_steps_per_frame: u32,
    accumulator: Duration,
}

impl FrameClock {
    pub fn new(settings: &LoopSettings) -> Self {
        let rate = settings.target_rate.max(1);
        Self {
            expected: Duration::from_secs_f64(1.0 / f64::from(rate)),
            max_frame_delta: settings.max_frame_delta(),
            max_steps_per_frame: settings.max_steps_per_frame.max(1),
            accumulator: Duration::ZERO,
        }
    }

    pub fn expected(&self) -> Duration {
        self.expected
    }

    pub fn extrapolation(&self, frame: Duration) -> f64 {
        frame.min(self.max_frame_delta).as_secs_f64() / self.expected.as_secs_f64()
    }

    pub fn advance(&mut self, frame: Duration) -> StepPlan {
        self.accumulator = self
            .accumulator
            .saturating_add(frame.min(self.max_frame_delta));
        let mut steps = 0u32;
        while self.accumulator >= self.expected && steps < self.max_steps_per_frame {
            self.accumulator = self.accumulator.saturating_sub(self.expected);
            steps += 1;
        }

        let mut dropped_backlog = Duration::ZERO;
        if self.accumulator >= self.expected {
            dropped_backlog = self.accumulator;
            self.accumulator = Duration::ZERO;
            warn!(
                steps,
                dropped_backlog_ms = dropped_backlog.as_millis() as u64,
                "frame_steps_clamped"
            );
        }
        StepPlan {
            steps,
            dropped_backlog,
        }
    }

    /// Headless driver: `ticks` fixed steps of extrapolation `1.0`, stopping at
    /// the first error.
    pub fn run_steps<E, F>(&self, ticks: u32, mut step: F) -> Result<u32, E>
    where
        F: FnMut(u32, f64) -> Result<(), E>,
    {
        for tick in 0..ticks {
            step(tick, 1.0)?;
        }
        Ok(ticks)
    }
}

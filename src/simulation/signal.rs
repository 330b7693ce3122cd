//! Traffic light state machine
//!
//! Cycles RED -> GREEN -> YELLOW under orchestrator control and holds the
//! priority preemption window. Times are passed in by the caller; the signal
//! never reads a clock itself.

use std::time::Duration;

use super::event_log::{EventSink, LogLevel};
use super::types::{priority_label, Category, Phase};

#[derive(Debug, Clone)]
pub struct SimSignal {
    pub phase: Phase,
    pub phase_duration: Duration,
    pub phase_started_at: Duration,
    pub priority_active: bool,
    pub priority_category: Option<Category>,
    pub priority_expires_at: Duration,
    /// Completed cycles
    pub cycle_count: u32,
    pub vehicles_passed_total: u64,
}

impl Default for SimSignal {
    fn default() -> Self {
        Self::new()
    }
}

impl SimSignal {
    pub fn new() -> Self {
        Self {
            phase: Phase::Red,
            phase_duration: Duration::ZERO,
            phase_started_at: Duration::ZERO,
            priority_active: false,
            priority_category: None,
            priority_expires_at: Duration::ZERO,
            cycle_count: 0,
            vehicles_passed_total: 0,
        }
    }

    /// Switch to `phase` for `duration`, starting the countdown at `now`
    pub fn set_phase(
        &mut self,
        phase: Phase,
        duration: Duration,
        now: Duration,
        sink: &mut dyn EventSink,
    ) {
        self.phase = phase;
        self.phase_duration = duration;
        self.phase_started_at = now;
        sink.info(&format!(
            "Light switched to {} for {} seconds",
            phase,
            duration.as_secs()
        ));
    }

    /// Time left in the current phase, never negative
    pub fn remaining(&self, now: Duration) -> Duration {
        let elapsed = now.saturating_sub(self.phase_started_at);
        self.phase_duration.saturating_sub(elapsed)
    }

    pub fn remaining_secs(&self, now: Duration) -> f64 {
        self.remaining(now).as_secs_f64()
    }

    pub fn is_phase_done(&self, now: Duration) -> bool {
        self.remaining(now).is_zero()
    }

    /// Open a preemption window for `category` lasting `duration` from `now`.
    /// An already open window is replaced, not extended.
    pub fn activate_priority(
        &mut self,
        category: Category,
        duration: Duration,
        now: Duration,
        sink: &mut dyn EventSink,
    ) {
        self.priority_active = true;
        self.priority_category = Some(category);
        self.priority_expires_at = now + duration;
        sink.record(
            LogLevel::Priority,
            &format!(
                "Priority activated: {} for {} seconds",
                category.as_str().to_uppercase(),
                duration.as_secs()
            ),
        );
    }

    /// Close the preemption window once its deadline has passed
    pub fn tick_priority(&mut self, now: Duration, sink: &mut dyn EventSink) {
        if self.priority_active && now > self.priority_expires_at {
            self.priority_active = false;
            self.priority_category = None;
            sink.record(LogLevel::Priority, "Priority mode ended");
        }
    }

    pub fn priority_label(&self) -> &'static str {
        priority_label(self.priority_category)
    }

    pub fn on_vehicle_passed(&mut self) {
        self.vehicles_passed_total += 1;
    }

    pub fn complete_cycle(&mut self) {
        self.cycle_count += 1;
    }
}

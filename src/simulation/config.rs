//! Simulation configuration
//!
//! Everything here is fixed once the simulation starts. Defaults reproduce the
//! stock intersection setup; a JSON file can override any subset of fields.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use super::types::{Category, SimError, SpeedClass, LANE_COUNT};

/// Cumulative probability below which a non-priority draw picks uniformly
/// among normal/truck/bus instead of defaulting to normal
pub const MIXED_TRAFFIC_CEILING: f64 = 0.8;

/// Priority-mode green never exceeds this many seconds
pub const PRIORITY_GREEN_CEILING: u64 = 23;

/// Bonus over the configured green maximum granted in priority mode
pub const PRIORITY_GREEN_BONUS: u64 = 2;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Informational per-lane capacity; lanes at or over it are reported by the sensor
    pub lane_capacity: [usize; LANE_COUNT],

    pub emergency_probability: f64,
    pub police_probability: f64,
    pub fire_probability: f64,

    /// Green bounds in seconds; the minimum also floors the red duration
    pub green_min_secs: u64,
    pub green_max_secs: u64,
    pub yellow_min_secs: u64,
    pub yellow_max_secs: u64,

    /// Red duration used when a priority vehicle is detected.
    ///
    /// The default of 15 s is longer than any red the density path picks
    /// (8 to 13 s with stock bounds). Lower it to shorten the wait before a
    /// priority green; values under `green_min_secs` are raised to it.
    pub priority_red_secs: u64,

    /// Cycles after which persistent congestion earns a green bonus
    pub aging_cycle_threshold: u32,

    pub max_cycles: u32,

    pub speed_normal: f32,
    pub speed_emergency: f32,
    pub speed_slow: f32,

    pub max_vehicles_per_lane: usize,
    pub spawn_probability: f64,

    pub tick_ms: u64,
    pub spawn_interval_ms: u64,
    pub cycle_pause_ms: u64,

    /// Number of recent log lines embedded in every snapshot
    pub snapshot_log_lines: usize,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            lane_capacity: [15; LANE_COUNT],
            emergency_probability: 0.15,
            police_probability: 0.08,
            fire_probability: 0.07,
            green_min_secs: 8,
            green_max_secs: 15,
            yellow_min_secs: 3,
            yellow_max_secs: 5,
            priority_red_secs: 15,
            aging_cycle_threshold: 5,
            max_cycles: 10,
            speed_normal: 8.0,
            speed_emergency: 15.0,
            speed_slow: 5.0,
            max_vehicles_per_lane: 8,
            spawn_probability: 0.3,
            tick_ms: 500,
            spawn_interval_ms: 2000,
            cycle_pause_ms: 2000,
            snapshot_log_lines: 10,
        }
    }
}

impl SimConfig {
    /// Load a configuration from a JSON file; missing fields keep their defaults
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config: SimConfig = serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse config {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations the decision algorithm and spawner cannot honor
    pub fn validate(&self) -> Result<(), SimError> {
        let invalid =
            |msg: String| -> Result<(), SimError> { Err(SimError::InvalidConfig(msg)) };

        if self.green_min_secs == 0 || self.green_min_secs > self.green_max_secs {
            return invalid(format!(
                "green bounds {}..{} are not a valid range",
                self.green_min_secs, self.green_max_secs
            ));
        }
        if self.yellow_min_secs == 0 || self.yellow_min_secs > self.yellow_max_secs {
            return invalid(format!(
                "yellow bounds {}..{} are not a valid range",
                self.yellow_min_secs, self.yellow_max_secs
            ));
        }
        for (name, p) in [
            ("emergency", self.emergency_probability),
            ("police", self.police_probability),
            ("fire", self.fire_probability),
            ("spawn", self.spawn_probability),
        ] {
            if !(0.0..=1.0).contains(&p) {
                return invalid(format!("{name} probability {p} is outside 0..=1"));
            }
        }
        if self.priority_probability_total() > MIXED_TRAFFIC_CEILING {
            return invalid(format!(
                "priority probabilities sum to {} which exceeds {}",
                self.priority_probability_total(),
                MIXED_TRAFFIC_CEILING
            ));
        }
        if self.tick_ms == 0 {
            return invalid("tick must be at least 1 ms".to_string());
        }
        if self.max_cycles == 0 {
            return invalid("at least one cycle is required".to_string());
        }
        if [self.speed_normal, self.speed_emergency, self.speed_slow]
            .iter()
            .any(|s| !s.is_finite() || *s <= 0.0)
        {
            return invalid("vehicle speeds must be positive".to_string());
        }
        Ok(())
    }

    pub fn priority_probability_total(&self) -> f64 {
        self.emergency_probability + self.police_probability + self.fire_probability
    }

    pub fn base_speed(&self, category: Category) -> f32 {
        match category.speed_class() {
            SpeedClass::Normal => self.speed_normal,
            SpeedClass::Emergency => self.speed_emergency,
            SpeedClass::Slow => self.speed_slow,
        }
    }

    /// Population cap across all lanes
    pub fn max_vehicles(&self) -> usize {
        self.max_vehicles_per_lane * LANE_COUNT
    }

    /// Upper bound for red and green in priority mode
    pub fn priority_green_secs(&self) -> u64 {
        PRIORITY_GREEN_CEILING.min(self.green_max_secs + PRIORITY_GREEN_BONUS)
    }

    /// Largest red or green any cycle may use
    pub fn green_ceiling(&self) -> u64 {
        self.green_max_secs.max(self.priority_green_secs())
    }

    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }

    pub fn spawn_interval(&self) -> Duration {
        Duration::from_millis(self.spawn_interval_ms)
    }

    pub fn cycle_pause(&self) -> Duration {
        Duration::from_millis(self.cycle_pause_ms)
    }
}

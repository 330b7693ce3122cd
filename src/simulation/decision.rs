//! Phase duration decisions
//!
//! Maps a sensor reading to red/green/yellow durations for one cycle.

use std::time::Duration;

use rand::Rng;

use super::config::SimConfig;
use super::event_log::{EventSink, LogLevel};
use super::sensor::SensorReading;

/// Green bonuses keyed by the vehicle count they require (strictly greater than)
const DENSITY_BONUSES: [(usize, u64); 3] = [(15, 8), (10, 5), (5, 3)];

/// Green bonus once congestion has persisted past the aging threshold
const AGING_BONUS: u64 = 2;

/// Red trails green by this many seconds
const RED_GREEN_GAP: u64 = 2;

/// Durations chosen for a single cycle, in whole seconds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleDurations {
    pub red_secs: u64,
    pub green_secs: u64,
    pub yellow_secs: u64,
}

impl CycleDurations {
    pub fn red(&self) -> Duration {
        Duration::from_secs(self.red_secs)
    }

    pub fn green(&self) -> Duration {
        Duration::from_secs(self.green_secs)
    }

    pub fn yellow(&self) -> Duration {
        Duration::from_secs(self.yellow_secs)
    }

    pub fn total_secs(&self) -> u64 {
        self.red_secs + self.green_secs + self.yellow_secs
    }
}

#[derive(Debug, Clone)]
pub struct DecisionAlgorithm {
    config: SimConfig,
}

impl DecisionAlgorithm {
    pub fn new(config: SimConfig) -> Self {
        Self { config }
    }

    /// Decide the durations for cycle `cycle` given what the sensor saw.
    ///
    /// A detected priority vehicle takes the fast path: fixed red, extended
    /// green and the longest yellow. Otherwise green grows with density and
    /// with cycle age, red follows green, and yellow is drawn at random.
    pub fn compute<R: Rng>(
        &self,
        reading: &SensorReading,
        cycle: u32,
        rng: &mut R,
        sink: &mut dyn EventSink,
    ) -> CycleDurations {
        let cfg = &self.config;

        if reading.priority.is_some() {
            let durations = self.clamp(CycleDurations {
                red_secs: cfg.priority_red_secs,
                green_secs: cfg.priority_green_secs(),
                yellow_secs: cfg.yellow_max_secs,
            });
            sink.record(
                LogLevel::Priority,
                &format!(
                    "Priority mode: red={}s, green={}s",
                    durations.red_secs, durations.green_secs
                ),
            );
            return durations;
        }

        let mut green = cfg.green_min_secs;
        if let Some((_, bonus)) = DENSITY_BONUSES
            .iter()
            .find(|(threshold, _)| reading.total > *threshold)
        {
            green = cfg.green_max_secs.min(green + bonus);
        }

        if cycle > cfg.aging_cycle_threshold {
            green = cfg.green_max_secs.min(green + AGING_BONUS);
        }

        let red = cfg.green_min_secs.max(green.saturating_sub(RED_GREEN_GAP));
        let yellow = if cfg.yellow_min_secs >= cfg.yellow_max_secs {
            cfg.yellow_min_secs
        } else {
            rng.random_range(cfg.yellow_min_secs..=cfg.yellow_max_secs)
        };

        let durations = self.clamp(CycleDurations {
            red_secs: red,
            green_secs: green,
            yellow_secs: yellow,
        });
        sink.info(&format!(
            "Timing adjusted: red={}s, green={}s, yellow={}s",
            durations.red_secs, durations.green_secs, durations.yellow_secs
        ));
        durations
    }

    /// Force every duration into its configured range
    fn clamp(&self, durations: CycleDurations) -> CycleDurations {
        let cfg = &self.config;
        let green_ceiling = cfg.green_ceiling().max(cfg.green_min_secs);
        let yellow_ceiling = cfg.yellow_max_secs.max(cfg.yellow_min_secs);
        CycleDurations {
            red_secs: durations.red_secs.clamp(cfg.green_min_secs, green_ceiling),
            green_secs: durations.green_secs.clamp(cfg.green_min_secs, green_ceiling),
            yellow_secs: durations
                .yellow_secs
                .clamp(cfg.yellow_min_secs, yellow_ceiling),
        }
    }
}

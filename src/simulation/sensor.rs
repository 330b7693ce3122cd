//! Density and priority sensor
//!
//! Scans the live vehicle population once per cycle. The history it keeps is
//! only reported, never fed back into decisions.

use std::collections::VecDeque;
use std::time::Duration;

use super::event_log::EventSink;
use super::types::{priority_label, Category, SimError, LANE_COUNT};
use super::vehicle::SimVehicle;

/// Number of scans retained in the history
pub const SENSOR_HISTORY_LEN: usize = 10;

/// Coarse traffic density derived from the total vehicle count
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum DensityTier {
    VeryLow,
    Low,
    Medium,
    High,
    VeryHigh,
}

impl DensityTier {
    pub fn from_total(total: usize) -> Self {
        match total {
            0..=4 => DensityTier::VeryLow,
            5..=9 => DensityTier::Low,
            10..=14 => DensityTier::Medium,
            15..=19 => DensityTier::High,
            _ => DensityTier::VeryHigh,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DensityTier::VeryLow => "very-low",
            DensityTier::Low => "low",
            DensityTier::Medium => "medium",
            DensityTier::High => "high",
            DensityTier::VeryHigh => "very-high",
        }
    }
}

/// What the sensor saw in a single scan
#[derive(Debug, Clone, PartialEq)]
pub struct SensorReading {
    pub lane_counts: [usize; LANE_COUNT],
    pub total: usize,
    pub density: DensityTier,
    /// Category of the highest ranked priority vehicle still on the approach
    pub priority: Option<Category>,
    /// Priority vehicles still on the approach
    pub priority_vehicle_count: usize,
    /// Lanes holding at least their configured capacity
    pub saturated_lanes: Vec<usize>,
}

impl SensorReading {
    /// Build a reading for a total with no lane breakdown or priority vehicle
    pub fn from_total(total: usize) -> Self {
        Self {
            lane_counts: [0; LANE_COUNT],
            total,
            density: DensityTier::from_total(total),
            priority: None,
            priority_vehicle_count: 0,
            saturated_lanes: Vec::new(),
        }
    }

    pub fn with_priority(mut self, category: Category) -> Self {
        self.priority = Some(category);
        self.priority_vehicle_count = self.priority_vehicle_count.max(1);
        self
    }

    pub fn priority_label(&self) -> &'static str {
        priority_label(self.priority)
    }
}

#[derive(Debug, Clone)]
pub struct SensorRecord {
    pub cycle: u32,
    pub lane_counts: [usize; LANE_COUNT],
    pub total: usize,
    pub priority: Option<Category>,
    pub at: Duration,
}

#[derive(Debug, Clone)]
pub struct SimSensor {
    lane_capacity: [usize; LANE_COUNT],
    history: VecDeque<SensorRecord>,
    /// Scans that found at least one priority vehicle
    pub priority_detections: u32,
}

impl SimSensor {
    pub fn new(lane_capacity: [usize; LANE_COUNT]) -> Self {
        Self {
            lane_capacity,
            history: VecDeque::with_capacity(SENSOR_HISTORY_LEN + 1),
            priority_detections: 0,
        }
    }

    pub fn history(&self) -> impl Iterator<Item = &SensorRecord> {
        self.history.iter()
    }

    /// Classify the current population
    pub fn scan(
        &mut self,
        vehicles: &[SimVehicle],
        cycle: u32,
        now: Duration,
        sink: &mut dyn EventSink,
    ) -> Result<SensorReading, SimError> {
        let mut lane_counts = [0usize; LANE_COUNT];
        let mut candidate: Option<&SimVehicle> = None;
        let mut priority_vehicle_count = 0;

        for vehicle in vehicles {
            let slot = lane_counts
                .get_mut(vehicle.lane)
                .ok_or(SimError::LaneOutOfRange { lane: vehicle.lane })?;
            *slot += 1;

            if vehicle.is_priority() && !vehicle.has_exited {
                priority_vehicle_count += 1;
                // Strict comparison keeps the first vehicle seen on a tie
                if candidate.map_or(true, |best| vehicle.priority_rank() > best.priority_rank()) {
                    candidate = Some(vehicle);
                }
            }
        }

        let priority = candidate.map(|v| v.category);
        if priority.is_some() {
            self.priority_detections += 1;
        }

        let total: usize = lane_counts.iter().sum();
        let density = DensityTier::from_total(total);
        let saturated_lanes = lane_counts
            .iter()
            .zip(self.lane_capacity.iter())
            .enumerate()
            .filter(|(_, (count, capacity))| count >= capacity)
            .map(|(lane, _)| lane)
            .collect();

        self.history.push_back(SensorRecord {
            cycle,
            lane_counts,
            total,
            priority,
            at: now,
        });
        while self.history.len() > SENSOR_HISTORY_LEN {
            self.history.pop_front();
        }

        let reading = SensorReading {
            lane_counts,
            total,
            density,
            priority,
            priority_vehicle_count,
            saturated_lanes,
        };

        sink.info(&format!(
            "Sensor scan: L1={}, L2={}, L3={}, L4={}, total={} ({}), priority={}",
            lane_counts[0],
            lane_counts[1],
            lane_counts[2],
            lane_counts[3],
            total,
            density.as_str(),
            reading.priority_label()
        ));
        if !reading.saturated_lanes.is_empty() {
            let lanes: Vec<String> = reading
                .saturated_lanes
                .iter()
                .map(|lane| format!("L{}", lane + 1))
                .collect();
            sink.info(&format!("Lanes at capacity: {}", lanes.join(", ")));
        }

        Ok(reading)
    }
}

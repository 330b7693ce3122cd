//! Snapshots handed to the visualizer
//!
//! The simulation thread is the only writer. Readers get the whole snapshot
//! behind an `Arc`, swapped in atomically, so they never see a half-built one.

use std::sync::Arc;

use arc_swap::ArcSwap;
use serde::Serialize;

use super::types::{Category, Phase};
use super::vehicle::SimVehicle;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VehicleView {
    pub lane: usize,
    #[serde(rename = "type")]
    pub category: Category,
    pub position: f32,
    pub emoji: &'static str,
    pub waiting_time: u32,
}

impl From<&SimVehicle> for VehicleView {
    fn from(vehicle: &SimVehicle) -> Self {
        Self {
            lane: vehicle.lane,
            category: vehicle.category,
            position: vehicle.position,
            emoji: vehicle.category.icon(),
            waiting_time: vehicle.waiting_ticks,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub light_state: Phase,
    pub cars: Vec<VehicleView>,
    pub current_cycle: u32,
    pub max_cycles: u32,
    pub remaining_time: f64,
    pub priority_type: &'static str,
    pub priority_active: bool,
    pub total_vehicles_passed: u64,
    pub log: Vec<String>,
}

impl Snapshot {
    /// Snapshot of a simulation that has not started yet
    pub fn initial(max_cycles: u32) -> Self {
        Self {
            light_state: Phase::Red,
            cars: Vec::new(),
            current_cycle: 0,
            max_cycles,
            remaining_time: 0.0,
            priority_type: super::types::NO_PRIORITY,
            priority_active: false,
            total_vehicles_passed: 0,
            log: Vec::new(),
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Single-writer, multi-reader cell holding the latest snapshot
#[derive(Debug)]
pub struct SnapshotCell {
    current: ArcSwap<Snapshot>,
}

impl SnapshotCell {
    pub fn new(initial: Snapshot) -> Self {
        Self {
            current: ArcSwap::from_pointee(initial),
        }
    }

    pub fn publish(&self, snapshot: Snapshot) {
        self.current.store(Arc::new(snapshot));
    }

    pub fn latest(&self) -> Arc<Snapshot> {
        self.current.load_full()
    }
}

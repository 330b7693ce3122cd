//! Core types for the signal simulation

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of approach lanes at the intersection
pub const LANE_COUNT: usize = 4;

/// Position of the stop line along a lane
pub const STOP_LINE: f32 = 350.0;

/// Position past which a vehicle counts as having crossed the intersection
pub const PASS_LINE: f32 = 800.0;

/// Position past which a vehicle leaves the screen and respawns upstream
pub const EXIT_BOUNDARY: f32 = 900.0;

/// Extra speed granted to priority vehicles while a priority window is open
pub const PRIORITY_BOOST: f32 = 5.0;

/// Speed factor while the light is yellow
pub const YELLOW_SPEED_FACTOR: f32 = 0.7;

/// Speed factor for vehicles already past the stop line on red
pub const RED_CREEP_FACTOR: f32 = 0.3;

/// Upstream range where freshly spawned vehicles appear
pub const SPAWN_RANGE: std::ops::RangeInclusive<i32> = -100..=-20;

/// Upstream range where exited vehicles reappear
pub const RESPAWN_RANGE: std::ops::RangeInclusive<i32> = -200..=-50;

/// Identifier of a vehicle, unique for the lifetime of a simulation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VehicleId(pub usize);

/// Light phase of the signal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Red,
    Green,
    Yellow,
}

impl Phase {
    /// Phases in the order every cycle runs them
    pub const CYCLE_ORDER: [Phase; 3] = [Phase::Red, Phase::Green, Phase::Yellow];

    pub fn as_str(self) -> &'static str {
        match self {
            Phase::Red => "red",
            Phase::Green => "green",
            Phase::Yellow => "yellow",
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.as_str().to_uppercase())
    }
}

/// Speed class a vehicle category draws its base speed from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpeedClass {
    Normal,
    Emergency,
    Slow,
}

/// Kind of vehicle on the road
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Normal,
    Emergency,
    Police,
    Fire,
    Truck,
    Bus,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::Normal,
        Category::Emergency,
        Category::Police,
        Category::Fire,
        Category::Truck,
        Category::Bus,
    ];

    /// Preemption rank; higher preempts, 0 means no priority
    pub fn priority_rank(self) -> u8 {
        match self {
            Category::Emergency => 3,
            Category::Police => 2,
            Category::Fire => 1,
            Category::Normal | Category::Truck | Category::Bus => 0,
        }
    }

    pub fn speed_class(self) -> SpeedClass {
        match self {
            Category::Normal => SpeedClass::Normal,
            Category::Emergency | Category::Police | Category::Fire => SpeedClass::Emergency,
            Category::Truck | Category::Bus => SpeedClass::Slow,
        }
    }

    /// Icon the visualizer draws for this category
    pub fn icon(self) -> &'static str {
        match self {
            Category::Normal => "🚗",
            Category::Emergency => "🚑",
            Category::Police => "🚓",
            Category::Fire => "🚒",
            Category::Truck => "🚚",
            Category::Bus => "🚌",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Normal => "normal",
            Category::Emergency => "emergency",
            Category::Police => "police",
            Category::Fire => "fire",
            Category::Truck => "truck",
            Category::Bus => "bus",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Label used for "no priority vehicle" in logs and snapshots
pub const NO_PRIORITY: &str = "none";

/// Render an optional priority category the way snapshots expect it
pub fn priority_label(category: Option<Category>) -> &'static str {
    category.map_or(NO_PRIORITY, Category::as_str)
}

/// Failures raised by the simulation core
#[derive(Debug, Error)]
pub enum SimError {
    #[error("vehicle lane {lane} is outside 0..{}", LANE_COUNT)]
    LaneOutOfRange { lane: usize },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

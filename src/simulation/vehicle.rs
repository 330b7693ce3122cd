//! Vehicle kinematics for the signal simulation

use rand::Rng;

use super::types::{
    Category, Phase, VehicleId, EXIT_BOUNDARY, PASS_LINE, PRIORITY_BOOST, RED_CREEP_FACTOR,
    RESPAWN_RANGE, SPAWN_RANGE, STOP_LINE, YELLOW_SPEED_FACTOR,
};

/// Result of advancing a vehicle by one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdvanceResult {
    /// Vehicle is still on the road
    Continue,
    /// Vehicle crossed the exit boundary for the first time and was respawned upstream
    Exited,
    /// Vehicle had already exited once; it was respawned upstream again
    Respawned,
}

/// A vehicle travelling along one lane towards the intersection
#[derive(Debug, Clone)]
pub struct SimVehicle {
    pub id: VehicleId,
    pub lane: usize,
    pub category: Category,
    pub base_speed: f32,
    pub position: f32,
    /// Ticks spent at red since the last respawn
    pub waiting_ticks: u32,
    /// Set once the vehicle has been counted as through the intersection
    pub has_exited: bool,
}

impl SimVehicle {
    pub fn new(id: VehicleId, lane: usize, category: Category, base_speed: f32, position: f32) -> Self {
        Self {
            id,
            lane,
            category,
            base_speed,
            position,
            waiting_ticks: 0,
            has_exited: false,
        }
    }

    /// Create a vehicle at a random position upstream of the visible road
    pub fn spawn<R: Rng>(
        id: VehicleId,
        lane: usize,
        category: Category,
        base_speed: f32,
        rng: &mut R,
    ) -> Self {
        let position = rng.random_range(SPAWN_RANGE) as f32;
        Self::new(id, lane, category, base_speed, position)
    }

    pub fn priority_rank(&self) -> u8 {
        self.category.priority_rank()
    }

    pub fn is_priority(&self) -> bool {
        self.priority_rank() > 0
    }

    /// Move the vehicle for one tick under the given light phase.
    ///
    /// Priority vehicles ignore the phase while a priority window is open.
    /// On red, vehicles before the stop line hold position and accumulate
    /// waiting ticks; those already past it creep through.
    pub fn advance<R: Rng>(
        &mut self,
        phase: Phase,
        priority_active: bool,
        rng: &mut R,
    ) -> AdvanceResult {
        if self.is_priority() && priority_active {
            self.position += self.base_speed + PRIORITY_BOOST;
        } else {
            match phase {
                Phase::Green => self.position += self.base_speed,
                Phase::Yellow => self.position += self.base_speed * YELLOW_SPEED_FACTOR,
                Phase::Red => {
                    self.waiting_ticks += 1;
                    if self.position >= STOP_LINE {
                        self.position += self.base_speed * RED_CREEP_FACTOR;
                    }
                }
            }
        }

        if self.position <= EXIT_BOUNDARY {
            return AdvanceResult::Continue;
        }

        self.position = rng.random_range(RESPAWN_RANGE) as f32;
        self.waiting_ticks = 0;
        if self.has_exited {
            AdvanceResult::Respawned
        } else {
            self.has_exited = true;
            AdvanceResult::Exited
        }
    }

    /// Mark the vehicle as through the intersection once it passes the pass line.
    /// Returns true only on the tick this first happens.
    pub fn cross_pass_line(&mut self) -> bool {
        if !self.has_exited && self.position > PASS_LINE {
            self.has_exited = true;
            return true;
        }
        false
    }
}

//! Simulation orchestrator
//!
//! Owns the vehicle population, the signal and the event log, and drives
//! them through cycles of RED -> GREEN -> YELLOW one tick at a time.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use log::debug;
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::Rng;
use rand::SeedableRng;

use super::clock::{Clock, SystemClock};
use super::config::{SimConfig, MIXED_TRAFFIC_CEILING};
use super::decision::{CycleDurations, DecisionAlgorithm};
use super::event_log::{EventLog, EventSink, LogLevel};
use super::sensor::SimSensor;
use super::signal::SimSignal;
use super::snapshot::{Snapshot, SnapshotCell, VehicleView};
use super::types::{Category, Phase, SimError, VehicleId, EXIT_BOUNDARY, LANE_COUNT};
use super::vehicle::{AdvanceResult, SimVehicle};

/// A priority window outlasts the green it was granted by this much
const PRIORITY_WINDOW_EXTRA: Duration = Duration::from_secs(2);

/// Categories drawn with equal weight for mixed traffic
const MIXED_TRAFFIC: [Category; 3] = [Category::Normal, Category::Truck, Category::Bus];

/// How a run ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub cycles_completed: u32,
    pub vehicles_passed: u64,
    /// Error that ended the run early, if any
    pub error: Option<String>,
}

impl RunReport {
    pub fn completed(&self) -> bool {
        self.error.is_none()
    }
}

/// The simulated intersection
pub struct SimWorld {
    pub config: SimConfig,

    /// Every vehicle on the approaches, in spawn order
    pub vehicles: Vec<SimVehicle>,

    pub signal: SimSignal,

    pub sensor: SimSensor,

    decision: DecisionAlgorithm,

    pub events: EventLog,

    clock: Box<dyn Clock>,

    rng: StdRng,

    /// Where snapshots are published, if anyone is reading them
    snapshots: Option<Arc<SnapshotCell>>,

    /// Next ID to assign
    next_id: usize,

    last_spawn_at: Duration,

    /// Cycle currently running, 0 before the first
    pub current_cycle: u32,
}

impl SimWorld {
    fn new_internal(config: SimConfig, clock: Box<dyn Clock>, rng: StdRng) -> Self {
        let last_spawn_at = clock.now();
        Self {
            sensor: SimSensor::new(config.lane_capacity),
            decision: DecisionAlgorithm::new(config.clone()),
            config,
            vehicles: Vec::new(),
            signal: SimSignal::new(),
            events: EventLog::new(),
            clock,
            rng,
            snapshots: None,
            next_id: 0,
            last_spawn_at,
            current_cycle: 0,
        }
    }

    /// Real-time world seeded from OS entropy
    pub fn new(config: SimConfig) -> Self {
        Self::new_internal(
            config,
            Box::new(SystemClock::new()),
            StdRng::from_rng(&mut rand::rng()),
        )
    }

    /// Real-time world with a seeded RNG for reproducible traffic
    pub fn new_with_seed(config: SimConfig, seed: u64) -> Self {
        Self::new_internal(
            config,
            Box::new(SystemClock::new()),
            StdRng::seed_from_u64(seed),
        )
    }

    /// World driven by the given clock and seed
    pub fn with_clock<C: Clock + 'static>(config: SimConfig, clock: C, seed: u64) -> Self {
        Self::new_internal(config, Box::new(clock), StdRng::seed_from_u64(seed))
    }

    /// Replace the event log, e.g. with one that also writes to a file
    pub fn with_event_log(mut self, events: EventLog) -> Self {
        self.events = events;
        self
    }

    /// Publish a snapshot into `cell` on every tick
    pub fn with_snapshot_cell(mut self, cell: Arc<SnapshotCell>) -> Self {
        self.snapshots = Some(cell);
        self
    }

    pub fn now(&self) -> Duration {
        self.clock.now()
    }

    fn next_vehicle_id(&mut self) -> VehicleId {
        let id = VehicleId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Add a vehicle at a random upstream position
    pub fn add_vehicle(&mut self, lane: usize, category: Category) -> Result<VehicleId, SimError> {
        if lane >= LANE_COUNT {
            return Err(SimError::LaneOutOfRange { lane });
        }
        let id = self.next_vehicle_id();
        let speed = self.config.base_speed(category);
        let vehicle = SimVehicle::spawn(id, lane, category, speed, &mut self.rng);
        self.vehicles.push(vehicle);
        Ok(id)
    }

    /// Add a vehicle at an explicit position
    pub fn add_vehicle_at(
        &mut self,
        lane: usize,
        category: Category,
        position: f32,
    ) -> Result<VehicleId, SimError> {
        if lane >= LANE_COUNT {
            return Err(SimError::LaneOutOfRange { lane });
        }
        let id = self.next_vehicle_id();
        let speed = self.config.base_speed(category);
        self.vehicles
            .push(SimVehicle::new(id, lane, category, speed, position));
        Ok(id)
    }

    pub fn vehicle(&self, id: VehicleId) -> Option<&SimVehicle> {
        self.vehicles.iter().find(|v| v.id == id)
    }

    /// Draw a category from the cumulative probability table
    fn draw_category(&mut self) -> Category {
        let cfg = &self.config;
        let roll: f64 = self.rng.random();
        let police_ceiling = cfg.emergency_probability + cfg.police_probability;
        let fire_ceiling = police_ceiling + cfg.fire_probability;

        if roll < cfg.emergency_probability {
            Category::Emergency
        } else if roll < police_ceiling {
            Category::Police
        } else if roll < fire_ceiling {
            Category::Fire
        } else if roll < MIXED_TRAFFIC_CEILING {
            MIXED_TRAFFIC
                .choose(&mut self.rng)
                .copied()
                .unwrap_or(Category::Normal)
        } else {
            Category::Normal
        }
    }

    /// Try to spawn one vehicle, respecting the spawn interval and population cap
    pub fn spawn_vehicles(&mut self) -> Result<Option<VehicleId>, SimError> {
        let now = self.clock.now();
        if now.saturating_sub(self.last_spawn_at) < self.config.spawn_interval() {
            return Ok(None);
        }
        self.last_spawn_at = now;

        if self.vehicles.len() >= self.config.max_vehicles() {
            return Ok(None);
        }

        if self.rng.random::<f64>() >= self.config.spawn_probability {
            return Ok(None);
        }

        let lane = self.rng.random_range(0..LANE_COUNT);
        let category = self.draw_category();
        let id = self.add_vehicle(lane, category)?;
        debug!("Spawned {} in lane {} as {:?}", category, lane, id);
        Ok(Some(id))
    }

    /// Move every vehicle one tick and count those that made it through.
    /// Returns the number of vehicles newly counted as passed.
    pub fn advance_all(&mut self) -> usize {
        let phase = self.signal.phase;
        let priority_active = self.signal.priority_active;
        let mut passed = 0;

        for vehicle in self.vehicles.iter_mut() {
            let newly_passed = match vehicle.advance(phase, priority_active, &mut self.rng) {
                AdvanceResult::Exited => true,
                AdvanceResult::Continue | AdvanceResult::Respawned => vehicle.cross_pass_line(),
            };
            if newly_passed {
                passed += 1;
            }
        }

        for _ in 0..passed {
            self.signal.on_vehicle_passed();
        }

        // A counted vehicle parked exactly on the exit boundary leaves the road
        self.vehicles
            .retain(|v| v.position < EXIT_BOUNDARY || !v.has_exited);

        passed
    }

    /// One tick: expire priority, spawn, move, publish
    pub fn tick(&mut self) -> Result<()> {
        let now = self.clock.now();
        self.signal.tick_priority(now, &mut self.events);
        self.spawn_vehicles().context("Failed to spawn vehicles")?;
        self.advance_all();
        self.emit_snapshot();
        Ok(())
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            light_state: self.signal.phase,
            cars: self.vehicles.iter().map(VehicleView::from).collect(),
            current_cycle: self.current_cycle,
            max_cycles: self.config.max_cycles,
            remaining_time: self.signal.remaining_secs(self.clock.now()),
            priority_type: self.signal.priority_label(),
            priority_active: self.signal.priority_active,
            total_vehicles_passed: self.signal.vehicles_passed_total,
            log: self.events.recent(self.config.snapshot_log_lines),
        }
    }

    pub fn emit_snapshot(&self) {
        if let Some(cell) = &self.snapshots {
            cell.publish(self.snapshot());
        }
    }

    /// Hold `phase` for `duration`, ticking at the configured rate
    pub fn run_phase(&mut self, phase: Phase, duration: Duration, cycle: u32) -> Result<()> {
        let started = self.clock.now();
        self.signal
            .set_phase(phase, duration, started, &mut self.events);

        while self.clock.now().saturating_sub(started) < duration {
            self.tick()
                .with_context(|| format!("Tick failed during {phase} of cycle {cycle}"))?;
            self.clock.sleep(self.config.tick());
        }

        self.events
            .info(&format!("End of {phase} in cycle {cycle}"));
        Ok(())
    }

    /// Scan, decide, and run one full RED -> GREEN -> YELLOW cycle
    pub fn run_cycle(&mut self, cycle: u32) -> Result<CycleDurations> {
        self.current_cycle = cycle;
        self.events
            .record(LogLevel::Cycle, &format!("Starting cycle {cycle}"));

        let now = self.clock.now();
        let reading = self
            .sensor
            .scan(&self.vehicles, cycle, now, &mut self.events)
            .context("Sensor scan failed")?;
        let durations = self
            .decision
            .compute(&reading, cycle, &mut self.rng, &mut self.events);

        if let Some(category) = reading.priority {
            self.signal.activate_priority(
                category,
                durations.green() + PRIORITY_WINDOW_EXTRA,
                now,
                &mut self.events,
            );
        }

        for phase in Phase::CYCLE_ORDER {
            let duration = match phase {
                Phase::Red => durations.red(),
                Phase::Green => durations.green(),
                Phase::Yellow => durations.yellow(),
            };
            self.run_phase(phase, duration, cycle)?;
        }

        self.signal.complete_cycle();
        Ok(durations)
    }

    /// Run every configured cycle. A failing cycle is logged and ends the run.
    pub fn run(&mut self) -> RunReport {
        self.events.record(
            LogLevel::System,
            "Starting adaptive traffic signal simulation",
        );
        self.emit_snapshot();

        let max_cycles = self.config.max_cycles;
        let mut error = None;

        for cycle in 1..=max_cycles {
            if let Err(e) = self.run_cycle(cycle) {
                self.events.record(
                    LogLevel::Error,
                    &format!("Simulation error in cycle {cycle}: {e:#}"),
                );
                error = Some(format!("{e:#}"));
                break;
            }
            if cycle < max_cycles {
                self.clock.sleep(self.config.cycle_pause());
            }
        }

        if error.is_none() {
            self.events.record(
                LogLevel::System,
                &format!(
                    "Simulation complete! Total vehicles passed: {}",
                    self.signal.vehicles_passed_total
                ),
            );
        }
        self.emit_snapshot();

        RunReport {
            cycles_completed: self.signal.cycle_count,
            vehicles_passed: self.signal.vehicles_passed_total,
            error,
        }
    }

    /// Human-readable summary of the world state
    pub fn summary(&self) -> String {
        let mut lines = vec![
            "=== Adaptive Signal Summary ===".to_string(),
            format!(
                "Cycles: {}/{}",
                self.signal.cycle_count, self.config.max_cycles
            ),
            format!("Light: {}", self.signal.phase),
            format!(
                "Vehicles passed: {}",
                self.signal.vehicles_passed_total
            ),
            format!("Active vehicles: {}", self.vehicles.len()),
        ];

        for category in Category::ALL {
            let count = self
                .vehicles
                .iter()
                .filter(|v| v.category == category)
                .count();
            if count > 0 {
                lines.push(format!("  {category}: {count}"));
            }
        }

        lines.push(format!(
            "Scans with priority detected: {}",
            self.sensor.priority_detections
        ));
        lines.push("--- Recent scans ---".to_string());
        for record in self.sensor.history() {
            lines.push(format!(
                "  cycle {}: lanes={:?} total={} priority={}",
                record.cycle,
                record.lane_counts,
                record.total,
                super::types::priority_label(record.priority)
            ));
        }

        lines.join("\n")
    }
}

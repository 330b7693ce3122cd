//! Adaptive signal simulation core
//!
//! Vehicles, the traffic light, the density sensor, the timing decision and
//! the orchestrator that ties them together. Nothing here does network I/O;
//! the outside world sees only snapshots and event log lines.

mod clock;
mod config;
mod decision;
mod event_log;
mod sensor;
mod signal;
mod snapshot;
mod types;
mod vehicle;
mod world;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{
    SimConfig, MIXED_TRAFFIC_CEILING, PRIORITY_GREEN_BONUS, PRIORITY_GREEN_CEILING,
};
pub use decision::{CycleDurations, DecisionAlgorithm};
pub use event_log::{EventLog, EventSink, LogLevel, DEFAULT_LOG_CAPACITY};
pub use sensor::{DensityTier, SensorReading, SensorRecord, SimSensor, SENSOR_HISTORY_LEN};
pub use signal::SimSignal;
pub use snapshot::{Snapshot, SnapshotCell, VehicleView};
pub use types::{
    priority_label, Category, Phase, SimError, SpeedClass, VehicleId, EXIT_BOUNDARY, LANE_COUNT,
    NO_PRIORITY, PASS_LINE, PRIORITY_BOOST, RED_CREEP_FACTOR, RESPAWN_RANGE, SPAWN_RANGE,
    STOP_LINE, YELLOW_SPEED_FACTOR,
};
pub use vehicle::{AdvanceResult, SimVehicle};
pub use world::{RunReport, SimWorld};

//! Adaptive Traffic Signal Simulation Library
//!
//! Simulates a four-lane intersection whose light timings adapt to traffic
//! density and preempt for emergency vehicles, publishing JSON snapshots for
//! a browser visualizer.

pub mod publisher;
pub mod simulation;

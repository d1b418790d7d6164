//! # Crowd Navigation Core
//!
//! A crowd simulation engine for evaluating robot navigation strategies.
//!
//! ## Components
//!
//! - **Social force crowd**: pedestrians driven toward goals and pushed apart
//!   by exponential repulsion from each other and the canvas walls.
//! - **Control strategies**: manual, straight-to-goal, random walk and a
//!   potential field planner for the robot.
//! - **Penalty metric**: per-frame score of how far the robot intrudes on
//!   pedestrians.
//! - **Scenarios**: JSON templates with optional obstacle randomization.
//! - **Episodes**: [`Simulation`] ties everything together into a tick loop
//!   with running statistics.
//!
//! ## Usage
//!
//! Rust callers build a [`ScenarioCatalog`] and a [`SimulationSettings`] and
//! call [`Simulation::step`]. The `python` feature exposes the same loop as
//! the `crowdnav_core` extension module; the `crowdnav` binary runs it
//! headless.

pub mod config;
pub mod control;
pub mod episode;
pub mod error;
pub mod motion;
pub mod pedestrian;
pub mod penalty;
pub mod robot;
pub mod sampling;
pub mod scenario;
pub mod structs;

#[cfg(feature = "python")]
mod python;

pub use config::SimulationSettings;
pub use control::{ControlMode, InputState};
pub use episode::{EpisodeStats, EpisodeSummary, Simulation, TickReport};
pub use error::{Result, SimError};
pub use pedestrian::{Pedestrian, PedestrianParams, RespawnPolicy};
pub use penalty::{compute_penalty, PenaltyConfig};
pub use robot::Robot;
pub use scenario::{Scenario, ScenarioCatalog, ScenarioTemplate};
pub use structs::{Point, Rect, Vector2D, WorldBounds};

//! # Robot Control Strategies
//!
//! Each strategy maps the world state to a desired movement vector:
//!
//! - **Manual**: directional input, one axis step per pressed key
//! - **Naive**: straight at the goal, ignoring the crowd
//! - **Random**: independent random step on each axis
//! - **Potential field**: goal attraction plus inverse-square repulsion from
//!   nearby pedestrians
//!
//! Outputs are not normalised here. The caller rescales any non-zero vector
//! to the robot's speed (see [`crate::robot::Robot::apply_command`]).

use crate::error::SimError;
use crate::pedestrian::Pedestrian;
use crate::robot::Robot;
use crate::structs::{Point, Vector2D};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Snapshot of the directional keys for one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct InputState {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
}

impl InputState {
    pub fn new(up: bool, down: bool, left: bool, right: bool) -> Self {
        InputState {
            up,
            down,
            left,
            right,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PotentialFieldParams {
    pub attract_strength: f64,
    pub repel_strength: f64,
    pub repel_radius: f64,
}

impl Default for PotentialFieldParams {
    fn default() -> Self {
        PotentialFieldParams {
            attract_strength: 1.0,
            repel_strength: 50.0,
            repel_radius: 60.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ControlMode {
    Manual,
    Naive,
    Random,
    #[default]
    PotentialField,
}

impl ControlMode {
    pub const ALL: [ControlMode; 4] = [
        ControlMode::Manual,
        ControlMode::Naive,
        ControlMode::Random,
        ControlMode::PotentialField,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ControlMode::Manual => "manual",
            ControlMode::Naive => "naive",
            ControlMode::Random => "random",
            ControlMode::PotentialField => "potential-field",
        }
    }

    /// True for modes that need no operator input.
    pub fn is_autonomous(&self) -> bool {
        !matches!(self, ControlMode::Manual)
    }

    pub fn desired_move<R: Rng>(
        &self,
        robot: &Robot,
        goal: Point,
        pedestrians: &[Pedestrian],
        input: &InputState,
        rng: &mut R,
    ) -> Vector2D {
        match self {
            ControlMode::Manual => manual_move(input),
            ControlMode::Naive => naive_move(robot, goal),
            ControlMode::Random => random_move(rng),
            ControlMode::PotentialField => {
                potential_field_move(robot, goal, pedestrians, &PotentialFieldParams::default())
            }
        }
    }
}

impl fmt::Display for ControlMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ControlMode {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "manual" => Ok(ControlMode::Manual),
            "naive" => Ok(ControlMode::Naive),
            "random" => Ok(ControlMode::Random),
            "potential-field" | "potential_field" | "potential" => Ok(ControlMode::PotentialField),
            _ => Err(SimError::UnknownControlMode(s.to_string())),
        }
    }
}

pub fn manual_move(input: &InputState) -> Vector2D {
    let mut step = Vector2D::ZERO;
    if input.up {
        step.y -= 1.0;
    }
    if input.down {
        step.y += 1.0;
    }
    if input.left {
        step.x -= 1.0;
    }
    if input.right {
        step.x += 1.0;
    }
    step
}

pub fn naive_move(robot: &Robot, goal: Point) -> Vector2D {
    (goal - robot.position).normalize()
}

pub fn random_move<R: Rng>(rng: &mut R) -> Vector2D {
    let x = rng.gen_range(-1..=1) as f64;
    let y = rng.gen_range(-1..=1) as f64;
    Vector2D::new(x, y)
}

pub fn potential_field_move(
    robot: &Robot,
    goal: Point,
    pedestrians: &[Pedestrian],
    params: &PotentialFieldParams,
) -> Vector2D {
    let attract = (goal - robot.position).normalize() * params.attract_strength;

    let mut repel = Vector2D::ZERO;
    for ped in pedestrians {
        let to_robot = robot.position - ped.position;
        let dist = to_robot.magnitude();
        if dist > 0.0 && dist < params.repel_radius {
            let strength = params.repel_strength / (dist * dist);
            repel += to_robot.normalize() * strength;
        }
    }

    attract + repel
}

//! # Pedestrian Dynamics
//!
//! Social-force crowd model: every pedestrian is pulled toward its goal and
//! pushed away from other pedestrians and from the side walls of the canvas.
//!
//! ## Algorithm
//!
//! Per tick, for the pedestrian at index `i`:
//! 1. Sum the goal-driving, pairwise and wall forces (velocity-change units)
//! 2. Add them to the velocity and rescale it down to `max_speed` if needed
//! 3. Resolve the move through [`crate::motion::resolve_move`]; when both
//!    axes are blocked the pedestrian bounces back with a damped, slightly
//!    perturbed velocity
//! 4. Clamp the position onto the canvas
//!
//! [`step_crowd`] updates the crowd in index order and writes each result
//! back immediately, so pedestrian `i` reacts to the already-updated
//! positions of pedestrians `0..i`. Tuning lives in the immutable
//! [`PedestrianParams`]; the per-agent record only carries state.

use crate::motion::{resolve_move, Resolution};
use crate::sampling::uniform;
use crate::scenario::{random_pedestrian_route, Scenario};
use crate::structs::{Point, Rect, Vector2D, WorldBounds};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Distances below this are treated as this, to keep the exponentials finite.
const MIN_DISTANCE: f64 = 1e-6;
/// Distance to goal under which a pedestrian counts as arrived.
pub const GOAL_THRESHOLD: f64 = 15.0;
/// Velocity factor applied on both axes when a move is fully blocked.
const BOUNCE_DAMPING: f64 = -0.4;
/// Half-width of the uniform heading perturbation added after a bounce.
const BOUNCE_JITTER: f64 = 0.2;

/// Social-force tuning shared by every pedestrian of a crowd.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PedestrianParams {
    pub radius: f64,
    pub desired_speed: f64,
    pub relaxation_time: f64,
    pub max_speed: f64,
    /// Pairwise repulsion strength.
    pub ped_a: f64,
    /// Pairwise repulsion range.
    pub ped_b: f64,
    /// Side-wall repulsion strength. Zero disables the term.
    pub wall_a: f64,
    /// Side-wall repulsion range.
    pub wall_b: f64,
}

impl Default for PedestrianParams {
    fn default() -> Self {
        PedestrianParams {
            radius: 10.0,
            desired_speed: 1.5,
            relaxation_time: 30.0,
            max_speed: 3.0,
            ped_a: 8.0,
            ped_b: 8.0,
            wall_a: 0.0,
            wall_b: 5.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pedestrian {
    pub position: Point,
    pub velocity: Vector2D,
    pub goal: Point,
    pub radius: f64,
}

/// Where a pedestrian reappears once it reaches its goal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RespawnPolicy {
    /// New route sampled from the scenario's spawn and goal regions.
    #[default]
    Regions,
    /// Enter just below the bottom edge, head for a point on the top edge.
    Boundary,
}

impl Pedestrian {
    pub fn new(position: Point, goal: Point, radius: f64) -> Self {
        Pedestrian {
            position,
            velocity: Vector2D::ZERO,
            goal,
            radius,
        }
    }

    pub fn speed(&self) -> f64 {
        self.velocity.magnitude()
    }

    pub fn has_reached_goal(&self) -> bool {
        self.position.distance(&self.goal) < GOAL_THRESHOLD
    }

    /// Staged below the canvas, waiting to walk in. Ignored by others' repulsion.
    pub fn is_staged(&self, bounds: &WorldBounds) -> bool {
        self.position.y > bounds.height + self.radius
    }

    fn restart(&mut self, position: Point, goal: Point) {
        self.position = position;
        self.velocity = Vector2D::ZERO;
        self.goal = goal;
    }
}

pub fn goal_force(ped: &Pedestrian, params: &PedestrianParams) -> Vector2D {
    let to_goal = ped.goal - ped.position;
    let dist = to_goal.magnitude();
    if dist < MIN_DISTANCE {
        return Vector2D::ZERO;
    }
    let heading = to_goal * (1.0 / dist);
    (heading * params.desired_speed - ped.velocity) * (1.0 / params.relaxation_time)
}

/// Exponential repulsion from every other non-staged pedestrian in `crowd`.
pub fn pedestrian_repulsion(
    index: usize,
    crowd: &[Pedestrian],
    params: &PedestrianParams,
    bounds: &WorldBounds,
) -> Vector2D {
    let me = &crowd[index];
    let mut force = Vector2D::ZERO;

    for (j, other) in crowd.iter().enumerate() {
        if j == index || other.is_staged(bounds) {
            continue;
        }
        let away = me.position - other.position;
        let dist = away.magnitude().max(MIN_DISTANCE);
        let normal = away * (1.0 / dist);
        let combined_radius = me.radius + other.radius;
        let magnitude = params.ped_a * ((combined_radius - dist) / params.ped_b).exp();
        force += normal * magnitude;
    }

    force
}

/// Repulsion from the left and right canvas edges only.
pub fn wall_repulsion(ped: &Pedestrian, params: &PedestrianParams, bounds: &WorldBounds) -> Vector2D {
    let walls = [
        (ped.position.x, Vector2D::new(1.0, 0.0)),
        (bounds.width - ped.position.x, Vector2D::new(-1.0, 0.0)),
    ];

    let mut force = Vector2D::ZERO;
    for (dist, normal) in walls {
        let dist = dist.max(MIN_DISTANCE);
        let magnitude = params.wall_a * ((ped.radius - dist) / params.wall_b).exp();
        force += normal * magnitude;
    }
    force
}

/// Computes the next state of `crowd[index]` without mutating the crowd.
pub fn advance<R: Rng>(
    index: usize,
    crowd: &[Pedestrian],
    params: &PedestrianParams,
    obstacles: &[Rect],
    bounds: &WorldBounds,
    rng: &mut R,
) -> Pedestrian {
    let mut next = crowd[index];

    let force = goal_force(&next, params)
        + pedestrian_repulsion(index, crowd, params, bounds)
        + wall_repulsion(&next, params, bounds);
    next.velocity = (next.velocity + force).clamp_magnitude(params.max_speed);

    let origin = next.position;
    let (reached, resolution) = resolve_move(origin, next.velocity, next.radius, obstacles);
    next.position = match resolution {
        Resolution::Blocked => {
            let jitter_x = uniform(rng, -BOUNCE_JITTER, BOUNCE_JITTER);
            let jitter_y = uniform(rng, -BOUNCE_JITTER, BOUNCE_JITTER);
            next.velocity = Vector2D::new(
                next.velocity.x * BOUNCE_DAMPING + jitter_x,
                next.velocity.y * BOUNCE_DAMPING + jitter_y,
            );
            origin + next.velocity
        }
        _ => reached,
    };

    next.position = bounds.clamp_disk(next.position, next.radius);
    next
}

/// Advances every pedestrian once, in index order.
pub fn step_crowd<R: Rng>(
    crowd: &mut [Pedestrian],
    params: &PedestrianParams,
    obstacles: &[Rect],
    bounds: &WorldBounds,
    rng: &mut R,
) {
    for i in 0..crowd.len() {
        let next = advance(i, crowd, params, obstacles, bounds, rng);
        crowd[i] = next;
    }
}

/// Boundary respawn: enter below the bottom edge, target the top edge.
pub fn respawn_at_boundary<R: Rng>(ped: &mut Pedestrian, bounds: &WorldBounds, rng: &mut R) {
    let x = uniform(rng, ped.radius, bounds.width - ped.radius);
    let goal_x = uniform(rng, ped.radius, bounds.width - ped.radius);
    ped.restart(
        Point::new(x, bounds.height + ped.radius),
        Point::new(goal_x, ped.radius),
    );
}

/// Respawns every pedestrian that has reached its goal. Returns how many did.
pub fn respawn_reached<R: Rng>(
    crowd: &mut [Pedestrian],
    scenario: &Scenario,
    policy: RespawnPolicy,
    rng: &mut R,
) -> usize {
    let mut respawned = 0;
    for ped in crowd.iter_mut().filter(|p| p.has_reached_goal()) {
        match policy {
            RespawnPolicy::Regions => {
                let (spawn, goal) = random_pedestrian_route(scenario, rng);
                ped.restart(spawn, goal);
            }
            RespawnPolicy::Boundary => respawn_at_boundary(ped, &scenario.bounds, rng),
        }
        respawned += 1;
    }
    respawned
}

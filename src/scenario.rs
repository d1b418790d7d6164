//! # Scenario Templates and Instantiation
//!
//! A [`ScenarioTemplate`] is a static layout read from a JSON file: robot
//! start and goal, base obstacle rectangles, pedestrian spawn and goal
//! regions, and randomization knobs. [`build_scenario`] turns a template into
//! the concrete [`Scenario`] of one episode.
//!
//! ## Randomized worlds
//!
//! With `randomize_world` set, every base obstacle is jittered in position
//! and size, then a random number of extra obstacles is scattered over the
//! canvas. An extra obstacle is rejected when it touches the 45-unit safety
//! disk around the robot's start or goal, or comes within 20 units of an
//! obstacle already placed. After 30 rejected candidates the obstacle is
//! dropped, so a crowded layout may end up with fewer extras than drawn.
//!
//! ## Random stream order
//!
//! Draws happen in a fixed order (base jitter x, y, w, h per obstacle, then
//! extra count, then w, h, x, y per candidate). Changing that order changes
//! every later outcome of a seeded run.

use crate::error::{Result, SimError};
use crate::pedestrian::{Pedestrian, PedestrianParams};
use crate::sampling::uniform;
use crate::structs::{Point, Rect, WorldBounds};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info, trace};

/// Smallest side an obstacle may have after clamping.
const MIN_OBSTACLE_SIDE: i32 = 20;
/// Clearance radius around the robot's start and goal for extra obstacles.
const ROBOT_SAFETY_RADIUS: f64 = 45.0;
/// Total inflation applied to existing obstacles when spacing extras.
const OBSTACLE_SPACING: i32 = 20;
const PLACEMENT_ATTEMPTS: usize = 30;
/// Inset from region edges when sampling pedestrian points.
pub const REGION_MARGIN: f64 = 12.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RandomizationParams {
    pub obstacle_jitter_px: i32,
    pub obstacle_size_jitter_px: i32,
    pub extra_obstacle_min: i32,
    pub extra_obstacle_max: i32,
    pub random_obstacle_min_size: i32,
    pub random_obstacle_max_size: i32,
}

impl Default for RandomizationParams {
    fn default() -> Self {
        RandomizationParams {
            obstacle_jitter_px: 0,
            obstacle_size_jitter_px: 0,
            extra_obstacle_min: 0,
            extra_obstacle_max: 0,
            random_obstacle_min_size: 35,
            random_obstacle_max_size: 110,
        }
    }
}

/// On-disk layout of a scenario config file.
#[derive(Debug, Clone, Deserialize)]
struct ScenarioFile {
    id: String,
    name: String,
    robot_start: [f64; 2],
    robot_goal: [f64; 2],
    #[serde(default)]
    obstacles: Vec<[i32; 4]>,
    pedestrian_spawn_regions: Vec<[i32; 4]>,
    pedestrian_goal_regions: Vec<[i32; 4]>,
    #[serde(default)]
    randomization: RandomizationParams,
    #[serde(default)]
    world_size: Option<[f64; 2]>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioTemplate {
    pub id: String,
    pub name: String,
    pub robot_start: Point,
    pub robot_goal: Point,
    pub obstacles: Vec<Rect>,
    pub spawn_regions: Vec<Rect>,
    pub goal_regions: Vec<Rect>,
    pub randomization: RandomizationParams,
    pub bounds: WorldBounds,
}

impl From<ScenarioFile> for ScenarioTemplate {
    fn from(raw: ScenarioFile) -> Self {
        let bounds = raw
            .world_size
            .map(|[w, h]| WorldBounds::new(w, h))
            .unwrap_or_default();
        ScenarioTemplate {
            id: raw.id,
            name: raw.name,
            robot_start: Point::new(raw.robot_start[0], raw.robot_start[1]),
            robot_goal: Point::new(raw.robot_goal[0], raw.robot_goal[1]),
            obstacles: raw.obstacles.into_iter().map(Rect::from).collect(),
            spawn_regions: raw.pedestrian_spawn_regions.into_iter().map(Rect::from).collect(),
            goal_regions: raw.pedestrian_goal_regions.into_iter().map(Rect::from).collect(),
            randomization: raw.randomization,
            bounds,
        }
    }
}

impl ScenarioTemplate {
    /// Parses one scenario file; `path` is only used for error reporting.
    pub fn from_json(text: &str, path: &Path) -> Result<Self> {
        let raw: ScenarioFile = serde_json::from_str(text).map_err(|source| SimError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        let template = ScenarioTemplate::from(raw);
        template.validate()?;
        Ok(template)
    }

    pub fn validate(&self) -> Result<()> {
        let invalid = |reason: &str| SimError::InvalidTemplate {
            id: self.id.clone(),
            reason: reason.to_string(),
        };
        if self.spawn_regions.is_empty() {
            return Err(invalid("at least one pedestrian spawn region is required"));
        }
        if self.goal_regions.is_empty() {
            return Err(invalid("at least one pedestrian goal region is required"));
        }
        let r = &self.randomization;
        if r.obstacle_jitter_px < 0 || r.obstacle_size_jitter_px < 0 {
            return Err(invalid("jitter amounts must be non-negative"));
        }
        if r.extra_obstacle_min < 0 || r.extra_obstacle_min > r.extra_obstacle_max.max(0) {
            return Err(invalid("extra_obstacle_min must be within 0..=extra_obstacle_max"));
        }
        if r.random_obstacle_min_size > r.random_obstacle_max_size {
            return Err(invalid("random_obstacle_min_size exceeds random_obstacle_max_size"));
        }
        if self.bounds.width <= 2.0 * MIN_OBSTACLE_SIDE as f64
            || self.bounds.height <= 2.0 * MIN_OBSTACLE_SIDE as f64
        {
            return Err(invalid("world_size is too small"));
        }
        Ok(())
    }
}

/// Reads every `*.json` file in `dir`, in sorted path order.
///
/// A later file that reuses an id replaces the earlier template.
pub fn load_scenario_templates(dir: &Path) -> Result<BTreeMap<String, ScenarioTemplate>> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) if err.kind() == ErrorKind::NotFound => {
            return Err(SimError::NoScenarioConfigs {
                dir: dir.to_path_buf(),
            })
        }
        Err(source) => {
            return Err(SimError::Io {
                path: dir.to_path_buf(),
                source,
            })
        }
    };

    let mut paths: Vec<PathBuf> = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| SimError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "json") {
            paths.push(path);
        }
    }
    paths.sort();

    let mut templates = BTreeMap::new();
    for path in paths {
        let text = fs::read_to_string(&path).map_err(|source| SimError::Io {
            path: path.clone(),
            source,
        })?;
        let template = ScenarioTemplate::from_json(&text, &path)?;
        templates.insert(template.id.clone(), template);
    }

    if templates.is_empty() {
        return Err(SimError::NoScenarioConfigs {
            dir: dir.to_path_buf(),
        });
    }

    info!(count = templates.len(), dir = %dir.display(), "Loaded scenario templates");
    Ok(templates)
}

/// Loaded templates keyed by scenario id.
#[derive(Debug, Clone, Default)]
pub struct ScenarioCatalog {
    templates: BTreeMap<String, ScenarioTemplate>,
}

impl ScenarioCatalog {
    pub fn load(dir: &Path) -> Result<Self> {
        Ok(ScenarioCatalog {
            templates: load_scenario_templates(dir)?,
        })
    }

    /// Builds a catalog from in-memory templates, validating each one.
    pub fn from_templates(templates: impl IntoIterator<Item = ScenarioTemplate>) -> Result<Self> {
        let mut catalog = ScenarioCatalog::default();
        for template in templates {
            template.validate()?;
            catalog.templates.insert(template.id.clone(), template);
        }
        Ok(catalog)
    }

    pub fn get(&self, id: &str) -> Result<&ScenarioTemplate> {
        self.templates.get(id).ok_or_else(|| SimError::UnknownScenario {
            id: id.to_string(),
            available: self.ids(),
        })
    }

    pub fn ids(&self) -> Vec<String> {
        self.templates.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

/// One concrete instantiation of a template, owned by a single episode.
///
/// Built from a validated template, so both region lists are non-empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub id: String,
    pub name: String,
    pub robot_start: Point,
    pub robot_goal: Point,
    pub obstacles: Vec<Rect>,
    pub spawn_regions: Vec<Rect>,
    pub goal_regions: Vec<Rect>,
    pub bounds: WorldBounds,
}

/// Clamps a rectangle to at least 20x20, at most the canvas minus 20, fully on canvas.
pub fn clamp_to_safe_bounds(rect: Rect, bounds: &WorldBounds) -> Rect {
    let (canvas_w, canvas_h) = (bounds.width_px(), bounds.height_px());
    let width = rect.width.min(canvas_w - MIN_OBSTACLE_SIDE).max(MIN_OBSTACLE_SIDE);
    let height = rect.height.min(canvas_h - MIN_OBSTACLE_SIDE).max(MIN_OBSTACLE_SIDE);
    let x = rect.x.min(canvas_w - width).max(0);
    let y = rect.y.min(canvas_h - height).max(0);
    Rect::new(x, y, width, height)
}

fn jittered_obstacle<R: Rng>(
    rect: Rect,
    params: &RandomizationParams,
    bounds: &WorldBounds,
    rng: &mut R,
) -> Rect {
    let mut out = rect;
    let pos = params.obstacle_jitter_px;
    if pos > 0 {
        out.x += rng.gen_range(-pos..=pos);
        out.y += rng.gen_range(-pos..=pos);
    }
    let size = params.obstacle_size_jitter_px;
    if size > 0 {
        out.width += rng.gen_range(-size..=size);
        out.height += rng.gen_range(-size..=size);
    }
    clamp_to_safe_bounds(out, bounds)
}

fn placement_is_clear(template: &ScenarioTemplate, candidate: &Rect, placed: &[Rect]) -> bool {
    if candidate.hits_circle(template.robot_start, ROBOT_SAFETY_RADIUS)
        || candidate.hits_circle(template.robot_goal, ROBOT_SAFETY_RADIUS)
    {
        return false;
    }
    !placed
        .iter()
        .any(|existing| candidate.intersects(&existing.inflate(OBSTACLE_SPACING, OBSTACLE_SPACING)))
}

fn add_extra_obstacles<R: Rng>(template: &ScenarioTemplate, obstacles: &mut Vec<Rect>, rng: &mut R) {
    let params = &template.randomization;
    if params.extra_obstacle_max <= 0 {
        return;
    }
    let bounds = &template.bounds;
    let count = rng.gen_range(params.extra_obstacle_min..=params.extra_obstacle_max);
    let (min_size, max_size) = (params.random_obstacle_min_size, params.random_obstacle_max_size);

    for slot in 0..count {
        let mut accepted = false;
        for _ in 0..PLACEMENT_ATTEMPTS {
            let w = rng.gen_range(min_size..=max_size);
            let h = rng.gen_range(min_size..=max_size);
            let x = rng.gen_range(0..(bounds.width_px() - w).max(1));
            let y = rng.gen_range(0..(bounds.height_px() - h).max(1));
            let candidate = clamp_to_safe_bounds(Rect::new(x, y, w, h), bounds);
            if placement_is_clear(template, &candidate, obstacles) {
                obstacles.push(candidate);
                accepted = true;
                break;
            }
        }
        if !accepted {
            trace!(scenario = %template.id, slot, "Skipped extra obstacle after {PLACEMENT_ATTEMPTS} attempts");
        }
    }
}

pub fn build_scenario<R: Rng>(template: &ScenarioTemplate, rng: &mut R, randomize_world: bool) -> Scenario {
    let bounds = template.bounds;
    let obstacles = if randomize_world {
        let mut obstacles: Vec<Rect> = template
            .obstacles
            .iter()
            .map(|&rect| jittered_obstacle(rect, &template.randomization, &bounds, rng))
            .collect();
        add_extra_obstacles(template, &mut obstacles, rng);
        obstacles
    } else {
        template
            .obstacles
            .iter()
            .map(|&rect| clamp_to_safe_bounds(rect, &bounds))
            .collect()
    };

    debug!(
        scenario = %template.id,
        base = template.obstacles.len(),
        total = obstacles.len(),
        randomize_world,
        "Built scenario"
    );

    Scenario {
        id: template.id.clone(),
        name: template.name.clone(),
        robot_start: template.robot_start,
        robot_goal: template.robot_goal,
        obstacles,
        spawn_regions: template.spawn_regions.clone(),
        goal_regions: template.goal_regions.clone(),
        bounds,
    }
}

pub fn random_point_in_region<R: Rng + ?Sized>(region: &Rect, rng: &mut R, margin: f64) -> Point {
    let x = uniform(rng, region.left() as f64 + margin, region.right() as f64 - margin);
    let y = uniform(rng, region.top() as f64 + margin, region.bottom() as f64 - margin);
    Point::new(x, y)
}

/// Draws a spawn point and a goal for one pedestrian.
pub fn random_pedestrian_route<R: Rng + ?Sized>(scenario: &Scenario, rng: &mut R) -> (Point, Point) {
    let spawn_region = &scenario.spawn_regions[rng.gen_range(0..scenario.spawn_regions.len())];
    let goal_region = &scenario.goal_regions[rng.gen_range(0..scenario.goal_regions.len())];
    let spawn = random_point_in_region(spawn_region, rng, REGION_MARGIN);
    let goal = random_point_in_region(goal_region, rng, REGION_MARGIN);
    (spawn, goal)
}

pub fn generate_pedestrians<R: Rng>(
    scenario: &Scenario,
    params: &PedestrianParams,
    rng: &mut R,
    count: usize,
) -> Vec<Pedestrian> {
    (0..count)
        .map(|_| {
            let (spawn, goal) = random_pedestrian_route(scenario, rng);
            Pedestrian::new(spawn, goal, params.radius)
        })
        .collect()
}

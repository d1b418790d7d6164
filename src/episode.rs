//! # Episode Orchestration
//!
//! [`Simulation`] owns every piece of mutable state (scenario, robot, crowd,
//! statistics and the random stream) and advances it one tick at a time:
//!
//! 1. The active [`ControlMode`] proposes a robot move
//! 2. The move is applied through the obstacle resolver
//! 3. The crowd is stepped, then pedestrians at their goal are respawned
//! 4. The frame penalty is added to the running total
//! 5. If the robot is within 20 units of its goal the episode is recorded
//!    and a fresh one is built from the same template
//!
//! The random stream is never reseeded between episodes, so a seeded run is
//! reproducible across any number of episode resets.

use crate::config::SimulationSettings;
use crate::control::{ControlMode, InputState};
use crate::error::Result;
use crate::pedestrian::{respawn_reached, step_crowd, Pedestrian};
use crate::robot::Robot;
use crate::scenario::{build_scenario, generate_pedestrians, Scenario, ScenarioCatalog, ScenarioTemplate};
use crate::structs::{Point, Rect};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use tracing::{debug, info};

/// Robot-to-goal distance that ends an episode.
pub const ROBOT_GOAL_RADIUS: f64 = 20.0;

/// Outcome of one finished episode.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EpisodeSummary {
    /// 1-based index of the finished episode.
    pub episode: usize,
    pub penalty: f64,
    pub steps: u64,
    pub average_penalty: f64,
    pub average_steps: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EpisodeStats {
    /// Penalty accumulated in the running episode.
    pub penalty: f64,
    /// Ticks taken in the running episode.
    pub steps: u64,
    pub penalty_history: Vec<f64>,
    pub step_history: Vec<u64>,
}

impl EpisodeStats {
    pub fn completed_episodes(&self) -> usize {
        self.penalty_history.len()
    }

    pub fn average_penalty(&self) -> Option<f64> {
        mean(self.penalty_history.iter().copied())
    }

    pub fn average_steps(&self) -> Option<f64> {
        mean(self.step_history.iter().map(|&s| s as f64))
    }

    fn reset_current(&mut self) {
        self.penalty = 0.0;
        self.steps = 0;
    }

    fn record_episode(&mut self) -> EpisodeSummary {
        self.penalty_history.push(self.penalty);
        self.step_history.push(self.steps);
        let summary = EpisodeSummary {
            episode: self.completed_episodes(),
            penalty: self.penalty,
            steps: self.steps,
            average_penalty: self.average_penalty().unwrap_or(0.0),
            average_steps: self.average_steps().unwrap_or(0.0),
        };
        self.reset_current();
        summary
    }
}

fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, n) = values.fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    (n > 0).then(|| sum / n as f64)
}

/// What happened during a single tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickReport {
    pub frame_penalty: f64,
    pub respawned: usize,
    /// Set on the tick where the robot reached its goal.
    pub completed: Option<EpisodeSummary>,
}

pub struct Simulation {
    catalog: ScenarioCatalog,
    template: ScenarioTemplate,
    settings: SimulationSettings,
    seed: u64,
    rng: StdRng,
    scenario: Scenario,
    robot: Robot,
    pedestrians: Vec<Pedestrian>,
    stats: EpisodeStats,
}

impl Simulation {
    /// Resolves the requested scenario and builds the first episode.
    ///
    /// An unknown scenario id fails before any state is constructed.
    pub fn new(catalog: ScenarioCatalog, settings: SimulationSettings) -> Result<Self> {
        let template = catalog.get(&settings.scenario_id)?.clone();
        let seed = settings.resolve_seed();
        let mut rng = StdRng::seed_from_u64(seed);
        let (scenario, robot, pedestrians) = build_episode(&template, &settings, &mut rng);

        info!(
            scenario = %template.id,
            seed,
            pedestrians = settings.pedestrian_count,
            randomize_world = settings.randomize_world,
            mode = %settings.mode,
            "Simulation ready"
        );

        Ok(Simulation {
            catalog,
            template,
            settings,
            seed,
            rng,
            scenario,
            robot,
            pedestrians,
            stats: EpisodeStats::default(),
        })
    }

    pub fn step(&mut self, input: &InputState) -> TickReport {
        let command = self.settings.mode.desired_move(
            &self.robot,
            self.scenario.robot_goal,
            &self.pedestrians,
            input,
            &mut self.rng,
        );
        self.stats.steps += 1;
        self.robot
            .apply_command(command, &self.scenario.obstacles, &self.scenario.bounds);

        step_crowd(
            &mut self.pedestrians,
            &self.settings.pedestrian,
            &self.scenario.obstacles,
            &self.scenario.bounds,
            &mut self.rng,
        );
        let respawned = respawn_reached(
            &mut self.pedestrians,
            &self.scenario,
            self.settings.respawn,
            &mut self.rng,
        );

        let frame_penalty = self.settings.penalty.frame_penalty(&self.robot, &self.pedestrians);
        self.stats.penalty += frame_penalty;

        let completed = if self.robot.distance_to(&self.scenario.robot_goal) < ROBOT_GOAL_RADIUS {
            let summary = self.stats.record_episode();
            info!(
                episode = summary.episode,
                penalty = format_args!("{:.1}", summary.penalty),
                steps = summary.steps,
                avg_penalty = format_args!("{:.1}", summary.average_penalty),
                avg_steps = format_args!("{:.1}", summary.average_steps),
                "Episode complete"
            );
            self.rebuild();
            Some(summary)
        } else {
            None
        };

        TickReport {
            frame_penalty,
            respawned,
            completed,
        }
    }

    /// Steps autonomously until `max_episodes` finish or `max_ticks` elapse.
    pub fn run_until(&mut self, max_ticks: u64, max_episodes: usize) -> Vec<EpisodeSummary> {
        let idle = InputState::default();
        let mut finished = Vec::new();
        for _ in 0..max_ticks {
            if finished.len() >= max_episodes {
                break;
            }
            if let Some(summary) = self.step(&idle).completed {
                finished.push(summary);
            }
        }
        finished
    }

    /// Rebuilds the episode from another template, keeping the episode history.
    pub fn switch_scenario(&mut self, id: &str) -> Result<()> {
        let template = self.catalog.get(id)?.clone();
        debug!(from = %self.template.id, to = %template.id, "Switching scenario");
        self.template = template;
        self.stats.reset_current();
        self.rebuild();
        Ok(())
    }

    pub fn set_mode(&mut self, mode: ControlMode) {
        self.settings.mode = mode;
    }

    fn rebuild(&mut self) {
        let (scenario, robot, pedestrians) = build_episode(&self.template, &self.settings, &mut self.rng);
        self.scenario = scenario;
        self.robot = robot;
        self.pedestrians = pedestrians;
    }

    pub fn mode(&self) -> ControlMode {
        self.settings.mode
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn settings(&self) -> &SimulationSettings {
        &self.settings
    }

    pub fn catalog(&self) -> &ScenarioCatalog {
        &self.catalog
    }

    pub fn scenario(&self) -> &Scenario {
        &self.scenario
    }

    pub fn scenario_name(&self) -> &str {
        &self.scenario.name
    }

    pub fn robot(&self) -> &Robot {
        &self.robot
    }

    pub fn goal(&self) -> Point {
        self.scenario.robot_goal
    }

    pub fn pedestrians(&self) -> &[Pedestrian] {
        &self.pedestrians
    }

    pub fn obstacles(&self) -> &[Rect] {
        &self.scenario.obstacles
    }

    pub fn stats(&self) -> &EpisodeStats {
        &self.stats
    }
}

fn build_episode(
    template: &ScenarioTemplate,
    settings: &SimulationSettings,
    rng: &mut StdRng,
) -> (Scenario, Robot, Vec<Pedestrian>) {
    let scenario = build_scenario(template, rng, settings.randomize_world);
    let robot = Robot::new(scenario.robot_start);
    let pedestrians = generate_pedestrians(&scenario, &settings.pedestrian, rng, settings.pedestrian_count);
    (scenario, robot, pedestrians)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SimError;
    use crate::scenario::RandomizationParams;
    use crate::structs::WorldBounds;
    use approx::assert_relative_eq;

    fn corridor(id: &str) -> ScenarioTemplate {
        ScenarioTemplate {
            id: id.to_string(),
            name: format!("Corridor {id}"),
            robot_start: Point::new(80.0, 320.0),
            robot_goal: Point::new(380.0, 320.0),
            obstacles: vec![],
            spawn_regions: vec![Rect::new(600, 40, 200, 120)],
            goal_regions: vec![Rect::new(600, 480, 200, 120)],
            randomization: RandomizationParams {
                obstacle_jitter_px: 10,
                extra_obstacle_min: 1,
                extra_obstacle_max: 3,
                ..RandomizationParams::default()
            },
            bounds: WorldBounds::default(),
        }
    }

    fn settings(mode: ControlMode) -> SimulationSettings {
        SimulationSettings {
            scenario_id: "a".to_string(),
            pedestrian_count: 6,
            seed: Some(2024),
            mode,
            ..SimulationSettings::default()
        }
    }

    fn catalog() -> ScenarioCatalog {
        ScenarioCatalog::from_templates(vec![corridor("a"), corridor("b")]).unwrap()
    }

    // ==================== Construction Tests ====================

    #[test]
    fn test_new_rejects_unknown_scenario() {
        let s = SimulationSettings {
            scenario_id: "nowhere".to_string(),
            ..settings(ControlMode::Naive)
        };
        let err = Simulation::new(catalog(), s).err().expect("unknown id must fail");
        assert!(matches!(err, SimError::UnknownScenario { .. }));
    }

    #[test]
    fn test_new_builds_first_episode() {
        let sim = Simulation::new(catalog(), settings(ControlMode::Naive)).unwrap();
        assert_eq!(sim.pedestrians().len(), 6);
        assert_eq!(sim.robot().position, Point::new(80.0, 320.0));
        assert_eq!(sim.seed(), 2024);
        assert_eq!(sim.stats().steps, 0);
    }

    // ==================== Tick Tests ====================

    #[test]
    fn test_manual_without_input_keeps_robot_still() {
        let mut sim = Simulation::new(catalog(), settings(ControlMode::Manual)).unwrap();
        for _ in 0..10 {
            sim.step(&InputState::default());
        }
        assert_eq!(sim.robot().position, Point::new(80.0, 320.0));
        assert_eq!(sim.stats().steps, 10);
    }

    #[test]
    fn test_manual_input_moves_at_robot_speed() {
        let mut sim = Simulation::new(catalog(), settings(ControlMode::Manual)).unwrap();
        sim.step(&InputState::new(false, true, false, true));
        let moved = sim.robot().position - Point::new(80.0, 320.0);
        assert_relative_eq!(moved.magnitude(), 3.0, epsilon = 1e-9);
    }

    #[test]
    fn test_naive_episode_completes_and_resets() {
        let mut sim = Simulation::new(catalog(), settings(ControlMode::Naive)).unwrap();
        let mut completed = None;
        for _ in 0..200 {
            if let Some(summary) = sim.step(&InputState::default()).completed {
                completed = Some(summary);
                break;
            }
        }
        let summary = completed.expect("naive robot should reach an unobstructed goal");
        assert_eq!(summary.episode, 1);
        // 300 units at 3 per tick, finishing inside the 20-unit goal radius
        assert_eq!(summary.steps, 94);
        assert_eq!(summary.average_steps, 94.0);
        assert_eq!(sim.stats().steps, 0);
        assert_eq!(sim.stats().penalty, 0.0);
        assert_eq!(sim.stats().completed_episodes(), 1);
        assert_eq!(sim.robot().position, Point::new(80.0, 320.0));
        assert_eq!(sim.pedestrians().len(), 6);
    }

    #[test]
    fn test_run_collects_requested_episodes() {
        let mut sim = Simulation::new(catalog(), settings(ControlMode::PotentialField)).unwrap();
        let summaries = sim.run_until(5_000, 3);
        assert_eq!(summaries.len(), 3);
        assert_eq!(summaries.iter().map(|s| s.episode).collect::<Vec<_>>(), vec![1, 2, 3]);
        let mean_penalty = summaries.iter().map(|s| s.penalty).sum::<f64>() / 3.0;
        assert_relative_eq!(summaries[2].average_penalty, mean_penalty, epsilon = 1e-9);
    }

    #[test]
    fn test_seeded_runs_are_identical() {
        let mut a = Simulation::new(catalog(), SimulationSettings {
            randomize_world: true,
            ..settings(ControlMode::Random)
        })
        .unwrap();
        let mut b = Simulation::new(catalog(), SimulationSettings {
            randomize_world: true,
            ..settings(ControlMode::Random)
        })
        .unwrap();
        for _ in 0..400 {
            let ra = a.step(&InputState::default());
            let rb = b.step(&InputState::default());
            assert_eq!(ra, rb);
            assert_eq!(a.robot(), b.robot());
            assert_eq!(a.pedestrians(), b.pedestrians());
        }
        assert_eq!(a.obstacles(), b.obstacles());
    }

    // ==================== Scenario Switch Tests ====================

    #[test]
    fn test_switch_scenario_keeps_history() {
        let mut sim = Simulation::new(catalog(), settings(ControlMode::Naive)).unwrap();
        sim.run_until(1_000, 1);
        sim.step(&InputState::default());
        sim.switch_scenario("b").unwrap();
        assert_eq!(sim.scenario().id, "b");
        assert_eq!(sim.stats().steps, 0);
        assert_eq!(sim.stats().completed_episodes(), 1);
    }

    #[test]
    fn test_episode_reset_after_switch_uses_new_template() {
        let mut sim = Simulation::new(catalog(), settings(ControlMode::Naive)).unwrap();
        sim.switch_scenario("b").unwrap();
        let summaries = sim.run_until(1_000, 2);
        assert_eq!(summaries.len(), 2);
        assert_eq!(sim.scenario().id, "b");
        assert_eq!(sim.scenario_name(), "Corridor b");
    }

    #[test]
    fn test_switch_to_unknown_scenario_leaves_state() {
        let mut sim = Simulation::new(catalog(), settings(ControlMode::Naive)).unwrap();
        sim.step(&InputState::default());
        let before = sim.robot().position;
        assert!(sim.switch_scenario("zzz").is_err());
        assert_eq!(sim.scenario().id, "a");
        assert_eq!(sim.robot().position, before);
        assert_eq!(sim.stats().steps, 1);
    }

    // ==================== Stats Tests ====================

    #[test]
    fn test_stats_averages() {
        let mut stats = EpisodeStats::default();
        assert_eq!(stats.average_penalty(), None);
        stats.penalty = 4.0;
        stats.steps = 100;
        stats.record_episode();
        stats.penalty = 2.0;
        stats.steps = 50;
        let summary = stats.record_episode();
        assert_eq!(summary.episode, 2);
        assert_eq!(summary.average_penalty, 3.0);
        assert_eq!(summary.average_steps, 75.0);
    }
}

use std::path::PathBuf;

use crowdnav_core::{ControlMode, InputState, ScenarioCatalog, SimError, Simulation, SimulationSettings};

fn shipped_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("scenario_configs")
}

fn settings(scenario: &str, mode: ControlMode, randomize_world: bool) -> SimulationSettings {
    SimulationSettings {
        scenario_id: scenario.to_string(),
        pedestrian_count: 12,
        seed: Some(42),
        randomize_world,
        mode,
        scenario_dir: shipped_dir(),
        ..SimulationSettings::default()
    }
}

fn start(scenario: &str, mode: ControlMode, randomize_world: bool) -> Simulation {
    let catalog = ScenarioCatalog::load(&shipped_dir()).expect("shipped configs load");
    Simulation::new(catalog, settings(scenario, mode, randomize_world)).expect("scenario exists")
}

#[test]
fn test_shipped_catalog_contains_all_scenarios() {
    let catalog = ScenarioCatalog::load(&shipped_dir()).unwrap();
    assert_eq!(catalog.ids(), vec!["airport", "home", "shopping_center"]);
}

#[test]
fn test_unknown_scenario_lists_shipped_ids() {
    let catalog = ScenarioCatalog::load(&shipped_dir()).unwrap();
    let err = Simulation::new(catalog, settings("mall", ControlMode::Naive, false))
        .err()
        .expect("unknown scenario must fail");
    match err {
        SimError::UnknownScenario { id, available } => {
            assert_eq!(id, "mall");
            assert_eq!(available.len(), 3);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_fixed_seed_runs_match_on_every_scenario() {
    for id in ["home", "airport", "shopping_center"] {
        let mut a = start(id, ControlMode::PotentialField, true);
        let mut b = start(id, ControlMode::PotentialField, true);
        assert_eq!(a.obstacles(), b.obstacles(), "{id}: randomized layouts differ");
        for tick in 0..300 {
            let ra = a.step(&InputState::default());
            let rb = b.step(&InputState::default());
            assert_eq!(ra, rb, "{id}: tick {tick} diverged");
        }
        assert_eq!(a.pedestrians(), b.pedestrians());
        assert_eq!(a.robot(), b.robot());
        assert_eq!(a.stats(), b.stats());
    }
}

#[test]
fn test_crowd_size_and_bounds_hold_over_many_ticks() {
    let mut sim = start("airport", ControlMode::Random, true);
    let bounds = sim.scenario().bounds;
    for _ in 0..1_000 {
        let report = sim.step(&InputState::default());
        assert!(report.frame_penalty >= 0.0);
        assert_eq!(sim.pedestrians().len(), 12);

        let robot = sim.robot();
        assert!(robot.position.x >= robot.radius && robot.position.x <= bounds.width - robot.radius);
        assert!(robot.position.y >= robot.radius && robot.position.y <= bounds.height - robot.radius);
        for ped in sim.pedestrians() {
            assert!(ped.position.x >= ped.radius && ped.position.x <= bounds.width - ped.radius);
            assert!(ped.position.y >= ped.radius && ped.position.y <= bounds.height - ped.radius);
            assert!(ped.speed() <= 3.0 + 1e-9, "speed cap exceeded: {}", ped.speed());
        }
    }
}

#[test]
fn test_switching_through_shipped_scenarios() {
    let mut sim = start("home", ControlMode::Naive, false);
    for _ in 0..50 {
        sim.step(&InputState::default());
    }
    sim.switch_scenario("shopping_center").unwrap();
    assert_eq!(sim.scenario_name(), "Shopping Center");
    assert_eq!(sim.stats().steps, 0);
    assert_eq!(sim.pedestrians().len(), 12);

    assert!(sim.switch_scenario("nowhere").is_err());
    assert_eq!(sim.scenario().id, "shopping_center");
}

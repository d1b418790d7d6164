use crate::config::SimulationSettings;
use crate::control::{ControlMode, InputState};
use crate::episode::{EpisodeSummary, Simulation};
use crate::error::SimError;
use crate::scenario::ScenarioCatalog;
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use std::path::PathBuf;

impl From<SimError> for PyErr {
    fn from(err: SimError) -> PyErr {
        PyValueError::new_err(err.to_string())
    }
}

type SummaryTuple = (usize, f64, u64, f64, f64);

fn summary_tuple(s: &EpisodeSummary) -> SummaryTuple {
    (s.episode, s.penalty, s.steps, s.average_penalty, s.average_steps)
}

#[pyclass(name = "Simulation")]
struct PySimulation {
    inner: Simulation,
}

#[pymethods]
impl PySimulation {
    /// Unset arguments fall back to the `CROWD_SIM_*` environment.
    #[new]
    #[pyo3(signature = (scenario=None, pedestrians=None, seed=None, randomize_world=None, mode=None, scenario_dir=None))]
    fn new(
        scenario: Option<String>,
        pedestrians: Option<usize>,
        seed: Option<u64>,
        randomize_world: Option<bool>,
        mode: Option<&str>,
        scenario_dir: Option<PathBuf>,
    ) -> PyResult<Self> {
        let mut settings = SimulationSettings::from_env()?;
        if let Some(id) = scenario {
            settings.scenario_id = id;
        }
        if let Some(count) = pedestrians {
            settings.pedestrian_count = count;
        }
        if seed.is_some() {
            settings.seed = seed;
            settings.random_seed = false;
        }
        if let Some(flag) = randomize_world {
            settings.randomize_world = flag;
        }
        if let Some(name) = mode {
            settings.mode = name.parse()?;
        }
        if let Some(dir) = scenario_dir {
            settings.scenario_dir = dir;
        }

        let catalog = ScenarioCatalog::load(&settings.scenario_dir)?;
        Ok(PySimulation {
            inner: Simulation::new(catalog, settings)?,
        })
    }

    /// Advances one tick. Returns the frame penalty and, when an episode
    /// just finished, `(episode, penalty, steps, avg_penalty, avg_steps)`.
    fn step(&mut self, up: bool, down: bool, left: bool, right: bool) -> (f64, Option<SummaryTuple>) {
        let report = self.inner.step(&InputState::new(up, down, left, right));
        (report.frame_penalty, report.completed.as_ref().map(summary_tuple))
    }

    fn run_until(&mut self, max_ticks: u64, max_episodes: usize) -> Vec<SummaryTuple> {
        self.inner
            .run_until(max_ticks, max_episodes)
            .iter()
            .map(summary_tuple)
            .collect()
    }

    fn switch_scenario(&mut self, id: &str) -> PyResult<()> {
        Ok(self.inner.switch_scenario(id)?)
    }

    fn set_mode(&mut self, mode: &str) -> PyResult<()> {
        self.inner.set_mode(mode.parse::<ControlMode>()?);
        Ok(())
    }

    #[getter]
    fn mode(&self) -> &'static str {
        self.inner.mode().name()
    }

    #[getter]
    fn robot(&self) -> (f64, f64, f64) {
        let r = self.inner.robot();
        (r.position.x, r.position.y, r.radius)
    }

    #[getter]
    fn goal(&self) -> (f64, f64) {
        let g = self.inner.goal();
        (g.x, g.y)
    }

    /// `(x, y, vx, vy, radius)` per pedestrian.
    #[getter]
    fn pedestrians(&self) -> Vec<(f64, f64, f64, f64, f64)> {
        self.inner
            .pedestrians()
            .iter()
            .map(|p| (p.position.x, p.position.y, p.velocity.x, p.velocity.y, p.radius))
            .collect()
    }

    #[getter]
    fn obstacles(&self) -> Vec<(i32, i32, i32, i32)> {
        self.inner
            .obstacles()
            .iter()
            .map(|r| (r.x, r.y, r.width, r.height))
            .collect()
    }

    #[getter]
    fn world_size(&self) -> (f64, f64) {
        let b = self.inner.scenario().bounds;
        (b.width, b.height)
    }

    #[getter]
    fn penalty(&self) -> f64 {
        self.inner.stats().penalty
    }

    #[getter]
    fn steps(&self) -> u64 {
        self.inner.stats().steps
    }

    /// Number of finished episodes.
    #[getter]
    fn episode(&self) -> usize {
        self.inner.stats().completed_episodes()
    }

    #[getter]
    fn average_penalty(&self) -> Option<f64> {
        self.inner.stats().average_penalty()
    }

    #[getter]
    fn average_steps(&self) -> Option<f64> {
        self.inner.stats().average_steps()
    }

    #[getter]
    fn scenario_id(&self) -> String {
        self.inner.scenario().id.clone()
    }

    #[getter]
    fn scenario_name(&self) -> String {
        self.inner.scenario_name().to_string()
    }

    #[getter]
    fn scenario_ids(&self) -> Vec<String> {
        self.inner.catalog().ids()
    }

    #[getter]
    fn seed(&self) -> u64 {
        self.inner.seed()
    }
}

#[pyfunction]
#[pyo3(signature = (scenario_dir=None))]
fn available_scenarios(scenario_dir: Option<PathBuf>) -> PyResult<Vec<String>> {
    let dir = match scenario_dir {
        Some(dir) => dir,
        None => SimulationSettings::from_env()?.scenario_dir,
    };
    Ok(ScenarioCatalog::load(&dir)?.ids())
}

#[pyfunction]
fn control_modes() -> Vec<&'static str> {
    ControlMode::ALL.iter().map(|m| m.name()).collect()
}

#[pymodule]
fn crowdnav_core(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PySimulation>()?;

    m.add_function(wrap_pyfunction!(available_scenarios, m)?)?;
    m.add_function(wrap_pyfunction!(control_modes, m)?)?;

    Ok(())
}

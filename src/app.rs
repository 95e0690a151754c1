//! Headless runner: config loading, the tick loop, autosave and ancestry
//! export.

use anyhow::{Context, Result};
use biotorus_core::config::AppConfig;
use biotorus_core::world::Simulation;
use std::path::{Path, PathBuf};
use std::time::Instant;

#[derive(Debug, Clone, PartialEq)]
pub struct RunOptions {
    pub config: PathBuf,
    pub ticks: u64,
    pub seed: Option<u64>,
    pub load: Option<PathBuf>,
    pub save: Option<PathBuf>,
    /// Ticks between progress reports; 0 disables them.
    pub report_every: u64,
    pub ancestry_dot: Option<PathBuf>,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            config: PathBuf::from("config.toml"),
            ticks: 1000,
            seed: None,
            load: None,
            save: None,
            report_every: 100,
            ancestry_dot: None,
        }
    }
}

/// Outcome of [`App::run`].
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub ticks_run: u64,
    pub final_tick: u64,
    pub prey: usize,
    pub predators: usize,
    pub digest: String,
}

/// Reads `path` as TOML. A missing file yields the defaults.
pub fn load_config(path: &Path) -> Result<AppConfig> {
    if !path.exists() {
        tracing::info!(path = %path.display(), "No config file, using defaults");
        return Ok(AppConfig::default());
    }
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    AppConfig::from_toml(&content).with_context(|| format!("parsing config {}", path.display()))
}

pub struct App {
    pub sim: Simulation,
    options: RunOptions,
}

impl App {
    /// Resumes from `options.load` when given, otherwise starts a fresh world
    /// from the config file.
    pub fn new(options: RunOptions) -> Result<Self> {
        let sim = match &options.load {
            Some(path) => {
                let sim = biotorus_io::load_simulation(path)
                    .with_context(|| format!("loading {}", path.display()))?;
                if options.seed.is_some() {
                    tracing::warn!("--seed is ignored when resuming from a save file");
                }
                sim
            }
            None => {
                let mut config = load_config(&options.config)?;
                if let Some(seed) = options.seed {
                    config.world.seed = seed;
                }
                Simulation::new(config)?
            }
        };
        Ok(Self { sim, options })
    }

    pub fn options(&self) -> &RunOptions {
        &self.options
    }

    /// Runs the configured number of ticks, stopping early once both species
    /// are extinct, then writes the save file and ancestry graph if requested.
    pub fn run(&mut self) -> Result<RunSummary> {
        let started = Instant::now();
        let mut ticks_run = 0;

        while ticks_run < self.options.ticks {
            self.sim.tick();
            ticks_run += 1;

            let stats = self.sim.stats();
            if self.options.report_every > 0 && stats.tick % self.options.report_every == 0 {
                tracing::info!(
                    tick = stats.tick,
                    prey = stats.prey_count,
                    predators = stats.predator_count,
                    food = stats.food_count,
                    generation = stats.max_generation,
                    risk = stats.extinction_risk,
                    "Progress"
                );
            }
            if stats.population() == 0 {
                tracing::info!(tick = stats.tick, "Every organism is dead, stopping");
                break;
            }
        }

        let stats = self.sim.stats();
        tracing::info!(
            ticks = ticks_run,
            elapsed_ms = started.elapsed().as_millis() as u64,
            births = stats.total_births,
            deaths = stats.total_deaths,
            "Run finished"
        );

        if let Some(path) = &self.options.save {
            biotorus_io::save_simulation(path, &self.sim)
                .with_context(|| format!("saving {}", path.display()))?;
        }
        if let Some(path) = &self.options.ancestry_dot {
            std::fs::write(path, self.sim.genetic_tree().to_dot())
                .with_context(|| format!("writing {}", path.display()))?;
            tracing::info!(
                path = %path.display(),
                nodes = self.sim.genetic_tree().len(),
                "Ancestry graph written"
            );
        }

        Ok(RunSummary {
            ticks_run,
            final_tick: self.sim.tick_count(),
            prey: stats.prey_count,
            predators: stats.predator_count,
            digest: self.sim.state_digest(),
        })
    }
}

//! Run counters and structured logging for the simulation.
//!
//! The engine records into [`Metrics`] but never installs a subscriber; the
//! binary calls [`init_logging`] once at start-up.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Ticks between periodic summaries.
pub const SUMMARY_INTERVAL: u64 = 1000;

/// Counters kept across the lifetime of one simulation instance.
pub struct Metrics {
    tick_count: AtomicU64,
    population: AtomicU64,
    food_count: AtomicU64,
    births: AtomicU64,
    deaths: AtomicU64,
    velocity_resets: AtomicU64,
    busy_nanos: AtomicU64,
    start_time: Instant,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Metrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Metrics")
            .field("tick_count", &self.tick_count())
            .field("births", &self.births())
            .field("deaths", &self.deaths())
            .finish()
    }
}

impl Metrics {
    #[must_use]
    pub fn new() -> Self {
        Self {
            tick_count: AtomicU64::new(0),
            population: AtomicU64::new(0),
            food_count: AtomicU64::new(0),
            births: AtomicU64::new(0),
            deaths: AtomicU64::new(0),
            velocity_resets: AtomicU64::new(0),
            busy_nanos: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    /// Records a completed tick with its duration.
    pub fn record_tick(&self, tick: u64, duration: Duration, population: usize, food: usize) {
        let count = self.tick_count.fetch_add(1, Ordering::Relaxed) + 1;
        self.population.store(population as u64, Ordering::Relaxed);
        self.food_count.store(food as u64, Ordering::Relaxed);
        self.busy_nanos
            .fetch_add(duration.as_nanos() as u64, Ordering::Relaxed);

        if count % SUMMARY_INTERVAL == 0 {
            tracing::info!(
                tick = tick,
                population = population,
                food = food,
                births = self.births(),
                deaths = self.deaths(),
                avg_tick_us = self.average_tick().as_micros() as u64,
                "Simulation tick"
            );
        }
    }

    pub fn record_births(&self, n: usize) {
        self.births.fetch_add(n as u64, Ordering::Relaxed);
    }

    pub fn record_deaths(&self, n: usize) {
        self.deaths.fetch_add(n as u64, Ordering::Relaxed);
    }

    pub fn record_velocity_resets(&self, n: usize) {
        if n > 0 {
            self.velocity_resets.fetch_add(n as u64, Ordering::Relaxed);
        }
    }

    #[must_use]
    pub fn tick_count(&self) -> u64 {
        self.tick_count.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn population(&self) -> u64 {
        self.population.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn food_count(&self) -> u64 {
        self.food_count.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn births(&self) -> u64 {
        self.births.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn deaths(&self) -> u64 {
        self.deaths.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn velocity_resets(&self) -> u64 {
        self.velocity_resets.load(Ordering::Relaxed)
    }

    /// Mean wall-clock time spent inside `tick()`.
    #[must_use]
    pub fn average_tick(&self) -> Duration {
        let ticks = self.tick_count();
        if ticks == 0 {
            return Duration::ZERO;
        }
        Duration::from_nanos(self.busy_nanos.load(Ordering::Relaxed) / ticks)
    }

    /// Elapsed time since the collector was created.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }
}

/// Installs a global fmt subscriber filtered by `RUST_LOG` (default `info`).
/// A second call is a no-op.
pub fn init_logging() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing::subscriber::set_global_default(
        tracing_subscriber::FmtSubscriber::builder()
            .with_env_filter(filter)
            .with_target(false)
            .finish(),
    )
    .ok();
}

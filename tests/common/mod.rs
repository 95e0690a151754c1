pub mod macros;

use biotorus_core::config::AppConfig;
use biotorus_core::world::Simulation;
use biotorus_data::{OrganismKind, Vec3};

#[allow(dead_code)]
pub struct OrganismSpec {
    kind: OrganismKind,
    position: Vec3,
    velocity: Option<Vec3>,
    energy: Option<f64>,
    age: Option<u64>,
    sense_radius: Option<f64>,
}

#[allow(dead_code)]
impl OrganismSpec {
    pub fn prey() -> Self {
        Self::new(OrganismKind::Prey)
    }

    pub fn predator() -> Self {
        Self::new(OrganismKind::Predator)
    }

    fn new(kind: OrganismKind) -> Self {
        Self {
            kind,
            position: Vec3::splat(10.0),
            velocity: None,
            energy: None,
            age: None,
            sense_radius: None,
        }
    }

    pub fn at(mut self, x: f64, y: f64, z: f64) -> Self {
        self.position = Vec3::new(x, y, z);
        self
    }

    pub fn velocity(mut self, x: f64, y: f64, z: f64) -> Self {
        self.velocity = Some(Vec3::new(x, y, z));
        self
    }

    pub fn energy(mut self, amount: f64) -> Self {
        self.energy = Some(amount);
        self
    }

    pub fn age(mut self, ticks: u64) -> Self {
        self.age = Some(ticks);
        self
    }

    pub fn sense(mut self, radius: f64) -> Self {
        self.sense_radius = Some(radius);
        self
    }
}

/// Builds a world with no random population and no ambient food, then
/// places hand-picked entities in it.
#[allow(dead_code)]
pub struct SimulationBuilder {
    config: AppConfig,
    organisms: Vec<OrganismSpec>,
    food: Vec<Vec3>,
    obstacles: Vec<(Vec3, f64)>,
    populate: bool,
}

#[allow(dead_code)]
impl SimulationBuilder {
    pub fn new() -> Self {
        let mut config = AppConfig::default();
        config.world.initial_prey = 0;
        config.world.initial_predators = 0;
        config.world.initial_food = 0;
        config.world.obstacle_count = 0;
        config.world.zone_count = 0;
        config.food.spawn_rate = 0.0;
        Self {
            config,
            organisms: Vec::new(),
            food: Vec::new(),
            obstacles: Vec::new(),
            populate: false,
        }
    }

    /// Starts from the default config, initial population included.
    pub fn populated() -> Self {
        Self {
            config: AppConfig::default(),
            organisms: Vec::new(),
            food: Vec::new(),
            obstacles: Vec::new(),
            populate: true,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.config.world.seed = seed;
        self
    }

    pub fn with_world_size(mut self, size: f64, cell_size: f64) -> Self {
        self.config.world.size = size;
        self.config.world.cell_size = cell_size;
        self
    }

    pub fn with_config<F>(mut self, modifier: F) -> Self
    where
        F: FnOnce(&mut AppConfig),
    {
        modifier(&mut self.config);
        self
    }

    pub fn with_organism(mut self, spec: OrganismSpec) -> Self {
        self.organisms.push(spec);
        self
    }

    pub fn with_food(mut self, x: f64, y: f64, z: f64) -> Self {
        self.food.push(Vec3::new(x, y, z));
        self
    }

    pub fn with_obstacle(mut self, x: f64, y: f64, z: f64, radius: f64) -> Self {
        self.obstacles.push((Vec3::new(x, y, z), radius));
        self
    }

    /// Returns the simulation together with the ids of the organisms added
    /// through the builder, in insertion order.
    pub fn build_with_ids(self) -> (Simulation, Vec<u64>) {
        let mut sim = if self.populate {
            Simulation::new(self.config)
        } else {
            Simulation::empty(self.config)
        }
        .expect("Failed to create simulation in test builder");

        for (position, radius) in self.obstacles {
            sim.add_obstacle(position, radius);
        }
        for position in self.food {
            sim.spawn_food(position);
        }
        let mut ids = Vec::new();
        for spec in self.organisms {
            let id = sim.spawn_organism(spec.kind, spec.position);
            let o = sim.organism_mut(id).expect("organism just spawned");
            if let Some(v) = spec.velocity {
                o.velocity = v;
            }
            if let Some(e) = spec.energy {
                o.energy = e;
            }
            if let Some(a) = spec.age {
                o.age = a;
            }
            if let Some(r) = spec.sense_radius {
                o.genome.traits.sense_radius = r;
            }
            ids.push(id);
        }
        (sim, ids)
    }

    pub fn build(self) -> Simulation {
        self.build_with_ids().0
    }
}

use biotorus_data::{Organism, OrganismKind, SimulationStats};

/// Predator:prey ratio the risk score treats as balanced.
const BALANCED_RATIO: f64 = 0.2;
/// Fraction of the population cap below which scarcity starts counting.
const SCARCITY_FRACTION: f64 = 0.2;

pub struct StatsContext<'a> {
    pub stats: &'a mut SimulationStats,
    pub organisms: &'a [Organism],
    pub food_count: usize,
    pub obstacle_count: usize,
    pub max_population: usize,
    pub tick: u64,
}

#[derive(Default)]
struct SpeciesTally {
    count: usize,
    energy: f64,
    speed: f64,
    sense: f64,
    size: f64,
}

impl SpeciesTally {
    fn add(&mut self, o: &Organism) {
        self.count += 1;
        self.energy += o.energy;
        self.speed += o.genome.traits.max_speed;
        self.sense += o.genome.traits.sense_radius;
        self.size += o.genome.traits.size;
    }

    fn mean(&self, total: f64) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            total / self.count as f64
        }
    }
}

/// Refreshes the per-tick aggregates over live organisms. Running totals
/// (births, deaths by cause) are left untouched.
pub fn update_population_stats(ctx: StatsContext) {
    let mut prey = SpeciesTally::default();
    let mut predators = SpeciesTally::default();
    let mut max_age = 0;
    let mut max_generation = 0;

    for o in ctx.organisms.iter().filter(|o| o.is_alive()) {
        match o.kind() {
            OrganismKind::Prey => prey.add(o),
            OrganismKind::Predator => predators.add(o),
        }
        max_age = max_age.max(o.age);
        max_generation = max_generation.max(o.genome.generation);
    }

    let s = ctx.stats;
    s.tick = ctx.tick;
    s.prey_count = prey.count;
    s.predator_count = predators.count;
    s.food_count = ctx.food_count;
    s.obstacle_count = ctx.obstacle_count;
    s.avg_prey_energy = prey.mean(prey.energy);
    s.avg_predator_energy = predators.mean(predators.energy);
    s.max_age = max_age;
    s.max_generation = max_generation;
    s.avg_prey_speed = prey.mean(prey.speed);
    s.avg_prey_sense = prey.mean(prey.sense);
    s.avg_prey_size = prey.mean(prey.size);
    s.avg_predator_speed = predators.mean(predators.speed);
    s.avg_predator_sense = predators.mean(predators.sense);
    s.avg_predator_size = predators.mean(predators.size);
    s.extinction_risk = extinction_risk(prey.count, predators.count, ctx.max_population);
}

/// Scalar in [0, 1]: 1 when either species is gone, otherwise the mean of
/// ratio imbalance (log distance from the balanced ratio) and scarcity.
pub fn extinction_risk(prey: usize, predators: usize, max_population: usize) -> f64 {
    if prey == 0 || predators == 0 {
        return 1.0;
    }
    let ratio = predators as f64 / prey as f64;
    let imbalance = ((ratio / BALANCED_RATIO).log10().abs() / 2.0).clamp(0.0, 1.0);
    let healthy = SCARCITY_FRACTION * max_population.max(1) as f64;
    let scarcity = (1.0 - (prey + predators) as f64 / healthy).clamp(0.0, 1.0);
    0.5 * imbalance + 0.5 * scarcity
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EvolutionConfig;
    use crate::lifecycle::OrganismFactory;
    use crate::rng::SimRng;
    use biotorus_data::{DeathCause, Vec3};

    #[test]
    fn test_extinction_risk_bounds() {
        assert_eq!(extinction_risk(0, 5, 600), 1.0);
        assert_eq!(extinction_risk(5, 0, 600), 1.0);
        // balanced ratio and plenty of organisms
        assert!(extinction_risk(100, 20, 600).abs() < 1e-12);
        let skewed = extinction_risk(100, 100, 600);
        assert!(skewed > 0.0 && skewed <= 0.5);
        let scarce = extinction_risk(5, 1, 600);
        assert!(scarce > 0.4 && scarce <= 1.0);
    }

    #[test]
    fn test_stats_skip_dead_and_keep_totals() {
        let mut factory = OrganismFactory::new();
        let mut rng = SimRng::new(1);
        let evolution = EvolutionConfig::default();
        let mut organisms = vec![
            factory.create_prey(Vec3::ZERO, &evolution, &mut rng, 0),
            factory.create_prey(Vec3::ZERO, &evolution, &mut rng, 0),
            factory.create_predator(Vec3::ZERO, &evolution, &mut rng, 0),
        ];
        organisms[0].energy = 40.0;
        organisms[0].age = 12;
        organisms[1].die(DeathCause::Predation);

        let mut stats = SimulationStats {
            total_births: 9,
            ..Default::default()
        };
        update_population_stats(StatsContext {
            stats: &mut stats,
            organisms: &organisms,
            food_count: 3,
            obstacle_count: 2,
            max_population: 600,
            tick: 77,
        });

        assert_eq!(stats.tick, 77);
        assert_eq!(stats.prey_count, 1);
        assert_eq!(stats.predator_count, 1);
        assert_eq!(stats.avg_prey_energy, 40.0);
        assert_eq!(stats.max_age, 12);
        assert_eq!(stats.max_generation, 1);
        assert_eq!(stats.total_births, 9);
        assert_eq!(stats.avg_prey_speed, organisms[0].genome.traits.max_speed);
        assert!(stats.extinction_risk > 0.0);
    }
}

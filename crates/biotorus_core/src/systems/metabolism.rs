//! Energy drain, aging, starvation and old-age death.

use crate::config::MetabolismConfig;
use biotorus_data::{DeathCause, Organism, OrganismKind, MAX_ENERGY};

#[derive(Debug, Default)]
pub struct MetabolismSystem;

impl MetabolismSystem {
    pub fn new() -> Self {
        Self
    }

    /// Drains and ages every live organism. Returns how many died.
    pub fn update(&mut self, organisms: &mut [Organism], config: &MetabolismConfig) -> usize {
        let mut died = 0;
        for o in organisms.iter_mut().filter(|o| o.is_alive()) {
            o.energy -= energy_cost(o, config);
            o.age += 1;

            if o.energy <= 0.0 {
                o.energy = 0.0;
                if o.die(DeathCause::Starvation) {
                    died += 1;
                }
            } else if o.age > max_age(o.kind(), config) && o.die(DeathCause::OldAge) {
                died += 1;
            }
        }
        died
    }
}

/// Energy spent by `o` this tick at its current speed.
pub fn energy_cost(o: &Organism, config: &MetabolismConfig) -> f64 {
    let t = &o.genome.traits;
    let exist = config.exist_cost * o.radius;
    let movement = config.move_cost * o.velocity.length_squared();
    let sensing = config.sense_cost * t.sense_radius;
    let size = config.size_cost * t.size;
    t.metabolism * (exist + movement + sensing + size)
}

pub fn max_age(kind: OrganismKind, config: &MetabolismConfig) -> u64 {
    match kind {
        OrganismKind::Prey => config.prey_max_age,
        OrganismKind::Predator => config.predator_max_age,
    }
}

#[inline]
pub fn is_hungry(o: &Organism, config: &MetabolismConfig) -> bool {
    o.energy / MAX_ENERGY < config.hungry_threshold
}

#[inline]
pub fn is_critical(o: &Organism, config: &MetabolismConfig) -> bool {
    o.energy / MAX_ENERGY < config.critical_threshold
}

/// Past `old_age_ratio` of `max_age`.
#[inline]
pub fn is_old(o: &Organism, max_age: u64, config: &MetabolismConfig) -> bool {
    o.age as f64 > max_age as f64 * config.old_age_ratio
}

/// Ticks until starvation at the current cost rate; infinite when the
/// organism spends nothing.
pub fn estimate_survival_time(o: &Organism, config: &MetabolismConfig) -> f64 {
    let cost = energy_cost(o, config);
    if cost <= 0.0 {
        f64::INFINITY
    } else {
        o.energy / cost
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EvolutionConfig;
    use crate::lifecycle::OrganismFactory;
    use crate::rng::SimRng;
    use biotorus_data::Vec3;

    fn prey() -> Organism {
        let mut rng = SimRng::new(8);
        let evolution = EvolutionConfig::default();
        OrganismFactory::new().create_prey(Vec3::ZERO, &evolution, &mut rng, 0)
    }

    #[test]
    fn test_cost_components() {
        let mut o = prey();
        o.radius = 1.0;
        o.velocity = Vec3::new(2.0, 0.0, 0.0);
        o.genome.traits.metabolism = 2.0;
        o.genome.traits.sense_radius = 20.0;
        o.genome.traits.size = 1.0;
        let cost = energy_cost(&o, &MetabolismConfig::default());
        let expected = 2.0 * (0.02 + 0.01 * 4.0 + 0.001 * 20.0 + 0.01);
        assert!((cost - expected).abs() < 1e-12);
    }

    #[test]
    fn test_starvation_and_age() {
        let mut o = prey();
        o.energy = 0.01;
        let mut organisms = vec![o];
        let config = MetabolismConfig::default();
        let died = MetabolismSystem::new().update(&mut organisms, &config);
        assert_eq!(died, 1);
        assert_eq!(organisms[0].energy, 0.0);
        assert_eq!(organisms[0].age, 1);
        assert_eq!(organisms[0].cause_of_death, Some(DeathCause::Starvation));
    }

    #[test]
    fn test_old_age_death() {
        let config = MetabolismConfig {
            prey_max_age: 10,
            ..Default::default()
        };
        let mut o = prey();
        o.age = 10;
        let mut organisms = vec![o];
        MetabolismSystem::new().update(&mut organisms, &config);
        assert_eq!(organisms[0].cause_of_death, Some(DeathCause::OldAge));
    }

    #[test]
    fn test_dead_organisms_do_not_age() {
        let mut o = prey();
        o.die(DeathCause::Predation);
        let mut organisms = vec![o];
        MetabolismSystem::new().update(&mut organisms, &MetabolismConfig::default());
        assert_eq!(organisms[0].age, 0);
    }

    #[test]
    fn test_hunger_predicates() {
        let config = MetabolismConfig::default();
        let mut o = prey();
        o.energy = 90.0;
        assert!(is_hungry(&o, &config));
        assert!(!is_critical(&o, &config));
        o.energy = 30.0;
        assert!(is_critical(&o, &config));
        o.age = 3201;
        assert!(is_old(&o, 4000, &config));
        o.age = 3200;
        assert!(!is_old(&o, 4000, &config));
    }

    #[test]
    fn test_survival_time() {
        let mut config = MetabolismConfig::default();
        let o = prey();
        let t = estimate_survival_time(&o, &config);
        assert!((t * energy_cost(&o, &config) - o.energy).abs() < 1e-9);

        config.exist_cost = 0.0;
        config.move_cost = 0.0;
        config.sense_cost = 0.0;
        config.size_cost = 0.0;
        assert!(estimate_survival_time(&o, &config).is_infinite());
    }
}

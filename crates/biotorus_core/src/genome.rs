//! Genome creation and mutation.
//!
//! Founders draw each trait as `base × (1 ± jitter)`. Offspring scale every
//! shared trait by `1 − f/2 + U(0,1)·f` (f = mutation factor × per-trait
//! scale). Every result is clamped to the species bounds, so the bounds hold
//! for the whole life of a genome.

use crate::rng::SimRng;
use biotorus_data::{Color, Genome, OrganismKind, PredatorSubtype, SpeciesTraits, Traits};
use serde::{Deserialize, Serialize};

/// `(base, min, max)` for one trait.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TraitRange {
    pub base: f64,
    pub min: f64,
    pub max: f64,
}

impl TraitRange {
    const fn new(base: f64, min: f64, max: f64) -> Self {
        Self { base, min, max }
    }

    #[inline]
    pub fn clamp(&self, v: f64) -> f64 {
        v.clamp(self.min, self.max)
    }

    #[inline]
    pub fn contains(&self, v: f64) -> bool {
        v >= self.min && v <= self.max
    }
}

/// Declared bounds for one species.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpeciesBounds {
    pub max_speed: TraitRange,
    pub sense_radius: TraitRange,
    pub metabolism: TraitRange,
    pub size: TraitRange,
    pub asymmetry: TraitRange,
    pub spikiness: TraitRange,
    pub glow_intensity: TraitRange,
    /// Prey: flocking strength. Predator: attack power.
    pub special_a: TraitRange,
    /// Predator: pack affinity. Unused for prey.
    pub special_b: TraitRange,
    /// Absolute speed ceiling enforced by physics.
    pub speed_cap: f64,
}

pub const PREY_BOUNDS: SpeciesBounds = SpeciesBounds {
    max_speed: TraitRange::new(2.0, 0.8, 4.0),
    sense_radius: TraitRange::new(25.0, 10.0, 50.0),
    metabolism: TraitRange::new(1.0, 0.5, 2.0),
    size: TraitRange::new(1.0, 0.5, 2.0),
    asymmetry: TraitRange::new(0.1, 0.0, 1.0),
    spikiness: TraitRange::new(0.1, 0.0, 1.0),
    glow_intensity: TraitRange::new(0.3, 0.0, 1.0),
    special_a: TraitRange::new(0.5, 0.0, 1.0),
    special_b: TraitRange::new(0.0, 0.0, 0.0),
    speed_cap: 4.0,
};

pub const PREDATOR_BOUNDS: SpeciesBounds = SpeciesBounds {
    max_speed: TraitRange::new(2.5, 1.0, 5.0),
    sense_radius: TraitRange::new(35.0, 15.0, 70.0),
    metabolism: TraitRange::new(1.2, 0.5, 2.5),
    size: TraitRange::new(1.5, 0.8, 3.0),
    asymmetry: TraitRange::new(0.3, 0.0, 1.0),
    spikiness: TraitRange::new(0.6, 0.0, 1.0),
    glow_intensity: TraitRange::new(0.5, 0.0, 1.0),
    special_a: TraitRange::new(1.0, 0.5, 2.0),
    special_b: TraitRange::new(0.5, 0.0, 1.0),
    speed_cap: 5.0,
};

pub fn bounds_for(kind: OrganismKind) -> &'static SpeciesBounds {
    match kind {
        OrganismKind::Prey => &PREY_BOUNDS,
        OrganismKind::Predator => &PREDATOR_BOUNDS,
    }
}

/// Multipliers applied on top of a predator's traits.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SubtypeProfile {
    pub speed: f64,
    pub sense: f64,
    pub attack: f64,
    pub color: Color,
}

pub fn subtype_profile(subtype: PredatorSubtype) -> SubtypeProfile {
    match subtype {
        PredatorSubtype::Hunter => SubtypeProfile {
            speed: 1.2,
            sense: 1.0,
            attack: 1.0,
            color: Color::new(220, 40, 40),
        },
        PredatorSubtype::Ambusher => SubtypeProfile {
            speed: 0.8,
            sense: 1.3,
            attack: 1.4,
            color: Color::new(140, 50, 200),
        },
        PredatorSubtype::Pack => SubtypeProfile {
            speed: 1.0,
            sense: 1.1,
            attack: 0.8,
            color: Color::new(240, 140, 30),
        },
    }
}

const PREY_COLOR: Color = Color::new(60, 200, 90);
const PREY_COLOR_DRIFT: i64 = 8;

// Per-trait mutation scale.
const SIZE_MUTATION_SCALE: f64 = 0.5;
const COSMETIC_MUTATION_SCALE: f64 = 1.5;

/// Issues genomes with strictly increasing ids.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenomeFactory {
    next_id: u64,
}

impl Default for GenomeFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl GenomeFactory {
    pub fn new() -> Self {
        Self { next_id: 1 }
    }

    /// The id the next genome will receive.
    pub fn next_id(&self) -> u64 {
        self.next_id
    }

    /// Restores the counter (save/load) without scanning existing genomes.
    pub fn set_next_id(&mut self, next_id: u64) {
        self.next_id = next_id;
    }

    pub fn reset(&mut self) {
        self.next_id = 1;
    }

    fn issue_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn create_prey_genome(
        &mut self,
        parent: Option<&Genome>,
        mutation_factor: f64,
        founder_jitter: f64,
        rng: &mut SimRng,
    ) -> Genome {
        let b = &PREY_BOUNDS;
        let (traits, flocking_strength, color) = match parent {
            Some(p) if p.kind() == OrganismKind::Prey => {
                let flocking = match p.species {
                    SpeciesTraits::Prey { flocking_strength } => flocking_strength,
                    SpeciesTraits::Predator { .. } => b.special_a.base,
                };
                (
                    mutate_traits(&p.traits, b, mutation_factor, rng),
                    mutate(flocking, &b.special_a, mutation_factor, rng),
                    drift_color(p.color, rng),
                )
            }
            _ => (
                founder_traits(b, founder_jitter, rng),
                jitter(&b.special_a, founder_jitter, rng),
                PREY_COLOR,
            ),
        };

        Genome {
            id: self.issue_id(),
            parent_id: parent.map(|p| p.id),
            generation: parent.map_or(1, |p| p.generation + 1),
            color,
            traits,
            species: SpeciesTraits::Prey { flocking_strength },
        }
    }

    pub fn create_predator_genome(
        &mut self,
        parent: Option<&Genome>,
        mutation_factor: f64,
        founder_jitter: f64,
        subtype_inheritance: f64,
        rng: &mut SimRng,
    ) -> Genome {
        let b = &PREDATOR_BOUNDS;
        let (mut traits, mut attack_power, pack_affinity, subtype) = match parent {
            Some(p) if p.kind() == OrganismKind::Predator => {
                let (parent_subtype, attack, pack) = match p.species {
                    SpeciesTraits::Predator {
                        subtype,
                        attack_power,
                        pack_affinity,
                    } => (subtype, attack_power, pack_affinity),
                    SpeciesTraits::Prey { .. } => (
                        PredatorSubtype::Hunter,
                        b.special_a.base,
                        b.special_b.base,
                    ),
                };
                let subtype = if rng.chance(subtype_inheritance) {
                    parent_subtype
                } else {
                    *rng.choose(&PredatorSubtype::ALL)
                };
                (
                    mutate_traits(&p.traits, b, mutation_factor, rng),
                    mutate(attack, &b.special_a, mutation_factor, rng),
                    mutate(pack, &b.special_b, mutation_factor, rng),
                    subtype,
                )
            }
            _ => (
                founder_traits(b, founder_jitter, rng),
                jitter(&b.special_a, founder_jitter, rng),
                jitter(&b.special_b, founder_jitter, rng),
                *rng.choose(&PredatorSubtype::ALL),
            ),
        };

        let profile = subtype_profile(subtype);
        traits.max_speed = b.max_speed.clamp(traits.max_speed * profile.speed);
        traits.sense_radius = b.sense_radius.clamp(traits.sense_radius * profile.sense);
        attack_power = b.special_a.clamp(attack_power * profile.attack);

        Genome {
            id: self.issue_id(),
            parent_id: parent.map(|p| p.id),
            generation: parent.map_or(1, |p| p.generation + 1),
            color: profile.color,
            traits,
            species: SpeciesTraits::Predator {
                subtype,
                attack_power,
                pack_affinity,
            },
        }
    }

    /// Offspring genome of the parent's species.
    pub fn create_from_parent(
        &mut self,
        parent: &Genome,
        mutation_factor: f64,
        subtype_inheritance: f64,
        rng: &mut SimRng,
    ) -> Genome {
        match parent.kind() {
            OrganismKind::Prey => self.create_prey_genome(Some(parent), mutation_factor, 0.0, rng),
            OrganismKind::Predator => self.create_predator_genome(
                Some(parent),
                mutation_factor,
                0.0,
                subtype_inheritance,
                rng,
            ),
        }
    }
}

#[inline]
fn jitter(range: &TraitRange, amount: f64, rng: &mut SimRng) -> f64 {
    range.clamp(range.base * (1.0 + rng.range(-amount, amount)))
}

#[inline]
fn mutate(value: f64, range: &TraitRange, factor: f64, rng: &mut SimRng) -> f64 {
    range.clamp(value * (1.0 - factor / 2.0 + rng.next_f64() * factor))
}

fn founder_traits(b: &SpeciesBounds, amount: f64, rng: &mut SimRng) -> Traits {
    Traits {
        max_speed: jitter(&b.max_speed, amount, rng),
        sense_radius: jitter(&b.sense_radius, amount, rng),
        metabolism: jitter(&b.metabolism, amount, rng),
        size: jitter(&b.size, amount, rng),
        asymmetry: jitter(&b.asymmetry, amount, rng),
        spikiness: jitter(&b.spikiness, amount, rng),
        glow_intensity: jitter(&b.glow_intensity, amount, rng),
    }
}

fn mutate_traits(t: &Traits, b: &SpeciesBounds, f: f64, rng: &mut SimRng) -> Traits {
    let cosmetic = f * COSMETIC_MUTATION_SCALE;
    Traits {
        max_speed: mutate(t.max_speed, &b.max_speed, f, rng),
        sense_radius: mutate(t.sense_radius, &b.sense_radius, f, rng),
        metabolism: mutate(t.metabolism, &b.metabolism, f, rng),
        size: mutate(t.size, &b.size, f * SIZE_MUTATION_SCALE, rng),
        asymmetry: mutate(t.asymmetry, &b.asymmetry, cosmetic, rng),
        spikiness: mutate(t.spikiness, &b.spikiness, cosmetic, rng),
        glow_intensity: mutate(t.glow_intensity, &b.glow_intensity, cosmetic, rng),
    }
}

fn drift_color(c: Color, rng: &mut SimRng) -> Color {
    let mut channel = |v: u8| -> u8 {
        (i64::from(v) + rng.range_int(-PREY_COLOR_DRIFT, PREY_COLOR_DRIFT)).clamp(0, 255) as u8
    };
    Color::new(channel(c.r), channel(c.g), channel(c.b))
}

/// Whether every trait of `genome` lies within its species bounds.
pub fn within_bounds(genome: &Genome) -> bool {
    let b = bounds_for(genome.kind());
    let t = &genome.traits;
    let shared = b.max_speed.contains(t.max_speed)
        && b.sense_radius.contains(t.sense_radius)
        && b.metabolism.contains(t.metabolism)
        && b.size.contains(t.size)
        && b.asymmetry.contains(t.asymmetry)
        && b.spikiness.contains(t.spikiness)
        && b.glow_intensity.contains(t.glow_intensity);
    let special = match genome.species {
        SpeciesTraits::Prey { flocking_strength } => b.special_a.contains(flocking_strength),
        SpeciesTraits::Predator {
            attack_power,
            pack_affinity,
            ..
        } => b.special_a.contains(attack_power) && b.special_b.contains(pack_affinity),
    };
    shared && special
}

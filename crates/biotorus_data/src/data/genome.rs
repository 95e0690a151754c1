use serde::{Deserialize, Serialize};
use std::fmt;

/// The two organism species.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum OrganismKind {
    Prey,
    Predator,
}

impl fmt::Display for OrganismKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrganismKind::Prey => write!(f, "prey"),
            OrganismKind::Predator => write!(f, "predator"),
        }
    }
}

/// Hunting strategy of a predator lineage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PredatorSubtype {
    /// Fast pursuer.
    Hunter,
    /// Slow, wide-sensing, hard-hitting.
    Ambusher,
    /// Average speed, weaker bite.
    Pack,
}

impl PredatorSubtype {
    pub const ALL: [PredatorSubtype; 3] = [
        PredatorSubtype::Hunter,
        PredatorSubtype::Ambusher,
        PredatorSubtype::Pack,
    ];
}

/// RGB color carried by a genome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Packs the color as `0xRRGGBB`.
    pub fn to_hex(self) -> u32 {
        (u32::from(self.r) << 16) | (u32::from(self.g) << 8) | u32::from(self.b)
    }
}

/// Continuous traits shared by both species.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Traits {
    pub max_speed: f64,
    pub sense_radius: f64,
    pub metabolism: f64,
    pub size: f64,
    pub asymmetry: f64,
    pub spikiness: f64,
    pub glow_intensity: f64,
}

/// Traits that only exist for one species.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SpeciesTraits {
    Prey {
        flocking_strength: f64,
    },
    Predator {
        subtype: PredatorSubtype,
        attack_power: f64,
        pack_affinity: f64,
    },
}

/// Heritable trait record. Never mutated after creation; offspring receive
/// a freshly built genome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Genome {
    pub id: u64,
    pub parent_id: Option<u64>,
    pub generation: u32,
    pub color: Color,
    pub traits: Traits,
    pub species: SpeciesTraits,
}

impl Genome {
    pub fn kind(&self) -> OrganismKind {
        match self.species {
            SpeciesTraits::Prey { .. } => OrganismKind::Prey,
            SpeciesTraits::Predator { .. } => OrganismKind::Predator,
        }
    }

    pub fn subtype(&self) -> Option<PredatorSubtype> {
        match self.species {
            SpeciesTraits::Predator { subtype, .. } => Some(subtype),
            SpeciesTraits::Prey { .. } => None,
        }
    }
}

use super::vector::Vec3;
use serde::{Deserialize, Serialize};

/// Kind of ecological zone. Each kind has a preset pair of multipliers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ZoneType {
    /// Plentiful food, slightly safer.
    Oasis,
    /// Sparse food, slightly dangerous.
    Desert,
    /// Prime predator territory.
    HuntingGround,
    /// Refuge for prey.
    Sanctuary,
}

impl ZoneType {
    pub const ALL: [ZoneType; 4] = [
        ZoneType::Oasis,
        ZoneType::Desert,
        ZoneType::HuntingGround,
        ZoneType::Sanctuary,
    ];

    /// `(food_multiplier, danger_multiplier)`
    pub fn multipliers(self) -> (f64, f64) {
        match self {
            ZoneType::Oasis => (2.0, 0.8),
            ZoneType::Desert => (0.4, 1.2),
            ZoneType::HuntingGround => (1.0, 2.0),
            ZoneType::Sanctuary => (1.2, 0.3),
        }
    }
}

/// Static spherical region modifying steering inside it. Zones may overlap;
/// their multipliers compound.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EcologicalZone {
    pub id: u32,
    pub zone_type: ZoneType,
    pub center: Vec3,
    pub radius: f64,
    pub food_multiplier: f64,
    pub danger_multiplier: f64,
}

impl EcologicalZone {
    pub fn new(id: u32, zone_type: ZoneType, center: Vec3, radius: f64) -> Self {
        let (food_multiplier, danger_multiplier) = zone_type.multipliers();
        Self {
            id,
            zone_type,
            center,
            radius,
            food_multiplier,
            danger_multiplier,
        }
    }
}

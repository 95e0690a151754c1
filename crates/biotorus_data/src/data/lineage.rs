use super::genome::OrganismKind;
use serde::{Deserialize, Serialize};

/// Trait values captured when a genome is born.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TraitSnapshot {
    pub speed: f64,
    pub sense: f64,
    pub size: f64,
}

/// One node of the phylogenetic forest. `id` is the genome id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneticTreeNode {
    pub id: u64,
    pub parent_id: Option<u64>,
    /// Ids of genomes whose `parent_id` is this node, in birth order.
    pub children: Vec<u64>,
    pub generation: u32,
    pub born: u64,
    /// Set exactly once, when the carrier dies.
    pub died: Option<u64>,
    pub kind: OrganismKind,
    pub traits: TraitSnapshot,
}

impl GeneticTreeNode {
    pub fn is_alive(&self) -> bool {
        self.died.is_none()
    }
}

//! Phylogenetic forest of every genome ever created.

use biotorus_data::{GeneticTreeNode, Genome, OrganismKind, TraitSnapshot};
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};

/// One node per genome, keyed by genome id. Nodes are never removed, so a
/// dead lineage stays queryable.
#[derive(Debug, Clone, Default)]
pub struct GeneticTree {
    nodes: BTreeMap<u64, GeneticTreeNode>,
    roots: Vec<u64>,
}

impl GeneticTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds a tree from saved nodes and root ids.
    pub fn restore(nodes: Vec<GeneticTreeNode>, roots: Vec<u64>) -> Self {
        Self {
            nodes: nodes.into_iter().map(|n| (n.id, n)).collect(),
            roots,
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: u64) -> Option<&GeneticTreeNode> {
        self.nodes.get(&id)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &GeneticTreeNode> {
        self.nodes.values()
    }

    pub fn roots(&self) -> &[u64] {
        &self.roots
    }

    /// Adds a node for `genome`. It hangs under its parent's node when that
    /// node is known, otherwise it starts a new root. Registering the same
    /// genome twice is a no-op.
    pub fn register(&mut self, genome: &Genome, tick: u64) {
        if self.nodes.contains_key(&genome.id) {
            return;
        }
        let attached = match genome.parent_id.and_then(|p| self.nodes.get_mut(&p)) {
            Some(parent) => {
                parent.children.push(genome.id);
                true
            }
            None => false,
        };
        if !attached {
            self.roots.push(genome.id);
        }
        self.nodes.insert(
            genome.id,
            GeneticTreeNode {
                id: genome.id,
                parent_id: genome.parent_id,
                children: Vec::new(),
                generation: genome.generation,
                born: tick,
                died: None,
                kind: genome.kind(),
                traits: TraitSnapshot {
                    speed: genome.traits.max_speed,
                    sense: genome.traits.sense_radius,
                    size: genome.traits.size,
                },
            },
        );
    }

    /// Stamps the death tick. Returns `false` if the node is unknown or
    /// already dead.
    pub fn mark_died(&mut self, genome_id: u64, tick: u64) -> bool {
        match self.nodes.get_mut(&genome_id) {
            Some(node) if node.died.is_none() => {
                node.died = Some(tick);
                true
            }
            _ => false,
        }
    }

    /// Every descendant of `id` in breadth-first order, excluding `id`.
    pub fn get_descendants(&self, id: u64) -> Vec<u64> {
        let mut out = Vec::new();
        let mut queue: VecDeque<u64> = self
            .nodes
            .get(&id)
            .map(|n| n.children.iter().copied().collect())
            .unwrap_or_default();
        while let Some(next) = queue.pop_front() {
            out.push(next);
            if let Some(node) = self.nodes.get(&next) {
                queue.extend(node.children.iter().copied());
            }
        }
        out
    }

    /// Parent chain of `id`, nearest ancestor first.
    pub fn get_ancestors(&self, id: u64) -> Vec<u64> {
        let mut out = Vec::new();
        let mut current = self.nodes.get(&id).and_then(|n| n.parent_id);
        while let Some(parent) = current {
            let Some(node) = self.nodes.get(&parent) else {
                break;
            };
            out.push(parent);
            current = node.parent_id;
        }
        out
    }

    /// Living nodes per organism kind.
    pub fn living(&self, kind: OrganismKind) -> usize {
        self.nodes
            .values()
            .filter(|n| n.kind == kind && n.is_alive())
            .count()
    }

    /// Checks the forest invariants: each child list matches the parent ids
    /// exactly, every non-root has one parent, generations grow along edges.
    pub fn validate(&self) -> anyhow::Result<()> {
        let mut seen_as_child: HashSet<u64> = HashSet::new();
        for node in self.nodes.values() {
            for &child_id in &node.children {
                let child = self.nodes.get(&child_id).ok_or_else(|| {
                    anyhow::anyhow!("Node {} lists unknown child {child_id}", node.id)
                })?;
                anyhow::ensure!(
                    child.parent_id == Some(node.id),
                    "Child {child_id} does not point back to {}",
                    node.id
                );
                anyhow::ensure!(
                    child.generation > node.generation,
                    "Generation does not increase from {} to {child_id}",
                    node.id
                );
                anyhow::ensure!(
                    seen_as_child.insert(child_id),
                    "Node {child_id} has more than one parent"
                );
            }
        }
        let roots: HashSet<u64> = self.roots.iter().copied().collect();
        for node in self.nodes.values() {
            anyhow::ensure!(
                roots.contains(&node.id) != seen_as_child.contains(&node.id),
                "Node {} must be either a root or a child, exactly once",
                node.id
            );
        }
        Ok(())
    }

    /// Ancestry as a petgraph digraph, edges pointing parent → child.
    pub fn to_graph(&self) -> DiGraph<GeneticTreeNode, ()> {
        let mut graph = DiGraph::with_capacity(self.nodes.len(), self.nodes.len());
        let mut index: HashMap<u64, NodeIndex> = HashMap::with_capacity(self.nodes.len());
        for node in self.nodes.values() {
            index.insert(node.id, graph.add_node(node.clone()));
        }
        for node in self.nodes.values() {
            for child in &node.children {
                if let (Some(&from), Some(&to)) = (index.get(&node.id), index.get(child)) {
                    graph.add_edge(from, to, ());
                }
            }
        }
        graph
    }

    /// Graphviz DOT export.
    pub fn to_dot(&self) -> String {
        let graph = self.to_graph();
        let mut dot = String::from("digraph Ancestry {\n");
        dot.push_str("  node [shape=box, style=filled, fontname=\"Arial\"];\n");

        for idx in graph.node_indices() {
            let node = &graph[idx];
            let fill = if node.is_alive() { "#e1f5fe" } else { "#eeeeee" };
            let border = match node.kind {
                OrganismKind::Prey => "green",
                OrganismKind::Predator => "red",
            };
            dot.push_str(&format!(
                "  \"{}\" [label=\"{} #{} (Gen {})\\nspeed {:.2} sense {:.1}\", fillcolor=\"{}\", color=\"{}\", penwidth=2];\n",
                node.id,
                node.kind,
                node.id,
                node.generation,
                node.traits.speed,
                node.traits.sense,
                fill,
                border
            ));
        }

        for edge in graph.edge_indices() {
            if let Some((from, to)) = graph.edge_endpoints(edge) {
                dot.push_str(&format!("  \"{}\" -> \"{}\";\n", graph[from].id, graph[to].id));
            }
        }

        dot.push_str("}\n");
        dot
    }
}

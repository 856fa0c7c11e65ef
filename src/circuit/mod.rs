//! Circuit description: nodes, resistive branches, voltage sources and KVL loops.

use std::{collections::HashSet, fs, path::Path};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use thiserror::Error;

mod preset;

pub type NodeId = u32;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub from: NodeId,
    pub to: NodeId,
    /// Ohms. Zero is allowed for a branch that only carries a source.
    pub resistance: f64,
}

impl Edge {
    pub fn new(from: NodeId, to: NodeId, resistance: f64) -> Self {
        Self { from, to, resistance }
    }

    pub fn connects(&self, a: NodeId, b: NodeId) -> bool {
        (self.from == a && self.to == b) || (self.from == b && self.to == a)
    }
}

/// Ideal source on the branch `from -> to`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VoltageSource {
    pub from: NodeId,
    pub to: NodeId,
    pub emf: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Loop {
    pub nodes: Vec<NodeId>,
}

impl Loop {
    pub fn new(nodes: &[NodeId]) -> Self {
        Self { nodes: nodes.to_vec() }
    }

    /// Consecutive node pairs, closing back to the first node.
    pub fn hops(&self) -> impl Iterator<Item = (NodeId, NodeId)> + '_ {
        let n = self.nodes.len();
        (0..n).map(move |i| (self.nodes[i], self.nodes[(i + 1) % n]))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Circuit {
    pub num_nodes: u32,
    pub edges: Vec<Edge>,
    #[serde(default)]
    pub voltage_sources: Vec<VoltageSource>,
    pub loops: Vec<Loop>,
}

#[derive(Debug, Error, PartialEq)]
pub enum CircuitError {
    #[error("circuit must have at least one node")]
    NoNodes,
    #[error("branch {from}-{to} references a node outside 1..={max}")]
    NodeOutOfRange { from: NodeId, to: NodeId, max: u32 },
    #[error("branch {0}-{0} connects a node to itself")]
    SelfLoop(NodeId),
    #[error("branch {from}-{to} is declared more than once")]
    DuplicateBranch { from: NodeId, to: NodeId },
    #[error("branch {from}-{to} has invalid resistance {resistance}")]
    InvalidResistance { from: NodeId, to: NodeId, resistance: f64 },
    #[error("voltage source {from}->{to} is not on a declared branch")]
    SourceWithoutBranch { from: NodeId, to: NodeId },
    #[error("branch {from}-{to} carries more than one voltage source")]
    DuplicateSource { from: NodeId, to: NodeId },
    #[error("voltage source {from}->{to} has invalid emf {emf}")]
    InvalidEmf { from: NodeId, to: NodeId, emf: f64 },
    #[error("loop {index} needs at least 3 distinct nodes")]
    ShortLoop { index: usize },
    #[error("loop {index} references node {node} outside 1..={max}")]
    LoopNodeOutOfRange { index: usize, node: NodeId, max: u32 },
    #[error("loop {index} visits node {node} twice")]
    RepeatedLoopNode { index: usize, node: NodeId },
    #[error("loop {index} steps {from}->{to} without a branch")]
    BrokenLoop { index: usize, from: NodeId, to: NodeId },
}

impl Circuit {
    /// The eight-node, six-loop laboratory circuit.
    pub fn lab_exercise() -> Self {
        preset::lab_exercise()
    }

    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading circuit file: {}", path.display()))?;
        let circuit: Circuit = serde_json::from_str(&text)
            .with_context(|| format!("parsing circuit file: {}", path.display()))?;
        Ok(circuit)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn num_loops(&self) -> usize {
        self.loops.len()
    }

    pub fn has_branch(&self, a: NodeId, b: NodeId) -> bool {
        self.edges.iter().any(|e| e.connects(a, b))
    }

    fn in_range(&self, node: NodeId) -> bool {
        (1..=self.num_nodes).contains(&node)
    }

    pub fn validate(&self) -> Result<(), CircuitError> {
        if self.num_nodes == 0 {
            return Err(CircuitError::NoNodes);
        }

        let mut seen = HashSet::new();
        for e in &self.edges {
            if !self.in_range(e.from) || !self.in_range(e.to) {
                return Err(CircuitError::NodeOutOfRange { from: e.from, to: e.to, max: self.num_nodes });
            }
            if e.from == e.to {
                return Err(CircuitError::SelfLoop(e.from));
            }
            if !e.resistance.is_finite() || e.resistance < 0.0 {
                return Err(CircuitError::InvalidResistance { from: e.from, to: e.to, resistance: e.resistance });
            }
            if !seen.insert(unordered(e.from, e.to)) {
                return Err(CircuitError::DuplicateBranch { from: e.from, to: e.to });
            }
        }

        let mut sourced = HashSet::new();
        for s in &self.voltage_sources {
            if !self.has_branch(s.from, s.to) {
                return Err(CircuitError::SourceWithoutBranch { from: s.from, to: s.to });
            }
            if !s.emf.is_finite() {
                return Err(CircuitError::InvalidEmf { from: s.from, to: s.to, emf: s.emf });
            }
            if !sourced.insert(unordered(s.from, s.to)) {
                return Err(CircuitError::DuplicateSource { from: s.from, to: s.to });
            }
        }

        for (index, l) in self.loops.iter().enumerate() {
            if l.nodes.len() < 3 {
                return Err(CircuitError::ShortLoop { index });
            }
            let mut visited = HashSet::new();
            for &node in &l.nodes {
                if !self.in_range(node) {
                    return Err(CircuitError::LoopNodeOutOfRange { index, node, max: self.num_nodes });
                }
                if !visited.insert(node) {
                    return Err(CircuitError::RepeatedLoopNode { index, node });
                }
            }
            if let Some((from, to)) = l.hops().find(|&(a, b)| !self.has_branch(a, b)) {
                return Err(CircuitError::BrokenLoop { index, from, to });
            }
        }

        Ok(())
    }
}

fn unordered(a: NodeId, b: NodeId) -> (NodeId, NodeId) {
    if a <= b { (a, b) } else { (b, a) }
}

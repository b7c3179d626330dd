//! Dependency tracking for formula recalculation
//!
//! Edges point from a formula cell to each cell it reads. The graph is kept
//! acyclic by checking every prospective edge with [`DependencyGraph::would_create_cycle`]
//! before inserting it.

use ahash::{AHashMap, AHashSet};
use slate_core::CellAddress;
use std::collections::BTreeSet;

/// Dependency graph over the cells of one sheet
///
/// Both edge directions are stored so that dependents of a changed cell and
/// precedents of a formula are each a single lookup.
#[derive(Debug, Default, Clone)]
pub struct DependencyGraph {
    /// Cell -> cells it reads
    dependencies: AHashMap<CellAddress, AHashSet<CellAddress>>,
    /// Cell -> cells that read it
    dependents: AHashMap<CellAddress, AHashSet<CellAddress>>,
}

/// Result of a topological ordering pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvaluationOrder {
    /// Cells in dependency order: every cell appears after everything it reads
    pub sorted: Vec<CellAddress>,
    /// Cells that sit on or downstream of a cycle, in address order
    pub cyclic: Vec<CellAddress>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `from` reads `to`
    pub fn add_dependency(&mut self, from: CellAddress, to: CellAddress) {
        self.dependencies.entry(from).or_default().insert(to);
        self.dependents.entry(to).or_default().insert(from);
    }

    /// Remove every outgoing edge of `cell`
    ///
    /// Incoming edges survive: cells that read `cell` still depend on it
    /// whatever `cell` now contains.
    pub fn remove_dependencies(&mut self, cell: CellAddress) {
        if let Some(reads) = self.dependencies.remove(&cell) {
            for read in reads {
                if let Some(readers) = self.dependents.get_mut(&read) {
                    readers.remove(&cell);
                    if readers.is_empty() {
                        self.dependents.remove(&read);
                    }
                }
            }
        }
    }

    /// Cells that `cell` reads
    pub fn dependencies_of(&self, cell: CellAddress) -> impl Iterator<Item = CellAddress> + '_ {
        self.dependencies
            .get(&cell)
            .into_iter()
            .flat_map(|set| set.iter().copied())
    }

    /// Cells that read `cell`
    pub fn dependents_of(&self, cell: CellAddress) -> impl Iterator<Item = CellAddress> + '_ {
        self.dependents
            .get(&cell)
            .into_iter()
            .flat_map(|set| set.iter().copied())
    }

    /// Every cell that transitively reads any of `changed`, excluding the
    /// changed cells themselves
    pub fn transitive_dependents(&self, changed: &[CellAddress]) -> AHashSet<CellAddress> {
        let mut result = AHashSet::new();
        let mut stack: Vec<CellAddress> = changed.to_vec();

        while let Some(cell) = stack.pop() {
            for dependent in self.dependents_of(cell) {
                if result.insert(dependent) {
                    stack.push(dependent);
                }
            }
        }

        for cell in changed {
            result.remove(cell);
        }
        result
    }

    /// Whether adding the edge `from -> to` would close a cycle
    ///
    /// True when `from == to` or when `from` is already reachable from `to`
    /// along existing dependency edges.
    pub fn would_create_cycle(&self, from: CellAddress, to: CellAddress) -> bool {
        if from == to {
            return true;
        }

        let mut visited = AHashSet::new();
        let mut stack = vec![to];

        while let Some(cell) = stack.pop() {
            if cell == from {
                return true;
            }
            if !visited.insert(cell) {
                continue;
            }
            stack.extend(self.dependencies_of(cell));
        }

        false
    }

    /// Topologically order the given cells by their dependency edges
    ///
    /// Kahn's algorithm with an ordered ready set, so the output is
    /// deterministic for a given graph. Cells connected to a cycle never
    /// reach in-degree zero and are returned separately.
    pub fn evaluation_order(&self, cells: &[CellAddress]) -> EvaluationOrder {
        let members: AHashSet<CellAddress> = cells.iter().copied().collect();

        // In-degree within the induced subgraph: edges to cells outside
        // `cells` do not count.
        let mut in_degree: AHashMap<CellAddress, usize> = AHashMap::new();
        for &cell in &members {
            let degree = self
                .dependencies_of(cell)
                .filter(|dep| members.contains(dep))
                .count();
            in_degree.insert(cell, degree);
        }

        let mut ready: BTreeSet<CellAddress> = in_degree
            .iter()
            .filter(|(_, &degree)| degree == 0)
            .map(|(&cell, _)| cell)
            .collect();

        let mut sorted = Vec::with_capacity(members.len());
        while let Some(cell) = ready.pop_first() {
            sorted.push(cell);
            for dependent in self.dependents_of(cell) {
                if let Some(degree) = in_degree.get_mut(&dependent) {
                    *degree -= 1;
                    if *degree == 0 {
                        ready.insert(dependent);
                    }
                }
            }
        }

        let mut cyclic: Vec<CellAddress> = members
            .iter()
            .filter(|cell| !sorted.contains(cell))
            .copied()
            .collect();
        cyclic.sort();

        EvaluationOrder { sorted, cyclic }
    }
}

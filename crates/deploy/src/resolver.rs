//! Deployment ordering.

use crate::entry::ContractEntry;
use std::collections::HashMap;

/// The dependency graph of a batch is not acyclic.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("circular dependency detected involving {name}")]
pub struct CycleError {
    /// The contract that closed the cycle.
    pub name: String,
}

/// Contracts in an order in which every contract comes after the contracts it references.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DeploymentPlan {
    entries: Vec<ContractEntry>,
}

impl DeploymentPlan {
    pub fn entries(&self) -> &[ContractEntry] {
        &self.entries
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ContractEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Contract names in deployment order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(ContractEntry::name)
    }

    /// Returns the position of the contract named `name`.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.entries.iter().position(|entry| entry.name() == name)
    }
}

impl<'a> IntoIterator for &'a DeploymentPlan {
    type Item = &'a ContractEntry;
    type IntoIter = std::slice::Iter<'a, ContractEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Computes a deployment order for `entries` with a depth-first topological sort.
///
/// Entries are visited in input order, so entries without an ordering constraint between them
/// keep their relative order and the result is deterministic. Dependencies naming no entry of
/// `entries` are skipped here, callers that want them rejected should use
/// [`Batch::plan`](crate::Batch::plan). The same goes for entries sharing a name: references
/// resolve to the first of them, and a session refuses to deploy the others.
///
/// Returns an error naming the entry that closed the first cycle found. No partial plan is
/// produced in that case.
pub fn resolve_dependency_order(entries: &[ContractEntry]) -> Result<DeploymentPlan, CycleError> {
    let mut sorter = Sorter::new(entries);
    for index in 0..entries.len() {
        sorter.visit(index)?;
    }
    let entries = sorter.order.into_iter().map(|index| entries[index].clone()).collect();
    Ok(DeploymentPlan { entries })
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Mark {
    Unvisited,
    /// On the current DFS path.
    InProgress,
    Finished,
}

struct Sorter<'a> {
    entries: &'a [ContractEntry],
    by_name: HashMap<&'a str, usize>,
    marks: Vec<Mark>,
    order: Vec<usize>,
}

impl<'a> Sorter<'a> {
    fn new(entries: &'a [ContractEntry]) -> Self {
        let mut by_name = HashMap::with_capacity(entries.len());
        for (index, entry) in entries.iter().enumerate() {
            by_name.entry(entry.name()).or_insert(index);
        }
        Self {
            entries,
            by_name,
            marks: vec![Mark::Unvisited; entries.len()],
            order: Vec::with_capacity(entries.len()),
        }
    }

    fn visit(&mut self, index: usize) -> Result<(), CycleError> {
        let entries = self.entries;
        let entry = &entries[index];
        match self.marks[index] {
            Mark::InProgress => return Err(CycleError { name: entry.name().to_string() }),
            Mark::Finished => return Ok(()),
            Mark::Unvisited => {}
        }

        self.marks[index] = Mark::InProgress;
        for dependency in entry.depends_on() {
            match self.by_name.get(dependency) {
                Some(&dep_index) => self.visit(dep_index)?,
                None => trace!(contract = entry.name(), dependency, "skipping external dependency"),
            }
        }
        self.marks[index] = Mark::Finished;
        self.order.push(index);

        Ok(())
    }
}

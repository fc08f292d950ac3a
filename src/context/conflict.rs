//! Detecting and resolving operations that target the same destination.

use super::{Context, OpKind, OpState};
use std::collections::BTreeMap;

/// Several ready operations writing the same canonical path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conflict {
    pub canonical: String,
    /// Indexes into [`Context::operations`].
    pub ops: Vec<usize>,
    /// The operation kept when resolved.
    pub selected: Option<usize>,
    pub resolved: bool,
}

/// How to pick the winning operation of a [`Conflict`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolveStrategy {
    /// Keep the operation whose source matches the existing manifest record.
    ManifestOrigin,
    /// Keep the operation with the longest source path.
    LongestPath,
    /// Keep the operation with the shortest source path.
    ShortestPath,
    /// Keep the operation at this index into [`Context::operations`].
    Manual(usize),
}

impl Context {
    /// Group ready operations by destination; every group of more than one
    /// is a conflict.
    #[must_use]
    pub fn check(&self) -> Vec<Conflict> {
        let mut groups: BTreeMap<&str, Vec<usize>> = BTreeMap::new();
        for (index, op) in self.operations.iter().enumerate() {
            if op.state == OpState::Ready {
                groups.entry(op.canonical.as_str()).or_default().push(index);
            }
        }
        groups
            .into_iter()
            .filter(|(_, ops)| ops.len() > 1)
            .map(|(canonical, ops)| Conflict {
                canonical: canonical.to_string(),
                ops,
                selected: None,
                resolved: false,
            })
            .collect()
    }

    /// Pick a winner for each conflict. Conflicts the strategy cannot decide
    /// stay unresolved.
    pub fn resolve_conflicts(&self, conflicts: &mut [Conflict], strategy: ResolveStrategy) {
        for conflict in conflicts.iter_mut().filter(|c| !c.resolved) {
            conflict.selected = match strategy {
                ResolveStrategy::ManifestOrigin => self.manifest_winner(conflict),
                ResolveStrategy::LongestPath => self.path_winner(conflict, true),
                ResolveStrategy::ShortestPath => self.path_winner(conflict, false),
                ResolveStrategy::Manual(index) => conflict.ops.contains(&index).then_some(index),
            };
            conflict.resolved = conflict.selected.is_some();
            if let Some(selected) = conflict.selected {
                tracing::debug!(
                    "Conflict on {} resolved with {:?}: {}",
                    conflict.canonical,
                    strategy,
                    self.operations[selected]
                );
            }
        }
    }

    /// Mark the losing operations of resolved conflicts as ignored.
    pub fn apply_resolutions(&mut self, conflicts: &[Conflict]) {
        for conflict in conflicts.iter().filter(|c| c.resolved) {
            for &index in &conflict.ops {
                if Some(index) != conflict.selected {
                    if let Some(op) = self.operations.get_mut(index) {
                        op.state = OpState::Ignore;
                    }
                }
            }
        }
    }

    fn manifest_winner(&self, conflict: &Conflict) -> Option<usize> {
        let record = self.manifest.find(&conflict.canonical).filter(|r| !r.add)?;
        let source = record.source_path();
        let mut matching = conflict.ops.iter().copied().filter(|&i| {
            let op = &self.operations[i];
            op.source == source || op.pkg == source
        });
        let first = matching.next()?;
        matching.next().is_none().then_some(first)
    }

    fn path_winner(&self, conflict: &Conflict, longest: bool) -> Option<usize> {
        let len = |i: usize| {
            let op = &self.operations[i];
            if op.pkg.is_empty() { op.source.len() } else { op.pkg.len() }
        };
        let ops = conflict.ops.iter().copied().filter(|&i| self.operations[i].kind != OpKind::Remove);
        if longest { ops.max_by_key(|&i| len(i)) } else { ops.min_by_key(|&i| len(i)) }
    }
}

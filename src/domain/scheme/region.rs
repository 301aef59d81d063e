use std::collections::HashMap;

use generational_arena::Index;
use tracing::{debug, instrument};

use super::{apply_labels, LabelScheme, SchemeKind};
use crate::domain::arena::{NodeId, TreeArena};
use crate::domain::error::{DomainError, DomainResult};
use crate::domain::label::{LabelValue, RegionLabel};

/// Interval labels `(level, ordinal, closing)` from one preorder pass.
///
/// Ordinals are global, so any insertion is followed by a full relabel.
/// An append-only workload could relabel just the suffix after the insertion
/// point; that refinement is not implemented.
#[derive(Debug, Clone, Copy, Default)]
pub struct RegionLabeler;

impl RegionLabeler {
    fn tree_labels(tree: &TreeArena) -> Vec<(Index, LabelValue)> {
        let Some(root) = tree.root_index() else {
            return Vec::new();
        };

        // Counter is local to this pass and always restarts at 1
        let mut ordinal = 0usize;
        let mut preorder: Vec<(Index, usize, usize)> = Vec::with_capacity(tree.len());
        let mut stack = vec![(root, 0usize)];
        while let Some((idx, level)) = stack.pop() {
            ordinal += 1;
            preorder.push((idx, level, ordinal));
            stack.extend(tree.child_indices(idx).iter().rev().map(|&c| (c, level + 1)));
        }

        // Reverse preorder visits every last child before its parent
        let mut closing: HashMap<Index, usize> = HashMap::with_capacity(preorder.len());
        for &(idx, _, ordinal) in preorder.iter().rev() {
            let value = tree
                .child_indices(idx)
                .last()
                .and_then(|last| closing.get(last).copied())
                .unwrap_or(ordinal);
            closing.insert(idx, value);
        }

        preorder
            .into_iter()
            .map(|(idx, level, ordinal)| {
                let label = RegionLabel {
                    level,
                    ordinal,
                    closing: closing.get(&idx).copied().unwrap_or(ordinal),
                };
                (idx, LabelValue::Region(label))
            })
            .collect()
    }
}

impl LabelScheme for RegionLabeler {
    fn kind(&self) -> SchemeKind {
        SchemeKind::Region
    }

    #[instrument(level = "debug", skip_all, fields(nodes = tree.len()))]
    fn label_all(&self, tree: &mut TreeArena) -> DomainResult<()> {
        let labels = Self::tree_labels(tree);
        debug!(labeled = labels.len(), "region pass");
        apply_labels(tree, self.kind(), labels)
    }

    #[instrument(level = "debug", skip_all)]
    fn label_inserted(
        &self,
        tree: &mut TreeArena,
        parent: NodeId,
        inserted: NodeId,
    ) -> DomainResult<()> {
        if !tree.contains(parent) || !tree.contains(inserted) {
            return Err(DomainError::InvalidInsertion(
                "insertion refers to nodes outside this tree".into(),
            ));
        }
        debug!("ordinals shift after insertion, relabeling whole tree");
        self.label_all(tree)
    }
}

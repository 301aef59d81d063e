use generational_arena::Index;
use tracing::{debug, instrument};

use super::{apply_labels, parent_label, LabelScheme, SchemeKind};
use crate::domain::arena::{NodeId, TreeArena};
use crate::domain::error::{DomainError, DomainResult};
use crate::domain::label::LabelValue;

/// Dewey-style labels: the j-th child of a node labeled `P` gets `P ++ [j]`.
///
/// A label depends only on the positions along the root path, so appending a
/// subtree never touches labels outside it.
#[derive(Debug, Clone, Copy, Default)]
pub struct PathVectorLabeler;

impl PathVectorLabeler {
    /// Labels the subtree under `start` given the label of `start` itself.
    fn subtree_labels(
        tree: &TreeArena,
        start: Index,
        start_label: Vec<u32>,
    ) -> DomainResult<Vec<(Index, LabelValue)>> {
        let mut labels = Vec::new();
        let mut stack = vec![(start, start_label)];

        while let Some((idx, path)) = stack.pop() {
            for (j, &child) in tree.child_indices(idx).iter().enumerate() {
                let mut child_path = path.clone();
                child_path.push(position(j + 1)?);
                stack.push((child, child_path));
            }
            labels.push((idx, LabelValue::PathVector(path)));
        }
        Ok(labels)
    }
}

fn position(ordinal: usize) -> DomainResult<u32> {
    u32::try_from(ordinal)
        .map_err(|_| DomainError::Structural(format!("child position {ordinal} exceeds u32")))
}

impl LabelScheme for PathVectorLabeler {
    fn kind(&self) -> SchemeKind {
        SchemeKind::PathVector
    }

    #[instrument(level = "debug", skip_all, fields(nodes = tree.len()))]
    fn label_all(&self, tree: &mut TreeArena) -> DomainResult<()> {
        let labels = match tree.root_index() {
            Some(root) => Self::subtree_labels(tree, root, Vec::new())?,
            None => Vec::new(),
        };
        debug!(labeled = labels.len(), "path-vector pass");
        apply_labels(tree, self.kind(), labels)
    }

    #[instrument(level = "debug", skip_all)]
    fn label_inserted(
        &self,
        tree: &mut TreeArena,
        parent: NodeId,
        inserted: NodeId,
    ) -> DomainResult<()> {
        let (parent_idx, label) = parent_label(tree, parent)?;
        let mut path = label
            .as_path_vector()
            .ok_or(DomainError::SchemeMismatch {
                owner: label.scheme(),
                attempted: self.kind(),
            })?
            .to_vec();
        let inserted_idx = tree
            .resolve(inserted)
            .ok_or_else(|| DomainError::InvalidInsertion("inserted node is not in this tree".into()))?;
        path.push(position(tree.child_indices(parent_idx).len())?);

        let labels = Self::subtree_labels(tree, inserted_idx, path)?;
        debug!(labeled = labels.len(), "path-vector insertion");
        apply_labels(tree, self.kind(), labels)
    }
}

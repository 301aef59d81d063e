use generational_arena::Index;
use tracing::{debug, instrument};

use super::{apply_labels, parent_label, LabelScheme, SchemeKind};
use crate::domain::arena::{NodeId, TreeArena};
use crate::domain::error::{DomainError, DomainResult};
use crate::domain::label::LabelValue;

/// Per-level multipliers: `primes[0] = 1`, `primes[i]` is the i-th prime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrimeTable {
    primes: Vec<u128>,
}

impl PrimeTable {
    /// Table with entries for levels `0..=depth`.
    pub fn for_depth(depth: usize) -> Self {
        let mut primes: Vec<u128> = Vec::with_capacity(depth + 1);
        primes.push(1);
        if depth >= 1 {
            primes.push(2);
        }
        let mut candidate: u128 = 3;
        while primes.len() <= depth {
            // Trial division by known primes, skipping the leading 1
            let is_prime = primes[1..]
                .iter()
                .take_while(|&&p| p * p <= candidate)
                .all(|&p| candidate % p != 0);
            if is_prime {
                primes.push(candidate);
            }
            candidate += 2;
        }
        Self { primes }
    }

    /// Multiplier applied to the children of a node at `level`.
    pub fn multiplier(&self, level: usize) -> Option<u128> {
        self.primes.get(level).copied()
    }

    pub fn len(&self) -> usize {
        self.primes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.primes.is_empty()
    }

    pub fn as_slice(&self) -> &[u128] {
        &self.primes
    }
}

/// Multiplicative labels: a child of a node at level `d` labeled `L` gets
/// `L * primes[d]`.
///
/// The multiplier depends on the level only, so all children of one node share
/// a label. Sibling order is therefore not recoverable from these labels.
#[derive(Debug, Clone, Copy, Default)]
pub struct PrimeProductLabeler;

impl PrimeProductLabeler {
    fn subtree_labels(
        tree: &TreeArena,
        primes: &PrimeTable,
        start: Index,
        start_label: u128,
        start_level: usize,
    ) -> DomainResult<Vec<(Index, LabelValue)>> {
        let mut labels = Vec::new();
        let mut stack = vec![(start, start_label, start_level)];

        while let Some((idx, label, level)) = stack.pop() {
            let children = tree.child_indices(idx);
            if !children.is_empty() {
                let child_label = child_label(primes, label, level)?;
                stack.extend(children.iter().map(|&c| (c, child_label, level + 1)));
            }
            labels.push((idx, LabelValue::PrimeProduct(label)));
        }
        Ok(labels)
    }
}

fn child_label(primes: &PrimeTable, label: u128, level: usize) -> DomainResult<u128> {
    let multiplier = primes.multiplier(level).ok_or_else(|| {
        DomainError::Structural(format!("prime table has no entry for level {level}"))
    })?;
    label
        .checked_mul(multiplier)
        .ok_or(DomainError::Overflow {
            level,
            label,
            multiplier,
        })
}

impl LabelScheme for PrimeProductLabeler {
    fn kind(&self) -> SchemeKind {
        SchemeKind::PrimeProduct
    }

    #[instrument(level = "debug", skip_all, fields(nodes = tree.len()))]
    fn label_all(&self, tree: &mut TreeArena) -> DomainResult<()> {
        let depth = tree.depth();
        let primes = PrimeTable::for_depth(depth);
        debug!(depth, primes = ?primes.as_slice(), "prime table");

        let labels = match tree.root_index() {
            Some(root) => Self::subtree_labels(tree, &primes, root, 1, 0)?,
            None => Vec::new(),
        };
        apply_labels(tree, self.kind(), labels)
    }

    #[instrument(level = "debug", skip_all)]
    fn label_inserted(
        &self,
        tree: &mut TreeArena,
        parent: NodeId,
        inserted: NodeId,
    ) -> DomainResult<()> {
        let (_, label) = parent_label(tree, parent)?;
        let parent_value = label.as_prime_product().ok_or(DomainError::SchemeMismatch {
            owner: label.scheme(),
            attempted: self.kind(),
        })?;
        let inserted_idx = tree
            .resolve(inserted)
            .ok_or_else(|| DomainError::InvalidInsertion("inserted node is not in this tree".into()))?;
        let parent_level = tree
            .level(parent)
            .ok_or_else(|| DomainError::InvalidInsertion("parent is not a node of this tree".into()))?;

        // The insertion may deepen the tree; the table must cover the new depth
        let depth = tree.depth();
        let primes = PrimeTable::for_depth(depth);

        let start_label = child_label(&primes, parent_value, parent_level)?;
        let labels =
            Self::subtree_labels(tree, &primes, inserted_idx, start_label, parent_level + 1)?;
        debug!(depth, labeled = labels.len(), "prime-product insertion");
        apply_labels(tree, self.kind(), labels)
    }
}

//! Label schemes
//!
//! A scheme assigns every node a [`LabelValue`] in one full pass and defines
//! how an appended subtree gets labeled. Schemes hold no state between calls:
//! counters and prime tables live inside a single pass.

mod path_vector;
mod prime_product;
mod region;

use std::fmt;
use std::str::FromStr;

use generational_arena::Index;
use serde::{Deserialize, Serialize};

use crate::domain::arena::{NodeId, TreeArena};
use crate::domain::error::{DomainError, DomainResult};
use crate::domain::label::LabelValue;

pub use path_vector::PathVectorLabeler;
pub use prime_product::{PrimeProductLabeler, PrimeTable};
pub use region::RegionLabeler;

/// Available label encodings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SchemeKind {
    /// Dewey-style ordinal path
    #[default]
    PathVector,
    /// Product of level primes
    PrimeProduct,
    /// Preorder ordinal with subtree-closing ordinal
    Region,
}

impl SchemeKind {
    pub const ALL: [SchemeKind; 3] = [
        SchemeKind::PathVector,
        SchemeKind::PrimeProduct,
        SchemeKind::Region,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SchemeKind::PathVector => "path-vector",
            SchemeKind::PrimeProduct => "prime-product",
            SchemeKind::Region => "region",
        }
    }

    pub fn labeler(&self) -> Box<dyn LabelScheme> {
        match self {
            SchemeKind::PathVector => Box::new(PathVectorLabeler),
            SchemeKind::PrimeProduct => Box::new(PrimeProductLabeler),
            SchemeKind::Region => Box::new(RegionLabeler),
        }
    }
}

impl fmt::Display for SchemeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SchemeKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SchemeKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s.trim().to_ascii_lowercase())
            .ok_or_else(|| {
                format!(
                    "unknown label scheme '{}', expected one of: path-vector, prime-product, region",
                    s
                )
            })
    }
}

/// A label encoding over [`TreeArena`].
pub trait LabelScheme: fmt::Debug {
    fn kind(&self) -> SchemeKind;

    /// Label every node of the tree from scratch.
    fn label_all(&self, tree: &mut TreeArena) -> DomainResult<()>;

    /// Label after `inserted` was attached as the last child of `parent`.
    ///
    /// On error no label of the tree has been changed.
    fn label_inserted(
        &self,
        tree: &mut TreeArena,
        parent: NodeId,
        inserted: NodeId,
    ) -> DomainResult<()>;
}

/// Writes labels computed by a pass. Nothing is written if the tree belongs
/// to another scheme.
fn apply_labels(
    tree: &mut TreeArena,
    kind: SchemeKind,
    labels: Vec<(Index, LabelValue)>,
) -> DomainResult<()> {
    tree.claim_labels(kind)?;
    for (idx, label) in labels {
        tree.set_label(idx, label)?;
    }
    Ok(())
}

/// Label of an already labeled parent, as required by incremental insertion.
fn parent_label(tree: &TreeArena, parent: NodeId) -> DomainResult<(Index, LabelValue)> {
    let idx = tree
        .resolve(parent)
        .ok_or_else(|| DomainError::InvalidInsertion("parent is not a node of this tree".into()))?;
    let label = tree.node_at(idx).label().cloned().ok_or(DomainError::Unlabeled)?;
    Ok((idx, label))
}

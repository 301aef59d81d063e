//! Labeling service
//!
//! Binds one tree to one label scheme for its whole lifetime and runs the
//! scheme's contract on insertion.

use std::cmp::Ordering;

use tracing::{debug, info, instrument, warn};

use crate::application::{ApplicationError, ApplicationResult};
use crate::domain::{
    DomainError, Element, LabelScheme, LabelValue, NodeId, PathQuery, SchemeKind, TreeArena,
    TreeBuilder,
};

/// A tree together with the scheme that owns its labels.
#[derive(Debug)]
pub struct LabeledTree {
    tree: TreeArena,
    scheme: Box<dyn LabelScheme>,
    builder: TreeBuilder,
}

impl LabeledTree {
    /// Build a tree from `element` and label it with `scheme`.
    pub fn new(element: &Element, scheme: SchemeKind) -> ApplicationResult<Self> {
        Self::with_builder(element, scheme, TreeBuilder::new())
    }

    pub fn with_builder(
        element: &Element,
        scheme: SchemeKind,
        builder: TreeBuilder,
    ) -> ApplicationResult<Self> {
        let tree = builder.build(element)?;
        let mut labeled = Self {
            tree,
            scheme: scheme.labeler(),
            builder,
        };
        labeled.relabel()?;
        Ok(labeled)
    }

    /// Take over an existing tree; fails if another scheme already labeled it.
    pub fn from_tree(tree: TreeArena, scheme: Box<dyn LabelScheme>) -> ApplicationResult<Self> {
        let mut labeled = Self {
            tree,
            scheme,
            builder: TreeBuilder::new(),
        };
        labeled.relabel()?;
        Ok(labeled)
    }

    pub fn tree(&self) -> &TreeArena {
        &self.tree
    }

    pub fn into_tree(self) -> TreeArena {
        self.tree
    }

    pub fn scheme(&self) -> SchemeKind {
        self.scheme.kind()
    }

    pub fn root(&self) -> Option<NodeId> {
        self.tree.root()
    }

    pub fn label(&self, id: NodeId) -> Option<&LabelValue> {
        self.tree.label(id)
    }

    /// Full labeling pass over the whole tree.
    #[instrument(level = "info", skip(self), fields(scheme = %self.scheme.kind(), nodes = self.tree.len()))]
    pub fn relabel(&mut self) -> ApplicationResult<()> {
        self.scheme.label_all(&mut self.tree)?;
        info!("labeled tree");
        Ok(())
    }

    /// Append `subtree` as the last child of `parent` and label it.
    ///
    /// Either the subtree is attached and labeled, or the tree is left exactly
    /// as it was.
    #[instrument(level = "info", skip(self, subtree), fields(scheme = %self.scheme.kind(), root = %subtree.tag))]
    pub fn insert(&mut self, parent: NodeId, subtree: &Element) -> ApplicationResult<NodeId> {
        let parent_level = self
            .tree
            .level(parent)
            .ok_or_else(|| DomainError::InvalidInsertion("parent is not a node of this tree".into()))?;

        let node = self
            .builder
            .build_detached(&mut self.tree, subtree, parent_level + 1)?;
        if let Err(e) = self.tree.append_child(parent, node) {
            self.tree.remove_detached_subtree(node);
            return Err(e.into());
        }
        if let Err(e) = self.scheme.label_inserted(&mut self.tree, parent, node) {
            warn!(error = %e, "labeling inserted subtree failed, rolling back");
            self.tree.detach_last_child(parent, node);
            self.tree.remove_detached_subtree(node);
            return Err(e.into());
        }

        debug!(inserted = subtree.size(), total = self.tree.len(), "inserted subtree");
        Ok(node)
    }

    /// Insert under the first node matched by `pattern`.
    pub fn insert_at(&mut self, pattern: &str, subtree: &Element) -> ApplicationResult<NodeId> {
        let parent = self
            .find(pattern)
            .into_iter()
            .next()
            .ok_or_else(|| ApplicationError::NoMatch(pattern.to_string()))?;
        self.insert(parent, subtree)
    }

    /// Nodes matching `pattern`, in document order.
    #[instrument(level = "debug", skip(self))]
    pub fn find(&self, pattern: &str) -> Vec<NodeId> {
        let query = PathQuery::parse(pattern);
        let found: Vec<NodeId> = query.matches(&self.tree).map(|(id, _)| id).collect();
        debug!(matches = found.len(), "query");
        found
    }

    /// Ancestor test from the two labels alone.
    pub fn is_ancestor(&self, ancestor: NodeId, descendant: NodeId) -> Option<bool> {
        let a = self.tree.label(ancestor)?;
        let b = self.tree.label(descendant)?;
        Some(a.is_ancestor_of(b))
    }

    /// Document order from the two labels alone; `None` where the scheme cannot tell.
    pub fn compare(&self, a: NodeId, b: NodeId) -> Option<Ordering> {
        self.tree.label(a)?.compare(self.tree.label(b)?)
    }
}

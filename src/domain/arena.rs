use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use generational_arena::{Arena, Index};
use tracing::{instrument, trace};

use crate::domain::error::{DomainError, DomainResult};
use crate::domain::label::LabelValue;
use crate::domain::scheme::SchemeKind;

static NEXT_TREE_ID: AtomicU64 = AtomicU64::new(1);

/// Handle of a node inside one specific [`TreeArena`].
///
/// Carries the identity of the owning tree, so a handle taken from one tree
/// is never mistaken for a node of another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId {
    tree: u64,
    index: Index,
}

/// Opaque payload mirrored from the external element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeData {
    /// Structural name, immutable after creation
    pub tag: String,
    /// Attribute pairs in source order
    pub attributes: Vec<(String, String)>,
    pub text: Option<String>,
}

impl NodeData {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attributes: Vec::new(),
            text: None,
        }
    }
}

impl fmt::Display for NodeData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tag)
    }
}

/// Tree node in the arena-based hierarchy structure.
#[derive(Debug)]
pub struct TreeNode {
    data: NodeData,
    label: Option<LabelValue>,
    /// Index of parent node in the arena, None for the root and detached nodes
    parent: Option<Index>,
    /// Indices of child nodes in document order
    children: Vec<Index>,
}

impl TreeNode {
    pub fn data(&self) -> &NodeData {
        &self.data
    }

    pub fn tag(&self) -> &str {
        &self.data.tag
    }

    pub fn label(&self) -> Option<&LabelValue> {
        self.label.as_ref()
    }

    pub fn child_count(&self) -> usize {
        self.children.len()
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

/// Arena-based ordered tree.
///
/// Uses generational arena for memory-safe node references and O(1) lookups.
/// Children are append-only; a node is attached to at most one parent.
#[derive(Debug)]
pub struct TreeArena {
    id: u64,
    /// Arena storage for all tree nodes
    arena: Arena<TreeNode>,
    /// Index of the root node, None for empty trees
    root: Option<Index>,
    /// Scheme owning the labels of this tree, set by the first labeling pass
    labeled_by: Option<SchemeKind>,
}

impl Default for TreeArena {
    fn default() -> Self {
        Self::new()
    }
}

impl TreeArena {
    pub fn new() -> Self {
        Self {
            id: NEXT_TREE_ID.fetch_add(1, Ordering::Relaxed),
            arena: Arena::new(),
            root: None,
            labeled_by: None,
        }
    }

    pub(crate) fn node_id(&self, index: Index) -> NodeId {
        NodeId {
            tree: self.id,
            index,
        }
    }

    /// Resolves a handle to an arena index, rejecting foreign and stale handles.
    pub(crate) fn resolve(&self, id: NodeId) -> Option<Index> {
        (id.tree == self.id && self.arena.contains(id.index)).then_some(id.index)
    }

    /// Creates a node without a parent; it becomes part of the tree once attached.
    #[instrument(level = "trace", skip(self))]
    pub fn create_node(&mut self, data: NodeData) -> NodeId {
        let index = self.arena.insert(TreeNode {
            data,
            label: None,
            parent: None,
            children: Vec::new(),
        });
        self.node_id(index)
    }

    /// Creates a node and attaches it; `parent == None` makes it the root.
    #[instrument(level = "trace", skip(self))]
    pub fn insert_node(&mut self, data: NodeData, parent: Option<NodeId>) -> DomainResult<NodeId> {
        match parent {
            None => {
                if self.root.is_some() {
                    return Err(DomainError::Structural("tree already has a root".into()));
                }
                let id = self.create_node(data);
                self.root = Some(id.index);
                Ok(id)
            }
            Some(parent) => {
                if self.resolve(parent).is_none() {
                    return Err(DomainError::InvalidInsertion(
                        "parent is not a node of this tree".into(),
                    ));
                }
                let id = self.create_node(data);
                self.append_child(parent, id)?;
                Ok(id)
            }
        }
    }

    /// Adds `child` as the new last child of `parent`.
    ///
    /// Rejects nodes of other trees, a child that already has a parent or is
    /// the root, and a child that would close a cycle.
    #[instrument(level = "trace", skip(self))]
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> DomainResult<()> {
        let parent_idx = self.resolve(parent).ok_or_else(|| {
            DomainError::InvalidInsertion("parent is not a node of this tree".into())
        })?;
        let child_idx = self.resolve(child).ok_or_else(|| {
            DomainError::InvalidInsertion("child is not a node of this tree".into())
        })?;

        if self.arena[child_idx].parent.is_some() {
            return Err(DomainError::InvalidInsertion(
                "child is already attached to a parent".into(),
            ));
        }
        if self.root == Some(child_idx) {
            return Err(DomainError::InvalidInsertion("the root cannot become a child".into()));
        }
        let mut cursor = Some(parent_idx);
        while let Some(idx) = cursor {
            if idx == child_idx {
                return Err(DomainError::InvalidInsertion(
                    "attaching would create a cycle".into(),
                ));
            }
            cursor = self.arena[idx].parent;
        }

        self.arena[child_idx].parent = Some(parent_idx);
        self.arena[parent_idx].children.push(child_idx);
        trace!(position = self.arena[parent_idx].children.len(), "attached child");
        Ok(())
    }

    pub fn get_node(&self, id: NodeId) -> Option<&TreeNode> {
        self.resolve(id).map(|idx| &self.arena[idx])
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.resolve(id).is_some()
    }

    pub fn root(&self) -> Option<NodeId> {
        self.root.map(|idx| self.node_id(idx))
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        let idx = self.resolve(id)?;
        self.arena[idx].parent.map(|p| self.node_id(p))
    }

    pub fn children(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        let children: &[Index] = match self.resolve(id) {
            Some(idx) => self.arena[idx].children.as_slice(),
            None => &[],
        };
        children.iter().map(move |&c| self.node_id(c))
    }

    pub fn label(&self, id: NodeId) -> Option<&LabelValue> {
        self.get_node(id).and_then(TreeNode::label)
    }

    pub fn labeled_by(&self) -> Option<SchemeKind> {
        self.labeled_by
    }

    /// Binds the tree's labels to `scheme`; a tree never changes owner.
    pub(crate) fn claim_labels(&mut self, scheme: SchemeKind) -> DomainResult<()> {
        match self.labeled_by {
            Some(owner) if owner != scheme => Err(DomainError::SchemeMismatch {
                owner,
                attempted: scheme,
            }),
            _ => {
                self.labeled_by = Some(scheme);
                Ok(())
            }
        }
    }

    pub(crate) fn set_label(&mut self, idx: Index, label: LabelValue) -> DomainResult<()> {
        let attempted = label.scheme();
        match self.labeled_by {
            Some(owner) if owner == attempted => {}
            Some(owner) => return Err(DomainError::SchemeMismatch { owner, attempted }),
            None => return Err(DomainError::Unlabeled),
        }
        if let Some(node) = self.arena.get_mut(idx) {
            node.label = Some(label);
        }
        Ok(())
    }

    pub(crate) fn node_at(&self, idx: Index) -> &TreeNode {
        &self.arena[idx]
    }

    pub(crate) fn child_indices(&self, idx: Index) -> &[Index] {
        &self.arena[idx].children
    }

    pub(crate) fn root_index(&self) -> Option<Index> {
        self.root
    }

    /// Number of edges between the root and `id`.
    pub fn level(&self, id: NodeId) -> Option<usize> {
        let mut cursor = self.arena[self.resolve(id)?].parent;
        let mut level = 0;
        while let Some(idx) = cursor {
            level += 1;
            cursor = self.arena[idx].parent;
        }
        Some(level)
    }

    /// Proper ancestors of `id`, nearest first.
    pub fn ancestors(&self, id: NodeId) -> Vec<NodeId> {
        let mut result = Vec::new();
        let mut cursor = self.resolve(id).and_then(|idx| self.arena[idx].parent);
        while let Some(idx) = cursor {
            result.push(self.node_id(idx));
            cursor = self.arena[idx].parent;
        }
        result
    }

    /// Maximum root-to-leaf edge count; 0 for a single node or an empty tree.
    #[instrument(level = "debug", skip(self))]
    pub fn depth(&self) -> usize {
        self.root.map_or(0, |root| self.subtree_height(root))
    }

    /// Maximum edge count from `idx` down to a leaf of its subtree.
    pub(crate) fn subtree_height(&self, idx: Index) -> usize {
        let mut max_depth = 0;
        let mut stack = vec![(idx, 0usize)];
        while let Some((current, depth)) = stack.pop() {
            max_depth = max_depth.max(depth);
            for &child in &self.arena[current].children {
                stack.push((child, depth + 1));
            }
        }
        max_depth
    }

    pub fn iter(&self) -> TreeIterator<'_> {
        TreeIterator::new(self, self.root)
    }

    /// Preorder traversal of the subtree rooted at `id`.
    pub fn iter_subtree(&self, id: NodeId) -> TreeIterator<'_> {
        TreeIterator::new(self, self.resolve(id))
    }

    pub fn iter_postorder(&self) -> PostOrderIterator<'_> {
        PostOrderIterator::new(self)
    }

    /// Drops a subtree that was never attached, undoing a failed insertion.
    pub(crate) fn remove_detached_subtree(&mut self, id: NodeId) {
        let Some(root_idx) = self.resolve(id) else {
            return;
        };
        if self.arena[root_idx].parent.is_some() || self.root == Some(root_idx) {
            return;
        }
        let mut stack = vec![root_idx];
        while let Some(idx) = stack.pop() {
            if let Some(node) = self.arena.remove(idx) {
                stack.extend(node.children);
            }
        }
    }

    /// Detaches the last child of `parent` if it is `child`, undoing an append.
    pub(crate) fn detach_last_child(&mut self, parent: NodeId, child: NodeId) {
        let (Some(parent_idx), Some(child_idx)) = (self.resolve(parent), self.resolve(child)) else {
            return;
        };
        if self.arena[parent_idx].children.last() == Some(&child_idx) {
            self.arena[parent_idx].children.pop();
            self.arena[child_idx].parent = None;
        }
    }
}

/// Preorder iterator using an explicit stack.
pub struct TreeIterator<'a> {
    arena: &'a TreeArena,
    stack: Vec<Index>,
}

impl<'a> TreeIterator<'a> {
    fn new(arena: &'a TreeArena, start: Option<Index>) -> Self {
        Self {
            arena,
            stack: start.into_iter().collect(),
        }
    }
}

impl<'a> Iterator for TreeIterator<'a> {
    type Item = (NodeId, &'a TreeNode);

    fn next(&mut self) -> Option<Self::Item> {
        let current_idx = self.stack.pop()?;
        let node = &self.arena.arena[current_idx];
        // Push children in reverse order for left-to-right traversal
        self.stack.extend(node.children.iter().rev());
        Some((self.arena.node_id(current_idx), node))
    }
}

pub struct PostOrderIterator<'a> {
    arena: &'a TreeArena,
    stack: Vec<(Index, bool)>,
}

impl<'a> PostOrderIterator<'a> {
    fn new(arena: &'a TreeArena) -> Self {
        Self {
            arena,
            stack: arena.root.map(|root| (root, false)).into_iter().collect(),
        }
    }
}

impl<'a> Iterator for PostOrderIterator<'a> {
    type Item = (NodeId, &'a TreeNode);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((current_idx, visited)) = self.stack.pop() {
            let node = &self.arena.arena[current_idx];
            if visited {
                return Some((self.arena.node_id(current_idx), node));
            }
            self.stack.push((current_idx, true));
            for &child in node.children.iter().rev() {
                self.stack.push((child, false));
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> (TreeArena, [NodeId; 4]) {
        let mut tree = TreeArena::new();
        let root = tree.insert_node(NodeData::new("root"), None).unwrap();
        let a = tree.insert_node(NodeData::new("A"), Some(root)).unwrap();
        let b = tree.insert_node(NodeData::new("B"), Some(root)).unwrap();
        let c = tree.insert_node(NodeData::new("C"), Some(a)).unwrap();
        (tree, [root, a, b, c])
    }

    #[test]
    fn given_tree_when_iterating_then_yields_preorder() {
        let (tree, _) = sample();
        let tags: Vec<_> = tree.iter().map(|(_, n)| n.tag().to_string()).collect();
        assert_eq!(tags, ["root", "A", "C", "B"]);
    }

    #[test]
    fn given_tree_when_iterating_postorder_then_children_first() {
        let (tree, _) = sample();
        let tags: Vec<_> = tree
            .iter_postorder()
            .map(|(_, n)| n.tag().to_string())
            .collect();
        assert_eq!(tags, ["C", "A", "B", "root"]);
    }

    #[test]
    fn given_tree_when_measuring_then_depth_counts_edges() {
        let (tree, [root, _, b, c]) = sample();
        assert_eq!(tree.depth(), 2);
        assert_eq!(tree.level(root), Some(0));
        assert_eq!(tree.level(c), Some(2));
        assert_eq!(tree.ancestors(c).len(), 2);
        assert_eq!(tree.parent(b), Some(root));
    }

    #[test]
    fn given_attached_node_when_appending_again_then_rejects() {
        let (mut tree, [_, a, b, c]) = sample();
        let result = tree.append_child(b, c);
        assert!(matches!(result, Err(DomainError::InvalidInsertion(_))));
        assert_eq!(tree.children(a).collect::<Vec<_>>(), vec![c]);
    }

    #[test]
    fn given_detached_ancestor_when_appending_under_descendant_then_rejects_cycle() {
        let mut tree = TreeArena::new();
        let top = tree.create_node(NodeData::new("top"));
        let below = tree.create_node(NodeData::new("below"));
        tree.append_child(top, below).unwrap();

        let result = tree.append_child(below, top);

        assert!(matches!(result, Err(DomainError::InvalidInsertion(_))));
    }

    #[test]
    fn given_node_of_other_tree_when_appending_then_rejects() {
        let (mut tree, [root, ..]) = sample();
        let mut other = TreeArena::new();
        let foreign = other.create_node(NodeData::new("foreign"));

        assert!(tree.append_child(root, foreign).is_err());
        assert!(!tree.contains(foreign));
    }

    #[test]
    fn given_detached_subtree_when_removing_then_frees_all_nodes() {
        let (mut tree, _) = sample();
        let top = tree.create_node(NodeData::new("top"));
        let below = tree.create_node(NodeData::new("below"));
        tree.append_child(top, below).unwrap();
        assert_eq!(tree.len(), 6);

        tree.remove_detached_subtree(top);

        assert_eq!(tree.len(), 4);
        assert!(!tree.contains(below));
    }
}

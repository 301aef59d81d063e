//! Tree builder mirroring external elements into a [`TreeArena`].

use tracing::{debug, instrument};

use crate::domain::arena::{NodeData, NodeId, TreeArena};
use crate::domain::element::Element;
use crate::domain::error::{DomainError, DomainResult};

/// Constructs arena trees from external elements.
///
/// Input is validated completely before the first node is created, so a
/// malformed element never leaves nodes behind.
#[derive(Debug, Clone)]
pub struct TreeBuilder {
    max_depth: usize,
}

impl Default for TreeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TreeBuilder {
    pub const DEFAULT_MAX_DEPTH: usize = 100_000;

    pub fn new() -> Self {
        Self {
            max_depth: Self::DEFAULT_MAX_DEPTH,
        }
    }

    /// Limits accepted nesting, measured in edges below the element.
    pub fn with_max_depth(max_depth: usize) -> Self {
        Self { max_depth }
    }

    /// Build a new tree whose root mirrors `element`.
    #[instrument(level = "debug", skip_all, fields(root = %element.tag))]
    pub fn build(&self, element: &Element) -> DomainResult<TreeArena> {
        let size = self.validate(element, 0)?;
        let mut tree = TreeArena::new();
        let root = tree.insert_node(Self::node_data(element), None)?;
        self.mirror_children(&mut tree, root, element)?;
        debug!(nodes = size, "built tree");
        Ok(tree)
    }

    /// Build `element` inside `tree` without attaching it anywhere.
    ///
    /// `level` is where the element's root will sit once attached; the nesting
    /// limit applies to the whole tree, not just the new subtree.
    #[instrument(level = "debug", skip_all, fields(root = %element.tag, level))]
    pub fn build_detached(
        &self,
        tree: &mut TreeArena,
        element: &Element,
        level: usize,
    ) -> DomainResult<NodeId> {
        self.validate(element, level)?;
        let root = tree.create_node(Self::node_data(element));
        self.mirror_children(tree, root, element)?;
        Ok(root)
    }

    fn mirror_children(
        &self,
        tree: &mut TreeArena,
        root: NodeId,
        element: &Element,
    ) -> DomainResult<()> {
        // Siblings are popped left to right, so appends keep document order
        let mut stack: Vec<(&Element, NodeId)> =
            element.children.iter().rev().map(|c| (c, root)).collect();

        while let Some((current, parent)) = stack.pop() {
            let id = tree.create_node(Self::node_data(current));
            tree.append_child(parent, id)?;
            stack.extend(current.children.iter().rev().map(|c| (c, id)));
        }
        Ok(())
    }

    /// Checks every tag and the nesting limit; returns the element count.
    fn validate(&self, element: &Element, level: usize) -> DomainResult<usize> {
        let mut count = 0;
        let mut stack = vec![(element, level)];

        while let Some((current, depth)) = stack.pop() {
            if depth > self.max_depth {
                return Err(DomainError::Structural(format!(
                    "nesting exceeds {} levels",
                    self.max_depth
                )));
            }
            validate_tag(&current.tag)?;
            count += 1;
            stack.extend(current.children.iter().map(|c| (c, depth + 1)));
        }
        Ok(count)
    }

    fn node_data(element: &Element) -> NodeData {
        NodeData {
            tag: element.tag.clone(),
            attributes: element.attributes.clone(),
            text: element.text.clone(),
        }
    }
}

fn validate_tag(tag: &str) -> DomainResult<()> {
    if tag.is_empty() {
        return Err(DomainError::Structural("element with empty tag".into()));
    }
    if tag.chars().any(|c| c.is_whitespace() || c == '/') {
        return Err(DomainError::Structural(format!("invalid tag name: {tag:?}")));
    }
    Ok(())
}

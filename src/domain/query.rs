//! Linear tag-path matching: `Seg1/Seg2/.../SegN`, with `*` matching any tag.
//!
//! The first segment is tested against the root. A node is yielded when it
//! satisfies the last segment at the corresponding depth. No `//` axis, no
//! predicates.

use std::fmt;

use generational_arena::Index;
use itertools::Itertools;

use crate::domain::arena::{NodeId, TreeArena, TreeNode};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Tag(String),
    Wildcard,
}

impl Segment {
    fn accepts(&self, tag: &str) -> bool {
        match self {
            Segment::Tag(expected) => expected == tag,
            Segment::Wildcard => true,
        }
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Tag(tag) => f.write_str(tag),
            Segment::Wildcard => f.write_str("*"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathQuery {
    segments: Vec<Segment>,
}

impl PathQuery {
    /// Never fails: an empty pattern yields a query without matches, and empty
    /// segments (as in `a//b`) match no tag.
    pub fn parse(pattern: &str) -> Self {
        if pattern.is_empty() {
            return Self { segments: Vec::new() };
        }
        let segments = pattern
            .split('/')
            .map(|s| match s {
                "*" => Segment::Wildcard,
                tag => Segment::Tag(tag.to_string()),
            })
            .collect();
        Self { segments }
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Lazily yields matching nodes in preorder.
    pub fn matches<'a>(&'a self, tree: &'a TreeArena) -> Matches<'a> {
        let stack = match (self.segments.is_empty(), tree.root_index()) {
            (false, Some(root)) => vec![(root, 0)],
            _ => Vec::new(),
        };
        Matches {
            tree,
            segments: &self.segments,
            stack,
        }
    }
}

impl fmt::Display for PathQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments.iter().join("/"))
    }
}

/// Iterator over query matches, driven by an explicit stack.
pub struct Matches<'a> {
    tree: &'a TreeArena,
    segments: &'a [Segment],
    stack: Vec<(Index, usize)>,
}

impl<'a> Iterator for Matches<'a> {
    type Item = (NodeId, &'a TreeNode);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((idx, level)) = self.stack.pop() {
            let node = self.tree.node_at(idx);
            if !self.segments[level].accepts(node.tag()) {
                continue;
            }
            if level + 1 == self.segments.len() {
                return Some((self.tree.node_id(idx), node));
            }
            self.stack.extend(
                self.tree
                    .child_indices(idx)
                    .iter()
                    .rev()
                    .map(|&c| (c, level + 1)),
            );
        }
        None
    }
}

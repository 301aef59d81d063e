//! Export of labeled trees
//!
//! Produces the external element shape (for a serializer) and a termtree
//! rendering (for the terminal). Both are assembled bottom-up from a postorder
//! walk, so deep trees need no call-stack recursion.

use std::collections::HashMap;

use termtree::Tree;
use tracing::warn;

use crate::domain::{Element, NodeId, TreeArena, TreeNode};

/// Attribute name carrying the label in exported elements.
pub const DEFAULT_LABEL_ATTRIBUTE: &str = "label";

/// Combine every node with its already converted children, bottom-up.
fn fold_postorder<T>(
    tree: &TreeArena,
    mut convert: impl FnMut(NodeId, &TreeNode, Vec<T>) -> T,
) -> Option<T> {
    let mut done: HashMap<NodeId, T> = HashMap::with_capacity(tree.len());
    for (id, node) in tree.iter_postorder() {
        let children = tree
            .children(id)
            .filter_map(|child| done.remove(&child))
            .collect();
        done.insert(id, convert(id, node, children));
    }
    tree.root().and_then(|root| done.remove(&root))
}

/// Mirror the tree back into elements, adding the label as the first attribute.
///
/// Tag, attributes, text and child order are copied unchanged. If a node
/// already carries an attribute named `label_attribute`, the original value is
/// kept in the label's slot. Unlabeled nodes get no label attribute.
pub fn export_element(tree: &TreeArena, label_attribute: &str) -> Option<Element> {
    fold_postorder(tree, |_, node, children| {
        let data = node.data();
        let mut attributes = Vec::with_capacity(data.attributes.len() + 1);
        if let Some(label) = node.label() {
            let value = match data.attributes.iter().find(|(k, _)| k == label_attribute) {
                Some((_, original)) => {
                    warn!(tag = %data.tag, attribute = label_attribute, "attribute shadows label");
                    original.clone()
                }
                None => label.to_string(),
            };
            attributes.push((label_attribute.to_string(), value));
        }
        attributes.extend(
            data.attributes
                .iter()
                .filter(|(k, _)| node.label().is_none() || k != label_attribute)
                .cloned(),
        );
        Element {
            tag: data.tag.clone(),
            attributes,
            text: data.text.clone(),
            children,
        }
    })
}

/// Deepest level shown by [`to_display_tree`].
pub const DISPLAY_DEPTH_LIMIT: usize = 1_000;

/// Render `tag label` lines as a termtree.
///
/// termtree renders and drops recursively, so levels below
/// [`DISPLAY_DEPTH_LIMIT`] are collapsed into a single `...` leaf.
pub fn to_display_tree(tree: &TreeArena) -> Tree<String> {
    let mut levels: HashMap<NodeId, usize> = HashMap::with_capacity(tree.len());
    for (id, _) in tree.iter() {
        let level = tree
            .parent(id)
            .and_then(|p| levels.get(&p))
            .map_or(0, |l| l + 1);
        levels.insert(id, level);
    }

    fold_postorder(tree, |id, node, children: Vec<Option<Tree<String>>>| {
        let level = levels.get(&id).copied().unwrap_or(0);
        if level > DISPLAY_DEPTH_LIMIT {
            return None;
        }
        let line = match node.label() {
            Some(label) => format!("{} {}", node.tag(), label),
            None => node.tag().to_string(),
        };
        let mut leaves: Vec<Tree<String>> = children.into_iter().flatten().collect();
        if level == DISPLAY_DEPTH_LIMIT && !node.is_leaf() {
            leaves.push(Tree::new("...".to_string()));
        }
        Some(Tree::new(line).with_leaves(leaves))
    })
    .flatten()
    .unwrap_or_else(|| Tree::new("Empty tree".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::services::LabeledTree;
    use crate::domain::SchemeKind;
    use crate::util::testing::chain_element;

    fn sample() -> Element {
        Element::new("root")
            .with_attribute("version", "2")
            .with_child(
                Element::new("A")
                    .with_text("  ")
                    .with_child(Element::new("C").with_attribute("type", "ADC")),
            )
            .with_child(Element::new("B").with_text("b"))
    }

    #[test]
    fn given_labeled_tree_when_exporting_then_adds_only_label() {
        let labeled = LabeledTree::new(&sample(), SchemeKind::PathVector).unwrap();

        let exported = export_element(labeled.tree(), DEFAULT_LABEL_ATTRIBUTE).unwrap();

        assert_eq!(
            exported.attributes,
            vec![
                ("label".to_string(), "[]".to_string()),
                ("version".to_string(), "2".to_string())
            ]
        );
        assert_eq!(exported.children[0].text.as_deref(), Some("  "));
        assert_eq!(exported.children[0].children[0].attribute("label"), Some("[1, 1]"));
        assert_eq!(exported.children[0].children[0].attribute("type"), Some("ADC"));
        assert_eq!(exported.children[1].attribute("label"), Some("[2]"));
    }

    #[test]
    fn given_label_attribute_in_source_when_exporting_then_original_value_kept() {
        let element = Element::new("root").with_attribute("label", "mine");
        let labeled = LabeledTree::new(&element, SchemeKind::Region).unwrap();

        let exported = export_element(labeled.tree(), "label").unwrap();

        assert_eq!(exported.attributes, vec![("label".to_string(), "mine".to_string())]);
    }

    #[test]
    fn given_labeled_tree_when_rendering_then_lines_show_tag_and_label() {
        let labeled = LabeledTree::new(&sample(), SchemeKind::Region).unwrap();

        let rendered = to_display_tree(labeled.tree()).to_string();

        assert!(rendered.starts_with("root [0,1,4]"));
        assert!(rendered.contains("C [2,3,3]"));
        assert!(rendered.contains("B [1,4,4]"));
    }

    #[test]
    fn given_tree_deeper_than_display_limit_when_rendering_then_collapsed() {
        let labeled =
            LabeledTree::new(&chain_element(DISPLAY_DEPTH_LIMIT + 5), SchemeKind::Region).unwrap();

        let rendered = to_display_tree(labeled.tree()).to_string();

        assert_eq!(rendered.lines().count(), DISPLAY_DEPTH_LIMIT + 2);
        assert_eq!(rendered.lines().last().map(str::trim_start), Some("└── ..."));
    }

    #[test]
    fn given_empty_tree_when_rendering_then_placeholder() {
        let tree = TreeArena::new();
        assert_eq!(to_display_tree(&tree).to_string().trim(), "Empty tree");
        assert!(export_element(&tree, "label").is_none());
    }
}

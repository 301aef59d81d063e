//! Tests for the three label schemes through LabeledTree

use std::collections::HashMap;

use rstest::{fixture, rstest};

use xlabel::application::{export_element, ApplicationError, LabeledTree};
use xlabel::domain::{
    DomainError, Element, LabelValue, NodeId, SchemeKind, TreeArena, TreeBuilder,
};
use xlabel::util::testing::{chain_element, init_test_setup, sample_element};

/// Tag -> node, for trees with unique tags.
fn by_tag(tree: &TreeArena) -> HashMap<String, NodeId> {
    tree.iter()
        .map(|(id, node)| (node.tag().to_string(), id))
        .collect()
}

fn labels(tree: &TreeArena) -> HashMap<NodeId, LabelValue> {
    tree.iter()
        .filter_map(|(id, node)| node.label().cloned().map(|l| (id, l)))
        .collect()
}

fn is_real_ancestor(tree: &TreeArena, a: NodeId, b: NodeId) -> bool {
    tree.ancestors(b).contains(&a)
}

#[fixture]
fn catalog() -> Element {
    Element::new("datasets")
        .with_child(
            Element::new("dataset")
                .with_attribute("subject", "astronomy")
                .with_child(Element::new("title").with_text("Proper Motions"))
                .with_child(Element::new("altname").with_attribute("type", "ADC"))
                .with_child(
                    Element::new("reference").with_child(
                        Element::new("source").with_child(
                            Element::new("other")
                                .with_child(Element::new("author").with_child(Element::new("initial")))
                                .with_child(Element::new("author").with_child(Element::new("lastName"))),
                        ),
                    ),
                ),
        )
        .with_child(Element::new("dataset").with_child(Element::new("title")))
        .with_child(Element::new("identifier").with_text("I_5.xml"))
}

fn new_dataset() -> Element {
    Element::new("dataset")
        .with_child(Element::new("title"))
        .with_child(Element::new("keywords").with_child(Element::new("keyword")))
}

// ============================================================
// Path vector
// ============================================================

#[test]
fn given_four_node_tree_when_path_vector_labeling_then_dewey_positions() {
    init_test_setup();
    let labeled = LabeledTree::new(&sample_element(), SchemeKind::PathVector).unwrap();
    let tags = by_tag(labeled.tree());

    let label = |tag: &str| labeled.label(tags[tag]).unwrap().to_string();
    assert_eq!(label("root"), "[]");
    assert_eq!(label("A"), "[1]");
    assert_eq!(label("B"), "[2]");
    assert_eq!(label("C"), "[1, 1]");
}

#[test]
fn given_four_node_tree_when_appending_leaf_under_b_then_only_new_label() {
    let mut labeled = LabeledTree::new(&sample_element(), SchemeKind::PathVector).unwrap();
    let before = labels(labeled.tree());
    let b = by_tag(labeled.tree())["B"];

    let d = labeled.insert(b, &Element::new("D")).unwrap();

    assert_eq!(labeled.label(d), Some(&LabelValue::PathVector(vec![2, 1])));
    let after = labels(labeled.tree());
    for (id, label) in &before {
        assert_eq!(after.get(id), Some(label));
    }
    assert_eq!(after.len(), before.len() + 1);
}

#[rstest]
fn given_path_vector_labels_when_relating_all_pairs_then_prefix_law_holds(catalog: Element) {
    let labeled = LabeledTree::new(&catalog, SchemeKind::PathVector).unwrap();
    let tree = labeled.tree();
    let ids: Vec<_> = tree.iter().map(|(id, _)| id).collect();

    for &a in &ids {
        for &b in &ids {
            let (la, lb) = (tree.label(a).unwrap(), tree.label(b).unwrap());
            assert_eq!(la.is_ancestor_of(lb), is_real_ancestor(tree, a, b), "{la} vs {lb}");
        }
    }
}

#[rstest]
#[case(SchemeKind::PathVector)]
#[case(SchemeKind::Region)]
fn given_total_order_scheme_when_sorting_by_label_then_preorder(
    catalog: Element,
    #[case] scheme: SchemeKind,
) {
    let labeled = LabeledTree::new(&catalog, scheme).unwrap();
    let tree = labeled.tree();
    let preorder: Vec<_> = tree.iter().map(|(id, _)| id).collect();

    let mut sorted = preorder.clone();
    sorted.sort_by(|a, b| labeled.compare(*a, *b).unwrap());

    assert_eq!(sorted, preorder);
}

// ============================================================
// Prime product
// ============================================================

#[test]
fn given_four_node_tree_when_prime_labeling_then_level_multipliers() {
    let labeled = LabeledTree::new(&sample_element(), SchemeKind::PrimeProduct).unwrap();
    let tags = by_tag(labeled.tree());

    let value = |tag: &str| labeled.label(tags[tag]).and_then(LabelValue::as_prime_product);
    // primes = [1, 2, 3]; children of the root are multiplied by primes[0] = 1
    assert_eq!(value("root"), Some(1));
    assert_eq!(value("A"), Some(1));
    assert_eq!(value("B"), Some(1));
    assert_eq!(value("C"), Some(2));
}

#[rstest]
fn given_prime_labels_when_relating_ancestors_then_descendant_divisible(catalog: Element) {
    let labeled = LabeledTree::new(&catalog, SchemeKind::PrimeProduct).unwrap();
    let tree = labeled.tree();
    let ids: Vec<_> = tree.iter().map(|(id, _)| id).collect();

    for &a in &ids {
        for &b in &ids {
            if is_real_ancestor(tree, a, b) {
                assert!(tree.label(a).unwrap().is_ancestor_of(tree.label(b).unwrap()));
            }
        }
    }
}

#[rstest]
fn given_prime_labels_when_comparing_siblings_then_labels_collide(catalog: Element) {
    let labeled = LabeledTree::new(&catalog, SchemeKind::PrimeProduct).unwrap();
    let tree = labeled.tree();
    let root = tree.root().unwrap();
    let children: Vec<_> = tree.children(root).collect();

    let first = tree.label(children[0]).unwrap();
    for &sibling in &children[1..] {
        assert_eq!(tree.label(sibling), Some(first));
    }
}

#[test]
fn given_prime_tree_when_inserting_deeper_subtree_then_table_extends_and_rest_unchanged() {
    let mut labeled = LabeledTree::new(&sample_element(), SchemeKind::PrimeProduct).unwrap();
    let before = labels(labeled.tree());
    let c = by_tag(labeled.tree())["C"];

    // C sits at level 2 with label 2; primes grow to [1, 2, 3, 5]
    let e = labeled
        .insert(c, &Element::new("E").with_child(Element::new("F")))
        .unwrap();

    assert_eq!(labeled.label(e), Some(&LabelValue::PrimeProduct(6)));
    let f = labeled.tree().children(e).next().unwrap();
    assert_eq!(labeled.label(f), Some(&LabelValue::PrimeProduct(30)));
    let after = labels(labeled.tree());
    for (id, label) in &before {
        assert_eq!(after.get(id), Some(label));
    }
}

#[test]
fn given_prime_insertion_when_labeling_then_root_is_parent_times_level_prime() {
    let mut labeled = LabeledTree::new(&sample_element(), SchemeKind::PrimeProduct).unwrap();
    let b = by_tag(labeled.tree())["B"];

    let d = labeled.insert(b, &Element::new("D")).unwrap();

    // B: label 1 at level 1, primes[1] = 2
    assert_eq!(labeled.label(d), Some(&LabelValue::PrimeProduct(2)));
}

#[rstest]
#[case(27, true)]
#[case(28, false)]
fn given_chain_when_prime_labeling_then_overflow_past_u128(#[case] depth: usize, #[case] fits: bool) {
    let result = LabeledTree::new(&chain_element(depth), SchemeKind::PrimeProduct);

    match fits {
        true => assert!(result.is_ok()),
        false => assert!(matches!(
            result,
            Err(ApplicationError::Domain(DomainError::Overflow { .. }))
        )),
    }
}

#[test]
fn given_overflowing_insertion_when_inserting_then_tree_unchanged() {
    let mut labeled = LabeledTree::new(&chain_element(26), SchemeKind::PrimeProduct).unwrap();
    let before = labels(labeled.tree());
    let deepest = labeled.tree().iter().last().map(|(id, _)| id).unwrap();

    let result = labeled.insert(deepest, &chain_element(1));

    assert!(matches!(
        result,
        Err(ApplicationError::Domain(DomainError::Overflow { .. }))
    ));
    assert_eq!(labeled.tree().len(), 27);
    assert_eq!(labeled.tree().depth(), 26);
    assert_eq!(labels(labeled.tree()), before);
    assert_eq!(labeled.tree().children(deepest).count(), 0);
}

// ============================================================
// Region
// ============================================================

/// Four-node scenario `root -> [A, B]`, `A -> [C]`: ordinals 1..4 in preorder.
/// A and C close at 3 rather than 2: C has ordinal 3, so an interval of A
/// ending at 2 could not contain it.
#[test]
fn given_four_node_tree_when_region_labeling_then_preorder_intervals() {
    let labeled = LabeledTree::new(&sample_element(), SchemeKind::Region).unwrap();
    let tags = by_tag(labeled.tree());

    let region = |tag: &str| labeled.label(tags[tag]).and_then(LabelValue::as_region).unwrap();
    let ordinals: Vec<_> = ["root", "A", "C", "B"].iter().map(|t| region(t).ordinal).collect();
    assert_eq!(ordinals, [1, 2, 3, 4]);
    assert_eq!(region("root").closing, 4);
    assert_eq!(region("A").closing, 3);
    assert_eq!(region("C").closing, 3);
    assert_eq!(region("B").closing, 4);
    assert_eq!(region("C").level, 2);
}

#[rstest]
fn given_region_labels_when_relating_all_pairs_then_interval_law_holds(catalog: Element) {
    let labeled = LabeledTree::new(&catalog, SchemeKind::Region).unwrap();
    let tree = labeled.tree();
    let ids: Vec<_> = tree.iter().map(|(id, _)| id).collect();

    for &a in &ids {
        for &b in &ids {
            let (la, lb) = (tree.label(a).unwrap(), tree.label(b).unwrap());
            assert_eq!(la.is_ancestor_of(lb), is_real_ancestor(tree, a, b), "{la} vs {lb}");
        }
    }
    let firsts = ids
        .iter()
        .filter(|&&id| tree.label(id).and_then(LabelValue::as_region).unwrap().ordinal == 1)
        .count();
    assert_eq!(firsts, 1);
}

#[rstest]
fn given_region_tree_when_inserting_in_middle_then_ordinals_contiguous_preorder(catalog: Element) {
    let mut labeled = LabeledTree::new(&catalog, SchemeKind::Region).unwrap();
    let first_dataset = labeled.find("datasets/dataset")[0];

    labeled.insert(first_dataset, &new_dataset()).unwrap();

    let tree = labeled.tree();
    let ordinals: Vec<_> = tree
        .iter()
        .map(|(_, node)| node.label().and_then(LabelValue::as_region).unwrap().ordinal)
        .collect();
    assert_eq!(ordinals, (1..=tree.len()).collect::<Vec<_>>());
    let root = tree.root().unwrap();
    assert_eq!(
        tree.label(root).and_then(LabelValue::as_region).unwrap().closing,
        tree.len()
    );
}

// ============================================================
// Shared behavior
// ============================================================

#[rstest]
#[case(SchemeKind::PathVector)]
#[case(SchemeKind::PrimeProduct)]
#[case(SchemeKind::Region)]
fn given_deep_chain_when_labeling_then_no_stack_exhaustion(#[case] scheme: SchemeKind) {
    // Prime products overflow long before this depth; the others must cope
    let result = LabeledTree::new(&chain_element(2_000), scheme);
    match scheme {
        SchemeKind::PrimeProduct => assert!(result.is_err()),
        _ => assert_eq!(result.unwrap().tree().depth(), 2_000),
    }
}

#[test]
fn given_chain_at_default_depth_limit_when_labeling_and_exporting_then_completes() {
    let depth = TreeBuilder::DEFAULT_MAX_DEPTH;
    let labeled = LabeledTree::new(&chain_element(depth), SchemeKind::Region).unwrap();
    assert_eq!(labeled.tree().depth(), depth);

    let exported = export_element(labeled.tree(), "label").unwrap();

    assert_eq!(exported.size(), depth + 1);
    assert_eq!(exported.attribute("label"), Some(format!("[0,1,{}]", depth + 1).as_str()));
    drop(exported);
    drop(labeled);
}

#[rstest]
#[case(SchemeKind::PathVector)]
#[case(SchemeKind::PrimeProduct)]
#[case(SchemeKind::Region)]
fn given_any_scheme_when_inserting_then_every_node_labeled(
    catalog: Element,
    #[case] scheme: SchemeKind,
) {
    let mut labeled = LabeledTree::new(&catalog, scheme).unwrap();
    let root = labeled.root().unwrap();

    let inserted = labeled.insert(root, &new_dataset()).unwrap();

    assert_eq!(labeled.tree().parent(inserted), Some(root));
    assert_eq!(labeled.tree().children(root).last(), Some(inserted));
    assert!(labeled.tree().iter().all(|(_, node)| node.label().is_some()));
    assert_eq!(labeled.tree().labeled_by(), Some(scheme));
}

#[rstest]
#[case(SchemeKind::PathVector)]
#[case(SchemeKind::Region)]
fn given_malformed_subtree_when_inserting_then_no_mutation(#[case] scheme: SchemeKind) {
    let mut labeled = LabeledTree::new(&sample_element(), scheme).unwrap();
    let before = labels(labeled.tree());
    let root = labeled.root().unwrap();

    let result = labeled.insert(root, &Element::new("ok").with_child(Element::new("")));

    assert!(matches!(
        result,
        Err(ApplicationError::Domain(DomainError::Structural(_)))
    ));
    assert_eq!(labels(labeled.tree()), before);
    assert_eq!(labeled.tree().len(), 4);
}

#[test]
fn given_labeled_tree_when_relabeling_then_labels_stable() {
    let mut labeled = LabeledTree::new(&sample_element(), SchemeKind::Region).unwrap();
    let before = labels(labeled.tree());

    labeled.relabel().unwrap();

    assert_eq!(labels(labeled.tree()), before);
}

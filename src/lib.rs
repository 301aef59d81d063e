//! Structural labeling of ordered trees.
//!
//! A tree is built once from external elements, labeled by one of three
//! schemes, and can then answer ancestor and document-order questions from
//! two labels alone:
//!
//! - path-vector: Dewey-style positions, `[1, 2]`
//! - prime-product: products of per-level primes, `6`
//! - region: `[level,ordinal,closing]` preorder intervals
//!
//! Layers follow the usual split: `domain` (tree, labels, queries; no I/O),
//! `application` (labeling service, export, documents), `config`, `cli`.

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod util;

pub use application::LabeledTree;
pub use domain::{Element, LabelValue, NodeId, SchemeKind};

//! Domain layer: tree model, labels and queries
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod arena;
pub mod builder;
pub mod element;
pub mod error;
pub mod label;
pub mod query;
pub mod scheme;

pub use arena::{NodeData, NodeId, TreeArena, TreeNode};
pub use builder::TreeBuilder;
pub use element::Element;
pub use error::{DomainError, DomainResult};
pub use label::{LabelValue, RegionLabel};
pub use query::{PathQuery, Segment};
pub use scheme::{
    LabelScheme, PathVectorLabeler, PrimeProductLabeler, PrimeTable, RegionLabeler, SchemeKind,
};

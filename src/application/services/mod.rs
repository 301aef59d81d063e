//! Application services
//!
//! Concrete service implementations that orchestrate domain logic.

mod labeling;

pub use labeling::LabeledTree;

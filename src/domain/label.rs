//! Label values produced by the label schemes.
//!
//! All three shapes are consumed through one contract: [`LabelValue::is_ancestor_of`],
//! [`LabelValue::compare`] and `Display`. Labels from different schemes never
//! relate to each other.

use std::cmp::Ordering;
use std::fmt;

use itertools::Itertools;

use crate::domain::scheme::SchemeKind;

/// Interval label assigned by the region scheme.
///
/// `[ordinal, closing]` covers exactly the preorder ordinals of the subtree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RegionLabel {
    pub level: usize,
    pub ordinal: usize,
    pub closing: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LabelValue {
    /// 1-indexed child positions from the root; the root is empty.
    PathVector(Vec<u32>),
    /// Product of the per-level multipliers along the root path.
    PrimeProduct(u128),
    Region(RegionLabel),
}

impl LabelValue {
    pub fn scheme(&self) -> SchemeKind {
        match self {
            LabelValue::PathVector(_) => SchemeKind::PathVector,
            LabelValue::PrimeProduct(_) => SchemeKind::PrimeProduct,
            LabelValue::Region(_) => SchemeKind::Region,
        }
    }

    /// Decides whether the node carrying `self` contains the node carrying `other`.
    ///
    /// Prime-product labels apply plain divisibility: the test is reflexive and
    /// cannot tell siblings apart, since siblings share a label.
    pub fn is_ancestor_of(&self, other: &LabelValue) -> bool {
        match (self, other) {
            (LabelValue::PathVector(a), LabelValue::PathVector(b)) => {
                a.len() < b.len() && b.starts_with(a)
            }
            (LabelValue::PrimeProduct(a), LabelValue::PrimeProduct(b)) => *a != 0 && b % a == 0,
            (LabelValue::Region(a), LabelValue::Region(b)) => {
                a.ordinal <= b.ordinal && b.ordinal <= a.closing && a.level < b.level
            }
            _ => false,
        }
    }

    /// Document order between two labels of the same scheme.
    ///
    /// Returns `None` for labels of different schemes, and for prime-product
    /// labels where neither divides the other (that scheme has no total order).
    pub fn compare(&self, other: &LabelValue) -> Option<Ordering> {
        match (self, other) {
            (LabelValue::PathVector(a), LabelValue::PathVector(b)) => Some(a.cmp(b)),
            (LabelValue::Region(a), LabelValue::Region(b)) => Some(a.ordinal.cmp(&b.ordinal)),
            (LabelValue::PrimeProduct(a), LabelValue::PrimeProduct(b)) => {
                if a == b {
                    Some(Ordering::Equal)
                } else if *a != 0 && b % a == 0 {
                    Some(Ordering::Less)
                } else if *b != 0 && a % b == 0 {
                    Some(Ordering::Greater)
                } else {
                    None
                }
            }
            _ => None,
        }
    }

    pub fn as_path_vector(&self) -> Option<&[u32]> {
        match self {
            LabelValue::PathVector(path) => Some(path),
            _ => None,
        }
    }

    pub fn as_prime_product(&self) -> Option<u128> {
        match self {
            LabelValue::PrimeProduct(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_region(&self) -> Option<RegionLabel> {
        match self {
            LabelValue::Region(region) => Some(*region),
            _ => None,
        }
    }
}

impl fmt::Display for RegionLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{},{},{}]", self.level, self.ordinal, self.closing)
    }
}

impl fmt::Display for LabelValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LabelValue::PathVector(path) => write!(f, "[{}]", path.iter().join(", ")),
            LabelValue::PrimeProduct(value) => write!(f, "{}", value),
            LabelValue::Region(region) => write!(f, "{}", region),
        }
    }
}

//! Wire labels and ordered wire collections.
//!
//! Wires address the subsystems an observable or measurement acts on. The
//! order of a [`Wires`] value is significant: when it is used as a *wire
//! order* for a state or a block of samples, its first wire is the most
//! significant bit of every computational-basis index.

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{MeasureError, MeasureResult};

/// A single wire label: either an integer index or a name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WireLabel {
    /// Integer-labelled wire.
    Int(i64),
    /// Named wire.
    Name(String),
}

impl fmt::Display for WireLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WireLabel::Int(i) => write!(f, "{i}"),
            WireLabel::Name(name) => write!(f, "'{name}'"),
        }
    }
}

impl From<i64> for WireLabel {
    fn from(i: i64) -> Self {
        WireLabel::Int(i)
    }
}

impl From<i32> for WireLabel {
    fn from(i: i32) -> Self {
        WireLabel::Int(i64::from(i))
    }
}

impl From<u32> for WireLabel {
    fn from(i: u32) -> Self {
        WireLabel::Int(i64::from(i))
    }
}

impl From<usize> for WireLabel {
    fn from(i: usize) -> Self {
        WireLabel::Int(i64::try_from(i).unwrap_or(i64::MAX))
    }
}

impl From<&str> for WireLabel {
    fn from(name: &str) -> Self {
        WireLabel::Name(name.to_string())
    }
}

impl From<String> for WireLabel {
    fn from(name: String) -> Self {
        WireLabel::Name(name)
    }
}

/// An ordered collection of unique wire labels.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Wires {
    labels: Vec<WireLabel>,
}

impl Wires {
    /// Create a wire collection, rejecting duplicate labels.
    pub fn new<L: Into<WireLabel>>(labels: impl IntoIterator<Item = L>) -> MeasureResult<Self> {
        let labels: Vec<WireLabel> = labels.into_iter().map(Into::into).collect();
        let mut seen = FxHashSet::default();
        for label in &labels {
            if !seen.insert(label) {
                return Err(MeasureError::DuplicateWire {
                    wire: label.to_string(),
                });
            }
        }
        Ok(Self { labels })
    }

    /// Wires `0..n`.
    pub fn range(n: usize) -> Self {
        Self {
            labels: (0..n).map(WireLabel::from).collect(),
        }
    }

    /// A single wire.
    pub fn single(label: impl Into<WireLabel>) -> Self {
        Self {
            labels: vec![label.into()],
        }
    }

    /// Number of wires.
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// True if there are no wires.
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// The labels in order.
    pub fn labels(&self) -> &[WireLabel] {
        &self.labels
    }

    /// Iterate over the labels in order.
    pub fn iter(&self) -> std::slice::Iter<'_, WireLabel> {
        self.labels.iter()
    }

    /// True if `label` is one of these wires.
    pub fn contains(&self, label: &WireLabel) -> bool {
        self.labels.contains(label)
    }

    /// Position of `label` within these wires.
    pub fn index_of(&self, label: &WireLabel) -> Option<usize> {
        self.labels.iter().position(|l| l == label)
    }

    /// Map every wire to its position within `wire_order`.
    pub fn indices_in(&self, wire_order: &Wires) -> MeasureResult<Vec<usize>> {
        self.labels
            .iter()
            .map(|label| {
                wire_order
                    .index_of(label)
                    .ok_or_else(|| MeasureError::WireNotFound {
                        wire: label.to_string(),
                    })
            })
            .collect()
    }
}

impl fmt::Display for Wires {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.labels.iter().map(ToString::to_string).collect();
        write!(f, "[{}]", parts.join(", "))
    }
}

impl<'a> IntoIterator for &'a Wires {
    type Item = &'a WireLabel;
    type IntoIter = std::slice::Iter<'a, WireLabel>;

    fn into_iter(self) -> Self::IntoIter {
        self.labels.iter()
    }
}

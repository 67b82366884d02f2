//! Layered layout options.
//!
//! Layout options are a flat string-to-string mapping handed to the layout
//! engine. They are assembled from several layers in increasing precedence
//! (global defaults, the diagram's own overrides, responsive overrides) with
//! [`merge_layers`]: a key present in a later layer always wins.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Well-known option keys understood by the built-in engines.
pub mod keys {
    /// Selects the engine, e.g. `"mrtree"` or `"layered"`.
    pub const ALGORITHM: &str = "algorithm";
    /// Main flow direction: `DOWN`, `UP`, `RIGHT` or `LEFT`.
    pub const DIRECTION: &str = "direction";
    /// Gap between neighbouring nodes.
    pub const SPACING_NODE_NODE: &str = "spacing.nodeNode";
    /// Gap between consecutive layers (edges and nodes).
    pub const SPACING_EDGE_NODE: &str = "spacing.edgeNode";
}

/// An ordered option mapping.
///
/// Insertion order is preserved so that logged and exported options read in
/// the order they were declared.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LayoutOptions(IndexMap<String, String>);

impl LayoutOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `key` to `value` (builder style).
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    /// Sets `key` to `value`, replacing any previous value in place.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Overlays `other` onto `self`; keys in `other` win.
    pub fn extend_from(&mut self, other: &LayoutOptions) {
        for (key, value) in other.iter() {
            self.insert(key, value);
        }
    }
}

impl<K, V> FromIterator<(K, V)> for LayoutOptions
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl fmt::Display for LayoutOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (idx, (key, value)) in self.iter().enumerate() {
            if idx > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{key}: {value}")?;
        }
        write!(f, "}}")
    }
}

/// Folds option layers left to right; later layers override earlier keys.
///
/// # Examples
///
/// ```
/// # use drilldown_core::options::{LayoutOptions, merge_layers};
/// let global: LayoutOptions = [("a", "1"), ("b", "2")].into_iter().collect();
/// let diagram: LayoutOptions = [("b", "3"), ("c", "4")].into_iter().collect();
/// let responsive: LayoutOptions = [("b", "5")].into_iter().collect();
///
/// let merged = merge_layers([&global, &diagram, &responsive]);
/// assert_eq!(merged.get("a"), Some("1"));
/// assert_eq!(merged.get("b"), Some("5"));
/// assert_eq!(merged.get("c"), Some("4"));
/// ```
pub fn merge_layers<'a>(layers: impl IntoIterator<Item = &'a LayoutOptions>) -> LayoutOptions {
    layers
        .into_iter()
        .fold(LayoutOptions::new(), |mut merged, layer| {
            merged.extend_from(layer);
            merged
        })
}


#[cfg(test)]
mod proptest_tests {
    use proptest::prelude::*;

    use super::*;

    fn layer_strategy() -> impl Strategy<Value = LayoutOptions> {
        prop::collection::vec(("[a-e]", "[0-9]{1,2}"), 0..6)
            .prop_map(|pairs| pairs.into_iter().collect::<LayoutOptions>())
    }

    proptest! {
        /// Every key of the merge comes from some layer, and its value is the
        /// value of the last layer that defines it.
        #[test]
        fn merge_takes_value_from_last_defining_layer(
            layers in prop::collection::vec(layer_strategy(), 0..5)
        ) {
            let merged = merge_layers(&layers);

            for (key, value) in merged.iter() {
                let expected = layers.iter().rev().find_map(|layer| layer.get(key));
                prop_assert_eq!(Some(value), expected);
            }
            for layer in &layers {
                for (key, _) in layer.iter() {
                    prop_assert!(merged.get(key).is_some());
                }
            }
        }

        /// Merging is associative over adjacent groupings.
        #[test]
        fn merge_is_associative(
            a in layer_strategy(),
            b in layer_strategy(),
            c in layer_strategy(),
        ) {
            let left = merge_layers([&merge_layers([&a, &b]), &c]);
            let right = merge_layers([&a, &merge_layers([&b, &c])]);
            prop_assert_eq!(left.len(), right.len());
            for (key, value) in left.iter() {
                prop_assert_eq!(right.get(key), Some(value));
            }
        }
    }
}

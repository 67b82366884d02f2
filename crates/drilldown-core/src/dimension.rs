//! Style-class to node size lookup.
//!
//! Layout engines need explicit node sizes before they can place anything. A
//! [`DimensionTable`] maps style-class tokens to fixed sizes. Lookup is by
//! substring containment in table order: the first key contained anywhere in
//! the node's class string wins, so `"foo komponenten-node bar"` resolves to
//! the `komponenten-node` entry. Nodes matching no key get the default size.

use indexmap::IndexMap;
use serde::Deserialize;

use crate::geometry::Size;

/// Width used when no table entry matches.
pub const DEFAULT_NODE_WIDTH: f32 = 150.0;

/// Height used when no table entry matches.
pub const DEFAULT_NODE_HEIGHT: f32 = 50.0;

/// Ordered mapping from style-class token to node size, with a fallback.
///
/// Deserializes from:
///
/// ```toml
/// default = { width = 150, height = 50 }
///
/// [classes]
/// "circle-node" = { width = 120, height = 120 }
/// "mix-node" = { width = 150, height = 60 }
/// ```
///
/// The order of `classes` is the match order.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DimensionTable {
    #[serde(default = "default_size")]
    default: Size,

    #[serde(default)]
    classes: IndexMap<String, Size>,
}

fn default_size() -> Size {
    Size::new(DEFAULT_NODE_WIDTH, DEFAULT_NODE_HEIGHT)
}

impl DimensionTable {
    /// Creates an empty table that resolves everything to `default`.
    pub fn new(default: Size) -> Self {
        Self {
            default,
            classes: IndexMap::new(),
        }
    }

    /// Appends an entry (builder style). Re-adding a key keeps its original
    /// match position and replaces the size.
    pub fn with_entry(mut self, class: impl Into<String>, size: Size) -> Self {
        self.classes.insert(class.into(), size);
        self
    }

    /// The fallback size.
    pub fn default_size(&self) -> Size {
        self.default
    }

    pub fn entries(&self) -> impl Iterator<Item = (&str, Size)> {
        self.classes.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Resolves the size for a node's style-class string.
    ///
    /// # Examples
    ///
    /// ```
    /// # use drilldown_core::dimension::DimensionTable;
    /// let table = DimensionTable::default();
    ///
    /// let size = table.resolve(Some("foo komponenten-node bar"));
    /// assert_eq!(size.width(), 470.0);
    ///
    /// let size = table.resolve(Some("unknown"));
    /// assert_eq!(size, table.default_size());
    /// ```
    pub fn resolve(&self, style_class: Option<&str>) -> Size {
        let Some(style_class) = style_class else {
            return self.default;
        };

        self.classes
            .iter()
            .find(|(key, _)| style_class.contains(key.as_str()))
            .map(|(_, size)| *size)
            .unwrap_or(self.default)
    }
}

impl Default for DimensionTable {
    /// The stock table for the bundled node classes.
    fn default() -> Self {
        Self::new(default_size())
            .with_entry("circle-node", Size::new(120.0, 120.0))
            .with_entry("produkte-node", Size::new(200.0, 80.0))
            .with_entry("komponenten-node", Size::new(470.0, 100.0))
            .with_entry("mix-node", Size::new(150.0, 60.0))
            .with_entry("prozessketten-node", Size::new(280.0, 70.0))
            .with_entry("versorgungsaufgaben-node", Size::new(470.0, 110.0))
            .with_entry("versorgungskonzepte-node", Size::new(400.0, 80.0))
    }
}

#[cfg(test)]
mod tests {
    use float_cmp::assert_approx_eq;

    use super::*;

    #[test]
    fn test_substring_match() {
        let table = DimensionTable::default();
        let size = table.resolve(Some("foo komponenten-node bar"));
        assert_approx_eq!(f32, size.width(), 470.0);
        assert_approx_eq!(f32, size.height(), 100.0);
    }

    #[test]
    fn test_no_match_uses_default() {
        let table = DimensionTable::default();
        assert_eq!(table.resolve(Some("tech-item-node")), table.default_size());
        assert_eq!(table.resolve(Some("")), table.default_size());
        assert_eq!(table.resolve(None), table.default_size());
    }

    #[test]
    fn test_first_entry_in_table_order_wins() {
        let table = DimensionTable::new(Size::new(1.0, 1.0))
            .with_entry("node", Size::new(10.0, 10.0))
            .with_entry("special-node", Size::new(20.0, 20.0));

        // Both keys are contained; the earlier entry wins regardless of
        // which one is the better match.
        let size = table.resolve(Some("special-node"));
        assert_approx_eq!(f32, size.width(), 10.0);
    }

    #[test]
    fn test_match_is_containment_not_token_equality() {
        let table = DimensionTable::default();
        let size = table.resolve(Some("xcircle-nodex"));
        assert_approx_eq!(f32, size.width(), 120.0);
    }

    #[test]
    fn test_deserialize_keeps_declared_order() {
        let source = r#"
            default = { width = 10, height = 5 }

            [classes]
            "b-node" = { width = 2, height = 2 }
            "a-node" = { width = 1, height = 1 }
        "#;
        let table: DimensionTable = toml::from_str(source).unwrap();

        let keys: Vec<_> = table.entries().map(|(k, _)| k).collect();
        assert_eq!(keys, ["b-node", "a-node"]);
        assert_approx_eq!(f32, table.default_size().width(), 10.0);
    }

    #[test]
    fn test_deserialize_missing_default() {
        let table: DimensionTable = toml::from_str("").unwrap();
        assert_approx_eq!(f32, table.default_size().width(), DEFAULT_NODE_WIDTH);
        assert_approx_eq!(f32, table.default_size().height(), DEFAULT_NODE_HEIGHT);
        assert_eq!(table.entries().count(), 0);
    }
}

//! TOML diagram catalogs.
//!
//! A catalog declares the diagrams an application starts with. Literal
//! diagrams are listed under `[[diagram]]`, declarative trees under `[[tree]]`:
//!
//! ```toml
//! [[diagram]]
//! id = "komponenten"
//! layout_options = { direction = "RIGHT" }
//!
//! [[diagram.nodes]]
//! id = "k-hws"
//! class = "komponenten-node"
//! data = { label = "Heißwasserspeicher" }
//!
//! [[tree]]
//! id = "versorgungskonzepte"
//! prefix = "vsk-tree"
//!
//! [tree.root]
//! class = "tech-logo-node"
//! data = { label = "TECH4BIOWASTE" }
//! ```
//!
//! All `[[diagram]]` entries are registered before any `[[tree]]` entry, each
//! group in file order.

use std::ops::Range;

use log::{debug, info};
use serde::Deserialize;
use thiserror::Error;

use drilldown_core::{
    diagram::{DiagramDefinition, TreeNodeConfig},
    options::LayoutOptions,
};

use crate::{
    factory::{TreeFactoryOptions, create_tree_diagram},
    registry::{DiagramRegistry, Registration, RegistryError},
};

/// Errors raised while loading a catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("{}", err.message())]
    Parse { err: toml::de::Error, src: String },

    #[error("catalog entry `{id}` was rejected: {source}")]
    Registry {
        id: String,
        #[source]
        source: RegistryError,
    },
}

impl CatalogError {
    /// Create a new `Parse` error with the associated catalog source.
    pub fn new_parse_error(err: toml::de::Error, src: impl Into<String>) -> Self {
        Self::Parse {
            err,
            src: src.into(),
        }
    }

    /// Byte range of the offending catalog text, when known.
    pub fn span(&self) -> Option<Range<usize>> {
        match self {
            Self::Parse { err, .. } => err.span(),
            Self::Registry { .. } => None,
        }
    }
}

/// A `[[diagram]]` entry.
#[derive(Debug, Clone, Deserialize)]
pub struct DiagramEntry {
    id: String,
    #[serde(flatten)]
    definition: DiagramDefinition,
}

impl DiagramEntry {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn definition(&self) -> &DiagramDefinition {
        &self.definition
    }
}

/// A `[[tree]]` entry.
#[derive(Debug, Clone, Deserialize)]
pub struct TreeEntry {
    id: String,
    root: TreeNodeConfig,
    #[serde(default)]
    prefix: Option<String>,
    #[serde(default)]
    default_class: Option<String>,
    #[serde(default)]
    default_kind: Option<String>,
    #[serde(default)]
    layout_options: Option<LayoutOptions>,
}

impl TreeEntry {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn root(&self) -> &TreeNodeConfig {
        &self.root
    }

    /// Factory options with this entry's overrides applied.
    pub fn factory_options(&self) -> TreeFactoryOptions {
        let mut options = TreeFactoryOptions::default();
        if let Some(prefix) = &self.prefix {
            options = options.with_node_id_prefix(prefix.as_str());
        }
        if let Some(class) = &self.default_class {
            options = options.with_default_style_class(class.as_str());
        }
        if let Some(kind) = &self.default_kind {
            options = options.with_default_kind(kind.as_str());
        }
        if let Some(layout_options) = &self.layout_options {
            options = options.with_layout_options(layout_options.clone());
        }
        options
    }
}

/// A parsed catalog.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Catalog {
    #[serde(default, rename = "diagram")]
    diagrams: Vec<DiagramEntry>,

    #[serde(default, rename = "tree")]
    trees: Vec<TreeEntry>,
}

impl Catalog {
    /// Parses catalog text.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Parse`] for malformed TOML or entries missing
    /// required fields.
    pub fn parse(source: &str) -> Result<Self, CatalogError> {
        let catalog: Self =
            toml::from_str(source).map_err(|err| CatalogError::new_parse_error(err, source))?;
        debug!(
            diagrams = catalog.diagrams.len(),
            trees = catalog.trees.len();
            "Catalog parsed"
        );
        Ok(catalog)
    }

    pub fn diagrams(&self) -> &[DiagramEntry] {
        &self.diagrams
    }

    pub fn trees(&self) -> &[TreeEntry] {
        &self.trees
    }

    /// Registers every entry and returns how many were newly stored.
    ///
    /// Literal diagrams go through [`DiagramRegistry::register_if_absent`], so
    /// an id that is already present is skipped without building anything.
    /// Trees are flattened and registered by the tree factory.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Registry`] for the first entry the registry
    /// rejects. Entries before it stay registered.
    pub fn register_into(&self, registry: &mut DiagramRegistry) -> Result<usize, CatalogError> {
        let mut stored = 0;

        for entry in &self.diagrams {
            let outcome = registry.register_if_absent(&entry.id, |registry| {
                registry.register(entry.id.as_str(), entry.definition.clone())
            });
            match outcome {
                Some(Ok(Registration::Stored)) => stored += 1,
                Some(Ok(Registration::AlreadyRegistered)) | None => {}
                Some(Err(source)) => {
                    return Err(CatalogError::Registry {
                        id: entry.id.clone(),
                        source,
                    });
                }
            }
        }

        for entry in &self.trees {
            let registration =
                create_tree_diagram(registry, &entry.id, &entry.root, &entry.factory_options())
                    .map_err(|source| CatalogError::Registry {
                        id: entry.id.clone(),
                        source,
                    })?;
            if registration == Registration::Stored {
                stored += 1;
            }
        }

        info!(stored, total = registry.len(); "Catalog registered");
        Ok(stored)
    }
}

/// Parses `source` and registers its entries into `registry`.
///
/// # Errors
///
/// See [`Catalog::parse`] and [`Catalog::register_into`].
pub fn load_catalog(source: &str, registry: &mut DiagramRegistry) -> Result<usize, CatalogError> {
    Catalog::parse(source)?.register_into(registry)
}

#[cfg(test)]
mod tests {
    use super::*;

    const CATALOG: &str = r#"
[[diagram]]
id = "root"

[[diagram.nodes]]
id = "komponenten"
class = "komponenten-node"
data = { label = "Komponenten" }

[[diagram.nodes]]
id = "versorgungskonzepte"
class = "versorgungskonzepte-node"
data = { label = "Versorgungskonzepte" }

[[diagram.edges]]
id = "root-e1"
source = "komponenten"
target = "versorgungskonzepte"

[[diagram]]
id = "komponenten"
layout_options = { direction = "RIGHT" }

[[diagram.nodes]]
id = "k-hws"
class = "komponenten-node"
data = { label = "HWS", description = "Puffer" }

[[tree]]
id = "versorgungskonzepte"
prefix = "vsk-tree"
default_class = "tech-item-node"

[tree.root]
id = "tech4biowaste-main"
class = "tech-logo-node"
data = { label = "TECH4BIOWASTE" }

[[tree.root.children]]
data = { label = "Feedstocks" }

[[tree.root.children.children]]
data = { label = "Food waste" }
"#;

    #[test]
    fn test_parse_catalog() {
        let catalog = Catalog::parse(CATALOG).unwrap();

        assert_eq!(catalog.diagrams().len(), 2);
        assert_eq!(catalog.trees().len(), 1);
        assert_eq!(catalog.diagrams()[0].definition().edges().len(), 1);
        assert_eq!(
            catalog.diagrams()[1]
                .definition()
                .layout_options()
                .and_then(|options| options.get("direction")),
            Some("RIGHT")
        );
        assert_eq!(catalog.trees()[0].root().node_count(), 3);
    }

    #[test]
    fn test_register_catalog() {
        let mut registry = DiagramRegistry::new();

        let stored = load_catalog(CATALOG, &mut registry).unwrap();

        assert_eq!(stored, 3);
        let ids: Vec<_> = registry.ids().collect();
        assert_eq!(ids, ["root", "komponenten", "versorgungskonzepte"]);

        let tree = registry.lookup("versorgungskonzepte").unwrap();
        let node_ids: Vec<_> = tree.nodes().iter().map(|node| node.id()).collect();
        assert_eq!(node_ids, ["tech4biowaste-main", "vsk-tree-2", "vsk-tree-3"]);
        assert_eq!(tree.nodes()[1].style_class(), Some("tech-item-node"));
    }

    #[test]
    fn test_loading_twice_keeps_first_definitions() {
        let mut registry = DiagramRegistry::new();
        load_catalog(CATALOG, &mut registry).unwrap();

        let stored = load_catalog(CATALOG, &mut registry).unwrap();

        assert_eq!(stored, 0);
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn test_existing_diagram_is_not_rebuilt() {
        let mut registry = DiagramRegistry::new();
        registry
            .register("komponenten", DiagramDefinition::default())
            .unwrap();

        load_catalog(CATALOG, &mut registry).unwrap();

        assert!(registry.lookup("komponenten").unwrap().nodes().is_empty());
    }

    #[test]
    fn test_malformed_toml_has_span() {
        let err = Catalog::parse("[[diagram]]\nid = \n").unwrap_err();

        assert!(matches!(err, CatalogError::Parse { .. }));
        assert!(err.span().is_some());
    }

    #[test]
    fn test_missing_label_is_a_parse_error() {
        let source = "[[diagram]]\nid = \"x\"\n[[diagram.nodes]]\nid = \"a\"\ndata = {}\n";
        assert!(matches!(Catalog::parse(source), Err(CatalogError::Parse { .. })));
    }

    #[test]
    fn test_dangling_edge_is_rejected() {
        let source = r#"
[[diagram]]
id = "broken"

[[diagram.nodes]]
id = "a"
data = { label = "A" }

[[diagram.edges]]
id = "e"
source = "a"
target = "missing"
"#;
        let mut registry = DiagramRegistry::new();

        let err = load_catalog(source, &mut registry).unwrap_err();

        assert!(matches!(
            err,
            CatalogError::Registry { ref id, source: RegistryError::DanglingEdge { .. } } if id == "broken"
        ));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_empty_catalog() {
        let mut registry = DiagramRegistry::new();
        assert_eq!(load_catalog("", &mut registry).unwrap(), 0);
    }
}

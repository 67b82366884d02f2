//! The diagram registry.
//!
//! A [`DiagramRegistry`] maps diagram ids to their [`DiagramDefinition`]s. It
//! is populated once during initialization and read many times afterwards:
//!
//! - The first successful registration of an id is permanent. Registering the
//!   same id again logs a warning and leaves the stored definition untouched.
//! - [`DiagramRegistry::register_if_absent`] gates a (possibly expensive)
//!   build step on the presence check, so each id is built at most once no
//!   matter how many initialization paths ask for it.
//! - Lookups of unknown ids return `None`; they never fail.
//!
//! Once initialized the registry is usually frozen behind an `Arc` and shared
//! read-only by the click dispatcher and the layout orchestrator.

use std::collections::HashSet;

use indexmap::IndexMap;
use log::{debug, error, info, warn};
use thiserror::Error;

use drilldown_core::diagram::DiagramDefinition;

/// Id of the diagram shown first, and the fallback for unknown ids.
pub const ROOT_DIAGRAM_ID: &str = "root";

/// Reasons a definition is rejected by [`DiagramRegistry::register`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("diagram id must not be empty")]
    EmptyId,

    #[error("diagram `{diagram}` declares node `{node}` more than once")]
    DuplicateNodeId { diagram: String, node: String },

    #[error("edge `{edge}` of diagram `{diagram}` references unknown node `{node}`")]
    DanglingEdge {
        diagram: String,
        edge: String,
        node: String,
    },
}

/// What [`DiagramRegistry::register`] did with a valid definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Registration {
    /// The definition was stored under the id.
    Stored,
    /// The id was taken; the existing definition was kept.
    AlreadyRegistered,
}

/// Process-lifetime store of diagram definitions, keyed by diagram id.
#[derive(Debug, Default)]
pub struct DiagramRegistry {
    diagrams: IndexMap<String, DiagramDefinition>,
}

impl DiagramRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `definition` under `id`.
    ///
    /// # Errors
    ///
    /// Returns a [`RegistryError`] (after logging it) when the id is empty, a
    /// node id repeats, or an edge references a node that is not part of the
    /// definition. The registry is unchanged in that case.
    ///
    /// An id that is already registered is not an error: a warning is logged,
    /// the first definition is kept and [`Registration::AlreadyRegistered`] is
    /// returned.
    pub fn register(
        &mut self,
        id: impl Into<String>,
        definition: DiagramDefinition,
    ) -> Result<Registration, RegistryError> {
        let id = id.into();

        if let Err(err) = validate(&id, &definition) {
            error!(diagram_id = id, err:%; "Rejected diagram registration");
            return Err(err);
        }

        if self.diagrams.contains_key(&id) {
            warn!(diagram_id = id; "Diagram already registered, keeping the existing definition");
            return Ok(Registration::AlreadyRegistered);
        }

        info!(
            diagram_id = id,
            nodes = definition.nodes().len(),
            edges = definition.edges().len();
            "Diagram registered"
        );
        self.diagrams.insert(id, definition);
        Ok(Registration::Stored)
    }

    /// Runs `build` only if `id` is not registered yet.
    ///
    /// `build` is expected to call [`register`](Self::register) for `id`
    /// itself. Returns `Some` with the closure's result when it ran and `None`
    /// when the id was already present.
    ///
    /// # Examples
    ///
    /// ```
    /// # use drilldown::registry::DiagramRegistry;
    /// # use drilldown_core::diagram::DiagramDefinition;
    /// let mut registry = DiagramRegistry::new();
    /// let mut builds = 0;
    ///
    /// for _ in 0..3 {
    ///     registry.register_if_absent("root", |registry| {
    ///         builds += 1;
    ///         registry.register("root", DiagramDefinition::default())
    ///     });
    /// }
    ///
    /// assert_eq!(builds, 1);
    /// ```
    pub fn register_if_absent<F, T>(&mut self, id: &str, build: F) -> Option<T>
    where
        F: FnOnce(&mut Self) -> T,
    {
        if self.contains(id) {
            debug!(diagram_id = id; "Diagram already registered, skipping build");
            return None;
        }

        debug!(diagram_id = id; "Building diagram");
        Some(build(self))
    }

    /// Returns the definition registered under `id`, if any.
    pub fn lookup(&self, id: &str) -> Option<&DiagramDefinition> {
        self.diagrams.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.diagrams.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.diagrams.len()
    }

    pub fn is_empty(&self) -> bool {
        self.diagrams.is_empty()
    }

    /// Registered ids in registration order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.diagrams.keys().map(String::as_str)
    }

    /// Removes every definition.
    pub fn reset(&mut self) {
        debug!(count = self.diagrams.len(); "Resetting diagram registry");
        self.diagrams.clear();
    }
}

fn validate(id: &str, definition: &DiagramDefinition) -> Result<(), RegistryError> {
    if id.is_empty() {
        return Err(RegistryError::EmptyId);
    }

    let mut node_ids = HashSet::with_capacity(definition.nodes().len());
    for node in definition.nodes() {
        if !node_ids.insert(node.id()) {
            return Err(RegistryError::DuplicateNodeId {
                diagram: id.to_string(),
                node: node.id().to_string(),
            });
        }
    }

    for edge in definition.edges() {
        for endpoint in [edge.source(), edge.target()] {
            if !node_ids.contains(endpoint) {
                return Err(RegistryError::DanglingEdge {
                    diagram: id.to_string(),
                    edge: edge.id().to_string(),
                    node: endpoint.to_string(),
                });
            }
        }
    }

    Ok(())
}


#[cfg(test)]
mod proptest_tests {
    use proptest::prelude::*;

    use drilldown_core::diagram::{NodeData, NodeSpec};

    use super::*;

    fn definition_strategy() -> impl Strategy<Value = DiagramDefinition> {
        prop::collection::hash_set("[a-z]{1,6}", 0..6).prop_map(|ids| {
            let nodes = ids
                .into_iter()
                .map(|id| NodeSpec::new(id.clone(), NodeData::new(id)))
                .collect();
            DiagramDefinition::new(nodes, Vec::new())
        })
    }

    proptest! {
        /// Whatever is registered later under the same id, lookups keep
        /// returning the first definition.
        #[test]
        fn first_registration_wins(
            id in "[a-z]{1,8}",
            first in definition_strategy(),
            later in prop::collection::vec(definition_strategy(), 0..4),
        ) {
            let mut registry = DiagramRegistry::new();
            prop_assert_eq!(registry.register(id.clone(), first.clone()), Ok(Registration::Stored));

            for definition in later {
                prop_assert_eq!(
                    registry.register(id.clone(), definition),
                    Ok(Registration::AlreadyRegistered)
                );
            }

            prop_assert_eq!(registry.lookup(&id), Some(&first));
        }
    }
}

//! Navigation state and node-click dispatch.
//!
//! [`NavigationState`] is the live cursor naming the diagram on display. It
//! starts at [`ROOT_DIAGRAM_ID`] and changes only through
//! [`NavigationState::go_to`], which accepts any id: validation is deferred to
//! the layout orchestrator, whose lookup falls back to the root diagram.
//!
//! Observers (the layout driver) subscribe to a `tokio::sync::watch` channel
//! and wake whenever the current id actually changes.
//!
//! [`NodeClickDispatcher`] turns "node was activated" events into
//! navigation: a node whose id is itself a registered diagram is drilled into,
//! any other node is a leaf and leaves the state alone.

use std::sync::Arc;

use log::{debug, info};
use tokio::sync::watch;

use crate::registry::{DiagramRegistry, ROOT_DIAGRAM_ID};

/// Shared handle to the id of the currently displayed diagram.
///
/// Clones refer to the same state.
#[derive(Debug, Clone)]
pub struct NavigationState {
    sender: Arc<watch::Sender<String>>,
}

impl Default for NavigationState {
    fn default() -> Self {
        Self::starting_at(ROOT_DIAGRAM_ID)
    }
}

impl NavigationState {
    /// Creates a navigation state positioned at the root diagram.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a navigation state positioned at `id`.
    pub fn starting_at(id: impl Into<String>) -> Self {
        let (sender, _) = watch::channel(id.into());
        Self {
            sender: Arc::new(sender),
        }
    }

    /// Returns the id of the current diagram.
    pub fn current(&self) -> String {
        self.sender.borrow().clone()
    }

    /// Makes `id` the current diagram.
    ///
    /// The id is not checked against the registry. Subscribers are only woken
    /// when the id differs from the current one.
    pub fn go_to(&self, id: impl Into<String>) {
        let id = id.into();
        let changed = self.sender.send_if_modified(|current| {
            if *current == id {
                false
            } else {
                *current = id.clone();
                true
            }
        });

        if changed {
            info!(diagram_id = id; "Navigated to diagram");
        } else {
            debug!(diagram_id = id; "Already showing diagram");
        }
    }

    /// Returns to the root diagram.
    pub fn go_to_root(&self) {
        self.go_to(ROOT_DIAGRAM_ID);
    }

    /// Returns a receiver that observes every change of the current id.
    pub fn subscribe(&self) -> watch::Receiver<String> {
        self.sender.subscribe()
    }
}

/// What a node activation resulted in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickOutcome {
    /// The node names a registered diagram, which is now current.
    Navigated,
    /// The node has no diagram of its own; nothing changed.
    Leaf,
}

/// Routes node activations to navigation, gated by registry membership.
#[derive(Debug, Clone)]
pub struct NodeClickDispatcher {
    registry: Arc<DiagramRegistry>,
    navigation: NavigationState,
}

impl NodeClickDispatcher {
    pub fn new(registry: Arc<DiagramRegistry>, navigation: NavigationState) -> Self {
        Self {
            registry,
            navigation,
        }
    }

    /// Handles activation of the node `node_id`.
    pub fn on_node_activated(&self, node_id: &str) -> ClickOutcome {
        if self.registry.lookup(node_id).is_some() {
            self.navigation.go_to(node_id);
            ClickOutcome::Navigated
        } else {
            info!(node_id; "No diagram registered for node");
            ClickOutcome::Leaf
        }
    }
}

#[cfg(test)]
mod tests {
    use drilldown_core::diagram::DiagramDefinition;

    use super::*;

    fn registry_with(ids: &[&str]) -> Arc<DiagramRegistry> {
        let mut registry = DiagramRegistry::new();
        for id in ids {
            registry.register(*id, DiagramDefinition::default()).unwrap();
        }
        Arc::new(registry)
    }

    #[test]
    fn test_starts_at_root() {
        assert_eq!(NavigationState::new().current(), ROOT_DIAGRAM_ID);
    }

    #[test]
    fn test_go_to_is_unvalidated() {
        let navigation = NavigationState::new();
        navigation.go_to("does-not-exist");
        assert_eq!(navigation.current(), "does-not-exist");
    }

    #[test]
    fn test_clones_share_state() {
        let navigation = NavigationState::new();
        let other = navigation.clone();

        other.go_to("komponenten");

        assert_eq!(navigation.current(), "komponenten");
    }

    #[test]
    fn test_go_to_root() {
        let navigation = NavigationState::starting_at("komponenten");
        navigation.go_to_root();
        assert_eq!(navigation.current(), ROOT_DIAGRAM_ID);
    }

    #[test]
    fn test_subscriber_sees_change() {
        let navigation = NavigationState::new();
        let mut receiver = navigation.subscribe();

        navigation.go_to("komponenten");

        assert!(receiver.has_changed().unwrap());
        assert_eq!(*receiver.borrow_and_update(), "komponenten");
    }

    #[test]
    fn test_same_id_does_not_notify() {
        let navigation = NavigationState::new();
        let receiver = navigation.subscribe();

        navigation.go_to(ROOT_DIAGRAM_ID);

        assert!(!receiver.has_changed().unwrap());
    }

    #[test]
    fn test_click_on_registered_node_navigates() {
        let navigation = NavigationState::new();
        let dispatcher = NodeClickDispatcher::new(
            registry_with(&["root", "komponenten"]),
            navigation.clone(),
        );

        let outcome = dispatcher.on_node_activated("komponenten");

        assert_eq!(outcome, ClickOutcome::Navigated);
        assert_eq!(navigation.current(), "komponenten");
    }

    #[test]
    fn test_click_on_unregistered_node_is_leaf() {
        let navigation = NavigationState::new();
        let dispatcher = NodeClickDispatcher::new(registry_with(&["root"]), navigation.clone());

        let outcome = dispatcher.on_node_activated("paramProdukte");

        assert_eq!(outcome, ClickOutcome::Leaf);
        assert_eq!(navigation.current(), ROOT_DIAGRAM_ID);
    }

    #[test]
    fn test_click_on_root_from_subdiagram() {
        let navigation = NavigationState::starting_at("komponenten");
        let dispatcher = NodeClickDispatcher::new(registry_with(&["root"]), navigation.clone());

        assert_eq!(dispatcher.on_node_activated("root"), ClickOutcome::Navigated);
        assert_eq!(navigation.current(), ROOT_DIAGRAM_ID);
    }
}

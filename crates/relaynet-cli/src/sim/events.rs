//! Listener that logs link changes and connectivity transitions.

use std::collections::HashMap;

use relaynet_core::{Link, NetworkListener, NodeId, Route};
use serde::Serialize;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct EventCounts {
    pub links_added: usize,
    pub links_removed: usize,
    pub route_updates: usize,
    pub connections_gained: usize,
    pub connections_lost: usize,
}

/// Tracks which nodes currently have a route and logs when that changes.
#[derive(Debug, Default)]
pub struct ConnectivityLog {
    names: HashMap<NodeId, String>,
    connected: HashMap<NodeId, bool>,
    counts: EventCounts,
}

impl ConnectivityLog {
    pub fn new(names: HashMap<NodeId, String>) -> Self {
        Self {
            names,
            ..Self::default()
        }
    }

    pub fn counts(&self) -> EventCounts {
        self.counts
    }

    pub fn is_connected(&self, node: NodeId) -> bool {
        self.connected.get(&node).copied().unwrap_or(false)
    }

    fn label(&self, node: NodeId) -> String {
        match self.names.get(&node) {
            Some(name) => format!("{} ({})", name, node),
            None => node.to_string(),
        }
    }
}

impl NetworkListener for ConnectivityLog {
    fn on_link_added(&mut self, node: NodeId, link: &Link) {
        self.counts.links_added += 1;
        debug!(
            "Link up: {} -> {} [{:?}]",
            self.label(node),
            self.label(link.target),
            link.kind
        );
    }

    fn on_link_removed(&mut self, node: NodeId, link: &Link) {
        self.counts.links_removed += 1;
        debug!("Link down: {} -> {}", self.label(node), self.label(link.target));
    }

    fn on_routes_updated(&mut self, node: NodeId, routes: &[Route]) {
        self.counts.route_updates += 1;
        let now = !routes.is_empty();
        let before = self.connected.insert(node, now).unwrap_or(false);
        if now == before {
            return;
        }

        match routes.first() {
            Some(best) => {
                self.counts.connections_gained += 1;
                info!(
                    "{} connected: {} hop(s) to {}",
                    self.label(node),
                    best.hops.len(),
                    best.goal.map(|hub| self.label(hub)).unwrap_or_default()
                );
            }
            None => {
                self.counts.connections_lost += 1;
                info!("{} lost connection", self.label(node));
            }
        }
    }
}

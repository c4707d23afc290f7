//! Per-node cache of the best known routes to hubs.
//!
//! Entries are replaced wholesale on every refresh, never merged.

use std::collections::HashMap;

use crate::models::{NodeId, Route};

#[derive(Debug, Clone, Default)]
pub struct RouteCache {
    routes: HashMap<NodeId, Vec<Route>>,
}

impl RouteCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the routes of `node`. Routes are stored cheapest first.
    pub fn update(&mut self, node: NodeId, mut routes: Vec<Route>) -> &[Route] {
        routes.sort_by(|a, b| a.cost.total_cmp(&b.cost));
        let entry = self.routes.entry(node).or_default();
        *entry = routes;
        entry.as_slice()
    }

    /// Routes of `node`, cheapest first; empty for unknown nodes.
    pub fn get(&self, node: NodeId) -> &[Route] {
        self.routes.get(&node).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn best(&self, node: NodeId) -> Option<&Route> {
        self.get(node).first()
    }

    pub fn remove(&mut self, node: NodeId) -> Option<Vec<Route>> {
        self.routes.remove(&node)
    }

    /// Drop every cached route of other nodes that passes through `node`.
    ///
    /// Returns the owners whose route list changed, in id order.
    pub fn prune_through(&mut self, node: NodeId) -> Vec<NodeId> {
        let mut affected = Vec::new();
        for (owner, routes) in self.routes.iter_mut() {
            let before = routes.len();
            routes.retain(|route| !route.contains(node));
            if routes.len() != before {
                affected.push(*owner);
            }
        }
        affected.sort();
        affected
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

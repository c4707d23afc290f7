//! Host-owned network context: registration, tick scheduling and queries.
//!
//! Each tick refreshes a bounded, round-robin slice of the registered
//! nodes. For those nodes all link evaluations finish before any route
//! search starts, so a search always sees the freshly rebuilt adjacency of
//! its start node. Other nodes' adjacency may be up to one refresh window
//! old.

use std::collections::{HashMap, HashSet};

use serde::Serialize;
use tracing::{debug, warn};

use crate::config::NetworkConfig;
use crate::error::ConfigError;
use crate::graph::Graph;
use crate::link::LinkContext;
use crate::models::{Link, NodeId, OccludingBody, Route, SatelliteNode};
use crate::pathfinder::{find_hub_routes, SearchSpace};
use crate::route_cache::RouteCache;
use crate::spatial::Vec3;

/// Receives graph and route changes. All methods default to no-ops.
pub trait NetworkListener {
    fn on_link_added(&mut self, _node: NodeId, _link: &Link) {}

    fn on_link_removed(&mut self, _node: NodeId, _link: &Link) {}

    /// Fired after the route list of `node` was replaced or pruned.
    fn on_routes_updated(&mut self, _node: NodeId, _routes: &[Route]) {}
}

/// Listener that ignores every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullListener;

impl NetworkListener for NullListener {}

/// Host state read by one tick. Nothing in it is retained afterwards.
#[derive(Clone, Copy)]
pub struct Snapshot<'a> {
    pub nodes: &'a [&'a dyn SatelliteNode],
    pub bodies: &'a [OccludingBody],
    /// Node the host currently has in focus.
    pub active_vessel: Option<NodeId>,
}

impl<'a> Snapshot<'a> {
    pub fn new(nodes: &'a [&'a dyn SatelliteNode], bodies: &'a [OccludingBody]) -> Self {
        Self {
            nodes,
            bodies,
            active_vessel: None,
        }
    }

    pub fn with_active_vessel(mut self, node: NodeId) -> Self {
        self.active_vessel = Some(node);
        self
    }
}

/// Summary of one refresh pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TickStats {
    /// Tick number the pass ran on.
    pub tick: u64,
    pub refreshed: Vec<NodeId>,
    pub links_added: usize,
    pub links_removed: usize,
    pub hubs: usize,
    /// Refreshed nodes that ended with at least one route.
    pub connected: usize,
}

#[derive(Debug, Clone)]
pub struct Network {
    config: NetworkConfig,
    graph: Graph,
    routes: RouteCache,
    /// Registered nodes in registration order; drives the round-robin.
    nodes: Vec<NodeId>,
    tick: u64,
    cursor: usize,
}

impl Default for Network {
    fn default() -> Self {
        Self::with_valid_config(NetworkConfig::default())
    }
}

impl Network {
    pub fn new(config: NetworkConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::with_valid_config(config))
    }

    fn with_valid_config(config: NetworkConfig) -> Self {
        Self {
            config,
            graph: Graph::new(),
            routes: RouteCache::new(),
            nodes: Vec::new(),
            tick: 0,
            cursor: 0,
        }
    }

    pub fn config(&self) -> &NetworkConfig {
        &self.config
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn route_cache(&self) -> &RouteCache {
        &self.routes
    }

    /// Registered nodes in round-robin order.
    pub fn registered(&self) -> &[NodeId] {
        &self.nodes
    }

    pub fn is_registered(&self, node: NodeId) -> bool {
        self.nodes.contains(&node)
    }

    /// Number of ticks run so far.
    pub fn tick_count(&self) -> u64 {
        self.tick
    }

    /// Start tracking `node`. Returns false if it was already registered.
    ///
    /// Graph and route entries appear on the node's first refresh.
    pub fn register_node(&mut self, node: NodeId) -> bool {
        if self.is_registered(node) {
            return false;
        }
        self.nodes.push(node);
        debug!("Registered node {} ({} total)", node, self.nodes.len());
        true
    }

    /// Forget `node`: its links, links pointing at it, its routes and any
    /// cached route passing through it. Returns false for unknown nodes.
    pub fn unregister_node(&mut self, node: NodeId, listener: &mut dyn NetworkListener) -> bool {
        let Some(index) = self.nodes.iter().position(|n| *n == node) else {
            return false;
        };
        self.nodes.remove(index);
        if index < self.cursor {
            self.cursor -= 1;
        }
        if self.cursor >= self.nodes.len() {
            self.cursor = 0;
        }

        let (own, stripped) = self.graph.remove_node(node);
        for link in &own {
            listener.on_link_removed(node, link);
        }
        for (owner, link) in &stripped {
            listener.on_link_removed(*owner, link);
        }

        self.routes.remove(node);
        for owner in self.routes.prune_through(node) {
            listener.on_routes_updated(owner, self.routes.get(owner));
        }

        debug!(
            "Unregistered node {}: dropped {} link(s)",
            node,
            own.len() + stripped.len()
        );
        true
    }

    /// How many nodes the next tick will refresh.
    ///
    /// `n / window` every tick plus one on the first `n % window` ticks of
    /// each window, so each node is refreshed exactly once per window.
    pub fn refresh_budget(&self) -> usize {
        let count = self.nodes.len();
        let window = self.config.refresh_window.max(1);
        let baseline = count / window;
        let phase = (self.tick % window as u64) as usize;
        baseline + usize::from(phase < count % window)
    }

    /// Run one simulation step: refresh the next slice of nodes, then
    /// search routes from each of them.
    pub fn tick(
        &mut self,
        snapshot: &Snapshot<'_>,
        listener: &mut dyn NetworkListener,
    ) -> TickStats {
        let take = self.refresh_budget();
        let count = self.nodes.len();
        let selected: Vec<NodeId> = (0..take)
            .map(|offset| self.nodes[(self.cursor + offset) % count])
            .collect();
        if count > 0 {
            self.cursor = (self.cursor + take) % count;
        }

        let stats = self.refresh(&selected, snapshot, listener);
        self.tick += 1;
        stats
    }

    /// Refresh every registered node at once, e.g. after the host loads a
    /// scene. Does not advance the tick counter.
    pub fn refresh_all(
        &mut self,
        snapshot: &Snapshot<'_>,
        listener: &mut dyn NetworkListener,
    ) -> TickStats {
        let selected = self.nodes.clone();
        self.refresh(&selected, snapshot, listener)
    }

    fn refresh(
        &mut self,
        selected: &[NodeId],
        snapshot: &Snapshot<'_>,
        listener: &mut dyn NetworkListener,
    ) -> TickStats {
        let mut stats = TickStats {
            tick: self.tick,
            refreshed: selected.to_vec(),
            ..TickStats::default()
        };
        if selected.is_empty() {
            return stats;
        }

        let by_id: HashMap<NodeId, &dyn SatelliteNode> = snapshot
            .nodes
            .iter()
            .map(|node| (node.id(), *node))
            .collect();
        let candidates: Vec<&dyn SatelliteNode> = self
            .nodes
            .iter()
            .filter_map(|id| by_id.get(id).copied())
            .collect();
        if candidates.len() < self.nodes.len() {
            warn!(
                "{} registered node(s) missing from snapshot",
                self.nodes.len() - candidates.len()
            );
        }

        // Links first, for every selected node.
        let ctx = LinkContext::new(snapshot.bodies, snapshot.active_vessel, &self.config);
        for id in selected {
            let diff = match by_id.get(id) {
                Some(node) => self.graph.refresh_node(*node, &candidates, &ctx),
                None => self.graph.replace_links(*id, Vec::new()),
            };
            stats.links_added += diff.added.len();
            stats.links_removed += diff.removed.len();
            for link in &diff.added {
                listener.on_link_added(*id, link);
            }
            for link in &diff.removed {
                listener.on_link_removed(*id, link);
            }
        }

        // Then routes.
        let positions: HashMap<NodeId, Vec3> = candidates
            .iter()
            .map(|node| (node.id(), node.position()))
            .collect();
        let powered: HashSet<NodeId> = candidates
            .iter()
            .filter(|node| node.powered())
            .map(|node| node.id())
            .collect();
        let hubs: Vec<NodeId> = candidates
            .iter()
            .filter(|node| node.powered() && node.is_hub())
            .map(|node| node.id())
            .collect();
        stats.hubs = hubs.len();

        let space = SearchSpace {
            graph: &self.graph,
            positions: &positions,
            powered: &powered,
        };
        for id in selected {
            let found = if hubs.is_empty() {
                Vec::new()
            } else {
                find_hub_routes(*id, &hubs, &space)
            };
            let routes = self.routes.update(*id, found);
            if !routes.is_empty() {
                stats.connected += 1;
            }
            listener.on_routes_updated(*id, routes);
        }

        debug!(
            "Tick {}: refreshed {} node(s), +{} -{} link(s), {} connected",
            stats.tick,
            stats.refreshed.len(),
            stats.links_added,
            stats.links_removed,
            stats.connected
        );
        stats
    }

    /// Routes of `node` to every reachable hub, cheapest first.
    pub fn routes(&self, node: NodeId) -> &[Route] {
        self.routes.get(node)
    }

    pub fn shortest_route(&self, node: NodeId) -> Option<&Route> {
        self.routes.best(node)
    }

    pub fn is_connected(&self, node: NodeId) -> bool {
        self.shortest_route(node).is_some()
    }

    /// One-way delay in seconds along the cheapest route.
    pub fn signal_delay(&self, node: NodeId) -> Option<f64> {
        self.shortest_route(node)
            .map(|route| route.delay(self.config.signal_speed_mps))
    }

    /// Current outgoing links of `node`.
    pub fn links(&self, node: NodeId) -> &[Link] {
        self.graph.links(node)
    }
}

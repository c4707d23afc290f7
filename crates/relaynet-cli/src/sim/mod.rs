//! Simulation harness: moves scenario nodes over time and drives a
//! [`Network`] tick by tick.

pub mod events;
pub mod paths;
pub mod scenarios;

pub use events::{ConnectivityLog, EventCounts};
pub use paths::{CircularOrbit, FixedPoint, OrbitPath, OrbitSpec};
pub use scenarios::{
    constellation, occluded_chain, relay_chain, Scenario, ScenarioError, ScenarioFile, SimVessel,
};

use std::collections::HashMap;

use relaynet_core::{ConfigError, Network, NetworkListener, NodeId, TickStats};
use serde::Serialize;

/// Per-node line of the final report.
#[derive(Debug, Clone, Serialize)]
pub struct NodeReport {
    pub id: NodeId,
    pub name: String,
    pub hub: bool,
    pub links: usize,
    pub connected: bool,
    /// Node names along the best route, start first.
    pub route: Vec<String>,
    pub distance_m: Option<f64>,
    pub delay_s: Option<f64>,
}

pub struct Simulation {
    scenario: Scenario,
    network: Network,
    time_s: f64,
}

impl Simulation {
    /// Place every vessel at t = 0 and register all nodes.
    pub fn new(mut scenario: Scenario) -> Result<Self, ConfigError> {
        let mut network = Network::new(scenario.config.clone())?;
        scenario.advance(0.0);
        for node in scenario.nodes() {
            network.register_node(node.id());
        }
        Ok(Self {
            scenario,
            network,
            time_s: 0.0,
        })
    }

    pub fn scenario(&self) -> &Scenario {
        &self.scenario
    }

    pub fn network(&self) -> &Network {
        &self.network
    }

    pub fn time_s(&self) -> f64 {
        self.time_s
    }

    /// Node names keyed by id, for listeners.
    pub fn names(&self) -> HashMap<NodeId, String> {
        self.scenario
            .nodes()
            .into_iter()
            .map(|node| (node.id(), node.name().to_string()))
            .collect()
    }

    /// Refresh every node at the current positions.
    pub fn warm_up(&mut self, listener: &mut dyn NetworkListener) -> TickStats {
        let nodes = self.scenario.nodes();
        let snapshot = self.scenario.snapshot(&nodes);
        self.network.refresh_all(&snapshot, listener)
    }

    /// Advance time by `dt` seconds and run one network tick.
    pub fn step(&mut self, dt: f64, listener: &mut dyn NetworkListener) -> TickStats {
        self.time_s += dt;
        self.scenario.advance(self.time_s);

        let nodes = self.scenario.nodes();
        let snapshot = self.scenario.snapshot(&nodes);
        self.network.tick(&snapshot, listener)
    }

    pub fn report(&self) -> Vec<NodeReport> {
        let speed = self.network.config().signal_speed_mps;
        self.scenario
            .nodes()
            .into_iter()
            .map(|node| {
                let id = node.id();
                let best = self.network.shortest_route(id);
                NodeReport {
                    id,
                    name: node.name().to_string(),
                    hub: node.is_hub(),
                    links: self.network.links(id).len(),
                    connected: best.is_some(),
                    route: best
                        .map(|route| {
                            route
                                .nodes()
                                .into_iter()
                                .map(|n| {
                                    self.scenario
                                        .node_name(n)
                                        .map(str::to_string)
                                        .unwrap_or_else(|| n.to_string())
                                })
                                .collect()
                        })
                        .unwrap_or_default(),
                    distance_m: best.map(|route| route.cost),
                    delay_s: best.map(|route| route.delay(speed)),
                }
            })
            .collect()
    }
}

//! Pre-defined relay network scenarios and the scenario file format.

use std::collections::HashSet;
use std::f64::consts::PI;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use relaynet_core::{
    AntennaState, AntennaTarget, BodyId, ConfigError, GroundStation, NetworkConfig, NodeId,
    OccludingBody, SatelliteNode, Snapshot, Vec3, VesselNode,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::paths::{CircularOrbit, FixedPoint, OrbitPath, OrbitSpec};

/// Kerbin-like home body used by the generated constellation.
pub const HOME_RADIUS_M: f64 = 600_000.0;
pub const HOME_MU: f64 = 3.5316e12;

#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("invalid scenario file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("node id {0} is used more than once")]
    DuplicateNode(NodeId),

    #[error("active vessel {0} is not part of the scenario")]
    UnknownActiveVessel(NodeId),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// A vessel and the trajectory it follows.
pub struct SimVessel {
    pub node: VesselNode,
    pub path: Box<dyn OrbitPath>,
}

impl SimVessel {
    pub fn new(node: VesselNode, path: Box<dyn OrbitPath>) -> Self {
        Self { node, path }
    }

    /// Vessel that stays where it was created.
    pub fn parked(node: VesselNode) -> Self {
        let position = node.position;
        Self::new(node, Box::new(FixedPoint { position }))
    }

    /// Move the vessel to its position at time `t`.
    pub fn advance(&mut self, t: f64) {
        self.node.position = self.path.position(t);
    }
}

/// A named set of stations, vessels and bodies.
pub struct Scenario {
    pub name: String,
    pub config: NetworkConfig,
    pub bodies: Vec<OccludingBody>,
    pub stations: Vec<GroundStation>,
    pub vessels: Vec<SimVessel>,
    pub active_vessel: Option<NodeId>,
}

impl Scenario {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            config: NetworkConfig::default(),
            bodies: Vec::new(),
            stations: Vec::new(),
            vessels: Vec::new(),
            active_vessel: None,
        }
    }

    /// Parse and validate a JSON scenario file.
    pub fn from_json(text: &str) -> Result<Self, ScenarioError> {
        let file: ScenarioFile = serde_json::from_str(text)?;
        let scenario = file.into_scenario();
        scenario.validate()?;
        Ok(scenario)
    }

    /// Check ids and configuration.
    pub fn validate(&self) -> Result<(), ScenarioError> {
        self.config.validate()?;
        let mut seen = HashSet::new();
        for node in self.nodes() {
            if !seen.insert(node.id()) {
                return Err(ScenarioError::DuplicateNode(node.id()));
            }
        }
        if let Some(active) = self.active_vessel {
            if !seen.contains(&active) {
                return Err(ScenarioError::UnknownActiveVessel(active));
            }
        }
        Ok(())
    }

    /// Every node, stations first.
    pub fn nodes(&self) -> Vec<&dyn SatelliteNode> {
        self.stations
            .iter()
            .map(|s| s as &dyn SatelliteNode)
            .chain(self.vessels.iter().map(|v| &v.node as &dyn SatelliteNode))
            .collect()
    }

    pub fn node_name(&self, id: NodeId) -> Option<&str> {
        self.stations
            .iter()
            .find(|s| s.id == id)
            .map(|s| s.name.as_str())
            .or_else(|| {
                self.vessels
                    .iter()
                    .find(|v| v.node.id == id)
                    .map(|v| v.node.name.as_str())
            })
    }

    /// Snapshot over `nodes`, which must come from [`Scenario::nodes`].
    pub fn snapshot<'a>(&'a self, nodes: &'a [&'a dyn SatelliteNode]) -> Snapshot<'a> {
        let snapshot = Snapshot::new(nodes, &self.bodies);
        match self.active_vessel {
            Some(active) => snapshot.with_active_vessel(active),
            None => snapshot,
        }
    }

    /// Move every vessel to its position at time `t`.
    pub fn advance(&mut self, t: f64) {
        for vessel in &mut self.vessels {
            vessel.advance(t);
        }
    }
}

/// On-disk scenario description.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioFile {
    pub name: String,
    #[serde(default)]
    pub config: NetworkConfig,
    #[serde(default)]
    pub bodies: Vec<OccludingBody>,
    #[serde(default)]
    pub stations: Vec<GroundStation>,
    #[serde(default)]
    pub vessels: Vec<VesselEntry>,
    #[serde(default)]
    pub active_vessel: Option<NodeId>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VesselEntry {
    #[serde(flatten)]
    pub vessel: VesselNode,
    #[serde(default)]
    pub orbit: Option<OrbitSpec>,
}

impl ScenarioFile {
    pub fn into_scenario(self) -> Scenario {
        let vessels = self
            .vessels
            .into_iter()
            .map(|entry| {
                let start = entry.vessel.position;
                let path = entry.orbit.unwrap_or(OrbitSpec::Fixed).into_path(start);
                let mut vessel = SimVessel::new(entry.vessel, path);
                vessel.advance(0.0);
                vessel
            })
            .collect();

        Scenario {
            name: self.name,
            config: self.config,
            bodies: self.bodies,
            stations: self.stations,
            vessels,
            active_vessel: self.active_vessel,
        }
    }
}

/// Three collinear vessels 1 km apart with 1.5 km omnis; the last one is
/// the command station.
pub fn relay_chain() -> Scenario {
    let mut scenario = Scenario::new("relay-chain");
    let nodes = [
        VesselNode::new(1, "Probe A", Vec3::new(0.0, 0.0, 0.0)),
        VesselNode::new(2, "Relay B", Vec3::new(1_000.0, 0.0, 0.0)),
        VesselNode::new(3, "Station C", Vec3::new(2_000.0, 0.0, 0.0)).as_command_station(),
    ];
    scenario.vessels = nodes
        .into_iter()
        .map(|node| SimVessel::parked(node.with_antenna(AntennaState::omni(1_500.0))))
        .collect();
    scenario
}

/// Relay chain with a moon between the probe and the relay.
pub fn occluded_chain() -> Scenario {
    let mut scenario = relay_chain();
    scenario.name = "occluded-chain".to_string();
    scenario.bodies.push(OccludingBody::new(
        BodyId(1),
        "Mun",
        Vec3::new(500.0, 0.0, 0.0),
        600.0,
    ));
    scenario
}

/// Random constellation of `satellites` omni relays around a Kerbin-sized
/// body, a ground station on its surface and a deep-space probe reached by
/// dish through the active vessel.
pub fn constellation(seed: u64, satellites: usize) -> Scenario {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut scenario = Scenario::new("constellation");

    scenario.bodies.push(OccludingBody::new(
        BodyId(1),
        "Kerbin",
        Vec3::ZERO,
        HOME_RADIUS_M,
    ));
    scenario.stations.push(GroundStation::new(
        1,
        "Mission Control",
        Vec3::new(HOME_RADIUS_M, 0.0, 0.0),
        2_000_000.0,
    ));

    let probe_id = 2 + satellites as u64;
    for i in 0..satellites {
        let id = 2 + i as u64;
        let radius = rng.random_range(1_200_000.0..2_000_000.0);
        let phase = rng.random_range(0.0..2.0 * PI);
        let inclination = rng.random_range(-0.4..0.4);
        let orbit = CircularOrbit::keplerian(Vec3::ZERO, radius, HOME_MU, phase, inclination);

        let mut node = VesselNode::new(id, format!("Relay {}", i + 1), orbit.position(0.0))
            .with_antenna(AntennaState::omni(2_500_000.0));
        if i == 0 {
            node = node.with_antenna(AntennaState::dish(
                40_000_000.0,
                AntennaTarget::Node(NodeId(probe_id)),
            ));
            scenario.active_vessel = Some(node.id);
        }
        scenario.vessels.push(SimVessel::new(node, Box::new(orbit)));
    }

    if satellites > 0 {
        let probe = VesselNode::new(probe_id, "Deep Probe", Vec3::new(0.0, 30_000_000.0, 0.0))
            .with_antenna(AntennaState::dish(40_000_000.0, AntennaTarget::ActiveVessel));
        scenario.vessels.push(SimVessel::parked(probe));
    }
    scenario
}

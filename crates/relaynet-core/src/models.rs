//! Core data models for the relay network.
//!
//! Nodes and antennas are owned by the host simulation. The core reads them
//! through the [`SatelliteNode`] and [`Antenna`] capability traits once per
//! evaluation and keeps only [`NodeId`]s across ticks.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::spatial::Vec3;

/// Stable unique id of a network node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub u64);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Stable unique id of an occluding body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BodyId(pub u64);

/// What a directional antenna is pointed at.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum AntennaTarget {
    #[default]
    None,
    /// A specific node.
    Node(NodeId),
    /// Whichever node the host currently has in focus.
    ActiveVessel,
    /// A body; covers every node inside the antenna's cone around it.
    Body(BodyId),
}

/// Read-only view of one antenna.
pub trait Antenna {
    /// Deployed and powered. Inactive antennas never contribute to a link.
    fn activated(&self) -> bool;

    /// Omnidirectional range in meters, 0 if none.
    fn omni_range(&self) -> f64;

    /// Directional range in meters, 0 if none, -1 if the dish cannot target.
    fn dish_range(&self) -> f64;

    /// Cosine of the cone half-angle; 1.0 means no cone.
    fn cone_cos(&self) -> f64 {
        1.0
    }

    fn target(&self) -> AntennaTarget {
        AntennaTarget::None
    }
}

/// Read-only view of a node, implemented by each host-side variant.
pub trait SatelliteNode {
    fn id(&self) -> NodeId;

    fn name(&self) -> &str;

    fn position(&self) -> Vec3;

    /// Whether the node may participate in the network this tick.
    fn powered(&self) -> bool;

    /// Whether the node may terminate a route (command station).
    fn is_hub(&self) -> bool;

    fn antennas(&self) -> Vec<&dyn Antenna>;
}

/// Plain antenna snapshot, the variant used by hosts that load state from data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AntennaState {
    #[serde(default)]
    pub name: String,
    #[serde(default = "default_true")]
    pub activated: bool,
    #[serde(default)]
    pub omni_range_m: f64,
    #[serde(default)]
    pub dish_range_m: f64,
    #[serde(default = "default_cone_cos")]
    pub cone_cos: f64,
    #[serde(default)]
    pub target: AntennaTarget,
}

fn default_true() -> bool {
    true
}

fn default_cone_cos() -> f64 {
    1.0
}

impl AntennaState {
    /// Active omnidirectional antenna.
    pub fn omni(range_m: f64) -> Self {
        Self {
            name: "omni".to_string(),
            activated: true,
            omni_range_m: range_m,
            dish_range_m: 0.0,
            cone_cos: 1.0,
            target: AntennaTarget::None,
        }
    }

    /// Active dish pointed at `target`.
    pub fn dish(range_m: f64, target: AntennaTarget) -> Self {
        Self {
            name: "dish".to_string(),
            activated: true,
            omni_range_m: 0.0,
            dish_range_m: range_m,
            cone_cos: 1.0,
            target,
        }
    }

    /// Set the cone half-angle in degrees.
    pub fn with_cone_deg(mut self, half_angle_deg: f64) -> Self {
        self.cone_cos = half_angle_deg.to_radians().cos();
        self
    }

    pub fn deactivated(mut self) -> Self {
        self.activated = false;
        self
    }
}

impl Antenna for AntennaState {
    fn activated(&self) -> bool {
        self.activated
    }

    fn omni_range(&self) -> f64 {
        self.omni_range_m
    }

    fn dish_range(&self) -> f64 {
        self.dish_range_m
    }

    fn cone_cos(&self) -> f64 {
        self.cone_cos
    }

    fn target(&self) -> AntennaTarget {
        self.target
    }
}

/// A spacecraft carrying any number of antennas.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VesselNode {
    pub id: NodeId,
    pub name: String,
    pub position: Vec3,
    #[serde(default = "default_true")]
    pub powered: bool,
    /// Crewed command station able to terminate routes.
    #[serde(default)]
    pub command_station: bool,
    #[serde(default)]
    pub antennas: Vec<AntennaState>,
}

impl VesselNode {
    /// Create a powered vessel without antennas.
    pub fn new(id: u64, name: impl Into<String>, position: Vec3) -> Self {
        Self {
            id: NodeId(id),
            name: name.into(),
            position,
            powered: true,
            command_station: false,
            antennas: Vec::new(),
        }
    }

    pub fn with_antenna(mut self, antenna: AntennaState) -> Self {
        self.antennas.push(antenna);
        self
    }

    pub fn as_command_station(mut self) -> Self {
        self.command_station = true;
        self
    }

    pub fn unpowered(mut self) -> Self {
        self.powered = false;
        self
    }
}

impl SatelliteNode for VesselNode {
    fn id(&self) -> NodeId {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn position(&self) -> Vec3 {
        self.position
    }

    fn powered(&self) -> bool {
        self.powered
    }

    fn is_hub(&self) -> bool {
        self.command_station
    }

    fn antennas(&self) -> Vec<&dyn Antenna> {
        self.antennas.iter().map(|a| a as &dyn Antenna).collect()
    }
}

/// Fixed ground hub with a single omni antenna. Always powered.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroundStation {
    pub id: NodeId,
    pub name: String,
    pub position: Vec3,
    antenna: AntennaState,
}

impl GroundStation {
    pub fn new(id: u64, name: impl Into<String>, position: Vec3, omni_range_m: f64) -> Self {
        Self {
            id: NodeId(id),
            name: name.into(),
            position,
            antenna: AntennaState::omni(omni_range_m),
        }
    }

    pub fn omni_range(&self) -> f64 {
        self.antenna.omni_range_m
    }
}

impl SatelliteNode for GroundStation {
    fn id(&self) -> NodeId {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn position(&self) -> Vec3 {
        self.position
    }

    fn powered(&self) -> bool {
        true
    }

    fn is_hub(&self) -> bool {
        true
    }

    fn antennas(&self) -> Vec<&dyn Antenna> {
        vec![&self.antenna]
    }
}

/// Sphere that can block line-of-sight.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OccludingBody {
    pub id: BodyId,
    pub name: String,
    pub center: Vec3,
    pub radius_m: f64,
}

impl OccludingBody {
    pub fn new(id: BodyId, name: impl Into<String>, center: Vec3, radius_m: f64) -> Self {
        Self {
            id,
            name: name.into(),
            center,
            radius_m,
        }
    }
}

/// Classification of a link by the rule that established it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkKind {
    #[default]
    None,
    Omni,
    Directional,
}

/// Antenna `index` within the antenna list of `node`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AntennaRef {
    pub node: NodeId,
    pub index: usize,
}

/// Usable one-hop signal path for the current refresh cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Link {
    pub target: NodeId,
    pub kind: LinkKind,
    /// Antennas that made the connection possible (diagnostics only).
    pub antennas: Vec<AntennaRef>,
}

impl Link {
    /// Whether two links connect to the same node the same way.
    pub fn same_connection(&self, other: &Link) -> bool {
        self.target == other.target && self.kind == other.kind
    }
}

/// Hop `from -> link.target` within a route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hop {
    pub from: NodeId,
    pub link: Link,
}

/// Ordered hop sequence from `start` to `goal` and its accumulated length.
///
/// A route with no hops and zero cost means the start is itself the goal.
/// An empty route (`goal == None`, infinite cost) means unreachable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    pub start: NodeId,
    pub goal: Option<NodeId>,
    pub hops: Vec<Hop>,
    /// Sum of hop distances in meters.
    pub cost: f64,
}

impl Route {
    /// The unreachable route.
    pub fn empty(start: NodeId) -> Self {
        Self {
            start,
            goal: None,
            hops: Vec::new(),
            cost: f64::INFINITY,
        }
    }

    pub fn exists(&self) -> bool {
        self.goal.is_some() && self.cost.is_finite()
    }

    /// One-way propagation delay in seconds at `signal_speed_mps`.
    pub fn delay(&self, signal_speed_mps: f64) -> f64 {
        self.cost / signal_speed_mps
    }

    /// Every node on the route, start first.
    pub fn nodes(&self) -> Vec<NodeId> {
        let mut nodes = Vec::with_capacity(self.hops.len() + 1);
        nodes.push(self.start);
        nodes.extend(self.hops.iter().map(|hop| hop.link.target));
        nodes
    }

    pub fn contains(&self, node: NodeId) -> bool {
        self.start == node || self.hops.iter().any(|hop| hop.link.target == node)
    }
}

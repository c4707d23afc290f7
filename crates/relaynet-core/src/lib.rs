//! Relay network core: link discovery between mobile nodes and routing to
//! command hubs.

pub mod config;
pub mod error;
pub mod graph;
pub mod link;
pub mod models;
pub mod network;
pub mod pathfinder;
pub mod priority_queue;
pub mod route_cache;
pub mod spatial;

pub use config::{NetworkConfig, DEFAULT_REFRESH_WINDOW, SPEED_OF_LIGHT_MPS};
pub use error::ConfigError;
pub use graph::{Graph, LinkDiff};
pub use link::{evaluate_link, LinkContext};
pub use models::{
    Antenna, AntennaRef, AntennaState, AntennaTarget, BodyId, GroundStation, Hop, Link, LinkKind,
    NodeId, OccludingBody, Route, SatelliteNode, VesselNode,
};
pub use network::{Network, NetworkListener, NullListener, Snapshot, TickStats};
pub use pathfinder::{find_hub_routes, find_route, SearchSpace};
pub use route_cache::RouteCache;
pub use spatial::{distance, has_line_of_sight, Vec3};

//! Link evaluation between two nodes.
//!
//! A link exists when both nodes are powered, the segment between them is
//! not occluded, and one of the antenna rules holds (first match wins):
//!
//! 1. omni-omni: both sides have an active omni covering the distance.
//! 2. dish-omni: one side's dish targets the other and covers the distance,
//!    and the other side has an active omni covering
//!    `omni_listen_factor * distance`. Checked in both directions.
//! 3. dish-dish: both dishes target each other and cover the distance.

use crate::config::NetworkConfig;
use crate::models::{
    Antenna, AntennaRef, AntennaTarget, BodyId, Link, LinkKind, NodeId, OccludingBody,
    SatelliteNode,
};
use crate::spatial::{distance, has_line_of_sight, within_cone};

/// Per-tick inputs shared by every link evaluation.
#[derive(Debug, Clone, Copy)]
pub struct LinkContext<'a> {
    pub bodies: &'a [OccludingBody],
    /// Node currently in focus; resolves [`AntennaTarget::ActiveVessel`].
    pub active_vessel: Option<NodeId>,
    pub config: &'a NetworkConfig,
}

impl<'a> LinkContext<'a> {
    pub fn new(
        bodies: &'a [OccludingBody],
        active_vessel: Option<NodeId>,
        config: &'a NetworkConfig,
    ) -> Self {
        Self {
            bodies,
            active_vessel,
            config,
        }
    }

    fn body(&self, id: BodyId) -> Option<&'a OccludingBody> {
        self.bodies.iter().find(|body| body.id == id)
    }
}

/// Evaluate the link from `a` to `b`, if any.
///
/// The result is symmetric in existence and kind: `evaluate_link(b, a, ..)`
/// yields a link of the same [`LinkKind`] pointing back at `a`.
pub fn evaluate_link(
    a: &dyn SatelliteNode,
    b: &dyn SatelliteNode,
    ctx: &LinkContext<'_>,
) -> Option<Link> {
    if a.id() == b.id() || !a.powered() || !b.powered() {
        return None;
    }

    let pos_a = a.position();
    let pos_b = b.position();
    let dist = distance(pos_a, pos_b).max(0.0);
    if !dist.is_finite() {
        return None;
    }
    if !has_line_of_sight(pos_a, pos_b, ctx.bodies, ctx.config.los_clearance_m) {
        return None;
    }

    let antennas_a = a.antennas();
    let antennas_b = b.antennas();

    let omni_a = omni_within(&antennas_a, dist);
    let omni_b = omni_within(&antennas_b, dist);
    if !omni_a.is_empty() && !omni_b.is_empty() {
        return Some(build_link(
            b.id(),
            LinkKind::Omni,
            a.id(),
            &omni_a,
            b.id(),
            &omni_b,
        ));
    }

    let dish_a = dishes_targeting(a, &antennas_a, b, dist, ctx);
    let dish_b = dishes_targeting(b, &antennas_b, a, dist, ctx);
    let listen_range = ctx.config.omni_listen_factor * dist;

    if !dish_a.is_empty() {
        let listeners = omni_within(&antennas_b, listen_range);
        if !listeners.is_empty() {
            return Some(build_link(
                b.id(),
                LinkKind::Directional,
                a.id(),
                &dish_a,
                b.id(),
                &listeners,
            ));
        }
    }
    if !dish_b.is_empty() {
        let listeners = omni_within(&antennas_a, listen_range);
        if !listeners.is_empty() {
            return Some(build_link(
                b.id(),
                LinkKind::Directional,
                a.id(),
                &listeners,
                b.id(),
                &dish_b,
            ));
        }
    }

    if !dish_a.is_empty() && !dish_b.is_empty() {
        return Some(build_link(
            b.id(),
            LinkKind::Directional,
            a.id(),
            &dish_a,
            b.id(),
            &dish_b,
        ));
    }

    None
}

/// Whether `antenna` on `owner` is pointed at `other`.
pub fn is_targeting(
    antenna: &dyn Antenna,
    owner: &dyn SatelliteNode,
    other: &dyn SatelliteNode,
    ctx: &LinkContext<'_>,
) -> bool {
    match antenna.target() {
        AntennaTarget::None => false,
        AntennaTarget::Node(id) => id == other.id(),
        AntennaTarget::ActiveVessel => ctx.active_vessel == Some(other.id()),
        AntennaTarget::Body(body_id) => ctx.body(body_id).is_some_and(|body| {
            within_cone(
                owner.position(),
                body.center,
                other.position(),
                antenna.cone_cos(),
            )
        }),
    }
}

fn omni_within(antennas: &[&dyn Antenna], required_m: f64) -> Vec<usize> {
    antennas
        .iter()
        .enumerate()
        .filter(|(_, antenna)| {
            let range = antenna.omni_range();
            antenna.activated() && range > 0.0 && range >= required_m
        })
        .map(|(index, _)| index)
        .collect()
}

fn dishes_targeting(
    owner: &dyn SatelliteNode,
    antennas: &[&dyn Antenna],
    other: &dyn SatelliteNode,
    dist: f64,
    ctx: &LinkContext<'_>,
) -> Vec<usize> {
    antennas
        .iter()
        .enumerate()
        .filter(|(_, antenna)| {
            let range = antenna.dish_range();
            antenna.activated()
                && range > 0.0
                && range >= dist
                && is_targeting(**antenna, owner, other, ctx)
        })
        .map(|(index, _)| index)
        .collect()
}

fn build_link(
    target: NodeId,
    kind: LinkKind,
    node_a: NodeId,
    indices_a: &[usize],
    node_b: NodeId,
    indices_b: &[usize],
) -> Link {
    let antennas = indices_a
        .iter()
        .map(|&index| AntennaRef {
            node: node_a,
            index,
        })
        .chain(indices_b.iter().map(|&index| AntennaRef {
            node: node_b,
            index,
        }))
        .collect();

    Link {
        target,
        kind,
        antennas,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AntennaState, VesselNode};
    use crate::spatial::Vec3;

    fn ctx<'a>(bodies: &'a [OccludingBody], config: &'a NetworkConfig) -> LinkContext<'a> {
        LinkContext::new(bodies, None, config)
    }

    fn at(id: u64, x: f64) -> VesselNode {
        VesselNode::new(id, format!("node-{id}"), Vec3::new(x, 0.0, 0.0))
    }

    #[test]
    fn test_omni_link_is_symmetric() {
        let config = NetworkConfig::default();
        let ctx = ctx(&[], &config);
        let a = at(1, 0.0).with_antenna(AntennaState::omni(1_500.0));
        let b = at(2, 1_000.0).with_antenna(AntennaState::omni(1_200.0));

        let ab = evaluate_link(&a, &b, &ctx).expect("a -> b");
        let ba = evaluate_link(&b, &a, &ctx).expect("b -> a");
        assert_eq!(ab.kind, LinkKind::Omni);
        assert_eq!(ba.kind, LinkKind::Omni);
        assert_eq!(ab.target, NodeId(2));
        assert_eq!(ba.target, NodeId(1));
        assert_eq!(ab.antennas.len(), 2);
    }

    #[test]
    fn test_omni_out_of_range() {
        let config = NetworkConfig::default();
        let ctx = ctx(&[], &config);
        let a = at(1, 0.0).with_antenna(AntennaState::omni(1_500.0));
        let b = at(2, 1_000.0).with_antenna(AntennaState::omni(900.0));
        assert!(evaluate_link(&a, &b, &ctx).is_none());
    }

    #[test]
    fn test_inactive_antenna_ignored() {
        let config = NetworkConfig::default();
        let ctx = ctx(&[], &config);
        let a = at(1, 0.0).with_antenna(AntennaState::omni(1_500.0).deactivated());
        let b = at(2, 1_000.0).with_antenna(AntennaState::omni(1_500.0));
        assert!(evaluate_link(&a, &b, &ctx).is_none());
    }

    #[test]
    fn test_unpowered_or_self_has_no_link() {
        let config = NetworkConfig::default();
        let ctx = ctx(&[], &config);
        let a = at(1, 0.0).with_antenna(AntennaState::omni(1_500.0));
        let b = at(2, 1_000.0)
            .with_antenna(AntennaState::omni(1_500.0))
            .unpowered();
        assert!(evaluate_link(&a, &b, &ctx).is_none());
        assert!(evaluate_link(&a, &a, &ctx).is_none());
    }

    #[test]
    fn test_zero_range_colocated_nodes() {
        let config = NetworkConfig::default();
        let ctx = ctx(&[], &config);
        let a = at(1, 0.0).with_antenna(AntennaState::omni(0.0));
        let b = at(2, 0.0).with_antenna(AntennaState::omni(0.0));
        assert!(evaluate_link(&a, &b, &ctx).is_none());
    }

    #[test]
    fn test_dish_to_omni_requires_double_omni_range() {
        let config = NetworkConfig::default();
        let ctx = ctx(&[], &config);
        let a = at(1, 0.0).with_antenna(AntennaState::dish(
            10_000.0,
            AntennaTarget::Node(NodeId(2)),
        ));
        let near = at(2, 1_000.0).with_antenna(AntennaState::omni(2_000.0));
        let far = at(2, 1_500.0).with_antenna(AntennaState::omni(2_000.0));

        let link = evaluate_link(&a, &near, &ctx).expect("dish reaches listener");
        assert_eq!(link.kind, LinkKind::Directional);
        let back = evaluate_link(&near, &a, &ctx).expect("symmetric");
        assert_eq!(back.kind, LinkKind::Directional);

        assert!(evaluate_link(&a, &far, &ctx).is_none());
    }

    #[test]
    fn test_dish_to_dish() {
        let config = NetworkConfig::default();
        let ctx = ctx(&[], &config);
        let a = at(1, 0.0).with_antenna(AntennaState::dish(
            50_000.0,
            AntennaTarget::Node(NodeId(2)),
        ));
        let b = at(2, 40_000.0).with_antenna(AntennaState::dish(
            45_000.0,
            AntennaTarget::Node(NodeId(1)),
        ));
        let link = evaluate_link(&a, &b, &ctx).expect("dish pair");
        assert_eq!(link.kind, LinkKind::Directional);
        assert_eq!(
            link.antennas,
            vec![
                AntennaRef {
                    node: NodeId(1),
                    index: 0
                },
                AntennaRef {
                    node: NodeId(2),
                    index: 0
                },
            ]
        );

        // One dish pointed elsewhere breaks the pair.
        let c = at(2, 40_000.0).with_antenna(AntennaState::dish(
            45_000.0,
            AntennaTarget::Node(NodeId(9)),
        ));
        assert!(evaluate_link(&a, &c, &ctx).is_none());
    }

    #[test]
    fn test_active_vessel_target() {
        let config = NetworkConfig::default();
        let a = at(1, 0.0).with_antenna(AntennaState::dish(
            50_000.0,
            AntennaTarget::ActiveVessel,
        ));
        let b = at(2, 40_000.0).with_antenna(AntennaState::dish(
            45_000.0,
            AntennaTarget::Node(NodeId(1)),
        ));

        let focused = LinkContext::new(&[], Some(NodeId(2)), &config);
        assert!(evaluate_link(&a, &b, &focused).is_some());

        let unfocused = LinkContext::new(&[], Some(NodeId(3)), &config);
        assert!(evaluate_link(&a, &b, &unfocused).is_none());
    }

    #[test]
    fn test_body_cone_target() {
        let config = NetworkConfig::default();
        let bodies = [OccludingBody::new(
            BodyId(5),
            "Minmus",
            Vec3::new(100_000.0, 0.0, 0.0),
            1_000.0,
        )];
        let ctx = LinkContext::new(&bodies, None, &config);
        let a = at(1, 0.0).with_antenna(
            AntennaState::dish(200_000.0, AntennaTarget::Body(BodyId(5))).with_cone_deg(5.0),
        );
        let inside = VesselNode::new(2, "inside", Vec3::new(90_000.0, 2_000.0, 0.0))
            .with_antenna(AntennaState::dish(200_000.0, AntennaTarget::Node(NodeId(1))));
        let outside = VesselNode::new(3, "outside", Vec3::new(50_000.0, 40_000.0, 0.0))
            .with_antenna(AntennaState::dish(200_000.0, AntennaTarget::Node(NodeId(1))));

        assert!(evaluate_link(&a, &inside, &ctx).is_some());
        assert!(evaluate_link(&a, &outside, &ctx).is_none());
    }

    #[test]
    fn test_occluded_link() {
        let config = NetworkConfig::default();
        let bodies = [OccludingBody::new(
            BodyId(1),
            "Kerbin",
            Vec3::new(500.0, 0.0, 0.0),
            600.0,
        )];
        let ctx = LinkContext::new(&bodies, None, &config);
        let a = at(1, 0.0).with_antenna(AntennaState::omni(1_500.0));
        let b = at(2, 1_000.0).with_antenna(AntennaState::omni(1_500.0));
        assert!(evaluate_link(&a, &b, &ctx).is_none());
    }
}

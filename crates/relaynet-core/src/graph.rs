//! Adjacency store: current outgoing links per node.

use std::collections::HashMap;

use tracing::debug;

use crate::link::{evaluate_link, LinkContext};
use crate::models::{Link, NodeId, SatelliteNode};

/// Changes between a node's previous and current link list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LinkDiff {
    pub added: Vec<Link>,
    pub removed: Vec<Link>,
}

impl LinkDiff {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

#[derive(Debug, Clone, Default)]
pub struct Graph {
    adjacency: HashMap<NodeId, Vec<Link>>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Outgoing links of `node`; empty for unknown nodes.
    pub fn links(&self, node: NodeId) -> &[Link] {
        self.adjacency.get(&node).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn contains(&self, node: NodeId) -> bool {
        self.adjacency.contains_key(&node)
    }

    pub fn len(&self) -> usize {
        self.adjacency.len()
    }

    pub fn is_empty(&self) -> bool {
        self.adjacency.is_empty()
    }

    /// Recompute every outgoing link of `node` against `candidates`.
    ///
    /// The stored list is replaced wholesale; the returned diff compares
    /// connections by target and kind.
    pub fn refresh_node(
        &mut self,
        node: &dyn SatelliteNode,
        candidates: &[&dyn SatelliteNode],
        ctx: &LinkContext<'_>,
    ) -> LinkDiff {
        let links: Vec<Link> = candidates
            .iter()
            .filter_map(|candidate| evaluate_link(node, *candidate, ctx))
            .collect();
        self.replace_links(node.id(), links)
    }

    /// Store `links` as the outgoing list of `node` and report what changed.
    pub fn replace_links(&mut self, node: NodeId, links: Vec<Link>) -> LinkDiff {
        let previous = self.adjacency.insert(node, links).unwrap_or_default();
        let current = self.links(node);

        let added: Vec<Link> = current
            .iter()
            .filter(|link| !previous.iter().any(|old| old.same_connection(link)))
            .cloned()
            .collect();
        let removed: Vec<Link> = previous
            .into_iter()
            .filter(|old| !current.iter().any(|link| link.same_connection(old)))
            .collect();

        let diff = LinkDiff { added, removed };
        if !diff.is_empty() {
            debug!(
                "Node {} links changed: +{} -{}",
                node,
                diff.added.len(),
                diff.removed.len()
            );
        }
        diff
    }

    /// Drop `node` and every link pointing at it.
    ///
    /// Returns the node's own former links and the `(owner, link)` pairs
    /// stripped from other nodes.
    pub fn remove_node(&mut self, node: NodeId) -> (Vec<Link>, Vec<(NodeId, Link)>) {
        let own = self.adjacency.remove(&node).unwrap_or_default();

        let mut stripped = Vec::new();
        for (owner, links) in self.adjacency.iter_mut() {
            let mut index = 0;
            while index < links.len() {
                if links[index].target == node {
                    stripped.push((*owner, links.remove(index)));
                } else {
                    index += 1;
                }
            }
        }
        stripped.sort_by_key(|(owner, _)| *owner);

        (own, stripped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::NetworkConfig;
    use crate::models::{AntennaState, LinkKind, VesselNode};
    use crate::spatial::Vec3;

    fn omni_node(id: u64, x: f64, range: f64) -> VesselNode {
        VesselNode::new(id, format!("sat-{id}"), Vec3::new(x, 0.0, 0.0))
            .with_antenna(AntennaState::omni(range))
    }

    #[test]
    fn test_refresh_is_idempotent() {
        let config = NetworkConfig::default();
        let ctx = LinkContext::new(&[], None, &config);
        let a = omni_node(1, 0.0, 1_500.0);
        let b = omni_node(2, 1_000.0, 1_500.0);
        let c = omni_node(3, 2_000.0, 1_500.0);
        let all: Vec<&dyn SatelliteNode> = vec![&a, &b, &c];

        let mut graph = Graph::new();
        let first = graph.refresh_node(&b, &all, &ctx);
        assert_eq!(first.added.len(), 2);
        assert!(first.removed.is_empty());
        let snapshot = graph.links(b.id).to_vec();

        let second = graph.refresh_node(&b, &all, &ctx);
        assert!(second.is_empty());
        assert_eq!(graph.links(b.id), snapshot.as_slice());
    }

    #[test]
    fn test_refresh_reports_removed_links() {
        let config = NetworkConfig::default();
        let ctx = LinkContext::new(&[], None, &config);
        let a = omni_node(1, 0.0, 1_500.0);
        let mut b = omni_node(2, 1_000.0, 1_500.0);

        let mut graph = Graph::new();
        graph.refresh_node(&a, &[&a, &b], &ctx);
        assert_eq!(graph.links(a.id).len(), 1);

        b.position = Vec3::new(5_000.0, 0.0, 0.0);
        let diff = graph.refresh_node(&a, &[&a, &b], &ctx);
        assert!(diff.added.is_empty());
        assert_eq!(diff.removed.len(), 1);
        assert_eq!(diff.removed[0].target, NodeId(2));
        assert!(graph.links(a.id).is_empty());
        assert!(graph.contains(a.id));
    }

    #[test]
    fn test_kind_change_is_remove_plus_add() {
        let mut graph = Graph::new();
        let omni = Link {
            target: NodeId(2),
            kind: LinkKind::Omni,
            antennas: Vec::new(),
        };
        let dish = Link {
            kind: LinkKind::Directional,
            ..omni.clone()
        };
        graph.replace_links(NodeId(1), vec![omni]);
        let diff = graph.replace_links(NodeId(1), vec![dish]);
        assert_eq!(diff.added.len(), 1);
        assert_eq!(diff.removed.len(), 1);
    }

    #[test]
    fn test_remove_node_strips_incoming_links() {
        let link_to = |target: u64| Link {
            target: NodeId(target),
            kind: LinkKind::Omni,
            antennas: Vec::new(),
        };
        let mut graph = Graph::new();
        graph.replace_links(NodeId(1), vec![link_to(2), link_to(3)]);
        graph.replace_links(NodeId(2), vec![link_to(1), link_to(3)]);
        graph.replace_links(NodeId(3), vec![link_to(1), link_to(2)]);

        let (own, stripped) = graph.remove_node(NodeId(2));
        assert_eq!(own.len(), 2);
        assert_eq!(stripped.len(), 2);
        assert_eq!(stripped[0].0, NodeId(1));
        assert_eq!(stripped[1].0, NodeId(3));
        assert!(!graph.contains(NodeId(2)));
        assert_eq!(graph.links(NodeId(1)), &[link_to(3)]);
        assert!(graph.links(NodeId(2)).is_empty());
    }
}

//! A* search over the link graph.
//!
//! Hop cost is the Euclidean hop length and the heuristic is the straight
//! line distance to the goal, so the heuristic never overestimates and the
//! first goal popped is optimal.

use std::collections::{HashMap, HashSet};

use tracing::trace;

use crate::graph::Graph;
use crate::models::{Hop, Link, NodeId, Route};
use crate::priority_queue::{EntryHandle, PriorityQueue};
use crate::spatial::{distance, Vec3};

/// Find the cheapest route from `start` to any node in `goals`.
///
/// `neighbors` yields the usable outgoing links of a node, `cost` the
/// non-negative cost of a hop and `heuristic` an admissible estimate of the
/// remaining cost. Returns [`Route::empty`] when no goal is reachable.
///
/// # Panics
/// If `goals` is empty.
pub fn find_route<N, C, H>(
    start: NodeId,
    goals: &[NodeId],
    mut neighbors: N,
    cost: C,
    heuristic: H,
) -> Route
where
    N: FnMut(NodeId) -> Vec<Link>,
    C: Fn(NodeId, NodeId) -> f64,
    H: Fn(NodeId) -> f64,
{
    assert!(!goals.is_empty(), "find_route called with an empty goal set");

    if goals.contains(&start) {
        return Route {
            start,
            goal: Some(start),
            hops: Vec::new(),
            cost: 0.0,
        };
    }

    let mut open: PriorityQueue<NodeId> = PriorityQueue::new();
    let mut open_entries: HashMap<NodeId, EntryHandle> = HashMap::new();
    let mut g_score: HashMap<NodeId, f64> = HashMap::new();
    let mut came_from: HashMap<NodeId, (NodeId, Link)> = HashMap::new();
    let mut closed: HashSet<NodeId> = HashSet::new();

    g_score.insert(start, 0.0);
    open_entries.insert(start, open.push(start, heuristic(start)));

    let mut expanded = 0usize;
    while let Some((current, _)) = open.pop() {
        open_entries.remove(&current);
        let best_g = g_score.get(&current).copied().unwrap_or(f64::INFINITY);

        if goals.contains(&current) {
            trace!(
                "Route {} -> {} found after expanding {} node(s)",
                start,
                current,
                expanded
            );
            return reconstruct(start, current, best_g, &came_from);
        }

        expanded += 1;
        closed.insert(current);

        for link in neighbors(current) {
            let next = link.target;
            if closed.contains(&next) {
                continue;
            }

            let step = cost(current, next).max(0.0);
            let tentative_g = best_g + step;
            if tentative_g < g_score.get(&next).copied().unwrap_or(f64::INFINITY) {
                g_score.insert(next, tentative_g);
                came_from.insert(next, (current, link));

                if let Some(previous) = open_entries.remove(&next) {
                    open.invalidate(previous);
                }
                let f_score = tentative_g + heuristic(next);
                open_entries.insert(next, open.push(next, f_score));
            }
        }
    }

    trace!(
        "No route from {} after expanding {} node(s)",
        start,
        expanded
    );
    Route::empty(start)
}

fn reconstruct(
    start: NodeId,
    goal: NodeId,
    cost: f64,
    came_from: &HashMap<NodeId, (NodeId, Link)>,
) -> Route {
    let mut hops = Vec::new();
    let mut node = goal;
    while let Some((previous, link)) = came_from.get(&node) {
        hops.push(Hop {
            from: *previous,
            link: link.clone(),
        });
        node = *previous;
    }
    hops.reverse();

    Route {
        start,
        goal: Some(goal),
        hops,
        cost,
    }
}

/// Read-only view of the network used for hub searches.
#[derive(Debug, Clone, Copy)]
pub struct SearchSpace<'a> {
    pub graph: &'a Graph,
    /// Current positions of every node in the host snapshot.
    pub positions: &'a HashMap<NodeId, Vec3>,
    /// Nodes that are powered this tick.
    pub powered: &'a HashSet<NodeId>,
}

impl SearchSpace<'_> {
    /// Outgoing links of a powered node that lead to powered nodes.
    pub fn neighbors(&self, node: NodeId) -> Vec<Link> {
        if !self.powered.contains(&node) {
            return Vec::new();
        }
        self.graph
            .links(node)
            .iter()
            .filter(|link| self.powered.contains(&link.target))
            .cloned()
            .collect()
    }

    /// Euclidean distance between two known nodes; infinite otherwise.
    pub fn distance(&self, a: NodeId, b: NodeId) -> f64 {
        match (self.positions.get(&a), self.positions.get(&b)) {
            (Some(pa), Some(pb)) => distance(*pa, *pb),
            _ => f64::INFINITY,
        }
    }
}

/// Run one search per hub from `start` and keep the reachable results,
/// cheapest first.
pub fn find_hub_routes(start: NodeId, hubs: &[NodeId], space: &SearchSpace<'_>) -> Vec<Route> {
    let mut routes: Vec<Route> = hubs
        .iter()
        .map(|&hub| {
            find_route(
                start,
                &[hub],
                |node| space.neighbors(node),
                |a, b| space.distance(a, b),
                |node| {
                    let estimate = space.distance(node, hub);
                    if estimate.is_finite() {
                        estimate
                    } else {
                        0.0
                    }
                },
            )
        })
        .filter(Route::exists)
        .collect();

    routes.sort_by(|a, b| a.cost.total_cmp(&b.cost));
    routes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::LinkKind;

    fn link(target: u64) -> Link {
        Link {
            target: NodeId(target),
            kind: LinkKind::Omni,
            antennas: Vec::new(),
        }
    }

    /// Undirected weighted test graph, no geometry.
    struct TestGraph {
        edges: Vec<(u64, u64, f64)>,
    }

    impl TestGraph {
        fn neighbors(&self, node: NodeId) -> Vec<Link> {
            self.edges
                .iter()
                .filter_map(|&(a, b, _)| {
                    if a == node.0 {
                        Some(link(b))
                    } else if b == node.0 {
                        Some(link(a))
                    } else {
                        None
                    }
                })
                .collect()
        }

        fn cost(&self, from: NodeId, to: NodeId) -> f64 {
            self.edges
                .iter()
                .find(|&&(a, b, _)| (a, b) == (from.0, to.0) || (b, a) == (from.0, to.0))
                .map(|&(_, _, w)| w)
                .unwrap_or(f64::INFINITY)
        }
    }

    #[test]
    fn test_finds_cheapest_not_shortest_hop_count() {
        // 1 -> 4 directly costs 10, via 2 and 3 costs 6.
        let graph = TestGraph {
            edges: vec![(1, 4, 10.0), (1, 2, 2.0), (2, 3, 2.0), (3, 4, 2.0)],
        };
        let route = find_route(
            NodeId(1),
            &[NodeId(4)],
            |n| graph.neighbors(n),
            |a, b| graph.cost(a, b),
            |_| 0.0,
        );
        assert!(route.exists());
        assert!((route.cost - 6.0).abs() < 1e-9);
        assert_eq!(
            route.nodes(),
            vec![NodeId(1), NodeId(2), NodeId(3), NodeId(4)]
        );
    }

    #[test]
    fn test_better_path_supersedes_queued_entry() {
        // Node 3 is first queued via the expensive edge from 1, then improved via 2.
        let graph = TestGraph {
            edges: vec![(1, 3, 9.0), (1, 2, 1.0), (2, 3, 1.0), (3, 4, 1.0)],
        };
        let route = find_route(
            NodeId(1),
            &[NodeId(4)],
            |n| graph.neighbors(n),
            |a, b| graph.cost(a, b),
            |_| 0.0,
        );
        assert!((route.cost - 3.0).abs() < 1e-9);
        assert_eq!(route.hops[1].from, NodeId(2));
    }

    #[test]
    fn test_start_in_goal_set_is_zero_hop() {
        let route = find_route(NodeId(1), &[NodeId(1)], |_| Vec::new(), |_, _| 1.0, |_| 0.0);
        assert!(route.exists());
        assert_eq!(route.cost, 0.0);
        assert!(route.hops.is_empty());
        assert_eq!(route.goal, Some(NodeId(1)));
    }

    #[test]
    fn test_disconnected_returns_empty_route() {
        let graph = TestGraph {
            edges: vec![(1, 2, 1.0), (3, 4, 1.0)],
        };
        let route = find_route(
            NodeId(1),
            &[NodeId(4)],
            |n| graph.neighbors(n),
            |a, b| graph.cost(a, b),
            |_| 0.0,
        );
        assert!(!route.exists());
        assert!(route.cost.is_infinite());
    }

    #[test]
    fn test_multiple_goals_returns_nearest() {
        let graph = TestGraph {
            edges: vec![(1, 2, 5.0), (1, 3, 2.0)],
        };
        let route = find_route(
            NodeId(1),
            &[NodeId(2), NodeId(3)],
            |n| graph.neighbors(n),
            |a, b| graph.cost(a, b),
            |_| 0.0,
        );
        assert_eq!(route.goal, Some(NodeId(3)));
    }

    #[test]
    #[should_panic(expected = "empty goal set")]
    fn test_empty_goal_set_panics() {
        find_route(NodeId(1), &[], |_| Vec::new(), |_, _| 0.0, |_| 0.0);
    }
}

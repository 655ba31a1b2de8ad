use super::LinkGraph;
use crate::model::network::NodeId;
use itertools::Itertools;
use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap, HashSet, LinkedList};

/// finds the set of nodes reachable from a source over an undirected view of
/// the graph, via breadth-first search.
///
/// # Arguments
///
/// * `src` - origin of tree
/// * `graph` - graph to search
/// * `valid_set` - set of valid nodes to visit, or None if all are acceptable.
pub fn bfs_undirected(
    src: NodeId,
    graph: &LinkGraph,
    valid_set: Option<&HashSet<NodeId>>,
) -> HashSet<NodeId> {
    // breadth-first search modeled with a linked list FIFO queue
    let mut visited: HashSet<NodeId> = HashSet::new();
    let mut frontier: LinkedList<NodeId> = LinkedList::new();
    frontier.push_back(src);

    while let Some(next_id) = frontier.pop_front() {
        visited.insert(next_id);

        let next_out = graph.get_out_neighbors(&next_id).cloned().unwrap_or_default();
        let next_in = graph.get_in_neighbors(&next_id).cloned().unwrap_or_default();

        // neighbors are sorted for algorithmic determinism (frontier insertion order)
        let valid_neighbors = next_in
            .union(&next_out)
            .filter(|n| match &valid_set {
                Some(valid) => valid.contains(*n),
                None => true,
            })
            .sorted();
        for neighbor in valid_neighbors {
            if !visited.contains(neighbor) {
                frontier.push_back(*neighbor);
            }
        }
    }

    visited
}

/// partitions the connected nodes of the graph into undirected components,
/// largest first, each sorted for determinism.
pub fn connected_components(graph: &LinkGraph) -> Vec<Vec<NodeId>> {
    let mut remaining: HashSet<NodeId> = graph.connected_nodes();
    let mut components: Vec<Vec<NodeId>> = vec![];
    while let Some(seed) = remaining.iter().min().copied() {
        let component = bfs_undirected(seed, graph, None);
        for node in component.iter() {
            remaining.remove(node);
        }
        components.push(component.into_iter().sorted().collect_vec());
    }
    components.sort_by_key(|c| std::cmp::Reverse(c.len()));
    components
}

/// dijkstra frontier entry ordered by ascending cost. edge weights are link
/// lengths, which are finite and non-negative, so the partial order is total
/// in practice.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Frontier {
    cost: f64,
    node: NodeId,
}

impl Eq for Frontier {}

impl Ord for Frontier {
    fn cmp(&self, other: &Self) -> Ordering {
        // reversed for a min-heap, tie-broken by node id for determinism
        other
            .cost
            .partial_cmp(&self.cost)
            .unwrap_or(Ordering::Equal)
            .then_with(|| other.node.cmp(&self.node))
    }
}

impl PartialOrd for Frontier {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// computes the least-distance node path from src to dst, weighted by link
/// miles. returns None when dst is unreachable.
pub fn shortest_path(graph: &LinkGraph, src: NodeId, dst: NodeId) -> Option<Vec<NodeId>> {
    if !graph.contains_node(&src) || !graph.contains_node(&dst) {
        return None;
    }
    let mut dist: HashMap<NodeId, f64> = HashMap::from([(src, 0.0)]);
    let mut prev: HashMap<NodeId, NodeId> = HashMap::new();
    let mut heap: BinaryHeap<Frontier> = BinaryHeap::new();
    heap.push(Frontier {
        cost: 0.0,
        node: src,
    });

    while let Some(Frontier { cost, node }) = heap.pop() {
        if node == dst {
            break;
        }
        if cost > dist.get(&node).copied().unwrap_or(f64::INFINITY) {
            continue; // stale frontier entry
        }
        let Some(neighbors) = graph.get_out_neighbors(&node) else {
            continue;
        };
        for neighbor in neighbors.iter().sorted() {
            let Some((_, miles)) = graph.get_edge(&node, neighbor) else {
                continue;
            };
            let next_cost = cost + miles;
            if next_cost < dist.get(neighbor).copied().unwrap_or(f64::INFINITY) {
                dist.insert(*neighbor, next_cost);
                prev.insert(*neighbor, node);
                heap.push(Frontier {
                    cost: next_cost,
                    node: *neighbor,
                });
            }
        }
    }

    if src != dst && !prev.contains_key(&dst) {
        return None;
    }
    let mut path = vec![dst];
    let mut cursor = dst;
    while let Some(parent) = prev.get(&cursor) {
        path.push(*parent);
        cursor = *parent;
    }
    path.reverse();
    Some(path)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::model::network::{Directions, HwyNetwork, LinkRecord, NodeRecord};

    fn network(edges: &[(i64, i64, f64)]) -> HwyNetwork {
        let mut node_ids: Vec<i64> = edges.iter().flat_map(|(a, b, _)| [*a, *b]).collect();
        node_ids.sort();
        node_ids.dedup();
        let nodes = node_ids
            .into_iter()
            .map(|id| NodeRecord {
                node: NodeId(id),
                point_x: id as f64,
                point_y: 0.0,
                zone: 1,
                ..Default::default()
            })
            .collect();
        let links = edges
            .iter()
            .map(|(a, b, miles)| LinkRecord {
                anode: NodeId(*a),
                bnode: NodeId(*b),
                directions: Directions::TwoWaySymmetric,
                type1: 1,
                miles: *miles,
                ..Default::default()
            })
            .collect();
        HwyNetwork::from_tables(nodes, links, vec![], vec![]).expect("fixture should assemble")
    }

    #[test]
    fn test_shortest_path_prefers_lower_total_miles() {
        // 1 -> 2 -> 3 costs 2.0; the direct 1 -> 3 edge costs 5.0
        let net = network(&[(1, 2, 1.0), (2, 3, 1.0), (1, 3, 5.0)]);
        let graph = LinkGraph::new(&net).expect("graph should build");
        let path = shortest_path(&graph, NodeId(1), NodeId(3)).expect("path should exist");
        assert_eq!(path, vec![NodeId(1), NodeId(2), NodeId(3)]);
    }

    #[test]
    fn test_shortest_path_unreachable() {
        let net = network(&[(1, 2, 1.0), (3, 4, 1.0)]);
        let graph = LinkGraph::new(&net).expect("graph should build");
        assert_eq!(shortest_path(&graph, NodeId(1), NodeId(4)), None);
    }

    #[test]
    fn test_connected_components() {
        let net = network(&[(1, 2, 1.0), (2, 3, 1.0), (10, 11, 1.0)]);
        let graph = LinkGraph::new(&net).expect("graph should build");
        let components = connected_components(&graph);
        assert_eq!(components.len(), 2);
        assert_eq!(components[0], vec![NodeId(1), NodeId(2), NodeId(3)]);
        assert_eq!(components[1], vec![NodeId(10), NodeId(11)]);
    }
}

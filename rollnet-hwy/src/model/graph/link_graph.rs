use super::{AdjacencyDirection as Dir, AdjacencyList, EdgesByOd};
use crate::model::{
    network::{HwyNetwork, LinkKey, NodeId},
    NetworkError,
};
use geo::Point;
use rstar::{primitives::GeomWithData, RTree};
use std::collections::HashSet;

type IndexedNode = GeomWithData<[f64; 2], (NodeId, u16)>;

/// an in-memory directed graph over the regular (non-skeleton) links of a
/// network snapshot, for connectivity checks and shortest-path itinerary
/// repair. edges are keyed by od pair and weighted by link length; an rtree
/// over incident node points answers nearest-neighbor replacement queries.
pub struct LinkGraph {
    /// forward and reverse adjacency list
    adj: AdjacencyList,
    /// for each directed od pair, the stored link it traverses and its length
    edges: EdgesByOd,
    /// spatial index over the nodes incident to at least one edge
    node_index: RTree<IndexedNode>,
}

impl LinkGraph {
    /// builds the graph from the base-link subset of a network snapshot.
    /// skeleton links are placeholders and contribute no edges. two-way
    /// links contribute both traversal directions.
    pub fn new(network: &HwyNetwork) -> Result<LinkGraph, NetworkError> {
        let mut adj: AdjacencyList = AdjacencyList::new();
        let mut edges: EdgesByOd = EdgesByOd::new();
        let mut incident: HashSet<NodeId> = HashSet::new();

        for (key, link) in network.links.iter() {
            if link.is_skeleton() {
                continue;
            }
            insert_edge(&mut adj, &mut edges, link.anode, link.bnode, *key, link.miles);
            if link.directions.has_reverse() {
                insert_edge(&mut adj, &mut edges, link.bnode, link.anode, *key, link.miles);
            }
            incident.insert(link.anode);
            incident.insert(link.bnode);
        }

        let mut indexed: Vec<IndexedNode> = Vec::with_capacity(incident.len());
        for node_id in incident.iter() {
            let node = network.get_node(node_id)?;
            indexed.push(IndexedNode::new(
                [node.point_x, node.point_y],
                (*node_id, node.zone),
            ));
        }
        let node_index = RTree::bulk_load(indexed);

        Ok(LinkGraph {
            adj,
            edges,
            node_index,
        })
    }

    pub fn contains_node(&self, node_id: &NodeId) -> bool {
        self.adj.contains_key(&(*node_id, Dir::Forward))
            || self.adj.contains_key(&(*node_id, Dir::Reverse))
    }

    /// whether a traversable edge exists from source to destination
    pub fn contains_edge(&self, src: &NodeId, dst: &NodeId) -> bool {
        self.edges.contains_key(&(*src, *dst))
    }

    /// the stored link and its length for a directed od pair
    pub fn get_edge(&self, src: &NodeId, dst: &NodeId) -> Option<&(LinkKey, f64)> {
        self.edges.get(&(*src, *dst))
    }

    pub fn get_neighbors(&self, node_id: &NodeId, direction: Dir) -> Option<&HashSet<NodeId>> {
        self.adj.get(&(*node_id, direction))
    }

    pub fn get_out_neighbors(&self, origin: &NodeId) -> Option<&HashSet<NodeId>> {
        self.get_neighbors(origin, Dir::Forward)
    }

    pub fn get_in_neighbors(&self, destination: &NodeId) -> Option<&HashSet<NodeId>> {
        self.get_neighbors(destination, Dir::Reverse)
    }

    /// the set of nodes incident to at least one edge
    pub fn connected_nodes(&self) -> HashSet<NodeId> {
        self.adj.keys().map(|(node, _)| *node).collect()
    }

    pub fn n_connected_nodes(&self) -> usize {
        // when any node is connected it has exactly two entries (fwd + rev)
        self.adj.len() / 2
    }

    pub fn n_edges(&self) -> usize {
        self.edges.len()
    }

    /// the connected node nearest to a point, regardless of zone
    pub fn nearest_node(&self, point: &Point<f64>) -> Option<NodeId> {
        self.node_index
            .nearest_neighbor(&[point.x(), point.y()])
            .map(|indexed| indexed.data.0)
    }

    /// the connected node nearest to a point among nodes sharing the given
    /// zone, used for park-and-ride terminal replacement
    pub fn nearest_node_in_zone(&self, point: &Point<f64>, zone: u16) -> Option<NodeId> {
        self.node_index
            .nearest_neighbor_iter(&[point.x(), point.y()])
            .find(|indexed| indexed.data.1 == zone)
            .map(|indexed| indexed.data.0)
    }
}

fn insert_edge(
    adj: &mut AdjacencyList,
    edges: &mut EdgesByOd,
    src: NodeId,
    dst: NodeId,
    key: LinkKey,
    miles: f64,
) {
    edges.insert((src, dst), (key, miles));
    adj.entry((src, Dir::Forward)).or_default().insert(dst);
    adj.entry((src, Dir::Reverse)).or_default();
    adj.entry((dst, Dir::Reverse)).or_default().insert(src);
    adj.entry((dst, Dir::Forward)).or_default();
}

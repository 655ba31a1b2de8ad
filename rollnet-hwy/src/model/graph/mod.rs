mod adjacency_direction;
mod link_graph;
pub mod search;

pub use adjacency_direction::AdjacencyDirection;
pub use link_graph::LinkGraph;

use super::network::{LinkKey, NodeId};
use std::collections::{HashMap, HashSet};

pub type AdjacencyList = HashMap<(NodeId, AdjacencyDirection), HashSet<NodeId>>;
pub type EdgesByOd = HashMap<(NodeId, NodeId), (LinkKey, f64)>;

use serde::{Deserialize, Serialize};
use std::fmt::Display;

#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum AdjacencyDirection {
    Forward,
    Reverse,
}

impl Display for AdjacencyDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AdjacencyDirection::Forward => write!(f, "forward"),
            AdjacencyDirection::Reverse => write!(f, "reverse"),
        }
    }
}

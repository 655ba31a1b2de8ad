use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// project identifier, unique in the project table
#[derive(
    Debug, Default, Clone, Copy, Eq, PartialEq, PartialOrd, Ord, Deserialize, Serialize, Hash,
)]
pub struct Tipid(pub u32);

impl Display for Tipid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

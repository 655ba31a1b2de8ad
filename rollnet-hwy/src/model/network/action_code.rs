use crate::model::NetworkError;
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// the edit a coding row makes to its link:
/// 1 modifies an existing regular link, 2 replaces a regular link by copying
/// its attributes onto a skeleton, 3 deletes (reverts to skeleton), 4 adds a
/// new link by populating a skeleton.
#[derive(Debug, Clone, Copy, Eq, PartialEq, PartialOrd, Ord, Hash)]
pub enum ActionCode {
    Modify,
    Replace,
    Delete,
    Add,
}

impl ActionCode {
    pub fn as_i32(&self) -> i32 {
        match self {
            ActionCode::Modify => 1,
            ActionCode::Replace => 2,
            ActionCode::Delete => 3,
            ActionCode::Add => 4,
        }
    }

    pub fn from_i32(value: i32) -> Result<ActionCode, NetworkError> {
        match value {
            1 => Ok(ActionCode::Modify),
            2 => Ok(ActionCode::Replace),
            3 => Ok(ActionCode::Delete),
            4 => Ok(ActionCode::Add),
            _ => Err(NetworkError::MalformedActionCode(value)),
        }
    }
}

impl Display for ActionCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_i32())
    }
}

impl Serialize for ActionCode {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i32(self.as_i32())
    }
}

impl<'de> Deserialize<'de> for ActionCode {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = i32::deserialize(deserializer)?;
        ActionCode::from_i32(value).map_err(serde::de::Error::custom)
    }
}

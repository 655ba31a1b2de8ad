use super::{Baselink, LinkKey, NodeId};
use crate::model::NetworkError;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;

/// stable derived link identifier, rendered as `"{ANODE}-{BNODE}-{BASELINK}"`.
///
/// the string form is what coding tables and report files carry; in memory it
/// stays decomposed so the link table can be keyed without re-parsing.
#[derive(Debug, Clone, Copy, Eq, PartialEq, PartialOrd, Ord, Hash)]
pub struct Abb {
    pub anode: NodeId,
    pub bnode: NodeId,
    pub baselink: Baselink,
}

impl Abb {
    pub fn new(anode: NodeId, bnode: NodeId, baselink: Baselink) -> Abb {
        Abb {
            anode,
            bnode,
            baselink,
        }
    }

    pub fn key(&self) -> LinkKey {
        (self.anode, self.bnode, self.baselink)
    }

    /// the same node pair with the opposite baselink state
    pub fn with_baselink(&self, baselink: Baselink) -> Abb {
        Abb {
            anode: self.anode,
            bnode: self.bnode,
            baselink,
        }
    }
}

impl From<LinkKey> for Abb {
    fn from((anode, bnode, baselink): LinkKey) -> Abb {
        Abb {
            anode,
            bnode,
            baselink,
        }
    }
}

impl Display for Abb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}-{}", self.anode, self.bnode, self.baselink)
    }
}

impl FromStr for Abb {
    type Err = NetworkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split('-');
        let malformed = || NetworkError::MalformedAbb(s.to_string());
        let anode = parts
            .next()
            .and_then(|p| p.parse::<i64>().ok())
            .ok_or_else(malformed)?;
        let bnode = parts
            .next()
            .and_then(|p| p.parse::<i64>().ok())
            .ok_or_else(malformed)?;
        let baselink = parts
            .next()
            .and_then(|p| p.parse::<u8>().ok())
            .and_then(Baselink::from_u8)
            .ok_or_else(malformed)?;
        if parts.next().is_some() {
            return Err(malformed());
        }
        Ok(Abb::new(NodeId(anode), NodeId(bnode), baselink))
    }
}

impl Serialize for Abb {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Abb {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Abb::from_str(&s).map_err(serde::de::Error::custom)
    }
}

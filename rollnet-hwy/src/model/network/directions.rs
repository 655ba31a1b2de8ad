use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// how many logical directions a stored link row represents.
/// a two-way coded link carries an independent "side 2" attribute set.
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq, PartialOrd, Ord, Hash)]
pub enum Directions {
    #[default]
    OneWay,
    TwoWaySymmetric,
    TwoWayCoded,
}

impl Directions {
    pub fn as_i32(&self) -> i32 {
        match self {
            Directions::OneWay => 1,
            Directions::TwoWaySymmetric => 2,
            Directions::TwoWayCoded => 3,
        }
    }

    pub fn from_i32(value: i32) -> Option<Directions> {
        match value {
            1 => Some(Directions::OneWay),
            2 => Some(Directions::TwoWaySymmetric),
            3 => Some(Directions::TwoWayCoded),
            _ => None,
        }
    }

    /// whether a reverse (b -> a) traversal exists for this link row
    pub fn has_reverse(&self) -> bool {
        !matches!(self, Directions::OneWay)
    }

    /// whether side-2 fields carry meaning for this link row
    pub fn has_side_two(&self) -> bool {
        matches!(self, Directions::TwoWayCoded)
    }
}

impl Display for Directions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_i32())
    }
}

impl Serialize for Directions {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i32(self.as_i32())
    }
}

impl<'de> Deserialize<'de> for Directions {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = i32::deserialize(deserializer)?;
        Directions::from_i32(value).ok_or_else(|| {
            serde::de::Error::custom(format!("'{value}' is not a valid directions value"))
        })
    }
}

use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// distinguishes a permanent skeleton placeholder (0) from a real,
/// independently addable/deletable link (1).
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq, PartialOrd, Ord, Hash)]
pub enum Baselink {
    Skeleton,
    #[default]
    Base,
}

impl Baselink {
    pub fn as_u8(&self) -> u8 {
        match self {
            Baselink::Skeleton => 0,
            Baselink::Base => 1,
        }
    }

    pub fn from_u8(value: u8) -> Option<Baselink> {
        match value {
            0 => Some(Baselink::Skeleton),
            1 => Some(Baselink::Base),
            _ => None,
        }
    }
}

impl Display for Baselink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_u8())
    }
}

impl Serialize for Baselink {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.as_u8())
    }
}

impl<'de> Deserialize<'de> for Baselink {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = u8::deserialize(deserializer)?;
        Baselink::from_u8(value).ok_or_else(|| {
            serde::de::Error::custom(format!("'{value}' is not a valid baselink flag"))
        })
    }
}

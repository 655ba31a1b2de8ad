use super::NodeId;
use geo::Point;
use serde::{Deserialize, Serialize};

/// the "no zone" sentinel for nodes outside the zone system
pub const NO_ZONE: u16 = 9999;

#[derive(Debug, Default, Clone, Serialize, Deserialize, PartialEq)]
pub struct NodeRecord {
    pub node: NodeId,
    pub point_x: f64,
    pub point_y: f64,
    pub zone: u16,
    pub area_type: u8,
    pub capacity_zone: u8,
}

impl NodeRecord {
    pub fn get_point(&self) -> Point<f64> {
        Point::new(self.point_x, self.point_y)
    }

    pub fn has_zone(&self) -> bool {
        self.zone != NO_ZONE
    }
}

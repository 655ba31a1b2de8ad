mod abb;
mod action_code;
mod baselink;
mod coding_row;
mod directions;
mod hwy_network;
mod link_record;
mod node_id;
mod node_record;
mod project_record;
mod tipid;

pub use abb::Abb;
pub use action_code::ActionCode;
pub use baselink::Baselink;
pub use coding_row::{AttributeDelta, CodingRow};
pub use directions::Directions;
pub use hwy_network::{HwyNetwork, IntegrityViolation};
pub use link_record::LinkRecord;
pub use node_id::NodeId;
pub use node_record::{NodeRecord, NO_ZONE};
pub use project_record::ProjectRecord;
pub use tipid::Tipid;

use std::collections::HashMap;

/// a stored link is unique by its node pair and baselink state
pub type LinkKey = (NodeId, NodeId, Baselink);

pub type Nodes = HashMap<NodeId, NodeRecord>;
pub type Links = HashMap<LinkKey, LinkRecord>;
pub type Projects = HashMap<Tipid, ProjectRecord>;

use super::{Abb, Baselink, Directions, LinkKey, NodeId};
use serde::{Deserialize, Serialize};

/// one stored directional link row. a row may represent one or two logical
/// directions depending on `directions`; side-2 fields only carry meaning
/// for two-way coded links.
///
/// `new_baselink` is a working field: the projected post-edit baselink state,
/// committed (and the abb recomputed) at finalization.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LinkRecord {
    pub anode: NodeId,
    pub bnode: NodeId,
    pub baselink: Baselink,
    pub new_baselink: Baselink,
    pub directions: Directions,
    pub type1: i32,
    pub type2: i32,
    pub ampm1: i32,
    pub ampm2: i32,
    pub postedspeed1: i32,
    pub postedspeed2: i32,
    pub thrulanes1: i32,
    pub thrulanes2: i32,
    pub thrulanewidth1: i32,
    pub thrulanewidth2: i32,
    pub parklanes1: i32,
    pub parklanes2: i32,
    pub parkres1: String,
    pub parkres2: String,
    pub sigic: i32,
    pub cltl: i32,
    pub rrgradecross: i32,
    pub tolldollars: f64,
    pub modes: i32,
    pub miles: f64,
    pub project: String,
    pub description: String,
}

impl Default for LinkRecord {
    fn default() -> Self {
        LinkRecord {
            anode: NodeId(0),
            bnode: NodeId(0),
            baselink: Baselink::Base,
            new_baselink: Baselink::Base,
            directions: Directions::OneWay,
            type1: 0,
            type2: 0,
            ampm1: 0,
            ampm2: 0,
            postedspeed1: 0,
            postedspeed2: 0,
            thrulanes1: 0,
            thrulanes2: 0,
            thrulanewidth1: 0,
            thrulanewidth2: 0,
            parklanes1: 0,
            parklanes2: 0,
            parkres1: String::new(),
            parkres2: String::new(),
            sigic: 0,
            cltl: 0,
            rrgradecross: 0,
            tolldollars: 0.0,
            modes: 0,
            miles: 0.0,
            project: String::new(),
            description: String::new(),
        }
    }
}

impl LinkRecord {
    /// link type value marking a toll plaza when paired with a zero posted speed
    pub const TYPE_TOLL: i32 = 7;

    pub fn key(&self) -> LinkKey {
        (self.anode, self.bnode, self.baselink)
    }

    pub fn abb(&self) -> Abb {
        Abb::new(self.anode, self.bnode, self.baselink)
    }

    /// a skeleton placeholder at this node pair, keeping only identity and length
    pub fn skeleton(anode: NodeId, bnode: NodeId, miles: f64) -> LinkRecord {
        LinkRecord {
            anode,
            bnode,
            baselink: Baselink::Skeleton,
            new_baselink: Baselink::Skeleton,
            miles,
            ..Default::default()
        }
    }

    pub fn is_skeleton(&self) -> bool {
        self.baselink == Baselink::Skeleton
    }

    /// a real link whose pending state is skeleton was deleted by a project
    /// and leaves the network at finalization
    pub fn is_net_deleted(&self) -> bool {
        self.baselink == Baselink::Base && self.new_baselink == Baselink::Skeleton
    }

    /// toll plazas are coded as a toll link type with a zero posted speed
    pub fn is_toll_plaza_side1(&self) -> bool {
        self.type1 == Self::TYPE_TOLL && self.postedspeed1 == 0
    }

    pub fn is_toll_plaza_side2(&self) -> bool {
        self.type2 == Self::TYPE_TOLL && self.postedspeed2 == 0
    }

    /// one-way and symmetric two-way links carry no independent side-2 coding
    pub fn clear_side_two(&mut self) {
        self.type2 = 0;
        self.ampm2 = 0;
        self.postedspeed2 = 0;
        self.thrulanes2 = 0;
        self.thrulanewidth2 = 0;
        self.parklanes2 = 0;
        self.parkres2 = String::new();
    }

    /// copies the full attribute set from another link row, keeping this
    /// row's identity (node pair, baselink state) and length intact.
    pub fn copy_attributes_from(&mut self, source: &LinkRecord) {
        self.directions = source.directions;
        self.type1 = source.type1;
        self.type2 = source.type2;
        self.ampm1 = source.ampm1;
        self.ampm2 = source.ampm2;
        self.postedspeed1 = source.postedspeed1;
        self.postedspeed2 = source.postedspeed2;
        self.thrulanes1 = source.thrulanes1;
        self.thrulanes2 = source.thrulanes2;
        self.thrulanewidth1 = source.thrulanewidth1;
        self.thrulanewidth2 = source.thrulanewidth2;
        self.parklanes1 = source.parklanes1;
        self.parklanes2 = source.parklanes2;
        self.parkres1 = source.parkres1.clone();
        self.parkres2 = source.parkres2.clone();
        self.sigic = source.sigic;
        self.cltl = source.cltl;
        self.rrgradecross = source.rrgradecross;
        self.tolldollars = source.tolldollars;
        self.modes = source.modes;
    }

    /// reverts this row to skeleton coding, keeping identity and length.
    /// the baselink flag itself is only committed at finalization via
    /// `new_baselink`.
    pub fn clear_to_skeleton(&mut self) {
        let replacement = LinkRecord::skeleton(self.anode, self.bnode, self.miles);
        let project = std::mem::take(&mut self.project);
        let description = std::mem::take(&mut self.description);
        let baselink = self.baselink;
        *self = replacement;
        self.baselink = baselink;
        self.new_baselink = Baselink::Skeleton;
        self.project = project;
        self.description = description;
    }
}

use super::{Abb, ActionCode, Baselink, LinkRecord, NodeId, Tipid};
use serde::{Deserialize, Serialize};

/// the `NEW_*`/`ADD_*` attribute-delta set carried by a coding row.
///
/// a zero value (empty string for park restrictions) is the "no change"
/// sentinel throughout; requesting a true zero through a delta is
/// inexpressible, matching the behavior of the system being modeled.
/// `ADD_*` fields are additive rather than overriding.
#[derive(Debug, Default, Clone, Serialize, Deserialize, PartialEq)]
pub struct AttributeDelta {
    pub new_directions: i32,
    pub new_type1: i32,
    pub new_type2: i32,
    pub new_ampm1: i32,
    pub new_ampm2: i32,
    pub new_postedspeed1: i32,
    pub new_postedspeed2: i32,
    pub new_thrulanes1: i32,
    pub new_thrulanes2: i32,
    pub new_thrulanewidth1: i32,
    pub new_thrulanewidth2: i32,
    pub add_parklanes1: i32,
    pub add_parklanes2: i32,
    #[serde(default)]
    pub new_parkres1: String,
    #[serde(default)]
    pub new_parkres2: String,
    pub add_sigic: i32,
    pub add_cltl: i32,
    pub add_rrgradecross: i32,
    pub new_tolldollars: f64,
    pub new_modes: i32,
}

impl AttributeDelta {
    /// whether every field carries the "no change" sentinel
    pub fn is_empty(&self) -> bool {
        self.new_directions == 0
            && self.new_type1 == 0
            && self.new_type2 == 0
            && self.new_ampm1 == 0
            && self.new_ampm2 == 0
            && self.new_postedspeed1 == 0
            && self.new_postedspeed2 == 0
            && self.new_thrulanes1 == 0
            && self.new_thrulanes2 == 0
            && self.new_thrulanewidth1 == 0
            && self.new_thrulanewidth2 == 0
            && self.add_parklanes1 == 0
            && self.add_parklanes2 == 0
            && self.new_parkres1.is_empty()
            && self.new_parkres2.is_empty()
            && self.add_sigic == 0
            && self.add_cltl == 0
            && self.add_rrgradecross == 0
            && self.new_tolldollars == 0.0
            && self.new_modes == 0
    }

    /// whether every side-2 field carries the "no change" sentinel
    pub fn side_two_is_empty(&self) -> bool {
        self.new_type2 == 0
            && self.new_ampm2 == 0
            && self.new_postedspeed2 == 0
            && self.new_thrulanes2 == 0
            && self.new_thrulanewidth2 == 0
            && self.add_parklanes2 == 0
            && self.new_parkres2.is_empty()
    }

    /// captures a link's full attribute set as a delta, used when a replace
    /// of a since-deleted link is promoted to a fresh add.
    pub fn from_link(link: &LinkRecord) -> AttributeDelta {
        AttributeDelta {
            new_directions: link.directions.as_i32(),
            new_type1: link.type1,
            new_type2: link.type2,
            new_ampm1: link.ampm1,
            new_ampm2: link.ampm2,
            new_postedspeed1: link.postedspeed1,
            new_postedspeed2: link.postedspeed2,
            new_thrulanes1: link.thrulanes1,
            new_thrulanes2: link.thrulanes2,
            new_thrulanewidth1: link.thrulanewidth1,
            new_thrulanewidth2: link.thrulanewidth2,
            add_parklanes1: link.parklanes1,
            add_parklanes2: link.parklanes2,
            new_parkres1: link.parkres1.clone(),
            new_parkres2: link.parkres2.clone(),
            add_sigic: link.sigic,
            add_cltl: link.cltl,
            add_rrgradecross: link.rrgradecross,
            new_tolldollars: link.tolldollars,
            new_modes: link.modes,
        }
    }

    /// resets each `NEW_*` field to the sentinel wherever it equals the value
    /// just committed to the link, preventing stale double-application by
    /// later-year rows. returns the number of fields cleared.
    ///
    /// note: a field that coincidentally equals the committed value is also
    /// cleared.
    pub fn clear_matching_new_fields(&mut self, committed: &LinkRecord) -> usize {
        let mut cleared = 0;
        let mut clear_int = |field: &mut i32, committed_value: i32| {
            if *field != 0 && *field == committed_value {
                *field = 0;
                cleared += 1;
            }
        };
        clear_int(&mut self.new_directions, committed.directions.as_i32());
        clear_int(&mut self.new_type1, committed.type1);
        clear_int(&mut self.new_type2, committed.type2);
        clear_int(&mut self.new_ampm1, committed.ampm1);
        clear_int(&mut self.new_ampm2, committed.ampm2);
        clear_int(&mut self.new_postedspeed1, committed.postedspeed1);
        clear_int(&mut self.new_postedspeed2, committed.postedspeed2);
        clear_int(&mut self.new_thrulanes1, committed.thrulanes1);
        clear_int(&mut self.new_thrulanes2, committed.thrulanes2);
        clear_int(&mut self.new_thrulanewidth1, committed.thrulanewidth1);
        clear_int(&mut self.new_thrulanewidth2, committed.thrulanewidth2);
        clear_int(&mut self.new_modes, committed.modes);
        if !self.new_parkres1.is_empty() && self.new_parkres1 == committed.parkres1 {
            self.new_parkres1 = String::new();
            cleared += 1;
        }
        if !self.new_parkres2.is_empty() && self.new_parkres2 == committed.parkres2 {
            self.new_parkres2 = String::new();
            cleared += 1;
        }
        if self.new_tolldollars != 0.0 && self.new_tolldollars == committed.tolldollars {
            self.new_tolldollars = 0.0;
            cleared += 1;
        }
        cleared
    }
}

/// one project's edit instruction for one link.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CodingRow {
    pub tipid: Tipid,
    pub abb: Abb,
    pub action: ActionCode,
    pub rep_anode: NodeId,
    pub rep_bnode: NodeId,
    pub delta: AttributeDelta,
    pub use_flag: bool,
    #[serde(default)]
    pub process_notes: String,
}

impl CodingRow {
    pub fn new(tipid: Tipid, abb: Abb, action: ActionCode) -> CodingRow {
        CodingRow {
            tipid,
            abb,
            action,
            rep_anode: NodeId(0),
            rep_bnode: NodeId(0),
            delta: AttributeDelta::default(),
            use_flag: true,
            process_notes: String::new(),
        }
    }

    /// the regular link this row replaces (action 2 only). zero rep nodes are
    /// the "none" sentinel.
    pub fn rep_abb(&self) -> Option<Abb> {
        if self.rep_anode == NodeId(0) || self.rep_bnode == NodeId(0) {
            None
        } else {
            Some(Abb::new(self.rep_anode, self.rep_bnode, Baselink::Base))
        }
    }

    pub fn has_rep(&self) -> bool {
        self.rep_anode != NodeId(0) || self.rep_bnode != NodeId(0)
    }

    pub fn append_note(&mut self, note: &str) {
        if self.process_notes.is_empty() {
            self.process_notes = note.to_string();
        } else {
            self.process_notes.push_str("; ");
            self.process_notes.push_str(note);
        }
    }

    /// removes the row from future consideration, recording why
    pub fn retire(&mut self, note: &str) {
        self.use_flag = false;
        self.append_note(note);
    }
}

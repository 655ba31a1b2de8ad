use crate::model::network::{ActionCode, Baselink, CodingRow, HwyNetwork, LinkRecord};
use itertools::Itertools;
use serde::{Deserialize, Serialize};

/// disposition of one coding row under the semantic rule set.
/// the first failing rule wins; warnings accumulate.
#[derive(Debug, Clone, PartialEq)]
pub enum RuleOutcome {
    Accept,
    Reject(String),
    Warn(Vec<String>),
}

/// one flagged row for the coding_flags report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CodingFlag {
    pub tipid: String,
    pub abb: String,
    pub disposition: String,
    pub reason: String,
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct CodingCheckSummary {
    pub checked: usize,
    pub rejected: usize,
    pub warned: usize,
}

/// evaluates the full semantic rule set against one active coding row.
/// rejection reasons name the rule in plain language; warnings keep the row
/// eligible but annotate it for review.
pub fn check_row(network: &HwyNetwork, row: &CodingRow) -> RuleOutcome {
    let delta = &row.delta;

    // rule 1: referenced project and link must exist
    if !network.projects.contains_key(&row.tipid) {
        return RuleOutcome::Reject(format!("tipid {} not in project table", row.tipid));
    }
    let link = match network.get_link(&row.abb) {
        Ok(link) => link,
        Err(_) => return RuleOutcome::Reject(format!("link {} not in link table", row.abb)),
    };

    // rule 2: delta fields within their coded ranges
    if let Some(reason) = range_violation(delta) {
        return RuleOutcome::Reject(reason);
    }

    // rule 3: baselink/action compatibility
    let compatible = match link.baselink {
        Baselink::Skeleton => matches!(row.action, ActionCode::Replace | ActionCode::Add),
        Baselink::Base => matches!(row.action, ActionCode::Modify | ActionCode::Delete),
    };
    if !compatible {
        return RuleOutcome::Reject(format!(
            "action {} not permitted on a baselink={} link",
            row.action, link.baselink
        ));
    }

    // rule 4: replacement references only carry meaning for action 2
    if row.has_rep() && row.action != ActionCode::Replace {
        return RuleOutcome::Reject(format!(
            "rep_anode/rep_bnode coded on an action {} row",
            row.action
        ));
    }

    // rule 5: replace and delete are pure structural operations
    if matches!(row.action, ActionCode::Replace | ActionCode::Delete) && !delta.is_empty() {
        return RuleOutcome::Reject(format!(
            "action {} row carries attribute deltas",
            row.action
        ));
    }

    // rule 6: replace requires a resolvable replaced link
    if row.action == ActionCode::Replace {
        match row.rep_abb() {
            None => {
                return RuleOutcome::Reject(String::from(
                    "action 2 row has no replaced link coded",
                ))
            }
            Some(rep) => {
                if !network.links.contains_key(&rep.key()) {
                    return RuleOutcome::Reject(format!(
                        "replaced link {rep} not in link table"
                    ));
                }
            }
        }
    }

    // rule 7: add must fully specify the new link, with the toll-type speed
    // exception
    if row.action == ActionCode::Add {
        let required = [
            ("new_directions", delta.new_directions),
            ("new_type1", delta.new_type1),
            ("new_ampm1", delta.new_ampm1),
            ("new_thrulanes1", delta.new_thrulanes1),
            ("new_thrulanewidth1", delta.new_thrulanewidth1),
            ("new_modes", delta.new_modes),
        ];
        for (name, value) in required {
            if value == 0 {
                return RuleOutcome::Reject(format!("action 4 row missing required {name}"));
            }
        }
        if delta.new_postedspeed1 == 0 && delta.new_type1 != LinkRecord::TYPE_TOLL {
            return RuleOutcome::Reject(String::from(
                "action 4 row missing required new_postedspeed1 on a non-toll link",
            ));
        }
    }

    // rule 8: side-2 coding must match the resulting directions. a sentinel
    // new_directions inherits the stored value, and stored side-2 fields
    // count toward the directions=3 requirement.
    let effective = |coded: i32, stored: i32| if coded != 0 { coded } else { stored };
    match effective(delta.new_directions, link.directions.as_i32()) {
        1 | 2 => {
            if !delta.side_two_is_empty() {
                return RuleOutcome::Reject(format!(
                    "side-2 fields coded on a link resolving to directions={}",
                    effective(delta.new_directions, link.directions.as_i32())
                ));
            }
        }
        3 => {
            let type2 = effective(delta.new_type2, link.type2);
            let speed_ok = effective(delta.new_postedspeed2, link.postedspeed2) != 0
                || type2 == LinkRecord::TYPE_TOLL;
            let filled = type2 != 0
                && effective(delta.new_ampm2, link.ampm2) != 0
                && effective(delta.new_thrulanes2, link.thrulanes2) != 0
                && effective(delta.new_thrulanewidth2, link.thrulanewidth2) != 0
                && speed_ok;
            if !filled {
                return RuleOutcome::Reject(String::from(
                    "directions=3 without the required side-2 fields",
                ));
            }
        }
        _ => {}
    }

    // rule 9: replacing or two-way coding a link with a stored reverse
    // counterpart would duplicate the pair; such edits must be adds
    let reverse_hazard = network.has_reverse_counterpart(&row.abb);
    if reverse_hazard && (row.action == ActionCode::Replace || delta.new_directions > 1) {
        return RuleOutcome::Reject(format!(
            "link {} has a stored reverse counterpart, use action 4 instead",
            row.abb
        ));
    }

    // rule 10: a toll plaza losing its toll coding must receive a real speed
    if row.action == ActionCode::Modify {
        let losing_side1 = link.is_toll_plaza_side1()
            && delta.new_type1 != 0
            && delta.new_type1 != LinkRecord::TYPE_TOLL;
        if losing_side1 && delta.new_postedspeed1 == 0 {
            return RuleOutcome::Reject(String::from(
                "toll plaza losing toll coding without a new side-1 posted speed",
            ));
        }
        let losing_side2 = link.is_toll_plaza_side2()
            && delta.new_type2 != 0
            && delta.new_type2 != LinkRecord::TYPE_TOLL;
        if losing_side2 && delta.new_postedspeed2 == 0 {
            return RuleOutcome::Reject(String::from(
                "toll plaza losing toll coding without a new side-2 posted speed",
            ));
        }
    }

    // rule 11: advisory only
    let mut warnings: Vec<String> = vec![];
    if row.action == ActionCode::Modify && delta.is_empty() {
        warnings.push(String::from("action 1 row makes no attribute change"));
    }
    if row.action == ActionCode::Modify && reverse_hazard {
        warnings.push(format!(
            "link {} has reverse-duplication potential",
            row.abb
        ));
    }
    if warnings.is_empty() {
        RuleOutcome::Accept
    } else {
        RuleOutcome::Warn(warnings)
    }
}

fn range_violation(delta: &crate::model::network::AttributeDelta) -> Option<String> {
    let checks: [(&str, i32, std::ops::RangeInclusive<i32>); 13] = [
        ("new_directions", delta.new_directions, 0..=3),
        ("new_type1", delta.new_type1, 0..=8),
        ("new_type2", delta.new_type2, 0..=8),
        ("new_ampm1", delta.new_ampm1, 0..=4),
        ("new_ampm2", delta.new_ampm2, 0..=4),
        ("new_postedspeed1", delta.new_postedspeed1, 0..=i32::MAX),
        ("new_postedspeed2", delta.new_postedspeed2, 0..=i32::MAX),
        ("new_thrulanes1", delta.new_thrulanes1, 0..=i32::MAX),
        ("new_thrulanes2", delta.new_thrulanes2, 0..=i32::MAX),
        ("new_thrulanewidth1", delta.new_thrulanewidth1, 0..=i32::MAX),
        ("new_thrulanewidth2", delta.new_thrulanewidth2, 0..=i32::MAX),
        ("new_modes", delta.new_modes, 0..=5),
        ("add_sigic", delta.add_sigic, 0..=1),
    ];
    for (name, value, range) in checks {
        if !range.contains(&value) {
            return Some(format!("{name}={value} outside coded range"));
        }
    }
    for (name, value) in [
        ("add_cltl", delta.add_cltl),
        ("add_rrgradecross", delta.add_rrgradecross),
    ] {
        if !(-1..=1).contains(&value) {
            return Some(format!("{name}={value} outside coded range"));
        }
    }
    if delta.new_tolldollars < 0.0 {
        return Some(format!(
            "new_tolldollars={} outside coded range",
            delta.new_tolldollars
        ));
    }
    None
}

/// runs the semantic rule set over every active coding row, demoting failing
/// rows to unusable and annotating warned rows. returns the flags for the
/// coding_flags report along with counts.
pub fn apply_coding_checks(network: &mut HwyNetwork) -> (CodingCheckSummary, Vec<CodingFlag>) {
    // outcomes are evaluated against the unmutated table, then applied
    let outcomes = network
        .coding
        .iter()
        .enumerate()
        .filter(|(_, row)| row.use_flag)
        .map(|(i, row)| (i, check_row(network, row)))
        .collect_vec();

    let mut summary = CodingCheckSummary::default();
    let mut flags: Vec<CodingFlag> = vec![];
    for (i, outcome) in outcomes.into_iter() {
        summary.checked += 1;
        let row = &mut network.coding[i];
        match outcome {
            RuleOutcome::Accept => {}
            RuleOutcome::Reject(reason) => {
                summary.rejected += 1;
                flags.push(CodingFlag {
                    tipid: row.tipid.to_string(),
                    abb: row.abb.to_string(),
                    disposition: String::from("rejected"),
                    reason: reason.clone(),
                });
                row.retire(&reason);
            }
            RuleOutcome::Warn(warnings) => {
                summary.warned += 1;
                for warning in warnings.iter() {
                    flags.push(CodingFlag {
                        tipid: row.tipid.to_string(),
                        abb: row.abb.to_string(),
                        disposition: String::from("warning"),
                        reason: warning.clone(),
                    });
                    row.append_note(warning);
                }
            }
        }
    }
    log::info!(
        "coding checks: {} rows checked, {} rejected, {} warned",
        summary.checked,
        summary.rejected,
        summary.warned
    );
    (summary, flags)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::model::network::{
        Abb, AttributeDelta, Directions, LinkRecord, NodeId, NodeRecord, ProjectRecord, Tipid,
    };

    fn node(id: i64) -> NodeRecord {
        NodeRecord {
            node: NodeId(id),
            zone: 1,
            ..Default::default()
        }
    }

    fn network() -> HwyNetwork {
        let nodes = vec![node(10), node(20), node(30), node(40)];
        let links = vec![
            LinkRecord {
                anode: NodeId(10),
                bnode: NodeId(20),
                directions: Directions::OneWay,
                type1: 1,
                ampm1: 1,
                postedspeed1: 30,
                thrulanes1: 2,
                thrulanewidth1: 12,
                modes: 1,
                miles: 1.0,
                ..Default::default()
            },
            LinkRecord::skeleton(NodeId(30), NodeId(40), 0.5),
        ];
        let projects = vec![ProjectRecord {
            tipid: Tipid(100),
            completion_year: 2030,
            ..Default::default()
        }];
        HwyNetwork::from_tables(nodes, links, projects, vec![]).expect("fixture should assemble")
    }

    fn base_abb() -> Abb {
        Abb::new(NodeId(10), NodeId(20), Baselink::Base)
    }

    fn skeleton_abb() -> Abb {
        Abb::new(NodeId(30), NodeId(40), Baselink::Skeleton)
    }

    #[test]
    fn test_missing_tipid_rejected() {
        let net = network();
        let row = CodingRow::new(Tipid(999), base_abb(), ActionCode::Modify);
        let outcome = check_row(&net, &row);
        assert!(matches!(outcome, RuleOutcome::Reject(r) if r.contains("not in project table")));
    }

    #[test]
    fn test_action_baselink_compatibility() {
        let net = network();
        // delete on a skeleton is incompatible
        let row = CodingRow::new(Tipid(100), skeleton_abb(), ActionCode::Delete);
        assert!(matches!(check_row(&net, &row), RuleOutcome::Reject(_)));
        // add on a base link is incompatible
        let row = CodingRow::new(Tipid(100), base_abb(), ActionCode::Add);
        assert!(matches!(check_row(&net, &row), RuleOutcome::Reject(_)));
    }

    #[test]
    fn test_delete_with_deltas_rejected() {
        let net = network();
        let mut row = CodingRow::new(Tipid(100), base_abb(), ActionCode::Delete);
        row.delta.new_thrulanes1 = 2;
        let outcome = check_row(&net, &row);
        assert!(matches!(outcome, RuleOutcome::Reject(r) if r.contains("attribute deltas")));
    }

    #[test]
    fn test_add_requires_full_specification() {
        let net = network();
        let mut row = CodingRow::new(Tipid(100), skeleton_abb(), ActionCode::Add);
        row.delta = AttributeDelta {
            new_directions: 1,
            new_type1: 1,
            new_ampm1: 1,
            new_thrulanes1: 2,
            new_thrulanewidth1: 12,
            new_modes: 1,
            ..Default::default()
        };
        // no posted speed on a non-toll link
        assert!(matches!(check_row(&net, &row), RuleOutcome::Reject(_)));
        row.delta.new_postedspeed1 = 30;
        assert_eq!(check_row(&net, &row), RuleOutcome::Accept);
        // toll links are exempt from the speed requirement
        row.delta.new_postedspeed1 = 0;
        row.delta.new_type1 = LinkRecord::TYPE_TOLL;
        assert_eq!(check_row(&net, &row), RuleOutcome::Accept);
    }

    #[test]
    fn test_side_two_consistency() {
        let net = network();
        let mut row = CodingRow::new(Tipid(100), base_abb(), ActionCode::Modify);
        row.delta.new_directions = 1;
        row.delta.new_type2 = 1;
        let outcome = check_row(&net, &row);
        assert!(matches!(outcome, RuleOutcome::Reject(r) if r.contains("side-2")));
    }

    #[test]
    fn test_side_two_rejected_when_directions_unchanged() {
        // the delta leaves directions at the sentinel, so the stored
        // one-way value governs and the side-2 coding would be discarded
        let net = network();
        let mut row = CodingRow::new(Tipid(100), base_abb(), ActionCode::Modify);
        row.delta.new_type2 = 3;
        let outcome = check_row(&net, &row);
        assert!(matches!(outcome, RuleOutcome::Reject(r) if r.contains("side-2")));
    }

    #[test]
    fn test_stored_side_two_satisfies_two_way_coding() {
        let nodes = vec![node(10), node(20)];
        let links = vec![LinkRecord {
            anode: NodeId(10),
            bnode: NodeId(20),
            directions: Directions::TwoWayCoded,
            type1: 1,
            type2: 1,
            ampm1: 1,
            ampm2: 1,
            postedspeed1: 30,
            postedspeed2: 30,
            thrulanes1: 2,
            thrulanes2: 2,
            thrulanewidth1: 12,
            thrulanewidth2: 12,
            modes: 1,
            miles: 1.0,
            ..Default::default()
        }];
        let projects = vec![ProjectRecord {
            tipid: Tipid(100),
            completion_year: 2030,
            ..Default::default()
        }];
        let net = HwyNetwork::from_tables(nodes, links, projects, vec![])
            .expect("fixture should assemble");
        // recoding one side-2 field on an already two-way link is fine, the
        // stored fields cover the rest of the requirement
        let mut row = CodingRow::new(Tipid(100), base_abb(), ActionCode::Modify);
        row.delta.new_thrulanes2 = 3;
        assert_eq!(check_row(&net, &row), RuleOutcome::Accept);
    }

    #[test]
    fn test_noop_modify_warns() {
        let net = network();
        let row = CodingRow::new(Tipid(100), base_abb(), ActionCode::Modify);
        let outcome = check_row(&net, &row);
        assert!(matches!(outcome, RuleOutcome::Warn(w) if w[0].contains("no attribute change")));
    }

    #[test]
    fn test_apply_demotes_rejected_rows() {
        let mut net = network();
        let mut bad = CodingRow::new(Tipid(100), base_abb(), ActionCode::Delete);
        bad.delta.new_thrulanes1 = 2;
        let mut good = CodingRow::new(Tipid(100), base_abb(), ActionCode::Modify);
        good.delta.new_thrulanes1 = 3;
        net.coding = vec![bad, good];
        let (summary, flags) = apply_coding_checks(&mut net);
        assert_eq!(summary.checked, 2);
        assert_eq!(summary.rejected, 1);
        assert!(!net.coding[0].use_flag);
        assert!(!net.coding[0].process_notes.is_empty());
        assert!(net.coding[1].use_flag);
        assert_eq!(flags.len(), 1);
    }
}

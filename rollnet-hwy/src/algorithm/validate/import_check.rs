use crate::model::network::{
    Abb, ActionCode, AttributeDelta, Baselink, CodingRow, HwyNetwork, NodeId, Tipid,
};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// one raw project-coding import row, prior to structural validation.
/// required fields are optional here so that malformed rows can be carried
/// into the error export instead of failing deserialization.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct RawCodingRow {
    pub tipid: Option<u32>,
    pub anode: Option<i64>,
    pub bnode: Option<i64>,
    pub action_code: Option<i32>,
    #[serde(default)]
    pub rep_anode: i64,
    #[serde(default)]
    pub rep_bnode: i64,
    #[serde(default)]
    pub new_directions: i32,
    #[serde(default)]
    pub new_type1: i32,
    #[serde(default)]
    pub new_type2: i32,
    #[serde(default)]
    pub new_ampm1: i32,
    #[serde(default)]
    pub new_ampm2: i32,
    #[serde(default)]
    pub new_postedspeed1: i32,
    #[serde(default)]
    pub new_postedspeed2: i32,
    #[serde(default)]
    pub new_thrulanes1: i32,
    #[serde(default)]
    pub new_thrulanes2: i32,
    #[serde(default)]
    pub new_thrulanewidth1: i32,
    #[serde(default)]
    pub new_thrulanewidth2: i32,
    #[serde(default)]
    pub add_parklanes1: i32,
    #[serde(default)]
    pub add_parklanes2: i32,
    #[serde(default)]
    pub new_parkres1: String,
    #[serde(default)]
    pub new_parkres2: String,
    #[serde(default)]
    pub add_sigic: i32,
    #[serde(default)]
    pub add_cltl: i32,
    #[serde(default)]
    pub add_rrgradecross: i32,
    #[serde(default)]
    pub new_tolldollars: f64,
    #[serde(default)]
    pub new_modes: i32,
}

/// an offending import row and the structural reason it was refused,
/// exported for human review when a batch aborts
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportViolation {
    pub row_number: usize,
    pub tipid: String,
    pub anode: String,
    pub bnode: String,
    pub reason: String,
}

impl ImportViolation {
    fn new(row_number: usize, raw: &RawCodingRow, reason: String) -> ImportViolation {
        let render = |v: Option<i64>| v.map(|x| x.to_string()).unwrap_or_default();
        ImportViolation {
            row_number,
            tipid: raw.tipid.map(|t| t.to_string()).unwrap_or_default(),
            anode: render(raw.anode),
            bnode: render(raw.bnode),
            reason,
        }
    }
}

/// structural (pre-import) validation of a coding batch. any violation is
/// fatal to the whole batch: the resolved rows are only produced when every
/// row passes, so a failed import leaves the coding table untouched.
///
/// checks: required fields non-null, each (anode, bnode) resolves to a
/// stored link, and (tipid, derived abb) unique within the batch and
/// against existing active rows.
pub fn resolve_import_batch(
    network: &HwyNetwork,
    raw_rows: &[RawCodingRow],
) -> Result<Vec<CodingRow>, Vec<ImportViolation>> {
    let mut violations: Vec<ImportViolation> = vec![];
    let mut resolved: Vec<CodingRow> = Vec::with_capacity(raw_rows.len());
    let mut seen: HashSet<(Tipid, Abb)> = network
        .coding
        .iter()
        .filter(|row| row.use_flag)
        .map(|row| (row.tipid, row.abb))
        .collect();

    for (i, raw) in raw_rows.iter().enumerate() {
        // csv rows are 1-based and follow a header line
        let row_number = i + 2;
        let (Some(tipid), Some(anode), Some(bnode), Some(action_value)) =
            (raw.tipid, raw.anode, raw.bnode, raw.action_code)
        else {
            violations.push(ImportViolation::new(
                row_number,
                raw,
                String::from("null value in required field (tipid, anode, bnode, action_code)"),
            ));
            continue;
        };
        let action = match ActionCode::from_i32(action_value) {
            Ok(action) => action,
            Err(e) => {
                violations.push(ImportViolation::new(row_number, raw, e.to_string()));
                continue;
            }
        };

        let anode = NodeId(anode);
        let bnode = NodeId(bnode);
        let candidates = network.links_at_pair(anode, bnode);
        let abb = match candidates.len() {
            0 => {
                violations.push(ImportViolation::new(
                    row_number,
                    raw,
                    format!("no stored link at node pair ({anode}, {bnode})"),
                ));
                continue;
            }
            1 => candidates[0].abb(),
            // both baselink states stored at this pair: structural actions
            // (replace, add) target the skeleton, the rest target the base
            _ => {
                let baselink = match action {
                    ActionCode::Replace | ActionCode::Add => Baselink::Skeleton,
                    ActionCode::Modify | ActionCode::Delete => Baselink::Base,
                };
                Abb::new(anode, bnode, baselink)
            }
        };

        let tipid = Tipid(tipid);
        if !seen.insert((tipid, abb)) {
            violations.push(ImportViolation::new(
                row_number,
                raw,
                format!("duplicate coding key ({tipid}, {abb})"),
            ));
            continue;
        }

        resolved.push(CodingRow {
            tipid,
            abb,
            action,
            rep_anode: NodeId(raw.rep_anode),
            rep_bnode: NodeId(raw.rep_bnode),
            delta: AttributeDelta {
                new_directions: raw.new_directions,
                new_type1: raw.new_type1,
                new_type2: raw.new_type2,
                new_ampm1: raw.new_ampm1,
                new_ampm2: raw.new_ampm2,
                new_postedspeed1: raw.new_postedspeed1,
                new_postedspeed2: raw.new_postedspeed2,
                new_thrulanes1: raw.new_thrulanes1,
                new_thrulanes2: raw.new_thrulanes2,
                new_thrulanewidth1: raw.new_thrulanewidth1,
                new_thrulanewidth2: raw.new_thrulanewidth2,
                add_parklanes1: raw.add_parklanes1,
                add_parklanes2: raw.add_parklanes2,
                new_parkres1: raw.new_parkres1.clone(),
                new_parkres2: raw.new_parkres2.clone(),
                add_sigic: raw.add_sigic,
                add_cltl: raw.add_cltl,
                add_rrgradecross: raw.add_rrgradecross,
                new_tolldollars: raw.new_tolldollars,
                new_modes: raw.new_modes,
            },
            use_flag: true,
            process_notes: String::new(),
        });
    }

    if violations.is_empty() {
        Ok(resolved)
    } else {
        log::error!(
            "coding import batch aborted: {} malformed rows ({})",
            violations.len(),
            violations.iter().map(|v| v.row_number).join(", ")
        );
        Err(violations)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::model::network::{Directions, LinkRecord, NodeRecord};

    fn network() -> HwyNetwork {
        let nodes = vec![
            NodeRecord {
                node: NodeId(10),
                zone: 1,
                ..Default::default()
            },
            NodeRecord {
                node: NodeId(20),
                zone: 1,
                ..Default::default()
            },
        ];
        let links = vec![LinkRecord {
            anode: NodeId(10),
            bnode: NodeId(20),
            directions: Directions::OneWay,
            type1: 1,
            miles: 1.0,
            ..Default::default()
        }];
        HwyNetwork::from_tables(nodes, links, vec![], vec![]).expect("fixture should assemble")
    }

    fn raw(tipid: u32, anode: i64, bnode: i64, action: i32) -> RawCodingRow {
        RawCodingRow {
            tipid: Some(tipid),
            anode: Some(anode),
            bnode: Some(bnode),
            action_code: Some(action),
            ..Default::default()
        }
    }

    #[test]
    fn test_unresolvable_node_pair_aborts_batch() {
        let net = network();
        // the second row is valid but the batch must still abort whole
        let rows = vec![raw(100, 5, 6, 1), raw(101, 10, 20, 1)];
        let result = resolve_import_batch(&net, &rows);
        let violations = result.expect_err("batch should abort");
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].row_number, 2);
        assert!(violations[0].reason.contains("no stored link"));
    }

    #[test]
    fn test_null_required_field_aborts_batch() {
        let net = network();
        let mut row = raw(100, 10, 20, 1);
        row.action_code = None;
        let violations = resolve_import_batch(&net, &[row]).expect_err("batch should abort");
        assert!(violations[0].reason.contains("null value"));
    }

    #[test]
    fn test_duplicate_key_aborts_batch() {
        let net = network();
        let rows = vec![raw(100, 10, 20, 1), raw(100, 10, 20, 3)];
        let violations = resolve_import_batch(&net, &rows).expect_err("batch should abort");
        assert!(violations[0].reason.contains("duplicate coding key"));
    }

    #[test]
    fn test_valid_batch_resolves_abb() {
        let net = network();
        let rows = resolve_import_batch(&net, &[raw(100, 10, 20, 1)]).expect("batch should pass");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].abb.to_string(), "10-20-1");
        assert!(rows[0].use_flag);
    }
}

use crate::model::network::{ActionCode, HwyNetwork};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// an abb whose lifetime coding combines operations worth a second look
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CombinationFlag {
    pub abb: String,
    pub tipids: String,
    pub reason: String,
}

/// a link referenced as replaced (action 2) but never deleted by an active,
/// scheduled action-3 row
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnreplacedSkeleton {
    pub rep_abb: String,
    pub replacing_tipids: String,
}

/// whole-table advisory checks across a project coding table. nothing here
/// blocks a run; the outputs feed audit spreadsheets for human review.
///
/// active rows belonging to unscheduled (sentinel-year) projects are
/// excluded, matching their exclusion from the rollforward itself.
pub fn audit_combinations(
    network: &HwyNetwork,
) -> (Vec<CombinationFlag>, Vec<UnreplacedSkeleton>) {
    let active = network
        .coding
        .iter()
        .filter(|row| row.use_flag && network.completion_year(&row.tipid).is_some())
        .collect_vec();

    // flag any abb carrying both a replace and an add over its lifetime
    let mut flags: Vec<CombinationFlag> = vec![];
    let by_abb = active.iter().into_group_map_by(|row| row.abb);
    for (abb, rows) in by_abb.iter().sorted_by_key(|(abb, _)| **abb) {
        let actions: HashSet<ActionCode> = rows.iter().map(|r| r.action).collect();
        if actions.contains(&ActionCode::Replace) && actions.contains(&ActionCode::Add) {
            flags.push(CombinationFlag {
                abb: abb.to_string(),
                tipids: rows.iter().map(|r| r.tipid).sorted().join(", "),
                reason: String::from("abb receives both a replace and an add"),
            });
        }
    }

    // flag replaced links never deleted
    let deleted_abbs: HashSet<_> = active
        .iter()
        .filter(|row| row.action == ActionCode::Delete)
        .map(|row| row.abb)
        .collect();
    let mut replaced: HashMap<_, Vec<_>> = HashMap::new();
    for row in active.iter().filter(|r| r.action == ActionCode::Replace) {
        if let Some(rep) = row.rep_abb() {
            replaced.entry(rep).or_default().push(row.tipid);
        }
    }
    let unreplaced = replaced
        .into_iter()
        .filter(|(rep, _)| !deleted_abbs.contains(rep))
        .sorted_by_key(|(rep, _)| *rep)
        .map(|(rep, tipids)| UnreplacedSkeleton {
            rep_abb: rep.to_string(),
            replacing_tipids: tipids.into_iter().sorted().join(", "),
        })
        .collect_vec();

    if !flags.is_empty() || !unreplaced.is_empty() {
        log::warn!(
            "coding audit: {} combination flags, {} replaced-but-never-deleted links",
            flags.len(),
            unreplaced.len()
        );
    }
    (flags, unreplaced)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::model::network::{
        Abb, Baselink, CodingRow, Directions, LinkRecord, NodeId, NodeRecord, ProjectRecord, Tipid,
    };

    fn network() -> HwyNetwork {
        let nodes = vec![
            NodeRecord {
                node: NodeId(30),
                zone: 1,
                ..Default::default()
            },
            NodeRecord {
                node: NodeId(40),
                zone: 1,
                ..Default::default()
            },
        ];
        let links = vec![
            LinkRecord {
                anode: NodeId(30),
                bnode: NodeId(40),
                directions: Directions::OneWay,
                type1: 1,
                miles: 1.0,
                ..Default::default()
            },
            LinkRecord::skeleton(NodeId(30), NodeId(40), 1.0),
        ];
        let projects = vec![
            ProjectRecord {
                tipid: Tipid(100),
                completion_year: 2028,
                ..Default::default()
            },
            ProjectRecord {
                tipid: Tipid(200),
                completion_year: 2030,
                ..Default::default()
            },
        ];
        HwyNetwork::from_tables(nodes, links, projects, vec![]).expect("fixture should assemble")
    }

    #[test]
    fn test_replace_without_delete_is_flagged() {
        let mut net = network();
        let skeleton = Abb::new(NodeId(30), NodeId(40), Baselink::Skeleton);
        let mut replace = CodingRow::new(Tipid(100), skeleton, ActionCode::Replace);
        replace.rep_anode = NodeId(30);
        replace.rep_bnode = NodeId(40);
        net.coding = vec![replace];
        let (_, unreplaced) = audit_combinations(&net);
        assert_eq!(unreplaced.len(), 1);
        assert_eq!(unreplaced[0].rep_abb, "30-40-1");
    }

    #[test]
    fn test_replace_with_delete_is_clean() {
        let mut net = network();
        let skeleton = Abb::new(NodeId(30), NodeId(40), Baselink::Skeleton);
        let base = Abb::new(NodeId(30), NodeId(40), Baselink::Base);
        let mut replace = CodingRow::new(Tipid(100), skeleton, ActionCode::Replace);
        replace.rep_anode = NodeId(30);
        replace.rep_bnode = NodeId(40);
        let delete = CodingRow::new(Tipid(200), base, ActionCode::Delete);
        net.coding = vec![replace, delete];
        let (_, unreplaced) = audit_combinations(&net);
        assert!(unreplaced.is_empty());
    }

    #[test]
    fn test_replace_and_add_combination_flagged() {
        let mut net = network();
        let skeleton = Abb::new(NodeId(30), NodeId(40), Baselink::Skeleton);
        let mut replace = CodingRow::new(Tipid(100), skeleton, ActionCode::Replace);
        replace.rep_anode = NodeId(30);
        replace.rep_bnode = NodeId(40);
        let add = CodingRow::new(Tipid(200), skeleton, ActionCode::Add);
        net.coding = vec![replace, add];
        let (flags, _) = audit_combinations(&net);
        assert_eq!(flags.len(), 1);
        assert!(flags[0].reason.contains("both a replace and an add"));
    }
}

use super::apply_delta;
use crate::model::{
    network::{Abb, ActionCode, AttributeDelta, Baselink, CodingRow, HwyNetwork, NodeId, Tipid},
    NetworkError,
};
use itertools::Itertools;
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};

#[derive(Debug, Default, Clone, Serialize)]
pub struct AdvanceSummary {
    pub year: u16,
    pub modified: usize,
    pub replaced: usize,
    pub deleted: usize,
    pub added: usize,
    pub completed: usize,
}

/// the project-application state machine. the network is always "as of"
/// `year`; each `advance()` call applies every active coding row due in the
/// following year and increments the pointer. there is no way to roll
/// backward; history is produced by building successive snapshots.
pub struct Advancer {
    pub network: HwyNetwork,
    pub year: u16,
}

impl Advancer {
    pub fn new(network: HwyNetwork, base_year: u16) -> Advancer {
        Advancer {
            network,
            year: base_year,
        }
    }

    /// applies the batch of edits due in `year + 1`, cascades their
    /// consequences onto not-yet-applied future rows, marks the batch
    /// completed, and advances the year pointer.
    ///
    /// action groups run in the fixed order modify, replace, delete, add:
    /// each group's cascading logic assumes the earlier groups committed.
    pub fn advance(&mut self) -> Result<AdvanceSummary, NetworkError> {
        let target = self.year + 1;
        let due = self.network.rows_due(target);

        // completion years per row, fixed for the whole pass (the project
        // table does not change during an advance)
        let years: Vec<Option<u16>> = self
            .network
            .coding
            .iter()
            .map(|row| self.network.completion_year(&row.tipid))
            .collect_vec();

        let group = |action: ActionCode| {
            due.iter()
                .copied()
                .filter(|i| self.network.coding[*i].action == action)
                .sorted_by_key(|i| (self.network.coding[*i].tipid, self.network.coding[*i].abb))
                .collect_vec()
        };
        let modify_group = group(ActionCode::Modify);
        let replace_group = group(ActionCode::Replace);
        let delete_group = group(ActionCode::Delete);
        let add_group = group(ActionCode::Add);

        let summary = AdvanceSummary {
            year: target,
            modified: modify_group.len(),
            replaced: replace_group.len(),
            deleted: delete_group.len(),
            added: add_group.len(),
            completed: due.len(),
        };

        self.apply_modify_group(&modify_group, &years, target)?;
        self.apply_replace_group(&replace_group, &years, target)?;
        self.apply_delete_group(&delete_group, &years, target)?;
        self.apply_add_group(&add_group, &years, target)?;

        // the whole batch leaves future consideration regardless of action
        for idx in due.iter() {
            self.network.coding[*idx].retire(&format!("Completed in {target}"));
        }

        log::info!(
            "advanced network to {}: {} modified, {} replaced, {} deleted, {} added",
            target,
            summary.modified,
            summary.replaced,
            summary.deleted,
            summary.added
        );
        self.year = target;
        Ok(summary)
    }

    /// rolls the network forward one year at a time until it is "as of" the
    /// target year
    pub fn roll_to(&mut self, target_year: u16) -> Result<Vec<AdvanceSummary>, NetworkError> {
        if target_year <= self.year {
            return Err(NetworkError::ConfigurationError(format!(
                "target year {} is not after the current year {}",
                target_year, self.year
            )));
        }
        let mut summaries = vec![];
        while self.year < target_year {
            summaries.push(self.advance()?);
        }
        Ok(summaries)
    }

    fn apply_modify_group(
        &mut self,
        indices: &[usize],
        years: &[Option<u16>],
        target: u16,
    ) -> Result<(), NetworkError> {
        for idx in indices.iter() {
            let (tipid, abb, delta) = {
                let row = &self.network.coding[*idx];
                (row.tipid, row.abb, row.delta.clone())
            };
            let link = self.network.get_link_mut(&abb)?;
            apply_delta(link, &delta);
            link.project = tipid.to_string();
            link.description = format!("Modified in {target}");
            let committed = link.clone();

            // later-year modifies on this link lose any delta that now
            // duplicates a committed value
            for fi in future_indices(&self.network.coding, years, target, |r| {
                r.abb == abb && r.action == ActionCode::Modify
            }) {
                let row = &mut self.network.coding[fi];
                let cleared = row.delta.clear_matching_new_fields(&committed);
                if cleared > 0 {
                    row.append_note(&format!(
                        "{cleared} duplicate deltas cleared, link modified in {target} by project {tipid}"
                    ));
                }
            }
            // later-year deletes are annotated only; the delete still proceeds
            for fi in future_indices(&self.network.coding, years, target, |r| {
                r.abb == abb && r.action == ActionCode::Delete
            }) {
                self.network.coding[fi]
                    .append_note(&format!("Link modified in {target} by project {tipid}"));
            }
        }
        Ok(())
    }

    fn apply_replace_group(
        &mut self,
        indices: &[usize],
        years: &[Option<u16>],
        target: u16,
    ) -> Result<(), NetworkError> {
        // a project may replace one regular link with several skeletons
        let mut groups: BTreeMap<(Tipid, Abb), Vec<usize>> = BTreeMap::new();
        for idx in indices.iter() {
            let row = &self.network.coding[*idx];
            let rep = row.rep_abb().ok_or_else(|| {
                NetworkError::InternalError(format!(
                    "active action 2 row ({}, {}) has no replaced link coded",
                    row.tipid, row.abb
                ))
            })?;
            groups.entry((row.tipid, rep)).or_default().push(*idx);
        }

        for ((tipid, rep), group) in groups.into_iter() {
            let source = self.network.get_link(&rep)?.clone();
            let mut committed: Vec<(Abb, crate::model::network::LinkRecord)> = vec![];
            for idx in group.iter() {
                let abb = self.network.coding[*idx].abb;
                let link = self.network.get_link_mut(&abb)?;
                link.copy_attributes_from(&source);
                link.new_baselink = Baselink::Base;
                link.project = tipid.to_string();
                link.description = format!("Replaced {rep} in {target}");
                committed.push((abb, link.clone()));
            }
            let skeletons: HashSet<Abb> = committed.iter().map(|(abb, _)| *abb).collect();

            // a link can only be replaced once: later replaces naming the
            // same replaced link or the same skeletons are invalidated
            for fi in future_indices(&self.network.coding, years, target, |r| {
                r.action == ActionCode::Replace
                    && (r.rep_abb() == Some(rep) || skeletons.contains(&r.abb))
            }) {
                self.network.coding[fi].retire(&format!("Replaced {rep} in {target}"));
            }

            // an add cannot land on a skeleton that a replace already
            // populated; it becomes a modify with duplicate deltas cleared
            for (abb, committed_link) in committed.iter() {
                for fi in future_indices(&self.network.coding, years, target, |r| {
                    r.action == ActionCode::Add && r.abb == *abb
                }) {
                    let row = &mut self.network.coding[fi];
                    row.action = ActionCode::Modify;
                    row.delta.clear_matching_new_fields(committed_link);
                    row.append_note(&format!(
                        "Add converted to modify, skeleton populated by replace in {target}"
                    ));
                }
            }
        }
        Ok(())
    }

    fn apply_delete_group(
        &mut self,
        indices: &[usize],
        years: &[Option<u16>],
        target: u16,
    ) -> Result<(), NetworkError> {
        for idx in indices.iter() {
            let abb = self.network.coding[*idx].abb;
            let link = self.network.get_link_mut(&abb)?;
            // the pre-delete attribute set survives in any promoted replace
            let captured = AttributeDelta::from_link(link);
            link.clear_to_skeleton();
            link.description = format!("Deleted in {target}");

            // the link cannot be modified or deleted again
            for fi in future_indices(&self.network.coding, years, target, |r| {
                r.abb == abb && matches!(r.action, ActionCode::Modify | ActionCode::Delete)
            }) {
                self.network.coding[fi].retire(&format!("Deleted in {target}"));
            }
            // a replacement of a since-deleted link becomes a fresh add
            // carrying the captured attributes
            for fi in future_indices(&self.network.coding, years, target, |r| {
                r.action == ActionCode::Replace && r.rep_abb() == Some(abb)
            }) {
                let row = &mut self.network.coding[fi];
                row.action = ActionCode::Add;
                row.delta = captured.clone();
                row.rep_anode = NodeId(0);
                row.rep_bnode = NodeId(0);
                row.append_note(&format!(
                    "Replace promoted to add, {abb} deleted in {target}"
                ));
            }
        }
        Ok(())
    }

    fn apply_add_group(
        &mut self,
        indices: &[usize],
        years: &[Option<u16>],
        target: u16,
    ) -> Result<(), NetworkError> {
        for idx in indices.iter() {
            let (tipid, abb, delta) = {
                let row = &self.network.coding[*idx];
                (row.tipid, row.abb, row.delta.clone())
            };
            let link = self.network.get_link_mut(&abb)?;
            apply_delta(link, &delta);
            link.new_baselink = Baselink::Base;
            link.project = tipid.to_string();
            link.description = format!("Added in {target}");
            let committed = link.clone();

            // the populated skeleton can no longer receive a replace
            for fi in future_indices(&self.network.coding, years, target, |r| {
                r.action == ActionCode::Replace && r.abb == abb
            }) {
                self.network.coding[fi].retire(&format!("Added {abb} in {target}"));
            }
            // nor a second add; it becomes a modify with duplicates cleared
            for fi in future_indices(&self.network.coding, years, target, |r| {
                r.action == ActionCode::Add && r.abb == abb
            }) {
                let row = &mut self.network.coding[fi];
                row.action = ActionCode::Modify;
                row.delta.clear_matching_new_fields(&committed);
                row.append_note(&format!(
                    "Add converted to modify, link added in {target}"
                ));
            }
        }
        Ok(())
    }
}

/// active rows due strictly after the target year and matching the
/// predicate. cascades select affected rows through this filter rather than
/// relying on any iteration order.
fn future_indices(
    coding: &[CodingRow],
    years: &[Option<u16>],
    target: u16,
    predicate: impl Fn(&CodingRow) -> bool,
) -> Vec<usize> {
    coding
        .iter()
        .enumerate()
        .filter(|(i, row)| {
            row.use_flag && years[*i].map(|y| y > target).unwrap_or(false) && predicate(row)
        })
        .map(|(i, _)| i)
        .collect_vec()
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::model::network::{
        Directions, LinkRecord, NodeRecord, ProjectRecord,
    };

    fn node(id: i64) -> NodeRecord {
        NodeRecord {
            node: NodeId(id),
            zone: 1,
            ..Default::default()
        }
    }

    fn base_link(a: i64, b: i64) -> LinkRecord {
        LinkRecord {
            anode: NodeId(a),
            bnode: NodeId(b),
            directions: Directions::OneWay,
            type1: 1,
            ampm1: 1,
            postedspeed1: 30,
            thrulanes1: 2,
            thrulanewidth1: 12,
            modes: 1,
            miles: 1.0,
            ..Default::default()
        }
    }

    fn project(tipid: u32, year: u16) -> ProjectRecord {
        ProjectRecord {
            tipid: Tipid(tipid),
            completion_year: year,
            ..Default::default()
        }
    }

    #[test]
    fn test_add_populates_skeleton() {
        // base network has a skeleton (10, 20, 0) and a project adding it in 2026
        let skeleton = Abb::new(NodeId(10), NodeId(20), Baselink::Skeleton);
        let mut add = CodingRow::new(Tipid(100), skeleton, ActionCode::Add);
        add.delta = AttributeDelta {
            new_directions: 1,
            new_type1: 1,
            new_ampm1: 1,
            new_postedspeed1: 30,
            new_thrulanes1: 2,
            new_thrulanewidth1: 12,
            new_modes: 1,
            ..Default::default()
        };
        let network = HwyNetwork::from_tables(
            vec![node(10), node(20)],
            vec![LinkRecord::skeleton(NodeId(10), NodeId(20), 1.0)],
            vec![project(100, 2026)],
            vec![add],
        )
        .expect("fixture should assemble");

        let mut advancer = Advancer::new(network, 2025);
        let summary = advancer.advance().expect("advance should succeed");
        assert_eq!(advancer.year, 2026);
        assert_eq!(summary.added, 1);

        let link = advancer
            .network
            .get_link(&skeleton)
            .expect("link should exist");
        assert_eq!(link.new_baselink, Baselink::Base);
        assert_eq!(link.directions, Directions::OneWay);
        assert_eq!(link.type1, 1);
        assert_eq!(link.postedspeed1, 30);
        assert_eq!(link.thrulanes1, 2);
        assert_eq!(link.description, "Added in 2026");

        let row = &advancer.network.coding[0];
        assert!(!row.use_flag);
        assert!(row.process_notes.contains("Completed in 2026"));
    }

    #[test]
    fn test_duplicate_future_delta_cleared() {
        // two modifies coding the same lane change in 2027 and 2029
        let abb = Abb::new(NodeId(10), NodeId(20), Baselink::Base);
        let mut first = CodingRow::new(Tipid(100), abb, ActionCode::Modify);
        first.delta.new_thrulanes1 = 3;
        let mut second = CodingRow::new(Tipid(200), abb, ActionCode::Modify);
        second.delta.new_thrulanes1 = 3;
        second.delta.new_postedspeed1 = 45;
        let network = HwyNetwork::from_tables(
            vec![node(10), node(20)],
            vec![base_link(10, 20)],
            vec![project(100, 2027), project(200, 2029)],
            vec![first, second],
        )
        .expect("fixture should assemble");

        let mut advancer = Advancer::new(network, 2026);
        advancer.advance().expect("advance should succeed");

        let later = &advancer.network.coding[1];
        assert!(later.use_flag, "the later modify stays eligible");
        assert_eq!(later.delta.new_thrulanes1, 0, "duplicate delta cleared");
        assert_eq!(later.delta.new_postedspeed1, 45, "novel delta survives");
    }

    #[test]
    fn test_replace_once_invariant() {
        // two replaces of the same regular link, 2028 and 2030
        let skeleton = Abb::new(NodeId(30), NodeId(40), Baselink::Skeleton);
        let rep = Abb::new(NodeId(30), NodeId(40), Baselink::Base);
        let make_replace = |tipid: u32| {
            let mut row = CodingRow::new(Tipid(tipid), skeleton, ActionCode::Replace);
            row.rep_anode = NodeId(30);
            row.rep_bnode = NodeId(40);
            row
        };
        let network = HwyNetwork::from_tables(
            vec![node(30), node(40)],
            vec![
                base_link(30, 40),
                LinkRecord::skeleton(NodeId(30), NodeId(40), 1.0),
            ],
            vec![project(100, 2028), project(200, 2030)],
            vec![make_replace(100), make_replace(200)],
        )
        .expect("fixture should assemble");

        let mut advancer = Advancer::new(network, 2027);
        advancer.advance().expect("advance should succeed");

        let skeleton_link = advancer
            .network
            .get_link(&skeleton)
            .expect("link should exist");
        assert_eq!(skeleton_link.new_baselink, Baselink::Base);
        assert_eq!(skeleton_link.type1, 1, "attributes copied from 30-40-1");
        assert_eq!(skeleton_link.description, "Replaced 30-40-1 in 2028");

        let later = &advancer.network.coding[1];
        assert!(!later.use_flag);
        assert!(later.process_notes.contains("Replaced 30-40-1 in 2028"));
    }

    #[test]
    fn test_delete_invalidates_later_edits_and_promotes_replace() {
        let abb = Abb::new(NodeId(10), NodeId(20), Baselink::Base);
        let skeleton = Abb::new(NodeId(30), NodeId(40), Baselink::Skeleton);
        let delete = CodingRow::new(Tipid(100), abb, ActionCode::Delete);
        let mut later_modify = CodingRow::new(Tipid(200), abb, ActionCode::Modify);
        later_modify.delta.new_thrulanes1 = 3;
        let mut later_replace = CodingRow::new(Tipid(300), skeleton, ActionCode::Replace);
        later_replace.rep_anode = NodeId(10);
        later_replace.rep_bnode = NodeId(20);
        let network = HwyNetwork::from_tables(
            vec![node(10), node(20), node(30), node(40)],
            vec![
                base_link(10, 20),
                LinkRecord::skeleton(NodeId(30), NodeId(40), 1.0),
            ],
            vec![project(100, 2026), project(200, 2028), project(300, 2029)],
            vec![delete, later_modify, later_replace],
        )
        .expect("fixture should assemble");

        let mut advancer = Advancer::new(network, 2025);
        advancer.advance().expect("advance should succeed");

        let deleted = advancer.network.get_link(&abb).expect("link should exist");
        assert_eq!(deleted.new_baselink, Baselink::Skeleton);
        assert_eq!(deleted.type1, 0, "attributes cleared to skeleton form");
        assert_eq!(deleted.description, "Deleted in 2026");

        // cascading exclusivity: the later modify is ineligible
        assert!(!advancer.network.coding[1].use_flag);
        assert!(advancer.network.coding[1].process_notes.contains("Deleted in 2026"));

        // the replace of the deleted link became an add carrying its attributes
        let promoted = &advancer.network.coding[2];
        assert!(promoted.use_flag);
        assert_eq!(promoted.action, ActionCode::Add);
        assert_eq!(promoted.rep_abb(), None);
        assert_eq!(promoted.delta.new_thrulanes1, 2);
        assert_eq!(promoted.delta.new_postedspeed1, 30);
    }

    #[test]
    fn test_add_invalidates_later_replace_and_demotes_later_add() {
        let skeleton = Abb::new(NodeId(10), NodeId(20), Baselink::Skeleton);
        let full_delta = AttributeDelta {
            new_directions: 1,
            new_type1: 1,
            new_ampm1: 1,
            new_postedspeed1: 30,
            new_thrulanes1: 2,
            new_thrulanewidth1: 12,
            new_modes: 1,
            ..Default::default()
        };
        let mut add = CodingRow::new(Tipid(100), skeleton, ActionCode::Add);
        add.delta = full_delta.clone();
        let mut later_add = CodingRow::new(Tipid(200), skeleton, ActionCode::Add);
        later_add.delta = full_delta;
        later_add.delta.new_postedspeed1 = 45;
        let mut later_replace = CodingRow::new(Tipid(300), skeleton, ActionCode::Replace);
        later_replace.rep_anode = NodeId(30);
        later_replace.rep_bnode = NodeId(40);
        let network = HwyNetwork::from_tables(
            vec![node(10), node(20), node(30), node(40)],
            vec![
                LinkRecord::skeleton(NodeId(10), NodeId(20), 1.0),
                base_link(30, 40),
            ],
            vec![project(100, 2026), project(200, 2028), project(300, 2029)],
            vec![add, later_add, later_replace],
        )
        .expect("fixture should assemble");

        let mut advancer = Advancer::new(network, 2025);
        advancer.advance().expect("advance should succeed");

        let demoted = &advancer.network.coding[1];
        assert!(demoted.use_flag);
        assert_eq!(demoted.action, ActionCode::Modify);
        assert_eq!(demoted.delta.new_postedspeed1, 45, "novel delta survives");
        assert_eq!(demoted.delta.new_thrulanes1, 0, "duplicate delta cleared");

        let invalidated = &advancer.network.coding[2];
        assert!(!invalidated.use_flag);
        assert!(invalidated.process_notes.contains("Added 10-20-0 in 2026"));
    }

    #[test]
    fn test_roll_to_requires_future_target() {
        let network = HwyNetwork::default();
        let mut advancer = Advancer::new(network, 2025);
        assert!(advancer.roll_to(2025).is_err());
    }
}

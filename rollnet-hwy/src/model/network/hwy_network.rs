use super::{
    Abb, Baselink, CodingRow, LinkKey, LinkRecord, Links, NodeId, NodeRecord, Nodes,
    ProjectRecord, Projects, Tipid,
};
use crate::model::NetworkError;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// one structural-integrity violation, exported for human review
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IntegrityViolation {
    pub table: String,
    pub key: String,
    pub violation: String,
}

/// the in-memory derived tables for one network snapshot. rebuilt by
/// re-reading the store after every structural mutation; no component holds
/// a long-lived copy across phases.
#[derive(Debug, Default, Clone)]
pub struct HwyNetwork {
    pub nodes: Nodes,
    pub links: Links,
    pub projects: Projects,
    pub coding: Vec<CodingRow>,
}

impl HwyNetwork {
    /// assembles the derived tables, failing on duplicate identities. these
    /// are data-entry errors the pipeline refuses to paper over.
    pub fn from_tables(
        node_rows: Vec<NodeRecord>,
        link_rows: Vec<LinkRecord>,
        project_rows: Vec<ProjectRecord>,
        coding: Vec<CodingRow>,
    ) -> Result<HwyNetwork, NetworkError> {
        let mut nodes: Nodes = HashMap::with_capacity(node_rows.len());
        for node in node_rows.into_iter() {
            if nodes.insert(node.node, node.clone()).is_some() {
                return Err(NetworkError::DuplicateNodeId(node.node));
            }
        }
        let mut links: Links = HashMap::with_capacity(link_rows.len());
        for link in link_rows.into_iter() {
            let key = link.key();
            if links.insert(key, link).is_some() {
                return Err(NetworkError::DuplicateLink(key));
            }
        }
        let mut projects: Projects = HashMap::with_capacity(project_rows.len());
        for project in project_rows.into_iter() {
            if projects.insert(project.tipid, project.clone()).is_some() {
                return Err(NetworkError::DuplicateTipid(project.tipid));
            }
        }
        Ok(HwyNetwork {
            nodes,
            links,
            projects,
            coding,
        })
    }

    pub fn get_link(&self, abb: &Abb) -> Result<&LinkRecord, NetworkError> {
        self.links.get(&abb.key()).ok_or(NetworkError::MissingLink(
            abb.anode,
            abb.bnode,
            abb.baselink.as_u8(),
        ))
    }

    pub fn get_link_mut(&mut self, abb: &Abb) -> Result<&mut LinkRecord, NetworkError> {
        self.links
            .get_mut(&abb.key())
            .ok_or(NetworkError::MissingLink(
                abb.anode,
                abb.bnode,
                abb.baselink.as_u8(),
            ))
    }

    pub fn get_node(&self, node_id: &NodeId) -> Result<&NodeRecord, NetworkError> {
        self.nodes
            .get(node_id)
            .ok_or(NetworkError::MissingNodeId(*node_id))
    }

    /// the stored link rows at a node pair, in either baselink state
    pub fn links_at_pair(&self, anode: NodeId, bnode: NodeId) -> Vec<&LinkRecord> {
        [Baselink::Skeleton, Baselink::Base]
            .iter()
            .filter_map(|bl| self.links.get(&(anode, bnode, *bl)))
            .collect_vec()
    }

    /// whether a stored row exists for the reverse node pair, in either
    /// baselink state. such links carry reverse-duplication hazards for
    /// replace and two-way coding edits.
    pub fn has_reverse_counterpart(&self, abb: &Abb) -> bool {
        self.links.contains_key(&(abb.bnode, abb.anode, Baselink::Skeleton))
            || self.links.contains_key(&(abb.bnode, abb.anode, Baselink::Base))
    }

    /// the completion year of the project owning a coding row, if scheduled
    pub fn completion_year(&self, tipid: &Tipid) -> Option<u16> {
        self.projects
            .get(tipid)
            .filter(|p| p.is_scheduled())
            .map(|p| p.completion_year)
    }

    /// indices of active coding rows due in the given year, in table order
    pub fn rows_due(&self, year: u16) -> Vec<usize> {
        self.coding
            .iter()
            .enumerate()
            .filter(|(_, row)| row.use_flag && self.completion_year(&row.tipid) == Some(year))
            .map(|(index, _)| index)
            .collect_vec()
    }

    /// structural-integrity sweep over the assembled tables. violations here
    /// are fatal to the run once collected and reported.
    pub fn integrity_violations(&self) -> Vec<IntegrityViolation> {
        let mut violations: Vec<IntegrityViolation> = vec![];

        for (key, link) in self.links.iter().sorted_by_key(|(k, _)| **k) {
            let abb = Abb::from(*key);
            if link.anode == link.bnode {
                violations.push(IntegrityViolation {
                    table: String::from("link"),
                    key: abb.to_string(),
                    violation: String::from("link endpoints are the same node"),
                });
            }
            for endpoint in [link.anode, link.bnode] {
                if !self.nodes.contains_key(&endpoint) {
                    violations.push(IntegrityViolation {
                        table: String::from("link"),
                        key: abb.to_string(),
                        violation: format!("endpoint node '{endpoint}' missing from node table"),
                    });
                }
            }
            // a symmetric two-way row and its stored reverse must agree on
            // their shared side-1 coding
            if link.directions == super::Directions::TwoWaySymmetric {
                if let Some(reverse) = self.links.get(&(link.bnode, link.anode, link.baselink)) {
                    let agrees = reverse.type1 == link.type1
                        && reverse.postedspeed1 == link.postedspeed1
                        && reverse.thrulanes1 == link.thrulanes1;
                    if !agrees {
                        violations.push(IntegrityViolation {
                            table: String::from("link"),
                            key: abb.to_string(),
                            violation: format!(
                                "symmetric link disagrees with stored reverse '{}'",
                                reverse.abb()
                            ),
                        });
                    }
                }
            }
        }

        for row in self.coding.iter() {
            if row.use_flag && !self.projects.contains_key(&row.tipid) {
                violations.push(IntegrityViolation {
                    table: String::from("coding"),
                    key: format!("{}:{}", row.tipid, row.abb),
                    violation: String::from("tipid missing from project table"),
                });
            }
        }

        // (tipid, abb) must be unique among active coding rows
        let duplicate_keys = self
            .coding
            .iter()
            .filter(|row| row.use_flag)
            .map(|row| (row.tipid, row.abb))
            .duplicates()
            .collect_vec();
        for (tipid, abb) in duplicate_keys {
            violations.push(IntegrityViolation {
                table: String::from("coding"),
                key: format!("{tipid}:{abb}"),
                violation: String::from("duplicate (tipid, abb) among active coding rows"),
            });
        }

        violations
    }
}

use super::{TimeOfDay, TransitError};
use itertools::Itertools;
use rollnet_hwy::model::network::NodeId;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::Path;

/// one directed hop of a transit itinerary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSegment {
    pub from: NodeId,
    pub to: NodeId,
    pub dwell_code: i32,
    pub minutes: f64,
}

/// one scheduled transit run: a line identity plus its ordered itinerary
#[derive(Debug, Clone, PartialEq)]
pub struct TransitRun {
    pub run_id: String,
    pub mode: String,
    pub route: String,
    /// seconds past midnight
    pub start_time: u32,
    pub park_and_ride: bool,
    pub segments: Vec<RunSegment>,
}

/// used for IO in flat (CSV) format, one row per segment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSegmentRow {
    pub run_id: String,
    pub mode: String,
    pub route: String,
    pub start_time: u32,
    pub park_and_ride: u8,
    pub sequence: u32,
    pub from_node: NodeId,
    pub to_node: NodeId,
    pub dwell_code: i32,
    pub minutes: f64,
}

impl TransitRun {
    pub fn time_of_day(&self) -> TimeOfDay {
        TimeOfDay::classify(self.start_time)
    }

    /// the grouping identity for collapsing: mode, route, and window
    pub fn group_key(&self) -> (String, String, TimeOfDay) {
        (self.mode.clone(), self.route.clone(), self.time_of_day())
    }

    /// the unordered hop set compared across runs for similarity
    pub fn signature(&self) -> HashSet<(NodeId, NodeId, i32)> {
        self.segments
            .iter()
            .map(|s| (s.from, s.to, s.dwell_code))
            .collect()
    }

    /// the visited node chain, segment origins plus the final destination
    pub fn node_sequence(&self) -> Vec<NodeId> {
        let mut nodes = self.segments.iter().map(|s| s.from).collect_vec();
        if let Some(last) = self.segments.last() {
            nodes.push(last.to);
        }
        nodes
    }

    /// reads a flat segment-per-row CSV and reassembles runs, ordered by
    /// run id with segments in sequence order. a run id with no segments
    /// cannot occur by construction; an empty file yields no runs.
    pub fn from_csv(path: &Path) -> Result<Vec<TransitRun>, TransitError> {
        let mut reader = csv::Reader::from_path(path)
            .map_err(|e| TransitError::RunsReadError(path.to_string_lossy().to_string(), e))?;
        let mut rows: Vec<RunSegmentRow> = vec![];
        for row in reader.deserialize() {
            let row: RunSegmentRow = row
                .map_err(|e| TransitError::RunsReadError(path.to_string_lossy().to_string(), e))?;
            rows.push(row);
        }
        Ok(Self::from_rows(rows))
    }

    pub fn from_rows(rows: Vec<RunSegmentRow>) -> Vec<TransitRun> {
        let mut grouped: BTreeMap<String, Vec<RunSegmentRow>> = BTreeMap::new();
        for row in rows.into_iter() {
            grouped.entry(row.run_id.clone()).or_default().push(row);
        }
        grouped
            .into_iter()
            .map(|(run_id, mut rows)| {
                rows.sort_by_key(|r| r.sequence);
                let first = &rows[0];
                TransitRun {
                    run_id,
                    mode: first.mode.clone(),
                    route: first.route.clone(),
                    start_time: first.start_time,
                    park_and_ride: first.park_and_ride != 0,
                    segments: rows
                        .iter()
                        .map(|r| RunSegment {
                            from: r.from_node,
                            to: r.to_node,
                            dwell_code: r.dwell_code,
                            minutes: r.minutes,
                        })
                        .collect_vec(),
                }
            })
            .collect_vec()
    }
}

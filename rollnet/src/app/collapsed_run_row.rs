use rollnet_transit::algorithm::collapse::CollapsedGroup;
use rollnet_transit::model::TimeOfDay;
use serde::{Deserialize, Serialize};

/// one output row of the collapsed transit network, flat for CSV, one row
/// per representative itinerary hop
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollapsedRunRow {
    pub run_id: String,
    pub mode: String,
    pub route: String,
    pub tod: TimeOfDay,
    pub headway_minutes: f64,
    pub collapsed_runs: usize,
    pub sequence: u32,
    pub from_node: i64,
    pub to_node: i64,
    pub dwell_code: i32,
    pub minutes: f64,
}

impl CollapsedRunRow {
    pub fn from_group(group: &CollapsedGroup) -> Vec<CollapsedRunRow> {
        let run = &group.representative;
        run.segments
            .iter()
            .enumerate()
            .map(|(i, segment)| CollapsedRunRow {
                run_id: run.run_id.clone(),
                mode: run.mode.clone(),
                route: run.route.clone(),
                tod: run.time_of_day(),
                headway_minutes: group.headway_minutes,
                collapsed_runs: group.collapsed_run_ids.len(),
                sequence: i as u32 + 1,
                from_node: segment.from.0,
                to_node: segment.to.0,
                dwell_code: segment.dwell_code,
                minutes: segment.minutes,
            })
            .collect()
    }
}

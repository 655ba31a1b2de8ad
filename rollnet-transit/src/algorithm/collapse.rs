use crate::model::{TimeOfDay, TransitRun};
use itertools::Itertools;
use std::collections::HashSet;

use rollnet_hwy::model::network::NodeId;

/// one representative run standing in for a set of near-duplicate scheduled
/// runs, with the group's service frequency
#[derive(Debug, Clone)]
pub struct CollapsedGroup {
    pub representative: TransitRun,
    pub collapsed_run_ids: Vec<String>,
    pub headway_minutes: f64,
}

/// collapses near-duplicate runs within each (mode, route, window) bucket.
///
/// within a bucket, runs are visited from most segments and earliest start;
/// each unclaimed run seeds a group and absorbs every later unclaimed run
/// whose hop-set similarity meets the threshold, so the seed is always the
/// group's representative. groups come back ordered by bucket.
pub fn collapse_runs(runs: Vec<TransitRun>, threshold: f64) -> Vec<CollapsedGroup> {
    let n_runs = runs.len();
    let buckets = runs
        .into_iter()
        .into_group_map_by(|run| run.group_key())
        .into_iter()
        .sorted_by(|(a, _), (b, _)| a.cmp(b))
        .collect_vec();

    let mut groups: Vec<CollapsedGroup> = vec![];
    for ((_, _, tod), bucket) in buckets.into_iter() {
        let ordered = bucket
            .into_iter()
            .sorted_by_key(|run| (std::cmp::Reverse(run.segments.len()), run.start_time))
            .collect_vec();
        let signatures = ordered.iter().map(|run| run.signature()).collect_vec();

        let mut claimed = vec![false; ordered.len()];
        for i in 0..ordered.len() {
            if claimed[i] {
                continue;
            }
            claimed[i] = true;
            let mut members = vec![i];
            for j in (i + 1)..ordered.len() {
                if !claimed[j] && jaccard(&signatures[i], &signatures[j]) >= threshold {
                    claimed[j] = true;
                    members.push(j);
                }
            }
            groups.push(build_group(&ordered, &members, tod));
        }
    }

    log::info!(
        "collapsed {} transit runs into {} representative groups",
        n_runs,
        groups.len()
    );
    groups
}

fn build_group(ordered: &[TransitRun], members: &[usize], tod: TimeOfDay) -> CollapsedGroup {
    let starts = members
        .iter()
        .map(|m| ordered[*m].start_time)
        .sorted()
        .collect_vec();
    let headway_minutes = if starts.len() > 1 {
        let total_gap: u32 = starts
            .iter()
            .tuple_windows()
            .map(|(a, b)| b - a)
            .sum();
        total_gap as f64 / (starts.len() - 1) as f64 / 60.0
    } else {
        tod.max_headway_minutes()
    };
    CollapsedGroup {
        representative: ordered[members[0]].clone(),
        collapsed_run_ids: members.iter().map(|m| ordered[*m].run_id.clone()).collect(),
        headway_minutes,
    }
}

fn jaccard(a: &HashSet<(NodeId, NodeId, i32)>, b: &HashSet<(NodeId, NodeId, i32)>) -> f64 {
    let intersection = a.intersection(b).count();
    let union = a.union(b).count();
    if union == 0 {
        return 0.0;
    }
    intersection as f64 / union as f64
}

use super::collapse::CollapsedGroup;
use crate::model::{RunSegment, TransitRun};
use itertools::Itertools;
use rollnet_hwy::model::{
    graph::{search, LinkGraph},
    network::{HwyNetwork, NodeId},
};
use serde::Serialize;

/// an error report row for a line that could not be reconciled with the
/// rebuilt link graph
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DroppedRun {
    pub run_id: String,
    pub mode: String,
    pub route: String,
    pub reason: String,
}

/// reconciles each representative itinerary with a freshly finalized link
/// graph. terminals absent from the graph are replaced by their nearest
/// surviving node; interior hops over edges that no longer exist are bridged
/// by the shortest surviving path. a line that cannot be reconciled is
/// dropped with a report row, never a batch abort.
pub fn repair_itineraries(
    groups: Vec<CollapsedGroup>,
    network: &HwyNetwork,
    graph: &LinkGraph,
    bridge_speed_mph: f64,
) -> (Vec<CollapsedGroup>, Vec<DroppedRun>) {
    let mut repaired: Vec<CollapsedGroup> = vec![];
    let mut dropped: Vec<DroppedRun> = vec![];

    for mut group in groups.into_iter() {
        match repair_run(&mut group.representative, network, graph, bridge_speed_mph) {
            Ok(()) => repaired.push(group),
            Err(reason) => {
                let run = &group.representative;
                log::error!("dropping line {}: {}", run.run_id, reason);
                dropped.push(DroppedRun {
                    run_id: run.run_id.clone(),
                    mode: run.mode.clone(),
                    route: run.route.clone(),
                    reason,
                });
            }
        }
    }

    if !dropped.is_empty() {
        log::warn!("{} transit lines dropped during itinerary repair", dropped.len());
    }
    (repaired, dropped)
}

fn repair_run(
    run: &mut TransitRun,
    network: &HwyNetwork,
    graph: &LinkGraph,
    bridge_speed_mph: f64,
) -> Result<(), String> {
    if run.segments.is_empty() {
        return Err("run has no segments".to_string());
    }
    resolve_terminals(run, network, graph)?;

    let segments = std::mem::take(&mut run.segments);
    let mut rebuilt: Vec<RunSegment> = Vec::with_capacity(segments.len());
    let mut i = 0;
    while i < segments.len() {
        if graph.contains_edge(&segments[i].from, &segments[i].to) {
            rebuilt.push(segments[i].clone());
            i += 1;
            continue;
        }
        // a contiguous gap of vanished hops, bridged in one search from the
        // last good node to the next good node
        let mut j = i;
        while j < segments.len() && !graph.contains_edge(&segments[j].from, &segments[j].to) {
            j += 1;
        }
        let last_good = segments[i].from;
        let next_good = segments[j - 1].to;
        let gap_dwell = segments[j - 1].dwell_code;
        let path = search::shortest_path(graph, last_good, next_good).ok_or_else(|| {
            format!("no path between {} and {} in the rebuilt network", last_good, next_good)
        })?;
        for (hop, (a, b)) in path.iter().tuple_windows().enumerate() {
            let (_, miles) = graph
                .get_edge(a, b)
                .ok_or_else(|| format!("path hop ({a}, {b}) missing from the link graph"))?;
            // the bridge's final hop carries the dwell of the hop it replaces
            let dwell_code = if hop == path.len() - 2 { gap_dwell } else { 0 };
            rebuilt.push(RunSegment {
                from: *a,
                to: *b,
                dwell_code,
                minutes: miles / bridge_speed_mph * 60.0,
            });
        }
        i = j;
    }
    run.segments = rebuilt;
    Ok(())
}

/// replaces a terminal node that no longer exists in the graph with its
/// nearest surviving node, same-zone nearest for park-and-ride lines
fn resolve_terminals(
    run: &mut TransitRun,
    network: &HwyNetwork,
    graph: &LinkGraph,
) -> Result<(), String> {
    let first = run.segments[0].from;
    if let Some(replacement) = resolve_terminal(first, run.park_and_ride, network, graph)? {
        run.segments[0].from = replacement;
    }
    let last = run
        .segments
        .last()
        .map(|s| s.to)
        .unwrap_or(first);
    if let Some(replacement) = resolve_terminal(last, run.park_and_ride, network, graph)? {
        if let Some(segment) = run.segments.last_mut() {
            segment.to = replacement;
        }
    }
    Ok(())
}

fn resolve_terminal(
    terminal: NodeId,
    park_and_ride: bool,
    network: &HwyNetwork,
    graph: &LinkGraph,
) -> Result<Option<NodeId>, String> {
    if graph.contains_node(&terminal) {
        return Ok(None);
    }
    // the dropped node's coordinates come from the pre-finalize node table
    let record = network
        .nodes
        .get(&terminal)
        .ok_or_else(|| format!("terminal {} has no known location", terminal))?;
    // park-and-ride terminals must stay in their zone; a zoneless terminal
    // falls back to the unrestricted query
    let replacement = if park_and_ride && record.has_zone() {
        graph.nearest_node_in_zone(&record.get_point(), record.zone)
    } else {
        graph.nearest_node(&record.get_point())
    };
    match replacement {
        Some(node_id) => {
            log::warn!("terminal {} replaced with nearest node {}", terminal, node_id);
            Ok(Some(node_id))
        }
        None => Err(format!("terminal {} has no usable replacement", terminal)),
    }
}

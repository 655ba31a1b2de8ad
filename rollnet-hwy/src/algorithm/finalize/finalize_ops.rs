use crate::model::{
    network::{Abb, HwyNetwork, LinkKey, Links, Tipid},
    NetworkError,
};
use itertools::Itertools;
use kdam::tqdm;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::str::FromStr;

#[derive(Debug, Default, Clone, Serialize)]
pub struct FinalizeSummary {
    pub links_deleted: usize,
    pub links_renamed: usize,
    pub nodes_dropped: usize,
    pub coding_dropped: usize,
    pub coding_remapped: usize,
}

/// one finalized project, keyed by tipid, carried into the output dataset
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ProjectSummary {
    pub tipid: Tipid,
    pub completion_year: u16,
    pub links: usize,
    pub total_miles: f64,
}

/// commits a fully rolled-forward snapshot into its finalized form.
///
/// steps run in order, each depending on the prior: net-deleted links are
/// removed and survivors commit their pending baselink, producing an abb
/// rename map; orphaned nodes are dropped; retired coding rows are dropped
/// and survivors are remapped through the rename map; per-project summaries
/// are dissolved from the project stamps left on the links.
///
/// a surviving coding row whose abb is absent from the rename map means the
/// project-application cascades failed upstream, and is fatal.
pub fn finalize(
    network: &mut HwyNetwork,
) -> Result<(FinalizeSummary, Vec<ProjectSummary>), NetworkError> {
    let mut summary = FinalizeSummary::default();

    let rename_map = commit_links(network, &mut summary)?;
    drop_orphan_nodes(network, &mut summary);
    remap_coding(network, &rename_map, &mut summary)?;
    let projects = dissolve_projects(network);

    log::info!(
        "finalized network: {} links deleted, {} renamed, {} nodes dropped, {} coding rows dropped, {} projects dissolved",
        summary.links_deleted,
        summary.links_renamed,
        summary.nodes_dropped,
        summary.coding_dropped,
        projects.len()
    );
    Ok((summary, projects))
}

/// removes net-deleted links, commits `baselink <- new_baselink` on the
/// survivors, and returns the old-abb to new-abb rename map
fn commit_links(
    network: &mut HwyNetwork,
    summary: &mut FinalizeSummary,
) -> Result<HashMap<Abb, Abb>, NetworkError> {
    let mut rename_map: HashMap<Abb, Abb> = HashMap::new();
    let mut committed: Links = HashMap::new();

    let drained = std::mem::take(&mut network.links);
    let n_links = drained.len();
    let link_iter = tqdm!(
        drained.into_iter().sorted_by_key(|(key, _)| *key),
        desc = "commit links",
        total = n_links
    );
    for (key, mut link) in link_iter {
        if link.is_net_deleted() {
            summary.links_deleted += 1;
            continue;
        }
        let old_abb = Abb::from(key);
        if link.baselink != link.new_baselink {
            summary.links_renamed += 1;
        }
        link.baselink = link.new_baselink;
        let new_key: LinkKey = link.key();
        if committed.contains_key(&new_key) {
            return Err(NetworkError::InternalError(format!(
                "finalize produced two links with identity {}",
                Abb::from(new_key)
            )));
        }
        rename_map.insert(old_abb, Abb::from(new_key));
        committed.insert(new_key, link);
    }
    network.links = committed;
    Ok(rename_map)
}

fn drop_orphan_nodes(network: &mut HwyNetwork, summary: &mut FinalizeSummary) {
    let incident: HashSet<_> = network
        .links
        .keys()
        .flat_map(|(a, b, _)| [*a, *b])
        .collect();
    let before = network.nodes.len();
    network.nodes.retain(|node_id, _| incident.contains(node_id));
    summary.nodes_dropped = before - network.nodes.len();
}

/// drops retired rows and rewrites surviving rows' abbs to their committed
/// identities. a gap in the rename map is an upstream cascade bug.
fn remap_coding(
    network: &mut HwyNetwork,
    rename_map: &HashMap<Abb, Abb>,
    summary: &mut FinalizeSummary,
) -> Result<(), NetworkError> {
    let before = network.coding.len();
    network.coding.retain(|row| row.use_flag);
    summary.coding_dropped = before - network.coding.len();

    for row in network.coding.iter_mut() {
        let new_abb = rename_map
            .get(&row.abb)
            .ok_or(NetworkError::RenameMapGap(row.tipid, row.abb))?;
        if *new_abb != row.abb {
            summary.coding_remapped += 1;
        }
        row.abb = *new_abb;
    }
    Ok(())
}

/// dissolves the per-link project stamps into one record per project.
/// links that never received a stamp do not contribute.
fn dissolve_projects(network: &HwyNetwork) -> Vec<ProjectSummary> {
    let mut grouped: BTreeMap<Tipid, (usize, f64)> = BTreeMap::new();
    for link in network.links.values() {
        let Ok(tipid) = u32::from_str(link.project.trim()) else {
            continue;
        };
        let entry = grouped.entry(Tipid(tipid)).or_insert((0, 0.0));
        entry.0 += 1;
        entry.1 += link.miles;
    }

    grouped
        .into_iter()
        .map(|(tipid, (links, total_miles))| ProjectSummary {
            tipid,
            completion_year: network.completion_year(&tipid).unwrap_or_default(),
            links,
            total_miles,
        })
        .collect_vec()
}

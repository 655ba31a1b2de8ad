use super::{AppError, CollapsedRunRow};
use clap::Subcommand;
use rollnet_hwy::algorithm::advance::Advancer;
use rollnet_hwy::algorithm::finalize;
use rollnet_hwy::algorithm::validate;
use rollnet_hwy::config::RunConfiguration;
use rollnet_hwy::model::graph::{search, LinkGraph};
use rollnet_hwy::store::{
    CsvStore, NetworkStore, CODING_FLAGS_FILE, COLLAPSED_RUNS_FILE, COMBINATION_FLAGS_FILE,
    DROPPED_RUNS_FILE, IMPORT_ERRORS_FILE, INTEGRITY_ERRORS_FILE, PROJECT_SUMMARY_FILE,
    UNREPLACED_SKELETONS_FILE,
};
use rollnet_transit::algorithm::{collapse, repair};
use rollnet_transit::model::TransitRun;
use std::path::Path;

#[derive(Debug, Clone, Subcommand)]
pub enum RollnetOperation {
    /// structural integrity checks over the node, link, and project tables
    CheckNetwork,
    /// validate a project coding csv and bulk insert it into the dataset
    ImportCoding {
        /// csv file of coding rows to import
        #[arg(long)]
        file: String,
    },
    /// per-row rule checks and whole-table combination audit over the
    /// imported coding table
    CheckCoding,
    /// roll the base network forward, writing one snapshot per built year
    Build {
        /// last year to build
        #[arg(long)]
        target: u16,
        /// finalize each built snapshot and write the combined final dataset
        #[arg(short = 'f', long, default_value_t = false)]
        finalize: bool,
    },
    /// collapse near-duplicate transit runs and repair their itineraries
    /// against a finalized snapshot
    CollapseRoutes {
        /// csv file of transit run segments
        #[arg(long)]
        runs: String,
    },
}

impl RollnetOperation {
    pub fn run(&self, dataset: &str, config: &RunConfiguration) -> Result<(), AppError> {
        let store = CsvStore::open(Path::new(dataset))?;
        match self {
            RollnetOperation::CheckNetwork => check_network(&store),
            RollnetOperation::ImportCoding { file } => import_coding(&store, file),
            RollnetOperation::CheckCoding => check_coding(&store),
            RollnetOperation::Build { target, finalize } => {
                build(&store, config, *target, *finalize)
            }
            RollnetOperation::CollapseRoutes { runs } => collapse_routes(&store, config, runs),
        }
    }
}

fn check_network(store: &CsvStore) -> Result<(), AppError> {
    let network = store.load_network()?;

    let graph = LinkGraph::new(&network)?;
    log::info!(
        "network graph: {} connected nodes, {} directed edges",
        graph.n_connected_nodes(),
        graph.n_edges()
    );
    let components = search::connected_components(&graph);
    if components.len() > 1 {
        log::warn!(
            "network splits into {} components; the largest holds {} of {} connected nodes",
            components.len(),
            components[0].len(),
            graph.n_connected_nodes()
        );
    }

    let violations = network.integrity_violations();
    if violations.is_empty() {
        log::info!("network passed integrity checks");
        return Ok(());
    }
    let report = store.write_report(INTEGRITY_ERRORS_FILE, &violations)?;
    Err(AppError::ValidationFailure {
        count: violations.len(),
        report,
    })
}

fn import_coding(store: &CsvStore, file: &str) -> Result<(), AppError> {
    let mut network = store.load_network()?;
    let mut reader = csv::Reader::from_path(file)
        .map_err(|e| AppError::CodingReadError(file.to_string(), e))?;
    let raw: Vec<validate::RawCodingRow> = reader
        .deserialize()
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| AppError::CodingReadError(file.to_string(), e))?;

    match validate::resolve_import_batch(&network, &raw) {
        Ok(resolved) => {
            log::info!("importing {} coding rows from {}", resolved.len(), file);
            network.coding.extend(resolved);
            store.save_network(&network)?;
            Ok(())
        }
        Err(violations) => {
            let report = store.write_report(IMPORT_ERRORS_FILE, &violations)?;
            Err(AppError::ValidationFailure {
                count: violations.len(),
                report,
            })
        }
    }
}

fn check_coding(store: &CsvStore) -> Result<(), AppError> {
    let mut network = store.load_network()?;
    let (summary, flags) = validate::apply_coding_checks(&mut network);
    let (combination_flags, unreplaced) = validate::audit_combinations(&network);
    store.save_network(&network)?;

    let report = store.write_report(CODING_FLAGS_FILE, &flags)?;
    store.write_report(COMBINATION_FLAGS_FILE, &combination_flags)?;
    store.write_report(UNREPLACED_SKELETONS_FILE, &unreplaced)?;

    // rejected rows are already demoted in the saved table and listed in the
    // report, so the run itself succeeds
    if summary.rejected > 0 {
        log::warn!(
            "{} coding rows rejected and demoted, see {}",
            summary.rejected,
            report.display()
        );
    }
    Ok(())
}

fn build(
    store: &CsvStore,
    config: &RunConfiguration,
    target: u16,
    run_finalize: bool,
) -> Result<(), AppError> {
    let base = store.load_network()?;
    let mut advancer = Advancer::new(base, config.base_year);

    for year in (config.base_year + 1)..=target {
        advancer.advance()?;
        let year_store = store.copy_dataset(&store.root().join(format!("net_{year}")))?;
        if run_finalize {
            let mut finalized = advancer.network.clone();
            let (_, projects) = finalize::finalize(&mut finalized)?;
            year_store.save_network(&finalized)?;
            year_store.write_report(PROJECT_SUMMARY_FILE, &projects)?;
        } else {
            year_store.save_network(&advancer.network)?;
        }
        log::info!("built snapshot net_{year}");
    }

    // the target-year snapshot doubles as the combined "all years applied"
    // dataset consumed by the transit stages
    if run_finalize {
        let target_store = CsvStore::open(&store.root().join(format!("net_{target}")))?;
        target_store.copy_dataset(&store.root().join("net_final"))?;
        log::info!("wrote combined finalized dataset net_final");
    }
    Ok(())
}

fn collapse_routes(
    store: &CsvStore,
    config: &RunConfiguration,
    runs_file: &str,
) -> Result<(), AppError> {
    let network = store.load_network()?;
    let graph = LinkGraph::new(&network)?;
    let runs = TransitRun::from_csv(Path::new(runs_file))?;
    log::info!("loaded {} transit runs from {}", runs.len(), runs_file);

    let groups = collapse::collapse_runs(runs, config.similarity_threshold);
    let (repaired, dropped) =
        repair::repair_itineraries(groups, &network, &graph, config.bridge_speed_mph);

    let rows: Vec<CollapsedRunRow> = repaired.iter().flat_map(CollapsedRunRow::from_group).collect();
    store.write_report(COLLAPSED_RUNS_FILE, &rows)?;
    store.write_report(DROPPED_RUNS_FILE, &dropped)?;
    log::info!(
        "wrote {} collapsed itineraries, {} dropped lines",
        repaired.len(),
        dropped.len()
    );
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;
    use rollnet_hwy::model::network::{
        Abb, ActionCode, Baselink, CodingRow, Directions, HwyNetwork, LinkRecord, NodeId,
        NodeRecord, ProjectRecord, Tipid,
    };
    use std::time::{SystemTime, UNIX_EPOCH};

    fn scratch_store(label: &str) -> CsvStore {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock should be past the epoch")
            .as_nanos();
        let root = std::env::temp_dir().join(format!("rollnet_{label}_{nanos}"));
        CsvStore::new(&root).expect("scratch dataset should create")
    }

    #[test]
    fn test_check_coding_succeeds_with_rejected_rows() {
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
            postedspeed1: 30,
            miles: 1.0,
            ..Default::default()
        }];
        let projects = vec![ProjectRecord {
            tipid: Tipid(100),
            completion_year: 2030,
            ..Default::default()
        }];
        // a delete carrying attribute deltas fails the rule checks
        let mut bad = CodingRow::new(
            Tipid(100),
            Abb::new(NodeId(10), NodeId(20), Baselink::Base),
            ActionCode::Delete,
        );
        bad.delta.new_thrulanes1 = 2;
        let network = HwyNetwork::from_tables(nodes, links, projects, vec![bad])
            .expect("fixture should assemble");

        let store = scratch_store("check_coding");
        store.save_network(&network).expect("save should succeed");

        // rejection demotes the row and writes the report, it is not fatal
        check_coding(&store).expect("rejected rows should not fail the run");
        let reloaded = store.load_network().expect("load should succeed");
        assert!(!reloaded.coding[0].use_flag);
        assert!(store.root().join(CODING_FLAGS_FILE).exists());
    }
}

use super::dataset::{NetworkStore, RowDisposition, Table};
use crate::model::{
    network::{
        Abb, ActionCode, AttributeDelta, CodingRow, HwyNetwork, LinkRecord, NodeId, NodeRecord,
        ProjectRecord, Tipid,
    },
    NetworkError,
};
use itertools::Itertools;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::fs::File;
use std::path::{Path, PathBuf};

/// verification retry cap for whole-dataset copies
pub const COPY_RETRY_LIMIT: usize = 5;

/// a network dataset as a directory of CSV files, one per table. per-year
/// snapshots are sibling dataset directories; report files are written
/// beside the tables.
#[derive(Debug, Clone)]
pub struct CsvStore {
    root: PathBuf,
}

/// used for IO in flat (CSV) format
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CodingRowSerializable {
    pub tipid: Tipid,
    pub abb: Abb,
    pub action: ActionCode,
    pub rep_anode: NodeId,
    pub rep_bnode: NodeId,
    pub new_directions: i32,
    pub new_type1: i32,
    pub new_type2: i32,
    pub new_ampm1: i32,
    pub new_ampm2: i32,
    pub new_postedspeed1: i32,
    pub new_postedspeed2: i32,
    pub new_thrulanes1: i32,
    pub new_thrulanes2: i32,
    pub new_thrulanewidth1: i32,
    pub new_thrulanewidth2: i32,
    pub add_parklanes1: i32,
    pub add_parklanes2: i32,
    #[serde(default)]
    pub new_parkres1: String,
    #[serde(default)]
    pub new_parkres2: String,
    pub add_sigic: i32,
    pub add_cltl: i32,
    pub add_rrgradecross: i32,
    pub new_tolldollars: f64,
    pub new_modes: i32,
    pub use_flag: u8,
    #[serde(default)]
    pub process_notes: String,
}

impl Default for CodingRowSerializable {
    fn default() -> Self {
        CodingRowSerializable {
            tipid: Tipid::default(),
            abb: Abb::new(NodeId(0), NodeId(0), crate::model::network::Baselink::Base),
            action: ActionCode::Modify,
            rep_anode: NodeId(0),
            rep_bnode: NodeId(0),
            new_directions: 0,
            new_type1: 0,
            new_type2: 0,
            new_ampm1: 0,
            new_ampm2: 0,
            new_postedspeed1: 0,
            new_postedspeed2: 0,
            new_thrulanes1: 0,
            new_thrulanes2: 0,
            new_thrulanewidth1: 0,
            new_thrulanewidth2: 0,
            add_parklanes1: 0,
            add_parklanes2: 0,
            new_parkres1: String::new(),
            new_parkres2: String::new(),
            add_sigic: 0,
            add_cltl: 0,
            add_rrgradecross: 0,
            new_tolldollars: 0.0,
            new_modes: 0,
            use_flag: 1,
            process_notes: String::new(),
        }
    }
}

impl From<&CodingRow> for CodingRowSerializable {
    fn from(row: &CodingRow) -> Self {
        CodingRowSerializable {
            tipid: row.tipid,
            abb: row.abb,
            action: row.action,
            rep_anode: row.rep_anode,
            rep_bnode: row.rep_bnode,
            new_directions: row.delta.new_directions,
            new_type1: row.delta.new_type1,
            new_type2: row.delta.new_type2,
            new_ampm1: row.delta.new_ampm1,
            new_ampm2: row.delta.new_ampm2,
            new_postedspeed1: row.delta.new_postedspeed1,
            new_postedspeed2: row.delta.new_postedspeed2,
            new_thrulanes1: row.delta.new_thrulanes1,
            new_thrulanes2: row.delta.new_thrulanes2,
            new_thrulanewidth1: row.delta.new_thrulanewidth1,
            new_thrulanewidth2: row.delta.new_thrulanewidth2,
            add_parklanes1: row.delta.add_parklanes1,
            add_parklanes2: row.delta.add_parklanes2,
            new_parkres1: row.delta.new_parkres1.clone(),
            new_parkres2: row.delta.new_parkres2.clone(),
            add_sigic: row.delta.add_sigic,
            add_cltl: row.delta.add_cltl,
            add_rrgradecross: row.delta.add_rrgradecross,
            new_tolldollars: row.delta.new_tolldollars,
            new_modes: row.delta.new_modes,
            use_flag: if row.use_flag { 1 } else { 0 },
            process_notes: row.process_notes.clone(),
        }
    }
}

impl From<CodingRowSerializable> for CodingRow {
    fn from(row: CodingRowSerializable) -> Self {
        CodingRow {
            tipid: row.tipid,
            abb: row.abb,
            action: row.action,
            rep_anode: row.rep_anode,
            rep_bnode: row.rep_bnode,
            delta: AttributeDelta {
                new_directions: row.new_directions,
                new_type1: row.new_type1,
                new_type2: row.new_type2,
                new_ampm1: row.new_ampm1,
                new_ampm2: row.new_ampm2,
                new_postedspeed1: row.new_postedspeed1,
                new_postedspeed2: row.new_postedspeed2,
                new_thrulanes1: row.new_thrulanes1,
                new_thrulanes2: row.new_thrulanes2,
                new_thrulanewidth1: row.new_thrulanewidth1,
                new_thrulanewidth2: row.new_thrulanewidth2,
                add_parklanes1: row.add_parklanes1,
                add_parklanes2: row.add_parklanes2,
                new_parkres1: row.new_parkres1,
                new_parkres2: row.new_parkres2,
                add_sigic: row.add_sigic,
                add_cltl: row.add_cltl,
                add_rrgradecross: row.add_rrgradecross,
                new_tolldollars: row.new_tolldollars,
                new_modes: row.new_modes,
            },
            use_flag: row.use_flag != 0,
            process_notes: row.process_notes,
        }
    }
}

impl CsvStore {
    /// creates a dataset directory, or opens it if it already exists
    pub fn new(root: &Path) -> Result<CsvStore, NetworkError> {
        std::fs::create_dir_all(root)
            .map_err(|e| NetworkError::DatasetIoError(root.display().to_string(), e))?;
        Ok(CsvStore {
            root: root.to_path_buf(),
        })
    }

    /// opens an existing dataset directory, failing when the prerequisite
    /// dataset has not been built
    pub fn open(root: &Path) -> Result<CsvStore, NetworkError> {
        if !root.is_dir() {
            return Err(NetworkError::ConfigurationError(format!(
                "dataset directory '{}' does not exist",
                root.display()
            )));
        }
        Ok(CsvStore {
            root: root.to_path_buf(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn table_path(&self, table: Table) -> PathBuf {
        self.root.join(table.file_name())
    }

    /// reads the dataset into the in-memory derived tables, failing on
    /// duplicate identities
    pub fn load_network(&self) -> Result<HwyNetwork, NetworkError> {
        let nodes: Vec<NodeRecord> = self.read_table(Table::Node)?;
        let links: Vec<LinkRecord> = self.read_table(Table::Link)?;
        let projects: Vec<ProjectRecord> = self.read_table(Table::Project)?;
        let coding: Vec<CodingRowSerializable> = self.read_table(Table::Coding)?;
        let coding = coding.into_iter().map(CodingRow::from).collect_vec();
        HwyNetwork::from_tables(nodes, links, projects, coding)
    }

    /// writes the in-memory tables back out, sorted for deterministic files
    pub fn save_network(&self, network: &HwyNetwork) -> Result<(), NetworkError> {
        let nodes = network
            .nodes
            .values()
            .sorted_by_key(|n| n.node)
            .cloned()
            .collect_vec();
        let links = network
            .links
            .values()
            .sorted_by_key(|l| l.key())
            .cloned()
            .collect_vec();
        let projects = network
            .projects
            .values()
            .sorted_by_key(|p| p.tipid)
            .cloned()
            .collect_vec();
        let coding = network
            .coding
            .iter()
            .map(CodingRowSerializable::from)
            .collect_vec();
        self.write_table(Table::Node, &nodes)?;
        self.write_table(Table::Link, &links)?;
        self.write_table(Table::Project, &projects)?;
        self.write_table(Table::Coding, &coding)?;
        Ok(())
    }

    /// writes a report file beside the dataset tables, returning its path
    pub fn write_report<T: Serialize>(
        &self,
        file_name: &str,
        rows: &[T],
    ) -> Result<PathBuf, NetworkError> {
        let path = self.root.join(file_name);
        let mut writer = csv::Writer::from_path(&path)
            .map_err(|e| NetworkError::CsvWriteError(path.display().to_string(), e))?;
        for row in rows.iter() {
            writer
                .serialize(row)
                .map_err(|e| NetworkError::CsvWriteError(path.display().to_string(), e))?;
        }
        writer
            .flush()
            .map_err(|e| NetworkError::DatasetIoError(path.display().to_string(), e))?;
        Ok(path)
    }
}

impl NetworkStore for CsvStore {
    fn read_table<T: DeserializeOwned>(&self, table: Table) -> Result<Vec<T>, NetworkError> {
        let path = self.table_path(table);
        if !path.is_file() {
            log::debug!("table {} not present at {}, reading as empty", table, path.display());
            return Ok(vec![]);
        }
        let file = File::open(&path)
            .map_err(|e| NetworkError::DatasetIoError(path.display().to_string(), e))?;
        let mut reader = csv::Reader::from_reader(file);
        reader
            .deserialize::<T>()
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| NetworkError::TableReadError(table.to_string(), e.to_string()))
    }

    fn write_table<T: Serialize>(&self, table: Table, rows: &[T]) -> Result<(), NetworkError> {
        let path = self.table_path(table);
        let mut writer = csv::Writer::from_path(&path)
            .map_err(|e| NetworkError::CsvWriteError(path.display().to_string(), e))?;
        for row in rows.iter() {
            writer
                .serialize(row)
                .map_err(|e| NetworkError::CsvWriteError(path.display().to_string(), e))?;
        }
        writer
            .flush()
            .map_err(|e| NetworkError::DatasetIoError(path.display().to_string(), e))
    }

    fn insert_rows<T: Serialize + DeserializeOwned>(
        &self,
        table: Table,
        rows: Vec<T>,
    ) -> Result<(), NetworkError> {
        let mut existing: Vec<T> = self.read_table(table)?;
        existing.extend(rows);
        self.write_table(table, &existing)
    }

    fn update_rows<T: Serialize + DeserializeOwned>(
        &self,
        table: Table,
        mutator: &mut dyn FnMut(&mut T) -> RowDisposition,
    ) -> Result<usize, NetworkError> {
        let rows: Vec<T> = self.read_table(table)?;
        let visited = rows.len();
        let mut retained: Vec<T> = Vec::with_capacity(visited);
        for mut row in rows.into_iter() {
            match mutator(&mut row) {
                RowDisposition::Keep => retained.push(row),
                RowDisposition::Delete => {}
            }
        }
        self.write_table(table, &retained)?;
        Ok(visited)
    }

    fn copy_dataset(&self, dst: &Path) -> Result<CsvStore, NetworkError> {
        let copy = CsvStore::new(dst)?;
        for attempt in 1..=COPY_RETRY_LIMIT {
            let mut verified = true;
            for table in Table::ALL {
                let src_path = self.table_path(table);
                if !src_path.is_file() {
                    continue;
                }
                let dst_path = copy.table_path(table);
                std::fs::copy(&src_path, &dst_path)
                    .map_err(|e| NetworkError::DatasetIoError(dst_path.display().to_string(), e))?;
                if row_count(&src_path)? != row_count(&dst_path)? {
                    verified = false;
                }
            }
            if verified {
                return Ok(copy);
            }
            log::warn!(
                "dataset copy {} -> {} failed verification on attempt {}, retrying",
                self.root.display(),
                dst.display(),
                attempt
            );
        }
        Err(NetworkError::CopyVerificationError(
            self.root.display().to_string(),
            dst.display().to_string(),
            COPY_RETRY_LIMIT,
        ))
    }
}

fn row_count(path: &Path) -> Result<usize, NetworkError> {
    let file =
        File::open(path).map_err(|e| NetworkError::DatasetIoError(path.display().to_string(), e))?;
    let mut reader = csv::Reader::from_reader(file);
    Ok(reader.records().count())
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::model::network::{Baselink, Directions};
    use std::time::{SystemTime, UNIX_EPOCH};

    fn scratch_store(label: &str) -> CsvStore {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock should be past the epoch")
            .as_nanos();
        let root = std::env::temp_dir().join(format!("rollnet_{label}_{nanos}"));
        CsvStore::new(&root).expect("scratch dataset should create")
    }

    fn fixture() -> HwyNetwork {
        let nodes = vec![
            NodeRecord {
                node: NodeId(10),
                point_x: 1.0,
                point_y: 2.0,
                zone: 1,
                ..Default::default()
            },
            NodeRecord {
                node: NodeId(20),
                point_x: 3.0,
                point_y: 4.0,
                zone: 2,
                ..Default::default()
            },
        ];
        let links = vec![LinkRecord {
            anode: NodeId(10),
            bnode: NodeId(20),
            directions: Directions::OneWay,
            type1: 1,
            postedspeed1: 30,
            miles: 1.25,
            ..Default::default()
        }];
        let projects = vec![ProjectRecord {
            tipid: Tipid(100),
            completion_year: 2027,
            ..Default::default()
        }];
        let mut row = CodingRow::new(
            Tipid(100),
            Abb::new(NodeId(10), NodeId(20), Baselink::Base),
            ActionCode::Modify,
        );
        row.delta.new_thrulanes1 = 3;
        HwyNetwork::from_tables(nodes, links, projects, vec![row])
            .expect("fixture should assemble")
    }

    #[test]
    fn test_save_then_load_preserves_tables() {
        let store = scratch_store("roundtrip");
        let network = fixture();
        store.save_network(&network).expect("save should succeed");
        let loaded = store.load_network().expect("load should succeed");

        assert_eq!(loaded.nodes, network.nodes);
        assert_eq!(loaded.links, network.links);
        assert_eq!(loaded.projects, network.projects);
        assert_eq!(loaded.coding, network.coding);
    }

    #[test]
    fn test_missing_table_reads_as_empty() {
        let store = scratch_store("empty");
        let rows: Vec<CodingRowSerializable> =
            store.read_table(Table::Coding).expect("read should succeed");
        assert!(rows.is_empty());
    }

    #[test]
    fn test_update_rows_supports_in_pass_deletion() {
        let store = scratch_store("update");
        store.save_network(&fixture()).expect("save should succeed");

        let visited = store
            .update_rows(
                Table::Coding,
                &mut |row: &mut CodingRowSerializable| {
                    if row.tipid == Tipid(100) {
                        RowDisposition::Delete
                    } else {
                        RowDisposition::Keep
                    }
                },
            )
            .expect("update should succeed");
        assert_eq!(visited, 1);

        let remaining: Vec<CodingRowSerializable> =
            store.read_table(Table::Coding).expect("read should succeed");
        assert!(remaining.is_empty());
    }

    #[test]
    fn test_insert_rows_appends_to_existing() {
        let store = scratch_store("insert");
        store.save_network(&fixture()).expect("save should succeed");

        let mut row = CodingRowSerializable::default();
        row.tipid = Tipid(200);
        row.abb = Abb::new(NodeId(10), NodeId(20), Baselink::Base);
        row.action = ActionCode::Delete;
        store
            .insert_rows(Table::Coding, vec![row])
            .expect("insert should succeed");

        let rows: Vec<CodingRowSerializable> =
            store.read_table(Table::Coding).expect("read should succeed");
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].tipid, Tipid(200));
    }

    #[test]
    fn test_copy_dataset_carries_all_tables() {
        let store = scratch_store("copy");
        store.save_network(&fixture()).expect("save should succeed");

        let dst_root = store.root().join("net_2027");
        let copy = store.copy_dataset(&dst_root).expect("copy should succeed");
        let loaded = copy.load_network().expect("load should succeed");
        assert_eq!(loaded.links.len(), 1);
        assert_eq!(loaded.coding.len(), 1);
    }

    #[test]
    fn test_open_requires_existing_directory() {
        let missing = std::env::temp_dir().join("rollnet_absent_dataset");
        assert!(CsvStore::open(&missing).is_err());
    }
}

use crate::model::NetworkError;
use serde::{de::DeserializeOwned, Serialize};
use std::fmt::Display;
use std::path::Path;

/// the tables making up one network dataset
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum Table {
    Node,
    Link,
    Project,
    Coding,
}

impl Table {
    pub fn file_name(&self) -> &'static str {
        match self {
            Table::Node => "node.csv",
            Table::Link => "link.csv",
            Table::Project => "project.csv",
            Table::Coding => "coding.csv",
        }
    }

    pub const ALL: [Table; 4] = [Table::Node, Table::Link, Table::Project, Table::Coding];
}

impl Display for Table {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.file_name())
    }
}

/// outcome of visiting one row during an update pass
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum RowDisposition {
    Keep,
    Delete,
}

/// tabular persistence for network datasets. reads are materialized and
/// restartable; an update pass visits each row once and is logically atomic
/// at the pass level (the table is rewritten as a whole).
pub trait NetworkStore {
    /// reads all rows of a table. a table that does not exist yet reads as
    /// empty.
    fn read_table<T: DeserializeOwned>(&self, table: Table) -> Result<Vec<T>, NetworkError>;

    /// replaces the full contents of a table
    fn write_table<T: Serialize>(&self, table: Table, rows: &[T]) -> Result<(), NetworkError>;

    /// appends rows to a table
    fn insert_rows<T: Serialize + DeserializeOwned>(
        &self,
        table: Table,
        rows: Vec<T>,
    ) -> Result<(), NetworkError>;

    /// applies a mutator to every row, supporting in-pass deletion. returns
    /// the number of rows visited.
    fn update_rows<T: Serialize + DeserializeOwned>(
        &self,
        table: Table,
        mutator: &mut dyn FnMut(&mut T) -> RowDisposition,
    ) -> Result<usize, NetworkError>;

    /// duplicates the whole dataset at a new root, verifying the copy and
    /// retrying on verification failure
    fn copy_dataset(&self, dst: &Path) -> Result<Self, NetworkError>
    where
        Self: Sized;
}

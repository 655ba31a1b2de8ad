mod csv_store;
mod dataset;

pub use csv_store::CsvStore;
pub use dataset::{NetworkStore, RowDisposition, Table};

/// report files written beside a dataset for human review
pub const IMPORT_ERRORS_FILE: &str = "import_errors.csv";
pub const CODING_FLAGS_FILE: &str = "coding_flags.csv";
pub const COMBINATION_FLAGS_FILE: &str = "combination_flags.csv";
pub const UNREPLACED_SKELETONS_FILE: &str = "unreplaced_skeletons.csv";
pub const INTEGRITY_ERRORS_FILE: &str = "integrity_errors.csv";
pub const DROPPED_RUNS_FILE: &str = "dropped_runs.csv";
pub const COLLAPSED_RUNS_FILE: &str = "collapsed_runs.csv";
pub const PROJECT_SUMMARY_FILE: &str = "project_summary.csv";

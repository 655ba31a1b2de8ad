mod finalize_ops;

pub use finalize_ops::{finalize, FinalizeSummary, ProjectSummary};

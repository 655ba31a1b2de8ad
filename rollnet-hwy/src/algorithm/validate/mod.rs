mod coding_rules;
mod combination_audit;
mod import_check;

pub use coding_rules::{apply_coding_checks, check_row, CodingCheckSummary, CodingFlag, RuleOutcome};
pub use combination_audit::{audit_combinations, CombinationFlag, UnreplacedSkeleton};
pub use import_check::{resolve_import_batch, ImportViolation, RawCodingRow};

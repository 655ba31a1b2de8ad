use rollnet_hwy::model::NetworkError;
use rollnet_transit::model::TransitError;
use std::path::PathBuf;

#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("failure operating on highway network: {0}")]
    NetworkError(#[from] NetworkError),
    #[error("failure operating on transit runs: {0}")]
    TransitError(#[from] TransitError),
    #[error("failure reading coding file {0}: {1}")]
    CodingReadError(String, csv::Error),
    #[error("{count} rows failed validation, see {}", .report.display())]
    ValidationFailure { count: usize, report: PathBuf },
}

use rollnet_hwy::model::NetworkError;

#[derive(thiserror::Error, Debug)]
pub enum TransitError {
    #[error("failure reading transit runs file {0}: {1}")]
    RunsReadError(String, csv::Error),
    #[error("failure using highway network: {0}")]
    NetworkError(#[from] NetworkError),
    #[error("internal error: {0}")]
    InternalError(String),
}

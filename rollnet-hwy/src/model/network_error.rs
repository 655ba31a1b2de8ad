use thiserror::Error;

use super::network::{Abb, LinkKey, NodeId, Tipid};

#[derive(Error, Debug)]
pub enum NetworkError {
    #[error("invalid rollforward configuration: {0}")]
    ConfigurationError(String),
    #[error("attempting to get node '{0}' not in network")]
    MissingNodeId(NodeId),
    #[error("attempting to get link '{0}-{1}-{2}' not in network")]
    MissingLink(NodeId, NodeId, u8),
    #[error("link '{0:?}' occurs more than once in the link table")]
    DuplicateLink(LinkKey),
    #[error("node '{0}' occurs more than once in the node table")]
    DuplicateNodeId(NodeId),
    #[error("project '{0}' occurs more than once in the project table")]
    DuplicateTipid(Tipid),
    #[error("surviving coding row ({0}, {1}) references a link absent from the finalization rename map")]
    RenameMapGap(Tipid, Abb),
    #[error("'{0}' could not be parsed as a link identifier")]
    MalformedAbb(String),
    #[error("'{0}' is not a valid action code")]
    MalformedActionCode(i32),
    #[error("dataset copy from {0} to {1} failed verification after {2} attempts")]
    CopyVerificationError(String, String, usize),
    #[error("failure reading table {0}: {1}")]
    TableReadError(String, String),
    #[error("failure writing to file {0}: {1}")]
    CsvWriteError(String, csv::Error),
    #[error("dataset io failure at {0}: {1}")]
    DatasetIoError(String, std::io::Error),
    #[error("{0}")]
    InternalError(String),
}

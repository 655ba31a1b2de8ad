pub mod graph;
pub mod network;
mod network_error;

pub use network_error::NetworkError;

use super::{AppError, RollnetOperation};
use clap::Parser;
use rollnet_hwy::config::RunConfiguration;

/// command line tool for rolling a regional travel network forward through
/// its coded projects, year by year
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct RollnetApp {
    #[command(subcommand)]
    pub op: RollnetOperation,
    /// directory holding the network dataset tables
    #[arg(long, default_value_t = String::from("."))]
    pub dataset: String,
    /// run configuration file (toml or json); defaults apply when omitted
    #[arg(long)]
    pub config: Option<String>,
}

impl RollnetApp {
    pub fn load_configuration(&self) -> Result<RunConfiguration, AppError> {
        match &self.config {
            Some(file) => Ok(RunConfiguration::try_from(file)?),
            None => Ok(RunConfiguration::default()),
        }
    }
}

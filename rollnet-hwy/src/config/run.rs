use crate::model::NetworkError;
use serde::{Deserialize, Serialize};

/// defines behaviors for a network rollforward run
#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct RunConfiguration {
    /// the year the base network is "as of"; projects complete in years
    /// strictly after this
    pub base_year: u16,
    /// analysis years to keep snapshots for when building a range
    #[serde(default)]
    pub analysis_years: Vec<u16>,
    /// speed assumed for travel times on shortest-path bridge hops
    #[serde(default = "default_bridge_speed_mph")]
    pub bridge_speed_mph: f64,
    /// stop-sequence similarity at or above which transit runs collapse
    #[serde(default = "default_similarity_threshold")]
    pub similarity_threshold: f64,
}

fn default_bridge_speed_mph() -> f64 {
    20.0
}

fn default_similarity_threshold() -> f64 {
    0.85
}

impl Default for RunConfiguration {
    fn default() -> Self {
        RunConfiguration {
            base_year: 2025,
            analysis_years: vec![],
            bridge_speed_mph: default_bridge_speed_mph(),
            similarity_threshold: default_similarity_threshold(),
        }
    }
}

impl TryFrom<&String> for RunConfiguration {
    type Error = NetworkError;

    fn try_from(f: &String) -> Result<Self, Self::Error> {
        if f.ends_with(".toml") {
            let s = std::fs::read_to_string(f).map_err(|e| {
                NetworkError::ConfigurationError(format!("failure reading {f}: {e}"))
            })?;
            toml::from_str(&s).map_err(|e| {
                NetworkError::ConfigurationError(format!("failure decoding {f}: {e}"))
            })
        } else if f.ends_with(".json") {
            let s = std::fs::read_to_string(f).map_err(|e| {
                NetworkError::ConfigurationError(format!("failure reading {f}: {e}"))
            })?;
            serde_json::from_str(&s).map_err(|e| {
                NetworkError::ConfigurationError(format!("failure decoding {f}: {e}"))
            })
        } else {
            Err(NetworkError::ConfigurationError(format!(
                "unsupported file type: {f}"
            )))
        }
    }
}

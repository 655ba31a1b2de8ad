use super::Tipid;
use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProjectRecord {
    pub tipid: Tipid,
    pub completion_year: u16,
    #[serde(default)]
    pub rsp_id: u16,
    #[serde(default)]
    pub notes: String,
}

impl ProjectRecord {
    /// completion-year sentinel for unscheduled/inactive projects, excluded
    /// from rollforward and most integrity checks
    pub const UNSCHEDULED: u16 = 9999;

    pub fn is_scheduled(&self) -> bool {
        self.completion_year != Self::UNSCHEDULED
    }
}

pub mod run;
mod time_of_day;
mod transit_error;

pub use run::{RunSegment, RunSegmentRow, TransitRun};
pub use time_of_day::TimeOfDay;
pub use transit_error::TransitError;

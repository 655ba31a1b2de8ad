mod advancer;
mod apply_delta;

pub use advancer::{AdvanceSummary, Advancer};
pub use apply_delta::apply_delta;

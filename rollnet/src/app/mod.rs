mod app_error;
mod collapsed_run_row;
mod operation;
mod rollnet_app;

pub use app_error::AppError;
pub use collapsed_run_row::CollapsedRunRow;
pub use operation::RollnetOperation;
pub use rollnet_app::RollnetApp;

pub mod advance;
pub mod finalize;
pub mod validate;

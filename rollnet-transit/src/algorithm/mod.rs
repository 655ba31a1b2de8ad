pub mod collapse;
pub mod repair;

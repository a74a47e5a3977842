// Care data owned outside the alerting core
pub mod repository;

pub use repository::{CareDirectory, CareRepository};

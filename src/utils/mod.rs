// Utility functions module
pub mod logging;

pub use logging::init_logging;

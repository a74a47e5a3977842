// Output module
pub mod table;

pub use table::{DeliveryRow, OutputFormat, VerdictRow};

pub mod args;

pub use args::{AppointmentAction, Cli, Commands, ConfigAction, FeedbackAction, UserAction, VitalArgs};

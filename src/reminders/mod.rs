pub mod scheduler;

pub use scheduler::{BatchResult, FailurePolicy, ReminderFailure, ReminderJob, ReminderKind, ReminderScheduler, ReminderSource};

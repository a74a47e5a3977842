// Command handlers module
pub mod care;
pub mod check;
pub mod config;
pub mod context;
pub mod evaluate;
pub mod panic;
pub mod remind;

// Re-export command handlers for easy access
pub use care::{handle_appointment_action, handle_assign_command, handle_feedback_action, handle_user_action};
pub use check::handle_check_command;
pub use config::handle_config_action;
pub use context::{AppContext, repository_path};
pub use evaluate::handle_evaluate_command;
pub use panic::handle_panic_command;
pub use remind::handle_remind_command;

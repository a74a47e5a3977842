// rpmon library crate
// Exposes modules for integration testing

pub mod alerts;
pub mod cli;
pub mod commands;
pub mod config;
pub mod models;
pub mod notify;
pub mod output;
pub mod reminders;
pub mod storage;
pub mod utils;

// rpmon: remote patient monitoring alerts and reminders
use clap::Parser;
use rpmon::cli::{Cli, Commands};
use rpmon::commands::{
    AppContext, handle_appointment_action, handle_assign_command, handle_check_command, handle_config_action,
    handle_evaluate_command, handle_feedback_action, handle_panic_command, handle_remind_command, handle_user_action,
    repository_path,
};
use rpmon::config::Config;
use rpmon::config::settings::expand_home;
use rpmon::utils::init_logging;
use std::path::Path;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let Cli { config: config_override, data, channel, verbose, json, command } = Cli::parse();

    let config_path = match &config_override {
        Some(path) => expand_home(path),
        None => Config::default_path()?,
    };

    match command {
        // Config management must work even when the current file is broken
        Commands::Config { action } => {
            init_logging("warn", verbose);
            handle_config_action(action, &config_path, json);
        }
        Commands::Evaluate { vitals } => {
            load_config(&config_path, verbose);
            handle_evaluate_command(vitals, json)?;
        }
        Commands::Check { patient, vitals } => {
            let ctx = AppContext::new(load_config(&config_path, verbose), data.as_deref(), channel)?;
            handle_check_command(patient, vitals, &ctx, json).await?;
        }
        Commands::Panic { patient, doctor } => {
            let ctx = AppContext::new(load_config(&config_path, verbose), data.as_deref(), channel)?;
            handle_panic_command(patient, doctor, &ctx, json).await?;
        }
        Commands::Remind => {
            let ctx = AppContext::new(load_config(&config_path, verbose), data.as_deref(), channel)?;
            handle_remind_command(&ctx, json).await?;
        }
        Commands::User { action } => {
            let config = load_config(&config_path, verbose);
            handle_user_action(action, &repository_path(&config, data.as_deref()), json)?;
        }
        Commands::Assign { doctor, patient } => {
            let config = load_config(&config_path, verbose);
            handle_assign_command(&doctor, &patient, &repository_path(&config, data.as_deref()), json)?;
        }
        Commands::Appointment { action } => {
            let config = load_config(&config_path, verbose);
            handle_appointment_action(action, &repository_path(&config, data.as_deref()), json)?;
        }
        Commands::Feedback { action } => {
            let config = load_config(&config_path, verbose);
            handle_feedback_action(action, &repository_path(&config, data.as_deref()), json)?;
        }
    }
    Ok(())
}

/// Load configuration and install logging at its level; exits on a broken file.
fn load_config(config_path: &Path, verbose: bool) -> Config {
    let config = match Config::load_from(config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: Failed to load configuration: {e:#}");
            std::process::exit(1);
        }
    };

    init_logging(&config.logging.level, verbose);
    tracing::debug!(config = ?config, "Configuration loaded");
    config
}

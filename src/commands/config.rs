use crate::cli::ConfigAction;
use crate::config::Config;
use std::path::Path;

pub fn handle_config_action(action: ConfigAction, config_path: &Path, json_output: bool) {
    match action {
        ConfigAction::Init => match Config::default().save_to(config_path) {
            Ok(()) => report_success(
                json_output,
                &format!("Configuration initialized at: {}", config_path.display()),
            ),
            Err(e) => report_failure(json_output, "Failed to initialize config", e),
        },
        ConfigAction::Show => match Config::load_from(config_path) {
            Ok(config) => {
                let config = redacted(config);
                if json_output {
                    match serde_json::to_string_pretty(&config) {
                        Ok(json) => println!("{}", json),
                        Err(e) => report_failure(false, "Failed to serialize config to JSON", e.into()),
                    }
                } else {
                    match toml::to_string_pretty(&config) {
                        Ok(toml_str) => {
                            println!("Configuration ({})", config_path.display());
                            println!("{}", toml_str);
                        }
                        Err(e) => report_failure(false, "Failed to serialize config", e.into()),
                    }
                }
            }
            Err(e) => report_failure(json_output, "Failed to load config", e),
        },
        ConfigAction::Set { key, value } => match Config::load_from(config_path) {
            Ok(mut config) => match config.set_value(&key, &value) {
                Ok(()) => match config.save_to(config_path) {
                    Ok(()) => {
                        let shown = if key == "email.password" { "<redacted>" } else { value.as_str() };
                        report_success(json_output, &format!("Configuration updated: {} = {}", key, shown));
                    }
                    Err(e) => report_failure(json_output, "Failed to save config", e),
                },
                Err(e) => report_failure(json_output, "Invalid configuration", e),
            },
            Err(e) => report_failure(json_output, "Failed to load config", e),
        },
    }
}

fn redacted(mut config: Config) -> Config {
    if config.email.password.is_some() {
        config.email.password = Some("<redacted>".to_string());
    }
    config
}

pub(crate) fn report_success(json_output: bool, message: &str) {
    if json_output {
        println!("{}", serde_json::json!({ "status": "success", "message": message }));
    } else {
        println!("{}", message);
    }
}

fn report_failure(json_output: bool, what: &str, error: anyhow::Error) -> ! {
    if json_output {
        println!(
            "{}",
            serde_json::json!({ "status": "error", "message": format!("{}: {:#}", what, error) })
        );
    } else {
        eprintln!("Error: {}: {:#}", what, error);
    }
    std::process::exit(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redacted_hides_password() {
        let mut config = Config::default();
        config.email.password = Some("hunter2".to_string());
        let shown = redacted(config);
        assert_eq!(shown.email.password.as_deref(), Some("<redacted>"));

        assert!(redacted(Config::default()).email.password.is_none());
    }
}

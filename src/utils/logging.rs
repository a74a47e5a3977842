use tracing_subscriber::EnvFilter;

/// Install the global subscriber. `RUST_LOG` wins over the configured level,
/// and `--verbose` raises the configured level to debug.
pub fn init_logging(level: &str, verbose: bool) {
    let fallback = if verbose { "debug" } else { level };

    // Logs go to stderr so JSON on stdout stays parseable.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter_for(fallback))))
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn filter_for(level: &str) -> String {
    format!("warn,rpmon={}", level)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_scopes_level_to_crate() {
        assert_eq!(filter_for("debug"), "warn,rpmon=debug");
    }

    #[test]
    fn test_init_twice_is_harmless() {
        init_logging("info", false);
        init_logging("debug", true);
    }
}

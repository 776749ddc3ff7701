//! Tracing subscriber setup.

use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is unset or invalid.
fn default_filter(configured_level: &str, verbose: bool) -> EnvFilter {
    let level = if verbose { "debug" } else { configured_level };
    EnvFilter::new(level.to_lowercase())
}

/// Initialise the global subscriber. Call once, at startup.
///
/// `RUST_LOG` wins when set; otherwise `verbose` selects `debug` and the
/// configured level is used as the fallback.
pub fn init_logging(configured_level: &str, verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter(configured_level, verbose));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter_levels() {
        assert_eq!(default_filter("WARN", false).to_string(), "warn");
        assert_eq!(default_filter("warn", true).to_string(), "debug");
    }

    #[test]
    fn test_init_installs_global_subscriber() {
        init_logging("info", false);
        assert!(tracing::dispatcher::has_been_set());
    }
}

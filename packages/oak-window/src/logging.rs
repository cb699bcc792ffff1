use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter used when `RUST_LOG` is unset or invalid.
const DEFAULT_DIRECTIVE: &str = "oak_window=info";

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE))
}

/// Install a global fmt subscriber filtered by `RUST_LOG`.
///
/// Intercepted native events are logged at `debug`, so set
/// `RUST_LOG=oak_window=debug` to see the full event trace. Calling this more
/// than once is harmless; only the first subscriber wins.
pub fn init_logging() {
    let _ = tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .with(env_filter())
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_subscriber::filter::Directive;

    #[test]
    fn test_default_directive_parses() {
        assert!(DEFAULT_DIRECTIVE.parse::<Directive>().is_ok());
    }

    #[test]
    fn test_env_filter_builds() {
        // Note: init_logging() installs a process-wide subscriber, so tests
        // only build the filter.
        let _filter = env_filter();
    }
}

use std::env;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const DEFAULT_FILTER: &str = "salon=info,actix_web=info";
const TEST_FILTER: &str = "warn";

/// `RUST_LOG` when it holds valid directives, `default` otherwise.
fn env_filter(directives: Option<String>, default: &str) -> EnvFilter {
    directives
        .filter(|d| !d.trim().is_empty())
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new(default))
}

fn filter_from_env(default: &str) -> EnvFilter {
    env_filter(env::var(EnvFilter::DEFAULT_ENV).ok(), default)
}

/// Installs the global subscriber. `RUST_LOG` overrides the default filter.
///
/// The fmt layer also receives `log` records, which is how actix's request
/// logger ends up in the same output.
pub fn init_logging() {
    let _ = tracing_subscriber::registry()
        .with(filter_from_env(DEFAULT_FILTER))
        .with(fmt::layer().with_target(true))
        .try_init();
}

#[cfg(test)]
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter_from_env(TEST_FILTER))
        .with_test_writer()
        .try_init();
}

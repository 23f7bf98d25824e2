use std::sync::Once;

use tracing_subscriber::EnvFilter;

const LOG_ENV: &str = "OVERLAYKIT_LOG";
const DEFAULT_DIRECTIVE: &str = "info";

static INIT: Once = Once::new();

/// Install the fmt subscriber for hosts that don't bring their own.
///
/// Filter comes from `OVERLAYKIT_LOG`, then `RUST_LOG`, then `info`. Safe to
/// call repeatedly; an already-installed global subscriber wins.
pub fn init() {
    INIT.call_once(|| {
        let subscriber = tracing_subscriber::fmt()
            .with_env_filter(env_filter())
            .with_target(true)
            .finish();
        if tracing::subscriber::set_global_default(subscriber).is_err() {
            tracing::debug!("global tracing subscriber already installed");
        }
    });
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE))
}

//! Logging bootstrap built on `tracing-subscriber`.

use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is not set.
pub const DEFAULT_FILTER: &str = "info,mapbind=debug,mapbind_core=debug";

/// Install a fmt subscriber, honouring `RUST_LOG` when present.
///
/// Calling this more than once is harmless; only the first call installs a
/// subscriber.
pub fn init() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// Install a fmt subscriber with an explicit filter directive.
pub fn init_with_filter(directive: &str) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(directive))
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_is_idempotent() {
        init_with_filter("warn");
        init();
        tracing::warn!("still logging after double init");
    }
}

//! Shared test setup

use tracing_subscriber::EnvFilter;

/// Route `tracing` output through the test harness. Safe to call from every test.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("concept_map=debug")),
        )
        .with_test_writer()
        .try_init();
}

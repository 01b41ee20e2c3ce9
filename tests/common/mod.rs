use tracing_subscriber::EnvFilter;

/// Routes `tracing` output through the test harness; `RUST_LOG` selects the level.
pub fn setup_log() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

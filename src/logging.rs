use tracing_subscriber::EnvFilter;

/// Diagnostics go to stderr so they never mix with the status lines on stdout.
/// `RUST_LOG` wins over the `--debug` flag when set.
pub fn init_logging(debug: bool) {
    let default_level = if debug { "olxfinder=debug" } else { "olxfinder=warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

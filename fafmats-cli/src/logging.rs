/// Logging setup: `tracing` events to stderr, filtered by `RUST_LOG`.
///
/// Without `RUST_LOG`, shows `info` and up, or `debug` with `--verbose`.
/// Results go to stdout, so piping tables or JSON stays clean.
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(verbose)
        .with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();
}

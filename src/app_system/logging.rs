/// Install the global subscriber.
///
/// `RUST_LOG` wins when set; otherwise `default_filter` (from config) is used.
///
/// ```text
/// RUST_LOG=debug marketplace
/// RUST_LOG=marketplace_fulfillment::payout_processor=debug,info marketplace
/// ```
pub fn setup_tracing(default_filter: &str) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter));

    // A second call (e.g. from a test) keeps the first subscriber.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_timer(tracing_subscriber::fmt::time::uptime())
        .compact()
        .try_init();
}

// Set default log level to info. To change, set RUST_LOG as so:
//
//    $ RUST_LOG=debug cargo run

pub fn init() {
    init_with_level("info");
}

/// Like `init`, with a different default filter. RUST_LOG still wins.
pub fn init_with_level(default_filter: &str) {
    // We use try_init here so it can by run by tests.
    _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .try_init();
}

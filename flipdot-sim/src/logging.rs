//! Logger set-up shared by the binaries

use env_logger::Env;

/// Initialise logging at `info`, overridable through `RUST_LOG`
pub fn init() {
    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();
}

//! Installs the `tracing-subscriber` formatter used by every subcommand.
//!
//! Verbosity is controlled by `RUST_LOG` (default `warn`). `NO_COLOR`
//! disables ANSI output here too, not just in diagnostic rendering.

use tracing_subscriber::EnvFilter;

pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let ansi = std::env::var_os("NO_COLOR").is_none();

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(ansi)
        .with_target(false)
        .try_init();
}

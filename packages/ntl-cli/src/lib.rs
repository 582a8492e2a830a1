#![deny(clippy::all)]

//! Command-line orchestration over `ntl-compiler`: argument parsing lives in
//! `bin/ntl.rs`; everything it delegates to lives here so it can be unit
//! tested without spawning a process.

pub mod build;
pub mod dev_server;
pub mod init_scaffold;
pub mod logging;
pub mod repl;
pub mod run;
pub mod watch;

/// CLI version, re-exported so `ntl version` and `--version` read the same
/// value as the library crate's `CompileStats`.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

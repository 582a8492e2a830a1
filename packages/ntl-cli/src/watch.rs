//! `ntl watch FILE`: compile once, then recompile on every filesystem change
//! to that file, printing a fresh result without clearing previous output.

use std::path::Path;
use std::sync::mpsc::channel;
use std::time::Duration;

use anyhow::{Context, Result};
use notify::{Config, RecommendedWatcher, RecursiveMode, Watcher};
use ntl_compiler::project::CompilerOptions;
use ntl_compiler::compile_source;
use tracing::{info, warn};

use crate::build::print_diagnostics;

pub fn watch(target: &Path, options: &CompilerOptions) -> Result<()> {
    compile_and_report(target, options);

    let (tx, rx) = channel();
    let mut watcher = RecommendedWatcher::new(tx, Config::default())
        .context("creating filesystem watcher")?;
    watcher
        .watch(target, RecursiveMode::NonRecursive)
        .with_context(|| format!("watching {}", target.display()))?;

    info!(file = %target.display(), "watching for changes");
    loop {
        match rx.recv_timeout(Duration::from_secs(3600)) {
            Ok(Ok(event)) => {
                if event.kind.is_modify() || event.kind.is_create() {
                    compile_and_report(target, options);
                }
            }
            Ok(Err(err)) => warn!(%err, "watch error"),
            Err(_) => continue,
        }
    }
}

fn compile_and_report(target: &Path, options: &CompilerOptions) {
    let Ok(source) = std::fs::read_to_string(target) else {
        eprintln!("could not read {}", target.display());
        return;
    };
    let url = target.to_string_lossy().to_string();
    let result = compile_source(&source, &url, options);
    print_diagnostics(&result);
    if !result.has_errors() {
        println!("{}", result.js);
    }
}

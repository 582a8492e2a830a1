//! `ntl run FILE`: compile then execute the result in an isolated host
//! context. No JavaScript engine is embedded in this workspace, so the host
//! context is the system `node` binary, fed the generated source on stdin.

use std::io::Write;
use std::path::Path;
use std::process::{Command, Stdio};

use anyhow::{Context, Result};
use ntl_compiler::project::CompilerOptions;
use ntl_compiler::compile_source;

use crate::build::print_diagnostics;

pub fn run(target: &Path, options: &CompilerOptions) -> Result<i32> {
    let source = std::fs::read_to_string(target)
        .with_context(|| format!("reading {}", target.display()))?;
    let url = target.to_string_lossy().to_string();
    let result = compile_source(&source, &url, options);
    print_diagnostics(&result);
    if result.has_errors() {
        return Ok(1);
    }

    run_js_in_node(&result.js)
}

/// Feeds `js` to `node` over stdin and forwards its exit code.
pub fn run_js_in_node(js: &str) -> Result<i32> {
    let mut child = Command::new("node")
        .arg("--input-type=commonjs")
        .stdin(Stdio::piped())
        .spawn()
        .context("spawning node — is it on PATH?")?;

    child
        .stdin
        .take()
        .expect("piped stdin")
        .write_all(js.as_bytes())
        .context("writing compiled source to node's stdin")?;

    let status = child.wait().context("waiting for node to exit")?;
    Ok(status.code().unwrap_or(1))
}

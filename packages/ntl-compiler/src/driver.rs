//! Orchestrates the lex → parse → scope → type → codegen pipeline and the
//! whole-project compile used by `ntl build`/`ntl watch`.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use rayon::prelude::*;
use tracing::{debug, info};

use crate::codegen;
use crate::diagnostics::{Diagnostic, Severity, SourceFile};
use crate::lexer;
use crate::parser;
use crate::project::{CompilerOptions, ProjectConfig};
use crate::scope;
use crate::types;
use crate::version::VERSION;

/// Internal, non-diagnostic failures: a malformed manifest or an unreadable
/// source file. Diagnostics *about NTL source* are never modeled as errors —
/// they accumulate in `CompileResult::diagnostics` per the driver contract.
#[derive(Debug, thiserror::Error)]
pub enum DriverError {
    #[error("cannot read {path}: {source}")]
    Io { path: PathBuf, source: std::io::Error },
    #[error("malformed project manifest {path}: {source}")]
    Manifest { path: PathBuf, source: serde_json::Error },
}

/// Read and parse an `ntl.json` manifest from disk.
pub fn load_project(path: &Path) -> Result<ProjectConfig, DriverError> {
    let content = std::fs::read_to_string(path)
        .map_err(|source| DriverError::Io { path: path.to_path_buf(), source })?;
    ProjectConfig::parse(&content)
        .map_err(|source| DriverError::Manifest { path: path.to_path_buf(), source })
}

#[derive(Debug, Clone)]
pub struct CompileStats {
    pub version: String,
    pub duration_ms: u128,
}

#[derive(Debug, Clone)]
pub struct CompileResult {
    pub js: String,
    pub diagnostics: Vec<Diagnostic>,
    pub stats: CompileStats,
}

impl CompileResult {
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(|d| d.severity == Severity::Error)
    }
}

/// Compile a single in-memory source string.
pub fn compile_source(source: &str, file_url: &str, options: &CompilerOptions) -> CompileResult {
    let start = std::time::Instant::now();
    let file = SourceFile::new(source, file_url);
    let mut diagnostics = Vec::new();

    debug!(file = file_url, "lex");
    let (tokens, mut lex_diags) = lexer::tokenize(source, file_url);
    diagnostics.append(&mut lex_diags);

    debug!(file = file_url, "parse");
    let (program, mut parse_diags) = parser::parse(tokens, file.clone());
    diagnostics.append(&mut parse_diags);

    debug!(file = file_url, "scope");
    let mut scope_diags = scope::analyze(&program, file.clone());
    diagnostics.append(&mut scope_diags);

    debug!(file = file_url, strict = options.strict, "type");
    let mut type_diags = types::infer(&program, file.clone(), options.strict);
    diagnostics.append(&mut type_diags);

    debug!(file = file_url, "codegen");
    let mut js = codegen::generate(&program);
    js = apply_module_format(&js, &options.target);
    if options.minify {
        js = minify(&js);
    }
    if options.credits {
        js = format!("// Generated by ntl v{VERSION}. Do not edit by hand.\n{js}");
    }

    let duration_ms = start.elapsed().as_millis();
    let errors = diagnostics.iter().filter(|d| d.severity == Severity::Error).count();
    if errors > 0 {
        info!(file = file_url, errors, duration_ms, "compile finished with errors");
    } else {
        info!(file = file_url, duration_ms, "compile finished");
    }

    CompileResult {
        js,
        diagnostics,
        stats: CompileStats { version: VERSION.to_string(), duration_ms },
    }
}

/// Rewrites bare `require` imports into ESM `import` statements when the
/// configured target calls for it; codegen always emits CommonJS `require`
/// for the NTL `require(...)` form, so this is a pure text rewrite rather
/// than a second codegen pass.
fn apply_module_format(js: &str, target: &str) -> String {
    if !target.eq_ignore_ascii_case("esm") {
        return js.to_string();
    }
    let re = regex::Regex::new(r#"const (\w+) = require\("([^"]+)"\);"#).unwrap();
    re.replace_all(js, "import $1 from \"$2\";").into_owned()
}

/// Strips blank lines and collapses leading whitespace to single spaces.
/// Not a real minifier — good enough to shrink generated output without
/// pulling in a JS-aware minification crate the rest of the stack doesn't use.
fn minify(js: &str) -> String {
    js.lines()
        .map(|line| line.trim())
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
        + "\n"
}

#[derive(Default)]
pub struct FileCache {
    entries: HashMap<PathBuf, (SystemTime, CompileResult)>,
}

impl FileCache {
    pub fn new() -> Self {
        FileCache::default()
    }

    /// Compile a file from disk, reusing the cached result when its mtime
    /// hasn't changed since the last call.
    pub fn compile_file(
        &mut self,
        path: &Path,
        options: &CompilerOptions,
    ) -> std::io::Result<CompileResult> {
        let metadata = std::fs::metadata(path)?;
        let mtime = metadata.modified()?;
        if let Some((cached_mtime, result)) = self.entries.get(path) {
            if *cached_mtime == mtime {
                return Ok(result.clone());
            }
        }
        let source = std::fs::read_to_string(path)?;
        let url = path.to_string_lossy().to_string();
        let result = compile_source(&source, &url, options);
        self.entries.insert(path.to_path_buf(), (mtime, result.clone()));
        Ok(result)
    }
}

/// Recursively collect `.ntl` files under `root`, skipping any path
/// component listed in `exclude`.
pub fn discover_sources(root: &Path, exclude: &[String]) -> Vec<PathBuf> {
    let mut files = Vec::new();
    collect(root, exclude, &mut files);
    files.sort();
    files
}

fn collect(dir: &Path, exclude: &[String], out: &mut Vec<PathBuf>) {
    let Ok(entries) = std::fs::read_dir(dir) else { return };
    for entry in entries.flatten() {
        let path = entry.path();
        let name = entry.file_name();
        let name = name.to_string_lossy();
        if exclude.iter().any(|e| name == e.as_str()) {
            continue;
        }
        if path.is_dir() {
            collect(&path, exclude, out);
        } else if path.extension().map(|e| e == "ntl").unwrap_or(false) {
            out.push(path);
        }
    }
}

/// Compile every source file in a project in parallel, mirroring the file
/// list returned by `discover_sources` against `project.exclude`.
pub fn compile_project(root: &Path, project: &ProjectConfig) -> Vec<(PathBuf, CompileResult)> {
    let src_root = root.join(&project.src);
    let files = discover_sources(&src_root, &project.exclude);
    let results: Vec<_> = files
        .into_par_iter()
        .map(|path| {
            let source = std::fs::read_to_string(&path).unwrap_or_default();
            let url = path.to_string_lossy().to_string();
            let result = compile_source(&source, &url, &project.compiler_options);
            info!(file = %url, errors = result.has_errors(), "project file compiled");
            (path, result)
        })
        .collect();
    let failed = results.iter().filter(|(_, r)| r.has_errors()).count();
    info!(project = %project.name, files = results.len(), failed, "project compile finished");
    results
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compiles_hello_world() {
        let options = CompilerOptions::default();
        let result = compile_source("console.log(\"hello\")", "hello.ntl", &options);
        assert!(!result.has_errors(), "{:?}", result.diagnostics);
        assert!(result.js.contains("console.log(\"hello\")"));
    }

    #[test]
    fn reports_undeclared_identifier_end_to_end() {
        let options = CompilerOptions::default();
        let result = compile_source("console.log(mystery)", "hello.ntl", &options);
        assert!(result.has_errors());
    }

    #[test]
    fn rewrites_require_for_esm_target() {
        let mut options = CompilerOptions::default();
        options.target = "esm".to_string();
        let result = compile_source("val fs = require(\"fs\")", "hello.ntl", &options);
        assert!(result.js.contains("import fs from \"fs\";"));
    }

    #[test]
    fn minify_strips_blank_lines() {
        let mut options = CompilerOptions::default();
        options.minify = true;
        options.credits = false;
        let result = compile_source("val x = 1\n\nval y = 2", "hello.ntl", &options);
        assert!(!result.js.contains("\n\n"));
    }
}

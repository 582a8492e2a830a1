//! Backing logic for `ntl build` and `ntl check`.

use std::path::Path;

use anyhow::{Context, Result};
use ntl_compiler::project::CompilerOptions;
use ntl_compiler::{compile_project, compile_source, load_project, CompileResult};

/// Prints every diagnostic in a result, in source order.
pub fn print_diagnostics(result: &CompileResult) {
    for diagnostic in &result.diagnostics {
        eprintln!("{}", diagnostic.render());
    }
}

/// `ntl build FILE|ntl.json [-o PATH]`. Returns the process exit code.
pub fn build(target: &Path, options: &CompilerOptions, out: Option<&Path>) -> Result<i32> {
    if target.file_name().map(|n| n == "ntl.json").unwrap_or(false) {
        return build_project(target, out);
    }

    let source = std::fs::read_to_string(target)
        .with_context(|| format!("reading {}", target.display()))?;
    let url = target.to_string_lossy().to_string();
    let result = compile_source(&source, &url, options);
    print_diagnostics(&result);
    if result.has_errors() {
        return Ok(1);
    }

    match out {
        Some(path) => {
            std::fs::write(path, &result.js)
                .with_context(|| format!("writing {}", path.display()))?;
        }
        None => println!("{}", result.js),
    }
    Ok(0)
}

fn build_project(manifest_path: &Path, out: Option<&Path>) -> Result<i32> {
    let project = load_project(manifest_path)?;
    let root = manifest_path.parent().unwrap_or_else(|| Path::new("."));
    let results = compile_project(root, &project);

    let mut any_errors = false;
    let dist_root = out.map(Path::to_path_buf).unwrap_or_else(|| root.join(&project.dist));
    let src_root = root.join(&project.src);

    for (path, result) in &results {
        print_diagnostics(result);
        if result.has_errors() {
            any_errors = true;
            continue;
        }
        let relative = path.strip_prefix(&src_root).unwrap_or(path);
        let dest = dist_root.join(relative).with_extension("js");
        if let Some(parent) = dest.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&dest, &result.js)
            .with_context(|| format!("writing {}", dest.display()))?;
    }

    Ok(if any_errors { 1 } else { 0 })
}

/// `ntl check FILE`: runs lex/parse/scope/type only, never emits JS.
pub fn check(target: &Path) -> Result<i32> {
    let source = std::fs::read_to_string(target)
        .with_context(|| format!("reading {}", target.display()))?;
    let url = target.to_string_lossy().to_string();
    let options = CompilerOptions::default();
    let result = compile_source(&source, &url, &options);
    print_diagnostics(&result);
    if result.has_errors() {
        return Ok(1);
    }
    println!("OK");
    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_writes_js_to_out_path() {
        let dir = std::env::temp_dir().join(format!("ntl-cli-build-test-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let src = dir.join("main.ntl");
        std::fs::write(&src, "console.log(\"hi\")").unwrap();
        let out = dir.join("main.js");

        let code = build(&src, &CompilerOptions::default(), Some(&out)).unwrap();
        assert_eq!(code, 0);
        assert!(std::fs::read_to_string(&out).unwrap().contains("console.log"));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn check_reports_nonzero_on_error() {
        let dir = std::env::temp_dir().join(format!("ntl-cli-check-test-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let src = dir.join("main.ntl");
        std::fs::write(&src, "console.log(mystery)").unwrap();

        let code = check(&src).unwrap();
        assert_eq!(code, 1);

        std::fs::remove_dir_all(&dir).ok();
    }
}

//! `ntl repl`: an interactive prompt with multi-line bracket-balanced input.
//! Each complete chunk is compiled and run in a persistent `node` host
//! context so `val`/`fn` declarations from earlier lines stay in scope.

use anyhow::Result;
use ntl_compiler::project::CompilerOptions;
use ntl_compiler::compile_source;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use crate::build::print_diagnostics;
use crate::run::run_js_in_node;

/// True once every `(`/`[`/`{` opened in `buffer` has a matching close.
fn brackets_balanced(buffer: &str) -> bool {
    let mut depth: i64 = 0;
    for ch in buffer.chars() {
        match ch {
            '(' | '[' | '{' => depth += 1,
            ')' | ']' | '}' => depth -= 1,
            _ => {}
        }
    }
    depth <= 0
}

pub fn repl() -> Result<()> {
    let mut editor = DefaultEditor::new()?;
    let options = CompilerOptions::default();
    let mut session_js = String::new();
    let mut buffer = String::new();

    println!("ntl repl — Ctrl-D to exit");
    loop {
        let prompt = if buffer.is_empty() { "ntl> " } else { "...> " };
        match editor.readline(prompt) {
            Ok(line) => {
                if !buffer.is_empty() {
                    buffer.push('\n');
                }
                buffer.push_str(&line);
                let _ = editor.add_history_entry(&line);

                if !brackets_balanced(&buffer) {
                    continue;
                }

                let chunk = std::mem::take(&mut buffer);
                let result = compile_source(&chunk, "repl", &options);
                print_diagnostics(&result);
                if result.has_errors() {
                    continue;
                }
                session_js.push_str(&result.js);
                session_js.push('\n');
                let _ = run_js_in_node(&session_js);
            }
            Err(ReadlineError::Interrupted) => {
                buffer.clear();
                continue;
            }
            Err(ReadlineError::Eof) => break,
            Err(err) => {
                eprintln!("readline error: {err}");
                break;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn balanced_input_is_detected() {
        assert!(brackets_balanced("val x = 1"));
        assert!(brackets_balanced("fn f(a, b) { return a + b }"));
    }

    #[test]
    fn unbalanced_input_waits_for_more() {
        assert!(!brackets_balanced("fn f(a, b) {"));
        assert!(!brackets_balanced("val arr = ["));
    }
}

#![deny(clippy::all)]

//! The NTL compiler: lexer, parser, scope analyzer, type inferer, code
//! generator and driver. `ntl-cli` is the only consumer of this crate's
//! public API.

pub mod ast;
pub mod chars;
pub mod codegen;
pub mod diagnostics;
pub mod driver;
pub mod lexer;
pub mod modules;
pub mod parser;
pub mod project;
pub mod scope;
pub mod types;
pub mod version;

pub use diagnostics::Diagnostic;
pub use driver::{compile_project, compile_source, load_project, CompileResult, DriverError, FileCache};
pub use project::ProjectConfig;

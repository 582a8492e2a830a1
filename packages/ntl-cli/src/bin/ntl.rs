//! `ntl` — the NTL compiler command-line driver.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use ntl_cli::{build, dev_server, init_scaffold, logging, repl, run, watch};
use ntl_compiler::project::CompilerOptions;

#[derive(Parser)]
#[command(name = "ntl", version, about = "The NTL compiler")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Clone)]
struct CompileFlags {
    /// node|browser|deno|bun|esm|cjs
    #[arg(long, default_value = "node")]
    target: String,
    #[arg(long)]
    strict: bool,
    #[arg(long)]
    minify: bool,
    /// Post-pass obfuscation. Accepted for CLI compatibility; not performed.
    #[arg(long)]
    obfuscate: bool,
    #[arg(long = "no-treeshake")]
    no_treeshake: bool,
    #[arg(long)]
    credits: bool,
    #[arg(long = "source-map")]
    source_map: bool,
    /// Reuse unchanged compile results across invocations. Accepted for CLI
    /// compatibility; `build`/`watch` already recompile only on demand.
    #[arg(long)]
    incremental: bool,
}

impl From<CompileFlags> for CompilerOptions {
    fn from(flags: CompileFlags) -> Self {
        CompilerOptions {
            target: flags.target,
            strict: flags.strict,
            minify: flags.minify,
            tree_shake: !flags.no_treeshake,
            credits: flags.credits,
            source_map: flags.source_map,
        }
    }
}

#[derive(Subcommand)]
enum Command {
    /// Compile then execute in an isolated host context.
    Run {
        file: PathBuf,
        #[command(flatten)]
        flags: CompileFlags,
    },
    /// Compile a file or an `ntl.json` project.
    Build {
        file: PathBuf,
        #[arg(short = 'o', long = "out")]
        out: Option<PathBuf>,
        #[command(flatten)]
        flags: CompileFlags,
    },
    /// Lex, parse, scope and typecheck only.
    Check { file: PathBuf },
    /// Initial compile, then recompile on each change.
    Watch {
        file: PathBuf,
        #[command(flatten)]
        flags: CompileFlags,
    },
    /// Recursively compile and serve `.ntl` files under DIR.
    Dev {
        dir: Option<PathBuf>,
        #[arg(long, default_value_t = 3000)]
        port: u16,
        #[command(flatten)]
        flags: CompileFlags,
    },
    /// Interactive multi-line prompt.
    Repl,
    /// Scaffold a new project.
    Init {
        dir: Option<PathBuf>,
        #[arg(long)]
        name: Option<String>,
    },
    /// Print the compiler version and host info.
    Version,
}

fn main() -> ExitCode {
    logging::init();
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Run { file, flags } => run::run(&file, &flags.into()),
        Command::Build { file, out, flags } => build::build(&file, &flags.into(), out.as_deref()),
        Command::Check { file } => build::check(&file),
        Command::Watch { file, flags } => watch::watch(&file, &flags.into()).map(|_| 0),
        Command::Dev { dir, port, flags } => {
            let dir = dir.unwrap_or_else(|| PathBuf::from("."));
            let rt = match tokio::runtime::Runtime::new() {
                Ok(rt) => rt,
                Err(err) => {
                    eprintln!("failed to start async runtime: {err}");
                    return ExitCode::FAILURE;
                }
            };
            rt.block_on(dev_server::serve(dir, port, flags.into())).map(|_| 0)
        }
        Command::Repl => repl::repl().map(|_| 0),
        Command::Init { dir, name } => {
            let dir = dir.unwrap_or_else(|| PathBuf::from("."));
            let name = name.unwrap_or_else(|| {
                dir.file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| "ntl-project".to_string())
            });
            init_scaffold::init(&dir, &name).map(|_| 0)
        }
        Command::Version => {
            println!("ntl {} (node host: {})", ntl_cli::version(), node_version());
            Ok(0)
        }
    };

    match result {
        Ok(code) => exit_code(code),
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn exit_code(code: i32) -> ExitCode {
    ExitCode::from(code.clamp(0, 255) as u8)
}

fn node_version() -> String {
    std::process::Command::new("node")
        .arg("--version")
        .output()
        .ok()
        .and_then(|out| String::from_utf8(out.stdout).ok())
        .map(|s| s.trim().to_string())
        .unwrap_or_else(|| "not found".to_string())
}

//! `ntl dev [DIR]`: compiles every `.ntl` file under DIR into an in-memory
//! map of `path -> JS text`, serves each over HTTP, serves a generated index
//! at `/`, and recompiles the map on any filesystem change under DIR.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use axum::extract::{Path as AxumPath, State};
use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use notify::{Config, RecommendedWatcher, RecursiveMode, Watcher};
use ntl_compiler::driver::discover_sources;
use ntl_compiler::project::CompilerOptions;
use ntl_compiler::compile_source;
use tracing::info;

#[derive(Clone)]
struct DevState {
    compiled: Arc<Mutex<HashMap<String, String>>>,
}

fn compile_all(dir: &Path, options: &CompilerOptions) -> HashMap<String, String> {
    let mut out = HashMap::new();
    for path in discover_sources(dir, &[]) {
        let source = std::fs::read_to_string(&path).unwrap_or_default();
        let url = path.to_string_lossy().to_string();
        let result = compile_source(&source, &url, options);
        let relative = path.strip_prefix(dir).unwrap_or(&path);
        let route = format!("/{}", relative.with_extension("js").to_string_lossy());
        out.insert(route, result.js);
    }
    out
}

async fn index(State(state): State<DevState>) -> Html<String> {
    let compiled = state.compiled.lock().unwrap();
    let mut routes: Vec<&String> = compiled.keys().collect();
    routes.sort();
    let items: String = routes
        .iter()
        .map(|route| format!("<li><a href=\"{route}\">{route}</a></li>"))
        .collect();
    Html(format!("<html><body><ul>{items}</ul></body></html>"))
}

async fn serve_js(AxumPath(route): AxumPath<String>, State(state): State<DevState>) -> Response {
    let key = format!("/{route}");
    let compiled = state.compiled.lock().unwrap();
    match compiled.get(&key) {
        Some(js) => ([(header::CONTENT_TYPE, "application/javascript")], js.clone()).into_response(),
        None => (StatusCode::NOT_FOUND, "not found").into_response(),
    }
}

/// Spawns a background thread recompiling `dir` into `compiled` on every
/// filesystem change, and runs the axum server in the foreground.
pub async fn serve(dir: PathBuf, port: u16, options: CompilerOptions) -> Result<()> {
    let compiled = Arc::new(Mutex::new(compile_all(&dir, &options)));
    let state = DevState { compiled: compiled.clone() };

    let watch_dir = dir.clone();
    let watch_options = options.clone();
    std::thread::spawn(move || {
        let (tx, rx) = std::sync::mpsc::channel();
        let Ok(mut watcher) = RecommendedWatcher::new(tx, Config::default()) else { return };
        if watcher.watch(&watch_dir, RecursiveMode::Recursive).is_err() {
            return;
        }
        for event in rx {
            if event.is_ok() {
                let fresh = compile_all(&watch_dir, &watch_options);
                *compiled.lock().unwrap() = fresh;
                info!(dir = %watch_dir.display(), "recompiled on change");
            }
        }
    });

    let app = Router::new()
        .route("/", get(index))
        .route("/*route", get(serve_js))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port))
        .await
        .with_context(|| format!("binding port {port}"))?;
    info!(port, dir = %dir.display(), "dev server listening");
    axum::serve(listener, app).await.context("dev server failed")?;
    Ok(())
}

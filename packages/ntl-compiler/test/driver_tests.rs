use ntl_compiler::compile_source;
use ntl_compiler::driver::compile_project;
use ntl_compiler::project::ProjectConfig;

#[test]
fn compile_source_attaches_version_stats() {
    let options = ntl_compiler::project::CompilerOptions::default();
    let result = compile_source("val x = 1", "t.ntl", &options);
    assert!(!result.stats.version.is_empty());
}

#[test]
fn compile_project_walks_nested_directories() {
    let dir = std::env::temp_dir().join(format!("ntl-driver-test-{}", std::process::id()));
    let src_dir = dir.join("src").join("nested");
    std::fs::create_dir_all(&src_dir).unwrap();
    std::fs::write(dir.join("src").join("main.ntl"), "console.log(\"top\")").unwrap();
    std::fs::write(src_dir.join("child.ntl"), "console.log(\"nested\")").unwrap();

    let project = ProjectConfig::scaffold("demo");
    let results = compile_project(&dir, &project);
    assert_eq!(results.len(), 2);
    assert!(results.iter().all(|(_, r)| !r.has_errors()));

    std::fs::remove_dir_all(&dir).ok();
}

//! The `ntl.json` project manifest.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompilerOptions {
    #[serde(default = "default_target")]
    pub target: String,
    #[serde(default)]
    pub strict: bool,
    #[serde(default)]
    pub minify: bool,
    #[serde(default = "default_true")]
    pub tree_shake: bool,
    #[serde(default = "default_true")]
    pub credits: bool,
    #[serde(default)]
    pub source_map: bool,
}

fn default_target() -> String {
    "es2020".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for CompilerOptions {
    fn default() -> Self {
        CompilerOptions {
            target: default_target(),
            strict: false,
            minify: false,
            tree_shake: true,
            credits: true,
            source_map: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectConfig {
    pub name: String,
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default = "default_src")]
    pub src: String,
    #[serde(default = "default_dist")]
    pub dist: String,
    #[serde(default)]
    pub compiler_options: CompilerOptions,
    #[serde(default = "default_include")]
    pub include: Vec<String>,
    #[serde(default)]
    pub exclude: Vec<String>,
}

fn default_version() -> String {
    "0.1.0".to_string()
}

fn default_src() -> String {
    "src".to_string()
}

fn default_dist() -> String {
    "dist".to_string()
}

fn default_include() -> Vec<String> {
    vec!["**/*.ntl".to_string()]
}

impl ProjectConfig {
    pub fn parse(content: &str) -> Result<ProjectConfig, serde_json::Error> {
        serde_json::from_str(content)
    }

    pub fn to_pretty_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn scaffold(name: &str) -> ProjectConfig {
        ProjectConfig {
            name: name.to_string(),
            version: default_version(),
            src: default_src(),
            dist: default_dist(),
            compiler_options: CompilerOptions::default(),
            include: default_include(),
            exclude: vec!["node_modules".to_string(), "dist".to_string()],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_minimal_manifest() {
        let cfg = ProjectConfig::parse(r#"{"name": "demo"}"#).unwrap();
        assert_eq!(cfg.name, "demo");
        assert_eq!(cfg.src, "src");
        assert!(!cfg.compiler_options.strict);
    }

    #[test]
    fn parses_full_manifest_with_camel_case() {
        let json = r#"{
            "name": "demo",
            "version": "1.2.3",
            "src": "lib",
            "dist": "out",
            "compilerOptions": { "target": "es2022", "strict": true, "treeShake": false }
        }"#;
        let cfg = ProjectConfig::parse(json).unwrap();
        assert_eq!(cfg.dist, "out");
        assert!(cfg.compiler_options.strict);
        assert!(!cfg.compiler_options.tree_shake);
    }
}

//! `ntl init [DIR]`: scaffolds `ntl.json`, `src/main.ntl`, `package.json`
//! and `.gitignore` for a new project.

use std::path::Path;

use anyhow::{Context, Result};
use ntl_compiler::ProjectConfig;

const MAIN_NTL: &str = "fn greet(name) {\n  return `Hello, ${name}!`\n}\n\nconsole.log(greet(\"world\"))\n";

pub fn init(dir: &Path, name: &str) -> Result<()> {
    std::fs::create_dir_all(dir.join("src")).context("creating src/")?;

    let project = ProjectConfig::scaffold(name);
    std::fs::write(dir.join("ntl.json"), project.to_pretty_json()?)
        .context("writing ntl.json")?;

    std::fs::write(dir.join("src").join("main.ntl"), MAIN_NTL)
        .context("writing src/main.ntl")?;

    let package_json = format!(
        "{{\n  \"name\": \"{name}\",\n  \"version\": \"0.1.0\",\n  \"private\": true,\n  \"scripts\": {{\n    \"build\": \"ntl build ntl.json\"\n  }}\n}}\n"
    );
    std::fs::write(dir.join("package.json"), package_json).context("writing package.json")?;

    std::fs::write(dir.join(".gitignore"), "dist/\nnode_modules/\n")
        .context("writing .gitignore")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scaffolds_expected_files() {
        let dir = std::env::temp_dir().join(format!("ntl-cli-init-test-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();

        init(&dir, "demo").unwrap();

        assert!(dir.join("ntl.json").exists());
        assert!(dir.join("src").join("main.ntl").exists());
        assert!(dir.join("package.json").exists());
        assert!(dir.join(".gitignore").exists());

        std::fs::remove_dir_all(&dir).ok();
    }
}

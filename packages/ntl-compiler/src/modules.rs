//! Resolution table for the `require(ntl, name, ...)` import form.
//!
//! The bundled module set is closed: nine names, each mapped to the path the
//! runtime ships its implementation under. Anything outside this set is an
//! `UNKNOWN_MODULE` diagnostic raised during scope resolution, not a parse
//! error, since the syntax itself (`require(ntl, whatever)`) is valid.

const MODULES: &[(&str, &str)] = &[
    ("http", "ntl/lib/http"),
    ("fs", "ntl/lib/fs"),
    ("crypto", "ntl/lib/crypto"),
    ("logger", "ntl/lib/logger"),
    ("test", "ntl/lib/test"),
    ("ai", "ntl/lib/ai"),
    ("game", "ntl/lib/game"),
    ("web", "ntl/lib/web"),
    ("obf", "ntl/lib/obf"),
];

/// The absolute require path for a bundled module name, or `None` if `name`
/// isn't one of the nine NTL ships.
pub fn resolve(name: &str) -> Option<&'static str> {
    MODULES.iter().find(|(n, _)| *n == name).map(|(_, path)| *path)
}

/// The closed set of bundled module names, in declaration order — used to
/// build "did you mean" suggestions for an unknown module.
pub fn names() -> impl Iterator<Item = &'static str> {
    MODULES.iter().map(|(n, _)| *n)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_bundled_modules() {
        assert_eq!(resolve("http"), Some("ntl/lib/http"));
        assert_eq!(resolve("obf"), Some("ntl/lib/obf"));
    }

    #[test]
    fn rejects_unknown_module() {
        assert_eq!(resolve("left-pad"), None);
    }

    #[test]
    fn names_covers_every_bundled_module() {
        let all: Vec<&str> = names().collect();
        assert_eq!(all.len(), 9);
        assert!(all.contains(&"logger"));
    }
}

use serde::Deserialize;

use crate::error::{CacheError, Result};

const BUNDLED: &str = include_str!("../shell-manifest.json");

/// The app shell: which bucket to fill and with what.
///
/// Bumping `cache_name` is the only versioning mechanism; the next activate
/// deletes every bucket with a different name.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ShellManifest {
    pub cache_name: String,
    /// Paths relative to the worker scope. `./` is the scope itself.
    pub assets: Vec<String>,
}

impl ShellManifest {
    pub fn from_json(json: &str) -> Result<Self> {
        let manifest: ShellManifest = serde_json::from_str(json)?;
        manifest.validate()?;
        Ok(manifest)
    }

    /// The manifest shipped with the game.
    pub fn bundled() -> Result<Self> {
        Self::from_json(BUNDLED)
    }

    pub fn validate(&self) -> Result<()> {
        if self.cache_name.trim().is_empty() {
            return Err(CacheError::EmptyCacheName);
        }
        Ok(())
    }

    /// Absolute asset URLs for a worker registered at `scope`.
    pub fn asset_urls(&self, scope: &str) -> Vec<String> {
        self.assets.iter().map(|path| resolve(scope, path)).collect()
    }
}

/// Resolve a manifest path against the scope URL.
///
/// Handles the forms a shell manifest uses: absolute URLs, origin-relative
/// paths, and paths relative to the scope directory.
pub fn resolve(scope: &str, path: &str) -> String {
    if path.contains("://") {
        return path.to_string();
    }

    if let Some(rooted) = path.strip_prefix('/') {
        return format!("{}/{}", origin(scope), rooted);
    }

    // Directory of the scope: everything up to and including the last '/'
    let base = match scope.rfind('/') {
        Some(i) if !scope[..i].ends_with('/') => &scope[..=i],
        _ => scope,
    };
    let relative = path.strip_prefix("./").unwrap_or(path);
    if base.ends_with('/') {
        format!("{}{}", base, relative)
    } else {
        format!("{}/{}", base, relative)
    }
}

/// `scheme://host[:port]` of an absolute URL.
pub fn origin(url: &str) -> &str {
    let end = url
        .find("://")
        .and_then(|s| url[s + 3..].find(['/', '?', '#']).map(|p| s + 3 + p))
        .unwrap_or(url.len());
    &url[..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCOPE: &str = "https://play.example/lane/";

    #[test]
    fn bundled_manifest_lists_the_shell() {
        let m = ShellManifest::bundled().unwrap();
        assert_eq!(m.cache_name, "lane-runner-v1");
        assert_eq!(m.assets.len(), 9);
        assert_eq!(m.assets[0], "./");
    }

    #[test]
    fn empty_cache_name_rejected() {
        let err = ShellManifest::from_json(r#"{ "cache_name": " ", "assets": [] }"#).unwrap_err();
        assert!(matches!(err, CacheError::EmptyCacheName));
    }

    #[test]
    fn malformed_manifest_rejected() {
        let err = ShellManifest::from_json(r#"{ "assets": [] }"#).unwrap_err();
        assert!(matches!(err, CacheError::Manifest(_)));
    }

    #[test]
    fn paths_resolve_against_scope() {
        assert_eq!(resolve(SCOPE, "./"), "https://play.example/lane/");
        assert_eq!(resolve(SCOPE, "./icons/icon-192.png"), "https://play.example/lane/icons/icon-192.png");
        assert_eq!(resolve(SCOPE, "game.js"), "https://play.example/lane/game.js");
        assert_eq!(resolve(SCOPE, "/favicon.ico"), "https://play.example/favicon.ico");
        assert_eq!(resolve(SCOPE, "https://cdn.example/x.js"), "https://cdn.example/x.js");
    }

    #[test]
    fn origin_stops_at_path() {
        assert_eq!(origin(SCOPE), "https://play.example");
        assert_eq!(origin("http://localhost:8080"), "http://localhost:8080");
        assert_eq!(origin("http://localhost:8080?x=1"), "http://localhost:8080");
    }

    #[test]
    fn scope_without_trailing_slash_uses_its_directory() {
        assert_eq!(
            resolve("https://play.example/lane/sw.js", "./index.html"),
            "https://play.example/lane/index.html"
        );
        assert_eq!(resolve("https://play.example", "./index.html"), "https://play.example/index.html");
    }
}

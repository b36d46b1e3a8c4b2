//! Configuration file discovery and loading.
//!
//! The discovery order is:
//! 1. An explicit path (the CLI's `--config` flag).
//! 2. `QUOTELENS_CONFIG` environment variable.
//! 3. `./quotelens.json` in the working directory.
//! 4. `~/.quotelens/config.json`
//! 5. If none found, built-in defaults (`{}`).
//!
//! JSON keys are normalized from camelCase to snake_case before
//! deserializing, so both spellings work in every section.

use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::{debug, info, warn};

use quotelens_types::config::Config;
use quotelens_types::{QuoteLensError, Result};

/// Environment variable naming a config file.
pub const CONFIG_ENV: &str = "QUOTELENS_CONFIG";

/// Discover the config file path using the fallback chain.
///
/// Returns `None` if no candidate applies. An explicit path or the
/// environment variable is returned without an existence check; the
/// working-directory and home candidates only count when they exist.
pub fn discover_config_path(
    explicit: Option<&Path>,
    env_path: Option<String>,
    cwd: Option<PathBuf>,
    home_dir: Option<PathBuf>,
) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }

    if let Some(env_path) = env_path.filter(|p| !p.is_empty()) {
        return Some(PathBuf::from(env_path));
    }

    if let Some(cwd) = cwd {
        let local = cwd.join("quotelens.json");
        if local.exists() {
            return Some(local);
        }
    }

    if let Some(home) = home_dir {
        let home_path = home.join(".quotelens").join("config.json");
        if home_path.exists() {
            return Some(home_path);
        }
    }

    None
}

/// Resolve and load the configuration.
///
/// Returns the typed config and the file it came from, if any. A relative
/// artifacts directory in a config file is resolved against that file's
/// directory.
pub fn load_config(explicit: Option<&Path>) -> Result<(Config, Option<PathBuf>)> {
    let path = discover_config_path(
        explicit,
        std::env::var(CONFIG_ENV).ok(),
        std::env::current_dir().ok(),
        dirs::home_dir(),
    );

    let Some(path) = path else {
        info!("no config file found, using defaults");
        return Ok((Config::default(), None));
    };

    if explicit.is_none() && !path.exists() {
        warn!(path = %path.display(), "config path does not exist, using defaults");
        return Ok((Config::default(), None));
    }

    debug!(path = %path.display(), "loading config file");
    let mut config = load_config_file(&path)?;
    if config.artifacts.dir.is_relative()
        && let Some(parent) = path.parent()
    {
        config.artifacts.dir = parent.join(&config.artifacts.dir);
    }
    Ok((config, Some(path)))
}

/// Read, normalize and deserialize one config file.
pub fn load_config_file(path: &Path) -> Result<Config> {
    let contents = std::fs::read_to_string(path).map_err(|e| {
        QuoteLensError::configuration(format!(
            "failed to read config file {}: {e}",
            path.display()
        ))
    })?;
    parse_config(&contents).map_err(|e| match e {
        QuoteLensError::Configuration { reason } => QuoteLensError::configuration(format!(
            "{reason} (in {})",
            path.display()
        )),
        other => other,
    })
}

/// Parse config JSON text.
pub fn parse_config(contents: &str) -> Result<Config> {
    let value: Value = serde_json::from_str(contents)
        .map_err(|e| QuoteLensError::configuration(format!("failed to parse config: {e}")))?;
    serde_json::from_value(normalize_keys(value))
        .map_err(|e| QuoteLensError::configuration(format!("invalid config: {e}")))
}

/// Convert camelCase JSON keys to snake_case recursively.
///
/// Processes objects and arrays recursively. Non-object/array values are
/// returned unchanged.
pub fn normalize_keys(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut new_map = serde_json::Map::new();
            for (key, val) in map {
                new_map.insert(camel_to_snake(&key), normalize_keys(val));
            }
            Value::Object(new_map)
        }
        Value::Array(arr) => Value::Array(arr.into_iter().map(normalize_keys).collect()),
        other => other,
    }
}

/// Convert a single camelCase string to snake_case.
///
/// A run of uppercase letters like `"CORS"` is kept together, with an
/// underscore inserted only before the last uppercase letter if it is
/// followed by a lowercase letter.
///
/// # Examples
/// ```
/// # use quotelens_core::config_loader::camel_to_snake;
/// assert_eq!(camel_to_snake("maxUploadBytes"), "max_upload_bytes");
/// assert_eq!(camel_to_snake("already_snake"), "already_snake");
/// assert_eq!(camel_to_snake("CORSOrigins"), "cors_origins");
/// ```
pub fn camel_to_snake(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    let mut result = String::with_capacity(name.len() + 4);

    for (i, &ch) in chars.iter().enumerate() {
        if ch.is_uppercase() && i > 0 {
            let prev = chars[i - 1];
            let next = chars.get(i + 1).copied();
            if prev.is_lowercase()
                || (prev.is_uppercase() && next.is_some_and(|c| c.is_lowercase()))
            {
                result.push('_');
            }
        }
        result.push(ch.to_ascii_lowercase());
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    // ── camel_to_snake ────────────────────────────────────────────────

    #[test]
    fn camel_to_snake_words() {
        assert_eq!(camel_to_snake("positiveLabel"), "positive_label");
        assert_eq!(camel_to_snake("maxUploadBytes"), "max_upload_bytes");
        assert_eq!(camel_to_snake("dir"), "dir");
        assert_eq!(camel_to_snake(""), "");
    }

    #[test]
    fn camel_to_snake_acronyms() {
        assert_eq!(camel_to_snake("CORSOrigins"), "cors_origins");
        assert_eq!(camel_to_snake("HTML"), "html");
    }

    // ── normalize_keys ────────────────────────────────────────────────

    #[test]
    fn normalize_keys_nested() {
        let input = json!({
            "server": { "maxUploadBytes": 10 },
            "pipeline": { "remaps": [{ "field": "A", "from": " ", "to": "N" }] }
        });
        let expected = json!({
            "server": { "max_upload_bytes": 10 },
            "pipeline": { "remaps": [{ "field": "A", "from": " ", "to": "N" }] }
        });
        assert_eq!(normalize_keys(input), expected);
    }

    #[test]
    fn normalize_keys_leaves_values_alone() {
        let input = json!({ "inference": { "positiveLabel": "camelCaseText" } });
        let out = normalize_keys(input);
        assert_eq!(out["inference"]["positive_label"], "camelCaseText");
    }

    // ── parse_config ──────────────────────────────────────────────────

    #[test]
    fn empty_object_gives_defaults() {
        let config = parse_config("{}").unwrap();
        assert_eq!(config.server.port, 5000);
        assert_eq!(config.inference.threshold, 0.5);
    }

    #[test]
    fn camel_case_sections_parse() {
        let config = parse_config(
            r#"{"server": {"maxUploadBytes": 1024}, "inference": {"negativeLabel": "no"}}"#,
        )
        .unwrap();
        assert_eq!(config.server.max_upload_bytes, 1024);
        assert_eq!(config.inference.negative_label, "no");
    }

    #[test]
    fn malformed_config_is_configuration_error() {
        assert_eq!(parse_config("{oops").unwrap_err().kind(), "configuration");
        assert_eq!(
            parse_config(r#"{"server": {"port": "high"}}"#).unwrap_err().kind(),
            "configuration"
        );
    }

    // ── discovery ─────────────────────────────────────────────────────

    #[test]
    fn explicit_path_wins() {
        let explicit = PathBuf::from("/custom/a.json");
        let found = discover_config_path(
            Some(&explicit),
            Some("/env/b.json".into()),
            None,
            None,
        );
        assert_eq!(found, Some(explicit));
    }

    #[test]
    fn env_var_beats_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("quotelens.json"), "{}").unwrap();
        let found = discover_config_path(
            None,
            Some("/env/b.json".into()),
            Some(dir.path().to_path_buf()),
            None,
        );
        assert_eq!(found, Some(PathBuf::from("/env/b.json")));
    }

    #[test]
    fn working_directory_then_home() {
        let cwd = tempfile::tempdir().unwrap();
        let home = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(home.path().join(".quotelens")).unwrap();
        std::fs::write(home.path().join(".quotelens/config.json"), "{}").unwrap();

        let found = discover_config_path(
            None,
            None,
            Some(cwd.path().to_path_buf()),
            Some(home.path().to_path_buf()),
        );
        assert_eq!(found, Some(home.path().join(".quotelens/config.json")));

        std::fs::write(cwd.path().join("quotelens.json"), "{}").unwrap();
        let found = discover_config_path(
            None,
            None,
            Some(cwd.path().to_path_buf()),
            Some(home.path().to_path_buf()),
        );
        assert_eq!(found, Some(cwd.path().join("quotelens.json")));
    }

    #[test]
    fn nothing_found() {
        let empty = tempfile::tempdir().unwrap();
        let found = discover_config_path(
            None,
            Some(String::new()),
            Some(empty.path().to_path_buf()),
            Some(empty.path().to_path_buf()),
        );
        assert_eq!(found, None);
    }

    #[test]
    fn explicit_file_resolves_artifacts_next_to_it() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("q.json");
        std::fs::write(&path, r#"{"artifacts": {"dir": "bundle"}, "server": {"port": 8080}}"#)
            .unwrap();
        let (config, source) = load_config(Some(&path)).unwrap();
        assert_eq!(source.as_deref(), Some(path.as_path()));
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.artifacts.dir, dir.path().join("bundle"));
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_config(Some(&dir.path().join("absent.json"))).unwrap_err();
        assert!(err.to_string().contains("failed to read config file"));
    }
}

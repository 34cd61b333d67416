use std::path::{Path, PathBuf};

use crate::error::AnnotatifyError;

use super::types::AppConfig;

/// Remove `//` line comments and `/* */` block comments outside of strings.
/// Newlines inside comments are kept so parse errors report the right line.
pub fn strip_jsonc_comments(input: &str) -> String {
    let mut result = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();
    let mut in_string = false;
    let mut escaped = false;

    while let Some(ch) = chars.next() {
        if in_string {
            result.push(ch);
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }

        let next = chars.peek().copied();
        match (ch, next) {
            ('"', _) => {
                in_string = true;
                result.push(ch);
            }
            ('/', Some('/')) => {
                for c in chars.by_ref() {
                    if c == '\n' {
                        result.push('\n');
                        break;
                    }
                }
            }
            ('/', Some('*')) => {
                chars.next();
                let mut prev = '\0';
                for c in chars.by_ref() {
                    if prev == '*' && c == '/' {
                        break;
                    }
                    if c == '\n' {
                        result.push('\n');
                    }
                    prev = c;
                }
            }
            _ => result.push(ch),
        }
    }

    result
}

/// Config file candidates in precedence order (highest first):
///
/// 1. `--config` CLI flag
/// 2. `ANNOTATIFY_CONFIG` env var
/// 3. `./config/annotatify.json` (project-level)
/// 4. `~/.annotatify/config.json`
pub fn discover_config_files(cli_config: Option<&str>) -> Vec<PathBuf> {
    let mut candidates: Vec<PathBuf> = Vec::new();
    if let Some(path) = cli_config {
        candidates.push(PathBuf::from(path));
    }
    if let Ok(env_path) = std::env::var("ANNOTATIFY_CONFIG") {
        candidates.push(PathBuf::from(env_path));
    }
    candidates.push(PathBuf::from("./config/annotatify.json"));
    if let Some(home) = dirs::home_dir() {
        candidates.push(home.join(".annotatify").join("config.json"));
    }

    let mut files = Vec::new();
    for p in candidates {
        if p.exists() && !files.contains(&p) {
            files.push(p);
        }
    }
    files
}

fn load_config_file(path: &Path) -> Result<AppConfig, AnnotatifyError> {
    let content = std::fs::read_to_string(path).map_err(|e| AnnotatifyError::ConfigError {
        path: path.to_path_buf(),
        detail: format!("Cannot read file: {e}"),
    })?;

    let stripped = strip_jsonc_comments(&content);
    serde_json::from_str::<AppConfig>(&stripped).map_err(|e| AnnotatifyError::ConfigError {
        path: path.to_path_buf(),
        detail: format!("Invalid JSON: {e}"),
    })
}

/// Apply `ANNOTATIFY_*` overrides on top of file values.
pub fn apply_env_overrides<F>(config: &mut AppConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if let Some(v) = non_empty("ANNOTATIFY_CLIENT_ID") {
        config.client_id = v;
    }
    if let Some(v) = non_empty("ANNOTATIFY_REDIRECT_URI") {
        config.redirect_uri = v;
    }
    if let Some(v) = non_empty("ANNOTATIFY_STORAGE") {
        config.storage_path = Some(PathBuf::from(v));
    }
    if let Some(secs) = non_empty("ANNOTATIFY_HTTP_TIMEOUT").and_then(|v| v.parse().ok()) {
        config.http_timeout_secs = secs;
    }
}

/// Load the highest-precedence config file (or defaults when none exists),
/// then apply environment overrides.
pub fn load_config(cli_config: Option<&str>) -> Result<AppConfig, AnnotatifyError> {
    if let Some(path) = cli_config {
        if !Path::new(path).exists() {
            return Err(AnnotatifyError::ConfigError {
                path: PathBuf::from(path),
                detail: "File does not exist".into(),
            });
        }
    }

    let mut config = match discover_config_files(cli_config).first() {
        Some(path) => {
            tracing::debug!("Loading config from {}", path.display());
            load_config_file(path)?
        }
        None => AppConfig::default(),
    };
    apply_env_overrides(&mut config, |key| std::env::var(key).ok());
    Ok(config)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[test]
    fn strip_line_and_block_comments() {
        let input = r#"{
  // client registered on the developer dashboard
  "clientId": "abc", /* inline */ "httpTimeoutSecs": 5
  /*
   * trailing block
   */
}"#;
        let result = strip_jsonc_comments(input);
        let parsed: serde_json::Value = serde_json::from_str(&result).unwrap();
        assert_eq!(parsed["clientId"], "abc");
        assert_eq!(parsed["httpTimeoutSecs"], 5);
    }

    #[test]
    fn preserve_strings_with_slashes() {
        let input = r#"{"redirectUri": "http://127.0.0.1:8888/callback", "x": "a\"//b"}"#;
        let result = strip_jsonc_comments(input);
        assert_eq!(result, input);
    }

    #[test]
    fn load_config_file_parses_jsonc() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(
            &path,
            r#"{
  // local dev app
  "clientId": "dev-client",
  "scopes": ["playlist-read-private"]
}"#,
        )
        .unwrap();

        let config = load_config_file(&path).unwrap();
        assert_eq!(config.client_id, "dev-client");
        assert_eq!(config.scopes, vec!["playlist-read-private"]);
    }

    #[test]
    fn load_config_file_error_on_invalid_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, "not valid json at all").unwrap();

        let err = load_config_file(&path).unwrap_err();
        assert!(err.to_string().contains("Invalid JSON"));
    }

    #[test]
    fn explicit_missing_config_is_an_error() {
        let err = load_config(Some("/nonexistent/annotatify.json")).unwrap_err();
        assert!(matches!(err, AnnotatifyError::ConfigError { .. }));
    }

    #[test]
    fn explicit_config_is_used() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"apiBaseUrl": "http://127.0.0.1:1"}"#).unwrap();
        let files = discover_config_files(path.to_str());
        assert_eq!(files.first(), Some(&path));
    }

    #[test]
    fn env_overrides_replace_file_values() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("ANNOTATIFY_CLIENT_ID", "from-env"),
            ("ANNOTATIFY_STORAGE", "/tmp/store.json"),
            ("ANNOTATIFY_REDIRECT_URI", "  "),
            ("ANNOTATIFY_HTTP_TIMEOUT", "7"),
        ]);
        let mut config = AppConfig::default();
        apply_env_overrides(&mut config, |k| env.get(k).map(|v| v.to_string()));

        assert_eq!(config.client_id, "from-env");
        assert_eq!(config.storage_path, Some(PathBuf::from("/tmp/store.json")));
        assert_eq!(config.redirect_uri, AppConfig::default().redirect_uri);
        assert_eq!(config.http_timeout_secs, 7);
    }
}

//! Configuration file parser for `--config <FILE>`.
//!
//! The config file is optional. Without `--config`, `Config::default()`
//! reproduces the metadata and request headers the feed has always been
//! published with. A `--config` path that cannot be read is an error. Unknown
//! keys are accepted but logged as warnings.
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid TOML in config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Config file too large: {0}")]
    TooLarge(String),
}

// ============================================================================
// Configuration Structs
// ============================================================================

/// Top-level configuration.
///
/// Every table uses `#[serde(default)]` so any subset of keys can be specified.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Fixed metadata stamped on every generated feed.
    pub feed: FeedMetadata,

    /// Outbound request settings.
    pub http: HttpConfig,

    /// Where the rows live in the source document and how bad rows are treated.
    pub extract: ExtractConfig,
}

/// Feed-level metadata that does not come from the scraped page.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FeedMetadata {
    pub title: String,
    pub description: String,
    pub author_name: String,
    pub author_email: String,
}

impl Default for FeedMetadata {
    fn default() -> Self {
        Self {
            title: "jmoiron.net blog".to_string(),
            description: "discussion about tech, footie, photos".to_string(),
            author_name: "Martin Treusch von Buttlar".to_string(),
            author_email: "fusion2feed@m.t17r.de".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Headers attached to every GET. Some publishers reject clients that do not
    /// look like a desktop browser. A `[http.headers]` table replaces this set.
    pub headers: BTreeMap<String, String>,

    /// Upper bound for a single input document in bytes (0 = unlimited).
    /// Applies to HTTP bodies and local files alike.
    pub max_body_bytes: u64,
}

impl HttpConfig {
    pub const DEFAULT_MAX_BODY_BYTES: u64 = 10 * 1024 * 1024; // 10MB
}

impl Default for HttpConfig {
    fn default() -> Self {
        let headers = [
            (
                "User-Agent",
                "Mozilla/5.0 (X11; Linux x86_64; rv:128.0) Gecko/20100101 Firefox/128.0",
            ),
            (
                "Accept",
                "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
            ),
            ("Accept-Language", "de,en-US;q=0.7,en;q=0.3"),
            ("Upgrade-Insecure-Requests", "1"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        Self {
            headers,
            max_body_bytes: Self::DEFAULT_MAX_BODY_BYTES,
        }
    }
}

/// What to do once a non-empty row carries a first cell that is not a date.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OnDateError {
    /// Abort the whole run.
    #[default]
    Fail,
    /// Publish the rows seen before the bad one and stop reading the table.
    Truncate,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ExtractConfig {
    /// CSS selector matching one element per table row, in document order.
    pub row_selector: String,

    /// CSS selector matching the cells inside a row.
    pub cell_selector: String,

    pub on_date_error: OnDateError,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            row_selector: "table.csvTable tr".to_string(),
            cell_selector: "td".to_string(),
            on_date_error: OnDateError::Fail,
        }
    }
}

impl Config {
    /// Maximum config file size (1 MB).
    const MAX_FILE_SIZE: u64 = 1_048_576;

    /// Loads the file named by `--config`.
    ///
    /// The path was asked for explicitly, so a missing or unreadable file is
    /// an [`ConfigError::Io`] rather than a silent fallback. An empty file
    /// still yields the defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let size = std::fs::metadata(path)?.len();
        if size > Self::MAX_FILE_SIZE {
            return Err(ConfigError::TooLarge(format!(
                "{} is {} bytes (max {} bytes)",
                path.display(),
                size,
                Self::MAX_FILE_SIZE
            )));
        }

        let content = std::fs::read_to_string(path)?;
        tracing::debug!(path = %path.display(), bytes = size, "Read config file");
        Self::from_toml(&content)
    }

    /// Parse configuration from TOML text. Blank input yields the defaults.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        if content.trim().is_empty() {
            tracing::debug!("Config is empty, using defaults");
            return Ok(Self::default());
        }

        // Walk the raw table first so typos surface in the log
        if let Ok(raw) = content.parse::<toml::Table>() {
            let known_keys = ["feed", "http", "extract"];
            for key in raw.keys() {
                if !known_keys.contains(&key.as_str()) {
                    tracing::warn!(key = %key, "Unknown key in config file, ignoring");
                }
            }
        }

        let config: Config = toml::from_str(content)?;
        tracing::info!(
            title = %config.feed.title,
            headers = config.http.headers.len(),
            rows = %config.extract.row_selector,
            "Loaded configuration"
        );
        Ok(config)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.feed.title, "jmoiron.net blog");
        assert_eq!(config.feed.description, "discussion about tech, footie, photos");
        assert_eq!(config.feed.author_name, "Martin Treusch von Buttlar");
        assert_eq!(config.feed.author_email, "fusion2feed@m.t17r.de");
        assert_eq!(config.extract.row_selector, "table.csvTable tr");
        assert_eq!(config.extract.cell_selector, "td");
        assert_eq!(config.extract.on_date_error, OnDateError::Fail);
        assert_eq!(config.http.max_body_bytes, HttpConfig::DEFAULT_MAX_BODY_BYTES);
    }

    #[test]
    fn test_default_headers_look_like_a_browser() {
        let config = Config::default();
        let ua = config.http.headers.get("User-Agent").unwrap();
        assert!(ua.starts_with("Mozilla/5.0"));
        assert!(config.http.headers.contains_key("Accept"));
        assert!(config.http.headers.contains_key("Accept-Language"));
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let path = std::env::temp_dir().join("fusion2feed_test_nonexistent_config.toml");
        match Config::load(&path) {
            Err(ConfigError::Io(e)) => assert_eq!(e.kind(), std::io::ErrorKind::NotFound),
            other => panic!("Expected NotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_file_returns_default() {
        let dir = std::env::temp_dir().join("fusion2feed_config_test_empty");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        std::fs::write(&path, "  \n\n ").unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.feed.title, "jmoiron.net blog");

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_partial_config_uses_defaults_for_missing() {
        let config = Config::from_toml("[feed]\ntitle = \"Fusionskontrolle\"\n").unwrap();
        assert_eq!(config.feed.title, "Fusionskontrolle");
        assert_eq!(config.feed.author_name, "Martin Treusch von Buttlar");
        assert_eq!(config.extract, ExtractConfig::default());
        assert_eq!(config.http, HttpConfig::default());
    }

    #[test]
    fn test_full_config() {
        let dir = std::env::temp_dir().join("fusion2feed_config_test_full");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");

        let content = r#"
[feed]
title = "Merger control"
description = "Pending proceedings"
author_name = "Feed Bot"
author_email = "bot@example.com"

[http]
max_body_bytes = 2048

[http.headers]
"User-Agent" = "fusion2feed/0.1"

[extract]
row_selector = "table#cases tr"
cell_selector = "td, th"
on_date_error = "truncate"
"#;
        std::fs::write(&path, content).unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.feed.title, "Merger control");
        assert_eq!(config.feed.description, "Pending proceedings");
        assert_eq!(config.feed.author_name, "Feed Bot");
        assert_eq!(config.feed.author_email, "bot@example.com");
        assert_eq!(config.http.max_body_bytes, 2048);
        // A headers table replaces the browser defaults entirely
        assert_eq!(config.http.headers.len(), 1);
        assert_eq!(
            config.http.headers.get("User-Agent").map(String::as_str),
            Some("fusion2feed/0.1")
        );
        assert_eq!(config.extract.row_selector, "table#cases tr");
        assert_eq!(config.extract.cell_selector, "td, th");
        assert_eq!(config.extract.on_date_error, OnDateError::Truncate);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_invalid_toml_returns_error() {
        let err = Config::from_toml("this is not [valid toml").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
        assert!(err.to_string().contains("Invalid TOML"));
    }

    #[test]
    fn test_unknown_on_date_error_value_rejected() {
        let result = Config::from_toml("[extract]\non_date_error = \"ignore\"\n");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_wrong_type_returns_error() {
        let result = Config::from_toml("[http]\nmax_body_bytes = \"lots\"\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_unknown_keys_accepted() {
        let config = Config::from_toml(
            r#"
totally_fake_key = "should not fail"

[feed]
title = "Still parsed"
"#,
        )
        .unwrap();
        assert_eq!(config.feed.title, "Still parsed");
    }

    #[test]
    fn test_too_large_file_rejected() {
        let dir = std::env::temp_dir().join("fusion2feed_config_test_too_large");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");

        let content = "a".repeat(1_048_577);
        std::fs::write(&path, content).unwrap();

        let err = Config::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::TooLarge(_)));
        assert!(err.to_string().contains("too large"));

        std::fs::remove_dir_all(&dir).ok();
    }
}

//! Runtime configuration
//!
//! Resolution order, first match wins:
//! 1. An explicit file path (the `--config` flag)
//! 2. The file named by `SITTER_HIGHLIGHTS_CONFIG`
//! 3. Built-in defaults

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::document::coords::PositionEncoding;
use crate::errors::{HighlightError, Result};

pub const CONFIG_ENV_VAR: &str = "SITTER_HIGHLIGHTS_CONFIG";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Extra lines above and below each visible range that still count as visible.
    pub visibility_slack: u32,
    /// Column unit of the ranges handed to the decoration sink.
    pub position_encoding: PositionEncoding,
    /// Language tags to enable. `None` enables every built-in grammar.
    pub languages: Option<Vec<String>>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            visibility_slack: 1,
            position_encoding: PositionEncoding::default(),
            languages: None,
        }
    }
}

impl Config {
    pub fn from_env_or_default(explicit: Option<&Path>) -> Result<Self> {
        Self::resolve(explicit, std::env::var_os(CONFIG_ENV_VAR))
    }

    fn resolve(explicit: Option<&Path>, env_path: Option<OsString>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }
        if let Some(path) = env_path.filter(|p| !p.is_empty()) {
            debug!("Using config from {}", CONFIG_ENV_VAR);
            return Self::from_file(&PathBuf::from(path));
        }
        Ok(Self::default())
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path).map_err(|source| HighlightError::ConfigIo {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&raw).map_err(|source| HighlightError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })?;
        info!("Loaded config from {:?}", path);
        Ok(config)
    }

    pub fn language_enabled(&self, tag: &str) -> bool {
        match &self.languages {
            Some(enabled) => enabled.iter().any(|l| l == tag),
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_defaults() {
        let config = Config::resolve(None, None).unwrap();
        assert_eq!(config.visibility_slack, 1);
        assert_eq!(config.position_encoding, PositionEncoding::Utf16);
        assert!(config.language_enabled("go"));
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let file = write_config(r#"{ "languages": ["go"] }"#);
        let config = Config::resolve(Some(file.path()), None).unwrap();
        assert_eq!(config.visibility_slack, 1);
        assert!(config.language_enabled("go"));
        assert!(!config.language_enabled("cpp"));
    }

    #[test]
    fn test_explicit_path_beats_env() {
        let explicit = write_config(r#"{ "visibility_slack": 3 }"#);
        let env = write_config(r#"{ "visibility_slack": 7 }"#);
        let config = Config::resolve(Some(explicit.path()), Some(env.path().into())).unwrap();
        assert_eq!(config.visibility_slack, 3);
    }

    #[test]
    fn test_env_path_used_without_explicit() {
        let env = write_config(r#"{ "position_encoding": "utf8" }"#);
        let config = Config::resolve(None, Some(env.path().into())).unwrap();
        assert_eq!(config.position_encoding, PositionEncoding::Utf8);
    }

    #[test]
    fn test_unknown_field_is_rejected() {
        let file = write_config(r#"{ "slack": 2 }"#);
        assert!(matches!(
            Config::from_file(file.path()),
            Err(HighlightError::ConfigParse { .. })
        ));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.json");
        assert!(matches!(Config::from_file(&missing), Err(HighlightError::ConfigIo { .. })));
    }
}

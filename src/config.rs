//! Config file and environment lookup.
//!
//! ```toml
//! [keys]
//! gemini = "..."
//!
//! [defaults]
//! model = "nano-banana-pro"
//! format = "png"
//!
//! [api]
//! base = "https://generativelanguage.googleapis.com/v1beta/models"
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::adapters::live::gemini::GEMINI_API_BASE;
use crate::error::EditError;

/// Environment variables consulted for the API key, in order.
pub const KEY_ENV_VARS: &[&str] = &["GEMINI_API_KEY", "API_KEY"];

/// Model used when neither the command line nor the config names one.
pub const DEFAULT_MODEL: &str = "nano-banana";

/// Parsed config file. Every table is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Credentials.
    pub keys: KeysConfig,
    /// Fallbacks for command-line options.
    pub defaults: DefaultsConfig,
    /// Endpoint settings.
    pub api: ApiConfig,
}

/// `[keys]`
#[derive(Debug, Default, Deserialize)]
pub struct KeysConfig {
    /// Gemini API key, used when no key variable is set.
    pub gemini: Option<String>,
}

/// `[defaults]`
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DefaultsConfig {
    /// Model name or alias.
    pub model: String,
    /// Output format to convert edited images to.
    pub format: Option<String>,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self { model: DEFAULT_MODEL.to_string(), format: None }
    }
}

/// `[api]`
#[derive(Debug, Default, Deserialize)]
pub struct ApiConfig {
    /// Base URL that model names are appended to.
    pub base: Option<String>,
}

impl Config {
    /// Read the config at `path`. A missing file yields the defaults.
    ///
    /// # Errors
    ///
    /// Returns `EditError::Config` if the file exists but cannot be read
    /// or is not valid TOML.
    pub fn load(path: &Path) -> Result<Self, EditError> {
        let contents = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no config file, using defaults");
                return Ok(Self::default());
            }
            Err(e) => {
                return Err(EditError::Config(format!("cannot read {}: {e}", path.display())));
            }
        };
        toml::from_str(&contents)
            .map_err(|e| EditError::Config(format!("cannot parse {}: {e}", path.display())))
    }

    /// The API key from the first non-empty key variable, else the file.
    #[must_use]
    pub fn gemini_key(&self) -> Option<String> {
        KEY_ENV_VARS
            .iter()
            .find_map(|var| std::env::var(var).ok().filter(|v| !v.trim().is_empty()))
            .or_else(|| self.keys.gemini.clone().filter(|k| !k.trim().is_empty()))
    }

    /// Endpoint base URL.
    #[must_use]
    pub fn api_base(&self) -> &str {
        self.api.base.as_deref().unwrap_or(GEMINI_API_BASE)
    }
}

/// Where to look for the config: `--config`, then `PHOTOSTUDIO_CONFIG`,
/// then `$HOME/.config/photostudio/config.toml`, then `./photostudio.toml`.
#[must_use]
pub fn discover_config_path(explicit: Option<&str>) -> PathBuf {
    explicit
        .map(PathBuf::from)
        .or_else(|| std::env::var_os("PHOTOSTUDIO_CONFIG").map(PathBuf::from))
        .or_else(|| {
            std::env::var_os("HOME")
                .map(|home| PathBuf::from(home).join(".config/photostudio/config.toml"))
        })
        .unwrap_or_else(|| PathBuf::from("photostudio.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(toml_src: &str) -> Config {
        toml::from_str(toml_src).unwrap()
    }

    #[test]
    fn empty_file_gives_defaults() {
        let config = parse("");
        assert!(config.keys.gemini.is_none());
        assert_eq!(config.defaults.model, DEFAULT_MODEL);
        assert!(config.defaults.format.is_none());
        assert_eq!(config.api_base(), GEMINI_API_BASE);
    }

    #[test]
    fn all_tables() {
        let config = parse(
            r#"
[keys]
gemini = "file-key"

[defaults]
model = "nano-banana-pro"
format = "webp"

[api]
base = "http://127.0.0.1:8080/v1beta/models"
"#,
        );
        assert_eq!(config.keys.gemini.as_deref(), Some("file-key"));
        assert_eq!(config.defaults.model, "nano-banana-pro");
        assert_eq!(config.defaults.format.as_deref(), Some("webp"));
        assert_eq!(config.api_base(), "http://127.0.0.1:8080/v1beta/models");
    }

    #[test]
    fn format_alone_keeps_default_model() {
        let config = parse("[defaults]\nformat = \"png\"\n");
        assert_eq!(config.defaults.model, DEFAULT_MODEL);
        assert_eq!(config.defaults.format.as_deref(), Some("png"));
    }

    #[test]
    fn missing_file_is_not_an_error() {
        let config = Config::load(Path::new("/nonexistent/photostudio/config.toml")).unwrap();
        assert_eq!(config.defaults.model, DEFAULT_MODEL);
    }

    #[test]
    fn broken_file_is_config_error() {
        let dir = std::env::temp_dir().join("photostudio_config_broken");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        std::fs::write(&path, "[defaults\nmodel = ").unwrap();

        let err = Config::load(&path).unwrap_err();
        assert!(matches!(err, EditError::Config(ref m) if m.contains("cannot parse")), "got {err:?}");

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn blank_file_key_is_ignored() {
        let config = Config { keys: KeysConfig { gemini: Some("  ".into()) }, ..Config::default() };
        if !KEY_ENV_VARS.iter().any(|v| std::env::var(v).is_ok_and(|s| !s.trim().is_empty())) {
            assert!(config.gemini_key().is_none());
        }
    }

    #[test]
    fn explicit_path_wins() {
        assert_eq!(discover_config_path(Some("my.toml")), PathBuf::from("my.toml"));
    }
}

//! Application configuration: defaults, optional TOML file, environment
//! overrides, and startup validation. Credentials are held as
//! `SecretString` so they never end up in debug output or logs.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use thiserror::Error;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub llm: LlmConfig,
    pub tiktok: TikTokConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug)]
pub struct LlmConfig {
    pub api_key: Option<SecretString>,
    pub model: String,
    pub timeout_secs: u64,
}

#[derive(Clone, Debug)]
pub struct TikTokConfig {
    pub app_id: String,
    pub app_secret: SecretString,
    pub access_token: SecretString,
    pub advertiser_id: String,
    pub mock_mode: bool,
}

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub mock_mode: Option<bool>,
    pub log_level: Option<String>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            llm: LlmConfig {
                api_key: None,
                model: "gemini-flash-latest".to_string(),
                timeout_secs: 30,
            },
            tiktok: TikTokConfig {
                app_id: String::new(),
                app_secret: String::new().into(),
                access_token: String::new().into(),
                advertiser_id: String::new(),
                mock_mode: true,
            },
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigPatch {
    llm: Option<LlmPatch>,
    tiktok: Option<TikTokPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct LlmPatch {
    api_key: Option<String>,
    model: Option<String>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct TikTokPatch {
    app_id: Option<String>,
    app_secret: Option<String>,
    access_token: Option<String>,
    advertiser_id: Option<String>,
    mock_mode: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<String>,
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        let maybe_path = resolve_config_path(options.config_path.as_deref());
        match maybe_path {
            Some(path) if path.exists() => {
                let patch = read_patch(&path)?;
                config.apply_patch(patch)?;
            }
            Some(path) if options.require_file => {
                return Err(ConfigError::MissingConfigFile(path));
            }
            _ => {}
        }

        config.apply_env_overrides()?;

        if let Some(mock_mode) = options.overrides.mock_mode {
            config.tiktok.mock_mode = mock_mode;
        }
        if let Some(level) = options.overrides.log_level {
            config.logging.level = level;
        }

        Ok(config)
    }

    /// Startup validation. Run before any conversation state exists; a
    /// failure here is fatal, never a conversation turn.
    pub fn validate_for_chat(&self) -> Result<(), ConfigError> {
        if self.llm.api_key.as_ref().map_or(true, |k| k.expose_secret().is_empty()) {
            return Err(ConfigError::Validation(
                "llm.api_key is required (set ADPILOT_GOOGLE_API_KEY or the config file)"
                    .to_string(),
            ));
        }
        if !self.tiktok.mock_mode {
            if self.tiktok.access_token.expose_secret().is_empty() {
                return Err(ConfigError::Validation(
                    "tiktok.access_token is required when mock_mode is off".to_string(),
                ));
            }
            if self.tiktok.advertiser_id.is_empty() {
                return Err(ConfigError::Validation(
                    "tiktok.advertiser_id is required when mock_mode is off".to_string(),
                ));
            }
        }
        Ok(())
    }

    fn apply_patch(&mut self, patch: ConfigPatch) -> Result<(), ConfigError> {
        if let Some(llm) = patch.llm {
            if let Some(api_key) = llm.api_key {
                self.llm.api_key = Some(api_key.into());
            }
            if let Some(model) = llm.model {
                self.llm.model = model;
            }
            if let Some(timeout_secs) = llm.timeout_secs {
                self.llm.timeout_secs = timeout_secs;
            }
        }
        if let Some(tiktok) = patch.tiktok {
            if let Some(app_id) = tiktok.app_id {
                self.tiktok.app_id = app_id;
            }
            if let Some(app_secret) = tiktok.app_secret {
                self.tiktok.app_secret = app_secret.into();
            }
            if let Some(access_token) = tiktok.access_token {
                self.tiktok.access_token = access_token.into();
            }
            if let Some(advertiser_id) = tiktok.advertiser_id {
                self.tiktok.advertiser_id = advertiser_id;
            }
            if let Some(mock_mode) = tiktok.mock_mode {
                self.tiktok.mock_mode = mock_mode;
            }
        }
        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format.parse()?;
            }
        }
        Ok(())
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(value) = non_empty_env("ADPILOT_GOOGLE_API_KEY") {
            self.llm.api_key = Some(value.into());
        }
        if let Some(value) = non_empty_env("ADPILOT_GEMINI_MODEL") {
            self.llm.model = value;
        }
        if let Some(value) = non_empty_env("ADPILOT_TIKTOK_APP_ID") {
            self.tiktok.app_id = value;
        }
        if let Some(value) = non_empty_env("ADPILOT_TIKTOK_APP_SECRET") {
            self.tiktok.app_secret = value.into();
        }
        if let Some(value) = non_empty_env("ADPILOT_TIKTOK_ACCESS_TOKEN") {
            self.tiktok.access_token = value.into();
        }
        if let Some(value) = non_empty_env("ADPILOT_TIKTOK_ADVERTISER_ID") {
            self.tiktok.advertiser_id = value;
        }
        if let Some(value) = non_empty_env("ADPILOT_TIKTOK_MOCK_MODE") {
            self.tiktok.mock_mode = parse_bool("ADPILOT_TIKTOK_MOCK_MODE", &value)?;
        }
        if let Some(value) = non_empty_env("ADPILOT_LOG_LEVEL") {
            self.logging.level = value;
        }
        if let Some(value) = non_empty_env("ADPILOT_LOG_FORMAT") {
            self.logging.format = value.parse()?;
        }
        Ok(())
    }
}

fn resolve_config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }
    if let Some(value) = non_empty_env("ADPILOT_CONFIG") {
        return Some(PathBuf::from(value));
    }
    Some(PathBuf::from("adpilot.toml"))
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;
    toml::from_str(&raw)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn non_empty_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidEnvOverride {
            key: key.to_string(),
            value: value.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use secrecy::ExposeSecret;

    use super::{AppConfig, ConfigError, ConfigOverrides, LoadOptions, LogFormat};

    fn load_from_toml(contents: &str) -> AppConfig {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        file.write_all(contents.as_bytes()).expect("write config");
        AppConfig::load(LoadOptions {
            config_path: Some(file.path().to_path_buf()),
            require_file: true,
            overrides: ConfigOverrides::default(),
        })
        .expect("config should load")
    }

    #[test]
    fn defaults_are_mock_mode() {
        let config = AppConfig::default();
        assert!(config.tiktok.mock_mode);
        assert_eq!(config.llm.model, "gemini-flash-latest");
        assert_eq!(config.logging.format, LogFormat::Compact);
    }

    #[test]
    fn toml_patch_overrides_defaults() {
        let config = load_from_toml(
            r#"
            [llm]
            api_key = "key-123"
            model = "gemini-pro"

            [tiktok]
            access_token = "tok-1"
            advertiser_id = "adv-1"
            mock_mode = false

            [logging]
            level = "debug"
            format = "json"
            "#,
        );

        assert_eq!(config.llm.model, "gemini-pro");
        assert_eq!(config.tiktok.access_token.expose_secret(), "tok-1");
        assert!(!config.tiktok.mock_mode);
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.format, LogFormat::Json);
    }

    #[test]
    fn cli_override_beats_file() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        file.write_all(b"[tiktok]\nmock_mode = false\n").expect("write config");
        let config = AppConfig::load(LoadOptions {
            config_path: Some(file.path().to_path_buf()),
            require_file: true,
            overrides: ConfigOverrides { mock_mode: Some(true), log_level: None },
        })
        .expect("config should load");
        assert!(config.tiktok.mock_mode);
    }

    #[test]
    fn missing_required_file_is_an_error() {
        let result = AppConfig::load(LoadOptions {
            config_path: Some("/nonexistent/adpilot.toml".into()),
            require_file: true,
            overrides: ConfigOverrides::default(),
        });
        assert!(matches!(result, Err(ConfigError::MissingConfigFile(_))));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        file.write_all(b"[tiktok]\nadvertiser = \"typo\"\n").expect("write config");
        let result = AppConfig::load(LoadOptions {
            config_path: Some(file.path().to_path_buf()),
            require_file: true,
            overrides: ConfigOverrides::default(),
        });
        assert!(matches!(result, Err(ConfigError::ParseFile { .. })));
    }

    #[test]
    fn chat_validation_requires_llm_key() {
        let config = AppConfig::default();
        let error = config.validate_for_chat().expect_err("missing key must fail");
        assert!(matches!(error, ConfigError::Validation(_)));
    }

    #[test]
    fn chat_validation_requires_real_credentials_when_mock_off() {
        let mut config = AppConfig::default();
        config.llm.api_key = Some("key".to_string().into());
        config.tiktok.mock_mode = false;
        assert!(config.validate_for_chat().is_err());

        config.tiktok.access_token = "tok".to_string().into();
        config.tiktok.advertiser_id = "adv".to_string();
        assert!(config.validate_for_chat().is_ok());
    }

    #[test]
    fn mock_mode_needs_no_tiktok_credentials() {
        let mut config = AppConfig::default();
        config.llm.api_key = Some("key".to_string().into());
        assert!(config.validate_for_chat().is_ok());
    }
}

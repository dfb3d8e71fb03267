//! Effective-configuration report with per-key source attribution.
//!
//! Secrets are redacted before printing; only presence is reported.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use secrecy::ExposeSecret;
use toml::Value;

use adpilot_core::config::AppConfig;

pub fn render(config: &AppConfig, explicit_path: Option<&Path>) -> String {
    let config_file_path = detect_config_path(explicit_path);
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());

    let mut lines = vec!["effective config (source precedence: env > file > default):".to_string()];

    let mut push = |key: &str, value: &str, env_key: &str| {
        lines.push(render_line(
            key,
            value,
            field_source(key, env_key, config_file_doc.as_ref(), config_file_path.as_deref()),
        ));
    };

    push("llm.api_key", &redact_presence(config.llm.api_key.is_some()), "ADPILOT_GOOGLE_API_KEY");
    push("llm.model", &config.llm.model, "ADPILOT_GEMINI_MODEL");
    push("llm.timeout_secs", &config.llm.timeout_secs.to_string(), "");

    push("tiktok.app_id", or_unset(&config.tiktok.app_id), "ADPILOT_TIKTOK_APP_ID");
    push(
        "tiktok.app_secret",
        &redact_presence(!config.tiktok.app_secret.expose_secret().is_empty()),
        "ADPILOT_TIKTOK_APP_SECRET",
    );
    push(
        "tiktok.access_token",
        &redact_presence(!config.tiktok.access_token.expose_secret().is_empty()),
        "ADPILOT_TIKTOK_ACCESS_TOKEN",
    );
    push(
        "tiktok.advertiser_id",
        or_unset(&config.tiktok.advertiser_id),
        "ADPILOT_TIKTOK_ADVERTISER_ID",
    );
    push("tiktok.mock_mode", &config.tiktok.mock_mode.to_string(), "ADPILOT_TIKTOK_MOCK_MODE");

    push("logging.level", &config.logging.level, "ADPILOT_LOG_LEVEL");
    push("logging.format", &format!("{:?}", config.logging.format), "ADPILOT_LOG_FORMAT");

    lines.join("\n")
}

fn detect_config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }
    if let Some(value) = env::var_os("ADPILOT_CONFIG") {
        return Some(PathBuf::from(value));
    }
    let default = PathBuf::from("adpilot.toml");
    default.exists().then_some(default)
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let raw = fs::read_to_string(path?).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(
    key_path: &str,
    env_key: &str,
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    if !env_key.is_empty() && env::var_os(env_key).is_some() {
        return format!("env ({env_key})");
    }

    if let Some(doc) = config_file_doc {
        if contains_path(doc, key_path) {
            let file_path = config_file_path
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "config file".to_string());
            return format!("file ({file_path})");
        }
    }

    "default".to_string()
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}

fn render_line(key: &str, value: &str, source: String) -> String {
    format!("- {key} = {value} (source: {source})")
}

fn redact_presence(present: bool) -> String {
    if present { "<redacted>".to_string() } else { "<unset>".to_string() }
}

fn or_unset(value: &str) -> &str {
    if value.trim().is_empty() { "<unset>" } else { value }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use adpilot_core::config::{AppConfig, ConfigOverrides, LoadOptions};

    use super::{contains_path, render};

    #[test]
    fn defaults_report_without_leaking_secrets() {
        let report = render(&AppConfig::default(), None);
        assert!(report.contains("- llm.api_key = <unset>"));
        assert!(report.contains("- tiktok.mock_mode = true"));
        assert!(report.contains("- logging.format = Compact"));
    }

    #[test]
    fn file_backed_values_attribute_their_source() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        file.write_all(b"[tiktok]\naccess_token = \"tok-secret\"\nmock_mode = false\n")
            .expect("write config");

        let config = AppConfig::load(LoadOptions {
            config_path: Some(file.path().to_path_buf()),
            require_file: true,
            overrides: ConfigOverrides::default(),
        })
        .expect("config loads");

        let report = render(&config, Some(file.path()));
        assert!(!report.contains("tok-secret"), "secret leaked: {report}");
        assert!(report.contains("- tiktok.access_token = <redacted> (source: file"));
        assert!(report.contains("- tiktok.mock_mode = false (source: file"));
        assert!(report.contains("- llm.model = gemini-flash-latest (source: default)"));
    }

    #[test]
    fn nested_key_lookup_walks_tables() {
        let doc: toml::Value = "[tiktok]\nmock_mode = true\n".parse().expect("toml");
        assert!(contains_path(&doc, "tiktok.mock_mode"));
        assert!(!contains_path(&doc, "tiktok.access_token"));
        assert!(!contains_path(&doc, "logging.level"));
    }
}

//! Application configuration for Transcoder.
//!
//! User config lives at `~/.transcoder/transcoder.toml` and only names the
//! environment variables that hold the Azure OpenAI settings; secrets are
//! never written to disk. CLI flags override config file values, which
//! override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{Result, TranscoderError};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "transcoder.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".transcoder";

/// Default character budget for one classification chunk.
pub const DEFAULT_MAX_CHUNK_CHARS: usize = 3500;

// ---------------------------------------------------------------------------
// Config structs (matching transcoder.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Global defaults.
    #[serde(default)]
    pub defaults: DefaultsConfig,

    /// Azure OpenAI settings.
    #[serde(default)]
    pub azure: AzureConfig,
}

/// `[defaults]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Maximum characters per classification chunk.
    #[serde(default = "default_max_chunk_chars")]
    pub max_chunk_chars: usize,

    /// Suffix added to the input file stem when no output path is given.
    #[serde(default = "default_output_suffix")]
    pub output_suffix: String,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            max_chunk_chars: default_max_chunk_chars(),
            output_suffix: default_output_suffix(),
        }
    }
}

fn default_max_chunk_chars() -> usize {
    DEFAULT_MAX_CHUNK_CHARS
}
fn default_output_suffix() -> String {
    "_coded".into()
}

/// `[azure]` section. Every field except `default_api_version` is the
/// *name* of an environment variable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AzureConfig {
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    #[serde(default = "default_endpoint_env")]
    pub endpoint_env: String,

    #[serde(default = "default_deployment_env")]
    pub deployment_env: String,

    /// Optional; `default_api_version` applies when unset.
    #[serde(default = "default_api_version_env")]
    pub api_version_env: String,

    #[serde(default = "default_api_version")]
    pub default_api_version: String,
}

impl Default for AzureConfig {
    fn default() -> Self {
        Self {
            api_key_env: default_api_key_env(),
            endpoint_env: default_endpoint_env(),
            deployment_env: default_deployment_env(),
            api_version_env: default_api_version_env(),
            default_api_version: default_api_version(),
        }
    }
}

fn default_api_key_env() -> String {
    "AZURE_OPENAI_API_KEY".into()
}
fn default_endpoint_env() -> String {
    "AZURE_OPENAI_ENDPOINT".into()
}
fn default_deployment_env() -> String {
    "AZURE_OPENAI_DEPLOYMENT".into()
}
fn default_api_version_env() -> String {
    "AZURE_OPENAI_API_VERSION".into()
}
fn default_api_version() -> String {
    "2024-02-15-preview".into()
}

// ---------------------------------------------------------------------------
// Service config (runtime, resolved from the environment)
// ---------------------------------------------------------------------------

/// Resolved Azure OpenAI connection settings.
///
/// Built once at startup and handed to the classification client; the
/// pipeline never reads the environment itself.
#[derive(Clone)]
pub struct ServiceConfig {
    /// Resource endpoint, `https://` with no trailing slash.
    pub endpoint: String,
    pub api_key: String,
    /// Deployment (model) name.
    pub deployment: String,
    pub api_version: String,
}

impl std::fmt::Debug for ServiceConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceConfig")
            .field("endpoint", &self.endpoint)
            .field("api_key", &"<redacted>")
            .field("deployment", &self.deployment)
            .field("api_version", &self.api_version)
            .finish()
    }
}

/// Resolve the service settings from the process environment.
pub fn resolve_service_config(config: &AppConfig) -> Result<ServiceConfig> {
    resolve_service_config_with(config, |name| std::env::var(name).ok())
}

/// Resolve the service settings through an arbitrary variable lookup.
///
/// Every missing required variable is reported in a single error.
pub fn resolve_service_config_with<F>(config: &AppConfig, lookup: F) -> Result<ServiceConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let azure = &config.azure;
    let read = |name: &str| {
        lookup(name)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };

    let api_key = read(&azure.api_key_env);
    let endpoint = read(&azure.endpoint_env);
    let deployment = read(&azure.deployment_env);

    let missing: Vec<&str> = [
        (azure.api_key_env.as_str(), api_key.is_none()),
        (azure.endpoint_env.as_str(), endpoint.is_none()),
        (azure.deployment_env.as_str(), deployment.is_none()),
    ]
    .into_iter()
    .filter_map(|(name, absent)| absent.then_some(name))
    .collect();

    let (Some(api_key), Some(endpoint), Some(deployment)) = (api_key, endpoint, deployment) else {
        return Err(TranscoderError::config(format!(
            "missing Azure OpenAI environment variables: {}",
            missing.join(", ")
        )));
    };

    let endpoint = validate_endpoint(&azure.endpoint_env, &endpoint)?;
    let api_version = read(&azure.api_version_env).unwrap_or_else(|| azure.default_api_version.clone());

    tracing::debug!(%endpoint, %deployment, %api_version, "resolved service config");

    Ok(ServiceConfig {
        endpoint,
        api_key,
        deployment,
        api_version,
    })
}

/// The endpoint must be a full `https` URL; a trailing slash is dropped.
fn validate_endpoint(var_name: &str, raw: &str) -> Result<String> {
    let trimmed = raw.trim_end_matches('/');
    let invalid = || {
        TranscoderError::config(format!(
            "{var_name} must include the full https URL, e.g. \
             https://my-resource.openai.azure.com"
        ))
    };

    let url = Url::parse(trimmed).map_err(|_| invalid())?;
    if url.scheme() != "https" || url.host_str().is_none() {
        return Err(invalid());
    }

    Ok(trimmed.to_string())
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.transcoder/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| TranscoderError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.transcoder/transcoder.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| TranscoderError::io(path, e))?;

    toml::from_str(&content).map_err(|e| {
        TranscoderError::config(format!("failed to parse {}: {e}", path.display()))
    })
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| TranscoderError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| TranscoderError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| TranscoderError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn full_env() -> HashMap<String, String> {
        env(&[
            ("AZURE_OPENAI_API_KEY", "secret"),
            ("AZURE_OPENAI_ENDPOINT", "https://my-resource.openai.azure.com/"),
            ("AZURE_OPENAI_DEPLOYMENT", "gpt-4o"),
        ])
    }

    #[test]
    fn default_config_serializes() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize default config");
        assert!(toml_str.contains("max_chunk_chars"));
        assert!(toml_str.contains("AZURE_OPENAI_API_KEY"));
    }

    #[test]
    fn config_roundtrip() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize");
        let parsed: AppConfig = toml::from_str(&toml_str).expect("deserialize");
        assert_eq!(parsed.defaults.max_chunk_chars, 3500);
        assert_eq!(parsed.azure.default_api_version, "2024-02-15-preview");
    }

    #[test]
    fn partial_config_fills_defaults() {
        let toml_str = r#"
[defaults]
max_chunk_chars = 1200

[azure]
api_key_env = "MY_KEY"
"#;
        let config: AppConfig = toml::from_str(toml_str).expect("parse");
        assert_eq!(config.defaults.max_chunk_chars, 1200);
        assert_eq!(config.defaults.output_suffix, "_coded");
        assert_eq!(config.azure.api_key_env, "MY_KEY");
        assert_eq!(config.azure.endpoint_env, "AZURE_OPENAI_ENDPOINT");
    }

    #[test]
    fn resolves_complete_environment() {
        let vars = full_env();
        let service = resolve_service_config_with(&AppConfig::default(), |k| vars.get(k).cloned())
            .expect("resolve");
        assert_eq!(service.endpoint, "https://my-resource.openai.azure.com");
        assert_eq!(service.deployment, "gpt-4o");
        assert_eq!(service.api_version, "2024-02-15-preview");
    }

    #[test]
    fn explicit_api_version_wins() {
        let mut vars = full_env();
        vars.insert("AZURE_OPENAI_API_VERSION".into(), "2024-06-01".into());
        let service = resolve_service_config_with(&AppConfig::default(), |k| vars.get(k).cloned())
            .expect("resolve");
        assert_eq!(service.api_version, "2024-06-01");
    }

    #[test]
    fn lists_every_missing_variable() {
        let vars = env(&[("AZURE_OPENAI_ENDPOINT", "https://x.openai.azure.com")]);
        let err = resolve_service_config_with(&AppConfig::default(), |k| vars.get(k).cloned())
            .unwrap_err();
        let msg = err.to_string();
        assert!(matches!(err, TranscoderError::Config { .. }));
        assert!(msg.contains("AZURE_OPENAI_API_KEY"));
        assert!(msg.contains("AZURE_OPENAI_DEPLOYMENT"));
        assert!(!msg.contains("AZURE_OPENAI_ENDPOINT"));
    }

    #[test]
    fn blank_values_count_as_missing() {
        let mut vars = full_env();
        vars.insert("AZURE_OPENAI_API_KEY".into(), "   ".into());
        let err = resolve_service_config_with(&AppConfig::default(), |k| vars.get(k).cloned())
            .unwrap_err();
        assert!(err.to_string().contains("AZURE_OPENAI_API_KEY"));
    }

    #[test]
    fn rejects_non_https_endpoint() {
        let mut vars = full_env();
        vars.insert("AZURE_OPENAI_ENDPOINT".into(), "my-resource.openai.azure.com".into());
        let err = resolve_service_config_with(&AppConfig::default(), |k| vars.get(k).cloned())
            .unwrap_err();
        assert!(err.to_string().contains("full https URL"));

        vars.insert("AZURE_OPENAI_ENDPOINT".into(), "http://my-resource.openai.azure.com".into());
        assert!(
            resolve_service_config_with(&AppConfig::default(), |k| vars.get(k).cloned()).is_err()
        );
    }

    #[test]
    fn debug_output_redacts_api_key() {
        let vars = full_env();
        let service = resolve_service_config_with(&AppConfig::default(), |k| vars.get(k).cloned())
            .expect("resolve");
        let debug = format!("{service:?}");
        assert!(!debug.contains("secret"));
        assert!(debug.contains("redacted"));
    }

    #[test]
    fn load_config_from_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "[defaults]\noutput_suffix = \"_tagged\"\n").expect("write");

        let config = load_config_from(&path).expect("load");
        assert_eq!(config.defaults.output_suffix, "_tagged");
        assert_eq!(config.defaults.max_chunk_chars, DEFAULT_MAX_CHUNK_CHARS);
    }

    #[test]
    fn invalid_toml_is_config_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "[defaults\nmax_chunk_chars = ").expect("write");

        let err = load_config_from(&path).unwrap_err();
        assert!(matches!(err, TranscoderError::Config { .. }));
    }
}

//! CLI configuration and saved credentials.

use anyhow::{Context, Result};
use focusforge_core::AuthUser;
use focusforge_session::SessionConfig;
use focusforge_storage::{Backend, JsonBackend, MemoryBackend, RestBackend, RestConfig};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

/// Default config location, relative to the working directory.
pub const DEFAULT_CONFIG_PATH: &str = ".focusforge/config.json";

const ENV_URL: &str = "FOCUSFORGE_URL";
const ENV_API_KEY: &str = "FOCUSFORGE_API_KEY";

/// Which backend holds the records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BackendConfig {
    /// Discarded when the process exits
    Memory,
    /// JSON files under a directory
    Json { path: PathBuf },
    /// Hosted backend
    Rest { url: String, api_key: String },
}

impl Default for BackendConfig {
    fn default() -> Self {
        BackendConfig::Json {
            path: PathBuf::from(".focusforge/data"),
        }
    }
}

/// Contents of `config.json`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForgeConfig {
    pub backend: BackendConfig,
    pub session: SessionConfig,
}

impl ForgeConfig {
    /// Load from `path`; a missing file yields defaults. Environment
    /// overrides are applied on top.
    pub fn load(path: &Path) -> Result<Self> {
        let mut config = match std::fs::read_to_string(path) {
            Ok(json) => serde_json::from_str(&json)
                .with_context(|| format!("invalid config file {}", path.display()))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no config file, using defaults");
                ForgeConfig::default()
            }
            Err(e) => {
                return Err(e).with_context(|| format!("failed to read {}", path.display()))
            }
        };

        config.apply_overrides(std::env::var(ENV_URL).ok(), std::env::var(ENV_API_KEY).ok());
        Ok(config)
    }

    /// A URL switches to the hosted backend; a key replaces the hosted
    /// backend's key.
    pub fn apply_overrides(&mut self, url: Option<String>, api_key: Option<String>) {
        let url = url.filter(|u| !u.trim().is_empty());
        let api_key = api_key.filter(|k| !k.trim().is_empty());

        if let Some(url) = url {
            match &mut self.backend {
                BackendConfig::Rest { url: current, .. } => *current = url,
                other => {
                    *other = BackendConfig::Rest {
                        url,
                        api_key: String::new(),
                    }
                }
            }
        }
        if let Some(key) = api_key {
            if let BackendConfig::Rest { api_key: current, .. } = &mut self.backend {
                *current = key;
            }
        }
    }

    pub fn is_hosted(&self) -> bool {
        matches!(self.backend, BackendConfig::Rest { .. })
    }
}

/// Opened backend; the hosted client is kept separately for auth calls.
pub struct Backends {
    pub data: Arc<dyn Backend>,
    pub rest: Option<Arc<RestBackend>>,
}

/// Open the configured backend.
pub async fn open_backend(config: &ForgeConfig) -> Result<Backends> {
    match &config.backend {
        BackendConfig::Memory => Ok(Backends {
            data: Arc::new(MemoryBackend::new()),
            rest: None,
        }),
        BackendConfig::Json { path } => {
            let backend = JsonBackend::new(path)
                .await
                .with_context(|| format!("failed to open data directory {}", path.display()))?;
            Ok(Backends {
                data: Arc::new(backend),
                rest: None,
            })
        }
        BackendConfig::Rest { url, api_key } => {
            if api_key.is_empty() {
                anyhow::bail!("hosted backend needs an API key (set {})", ENV_API_KEY);
            }
            let rest = Arc::new(RestBackend::new(RestConfig::new(url.clone(), api_key.clone()))?);
            Ok(Backends {
                data: rest.clone(),
                rest: Some(rest),
            })
        }
    }
}

/// Stores the signed-in user next to the config file.
pub struct CredentialStore {
    path: PathBuf,
}

impl CredentialStore {
    /// Store for the config at `config_path`.
    pub fn beside(config_path: &Path) -> Self {
        let dir = config_path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        Self {
            path: dir.join("credentials.json"),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Result<Option<AuthUser>> {
        match std::fs::read_to_string(&self.path) {
            Ok(json) => Ok(Some(
                serde_json::from_str(&json).context("invalid credentials file")?,
            )),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).context("failed to read credentials"),
        }
    }

    pub fn save(&self, user: &AuthUser) -> Result<()> {
        if let Some(dir) = self.path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        std::fs::write(&self.path, serde_json::to_string_pretty(user)?)?;
        info!(path = %self.path.display(), "credentials saved");
        Ok(())
    }

    /// Remove saved credentials. Returns whether there were any.
    pub fn clear(&self) -> Result<bool> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e).context("failed to remove credentials"),
        }
    }
}

/// The signed-in user: saved credentials for the hosted backend, the fixed
/// local user otherwise.
pub fn current_user(config: &ForgeConfig, store: &CredentialStore) -> Result<Option<AuthUser>> {
    if config.is_hosted() {
        store.load()
    } else {
        Ok(Some(AuthUser::local()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let mut config: ForgeConfig = serde_json::from_str("{}").unwrap();
        config.apply_overrides(None, None);
        assert_eq!(config, ForgeConfig::default());

        let path = dir.path().join("nope.json");
        let loaded = ForgeConfig::load(&path).unwrap();
        assert_eq!(loaded.session.max_duration_minutes, 60);
    }

    #[test]
    fn test_parse_config_file() {
        let json = r#"{
            "backend": { "kind": "rest", "url": "https://forge.example", "api_key": "anon" },
            "session": { "tick_millis": 250 }
        }"#;
        let config: ForgeConfig = serde_json::from_str(json).unwrap();

        assert!(config.is_hosted());
        assert_eq!(config.session.tick_millis, 250);
        assert_eq!(config.session.default_duration_minutes, 25);
    }

    #[test]
    fn test_env_overrides() {
        let mut config = ForgeConfig::default();
        config.apply_overrides(Some("https://forge.example".to_string()), Some("key-1".to_string()));
        assert_eq!(
            config.backend,
            BackendConfig::Rest {
                url: "https://forge.example".to_string(),
                api_key: "key-1".to_string(),
            }
        );

        // A key alone does not switch a local backend
        let mut config = ForgeConfig::default();
        config.apply_overrides(None, Some("key-2".to_string()));
        assert!(!config.is_hosted());
    }

    #[test]
    fn test_credentials_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = CredentialStore::beside(&dir.path().join("config.json"));
        assert!(store.load().unwrap().is_none());

        let user = AuthUser::new("u-1").with_email("ada@example.com").with_access_token("tok");
        store.save(&user).unwrap();

        let loaded = store.load().unwrap().unwrap();
        assert_eq!(loaded.id, user.id);
        assert_eq!(loaded.access_token.as_deref(), Some("tok"));

        assert!(store.clear().unwrap());
        assert!(!store.clear().unwrap());
    }

    #[test]
    fn test_local_backend_has_local_user() {
        let dir = tempfile::tempdir().unwrap();
        let store = CredentialStore::beside(&dir.path().join("config.json"));
        let user = current_user(&ForgeConfig::default(), &store).unwrap();
        assert_eq!(user, Some(AuthUser::local()));
    }
}

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwap;
use figment::{
    Figment,
    providers::{Env, Format, Json, Serialized},
};
use fintech_storage::FileStore;
use serde::{Deserialize, Serialize};
use snafu::{ResultExt, Snafu};

pub const SETTINGS_DIRECTORY_NAME: &str = "fintech-ai";
pub const SETTINGS_FILE_NAME: &str = "settings.json";
pub const ENV_PREFIX: &str = "FINTECH_";

pub const DEFAULT_API_BASE_URL: &str = fintech_api::DEFAULT_BASE_URL;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_NARROW_VIEWPORT_WIDTH: u32 = 768;
pub const DEFAULT_NOTIFICATION_POLL_SECS: u64 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    File,
    Sqlite,
    Memory,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppSettings {
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default)]
    pub stream_replies: bool,
    #[serde(default)]
    pub storage_backend: StorageBackend,
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
    #[serde(default = "default_narrow_viewport_width")]
    pub narrow_viewport_width: u32,
    #[serde(default = "default_notification_poll_secs")]
    pub notification_poll_secs: u64,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            stream_replies: false,
            storage_backend: StorageBackend::default(),
            data_dir: None,
            narrow_viewport_width: DEFAULT_NARROW_VIEWPORT_WIDTH,
            notification_poll_secs: DEFAULT_NOTIFICATION_POLL_SECS,
        }
    }
}

impl AppSettings {
    pub fn normalized(mut self) -> Self {
        let base_url = self.api_base_url.trim().trim_end_matches('/');
        self.api_base_url = if base_url.is_empty() {
            default_api_base_url()
        } else {
            base_url.to_string()
        };
        if self.request_timeout_secs == 0 {
            self.request_timeout_secs = DEFAULT_REQUEST_TIMEOUT_SECS;
        }
        if self.narrow_viewport_width == 0 {
            self.narrow_viewport_width = DEFAULT_NARROW_VIEWPORT_WIDTH;
        }
        self.data_dir = self
            .data_dir
            .filter(|path| !path.as_os_str().is_empty());

        self
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// `None` when polling is disabled.
    pub fn notification_poll_interval(&self) -> Option<Duration> {
        (self.notification_poll_secs > 0).then(|| Duration::from_secs(self.notification_poll_secs))
    }

    pub fn resolved_data_dir(&self) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(FileStore::default_root)
    }
}

/// Live settings shared across the app, persisted as JSON.
#[derive(Debug, Clone)]
pub struct SettingsStore {
    settings: Arc<ArcSwap<AppSettings>>,
    config_path: PathBuf,
}

impl SettingsStore {
    pub fn default_config_dir() -> PathBuf {
        dirs::config_dir()
            .map(|path| path.join(SETTINGS_DIRECTORY_NAME))
            .unwrap_or_else(|| PathBuf::from(".fintech-ai"))
    }

    pub fn default_config_path() -> PathBuf {
        Self::default_config_dir().join(SETTINGS_FILE_NAME)
    }

    /// Loads `config_path` layered over defaults, then `FINTECH_*` environment overrides.
    pub fn new(config_path: PathBuf) -> Self {
        Self::with_env_prefix(config_path, ENV_PREFIX)
    }

    pub fn load() -> Self {
        Self::new(Self::default_config_path())
    }

    pub(crate) fn with_env_prefix(config_path: PathBuf, env_prefix: &str) -> Self {
        let settings = Self::load_from_disk(&config_path, env_prefix);
        Self {
            settings: Arc::new(ArcSwap::from_pointee(settings)),
            config_path,
        }
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn settings(&self) -> Arc<AppSettings> {
        self.settings.load_full()
    }

    pub fn update(&self, settings: AppSettings) -> SettingsResult<()> {
        let normalized_settings = settings.normalized();
        self.persist(&normalized_settings)?;
        self.settings.store(Arc::new(normalized_settings));
        Ok(())
    }

    fn load_from_disk(path: &Path, env_prefix: &str) -> AppSettings {
        if !path.exists() {
            tracing::info!(path = %path.display(), "settings file not found, using defaults");
        }

        let figment = Figment::from(Serialized::defaults(AppSettings::default()))
            .merge(Json::file(path))
            .merge(Env::prefixed(env_prefix));

        match figment.extract::<AppSettings>() {
            Ok(settings) => settings.normalized(),
            Err(error) => {
                tracing::warn!(
                    path = %path.display(),
                    %error,
                    "failed to parse settings, using defaults"
                );
                AppSettings::default()
            }
        }
    }

    fn persist(&self, settings: &AppSettings) -> SettingsResult<()> {
        if let Some(parent) = self.config_path.parent() {
            std::fs::create_dir_all(parent).context(CreateDirSnafu {
                stage: "create-settings-directory",
                path: parent.to_path_buf(),
            })?;
        }

        let content = serde_json::to_string_pretty(settings).context(SerializeConfigSnafu {
            stage: "serialize-settings-json",
        })?;

        let temp_path = self.config_path.with_extension("json.tmp");
        std::fs::write(&temp_path, content).context(WriteFileSnafu {
            stage: "write-temporary-settings-file",
            path: temp_path.clone(),
        })?;

        std::fs::rename(&temp_path, &self.config_path).context(RenameTempFileSnafu {
            stage: "rename-temporary-settings-file",
            from: temp_path,
            to: self.config_path.clone(),
        })?;

        tracing::info!(path = %self.config_path.display(), "saved settings");
        Ok(())
    }
}

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum SettingsError {
    #[snafu(display("failed to create settings directory at {path:?} on `{stage}`: {source}"))]
    CreateDir {
        stage: &'static str,
        path: PathBuf,
        source: std::io::Error,
    },
    #[snafu(display("failed to serialize settings on `{stage}`: {source}"))]
    SerializeConfig {
        stage: &'static str,
        source: serde_json::Error,
    },
    #[snafu(display("failed to write settings file at {path:?} on `{stage}`: {source}"))]
    WriteFile {
        stage: &'static str,
        path: PathBuf,
        source: std::io::Error,
    },
    #[snafu(display(
        "failed to replace settings file from {from:?} to {to:?} on `{stage}`: {source}"
    ))]
    RenameTempFile {
        stage: &'static str,
        from: PathBuf,
        to: PathBuf,
        source: std::io::Error,
    },
}

pub type SettingsResult<T> = Result<T, SettingsError>;

fn default_api_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}

fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

fn default_narrow_viewport_width() -> u32 {
    DEFAULT_NARROW_VIEWPORT_WIDTH
}

fn default_notification_poll_secs() -> u64 {
    DEFAULT_NOTIFICATION_POLL_SECS
}

#[cfg(test)]
mod tests {
    use super::*;

    const UNSET_PREFIX: &str = "FINTECH_SETTINGS_TEST_UNSET_";

    #[test]
    fn missing_file_loads_defaults() {
        let directory = tempfile::tempdir().unwrap();
        let store =
            SettingsStore::with_env_prefix(directory.path().join("settings.json"), UNSET_PREFIX);

        assert_eq!(*store.settings(), AppSettings::default());
        assert_eq!(store.settings().notification_poll_interval(), Some(Duration::from_secs(30)));
    }

    #[test]
    fn file_values_override_defaults_and_are_normalized() {
        let directory = tempfile::tempdir().unwrap();
        let path = directory.path().join("settings.json");
        std::fs::write(
            &path,
            r#"{"api_base_url": " https://rbi.example/ ", "stream_replies": true, "storage_backend": "sqlite", "notification_poll_secs": 0}"#,
        )
        .unwrap();

        let settings = SettingsStore::with_env_prefix(path, UNSET_PREFIX).settings();

        assert_eq!(settings.api_base_url, "https://rbi.example");
        assert!(settings.stream_replies);
        assert_eq!(settings.storage_backend, StorageBackend::Sqlite);
        assert_eq!(settings.notification_poll_interval(), None);
        assert_eq!(settings.request_timeout_secs, DEFAULT_REQUEST_TIMEOUT_SECS);
    }

    #[test]
    fn corrupt_file_falls_back_to_defaults() {
        let directory = tempfile::tempdir().unwrap();
        let path = directory.path().join("settings.json");
        std::fs::write(&path, "{ not json").unwrap();

        let store = SettingsStore::with_env_prefix(path, UNSET_PREFIX);

        assert_eq!(*store.settings(), AppSettings::default());
    }

    #[test]
    fn update_persists_and_swaps() {
        let directory = tempfile::tempdir().unwrap();
        let path = directory.path().join("nested").join("settings.json");
        let store = SettingsStore::with_env_prefix(path.clone(), UNSET_PREFIX);

        store
            .update(AppSettings {
                stream_replies: true,
                request_timeout_secs: 0,
                ..AppSettings::default()
            })
            .unwrap();

        assert!(store.settings().stream_replies);
        assert_eq!(store.settings().request_timeout_secs, DEFAULT_REQUEST_TIMEOUT_SECS);
        let reloaded = SettingsStore::with_env_prefix(path.clone(), UNSET_PREFIX);
        assert_eq!(reloaded.settings(), store.settings());
        assert!(!path.with_extension("json.tmp").exists());
    }
}

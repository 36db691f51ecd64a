use std::path::Path;
use std::sync::Arc;

use fintech_storage::sqlite::DEFAULT_DATABASE_FILE_NAME;
use fintech_storage::{FileStore, KeyValueStore, MemoryStore, SqliteStore};
use snafu::ResultExt;

use super::error::{AppResult, OpenStoreSnafu};
use super::settings::{AppSettings, StorageBackend};

/// Opens the key/value backend selected in settings.
pub async fn open_key_value_store(settings: &AppSettings) -> AppResult<Arc<dyn KeyValueStore>> {
    let data_dir = settings.resolved_data_dir();
    let store: Arc<dyn KeyValueStore> = match settings.storage_backend {
        StorageBackend::File => Arc::new(FileStore::new(&data_dir)),
        StorageBackend::Sqlite => Arc::new(open_sqlite(&data_dir).await?),
        StorageBackend::Memory => {
            tracing::warn!("conversation history will not survive this session");
            Arc::new(MemoryStore::new())
        }
    };

    tracing::info!(
        backend = ?settings.storage_backend,
        data_dir = %data_dir.display(),
        "conversation storage ready"
    );
    Ok(store)
}

async fn open_sqlite(data_dir: &Path) -> AppResult<SqliteStore> {
    let location = data_dir.join(DEFAULT_DATABASE_FILE_NAME);
    SqliteStore::open(&location.display().to_string())
        .await
        .context(OpenStoreSnafu {
            stage: "open-sqlite-store",
        })
}

#[cfg(test)]
mod tests {
    use fintech_storage::CONVERSATIONS_KEY;

    use super::*;

    fn settings(backend: StorageBackend, data_dir: &Path) -> AppSettings {
        AppSettings {
            storage_backend: backend,
            data_dir: Some(data_dir.to_path_buf()),
            ..AppSettings::default()
        }
    }

    #[tokio::test]
    async fn file_backend_writes_below_data_dir() {
        let directory = tempfile::tempdir().unwrap();

        let store = open_key_value_store(&settings(StorageBackend::File, directory.path()))
            .await
            .unwrap();
        store.set(CONVERSATIONS_KEY, "[]").unwrap();

        assert!(directory.path().join("fintech_conversations.json").exists());
    }

    #[tokio::test]
    async fn sqlite_backend_persists_across_reopen() {
        let directory = tempfile::tempdir().unwrap();
        let settings = settings(StorageBackend::Sqlite, directory.path());

        open_key_value_store(&settings)
            .await
            .unwrap()
            .set(CONVERSATIONS_KEY, "[]")
            .unwrap();
        let reopened = open_key_value_store(&settings).await.unwrap();

        assert_eq!(reopened.get(CONVERSATIONS_KEY).unwrap().as_deref(), Some("[]"));
    }

    #[tokio::test]
    async fn memory_backend_starts_empty() {
        let directory = tempfile::tempdir().unwrap();

        let store = open_key_value_store(&settings(StorageBackend::Memory, directory.path()))
            .await
            .unwrap();

        assert_eq!(store.get(CONVERSATIONS_KEY).unwrap(), None);
    }
}

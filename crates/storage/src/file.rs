use std::path::{Path, PathBuf};

use snafu::ResultExt;

use super::KeyValueStore;
use super::error::{
    CreateDirectorySnafu, InvalidKeySnafu, ReadEntrySnafu, RemoveEntrySnafu, RenameEntrySnafu,
    StorageResult, WriteEntrySnafu,
};

pub const DATA_DIRECTORY_NAME: &str = "fintech-ai";
const FALLBACK_RELATIVE_DIRECTORY: &str = ".fintech-ai";
const ENTRY_EXTENSION: &str = "json";

/// Stores each key as one file below a root directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn default_root() -> PathBuf {
        dirs::data_dir()
            .map(|path| path.join(DATA_DIRECTORY_NAME))
            .unwrap_or_else(|| PathBuf::from(FALLBACK_RELATIVE_DIRECTORY))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn entry_path(&self, key: &str, stage: &'static str) -> StorageResult<PathBuf> {
        if key.is_empty() {
            return InvalidKeySnafu {
                stage,
                key,
                details: "key is empty",
            }
            .fail();
        }

        // Keys become file names, so anything that could escape the root is rejected.
        if !key
            .chars()
            .all(|character| character.is_ascii_alphanumeric() || matches!(character, '_' | '-'))
        {
            return InvalidKeySnafu {
                stage,
                key,
                details: "only ascii letters, digits, '_' and '-' are allowed",
            }
            .fail();
        }

        Ok(self.root.join(format!("{key}.{ENTRY_EXTENSION}")))
    }
}

impl Default for FileStore {
    fn default() -> Self {
        Self::new(Self::default_root())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        let path = self.entry_path(key, "file-get-path")?;

        match std::fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(source) if source.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(source).context(ReadEntrySnafu {
                stage: "file-get-read",
                path: display_path(&path),
            }),
        }
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        let path = self.entry_path(key, "file-set-path")?;

        std::fs::create_dir_all(&self.root).context(CreateDirectorySnafu {
            stage: "file-set-create-directory",
            path: display_path(&self.root),
        })?;

        // Write-then-rename keeps each entry whole even if the process dies mid-write.
        let temp_path = path.with_extension(format!("{ENTRY_EXTENSION}.tmp"));
        std::fs::write(&temp_path, value).context(WriteEntrySnafu {
            stage: "file-set-write-temporary",
            path: display_path(&temp_path),
        })?;

        std::fs::rename(&temp_path, &path).context(RenameEntrySnafu {
            stage: "file-set-rename-temporary",
            from: display_path(&temp_path),
            to: display_path(&path),
        })
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        let path = self.entry_path(key, "file-remove-path")?;

        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(source) if source.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(source).context(RemoveEntrySnafu {
                stage: "file-remove",
                path: display_path(&path),
            }),
        }
    }
}

fn display_path(path: &Path) -> String {
    path.display().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::StorageError;

    #[test]
    fn values_survive_a_new_store_instance() {
        let directory = tempfile::tempdir().unwrap();
        let root = directory.path().join("nested");

        FileStore::new(&root)
            .set("fintech_active_id", "abc")
            .unwrap();

        let reopened = FileStore::new(&root);
        assert_eq!(
            reopened.get("fintech_active_id").unwrap().as_deref(),
            Some("abc")
        );
        assert!(!root.join("fintech_active_id.json.tmp").exists());
    }

    #[test]
    fn missing_entry_reads_as_none() {
        let directory = tempfile::tempdir().unwrap();
        let store = FileStore::new(directory.path());

        assert!(store.get("fintech_conversations").unwrap().is_none());
        assert!(store.remove("fintech_conversations").is_ok());
    }

    #[test]
    fn path_like_keys_are_rejected() {
        let directory = tempfile::tempdir().unwrap();
        let store = FileStore::new(directory.path());

        let error = store.set("../escape", "value").err();
        assert!(matches!(error, Some(StorageError::InvalidKey { .. })));
    }
}

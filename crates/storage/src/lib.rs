pub mod error;
pub mod file;
pub mod ids;
pub mod memory;
pub mod snapshot;
pub mod sqlite;
pub mod types;

pub use error::{StorageError, StorageResult};
pub use file::FileStore;
pub use ids::{ConversationId, MessageId};
pub use memory::MemoryStore;
pub use snapshot::{LoadedSnapshot, SnapshotStore};
pub use sqlite::SqliteStore;
pub use types::{
    ACTIVE_ID_KEY, AssistantMessageRecord, CONVERSATIONS_KEY, CitationRecord, ConversationRecord,
    DEFAULT_NAMESPACE, MessageRecord, PageRefRecord, ReplyStatusRecord, UserMessageRecord,
};

/// String-keyed persistence port for client-local state.
///
/// Implementations are last-write-wins: every `set` replaces the whole value for a key.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> StorageResult<Option<String>>;
    fn set(&self, key: &str, value: &str) -> StorageResult<()>;
    fn remove(&self, key: &str) -> StorageResult<()>;
}

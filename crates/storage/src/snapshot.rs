use std::sync::Arc;

use snafu::ResultExt;

use super::KeyValueStore;
use super::error::{ParseSnapshotSnafu, SerializeSnapshotSnafu, StorageResult};
use super::ids::ConversationId;
use super::types::{ACTIVE_ID_KEY, CONVERSATIONS_KEY, ConversationRecord};

/// Result of restoring persisted state.
///
/// `active_id` is only set when it still names one of `conversations`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadedSnapshot {
    pub conversations: Vec<ConversationRecord>,
    pub active_id: Option<ConversationId>,
}

/// Loads and saves the conversation list plus active id over a key/value port.
#[derive(Clone)]
pub struct SnapshotStore {
    store: Arc<dyn KeyValueStore>,
}

impl std::fmt::Debug for SnapshotStore {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter.debug_struct("SnapshotStore").finish_non_exhaustive()
    }
}

impl SnapshotStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Restores persisted state. Absent, unreadable or corrupt payloads load as empty.
    pub fn load(&self) -> LoadedSnapshot {
        let conversations = match self.read_conversations() {
            Ok(conversations) => conversations,
            Err(error) => {
                tracing::warn!(%error, "discarding unreadable conversation snapshot");
                Vec::new()
            }
        };

        let stored_active_id = match self.read_active_id() {
            Ok(active_id) => active_id,
            Err(error) => {
                tracing::warn!(%error, "discarding unreadable active conversation id");
                None
            }
        };

        let active_id = stored_active_id.filter(|active_id| {
            let matches = conversations
                .iter()
                .any(|conversation| conversation.id == *active_id);
            if !matches {
                tracing::debug!(active_id = %active_id, "persisted active id is stale");
            }
            matches
        });

        LoadedSnapshot {
            conversations,
            active_id,
        }
    }

    /// Persists the full list and active id, logging instead of failing.
    pub fn save(&self, conversations: &[ConversationRecord], active_id: Option<ConversationId>) {
        if let Err(error) = self.try_save(conversations, active_id) {
            tracing::warn!(%error, "failed to persist conversation snapshot");
        }
    }

    pub fn try_save(
        &self,
        conversations: &[ConversationRecord],
        active_id: Option<ConversationId>,
    ) -> StorageResult<()> {
        let payload = serde_json::to_string(conversations).context(SerializeSnapshotSnafu {
            stage: "snapshot-serialize-conversations",
        })?;
        self.store.set(CONVERSATIONS_KEY, &payload)?;

        match active_id {
            Some(active_id) => self.store.set(ACTIVE_ID_KEY, &active_id.to_string()),
            None => self.store.remove(ACTIVE_ID_KEY),
        }
    }

    fn read_conversations(&self) -> StorageResult<Vec<ConversationRecord>> {
        let Some(payload) = self.store.get(CONVERSATIONS_KEY)? else {
            return Ok(Vec::new());
        };

        serde_json::from_str(&payload).context(ParseSnapshotSnafu {
            stage: "snapshot-parse-conversations",
            key: CONVERSATIONS_KEY,
        })
    }

    fn read_active_id(&self) -> StorageResult<Option<ConversationId>> {
        let Some(raw) = self.store.get(ACTIVE_ID_KEY)? else {
            return Ok(None);
        };

        ConversationId::parse(&raw).map(Some)
    }
}

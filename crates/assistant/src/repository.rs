use fintech_storage::{ConversationId, ConversationRecord, MessageId, SnapshotStore};

use super::conversation::{Conversation, derive_title, now_millis};
use super::message::Message;

/// Result of a delete request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// No conversation had that id; nothing changed.
    Missing,
    /// The conversation was removed. `activated` names the conversation that took over
    /// when the deleted one was active.
    Removed {
        activated: Option<ConversationId>,
    },
}

/// Whether a message edit is written to the snapshot store right away.
///
/// Deferred edits stay in memory until the next persisted mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Persist {
    Now,
    Deferred,
}

/// Canonical owner of every conversation and of the active-id pointer.
///
/// The list is kept most-recent-first. Mutations persist the full snapshot, except message
/// edits made with [`Persist::Deferred`].
#[derive(Debug)]
pub struct ConversationRepository {
    conversations: Vec<Conversation>,
    active_id: Option<ConversationId>,
    snapshots: SnapshotStore,
}

impl ConversationRepository {
    /// Restores persisted state, falling back to the most recent conversation when the stored
    /// active id is missing, and to a fresh conversation when nothing was stored.
    pub fn restore(snapshots: SnapshotStore) -> Self {
        let loaded = snapshots.load();
        let conversations = loaded
            .conversations
            .into_iter()
            .map(Conversation::from_record)
            .collect::<Vec<_>>();
        let active_id = loaded
            .active_id
            .or_else(|| conversations.first().map(|conversation| conversation.id));

        let mut repository = Self {
            conversations,
            active_id,
            snapshots,
        };

        if repository.conversations.is_empty() {
            repository.create(true);
        }

        tracing::debug!(
            conversations = repository.conversations.len(),
            active_id = ?repository.active_id,
            "conversation repository restored"
        );
        repository
    }

    pub fn conversations(&self) -> &[Conversation] {
        &self.conversations
    }

    pub fn active_id(&self) -> Option<ConversationId> {
        self.active_id
    }

    pub fn active(&self) -> Option<&Conversation> {
        self.active_id.and_then(|id| self.get(id))
    }

    pub fn get(&self, id: ConversationId) -> Option<&Conversation> {
        self.conversations
            .iter()
            .find(|conversation| conversation.id == id)
    }

    pub fn contains(&self, id: ConversationId) -> bool {
        self.get(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.conversations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.conversations.is_empty()
    }

    /// Inserts a fresh sentinel-titled conversation at the head of the list.
    pub fn create(&mut self, make_active: bool) -> ConversationId {
        let id = ConversationId::new_v7();
        self.conversations
            .insert(0, Conversation::new(id, now_millis()));
        if make_active {
            self.active_id = Some(id);
        }

        tracing::debug!(conversation_id = %id, make_active, "conversation created");
        self.persist();
        id
    }

    /// Makes `id` active. Unknown ids are ignored and return `false`.
    pub fn switch_to(&mut self, id: ConversationId) -> bool {
        if !self.contains(id) {
            tracing::debug!(conversation_id = %id, "ignoring switch to unknown conversation");
            return false;
        }

        self.active_id = Some(id);
        self.persist();
        true
    }

    pub fn delete(&mut self, id: ConversationId) -> DeleteOutcome {
        let Some(index) = self
            .conversations
            .iter()
            .position(|conversation| conversation.id == id)
        else {
            return DeleteOutcome::Missing;
        };

        self.conversations.remove(index);
        tracing::debug!(conversation_id = %id, "conversation deleted");

        if self.active_id != Some(id) {
            self.persist();
            return DeleteOutcome::Removed { activated: None };
        }

        let activated = match self.conversations.first() {
            Some(next) => {
                self.active_id = Some(next.id);
                self.persist();
                next.id
            }
            None => {
                self.active_id = None;
                self.create(true)
            }
        };

        DeleteOutcome::Removed {
            activated: Some(activated),
        }
    }

    /// Applies the one-time automatic title when `trigger` is the conversation's first user
    /// message and the title is still the sentinel. Returns whether the title changed.
    pub fn rename_if_default(
        &mut self,
        id: ConversationId,
        trigger: MessageId,
        candidate_text: &str,
    ) -> bool {
        let Some(conversation) = self.get_mut(id) else {
            return false;
        };
        if !conversation.has_sentinel_title()
            || conversation.first_user_message_id() != Some(trigger)
        {
            return false;
        }

        let title = derive_title(candidate_text);
        if title.is_empty() {
            return false;
        }

        conversation.title = title;
        conversation.auto_titled = true;
        self.persist();
        true
    }

    /// Case-insensitive title filter. Order follows the underlying list.
    pub fn search(&self, query: &str) -> Vec<&Conversation> {
        let needle = query.to_lowercase();
        self.conversations
            .iter()
            .filter(|conversation| {
                needle.is_empty() || conversation.title.to_lowercase().contains(&needle)
            })
            .collect()
    }

    /// Runs `edit` against the stored messages of `id`, then refreshes `updated_at` and persists.
    pub(crate) fn edit_messages<R>(
        &mut self,
        id: ConversationId,
        edit: impl FnOnce(&mut Vec<Message>) -> R,
    ) -> Option<R> {
        self.edit_messages_with(id, Persist::Now, edit)
    }

    pub(crate) fn edit_messages_with<R>(
        &mut self,
        id: ConversationId,
        persist: Persist,
        edit: impl FnOnce(&mut Vec<Message>) -> R,
    ) -> Option<R> {
        let conversation = self.get_mut(id)?;
        let output = edit(&mut conversation.messages);
        conversation.updated_at = now_millis();
        if persist == Persist::Now {
            self.persist();
        }
        Some(output)
    }

    pub(crate) fn replace_messages(
        &mut self,
        id: ConversationId,
        messages: Vec<Message>,
        persist: Persist,
    ) -> bool {
        self.edit_messages_with(id, persist, |stored| *stored = messages)
            .is_some()
    }

    fn get_mut(&mut self, id: ConversationId) -> Option<&mut Conversation> {
        self.conversations
            .iter_mut()
            .find(|conversation| conversation.id == id)
    }

    fn persist(&self) {
        let records = self
            .conversations
            .iter()
            .map(Conversation::to_record)
            .collect::<Vec<ConversationRecord>>();
        self.snapshots.save(&records, self.active_id);
    }
}

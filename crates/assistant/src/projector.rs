use fintech_storage::ConversationId;

use super::message::Message;
use super::repository::{ConversationRepository, Persist};

/// Editable working copy of the active conversation's messages.
///
/// All writes go through [`ActiveSession::edit`], which names the conversation explicitly
/// and mirrors the result into the repository in the same call.
#[derive(Debug, Default)]
pub struct ActiveSession {
    conversation_id: Option<ConversationId>,
    messages: Vec<Message>,
}

impl ActiveSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn conversation_id(&self) -> Option<ConversationId> {
        self.conversation_id
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Replaces the working copy with the repository's active conversation.
    pub fn load_active(&mut self, repository: &ConversationRepository) {
        match repository.active() {
            Some(conversation) => {
                self.conversation_id = Some(conversation.id);
                self.messages = conversation.messages.clone();
            }
            None => {
                self.conversation_id = None;
                self.messages.clear();
            }
        }
    }

    /// Applies `edit` to the messages of `conversation_id`.
    ///
    /// When that conversation is the projected one the working copy is edited and then
    /// written back; otherwise the repository copy is edited directly. Returns `None`
    /// when the conversation no longer exists.
    pub fn edit<R>(
        &mut self,
        repository: &mut ConversationRepository,
        conversation_id: ConversationId,
        edit: impl FnOnce(&mut Vec<Message>) -> R,
    ) -> Option<R> {
        self.edit_with(repository, conversation_id, Persist::Now, edit)
    }

    pub(crate) fn edit_with<R>(
        &mut self,
        repository: &mut ConversationRepository,
        conversation_id: ConversationId,
        persist: Persist,
        edit: impl FnOnce(&mut Vec<Message>) -> R,
    ) -> Option<R> {
        if self.conversation_id != Some(conversation_id) {
            return repository.edit_messages_with(conversation_id, persist, edit);
        }

        if !repository.contains(conversation_id) {
            return None;
        }

        let output = edit(&mut self.messages);
        repository.replace_messages(conversation_id, self.messages.clone(), persist);
        Some(output)
    }

    /// True when the working copy matches the repository's stored copy.
    pub fn is_in_sync(&self, repository: &ConversationRepository) -> bool {
        match self.conversation_id {
            Some(id) => repository
                .get(id)
                .is_some_and(|conversation| conversation.messages == self.messages),
            None => self.messages.is_empty(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use fintech_storage::{MemoryStore, MessageId, SnapshotStore};

    use super::*;
    use crate::message::{AssistantMessage, UserMessage};

    fn repository() -> ConversationRepository {
        ConversationRepository::restore(SnapshotStore::new(Arc::new(MemoryStore::new())))
    }

    fn user(text: &str) -> Message {
        Message::User(UserMessage {
            id: MessageId::new_v7(),
            text: text.to_string(),
            attachment: None,
        })
    }

    #[test]
    fn active_edits_are_mirrored_into_the_repository() {
        let mut repository = repository();
        let mut session = ActiveSession::new();
        session.load_active(&repository);
        let id = session.conversation_id().unwrap();

        session.edit(&mut repository, id, |messages| {
            messages.push(user("hello"));
            messages.push(Message::Assistant(AssistantMessage::placeholder(
                MessageId::new_v7(),
            )));
        });

        assert_eq!(session.messages().len(), 2);
        assert!(session.is_in_sync(&repository));
    }

    #[test]
    fn edits_for_other_conversations_leave_working_copy_alone() {
        let mut repository = repository();
        let background = repository.active_id().unwrap();
        repository.create(true);
        let mut session = ActiveSession::new();
        session.load_active(&repository);

        session.edit(&mut repository, background, |messages| {
            messages.push(user("late reply target"))
        });

        assert!(session.messages().is_empty());
        assert_eq!(repository.get(background).unwrap().messages.len(), 1);
        assert!(session.is_in_sync(&repository));
    }

    #[test]
    fn switching_replaces_the_working_copy() {
        let mut repository = repository();
        let first = repository.active_id().unwrap();
        let mut session = ActiveSession::new();
        session.load_active(&repository);
        session.edit(&mut repository, first, |messages| messages.push(user("first")));

        let second = repository.create(true);
        session.load_active(&repository);
        assert_eq!(session.conversation_id(), Some(second));
        assert!(session.messages().is_empty());

        repository.switch_to(first);
        session.load_active(&repository);
        assert_eq!(session.messages().len(), 1);
        assert_eq!(session.messages()[0].text(), "first");
    }

    #[test]
    fn edits_for_deleted_conversations_are_refused() {
        let mut repository = repository();
        let mut session = ActiveSession::new();
        session.load_active(&repository);
        let id = session.conversation_id().unwrap();
        repository.delete(id);

        assert!(session.edit(&mut repository, id, |messages| messages.clear()).is_none());
    }
}

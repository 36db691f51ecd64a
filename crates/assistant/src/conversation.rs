use std::time::{SystemTime, UNIX_EPOCH};

use fintech_storage::{ConversationId, ConversationRecord, MessageId};

use super::message::{Message, Role};

/// Title every conversation starts with; eligible for one automatic rename.
pub const SENTINEL_TITLE: &str = "New Chat";

const TITLE_WORD_LIMIT: usize = 5;
const TITLE_CHAR_LIMIT: usize = 30;
const TITLE_ELLIPSIS: &str = "...";

/// A titled, ordered thread of messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conversation {
    pub id: ConversationId,
    pub title: String,
    /// Set once the automatic rename has been spent.
    pub auto_titled: bool,
    pub messages: Vec<Message>,
    pub created_at: u64,
    pub updated_at: u64,
}

impl Conversation {
    pub fn new(id: ConversationId, now: u64) -> Self {
        Self {
            id,
            title: SENTINEL_TITLE.to_string(),
            auto_titled: false,
            messages: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn has_sentinel_title(&self) -> bool {
        !self.auto_titled && self.title == SENTINEL_TITLE
    }

    pub fn first_user_message_id(&self) -> Option<MessageId> {
        self.messages
            .iter()
            .find(|message| message.role() == Role::User)
            .map(Message::id)
    }

    pub fn message(&self, id: MessageId) -> Option<&Message> {
        self.messages.iter().find(|message| message.id() == id)
    }

    pub fn from_record(record: ConversationRecord) -> Self {
        Self {
            id: record.id,
            title: record.title,
            auto_titled: record.auto_titled,
            messages: record.messages.into_iter().map(Message::from_record).collect(),
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }

    pub fn to_record(&self) -> ConversationRecord {
        ConversationRecord {
            id: self.id,
            title: self.title.clone(),
            auto_titled: self.auto_titled,
            messages: self.messages.iter().map(Message::to_record).collect(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Derives a conversation title from the first user message.
///
/// Keeps the first five whitespace-separated words; when those exceed 30 characters the
/// first 30 are kept and `...` is appended.
pub fn derive_title(text: &str) -> String {
    let joined = text
        .split_whitespace()
        .take(TITLE_WORD_LIMIT)
        .collect::<Vec<_>>()
        .join(" ");

    if joined.chars().count() <= TITLE_CHAR_LIMIT {
        return joined;
    }

    let mut title = joined.chars().take(TITLE_CHAR_LIMIT).collect::<String>();
    title.push_str(TITLE_ELLIPSIS);
    title
}

/// Milliseconds since the unix epoch; clocks before 1970 read as zero.
pub fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX))
        .unwrap_or(0)
}

use serde::{Deserialize, Serialize};

use super::ids::{ConversationId, MessageId};

/// Key holding the serialized conversation list.
pub const CONVERSATIONS_KEY: &str = "fintech_conversations";
/// Key holding the active conversation identifier.
pub const ACTIVE_ID_KEY: &str = "fintech_active_id";
/// Namespace used by backends that can scope keys (sqlite rows).
pub const DEFAULT_NAMESPACE: &str = "fintech";

/// Storage-local conversation shape, decoupled from the assistant domain types.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationRecord {
    pub id: ConversationId,
    pub title: String,
    #[serde(default)]
    pub auto_titled: bool,
    #[serde(default)]
    pub messages: Vec<MessageRecord>,
    pub created_at: u64,
    pub updated_at: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum MessageRecord {
    User(UserMessageRecord),
    Assistant(AssistantMessageRecord),
}

impl MessageRecord {
    pub fn id(&self) -> MessageId {
        match self {
            Self::User(record) => record.id,
            Self::Assistant(record) => record.id,
        }
    }
}

/// Preview references are session-local, so only the attachment name is persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserMessageRecord {
    pub id: MessageId,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attachment_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssistantMessageRecord {
    pub id: MessageId,
    pub text: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub citations: Vec<CitationRecord>,
    #[serde(default)]
    pub status: ReplyStatusRecord,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReplyStatusRecord {
    Pending,
    #[default]
    Done,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CitationRecord {
    pub title: String,
    pub filename: String,
    pub category: String,
    pub upload_date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_number: Option<PageRefRecord>,
    pub extract: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PageRefRecord {
    Number(u32),
    Label(String),
}

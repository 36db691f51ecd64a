use std::fmt;

use fintech_storage::{
    AssistantMessageRecord, CitationRecord, MessageId, MessageRecord, PageRefRecord,
    ReplyStatusRecord, UserMessageRecord,
};

/// Inline text shown in place of a reply when the exchange fails.
pub const ERROR_REPLY_TEXT: &str =
    "**Error:** Something went wrong. Please check your connection or try again.";
/// Inline text for replies that were still pending when the previous session ended.
pub const INTERRUPTED_REPLY_TEXT: &str =
    "**Error:** The request was interrupted before a reply arrived. Please try again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    User,
    Assistant,
}

/// File reference attached to a user message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub name: String,
    /// Session-local preview reference for images; never persisted.
    pub preview_url: Option<String>,
}

impl Attachment {
    pub fn new(name: impl Into<String>, preview_url: Option<String>) -> Self {
        Self {
            name: name.into(),
            preview_url,
        }
    }

    /// Builds the attachment for an uploaded file, minting a preview reference for images.
    pub fn for_upload(message_id: MessageId, name: &str, mime_type: &str) -> Self {
        let preview_url = mime_type
            .starts_with("image/")
            .then(|| format!("attachment://{message_id}/{name}"));
        Self::new(name, preview_url)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserMessage {
    pub id: MessageId,
    pub text: String,
    pub attachment: Option<Attachment>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ReplyStatus {
    #[default]
    Pending,
    Done,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssistantMessage {
    pub id: MessageId,
    pub text: String,
    pub citations: Vec<Citation>,
    pub status: ReplyStatus,
}

impl AssistantMessage {
    /// Empty reply slot inserted together with the user message it answers.
    pub fn placeholder(id: MessageId) -> Self {
        Self {
            id,
            text: String::new(),
            citations: Vec::new(),
            status: ReplyStatus::Pending,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.status == ReplyStatus::Pending
    }

    pub fn resolve(&mut self, text: impl Into<String>, citations: Vec<Citation>) {
        self.text = text.into();
        self.citations = citations;
        self.status = ReplyStatus::Done;
    }

    pub fn fail(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.status = ReplyStatus::Failed;
    }
}

/// One turn of a conversation. The role decides which optional fields exist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    User(UserMessage),
    Assistant(AssistantMessage),
}

impl Message {
    pub fn id(&self) -> MessageId {
        match self {
            Self::User(message) => message.id,
            Self::Assistant(message) => message.id,
        }
    }

    pub fn role(&self) -> Role {
        match self {
            Self::User(_) => Role::User,
            Self::Assistant(_) => Role::Assistant,
        }
    }

    pub fn text(&self) -> &str {
        match self {
            Self::User(message) => &message.text,
            Self::Assistant(message) => &message.text,
        }
    }

    pub fn as_assistant_mut(&mut self) -> Option<&mut AssistantMessage> {
        match self {
            Self::Assistant(message) => Some(message),
            Self::User(_) => None,
        }
    }

    pub fn as_assistant(&self) -> Option<&AssistantMessage> {
        match self {
            Self::Assistant(message) => Some(message),
            Self::User(_) => None,
        }
    }

    /// Restores a persisted message. A reply that was still pending can no longer
    /// resolve, so it comes back as failed.
    pub fn from_record(record: MessageRecord) -> Self {
        match record {
            MessageRecord::User(record) => Self::User(UserMessage {
                id: record.id,
                text: record.text,
                attachment: record
                    .attachment_name
                    .map(|name| Attachment::new(name, None)),
            }),
            MessageRecord::Assistant(record) => {
                let mut message = AssistantMessage {
                    id: record.id,
                    text: record.text,
                    citations: record.citations.into_iter().map(Citation::from).collect(),
                    status: match record.status {
                        ReplyStatusRecord::Pending => ReplyStatus::Pending,
                        ReplyStatusRecord::Done => ReplyStatus::Done,
                        ReplyStatusRecord::Failed => ReplyStatus::Failed,
                    },
                };
                if message.is_pending() {
                    tracing::debug!(message_id = %message.id, "restoring interrupted reply as failed");
                    message.fail(INTERRUPTED_REPLY_TEXT);
                }
                Self::Assistant(message)
            }
        }
    }

    pub fn to_record(&self) -> MessageRecord {
        match self {
            Self::User(message) => MessageRecord::User(UserMessageRecord {
                id: message.id,
                text: message.text.clone(),
                attachment_name: message
                    .attachment
                    .as_ref()
                    .map(|attachment| attachment.name.clone()),
            }),
            Self::Assistant(message) => MessageRecord::Assistant(AssistantMessageRecord {
                id: message.id,
                text: message.text.clone(),
                citations: message.citations.iter().cloned().map(CitationRecord::from).collect(),
                status: match message.status {
                    ReplyStatus::Pending => ReplyStatusRecord::Pending,
                    ReplyStatus::Done => ReplyStatusRecord::Done,
                    ReplyStatus::Failed => ReplyStatusRecord::Failed,
                },
            }),
        }
    }
}

/// Source reference attached to a reply.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Citation {
    pub title: String,
    pub filename: String,
    pub category: String,
    pub upload_date: String,
    pub page_number: Option<PageRef>,
    pub extract: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageRef {
    Number(u32),
    Label(String),
}

impl fmt::Display for PageRef {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(page) => write!(formatter, "{page}"),
            Self::Label(label) => formatter.write_str(label),
        }
    }
}

impl From<CitationRecord> for Citation {
    fn from(record: CitationRecord) -> Self {
        Self {
            title: record.title,
            filename: record.filename,
            category: record.category,
            upload_date: record.upload_date,
            page_number: record.page_number.map(|page| match page {
                PageRefRecord::Number(page) => PageRef::Number(page),
                PageRefRecord::Label(label) => PageRef::Label(label),
            }),
            extract: record.extract,
        }
    }
}

impl From<Citation> for CitationRecord {
    fn from(citation: Citation) -> Self {
        Self {
            title: citation.title,
            filename: citation.filename,
            category: citation.category,
            upload_date: citation.upload_date,
            page_number: citation.page_number.map(|page| match page {
                PageRef::Number(page) => PageRefRecord::Number(page),
                PageRef::Label(label) => PageRefRecord::Label(label),
            }),
            extract: citation.extract,
        }
    }
}

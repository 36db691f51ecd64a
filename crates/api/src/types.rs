use serde::{Deserialize, Deserializer, Serialize};

/// Regulatory circular as returned by `GET /api/circulars`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Circular {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub date: Option<String>,
    pub category: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub file_url: Option<String>,
    #[serde(default)]
    pub file_size: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
}

/// Insert shape for `POST /api/circulars`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCircular {
    pub title: String,
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_size: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CircularFilter {
    pub search: Option<String>,
    pub category: Option<String>,
}

impl CircularFilter {
    pub fn query_pairs(&self) -> Vec<(&'static str, &str)> {
        let mut pairs = Vec::new();
        if let Some(search) = self.search.as_deref().filter(|value| !value.is_empty()) {
            pairs.push(("search", search));
        }
        if let Some(category) = self.category.as_deref().filter(|value| !value.is_empty()) {
            pairs.push(("category", category));
        }
        pairs
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedFile {
    pub url: String,
    pub filename: String,
    pub size: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryRecord {
    pub id: i64,
    pub query_text: String,
    pub response_text: String,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub accuracy: Option<i64>,
    #[serde(default)]
    pub related_circular_id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticRecord {
    pub id: i64,
    pub metric: String,
    pub value: i64,
    #[serde(default)]
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub id: i64,
    pub message: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub is_read: bool,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UnreadCount {
    #[serde(default)]
    pub count: Option<u64>,
}

impl UnreadCount {
    pub fn value(&self) -> u64 {
        self.count.unwrap_or(0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusMessage {
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub(crate) struct DeleteDocumentsRequest<'a> {
    pub ids: &'a [i64],
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub(crate) struct NewQuery<'a> {
    pub query: &'a str,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub(crate) struct AskRequest<'a> {
    pub question: &'a str,
}

/// File payload sent as the `file` part of a multipart request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePart {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl FilePart {
    pub fn new(
        file_name: impl Into<String>,
        mime_type: impl Into<String>,
        bytes: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            mime_type: mime_type.into(),
            bytes: bytes.into(),
        }
    }

    pub fn is_image(&self) -> bool {
        self.mime_type.starts_with("image/")
    }
}

/// Answer body from `/api/ask` and `/api/chat`.
///
/// Backends disagree on the field name, so both `answer` and `reply` are accepted.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AnswerPayload {
    #[serde(default)]
    pub answer: Option<String>,
    #[serde(default)]
    pub reply: Option<String>,
    #[serde(default)]
    pub citations: Option<Vec<CitationPayload>>,
}

impl AnswerPayload {
    /// Splits the payload into display text and citations, using `fallback` when neither
    /// text field carries content.
    pub fn into_parts(self, fallback: &str) -> (String, Vec<CitationPayload>) {
        let text = [self.answer, self.reply]
            .into_iter()
            .flatten()
            .find(|text| !text.is_empty())
            .unwrap_or_else(|| fallback.to_string());
        (text, self.citations.unwrap_or_default())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CitationPayload {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub filename: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub category: String,
    #[serde(default, alias = "uploadDate", deserialize_with = "null_as_empty")]
    pub upload_date: String,
    #[serde(default, alias = "pageNumber")]
    pub page_number: Option<PageNumber>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub extract: String,
}

/// Citation metadata columns may be present but null.
fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PageNumber {
    Number(u32),
    Label(String),
}

/// One `data:` payload of `/api/ask/stream`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StreamChunk {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub citations: Option<Vec<CitationPayload>>,
    #[serde(default)]
    pub error: Option<String>,
}

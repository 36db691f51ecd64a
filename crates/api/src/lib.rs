pub mod client;
pub mod error;
pub mod poller;
pub mod sse;
pub mod types;

pub use client::{ApiClient, DEFAULT_BASE_URL, DEFAULT_TIMEOUT, UploadRoute};
pub use error::{ApiError, ApiResult};
pub use poller::UnreadPoller;
pub use sse::SseDecoder;
pub use types::{
    AnalyticRecord, AnswerPayload, CitationPayload, Circular, CircularFilter, FilePart,
    NewCircular, Notification, PageNumber, QueryRecord, StatusMessage, StreamChunk, UnreadCount,
    UploadedFile,
};

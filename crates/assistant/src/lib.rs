pub mod conversation;
pub mod error;
pub mod exchange;
pub mod message;
pub mod projector;
pub mod remote;
pub mod repository;
pub mod scroll;
pub mod session;

pub use conversation::{Conversation, SENTINEL_TITLE, derive_title};
pub use error::{ExchangeError, ExchangeResult, SubmitRejection};
pub use exchange::{
    AnswerService, BoxFuture, DeliveryMode, ExchangeEvent, ExchangeReply, ExchangeRequest,
    ExchangeTarget, ExchangeUpdate, PendingExchange, ReplyStream, run_exchange,
};
pub use message::{
    AssistantMessage, Attachment, Citation, ERROR_REPLY_TEXT, INTERRUPTED_REPLY_TEXT, Message,
    PageRef, ReplyStatus, Role, UserMessage,
};
pub use projector::ActiveSession;
pub use remote::{EMPTY_ANSWER_TEXT, EMPTY_FILE_ANSWER_TEXT, HttpAnswerService};
pub use repository::{ConversationRepository, DeleteOutcome};
pub use scroll::{AT_BOTTOM_TOLERANCE, ScrollCoordinator, ScrollMetrics};
pub use session::{AssistantSession, Delivery, SessionOptions, SidebarAction, SubmitInput};

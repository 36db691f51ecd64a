use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use fintech_api::FilePart;
use fintech_storage::{ConversationId, MessageId};
use futures::StreamExt;
use futures::stream::BoxStream;
use tokio::sync::mpsc;

use super::error::ExchangeResult;
use super::message::Citation;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;
pub type ReplyStream = BoxStream<'static, ExchangeEvent>;

/// Reply routing key captured at submit time.
///
/// Completions are applied to this conversation and placeholder, never to whichever
/// conversation is active when the reply arrives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ExchangeTarget {
    pub conversation_id: ConversationId,
    pub placeholder_id: MessageId,
}

impl ExchangeTarget {
    pub const fn new(conversation_id: ConversationId, placeholder_id: MessageId) -> Self {
        Self {
            conversation_id,
            placeholder_id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExchangeRequest {
    pub target: ExchangeTarget,
    pub text: String,
    pub attachment: Option<FilePart>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ExchangeReply {
    pub text: String,
    pub citations: Vec<Citation>,
}

impl ExchangeReply {
    pub fn new(text: impl Into<String>, citations: Vec<Citation>) -> Self {
        Self {
            text: text.into(),
            citations,
        }
    }
}

/// Incremental reply payload for streamed answers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExchangeEvent {
    Delta(String),
    Citations(Vec<Citation>),
    Done,
    Error(String),
}

impl ExchangeEvent {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Error(_))
    }
}

/// Remote answering service.
pub trait AnswerService: Send + Sync {
    fn ask<'a>(
        &'a self,
        request: &'a ExchangeRequest,
    ) -> BoxFuture<'a, ExchangeResult<ExchangeReply>>;

    fn ask_stream<'a>(
        &'a self,
        request: &'a ExchangeRequest,
    ) -> BoxFuture<'a, ExchangeResult<ReplyStream>>;
}

/// Accepted submit, ready to be sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingExchange {
    request: ExchangeRequest,
}

impl PendingExchange {
    pub(crate) fn new(request: ExchangeRequest) -> Self {
        Self { request }
    }

    pub fn target(&self) -> ExchangeTarget {
        self.request.target
    }

    pub fn request(&self) -> &ExchangeRequest {
        &self.request
    }

    pub fn into_request(self) -> ExchangeRequest {
        self.request
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeliveryMode {
    #[default]
    Single,
    Streamed,
}

/// Message sent back to the session owner by [`run_exchange`].
#[derive(Debug)]
pub enum ExchangeUpdate {
    Completed {
        target: ExchangeTarget,
        result: ExchangeResult<ExchangeReply>,
    },
    Event {
        target: ExchangeTarget,
        event: ExchangeEvent,
    },
}

impl ExchangeUpdate {
    pub fn target(&self) -> ExchangeTarget {
        match self {
            Self::Completed { target, .. } | Self::Event { target, .. } => *target,
        }
    }
}

/// Performs one exchange and reports the outcome through `updates`.
///
/// Attachments always use a single request. A stream that ends without a terminal event is
/// reported as done.
pub async fn run_exchange(
    service: Arc<dyn AnswerService>,
    pending: PendingExchange,
    mode: DeliveryMode,
    updates: mpsc::UnboundedSender<ExchangeUpdate>,
) {
    let request = pending.into_request();
    let target = request.target;

    if mode == DeliveryMode::Single || request.attachment.is_some() {
        let result = service.ask(&request).await;
        if updates
            .send(ExchangeUpdate::Completed { target, result })
            .is_err()
        {
            tracing::debug!(?target, "exchange finished after the session closed");
        }
        return;
    }

    let mut stream = match service.ask_stream(&request).await {
        Ok(stream) => stream,
        Err(error) => {
            let _ = updates.send(ExchangeUpdate::Event {
                target,
                event: ExchangeEvent::Error(error.to_string()),
            });
            return;
        }
    };

    while let Some(event) = stream.next().await {
        let terminal = event.is_terminal();
        if updates.send(ExchangeUpdate::Event { target, event }).is_err() {
            tracing::debug!(?target, "dropping streamed reply after the session closed");
            return;
        }
        if terminal {
            return;
        }
    }

    let _ = updates.send(ExchangeUpdate::Event {
        target,
        event: ExchangeEvent::Done,
    });
}

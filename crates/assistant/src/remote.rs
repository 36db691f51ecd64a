use fintech_api::{ApiClient, ApiResult, CitationPayload, PageNumber, StreamChunk};
use futures::StreamExt;
use snafu::ResultExt;

use super::error::{BackendSnafu, ExchangeResult};
use super::exchange::{
    AnswerService, BoxFuture, ExchangeEvent, ExchangeReply, ExchangeRequest, ReplyStream,
};
use super::message::{Citation, PageRef};

/// Reply text used when `/api/ask` answers without content.
pub const EMPTY_ANSWER_TEXT: &str = "No response received.";
/// Reply text used when `/api/chat` answers without content.
pub const EMPTY_FILE_ANSWER_TEXT: &str = "File analysis not yet implemented.";

/// [`AnswerService`] backed by the REST endpoints.
///
/// Text-only questions go to `/api/ask` (or its streaming variant); questions with a file go
/// to `/api/chat` as multipart.
#[derive(Debug, Clone)]
pub struct HttpAnswerService {
    client: ApiClient,
}

impl HttpAnswerService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    async fn send(&self, request: &ExchangeRequest) -> ExchangeResult<ExchangeReply> {
        let (payload, fallback) = match &request.attachment {
            Some(file) => (
                self.client
                    .chat(&request.text, file.clone())
                    .await
                    .context(BackendSnafu {
                        stage: "exchange-chat",
                    })?,
                EMPTY_FILE_ANSWER_TEXT,
            ),
            None => (
                self.client.ask(&request.text).await.context(BackendSnafu {
                    stage: "exchange-ask",
                })?,
                EMPTY_ANSWER_TEXT,
            ),
        };

        let (text, citations) = payload.into_parts(fallback);
        Ok(ExchangeReply::new(
            text,
            citations.into_iter().map(Citation::from).collect(),
        ))
    }

    async fn open_stream(&self, request: &ExchangeRequest) -> ExchangeResult<ReplyStream> {
        let chunks = self
            .client
            .ask_stream(&request.text)
            .await
            .context(BackendSnafu {
                stage: "exchange-ask-stream",
            })?;

        Ok(chunks
            .flat_map(|chunk| futures::stream::iter(chunk_events(chunk)))
            .boxed())
    }
}

impl AnswerService for HttpAnswerService {
    fn ask<'a>(
        &'a self,
        request: &'a ExchangeRequest,
    ) -> BoxFuture<'a, ExchangeResult<ExchangeReply>> {
        Box::pin(self.send(request))
    }

    fn ask_stream<'a>(
        &'a self,
        request: &'a ExchangeRequest,
    ) -> BoxFuture<'a, ExchangeResult<ReplyStream>> {
        Box::pin(self.open_stream(request))
    }
}

fn chunk_events(chunk: ApiResult<StreamChunk>) -> Vec<ExchangeEvent> {
    let chunk = match chunk {
        Ok(chunk) => chunk,
        Err(error) => {
            tracing::warn!(%error, "answer stream broke off");
            return vec![ExchangeEvent::Error(error.to_string())];
        }
    };

    let mut events = Vec::new();
    if let Some(citations) = chunk.citations {
        events.push(ExchangeEvent::Citations(
            citations.into_iter().map(Citation::from).collect(),
        ));
    }
    if let Some(text) = chunk.text.filter(|text| !text.is_empty()) {
        events.push(ExchangeEvent::Delta(text));
    }
    if let Some(message) = chunk.error {
        events.push(ExchangeEvent::Error(message));
    }
    events
}

impl From<CitationPayload> for Citation {
    fn from(payload: CitationPayload) -> Self {
        Self {
            title: payload.title,
            filename: payload.filename,
            category: payload.category,
            upload_date: payload.upload_date,
            page_number: payload.page_number.map(|page| match page {
                PageNumber::Number(page) => PageRef::Number(page),
                PageNumber::Label(label) => PageRef::Label(label),
            }),
            extract: payload.extract,
        }
    }
}

use std::collections::VecDeque;
use std::time::Duration;

use futures::stream::{BoxStream, StreamExt};
use reqwest::multipart::{Form, Part};
use reqwest::{RequestBuilder, Response};
use serde::de::DeserializeOwned;
use snafu::ResultExt;

use super::error::{
    ApiError, ApiResult, AttachmentPartSnafu, BuildClientSnafu, DecodeSnafu, StatusSnafu,
    StreamEventSnafu, TransportSnafu,
};
use super::sse::SseDecoder;
use super::types::{
    AnalyticRecord, AnswerPayload, AskRequest, Circular, CircularFilter, DeleteDocumentsRequest,
    FilePart, NewCircular, NewQuery, Notification, QueryRecord, StatusMessage, StreamChunk,
    UnreadCount, UploadedFile,
};

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

pub const CIRCULARS_PATH: &str = "/api/circulars";
pub const CIRCULAR_UPLOAD_PATH: &str = "/api/circulars/upload";
pub const UPLOAD_PATH: &str = "/api/upload";
pub const DOCUMENTS_PATH: &str = "/api/documents";
pub const QUERIES_PATH: &str = "/api/queries";
pub const ANALYTICS_PATH: &str = "/api/analytics";
pub const ASK_PATH: &str = "/api/ask";
pub const ASK_STREAM_PATH: &str = "/api/ask/stream";
pub const CHAT_PATH: &str = "/api/chat";
pub const NOTIFICATIONS_PATH: &str = "/api/notifications";
pub const UNREAD_COUNT_PATH: &str = "/api/notifications/unread-count";
pub const MARK_ALL_READ_PATH: &str = "/api/notifications/mark-all-read";

/// Which endpoint receives circular uploads; deployments expose one or the other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UploadRoute {
    #[default]
    Circulars,
    Generic,
}

impl UploadRoute {
    pub fn path(self) -> &'static str {
        match self {
            Self::Circulars => CIRCULAR_UPLOAD_PATH,
            Self::Generic => UPLOAD_PATH,
        }
    }
}

/// Typed client for the FinTech.AI REST backend.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> ApiResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context(BuildClientSnafu {
                stage: "api-client-build",
            })?;

        Ok(Self::with_http_client(http, base_url))
    }

    pub fn with_http_client(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim().trim_end_matches('/').to_string();
        Self { http, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn list_circulars(&self, filter: &CircularFilter) -> ApiResult<Vec<Circular>> {
        let request = self
            .http
            .get(self.url(CIRCULARS_PATH))
            .query(&filter.query_pairs());
        let response = self
            .send_checked(request, "circulars-list", CIRCULARS_PATH)
            .await?;
        decode_json(response, "circulars-list-decode", CIRCULARS_PATH).await
    }

    pub async fn create_circular(&self, circular: &NewCircular) -> ApiResult<Circular> {
        let request = self.http.post(self.url(CIRCULARS_PATH)).json(circular);
        let response = self
            .send_checked(request, "circulars-create", CIRCULARS_PATH)
            .await?;
        decode_json(response, "circulars-create-decode", CIRCULARS_PATH).await
    }

    pub async fn upload_circular(
        &self,
        route: UploadRoute,
        file: FilePart,
    ) -> ApiResult<UploadedFile> {
        let path = route.path();
        let form = Form::new().part("file", file_part(file, "circulars-upload-part")?);
        let request = self.http.post(self.url(path)).multipart(form);
        let response = self.send_checked(request, "circulars-upload", path).await?;
        decode_json(response, "circulars-upload-decode", path).await
    }

    pub async fn delete_documents(&self, ids: &[i64]) -> ApiResult<StatusMessage> {
        let request = self
            .http
            .delete(self.url(DOCUMENTS_PATH))
            .json(&DeleteDocumentsRequest { ids });
        let response = self
            .send_checked(request, "documents-delete", DOCUMENTS_PATH)
            .await?;
        decode_json(response, "documents-delete-decode", DOCUMENTS_PATH).await
    }

    pub async fn list_queries(&self) -> ApiResult<Vec<QueryRecord>> {
        let request = self.http.get(self.url(QUERIES_PATH));
        let response = self
            .send_checked(request, "queries-list", QUERIES_PATH)
            .await?;
        decode_json(response, "queries-list-decode", QUERIES_PATH).await
    }

    pub async fn create_query(&self, query: &str) -> ApiResult<QueryRecord> {
        let request = self
            .http
            .post(self.url(QUERIES_PATH))
            .json(&NewQuery { query });
        let response = self
            .send_checked(request, "queries-create", QUERIES_PATH)
            .await?;
        decode_json(response, "queries-create-decode", QUERIES_PATH).await
    }

    pub async fn list_analytics(&self) -> ApiResult<Vec<AnalyticRecord>> {
        let request = self.http.get(self.url(ANALYTICS_PATH));
        let response = self
            .send_checked(request, "analytics-list", ANALYTICS_PATH)
            .await?;
        decode_json(response, "analytics-list-decode", ANALYTICS_PATH).await
    }

    /// Text-only question against the retrieval backend.
    pub async fn ask(&self, question: &str) -> ApiResult<AnswerPayload> {
        let request = self
            .http
            .post(self.url(ASK_PATH))
            .json(&AskRequest { question });
        let response = self.send_checked(request, "ask", ASK_PATH).await?;
        decode_json(response, "ask-decode", ASK_PATH).await
    }

    /// Question with a file, sent as multipart `query` + `file`.
    pub async fn chat(&self, query: &str, file: FilePart) -> ApiResult<AnswerPayload> {
        let form = Form::new()
            .text("query", query.to_string())
            .part("file", file_part(file, "chat-part")?);
        let request = self.http.post(self.url(CHAT_PATH)).multipart(form);
        let response = self.send_checked(request, "chat", CHAT_PATH).await?;
        decode_json(response, "chat-decode", CHAT_PATH).await
    }

    /// Streams answer chunks from the server-sent-event endpoint.
    pub async fn ask_stream(
        &self,
        question: &str,
    ) -> ApiResult<BoxStream<'static, ApiResult<StreamChunk>>> {
        let request = self
            .http
            .post(self.url(ASK_STREAM_PATH))
            .json(&AskRequest { question });
        let response = self
            .send_checked(request, "ask-stream", ASK_STREAM_PATH)
            .await?;

        let state = ChunkStreamState {
            bytes: response
                .bytes_stream()
                .map(|chunk| chunk.map(|bytes| bytes.to_vec()))
                .boxed(),
            decoder: SseDecoder::new(),
            ready: VecDeque::new(),
            finished: false,
        };

        Ok(futures::stream::unfold(state, next_stream_chunk).boxed())
    }

    pub async fn list_notifications(&self) -> ApiResult<Vec<Notification>> {
        let request = self.http.get(self.url(NOTIFICATIONS_PATH));
        let response = self
            .send_checked(request, "notifications-list", NOTIFICATIONS_PATH)
            .await?;
        decode_json(response, "notifications-list-decode", NOTIFICATIONS_PATH).await
    }

    pub async fn unread_count(&self) -> ApiResult<u64> {
        let request = self.http.get(self.url(UNREAD_COUNT_PATH));
        let response = self
            .send_checked(request, "notifications-unread-count", UNREAD_COUNT_PATH)
            .await?;
        let count: UnreadCount = decode_json(
            response,
            "notifications-unread-count-decode",
            UNREAD_COUNT_PATH,
        )
        .await?;
        Ok(count.value())
    }

    pub async fn mark_notification_read(&self, id: i64) -> ApiResult<StatusMessage> {
        let path = format!("{NOTIFICATIONS_PATH}/{id}/mark-read");
        let request = self.http.post(self.url(&path));
        let response = self
            .send_checked(request, "notifications-mark-read", &path)
            .await?;
        decode_json(response, "notifications-mark-read-decode", &path).await
    }

    pub async fn mark_all_notifications_read(&self) -> ApiResult<StatusMessage> {
        let request = self.http.post(self.url(MARK_ALL_READ_PATH));
        let response = self
            .send_checked(request, "notifications-mark-all-read", MARK_ALL_READ_PATH)
            .await?;
        decode_json(
            response,
            "notifications-mark-all-read-decode",
            MARK_ALL_READ_PATH,
        )
        .await
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn send_checked(
        &self,
        request: RequestBuilder,
        stage: &'static str,
        path: &str,
    ) -> ApiResult<Response> {
        let response = request.send().await.context(TransportSnafu { stage, path })?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        tracing::warn!(path, status = status.as_u16(), "backend returned non-success status");
        StatusSnafu {
            stage,
            path,
            status: status.as_u16(),
            body,
        }
        .fail()
    }
}

async fn decode_json<T>(response: Response, stage: &'static str, path: &str) -> ApiResult<T>
where
    T: DeserializeOwned,
{
    let bytes = response
        .bytes()
        .await
        .context(TransportSnafu { stage, path })?;
    serde_json::from_slice(&bytes).context(DecodeSnafu { stage, path })
}

fn file_part(file: FilePart, stage: &'static str) -> ApiResult<Part> {
    let FilePart {
        file_name,
        mime_type,
        bytes,
    } = file;

    Part::bytes(bytes)
        .file_name(file_name.clone())
        .mime_str(&mime_type)
        .context(AttachmentPartSnafu { stage, file_name })
}

struct ChunkStreamState {
    bytes: BoxStream<'static, reqwest::Result<Vec<u8>>>,
    decoder: SseDecoder,
    ready: VecDeque<ApiResult<StreamChunk>>,
    finished: bool,
}

async fn next_stream_chunk(
    mut state: ChunkStreamState,
) -> Option<(ApiResult<StreamChunk>, ChunkStreamState)> {
    loop {
        if let Some(item) = state.ready.pop_front() {
            return Some((item, state));
        }

        if state.finished {
            return None;
        }

        match state.bytes.next().await {
            Some(Ok(chunk)) => {
                for data in state.decoder.push(&chunk) {
                    if data.trim() == STREAM_DONE_MARKER {
                        state.finished = true;
                        break;
                    }
                    state.ready.push_back(parse_stream_chunk(&data));
                }
            }
            Some(Err(source)) => {
                state.finished = true;
                state.ready.push_back(Err(ApiError::Transport {
                    stage: "ask-stream-read",
                    path: ASK_STREAM_PATH.to_string(),
                    source,
                }));
            }
            None => {
                state.finished = true;
                if let Some(data) = state
                    .decoder
                    .finish()
                    .filter(|data| data.trim() != STREAM_DONE_MARKER)
                {
                    state.ready.push_back(parse_stream_chunk(&data));
                }
            }
        }
    }
}

/// Upstream end-of-stream sentinel; nothing after it is read.
const STREAM_DONE_MARKER: &str = "[DONE]";

fn parse_stream_chunk(data: &str) -> ApiResult<StreamChunk> {
    serde_json::from_str(data).context(StreamEventSnafu {
        stage: "ask-stream-parse-event",
        path: ASK_STREAM_PATH,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    use axum::extract::{Multipart, Path, Query};
    use axum::http::StatusCode;
    use axum::routing::{get, post};
    use axum::{Json, Router};
    use serde_json::{Value, json};
    use std::collections::HashMap;

    async fn spawn_backend(router: Router) -> ApiClient {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let _ = axum::serve(listener, router).await;
        });

        ApiClient::new(format!("http://{address}/"), Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn ask_posts_question_and_reads_answer() {
        let router = Router::new().route(
            ASK_PATH,
            post(|Json(body): Json<Value>| async move {
                Json(json!({
                    "answer": format!("echo: {}", body["question"].as_str().unwrap_or_default()),
                    "citations": [{"title": "KYC", "page_number": 2}]
                }))
            }),
        );
        let client = spawn_backend(router).await;

        let (text, citations) = client.ask("kyc norms").await.unwrap().into_parts("none");

        assert_eq!(text, "echo: kyc norms");
        assert_eq!(citations.len(), 1);
        assert_eq!(citations[0].title, "KYC");
    }

    #[tokio::test]
    async fn chat_sends_query_and_file_as_multipart() {
        let router = Router::new().route(
            CHAT_PATH,
            post(|mut multipart: Multipart| async move {
                let mut fields = Vec::new();
                while let Ok(Some(field)) = multipart.next_field().await {
                    let name = field.name().unwrap_or_default().to_string();
                    let file_name = field.file_name().map(str::to_string);
                    let text = field.text().await.unwrap_or_default();
                    fields.push((name, file_name, text));
                }
                Json(json!({ "reply": format!("{fields:?}") }))
            }),
        );
        let client = spawn_backend(router).await;

        let payload = client
            .chat(
                "summarise",
                FilePart::new("circular.txt", "text/plain", b"repo rate".to_vec()),
            )
            .await
            .unwrap();
        let (text, _) = payload.into_parts("none");

        assert!(text.contains("\"query\", None, \"summarise\""));
        assert!(text.contains("\"file\", Some(\"circular.txt\"), \"repo rate\""));
    }

    #[tokio::test]
    async fn non_success_status_is_an_error() {
        let router = Router::new().route(
            ASK_PATH,
            post(|| async { (StatusCode::SERVICE_UNAVAILABLE, "AI services not available.") }),
        );
        let client = spawn_backend(router).await;

        let error = client.ask("anything").await.err();

        assert_eq!(error.as_ref().and_then(ApiError::status), Some(503));
    }

    #[tokio::test]
    async fn unreachable_backend_is_a_transport_error() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap();
        drop(listener);
        let client = ApiClient::new(format!("http://{address}"), Duration::from_secs(2)).unwrap();

        let error = client.ask("anything").await.err();

        assert!(matches!(error, Some(ApiError::Transport { .. })));
    }

    #[tokio::test]
    async fn ask_stream_yields_chunks_in_order() {
        let router = Router::new().route(
            ASK_STREAM_PATH,
            post(|| async {
                (
                    [("content-type", "text/event-stream")],
                    "data: {\"citations\": []}\n\ndata: {\"text\": \"Repo \"}\n\ndata: {\"text\": \"rate\"}\n\n",
                )
            }),
        );
        let client = spawn_backend(router).await;

        let chunks = client
            .ask_stream("repo rate")
            .await
            .unwrap()
            .collect::<Vec<_>>()
            .await
            .into_iter()
            .collect::<ApiResult<Vec<_>>>()
            .unwrap();

        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].citations, Some(Vec::new()));
        assert_eq!(chunks[1].text.as_deref(), Some("Repo "));
        assert_eq!(chunks[2].text.as_deref(), Some("rate"));
    }

    #[tokio::test]
    async fn ask_stream_stops_at_done_marker() {
        let router = Router::new().route(
            ASK_STREAM_PATH,
            post(|| async {
                (
                    [("content-type", "text/event-stream")],
                    "data: {\"text\": \"CRR\"}\n\ndata: [DONE]\n\ndata: not json\n\n",
                )
            }),
        );
        let client = spawn_backend(router).await;

        let chunks = client
            .ask_stream("crr")
            .await
            .unwrap()
            .collect::<Vec<_>>()
            .await;

        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].as_ref().unwrap().text.as_deref(), Some("CRR"));
    }

    #[tokio::test]
    async fn circular_filters_become_query_parameters() {
        let router = Router::new().route(
            CIRCULARS_PATH,
            get(|Query(params): Query<HashMap<String, String>>| async move {
                Json(json!([{
                    "id": 1,
                    "title": params.get("search").cloned().unwrap_or_default(),
                    "category": params.get("category").cloned().unwrap_or_default(),
                    "fileUrl": null
                }]))
            }),
        );
        let client = spawn_backend(router).await;

        let circulars = client
            .list_circulars(&CircularFilter {
                search: Some("kyc".to_string()),
                category: Some("Banking".to_string()),
            })
            .await
            .unwrap();

        assert_eq!(circulars.len(), 1);
        assert_eq!(circulars[0].title, "kyc");
        assert_eq!(circulars[0].category, "Banking");
    }

    #[tokio::test]
    async fn notification_endpoints_round_trip() {
        let router = Router::new()
            .route(
                UNREAD_COUNT_PATH,
                get(|| async { Json(json!({ "count": 4 })) }),
            )
            .route(
                "/api/notifications/{id}/mark-read",
                post(|Path(id): Path<i64>| async move {
                    Json(json!({ "message": format!("marked {id}") }))
                }),
            )
            .route(
                DOCUMENTS_PATH,
                axum::routing::delete(|Json(body): Json<Value>| async move {
                    Json(json!({ "message": format!("deleted {}", body["ids"]) }))
                }),
            );
        let client = spawn_backend(router).await;

        assert_eq!(client.unread_count().await.unwrap(), 4);
        assert_eq!(
            client.mark_notification_read(9).await.unwrap().message,
            "marked 9"
        );
        assert_eq!(
            client.delete_documents(&[1, 2]).await.unwrap().message,
            "deleted [1,2]"
        );
    }
}

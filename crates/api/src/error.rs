use snafu::Snafu;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum ApiError {
    #[snafu(display("failed to build http client on `{stage}`: {source}"))]
    BuildClient {
        stage: &'static str,
        source: reqwest::Error,
    },
    #[snafu(display("invalid attachment '{file_name}' on `{stage}`: {source}"))]
    AttachmentPart {
        stage: &'static str,
        file_name: String,
        source: reqwest::Error,
    },
    #[snafu(display("request to {path} failed on `{stage}`: {source}"))]
    Transport {
        stage: &'static str,
        path: String,
        source: reqwest::Error,
    },
    #[snafu(display("{path} returned status {status}: {body}"))]
    Status {
        stage: &'static str,
        path: String,
        status: u16,
        body: String,
    },
    #[snafu(display("failed to decode response from {path} on `{stage}`: {source}"))]
    Decode {
        stage: &'static str,
        path: String,
        source: serde_json::Error,
    },
    #[snafu(display("malformed stream event from {path}: {source}"))]
    StreamEvent {
        stage: &'static str,
        path: String,
        source: serde_json::Error,
    },
}

impl ApiError {
    /// Returns the HTTP status for non-success responses.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

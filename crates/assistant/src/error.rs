use fintech_api::ApiError;
use snafu::Snafu;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum ExchangeError {
    #[snafu(display("answer request failed on `{stage}`: {source}"))]
    Backend {
        stage: &'static str,
        source: ApiError,
    },
    #[snafu(display("answer service is unavailable on `{stage}`: {details}"))]
    Unavailable {
        stage: &'static str,
        details: String,
    },
}

pub type ExchangeResult<T> = Result<T, ExchangeError>;

/// Why a submit was refused. Rejections never mutate session state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SubmitRejection {
    /// Neither text nor an attachment was supplied.
    Empty,
    /// The conversation still waits on an earlier reply.
    InFlight,
    NoActiveConversation,
}

impl std::fmt::Display for SubmitRejection {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let reason = match self {
            Self::Empty => "nothing to send",
            Self::InFlight => "a reply is still pending in this conversation",
            Self::NoActiveConversation => "no conversation is active",
        };
        formatter.write_str(reason)
    }
}

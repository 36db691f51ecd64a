pub mod backend;
pub mod commands;
pub mod error;
pub mod settings;
pub mod shell;

use std::sync::Arc;

use fintech_api::{ApiClient, UnreadPoller};
use fintech_assistant::{AssistantSession, HttpAnswerService, SessionOptions};
use fintech_storage::SnapshotStore;
use snafu::ResultExt;
use tokio::io::BufReader;

pub use error::{AppError, AppResult};
pub use settings::{AppSettings, SettingsStore, StorageBackend};
pub use shell::Shell;

/// Loads settings and history, then runs the interactive shell on stdin/stdout.
pub async fn run() -> AppResult<()> {
    let settings_store = SettingsStore::load();
    let settings = settings_store.settings();

    let store = backend::open_key_value_store(&settings).await?;
    let session = AssistantSession::open(
        SnapshotStore::new(store),
        SessionOptions {
            narrow_viewport_width: settings.narrow_viewport_width,
            ..SessionOptions::default()
        },
    );

    let client = ApiClient::new(settings.api_base_url.clone(), settings.request_timeout())
        .context(error::BackendClientSnafu {
            stage: "build-http-client",
        })?;
    tracing::info!(base_url = client.base_url(), "backend client ready");

    let service = Arc::new(HttpAnswerService::new(client.clone()));
    let mut shell = Shell::new(
        session,
        service,
        client.clone(),
        settings_store.clone(),
        std::io::stdout(),
    );

    let poller = settings
        .notification_poll_interval()
        .map(|every| UnreadPoller::spawn(client, every));
    if let Some(poller) = &poller {
        shell = shell.with_unread_count(poller.subscribe());
    }

    let result = shell.run(BufReader::new(tokio::io::stdin())).await;
    drop(poller);
    result
}

use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;

use super::client::ApiClient;

/// Periodically refreshes the unread-notification count.
///
/// Subscribers see the latest successful value; a failed poll keeps the previous one.
pub struct UnreadPoller {
    receiver: watch::Receiver<u64>,
    task: JoinHandle<()>,
}

impl UnreadPoller {
    /// Starts polling on the current tokio runtime. The first poll runs immediately.
    pub fn spawn(client: ApiClient, every: Duration) -> Self {
        let (sender, receiver) = watch::channel(0);
        let task = tokio::spawn(poll_unread(client, every, sender));
        Self { receiver, task }
    }

    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.receiver.clone()
    }

    pub fn current(&self) -> u64 {
        *self.receiver.borrow()
    }
}

impl Drop for UnreadPoller {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn poll_unread(client: ApiClient, every: Duration, sender: watch::Sender<u64>) {
    let mut ticker = tokio::time::interval(every);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;
        match client.unread_count().await {
            Ok(count) => {
                sender.send_if_modified(|current| {
                    if *current == count {
                        return false;
                    }
                    *current = count;
                    true
                });
            }
            Err(error) => {
                tracing::warn!(%error, "unread notification poll failed; keeping previous count");
            }
        }

        if sender.is_closed() {
            tracing::debug!("unread notification poller has no subscribers; stopping");
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use axum::http::StatusCode;
    use axum::routing::get;
    use axum::{Json, Router};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn failed_poll_keeps_previous_count() {
        let calls = Arc::new(AtomicUsize::new(0));
        let router = Router::new().route(
            crate::client::UNREAD_COUNT_PATH,
            get({
                let calls = Arc::clone(&calls);
                move || {
                    let call = calls.fetch_add(1, Ordering::SeqCst);
                    async move {
                        if call == 0 {
                            Ok(Json(serde_json::json!({ "count": 3 })))
                        } else {
                            Err(StatusCode::INTERNAL_SERVER_ERROR)
                        }
                    }
                }
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let _ = axum::serve(listener, router).await;
        });
        let client = ApiClient::new(format!("http://{address}"), Duration::from_secs(2)).unwrap();

        let poller = UnreadPoller::spawn(client, Duration::from_millis(20));
        let mut updates = poller.subscribe();
        tokio::time::timeout(Duration::from_secs(2), updates.wait_for(|count| *count == 3))
            .await
            .unwrap()
            .unwrap();

        while calls.load(Ordering::SeqCst) < 3 {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }

        assert_eq!(poller.current(), 3);
    }
}

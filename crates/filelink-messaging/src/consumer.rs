//! Inbound message dispatch
//!
//! The dispatch loop drains a messenger subscription and hands every message to a
//! `MessageConsumer` on its own task, so slow uploads never hold up the next message.

use async_trait::async_trait;
use futures::StreamExt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

use crate::traits::Messenger;
use crate::types::Message;

const MAX_BACKOFF_SECS: u64 = 60;

/// Result of handing a message to a consumer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handled {
    /// The consumer acted on the message (including replying with an error).
    Processed,
    /// The message was not addressed to the consumer.
    Ignored,
}

/// Receives inbound messages from the dispatch loop.
#[async_trait]
pub trait MessageConsumer: Send + Sync {
    async fn on_message(&self, message: Message) -> Handled;
}

/// Capped exponential backoff: 1s, 2s, 4s ... up to one minute.
pub fn compute_backoff(consecutive_failures: u32) -> Duration {
    let exp = consecutive_failures.saturating_sub(1).min(6);
    Duration::from_secs((1u64 << exp).min(MAX_BACKOFF_SECS))
}

/// Sleep for `delay` unless shutdown is signalled first. Returns `true` on shutdown.
async fn sleep_or_shutdown(delay: Duration, shutdown: &mut watch::Receiver<bool>) -> bool {
    tokio::select! {
        _ = tokio::time::sleep(delay) => false,
        changed = shutdown.changed() => changed.is_err() || *shutdown.borrow(),
    }
}

/// Drive `consumer` from `messenger`'s inbound stream until `shutdown` flips to `true`.
///
/// Each message is handled on a spawned task. Subscription and stream errors are
/// logged and retried with backoff; the loop itself never fails.
pub async fn run_dispatch_loop(
    messenger: Arc<dyn Messenger>,
    consumer: Arc<dyn MessageConsumer>,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut failures: u32 = 0;

    'subscribe: loop {
        if *shutdown.borrow() {
            break;
        }

        let mut stream = match messenger.subscribe().await {
            Ok(stream) => stream,
            Err(e) => {
                failures = failures.saturating_add(1);
                let delay = compute_backoff(failures);
                tracing::warn!(
                    error = %e,
                    retry_in_secs = delay.as_secs(),
                    "Failed to subscribe to inbound messages"
                );
                if sleep_or_shutdown(delay, &mut shutdown).await {
                    break;
                }
                continue;
            }
        };

        tracing::info!(
            backend = %messenger.backend_type(),
            "Subscribed to inbound messages"
        );

        loop {
            let next = tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break 'subscribe;
                    }
                    continue;
                }
                next = stream.next() => next,
            };

            match next {
                Some(Ok(message)) => {
                    failures = 0;
                    let consumer = consumer.clone();
                    tokio::spawn(async move {
                        let chat_id = message.chat_id;
                        let message_id = message.id;
                        let handled = consumer.on_message(message).await;
                        tracing::debug!(
                            chat_id = %chat_id,
                            message_id = %message_id,
                            handled = ?handled,
                            "Inbound message handled"
                        );
                    });
                }
                Some(Err(e)) => {
                    failures = failures.saturating_add(1);
                    let delay = compute_backoff(failures);
                    tracing::warn!(
                        error = %e,
                        retry_in_secs = delay.as_secs(),
                        "Inbound stream error"
                    );
                    if sleep_or_shutdown(delay, &mut shutdown).await {
                        break 'subscribe;
                    }
                }
                None => {
                    tracing::warn!("Inbound stream ended, resubscribing");
                    failures = failures.saturating_add(1);
                    if sleep_or_shutdown(compute_backoff(failures), &mut shutdown).await {
                        break 'subscribe;
                    }
                    continue 'subscribe;
                }
            }
        }
    }

    tracing::info!("Dispatch loop stopped");
}

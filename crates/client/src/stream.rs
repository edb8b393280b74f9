//! Bridge from a server stream to a pull-based channel.

use common::ProductStream;
use domain::Product;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::error::{ClientError, Result};

/// Receiving end handed to the caller of `stream_products`.
pub type ProductReceiver = mpsc::Receiver<Result<Product>>;

/// Spawns the task that owns `stream` and forwards its items into a channel.
///
/// The channel holds a single item, so the task runs at most one message
/// ahead of the consumer. The task is the only caller of `receive` and
/// `close`; on every exit path it closes the stream first and then the
/// channel.
pub(crate) fn spawn_bridge(
    stream: ProductStream,
    cancel: CancellationToken,
) -> (ProductReceiver, JoinHandle<()>) {
    let (items, receiver) = mpsc::channel(1);
    let handle = tokio::spawn(forward(stream, items, cancel));
    (receiver, handle)
}

async fn forward(
    mut stream: ProductStream,
    items: mpsc::Sender<Result<Product>>,
    cancel: CancellationToken,
) {
    let mut delivered = 0u64;

    loop {
        let message = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                tracing::debug!(delivered, "product stream cancelled while receiving");
                break;
            }
            message = stream.receive() => message,
        };

        let item = match message {
            None => break,
            Some(Ok(dto)) => Product::try_from(&dto).map_err(ClientError::from),
            Some(Err(status)) => Err(ClientError::from(status)),
        };
        let terminal = item.is_err();

        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                tracing::debug!(delivered, "product stream cancelled while sending");
                break;
            }
            sent = items.send(item) => {
                if sent.is_err() {
                    tracing::debug!(delivered, "product receiver dropped");
                    break;
                }
            }
        }

        if terminal {
            tracing::warn!(delivered, "product stream ended with an error");
            break;
        }
        delivered += 1;
        metrics::counter!("client_stream_items_total").increment(1);
    }

    if let Err(status) = stream.close().await {
        tracing::warn!(error = %status, "failed to close product stream");
    }
    drop(items);
    tracing::debug!(delivered, "product stream bridge finished");
}

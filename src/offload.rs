use futures::Future;
use log::{ debug, warn };
use std::pin::Pin;
use std::sync::Arc;
use std::task::{ Context, Poll };
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use crate::llm::chat::{ respond, ChatClient };

pub const CANCELLED_REPLY: &str = "Error: request was cancelled";

/// A finished exchange, handed back to the presentation loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    pub request: String,
    pub response: String,
}

/// Handle to one in-flight completion. Resolves exactly once; if the worker
/// dies before answering the delivery carries [`CANCELLED_REPLY`].
pub struct PendingReply {
    request: String,
    receiver: oneshot::Receiver<String>,
    handle: JoinHandle<()>,
}

impl PendingReply {
    pub fn abort(&self) {
        self.handle.abort();
    }
}

impl Future for PendingReply {
    type Output = Delivery;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        match Pin::new(&mut this.receiver).poll(cx) {
            Poll::Pending => Poll::Pending,
            Poll::Ready(result) => {
                let response = result.unwrap_or_else(|_| {
                    warn!("Worker for '{}' ended without a reply", this.request);
                    CANCELLED_REPLY.to_string()
                });
                Poll::Ready(Delivery {
                    request: std::mem::take(&mut this.request),
                    response,
                })
            }
        }
    }
}

/// Runs the completion call on its own task so the caller never waits on
/// the network.
pub fn submit(client: Arc<dyn ChatClient>, message: String) -> PendingReply {
    let (tx, rx) = oneshot::channel();
    let request = message.clone();
    let handle = tokio::spawn(async move {
        let reply = respond(client.as_ref(), &message).await;
        if tx.send(reply).is_err() {
            debug!("Reply for '{}' dropped: receiver gone", message);
        }
    });

    PendingReply {
        request,
        receiver: rx,
        handle,
    }
}

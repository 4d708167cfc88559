use std::collections::HashMap;
use std::panic::{AssertUnwindSafe, catch_unwind};

use futures::future::BoxFuture;
use log::{debug, error, warn};
use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, oneshot};

use crate::error::ChannelError;

/// Action tag of the transcript request
pub const GET_TRANSCRIPT: &str = "get_transcript";

const CHANNEL_CAPACITY: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Request {
    GetTranscript,
}

impl Request {
    pub fn action(&self) -> &'static str {
        match self {
            Request::GetTranscript => GET_TRANSCRIPT,
        }
    }
}

/// Wire reply: `{success: true, transcript}` or `{success: false, error}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reply {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transcript: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Reply {
    pub fn transcript(text: impl Into<String>) -> Self {
        Self {
            success: true,
            transcript: Some(text.into()),
            error: None,
        }
    }

    pub fn error(reason: impl Into<String>) -> Self {
        Self {
            success: false,
            transcript: None,
            error: Some(reason.into()),
        }
    }

    /// Transcript on success, otherwise the reason
    pub fn into_result(self) -> Result<String, String> {
        match (self.success, self.transcript, self.error) {
            (true, Some(t), _) if !t.is_empty() => Ok(t),
            (_, _, Some(e)) => Err(e),
            _ => Err("Transcript not available or could not be fetched.".to_string()),
        }
    }
}

/// One-shot reply slot for a single request.
///
/// Requests are JSON objects tagged by `action`, routed to the handler
/// registered for that action. Every request gets exactly one reply: `send`
/// consumes the responder, and a responder dropped without sending (handler
/// error, early return, panic) delivers a failure reply from `Drop`.
pub struct Responder {
    tx: Option<oneshot::Sender<Reply>>,
    action: String,
}

impl Responder {
    fn new(tx: oneshot::Sender<Reply>, action: &str) -> Self {
        Self {
            tx: Some(tx),
            action: action.to_string(),
        }
    }

    pub fn send(mut self, reply: Reply) {
        if let Some(tx) = self.tx.take() {
            if tx.send(reply).is_err() {
                debug!("Caller stopped waiting for {} reply", self.action);
            }
        }
    }
}

impl Drop for Responder {
    fn drop(&mut self) {
        if let Some(tx) = self.tx.take() {
            warn!("Handler for {} finished without replying", self.action);
            let _ = tx.send(Reply::error(format!("no response from {} handler", self.action)));
        }
    }
}

/// How a handler completed
pub enum Handled {
    /// The responder was used (or dropped) before returning
    Immediate,
    /// The reply will be sent when this future runs
    Deferred(BoxFuture<'static, ()>),
}

type Handler = Box<dyn Fn(Request, Responder) -> Handled + Send + Sync>;

/// Page-side dispatch table keyed by action tag
#[derive(Default)]
pub struct MessageRouter {
    handlers: HashMap<&'static str, Handler>,
}

impl MessageRouter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on<H>(&mut self, action: &'static str, handler: H) -> &mut Self
    where
        H: Fn(Request, Responder) -> Handled + Send + Sync + 'static,
    {
        self.handlers.insert(action, Box::new(handler));
        self
    }

    fn dispatch(&self, message: serde_json::Value, responder: Responder) -> Handled {
        let Some(action) = message.get("action").and_then(|a| a.as_str()).map(str::to_string) else {
            responder.send(Reply::error("message has no action"));
            return Handled::Immediate;
        };

        let Some(handler) = self.handlers.get(action.as_str()) else {
            debug!("No handler for action {action}");
            responder.send(Reply::error(format!("unknown action: {action}")));
            return Handled::Immediate;
        };

        let request = match serde_json::from_value::<Request>(message) {
            Ok(r) => r,
            Err(e) => {
                responder.send(Reply::error(format!("invalid {action} message: {e}")));
                return Handled::Immediate;
            }
        };

        debug!("Received {action} message");
        handler(request, responder)
    }
}

struct Envelope {
    message: serde_json::Value,
    reply: oneshot::Sender<Reply>,
}

/// Popup-side handle for talking to a page
#[derive(Clone)]
pub struct PageHandle {
    tx: mpsc::Sender<Envelope>,
}

impl PageHandle {
    /// A handle to a page with no listener attached
    pub fn disconnected() -> Self {
        let (tx, _) = mpsc::channel(1);
        Self { tx }
    }

    pub async fn send_message(&self, request: &Request) -> Result<Reply, ChannelError> {
        debug!("Sending {} message", request.action());
        let message = serde_json::to_value(request).map_err(|e| ChannelError::InvalidMessage(e.to_string()))?;
        self.send_raw(message).await
    }

    pub async fn send_raw(&self, message: serde_json::Value) -> Result<Reply, ChannelError> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(Envelope { message, reply })
            .await
            .map_err(|_| ChannelError::NotConnected)?;
        rx.await.map_err(|_| ChannelError::NoResponse)
    }
}

/// Attach a listener to the page. Each request is dispatched on its own, and
/// deferred replies run as independent tasks.
pub fn listen(router: MessageRouter) -> PageHandle {
    let (tx, mut rx) = mpsc::channel::<Envelope>(CHANNEL_CAPACITY);

    tokio::spawn(async move {
        while let Some(Envelope { message, reply }) = rx.recv().await {
            let action = message
                .get("action")
                .and_then(|a| a.as_str())
                .unwrap_or("<none>")
                .to_string();
            let responder = Responder::new(reply, &action);

            match catch_unwind(AssertUnwindSafe(|| router.dispatch(message, responder))) {
                Ok(Handled::Immediate) => {}
                Ok(Handled::Deferred(fut)) => {
                    tokio::spawn(fut);
                }
                Err(_) => error!("Handler for {action} panicked"),
            }
        }
        debug!("Page listener stopped");
    });

    PageHandle { tx }
}

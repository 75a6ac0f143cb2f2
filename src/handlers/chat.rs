use crate::handlers::AppState;
use crate::models::{CompletePayload, InboundMessage, SendOutcome};
use axum::{
    extract::State,
    response::{
        sse::{Event, KeepAlive, Sse},
        Json,
    },
};
use futures_util::{Stream, StreamExt};
use std::convert::Infallible;
use tokio_stream::wrappers::{errors::BroadcastStreamRecvError, BroadcastStream};

/// Envelope endpoint. The acknowledgement resolves when the turn finishes;
/// fatal turn errors ride the ack as `{success:false, error}` and never
/// crash the process. Streamed events go out on `/events` meanwhile.
pub async fn message(
    State(state): State<AppState>,
    Json(envelope): Json<InboundMessage>,
) -> Json<SendOutcome> {
    match envelope {
        InboundMessage::ChatRequest { message } => {
            if message.trim().is_empty() {
                return Json(SendOutcome::err("Message cannot be empty"));
            }
            match state.manager.send_message(&message).await {
                Ok(()) => Json(SendOutcome::ok("Streaming started")),
                Err(e) => {
                    tracing::error!("chat turn failed: {}", e);
                    Json(SendOutcome::err(e.to_string()))
                }
            }
        }
        InboundMessage::NewConversation => {
            state.manager.reset();
            Json(SendOutcome::ok("Conversation reset"))
        }
    }
}

/// Notification feed. Events are published to whichever subscriber is
/// attached at emission time; request origin and delivery destination may
/// diverge.
pub async fn events(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let receiver = state.manager.subscribe();

    let stream = BroadcastStream::new(receiver).filter_map(|event| async move {
        match event {
            Ok(event) => match serde_json::to_string(&event) {
                Ok(data) => Some(Ok(Event::default().data(data))),
                Err(e) => {
                    tracing::error!("failed to serialize outbound event: {}", e);
                    None
                }
            },
            Err(BroadcastStreamRecvError::Lagged(skipped)) => {
                tracing::warn!("event subscriber lagged, skipped {} events", skipped);
                None
            }
        }
    });

    Sse::new(stream).keep_alive(KeepAlive::default())
}

/// Current transcript snapshot.
pub async fn conversation(State(state): State<AppState>) -> Json<CompletePayload> {
    let snapshot = state.manager.snapshot();
    Json(CompletePayload {
        messages: snapshot.messages,
        conversation_id: snapshot.conversation_id,
    })
}

use crate::error::RelayResult;
use crate::models::{
    ChatMessage, CompletePayload, ConversationEvent, MessageContent, MessagesPayload,
    OutboundEvent, Role,
};
use crate::services::chatgpt_client::ChatGptClient;
use crate::services::content::normalize;
use crate::services::sse::parse_sse_response;
use crate::utils::new_message_id;
use parking_lot::RwLock;
use tokio::sync::broadcast;

const STREAM_COMPLETE_MARKER: &str = "message_stream_complete";
const DONE_SENTINEL: &str = "[DONE]";

/// In-memory conversation state. `pending_text` is non-empty only strictly
/// between a request being sent and its completion marker arriving.
#[derive(Debug, Clone)]
pub struct ConversationState {
    pub conversation_id: Option<String>,
    pub messages: Vec<ChatMessage>,
    pub pending_text: String,
}

impl ConversationState {
    fn new() -> Self {
        Self {
            conversation_id: None,
            messages: Vec::new(),
            pending_text: String::new(),
        }
    }
}

/// Owns conversation identity and transcript, issues backend calls, and
/// folds streamed deltas into running state.
///
/// One manager per process. Overlapping `send_message` calls are not
/// guarded; callers are expected to disable input while a turn is in
/// flight.
pub struct ConversationManager {
    client: ChatGptClient,
    state: RwLock<ConversationState>,
    events: broadcast::Sender<OutboundEvent>,
}

impl ConversationManager {
    pub fn new(client: ChatGptClient) -> Self {
        let (events, _) = broadcast::channel(64);
        Self {
            client,
            state: RwLock::new(ConversationState::new()),
            events,
        }
    }

    /// Handle for the notification feed. Events reach whichever subscriber
    /// is attached at emission time, which may not be the surface that
    /// issued the originating request.
    pub fn subscribe(&self) -> broadcast::Receiver<OutboundEvent> {
        self.events.subscribe()
    }

    pub fn snapshot(&self) -> ConversationState {
        self.state.read().clone()
    }

    /// Drop the transcript and conversation identity, from any state. Used
    /// for explicit "new chat" requests and stale-session invalidation.
    pub fn reset(&self) {
        *self.state.write() = ConversationState::new();
    }

    /// Run one full turn: optimistic transcript append, credential fan-out,
    /// backend call, stream folding. A fatal error leaves the optimistic
    /// user message in place; no rollback exists.
    pub async fn send_message(&self, text: &str) -> RelayResult<()> {
        let user_message = ChatMessage {
            id: new_message_id(),
            role: Role::User,
            content: MessageContent::text(text),
        };

        let (conversation_id, parent_message_id, messages) = {
            let mut state = self.state.write();
            state.messages.push(user_message);
            state.pending_text.clear();
            let parent = state
                .messages
                .last()
                .map(|message| message.id.clone())
                .unwrap_or_else(new_message_id);
            (state.conversation_id.clone(), parent, state.messages.clone())
        };
        self.broadcast(OutboundEvent::UpdateMessages(MessagesPayload { messages }));

        let assistant_message_id = new_message_id();
        let response = self
            .client
            .send_message(
                text,
                &assistant_message_id,
                conversation_id.as_deref(),
                &parent_message_id,
            )
            .await?;

        let result = parse_sse_response(response, |payload| {
            if payload == DONE_SENTINEL {
                return;
            }
            if let Err(e) = self.apply_event(payload, &assistant_message_id) {
                // Malformed individual events are skipped, not fatal.
                tracing::warn!("skipping malformed stream event: {}", e);
            }
        })
        .await;

        // The turn is over either way; a partial reply that never saw its
        // completion marker is dropped rather than left dangling.
        self.state.write().pending_text.clear();
        result
    }

    /// Fold one decoded stream event into the running state.
    fn apply_event(&self, payload: &str, assistant_message_id: &str) -> RelayResult<()> {
        let event: ConversationEvent = serde_json::from_str(payload)?;

        if let Some(content) = event.message.as_ref().and_then(|m| m.content.as_ref()) {
            let normalized = normalize(content);
            if let Some(image) = &normalized.image {
                tracing::debug!(
                    asset = ?image.asset_pointer,
                    "image reply received, nothing to display in relay"
                );
            }
            if let Some(text) = normalized.text {
                if !text.is_empty() {
                    // The backend sends progressively longer text, not
                    // deltas; replacement is correct.
                    self.state.write().pending_text = text.clone();
                    self.broadcast(OutboundEvent::Chunk(text));
                }
            }
        }

        if event.event_type.as_deref() == Some(STREAM_COMPLETE_MARKER) {
            let (messages, conversation_id) = {
                let mut state = self.state.write();
                let reply = std::mem::take(&mut state.pending_text);
                state.messages.push(ChatMessage {
                    id: assistant_message_id.to_string(),
                    role: Role::Assistant,
                    content: MessageContent::text(reply),
                });
                if state.conversation_id.is_none() {
                    state.conversation_id = event.conversation_id.clone();
                }
                (state.messages.clone(), state.conversation_id.clone())
            };
            self.broadcast(OutboundEvent::Complete(CompletePayload {
                messages,
                conversation_id,
            }));
        }

        Ok(())
    }

    fn broadcast(&self, event: OutboundEvent) {
        // No subscriber attached is fine; the event is simply dropped.
        let _ = self.events.send(event);
    }
}

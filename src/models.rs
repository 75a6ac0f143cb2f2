use serde::{Deserialize, Serialize};

// ---- Transcript ----

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// Tagged content of a transcript message, matching the backend's payload
/// format (`content_type` plus ordered parts).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageContent {
    pub content_type: String,
    pub parts: Vec<String>,
}

impl MessageContent {
    pub fn text(part: impl Into<String>) -> Self {
        Self {
            content_type: "text".to_string(),
            parts: vec![part.into()],
        }
    }
}

/// Immutable once appended; `id` is the backend's message correlation key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: String,
    pub role: Role,
    pub content: MessageContent,
}

// ---- Sentinel requirements ----

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Requirements {
    /// Opaque requirements token, echoed back on the conversation call.
    pub token: Option<String>,
    pub arkose: Option<ArkoseRequirement>,
    pub proofofwork: Option<ProofOfWorkRequirement>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ArkoseRequirement {
    #[serde(default)]
    pub required: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProofOfWorkRequirement {
    #[serde(default)]
    pub required: bool,
    pub seed: Option<String>,
    pub difficulty: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SessionResponse {
    #[serde(rename = "accessToken")]
    pub access_token: Option<String>,
}

// ---- Arkose capture ----

/// Endpoint/form pair observed on the host page; overwritten on every
/// capture and replayed on each bot-token acquisition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArkoseCaptureRecord {
    pub url: String,
    pub form: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ArkoseTokenResponse {
    pub token: Option<String>,
}

// ---- Conversation wire format ----

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationRequest {
    pub action: String,
    pub messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<String>,
    pub parent_message_id: String,
    pub model: String,
}

/// One decoded event from the conversation stream.
#[derive(Debug, Clone, Deserialize)]
pub struct ConversationEvent {
    pub message: Option<EventMessage>,
    #[serde(rename = "type")]
    pub event_type: Option<String>,
    pub conversation_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EventMessage {
    pub content: Option<ResponseContent>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "content_type")]
pub enum ResponseContent {
    #[serde(rename = "text")]
    Text {
        #[serde(default)]
        parts: Vec<String>,
    },
    #[serde(rename = "code")]
    Code {
        #[serde(default)]
        text: String,
    },
    #[serde(rename = "multimodal_text")]
    MultimodalText {
        #[serde(default)]
        parts: Vec<MultimodalPart>,
    },
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "content_type")]
pub enum MultimodalPart {
    #[serde(rename = "image_asset_pointer")]
    ImageAssetPointer(ImagePointer),
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImagePointer {
    pub asset_pointer: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

// ---- Router envelopes ----

/// Requests from a UI surface to the relay.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum InboundMessage {
    #[serde(rename = "CHAT_REQUEST")]
    ChatRequest { message: String },
    #[serde(rename = "NEW_CONVERSATION")]
    NewConversation,
}

/// Fire-and-forget notifications, delivered to whichever surface is
/// subscribed at emission time. `Chunk` carries the full accumulated reply
/// so far: the contract is "replace displayed text", not "append".
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum OutboundEvent {
    #[serde(rename = "CHAT_RESPONSE_CHUNK")]
    Chunk(String),
    #[serde(rename = "CHAT_RESPONSE_COMPLETE")]
    Complete(CompletePayload),
    #[serde(rename = "UPDATE_MESSAGES")]
    UpdateMessages(MessagesPayload),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletePayload {
    pub messages: Vec<ChatMessage>,
    pub conversation_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessagesPayload {
    pub messages: Vec<ChatMessage>,
}

/// Acknowledgement for an inbound envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendOutcome {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SendOutcome {
    pub fn ok(data: impl Into<String>) -> Self {
        Self {
            success: true,
            data: Some(data.into()),
            error: None,
        }
    }

    pub fn err(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inbound_envelope_tags() {
        let parsed: InboundMessage =
            serde_json::from_str(r#"{"type":"CHAT_REQUEST","message":"2+2=?"}"#).unwrap();
        match parsed {
            InboundMessage::ChatRequest { message } => assert_eq!(message, "2+2=?"),
            other => panic!("unexpected envelope: {:?}", other),
        }

        let parsed: InboundMessage =
            serde_json::from_str(r#"{"type":"NEW_CONVERSATION"}"#).unwrap();
        assert!(matches!(parsed, InboundMessage::NewConversation));
    }

    #[test]
    fn test_outbound_event_shape() {
        let event = OutboundEvent::Chunk("partial".to_string());
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "CHAT_RESPONSE_CHUNK");
        assert_eq!(json["data"], "partial");
    }

    #[test]
    fn test_response_content_variants() {
        let text: ResponseContent =
            serde_json::from_str(r#"{"content_type":"text","parts":["hello"]}"#).unwrap();
        assert_eq!(
            text,
            ResponseContent::Text {
                parts: vec!["hello".to_string()]
            }
        );

        let code: ResponseContent =
            serde_json::from_str(r#"{"content_type":"code","text":"x=1"}"#).unwrap();
        assert_eq!(
            code,
            ResponseContent::Code {
                text: "x=1".to_string()
            }
        );

        let unknown: ResponseContent =
            serde_json::from_str(r#"{"content_type":"tether_browsing"}"#).unwrap();
        assert_eq!(unknown, ResponseContent::Unknown);
    }

    #[test]
    fn test_conversation_request_omits_absent_conversation_id() {
        let request = ConversationRequest {
            action: "next".to_string(),
            messages: vec![],
            conversation_id: None,
            parent_message_id: "parent".to_string(),
            model: "text-davinci-002-render-sha".to_string(),
        };
        let json = serde_json::to_value(&request).unwrap();
        assert!(json.get("conversation_id").is_none());
    }
}

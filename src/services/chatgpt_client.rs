use crate::config::{ChatGptConfig, Config};
use crate::error::{RelayError, RelayResult};
use crate::models::{ChatMessage, ConversationRequest, MessageContent, Role};
use crate::services::arkose::{ArkoseTokenProvider, CaptureStore};
use crate::services::auth::AuthProvider;
use crate::services::proof_of_work;
use std::sync::Arc;

/// Issues conversation calls against the ChatGPT web backend, gathering the
/// bearer credential, requirement manifest, anti-bot token and proof-of-work
/// answer a turn needs.
pub struct ChatGptClient {
    client: reqwest::Client,
    config: ChatGptConfig,
    auth: AuthProvider,
    arkose: ArkoseTokenProvider,
    capture: Arc<CaptureStore>,
}

impl ChatGptClient {
    pub fn new(config: &Config, capture: Arc<CaptureStore>) -> RelayResult<Self> {
        // The cookie jar stands in for the browser cookie store; cookies set
        // by the session call ride along on the conversation call. No
        // client-wide timeout: a conversation stream may stay open for as
        // long as the backend keeps producing.
        let client = reqwest::Client::builder()
            .cookie_store(true)
            .user_agent(config.chatgpt.user_agent.clone())
            .build()?;

        let auth = AuthProvider::new(
            client.clone(),
            config.chatgpt.base_url.clone(),
            std::time::Duration::from_secs(config.chatgpt.request_timeout_secs),
        );
        let arkose = ArkoseTokenProvider::new(
            client.clone(),
            config.chatgpt.arkose_req_params.clone(),
        );

        Ok(Self {
            client,
            config: config.chatgpt.clone(),
            auth,
            arkose,
            capture,
        })
    }

    /// Send one user message and return the streaming response.
    ///
    /// Auth failure is fatal for the turn. Requirement-manifest and
    /// anti-bot-token failures are tolerated; a required proof-of-work is
    /// not, and its search runs off the async executor.
    pub async fn send_message(
        &self,
        text: &str,
        message_id: &str,
        conversation_id: Option<&str>,
        parent_message_id: &str,
    ) -> RelayResult<reqwest::Response> {
        let access_token = self.auth.get_access_token().await?;

        let (requirements, arkose_token) = tokio::join!(
            self.auth.get_requirements(&access_token),
            self.arkose.get_token_from(&self.capture),
        );
        let requirements = match requirements {
            Ok(requirements) => Some(requirements),
            Err(e) => {
                tracing::warn!("chat requirements unavailable, proceeding without: {}", e);
                None
            }
        };
        let arkose_token = match arkose_token {
            Ok(token) => Some(token),
            Err(e) => {
                tracing::warn!("arkose token unavailable, proceeding without: {}", e);
                None
            }
        };

        let mut proof_token = None;
        if let Some(pow) = requirements.as_ref().and_then(|r| r.proofofwork.as_ref()) {
            if pow.required {
                let seed = pow.seed.clone().unwrap_or_default();
                let difficulty = pow.difficulty.clone().unwrap_or_default();
                let user_agent = self.config.user_agent.clone();
                proof_token = Some(
                    tokio::task::spawn_blocking(move || {
                        proof_of_work::solve(&seed, &difficulty, &user_agent)
                    })
                    .await
                    .map_err(|e| {
                        RelayError::Internal(format!("proof-of-work task failed: {}", e))
                    })?,
                );
            }
        }

        let body = ConversationRequest {
            action: "next".to_string(),
            messages: vec![ChatMessage {
                id: message_id.to_string(),
                role: Role::User,
                content: MessageContent::text(text),
            }],
            conversation_id: conversation_id.map(str::to_string),
            parent_message_id: parent_message_id.to_string(),
            model: self.config.model.clone(),
        };

        let need_arkose = requirements
            .as_ref()
            .and_then(|r| r.arkose.as_ref())
            .map(|a| a.required)
            .unwrap_or(false);

        let mut request = self
            .client
            .post(format!("{}/backend-api/conversation", self.config.base_url))
            .bearer_auth(&access_token)
            .header("Oai-Language", "en-US");

        if let Some(device_id) = &self.config.device_id {
            request = request.header("Oai-Device-Id", device_id);
        }
        if need_arkose {
            if let Some(token) = &arkose_token {
                request = request.header("Openai-Sentinel-Arkose-Token", token);
            }
        }
        if let Some(token) = requirements.as_ref().and_then(|r| r.token.as_ref()) {
            request = request.header("Openai-Sentinel-Chat-Requirements-Token", token);
        }
        if let Some(token) = &proof_token {
            request = request.header("Openai-Sentinel-Proof-Token", token);
        }

        Ok(request.json(&body).send().await?)
    }
}

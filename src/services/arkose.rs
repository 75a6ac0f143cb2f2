use crate::error::{RelayError, RelayResult};
use crate::models::{ArkoseCaptureRecord, ArkoseTokenResponse};
use parking_lot::RwLock;

/// Last observed arkose challenge request. Overwritten on every capture,
/// read on every token acquisition, never explicitly deleted.
#[derive(Debug, Default)]
pub struct CaptureStore {
    record: RwLock<Option<ArkoseCaptureRecord>>,
}

impl CaptureStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, record: ArkoseCaptureRecord) {
        *self.record.write() = Some(record);
    }

    pub fn get(&self) -> Option<ArkoseCaptureRecord> {
        self.record.read().clone()
    }
}

/// Replays the captured browser-challenge request to obtain a short-lived
/// anti-bot token. No retry; the caller decides whether to proceed without
/// the token.
pub struct ArkoseTokenProvider {
    client: reqwest::Client,
    req_params: String,
}

impl ArkoseTokenProvider {
    pub fn new(client: reqwest::Client, req_params: String) -> Self {
        Self { client, req_params }
    }

    pub async fn get_token(&self, record: &ArkoseCaptureRecord) -> RelayResult<String> {
        let url = format!("{}?{}", record.url, self.req_params);
        let response = self
            .client
            .post(&url)
            .header(
                "Content-Type",
                "application/x-www-form-urlencoded; charset=UTF-8",
            )
            .body(record.form.clone())
            .send()
            .await
            .map_err(|e| RelayError::TokenFetchFailed(e.to_string()))?;

        let body: ArkoseTokenResponse = response
            .json()
            .await
            .map_err(|e| RelayError::TokenFetchFailed(e.to_string()))?;

        body.token
            .filter(|token| !token.is_empty())
            .ok_or_else(|| {
                RelayError::TokenFetchFailed(
                    "challenge response carried no token field".to_string(),
                )
            })
    }

    /// Acquire a token from the last capture, if one was ever recorded.
    pub async fn get_token_from(&self, store: &CaptureStore) -> RelayResult<String> {
        let record = store.get().ok_or_else(|| {
            RelayError::ConfigMissing(
                "no challenge request captured yet, log in at https://chatgpt.com first"
                    .to_string(),
            )
        })?;
        self.get_token(&record).await
    }
}

use crate::error::{RelayError, RelayResult};
use crate::models::{Requirements, SessionResponse};
use std::time::Duration;

/// Retrieves the bearer credential and the sentinel requirement manifest.
pub struct AuthProvider {
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl AuthProvider {
    pub fn new(client: reqwest::Client, base_url: String, timeout: Duration) -> Self {
        Self {
            client,
            base_url,
            timeout,
        }
    }

    /// Fetch the session access token.
    ///
    /// A 403 here means the edge/CDN refused us, not that the session is
    /// invalid; the two are surfaced as distinct errors.
    pub async fn get_access_token(&self) -> RelayResult<String> {
        let response = self
            .client
            .get(format!("{}/api/auth/session", self.base_url))
            .timeout(self.timeout)
            .send()
            .await?;

        if response.status().as_u16() == 403 {
            return Err(RelayError::BlockedByEdge);
        }

        let body: SessionResponse = response.json().await?;
        body.access_token
            .filter(|token| !token.is_empty())
            .ok_or(RelayError::Unauthenticated)
    }

    /// Fetch the chat requirement manifest. Failures are the caller's to
    /// tolerate (treated as "nothing required").
    pub async fn get_requirements(&self, access_token: &str) -> RelayResult<Requirements> {
        let response = self
            .client
            .post(format!(
                "{}/backend-api/sentinel/chat-requirements",
                self.base_url
            ))
            .bearer_auth(access_token)
            .timeout(self.timeout)
            .send()
            .await?;

        Ok(response.json().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider(base_url: String) -> AuthProvider {
        AuthProvider::new(reqwest::Client::new(), base_url, Duration::from_secs(15))
    }

    #[tokio::test]
    async fn test_get_access_token() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/api/auth/session")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"accessToken":"session-token","user":{"id":"u1"}}"#)
            .create_async()
            .await;

        let token = provider(server.url()).get_access_token().await.unwrap();

        assert_eq!(token, "session-token");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_edge_block_is_surfaced_verbatim() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/auth/session")
            .with_status(403)
            .create_async()
            .await;

        let result = provider(server.url()).get_access_token().await;

        assert!(matches!(result, Err(RelayError::BlockedByEdge)));
        assert_eq!(result.unwrap_err().to_string(), "CLOUDFLARE");
    }

    #[tokio::test]
    async fn test_missing_access_token_is_unauthenticated() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/auth/session")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"user":null}"#)
            .create_async()
            .await;

        let result = provider(server.url()).get_access_token().await;

        assert!(matches!(result, Err(RelayError::Unauthenticated)));
    }

    #[tokio::test]
    async fn test_slow_session_call_times_out() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/auth/session")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_chunked_body(|writer| {
                std::thread::sleep(Duration::from_millis(300));
                writer.write_all(br#"{"accessToken":"slow"}"#)
            })
            .create_async()
            .await;

        let slow = AuthProvider::new(
            reqwest::Client::new(),
            server.url(),
            Duration::from_millis(50),
        );
        let result = slow.get_access_token().await;

        match result {
            Err(RelayError::HttpRequest(e)) => assert!(e.is_timeout()),
            other => panic!("expected timeout, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_get_requirements_parses_manifest() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/backend-api/sentinel/chat-requirements")
            .match_header("authorization", "Bearer session-token")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{
                    "token": "req-token",
                    "arkose": {"required": true},
                    "proofofwork": {"required": true, "seed": "0.5", "difficulty": "0fffff"}
                }"#,
            )
            .create_async()
            .await;

        let requirements = provider(server.url())
            .get_requirements("session-token")
            .await
            .unwrap();

        assert_eq!(requirements.token.as_deref(), Some("req-token"));
        assert!(requirements.arkose.unwrap().required);
        let pow = requirements.proofofwork.unwrap();
        assert!(pow.required);
        assert_eq!(pow.seed.as_deref(), Some("0.5"));
        assert_eq!(pow.difficulty.as_deref(), Some("0fffff"));
    }
}

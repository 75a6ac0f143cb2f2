use crate::error::{RelayError, RelayResult};
use crate::utils::status_text;
use eventsource_stream::Eventsource;
use futures_util::StreamExt;

/// Decode a streamed response into discrete server-sent events, invoking
/// `on_message` synchronously with each non-empty payload in transport
/// arrival order. The literal `[DONE]` payload is forwarded like any other;
/// the caller special-cases it as "stream finished".
///
/// Returns `Http` if the response status indicates failure before streaming
/// begins, deriving the message from the body's `detail` field when the body
/// is JSON.
pub async fn parse_sse_response<F>(response: reqwest::Response, mut on_message: F) -> RelayResult<()>
where
    F: FnMut(&str),
{
    let status = response.status();
    if !status.is_success() {
        return Err(error_from_response(status.as_u16(), response).await);
    }

    let mut stream = response.bytes_stream().eventsource();
    while let Some(event) = stream.next().await {
        let event = event.map_err(|e| RelayError::StreamError(e.to_string()))?;
        if !event.data.is_empty() {
            on_message(&event.data);
        }
    }

    Ok(())
}

async fn error_from_response(status: u16, response: reqwest::Response) -> RelayError {
    let reason = response
        .status()
        .canonical_reason()
        .unwrap_or_else(|| status_text(status));
    let body = response.text().await.unwrap_or_default();

    let message = serde_json::from_str::<serde_json::Value>(&body)
        .ok()
        .and_then(|value| {
            if let Some(detail) = value.get("detail").and_then(|d| d.as_str()) {
                Some(detail.to_string())
            } else if value.as_object().map(|o| !o.is_empty()).unwrap_or(false) {
                Some(value.to_string())
            } else {
                None
            }
        })
        .unwrap_or_else(|| reason.to_string());

    RelayError::Http { status, message }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STREAM_BODY: &str = concat!(
        "data: {\"message\":\"first\"}\n\n",
        "data: {\"message\":\"second\"}\n\n",
        "data: [DONE]\n\n",
    );

    async fn collect_payloads(url: &str) -> RelayResult<Vec<String>> {
        let response = reqwest::get(url).await.unwrap();
        let mut payloads = Vec::new();
        parse_sse_response(response, |payload| payloads.push(payload.to_string())).await?;
        Ok(payloads)
    }

    #[tokio::test]
    async fn test_events_delivered_in_arrival_order() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/stream")
            .with_status(200)
            .with_header("content-type", "text/event-stream")
            .with_body(STREAM_BODY)
            .create_async()
            .await;

        let payloads = collect_payloads(&format!("{}/stream", server.url()))
            .await
            .unwrap();

        assert_eq!(
            payloads,
            vec![
                r#"{"message":"first"}"#.to_string(),
                r#"{"message":"second"}"#.to_string(),
                "[DONE]".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn test_parsing_is_idempotent_per_stream() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/stream")
            .with_status(200)
            .with_header("content-type", "text/event-stream")
            .with_body(STREAM_BODY)
            .expect(2)
            .create_async()
            .await;

        let url = format!("{}/stream", server.url());
        let first = collect_payloads(&url).await.unwrap();
        let second = collect_payloads(&url).await.unwrap();

        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_empty_payloads_are_skipped() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/stream")
            .with_status(200)
            .with_header("content-type", "text/event-stream")
            .with_body("data: \n\ndata: kept\n\n: comment only\n\n")
            .create_async()
            .await;

        let payloads = collect_payloads(&format!("{}/stream", server.url()))
            .await
            .unwrap();

        assert_eq!(payloads, vec!["kept".to_string()]);
    }

    #[tokio::test]
    async fn test_failure_status_uses_detail_from_body() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/stream")
            .with_status(429)
            .with_header("content-type", "application/json")
            .with_body(r#"{"detail":"rate limited"}"#)
            .create_async()
            .await;

        let result = collect_payloads(&format!("{}/stream", server.url())).await;

        match result {
            Err(RelayError::Http { status, message }) => {
                assert_eq!(status, 429);
                assert_eq!(message, "rate limited");
            }
            other => panic!("expected Http error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_failure_status_falls_back_to_status_text() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/stream")
            .with_status(403)
            .with_body("")
            .create_async()
            .await;

        let result = collect_payloads(&format!("{}/stream", server.url())).await;

        match result {
            Err(RelayError::Http { status, message }) => {
                assert_eq!(status, 403);
                assert_eq!(message, "Forbidden");
            }
            other => panic!("expected Http error, got {:?}", other),
        }
    }
}

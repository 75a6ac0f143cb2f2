use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

/// Unix timestamp (seconds)
pub fn unix_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

/// Generate a message correlation id.
pub fn new_message_id() -> String {
    Uuid::new_v4().to_string()
}

/// Fallback reason phrases for backend responses that omit one.
pub fn status_text(status: u16) -> &'static str {
    match status {
        400 => "Bad Request",
        401 => "Unauthorized",
        403 => "Forbidden",
        429 => "Too Many Requests",
        _ => "",
    }
}

pub mod arkose;
pub mod auth;
pub mod chatgpt_client;
pub mod content;
pub mod conversation;
pub mod proof_of_work;
pub mod sse;

pub use arkose::{ArkoseTokenProvider, CaptureStore};
pub use auth::AuthProvider;
pub use chatgpt_client::ChatGptClient;
pub use conversation::ConversationManager;

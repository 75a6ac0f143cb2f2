use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub environment: String,
    pub server: ServerConfig,
    pub chatgpt: ChatGptConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub cors_origins: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatGptConfig {
    pub base_url: String,
    pub model: String,
    pub user_agent: String,
    /// Value for the Oai-Device-Id header; the extension reads it from the
    /// host cookie store, we take it from the environment.
    pub device_id: Option<String>,
    /// Fixed query string appended to the captured arkose challenge URL.
    pub arkose_req_params: String,
    /// Timeout for the short credential calls (session, chat requirements).
    /// The conversation stream itself carries no timeout.
    pub request_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            environment: "development".to_string(),
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8000,
                cors_origins: vec!["*".to_string()],
            },
            chatgpt: ChatGptConfig {
                base_url: "https://chatgpt.com".to_string(),
                model: "text-davinci-002-render-sha".to_string(),
                user_agent: "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/134.0.0.0 Safari/537.36".to_string(),
                device_id: None,
                arkose_req_params: "public_key=35536E1E-65B4-4D96-9D97-6ADB7EFF8147".to_string(),
                request_timeout_secs: 15,
            },
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let mut config = Config::default();

        if let Ok(port) = env::var("PORT") {
            config.server.port = port.parse()?;
        }

        if let Ok(host) = env::var("HOST") {
            config.server.host = host;
        }

        if let Ok(env_type) = env::var("ENVIRONMENT") {
            config.environment = env_type;
        }

        if let Ok(base_url) = env::var("CHATGPT_BASE_URL") {
            config.chatgpt.base_url = base_url;
        }

        if let Ok(model) = env::var("CHATGPT_MODEL") {
            config.chatgpt.model = model;
        }

        if let Ok(device_id) = env::var("OAI_DEVICE_ID") {
            config.chatgpt.device_id = Some(device_id);
        }

        if let Ok(timeout) = env::var("CHATGPT_TIMEOUT_SECS") {
            config.chatgpt.request_timeout_secs = timeout.parse()?;
        }

        Ok(config)
    }
}

use anyhow::Result;
use colored::*;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod error;
mod handlers;
mod models;
mod services;
mod utils;

use config::Config;
use handlers::create_router;

#[tokio::main]
async fn main() -> Result<()> {
    init_logging()?;

    dotenv::dotenv().ok();
    let config = Config::load()?;

    println!("{}", "ChatGPT Free Relay".bright_green().bold());
    println!("Version: {}", env!("CARGO_PKG_VERSION"));
    println!("Environment: {}", config.environment);
    println!(
        "Relaying to: {}",
        config.chatgpt.base_url
    );

    let app = create_router(config.clone()).await?;

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    println!(
        "{}",
        format!("Server started on http://{}", addr)
            .bright_green()
            .bold()
    );

    axum::serve(listener, app).await?;

    Ok(())
}

fn init_logging() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "chatgpt_free_relay=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    Ok(())
}

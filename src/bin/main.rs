//! One-shot mesh request from the command line.
//!
//! Reads a `{type, payload}` document from the file given as the first
//! argument (or stdin) and prints the response as pretty JSON.

use productivity_mesh::{
    agent::{AgentClient, HttpAgentClient},
    config::MeshConfig,
    mesh::MeshService,
};
use std::sync::Arc;
use tokio::io::AsyncReadExt;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // logs go to stderr so stdout stays pipeable
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = MeshConfig::from_env();

    let raw = match std::env::args().nth(1) {
        Some(path) if path != "-" => tokio::fs::read_to_string(&path).await?,
        _ => {
            let mut buf = String::new();
            tokio::io::stdin().read_to_string(&mut buf).await?;
            buf
        }
    };
    let request: serde_json::Value = serde_json::from_str(&raw)?;

    let agent = HttpAgentClient::from_config(&config)?
        .map(|client| Arc::new(client) as Arc<dyn AgentClient>);
    let mesh = MeshService::new(agent, &config.default_currency);

    match mesh.dispatch(&request).await {
        Ok((response, source)) => {
            info!(source = source.as_str(), "Request answered");
            println!("{}", serde_json::to_string_pretty(&response)?);
            Ok(())
        }
        Err(e) => {
            eprintln!("Request failed: {}", e);
            Err(Box::new(e) as Box<dyn std::error::Error>)
        }
    }
}

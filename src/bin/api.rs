use productivity_mesh::{
    agent::{AgentClient, HttpAgentClient},
    api::start_server,
    config::MeshConfig,
    mesh::MeshService,
};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load .env + environment
    let config = MeshConfig::from_env();

    info!("🚀 Productivity Mesh - API Server");
    info!("📍 Port: {}", config.port);

    let agent: Option<Arc<dyn AgentClient>> = match HttpAgentClient::from_config(&config)? {
        Some(client) => {
            info!("🔗 Delegate agent: {}", client.endpoint());
            Some(Arc::new(client))
        }
        None => {
            warn!("MESH_AGENT_URL not set, answering with local engines only");
            None
        }
    };

    let mesh = Arc::new(MeshService::new(agent, &config.default_currency));

    info!("✅ Mesh initialized");
    info!("📡 Starting API server...");

    start_server(mesh, config.port).await?;

    Ok(())
}

// Escrow Insights - Web Server
// Serves the /api routes over the configured transaction history.

use anyhow::{Context, Result};
use escrow_insights::api::{router, AppState};
use escrow_insights::{init_logging, load_history, Config};

#[tokio::main]
async fn main() -> Result<()> {
    init_logging("info");

    let config = Config::load()?;

    let transactions = load_history(&config.history_path)
        .with_context(|| format!("Cannot serve without history at {:?}", config.history_path))?;
    let messages = config.message_topics()?;
    let failures = config.failure_reasons()?;

    tracing::info!(
        transactions = transactions.len(),
        message_categories = messages.len(),
        failure_categories = failures.len(),
        "state ready"
    );

    let app = router(AppState::new(transactions, messages, failures));

    let listener = tokio::net::TcpListener::bind(&config.server_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", config.server_addr))?;

    tracing::info!(addr = %config.server_addr, "server running");
    println!("\n🚀 Server running on http://{}", config.server_addr);
    println!("   API: http://{}/api/groups/messages", config.server_addr);
    println!("\n   Press Ctrl+C to stop\n");

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}

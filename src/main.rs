//! ITMO QA Agent - Command-Line Entry Point
//!
//! Reads one raw query from stdin (first line is the question, every
//! following line is an answer option) and prints the structured result as
//! JSON on stdout.

use itmo_qa_agent::{agent::Agent, config::Config};
use tokio::io::AsyncReadExt;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "itmo_qa_agent=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env()?;
    info!("Loaded configuration: model={}", config.model);

    let mut raw_query = String::new();
    tokio::io::stdin().read_to_string(&mut raw_query).await?;

    let agent = Agent::new(&config)?;

    // Fatal pipeline errors are logged in full but reported generically.
    match agent.answer(raw_query.trim_end()).await {
        Ok(result) => {
            println!("{}", serde_json::to_string_pretty(&result)?);
            Ok(())
        }
        Err(e) => {
            error!("pipeline failed: {}", e);
            eprintln!("error: query could not be answered");
            std::process::exit(1);
        }
    }
}

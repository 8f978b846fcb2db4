//! Binary entrypoint: a Parlor server over the in-memory store with the
//! built-in demo deck.

use parlor::{ParlorError, ParlorServerBuilder};
use parlor_store::MemoryStore;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), ParlorError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("parlor=info")),
        )
        .init();

    let addr = std::env::var("PARLOR_ADDR").unwrap_or_else(|_| "0.0.0.0:3080".to_string());
    let (cards, questions) = parlor::deck::demo_deck();

    let server = ParlorServerBuilder::new()
        .bind(&addr)
        .build(MemoryStore::with_deck(cards, questions))
        .await?;

    tracing::info!(%addr, "parlor listening");
    server.run().await
}

use anyhow::Result;
use meetsync::cli;

#[tokio::main]
async fn main() -> Result<()> {
    cli::run().await
}

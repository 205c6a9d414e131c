use std::env;
use std::io::{BufRead, Write};
use std::sync::Arc;

use anyhow::Context;

use supply_chain_rag::assistant::Assistant;
use supply_chain_rag::core::config::{AppPaths, Settings};
use supply_chain_rag::llm::{LlmProvider, OpenAiProvider};
use supply_chain_rag::logging;
use supply_chain_rag::retriever::{ContextRetriever, RetrieverConfig};
use supply_chain_rag::seed::{SeedDataset, SeedLoader};
use supply_chain_rag::store::{GraphStore, Neo4jStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let paths = AppPaths::new();
    logging::init(&paths);

    let settings =
        Settings::load(&paths.config_path).context("Failed to load configuration")?;

    let provider: Arc<dyn LlmProvider> = Arc::new(
        OpenAiProvider::new(&settings.openai, settings.request_timeout())
            .context("Failed to construct LLM provider")?,
    );
    let store: Arc<dyn GraphStore> = Arc::new(
        Neo4jStore::connect(&settings.neo4j)
            .await
            .context("Failed to connect to Neo4j")?,
    );

    match env::args().nth(1).as_deref() {
        Some("seed") => run_seed(&settings, store.as_ref(), provider.as_ref(), &paths).await,
        Some("check") => run_check(store.as_ref(), provider.as_ref()).await,
        Some("verify") => run_verify(store.as_ref()).await,
        None => run_repl(&settings, store, provider).await,
        Some(other) => anyhow::bail!(
            "unknown command: {} (expected 'seed', 'check', or 'verify')",
            other
        ),
    }
}

async fn run_seed(
    settings: &Settings,
    store: &dyn GraphStore,
    provider: &dyn LlmProvider,
    paths: &AppPaths,
) -> anyhow::Result<()> {
    let dataset_path = paths.project_root.join("data").join("seed.json");
    let dataset = SeedDataset::from_path(&dataset_path)
        .with_context(|| format!("Failed to read dataset at {}", dataset_path.display()))?;

    SeedLoader::new(store, provider, settings.openai.embedding_dimensions)
        .load(&dataset)
        .await
        .context("Seed loading failed")?;

    println!("Data loading completed!");
    Ok(())
}

async fn run_check(store: &dyn GraphStore, provider: &dyn LlmProvider) -> anyhow::Result<()> {
    match store.ping().await {
        Ok(()) => println!("Neo4j connection successful"),
        Err(err) => println!("Neo4j connection error: {}", err),
    }

    match provider.health_check().await {
        Ok(true) => println!("{} connection successful", provider.name()),
        Ok(false) => println!("{} is not reachable", provider.name()),
        Err(err) => println!("{} connection error: {}", provider.name(), err),
    }

    Ok(())
}

async fn run_verify(store: &dyn GraphStore) -> anyhow::Result<()> {
    let stats = store.stats().await?;

    println!("Nodes:");
    println!(
        "  Product: {} ({} with embeddings)",
        stats.products, stats.embedded_products
    );
    println!("  Supplier: {}", stats.suppliers);
    println!("  Warehouse: {}", stats.warehouses);
    println!("Relationships:");
    println!("  SUPPLIES: {}", stats.supplies);
    println!("  STORED_AT: {}", stats.stored_at);
    println!("  CONNECTED_TO: {}", stats.routes);

    Ok(())
}

async fn run_repl(
    settings: &Settings,
    store: Arc<dyn GraphStore>,
    provider: Arc<dyn LlmProvider>,
) -> anyhow::Result<()> {
    let retriever = ContextRetriever::new(
        provider.clone(),
        store,
        RetrieverConfig::from(&settings.retrieval),
    );
    let assistant = Assistant::new(retriever, provider);

    let stdin = std::io::stdin();
    let mut stdout = std::io::stdout();

    loop {
        print!("\nAsk a question about the supply chain (or 'quit' to exit): ");
        stdout.flush()?;

        let mut question = String::new();
        if stdin.lock().read_line(&mut question)? == 0 {
            break;
        }
        let question = question.trim();
        if question.is_empty() {
            continue;
        }
        if question.eq_ignore_ascii_case("quit") {
            break;
        }

        print!("\nAnswer: ");
        stdout.flush()?;

        match assistant.stream_answer(question).await {
            Ok(mut stream) => {
                while let Some(chunk) = stream.recv().await {
                    match chunk {
                        Ok(text) => {
                            print!("{}", text);
                            stdout.flush()?;
                        }
                        Err(err) => {
                            print!("Error processing question: {}", err);
                            break;
                        }
                    }
                }
                println!();
            }
            Err(err) => println!("Error processing question: {}", err),
        }
    }

    Ok(())
}

// ============================================================================
// shopdesk - demo driver for the shopdesk chat core
// ============================================================================
// Usage:
//   shopdesk list                    List seeded shops and chat readiness
//   shopdesk index <shop-id>         Synthesize + embed a shop's content
//   shopdesk chat <shop-id>          Chat with a shop's assistant
//
// Requires OPENAI_API_KEY (or a .env file) for index/chat.
// ============================================================================

mod directory;

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use shopdesk_core::{
    prepare_embedding, AiConfig, AiService, ChatSession, OpenAiClient, SendOutcome, ShopDirectory,
};

use crate::directory::InMemoryDirectory;

/// Grounded customer-chat assistant demo
#[derive(Parser)]
#[command(name = "shopdesk", version, about = "Chat with a shop's grounded AI assistant")]
struct Cli {
    /// Path to the shop seed file
    #[arg(long, global = true, default_value = "shops.json")]
    shops: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List seeded shops and whether each is chat-ready
    List,

    /// Synthesize a shop's raw text, embed it, and store both
    Index {
        /// Shop identifier (see `list`)
        shop_id: String,
    },

    /// Open an interactive chat session with a shop's assistant
    Chat {
        /// Shop identifier (see `list`)
        shop_id: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let directory = Arc::new(InMemoryDirectory::load(&cli.shops)?);

    match cli.command {
        Commands::List => cmd_list(&directory),
        Commands::Index { shop_id } => cmd_index(&directory, &shop_id).await,
        Commands::Chat { shop_id } => cmd_chat(directory, &shop_id).await,
    }
}

fn cmd_list(directory: &InMemoryDirectory) -> Result<()> {
    let shops = directory.shops();
    if shops.is_empty() {
        println!("No shops in {}", directory.seed_path().display());
        return Ok(());
    }

    println!("{:<20}  {:<24}  {:<10}  {}", "SHOP ID", "NAME", "CHAT", "SERVICES");
    println!("{}", "-".repeat(76));
    for shop in &shops {
        let services = shop.services.chars().take(30).collect::<String>();
        let readiness = if shop.is_chat_ready() { "ready" } else { "not ready" };
        println!(
            "{:<20}  {:<24}  {:<10}  {}",
            shop.id, shop.name, readiness, services
        );
    }
    println!("\nTotal: {} shops", shops.len());
    Ok(())
}

async fn cmd_index(directory: &InMemoryDirectory, shop_id: &str) -> Result<()> {
    let shop = directory
        .get_shop(shop_id)
        .await?
        .ok_or_else(|| anyhow!("unknown shop: {}", shop_id))?;

    let client = OpenAiClient::new(AiConfig::from_env());
    let (raw, embedding) = prepare_embedding(&client, &shop).await?;
    let dims = embedding.len();
    directory.store_embedding(shop_id, raw, embedding)?;

    println!("Indexed {} ({} dimensions)", shop_id, dims);
    Ok(())
}

async fn cmd_chat(directory: Arc<InMemoryDirectory>, shop_id: &str) -> Result<()> {
    let shop = directory
        .get_shop(shop_id)
        .await?
        .ok_or_else(|| anyhow!("unknown shop: {}", shop_id))?;

    let ai: Arc<dyn AiService> = Arc::new(OpenAiClient::new(AiConfig::from_env()));
    let session = ChatSession::new(shop, directory, ai);

    for message in session.messages() {
        println!("{}", message.content);
    }
    println!("(type 'exit' to quit)\n");

    let stdin = std::io::stdin();
    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let mut line = String::new();
        if stdin.read_line(&mut line)? == 0 {
            break;
        }
        let input = line.trim();
        if input.eq_ignore_ascii_case("exit") || input.eq_ignore_ascii_case("quit") {
            break;
        }

        match session.send_message(input).await {
            SendOutcome::Ignored | SendOutcome::Busy => continue,
            SendOutcome::Replied | SendOutcome::Failed => {
                if let Some(reply) = session.messages().last() {
                    println!("{}\n", reply.content);
                }
            }
        }
    }

    Ok(())
}

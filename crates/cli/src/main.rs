mod cli;
mod commands;
mod view;

use clap::Parser;
use dotenvy::dotenv;
use tracing_subscriber::prelude::*;

use crate::cli::{Cli, Commands};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file from current directory
    dotenv().ok();

    let cli = Cli::parse();

    // Validate and export the chain override before anything reads it.
    if let Some(chain) = &cli.chain {
        match chain.to_lowercase().as_str() {
            "devnet" | "testnet" | "mainnet" => {
                // SAFETY: set early in main, before any threads are spawned
                unsafe {
                    std::env::set_var("SUI_CHAIN", chain.to_lowercase());
                }
            }
            _ => {
                eprintln!(
                    "Error: Invalid chain '{}'. Must be one of: devnet, testnet, mainnet",
                    chain
                );
                std::process::exit(1);
            }
        }
    }

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let chain = cli.chain.clone();
    let rpc_url = cli.rpc_url.clone();

    let result = match cli.command {
        Commands::Quests => commands::handle_quests(rpc_url, chain).await,
        Commands::Quest { id } => commands::handle_quest(rpc_url, chain, id).await,
        Commands::Dashboard => commands::handle_dashboard(rpc_url, chain).await,
        Commands::Submissions { id } => commands::handle_submissions(rpc_url, chain, id).await,
        Commands::Create {
            name,
            description,
            instructions,
            image_url,
            reward,
            start,
            end,
            max_participants,
        } => {
            commands::handle_create(
                rpc_url,
                chain,
                name,
                description,
                instructions,
                image_url,
                reward,
                start,
                end,
                max_participants,
            )
            .await
        }
        Commands::Join { id } => commands::handle_join(rpc_url, chain, id).await,
        Commands::Submit { id, proof } => commands::handle_submit(rpc_url, chain, id, proof).await,
        Commands::Verify { id, approve } => {
            commands::handle_verify(rpc_url, chain, id, approve).await
        }
        Commands::Claim { id } => commands::handle_claim(rpc_url, chain, id).await,
        Commands::BuyLife { amount } => commands::handle_buy_life(rpc_url, chain, amount).await,
        Commands::Balance => commands::handle_balance(rpc_url, chain).await,
        Commands::Faucet { address } => commands::handle_faucet(rpc_url, chain, address).await,
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
    Ok(())
}

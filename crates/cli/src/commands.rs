//! Command handlers. Each one initializes the Sui connection, drives the
//! library facade, and renders through the view layer.

use anyhow::{Result, anyhow};
use chrono::DateTime;
use quest_sui::{CreateQuest, QuestBoardInterface, SharedSuiState};
use tracing::debug;

use crate::view::{
    DashboardView, QuestView, render_balance, render_dashboard, render_quest_detail,
    render_quest_list, render_submissions,
};

/// Connect to the fullnode. Wallet commands fail here when no key is
/// configured; read commands fall back to read-only mode.
async fn init_state(
    rpc_url: Option<String>,
    chain_override: Option<String>,
    need_wallet: bool,
) -> Result<()> {
    let url = quest_sui::resolve_rpc_url(rpc_url, chain_override)?;
    if need_wallet || std::env::var("SUI_SECRET_KEY").is_ok() {
        SharedSuiState::initialize(&url).await?;
    } else {
        debug!("SUI_SECRET_KEY not set; connecting read-only");
        SharedSuiState::initialize_read_only(&url).await?;
    }
    Ok(())
}

pub async fn handle_quests(rpc_url: Option<String>, chain: Option<String>) -> Result<()> {
    init_state(rpc_url, chain, false).await?;
    let board = QuestBoardInterface::new();
    let quests = board.get_all_quests().await?;
    render_quest_list(&quests);
    Ok(())
}

pub async fn handle_quest(rpc_url: Option<String>, chain: Option<String>, id: String) -> Result<()> {
    init_state(rpc_url, chain, false).await?;
    let board = QuestBoardInterface::new();
    let quest = board.get_quest(&id).await?;
    let participation = board.get_participation().await?;
    let viewer = board.current_address();
    let view = QuestView::build(quest, viewer.as_deref(), &participation);
    render_quest_detail(&view);
    Ok(())
}

pub async fn handle_dashboard(rpc_url: Option<String>, chain: Option<String>) -> Result<()> {
    init_state(rpc_url, chain, true).await?;
    let board = QuestBoardInterface::new();
    let address = board
        .current_address()
        .ok_or_else(|| anyhow!("Wallet not connected"))?;
    let quests = board.get_all_quests().await?;
    let participation = board.get_participation().await?;
    let view = DashboardView::build(address, quests, &participation);
    render_dashboard(&view);
    Ok(())
}

pub async fn handle_submissions(
    rpc_url: Option<String>,
    chain: Option<String>,
    id: String,
) -> Result<()> {
    init_state(rpc_url, chain, false).await?;
    let board = QuestBoardInterface::new();
    let submissions = board.get_submissions(&id).await?;
    render_submissions(&id, &submissions);
    Ok(())
}

#[allow(clippy::too_many_arguments)]
pub async fn handle_create(
    rpc_url: Option<String>,
    chain: Option<String>,
    name: String,
    description: String,
    instructions: String,
    image_url: String,
    reward: f64,
    start: String,
    end: String,
    max_participants: u64,
) -> Result<()> {
    init_state(rpc_url, chain, true).await?;
    let board = QuestBoardInterface::new();

    let params = CreateQuest {
        name,
        description,
        instructions,
        image_url,
        reward_amount_sui: reward,
        start_time_ms: parse_time(&start)?,
        end_time_ms: parse_time(&end)?,
        max_participants,
    };

    let digest = board.create_quest(&params).await?;
    println!("Quest created. Fee paid and reward locked.");
    println!("Transaction: {}", digest);
    Ok(())
}

pub async fn handle_join(rpc_url: Option<String>, chain: Option<String>, id: String) -> Result<()> {
    init_state(rpc_url, chain, true).await?;
    let board = QuestBoardInterface::new();
    let digest = board.join_quest(&id).await?;
    println!("Joined quest {}.", id);
    println!("Transaction: {}", digest);
    Ok(())
}

pub async fn handle_submit(
    rpc_url: Option<String>,
    chain: Option<String>,
    id: String,
    proof: String,
) -> Result<()> {
    init_state(rpc_url, chain, true).await?;
    let board = QuestBoardInterface::new();
    let digest = board.submit_proof(&id, &proof).await?;
    println!("Proof submitted for quest {}.", id);
    println!("Transaction: {}", digest);
    Ok(())
}

pub async fn handle_verify(
    rpc_url: Option<String>,
    chain: Option<String>,
    id: String,
    approve: Vec<String>,
) -> Result<()> {
    init_state(rpc_url, chain, true).await?;
    let board = QuestBoardInterface::new();
    let digest = board.verify_participants(&id, &approve).await?;
    println!("Verified {} participant(s) for quest {}.", approve.len(), id);
    println!("Transaction: {}", digest);
    Ok(())
}

pub async fn handle_claim(rpc_url: Option<String>, chain: Option<String>, id: String) -> Result<()> {
    init_state(rpc_url, chain, true).await?;
    let board = QuestBoardInterface::new();

    // claim_reward needs the vault object; look it up from the quest.
    let quest = board.get_quest(&id).await?;
    if quest.vault_id.is_empty() {
        return Err(anyhow!("Quest {} has no reward vault", id));
    }

    let digest = board.claim_reward(&id, &quest.vault_id).await?;
    println!("Reward claimed: {} SUI.", quest.reward_per_person);
    println!("Transaction: {}", digest);
    Ok(())
}

pub async fn handle_buy_life(
    rpc_url: Option<String>,
    chain: Option<String>,
    amount: f64,
) -> Result<()> {
    init_state(rpc_url, chain, true).await?;
    let board = QuestBoardInterface::new();
    let digest = board.buy_life(amount).await?;
    println!("Swapped {} SUI for LIFE.", amount);
    println!("Transaction: {}", digest);
    Ok(())
}

pub async fn handle_balance(rpc_url: Option<String>, chain: Option<String>) -> Result<()> {
    init_state(rpc_url, chain, true).await?;
    let board = QuestBoardInterface::new();
    let info = board.get_balances().await?;
    render_balance(&info);
    Ok(())
}

pub async fn handle_faucet(
    rpc_url: Option<String>,
    chain: Option<String>,
    address: Option<String>,
) -> Result<()> {
    let chain_name = chain
        .clone()
        .or_else(|| std::env::var("SUI_CHAIN").ok())
        .unwrap_or_else(|| "testnet".to_string())
        .to_lowercase();

    let target = match address {
        Some(addr) => addr,
        None => {
            init_state(rpc_url, chain, true).await?;
            SharedSuiState::get_instance()
                .get_sui_address()
                .ok_or_else(|| anyhow!("No address provided and no wallet configured"))?
                .to_string()
        }
    };

    let digest = quest_sui::request_tokens_from_faucet(&chain_name, &target).await?;
    println!("Faucet request sent to {}.", target);
    println!("Transaction: {}", digest);
    Ok(())
}

fn parse_time(value: &str) -> Result<u64> {
    let dt = DateTime::parse_from_rfc3339(value)
        .map_err(|e| anyhow!("Invalid time '{}': {} (expected RFC 3339)", value, e))?;
    let ms = dt.timestamp_millis();
    if ms < 0 {
        return Err(anyhow!("Time '{}' is before the unix epoch", value));
    }
    Ok(ms as u64)
}

#[cfg(test)]
mod tests {
    use super::parse_time;

    #[test]
    fn test_parse_time_rfc3339() {
        assert_eq!(parse_time("1970-01-01T00:00:01Z").unwrap(), 1_000);
        assert!(parse_time("2026-09-01T12:00:00Z").unwrap() > 0);
        assert!(parse_time("not a time").is_err());
        assert!(parse_time("2026-09-01").is_err());
    }
}

// Module declarations
pub mod balance;
pub mod cache;
pub mod chain;
pub mod coin;
pub mod constants;
pub mod error;
pub mod faucet;
pub mod fetch;
pub mod interface;
pub mod parse;
pub mod quest;
pub mod quests;
pub mod state;
pub mod status;
pub mod token;
mod transactions;

// Re-export commonly used types
pub use balance::{BalanceInfo, get_balance_in_sui, get_balance_info, get_network_name};
pub use chain::{load_sender_from_env, resolve_jsonrpc_url, resolve_rpc_url};
pub use coin::{CoinInfo, CoinLockGuard, CoinLockManager, get_coin_lock_manager, list_coins_of_type};
pub use error::{QuestInterfaceError, Result};
pub use faucet::request_tokens_from_faucet;
pub use fetch::{UserParticipation, fetch_all_quests, fetch_quest, fetch_quest_submissions};
pub use interface::QuestBoardInterface;
pub use quest::{Quest, Submission};
pub use quests::CreateQuest;
pub use state::{ContractConfig, SharedSuiState};
pub use status::{QuestStatus, derive_effective_status, now_ms};

// Contract layout

/// Move module holding the quest entry points.
pub const EVENT_MODULE: &str = "event";

/// Move module holding the LIFE fee-token entry points.
pub const TOKEN_MODULE: &str = "life_token";

/// Struct names of the objects this client reads.
pub const EVENT_STRUCT: &str = "Event";
pub const PARTICIPANT_STRUCT: &str = "Participant";
pub const SUBMISSION_STRUCT: &str = "Submission";
pub const LIFE_TOKEN_STRUCT: &str = "LIFE_TOKEN";

/// Quest entry point names.
pub const CREATE_EVENT_FN: &str = "create_event";
pub const JOIN_EVENT_FN: &str = "join_event";
pub const SUBMIT_PROOF_FN: &str = "submit_proof";
pub const VERIFY_PARTICIPANTS_FN: &str = "verify_participants";
pub const CLAIM_REWARD_FN: &str = "claim_reward";
pub const BUY_LIFE_FN: &str = "buy_life";

// Amounts
// 1 SUI = 1,000,000,000 MIST; LIFE uses the same 9 decimals.

/// Base units per whole token (SUI and LIFE both use 9 decimals).
pub const TOKEN_BASE_UNITS: u64 = 1_000_000_000;

/// Quest creation fee: 10 LIFE in base units.
pub const QUEST_FEE_LIFE: u64 = 10 * TOKEN_BASE_UNITS;

/// LIFE tokens minted per SUI by the contract's price schedule.
pub const LIFE_PER_SUI: u64 = 1_000;

// Gas budget configuration

/// Gas budget used for dry-run simulation (5 SUI).
pub const SIMULATION_GAS_BUDGET_MIST: u64 = 5_000_000_000;

/// Minimum gas budget for any transaction (0.005 SUI).
pub const MIN_GAS_BUDGET_MIST: u64 = 5_000_000;

/// Maximum gas budget for any transaction (0.1 SUI).
pub const MAX_GAS_BUDGET_MIST: u64 = 100_000_000;

// Query layer

/// How long cached query results stay fresh.
pub const QUERY_CACHE_TTL_MS: u64 = 10_000;

/// Delay inserted before refreshing after a mutation, so the fullnode
/// indexer can catch up. Best effort only.
pub const INDEXING_LAG_MS: u64 = 1_000;

/// Read queries retry this many times with doubling backoff.
pub const READ_RETRY_ATTEMPTS: u32 = 2;
pub const READ_RETRY_BASE_DELAY_MS: u64 = 500;

/// Page limit for transaction-block queries against the indexer.
pub const TX_QUERY_PAGE_LIMIT: usize = 50;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "questboard")]
#[command(about = "Quest board CLI for the Sui quest contracts", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Override the blockchain network (devnet, testnet, or mainnet)
    #[arg(long, global = true, env = "SUI_CHAIN")]
    pub chain: Option<String>,

    #[arg(long, global = true, env = "SUI_RPC_URL")]
    pub rpc_url: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List all quests with their status
    Quests,

    /// Show one quest in detail, including your participation
    Quest {
        /// The quest object ID
        id: String,
    },

    /// Your quests: created, joined, and submitted
    Dashboard,

    /// List proof submissions for a quest you created
    Submissions {
        /// The quest object ID
        id: String,
    },

    /// Create a quest (pays the 10 LIFE fee, locks the SUI reward)
    Create {
        #[arg(long)]
        name: String,

        #[arg(long)]
        description: String,

        #[arg(long)]
        instructions: String,

        /// http(s) URL of the quest image
        #[arg(long)]
        image_url: String,

        /// Total reward pool in SUI
        #[arg(long)]
        reward: f64,

        /// Start time, RFC 3339 (e.g. 2026-09-01T12:00:00Z)
        #[arg(long)]
        start: String,

        /// End time, RFC 3339
        #[arg(long)]
        end: String,

        #[arg(long)]
        max_participants: u64,
    },

    /// Join a quest as a participant
    Join {
        /// The quest object ID
        id: String,
    },

    /// Submit a proof of completion
    Submit {
        /// The quest object ID
        id: String,

        /// Proof URL or text
        #[arg(long)]
        proof: String,
    },

    /// Approve participants (creator only)
    Verify {
        /// The quest object ID
        id: String,

        /// Participant addresses to approve
        #[arg(long, required = true, num_args = 1..)]
        approve: Vec<String>,
    },

    /// Claim your reward share from a verified quest
    Claim {
        /// The quest object ID
        id: String,
    },

    /// Swap SUI for LIFE fee tokens
    BuyLife {
        /// Amount to spend, in SUI
        #[arg(long)]
        amount: f64,
    },

    /// Show SUI and LIFE balances for the connected wallet
    Balance,

    /// Request SUI from the devnet/testnet faucet
    Faucet {
        /// Address to fund (defaults to the connected wallet)
        #[arg(long)]
        address: Option<String>,
    },
}

use thiserror::Error;

#[derive(Error, Debug)]
pub enum QuestInterfaceError {
    #[error("RPC connection failed: {0}")]
    RpcConnectionError(String),

    #[error("Transaction failed: {message}{}", tx_digest.as_ref().map(|d| format!(" (tx: {})", d)).unwrap_or_default())]
    TransactionError {
        message: String,
        tx_digest: Option<String>,
    },

    #[error("{0}")]
    ValidationError(String),

    #[error("Wallet not connected: SUI_SECRET_KEY is not configured")]
    WalletNotConnected,

    #[error("Object not found: {0}")]
    ObjectNotFound(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Other error: {0}")]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, QuestInterfaceError>;

use std::str::FromStr;
use std::sync::Arc;
use std::sync::OnceLock;
use sui_rpc::Client;
use sui_crypto::ed25519::Ed25519PrivateKey;
use sui_sdk_types as sui;
use tokio::sync::Mutex;
use tracing::info;

use crate::chain::load_sender_from_env;
use crate::error::{QuestInterfaceError, Result};

// Global static SharedSuiState instance with initialization lock
static SHARED_SUI_STATE: OnceLock<Arc<SharedSuiState>> = OnceLock::new();
static INIT_LOCK: OnceLock<Arc<Mutex<()>>> = OnceLock::new();

/// Deployment-environment constants for the quest contracts: package ids and
/// the shared singleton objects of the fee-token module. These are fixed per
/// deployment, never negotiated at runtime.
#[derive(Debug, Clone)]
pub struct ContractConfig {
    /// Package holding the `event` module.
    pub quest_package: sui::Address,
    /// Package holding the `life_token` module.
    pub token_package: sui::Address,
    /// Shared vault object custodying the LIFE supply.
    pub token_vault: sui::Address,
    /// Shared price schedule object.
    pub token_price: sui::Address,
    /// Shared token state object.
    pub token_state: sui::Address,
}

impl ContractConfig {
    fn from_env() -> Result<Self> {
        Ok(Self {
            quest_package: required_address_env("QUEST_PACKAGE")?,
            token_package: required_address_env("TOKEN_PACKAGE")?,
            token_vault: required_address_env("TOKEN_VAULT")?,
            token_price: required_address_env("TOKEN_PRICE")?,
            token_state: required_address_env("TOKEN_STATE")?,
        })
    }

    /// Fully qualified struct type, e.g. `<pkg>::event::Event`.
    pub fn event_struct_type(&self, name: &str) -> String {
        format!("{}::{}::{}", self.quest_package, crate::constants::EVENT_MODULE, name)
    }

    /// Fully qualified LIFE coin type: `0x2::coin::Coin<<pkg>::life_token::LIFE_TOKEN>`.
    pub fn life_coin_type(&self) -> String {
        format!(
            "0x2::coin::Coin<{}::{}::{}>",
            self.token_package,
            crate::constants::TOKEN_MODULE,
            crate::constants::LIFE_TOKEN_STRUCT
        )
    }
}

fn required_address_env(name: &str) -> Result<sui::Address> {
    let value = std::env::var(name).map_err(|_| {
        QuestInterfaceError::ValidationError(format!("{} environment variable must be set", name))
    })?;
    sui::Address::from_str(&value).map_err(|e| {
        QuestInterfaceError::ValidationError(format!(
            "Invalid {} address format: {} (expected 0x-prefixed hex)",
            name, e
        ))
    })
}

/// Process-wide Sui connection state: the gRPC client, the signing identity
/// (absent in read-only mode), and the contract deployment constants.
pub struct SharedSuiState {
    sui_client: Client, // cloneable
    sui_address: Option<sui::Address>,
    sui_private_key: Option<Ed25519PrivateKey>,
    contract: ContractConfig,
}

impl SharedSuiState {
    pub fn is_initialized() -> bool {
        SHARED_SUI_STATE.get().is_some()
    }

    /// Initialize for read-only operations; no key material required.
    pub async fn initialize_read_only(rpc_url: &str) -> Result<()> {
        Self::initialize_inner(rpc_url, false).await
    }

    /// Initialize with the signing identity from the environment.
    pub async fn initialize(rpc_url: &str) -> Result<()> {
        Self::initialize_inner(rpc_url, true).await
    }

    async fn initialize_inner(rpc_url: &str, with_sender: bool) -> Result<()> {
        if Self::is_initialized() {
            return Ok(());
        }

        let init_lock = INIT_LOCK.get_or_init(|| Arc::new(Mutex::new(())));
        let _guard = init_lock.lock().await;

        // Another task may have initialized while we waited for the lock.
        if Self::is_initialized() {
            return Ok(());
        }

        info!("Initializing SharedSuiState with RPC URL: {}", rpc_url);

        let sui_client = Client::new(rpc_url)
            .map_err(|e| QuestInterfaceError::RpcConnectionError(format!(
                "Failed to create Sui client: {}",
                e
            )))?;

        let contract = ContractConfig::from_env()?;

        let (sui_address, sui_private_key) = if with_sender {
            let (addr, sk) = load_sender_from_env()
                .map_err(|_| QuestInterfaceError::WalletNotConnected)?;
            info!("Initialized SharedSuiState with address: {}", addr);
            (Some(addr), Some(sk))
        } else {
            info!("Initialized SharedSuiState in read-only mode");
            (None, None)
        };

        let state = Arc::new(Self {
            sui_client,
            sui_address,
            sui_private_key,
            contract,
        });

        SHARED_SUI_STATE
            .set(state)
            .map_err(|_| anyhow::anyhow!("Failed to set SharedSuiState - this should not happen"))?;

        Ok(())
    }

    /// Get the global SharedSuiState instance.
    pub fn get_instance() -> Arc<SharedSuiState> {
        SHARED_SUI_STATE
            .get()
            .expect("SharedSuiState not initialized. Call SharedSuiState::initialize() first.")
            .clone()
    }

    pub(crate) fn get_sui_client(&self) -> Client {
        self.sui_client.clone()
    }

    pub fn contract(&self) -> &ContractConfig {
        &self.contract
    }

    /// The connected address, if a wallet is configured.
    pub fn get_sui_address(&self) -> Option<sui::Address> {
        self.sui_address
    }

    /// Signing identity, or the uniform wallet-not-connected error. Every
    /// mutating action goes through this check before touching the network.
    pub(crate) fn require_wallet(&self) -> Result<(sui::Address, &Ed25519PrivateKey)> {
        match (self.sui_address, self.sui_private_key.as_ref()) {
            (Some(addr), Some(sk)) => Ok((addr, sk)),
            _ => Err(QuestInterfaceError::WalletNotConnected),
        }
    }
}

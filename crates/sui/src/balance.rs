//! SUI and LIFE balances for the connected wallet.

use anyhow::Result;
use std::env;
use std::str::FromStr;
use sui_sdk_types::Address;

use crate::coin::{CoinInfo, SUI_COIN_TYPE, list_coins_of_type};
use crate::parse::mist_to_sui;
use crate::state::SharedSuiState;

/// Balances shown in the wallet view, in whole tokens.
#[derive(Debug, Clone)]
pub struct BalanceInfo {
    pub address: String,
    pub sui_balance: f64,
    pub life_balance: f64,
    pub sui_coins: Vec<CoinInfo>,
    pub life_coins: Vec<CoinInfo>,
}

/// Complete balance information for the connected account.
pub async fn get_balance_info() -> Result<BalanceInfo> {
    let shared_state = SharedSuiState::get_instance();
    let mut client = shared_state.get_sui_client();
    let address = shared_state
        .get_sui_address()
        .ok_or(crate::error::QuestInterfaceError::WalletNotConnected)?;

    let sui_coins = list_coins_of_type(&mut client, address, SUI_COIN_TYPE).await?;
    let life_coins =
        list_coins_of_type(&mut client, address, &shared_state.contract().life_coin_type()).await?;

    Ok(BalanceInfo {
        address: address.to_string(),
        sui_balance: mist_to_sui(sui_coins.iter().map(|c| c.balance).sum()),
        life_balance: mist_to_sui(life_coins.iter().map(|c| c.balance).sum()),
        sui_coins,
        life_coins,
    })
}

/// Total SUI balance for an arbitrary address, in whole SUI.
pub async fn get_balance_in_sui(address_str: &str) -> Result<f64> {
    let shared_state = SharedSuiState::get_instance();
    let mut client = shared_state.get_sui_client();
    let address = Address::from_str(address_str)?;

    let coins = list_coins_of_type(&mut client, address, SUI_COIN_TYPE).await?;
    Ok(mist_to_sui(coins.iter().map(|c| c.balance).sum()))
}

/// Network name from `SUI_CHAIN`.
pub fn get_network_name() -> String {
    env::var("SUI_CHAIN").unwrap_or_else(|_| "testnet".to_string())
}

//! LIFE fee-token purchase.
//!
//! The contract sells LIFE at a fixed 1000 LIFE per SUI. `buy_life` takes
//! the desired LIFE amount and checks the payment covers it, so the amount
//! is derived from the SUI spend: `amount_life = amount_mist * 1000` (both
//! sides use 9 decimals).

use sui_sdk_types as sui;
use sui_transaction_builder::Serialized;
use tracing::{debug, info};

use crate::constants::{BUY_LIFE_FN, LIFE_PER_SUI, TOKEN_BASE_UNITS, TOKEN_MODULE};
use crate::error::{QuestInterfaceError, Result};
use crate::state::SharedSuiState;
use crate::transactions::execute_move_call;

/// Swap SUI for LIFE. `amount_sui` is in whole SUI; the payment coin is
/// split from gas. Returns the transaction digest.
pub async fn buy_life_tx(amount_sui: f64) -> Result<String> {
    if amount_sui <= 0.0 {
        return Err(QuestInterfaceError::ValidationError(
            "Amount must be greater than zero".to_string(),
        ));
    }

    let amount_mist = (amount_sui * TOKEN_BASE_UNITS as f64).floor() as u64;
    if amount_mist == 0 {
        return Err(QuestInterfaceError::ValidationError(
            "Amount is below the smallest SUI unit".to_string(),
        ));
    }
    let amount_life = amount_mist.checked_mul(LIFE_PER_SUI).ok_or_else(|| {
        QuestInterfaceError::ValidationError("Amount too large".to_string())
    })?;

    let contract = SharedSuiState::get_instance().contract().clone();
    debug!(
        "Buying LIFE: {} MIST payment for {} LIFE base units",
        amount_mist, amount_life
    );

    let digest = execute_move_call(
        contract.token_package,
        TOKEN_MODULE,
        BUY_LIFE_FN,
        vec![
            contract.token_vault.to_string(),
            contract.token_price.to_string(),
            contract.token_state.to_string(),
        ],
        amount_mist,
        move |tb, object_args| {
            let amount_life_arg = tb.input(Serialized(&amount_life));
            let payment_amount = tb.input(Serialized(&amount_mist));
            let payment = tb
                .split_coins(sui::Argument::Gas, vec![payment_amount])
                .nested(0)
                .expect("split result has one coin");

            // buy_life(vault, price, amount_life, payment, state)
            vec![
                object_args[0],
                object_args[1],
                amount_life_arg,
                payment,
                object_args[2],
            ]
        },
    )
    .await?;

    info!(
        "Bought {} LIFE for {} SUI: {}",
        amount_life as f64 / TOKEN_BASE_UNITS as f64,
        amount_sui,
        digest
    );
    Ok(digest)
}

#[cfg(test)]
mod tests {
    use crate::constants::{LIFE_PER_SUI, TOKEN_BASE_UNITS};

    #[test]
    fn test_life_amount_schedule() {
        // 1 SUI buys 1000 LIFE, both in base units.
        let amount_mist = TOKEN_BASE_UNITS;
        let amount_life = amount_mist * LIFE_PER_SUI;
        assert_eq!(amount_life, 1_000 * TOKEN_BASE_UNITS);
    }
}

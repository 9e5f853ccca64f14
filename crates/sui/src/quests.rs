//! Transaction builders for the quest lifecycle: create, join, submit proof,
//! verify, claim.
//!
//! Each function validates locally before touching the network, then hands a
//! fully described Move call to the execution engine. Validation failures
//! come back as `ValidationError` with a user-facing message; contract aborts
//! surface through the engine unchanged.

use std::str::FromStr;
use sui_sdk_types as sui;
use sui_transaction_builder::Serialized;
use tracing::{debug, info};

use crate::constants::{
    CLAIM_REWARD_FN, CREATE_EVENT_FN, EVENT_MODULE, JOIN_EVENT_FN, QUEST_FEE_LIFE,
    SUBMIT_PROOF_FN, TOKEN_BASE_UNITS, VERIFY_PARTICIPANTS_FN,
};
use crate::error::{QuestInterfaceError, Result};
use crate::state::SharedSuiState;
use crate::status::now_ms;
use crate::transactions::{MoveString, clock_input, execute_move_call};

/// Everything needed to create a quest. Times are unix milliseconds.
#[derive(Debug, Clone)]
pub struct CreateQuest {
    pub name: String,
    pub description: String,
    pub instructions: String,
    pub image_url: String,
    /// Reward pool in whole SUI.
    pub reward_amount_sui: f64,
    pub start_time_ms: u64,
    pub end_time_ms: u64,
    pub max_participants: u64,
}

impl CreateQuest {
    fn validate(&self, now: u64) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(QuestInterfaceError::ValidationError(
                "Quest name must not be empty".to_string(),
            ));
        }
        if self.description.trim().is_empty() {
            return Err(QuestInterfaceError::ValidationError(
                "Quest description must not be empty".to_string(),
            ));
        }
        if self.instructions.trim().is_empty() {
            return Err(QuestInterfaceError::ValidationError(
                "Quest instructions must not be empty".to_string(),
            ));
        }
        if !(self.image_url.starts_with("http://") || self.image_url.starts_with("https://")) {
            return Err(QuestInterfaceError::ValidationError(
                "Image URL must be an http(s) URL".to_string(),
            ));
        }
        if self.reward_amount_sui <= 0.0 {
            return Err(QuestInterfaceError::ValidationError(
                "Reward amount must be greater than zero".to_string(),
            ));
        }
        if self.max_participants == 0 {
            return Err(QuestInterfaceError::ValidationError(
                "Max participants must be greater than zero".to_string(),
            ));
        }
        if self.start_time_ms <= now {
            return Err(QuestInterfaceError::ValidationError(
                "Start time must be in the future".to_string(),
            ));
        }
        if self.end_time_ms <= self.start_time_ms {
            return Err(QuestInterfaceError::ValidationError(
                "End time must be after start time".to_string(),
            ));
        }
        Ok(())
    }

    fn reward_mist(&self) -> u64 {
        (self.reward_amount_sui * TOKEN_BASE_UNITS as f64).floor() as u64
    }
}

/// Create a quest: pay the 10 LIFE fee and lock the SUI reward pool.
///
/// The caller's LIFE holdings are merged into the primary coin inside the
/// same transaction when they are spread across multiple objects, then the
/// fee is split off; the reward coin is split from gas.
pub async fn create_quest_tx(params: &CreateQuest) -> Result<String> {
    let shared_state = SharedSuiState::get_instance();
    let (sender, _) = shared_state.require_wallet()?;
    let contract = shared_state.contract().clone();

    params.validate(now_ms())?;
    let reward_mist = params.reward_mist();

    // Fee funds check up front: a clear message beats a Move abort.
    let mut client = shared_state.get_sui_client();
    let life_coins =
        crate::coin::list_coins_of_type(&mut client, sender, &contract.life_coin_type()).await?;
    if life_coins.is_empty() {
        return Err(QuestInterfaceError::ValidationError(
            "You do not have any LIFE tokens to pay the quest fee (10 LIFE)".to_string(),
        ));
    }
    let total_life: u64 = life_coins.iter().map(|c| c.balance).sum();
    if total_life < QUEST_FEE_LIFE {
        return Err(QuestInterfaceError::ValidationError(
            "Insufficient LIFE balance. You need 10 LIFE to create a quest".to_string(),
        ));
    }

    debug!(
        "Creating quest '{}': reward {} MIST, fee from {} LIFE coin(s) totalling {} base units",
        params.name,
        reward_mist,
        life_coins.len(),
        total_life
    );

    let life_coin_ids: Vec<String> = life_coins
        .iter()
        .map(|c| c.object_id().to_string())
        .collect();

    let params = params.clone();
    let digest = execute_move_call(
        contract.quest_package,
        EVENT_MODULE,
        CREATE_EVENT_FN,
        life_coin_ids,
        reward_mist,
        move |tb, object_args| {
            let primary_life = object_args[0];
            if object_args.len() > 1 {
                tb.merge_coins(primary_life, object_args[1..].to_vec());
            }

            let fee_amount = tb.input(Serialized(&QUEST_FEE_LIFE));
            let fee_coin = tb
                .split_coins(primary_life, vec![fee_amount])
                .nested(0)
                .expect("split result has one coin");

            let reward_amount = tb.input(Serialized(&reward_mist));
            let reward_coin = tb
                .split_coins(sui::Argument::Gas, vec![reward_amount])
                .nested(0)
                .expect("split result has one coin");

            let name = tb.input(Serialized(&MoveString::new(&params.name)));
            let description = tb.input(Serialized(&MoveString::new(&params.description)));
            let instructions = tb.input(Serialized(&MoveString::new(&params.instructions)));
            let image_url = tb.input(Serialized(&MoveString::new(&params.image_url)));
            let reward_amount_arg = tb.input(Serialized(&reward_mist));
            let start_time = tb.input(Serialized(&params.start_time_ms));
            let end_time = tb.input(Serialized(&params.end_time_ms));
            let max_participants = tb.input(Serialized(&params.max_participants));

            vec![
                name,
                description,
                instructions,
                image_url,
                reward_amount_arg,
                start_time,
                end_time,
                max_participants,
                reward_coin,
                fee_coin,
            ]
        },
    )
    .await?;

    info!("Quest created: {}", digest);
    Ok(digest)
}

/// Join a quest as a participant.
pub async fn join_quest_tx(event_id: &str) -> Result<String> {
    let contract = SharedSuiState::get_instance().contract().clone();
    let digest = execute_move_call(
        contract.quest_package,
        EVENT_MODULE,
        JOIN_EVENT_FN,
        vec![event_id.to_string()],
        0,
        |tb, object_args| {
            let clock = tb.input(clock_input());
            vec![object_args[0], clock]
        },
    )
    .await?;
    info!("Joined quest {}: {}", event_id, digest);
    Ok(digest)
}

/// Submit a proof of completion. The proof travels as raw bytes.
pub async fn submit_proof_tx(event_id: &str, proof: &str) -> Result<String> {
    if proof.trim().is_empty() {
        return Err(QuestInterfaceError::ValidationError(
            "Proof must not be empty".to_string(),
        ));
    }
    let contract = SharedSuiState::get_instance().contract().clone();
    let proof_bytes: Vec<u8> = proof.as_bytes().to_vec();
    let digest = execute_move_call(
        contract.quest_package,
        EVENT_MODULE,
        SUBMIT_PROOF_FN,
        vec![event_id.to_string()],
        0,
        move |tb, object_args| {
            let proof_arg = tb.input(Serialized(&proof_bytes));
            let clock = tb.input(clock_input());
            vec![object_args[0], proof_arg, clock]
        },
    )
    .await?;
    info!("Proof submitted for quest {}: {}", event_id, digest);
    Ok(digest)
}

/// Approve a set of participants. Creator-only on chain; the contract
/// enforces it, we only require a non-empty selection.
pub async fn verify_participants_tx(event_id: &str, approved: &[String]) -> Result<String> {
    if approved.is_empty() {
        return Err(QuestInterfaceError::ValidationError(
            "Select at least one participant to verify".to_string(),
        ));
    }
    let mut addresses = Vec::with_capacity(approved.len());
    for addr in approved {
        addresses.push(sui::Address::from_str(addr).map_err(|e| {
            QuestInterfaceError::ValidationError(format!("Invalid participant address {}: {}", addr, e))
        })?);
    }

    let contract = SharedSuiState::get_instance().contract().clone();
    let digest = execute_move_call(
        contract.quest_package,
        EVENT_MODULE,
        VERIFY_PARTICIPANTS_FN,
        vec![event_id.to_string()],
        0,
        move |tb, object_args| {
            let approved_arg = tb.input(Serialized(&addresses));
            let clock = tb.input(clock_input());
            vec![object_args[0], approved_arg, clock]
        },
    )
    .await?;
    info!(
        "Verified {} participant(s) for quest {}: {}",
        approved.len(),
        event_id,
        digest
    );
    Ok(digest)
}

/// Claim the caller's reward share from the quest vault.
pub async fn claim_reward_tx(event_id: &str, vault_id: &str) -> Result<String> {
    let contract = SharedSuiState::get_instance().contract().clone();
    let digest = execute_move_call(
        contract.quest_package,
        EVENT_MODULE,
        CLAIM_REWARD_FN,
        vec![event_id.to_string(), vault_id.to_string()],
        0,
        |_tb, object_args| vec![object_args[0], object_args[1]],
    )
    .await?;
    info!("Reward claimed for quest {}: {}", event_id, digest);
    Ok(digest)
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOW: u64 = 1_700_000_000_000;

    fn valid_params() -> CreateQuest {
        CreateQuest {
            name: "Beach cleanup".to_string(),
            description: "Pick up litter at the beach".to_string(),
            instructions: "Bring gloves and a bag".to_string(),
            image_url: "https://example.com/quest.png".to_string(),
            reward_amount_sui: 5.0,
            start_time_ms: NOW + 3_600_000,
            end_time_ms: NOW + 7_200_000,
            max_participants: 10,
        }
    }

    #[test]
    fn test_valid_params_pass() {
        assert!(valid_params().validate(NOW).is_ok());
    }

    #[test]
    fn test_empty_fields_rejected() {
        for field in ["name", "description", "instructions"] {
            let mut p = valid_params();
            match field {
                "name" => p.name = "  ".to_string(),
                "description" => p.description = String::new(),
                _ => p.instructions = "\t".to_string(),
            }
            assert!(p.validate(NOW).is_err(), "{} should be required", field);
        }
    }

    #[test]
    fn test_image_url_must_be_http() {
        let mut p = valid_params();
        p.image_url = "ipfs://abc".to_string();
        assert!(p.validate(NOW).is_err());
        p.image_url = "http://example.com/x.png".to_string();
        assert!(p.validate(NOW).is_ok());
    }

    #[test]
    fn test_time_bounds() {
        let mut p = valid_params();
        p.start_time_ms = NOW; // not strictly in the future
        let err = p.validate(NOW).unwrap_err();
        assert!(
            err.to_string().contains("Start time must be in the future"),
            "unexpected message: {err}"
        );

        let mut p = valid_params();
        p.end_time_ms = p.start_time_ms;
        let err = p.validate(NOW).unwrap_err();
        assert!(
            err.to_string().contains("End time must be after start time"),
            "unexpected message: {err}"
        );
    }

    #[test]
    fn test_reward_and_capacity_positive() {
        let mut p = valid_params();
        p.reward_amount_sui = 0.0;
        assert!(p.validate(NOW).is_err());

        let mut p = valid_params();
        p.max_participants = 0;
        assert!(p.validate(NOW).is_err());
    }

    #[test]
    fn test_reward_mist_conversion() {
        let mut p = valid_params();
        p.reward_amount_sui = 1.5;
        assert_eq!(p.reward_mist(), 1_500_000_000);
        p.reward_amount_sui = 0.000000001;
        assert_eq!(p.reward_mist(), 1);
    }
}

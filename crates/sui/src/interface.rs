//! The facade the presentation layer talks to.
//!
//! Wraps the fetch and transaction layers behind one struct, caches read
//! results, and invalidates the affected entries after each mutation. All
//! methods assume [`SharedSuiState`](crate::state::SharedSuiState) has been
//! initialized.

use tracing::{debug, info};

use crate::balance::{BalanceInfo, get_balance_info};
use crate::cache::{QueryCache, wait_for_indexing};
use crate::error::{QuestInterfaceError, Result};
use crate::fetch::{
    UserParticipation, fetch_all_quests, fetch_quest, fetch_quest_submissions,
    fetch_user_participation,
};
use crate::quest::{Quest, Submission};
use crate::quests::{
    CreateQuest, claim_reward_tx, create_quest_tx, join_quest_tx, submit_proof_tx,
    verify_participants_tx,
};
use crate::state::SharedSuiState;
use crate::token::buy_life_tx;

const QUESTS_KEY: &str = "quests";
const SUBMISSIONS_PREFIX: &str = "submissions:";
const PARTICIPATION_PREFIX: &str = "participation:";

pub struct QuestBoardInterface {
    quests: QueryCache<Vec<Quest>>,
    submissions: QueryCache<Vec<Submission>>,
    participation: QueryCache<UserParticipation>,
}

impl QuestBoardInterface {
    pub fn new() -> Self {
        Self {
            quests: QueryCache::new(),
            submissions: QueryCache::new(),
            participation: QueryCache::new(),
        }
    }

    /// The connected wallet address, if any.
    pub fn current_address(&self) -> Option<String> {
        SharedSuiState::get_instance()
            .get_sui_address()
            .map(|a| a.to_string())
    }

    // Reads

    pub async fn get_all_quests(&self) -> Result<Vec<Quest>> {
        if let Some(quests) = self.quests.get(QUESTS_KEY).await {
            return Ok(quests);
        }
        let quests = fetch_all_quests().await?;
        self.quests.put(QUESTS_KEY.to_string(), quests.clone()).await;
        Ok(quests)
    }

    pub async fn get_quest(&self, event_id: &str) -> Result<Quest> {
        fetch_quest(event_id)
            .await?
            .ok_or_else(|| QuestInterfaceError::ObjectNotFound(event_id.to_string()))
    }

    pub async fn get_submissions(&self, event_id: &str) -> Result<Vec<Submission>> {
        let key = format!("{}{}", SUBMISSIONS_PREFIX, event_id);
        if let Some(submissions) = self.submissions.get(&key).await {
            return Ok(submissions);
        }
        let submissions = fetch_quest_submissions(event_id).await?;
        self.submissions.put(key, submissions.clone()).await;
        Ok(submissions)
    }

    pub async fn get_participation(&self) -> Result<UserParticipation> {
        let shared_state = SharedSuiState::get_instance();
        let Some(address) = shared_state.get_sui_address() else {
            // No wallet: empty participation, not an error.
            return Ok(UserParticipation::default());
        };
        let key = format!("{}{}", PARTICIPATION_PREFIX, address);
        if let Some(participation) = self.participation.get(&key).await {
            return Ok(participation);
        }
        let participation = fetch_user_participation(address).await?;
        self.participation.put(key, participation.clone()).await;
        Ok(participation)
    }

    pub async fn get_balances(&self) -> Result<BalanceInfo> {
        Ok(get_balance_info().await?)
    }

    // Mutations. Each returns the transaction digest and drops the cache
    // entries the action made stale, after a short indexing pause.

    pub async fn create_quest(&self, params: &CreateQuest) -> Result<String> {
        let digest = create_quest_tx(params).await?;
        info!("Quest '{}' created, tx: {}", params.name, digest);
        self.after_mutation(None).await;
        Ok(digest)
    }

    pub async fn join_quest(&self, event_id: &str) -> Result<String> {
        let digest = join_quest_tx(event_id).await?;
        info!("Joined quest {}, tx: {}", event_id, digest);
        self.after_mutation(None).await;
        Ok(digest)
    }

    pub async fn submit_proof(&self, event_id: &str, proof: &str) -> Result<String> {
        let digest = submit_proof_tx(event_id, proof).await?;
        info!("Submitted proof for quest {}, tx: {}", event_id, digest);
        self.after_mutation(Some(event_id)).await;
        Ok(digest)
    }

    pub async fn verify_participants(
        &self,
        event_id: &str,
        approved: &[String],
    ) -> Result<String> {
        let digest = verify_participants_tx(event_id, approved).await?;
        info!(
            "Verified {} participant(s) for quest {}, tx: {}",
            approved.len(),
            event_id,
            digest
        );
        self.after_mutation(Some(event_id)).await;
        Ok(digest)
    }

    pub async fn claim_reward(&self, event_id: &str, vault_id: &str) -> Result<String> {
        let digest = claim_reward_tx(event_id, vault_id).await?;
        info!("Claimed reward for quest {}, tx: {}", event_id, digest);
        self.after_mutation(None).await;
        Ok(digest)
    }

    pub async fn buy_life(&self, amount_sui: f64) -> Result<String> {
        let digest = buy_life_tx(amount_sui).await?;
        info!("Bought LIFE for {} SUI, tx: {}", amount_sui, digest);
        // Balances are never cached, nothing quest-side changed.
        Ok(digest)
    }

    async fn after_mutation(&self, event_id: Option<&str>) {
        wait_for_indexing().await;
        self.quests.invalidate(QUESTS_KEY).await;
        self.participation.invalidate_prefix(PARTICIPATION_PREFIX).await;
        match event_id {
            Some(id) => {
                self.submissions
                    .invalidate(&format!("{}{}", SUBMISSIONS_PREFIX, id))
                    .await;
            }
            None => self.submissions.invalidate_prefix(SUBMISSIONS_PREFIX).await,
        }
        debug!("Invalidated caches after mutation");
    }
}

impl Default for QuestBoardInterface {
    fn default() -> Self {
        Self::new()
    }
}

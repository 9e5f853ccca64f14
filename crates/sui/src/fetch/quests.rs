//! Quest discovery and fetches.

use anyhow::{Result, anyhow};
use tokio::time::{Duration, sleep};
use tracing::{debug, warn};

use crate::constants::{
    CREATE_EVENT_FN, EVENT_MODULE, EVENT_STRUCT, READ_RETRY_ATTEMPTS, READ_RETRY_BASE_DELAY_MS,
};
use crate::fetch::indexer::query_created_objects;
use crate::fetch::object::{fetch_object, fetch_objects_batch};
use crate::quest::{Quest, parse_quest};
use crate::state::SharedSuiState;
use crate::status::now_ms;

/// Fetch and decode one quest. `Ok(None)` when the object is missing or
/// does not decode as a quest.
pub async fn fetch_quest(object_id: &str) -> Result<Option<Quest>> {
    let Some(content) = fetch_object(object_id).await? else {
        return Ok(None);
    };
    Ok(parse_quest(object_id, &content, now_ms()))
}

/// Discover and decode every quest ever created by the configured package.
///
/// Discovery walks the indexer for `create_event` calls, then the quest
/// objects are batch fetched and decoded; objects that fail to decode are
/// dropped so one bad object never hides the rest. The whole read retries
/// with doubling backoff, since indexer reads fail transiently.
pub async fn fetch_all_quests() -> Result<Vec<Quest>> {
    let mut last_err = None;
    for attempt in 0..=READ_RETRY_ATTEMPTS {
        if attempt > 0 {
            let delay = READ_RETRY_BASE_DELAY_MS * (2_u64.pow(attempt - 1));
            debug!(
                "Retrying quest fetch (attempt {}/{}) after {}ms",
                attempt + 1,
                READ_RETRY_ATTEMPTS + 1,
                delay
            );
            sleep(Duration::from_millis(delay)).await;
        }

        match fetch_all_quests_once().await {
            Ok(quests) => return Ok(quests),
            Err(e) => {
                warn!("Quest fetch attempt {} failed: {}", attempt + 1, e);
                last_err = Some(e);
            }
        }
    }
    Err(last_err.unwrap_or_else(|| anyhow!("Quest fetch failed")))
}

async fn fetch_all_quests_once() -> Result<Vec<Quest>> {
    let contract = SharedSuiState::get_instance().contract().clone();
    let event_type = contract.event_struct_type(EVENT_STRUCT);

    let quest_ids = query_created_objects(
        &contract.quest_package.to_string(),
        EVENT_MODULE,
        CREATE_EVENT_FN,
        &event_type,
    )
    .await?;

    if quest_ids.is_empty() {
        return Ok(Vec::new());
    }

    let objects = fetch_objects_batch(&quest_ids).await?;
    let now = now_ms();
    let quests: Vec<Quest> = objects
        .iter()
        .filter_map(|(id, content)| parse_quest(id, content, now))
        .collect();

    debug!(
        "Decoded {} quest(s) from {} created object(s)",
        quests.len(),
        quest_ids.len()
    );
    Ok(quests)
}

//! Proof submissions for a quest, for the creator's verification view.

use anyhow::Result;
use tracing::debug;

use crate::constants::{EVENT_MODULE, SUBMISSION_STRUCT, SUBMIT_PROOF_FN};
use crate::fetch::indexer::query_created_objects;
use crate::fetch::object::fetch_objects_batch;
use crate::quest::{Submission, parse_submission};
use crate::state::SharedSuiState;

/// Every submission recorded against `event_id`, newest first.
///
/// Submission objects live in participants' wallets, so discovery goes
/// through the indexer: find `submit_proof` transactions, collect the
/// Submission objects they created, then filter by quest id after decoding.
pub async fn fetch_quest_submissions(event_id: &str) -> Result<Vec<Submission>> {
    let contract = SharedSuiState::get_instance().contract().clone();
    let submission_type = contract.event_struct_type(SUBMISSION_STRUCT);

    let submission_ids = query_created_objects(
        &contract.quest_package.to_string(),
        EVENT_MODULE,
        SUBMIT_PROOF_FN,
        &submission_type,
    )
    .await?;

    if submission_ids.is_empty() {
        return Ok(Vec::new());
    }

    let objects = fetch_objects_batch(&submission_ids).await?;
    let submissions: Vec<Submission> = objects
        .iter()
        .filter_map(|(id, content)| parse_submission(id, content))
        .filter(|s| s.event_id == event_id)
        .collect();

    debug!(
        "Found {} submission(s) for quest {} out of {} total",
        submissions.len(),
        event_id,
        submission_ids.len()
    );
    Ok(submissions)
}

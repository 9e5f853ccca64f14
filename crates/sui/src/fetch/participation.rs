//! The connected user's Participant and Submission marker objects.

use anyhow::{Result, anyhow};
use std::collections::HashMap;
use sui_rpc::field::{FieldMask, FieldMaskUtil};
use sui_rpc::proto::sui::rpc::v2 as proto;
use sui_sdk_types as sui;
use tracing::debug;

use crate::constants::{PARTICIPANT_STRUCT, SUBMISSION_STRUCT};
use crate::parse::{decode_id, proto_to_json};
use crate::state::SharedSuiState;

/// Per-user view of quest membership, derived from the marker objects the
/// contract transfers on join and submit. Keys are quest ids.
#[derive(Debug, Clone, Default)]
pub struct UserParticipation {
    pub joined_event_ids: Vec<String>,
    pub submitted_event_ids: Vec<String>,
    pub participant_objects: HashMap<String, String>,
    pub submission_objects: HashMap<String, String>,
}

impl UserParticipation {
    pub fn has_joined(&self, event_id: &str) -> bool {
        self.participant_objects.contains_key(event_id)
    }

    pub fn has_submitted(&self, event_id: &str) -> bool {
        self.submission_objects.contains_key(event_id)
    }

    /// Index `(object_id, event_id)` marker pairs by quest id. Participant
    /// markers feed the joined side, Submission markers the submitted side.
    fn from_markers(
        participants: Vec<(String, String)>,
        submissions: Vec<(String, String)>,
    ) -> Self {
        let mut result = Self::default();
        for (object_id, event_id) in participants {
            result.joined_event_ids.push(event_id.clone());
            result.participant_objects.insert(event_id, object_id);
        }
        for (object_id, event_id) in submissions {
            result.submitted_event_ids.push(event_id.clone());
            result.submission_objects.insert(event_id, object_id);
        }
        result
    }
}

/// Fetch the owner's Participant and Submission objects and index them by
/// quest id.
pub async fn fetch_user_participation(owner: sui::Address) -> Result<UserParticipation> {
    let contract = SharedSuiState::get_instance().contract().clone();

    let participant_type = contract.event_struct_type(PARTICIPANT_STRUCT);
    let participants = list_marker_objects(owner, &participant_type).await?;

    let submission_type = contract.event_struct_type(SUBMISSION_STRUCT);
    let submissions = list_marker_objects(owner, &submission_type).await?;

    let result = UserParticipation::from_markers(participants, submissions);

    debug!(
        "User {} joined {} quest(s), submitted to {}",
        owner,
        result.joined_event_ids.len(),
        result.submitted_event_ids.len()
    );
    Ok(result)
}

/// `(object_id, event_id)` for every owned object of `object_type` that
/// carries an `event_id` field. Objects without one are skipped.
async fn list_marker_objects(
    owner: sui::Address,
    object_type: &str,
) -> Result<Vec<(String, String)>> {
    let mut client = SharedSuiState::get_instance().get_sui_client();
    let mut state = client.state_client();

    let mut markers = Vec::new();
    let mut page_token: Option<Vec<u8>> = None;

    loop {
        let mut request = proto::ListOwnedObjectsRequest::default();
        request.owner = Some(owner.to_string());
        request.page_size = Some(100);
        request.page_token = page_token.clone().map(Into::into);
        request.object_type = Some(object_type.to_string());
        request.read_mask = Some(FieldMask::from_paths(["object_id", "json"]));

        let resp = state
            .list_owned_objects(request)
            .await
            .map_err(|e| anyhow!("Failed to list {} objects: {}", object_type, e))?
            .into_inner();

        for obj in resp.objects {
            let Some(object_id) = obj.object_id else {
                continue;
            };
            let Some(json_value) = obj.json.as_deref() else {
                continue;
            };
            let content = proto_to_json(json_value);
            let event_id = decode_id(content.get("event_id"));
            if !event_id.is_empty() {
                markers.push((object_id, event_id));
            }
        }

        match resp.next_page_token {
            Some(token) if !token.is_empty() => page_token = Some(token.to_vec()),
            _ => break,
        }
    }

    Ok(markers)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_markers_index_by_quest() {
        // A Participant marker for one quest and a Submission marker for
        // another must land on their own sides of the index.
        let participants = vec![("0xp1".to_string(), "0xquest_a".to_string())];
        let submissions = vec![("0xs1".to_string(), "0xquest_b".to_string())];

        let participation = UserParticipation::from_markers(participants, submissions);

        assert_eq!(participation.joined_event_ids, vec!["0xquest_a"]);
        assert_eq!(participation.submitted_event_ids, vec!["0xquest_b"]);
        assert_eq!(
            participation.participant_objects.get("0xquest_a"),
            Some(&"0xp1".to_string())
        );
        assert_eq!(
            participation.submission_objects.get("0xquest_b"),
            Some(&"0xs1".to_string())
        );

        assert!(participation.has_joined("0xquest_a"));
        assert!(!participation.has_joined("0xquest_b"));
        assert!(participation.has_submitted("0xquest_b"));
        assert!(!participation.has_submitted("0xquest_a"));
    }

    #[test]
    fn test_markers_empty() {
        let participation = UserParticipation::from_markers(Vec::new(), Vec::new());
        assert!(participation.joined_event_ids.is_empty());
        assert!(participation.submitted_event_ids.is_empty());
        assert!(!participation.has_joined("0xquest_a"));
    }
}

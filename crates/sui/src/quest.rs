//! Quest and submission projections of on-chain objects.
//!
//! Everything here is a read-through view: the ledger is authoritative and
//! these structs are rebuilt wholesale on every refresh.

use serde_json::Value;
use tracing::debug;

use crate::parse::{decode_address_vec, decode_id, decode_move_string, decode_u64, mist_to_sui};
use crate::status::{QuestStatus, derive_effective_status};

/// One on-chain quest object, decoded for display.
#[derive(Debug, Clone)]
pub struct Quest {
    pub id: String,
    pub name: String,
    pub creator: String,
    pub description: String,
    pub instructions: String,
    pub image_url: String,

    /// Whole-token amounts (base units divided by 10^9).
    pub reward_amount: f64,
    pub reward_per_person: f64,
    pub total_claimed: f64,

    /// Raw on-chain status code mapped to an enum.
    pub on_chain_status: QuestStatus,
    /// Time-aware status shown to the user.
    pub status: QuestStatus,
    pub start_time_ms: u64,
    pub end_time_ms: u64,

    pub max_participants: u64,
    pub current_participants: u64,

    pub participants: Vec<String>,
    pub approved_participants: Vec<String>,
    pub claimed_participants: Vec<String>,

    /// Custody object holding the locked reward funds.
    pub vault_id: String,
}

impl Quest {
    pub fn is_creator(&self, address: &str) -> bool {
        self.creator == address
    }

    pub fn is_approved(&self, address: &str) -> bool {
        self.approved_participants.iter().any(|a| a == address)
    }

    pub fn has_claimed(&self, address: &str) -> bool {
        self.claimed_participants.iter().any(|a| a == address)
    }

    pub fn is_full(&self) -> bool {
        self.max_participants > 0 && self.current_participants >= self.max_participants
    }
}

/// One proof-of-completion record.
#[derive(Debug, Clone)]
pub struct Submission {
    pub id: String,
    pub event_id: String,
    pub submitter: String,
    pub proof_url: String,
    pub timestamp_ms: u64,
}

/// Decode a quest from the JSON rendering of its object content.
///
/// Objects that do not look like quests (missing content, wrong shape) are
/// dropped by returning `None`; a partially indexed object never fails a
/// whole batch.
pub fn parse_quest(object_id: &str, content: &Value, now_ms: u64) -> Option<Quest> {
    let fields = match content {
        Value::Object(_) => content,
        _ => {
            debug!("Skipping object {}: content is not a struct", object_id);
            return None;
        }
    };

    // A quest without a creator is not a quest object at all.
    let creator = match fields.get("creator").and_then(|v| v.as_str()) {
        Some(c) if !c.is_empty() => c.to_string(),
        _ => {
            debug!("Skipping object {}: no creator field", object_id);
            return None;
        }
    };

    let start_time_ms = decode_u64(fields.get("start_time"));
    let end_time_ms = decode_u64(fields.get("end_time"));
    let on_chain_status = QuestStatus::from_code(decode_u64(fields.get("status")));

    Some(Quest {
        id: object_id.to_string(),
        name: non_empty_or(decode_move_string(fields.get("name")), "Unknown Quest"),
        creator,
        description: decode_move_string(fields.get("description")),
        instructions: decode_move_string(fields.get("instructions")),
        image_url: decode_move_string(fields.get("image_url")),

        reward_amount: mist_to_sui(decode_u64(fields.get("reward_amount"))),
        reward_per_person: mist_to_sui(decode_u64(fields.get("reward_per_person"))),
        total_claimed: mist_to_sui(decode_u64(fields.get("total_claimed"))),

        on_chain_status,
        status: derive_effective_status(on_chain_status, start_time_ms, end_time_ms, now_ms),
        start_time_ms,
        end_time_ms,

        max_participants: decode_u64(fields.get("max_participants")),
        current_participants: decode_u64(fields.get("current_participants")),

        participants: decode_address_vec(fields.get("participants")),
        approved_participants: decode_address_vec(fields.get("approved_participants")),
        claimed_participants: decode_address_vec(fields.get("claimed_participants")),

        vault_id: decode_id(fields.get("vault_id")),
    })
}

/// Decode a submission object; `None` when the shape is unrecognized.
pub fn parse_submission(object_id: &str, content: &Value) -> Option<Submission> {
    let event_id = decode_id(content.get("event_id"));
    if event_id.is_empty() {
        debug!("Skipping object {}: no event_id field", object_id);
        return None;
    }
    Some(Submission {
        id: object_id.to_string(),
        event_id,
        submitter: content
            .get("participant")
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string(),
        proof_url: decode_move_string(content.get("proof")),
        timestamp_ms: decode_u64(content.get("timestamp")),
    })
}

fn non_empty_or(s: String, fallback: &str) -> String {
    if s.is_empty() { fallback.to_string() } else { s }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const NOW: u64 = 1_700_000_000_000;

    fn quest_json() -> Value {
        let name_bytes: Vec<u8> = "Beach cleanup".bytes().collect();
        json!({
            "creator": "0xc0ffee",
            "name": name_bytes,
            "description": "Pick up litter",
            "instructions": { "fields": { "bytes": "Bring gloves" } },
            "image_url": "https://example.com/quest.png",
            "reward_amount": "5000000000",
            "reward_per_person": "1000000000",
            "total_claimed": "0",
            "status": "1",
            "start_time": (NOW - 1000).to_string(),
            "end_time": (NOW + 1000).to_string(),
            "max_participants": "5",
            "current_participants": "2",
            "participants": ["0xaa", "0xbb"],
            "approved_participants": [],
            "claimed_participants": [],
            "vault_id": "0xva017",
        })
    }

    #[test]
    fn test_parse_quest_decodes_all_fields() {
        let quest = parse_quest("0xquest", &quest_json(), NOW).unwrap();
        assert_eq!(quest.id, "0xquest");
        assert_eq!(quest.name, "Beach cleanup");
        assert_eq!(quest.creator, "0xc0ffee");
        assert_eq!(quest.description, "Pick up litter");
        assert_eq!(quest.instructions, "Bring gloves");
        assert_eq!(quest.reward_amount, 5.0);
        assert_eq!(quest.reward_per_person, 1.0);
        assert_eq!(quest.status, QuestStatus::Running);
        assert_eq!(quest.participants.len(), 2);
        assert_eq!(quest.vault_id, "0xva017");
        assert!(!quest.is_full());
    }

    #[test]
    fn test_parse_quest_drops_malformed_objects() {
        assert!(parse_quest("0x1", &json!("not an object"), NOW).is_none());
        assert!(parse_quest("0x1", &json!({ "size": 3 }), NOW).is_none());
        assert!(parse_quest("0x1", &json!(null), NOW).is_none());
    }

    #[test]
    fn test_parse_quest_defaults_missing_fields() {
        let quest = parse_quest("0x1", &json!({ "creator": "0xabc" }), NOW).unwrap();
        assert_eq!(quest.name, "Unknown Quest");
        assert_eq!(quest.reward_amount, 0.0);
        assert_eq!(quest.start_time_ms, 0);
        assert_eq!(quest.end_time_ms, 0);
        // Zero timestamps: status passes through.
        assert_eq!(quest.status, QuestStatus::Pending);
        assert!(quest.participants.is_empty());
    }

    #[test]
    fn test_parse_submission_wrapped_event_id() {
        let proof_bytes: Vec<u8> = "https://proof.example".bytes().collect();
        let content = json!({
            "event_id": { "id": "0xevent" },
            "participant": "0xme",
            "proof": proof_bytes,
        });
        let sub = parse_submission("0xsub", &content).unwrap();
        assert_eq!(sub.event_id, "0xevent");
        assert_eq!(sub.submitter, "0xme");
        assert_eq!(sub.proof_url, "https://proof.example");
    }

    #[test]
    fn test_parse_submission_requires_event_id() {
        assert!(parse_submission("0xsub", &json!({ "participant": "0xme" })).is_none());
    }
}

//! View-state construction and terminal rendering.
//!
//! Rendering never reaches back into the fetch layer: each command builds an
//! explicit view struct from already-fetched data, then prints it. Action
//! eligibility (can join, can submit, can claim) is derived here, in one
//! place, from the quest and the viewer's participation.

use chrono::{DateTime, Utc};
use quest_sui::{BalanceInfo, Quest, QuestStatus, Submission, UserParticipation};

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";

/// One quest as seen by the current viewer.
pub struct QuestView {
    pub quest: Quest,
    pub is_creator: bool,
    pub has_joined: bool,
    pub has_submitted: bool,
    pub is_approved: bool,
    pub has_claimed: bool,
    pub can_join: bool,
    pub can_submit: bool,
    pub can_claim: bool,
}

impl QuestView {
    pub fn build(quest: Quest, viewer: Option<&str>, participation: &UserParticipation) -> Self {
        let (is_creator, is_approved, has_claimed) = match viewer {
            Some(addr) => (
                quest.is_creator(addr),
                quest.is_approved(addr),
                quest.has_claimed(addr),
            ),
            None => (false, false, false),
        };
        let has_joined = participation.has_joined(&quest.id);
        let has_submitted = participation.has_submitted(&quest.id);

        let can_join = viewer.is_some()
            && !is_creator
            && !has_joined
            && !quest.is_full()
            && matches!(quest.status, QuestStatus::Pending | QuestStatus::Running);
        let can_submit = has_joined && !has_submitted && quest.status == QuestStatus::Running;
        let can_claim = is_approved && !has_claimed && quest.status == QuestStatus::Verified;

        Self {
            quest,
            is_creator,
            has_joined,
            has_submitted,
            is_approved,
            has_claimed,
            can_join,
            can_submit,
            can_claim,
        }
    }
}

/// The "my quests" aggregation.
pub struct DashboardView {
    pub address: String,
    pub created: Vec<Quest>,
    pub joined: Vec<QuestView>,
}

impl DashboardView {
    pub fn build(address: String, quests: Vec<Quest>, participation: &UserParticipation) -> Self {
        let mut created = Vec::new();
        let mut joined = Vec::new();
        for quest in quests {
            if quest.is_creator(&address) {
                created.push(quest);
            } else if participation.has_joined(&quest.id) {
                joined.push(QuestView::build(quest, Some(&address), participation));
            }
        }
        Self {
            address,
            created,
            joined,
        }
    }
}

fn badge(status: QuestStatus) -> String {
    format!("{}[{}]{}", status.badge_color(), status.label(), RESET)
}

fn format_time(ms: u64) -> String {
    if ms == 0 {
        return "-".to_string();
    }
    DateTime::<Utc>::from_timestamp_millis(ms as i64)
        .map(|dt| dt.format("%Y-%m-%d %H:%M UTC").to_string())
        .unwrap_or_else(|| ms.to_string())
}

fn short_id(id: &str) -> String {
    if id.len() > 18 {
        format!("{}..{}", &id[..10], &id[id.len() - 6..])
    } else {
        id.to_string()
    }
}

pub fn render_quest_list(quests: &[Quest]) {
    if quests.is_empty() {
        println!("No quests found.");
        return;
    }
    println!("{}{} quest(s){}", BOLD, quests.len(), RESET);
    println!();
    for quest in quests {
        println!(
            "{} {}{}{}  {}",
            badge(quest.status),
            BOLD,
            quest.name,
            RESET,
            short_id(&quest.id)
        );
        println!(
            "  reward {} SUI ({} per person) | {}/{} participants | {} - {}",
            quest.reward_amount,
            quest.reward_per_person,
            quest.current_participants,
            if quest.max_participants > 0 {
                quest.max_participants.to_string()
            } else {
                "∞".to_string()
            },
            format_time(quest.start_time_ms),
            format_time(quest.end_time_ms),
        );
    }
}

pub fn render_quest_detail(view: &QuestView) {
    let q = &view.quest;
    println!("{}{}{}  {}", BOLD, q.name, RESET, badge(q.status));
    println!("{}{}{}", DIM, q.id, RESET);
    println!();
    println!("{}", q.description);
    println!();
    println!("Instructions: {}", q.instructions);
    if !q.image_url.is_empty() {
        println!("Image:        {}", q.image_url);
    }
    println!("Creator:      {}", q.creator);
    println!("Reward:       {} SUI total, {} SUI per person", q.reward_amount, q.reward_per_person);
    println!("Claimed:      {} SUI", q.total_claimed);
    println!("Window:       {} - {}", format_time(q.start_time_ms), format_time(q.end_time_ms));
    println!(
        "Participants: {}/{}",
        q.current_participants,
        if q.max_participants > 0 {
            q.max_participants.to_string()
        } else {
            "∞".to_string()
        }
    );
    if !q.vault_id.is_empty() {
        println!("Vault:        {}", q.vault_id);
    }

    println!();
    if view.is_creator {
        println!("You created this quest.");
        println!("Approved: {} | Claimed: {}", q.approved_participants.len(), q.claimed_participants.len());
    } else {
        let mut flags = Vec::new();
        if view.has_joined {
            flags.push("joined");
        }
        if view.has_submitted {
            flags.push("submitted");
        }
        if view.is_approved {
            flags.push("approved");
        }
        if view.has_claimed {
            flags.push("claimed");
        }
        if !flags.is_empty() {
            println!("Your status: {}", flags.join(", "));
        }
        let mut actions = Vec::new();
        if view.can_join {
            actions.push("join");
        }
        if view.can_submit {
            actions.push("submit");
        }
        if view.can_claim {
            actions.push("claim");
        }
        if !actions.is_empty() {
            println!("Available actions: {}", actions.join(", "));
        }
    }
}

pub fn render_dashboard(view: &DashboardView) {
    println!("{}Dashboard for {}{}", BOLD, view.address, RESET);
    println!();

    println!("{}Created ({}){}", BOLD, view.created.len(), RESET);
    if view.created.is_empty() {
        println!("  none");
    }
    for quest in &view.created {
        println!(
            "  {} {}  {}  {} approved / {} claimed",
            badge(quest.status),
            quest.name,
            short_id(&quest.id),
            quest.approved_participants.len(),
            quest.claimed_participants.len(),
        );
    }

    println!();
    println!("{}Joined ({}){}", BOLD, view.joined.len(), RESET);
    if view.joined.is_empty() {
        println!("  none");
    }
    for qv in &view.joined {
        let mut state = Vec::new();
        if qv.has_submitted {
            state.push("submitted");
        }
        if qv.is_approved {
            state.push("approved");
        }
        if qv.has_claimed {
            state.push("claimed");
        }
        if qv.can_claim {
            state.push("reward claimable!");
        }
        println!(
            "  {} {}  {}  {}",
            badge(qv.quest.status),
            qv.quest.name,
            short_id(&qv.quest.id),
            if state.is_empty() {
                "awaiting proof".to_string()
            } else {
                state.join(", ")
            }
        );
    }
}

pub fn render_submissions(event_id: &str, submissions: &[Submission]) {
    if submissions.is_empty() {
        println!("No submissions for quest {}.", short_id(event_id));
        return;
    }
    println!(
        "{}{} submission(s) for quest {}{}",
        BOLD,
        submissions.len(),
        short_id(event_id),
        RESET
    );
    println!();
    for sub in submissions {
        println!("{}  {}", sub.submitter, format_time(sub.timestamp_ms));
        println!("  proof: {}", sub.proof_url);
    }
}

pub fn render_balance(info: &BalanceInfo) {
    println!("{}Wallet {}{}", BOLD, info.address, RESET);
    println!(
        "  SUI:  {} ({} coin object(s))",
        info.sui_balance,
        info.sui_coins.len()
    );
    println!(
        "  LIFE: {} ({} coin object(s))",
        info.life_balance,
        info.life_coins.len()
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use quest_sui::now_ms;

    fn quest(id: &str, creator: &str, status: QuestStatus) -> Quest {
        Quest {
            id: id.to_string(),
            name: "Test quest".to_string(),
            creator: creator.to_string(),
            description: String::new(),
            instructions: String::new(),
            image_url: String::new(),
            reward_amount: 10.0,
            reward_per_person: 1.0,
            total_claimed: 0.0,
            on_chain_status: status,
            status,
            start_time_ms: now_ms() - 1000,
            end_time_ms: now_ms() + 1000,
            max_participants: 10,
            current_participants: 1,
            participants: vec![],
            approved_participants: vec![],
            claimed_participants: vec![],
            vault_id: String::new(),
        }
    }

    #[test]
    fn test_creator_cannot_join_own_quest() {
        let q = quest("0xq", "0xme", QuestStatus::Running);
        let view = QuestView::build(q, Some("0xme"), &UserParticipation::default());
        assert!(view.is_creator);
        assert!(!view.can_join);
    }

    #[test]
    fn test_can_join_running_quest() {
        let q = quest("0xq", "0xother", QuestStatus::Running);
        let view = QuestView::build(q, Some("0xme"), &UserParticipation::default());
        assert!(view.can_join);
        assert!(!view.can_submit);
    }

    #[test]
    fn test_joined_can_submit_once() {
        let q = quest("0xq", "0xother", QuestStatus::Running);
        let mut participation = UserParticipation::default();
        participation
            .participant_objects
            .insert("0xq".to_string(), "0xp".to_string());

        let view = QuestView::build(q.clone(), Some("0xme"), &participation);
        assert!(!view.can_join);
        assert!(view.can_submit);

        participation
            .submission_objects
            .insert("0xq".to_string(), "0xs".to_string());
        let view = QuestView::build(q, Some("0xme"), &participation);
        assert!(!view.can_submit);
    }

    #[test]
    fn test_claim_requires_approval_and_verified() {
        let mut q = quest("0xq", "0xother", QuestStatus::Verified);
        q.approved_participants.push("0xme".to_string());
        let view = QuestView::build(q.clone(), Some("0xme"), &UserParticipation::default());
        assert!(view.can_claim);

        q.claimed_participants.push("0xme".to_string());
        let view = QuestView::build(q, Some("0xme"), &UserParticipation::default());
        assert!(!view.can_claim);
    }

    #[test]
    fn test_full_quest_blocks_join() {
        let mut q = quest("0xq", "0xother", QuestStatus::Running);
        q.current_participants = q.max_participants;
        let view = QuestView::build(q, Some("0xme"), &UserParticipation::default());
        assert!(!view.can_join);
    }

    #[test]
    fn test_dashboard_partition() {
        let mine = quest("0xmine", "0xme", QuestStatus::Running);
        let joined = quest("0xjoined", "0xother", QuestStatus::Running);
        let unrelated = quest("0xother", "0xother", QuestStatus::Running);

        let mut participation = UserParticipation::default();
        participation
            .participant_objects
            .insert("0xjoined".to_string(), "0xp".to_string());

        let view = DashboardView::build(
            "0xme".to_string(),
            vec![mine, joined, unrelated],
            &participation,
        );
        assert_eq!(view.created.len(), 1);
        assert_eq!(view.joined.len(), 1);
        assert_eq!(view.created[0].id, "0xmine");
        assert_eq!(view.joined[0].quest.id, "0xjoined");
    }
}

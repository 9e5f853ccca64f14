//! Quest lifecycle status, on-chain and time-derived.

use std::fmt;

/// Lifecycle status of a quest. Matches the status codes stored by the
/// `event` Move module (0..=3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QuestStatus {
    Pending,
    Running,
    Ended,
    Verified,
}

impl QuestStatus {
    /// Map the raw on-chain status code. Unknown codes fall back to Pending.
    pub fn from_code(code: u64) -> Self {
        match code {
            1 => QuestStatus::Running,
            2 => QuestStatus::Ended,
            3 => QuestStatus::Verified,
            _ => QuestStatus::Pending,
        }
    }

    /// Display label for status badges.
    pub fn label(&self) -> &'static str {
        match self {
            QuestStatus::Pending => "PENDING",
            QuestStatus::Running => "RUNNING",
            QuestStatus::Ended => "ENDED",
            QuestStatus::Verified => "VERIFIED",
        }
    }

    /// ANSI color code for the status badge, one variant per lifecycle state.
    pub fn badge_color(&self) -> &'static str {
        match self {
            QuestStatus::Pending => "\x1b[33m",  // yellow
            QuestStatus::Running => "\x1b[32m",  // green
            QuestStatus::Ended => "\x1b[31m",    // red
            QuestStatus::Verified => "\x1b[36m", // cyan
        }
    }
}

impl fmt::Display for QuestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Compute the status shown to the user.
///
/// The contract only advances its status field on discrete transactions, so
/// a quest whose deadline passed still reads RUNNING on chain until someone
/// ends it. The display status overrides the on-chain one using wall-clock
/// time, with two fixed rules: VERIFIED is terminal and never demoted, and a
/// zero timestamp means "no time bound" so the time rules do not fire.
pub fn derive_effective_status(
    on_chain: QuestStatus,
    start_time_ms: u64,
    end_time_ms: u64,
    now_ms: u64,
) -> QuestStatus {
    if on_chain == QuestStatus::Verified {
        return QuestStatus::Verified;
    }
    if end_time_ms > 0 && now_ms > end_time_ms {
        return QuestStatus::Ended;
    }
    if start_time_ms > 0 && start_time_ms <= now_ms && now_ms <= end_time_ms {
        return QuestStatus::Running;
    }
    on_chain
}

/// Current wall-clock time in milliseconds.
pub fn now_ms() -> u64 {
    chrono::Utc::now().timestamp_millis().max(0) as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    const HOUR: u64 = 3_600_000;
    const DAY: u64 = 24 * HOUR;
    const NOW: u64 = 1_700_000_000_000;

    #[test]
    fn test_past_end_is_ended_regardless_of_start() {
        // Ordering of startTime does not matter once the end has passed.
        for start in [0, NOW - DAY, NOW + DAY] {
            for status in [QuestStatus::Pending, QuestStatus::Running, QuestStatus::Ended] {
                assert_eq!(
                    derive_effective_status(status, start, NOW - 1_000, NOW),
                    QuestStatus::Ended
                );
            }
        }
    }

    #[test]
    fn test_verified_is_terminal() {
        // Long past the end, or before the start: VERIFIED stays VERIFIED.
        assert_eq!(
            derive_effective_status(QuestStatus::Verified, NOW - DAY, NOW - 100 * DAY, NOW),
            QuestStatus::Verified
        );
        assert_eq!(
            derive_effective_status(QuestStatus::Verified, NOW + HOUR, NOW + DAY, NOW),
            QuestStatus::Verified
        );
    }

    #[test]
    fn test_in_window_is_running() {
        assert_eq!(
            derive_effective_status(QuestStatus::Pending, NOW - HOUR, NOW + HOUR, NOW),
            QuestStatus::Running
        );
        // Inclusive boundaries.
        assert_eq!(
            derive_effective_status(QuestStatus::Pending, NOW, NOW + HOUR, NOW),
            QuestStatus::Running
        );
        assert_eq!(
            derive_effective_status(QuestStatus::Pending, NOW - HOUR, NOW, NOW),
            QuestStatus::Running
        );
    }

    #[test]
    fn test_before_start_keeps_onchain_status() {
        // start = now + 1h, end = now + 7d: not yet started, expect PENDING.
        assert_eq!(
            derive_effective_status(QuestStatus::Pending, NOW + HOUR, NOW + 7 * DAY, NOW),
            QuestStatus::Pending
        );
    }

    #[test]
    fn test_ended_one_second_ago() {
        assert_eq!(
            derive_effective_status(QuestStatus::Running, NOW - DAY, NOW - 1_000, NOW),
            QuestStatus::Ended
        );
    }

    #[test]
    fn test_zero_timestamps_are_unset() {
        // No time bound: the raw on-chain status passes through unchanged.
        for status in [QuestStatus::Pending, QuestStatus::Running, QuestStatus::Ended] {
            assert_eq!(derive_effective_status(status, 0, 0, NOW), status);
        }
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(QuestStatus::from_code(0), QuestStatus::Pending);
        assert_eq!(QuestStatus::from_code(1), QuestStatus::Running);
        assert_eq!(QuestStatus::from_code(2), QuestStatus::Ended);
        assert_eq!(QuestStatus::from_code(3), QuestStatus::Verified);
        assert_eq!(QuestStatus::from_code(99), QuestStatus::Pending);
    }
}

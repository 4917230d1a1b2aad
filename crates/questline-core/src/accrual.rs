//! Session-to-XP accrual engine.
//!
//! Pure computation: a completed session's XP is the actual duration in
//! minutes scaled by the willpower multiplier (high=1.0, medium=1.5,
//! low=2.0), rounded to the nearest integer. Sessions self-reported as
//! harder earn more per minute. The engine has no side effects; callers
//! persist the resulting ledger entry.

use serde::Serialize;

use crate::session::Willpower;

/// Base XP earned per minute of focus before the willpower multiplier.
pub const XP_PER_MINUTE: f64 = 1.0;

/// Sentinel label when a `(willpower, planned)` pair is not in the table.
pub const UNKNOWN_DIFFICULTY: &str = "Unknown Difficulty";

/// Result of evaluating a completed session. Output-only: the engine
/// produces it, nothing ever reads it back in.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct SessionXp {
    /// XP amount, rounded to the nearest integer
    pub amount: i64,
    /// Human-facing difficulty label for the session's shape
    pub difficulty: &'static str,
}

/// Evaluate XP and difficulty for a completed session.
///
/// Label resolution failure is cosmetic: an unrecognized pair still
/// yields a valid numeric amount under [`UNKNOWN_DIFFICULTY`].
pub fn evaluate(willpower: Willpower, planned_minutes: u32, actual_minutes: u32) -> SessionXp {
    let amount = (actual_minutes as f64 * XP_PER_MINUTE * willpower.multiplier()).round() as i64;
    SessionXp {
        amount,
        difficulty: difficulty_label(willpower, planned_minutes),
    }
}

/// Fixed nine-entry difficulty table over willpower x planned duration.
pub fn difficulty_label(willpower: Willpower, planned_minutes: u32) -> &'static str {
    match (willpower, planned_minutes) {
        (Willpower::High, 60) => "Steady Hour",
        (Willpower::High, 90) => "Steady Stretch",
        (Willpower::High, 120) => "Steady Marathon",
        (Willpower::Medium, 60) => "Uphill Hour",
        (Willpower::Medium, 90) => "Uphill Stretch",
        (Willpower::Medium, 120) => "Uphill Marathon",
        (Willpower::Low, 60) => "Gritted Hour",
        (Willpower::Low, 90) => "Gritted Stretch",
        (Willpower::Low, 120) => "Gritted Marathon",
        _ => UNKNOWN_DIFFICULTY,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const WILLPOWERS: [Willpower; 3] = [Willpower::High, Willpower::Medium, Willpower::Low];
    const DURATIONS: [u32; 3] = [60, 90, 120];

    #[test]
    fn test_xp_scales_with_multiplier() {
        assert_eq!(evaluate(Willpower::High, 60, 60).amount, 60);
        assert_eq!(evaluate(Willpower::Medium, 60, 60).amount, 90);
        assert_eq!(evaluate(Willpower::Low, 60, 60).amount, 120);
    }

    #[test]
    fn test_xp_rounds_to_nearest() {
        // 45 * 1.5 = 67.5 rounds up.
        assert_eq!(evaluate(Willpower::Medium, 90, 45).amount, 68);
    }

    #[test]
    fn test_zero_actual_yields_zero_xp() {
        for willpower in WILLPOWERS {
            assert_eq!(evaluate(willpower, 60, 0).amount, 0);
        }
    }

    #[test]
    fn test_difficulty_table_covers_all_nine_pairs() {
        let mut labels = std::collections::BTreeSet::new();
        for willpower in WILLPOWERS {
            for minutes in DURATIONS {
                let label = difficulty_label(willpower, minutes);
                assert_ne!(label, UNKNOWN_DIFFICULTY);
                labels.insert(label);
            }
        }
        assert_eq!(labels.len(), 9, "labels must be distinct");
    }

    #[test]
    fn test_unknown_pair_is_cosmetic_not_fatal() {
        let xp = evaluate(Willpower::Low, 45, 45);
        assert_eq!(xp.difficulty, UNKNOWN_DIFFICULTY);
        assert_eq!(xp.amount, 90);
    }

    proptest! {
        #[test]
        fn prop_xp_monotone_in_actual_duration(
            willpower_idx in 0usize..3,
            planned_idx in 0usize..3,
            a in 0u32..100_000,
            b in 0u32..100_000,
        ) {
            let willpower = WILLPOWERS[willpower_idx];
            let planned = DURATIONS[planned_idx];
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(
                evaluate(willpower, planned, lo).amount
                    <= evaluate(willpower, planned, hi).amount
            );
        }

        #[test]
        fn prop_low_willpower_beats_high(
            planned_idx in 0usize..3,
            actual in 1u32..100_000,
        ) {
            let planned = DURATIONS[planned_idx];
            prop_assert!(
                evaluate(Willpower::Low, planned, actual).amount
                    > evaluate(Willpower::High, planned, actual).amount
            );
        }
    }
}

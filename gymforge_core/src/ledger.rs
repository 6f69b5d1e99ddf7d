//! Progression ledger: the experience/leveling formula.
//!
//! The cumulative experience table covers levels 1..=100. The cost to go
//! from level L to L+1 is `50 * (L + 1)`, which reproduces the classic
//! thresholds (level 2 at 100, level 3 at 250, level 100 at 252450).
//!
//! `apply_experience` is a pure function: it returns the new state and the
//! caller persists it. Current-level experience is always normalized below
//! the delta to the next level; at the max level excess experience still
//! accumulates but no further level-up occurs.

use crate::{Error, ProgressionState, Result};
use once_cell::sync::Lazy;

/// Highest defined level
pub const MAX_LEVEL: u32 = 100;

/// Cumulative experience required to reach each level, indexed by level.
/// Index 0 is unused; `EXP_TABLE[1] == 0`.
static EXP_TABLE: Lazy<[u64; (MAX_LEVEL + 1) as usize]> = Lazy::new(|| {
    let mut table = [0u64; (MAX_LEVEL + 1) as usize];
    for level in 2..=MAX_LEVEL as usize {
        table[level] = table[level - 1] + 50 * level as u64;
    }
    table
});

/// Total experience required to reach `level` from scratch
pub fn exp_to_reach(level: u32) -> u64 {
    EXP_TABLE[level.clamp(1, MAX_LEVEL) as usize]
}

/// Experience needed to advance from `level` to `level + 1`
///
/// Returns None at the max level.
pub fn delta_to_next(level: u32) -> Option<u64> {
    if level >= MAX_LEVEL {
        None
    } else {
        Some(50 * (level as u64 + 1))
    }
}

/// Result of applying an experience gain to a progression state
#[derive(Clone, Debug)]
pub struct ExperienceAward {
    pub state: ProgressionState,
    pub gained: u64,
    pub leveled_up: bool,
    pub levels_gained: u32,
}

/// Apply an experience gain and normalize level-ups.
///
/// `gained` must be non-negative; callers clamp at the boundary, so a
/// negative value reaching this function is an invariant violation.
pub fn apply_experience(state: &ProgressionState, gained: i64) -> Result<ExperienceAward> {
    if gained < 0 {
        return Err(Error::InvariantViolation(format!(
            "negative experience gain {} reached the ledger",
            gained
        )));
    }
    let gained = gained as u64;

    let mut next = state.clone();
    next.current_exp += gained;
    next.total_exp += gained;

    let mut levels_gained = 0u32;
    while let Some(delta) = delta_to_next(next.level) {
        if next.current_exp < delta {
            break;
        }
        next.current_exp -= delta;
        next.level += 1;
        levels_gained += 1;
    }

    if levels_gained > 0 {
        tracing::debug!(
            "Level up: {} -> {} ({} levels)",
            state.level,
            next.level,
            levels_gained
        );
    }

    Ok(ExperienceAward {
        state: next,
        gained,
        leveled_up: levels_gained > 0,
        levels_gained,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_spot_values() {
        assert_eq!(exp_to_reach(1), 0);
        assert_eq!(exp_to_reach(2), 100);
        assert_eq!(exp_to_reach(3), 250);
        assert_eq!(exp_to_reach(4), 450);
        assert_eq!(exp_to_reach(5), 700);
        assert_eq!(exp_to_reach(6), 1000);
        assert_eq!(exp_to_reach(10), 2700);
        assert_eq!(exp_to_reach(50), 63700);
        assert_eq!(exp_to_reach(100), 252450);
    }

    #[test]
    fn test_simple_gain_no_level_up() {
        let award = apply_experience(&ProgressionState::new(), 50).unwrap();
        assert_eq!(award.state.level, 1);
        assert_eq!(award.state.current_exp, 50);
        assert_eq!(award.state.total_exp, 50);
        assert!(!award.leveled_up);
    }

    #[test]
    fn test_single_level_up_normalizes_overflow() {
        let award = apply_experience(&ProgressionState::new(), 130).unwrap();
        assert_eq!(award.state.level, 2);
        assert_eq!(award.state.current_exp, 30);
        assert!(award.leveled_up);
        assert_eq!(award.levels_gained, 1);
    }

    #[test]
    fn test_multi_level_jump_in_one_call() {
        // 700 exp reaches exactly level 5 from scratch
        let award = apply_experience(&ProgressionState::new(), 700).unwrap();
        assert_eq!(award.state.level, 5);
        assert_eq!(award.state.current_exp, 0);
        assert_eq!(award.levels_gained, 4);
    }

    #[test]
    fn test_post_condition_holds_for_random_gains() {
        let mut state = ProgressionState::new();
        for gain in [13, 999, 77, 5000, 123456, 1, 0, 25000] {
            let award = apply_experience(&state, gain).unwrap();
            state = award.state;
            if let Some(delta) = delta_to_next(state.level) {
                assert!(
                    state.current_exp < delta,
                    "level {} exp {} >= delta {}",
                    state.level,
                    state.current_exp,
                    delta
                );
            }
        }
    }

    #[test]
    fn test_total_exp_is_monotonic() {
        let mut state = ProgressionState::new();
        let mut last_total = 0;
        for gain in [10, 0, 300, 45] {
            state = apply_experience(&state, gain).unwrap().state;
            assert!(state.total_exp >= last_total);
            last_total = state.total_exp;
        }
    }

    #[test]
    fn test_max_level_accumulates_without_leveling() {
        let mut state = ProgressionState::new();
        state = apply_experience(&state, exp_to_reach(MAX_LEVEL) as i64)
            .unwrap()
            .state;
        assert_eq!(state.level, MAX_LEVEL);
        assert_eq!(state.current_exp, 0);

        let award = apply_experience(&state, 10_000).unwrap();
        assert_eq!(award.state.level, MAX_LEVEL);
        assert_eq!(award.state.current_exp, 10_000);
        assert!(!award.leveled_up);
    }

    #[test]
    fn test_negative_gain_is_rejected() {
        let result = apply_experience(&ProgressionState::new(), -1);
        assert!(matches!(
            result,
            Err(crate::Error::InvariantViolation(_))
        ));
    }
}

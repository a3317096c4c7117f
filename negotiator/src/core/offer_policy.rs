//! Backend-owned offer adjustment.
//!
//! The next offer is a pure function of the previous offer, the turn's
//! classification and the streak counters after they have been updated for
//! the turn. Rules are evaluated in priority order: at most one penalty is
//! chosen, and an increase is only considered when no penalty applied.

use crate::core::types::{Conduct, OfferBounds, TurnFlags};

/// Largest single-turn increase.
pub const MAX_UP_JUMP: i64 = 10_000;
/// Largest single-turn decrease.
pub const MAX_DOWN_JUMP: i64 = 3_000;
/// Reward for a turn that brings new substantive justification.
pub const STRONG_ARGUMENT_RAISE: i64 = 5_000;
/// Reward for naming a concrete amount without repeating oneself.
pub const ASKED_AMOUNT_RAISE: i64 = 1_000;
/// Rude turns can never push the offer below `starting_salary - RUDE_FLOOR_MARGIN`.
pub const RUDE_FLOOR_MARGIN: i64 = 5_000;
/// Stale repeats can never push the offer below `starting_salary - REPEAT_FLOOR_MARGIN`.
pub const REPEAT_FLOOR_MARGIN: i64 = 2_000;

/// Streak counters as they stand after the current turn was counted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Streaks {
    pub repeat: u32,
    pub rude: u32,
}

/// Compute the offer that follows `prev_offer` for one classified turn.
pub fn compute_next_offer(
    prev_offer: i64,
    flags: &TurnFlags,
    streaks: Streaks,
    bounds: &OfferBounds,
) -> i64 {
    let mut delta = penalty(flags, streaks);
    if delta == 0 {
        delta = increase(flags);
    }
    let delta = delta.clamp(-MAX_DOWN_JUMP, MAX_UP_JUMP);

    let mut next = prev_offer.saturating_add(delta).min(bounds.target_goal);

    if flags.conduct == Conduct::Rude {
        next = next.max(bounds.starting_salary.saturating_sub(RUDE_FLOOR_MARGIN));
    } else if flags.is_stale_repeat() {
        next = next.max(bounds.starting_salary.saturating_sub(REPEAT_FLOOR_MARGIN));
    }

    next.max(0)
}

fn penalty(flags: &TurnFlags, streaks: Streaks) -> i64 {
    match flags.conduct {
        Conduct::Rude => match streaks.rude {
            0 | 1 => -1_000,
            2 => -2_000,
            _ => -3_000,
        },
        // Venting alone costs nothing; venting while repeating does.
        Conduct::Emotional if flags.repeated_argument => -1_000,
        Conduct::Emotional => 0,
        _ if flags.is_stale_repeat() => match streaks.repeat {
            0..=2 => 0,
            3 => -1_000,
            _ => -2_000,
        },
        _ => 0,
    }
}

fn increase(flags: &TurnFlags) -> i64 {
    if flags.conduct != Conduct::Professional || flags.is_stale_repeat() {
        return 0;
    }
    if flags.new_strong_argument {
        STRONG_ARGUMENT_RAISE
    } else if flags.asked_amount_present && !flags.repeated_argument {
        ASKED_AMOUNT_RAISE
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BOUNDS: OfferBounds = OfferBounds {
        starting_salary: 80_000,
        target_goal: 100_000,
    };

    fn flags(conduct: Conduct) -> TurnFlags {
        TurnFlags {
            conduct,
            ..TurnFlags::neutral()
        }
    }

    fn strong() -> TurnFlags {
        TurnFlags {
            new_strong_argument: true,
            ..TurnFlags::neutral()
        }
    }

    fn repeat() -> TurnFlags {
        TurnFlags {
            repeated_argument: true,
            ..TurnFlags::neutral()
        }
    }

    fn rude_streak(rude: u32) -> Streaks {
        Streaks { repeat: 0, rude }
    }

    fn repeat_streak(repeat: u32) -> Streaks {
        Streaks { repeat, rude: 0 }
    }

    #[test]
    fn extreme_amounts_saturate_instead_of_overflowing() {
        let top = OfferBounds {
            starting_salary: i64::MAX,
            target_goal: i64::MAX,
        };
        assert_eq!(
            compute_next_offer(i64::MAX, &strong(), Streaks::default(), &top),
            i64::MAX
        );

        let bottom = OfferBounds {
            starting_salary: i64::MIN,
            target_goal: 100_000,
        };
        assert_eq!(
            compute_next_offer(0, &flags(Conduct::Rude), rude_streak(1), &bottom),
            0
        );
        assert_eq!(
            compute_next_offer(0, &repeat(), repeat_streak(4), &bottom),
            0
        );
    }

    #[test]
    fn strong_argument_raises_by_five_thousand() {
        let next = compute_next_offer(80_000, &strong(), Streaks::default(), &BOUNDS);
        assert_eq!(next, 85_000);
    }

    #[test]
    fn asked_amount_raises_by_one_thousand() {
        let turn = TurnFlags {
            asked_amount_present: true,
            ..TurnFlags::neutral()
        };
        assert_eq!(
            compute_next_offer(80_000, &turn, Streaks::default(), &BOUNDS),
            81_000
        );
    }

    #[test]
    fn neutral_turn_keeps_offer() {
        let next = compute_next_offer(82_000, &TurnFlags::neutral(), Streaks::default(), &BOUNDS);
        assert_eq!(next, 82_000);
    }

    #[test]
    fn strong_argument_wins_over_asked_amount() {
        let turn = TurnFlags {
            new_strong_argument: true,
            asked_amount_present: true,
            ..TurnFlags::neutral()
        };
        assert_eq!(
            compute_next_offer(80_000, &turn, Streaks::default(), &BOUNDS),
            85_000
        );
    }

    #[test]
    fn rude_penalty_escalates_with_streak() {
        let turn = flags(Conduct::Rude);
        assert_eq!(compute_next_offer(90_000, &turn, rude_streak(1), &BOUNDS), 89_000);
        assert_eq!(compute_next_offer(90_000, &turn, rude_streak(2), &BOUNDS), 88_000);
        assert_eq!(compute_next_offer(90_000, &turn, rude_streak(3), &BOUNDS), 87_000);
        assert_eq!(compute_next_offer(90_000, &turn, rude_streak(7), &BOUNDS), 87_000);
    }

    #[test]
    fn rude_turn_never_earns_a_raise() {
        let turn = TurnFlags {
            conduct: Conduct::Rude,
            new_strong_argument: true,
            ..TurnFlags::neutral()
        };
        assert_eq!(compute_next_offer(80_000, &turn, rude_streak(1), &BOUNDS), 79_000);
    }

    #[test]
    fn rude_floor_holds_at_starting_salary_minus_five_thousand() {
        let turn = flags(Conduct::Rude);
        assert_eq!(compute_next_offer(76_000, &turn, rude_streak(3), &BOUNDS), 75_000);
        assert_eq!(compute_next_offer(74_000, &turn, rude_streak(1), &BOUNDS), 75_000);
    }

    #[test]
    fn emotional_venting_alone_is_free() {
        let next = compute_next_offer(
            85_000,
            &flags(Conduct::Emotional),
            Streaks::default(),
            &BOUNDS,
        );
        assert_eq!(next, 85_000);
    }

    #[test]
    fn emotional_venting_gets_no_raise_even_with_new_argument() {
        let turn = TurnFlags {
            conduct: Conduct::Emotional,
            new_strong_argument: true,
            ..TurnFlags::neutral()
        };
        assert_eq!(
            compute_next_offer(85_000, &turn, Streaks::default(), &BOUNDS),
            85_000
        );
    }

    #[test]
    fn emotional_repeat_costs_one_thousand() {
        let turn = TurnFlags {
            conduct: Conduct::Emotional,
            repeated_argument: true,
            ..TurnFlags::neutral()
        };
        assert_eq!(compute_next_offer(85_000, &turn, repeat_streak(1), &BOUNDS), 84_000);
    }

    #[test]
    fn repeat_is_tolerated_then_penalized() {
        let turn = repeat();
        assert_eq!(compute_next_offer(85_000, &turn, repeat_streak(1), &BOUNDS), 85_000);
        assert_eq!(compute_next_offer(85_000, &turn, repeat_streak(2), &BOUNDS), 85_000);
        assert_eq!(compute_next_offer(85_000, &turn, repeat_streak(3), &BOUNDS), 84_000);
        assert_eq!(compute_next_offer(85_000, &turn, repeat_streak(4), &BOUNDS), 83_000);
    }

    #[test]
    fn repeat_with_asked_amount_earns_nothing() {
        let turn = TurnFlags {
            repeated_argument: true,
            asked_amount_present: true,
            ..TurnFlags::neutral()
        };
        assert_eq!(compute_next_offer(85_000, &turn, repeat_streak(1), &BOUNDS), 85_000);
    }

    #[test]
    fn repeat_with_new_strong_argument_still_raises() {
        let turn = TurnFlags {
            repeated_argument: true,
            new_strong_argument: true,
            ..TurnFlags::neutral()
        };
        assert_eq!(compute_next_offer(85_000, &turn, repeat_streak(5), &BOUNDS), 90_000);
    }

    #[test]
    fn repeat_floor_holds_at_starting_salary_minus_two_thousand() {
        let turn = repeat();
        assert_eq!(compute_next_offer(79_000, &turn, repeat_streak(4), &BOUNDS), 78_000);
        assert_eq!(compute_next_offer(78_500, &turn, repeat_streak(4), &BOUNDS), 78_000);
    }

    #[test]
    fn offer_is_capped_at_target_goal() {
        assert_eq!(
            compute_next_offer(98_000, &strong(), Streaks::default(), &BOUNDS),
            100_000
        );
    }

    #[test]
    fn offer_never_drops_below_zero() {
        let bounds = OfferBounds {
            starting_salary: 0,
            target_goal: 50_000,
        };
        let turn = flags(Conduct::Rude);
        assert_eq!(compute_next_offer(500, &turn, rude_streak(3), &bounds), 0);
    }

    #[test]
    fn only_rude_or_stale_repeat_lowers_offer() {
        let samples = [
            TurnFlags::neutral(),
            strong(),
            flags(Conduct::Emotional),
            TurnFlags {
                asked_amount_present: true,
                ..TurnFlags::neutral()
            },
        ];
        for turn in &samples {
            let next = compute_next_offer(60_000, turn, Streaks::default(), &BOUNDS);
            assert!(next >= 60_000, "{turn:?} lowered the offer to {next}");
        }
    }
}

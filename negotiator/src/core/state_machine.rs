//! Backend-owned status and streak transitions for one negotiation turn.

use crate::core::offer_policy::{Streaks, compute_next_offer};
use crate::core::types::{Conduct, NegotiationState, OfferBounds, Status, TurnFlags};

/// Hint shown on a stalled turn when the model supplied none.
pub const FALLBACK_HINT: &str = "Add one NEW concrete data point: a named market source, quantified KPI, scope increase, competing offer, or internal equity mismatch.";

/// Consecutive turns without a strong argument before the session stalls.
pub const STALL_AFTER_NO_DATA_TURNS: u32 = 2;
/// Consecutive stalled turns before the counterpart ends the conversation.
pub const END_AFTER_STALLED_TURNS: u32 = 3;
/// Strong arguments after which the counterpart must pivot to a non-monetary offer.
pub const PIVOT_AFTER_STRONG_ARGUMENTS: u32 = 2;

/// Apply one classified turn to `prev` and return the resulting state.
///
/// Total: every input produces a state. Rules run in a fixed order and the
/// terminal ones short-circuit the rest of the turn. The mandatory pivot is
/// a final override on top of whatever non-terminal status the turn resolved to.
pub fn apply_turn(prev: &NegotiationState, flags: &TurnFlags, bounds: &OfferBounds) -> NegotiationState {
    let mut next = prev.clone();
    next.turn_count += 1;

    if flags.accepted_distraction {
        return finish(next, Status::AcceptedDistraction);
    }

    match flags.conduct {
        Conduct::Inappropriate => return finish(next, Status::TooRude),
        Conduct::Rude => {
            next.rude_streak += 1;
            if !next.rude_warning_issued {
                // First hostile turn of the session is a warning only.
                next.rude_warning_issued = true;
            } else if next.rude_streak >= 2 {
                return finish(next, Status::TooRude);
            }
        }
        Conduct::Professional | Conduct::Emotional => next.rude_streak = 0,
    }

    if flags.repeated_argument {
        next.repeat_streak += 1;
    } else {
        next.repeat_streak = 0;
    }

    if flags.new_strong_argument {
        next.strong_argument_count += 1;
        next.no_data_turns = 0;
    } else {
        next.no_data_turns += 1;
    }

    next.current_offer = compute_next_offer(
        next.current_offer,
        flags,
        Streaks {
            repeat: next.repeat_streak,
            rude: next.rude_streak,
        },
        bounds,
    );

    if next.current_offer >= bounds.target_goal {
        return finish(next, Status::TargetReached);
    }

    if next.no_data_turns >= STALL_AFTER_NO_DATA_TURNS {
        next.status = Status::Stalled;
        next.stalled_streak += 1;
    } else {
        next.status = Status::Negotiating;
        next.stalled_streak = 0;
    }

    if next.stalled_streak >= END_AFTER_STALLED_TURNS {
        return finish(next, Status::EndConvo);
    }

    next.hint = if next.status == Status::Stalled {
        let hint = flags.hint.trim();
        if hint.is_empty() {
            FALLBACK_HINT.to_string()
        } else {
            hint.to_string()
        }
    } else {
        String::new()
    };

    if next.strong_argument_count >= PIVOT_AFTER_STRONG_ARGUMENTS
        && !next.distraction_used
        && !next.status.is_terminal()
    {
        next.status = Status::DistractionOffered;
        next.distraction_used = true;
        next.hint.clear();
    }

    next
}

fn finish(mut state: NegotiationState, status: Status) -> NegotiationState {
    state.status = status;
    state.hint.clear();
    state
}

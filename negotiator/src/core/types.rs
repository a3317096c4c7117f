//! Shared deterministic types for negotiation core logic.
//!
//! These types define stable contracts between core components. They should not
//! depend on external state or I/O and must remain deterministic across runs.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Conduct category the model assigns to the latest user turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Conduct {
    #[default]
    Professional,
    /// Pleading or venting without insults.
    Emotional,
    /// Insults, profanity, hostile accusations.
    Rude,
    /// Harassment, threats, extreme abuse. Ends the session immediately.
    Inappropriate,
}

impl Conduct {
    /// Parse a model-reported label. Unrecognized labels fall back to
    /// [`Conduct::Professional`].
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "emotional" => Conduct::Emotional,
            "rude" => Conduct::Rude,
            "inappropriate" => Conduct::Inappropriate,
            _ => Conduct::Professional,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Conduct::Professional => "professional",
            Conduct::Emotional => "emotional",
            Conduct::Rude => "rude",
            Conduct::Inappropriate => "inappropriate",
        }
    }
}

/// Session status owned by the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    #[default]
    Negotiating,
    /// Consecutive turns without new evidence; coaching hint is populated.
    Stalled,
    /// A non-monetary pivot was forced this turn. Not terminal.
    DistractionOffered,
    AcceptedDistraction,
    TargetReached,
    TooRude,
    EndConvo,
}

impl Status {
    /// Terminal statuses stop negotiation; later turns short-circuit.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            Status::AcceptedDistraction | Status::TargetReached | Status::TooRude | Status::EndConvo
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Status::Negotiating => "negotiating",
            Status::Stalled => "stalled",
            Status::DistractionOffered => "distraction_offered",
            Status::AcceptedDistraction => "accepted_distraction",
            Status::TargetReached => "target_reached",
            Status::TooRude => "too_rude",
            Status::EndConvo => "end_convo",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Backend-owned negotiation state. Only the state machine writes it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NegotiationState {
    pub current_offer: i64,
    pub turn_count: u32,
    pub strong_argument_count: u32,
    pub distraction_used: bool,
    pub no_data_turns: u32,
    pub repeat_streak: u32,
    pub rude_streak: u32,
    pub rude_warning_issued: bool,
    pub stalled_streak: u32,
    pub status: Status,
    /// Coaching text; non-empty only while `status` is `stalled`.
    pub hint: String,
}

impl NegotiationState {
    /// Fresh state for a new session, starting at `baseline_offer`.
    pub fn new(baseline_offer: i64) -> Self {
        Self {
            current_offer: baseline_offer.max(0),
            turn_count: 0,
            strong_argument_count: 0,
            distraction_used: false,
            no_data_turns: 0,
            repeat_streak: 0,
            rude_streak: 0,
            rude_warning_issued: false,
            stalled_streak: 0,
            status: Status::Negotiating,
            hint: String::new(),
        }
    }
}

/// Normalized per-turn classification.
///
/// Every field has a safe default, so a missing or partial classification
/// is indistinguishable from a neutral professional turn.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TurnFlags {
    pub new_strong_argument: bool,
    pub repeated_argument: bool,
    pub conduct: Conduct,
    pub asked_amount_present: bool,
    pub accepted_distraction: bool,
    pub hint: String,
}

impl TurnFlags {
    /// Neutral classification used when the model reports nothing usable.
    pub fn neutral() -> Self {
        Self::default()
    }

    /// Repeated justification with nothing new: the condition both the
    /// repeat penalty and the repeat floor key off.
    pub fn is_stale_repeat(&self) -> bool {
        self.repeated_argument && !self.new_strong_argument
    }
}

/// Immutable per-session limits the offer policy works within.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OfferBounds {
    /// Starting salary as entered; the penalty floors are relative to it.
    pub starting_salary: i64,
    /// Offers are capped at the goal; reaching it ends the session.
    pub target_goal: i64,
}

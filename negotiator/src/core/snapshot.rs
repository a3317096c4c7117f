//! Authoritative state block handed to the model with every user turn.

use crate::core::types::NegotiationState;

pub const STATE_BANNER: &str = "CURRENT STATE (AUTHORITATIVE - DO NOT REPRINT)";
pub const USER_MESSAGE_BANNER: &str = "USER MESSAGE";
const RULE: &str = "=====================";

/// Render `state` as one `key: value` line per field. `hint` is omitted.
pub fn render_state_snapshot(state: &NegotiationState) -> String {
    let lines = [
        format!("current_offer: {}", state.current_offer),
        format!("turn_count: {}", state.turn_count),
        format!("strong_argument_count: {}", state.strong_argument_count),
        format!("distraction_used: {}", state.distraction_used),
        format!("no_data_turns: {}", state.no_data_turns),
        format!("repeat_streak: {}", state.repeat_streak),
        format!("stalled_streak: {}", state.stalled_streak),
        format!("rude_warning_issued: {}", state.rude_warning_issued),
        format!("rude_streak: {}", state.rude_streak),
        format!("status: {}", state.status),
    ];
    format!("{RULE}\n{STATE_BANNER}\n{RULE}\n{}\n{RULE}", lines.join("\n"))
}

/// Compose the user-turn message: state snapshot followed by the user's text.
pub fn render_user_turn(state: &NegotiationState, user_text: &str) -> String {
    format!(
        "{}\n\n{RULE}\n{USER_MESSAGE_BANNER}\n{RULE}\n{}",
        render_state_snapshot(state),
        user_text.trim()
    )
}

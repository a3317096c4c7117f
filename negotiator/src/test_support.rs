//! Test-only helpers: a scripted model client and reply builders.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::json;

use crate::core::classifier::to_wire;
use crate::core::transcript::ChatMessage;
use crate::core::types::TurnFlags;
use crate::error::ModelError;
use crate::io::model::ModelClient;

/// Model client that replays predetermined results in order and records
/// every request it receives.
///
/// Once the script is exhausted every call fails with [`ModelError::Request`].
pub struct ScriptedModel {
    replies: Mutex<VecDeque<Result<String, ModelError>>>,
    requests: Mutex<Vec<Vec<ChatMessage>>>,
}

impl ScriptedModel {
    pub fn new(replies: Vec<Result<String, ModelError>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Number of `complete` calls made so far.
    pub fn calls(&self) -> usize {
        self.requests.lock().expect("requests lock").len()
    }

    /// Messages sent with the most recent call.
    pub fn last_request(&self) -> Option<Vec<ChatMessage>> {
        self.requests.lock().expect("requests lock").last().cloned()
    }

    /// Messages sent with every call, oldest first.
    pub fn requests(&self) -> Vec<Vec<ChatMessage>> {
        self.requests.lock().expect("requests lock").clone()
    }
}

#[async_trait]
impl ModelClient for ScriptedModel {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, ModelError> {
        self.requests
            .lock()
            .expect("requests lock")
            .push(messages.to_vec());
        self.replies
            .lock()
            .expect("replies lock")
            .pop_front()
            .unwrap_or_else(|| Err(ModelError::Request("scripted replies exhausted".to_string())))
    }
}

/// Reply whose classification block holds exactly `fields`, a JSON object
/// body such as `"new_strong_argument":"Y","conduct":"professional"`.
pub fn flags_reply(dialogue: &str, fields: &str) -> String {
    format!("{dialogue}\n<!--\n{{\"turn_flags\":{{{fields}}}}}\n-->")
}

/// Reply carrying `flags` in the full wire shape.
pub fn reply_with(dialogue: &str, flags: &TurnFlags) -> String {
    format!("{dialogue}\n<!-- {} -->", to_wire(flags))
}

/// Reply carrying a neutral professional classification.
pub fn neutral_reply(dialogue: &str) -> String {
    reply_with(dialogue, &TurnFlags::neutral())
}

/// Chat-completions response body wrapping `content`, as OpenRouter returns it.
pub fn completion_body(content: &str) -> String {
    json!({
        "id": "gen-test",
        "choices": [{"message": {"role": "assistant", "content": content}}],
    })
    .to_string()
}

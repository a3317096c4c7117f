//! Orchestration for one negotiation session.
//!
//! [`Negotiator`] owns the session configuration, the backend negotiation
//! state and the conversation transcript. Each call to
//! [`Negotiator::process_turn`] either short-circuits a finished session or
//! runs one model round-trip and feeds the reported classification through
//! the state machine.

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use crate::core::classifier::parse_reply;
use crate::core::snapshot::render_user_turn;
use crate::core::state_machine::apply_turn;
use crate::core::transcript::{ChatMessage, Transcript};
use crate::core::types::{NegotiationState, OfferBounds, Status, TurnFlags};
use crate::error::NegotiationError;
use crate::io::model::ModelClient;
use crate::io::prompt::{CoachRequest, PersonaFacts, PromptEngine};

pub const END_CONVO_MESSAGE: &str = "This conversation isn't moving forward. Without new, specific data we're done here. The chat has ended.";
pub const TOO_RUDE_MESSAGE: &str =
    "Your behavior isn't appropriate for a professional discussion. I'm stopping this chat now.";
pub const FALLBACK_FEEDBACK: &str = "Nice work. Next time: bring one named market source and one quantified KPI early, then anchor with a specific number and ask a direct close.";

/// Largest accepted money amount. Leaves headroom for offer arithmetic.
pub const MAX_AMOUNT: i64 = i64::MAX / 2;

/// Default number of transcript messages summarised for coaching feedback.
pub const DEFAULT_RECENT_MESSAGES: usize = 8;

/// Validated, immutable inputs for one session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionConfig {
    pub starting_salary: i64,
    pub job_title: String,
    pub market_average: i64,
    pub target_goal: i64,
    /// Opening offer: the starting salary, or 90% of market average when the
    /// starting salary is zero.
    pub baseline_offer: i64,
}

impl SessionConfig {
    /// Validate raw inputs. Amounts must be finite, non-negative and at most
    /// [`MAX_AMOUNT`]; they are rounded to whole units.
    pub fn new(
        starting_salary: f64,
        job_title: &str,
        market_average: f64,
        target_goal: f64,
    ) -> Result<Self, NegotiationError> {
        let starting_salary = whole_amount("startingSalary", starting_salary)?;
        let market_average = whole_amount("marketAverage", market_average)?;
        let target_goal = whole_amount("targetGoal", target_goal)?;
        let job_title = job_title.trim();
        if job_title.is_empty() {
            return Err(NegotiationError::configuration("jobTitle must be non-empty"));
        }

        let baseline_offer = if starting_salary == 0 {
            (market_average as f64 * 0.9).round() as i64
        } else {
            starting_salary
        };

        Ok(Self {
            starting_salary,
            job_title: job_title.to_string(),
            market_average,
            target_goal,
            baseline_offer: baseline_offer.max(0),
        })
    }

    /// Validate a JSON initialization body with `startingSalary`, `jobTitle`,
    /// `marketAverage` and `targetGoal`. Amounts may be numbers or numeric strings.
    pub fn from_json(body: &Value) -> Result<Self, NegotiationError> {
        let job_title = body
            .get("jobTitle")
            .and_then(Value::as_str)
            .ok_or_else(|| NegotiationError::configuration("jobTitle must be a string"))?;
        Self::new(
            json_amount(body, "startingSalary")?,
            job_title,
            json_amount(body, "marketAverage")?,
            json_amount(body, "targetGoal")?,
        )
    }

    pub fn bounds(&self) -> OfferBounds {
        OfferBounds {
            starting_salary: self.starting_salary,
            target_goal: self.target_goal,
        }
    }
}

fn whole_amount(field: &str, value: f64) -> Result<i64, NegotiationError> {
    if !value.is_finite() {
        return Err(NegotiationError::configuration(format!(
            "{field} must be a finite number"
        )));
    }
    let rounded = value.round();
    if rounded < 0.0 || rounded > MAX_AMOUNT as f64 {
        return Err(NegotiationError::configuration(format!(
            "{field} must be between 0 and {MAX_AMOUNT}"
        )));
    }
    Ok(rounded as i64)
}

fn json_amount(body: &Value, field: &str) -> Result<f64, NegotiationError> {
    let parsed = match body.get(field) {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.ok_or_else(|| NegotiationError::configuration(format!("{field} must be a number")))
}

/// Result of processing one user message.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TurnResult {
    /// Dialogue (or closing/coaching text) to show the user.
    pub text: String,
    /// Parsed classification payload; `None` for short-circuited turns and
    /// replies without a usable block.
    pub classification: Option<Value>,
    /// Negotiation state after the turn.
    pub state: NegotiationState,
    /// Unmodified model reply; empty for short-circuited turns.
    pub raw: String,
}

struct Session {
    config: SessionConfig,
    state: NegotiationState,
    transcript: Transcript,
}

/// Session orchestrator. Holds at most one active session at a time.
pub struct Negotiator {
    model: Arc<dyn ModelClient>,
    prompts: Arc<PromptEngine>,
    recent_messages: usize,
    session: Option<Session>,
}

impl Negotiator {
    pub fn new(model: Arc<dyn ModelClient>) -> Self {
        Self {
            model,
            prompts: Arc::new(PromptEngine::new()),
            recent_messages: DEFAULT_RECENT_MESSAGES,
            session: None,
        }
    }

    /// Share a prompt engine across negotiators.
    pub fn with_prompts(mut self, prompts: Arc<PromptEngine>) -> Self {
        self.prompts = prompts;
        self
    }

    /// Number of transcript messages summarised for coaching feedback.
    pub fn with_recent_messages(mut self, count: usize) -> Self {
        self.recent_messages = count.max(1);
        self
    }

    /// Start a new session, discarding any previous one.
    ///
    /// On error the previous session, if any, is left untouched.
    pub fn initialize(&mut self, config: SessionConfig) -> Result<(), NegotiationError> {
        let persona = self
            .prompts
            .render_persona(&PersonaFacts {
                job_title: &config.job_title,
                starting_salary: config.starting_salary,
                market_average: config.market_average,
                target_goal: config.target_goal,
            })
            .map_err(|err| NegotiationError::configuration(format!("{err:#}")))?;

        info!(
            job_title = %config.job_title,
            baseline_offer = config.baseline_offer,
            target_goal = config.target_goal,
            "negotiation session initialized"
        );

        self.session = Some(Session {
            state: NegotiationState::new(config.baseline_offer),
            transcript: Transcript::new(persona),
            config,
        });
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.session.is_some()
    }

    pub fn config(&self) -> Option<&SessionConfig> {
        self.session.as_ref().map(|s| &s.config)
    }

    pub fn state(&self) -> Option<&NegotiationState> {
        self.session.as_ref().map(|s| &s.state)
    }

    pub fn transcript(&self) -> Option<&Transcript> {
        self.session.as_ref().map(|s| &s.transcript)
    }

    /// Process one user message.
    ///
    /// Fails with [`NegotiationError::NotInitialized`] before `initialize`, and
    /// with [`NegotiationError::ModelTransport`] when the model call fails; in
    /// that case state and transcript are exactly as before the call.
    #[instrument(skip_all, fields(chars = user_text.len()))]
    pub async fn process_turn(&mut self, user_text: &str) -> Result<TurnResult, NegotiationError> {
        let Self {
            model,
            prompts,
            recent_messages,
            session,
        } = self;
        let session = session.as_mut().ok_or(NegotiationError::NotInitialized)?;

        match session.state.status {
            Status::TooRude => return Ok(closing(session, TOO_RUDE_MESSAGE)),
            Status::EndConvo => return Ok(closing(session, END_CONVO_MESSAGE)),
            Status::AcceptedDistraction | Status::TargetReached => {
                let text = coach_feedback(&**model, &**prompts, session, *recent_messages).await;
                return Ok(closing(session, &text));
            }
            Status::Negotiating | Status::Stalled | Status::DistractionOffered => {}
        }

        session
            .transcript
            .push_user(render_user_turn(&session.state, user_text));

        let raw = match model.complete(session.transcript.messages()).await {
            Ok(raw) => raw,
            Err(err) => {
                session.transcript.withdraw_user_turn();
                warn!(error = %err, "model call failed; user turn withdrawn");
                return Err(err.into());
            }
        };
        session.transcript.push_assistant(raw.clone());

        let parsed = parse_reply(&raw);
        let flags = parsed.flags.unwrap_or_else(|| {
            warn!("reply carried no usable classification; treating turn as neutral");
            TurnFlags::neutral()
        });

        let prev_offer = session.state.current_offer;
        session.state = apply_turn(&session.state, &flags, &session.config.bounds());
        let state = &session.state;
        debug!(
            turn = state.turn_count,
            prev_offer,
            offer = state.current_offer,
            status = %state.status,
            "turn applied"
        );
        if state.status.is_terminal() {
            info!(status = %state.status, offer = state.current_offer, "session reached terminal status");
        }

        Ok(TurnResult {
            text: parsed.dialogue,
            classification: parsed.payload,
            state: state.clone(),
            raw,
        })
    }
}

fn closing(session: &Session, text: &str) -> TurnResult {
    TurnResult {
        text: text.to_string(),
        classification: None,
        state: session.state.clone(),
        raw: String::new(),
    }
}

/// Retrospective feedback for a session that ended well. Never fails: any
/// problem falls back to [`FALLBACK_FEEDBACK`].
async fn coach_feedback(
    model: &dyn ModelClient,
    prompts: &PromptEngine,
    session: &Session,
    recent_messages: usize,
) -> String {
    let recent = session.transcript.render_recent(recent_messages);
    let messages = prompts.render_coach_system().and_then(|system| {
        let request = prompts.render_coach_request(&CoachRequest {
            outcome: session.state.status.as_str(),
            final_offer: session.state.current_offer,
            recent: &recent,
        })?;
        Ok([ChatMessage::system(system), ChatMessage::user(request)])
    });

    let messages = match messages {
        Ok(messages) => messages,
        Err(err) => {
            let error = format!("{err:#}");
            warn!(%error, "coach prompt rendering failed; using fallback feedback");
            return FALLBACK_FEEDBACK.to_string();
        }
    };

    match model.complete(&messages).await {
        Ok(feedback) if !feedback.trim().is_empty() => feedback.trim().to_string(),
        Ok(_) => {
            warn!("coach returned empty feedback; using fallback feedback");
            FALLBACK_FEEDBACK.to_string()
        }
        Err(err) => {
            warn!(error = %err, "coach feedback failed; using fallback feedback");
            FALLBACK_FEEDBACK.to_string()
        }
    }
}

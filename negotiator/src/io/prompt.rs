//! Persona and coaching prompts rendered with minijinja.

use anyhow::{Context, Result};
use minijinja::{Environment, context};

const PERSONA_TEMPLATE: &str = include_str!("prompts/persona.md");
const COACH_TEMPLATE: &str = include_str!("prompts/coach.md");
const COACH_REQUEST_TEMPLATE: &str = include_str!("prompts/coach_request.md");

/// Session facts the persona instruction is written around.
#[derive(Debug, Clone, Copy)]
pub struct PersonaFacts<'a> {
    pub job_title: &'a str,
    pub starting_salary: i64,
    pub market_average: i64,
    pub target_goal: i64,
}

/// Inputs for a retrospective coaching request.
#[derive(Debug, Clone, Copy)]
pub struct CoachRequest<'a> {
    pub outcome: &'a str,
    pub final_offer: i64,
    /// Recent transcript rendered as `ROLE: content` lines.
    pub recent: &'a str,
}

/// Template engine wrapper around minijinja.
pub struct PromptEngine {
    env: Environment<'static>,
}

impl PromptEngine {
    pub fn new() -> Self {
        let mut env = Environment::new();
        env.add_template("persona", PERSONA_TEMPLATE)
            .expect("persona template should be valid");
        env.add_template("coach", COACH_TEMPLATE)
            .expect("coach template should be valid");
        env.add_template("coach_request", COACH_REQUEST_TEMPLATE)
            .expect("coach request template should be valid");
        Self { env }
    }

    /// System instruction for the negotiation counterpart.
    pub fn render_persona(&self, facts: &PersonaFacts<'_>) -> Result<String> {
        let template = self.env.get_template("persona")?;
        let rendered = template
            .render(context! {
                job_title => facts.job_title.trim(),
                starting_salary => facts.starting_salary,
                market_average => facts.market_average,
                target_goal => facts.target_goal,
            })
            .context("render persona prompt")?;
        Ok(rendered)
    }

    /// System instruction for coaching mode.
    pub fn render_coach_system(&self) -> Result<String> {
        let template = self.env.get_template("coach")?;
        Ok(template.render(context! {})?)
    }

    /// User message asking the coach for feedback on a finished session.
    pub fn render_coach_request(&self, request: &CoachRequest<'_>) -> Result<String> {
        let template = self.env.get_template("coach_request")?;
        let rendered = template
            .render(context! {
                outcome => request.outcome,
                final_offer => request.final_offer,
                recent => request.recent.trim(),
            })
            .context("render coach request")?;
        Ok(rendered.trim().to_string())
    }
}

impl Default for PromptEngine {
    fn default() -> Self {
        Self::new()
    }
}

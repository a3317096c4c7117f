//! Salary-negotiation practice CLI.
//!
//! `negotiator chat` runs a session against the configured model on
//! stdin/stdout. `negotiator salary` exposes the market-rate table and the
//! target-salary calculation as JSON.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, anyhow};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;

use negotiator::core::salary::{calculate_target, known_titles, market_data};
use negotiator::error::NegotiationError;
use negotiator::exit_codes;
use negotiator::io::config::load_config;
use negotiator::io::model::OpenRouterClient;
use negotiator::logging;
use negotiator::session::{Negotiator, SessionConfig, TurnResult};

#[derive(Parser)]
#[command(
    name = "negotiator",
    version,
    about = "Practice salary negotiation against a model-played hiring manager"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Negotiate interactively; one line of stdin per turn.
    Chat(ChatArgs),
    /// Market salary data and target calculation.
    Salary {
        #[command(subcommand)]
        command: SalaryCommand,
    },
}

#[derive(Args)]
struct ChatArgs {
    /// Current salary; 0 means none, and the opening offer becomes 90% of market.
    #[arg(long)]
    starting_salary: f64,
    #[arg(long)]
    job_title: String,
    #[arg(long)]
    market_average: f64,
    /// Offer that ends the session successfully when reached.
    #[arg(long)]
    target_goal: f64,
    /// Path to the TOML config; defaults apply when the file is missing.
    #[arg(long, default_value = "negotiator.toml")]
    config: PathBuf,
}

#[derive(Subcommand)]
enum SalaryCommand {
    /// Print market data for a job title.
    Lookup {
        job: String,
    },
    /// Print a target salary with achievement bonuses applied.
    Target {
        #[arg(long)]
        market_rate: f64,
        #[arg(long, default_value_t = 0.0)]
        current_salary: f64,
        /// Achievement label; repeat for several.
        #[arg(long = "achievement")]
        achievements: Vec<String>,
    },
}

#[tokio::main]
async fn main() {
    logging::init();
    let code = match run().await {
        Ok(()) => exit_codes::OK,
        Err(err) => {
            eprintln!("{:#}", err);
            exit_code(&err)
        }
    };
    std::process::exit(code);
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Command::Chat(args) => cmd_chat(args).await,
        Command::Salary { command } => cmd_salary(command),
    }
}

fn exit_code(err: &anyhow::Error) -> i32 {
    match err.downcast_ref::<NegotiationError>() {
        Some(NegotiationError::ModelTransport(_)) => exit_codes::TRANSPORT,
        _ => exit_codes::INVALID,
    }
}

async fn cmd_chat(args: ChatArgs) -> Result<()> {
    let config = load_config(&args.config)?;
    let session = SessionConfig::new(
        args.starting_salary,
        &args.job_title,
        args.market_average,
        args.target_goal,
    )?;
    let client = OpenRouterClient::from_config(&config.model).context("create model client")?;

    let mut negotiator =
        Negotiator::new(Arc::new(client)).with_recent_messages(config.coach.recent_messages);
    negotiator.initialize(session)?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    writeln!(
        out,
        "Negotiating for {} (opening offer ${}). Type your message; Ctrl-D to quit.",
        args.job_title.trim(),
        negotiator.state().map(|s| s.current_offer).unwrap_or_default()
    )?;
    run_chat(&mut negotiator, io::stdin().lock(), &mut out).await
}

/// Read one turn per input line until end of input or a finished session.
///
/// A transport failure leaves the session untouched, so it is reported and
/// the user can resend the same message.
async fn run_chat<R: BufRead, W: Write>(
    negotiator: &mut Negotiator,
    mut input: R,
    out: &mut W,
) -> Result<()> {
    let mut line = String::new();
    loop {
        write!(out, "> ")?;
        out.flush().context("flush stdout")?;
        line.clear();
        if input.read_line(&mut line).context("read stdin")? == 0 {
            return Ok(());
        }
        if line.trim().is_empty() {
            continue;
        }

        let result = match negotiator.process_turn(&line).await {
            Ok(result) => result,
            Err(err @ NegotiationError::ModelTransport(_)) => {
                eprintln!("{err}; message not delivered, please send it again");
                continue;
            }
            Err(err) => return Err(err.into()),
        };
        print_turn(out, &result)?;

        if result.state.status.is_terminal() {
            // Closing words or coaching feedback for the finished session.
            let closing = negotiator.process_turn("").await?;
            writeln!(out, "\n{}", closing.text)?;
            return Ok(());
        }
    }
}

fn print_turn<W: Write>(out: &mut W, result: &TurnResult) -> Result<()> {
    writeln!(out, "\n{}\n", result.text)?;
    writeln!(
        out,
        "[status: {} | offer: ${}]",
        result.state.status, result.state.current_offer
    )?;
    if !result.state.hint.is_empty() {
        writeln!(out, "[hint: {}]", result.state.hint)?;
    }
    Ok(())
}

fn cmd_salary(command: SalaryCommand) -> Result<()> {
    match command {
        SalaryCommand::Lookup { job } => {
            let data = market_data(&job).ok_or_else(|| {
                anyhow!(
                    "no salary data for {:?}; known titles: {}",
                    job.trim(),
                    known_titles().collect::<Vec<_>>().join(", ")
                )
            })?;
            print_json(&data)
        }
        SalaryCommand::Target {
            market_rate,
            current_salary,
            achievements,
        } => {
            if !market_rate.is_finite() || !current_salary.is_finite() {
                return Err(anyhow!("salary amounts must be finite numbers"));
            }
            let target = calculate_target(
                market_rate.round() as i64,
                &achievements,
                current_salary.round() as i64,
            );
            print_json(&target)
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let payload = serde_json::to_string_pretty(value).context("serialize json")?;
    println!("{payload}");
    Ok(())
}

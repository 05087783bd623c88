use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use forecast_core::{BudgetInputs, SessionEvent, SessionState};
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod advisor;
mod auth;
mod chat;
mod config;
mod display;
mod llm;
mod state;

use llm::OpenAiClient;

#[derive(Parser, Debug)]
#[command(
    name = "forecast",
    version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("FORECAST_BUILD_SHA"), ")"),
    about = "Monthly budget and savings-goal forecaster"
)]
struct Cli {
    /// Debug logging (RUST_LOG takes precedence)
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compute total income, total expenses and net monthly savings
    Budget {
        #[command(flatten)]
        budget: BudgetArgs,

        /// Print machine-readable JSON
        #[arg(long)]
        json: bool,
    },

    /// Project how long a savings goal takes, saving vs. investing
    Project {
        #[command(flatten)]
        goal: GoalArgs,

        /// Ask the AI strategist for educational suggestions
        #[arg(long)]
        advise: bool,

        /// Print machine-readable JSON
        #[arg(long)]
        json: bool,
    },

    /// Chat with the AI strategist about a projected goal (TTY required)
    Chat {
        #[command(flatten)]
        goal: GoalArgs,
    },

    /// Manage ~/.forecaster/config.toml
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },

    /// Store API credentials
    Auth {
        #[command(subcommand)]
        command: AuthCommand,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Write the default config (no-op if it exists)
    Init,
    /// Print the effective config
    Show,
}

#[derive(Subcommand, Debug)]
enum AuthCommand {
    /// Paste an OpenAI API key into ~/.forecaster/auth.json
    PasteOpenaiApiKey,
}

/// Monthly amounts. Unset flags fall back to --from, then to a typical month.
#[derive(Args, Debug, Clone)]
struct BudgetArgs {
    /// JSON file with any of the budget fields
    #[arg(long)]
    from: Option<PathBuf>,

    #[arg(long)]
    primary_income: Option<f64>,
    #[arg(long)]
    additional_income: Option<f64>,
    #[arg(long)]
    housing: Option<f64>,
    #[arg(long)]
    utilities: Option<f64>,
    #[arg(long)]
    internet: Option<f64>,
    #[arg(long)]
    phone: Option<f64>,
    #[arg(long)]
    groceries: Option<f64>,
    #[arg(long)]
    transportation: Option<f64>,
    #[arg(long)]
    insurance: Option<f64>,
    #[arg(long)]
    subscriptions: Option<f64>,
    #[arg(long)]
    dining_out: Option<f64>,
    #[arg(long)]
    other: Option<f64>,
}

#[derive(Args, Debug, Clone)]
struct GoalArgs {
    /// Savings goal amount
    #[arg(long, default_value_t = 20_000.0)]
    goal: f64,

    #[command(flatten)]
    budget: BudgetArgs,
}

impl BudgetArgs {
    fn resolve(&self) -> Result<BudgetInputs> {
        let mut inputs = match &self.from {
            Some(path) => {
                let s = std::fs::read_to_string(path)
                    .with_context(|| format!("read {}", path.display()))?;
                serde_json::from_str(&s).with_context(|| format!("parse {}", path.display()))?
            }
            None => BudgetInputs::sample(),
        };

        let overrides = [
            (&mut inputs.primary_income, self.primary_income),
            (&mut inputs.additional_income, self.additional_income),
            (&mut inputs.housing, self.housing),
            (&mut inputs.utilities, self.utilities),
            (&mut inputs.internet, self.internet),
            (&mut inputs.phone, self.phone),
            (&mut inputs.groceries, self.groceries),
            (&mut inputs.transportation, self.transportation),
            (&mut inputs.insurance, self.insurance),
            (&mut inputs.subscriptions, self.subscriptions),
            (&mut inputs.dining_out, self.dining_out),
            (&mut inputs.other, self.other),
        ];
        for (field, value) in overrides {
            if let Some(v) = value {
                *field = v;
            }
        }

        inputs.validate()?;
        Ok(inputs)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Priority: RUST_LOG > --verbose > warn. Logs go to stderr.
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false).compact())
        .init();

    match cli.command {
        Command::Budget { budget, json } => {
            let state = submit(&budget)?;
            let (inputs, summary) = match &state {
                SessionState::BudgetComputed { inputs, summary } => (inputs, summary),
                _ => bail!("unexpected session state: {}", state.name()),
            };

            if json {
                let notice = (!summary.can_project()).then_some(display::OVERSPENT_NOTICE);
                display::print_json(inputs, summary, None, None, notice)?;
            } else {
                display::print_summary(inputs, summary);
                if !summary.can_project() {
                    display::print_notice(display::OVERSPENT_NOTICE);
                }
            }
        }

        Command::Project { goal, advise, json } => {
            let cfg = config::load_config()?;
            let state = project(&goal, cfg.projection.annual_rate)?;

            let state = if advise {
                match OpenAiClient::from_config(&cfg.llm) {
                    Ok(client) => advisor::advise(&client, state).await,
                    Err(e) => state.transition(SessionEvent::AssistantFailed(format!("{e:#}")))?,
                }
            } else {
                state
            };

            report_projection(&state, json)?;
        }

        Command::Chat { goal } => {
            let cfg = config::load_config()?;
            let state = project(&goal, cfg.projection.annual_rate)?;
            let client = OpenAiClient::from_config(&cfg.llm)?;

            println!("Asking the strategist…");
            let state = advisor::advise_blocking(&client, state);
            let state = chat::run_chat(&client, state, cfg.chat.max_turns_context)?;

            if let Some(notice) = state.notice() {
                display::print_notice(notice);
            }
        }

        Command::Config { command } => match command {
            ConfigCommand::Init => config::init_config()?,
            ConfigCommand::Show => config::show_config()?,
        },

        Command::Auth { command } => match command {
            AuthCommand::PasteOpenaiApiKey => auth::openai_paste_api_key()?,
        },
    }

    Ok(())
}

fn submit(budget: &BudgetArgs) -> Result<SessionState> {
    let inputs = budget.resolve()?;
    Ok(SessionState::Idle.transition(SessionEvent::SubmitBudget(inputs))?)
}

fn project(goal: &GoalArgs, annual_rate: f64) -> Result<SessionState> {
    if !goal.goal.is_finite() || goal.goal < 0.0 {
        bail!("--goal must be a non-negative amount (got {})", goal.goal);
    }
    let state = submit(&goal.budget)?;
    Ok(state.transition(SessionEvent::ProjectGoal {
        savings_goal: goal.goal,
        annual_rate,
    })?)
}

fn report_projection(state: &SessionState, json: bool) -> Result<()> {
    let (inputs, summary, projection) = match state {
        SessionState::GoalProjected {
            inputs,
            summary,
            projection,
            ..
        }
        | SessionState::ChatActive {
            inputs,
            summary,
            projection,
            ..
        } => (inputs, summary, projection),
        _ => bail!("unexpected session state: {}", state.name()),
    };
    let advice = state.transcript().first().map(|m| m.content.as_str());

    if json {
        return display::print_json(inputs, summary, Some(projection), advice, state.notice());
    }

    display::print_summary(inputs, summary);
    display::print_projection(projection);
    if let Some(advice) = advice {
        println!("\n# AI investment strategist\n");
        println!("{advice}");
    }
    if let Some(notice) = state.notice() {
        display::print_notice(notice);
    }
    Ok(())
}

//! Application session as an explicit state machine.
//!
//! `Idle -> BudgetComputed -> (GoalProjected)* -> ChatActive`
//!
//! Each transition consumes the previous state and one event and returns
//! the next state. Submitting a new budget always starts over.

use thiserror::Error;

use crate::budget::{summarize, BudgetInputs, BudgetSummary};
use crate::projection::{project_at_rate, GoalProjection};
use crate::prompts::ChatMessage;

#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    SubmitBudget(BudgetInputs),
    ProjectGoal { savings_goal: f64, annual_rate: f64 },
    AssistantReplied(String),
    UserSaid(String),
    /// The completion call failed; results stay as they are
    AssistantFailed(String),
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum SessionState {
    #[default]
    Idle,
    BudgetComputed {
        inputs: BudgetInputs,
        summary: BudgetSummary,
    },
    GoalProjected {
        inputs: BudgetInputs,
        summary: BudgetSummary,
        projection: GoalProjection,
        notice: Option<String>,
    },
    ChatActive {
        inputs: BudgetInputs,
        summary: BudgetSummary,
        projection: GoalProjection,
        transcript: Vec<ChatMessage>,
        notice: Option<String>,
    },
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SessionError {
    #[error("no budget has been calculated yet")]
    NoBudget,

    #[error("net monthly balance is {0:.2}; a positive balance is needed to project savings")]
    NonPositiveBalance(f64),

    #[error("no goal has been projected yet")]
    NoProjection,
}

impl SessionState {
    pub fn name(&self) -> &'static str {
        match self {
            SessionState::Idle => "idle",
            SessionState::BudgetComputed { .. } => "budget-computed",
            SessionState::GoalProjected { .. } => "goal-projected",
            SessionState::ChatActive { .. } => "chat-active",
        }
    }

    pub fn summary(&self) -> Option<&BudgetSummary> {
        match self {
            SessionState::Idle => None,
            SessionState::BudgetComputed { summary, .. }
            | SessionState::GoalProjected { summary, .. }
            | SessionState::ChatActive { summary, .. } => Some(summary),
        }
    }

    pub fn projection(&self) -> Option<&GoalProjection> {
        match self {
            SessionState::GoalProjected { projection, .. }
            | SessionState::ChatActive { projection, .. } => Some(projection),
            _ => None,
        }
    }

    pub fn transcript(&self) -> &[ChatMessage] {
        match self {
            SessionState::ChatActive { transcript, .. } => transcript,
            _ => &[],
        }
    }

    pub fn notice(&self) -> Option<&str> {
        match self {
            SessionState::GoalProjected { notice, .. } | SessionState::ChatActive { notice, .. } => {
                notice.as_deref()
            }
            _ => None,
        }
    }

    /// Apply one event. A rejected event consumes the state; clone first if
    /// it must survive.
    pub fn transition(self, event: SessionEvent) -> Result<SessionState, SessionError> {
        tracing::debug!(from = self.name(), ?event, "session transition");

        match (self, event) {
            (_, SessionEvent::SubmitBudget(inputs)) => Ok(SessionState::BudgetComputed {
                summary: summarize(&inputs),
                inputs,
            }),

            (SessionState::Idle, SessionEvent::ProjectGoal { .. }) => Err(SessionError::NoBudget),

            (
                SessionState::BudgetComputed { inputs, summary }
                | SessionState::GoalProjected { inputs, summary, .. }
                | SessionState::ChatActive { inputs, summary, .. },
                SessionEvent::ProjectGoal {
                    savings_goal,
                    annual_rate,
                },
            ) => {
                if !summary.can_project() {
                    return Err(SessionError::NonPositiveBalance(summary.net_balance));
                }
                Ok(SessionState::GoalProjected {
                    inputs,
                    summary,
                    projection: project_at_rate(savings_goal, summary.net_balance, annual_rate),
                    notice: None,
                })
            }

            (
                SessionState::GoalProjected {
                    inputs,
                    summary,
                    projection,
                    ..
                },
                SessionEvent::AssistantReplied(text),
            ) => Ok(SessionState::ChatActive {
                inputs,
                summary,
                projection,
                transcript: vec![ChatMessage::assistant(text)],
                notice: None,
            }),

            (
                SessionState::ChatActive {
                    inputs,
                    summary,
                    projection,
                    mut transcript,
                    ..
                },
                SessionEvent::AssistantReplied(text),
            ) => {
                transcript.push(ChatMessage::assistant(text));
                Ok(SessionState::ChatActive {
                    inputs,
                    summary,
                    projection,
                    transcript,
                    notice: None,
                })
            }

            (
                SessionState::ChatActive {
                    inputs,
                    summary,
                    projection,
                    mut transcript,
                    notice,
                },
                SessionEvent::UserSaid(text),
            ) => {
                transcript.push(ChatMessage::user(text));
                Ok(SessionState::ChatActive {
                    inputs,
                    summary,
                    projection,
                    transcript,
                    notice,
                })
            }

            (
                SessionState::GoalProjected {
                    inputs,
                    summary,
                    projection,
                    ..
                },
                SessionEvent::AssistantFailed(msg),
            ) => Ok(SessionState::GoalProjected {
                inputs,
                summary,
                projection,
                notice: Some(msg),
            }),

            (
                SessionState::ChatActive {
                    inputs,
                    summary,
                    projection,
                    transcript,
                    ..
                },
                SessionEvent::AssistantFailed(msg),
            ) => Ok(SessionState::ChatActive {
                inputs,
                summary,
                projection,
                transcript,
                notice: Some(msg),
            }),

            // A message typed after a failed opening request starts the chat
            (
                SessionState::GoalProjected {
                    inputs,
                    summary,
                    projection,
                    notice,
                },
                SessionEvent::UserSaid(text),
            ) => Ok(SessionState::ChatActive {
                inputs,
                summary,
                projection,
                transcript: vec![ChatMessage::user(text)],
                notice,
            }),

            (
                SessionState::Idle | SessionState::BudgetComputed { .. },
                SessionEvent::AssistantReplied(_)
                | SessionEvent::AssistantFailed(_)
                | SessionEvent::UserSaid(_),
            ) => Err(SessionError::NoProjection),
        }
    }
}

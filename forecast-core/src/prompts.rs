//! Message construction for the investment assistant.
//!
//! Prompt text is plain data: these functions only turn computed numbers
//! into role-tagged messages. Sending them is the caller's business.

use serde::{Deserialize, Serialize};

use crate::budget::BudgetSummary;
use crate::format::{percent, usd};
use crate::projection::GoalProjection;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Numbers the assistant is told about
#[derive(Debug, Clone, Copy)]
pub struct PromptContext<'a> {
    pub summary: &'a BudgetSummary,
    pub projection: &'a GoalProjection,
}

pub fn strategist_system_prompt() -> String {
    "You are a knowledgeable investment strategist AI. \
You explain options in plain language and keep answers educational, not prescriptive."
        .to_string()
}

/// Opening request: educational suggestions for reaching the savings goal.
pub fn build_prompt(ctx: &PromptContext<'_>) -> Vec<ChatMessage> {
    let p = ctx.projection;
    let user = format!(
        "A user has a savings goal of {goal}. Their monthly investment capacity is {capacity} \
(income {income}, expenses {expenses}).\n\
Their time horizon without investing is {simple_years} years; at a {rate} average return it is about {invested}.\n\
Based on this, provide a few educational investment suggestions for an actively managed portfolio.\n\
Consider their time horizon for risk tolerance. Suggest a diversified mix of investment types (ETFs, stocks, bonds).\n\
Do NOT give specific stock picks. Frame this as educational information and end with a disclaimer \
about consulting a human professional.",
        goal = usd(p.savings_goal),
        capacity = usd(p.net_balance),
        income = usd(ctx.summary.total_income),
        expenses = usd(ctx.summary.total_expenses),
        simple_years = p.simple.years,
        rate = percent(p.annual_rate),
        invested = p.invested,
    );

    vec![
        ChatMessage::system(strategist_system_prompt()),
        ChatMessage::user(user),
    ]
}

/// Reminder of the user's numbers, sent with every follow-up turn.
fn context_note(ctx: &PromptContext<'_>) -> String {
    let p = ctx.projection;
    format!(
        "The user's savings goal is {goal}. They can invest {capacity} a month \
(income {income}, expenses {expenses}). Reaching the goal takes {simple} without investing \
and about {invested} at a {rate} average return.",
        goal = usd(p.savings_goal),
        capacity = usd(p.net_balance),
        income = usd(ctx.summary.total_income),
        expenses = usd(ctx.summary.total_expenses),
        simple = p.simple,
        invested = p.invested,
        rate = percent(p.annual_rate),
    )
}

/// Messages for one open-ended chat turn.
///
/// The system prompt and a note with the user's numbers come first, then the
/// last `max_turns` non-system messages of `history`, then `pending_user`.
pub fn follow_up(
    ctx: &PromptContext<'_>,
    history: &[ChatMessage],
    pending_user: &str,
    max_turns: usize,
) -> Vec<ChatMessage> {
    let convo: Vec<&ChatMessage> = history.iter().filter(|m| m.role != Role::System).collect();
    let start = convo.len().saturating_sub(max_turns);

    let mut out = Vec::with_capacity(convo.len() - start + 3);
    out.push(ChatMessage::system(strategist_system_prompt()));
    out.push(ChatMessage::system(context_note(ctx)));
    out.extend(convo[start..].iter().map(|m| (*m).clone()));
    out.push(ChatMessage::user(pending_user));
    out
}

//! forecast-core: budget totals and savings-goal projections

pub mod budget;
pub mod error;
pub mod format;
pub mod projection;
pub mod prompts;
pub mod session;

pub use budget::{summarize, BudgetInputs, BudgetSummary};
pub use error::{ForecastError, Result};
pub use projection::{
    assess, effective_monthly_rate, invested_timeline, project, project_at_rate, simple_timeline,
    GoalProjection, Outlook, Timeline, DEFAULT_ANNUAL_RATE,
};
pub use prompts::{build_prompt, follow_up, ChatMessage, PromptContext, Role};
pub use session::{SessionError, SessionEvent, SessionState};

//! Glue between the session state machine and the completion client.
//!
//! Completion failures never abort: they become a notice on the state and
//! the computed budget and projection stay as they were.

use forecast_core::{
    build_prompt, follow_up, ChatMessage, PromptContext, SessionEvent, SessionState,
};

use crate::llm::{self, CompletionClient};

/// Ask for the opening strategist reply for a projected goal.
pub async fn advise(client: &dyn CompletionClient, state: SessionState) -> SessionState {
    let Some(messages) = opening_messages(&state) else {
        return state;
    };

    let event = match client.complete(&messages).await {
        Ok(reply) => SessionEvent::AssistantReplied(reply),
        Err(e) => failure_event(&e),
    };
    apply(state, event)
}

/// Same as [`advise`], for the synchronous chat view.
pub fn advise_blocking(client: &dyn CompletionClient, state: SessionState) -> SessionState {
    let Some(messages) = opening_messages(&state) else {
        return state;
    };

    let event = match llm::complete_blocking(client, &messages) {
        Ok(reply) => SessionEvent::AssistantReplied(reply),
        Err(e) => failure_event(&e),
    };
    apply(state, event)
}

/// Record the user's message and fetch the assistant's answer.
///
/// A message the session does not accept is dropped without a request.
pub fn reply_blocking(
    client: &dyn CompletionClient,
    state: SessionState,
    user_text: &str,
    max_turns: usize,
) -> SessionState {
    let Some(messages) = follow_up_messages(&state, user_text, max_turns) else {
        return state;
    };

    let fallback = state.clone();
    let state = match state.transition(SessionEvent::UserSaid(user_text.to_string())) {
        Ok(next) => next,
        Err(e) => {
            tracing::warn!(error = %e, "user message not accepted");
            return fallback;
        }
    };

    let event = match llm::complete_blocking(client, &messages) {
        Ok(reply) => SessionEvent::AssistantReplied(reply),
        Err(e) => failure_event(&e),
    };
    apply(state, event)
}

fn opening_messages(state: &SessionState) -> Option<Vec<ChatMessage>> {
    Some(build_prompt(&PromptContext {
        summary: state.summary()?,
        projection: state.projection()?,
    }))
}

fn follow_up_messages(
    state: &SessionState,
    user_text: &str,
    max_turns: usize,
) -> Option<Vec<ChatMessage>> {
    let ctx = PromptContext {
        summary: state.summary()?,
        projection: state.projection()?,
    };
    Some(follow_up(&ctx, state.transcript(), user_text, max_turns))
}

fn failure_event(e: &anyhow::Error) -> SessionEvent {
    tracing::warn!(error = %e, "assistant request failed");
    SessionEvent::AssistantFailed(format!("An error occurred with the AI model: {e:#}"))
}

fn apply(state: SessionState, event: SessionEvent) -> SessionState {
    let fallback = state.clone();
    match state.transition(event) {
        Ok(next) => next,
        Err(e) => {
            tracing::warn!(error = %e, "ignored session event");
            fallback
        }
    }
}

use anyhow::Result;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use forecast_core::format::{percent, usd};
use forecast_core::{Role, SessionState};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph, Wrap},
    Terminal,
};
use std::io::{self, Stdout};

use crate::advisor;
use crate::llm::CompletionClient;

/// Local replies shown in the conversation without calling the model
struct Aside {
    after_turn: usize,
    content: String,
}

pub fn run_chat(
    client: &dyn CompletionClient,
    state: SessionState,
    max_turns: usize,
) -> Result<SessionState> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = chat_loop(&mut terminal, client, state, max_turns);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;

    res
}

fn chat_loop(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    client: &dyn CompletionClient,
    mut state: SessionState,
    max_turns: usize,
) -> Result<SessionState> {
    let mut input = String::new();
    let mut show_help = true;
    let mut asides: Vec<Aside> = Vec::new();

    loop {
        terminal.draw(|f| {
            let size = f.area();
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([
                    Constraint::Length(6),
                    Constraint::Min(5),
                    Constraint::Length(3),
                ])
                .split(size);

            let header = Paragraph::new(Text::from(header_lines(&state)))
                .alignment(Alignment::Center)
                .block(Block::default().borders(Borders::ALL).title("forecast"));
            f.render_widget(header, chunks[0]);

            let mut lines: Vec<Line> = Vec::new();
            if show_help {
                lines.push(Line::from(Span::styled(
                    "Shortcuts: Enter=send, Esc=quit, ?=help",
                    Style::default().fg(Color::Gray),
                )));
                lines.push(Line::raw("Commands: /help /summary /quit"));
                lines.push(Line::raw(""));
            }

            for (i, m) in state.transcript().iter().enumerate() {
                lines.push(Line::from(vec![
                    Span::styled(
                        format!("{}: ", speaker(m.role)),
                        Style::default().fg(role_color(m.role)),
                    ),
                    Span::raw(m.content.clone()),
                ]));
                lines.push(Line::raw(""));

                for a in asides.iter().filter(|a| a.after_turn == i + 1) {
                    lines.push(Line::from(Span::styled(
                        a.content.clone(),
                        Style::default().fg(Color::Gray),
                    )));
                    lines.push(Line::raw(""));
                }
            }

            if let Some(notice) = state.notice() {
                lines.push(Line::from(Span::styled(
                    notice.to_string(),
                    Style::default().fg(Color::Red),
                )));
            }

            let history = Paragraph::new(Text::from(lines))
                .block(Block::default().borders(Borders::ALL).title("conversation"))
                .wrap(Wrap { trim: false });
            f.render_widget(history, chunks[1]);

            let input_widget = Paragraph::new(input.as_str())
                .block(Block::default().borders(Borders::ALL).title("message"))
                .style(Style::default().fg(Color::White));
            f.render_widget(input_widget, chunks[2]);
        })?;

        if event::poll(std::time::Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                match key.code {
                    KeyCode::Esc => break,
                    KeyCode::Char('?') if input.is_empty() => {
                        show_help = !show_help;
                    }
                    KeyCode::Enter => {
                        let trimmed = input.trim().to_string();
                        input.clear();
                        if trimmed.is_empty() {
                            continue;
                        }
                        if trimmed == "/quit" {
                            break;
                        }
                        if let Some(reply) = handle_slash(&trimmed, &state) {
                            asides.push(Aside {
                                after_turn: state.transcript().len(),
                                content: reply,
                            });
                        } else {
                            state = advisor::reply_blocking(client, state, &trimmed, max_turns);
                        }
                    }
                    KeyCode::Backspace => {
                        input.pop();
                    }
                    KeyCode::Char(c) => {
                        input.push(c);
                    }
                    _ => {}
                }
            }
        }
    }

    Ok(state)
}

fn speaker(role: Role) -> &'static str {
    match role {
        Role::User => "you",
        Role::Assistant => "strategist",
        other => other.as_str(),
    }
}

fn role_color(role: Role) -> Color {
    match role {
        Role::User => Color::Cyan,
        Role::Assistant => Color::Magenta,
        Role::System => Color::Gray,
    }
}

fn header_lines(state: &SessionState) -> Vec<Line<'static>> {
    let mut lines = vec![Line::from(Span::styled(
        "Financial Goal Forecaster",
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD),
    ))];

    if let Some(s) = state.summary() {
        lines.push(Line::raw(format!(
            "income {} | expenses {} | net {}",
            usd(s.total_income),
            usd(s.total_expenses),
            usd(s.net_balance)
        )));
    }
    if let Some(p) = state.projection() {
        lines.push(Line::raw(format!("goal {}", usd(p.savings_goal))));
        lines.push(Line::styled(
            format!(
                "saving: {} | investing at {}: {}",
                p.simple,
                percent(p.annual_rate),
                p.invested
            ),
            Style::default().fg(Color::Cyan),
        ));
    }
    lines
}

fn handle_slash(input: &str, state: &SessionState) -> Option<String> {
    let s = input.trim();
    if !s.starts_with('/') {
        return None;
    }
    match s {
        "/help" => Some(
            "Commands:\n\
- /help\n\
- /summary (budget and timelines)\n\
- /quit\n\
\nShortcuts: Enter=send, Esc=quit, ?=toggle help"
                .to_string(),
        ),
        "/summary" => Some(summary_text(state)),
        _ => Some("Unknown command. Try /help".to_string()),
    }
}

fn summary_text(state: &SessionState) -> String {
    let mut out = String::new();
    if let Some(s) = state.summary() {
        out.push_str(&format!(
            "Total income {}, total expenses {}, net monthly savings {}.",
            usd(s.total_income),
            usd(s.total_expenses),
            usd(s.net_balance)
        ));
    }
    if let Some(p) = state.projection() {
        out.push_str(&format!(
            " Goal {}: {} just saving, {} investing.",
            usd(p.savings_goal),
            p.simple,
            p.invested
        ));
    }
    if out.is_empty() {
        out.push_str("No budget yet.");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use forecast_core::{BudgetInputs, SessionEvent, DEFAULT_ANNUAL_RATE};

    fn projected() -> SessionState {
        SessionState::Idle
            .transition(SessionEvent::SubmitBudget(BudgetInputs::sample()))
            .unwrap()
            .transition(SessionEvent::ProjectGoal {
                savings_goal: 20_000.0,
                annual_rate: DEFAULT_ANNUAL_RATE,
            })
            .unwrap()
    }

    #[test]
    fn test_plain_text_is_not_a_command() {
        assert!(handle_slash("what about bonds?", &projected()).is_none());
    }

    #[test]
    fn test_summary_command() {
        let reply = handle_slash("/summary", &projected()).unwrap();
        assert!(reply.contains("$1,230.00"));
        assert!(reply.contains("1 years and 4 months just saving"));
    }

    #[test]
    fn test_unknown_command() {
        let reply = handle_slash("/calendar", &projected()).unwrap();
        assert!(reply.contains("Unknown command"));
    }

    #[test]
    fn test_speaker_tags() {
        assert_eq!(speaker(Role::User), "you");
        assert_eq!(speaker(Role::Assistant), "strategist");
        assert_eq!(speaker(Role::System), "system");
    }

    #[test]
    fn test_header_shows_timelines() {
        let lines = header_lines(&projected());
        assert_eq!(lines.len(), 4);
    }
}

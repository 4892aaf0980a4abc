//! Frame rendering: transcript, status line, input, calendar panel.
//!
//! Pure projection of the application value — nothing here mutates state, so
//! every layout decision can be exercised by driving the reducer headlessly
//! and rendering into a test backend.

use chrono::Local;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph, Wrap},
    Frame,
};

use crate::core::app::{App, StatusKind};
use crate::ui::chat_loop::UiState;
use crate::ui::markdown::render_markdown;

/// Height of the input box including its borders.
pub const INPUT_HEIGHT: u16 = 3;

/// Width of the calendar side panel.
pub const CALENDAR_WIDTH: u16 = 26;

pub fn ui(f: &mut Frame, app: &App, state: &UiState) {
    let columns = if state.show_calendar {
        Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(0), Constraint::Length(CALENDAR_WIDTH)])
            .split(f.area())
    } else {
        Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(0)])
            .split(f.area())
    };

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),
            Constraint::Length(1),
            Constraint::Length(INPUT_HEIGHT),
        ])
        .split(columns[0]);

    draw_transcript(f, app, state, rows[0]);
    draw_status(f, app, rows[1]);
    draw_input(f, app, state, rows[2]);

    if state.show_calendar {
        draw_calendar(f, state, columns[1]);
    }
}

/// All transcript lines in display order, with the typing effect applied to
/// the message it is revealing.
pub fn build_display_lines(app: &App) -> Vec<Line<'static>> {
    let mut lines = Vec::new();

    for index in 0..app.messages().len() {
        let message = &app.messages()[index];
        if message.is_user() {
            lines.push(Line::from(vec![
                Span::styled(
                    "Vous : ",
                    Style::default()
                        .fg(Color::Cyan)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::styled(
                    message.content.clone(),
                    Style::default().fg(Color::Cyan),
                ),
            ]));
        } else {
            lines.extend(render_markdown(app.visible_content(index)));
        }
        lines.push(Line::from(""));
    }

    lines
}

pub fn max_scroll_offset(total_lines: u16, available_height: u16) -> u16 {
    total_lines.saturating_sub(available_height)
}

fn draw_transcript(f: &mut Frame, app: &App, state: &UiState, area: Rect) {
    let lines = build_display_lines(app);
    let available_height = area.height.saturating_sub(1);
    let max_offset = max_scroll_offset(lines.len() as u16, available_height);
    let scroll_offset = if state.auto_scroll {
        max_offset
    } else {
        state.scroll_offset.min(max_offset)
    };

    let title = format!("causette v{}", env!("CARGO_PKG_VERSION"));
    let transcript = Paragraph::new(lines)
        .block(Block::default().title(title))
        .wrap(Wrap { trim: false })
        .scroll((scroll_offset, 0));

    f.render_widget(transcript, area);
}

fn draw_status(f: &mut Frame, app: &App, area: Rect) {
    let (kind, label) = app.status();
    let dot_style = match kind {
        StatusKind::Loading => Style::default().fg(Color::Yellow),
        StatusKind::Ready => Style::default().fg(Color::Green),
        StatusKind::Error => Style::default().fg(Color::Red),
    };
    let status_line = Line::from(vec![
        Span::styled("● ", dot_style),
        Span::styled(label.to_string(), Style::default().fg(Color::DarkGray)),
    ]);

    match app.progress() {
        Some(fraction) => {
            let halves = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Length(24), Constraint::Min(10)])
                .split(area);
            f.render_widget(Paragraph::new(status_line), halves[0]);
            let gauge = Gauge::default()
                .gauge_style(Style::default().fg(Color::Green).bg(Color::DarkGray))
                .ratio(fraction.clamp(0.0, 1.0))
                .label(format!("{:>3.0}%", fraction * 100.0));
            f.render_widget(gauge, halves[1]);
        }
        None => f.render_widget(Paragraph::new(status_line), area),
    }
}

fn draw_input(f: &mut Frame, app: &App, state: &UiState, area: Rect) {
    let (border_style, title) = if app.input_enabled() {
        (
            Style::default().fg(Color::Yellow),
            "Votre message (Entrée pour envoyer, Ctrl+C pour quitter)",
        )
    } else if app.can_reconnect() {
        (
            Style::default().fg(Color::Red),
            "Hors ligne (Ctrl+R pour reconnecter)",
        )
    } else {
        (Style::default().fg(Color::DarkGray), "Patientez…")
    };

    let mut textarea = state.textarea.clone();
    textarea.set_block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(border_style)
            .title(title),
    );
    f.render_widget(&textarea, area);
}

fn draw_calendar(f: &mut Frame, state: &UiState, area: Rect) {
    let now = Local::now();
    let mut lines = vec![
        Line::from(Span::styled(
            format!("🕐 {}", now.format("%H:%M:%S")),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(
            state.calendar.title(),
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )),
    ];
    lines.extend(state.calendar.render_lines(now.date_naive()));
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "F3 ◀  mois  ▶ F4",
        Style::default().fg(Color::DarkGray),
    )));

    let panel = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title("Calendrier"),
    );
    f.render_widget(panel, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::app::{apply_event, SessionEvent};
    use crate::core::config::Config;
    use crate::core::runtime::EngineHandle;
    use crate::ui::markdown::lines_to_plain_text;
    use crate::utils::logging::LoggingState;

    fn ready_app() -> App {
        let mut app = App::new(Config::default(), LoggingState::new(None).unwrap());
        apply_event(&mut app, SessionEvent::ConnectRequested);
        apply_event(
            &mut app,
            SessionEvent::LoadCompleted(EngineHandle {
                model: "m".into(),
            }),
        );
        app
    }

    #[test]
    fn user_messages_get_a_prefix_and_assistant_markdown_does_not() {
        let mut app = ready_app();
        apply_event(&mut app, SessionEvent::SubmitMessage("bonjour".into()));
        apply_event(&mut app, SessionEvent::ReplyReceived("**salut**".into()));
        // Let playback finish so the full reply is visible.
        while app.playback_active() {
            app.tick_playback();
        }

        let text = lines_to_plain_text(&build_display_lines(&app));
        assert!(text.contains(&"Vous : bonjour".to_string()));
        assert!(text.contains(&"salut".to_string()));
        assert!(!text.iter().any(|line| line.contains("**")));
    }

    #[test]
    fn playback_limits_what_is_displayed_not_what_is_stored() {
        let mut app = ready_app();
        apply_event(&mut app, SessionEvent::SubmitMessage("salut".into()));
        apply_event(&mut app, SessionEvent::ReplyReceived("abcdef".into()));
        app.tick_playback();
        app.tick_playback();

        let text = lines_to_plain_text(&build_display_lines(&app));
        assert!(text.contains(&"ab".to_string()));
        assert!(!text.iter().any(|line| line.contains("abcdef")));
    }

    #[test]
    fn scroll_offset_saturates() {
        assert_eq!(max_scroll_offset(10, 4), 6);
        assert_eq!(max_scroll_offset(3, 10), 0);
    }
}

//! Main chat event loop and UI rendering
//!
//! One task owns the terminal and the [`App`] value. Executor tasks (model
//! load, reply generation) are spawned from reducer commands and communicate
//! back exclusively through the session-event channel, which the loop drains
//! between frames. There is deliberately no cancellation path: a hung load or
//! generation keeps its state until the process exits, matching the original
//! behavior this interface reproduces.

use std::io;
use std::sync::Arc;
use std::time::{Duration, Instant};

use ratatui::crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, KeyModifiers, MouseEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::sync::mpsc;
use tracing::debug;
use tui_textarea::TextArea;

use crate::api::ollama::OllamaRuntime;
use crate::core::app::{apply_event, App, AppCommand, SessionEvent};
use crate::core::config::Config;
use crate::core::constants::THINKING_DELAY_MS;
use crate::core::runtime::{ModelRuntime, ProgressFn};
use crate::ui::calendar::CalendarState;
use crate::ui::renderer::ui;
use crate::utils::logging::LoggingState;

/// Terminal-side state the reducer does not own: the input editor, scrollback
/// position, and the calendar panel.
pub struct UiState {
    pub textarea: TextArea<'static>,
    pub scroll_offset: u16,
    pub auto_scroll: bool,
    pub show_calendar: bool,
    pub calendar: CalendarState,
}

impl UiState {
    fn new(show_calendar: bool) -> Self {
        Self {
            textarea: new_textarea(),
            scroll_offset: 0,
            auto_scroll: true,
            show_calendar,
            calendar: CalendarState::current(),
        }
    }
}

fn new_textarea() -> TextArea<'static> {
    let mut textarea = TextArea::default();
    textarea.set_cursor_line_style(ratatui::style::Style::default());
    textarea
}

/// Apply one event and start whatever work it demands.
fn dispatch(
    app: &mut App,
    event: SessionEvent,
    runtime: &Arc<dyn ModelRuntime>,
    tx: &mpsc::UnboundedSender<SessionEvent>,
) {
    for command in apply_event(app, event) {
        execute_command(command, Arc::clone(runtime), tx.clone());
    }
}

/// Spawn the executor task for one command. Executors only ever report back
/// as events; they never touch the `App`.
fn execute_command(
    command: AppCommand,
    runtime: Arc<dyn ModelRuntime>,
    tx: mpsc::UnboundedSender<SessionEvent>,
) {
    match command {
        AppCommand::BeginLoad { model } => {
            tokio::spawn(async move {
                let progress_tx = tx.clone();
                let on_progress: ProgressFn = Box::new(move |fraction| {
                    let _ = progress_tx.send(SessionEvent::LoadProgress(fraction));
                });
                match runtime.load(&model, on_progress).await {
                    Ok(engine) => {
                        let _ = tx.send(SessionEvent::LoadCompleted(engine));
                    }
                    Err(err) => {
                        let _ = tx.send(SessionEvent::LoadFailed(err.to_string()));
                    }
                }
            });
        }
        AppCommand::RequestReply {
            engine,
            messages,
            params,
        } => {
            tokio::spawn(async move {
                // Fixed pause so the reply never lands jarringly fast,
                // whatever the model latency.
                tokio::time::sleep(Duration::from_millis(THINKING_DELAY_MS)).await;
                match runtime.generate(&engine, &messages, params).await {
                    Ok(reply) => {
                        let _ = tx.send(SessionEvent::ReplyReceived(reply));
                    }
                    Err(err) => {
                        let _ = tx.send(SessionEvent::ReplyFailed(err.to_string()));
                    }
                }
            });
        }
    }
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<io::Stdout>>, Box<dyn std::error::Error>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    Ok(Terminal::new(CrosstermBackend::new(stdout))?)
}

fn restore_terminal(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
) -> Result<(), Box<dyn std::error::Error>> {
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;
    Ok(())
}

/// Run the interactive session until the user quits.
pub async fn run_chat(config: Config, log: Option<String>) -> Result<(), Box<dyn std::error::Error>> {
    let logging = LoggingState::new(log)?;
    let typing_interval = Duration::from_millis(config.typing_interval_ms);
    let show_calendar = config.show_calendar;

    let runtime: Arc<dyn ModelRuntime> = Arc::new(OllamaRuntime::new(config.base_url.clone()));
    let mut app = App::new(config, logging);
    let mut state = UiState::new(show_calendar);

    let (tx, mut rx) = mpsc::unbounded_channel::<SessionEvent>();

    // The original connects as soon as the page loads; same here.
    dispatch(&mut app, SessionEvent::ConnectRequested, &runtime, &tx);

    let mut terminal = setup_terminal()?;
    let mut last_playback_tick = Instant::now();

    let result = loop {
        terminal.draw(|f| ui(f, &app, &state))?;

        // Drain completed work before handling new input.
        while let Ok(session_event) = rx.try_recv() {
            dispatch(&mut app, session_event, &runtime, &tx);
        }

        if app.playback_active() && last_playback_tick.elapsed() >= typing_interval {
            app.tick_playback();
            last_playback_tick = Instant::now();
        }

        if !event::poll(typing_interval.min(Duration::from_millis(50)))? {
            continue;
        }

        match event::read()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => match key.code {
                KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                    break Ok(());
                }
                KeyCode::Char('r') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                    dispatch(&mut app, SessionEvent::ConnectRequested, &runtime, &tx);
                }
                KeyCode::Enter => {
                    if app.input_enabled() {
                        let text = state.textarea.lines().join("\n");
                        state.textarea = new_textarea();
                        dispatch(&mut app, SessionEvent::SubmitMessage(text), &runtime, &tx);
                        state.auto_scroll = true;
                    }
                }
                KeyCode::F(2) => {
                    state.show_calendar = !state.show_calendar;
                }
                KeyCode::F(3) => {
                    state.calendar.change_month(-1);
                }
                KeyCode::F(4) => {
                    state.calendar.change_month(1);
                }
                KeyCode::Up => {
                    state.auto_scroll = false;
                    state.scroll_offset = state.scroll_offset.saturating_sub(1);
                }
                KeyCode::Down => {
                    state.scroll_offset = state.scroll_offset.saturating_add(1);
                }
                _ => {
                    if app.input_enabled() {
                        state.textarea.input(key);
                    }
                }
            },
            Event::Mouse(mouse) => match mouse.kind {
                MouseEventKind::ScrollUp => {
                    state.auto_scroll = false;
                    state.scroll_offset = state.scroll_offset.saturating_sub(3);
                }
                MouseEventKind::ScrollDown => {
                    state.scroll_offset = state.scroll_offset.saturating_add(3);
                }
                _ => {}
            },
            _ => {}
        }
    };

    restore_terminal(&mut terminal)?;
    debug!("chat loop ended");
    result
}

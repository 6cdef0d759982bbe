// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use crossterm::{execute, terminal};
use ratatui::Terminal;
use ratatui::backend::{Backend, CrosstermBackend};
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use shelf_app::{
    ApiRequest, AppCommand, AppEvent, AppState, BlockListRenderer, Completion, FormStatus,
    UpsertForm,
};
use std::io;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;

const STATUS_CLEAR_AFTER: Duration = Duration::from_secs(4);

/// Executes API requests on behalf of the event loop. Completions come back
/// through the internal channel so state is only touched on the UI thread.
pub trait AppRuntime {
    fn execute(&mut self, request: ApiRequest) -> Completion;

    /// Starts `request` and reports its completion on `tx`. The default runs
    /// inline; runtimes backed by a network client override this with a
    /// worker thread.
    fn spawn_request(&mut self, request: ApiRequest, tx: Sender<InternalEvent>) -> Result<()> {
        let completion = self.execute(request);
        tx.send(InternalEvent::Completed(completion))
            .map_err(|_| anyhow!("completion channel closed"))
    }
}

#[derive(Debug)]
pub enum InternalEvent {
    ClearStatus { token: u64 },
    Completed(Completion),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum InputMode {
    #[default]
    Browse,
    Jump,
    Form,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum FormField {
    #[default]
    Title,
    Pages,
}

impl FormField {
    const fn toggled(self) -> Self {
        match self {
            Self::Title => Self::Pages,
            Self::Pages => Self::Title,
        }
    }
}

#[derive(Debug, Default)]
struct ViewData {
    list: BlockListRenderer,
    mode: InputMode,
    jump_input: String,
    form: UpsertForm,
    form_field: FormField,
    help_visible: bool,
    status_token: u64,
}

pub fn run_app<R: AppRuntime>(state: &mut AppState, runtime: &mut R) -> Result<()> {
    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, terminal::EnterAlternateScreen).context("enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout);
    let result = match Terminal::new(backend).context("create terminal") {
        Ok(mut terminal) => event_loop(&mut terminal, state, runtime, || {
            if event::poll(Duration::from_millis(120)).context("poll event")? {
                event::read().context("read event").map(Some)
            } else {
                Ok(None)
            }
        }),
        Err(error) => Err(error),
    };

    disable_raw_mode().context("disable raw mode")?;
    execute!(io::stdout(), terminal::LeaveAlternateScreen).context("leave alternate screen")?;
    result
}

/// Runs until quit or the first draw or input error. Terminal setup and
/// teardown stay with the caller.
fn event_loop<B, R, E>(
    terminal: &mut Terminal<B>,
    state: &mut AppState,
    runtime: &mut R,
    mut next_event: E,
) -> Result<()>
where
    B: Backend,
    R: AppRuntime,
    E: FnMut() -> Result<Option<Event>>,
{
    let mut view_data = ViewData::default();
    let (internal_tx, internal_rx) = mpsc::channel();

    let events = state.dispatch(AppCommand::Start);
    apply_events(state, runtime, &mut view_data, &internal_tx, events);

    loop {
        process_internal_events(state, runtime, &mut view_data, &internal_tx, &internal_rx);

        terminal
            .draw(|frame| render(frame, state, &view_data))
            .context("draw frame")?;

        match next_event()? {
            Some(Event::Key(key)) => {
                if handle_key_event(state, runtime, &mut view_data, &internal_tx, key) {
                    return Ok(());
                }
            }
            Some(Event::Resize(_, _)) => {}
            _ => {}
        }
    }
}

fn process_internal_events<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    tx: &Sender<InternalEvent>,
    rx: &Receiver<InternalEvent>,
) {
    while let Ok(event) = rx.try_recv() {
        match event {
            InternalEvent::ClearStatus { token } if token == view_data.status_token => {
                state.dispatch(AppCommand::ClearStatus);
            }
            InternalEvent::ClearStatus { .. } => {}
            InternalEvent::Completed(completion) => {
                let events = state.complete(completion, &mut view_data.list);
                apply_events(state, runtime, view_data, tx, events);
            }
        }
    }
}

fn apply_events<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    tx: &Sender<InternalEvent>,
    events: Vec<AppEvent>,
) {
    for event in events {
        match event {
            AppEvent::Request(request) => {
                let label = request.label();
                if let Err(error) = runtime.spawn_request(request, tx.clone()) {
                    tracing::error!(request = label, %error, "could not start request");
                    emit_status(state, view_data, tx, format!("{label} failed: {error}"));
                }
            }
            AppEvent::StatusUpdated(_) => bump_status_token(view_data, tx),
            AppEvent::StaleResponse { token } => {
                tracing::debug!(token = token.get(), "ignored stale response");
            }
            _ => {}
        }
    }
}

fn schedule_status_clear(internal_tx: &Sender<InternalEvent>, token: u64) {
    let sender = internal_tx.clone();
    thread::spawn(move || {
        thread::sleep(STATUS_CLEAR_AFTER);
        let _ = sender.send(InternalEvent::ClearStatus { token });
    });
}

fn bump_status_token(view_data: &mut ViewData, internal_tx: &Sender<InternalEvent>) {
    view_data.status_token = view_data.status_token.saturating_add(1);
    schedule_status_clear(internal_tx, view_data.status_token);
}

fn emit_status(
    state: &mut AppState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    message: impl Into<String>,
) {
    state.dispatch(AppCommand::SetStatus(message.into()));
    bump_status_token(view_data, internal_tx);
}

fn dispatch<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    command: AppCommand,
) {
    let events = state.dispatch(command);
    apply_events(state, runtime, view_data, internal_tx, events);
}

/// Returns true when the app should exit.
fn handle_key_event<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) -> bool {
    if key.code == KeyCode::Char('q') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return true;
    }

    // The alert is modal until acknowledged.
    if state.alert.is_some() {
        if matches!(key.code, KeyCode::Enter | KeyCode::Esc) {
            dispatch(
                state,
                runtime,
                view_data,
                internal_tx,
                AppCommand::DismissAlert,
            );
        }
        return false;
    }

    if view_data.help_visible {
        view_data.help_visible = false;
        return false;
    }

    match view_data.mode {
        InputMode::Browse => handle_browse_key(state, runtime, view_data, internal_tx, key),
        InputMode::Jump => {
            handle_jump_key(state, runtime, view_data, internal_tx, key);
            false
        }
        InputMode::Form => {
            handle_form_key(state, runtime, view_data, internal_tx, key);
            false
        }
    }
}

fn handle_browse_key<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) -> bool {
    let command = match key.code {
        KeyCode::Char('q') => return true,
        KeyCode::Char('n' | 'l') | KeyCode::Right => AppCommand::NextPage,
        KeyCode::Char('p' | 'h') | KeyCode::Left => AppCommand::PrevPage,
        KeyCode::Char('r') => AppCommand::Reload,
        KeyCode::Char('s') => AppCommand::Sort,
        KeyCode::Char('g' | ':') => {
            view_data.jump_input.clear();
            view_data.mode = InputMode::Jump;
            return false;
        }
        KeyCode::Char('a' | 'e') => {
            view_data.form_field = FormField::Title;
            view_data.mode = InputMode::Form;
            return false;
        }
        KeyCode::Char('?') => {
            view_data.help_visible = true;
            return false;
        }
        _ => return false,
    };
    dispatch(state, runtime, view_data, internal_tx, command);
    false
}

fn handle_jump_key<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) {
    match key.code {
        KeyCode::Esc => {
            view_data.jump_input.clear();
            view_data.mode = InputMode::Browse;
        }
        KeyCode::Enter => {
            let raw = std::mem::take(&mut view_data.jump_input);
            view_data.mode = InputMode::Browse;
            dispatch(
                state,
                runtime,
                view_data,
                internal_tx,
                AppCommand::JumpToPage(raw),
            );
        }
        KeyCode::Backspace => {
            view_data.jump_input.pop();
        }
        KeyCode::Char(ch) if !ch.is_control() => view_data.jump_input.push(ch),
        _ => {}
    }
}

fn handle_form_key<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) {
    let submit = key.code == KeyCode::Enter
        || (key.code == KeyCode::Char('s') && key.modifiers.contains(KeyModifiers::CONTROL));
    if submit {
        let form = view_data.form.clone();
        dispatch(
            state,
            runtime,
            view_data,
            internal_tx,
            AppCommand::SubmitUpsert(form),
        );
        return;
    }

    let field = match view_data.form_field {
        FormField::Title => &mut view_data.form.title,
        FormField::Pages => &mut view_data.form.pages,
    };
    match key.code {
        KeyCode::Esc => view_data.mode = InputMode::Browse,
        KeyCode::Tab | KeyCode::BackTab => {
            view_data.form_field = view_data.form_field.toggled();
        }
        KeyCode::Backspace => {
            field.pop();
        }
        KeyCode::Char(ch) if !ch.is_control() => field.push(ch),
        _ => {}
    }
}

fn header_text(state: &AppState) -> String {
    let current = state
        .current_index
        .map_or_else(|| "-".to_owned(), |index| index.to_string());
    let total = state
        .total_pages
        .map_or_else(|| "?".to_owned(), |total| total.to_string());
    format!(
        "{} | page {current} of {total} | {}",
        state.location.as_str(),
        state.cycle.as_str()
    )
}

fn list_text(view_data: &ViewData) -> String {
    if view_data.list.render_count() == 0 {
        return "loading".to_owned();
    }
    if view_data.list.entries().is_empty() {
        return "no books on this page".to_owned();
    }
    view_data.list.to_text()
}

fn save_control_label(state: &AppState) -> &'static str {
    if state.upsert_busy() {
        "[save: busy]"
    } else {
        "[save]"
    }
}

fn form_text(state: &AppState, view_data: &ViewData) -> String {
    let editing = view_data.mode == InputMode::Form;
    let marker = |field: FormField| {
        if editing && view_data.form_field == field {
            ">"
        } else {
            " "
        }
    };
    let mut text = format!(
        "{}title: {} {}pages: {} {}",
        marker(FormField::Title),
        view_data.form.title,
        marker(FormField::Pages),
        view_data.form.pages,
        save_control_label(state),
    );
    let label = state.form_status.label();
    if !label.is_empty() {
        text.push(' ');
        text.push_str(label);
    }
    if let FormStatus::Failed(message) = &state.form_status {
        text.push_str(": ");
        text.push_str(message);
    }
    text
}

fn status_text(state: &AppState, view_data: &ViewData) -> String {
    let (mode, hints) = match view_data.mode {
        InputMode::Browse => (
            "BROWSE",
            "n/p page | g jump | s sort | r reload | a add | ? help | q quit".to_owned(),
        ),
        InputMode::Jump => (
            "JUMP",
            format!("page: {}_ | enter go | esc cancel", view_data.jump_input),
        ),
        InputMode::Form => (
            "FORM",
            "tab field | enter or ctrl+s save | esc back".to_owned(),
        ),
    };
    match &state.status_line {
        Some(status) => format!("{mode} | {status} | {hints}"),
        None => format!("{mode} | {hints}"),
    }
}

fn help_overlay_text() -> &'static str {
    "global: ctrl+q quit\n\
browse: n/l/right next | p/h/left prev | g or : jump | r reload | s sort | a/e form | q quit\n\
jump: type page number | enter go | backspace | esc cancel\n\
form: tab/shift+tab field | enter or ctrl+s save | esc back\n\
alert: enter or esc dismiss\n\
any key closes this help"
}

fn render(frame: &mut ratatui::Frame<'_>, state: &AppState, view_data: &ViewData) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(3),
            Constraint::Length(2),
        ])
        .split(frame.area());

    let header = Paragraph::new(header_text(state))
        .block(Block::default().title("shelf").borders(Borders::ALL));
    frame.render_widget(header, layout[0]);

    let body = Paragraph::new(list_text(view_data))
        .block(Block::default().title("books").borders(Borders::ALL));
    frame.render_widget(body, layout[1]);

    let form_style = if view_data.mode == InputMode::Form {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    };
    let form = Paragraph::new(form_text(state, view_data))
        .style(form_style)
        .block(Block::default().title("upsert").borders(Borders::ALL));
    frame.render_widget(form, layout[2]);

    let status_widget = Paragraph::new(status_text(state, view_data))
        .style(Style::default().fg(Color::Yellow))
        .block(Block::default().borders(Borders::TOP));
    frame.render_widget(status_widget, layout[3]);

    if view_data.help_visible {
        let area = centered_rect(70, 45, frame.area());
        frame.render_widget(Clear, area);
        let help = Paragraph::new(help_overlay_text())
            .wrap(Wrap { trim: false })
            .block(Block::default().title("help").borders(Borders::ALL));
        frame.render_widget(help, area);
    }

    if let Some(message) = &state.alert {
        let area = centered_rect(60, 25, frame.area());
        frame.render_widget(Clear, area);
        let alert = Paragraph::new(format!("{message}\n\nenter or esc to dismiss"))
            .wrap(Wrap { trim: true })
            .block(
                Block::default()
                    .title("alert")
                    .borders(Borders::ALL)
                    .style(
                        Style::default()
                            .fg(Color::Red)
                            .add_modifier(Modifier::BOLD),
                    ),
            );
        frame.render_widget(alert, area);
    }
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use crossterm::{execute, terminal};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table};
use std::io;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;
use tally_app::{
    EditingMode, FieldName, InvoiceCommand, InvoiceEvent, InvoiceState, LineItem, format_amount,
};
use tracing::{debug, info};

const FIELD_COUNT: usize = FieldName::ALL.len();
const SUBMIT_SLOT: usize = FIELD_COUNT;
const EDIT_ACTION: &str = "[Edit]";
const FOCUS_MARK: &str = "›";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UiOptions {
    pub id_width: usize,
    pub status_clear_after: Duration,
}

impl Default for UiOptions {
    fn default() -> Self {
        Self {
            id_width: 8,
            status_clear_after: Duration::from_secs(4),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum Focus {
    #[default]
    Form,
    Table,
}

/// Raw text per input. The draft always holds the coerced value of what is
/// shown here.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
struct FormUiState {
    slot: usize,
    buffers: [String; FIELD_COUNT],
}

impl FormUiState {
    fn seeded(draft: &LineItem) -> Self {
        let mut form = Self::default();
        form.reseed(draft);
        form
    }

    fn reseed(&mut self, draft: &LineItem) {
        for (buffer, field) in self.buffers.iter_mut().zip(FieldName::ALL) {
            *buffer = field.display_value(draft);
        }
    }

    fn focused_field(&self) -> Option<FieldName> {
        FieldName::ALL.get(self.slot).copied()
    }

    fn buffer(&self, field: FieldName) -> &str {
        &self.buffers[field_index(field)]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
struct TableUiState {
    selected_row: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InternalEvent {
    ClearStatus { token: u64 },
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
struct ViewData {
    options: UiOptions,
    focus: Focus,
    form: FormUiState,
    table: TableUiState,
    help_visible: bool,
    status_line: Option<String>,
    status_token: u64,
}

impl ViewData {
    fn new(state: &InvoiceState, options: UiOptions) -> Self {
        Self {
            options,
            form: FormUiState::seeded(state.draft()),
            ..Self::default()
        }
    }
}

pub fn run_app(state: &mut InvoiceState, options: UiOptions) -> Result<()> {
    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, terminal::EnterAlternateScreen).context("enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("create terminal")?;

    let mut view_data = ViewData::new(state, options);
    let (internal_tx, internal_rx) = mpsc::channel();
    info!(items = state.items().len(), "invoice form started");

    let mut result = Ok(());
    loop {
        process_internal_events(&mut view_data, &internal_rx);

        if let Err(error) = terminal.draw(|frame| render(frame, state, &view_data)) {
            result = Err(error).context("draw frame");
            break;
        }

        match event::poll(Duration::from_millis(120)).context("poll event") {
            Ok(true) => {}
            Ok(false) => continue,
            Err(error) => {
                result = Err(error);
                break;
            }
        }
        match event::read().context("read event") {
            Ok(Event::Key(key)) => {
                if handle_key_event(state, &mut view_data, &internal_tx, key) {
                    break;
                }
            }
            Ok(_) => {}
            Err(error) => {
                result = Err(error);
                break;
            }
        }
    }

    disable_raw_mode().context("disable raw mode")?;
    execute!(io::stdout(), terminal::LeaveAlternateScreen).context("leave alternate screen")?;
    info!(items = state.items().len(), "invoice form closed");
    result
}

fn process_internal_events(view_data: &mut ViewData, rx: &Receiver<InternalEvent>) {
    while let Ok(event) = rx.try_recv() {
        match event {
            InternalEvent::ClearStatus { token } if token == view_data.status_token => {
                view_data.status_line = None;
            }
            InternalEvent::ClearStatus { .. } => {}
        }
    }
}

fn schedule_status_clear(internal_tx: &Sender<InternalEvent>, token: u64, after: Duration) {
    let sender = internal_tx.clone();
    thread::spawn(move || {
        thread::sleep(after);
        let _ = sender.send(InternalEvent::ClearStatus { token });
    });
}

fn emit_status(
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    message: impl Into<String>,
) {
    view_data.status_line = Some(message.into());
    view_data.status_token = view_data.status_token.saturating_add(1);
    schedule_status_clear(
        internal_tx,
        view_data.status_token,
        view_data.options.status_clear_after,
    );
}

/// Returns `true` when the app should quit.
fn handle_key_event(
    state: &mut InvoiceState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) -> bool {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    if ctrl && key.code == KeyCode::Char('q') {
        return true;
    }

    if view_data.help_visible {
        if matches!(key.code, KeyCode::Esc | KeyCode::Char('?') | KeyCode::F(1)) {
            view_data.help_visible = false;
        }
        return false;
    }

    if key.code == KeyCode::F(1) {
        view_data.help_visible = true;
        return false;
    }

    if ctrl && key.code == KeyCode::Char('s') {
        dispatch_and_sync(state, view_data, internal_tx, InvoiceCommand::Submit);
        return false;
    }

    if ctrl && key.code == KeyCode::Char('t') {
        toggle_focus(state, view_data, internal_tx);
        return false;
    }

    match view_data.focus {
        Focus::Form => handle_form_key(state, view_data, internal_tx, key),
        Focus::Table => handle_table_key(state, view_data, internal_tx, key),
    }
    false
}

fn toggle_focus(
    state: &InvoiceState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
) {
    match view_data.focus {
        Focus::Form if state.items().is_empty() => {
            emit_status(view_data, internal_tx, "no invoices yet");
        }
        Focus::Form => {
            view_data.focus = Focus::Table;
            clamp_table_cursor(state, view_data);
        }
        Focus::Table => view_data.focus = Focus::Form,
    }
}

fn handle_form_key(
    state: &mut InvoiceState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) {
    match key.code {
        KeyCode::Tab | KeyCode::Down => move_form_slot(view_data, 1),
        KeyCode::BackTab | KeyCode::Up => move_form_slot(view_data, -1),
        KeyCode::Enter => {
            dispatch_and_sync(state, view_data, internal_tx, InvoiceCommand::Submit);
        }
        KeyCode::Esc => toggle_focus(state, view_data, internal_tx),
        KeyCode::Backspace => edit_focused_buffer(state, view_data, internal_tx, |buffer, _| {
            buffer.pop();
        }),
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            edit_focused_buffer(state, view_data, internal_tx, |buffer, _| buffer.clear());
        }
        KeyCode::Char(ch)
            if !key
                .modifiers
                .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
        {
            if view_data.form.slot == SUBMIT_SLOT {
                if ch == '?' {
                    view_data.help_visible = true;
                }
                return;
            }
            edit_focused_buffer(state, view_data, internal_tx, |buffer, field| {
                // A lone "0" is the blank placeholder; the first number character replaces it.
                if field.is_numeric() && buffer.as_str() == "0" && starts_number(ch) {
                    buffer.clear();
                }
                buffer.push(ch);
            });
        }
        _ => {}
    }
}

fn starts_number(ch: char) -> bool {
    ch.is_ascii_digit() || matches!(ch, '-' | '+' | '.')
}

fn edit_focused_buffer(
    state: &mut InvoiceState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    edit: impl FnOnce(&mut String, FieldName),
) {
    let Some(field) = view_data.form.focused_field() else {
        return;
    };
    let buffer = &mut view_data.form.buffers[field_index(field)];
    edit(buffer, field);
    let raw = buffer.clone();
    dispatch_and_sync(
        state,
        view_data,
        internal_tx,
        InvoiceCommand::ChangeField { field, raw },
    );
}

fn move_form_slot(view_data: &mut ViewData, delta: isize) {
    let len = (SUBMIT_SLOT + 1) as isize;
    view_data.form.slot = (view_data.form.slot as isize + delta).rem_euclid(len) as usize;
}

fn handle_table_key(
    state: &mut InvoiceState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) {
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => move_row(state, view_data, 1),
        KeyCode::Char('k') | KeyCode::Up => move_row(state, view_data, -1),
        KeyCode::Char('g') | KeyCode::Home => view_data.table.selected_row = 0,
        KeyCode::Char('G') | KeyCode::End => {
            view_data.table.selected_row = state.items().len().saturating_sub(1);
        }
        KeyCode::Enter | KeyCode::Char('e') => {
            let Some(item) = state.items().get(view_data.table.selected_row) else {
                emit_status(view_data, internal_tx, "nothing to edit");
                return;
            };
            let id = item.id.clone();
            dispatch_and_sync(
                state,
                view_data,
                internal_tx,
                InvoiceCommand::SelectForEdit(id),
            );
        }
        KeyCode::Char('?') => view_data.help_visible = true,
        KeyCode::Tab | KeyCode::Esc => view_data.focus = Focus::Form,
        _ => {}
    }
}

fn move_row(state: &InvoiceState, view_data: &mut ViewData, delta: isize) {
    let len = state.items().len();
    if len == 0 {
        view_data.table.selected_row = 0;
        return;
    }
    let next = (view_data.table.selected_row as isize + delta).clamp(0, len as isize - 1);
    view_data.table.selected_row = next as usize;
}

fn clamp_table_cursor(state: &InvoiceState, view_data: &mut ViewData) {
    view_data.table.selected_row = view_data
        .table
        .selected_row
        .min(state.items().len().saturating_sub(1));
}

fn dispatch_and_sync(
    state: &mut InvoiceState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    command: InvoiceCommand,
) {
    let events = state.dispatch(command);
    for event in &events {
        match event {
            InvoiceEvent::DraftChanged(_) => {}
            InvoiceEvent::ItemAppended(id) => {
                debug!(id = %id, "saved from form");
                view_data.table.selected_row = state.items().len().saturating_sub(1);
                emit_status(view_data, internal_tx, "invoice saved");
            }
            InvoiceEvent::ItemReplaced(id) => {
                debug!(id = %id, "updated from form");
                emit_status(view_data, internal_tx, "invoice updated");
            }
            InvoiceEvent::EditingStarted(id) => {
                view_data.form.reseed(state.draft());
                view_data.form.slot = 0;
                view_data.focus = Focus::Form;
                emit_status(view_data, internal_tx, format!("editing {id}"));
            }
            InvoiceEvent::DraftReset => {
                view_data.form.reseed(state.draft());
                view_data.form.slot = 0;
            }
        }
    }
}

fn field_index(field: FieldName) -> usize {
    FieldName::ALL
        .iter()
        .position(|candidate| *candidate == field)
        .unwrap_or(0)
}

fn render(frame: &mut ratatui::Frame<'_>, state: &InvoiceState, view_data: &ViewData) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(FIELD_COUNT as u16 + 5),
            Constraint::Min(3),
            Constraint::Length(3),
        ])
        .split(frame.area());

    render_form(frame, layout[0], state, view_data);
    render_table(frame, layout[1], state, view_data);

    let status = Paragraph::new(status_text(state, view_data))
        .style(Style::default().fg(Color::Yellow))
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(status, layout[2]);

    if view_data.help_visible {
        let area = centered_rect(70, 50, frame.area());
        frame.render_widget(Clear, area);
        let help = Paragraph::new(help_overlay_text())
            .block(Block::default().title("help").borders(Borders::ALL));
        frame.render_widget(help, area);
    }
}

fn render_form(
    frame: &mut ratatui::Frame<'_>,
    area: Rect,
    state: &InvoiceState,
    view_data: &ViewData,
) {
    let form_focused = view_data.focus == Focus::Form;
    let focus_style = Style::default()
        .fg(Color::Black)
        .bg(Color::Cyan)
        .add_modifier(Modifier::BOLD);

    let mut lines = form_field_lines(view_data)
        .into_iter()
        .enumerate()
        .map(|(slot, text)| {
            if form_focused && slot == view_data.form.slot {
                Line::from(Span::styled(text, focus_style))
            } else {
                Line::from(text)
            }
        })
        .collect::<Vec<_>>();
    lines.push(Line::from(total_line(state)));

    let button = submit_button_text(state);
    let button_style = if form_focused && view_data.form.slot == SUBMIT_SLOT {
        focus_style
    } else {
        Style::default().add_modifier(Modifier::BOLD)
    };
    lines.push(Line::from(Span::styled(button, button_style)));

    let border_style = if form_focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    };
    let form = Paragraph::new(lines).block(
        Block::default()
            .title(form_title(state))
            .borders(Borders::ALL)
            .border_style(border_style),
    );
    frame.render_widget(form, area);
}

fn render_table(
    frame: &mut ratatui::Frame<'_>,
    area: Rect,
    state: &InvoiceState,
    view_data: &ViewData,
) {
    let table_focused = view_data.focus == Focus::Table;
    let header = Row::new(TABLE_COLUMNS.map(|label| {
        Cell::from(label).style(
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )
    }));

    let editing = state.editing().target();
    let rows = table_rows(state, view_data.options.id_width)
        .into_iter()
        .zip(state.items())
        .enumerate()
        .map(|(row_index, (cells, item))| {
            let mut style = Style::default();
            if editing == Some(&item.id) {
                style = style.fg(Color::Cyan).add_modifier(Modifier::ITALIC);
            }
            if table_focused && row_index == view_data.table.selected_row {
                style = style.bg(Color::DarkGray).add_modifier(Modifier::BOLD);
            }
            Row::new(cells).style(style)
        });

    let id_width = view_data.options.id_width.max(2) as u16;
    let widths = [
        Constraint::Length(id_width),
        Constraint::Min(12),
        Constraint::Length(14),
        Constraint::Length(EDIT_ACTION.len() as u16),
    ];
    let border_style = if table_focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    };
    let table = Table::new(rows, widths)
        .header(header)
        .column_spacing(2)
        .block(
            Block::default()
                .title(table_title(state))
                .borders(Borders::ALL)
                .border_style(border_style),
        );
    frame.render_widget(table, area);
}

const TABLE_COLUMNS: [&str; 4] = ["ID", "Invoice Name", "Total Price", "Actions"];

fn form_title(state: &InvoiceState) -> String {
    match state.editing() {
        EditingMode::None => "Invoice Form".to_owned(),
        EditingMode::Editing(_) => "Invoice Form (editing)".to_owned(),
    }
}

fn form_field_lines(view_data: &ViewData) -> Vec<String> {
    FieldName::ALL
        .iter()
        .enumerate()
        .map(|(slot, field)| {
            let mark = if view_data.focus == Focus::Form && slot == view_data.form.slot {
                FOCUS_MARK
            } else {
                " "
            };
            format!("{mark} {:<13} {}", field.label(), view_data.form.buffer(*field))
        })
        .collect()
}

fn total_line(state: &InvoiceState) -> String {
    format!("  Total: {}", format_amount(state.draft().total_price))
}

fn submit_button_text(state: &InvoiceState) -> String {
    format!("  [ {} ]", state.submit_label())
}

fn table_title(state: &InvoiceState) -> String {
    format!(
        "Invoices ({}) | total {}",
        state.items().len(),
        format_amount(state.grand_total())
    )
}

fn table_rows(state: &InvoiceState, id_width: usize) -> Vec<[String; 4]> {
    state
        .items()
        .iter()
        .map(|item| {
            [
                truncate_label(item.id.as_str(), id_width),
                item.name.clone(),
                format_amount(item.total_price),
                EDIT_ACTION.to_owned(),
            ]
        })
        .collect()
}

fn truncate_label(value: &str, max_chars: usize) -> String {
    if value.chars().count() <= max_chars {
        return value.to_owned();
    }
    let mut out = value
        .chars()
        .take(max_chars.saturating_sub(1))
        .collect::<String>();
    out.push('…');
    out
}

fn status_text(state: &InvoiceState, view_data: &ViewData) -> String {
    let mode = match (view_data.focus, state.editing()) {
        (Focus::Table, _) => match state.items().get(view_data.table.selected_row) {
            // The table column is truncated, so the selected row's full id shows here.
            Some(item) => format!("TABLE {}", item.id),
            None => "TABLE".to_owned(),
        },
        (Focus::Form, EditingMode::None) => "NEW".to_owned(),
        (Focus::Form, EditingMode::Editing(_)) => "EDIT".to_owned(),
    };
    let default = match view_data.focus {
        Focus::Form => "tab/shift+tab field | enter or ctrl+s submit | ctrl+t table | F1 help | ctrl+q",
        Focus::Table => "j/k move | enter/e edit | tab form | ? help | ctrl+q",
    };
    match &view_data.status_line {
        Some(status) => format!("{mode} | {status} | {default}"),
        None => format!("{mode} | {default}"),
    }
}

fn help_overlay_text() -> &'static str {
    "global: ctrl+q quit | ctrl+s submit | ctrl+t form/table | F1 help\n\
form: tab/down next field | shift+tab/up previous | type to edit | backspace | ctrl+u clear\n\
form: enter submit | esc table\n\
table: j/k or up/down move | g/G first/last | enter/e edit | tab/esc form\n\
help: esc, ? or F1 close"
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

// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use crossterm::{execute, terminal};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use std::io;
use std::ops::Range;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;
use swanform_app::{
    FormCommand, FormEvent, FormView, ProjectForm, ProjectRequest, SelectOption, SelectView,
};
use tracing::{debug, info, warn};

const POLL_INTERVAL: Duration = Duration::from_millis(120);
const STATUS_CLEAR_DELAY: Duration = Duration::from_secs(4);
const DROPDOWN_ARROW: &str = "▾";
const PICKER_MARK: &str = "▸";
const TEXT_CURSOR: &str = "▏";
const STACK_CARD_GAP: usize = 2;
const MORE_LEFT: &str = "‹ ";
const MORE_RIGHT: &str = " ›";

/// Whoever opened the dialog. It decides what a confirmed request turns into.
pub trait DialogHost {
    fn project_confirmed(&mut self, request: &ProjectRequest) -> Result<()>;
    fn dialog_dismissed(&mut self) -> Result<()> {
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogOutcome {
    Confirmed,
    Dismissed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InternalEvent {
    ClearStatus { token: u64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FormField {
    Name,
    Stack,
    Release,
    Platform,
    UserScript,
    Confirm,
}

impl FormField {
    const ALL: [Self; 6] = [
        Self::Name,
        Self::Stack,
        Self::Release,
        Self::Platform,
        Self::UserScript,
        Self::Confirm,
    ];

    const fn label(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Stack => "stack",
            Self::Release => "release",
            Self::Platform => "platform",
            Self::UserScript => "script",
            Self::Confirm => "add",
        }
    }

    const fn accepts_text(self) -> bool {
        matches!(self, Self::Name | Self::UserScript)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PickerTarget {
    Release,
    Platform,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PickerUiState {
    target: PickerTarget,
    cursor: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct ViewData {
    focus: FormField,
    picker: Option<PickerUiState>,
    help_visible: bool,
    status_line: Option<String>,
    status_token: u64,
}

impl Default for ViewData {
    fn default() -> Self {
        Self {
            focus: FormField::Name,
            picker: None,
            help_visible: false,
            status_line: None,
            status_token: 0,
        }
    }
}

/// Run the project dialog until the user confirms or dismisses it, then hand
/// the outcome to `host` after the terminal is restored.
pub fn run_dialog<H: DialogHost>(form: &mut ProjectForm, host: &mut H) -> Result<DialogOutcome> {
    enable_raw_mode().context("enable raw mode")?;
    let mut terminal = restore_on_error(open_terminal(), restore_terminal)?;

    let mut view_data = ViewData::default();
    let (internal_tx, internal_rx) = mpsc::channel();
    debug!(stack = %form.options().stack, "project dialog opened");

    let result = loop {
        process_internal_events(&mut view_data, &internal_rx);

        let view = swanform_app::render(form);
        if let Err(error) = terminal.draw(|frame| render(frame, &view, &view_data)) {
            break Err(anyhow::Error::new(error).context("draw frame"));
        }

        let has_event = match event::poll(POLL_INTERVAL).context("poll event") {
            Ok(has_event) => has_event,
            Err(error) => break Err(error),
        };
        if !has_event {
            continue;
        }
        match event::read().context("read event") {
            Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => {
                if let Some(outcome) = handle_key_event(form, &mut view_data, &internal_tx, key) {
                    break Ok(outcome);
                }
            }
            Ok(_) => {}
            Err(error) => break Err(error),
        }
    };

    let restored = restore_terminal();
    let outcome = result?;
    restored?;
    finish_dialog(form, host, outcome)?;
    Ok(outcome)
}

/// The dialog draws on stderr; stdout is left for the confirmed request so the
/// binary can be piped or redirected.
fn dialog_backend() -> CrosstermBackend<io::Stderr> {
    CrosstermBackend::new(io::stderr())
}

fn open_terminal() -> Result<Terminal<CrosstermBackend<io::Stderr>>> {
    execute!(io::stderr(), terminal::EnterAlternateScreen).context("enter alternate screen")?;
    Terminal::new(dialog_backend()).context("create terminal")
}

fn restore_terminal() -> Result<()> {
    disable_raw_mode().context("disable raw mode")?;
    execute!(io::stderr(), terminal::LeaveAlternateScreen).context("leave alternate screen")
}

/// Run `restore` when `result` is an error, keeping the original error.
fn restore_on_error<T>(result: Result<T>, restore: impl FnOnce() -> Result<()>) -> Result<T> {
    if result.is_err()
        && let Err(error) = restore()
    {
        warn!(error = %format!("{error:#}"), "terminal restore failed");
    }
    result
}

fn finish_dialog<H: DialogHost>(
    form: &ProjectForm,
    host: &mut H,
    outcome: DialogOutcome,
) -> Result<()> {
    match outcome {
        DialogOutcome::Confirmed => host.project_confirmed(&form.options().request()),
        DialogOutcome::Dismissed => {
            info!("project dialog dismissed without confirming");
            host.dialog_dismissed()
        }
    }
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

fn schedule_status_clear(internal_tx: &Sender<InternalEvent>, token: u64) {
    let sender = internal_tx.clone();
    thread::spawn(move || {
        thread::sleep(STATUS_CLEAR_DELAY);
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
    schedule_status_clear(internal_tx, view_data.status_token);
}

fn handle_key_event(
    form: &mut ProjectForm,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) -> Option<DialogOutcome> {
    let control = key.modifiers.contains(KeyModifiers::CONTROL);
    if control && key.code == KeyCode::Char('q') {
        return Some(DialogOutcome::Dismissed);
    }
    if control && key.code == KeyCode::Char('s') {
        return confirm_form(form, view_data, internal_tx);
    }

    if view_data.help_visible {
        if matches!(key.code, KeyCode::Esc | KeyCode::Char('?') | KeyCode::F(1)) {
            view_data.help_visible = false;
        }
        return None;
    }

    if let Some(picker) = view_data.picker {
        handle_picker_key(form, view_data, internal_tx, picker, key);
        return None;
    }

    let focus = view_data.focus;
    match key.code {
        KeyCode::Esc => return Some(DialogOutcome::Dismissed),
        KeyCode::F(1) => {
            view_data.help_visible = true;
            return None;
        }
        KeyCode::Tab | KeyCode::Down => {
            move_focus(view_data, internal_tx, 1);
            return None;
        }
        KeyCode::BackTab | KeyCode::Up => {
            move_focus(view_data, internal_tx, -1);
            return None;
        }
        _ => {}
    }

    if focus.accepts_text() && !control {
        edit_text(form, view_data, internal_tx, focus, key.code);
        return None;
    }

    match (focus, key.code) {
        (_, KeyCode::Char('?')) => {
            view_data.help_visible = true;
        }
        (FormField::Stack, KeyCode::Left | KeyCode::Char('h')) => {
            cycle_stack(form, view_data, internal_tx, -1);
        }
        (FormField::Stack, KeyCode::Right | KeyCode::Char('l')) => {
            cycle_stack(form, view_data, internal_tx, 1);
        }
        (FormField::Stack, KeyCode::Enter) => {
            move_focus(view_data, internal_tx, 1);
        }
        (FormField::Release, KeyCode::Enter | KeyCode::Char(' ')) => {
            open_picker(form, view_data, PickerTarget::Release);
        }
        (FormField::Platform, KeyCode::Enter | KeyCode::Char(' ')) => {
            open_picker(form, view_data, PickerTarget::Platform);
        }
        (FormField::Confirm, KeyCode::Enter | KeyCode::Char(' ')) => {
            return confirm_form(form, view_data, internal_tx);
        }
        _ => {}
    }
    None
}

fn edit_text(
    form: &mut ProjectForm,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    focus: FormField,
    code: KeyCode,
) {
    let mut text = match focus {
        FormField::Name => form.options().name.clone(),
        FormField::UserScript => form.options().user_script.clone(),
        _ => return,
    };

    match code {
        KeyCode::Char(ch) => text.push(ch),
        KeyCode::Backspace => {
            if text.pop().is_none() {
                return;
            }
        }
        KeyCode::Enter if focus == FormField::UserScript => text.push('\n'),
        KeyCode::Enter => {
            move_focus(view_data, internal_tx, 1);
            return;
        }
        _ => return,
    }

    let command = if focus == FormField::Name {
        FormCommand::ChangeName(text)
    } else {
        FormCommand::ChangeUserScript(text)
    };
    apply_command(form, view_data, internal_tx, command);
}

fn move_focus(view_data: &mut ViewData, internal_tx: &Sender<InternalEvent>, delta: isize) {
    let fields = FormField::ALL;
    let current = fields
        .iter()
        .position(|field| *field == view_data.focus)
        .unwrap_or(0) as isize;
    let len = fields.len() as isize;
    let next = (current + delta).rem_euclid(len) as usize;
    view_data.focus = fields[next];
    emit_status(view_data, internal_tx, format_field_status(view_data.focus));
}

fn format_field_status(field: FormField) -> String {
    let index = FormField::ALL
        .iter()
        .position(|candidate| *candidate == field)
        .unwrap_or(0);
    format!(
        "field {} ({}/{})",
        field.label(),
        index + 1,
        FormField::ALL.len()
    )
}

fn cycle_stack(
    form: &mut ProjectForm,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    delta: isize,
) {
    let options = form.options();
    let stacks = options
        .stacks_options
        .stack_names()
        .map(str::to_owned)
        .collect::<Vec<_>>();
    if stacks.is_empty() {
        emit_status(view_data, internal_tx, "catalogue has no stacks");
        return;
    }
    let current = stacks
        .iter()
        .position(|stack| *stack == options.stack)
        .unwrap_or(0) as isize;
    let next = (current + delta).rem_euclid(stacks.len() as isize) as usize;
    let stack = stacks[next].clone();
    apply_command(
        form,
        view_data,
        internal_tx,
        FormCommand::SelectStack(stack),
    );
}

fn picker_options(form: &ProjectForm, target: PickerTarget) -> &[SelectOption] {
    match target {
        PickerTarget::Release => form.release_options(),
        PickerTarget::Platform => form.platform_options(),
    }
}

fn open_picker(form: &ProjectForm, view_data: &mut ViewData, target: PickerTarget) {
    let current = match target {
        PickerTarget::Release => &form.options().release,
        PickerTarget::Platform => &form.options().platform,
    };
    let cursor = picker_options(form, target)
        .iter()
        .position(|option| option.value == *current)
        .unwrap_or(0);
    view_data.picker = Some(PickerUiState { target, cursor });
}

fn handle_picker_key(
    form: &mut ProjectForm,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    mut picker: PickerUiState,
    key: KeyEvent,
) {
    let last = picker_options(form, picker.target).len().saturating_sub(1);
    match key.code {
        KeyCode::Esc => {
            view_data.picker = None;
            return;
        }
        KeyCode::Down | KeyCode::Char('j') => picker.cursor = (picker.cursor + 1).min(last),
        KeyCode::Up | KeyCode::Char('k') => picker.cursor = picker.cursor.saturating_sub(1),
        KeyCode::Home | KeyCode::Char('g') => picker.cursor = 0,
        KeyCode::End | KeyCode::Char('G') => picker.cursor = last,
        KeyCode::Enter | KeyCode::Char(' ') => {
            view_data.picker = None;
            let Some(selection) = picker_options(form, picker.target)
                .get(picker.cursor)
                .cloned()
            else {
                emit_status(view_data, internal_tx, "nothing to select");
                return;
            };
            let command = match picker.target {
                PickerTarget::Release => FormCommand::ChangeRelease(selection),
                PickerTarget::Platform => FormCommand::ChangePlatform(selection),
            };
            apply_command(form, view_data, internal_tx, command);
            return;
        }
        _ => return,
    }
    view_data.picker = Some(picker);
}

fn confirm_form(
    form: &mut ProjectForm,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
) -> Option<DialogOutcome> {
    apply_command(form, view_data, internal_tx, FormCommand::Confirm);
    form.is_confirmed().then_some(DialogOutcome::Confirmed)
}

fn apply_command(
    form: &mut ProjectForm,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    command: FormCommand,
) -> Vec<FormEvent> {
    match form.dispatch(command) {
        Ok(events) => {
            if let Some(status) = status_for_events(&events) {
                emit_status(view_data, internal_tx, status);
            }
            events
        }
        Err(error) => {
            let message = format!("{error:#}");
            warn!(error = %message, "form command failed");
            emit_status(view_data, internal_tx, message);
            Vec::new()
        }
    }
}

fn status_for_events(events: &[FormEvent]) -> Option<String> {
    events.iter().rev().find_map(|event| match event {
        FormEvent::StackSelected {
            stack,
            release,
            platform,
        } => Some(format!("stack {stack}: {release} on {platform}")),
        FormEvent::ReleaseChanged { release, platform } => {
            Some(format!("release {release} on {platform}"))
        }
        FormEvent::PlatformChanged(platform) => Some(format!("platform {platform}")),
        FormEvent::Confirmed => Some("confirmed".to_owned()),
        FormEvent::NameChanged | FormEvent::UserScriptChanged => None,
    })
}

fn render(frame: &mut ratatui::Frame<'_>, view: &FormView, view_data: &ViewData) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(6),
            Constraint::Length(3),
            Constraint::Length(2),
        ])
        .split(frame.area());

    let focus = view_data.focus;
    let name = Paragraph::new(render_name_line(view, focus == FormField::Name))
        .block(field_block("new project", focus == FormField::Name));
    frame.render_widget(name, layout[0]);

    let card_width = usize::from(layout[1].width.saturating_sub(2));
    let stacks = Paragraph::new(render_stack_cards_line(view, card_width))
        .block(field_block("stack", focus == FormField::Stack));
    frame.render_widget(stacks, layout[1]);

    let selects = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(layout[2]);
    let release = Paragraph::new(render_select_text(&view.release))
        .block(field_block(view.release.label, focus == FormField::Release));
    frame.render_widget(release, selects[0]);
    let platform = Paragraph::new(render_select_text(&view.platform))
        .block(field_block(view.platform.label, focus == FormField::Platform));
    frame.render_widget(platform, selects[1]);

    let script_focused = focus == FormField::UserScript;
    let script = if view.user_script.is_empty() && !script_focused {
        Paragraph::new(view.user_script_placeholder).style(Style::default().fg(Color::DarkGray))
    } else {
        Paragraph::new(render_user_script_text(view, script_focused))
    };
    frame.render_widget(
        script
            .wrap(Wrap { trim: false })
            .block(field_block(view.user_script_label, script_focused)),
        layout[3],
    );

    let button_style = if focus == FormField::Confirm {
        Style::default()
            .fg(Color::Black)
            .bg(Color::Cyan)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::Cyan)
    };
    let button = Paragraph::new(Line::from(Span::styled(
        format!("[ {} ]", view.confirm_label),
        button_style,
    )))
    .alignment(Alignment::Right)
    .block(Block::default().borders(Borders::TOP));
    frame.render_widget(button, layout[4]);

    let status = Paragraph::new(status_text(view_data))
        .style(Style::default().fg(Color::Yellow))
        .block(Block::default().borders(Borders::TOP));
    frame.render_widget(status, layout[5]);

    if let Some(picker) = view_data.picker {
        let select = match picker.target {
            PickerTarget::Release => &view.release,
            PickerTarget::Platform => &view.platform,
        };
        let area = centered_rect(50, 50, frame.area());
        frame.render_widget(Clear, area);
        let rows = usize::from(area.height.saturating_sub(2));
        let list = Paragraph::new(render_picker_text(select, picker.cursor, rows)).block(
            Block::default()
                .title(select.label)
                .borders(Borders::ALL)
                .style(Style::default().fg(Color::Cyan)),
        );
        frame.render_widget(list, area);
    }

    if view_data.help_visible {
        let area = centered_rect(70, 60, frame.area());
        frame.render_widget(Clear, area);
        let help = Paragraph::new(help_overlay_text())
            .block(Block::default().title("help").borders(Borders::ALL));
        frame.render_widget(help, area);
    }
}

fn field_block(title: &str, focused: bool) -> Block<'_> {
    let style = if focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    };
    Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(style)
}

fn render_name_line(view: &FormView, focused: bool) -> Line<'static> {
    if view.name.is_empty() && !focused {
        return Line::from(Span::styled(
            view.name_placeholder,
            Style::default().fg(Color::DarkGray),
        ));
    }
    Line::from(render_name_text(view, focused))
}

fn render_name_text(view: &FormView, focused: bool) -> String {
    if focused {
        format!("{}{TEXT_CURSOR}", view.name)
    } else if view.name.is_empty() {
        view.name_placeholder.to_owned()
    } else {
        view.name.clone()
    }
}

/// Cards that fit in `width` columns, always including the selected one.
fn stack_card_window(view: &FormView, width: usize) -> Range<usize> {
    let widths = view
        .stacks
        .iter()
        .map(|card| card.name.chars().count() + 2)
        .collect::<Vec<_>>();
    let span = |range: Range<usize>| {
        widths[range.clone()].iter().sum::<usize>()
            + STACK_CARD_GAP * range.len().saturating_sub(1)
    };

    let len = widths.len();
    if span(0..len) <= width {
        return 0..len;
    }

    // Room for the overflow markers on both sides.
    let available = width.saturating_sub(MORE_LEFT.chars().count() + MORE_RIGHT.chars().count());
    let selected = view.selected_stack_index().unwrap_or(0);
    let mut start = 0;
    while start < selected && span(start..selected + 1) > available {
        start += 1;
    }
    let mut end = selected + 1;
    while end < len && span(start..end + 1) <= available {
        end += 1;
    }
    start..end
}

fn render_stack_cards_line(view: &FormView, width: usize) -> Line<'static> {
    let window = stack_card_window(view, width);
    let mut spans = Vec::with_capacity(window.len() * 2 + 2);
    if window.start > 0 {
        spans.push(Span::styled(MORE_LEFT, Style::default().fg(Color::DarkGray)));
    }
    for (offset, card) in view.stacks[window.clone()].iter().enumerate() {
        if offset > 0 {
            spans.push(Span::raw(" ".repeat(STACK_CARD_GAP)));
        }
        let style = if card.selected {
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        spans.push(Span::styled(render_stack_card_text(&card.name, card.selected), style));
    }
    if window.end < view.stacks.len() {
        spans.push(Span::styled(MORE_RIGHT, Style::default().fg(Color::DarkGray)));
    }
    Line::from(spans)
}

fn render_stack_card_text(name: &str, selected: bool) -> String {
    if selected {
        format!("[{name}]")
    } else {
        format!(" {name} ")
    }
}

fn render_select_text(select: &SelectView) -> String {
    format!("{} {DROPDOWN_ARROW}", select.selected.label)
}

/// Rows `start..end` of a `len`-entry list shown `rows` at a time with the
/// cursor kept on screen.
fn picker_window(len: usize, cursor: usize, rows: usize) -> Range<usize> {
    if len <= rows {
        return 0..len;
    }
    let cursor = cursor.min(len - 1);
    let start = (cursor + 1).saturating_sub(rows);
    start..start + rows
}

fn render_picker_text(select: &SelectView, cursor: usize, rows: usize) -> String {
    let window = picker_window(select.options.len(), cursor, rows);
    select.options[window.clone()]
        .iter()
        .zip(window)
        .map(|(option, index)| {
            let mark = if index == cursor { PICKER_MARK } else { " " };
            let current = if option.value == select.selected.value {
                " *"
            } else {
                ""
            };
            format!("{mark} {}{current}", option.label)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_user_script_text(view: &FormView, focused: bool) -> String {
    if focused {
        format!("{}{TEXT_CURSOR}", view.user_script)
    } else {
        view.user_script.clone()
    }
}

fn status_text(view_data: &ViewData) -> String {
    let hints = if view_data.picker.is_some() {
        "j/k move | enter select | esc close"
    } else if view_data.focus.accepts_text() {
        "tab/shift+tab field | type to edit | ctrl+s add | esc cancel"
    } else {
        "tab/shift+tab field | h/l stack | enter open | ctrl+s add | ? help | esc cancel"
    };
    match &view_data.status_line {
        Some(status) => format!("{status} | {hints}"),
        None => hints.to_owned(),
    }
}

fn help_overlay_text() -> &'static str {
    "tab / down      next field\n\
     shift+tab / up  previous field\n\
     h/l, left/right switch stack\n\
     enter / space   open release or platform list\n\
     j/k, g/G        move in list\n\
     enter           pick list entry, add project on [ Add ]\n\
     ctrl+s          add project from any field\n\
     esc             close list, or cancel dialog\n\
     ctrl+q          cancel dialog\n\
     f1 / ?          toggle help"
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

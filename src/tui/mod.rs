//! Terminal front end for the site entry wizard.
//!
//! Layout:
//! - Centered window titled "Site Entry"
//! - Left panel with the step list, current step highlighted
//! - Main panel with the controls of the current step, lease figures and site suggestions
//! - Bottom button row: [ Back ] [ Next ] or, on the last step, [ Submit ] / [ Back to start ]
//! - Modals: notices, quit confirmation, inactivity overlay
//!
//! Note: Logging is file-only in TUI mode (stdout logging is disabled) to avoid corrupting the terminal UI.

mod input;
mod render;

use anyhow::Result;
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, KeyModifiers,
};
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::ExecutableCommand;
use log::{info, warn};
use ratatui::backend::{CrosstermBackend, TestBackend};
use ratatui::Terminal;
use std::io::{self, Stdout};
use std::sync::{mpsc, Arc};
use std::time::{Duration, Instant};

use crate::config::AppConfig;
use crate::models::form::{controls, FieldKind, FormDefinition, FormRecord};
use crate::models::reference::ReferenceData;
use crate::service::{save_with_retry, DataService, ServiceError};
use crate::wizard::idle::{ManualClock, SystemClock};
use crate::wizard::{FormWizardController, SubmitOrigin, Transition};
use input::TextInput;

/// How many site suggestions are listed under the site control.
pub(crate) const SUGGESTION_LIMIT: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ButtonFocus {
    Back,
    Next,
    Submit,
    BackToStart,
}

impl ButtonFocus {
    pub(crate) fn label(&self) -> &'static str {
        match self {
            ButtonFocus::Back => "Back",
            ButtonFocus::Next => "Next",
            ButtonFocus::Submit => "Submit",
            ButtonFocus::BackToStart => "Back to start",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum FocusTarget {
    Field(String),
    Button(ButtonFocus),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Modal {
    ConfirmQuit,
}

enum UiMsg {
    ReferenceLoaded(Result<ReferenceData, ServiceError>),
    SaveFinished(Result<(), ServiceError>),
}

/// Work the event loop has to hand to the background runtime.
#[derive(Debug, PartialEq)]
enum Command {
    Save(FormRecord),
}

/// Screen-only state. Everything about the form itself lives in the controller.
pub(crate) struct TuiState {
    pub(crate) focus: FocusTarget,
    pub(crate) editor: Option<(String, TextInput)>,
    pub(crate) modal: Option<Modal>,
    shown_step: u32,
    quit: bool,
}

impl TuiState {
    fn new(ctrl: &FormWizardController) -> Self {
        let mut state = Self {
            focus: FocusTarget::Button(ButtonFocus::Next),
            editor: None,
            modal: None,
            shown_step: 0,
            quit: false,
        };
        sync_focus(&mut state, ctrl);
        state
    }
}

/// Bridges the synchronous event loop and the async data service.
struct Worker {
    rt: tokio::runtime::Runtime,
    service: Arc<dyn DataService>,
    tx: mpsc::Sender<UiMsg>,
    save_attempts: u32,
}

impl Worker {
    fn fetch_reference_data(&self) {
        let service = self.service.clone();
        let tx = self.tx.clone();
        self.rt.spawn(async move {
            let result = service.fetch_reference_data().await;
            let _ = tx.send(UiMsg::ReferenceLoaded(result));
        });
    }

    fn save(&self, record: FormRecord) {
        let service = self.service.clone();
        let tx = self.tx.clone();
        let attempts = self.save_attempts;
        self.rt.spawn(async move {
            let result = save_with_retry(service.as_ref(), &record, attempts).await;
            let _ = tx.send(UiMsg::SaveFinished(result));
        });
    }
}

pub fn run(cfg: &AppConfig) -> Result<()> {
    info!("[PHASE: tui] [STEP: start] Starting TUI wizard");

    let form = cfg.form_definition()?;
    let service = cfg.data_service()?;
    let rt = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()?;
    let (tx, rx) = mpsc::channel::<UiMsg>();
    let worker = Worker {
        rt,
        service,
        tx,
        save_attempts: cfg.service.save_attempts,
    };

    let mut ctrl = FormWizardController::new(form, Arc::new(SystemClock), cfg.idle_timeout());
    ctrl.start();
    worker.fetch_reference_data();

    let mut terminal = setup_terminal()?;
    let result = run_loop(&mut terminal, &mut ctrl, &worker, &rx);
    restore_terminal(&mut terminal)?;

    info!("[PHASE: tui] [STEP: exit] TUI wizard closed");
    result
}

/// Render one frame of a seeded wizard into an in-memory backend and return it as text.
pub fn smoke(target: &str) -> Result<String> {
    info!(
        "[PHASE: tui] [STEP: smoke] Rendering single-frame TUI smoke target={}",
        target
    );

    let (ctrl, state) = new_smoke_wizard(target.trim().to_ascii_lowercase().as_str());

    // In-memory backend: no raw mode, no alternate screen.
    let backend = TestBackend::new(100, 30);
    let mut terminal = Terminal::new(backend)?;
    terminal.draw(|f| render::draw(f.size(), f, &state, &ctrl))?;

    Ok(buffer_text(terminal.backend()))
}

fn buffer_text(backend: &TestBackend) -> String {
    let buffer = backend.buffer();
    let width = buffer.area.width.max(1) as usize;
    buffer
        .content
        .chunks(width)
        .map(|row| {
            row.iter()
                .map(|cell| cell.symbol())
                .collect::<String>()
                .trim_end()
                .to_string()
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn new_smoke_wizard(target: &str) -> (FormWizardController, TuiState) {
    // Smoke-only: seeded values for deterministic rendering.
    let clock = Arc::new(ManualClock::new());
    let idle = Duration::from_secs(900);
    let mut ctrl = FormWizardController::new(FormDefinition::site_visit(), clock.clone(), idle);
    ctrl.start();
    ctrl.apply_reference_data(Ok(ReferenceData {
        sites: vec!["North Yard".to_string(), "Harbor".to_string()],
        equipments: vec!["Crane 4".to_string(), "Loader 2".to_string()],
    }));

    let step: u32 = match target {
        "2" | "lease" => 2,
        "3" | "payments" => 3,
        "4" | "usage" => 4,
        "5" | "finish" | "notice" => 5,
        _ => 1,
    };

    let seed: [&[(&str, &str)]; 4] = [
        &[
            (controls::DATE, "2024-01-05"),
            (controls::SITE, "North Yard"),
            (controls::EQUIPMENT, "Crane 4"),
        ],
        &[
            (controls::LEASE_START, "2024-01-01"),
            (controls::LEASE_END, "2024-01-11"),
            (controls::RENEWAL, "Yes"),
            ("renewalTerms", "12 months"),
        ],
        &[("paymentNotes", "none")],
        &[
            (controls::USED, "Yes"),
            ("hoursUsed", "6"),
            (controls::BREAKDOWN, "No"),
        ],
    ];
    for values in seed.iter().take(step.saturating_sub(1) as usize) {
        for (name, value) in values.iter() {
            ctrl.set_value(name, value);
        }
        ctrl.next();
    }
    // The target step itself is shown filled in, except the first.
    if (2..=4).contains(&step) {
        for (name, value) in seed[step as usize - 1].iter() {
            ctrl.set_value(name, value);
        }
    }

    match target {
        "5" | "finish" => {
            ctrl.set_value("remarks", "all good");
            ctrl.set_value(controls::DONE, "Yes");
        }
        "notice" => {
            ctrl.begin_submit(SubmitOrigin::Submit);
            ctrl.finish_submit(Err(ServiceError::transport(
                "Could not reach the records service.",
                "connection refused",
            )));
        }
        "overlay" => {
            clock.advance(idle);
            ctrl.tick();
        }
        _ => {}
    }

    let state = TuiState::new(&ctrl);
    (ctrl, state)
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    stdout.execute(EnterAlternateScreen)?;
    stdout.execute(EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    terminal.backend_mut().execute(DisableMouseCapture)?;
    terminal.backend_mut().execute(LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

fn run_loop(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    ctrl: &mut FormWizardController,
    worker: &Worker,
    rx: &mpsc::Receiver<UiMsg>,
) -> Result<()> {
    let tick_rate = Duration::from_millis(100);
    let mut last_tick = Instant::now();
    let mut state = TuiState::new(ctrl);

    while !state.quit {
        drain_messages(&mut state, ctrl, rx);
        terminal.draw(|f| render::draw(f.size(), f, &state, ctrl))?;

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or_else(|| Duration::from_millis(0));

        if event::poll(timeout)? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    if let Some(Command::Save(record)) =
                        handle_key(&mut state, ctrl, key.code, key.modifiers)
                    {
                        worker.save(record);
                    }
                }
                Event::Mouse(_) => ctrl.record_activity(),
                _ => {}
            }
        }

        if last_tick.elapsed() >= tick_rate {
            ctrl.tick();
            last_tick = Instant::now();
        }
    }

    Ok(())
}

fn drain_messages(
    state: &mut TuiState,
    ctrl: &mut FormWizardController,
    rx: &mpsc::Receiver<UiMsg>,
) {
    while let Ok(msg) = rx.try_recv() {
        match msg {
            UiMsg::ReferenceLoaded(result) => ctrl.apply_reference_data(result),
            UiMsg::SaveFinished(result) => ctrl.finish_submit(result),
        }
    }
    sync_focus(state, ctrl);
}

// ---------------------------------------------------------------------------
// Focus
// ---------------------------------------------------------------------------

pub(crate) fn buttons(ctrl: &FormWizardController) -> Vec<ButtonFocus> {
    use crate::models::form::Section;

    let mut out = Vec::new();
    if !ctrl.history().is_empty() {
        out.push(ButtonFocus::Back);
    }
    if !ctrl.is_last_step() {
        out.push(ButtonFocus::Next);
    } else {
        if ctrl.is_section_visible(Section::FinalSubmit) {
            out.push(ButtonFocus::Submit);
        }
        if ctrl.is_section_visible(Section::BackToStart) {
            out.push(ButtonFocus::BackToStart);
        }
    }
    out
}

fn focus_targets(ctrl: &FormWizardController) -> Vec<FocusTarget> {
    let mut targets: Vec<FocusTarget> = ctrl
        .current_panel()
        .map(|panel| {
            panel
                .fields
                .iter()
                .filter(|f| ctrl.is_field_visible(&f.name))
                .map(|f| FocusTarget::Field(f.name.clone()))
                .collect()
        })
        .unwrap_or_default();
    targets.extend(buttons(ctrl).into_iter().map(FocusTarget::Button));
    targets
}

/// Keep focus on something that is on screen and the editor in step with the controller.
fn sync_focus(state: &mut TuiState, ctrl: &FormWizardController) {
    let targets = focus_targets(ctrl);
    let step_changed = state.shown_step != ctrl.current_step();
    if step_changed || !targets.contains(&state.focus) {
        if let Some(first) = targets.first() {
            state.focus = first.clone();
        }
        state.shown_step = ctrl.current_step();
    }

    state.editor = match &state.focus {
        FocusTarget::Field(name) if is_text_like(ctrl, name) => {
            let value = ctrl.value(name);
            match state.editor.take() {
                Some((n, editor)) if n == *name && editor.value == value => Some((n, editor)),
                _ => Some((name.clone(), TextInput::new(value))),
            }
        }
        _ => None,
    };
}

fn move_focus(state: &mut TuiState, ctrl: &FormWizardController, delta: isize) {
    let targets = focus_targets(ctrl);
    if targets.is_empty() {
        return;
    }
    let len = targets.len() as isize;
    let current = targets
        .iter()
        .position(|t| *t == state.focus)
        .unwrap_or(0) as isize;
    let next = (current + delta).rem_euclid(len) as usize;
    state.focus = targets[next].clone();
    sync_focus(state, ctrl);
}

fn is_text_like(ctrl: &FormWizardController, name: &str) -> bool {
    matches!(
        ctrl.form().field(name).map(|f| &f.kind),
        Some(FieldKind::Text | FieldKind::Date | FieldKind::Number | FieldKind::Suggest { .. })
    )
}

// ---------------------------------------------------------------------------
// Keys
// ---------------------------------------------------------------------------

fn handle_key(
    state: &mut TuiState,
    ctrl: &mut FormWizardController,
    code: KeyCode,
    modifiers: KeyModifiers,
) -> Option<Command> {
    ctrl.record_activity();

    if ctrl.overlay_visible() {
        if matches!(code, KeyCode::Enter | KeyCode::Esc) {
            ctrl.dismiss_overlay();
        }
        return None;
    }

    if state.modal == Some(Modal::ConfirmQuit) {
        match code {
            KeyCode::Char('y') | KeyCode::Char('Y') => state.quit = true,
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => state.modal = None,
            _ => {}
        }
        return None;
    }

    if ctrl.notice().is_some() {
        if matches!(code, KeyCode::Enter | KeyCode::Esc) {
            ctrl.clear_notice();
        }
        return None;
    }

    if code == KeyCode::Esc
        || (code == KeyCode::Char('c') && modifiers.contains(KeyModifiers::CONTROL))
    {
        state.modal = Some(Modal::ConfirmQuit);
        return None;
    }

    match code {
        KeyCode::Tab | KeyCode::Down => {
            move_focus(state, ctrl, 1);
            return None;
        }
        KeyCode::BackTab | KeyCode::Up => {
            move_focus(state, ctrl, -1);
            return None;
        }
        _ => {}
    }

    let command = match state.focus.clone() {
        FocusTarget::Button(button) => match code {
            KeyCode::Enter | KeyCode::Char(' ') => activate(state, ctrl, button),
            KeyCode::Left => {
                move_focus(state, ctrl, -1);
                None
            }
            KeyCode::Right => {
                move_focus(state, ctrl, 1);
                None
            }
            _ => None,
        },
        FocusTarget::Field(name) => {
            handle_field_key(state, ctrl, &name, code);
            None
        }
    };

    sync_focus(state, ctrl);
    command
}

fn activate(
    state: &mut TuiState,
    ctrl: &mut FormWizardController,
    button: ButtonFocus,
) -> Option<Command> {
    match button {
        ButtonFocus::Back => {
            ctrl.back();
            None
        }
        ButtonFocus::Next => {
            if let Transition::Blocked { invalid } = ctrl.next() {
                // Jump to the first control that needs attention, in panel order.
                let first = ctrl.current_panel().and_then(|panel| {
                    panel
                        .fields
                        .iter()
                        .find(|f| invalid.contains(&f.name))
                        .map(|f| f.name.clone())
                });
                if let Some(name) = first {
                    state.focus = FocusTarget::Field(name);
                }
            }
            None
        }
        ButtonFocus::Submit => ctrl.begin_submit(SubmitOrigin::Submit).map(Command::Save),
        ButtonFocus::BackToStart => ctrl
            .begin_submit(SubmitOrigin::BackToStart)
            .map(Command::Save),
    }
}

fn handle_field_key(
    state: &mut TuiState,
    ctrl: &mut FormWizardController,
    name: &str,
    code: KeyCode,
) {
    let Some(kind) = ctrl.form().field(name).map(|f| f.kind.clone()) else {
        warn!("[PHASE: tui] [STEP: key] Focused control '{}' is not declared", name);
        return;
    };

    if code == KeyCode::Enter {
        move_focus(state, ctrl, 1);
        return;
    }

    match kind {
        FieldKind::Radio { options } => {
            if let Some(choice) = cycle(&options, ctrl.value(name), code) {
                ctrl.set_value(name, &choice);
            }
        }
        FieldKind::Select { source } => {
            let options: Vec<String> = ctrl
                .reference_data()
                .map(|d| d.list(source).to_vec())
                .unwrap_or_default();
            if let Some(choice) = cycle(&options, ctrl.value(name), code) {
                ctrl.set_value(name, &choice);
            }
        }
        FieldKind::Suggest { source } if code == KeyCode::Right => {
            let at_end = state
                .editor
                .as_ref()
                .map(|(_, e)| e.at_end())
                .unwrap_or(true);
            let first = ctrl
                .reference_data()
                .and_then(|d| d.suggestions(source, ctrl.value(name), 1).first().map(|s| s.to_string()));
            match (at_end, first) {
                (true, Some(suggestion)) if suggestion != ctrl.value(name) => {
                    ctrl.set_value(name, &suggestion);
                    if let Some((_, editor)) = state.editor.as_mut() {
                        editor.set(suggestion);
                    }
                }
                _ => edit_text(state, ctrl, name, code, |_| true),
            }
        }
        FieldKind::Number => edit_text(state, ctrl, name, code, |c| c.is_ascii_digit() || c == '.'),
        FieldKind::Date => edit_text(state, ctrl, name, code, |c| c.is_ascii_digit() || c == '-'),
        FieldKind::Text | FieldKind::Suggest { .. } => edit_text(state, ctrl, name, code, |_| true),
    }
}

fn edit_text(
    state: &mut TuiState,
    ctrl: &mut FormWizardController,
    name: &str,
    code: KeyCode,
    accept: impl Fn(char) -> bool,
) {
    let Some((_, editor)) = state.editor.as_mut().filter(|(n, _)| n == name) else {
        return;
    };
    if editor.handle_key(code, accept) {
        let value = editor.value.clone();
        ctrl.set_value(name, &value);
    }
}

/// Left/Right step through `options`; Space moves forward. Nothing selected starts at the ends.
fn cycle(options: &[String], current: &str, code: KeyCode) -> Option<String> {
    if options.is_empty() {
        return None;
    }
    let len = options.len();
    let pos = options.iter().position(|o| o == current);
    let next = match (code, pos) {
        (KeyCode::Right | KeyCode::Char(' '), Some(i)) => (i + 1) % len,
        (KeyCode::Right | KeyCode::Char(' '), None) => 0,
        (KeyCode::Left, Some(i)) => (i + len - 1) % len,
        (KeyCode::Left, None) => len - 1,
        _ => return None,
    };
    Some(options[next].clone())
}

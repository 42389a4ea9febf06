use ratatui::layout::{Alignment, Constraint, Direction, Layout, Margin, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use ratatui::Frame;

use super::{buttons, FocusTarget, Modal, TuiState, SUGGESTION_LIMIT};
use crate::models::form::{controls, FieldKind, FieldSpec};
use crate::wizard::validation::FieldMark;
use crate::wizard::FormWizardController;

pub(crate) fn draw(area: Rect, f: &mut Frame<'_>, state: &TuiState, ctrl: &FormWizardController) {
    let window_area = centered_window(area, 100, 30);

    let outer_block = Block::default().borders(Borders::ALL).title("Site Entry");
    f.render_widget(outer_block, window_area);

    let inner = window_area.inner(&Margin {
        vertical: 1,
        horizontal: 1,
    });
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)].as_ref())
        .split(inner);

    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(24), Constraint::Min(0)].as_ref())
        .split(rows[0]);

    draw_steps(f, cols[0], ctrl);
    draw_panel(f, cols[1], state, ctrl);
    draw_buttons(f, rows[1], state, ctrl);

    if state.modal == Some(Modal::ConfirmQuit) {
        draw_modal(
            f,
            window_area,
            "Quit?",
            "Answers that were not submitted will be lost.\n\nQuit now? (y / n)",
            Color::Yellow,
        );
    } else if let Some(notice) = ctrl.notice() {
        let body = format!("{}\n\n[ OK ]", notice.message());
        let color = if notice.is_error() {
            Color::Red
        } else {
            Color::Green
        };
        draw_modal(f, window_area, notice.title(), &body, color);
    }

    // Drawn last: sits over everything else.
    if ctrl.overlay_visible() {
        draw_modal(
            f,
            window_area,
            "Session timed out",
            "Session timed out due to inactivity.\n\nPress Enter to continue.",
            Color::Yellow,
        );
    }
}

fn draw_steps(f: &mut Frame<'_>, area: Rect, ctrl: &FormWizardController) {
    let current = ctrl.current_step();
    let mut lines: Vec<Line> = ctrl
        .form()
        .steps
        .iter()
        .map(|step| {
            let label = format!(" {}. {}", step.number, step.title);
            if step.number == current {
                Line::from(Span::styled(
                    format!(">{}", label),
                    Style::default().add_modifier(Modifier::BOLD),
                ))
            } else if ctrl.history().contains(&step.number) {
                Line::from(format!(" {}", label))
            } else {
                Line::from(Span::styled(
                    format!(" {}", label),
                    Style::default().fg(Color::DarkGray),
                ))
            }
        })
        .collect();
    lines.push(Line::from(""));
    lines.push(Line::from(format!(
        " Step {} of {}",
        current,
        ctrl.form().step_count()
    )));

    let p = Paragraph::new(Text::from(lines)).block(Block::default().borders(Borders::ALL));
    f.render_widget(p, area);
}

fn draw_panel(f: &mut Frame<'_>, area: Rect, state: &TuiState, ctrl: &FormWizardController) {
    let Some(panel) = ctrl.current_panel() else {
        return;
    };

    let mut lines: Vec<Line> = Vec::new();
    lines.push(Line::from(""));

    for field in panel.fields.iter().filter(|f| ctrl.is_field_visible(&f.name)) {
        let focused = state.focus == FocusTarget::Field(field.name.clone());
        lines.push(field_line(field, focused, state, ctrl));

        if focused {
            if let FieldKind::Suggest { source } = field.kind {
                let typed = ctrl.value(&field.name);
                let suggestions: Vec<&str> = ctrl
                    .reference_data()
                    .map(|d| d.suggestions(source, typed, SUGGESTION_LIMIT))
                    .unwrap_or_default()
                    .into_iter()
                    .filter(|s| *s != typed)
                    .collect();
                if !suggestions.is_empty() {
                    lines.push(Line::from(Span::styled(
                        format!("      suggestions: {}  (Right to accept)", suggestions.join(", ")),
                        Style::default().fg(Color::DarkGray),
                    )));
                }
            }
        }
    }

    let shows_lease = panel
        .fields
        .iter()
        .any(|f| f.name == controls::LEASE_START || f.name == controls::LEASE_END);
    if shows_lease {
        lines.push(Line::from(""));
        match ctrl.lease() {
            Some(lease) => {
                for (label, value) in lease.lines() {
                    lines.push(Line::from(format!("  {}: {}", label, value)));
                }
            }
            None => lines.push(Line::from(Span::styled(
                "  Lease figures appear once the visit date and both lease dates are valid.",
                Style::default().fg(Color::DarkGray),
            ))),
        }
    }

    if ctrl.save_pending() {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "  Saving...",
            Style::default().fg(Color::Yellow),
        )));
    }

    let title = format!(
        "Step {} of {}: {}",
        panel.number,
        ctrl.form().step_count(),
        panel.title
    );
    let p = Paragraph::new(Text::from(lines))
        .block(Block::default().borders(Borders::ALL).title(title))
        .wrap(Wrap { trim: false });
    f.render_widget(p, area);
}

fn field_line<'a>(
    field: &'a FieldSpec,
    focused: bool,
    state: &'a TuiState,
    ctrl: &'a FormWizardController,
) -> Line<'a> {
    let invalid = ctrl.mark(&field.name) == Some(FieldMark::Error);

    let mut label_style = Style::default();
    if focused {
        label_style = label_style.add_modifier(Modifier::BOLD);
    }
    if invalid {
        label_style = label_style.fg(Color::Red);
    }

    let mut spans = vec![
        Span::raw(if focused { "  > " } else { "    " }),
        Span::styled(field.label.as_str(), label_style),
        Span::styled(
            if field.required { " *" } else { "" },
            Style::default().fg(Color::DarkGray),
        ),
        Span::raw(": "),
    ];

    let value = ctrl.value(&field.name);
    match &field.kind {
        FieldKind::Radio { options } => {
            for option in options {
                let mark = if option == value { "(x)" } else { "( )" };
                spans.push(Span::raw(format!("{} {}  ", mark, option)));
            }
        }
        FieldKind::Select { source } => {
            let has_list = ctrl
                .reference_data()
                .map(|d| !d.list(*source).is_empty())
                .unwrap_or(false);
            let shown = match (value.is_empty(), has_list) {
                (false, _) => format!("< {} >", value),
                (true, true) => "< choose >".to_string(),
                (true, false) => "(list unavailable)".to_string(),
            };
            spans.push(Span::raw(shown));
        }
        _ => match state.editor.as_ref().filter(|(n, _)| focused && *n == field.name) {
            Some((_, editor)) => {
                let chars: Vec<char> = editor.value.chars().collect();
                let before: String = chars[..editor.cursor.min(chars.len())].iter().collect();
                let at: String = chars
                    .get(editor.cursor)
                    .map(|c| c.to_string())
                    .unwrap_or_else(|| " ".to_string());
                let after: String = chars.iter().skip(editor.cursor + 1).collect();
                spans.push(Span::raw(before));
                spans.push(Span::styled(
                    at,
                    Style::default().add_modifier(Modifier::REVERSED),
                ));
                spans.push(Span::raw(after));
            }
            None => spans.push(Span::raw(value)),
        },
    }

    if invalid {
        spans.push(Span::styled(
            "  required",
            Style::default().fg(Color::Red),
        ));
    }

    Line::from(spans)
}

fn draw_buttons(f: &mut Frame<'_>, area: Rect, state: &TuiState, ctrl: &FormWizardController) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)].as_ref())
        .split(area);

    let hint = Paragraph::new(Span::styled(
        "Tab move  <-/-> choose  Enter ok  Esc quit",
        Style::default().fg(Color::DarkGray),
    ));
    f.render_widget(hint, cols[0]);

    let mut spans = Vec::new();
    for (i, button) in buttons(ctrl).into_iter().enumerate() {
        if i > 0 {
            spans.push(Span::raw(" "));
        }
        let focused = state.focus == FocusTarget::Button(button);
        spans.push(button_text(button.label(), focused, !ctrl.save_pending()));
    }
    let p = Paragraph::new(Text::from(Line::from(spans))).alignment(Alignment::Right);
    f.render_widget(p, cols[1]);
}

fn button_text(label: &str, focused: bool, enabled: bool) -> Span<'static> {
    let mut style = Style::default();
    if !enabled {
        style = style.fg(Color::DarkGray);
    }
    if focused && enabled {
        style = style.add_modifier(Modifier::REVERSED);
    }
    Span::styled(format!("[ {} ]", label), style)
}

fn draw_modal(f: &mut Frame<'_>, window_area: Rect, title: &str, body: &str, color: Color) {
    // Never larger than the window, however narrow the terminal gets.
    let modal_w = 60u16
        .min(window_area.width.saturating_sub(4))
        .max(40)
        .min(window_area.width);
    let modal_h = 9u16.min(window_area.height);
    let x = window_area.x + (window_area.width.saturating_sub(modal_w)) / 2;
    let y = window_area.y + (window_area.height.saturating_sub(modal_h)) / 2;
    let area = Rect {
        x,
        y,
        width: modal_w,
        height: modal_h,
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(color))
        .title(title.to_string());
    let p = Paragraph::new(body.to_string())
        .block(block)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });

    f.render_widget(Clear, area);
    f.render_widget(p, area);
}

fn centered_window(area: Rect, width: u16, height: u16) -> Rect {
    let w = width.min(area.width.saturating_sub(2)).max(60).min(area.width);
    let h = height.min(area.height.saturating_sub(2)).max(20).min(area.height);
    let x = area.x + (area.width.saturating_sub(w)) / 2;
    let y = area.y + (area.height.saturating_sub(h)) / 2;
    Rect {
        x,
        y,
        width: w,
        height: h,
    }
}

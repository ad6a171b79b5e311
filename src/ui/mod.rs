use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Cell, Paragraph, Row, Table, Wrap};
use ratatui::Frame;
use unicode_width::UnicodeWidthStr;

use crate::app::input::InputState;
use crate::app::state::{
    FormField, IdentityField, SessionState, StatusKind, StatusMessage, View,
};

const NOTES_DRAFT_LINES: u16 = 3;

pub fn draw_app(frame: &mut Frame, state: &SessionState) {
    match state.view {
        View::Identify => draw_identify(frame, state),
        View::Main => draw_main(frame, state),
    }
}

fn draw_identify(frame: &mut Frame, state: &SessionState) {
    let area = centered_rect(frame.size(), 50, 9);
    let block = Block::default().title("User identity").borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if state.sidebar_hidden {
        return;
    }

    let mut lines = Vec::new();
    lines.push(field_line(
        "name",
        &state.name_input,
        state.identity_focus == IdentityField::Name,
    ));
    lines.push(choice_line(
        "sex",
        &state.sex.to_string(),
        state.identity_focus == IdentityField::Sex,
    ));
    lines.push(Line::from(""));
    lines.push(hint_line(
        "Tab switch field · ←/→ choose · Enter enter system · Esc quit",
    ));
    if let Some(status) = &state.status {
        lines.push(status_line(status));
    }
    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), inner);
}

fn draw_main(frame: &mut Frame, state: &SessionState) {
    let Some(user) = &state.user else {
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Length(5 + NOTES_DRAFT_LINES),
            Constraint::Length(1),
            Constraint::Min(3),
        ])
        .split(frame.size());

    let header = Paragraph::new(vec![
        Line::from(Span::styled(
            format!("{}'s record book", user.name),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            format!("stored in {}", user.file_name()),
            Style::default().fg(Color::Gray),
        )),
    ]);
    frame.render_widget(header, chunks[0]);

    draw_entry_form(frame, state, chunks[1]);

    if let Some(status) = &state.status {
        frame.render_widget(Paragraph::new(status_line(status)), chunks[2]);
    }

    draw_record_table(frame, state, chunks[3]);
}

fn draw_entry_form(frame: &mut Frame, state: &SessionState, area: Rect) {
    let block = Block::default().title("New record").borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let mut lines = Vec::new();
    lines.push(field_line(
        "title",
        &state.title_input,
        state.form_focus == FormField::Title,
    ));
    lines.push(choice_line(
        "category",
        &state.category.to_string(),
        state.form_focus == FormField::Category,
    ));

    let notes_focused = state.form_focus == FormField::Notes;
    let mut notes_lines = notes_draft_lines(&state.notes_input, notes_focused).into_iter();
    if let Some(first) = notes_lines.next() {
        lines.push(prefixed_line("notes", first, notes_focused));
    }
    for line in notes_lines.take(NOTES_DRAFT_LINES as usize - 1) {
        lines.push(indented_line(line));
    }

    lines.push(hint_line(
        "Tab next field · Enter save (newline in notes) · Ctrl-S save · Esc back",
    ));
    frame.render_widget(Paragraph::new(lines), inner);
}

fn draw_record_table(frame: &mut Frame, state: &SessionState, area: Rect) {
    let records = state.display_records();
    if records.is_empty() {
        let empty = Paragraph::new("No records yet.")
            .style(Style::default().fg(Color::Gray))
            .block(Block::default().title("Your records").borders(Borders::ALL));
        frame.render_widget(empty, area);
        return;
    }

    let cell_width = (area.width as usize / 3).max(8);
    // id column intentionally absent from the display
    let rows: Vec<Row> = records
        .iter()
        .map(|record| {
            Row::new(vec![
                Cell::from(truncate_to_width(&record.title, cell_width)),
                Cell::from(record.category.to_string()),
                Cell::from(truncate_to_width(&record.notes.replace('\n', " "), cell_width)),
                Cell::from(record.created_at.clone()),
            ])
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Percentage(30),
            Constraint::Length(12),
            Constraint::Percentage(40),
            Constraint::Length(19),
        ],
    )
    .header(
        Row::new(vec!["Title", "Category", "Notes", "Created"])
            .style(Style::default().add_modifier(Modifier::BOLD)),
    )
    .block(Block::default().title("Your records").borders(Borders::ALL));
    frame.render_widget(table, area);
}

fn field_line<'a>(label: &'a str, input: &'a InputState, focused: bool) -> Line<'a> {
    let mut spans = vec![label_span(label, focused)];
    spans.extend(input_spans(input, focused));
    Line::from(spans)
}

fn choice_line<'a>(label: &'a str, value: &str, focused: bool) -> Line<'a> {
    let style = if focused {
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    };
    Line::from(vec![
        label_span(label, focused),
        Span::styled(format!("◂ {value} ▸"), style),
    ])
}

fn prefixed_line<'a>(label: &'a str, content: Vec<Span<'a>>, focused: bool) -> Line<'a> {
    let mut spans = vec![label_span(label, focused)];
    spans.extend(content);
    Line::from(spans)
}

fn indented_line(content: Vec<Span<'_>>) -> Line<'_> {
    let mut spans = vec![Span::raw("          ")];
    spans.extend(content);
    Line::from(spans)
}

fn label_span(label: &str, focused: bool) -> Span<'_> {
    let style = if focused {
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::Gray)
    };
    Span::styled(format!("{label:>8}: "), style)
}

/// Renders a single-line input with a visible cursor bar when focused.
fn input_spans(input: &InputState, focused: bool) -> Vec<Span<'_>> {
    if !focused {
        return vec![Span::raw(input.text())];
    }
    let (before, after) = input.text().split_at(input.cursor());
    vec![
        Span::raw(before),
        Span::styled("▏", Style::default().fg(Color::Cyan)),
        Span::raw(after),
    ]
}

/// Multi-line variant for the notes draft; the cursor bar lands on the line
/// it belongs to.
fn notes_draft_lines(input: &InputState, focused: bool) -> Vec<Vec<Span<'_>>> {
    if !focused {
        return input
            .text()
            .split('\n')
            .map(|segment| vec![Span::raw(segment)])
            .collect();
    }
    let (before, after) = input.text().split_at(input.cursor());
    // split('\n') yields at least one segment, so last_mut is always Some
    let mut lines: Vec<Vec<Span<'_>>> = before
        .split('\n')
        .map(|segment| vec![Span::raw(segment)])
        .collect();
    let mut after_segments = after.split('\n');
    if let Some(current) = lines.last_mut() {
        current.push(Span::styled("▏", Style::default().fg(Color::Cyan)));
        if let Some(rest) = after_segments.next() {
            current.push(Span::raw(rest));
        }
    }
    for segment in after_segments {
        lines.push(vec![Span::raw(segment)]);
    }
    lines
}

fn hint_line(text: &str) -> Line<'_> {
    Line::from(Span::styled(text, Style::default().fg(Color::DarkGray)))
}

fn status_line(status: &StatusMessage) -> Line<'_> {
    let style = match status.kind {
        StatusKind::Info => Style::default().fg(Color::Green),
        StatusKind::Error => Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
    };
    Line::from(Span::styled(status.text.as_str(), style))
}

/// Display-width-aware truncation for table cells; CJK text counts double.
fn truncate_to_width(text: &str, max_width: usize) -> String {
    if text.width() <= max_width {
        return text.to_string();
    }
    let mut out = String::new();
    let mut used = 0;
    for ch in text.chars() {
        let w = ch.to_string().width();
        if used + w + 1 > max_width {
            break;
        }
        out.push(ch);
        used += w;
    }
    out.push('…');
    out
}

fn centered_rect(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncation_preserves_short_text() {
        assert_eq!(truncate_to_width("hello", 10), "hello");
    }

    #[test]
    fn truncation_counts_wide_characters_double() {
        let truncated = truncate_to_width("记录记录记录", 7);
        assert!(truncated.ends_with('…'));
        assert!(truncated.width() <= 7);
    }

    #[test]
    fn centered_rect_never_exceeds_the_area() {
        let area = Rect::new(0, 0, 20, 5);
        let rect = centered_rect(area, 50, 9);
        assert!(rect.width <= area.width);
        assert!(rect.height <= area.height);
    }
}

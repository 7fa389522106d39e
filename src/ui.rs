use std::time::SystemTime;

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget, Wrap},
};
use unicode_width::UnicodeWidthStr;

use crate::{
    app::{App, AppState},
    language::normalize,
    session::{TypingSession, WordDisplayState},
};

const HORIZONTAL_MARGIN: u16 = 5;
const VERTICAL_MARGIN: u16 = 2;

fn word_style(state: WordDisplayState) -> Style {
    let bold_style = Style::default().add_modifier(Modifier::BOLD);

    match state {
        WordDisplayState::Untyped => bold_style.add_modifier(Modifier::DIM),
        WordDisplayState::InProgressMatching => bold_style
            .fg(Color::Blue)
            .add_modifier(Modifier::UNDERLINED),
        WordDisplayState::InProgressMismatching => bold_style
            .fg(Color::Red)
            .add_modifier(Modifier::UNDERLINED),
        WordDisplayState::CorrectFinal => bold_style.fg(Color::Green),
        WordDisplayState::WrongFinal => bold_style.fg(Color::Red),
    }
}

/// Spans for the current batch of words, space separated.
pub fn word_spans(session: &TypingSession) -> Vec<Span<'_>> {
    let mut spans = Vec::new();
    for (idx, (word, state)) in session.word_states().enumerate() {
        if idx > 0 {
            spans.push(Span::raw(" "));
        }
        spans.push(Span::styled(word, word_style(state)));
    }
    spans
}

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let now = SystemTime::now();
        match self.state {
            AppState::Typing => render_typing(&self.session, now, area, buf),
            AppState::Results => render_results(&self.session, area, buf),
        }
    }
}

fn render_typing(session: &TypingSession, now: SystemTime, area: Rect, buf: &mut Buffer) {
    let bold_style = Style::default().add_modifier(Modifier::BOLD);
    let dim_bold_style = bold_style.add_modifier(Modifier::DIM);
    let italic_style = Style::default().add_modifier(Modifier::ITALIC);

    let max_chars_per_line = area.width.saturating_sub(HORIZONTAL_MARGIN * 2).max(1);
    let words_width = session.sequence().join(" ").width();
    let words_lines = (words_width as f64 / max_chars_per_line as f64).ceil().max(1.0) as u16;
    let padding = area.height.saturating_sub(words_lines + 6) / 2;

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .constraints([
            Constraint::Length(padding),
            Constraint::Length(2), // timer and counters
            Constraint::Length(words_lines),
            Constraint::Length(1),
            Constraint::Length(1), // input
            Constraint::Min(0),
            Constraint::Length(1), // legend
        ])
        .split(area);

    let status = Paragraph::new(Span::styled(
        format!(
            "{}   ✓ {}   ✗ {}",
            session.remaining_description(now),
            session.correct_count(),
            session.wrong_count()
        ),
        dim_bold_style,
    ))
    .alignment(Alignment::Center);
    status.render(chunks[1], buf);

    let words = Paragraph::new(Line::from(word_spans(session)))
        .alignment(if words_lines == 1 {
            Alignment::Center
        } else {
            Alignment::Left
        })
        .wrap(Wrap { trim: true });
    words.render(chunks[2], buf);

    let input = Paragraph::new(Line::from(vec![
        Span::styled("> ", dim_bold_style),
        Span::styled(normalize(session.current_input()), bold_style),
        Span::styled("_", dim_bold_style.add_modifier(Modifier::SLOW_BLINK)),
    ]))
    .alignment(Alignment::Center);
    input.render(chunks[4], buf);

    let legend = Paragraph::new(Span::styled(
        if session.has_started() {
            "(tab) restart / (esc)ape"
        } else {
            "start typing, space submits a word / (esc)ape"
        },
        italic_style,
    ));
    legend.render(chunks[6], buf);
}

fn render_results(session: &TypingSession, area: Rect, buf: &mut Buffer) {
    let bold_style = Style::default().add_modifier(Modifier::BOLD);
    let italic_style = Style::default().add_modifier(Modifier::ITALIC);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Min(1),
            Constraint::Length(6), // stats
            Constraint::Min(1),
            Constraint::Length(1), // legend
        ])
        .split(area);

    if let Some(summary) = session.summary() {
        let lines = vec![
            Line::from(Span::styled(
                format!("correct words: {}", summary.correct),
                bold_style.fg(Color::Green),
            )),
            Line::from(Span::styled(
                format!("wrong words: {}", summary.wrong),
                bold_style.fg(Color::Red),
            )),
            Line::from(Span::styled(
                format!("total words: {}", summary.total),
                bold_style.fg(Color::Cyan),
            )),
            Line::from(Span::styled(
                format!("{} wpm   {}% acc", summary.wpm, summary.accuracy()),
                bold_style.fg(Color::Yellow),
            )),
            Line::from(Span::styled(
                format!("duration: {} seconds", summary.duration.as_secs()),
                bold_style.fg(Color::Magenta),
            )),
        ];

        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .render(chunks[1], buf);
    }

    let legend = Paragraph::new(Span::styled("(r)estart / (q)uit / (esc)ape", italic_style));
    legend.render(chunks[3], buf);
}

// Help bar widget: disclaimer line plus keyboard shortcut hints.

use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

pub const DISCLAIMER: &str =
    "I pronostici sono generati automaticamente e non garantiscono risultati reali";

const KEY_HINTS: &[(&str, &str)] = &[
    ("j/k", "scorri"),
    ("Invio", "dettagli"),
    ("1/x/2", "tua scelta"),
    ("h/l", "giorno"),
    ("t", "oggi"),
    ("r", "riprova"),
    ("q", "esci"),
];

pub fn render(frame: &mut Frame, area: Rect) {
    let disclaimer = Line::from(Span::styled(
        format!(" {DISCLAIMER}"),
        Style::default()
            .fg(Color::Gray)
            .add_modifier(Modifier::ITALIC),
    ));

    let paragraph = Paragraph::new(vec![disclaimer, hint_line()])
        .style(Style::default().bg(Color::DarkGray));
    frame.render_widget(paragraph, area);
}

fn hint_line() -> Line<'static> {
    let mut spans = vec![Span::raw(" ")];
    for (i, (key, action)) in KEY_HINTS.iter().enumerate() {
        if i > 0 {
            spans.push(Span::styled(" | ", Style::default().fg(Color::Gray)));
        }
        spans.push(Span::styled(
            *key,
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        ));
        spans.push(Span::styled(
            format!(":{action}"),
            Style::default().fg(Color::White).add_modifier(Modifier::DIM),
        ));
    }
    Line::from(spans)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tui::test_support::buffer_text;

    #[test]
    fn renders_disclaimer_and_hints() {
        let backend = ratatui::backend::TestBackend::new(120, 2);
        let mut terminal = ratatui::Terminal::new(backend).unwrap();
        terminal.draw(|frame| render(frame, frame.area())).unwrap();

        let text = buffer_text(terminal.backend().buffer());
        assert!(text.contains(DISCLAIMER));
        assert!(text.contains("q:esci"));
        assert!(text.contains("r:riprova"));
    }
}

// Status bar widget: title, selected day, load state.

use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use pronostici_app::board::LoadState;
use pronostici_core::format::format_date_label;

use crate::tui::UiState;

pub const TITLE: &str = "Pronostici AI Calcio";

/// Render the status bar into the given area.
///
/// Layout: [title] | < [day label] [iso date] > | [load indicator]
pub fn render(frame: &mut Frame, area: Rect, state: &UiState) {
    let date = state.selected_date();
    let (indicator, color) = load_indicator(state.board.as_ref().map(|b| b.view.load_state()));

    let spans = vec![
        Span::styled(
            format!(" {TITLE} "),
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled("| ", Style::default().fg(Color::Gray)),
        Span::styled("< ", Style::default().fg(Color::DarkGray)),
        Span::styled(
            format_date_label(date, state.today),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!(" {}", date.format("%d/%m/%Y")),
            Style::default().fg(Color::Gray),
        ),
        Span::styled(" > ", Style::default().fg(Color::DarkGray)),
        Span::styled("| ", Style::default().fg(Color::Gray)),
        Span::styled(indicator, Style::default().fg(color)),
    ];

    let paragraph = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::Black));
    frame.render_widget(paragraph, area);
}

/// Short text and color for the board's load state.
pub fn load_indicator(load: Option<&LoadState>) -> (String, Color) {
    match load {
        None | Some(LoadState::Idle) => ("in attesa".to_string(), Color::DarkGray),
        Some(LoadState::Loading) => ("caricamento...".to_string(), Color::Yellow),
        Some(LoadState::Settled(matches)) => match matches.len() {
            1 => ("1 partita".to_string(), Color::Green),
            n => (format!("{n} partite"), Color::Green),
        },
        Some(LoadState::Failed { .. }) => ("errore".to_string(), Color::Red),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

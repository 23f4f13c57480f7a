// Debug panel: backend request quota, shown when the selected day is empty.

use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::Frame;

use pronostici_core::model::ApiStatus;

pub fn render(frame: &mut Frame, area: Rect, info: &ApiStatus) {
    let paragraph = Paragraph::new(status_lines(info))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Stato API")
                .border_style(Style::default().fg(Color::DarkGray)),
        )
        .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, area);
}

pub fn status_lines(info: &ApiStatus) -> Vec<Line<'static>> {
    let label = Style::default().fg(Color::Gray);
    let quota_color = if info.remaining_requests == 0 {
        Color::Red
    } else {
        Color::White
    };

    let competitions = if info.competitions.is_empty() {
        "-".to_string()
    } else {
        info.competitions.join(", ")
    };
    let reset = if info.reset_time.is_empty() {
        "-".to_string()
    } else {
        info.reset_time.clone()
    };

    vec![
        Line::from(vec![
            Span::styled("Richieste usate: ", label),
            Span::styled(
                format!("{}/{}", info.requests_used, info.requests_limit),
                Style::default().fg(quota_color).add_modifier(Modifier::BOLD),
            ),
        ]),
        Line::from(vec![
            Span::styled("Richieste rimanenti: ", label),
            Span::styled(
                info.remaining_requests.to_string(),
                Style::default().fg(quota_color),
            ),
        ]),
        Line::from(vec![
            Span::styled("Reset: ", label),
            Span::raw(reset),
        ]),
        Line::from(vec![
            Span::styled("Competizioni: ", label),
            Span::raw(competitions),
        ]),
    ]
}

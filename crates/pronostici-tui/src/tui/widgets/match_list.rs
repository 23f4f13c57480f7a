// Match list widget: one card per fixture, or the loading / error / empty
// message when there is nothing to list.
//
// Card layout:
//   > Home vs Away                       20:45 | Serie A
//     Pronostico: [1 - Home]  Fiducia 68% [#######---]
//     reasoning...
//     Tua scelta: X
//     (expanded) ranked market picks, stat snapshot

use chrono_tz::Tz;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::Frame;

use pronostici_app::board::LoadState;
use pronostici_core::format::{
    color_for_call, color_for_market, color_for_outcome, color_for_probability, confidence_bar,
    format_kickoff, outcome_text, rank_market_picks,
};
use pronostici_core::model::{Match, Outcome, Prediction, StatSnapshot};

use super::tone_color;
use crate::tui::UiState;

pub const LOADING_TEXT: &str = "L'IA sta analizzando le partite...";
pub const EMPTY_TEXT: &str = "Nessuna partita trovata per questo periodo";
pub const RETRY_HINT: &str = "Premi r per riprovare";
pub const SUBTITLE: &str = "Pronostici generati automaticamente dall'intelligenza artificiale";

const BAR_WIDTH: usize = 10;

/// Per-card rendering inputs that do not come from the match itself.
pub struct CardContext<'a> {
    pub timezone: &'a Tz,
    pub default_competition: &'a str,
    pub selected: bool,
    pub expanded: bool,
    pub user_pick: Option<Outcome>,
    /// Columns available inside the panel border; long text is wrapped to it.
    pub width: usize,
}

pub fn render(frame: &mut Frame, area: Rect, state: &UiState) {
    let load = state.board.as_ref().map(|b| b.view.load_state());
    let block = Block::default()
        .borders(Borders::ALL)
        .title("Partite")
        .title_bottom(Line::from(Span::styled(
            format!(" {SUBTITLE} "),
            Style::default().fg(Color::DarkGray),
        )));

    let matches = match load {
        Some(LoadState::Settled(matches)) if !matches.is_empty() => matches,
        _ => {
            let paragraph = Paragraph::new(message_lines(load))
                .block(block)
                .wrap(Wrap { trim: true });
            frame.render_widget(paragraph, area);
            return;
        }
    };

    // Cards are pre-wrapped, so one `Line` is one screen row and the scroll
    // offset can be computed in rows.
    let inner_width = area.width.saturating_sub(2) as usize;
    let mut lines = Vec::new();
    let mut selected_span = (0, 0);
    for (i, m) in matches.iter().enumerate() {
        let ctx = card_context(state, m, i == state.cursor, inner_width);
        let start = lines.len();
        lines.extend(card_lines(m, &ctx));
        lines.push(Line::default());
        if ctx.selected {
            selected_span = (start, lines.len());
        }
    }

    let inner_height = area.height.saturating_sub(2) as usize;
    let scroll = scroll_offset(selected_span, inner_height);

    let paragraph = Paragraph::new(lines)
        .block(block)
        .scroll((scroll as u16, 0));
    frame.render_widget(paragraph, area);
}

fn card_context<'a>(
    state: &'a UiState,
    m: &Match,
    selected: bool,
    width: usize,
) -> CardContext<'a> {
    let board = state.board.as_ref();
    CardContext {
        timezone: &state.timezone,
        default_competition: &state.default_competition,
        selected,
        expanded: board.is_some_and(|b| b.view.is_expanded(&m.id)),
        user_pick: board.and_then(|b| b.choices.get(&m.id).copied()),
        width,
    }
}

/// First visible line so that the selected card `[start, end)` is on screen,
/// preferring its top when it is taller than the viewport.
pub fn scroll_offset((start, end): (usize, usize), viewport: usize) -> usize {
    end.saturating_sub(viewport).min(start)
}

/// Placeholder text for every state that has no cards to show.
pub fn message_lines(load: Option<&LoadState>) -> Vec<Line<'static>> {
    match load {
        None | Some(LoadState::Idle) | Some(LoadState::Loading) => vec![Line::from(Span::styled(
            LOADING_TEXT,
            Style::default().fg(Color::Yellow),
        ))],
        Some(LoadState::Failed { message }) => vec![
            Line::from(Span::styled(
                format!("Errore: {message}"),
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(
                RETRY_HINT,
                Style::default().fg(Color::Gray),
            )),
        ],
        Some(LoadState::Settled(_)) => vec![Line::from(Span::styled(
            EMPTY_TEXT,
            Style::default().fg(Color::Gray),
        ))],
    }
}

/// All lines of one match card.
pub fn card_lines(m: &Match, ctx: &CardContext) -> Vec<Line<'static>> {
    let mut lines = vec![header_line(m, ctx)];

    match &m.prediction {
        Some(prediction) => {
            lines.push(call_line(m, prediction));
            let indent = "  ";
            for row in wrap_words(&prediction.reasoning, ctx.width.saturating_sub(indent.len())) {
                lines.push(Line::from(Span::styled(
                    format!("{indent}{row}"),
                    Style::default().fg(Color::Gray),
                )));
            }
        }
        None => lines.push(Line::from(Span::styled(
            "  Pronostico non disponibile",
            Style::default().fg(Color::DarkGray),
        ))),
    }

    lines.push(pick_line(ctx.user_pick));

    let markets = m.prediction.as_ref().map(|p| p.markets.as_slice()).unwrap_or(&[]);
    if ctx.expanded {
        lines.extend(expanded_lines(m.prediction.as_ref()));
    } else if !markets.is_empty() {
        lines.push(Line::from(Span::styled(
            format!("  + altri {} pronostici (Invio)", markets.len()),
            Style::default().fg(Color::DarkGray),
        )));
    }

    lines
}

fn header_line(m: &Match, ctx: &CardContext) -> Line<'static> {
    let marker = if ctx.selected { "> " } else { "  " };
    let title_style = if ctx.selected {
        Style::default()
            .fg(Color::White)
            .add_modifier(Modifier::BOLD | Modifier::REVERSED)
    } else {
        Style::default()
            .fg(Color::White)
            .add_modifier(Modifier::BOLD)
    };
    let competition = m.competition_name().unwrap_or(ctx.default_competition);

    Line::from(vec![
        Span::styled(marker, Style::default().fg(Color::Cyan)),
        Span::styled(
            format!("{} vs {}", m.home_team.name, m.away_team.name),
            title_style,
        ),
        Span::styled(
            format!("  {}", format_kickoff(&m.kickoff, ctx.timezone)),
            Style::default().fg(Color::Cyan),
        ),
        Span::styled(
            format!(" | {competition}"),
            Style::default().fg(Color::Gray),
        ),
    ])
}

fn call_line(m: &Match, prediction: &Prediction) -> Line<'static> {
    let call_color = tone_color(color_for_call(&prediction.call));
    let pct = prediction.confidence_pct();
    let conf_color = tone_color(color_for_probability(pct));

    Line::from(vec![
        Span::styled("  Pronostico: ", Style::default().fg(Color::Gray)),
        Span::styled(
            format!(
                " {} ",
                outcome_text(&prediction.call, &m.home_team.name, &m.away_team.name)
            ),
            Style::default()
                .fg(Color::Black)
                .bg(call_color)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled("  Fiducia ", Style::default().fg(Color::Gray)),
        Span::styled(format!("{pct:.0}% "), Style::default().fg(conf_color)),
        Span::styled(confidence_bar(pct, BAR_WIDTH), Style::default().fg(conf_color)),
    ])
}

fn pick_line(pick: Option<Outcome>) -> Line<'static> {
    let label = Span::styled("  Tua scelta: ", Style::default().fg(Color::Gray));
    match pick {
        Some(outcome) => Line::from(vec![
            label,
            Span::styled(
                outcome.symbol(),
                Style::default()
                    .fg(tone_color(color_for_outcome(outcome.symbol())))
                    .add_modifier(Modifier::BOLD),
            ),
        ]),
        None => Line::from(vec![
            label,
            Span::styled("- (1/x/2)", Style::default().fg(Color::DarkGray)),
        ]),
    }
}

fn expanded_lines(prediction: Option<&Prediction>) -> Vec<Line<'static>> {
    let Some(prediction) = prediction else {
        return Vec::new();
    };

    let mut lines = Vec::new();
    if prediction.markets.is_empty() {
        lines.push(Line::from(Span::styled(
            "  Nessun pronostico aggiuntivo",
            Style::default().fg(Color::DarkGray),
        )));
    } else {
        lines.push(Line::from(Span::styled(
            "  Tutti i pronostici:",
            Style::default().add_modifier(Modifier::BOLD),
        )));
        for pick in rank_market_picks(&prediction.markets) {
            let prob_color = tone_color(color_for_probability(pick.probability));
            lines.push(Line::from(vec![
                Span::raw("    "),
                Span::styled(
                    format!("{:<14}", pick.market),
                    Style::default().fg(tone_color(color_for_market(&pick.market))),
                ),
                Span::styled(
                    format!("{:<16}", pick.label),
                    Style::default().fg(Color::White),
                ),
                Span::styled(
                    format!("{:>4.0}%", pick.probability),
                    Style::default().fg(prob_color).add_modifier(Modifier::BOLD),
                ),
            ]));
        }
    }

    if let Some(stats) = prediction.stats.as_ref().filter(|s| !s.is_empty()) {
        lines.push(stats_line(stats));
    }
    lines
}

/// Greedy word wrap to `width` columns. Words longer than a row are split.
pub fn wrap_words(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut rows = Vec::new();
    let mut row = String::new();
    let mut row_len = 0;

    for word in text.split_whitespace() {
        let mut word: Vec<char> = word.chars().collect();
        loop {
            let sep = usize::from(row_len > 0);
            if row_len + sep + word.len() <= width {
                if sep == 1 {
                    row.push(' ');
                }
                row.extend(word.iter());
                row_len += sep + word.len();
                break;
            }
            if row_len > 0 {
                rows.push(std::mem::take(&mut row));
                row_len = 0;
                continue;
            }
            let rest = word.split_off(width);
            rows.push(word.into_iter().collect());
            word = rest;
        }
    }
    if row_len > 0 {
        rows.push(row);
    }
    rows
}

fn stats_line(stats: &StatSnapshot) -> Line<'static> {
    let mut parts = Vec::new();
    if let (Some(home), Some(away)) = (stats.forza_casa, stats.forza_trasferta) {
        parts.push(format!("Forza {home:.0} - {away:.0}"));
    }
    if let (Some(home), Some(away)) = (stats.posizione_casa, stats.posizione_trasferta) {
        parts.push(format!("Classifica {home}° - {away}°"));
    }
    if let Some(goals) = stats.gol_attesi {
        parts.push(format!("Gol attesi {goals:.1}"));
    }

    Line::from(vec![
        Span::styled("  Statistiche: ", Style::default().fg(Color::Gray)),
        Span::raw(parts.join(" | ")),
    ])
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

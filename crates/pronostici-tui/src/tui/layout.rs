// Screen layout: panel arrangement and sizing.
//
// +--------------------------------------------------+
// | Status Bar (1 row)                                |
// +--------------------------------------------------+
// | Match list (fill)                                 |
// |                                                   |
// +--------------------------------------------------+
// | Debug panel (7 rows, only for an empty day)       |
// +--------------------------------------------------+
// | Disclaimer + key hints (2 rows)                   |
// +--------------------------------------------------+

use ratatui::layout::{Constraint, Direction, Layout, Rect};

pub const DEBUG_PANEL_HEIGHT: u16 = 7;

/// Resolved screen areas for each zone.
#[derive(Debug, Clone)]
pub struct AppLayout {
    /// Title, selected day and load state.
    pub status_bar: Rect,
    /// Match cards, or the loading / error / empty message.
    pub main_panel: Rect,
    /// Backend request-quota telemetry. `None` when not shown.
    pub debug_panel: Option<Rect>,
    /// Disclaimer line and keyboard shortcut hints.
    pub help_bar: Rect,
}

/// Build the layout. `show_debug` reserves room for the debug panel below
/// the match list.
pub fn build_layout(area: Rect, show_debug: bool) -> AppLayout {
    let debug_height = if show_debug { DEBUG_PANEL_HEIGHT } else { 0 };

    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),            // status bar
            Constraint::Min(3),               // match list
            Constraint::Length(debug_height), // debug panel
            Constraint::Length(2),            // help bar
        ])
        .split(area);

    AppLayout {
        status_bar: vertical[0],
        main_panel: vertical[1],
        debug_panel: show_debug.then_some(vertical[2]),
        help_bar: vertical[3],
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

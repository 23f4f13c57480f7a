// TUI: layout, input handling, and widget rendering.
//
// The board task pushes `UiUpdate` snapshots over an mpsc channel; the TUI
// keeps the latest one plus a local cursor, and re-renders at ~30 fps.

pub mod input;
pub mod layout;
pub mod widgets;

use std::time::Duration;

use chrono::NaiveDate;
use chrono_tz::Tz;
use crossterm::event::{Event, EventStream};
use futures_util::StreamExt;
use ratatui::Frame;
use tokio::sync::mpsc;
use tracing::{info, warn};

use pronostici_app::protocol::{BoardSnapshot, UiUpdate, UserCommand};
use pronostici_core::config::DisplayConfig;
use pronostici_core::format::today_in;
use pronostici_core::model::Match;

use layout::build_layout;

// ---------------------------------------------------------------------------
// UiState
// ---------------------------------------------------------------------------

/// TUI-local state: the latest board snapshot and the cursor over its list.
pub struct UiState {
    /// `None` until the board task sends its first snapshot.
    pub board: Option<BoardSnapshot>,
    /// Index of the highlighted match card.
    pub cursor: usize,
    /// Calendar day "today" falls on in `timezone`. Refreshed before every
    /// draw and on `t`.
    pub today: NaiveDate,
    pub timezone: Tz,
    /// Label shown when a match has no competition name.
    pub default_competition: String,
}

impl UiState {
    pub fn new(display: &DisplayConfig, today: NaiveDate) -> Self {
        UiState {
            board: None,
            cursor: 0,
            today,
            timezone: display.timezone,
            default_competition: display.default_competition.clone(),
        }
    }

    /// The settled match list, empty while loading or failed.
    pub fn matches(&self) -> &[Match] {
        self.board
            .as_ref()
            .and_then(|b| b.view.matches())
            .unwrap_or(&[])
    }

    pub fn selected_match(&self) -> Option<&Match> {
        self.matches().get(self.cursor)
    }

    pub fn selected_date(&self) -> NaiveDate {
        self.board
            .as_ref()
            .map(|b| b.view.selected_date())
            .unwrap_or(self.today)
    }

    pub fn show_debug_panel(&self) -> bool {
        self.board
            .as_ref()
            .is_some_and(|b| b.view.debug_info().is_some())
    }

    /// Take a new snapshot. The cursor resets when the day changes and is
    /// clamped to the new list otherwise.
    pub fn apply_snapshot(&mut self, snapshot: BoardSnapshot) {
        let day_changed = self
            .board
            .as_ref()
            .is_some_and(|old| old.view.selected_date() != snapshot.view.selected_date());
        self.board = Some(snapshot);

        let len = self.matches().len();
        if day_changed || len == 0 {
            self.cursor = 0;
        } else if self.cursor >= len {
            self.cursor = len - 1;
        }
    }

    /// Move "today" forward when the wall clock has crossed midnight. Returns
    /// whether the day changed.
    pub fn refresh_today(&mut self, today: NaiveDate) -> bool {
        if today == self.today {
            return false;
        }
        info!("Calendar day rolled over from {} to {}", self.today, today);
        self.today = today;
        true
    }
}

// ---------------------------------------------------------------------------
// UiUpdate processing
// ---------------------------------------------------------------------------

fn apply_ui_update(state: &mut UiState, update: UiUpdate) {
    match update {
        UiUpdate::Snapshot(snapshot) => state.apply_snapshot(*snapshot),
    }
}

// ---------------------------------------------------------------------------
// Render frame
// ---------------------------------------------------------------------------

pub fn render_frame(frame: &mut Frame, state: &UiState) {
    let layout = build_layout(frame.area(), state.show_debug_panel());

    widgets::status_bar::render(frame, layout.status_bar, state);
    widgets::match_list::render(frame, layout.main_panel, state);
    if let (Some(area), Some(info)) = (
        layout.debug_panel,
        state.board.as_ref().and_then(|b| b.view.debug_info()),
    ) {
        widgets::debug_panel::render(frame, area, info);
    }
    widgets::help_bar::render(frame, layout.help_bar);
}

// ---------------------------------------------------------------------------
// Main TUI loop
// ---------------------------------------------------------------------------

/// Run the TUI until the user quits or the board task hangs up.
///
/// Enters raw mode and the alternate screen, installs a panic hook that
/// restores the terminal, then selects over board updates, keyboard input
/// and a render tick.
pub async fn run(
    mut ui_rx: mpsc::Receiver<UiUpdate>,
    cmd_tx: mpsc::Sender<UserCommand>,
    mut state: UiState,
) -> anyhow::Result<()> {
    let mut terminal = ratatui::init();

    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = ratatui::restore();
        original_hook(panic_info);
    }));

    let mut event_stream = EventStream::new();

    let mut render_tick = tokio::time::interval(Duration::from_millis(33));
    render_tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    let result = loop {
        tokio::select! {
            update = ui_rx.recv() => {
                match update {
                    Some(update) => apply_ui_update(&mut state, update),
                    None => {
                        info!("Board channel closed, leaving TUI");
                        break Ok(());
                    }
                }
            }

            maybe_event = event_stream.next() => {
                match maybe_event {
                    Some(Ok(Event::Key(key_event))) => {
                        if let Some(cmd) = input::handle_key(key_event, &mut state) {
                            let quit = cmd == UserCommand::Quit;
                            if cmd_tx.send(cmd).await.is_err() {
                                warn!("Board task is gone, leaving TUI");
                                break Ok(());
                            }
                            if quit {
                                break Ok(());
                            }
                        }
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => break Err(anyhow::Error::from(e).context("terminal input error")),
                    None => break Ok(()),
                }
            }

            _ = render_tick.tick() => {
                state.refresh_today(today_in(&state.timezone));
                if let Err(e) = terminal.draw(|frame| render_frame(frame, &state)) {
                    break Err(anyhow::Error::from(e).context("failed to draw frame"));
                }
            }
        }
    };

    ratatui::restore();
    result
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

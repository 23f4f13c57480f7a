// Messages exchanged between the board task and the terminal UI.

use chrono::NaiveDate;

use pronostici_core::choices::UserChoices;
use pronostici_core::model::{ApiStatus, Match, MatchId, Outcome};

use crate::board::ViewState;
use crate::fetcher::FetchError;

/// Commands sent from the TUI to the board task.
#[derive(Debug, Clone, PartialEq)]
pub enum UserCommand {
    SelectDate(NaiveDate),
    Retry,
    ToggleExpanded(MatchId),
    PickOutcome { match_id: MatchId, outcome: Outcome },
    Quit,
}

/// Everything the TUI needs to draw one frame of the board.
#[derive(Debug, Clone, PartialEq)]
pub struct BoardSnapshot {
    pub view: ViewState,
    pub choices: UserChoices,
}

/// Updates pushed from the board task to the TUI.
#[derive(Debug, Clone, PartialEq)]
pub enum UiUpdate {
    Snapshot(Box<BoardSnapshot>),
}

/// Completions of spawned fetch tasks, tagged with their request sequence.
#[derive(Debug)]
pub enum FetchEvent {
    Matches {
        seq: u64,
        result: Result<Vec<Match>, FetchError>,
    },
    DebugInfo {
        seq: u64,
        result: Result<ApiStatus, FetchError>,
    },
}

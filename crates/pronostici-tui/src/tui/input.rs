// Keyboard input handling and command dispatch.
//
// Translates crossterm key events into `UserCommand`s for the board task, or
// into local cursor movement.

use chrono::Days;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use pronostici_app::protocol::UserCommand;
use pronostici_core::format::today_in;
use pronostici_core::model::Outcome;

use super::UiState;

/// Handle a keyboard event.
///
/// Returns `Some(UserCommand)` when the key should be forwarded to the board
/// task, `None` when it was handled locally or ignored.
pub fn handle_key(key_event: KeyEvent, state: &mut UiState) -> Option<UserCommand> {
    // Windows reports both press and release.
    if key_event.kind != KeyEventKind::Press {
        return None;
    }

    if key_event.modifiers.contains(KeyModifiers::CONTROL) {
        return match key_event.code {
            KeyCode::Char('c') => Some(UserCommand::Quit),
            _ => None,
        };
    }

    match key_event.code {
        KeyCode::Char('q') => Some(UserCommand::Quit),

        KeyCode::Up | KeyCode::Char('k') => {
            state.cursor = state.cursor.saturating_sub(1);
            None
        }
        KeyCode::Down | KeyCode::Char('j') => {
            if state.cursor + 1 < state.matches().len() {
                state.cursor += 1;
            }
            None
        }
        KeyCode::Home => {
            state.cursor = 0;
            None
        }
        KeyCode::End => {
            state.cursor = state.matches().len().saturating_sub(1);
            None
        }

        KeyCode::Enter | KeyCode::Char(' ') => state
            .selected_match()
            .map(|m| UserCommand::ToggleExpanded(m.id.clone())),

        KeyCode::Char('1') => pick(state, Outcome::Home),
        KeyCode::Char('x') | KeyCode::Char('X') => pick(state, Outcome::Draw),
        KeyCode::Char('2') => pick(state, Outcome::Away),

        KeyCode::Left | KeyCode::Char('h') => state
            .selected_date()
            .checked_sub_days(Days::new(1))
            .map(UserCommand::SelectDate),
        KeyCode::Right | KeyCode::Char('l') => state
            .selected_date()
            .checked_add_days(Days::new(1))
            .map(UserCommand::SelectDate),
        KeyCode::Char('t') => {
            state.today = today_in(&state.timezone);
            Some(UserCommand::SelectDate(state.today))
        }

        KeyCode::Char('r') => {
            let failed = state
                .board
                .as_ref()
                .is_some_and(|b| b.view.error().is_some());
            failed.then_some(UserCommand::Retry)
        }

        _ => None,
    }
}

fn pick(state: &UiState, outcome: Outcome) -> Option<UserCommand> {
    state.selected_match().map(|m| UserCommand::PickOutcome {
        match_id: m.id.clone(),
        outcome,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

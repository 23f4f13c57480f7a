// Board orchestration: owns the view state, the user's picks and the fetcher.
//
// The event loop selects over user commands from the TUI and completions of
// spawned fetch tasks, and pushes a fresh `BoardSnapshot` to the TUI after
// every change. Fetch tasks are never cancelled; sequence numbers on their
// completions decide whether they still matter.

use chrono::NaiveDate;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use pronostici_core::choices::{ChoiceStore, UserChoices};
use pronostici_core::model::{MatchId, Outcome};

use crate::board::{FetchTicket, FollowUp, ViewState};
use crate::fetcher::Fetcher;
use crate::protocol::{BoardSnapshot, FetchEvent, UiUpdate, UserCommand};

// ---------------------------------------------------------------------------
// MatchBoard
// ---------------------------------------------------------------------------

pub struct MatchBoard {
    pub view: ViewState,
    /// Read once from the store at construction, then kept in sync on writes.
    pub choices: UserChoices,
    fetcher: Fetcher,
    choice_store: ChoiceStore,
    fetch_tx: mpsc::Sender<FetchEvent>,
}

impl MatchBoard {
    pub fn new(
        fetcher: Fetcher,
        choice_store: ChoiceStore,
        today: NaiveDate,
        fetch_tx: mpsc::Sender<FetchEvent>,
    ) -> Self {
        let choices = choice_store.get();
        info!("Loaded {} stored picks", choices.len());
        MatchBoard {
            view: ViewState::new(today),
            choices,
            fetcher,
            choice_store,
            fetch_tx,
        }
    }

    /// Load the initially selected date.
    pub fn start(&mut self) {
        let date = self.view.selected_date();
        self.select_date(date);
    }

    pub fn select_date(&mut self, date: NaiveDate) {
        let ticket = self.view.select_date(date);
        self.spawn_matches_fetch(ticket);
    }

    pub fn retry(&mut self) {
        let ticket = self.view.retry();
        self.spawn_matches_fetch(ticket);
    }

    pub fn toggle_expanded(&mut self, id: &MatchId) {
        if !self.view.toggle_expanded(id) {
            debug!("Ignoring expand toggle for match {}", id);
        }
    }

    /// Record the user's own pick. Independent of the fetched data. When the
    /// store cannot be updated the pick is kept for this session only.
    pub fn pick_outcome(&mut self, id: &MatchId, outcome: Outcome) {
        match self.choice_store.set(id, outcome) {
            Ok(choices) => self.choices = choices,
            Err(e) => {
                warn!("Pick for match {} not persisted: {}", id, e);
                self.choices.insert(id.clone(), outcome);
            }
        }
    }

    pub fn handle_fetch_event(&mut self, event: FetchEvent) {
        match event {
            FetchEvent::Matches { seq, result } => {
                if let Some(FollowUp::FetchDebugInfo { seq }) = self.view.apply_matches(seq, result)
                {
                    self.spawn_debug_fetch(seq);
                }
            }
            FetchEvent::DebugInfo { seq, result } => {
                self.view.apply_debug_info(seq, result);
            }
        }
    }

    /// Apply a user command. Returns `false` when the loop should stop.
    pub fn handle_command(&mut self, cmd: UserCommand) -> bool {
        match cmd {
            UserCommand::SelectDate(date) => self.select_date(date),
            UserCommand::Retry => self.retry(),
            UserCommand::ToggleExpanded(id) => self.toggle_expanded(&id),
            UserCommand::PickOutcome { match_id, outcome } => {
                self.pick_outcome(&match_id, outcome)
            }
            UserCommand::Quit => return false,
        }
        true
    }

    pub fn snapshot(&self) -> BoardSnapshot {
        BoardSnapshot {
            view: self.view.clone(),
            choices: self.choices.clone(),
        }
    }

    fn spawn_matches_fetch(&self, ticket: FetchTicket) {
        let fetcher = self.fetcher.clone();
        let tx = self.fetch_tx.clone();
        tokio::spawn(async move {
            let result = fetcher.load(Some(ticket.date)).await;
            let _ = tx
                .send(FetchEvent::Matches {
                    seq: ticket.seq,
                    result,
                })
                .await;
        });
    }

    fn spawn_debug_fetch(&self, seq: u64) {
        let fetcher = self.fetcher.clone();
        let tx = self.fetch_tx.clone();
        tokio::spawn(async move {
            let result = fetcher.load_debug_info().await;
            let _ = tx.send(FetchEvent::DebugInfo { seq, result }).await;
        });
    }
}

// ---------------------------------------------------------------------------
// Event loop
// ---------------------------------------------------------------------------

/// Run the board until the TUI quits or hangs up.
pub async fn run(
    mut cmd_rx: mpsc::Receiver<UserCommand>,
    mut fetch_rx: mpsc::Receiver<FetchEvent>,
    ui_tx: mpsc::Sender<UiUpdate>,
    mut board: MatchBoard,
) -> anyhow::Result<()> {
    board.start();
    if push_snapshot(&ui_tx, &board).await.is_err() {
        return Ok(());
    }

    loop {
        tokio::select! {
            cmd = cmd_rx.recv() => {
                let Some(cmd) = cmd else {
                    info!("Command channel closed, stopping board");
                    break;
                };
                if !board.handle_command(cmd) {
                    info!("Quit requested");
                    break;
                }
            }
            Some(event) = fetch_rx.recv() => {
                board.handle_fetch_event(event);
            }
        }

        if push_snapshot(&ui_tx, &board).await.is_err() {
            warn!("UI channel closed, stopping board");
            break;
        }
    }

    Ok(())
}

async fn push_snapshot(
    ui_tx: &mpsc::Sender<UiUpdate>,
    board: &MatchBoard,
) -> Result<(), mpsc::error::SendError<UiUpdate>> {
    ui_tx
        .send(UiUpdate::Snapshot(Box::new(board.snapshot())))
        .await
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Arc;

    use async_trait::async_trait;
    use pronostici_core::store::{KeyValueStore, MemoryStore, StorageError};

    use crate::board::LoadState;
    use crate::fetcher::{HttpResponse, HttpTransport, TransportError};

    struct EmptyTransport;

    #[async_trait]
    impl HttpTransport for EmptyTransport {
        async fn get(&self, _url: &str) -> Result<HttpResponse, TransportError> {
            Ok(HttpResponse {
                status: 200,
                body: "[]".into(),
            })
        }
    }

    fn board() -> (MatchBoard, mpsc::Receiver<FetchEvent>, Arc<MemoryStore>) {
        let (fetch_tx, fetch_rx) = mpsc::channel(8);
        let kv = Arc::new(MemoryStore::new());
        let board = MatchBoard::new(
            Fetcher::new(Arc::new(EmptyTransport), "http://h"),
            ChoiceStore::new(kv.clone()),
            NaiveDate::from_ymd_opt(2025, 8, 22).unwrap(),
            fetch_tx,
        );
        (board, fetch_rx, kv)
    }

    #[tokio::test]
    async fn start_spawns_fetch_for_today() {
        let (mut board, mut fetch_rx, _) = board();
        board.start();
        assert!(board.view.is_loading());

        let event = fetch_rx.recv().await.expect("fetch completes");
        match &event {
            FetchEvent::Matches { seq, result } => {
                assert_eq!(*seq, 1);
                assert!(result.as_ref().unwrap().is_empty());
            }
            other => panic!("expected Matches, got {other:?}"),
        }
        board.handle_fetch_event(event);
        assert_eq!(board.view.load_state(), &LoadState::Settled(vec![]));

        // Empty list triggers the status request.
        let event = fetch_rx.recv().await.expect("status fetch completes");
        assert!(matches!(event, FetchEvent::DebugInfo { seq: 1, .. }));
    }

    #[tokio::test]
    async fn quit_command_stops() {
        let (mut board, _fetch_rx, _) = board();
        assert!(!board.handle_command(UserCommand::Quit));
        assert!(board.handle_command(UserCommand::ToggleExpanded(MatchId::new("x"))));
    }

    #[tokio::test]
    async fn pick_outcome_updates_snapshot_and_store() {
        let (mut board, _fetch_rx, kv) = board();
        board.handle_command(UserCommand::PickOutcome {
            match_id: MatchId::new("42"),
            outcome: Outcome::Draw,
        });
        let snapshot = board.snapshot();
        assert_eq!(snapshot.choices.get(&MatchId::new("42")), Some(&Outcome::Draw));

        let reread = ChoiceStore::new(kv).get();
        assert_eq!(reread.get(&MatchId::new("42")), Some(&Outcome::Draw));
    }

    /// Serves `{"7":"1"}` until `fail` is set, then every read errors.
    #[derive(Default)]
    struct ReadsStopWorking {
        fail: AtomicBool,
        writes: AtomicUsize,
    }

    impl KeyValueStore for ReadsStopWorking {
        fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
            if self.fail.load(Ordering::SeqCst) {
                return Err(StorageError::Encode {
                    key: key.to_string(),
                    source: serde_json::from_str::<u8>("unreadable").unwrap_err(),
                });
            }
            Ok(Some(r#"{"7":"1"}"#.to_string()))
        }

        fn set(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
            self.writes.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    #[tokio::test]
    async fn unpersisted_pick_keeps_earlier_picks_in_session() {
        let (fetch_tx, _fetch_rx) = mpsc::channel(8);
        let kv = Arc::new(ReadsStopWorking::default());
        let mut board = MatchBoard::new(
            Fetcher::new(Arc::new(EmptyTransport), "http://h"),
            ChoiceStore::new(kv.clone()),
            NaiveDate::from_ymd_opt(2025, 8, 22).unwrap(),
            fetch_tx,
        );
        assert_eq!(board.choices.len(), 1);

        kv.fail.store(true, Ordering::SeqCst);
        board.pick_outcome(&MatchId::new("42"), Outcome::Draw);

        assert_eq!(board.choices.get(&MatchId::new("7")), Some(&Outcome::Home));
        assert_eq!(board.choices.get(&MatchId::new("42")), Some(&Outcome::Draw));
        assert_eq!(kv.writes.load(Ordering::SeqCst), 0);
    }
}

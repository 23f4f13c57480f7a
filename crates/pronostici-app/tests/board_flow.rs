// End-to-end tests for the match board: a scripted backend behind the
// `HttpTransport` seam, an in-memory choice store, and the real event loop.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::mpsc;

use pronostici_app::app::{self, MatchBoard};
use pronostici_app::board::LoadState;
use pronostici_app::fetcher::{Fetcher, HttpResponse, HttpTransport, TransportError};
use pronostici_app::protocol::{BoardSnapshot, UiUpdate, UserCommand};
use pronostici_core::choices::ChoiceStore;
use pronostici_core::format::rank_market_picks;
use pronostici_core::model::{MatchId, Outcome};
use pronostici_core::store::{KeyValueStore, MemoryStore};

// ===========================================================================
// Test helpers
// ===========================================================================

const BASE: &str = "http://backend.test";

#[derive(Clone)]
struct Reply {
    delay: Duration,
    result: Result<HttpResponse, TransportError>,
}

impl Reply {
    fn ok(body: &str) -> Self {
        Reply {
            delay: Duration::ZERO,
            result: Ok(HttpResponse {
                status: 200,
                body: body.to_string(),
            }),
        }
    }

    fn status(status: u16) -> Self {
        Reply {
            delay: Duration::ZERO,
            result: Ok(HttpResponse {
                status,
                body: "error".to_string(),
            }),
        }
    }

    fn after(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

/// Serves scripted replies per URL. The n-th call to a URL gets the n-th
/// reply; the last reply repeats. Unknown URLs fail at the transport level.
#[derive(Default)]
struct ScriptedTransport {
    routes: Mutex<HashMap<String, Vec<Reply>>>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedTransport {
    fn route(self, path: &str, replies: Vec<Reply>) -> Self {
        self.routes
            .lock()
            .unwrap()
            .insert(format!("{BASE}{path}"), replies);
        self
    }

    fn calls_to(&self, path: &str) -> usize {
        let url = format!("{BASE}{path}");
        self.calls.lock().unwrap().iter().filter(|u| **u == url).count()
    }
}

#[async_trait]
impl HttpTransport for ScriptedTransport {
    async fn get(&self, url: &str) -> Result<HttpResponse, TransportError> {
        let reply = {
            let mut calls = self.calls.lock().unwrap();
            let n = calls.iter().filter(|u| *u == url).count();
            calls.push(url.to_string());
            let routes = self.routes.lock().unwrap();
            routes
                .get(url)
                .and_then(|replies| replies.get(n).or_else(|| replies.last()))
                .cloned()
        };
        match reply {
            Some(reply) => {
                tokio::time::sleep(reply.delay).await;
                reply.result
            }
            None => Err(TransportError(format!("no route for {url}"))),
        }
    }
}

fn date(s: &str) -> NaiveDate {
    s.parse().unwrap()
}

struct Harness {
    cmd_tx: mpsc::Sender<UserCommand>,
    ui_rx: mpsc::Receiver<UiUpdate>,
    transport: Arc<ScriptedTransport>,
    kv: Arc<MemoryStore>,
    handle: tokio::task::JoinHandle<anyhow::Result<()>>,
}

impl Harness {
    fn start(transport: ScriptedTransport, today: &str) -> Self {
        Self::start_with_store(transport, today, Arc::new(MemoryStore::new()))
    }

    fn start_with_store(transport: ScriptedTransport, today: &str, kv: Arc<MemoryStore>) -> Self {
        let transport = Arc::new(transport);
        let (cmd_tx, cmd_rx) = mpsc::channel(16);
        let (ui_tx, ui_rx) = mpsc::channel(64);
        let (fetch_tx, fetch_rx) = mpsc::channel(16);

        let board = MatchBoard::new(
            Fetcher::new(transport.clone(), BASE),
            ChoiceStore::new(kv.clone()),
            date(today),
            fetch_tx,
        );
        let handle = tokio::spawn(app::run(cmd_rx, fetch_rx, ui_tx, board));

        Harness {
            cmd_tx,
            ui_rx,
            transport,
            kv,
            handle,
        }
    }

    async fn send(&self, cmd: UserCommand) {
        self.cmd_tx.send(cmd).await.expect("board is running");
    }

    /// Receive snapshots until one satisfies `pred`.
    async fn wait_for(&mut self, pred: impl Fn(&BoardSnapshot) -> bool) -> BoardSnapshot {
        let wait = async {
            loop {
                match self.ui_rx.recv().await {
                    Some(UiUpdate::Snapshot(s)) if pred(&*s) => return *s,
                    Some(_) => continue,
                    None => panic!("board stopped before the expected snapshot"),
                }
            }
        };
        tokio::time::timeout(Duration::from_secs(30), wait)
            .await
            .expect("timed out waiting for snapshot")
    }

    /// Drain snapshots already queued, returning the most recent one.
    fn latest(&mut self) -> Option<BoardSnapshot> {
        let mut last = None;
        while let Ok(UiUpdate::Snapshot(s)) = self.ui_rx.try_recv() {
            last = Some(*s);
        }
        last
    }

    async fn quit(self) {
        let _ = self.cmd_tx.send(UserCommand::Quit).await;
        self.handle
            .await
            .expect("board task panicked")
            .expect("board loop failed");
    }
}

fn is_settled(s: &BoardSnapshot) -> bool {
    matches!(s.view.load_state(), LoadState::Settled(_))
}

const THREE_MARKETS: &str = r#"[{
    "id": 4242,
    "homeTeam": { "name": "Milan" },
    "awayTeam": { "name": "Cremonese" },
    "utcDate": "2025-08-23T18:45:00Z",
    "competition": { "name": "Serie A" },
    "aiPronostico": {
        "pronostico": "1",
        "reasoning": "Milan favorito in casa",
        "confidenza": 68,
        "tuttiPronostici": [
            { "categoria": "Over/Under", "pronostico": "Over 2.5", "probabilita": 58 },
            { "categoria": "1X2", "pronostico": "1", "probabilita": 68 },
            { "categoria": "GG/NG", "pronostico": "NG", "probabilita": 61 }
        ]
    }
}]"#;

// ===========================================================================
// Tests
// ===========================================================================

#[tokio::test]
async fn empty_day_settles_then_fetches_debug_info_and_omits_it_on_failure() {
    let transport = ScriptedTransport::default()
        .route("/api/matches?date=2025-08-23", vec![Reply::ok("[]")])
        .route("/api/status", vec![Reply::status(500)]);
    let mut h = Harness::start(transport, "2025-08-23");

    let first = h.wait_for(|_| true).await;
    assert!(first.view.is_loading());

    let settled = h.wait_for(is_settled).await;
    assert_eq!(settled.view.matches(), Some(&[][..]));
    assert!(settled.view.error().is_none());
    assert!(!settled.view.is_loading());

    // The status fetch completes (and fails) without changing the state.
    let after = h.wait_for(|s| is_settled(s) && s.view.debug_info().is_none()).await;
    assert!(after.view.error().is_none());
    tokio::time::sleep(Duration::from_millis(50)).await;
    if let Some(last) = h.latest() {
        assert!(last.view.debug_info().is_none());
        assert!(last.view.error().is_none());
    }
    assert_eq!(h.transport.calls_to("/api/status"), 1);

    h.quit().await;
}

#[tokio::test]
async fn empty_day_shows_debug_info_when_status_succeeds() {
    let status = r#"{"requestsUsed":9,"requestsLimit":10,"remainingRequests":1,"resetTime":"30s","competitions":["Serie A"]}"#;
    let transport = ScriptedTransport::default()
        .route("/api/matches?date=2025-08-23", vec![Reply::ok("[]")])
        .route("/api/status", vec![Reply::ok(status)]);
    let mut h = Harness::start(transport, "2025-08-23");

    let snap = h.wait_for(|s| s.view.debug_info().is_some()).await;
    let info = snap.view.debug_info().unwrap();
    assert_eq!(info.remaining_requests, 1);
    assert_eq!(info.competitions, vec!["Serie A".to_string()]);
    assert_eq!(snap.view.matches(), Some(&[][..]));

    h.quit().await;
}

#[tokio::test]
async fn non_empty_day_does_not_fetch_status() {
    let transport = ScriptedTransport::default()
        .route("/api/matches?date=2025-08-23", vec![Reply::ok(THREE_MARKETS)]);
    let mut h = Harness::start(transport, "2025-08-23");

    h.wait_for(is_settled).await;
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert_eq!(h.transport.calls_to("/api/status"), 0);

    h.quit().await;
}

#[tokio::test]
async fn expanding_shows_ranked_markets_and_collapsing_keeps_data() {
    let transport = ScriptedTransport::default()
        .route("/api/matches?date=2025-08-23", vec![Reply::ok(THREE_MARKETS)]);
    let mut h = Harness::start(transport, "2025-08-23");

    let settled = h.wait_for(is_settled).await;
    let id = MatchId::new("4242");
    assert!(!settled.view.is_expanded(&id));

    h.send(UserCommand::ToggleExpanded(id.clone())).await;
    let expanded = h.wait_for(|s| s.view.is_expanded(&id)).await;
    let m = &expanded.view.matches().unwrap()[0];
    let markets = &m.prediction.as_ref().unwrap().markets;
    let ranked: Vec<(&str, f64)> = rank_market_picks(markets)
        .into_iter()
        .map(|p| (p.label.as_str(), p.probability))
        .collect();
    assert_eq!(ranked, vec![("1", 68.0), ("NG", 61.0), ("Over 2.5", 58.0)]);

    h.send(UserCommand::ToggleExpanded(id.clone())).await;
    let collapsed = h.wait_for(|s| !s.view.is_expanded(&id)).await;
    assert_eq!(collapsed.view.matches(), settled.view.matches());
    // Stored order is the backend's, not the ranked one.
    let stored: Vec<&str> = collapsed.view.matches().unwrap()[0]
        .prediction
        .as_ref()
        .unwrap()
        .markets
        .iter()
        .map(|p| p.label.as_str())
        .collect();
    assert_eq!(stored, vec!["Over 2.5", "1", "NG"]);
    assert_eq!(h.transport.calls_to("/api/matches?date=2025-08-23"), 1);

    h.quit().await;
}

#[tokio::test(start_paused = true)]
async fn slow_stale_response_never_overwrites_newer_date() {
    let transport = ScriptedTransport::default()
        .route(
            "/api/matches?date=2025-08-23",
            vec![Reply::ok("[]").after(Duration::from_secs(10))],
        )
        .route(
            "/api/matches?date=2025-08-24",
            vec![Reply::ok(THREE_MARKETS).after(Duration::from_secs(1))],
        );
    let mut h = Harness::start(transport, "2025-08-23");

    h.wait_for(|s| s.view.is_loading()).await;
    h.send(UserCommand::SelectDate(date("2025-08-24"))).await;

    let settled = h.wait_for(is_settled).await;
    assert_eq!(settled.view.selected_date(), date("2025-08-24"));
    assert_eq!(settled.view.matches().map(<[_]>::len), Some(1));

    // Let the stale request for the 23rd resolve.
    tokio::time::sleep(Duration::from_secs(20)).await;
    let last = h.latest().unwrap_or(settled);
    assert_eq!(last.view.selected_date(), date("2025-08-24"));
    assert_eq!(last.view.matches().map(<[_]>::len), Some(1));
    assert!(last.view.debug_info().is_none());
    assert_eq!(h.transport.calls_to("/api/status"), 0);

    h.quit().await;
}

#[tokio::test]
async fn failure_then_manual_retry_recovers() {
    let transport = ScriptedTransport::default().route(
        "/api/matches?date=2025-08-23",
        vec![Reply::status(502), Reply::ok(THREE_MARKETS)],
    );
    let mut h = Harness::start(transport, "2025-08-23");

    let failed = h.wait_for(|s| s.view.error().is_some()).await;
    assert_eq!(failed.view.error(), Some("Errore nel caricamento"));
    assert!(!failed.view.is_loading());
    assert!(failed.view.matches().is_none());

    h.send(UserCommand::Retry).await;
    let settled = h.wait_for(is_settled).await;
    assert!(settled.view.error().is_none());
    assert_eq!(settled.view.selected_date(), date("2025-08-23"));
    assert_eq!(h.transport.calls_to("/api/matches?date=2025-08-23"), 2);

    h.quit().await;
}

#[tokio::test]
async fn malformed_body_surfaces_as_failed_state() {
    let transport = ScriptedTransport::default()
        .route("/api/matches?date=2025-08-23", vec![Reply::ok("{\"oops\":true}")]);
    let mut h = Harness::start(transport, "2025-08-23");

    let failed = h.wait_for(|s| s.view.error().is_some()).await;
    assert_eq!(failed.view.error(), Some("Risposta non valida dal server"));

    h.quit().await;
}

#[tokio::test]
async fn user_picks_survive_refetches_and_restarts() {
    let kv = Arc::new(MemoryStore::new());
    kv.set("userChoices", r#"{"7":"2"}"#).unwrap();

    let transport = ScriptedTransport::default()
        .route("/api/matches?date=2025-08-23", vec![Reply::ok(THREE_MARKETS)])
        .route("/api/matches?date=2025-08-24", vec![Reply::ok("[]")])
        .route("/api/status", vec![Reply::status(404)]);
    let mut h = Harness::start_with_store(transport, "2025-08-23", kv.clone());

    let first = h.wait_for(is_settled).await;
    assert_eq!(first.choices.get(&MatchId::new("7")), Some(&Outcome::Away));

    h.send(UserCommand::PickOutcome {
        match_id: MatchId::new("4242"),
        outcome: Outcome::Draw,
    })
    .await;
    h.wait_for(|s| s.choices.contains_key(&MatchId::new("4242"))).await;

    h.send(UserCommand::SelectDate(date("2025-08-24"))).await;
    let next_day = h
        .wait_for(|s| is_settled(s) && s.view.selected_date() == date("2025-08-24"))
        .await;
    assert_eq!(next_day.choices.len(), 2);
    assert_eq!(
        next_day.choices.get(&MatchId::new("4242")),
        Some(&Outcome::Draw)
    );
    assert!(Arc::ptr_eq(&h.kv, &kv));
    h.quit().await;

    // A fresh board reads the merged mapping back.
    let restarted = ChoiceStore::new(kv).get();
    assert_eq!(restarted.get(&MatchId::new("7")), Some(&Outcome::Away));
    assert_eq!(restarted.get(&MatchId::new("4242")), Some(&Outcome::Draw));
}

#[tokio::test]
async fn toggle_while_loading_is_ignored() {
    let transport = ScriptedTransport::default().route(
        "/api/matches?date=2025-08-23",
        vec![Reply::ok(THREE_MARKETS).after(Duration::from_millis(200))],
    );
    let mut h = Harness::start(transport, "2025-08-23");

    h.wait_for(|s| s.view.is_loading()).await;
    h.send(UserCommand::ToggleExpanded(MatchId::new("4242"))).await;
    let snap = h.wait_for(|_| true).await;
    assert_eq!(snap.view.expanded_count(), 0);

    let settled = h.wait_for(is_settled).await;
    assert!(!settled.view.is_expanded(&MatchId::new("4242")));

    h.quit().await;
}

// Wire model for the prediction backend (`/api/matches`, `/api/status`).
//
// Field names follow the backend's JSON (Italian camelCase). Everything the
// backend may omit is an explicit `Option` or defaulted collection so the
// renderer handles missing data in one place.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

// ---------------------------------------------------------------------------
// Identifiers
// ---------------------------------------------------------------------------

/// Opaque, stable fixture identifier.
///
/// The backend sends ids as JSON numbers today but strings are accepted too;
/// both are normalized to their decimal/text form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct MatchId(String);

impl MatchId {
    pub fn new(id: impl Into<String>) -> Self {
        MatchId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for MatchId {
    fn from(s: &str) -> Self {
        MatchId(s.to_string())
    }
}

impl<'de> Deserialize<'de> for MatchId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Text(String),
            Number(serde_json::Number),
        }

        Ok(match RawId::deserialize(deserializer)? {
            RawId::Text(s) => MatchId(s),
            RawId::Number(n) => MatchId(n.to_string()),
        })
    }
}

// ---------------------------------------------------------------------------
// Outcomes
// ---------------------------------------------------------------------------

/// Three-way result symbol: home win, draw, away win.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    #[serde(rename = "1")]
    Home,
    #[serde(rename = "X")]
    Draw,
    #[serde(rename = "2")]
    Away,
}

impl Outcome {
    pub const ALL: [Outcome; 3] = [Outcome::Home, Outcome::Draw, Outcome::Away];

    pub fn symbol(self) -> &'static str {
        match self {
            Outcome::Home => "1",
            Outcome::Draw => "X",
            Outcome::Away => "2",
        }
    }

    /// Parse a result symbol. Lowercase `x` is accepted.
    pub fn from_symbol(symbol: &str) -> Option<Outcome> {
        match symbol.trim() {
            "1" => Some(Outcome::Home),
            "X" | "x" => Some(Outcome::Draw),
            "2" => Some(Outcome::Away),
            _ => None,
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Headline call of a prediction.
///
/// Early backend revisions only sent `"1"`, `"X"` or `"2"`; later ones may
/// send a richer market call such as `"Over 2.5"` or `"1X"`.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Call {
    Outcome(Outcome),
    Market(String),
    #[default]
    Missing,
}

impl From<String> for Call {
    fn from(raw: String) -> Self {
        if let Some(outcome) = Outcome::from_symbol(&raw) {
            return Call::Outcome(outcome);
        }
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            Call::Missing
        } else {
            Call::Market(trimmed.to_string())
        }
    }
}

impl<'de> Deserialize<'de> for Call {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.map(Call::from).unwrap_or_default())
    }
}

// ---------------------------------------------------------------------------
// Match
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Team {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Competition {
    #[serde(default)]
    pub name: Option<String>,
}

/// One scheduled fixture with an optional backend prediction.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Match {
    pub id: MatchId,
    #[serde(rename = "homeTeam")]
    pub home_team: Team,
    #[serde(rename = "awayTeam")]
    pub away_team: Team,
    #[serde(rename = "utcDate")]
    pub kickoff: DateTime<Utc>,
    #[serde(default)]
    pub competition: Option<Competition>,
    #[serde(rename = "aiPronostico", default)]
    pub prediction: Option<Prediction>,
}

impl Match {
    /// Competition name, or `None` when the backend omitted it (or sent an
    /// empty name). Callers apply the configured default label.
    pub fn competition_name(&self) -> Option<&str> {
        self.competition
            .as_ref()
            .and_then(|c| c.name.as_deref())
            .filter(|n| !n.trim().is_empty())
    }
}

// ---------------------------------------------------------------------------
// Prediction
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Prediction {
    #[serde(rename = "pronostico", default)]
    pub call: Call,
    #[serde(default)]
    pub reasoning: String,
    #[serde(rename = "confidenza", alias = "confidence", default)]
    pub confidence: f64,
    #[serde(rename = "tuttiPronostici", default)]
    pub markets: Vec<MarketPick>,
    #[serde(rename = "statistiche", alias = "stats", default)]
    pub stats: Option<StatSnapshot>,
}

impl Prediction {
    /// Confidence clamped to [0, 100]; NaN reads as 0.
    pub fn confidence_pct(&self) -> f64 {
        clamp_pct(self.confidence)
    }
}

/// One candidate outcome within a betting market.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MarketPick {
    #[serde(rename = "categoria", alias = "mercato", alias = "market", default)]
    pub market: String,
    #[serde(rename = "pronostico", alias = "esito", alias = "label", default)]
    pub label: String,
    #[serde(rename = "probabilita", alias = "probability", default)]
    pub probability: f64,
}

/// Team strength figures the backend used for its analysis.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatSnapshot {
    #[serde(alias = "homeStrength")]
    pub forza_casa: Option<f64>,
    #[serde(alias = "awayStrength")]
    pub forza_trasferta: Option<f64>,
    #[serde(alias = "homeRank")]
    pub posizione_casa: Option<u32>,
    #[serde(alias = "awayRank")]
    pub posizione_trasferta: Option<u32>,
    #[serde(alias = "expectedGoals")]
    pub gol_attesi: Option<f64>,
}

impl StatSnapshot {
    pub fn is_empty(&self) -> bool {
        self.forza_casa.is_none()
            && self.forza_trasferta.is_none()
            && self.posizione_casa.is_none()
            && self.posizione_trasferta.is_none()
            && self.gol_attesi.is_none()
    }
}

// ---------------------------------------------------------------------------
// Status endpoint
// ---------------------------------------------------------------------------

/// Request-quota telemetry from `/api/status`, shown when a day has no matches.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiStatus {
    #[serde(default)]
    pub requests_used: u32,
    #[serde(default)]
    pub requests_limit: u32,
    #[serde(default)]
    pub remaining_requests: u32,
    #[serde(default)]
    pub reset_time: String,
    #[serde(default)]
    pub competitions: Vec<String>,
}

pub(crate) fn clamp_pct(p: f64) -> f64 {
    if p.is_nan() {
        0.0
    } else {
        p.clamp(0.0, 100.0)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

// Derived-formatting helpers: color tokens, time/date labels, market ranking.
//
// All functions are pure. Time-dependent helpers take the timezone and the
// reference "today" as parameters so output never depends on the host.

use std::fmt;

use chrono::{DateTime, Datelike, NaiveDate, TimeZone, Utc};

use crate::model::{clamp_pct, Call, MarketPick, Outcome};

// ---------------------------------------------------------------------------
// Color tokens
// ---------------------------------------------------------------------------

/// Palette shared by every colored element of the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tone {
    Green,
    LightGreen,
    Orange,
    Blue,
    Purple,
    Teal,
    Red,
    Indigo,
    Amber,
    Brown,
    Pink,
    Gray,
}

impl Tone {
    /// Neutral tone used for anything unrecognized.
    pub const NEUTRAL: Tone = Tone::Gray;

    pub fn hex(self) -> &'static str {
        match self {
            Tone::Green => "#4CAF50",
            Tone::LightGreen => "#8BC34A",
            Tone::Orange => "#FF9800",
            Tone::Blue => "#2196F3",
            Tone::Purple => "#9C27B0",
            Tone::Teal => "#009688",
            Tone::Red => "#F44336",
            Tone::Indigo => "#3F51B5",
            Tone::Amber => "#FFC107",
            Tone::Brown => "#795548",
            Tone::Pink => "#E91E63",
            Tone::Gray => "#9E9E9E",
        }
    }

    pub fn rgb(self) -> (u8, u8, u8) {
        let hex = &self.hex()[1..];
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).unwrap_or(0);
        (channel(0), channel(2), channel(4))
    }
}

impl fmt::Display for Tone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.hex())
    }
}

/// Color of a 1/X/2 symbol. Unknown symbols map to the neutral tone.
pub fn color_for_outcome(symbol: &str) -> Tone {
    match Outcome::from_symbol(symbol) {
        Some(Outcome::Home) => Tone::Green,
        Some(Outcome::Draw) => Tone::Orange,
        Some(Outcome::Away) => Tone::Blue,
        None => Tone::NEUTRAL,
    }
}

/// Color of a headline call badge.
pub fn color_for_call(call: &Call) -> Tone {
    match call {
        Call::Outcome(o) => color_for_outcome(o.symbol()),
        Call::Market(label) => color_for_market(label),
        Call::Missing => Tone::NEUTRAL,
    }
}

pub const STRONG_PROBABILITY: f64 = 75.0;
pub const GOOD_PROBABILITY: f64 = 65.0;
pub const FAIR_PROBABILITY: f64 = 55.0;

/// Four-tier probability color. Each tier includes its lower bound.
pub fn color_for_probability(p: f64) -> Tone {
    if p >= STRONG_PROBABILITY {
        Tone::Green
    } else if p >= GOOD_PROBABILITY {
        Tone::LightGreen
    } else if p >= FAIR_PROBABILITY {
        Tone::Orange
    } else {
        Tone::Gray
    }
}

// ---------------------------------------------------------------------------
// Markets
// ---------------------------------------------------------------------------

/// Market categories the backend reports in `tuttiPronostici`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MarketKind {
    FullTimeResult,
    DoubleChance,
    OverUnder,
    BothTeamsToScore,
    ExactScore,
    Multigoal,
    HalfTime,
    Handicap,
    Combo,
    Corners,
    Cards,
}

impl MarketKind {
    /// Classify a market label. Case, spaces and punctuation are ignored.
    pub fn classify(label: &str) -> Option<MarketKind> {
        let key: String = label
            .chars()
            .filter(|c| c.is_alphanumeric())
            .flat_map(char::to_lowercase)
            .collect();

        let kind = match key.as_str() {
            "1x2" | "esito" | "esitofinale" | "risultatofinale" | "risultato" => {
                MarketKind::FullTimeResult
            }
            "doppiachance" | "doublechance" | "dc" => MarketKind::DoubleChance,
            "overunder" | "underover" | "uo" | "ou" => MarketKind::OverUnder,
            "goalnogoal" | "golnogol" | "ggng" | "btts" | "entrambesegnano" => {
                MarketKind::BothTeamsToScore
            }
            "risultatoesatto" | "exactscore" | "correctscore" => MarketKind::ExactScore,
            "multigol" | "multigoal" => MarketKind::Multigoal,
            "primotempo" | "1tempo" | "halftime" | "ht" | "parzialefinale" => {
                MarketKind::HalfTime
            }
            "handicap" | "handicapeuropeo" | "asianhandicap" => MarketKind::Handicap,
            "combo" | "combinazione" => MarketKind::Combo,
            "corner" | "corners" | "calcidangolo" => MarketKind::Corners,
            "cartellini" | "cards" | "ammonizioni" => MarketKind::Cards,
            _ => return None,
        };
        Some(kind)
    }

    pub fn tone(self) -> Tone {
        match self {
            MarketKind::FullTimeResult => Tone::Green,
            MarketKind::DoubleChance => Tone::Teal,
            MarketKind::OverUnder => Tone::Blue,
            MarketKind::BothTeamsToScore => Tone::Purple,
            MarketKind::ExactScore => Tone::Red,
            MarketKind::Multigoal => Tone::Indigo,
            MarketKind::HalfTime => Tone::Amber,
            MarketKind::Handicap => Tone::Brown,
            MarketKind::Combo => Tone::Pink,
            MarketKind::Corners => Tone::LightGreen,
            MarketKind::Cards => Tone::Orange,
        }
    }
}

/// Color of a market category label; unrecognized labels are neutral.
pub fn color_for_market(label: &str) -> Tone {
    MarketKind::classify(label)
        .map(MarketKind::tone)
        .unwrap_or(Tone::NEUTRAL)
}

/// Display order for market picks: descending probability, ties keep their
/// original relative order. The input slice is left untouched.
pub fn rank_market_picks(picks: &[MarketPick]) -> Vec<&MarketPick> {
    let mut ranked: Vec<&MarketPick> = picks.iter().collect();
    ranked.sort_by(|a, b| b.probability.total_cmp(&a.probability));
    ranked
}

// ---------------------------------------------------------------------------
// Text
// ---------------------------------------------------------------------------

/// Human label for the headline call, e.g. "1 - Inter" or "X - Pareggio".
pub fn outcome_text(call: &Call, home_team: &str, away_team: &str) -> String {
    match call {
        Call::Outcome(Outcome::Home) => format!("1 - {home_team}"),
        Call::Outcome(Outcome::Draw) => "X - Pareggio".to_string(),
        Call::Outcome(Outcome::Away) => format!("2 - {away_team}"),
        Call::Market(label) => label.clone(),
        Call::Missing => "N/A".to_string(),
    }
}

/// Fixed-width text bar for a percentage, e.g. `████░░░░░░` for 40%.
pub fn confidence_bar(pct: f64, width: usize) -> String {
    let filled = ((clamp_pct(pct) / 100.0) * width as f64).round() as usize;
    let filled = filled.min(width);
    format!("{}{}", "█".repeat(filled), "░".repeat(width - filled))
}

// ---------------------------------------------------------------------------
// Dates and times
// ---------------------------------------------------------------------------

const WEEKDAYS_IT: [&str; 7] = [
    "lunedì",
    "martedì",
    "mercoledì",
    "giovedì",
    "venerdì",
    "sabato",
    "domenica",
];

const MONTHS_IT: [&str; 12] = [
    "gennaio",
    "febbraio",
    "marzo",
    "aprile",
    "maggio",
    "giugno",
    "luglio",
    "agosto",
    "settembre",
    "ottobre",
    "novembre",
    "dicembre",
];

/// Kickoff time of day ("HH:MM") in the given timezone.
pub fn format_kickoff<Tz>(instant: &DateTime<Utc>, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    instant.with_timezone(tz).format("%H:%M").to_string()
}

/// "Oggi", "Domani", or the Italian long form ("sabato 23 agosto").
pub fn format_date_label(date: NaiveDate, today: NaiveDate) -> String {
    if date == today {
        return "Oggi".to_string();
    }
    if today.succ_opt() == Some(date) {
        return "Domani".to_string();
    }
    let weekday = WEEKDAYS_IT[date.weekday().num_days_from_monday() as usize];
    let month = MONTHS_IT[date.month0() as usize];
    format!("{weekday} {} {month}", date.day())
}

/// The calendar date "now" falls on in `tz`.
pub fn today_in<Tz: TimeZone>(tz: &Tz) -> NaiveDate {
    Utc::now().with_timezone(tz).date_naive()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

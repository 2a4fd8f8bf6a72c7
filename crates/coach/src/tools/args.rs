//! Tolerant decoding of the argument strings produced by the model.
//!
//! The model is not trusted to follow the declared schemas. Arguments that are
//! not a JSON object become `{"query": <raw>}`, field aliases and stringly
//! numbers are accepted, and optional fields that cannot be read are dropped.
//! Only a missing required field is reported, as an error payload.
use chrono::{Duration, NaiveDate};
use serde_json::{Map, Value};
use std::str::FromStr;
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};

use crate::errors::{CoachError, CoachResult};

pub const DEFAULT_STATS_DAYS: u32 = 30;
pub const MAX_STATS_DAYS: u32 = 365;

/// Every tool the coach knows how to run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, AsRefStr, EnumString, EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum ToolKind {
    GetMatchesByDate,
    SearchMatches,
    GetMatchDetails,
    GetStandings,
    GetPredictionStats,
    WebSearch,
}

impl ToolKind {
    pub fn from_name(name: &str) -> Option<Self> {
        Self::from_str(name.trim()).ok()
    }
}

/// Decoded arguments, one variant per tool
#[derive(Debug, Clone, PartialEq)]
pub enum ToolArgs {
    MatchesByDate {
        date: NaiveDate,
        competition: Option<String>,
    },
    SearchMatches {
        query: String,
    },
    MatchDetails {
        home: String,
        away: String,
        date: Option<NaiveDate>,
    },
    Standings {
        competition: String,
        team: Option<String>,
    },
    PredictionStats {
        days: u32,
        competition: Option<String>,
        market: Option<String>,
    },
    WebSearch {
        query: String,
    },
}

impl ToolArgs {
    /// Decode the raw argument string of a call to `kind`.
    /// `today` anchors relative dates such as "tomorrow".
    pub fn parse(kind: ToolKind, raw: &str, today: NaiveDate) -> CoachResult<Self> {
        let fields = parse_arguments(raw);
        let query = string_field(&fields, &["query", "q"]);

        match kind {
            ToolKind::GetMatchesByDate => {
                let date = string_field(&fields, &["date", "day"])
                    .or(query)
                    .as_deref()
                    .and_then(|value| parse_date(value, today))
                    .ok_or_else(|| missing("date (YYYY-MM-DD)"))?;
                Ok(ToolArgs::MatchesByDate {
                    date,
                    competition: string_field(&fields, &["competition", "league"]),
                })
            }
            ToolKind::SearchMatches => Ok(ToolArgs::SearchMatches {
                query: query
                    .or_else(|| string_field(&fields, &["team", "name"]))
                    .ok_or_else(|| missing("query"))?,
            }),
            ToolKind::GetMatchDetails => {
                let mut home = string_field(&fields, &["home", "home_team", "homeTeam"]);
                let mut away = string_field(&fields, &["away", "away_team", "awayTeam"]);
                if home.is_none() || away.is_none() {
                    if let Some((h, a)) = query.as_deref().and_then(split_pairing) {
                        home = home.or(Some(h));
                        away = away.or(Some(a));
                    }
                }
                Ok(ToolArgs::MatchDetails {
                    home: home.ok_or_else(|| missing("home"))?,
                    away: away.ok_or_else(|| missing("away"))?,
                    date: string_field(&fields, &["date"])
                        .as_deref()
                        .and_then(|value| parse_date(value, today)),
                })
            }
            ToolKind::GetStandings => Ok(ToolArgs::Standings {
                competition: string_field(&fields, &["competition", "league"])
                    .or(query)
                    .ok_or_else(|| missing("competition"))?,
                team: string_field(&fields, &["team"]),
            }),
            ToolKind::GetPredictionStats => Ok(ToolArgs::PredictionStats {
                days: u32_field(&fields, &["days", "window"])
                    .unwrap_or(DEFAULT_STATS_DAYS)
                    .clamp(1, MAX_STATS_DAYS),
                competition: string_field(&fields, &["competition", "league"]),
                market: string_field(&fields, &["market"]),
            }),
            ToolKind::WebSearch => Ok(ToolArgs::WebSearch {
                query: query
                    .or_else(|| string_field(&fields, &["search", "text"]))
                    .ok_or_else(|| missing("query"))?,
            }),
        }
    }
}

fn missing(field: &str) -> CoachError {
    CoachError::InvalidParameters(format!("missing or unreadable argument: {}", field))
}

/// Parse a raw argument string into an object, falling back to `{"query": raw}`
pub fn parse_arguments(raw: &str) -> Map<String, Value> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Map::new();
    }
    let query = match serde_json::from_str::<Value>(trimmed) {
        Ok(Value::Object(map)) => return map,
        Ok(Value::Null) => return Map::new(),
        Ok(Value::String(text)) => text,
        _ => raw.to_string(),
    };
    let mut map = Map::new();
    map.insert("query".to_string(), Value::String(query));
    map
}

/// First non-blank value among `keys`, accepting numbers and booleans as text
fn string_field(fields: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| match fields.get(*key)? {
        Value::String(text) => Some(text.trim().to_string()).filter(|t| !t.is_empty()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    })
}

fn u32_field(fields: &Map<String, Value>, keys: &[&str]) -> Option<u32> {
    keys.iter().find_map(|key| match fields.get(*key)? {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f.round() as u64))
            .map(|v| v.min(u32::MAX as u64) as u32),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    })
}

/// ISO dates, day-first dates and the words today/tomorrow/yesterday
pub fn parse_date(value: &str, today: NaiveDate) -> Option<NaiveDate> {
    let value = value.trim();
    match value.to_lowercase().as_str() {
        "today" => return Some(today),
        "tomorrow" => return Some(today + Duration::days(1)),
        "yesterday" => return Some(today - Duration::days(1)),
        _ => {}
    }
    // Accept full timestamps by keeping the date part
    let day = value.get(..10).unwrap_or(value);
    NaiveDate::parse_from_str(day, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(value, "%d/%m/%Y"))
        .ok()
}

/// Split "Inter vs Milan" style text into a home/away pair
fn split_pairing(text: &str) -> Option<(String, String)> {
    for separator in [" vs. ", " vs ", " v ", " - ", " – "] {
        if let Some((home, away)) = text.split_once(separator) {
            let (home, away) = (home.trim(), away.trim());
            if !home.is_empty() && !away.is_empty() {
                return Some((home.to_string(), away.to_string()));
            }
        }
    }
    None
}

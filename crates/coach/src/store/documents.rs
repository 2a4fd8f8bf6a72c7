use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Decimal odds for the three outcomes of a match
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Odds {
    pub home: f64,
    pub draw: f64,
    pub away: f64,
}

/// Outcome probabilities in percent
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Probabilities {
    pub home: f64,
    pub draw: f64,
    pub away: f64,
}

/// One weighted statistical signal of a daily prediction.
/// `code` is an internal name and is never shown as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    pub code: String,
    pub score: f64,
    #[serde(default = "default_weight")]
    pub weight: f64,
}

fn default_weight() -> f64 {
    1.0
}

/// Per-day prediction record with weighted signal scores
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyPrediction {
    pub date: NaiveDate,
    pub competition: String,
    pub home: String,
    pub away: String,
    #[serde(default)]
    pub kickoff: Option<String>,
    #[serde(default)]
    pub odds: Option<Odds>,
    #[serde(default)]
    pub probabilities: Option<Probabilities>,
    #[serde(default)]
    pub signals: Vec<Signal>,
    #[serde(default)]
    pub pick: Option<String>,
    #[serde(default)]
    pub confidence: Option<f64>,
    #[serde(default)]
    pub comment: Option<String>,
}

/// League fixture of a numbered round, with raw historical indicators
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundFixture {
    pub date: NaiveDate,
    pub competition: String,
    pub round: u32,
    pub home: String,
    pub away: String,
    #[serde(default)]
    pub odds: Option<Odds>,
    #[serde(default)]
    pub score: Option<String>,
    #[serde(default)]
    pub home_form: Option<String>,
    #[serde(default)]
    pub away_form: Option<String>,
    #[serde(default)]
    pub home_goals_avg: Option<f64>,
    #[serde(default)]
    pub away_goals_avg: Option<f64>,
    #[serde(default)]
    pub over_2_5_rate: Option<f64>,
    #[serde(default)]
    pub btts_rate: Option<f64>,
    #[serde(default)]
    pub head_to_head: Option<String>,
    #[serde(default)]
    pub comment: Option<String>,
}

/// Continental-cup fixture
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CupFixture {
    pub date: NaiveDate,
    pub competition: String,
    pub stage: String,
    pub home: String,
    pub away: String,
    #[serde(default)]
    pub kickoff: Option<String>,
    #[serde(default)]
    pub odds: Option<Odds>,
    #[serde(default)]
    pub prediction: Option<String>,
    #[serde(default)]
    pub comment: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandingRow {
    pub competition: String,
    pub position: u32,
    pub team: String,
    pub played: u32,
    pub won: u32,
    pub drawn: u32,
    pub lost: u32,
    pub goals_for: u32,
    pub goals_against: u32,
    pub points: u32,
    #[serde(default)]
    pub form: Option<String>,
}

impl StandingRow {
    pub fn goal_difference(&self) -> i64 {
        self.goals_for as i64 - self.goals_against as i64
    }
}

/// A past prediction whose outcome is known
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettledPrediction {
    pub date: NaiveDate,
    pub competition: String,
    pub market: String,
    pub odds: f64,
    pub hit: bool,
}

/// Common accessors of the three fixture collections
pub trait MatchDocument {
    fn date(&self) -> NaiveDate;
    fn competition(&self) -> &str;
    fn home(&self) -> &str;
    fn away(&self) -> &str;
}

macro_rules! impl_match_document {
    ($($ty:ty),*) => {
        $(impl MatchDocument for $ty {
            fn date(&self) -> NaiveDate {
                self.date
            }
            fn competition(&self) -> &str {
                &self.competition
            }
            fn home(&self) -> &str {
                &self.home
            }
            fn away(&self) -> &str {
                &self.away
            }
        })*
    };
}

impl_match_document!(DailyPrediction, RoundFixture, CupFixture);

//! Read-only access to the match data collections.
//!
//! The coach never writes: every query here is a filtered read over one
//! collection, the same surface a document database exposes with find/sort.
pub mod documents;
pub mod memory;
pub mod names;

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::errors::CoachResult;
use documents::{
    CupFixture, DailyPrediction, MatchDocument, RoundFixture, SettledPrediction, StandingRow,
};

pub use memory::MemoryStore;

/// Filter over a fixture collection. Unset fields match everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MatchFilter {
    /// Near-exact home team name
    pub home: Option<String>,
    /// Near-exact away team name
    pub away: Option<String>,
    /// Partial name matching either side
    pub team_contains: Option<String>,
    pub date: Option<NaiveDate>,
    /// Case-insensitive partial competition name
    pub competition: Option<String>,
    pub limit: Option<usize>,
}

impl MatchFilter {
    pub fn pair<H: Into<String>, A: Into<String>>(home: H, away: A) -> Self {
        Self {
            home: Some(home.into()),
            away: Some(away.into()),
            ..Default::default()
        }
    }

    pub fn on_date(date: NaiveDate) -> Self {
        Self {
            date: Some(date),
            ..Default::default()
        }
    }

    pub fn team_contains<S: Into<String>>(fragment: S) -> Self {
        Self {
            team_contains: Some(fragment.into()),
            ..Default::default()
        }
    }

    pub fn with_date(mut self, date: Option<NaiveDate>) -> Self {
        self.date = date;
        self
    }

    pub fn with_competition(mut self, competition: Option<String>) -> Self {
        self.competition = competition;
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn matches<D: MatchDocument>(&self, doc: &D) -> bool {
        if let Some(home) = &self.home {
            if !names::same_team(doc.home(), home) {
                return false;
            }
        }
        if let Some(away) = &self.away {
            if !names::same_team(doc.away(), away) {
                return false;
            }
        }
        if let Some(fragment) = &self.team_contains {
            if !names::contains(doc.home(), fragment) && !names::contains(doc.away(), fragment) {
                return false;
            }
        }
        if let Some(date) = self.date {
            if doc.date() != date {
                return false;
            }
        }
        if let Some(competition) = &self.competition {
            if !names::contains(doc.competition(), competition) {
                return false;
            }
        }
        true
    }
}

/// Read-only query surface over the match collections.
///
/// Fixture queries return documents sorted by date ascending.
#[async_trait]
pub trait MatchStore: Send + Sync {
    async fn daily_predictions(&self, filter: &MatchFilter) -> CoachResult<Vec<DailyPrediction>>;

    async fn round_fixtures(&self, filter: &MatchFilter) -> CoachResult<Vec<RoundFixture>>;

    async fn cup_fixtures(&self, filter: &MatchFilter) -> CoachResult<Vec<CupFixture>>;

    /// Table of a competition, sorted by position
    async fn standings(&self, competition: &str) -> CoachResult<Vec<StandingRow>>;

    /// Settled predictions dated within `[since, until]`
    async fn settled_predictions(
        &self,
        since: NaiveDate,
        until: NaiveDate,
    ) -> CoachResult<Vec<SettledPrediction>>;
}

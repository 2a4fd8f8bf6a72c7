//! Builds the textual description of a match handed to the model.
//!
//! Three collections can describe a match. They are tried in a fixed order and
//! the first one holding the requested pair wins:
//! 1. daily prediction records (weighted signals)
//! 2. league round fixtures (raw historical indicators)
//! 3. continental-cup fixtures
pub mod labels;
pub mod render;

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use strum_macros::{AsRefStr, Display};

use crate::errors::CoachResult;
use crate::store::documents::{CupFixture, DailyPrediction, MatchDocument, RoundFixture};
use crate::store::{names, MatchFilter, MatchStore};

/// Maximum number of candidates returned by a fuzzy search
pub const SEARCH_LIMIT: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, AsRefStr)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ContextSource {
    DailyPrediction,
    RoundFixture,
    CupFixture,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchSummary {
    pub home: String,
    pub away: String,
    pub date: NaiveDate,
    pub competition: String,
}

impl MatchSummary {
    fn of<D: MatchDocument>(doc: &D) -> Self {
        Self {
            home: doc.home().to_string(),
            away: doc.away().to_string(),
            date: doc.date(),
            competition: doc.competition().to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchContext {
    pub rendered_text: String,
    pub source: ContextSource,
    pub summary: MatchSummary,
}

/// A search hit, tagged with the collection it came from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchCandidate {
    pub home: String,
    pub away: String,
    pub date: NaiveDate,
    pub competition: String,
    pub source: ContextSource,
}

/// A document shape the builder knows how to describe
trait Describe: MatchDocument {
    const SOURCE: ContextSource;

    fn describe(&self) -> String;
}

impl Describe for DailyPrediction {
    const SOURCE: ContextSource = ContextSource::DailyPrediction;

    fn describe(&self) -> String {
        render::render_daily(self)
    }
}

impl Describe for RoundFixture {
    const SOURCE: ContextSource = ContextSource::RoundFixture;

    fn describe(&self) -> String {
        render::render_round(self)
    }
}

impl Describe for CupFixture {
    const SOURCE: ContextSource = ContextSource::CupFixture;

    fn describe(&self) -> String {
        render::render_cup(self)
    }
}

#[derive(Clone)]
pub struct ContextBuilder {
    store: Arc<dyn MatchStore>,
    today: Option<NaiveDate>,
}

impl ContextBuilder {
    pub fn new(store: Arc<dyn MatchStore>) -> Self {
        Self { store, today: None }
    }

    /// Pin the reference date used to pick between fixtures when no date is requested
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }

    pub fn today(&self) -> NaiveDate {
        self.today.unwrap_or_else(|| Local::now().date_naive())
    }

    /// The reference date set with [`with_today`](Self::with_today), if any
    pub fn pinned_today(&self) -> Option<NaiveDate> {
        self.today
    }

    pub fn store(&self) -> &Arc<dyn MatchStore> {
        &self.store
    }

    /// Describe the match `home` vs `away`, optionally on a given date.
    ///
    /// Returns `Ok(None)` when no collection holds the match.
    pub async fn build(
        &self,
        home: &str,
        away: &str,
        date: Option<NaiveDate>,
    ) -> CoachResult<Option<MatchContext>> {
        let filter = MatchFilter::pair(home, away).with_date(date);

        let daily = self.store.daily_predictions(&filter).await?;
        if let Some(context) = self.describe_closest(&daily) {
            return Ok(Some(context));
        }

        let rounds = self.store.round_fixtures(&filter).await?;
        if let Some(context) = self.describe_closest(&rounds) {
            return Ok(Some(context));
        }

        let cups = self.store.cup_fixtures(&filter).await?;
        Ok(self.describe_closest(&cups))
    }

    /// Find up to ten matches whose home or away name contains `query`.
    pub async fn search(&self, query: &str) -> CoachResult<Vec<MatchCandidate>> {
        if names::normalize(query).is_empty() {
            return Ok(Vec::new());
        }
        let filter = MatchFilter::team_contains(query);

        let mut candidates = Vec::new();
        let mut seen = HashSet::new();
        collect_candidates(
            &self.store.daily_predictions(&filter).await?,
            &mut seen,
            &mut candidates,
        );
        collect_candidates(
            &self.store.round_fixtures(&filter).await?,
            &mut seen,
            &mut candidates,
        );
        collect_candidates(
            &self.store.cup_fixtures(&filter).await?,
            &mut seen,
            &mut candidates,
        );

        candidates.truncate(SEARCH_LIMIT);
        Ok(candidates)
    }

    fn describe_closest<D: Describe>(&self, docs: &[D]) -> Option<MatchContext> {
        let doc = closest_to(docs, self.today())?;
        Some(MatchContext {
            rendered_text: doc.describe(),
            source: D::SOURCE,
            summary: MatchSummary::of(doc),
        })
    }
}

/// The first document dated today or later, otherwise the most recent one.
/// Input is sorted by date ascending.
fn closest_to<D: MatchDocument>(docs: &[D], today: NaiveDate) -> Option<&D> {
    docs.iter()
        .find(|doc| doc.date() >= today)
        .or_else(|| docs.last())
}

fn collect_candidates<D: Describe>(
    docs: &[D],
    seen: &mut HashSet<(String, String)>,
    out: &mut Vec<MatchCandidate>,
) {
    for doc in docs {
        let key = (names::normalize(doc.home()), names::normalize(doc.away()));
        if seen.insert(key) {
            out.push(MatchCandidate {
                home: doc.home().to_string(),
                away: doc.away().to_string(),
                date: doc.date(),
                competition: doc.competition().to_string(),
                source: D::SOURCE,
            });
        }
    }
}

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use super::documents::{
    CupFixture, DailyPrediction, MatchDocument, RoundFixture, SettledPrediction, StandingRow,
};
use super::names;
use super::{MatchFilter, MatchStore};
use crate::errors::CoachResult;

/// Serialized form of every collection, as exported from the main database
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreSnapshot {
    pub daily_predictions: Vec<DailyPrediction>,
    pub round_fixtures: Vec<RoundFixture>,
    pub cup_fixtures: Vec<CupFixture>,
    pub standings: Vec<StandingRow>,
    pub settled_predictions: Vec<SettledPrediction>,
}

/// In-memory store over a snapshot of the collections
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    snapshot: StoreSnapshot,
}

impl MemoryStore {
    pub fn new(mut snapshot: StoreSnapshot) -> Self {
        snapshot.daily_predictions.sort_by_key(|d| d.date);
        snapshot.round_fixtures.sort_by_key(|d| d.date);
        snapshot.cup_fixtures.sort_by_key(|d| d.date);
        snapshot.settled_predictions.sort_by_key(|d| d.date);
        Self { snapshot }
    }

    /// Load a JSON snapshot from disk
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)
            .with_context(|| format!("Failed to read store snapshot {}", path.display()))?;
        let snapshot: StoreSnapshot = serde_json::from_str(&raw)
            .with_context(|| format!("Invalid store snapshot {}", path.display()))?;
        tracing::info!(
            path = %path.display(),
            daily_predictions = snapshot.daily_predictions.len(),
            round_fixtures = snapshot.round_fixtures.len(),
            cup_fixtures = snapshot.cup_fixtures.len(),
            "loaded match store"
        );
        Ok(Self::new(snapshot))
    }
}

fn select<D: MatchDocument + Clone>(docs: &[D], filter: &MatchFilter) -> Vec<D> {
    let matching = docs.iter().filter(|doc| filter.matches(*doc)).cloned();
    match filter.limit {
        Some(limit) => matching.take(limit).collect(),
        None => matching.collect(),
    }
}

#[async_trait]
impl MatchStore for MemoryStore {
    async fn daily_predictions(&self, filter: &MatchFilter) -> CoachResult<Vec<DailyPrediction>> {
        Ok(select(&self.snapshot.daily_predictions, filter))
    }

    async fn round_fixtures(&self, filter: &MatchFilter) -> CoachResult<Vec<RoundFixture>> {
        Ok(select(&self.snapshot.round_fixtures, filter))
    }

    async fn cup_fixtures(&self, filter: &MatchFilter) -> CoachResult<Vec<CupFixture>> {
        Ok(select(&self.snapshot.cup_fixtures, filter))
    }

    async fn standings(&self, competition: &str) -> CoachResult<Vec<StandingRow>> {
        let wanted = names::normalize(competition);
        let mut rows: Vec<StandingRow> = self
            .snapshot
            .standings
            .iter()
            .filter(|row| names::normalize(&row.competition) == wanted)
            .cloned()
            .collect();
        // Fall back to a partial name when nothing matches exactly ("Serie" -> "Serie A")
        if rows.is_empty() {
            rows = self
                .snapshot
                .standings
                .iter()
                .filter(|row| names::contains(&row.competition, competition))
                .cloned()
                .collect();
        }
        rows.sort_by_key(|row| row.position);
        Ok(rows)
    }

    async fn settled_predictions(
        &self,
        since: NaiveDate,
        until: NaiveDate,
    ) -> CoachResult<Vec<SettledPrediction>> {
        Ok(self
            .snapshot
            .settled_predictions
            .iter()
            .filter(|p| p.date >= since && p.date <= until)
            .cloned()
            .collect())
    }
}

use async_trait::async_trait;
use serde::Serialize;
use serde_json::{json, Value};
use std::collections::HashSet;
use std::sync::Arc;

use super::args::{ToolArgs, ToolKind};
use super::CoachTool;
use crate::context::ContextSource;
use crate::errors::{CoachError, CoachResult};
use crate::models::tool::{ParamKind, Tool, ToolParameter};
use crate::store::documents::MatchDocument;
use crate::store::{names, MatchFilter, MatchStore};

#[derive(Debug, Serialize)]
struct FixtureEntry {
    home: String,
    away: String,
    competition: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    kickoff: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stage: Option<String>,
    source: ContextSource,
}

impl FixtureEntry {
    fn of<D: MatchDocument>(doc: &D, source: ContextSource) -> Self {
        Self {
            home: doc.home().to_string(),
            away: doc.away().to_string(),
            competition: doc.competition().to_string(),
            kickoff: None,
            stage: None,
            source,
        }
    }
}

/// Lists every fixture of a day across the three collections
pub struct MatchesByDateTool {
    store: Arc<dyn MatchStore>,
    declaration: Tool,
}

impl MatchesByDateTool {
    pub fn new(store: Arc<dyn MatchStore>) -> Self {
        let declaration = Tool::new(
            ToolKind::GetMatchesByDate.as_ref(),
            "List all matches scheduled on a given date, optionally restricted to one \
            competition. Use it when the user asks what is being played on a day.",
            vec![
                ToolParameter::required(
                    "date",
                    ParamKind::String,
                    "Date in YYYY-MM-DD format, or 'today' / 'tomorrow'",
                ),
                ToolParameter::optional(
                    "competition",
                    ParamKind::String,
                    "Competition name, e.g. 'Serie A' or 'Champions League'",
                ),
            ],
        );
        Self { store, declaration }
    }
}

#[async_trait]
impl CoachTool for MatchesByDateTool {
    fn kind(&self) -> ToolKind {
        ToolKind::GetMatchesByDate
    }

    fn declaration(&self) -> &Tool {
        &self.declaration
    }

    async fn execute(&self, args: ToolArgs) -> CoachResult<Value> {
        let ToolArgs::MatchesByDate { date, competition } = args else {
            return Err(CoachError::InvalidParameters(
                "expected date arguments".to_string(),
            ));
        };
        let filter = MatchFilter::on_date(date).with_competition(competition);

        let mut seen = HashSet::new();
        let mut matches = Vec::new();
        let mut keep = |entry: FixtureEntry| {
            if seen.insert((names::normalize(&entry.home), names::normalize(&entry.away))) {
                matches.push(entry);
            }
        };

        for doc in self.store.daily_predictions(&filter).await? {
            let mut entry = FixtureEntry::of(&doc, ContextSource::DailyPrediction);
            entry.kickoff = doc.kickoff.clone();
            keep(entry);
        }
        for doc in self.store.round_fixtures(&filter).await? {
            let mut entry = FixtureEntry::of(&doc, ContextSource::RoundFixture);
            entry.stage = Some(format!("round {}", doc.round));
            keep(entry);
        }
        for doc in self.store.cup_fixtures(&filter).await? {
            let mut entry = FixtureEntry::of(&doc, ContextSource::CupFixture);
            entry.kickoff = doc.kickoff.clone();
            entry.stage = Some(doc.stage.clone());
            keep(entry);
        }

        Ok(json!({
            "date": date,
            "count": matches.len(),
            "matches": matches,
        }))
    }
}

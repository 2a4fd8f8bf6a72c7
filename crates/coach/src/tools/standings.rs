use async_trait::async_trait;
use chrono::NaiveDate;
use serde_json::{json, Value};

use super::args::{ToolArgs, ToolKind};
use super::CoachTool;
use crate::context::ContextBuilder;
use crate::errors::{CoachError, CoachResult};
use crate::models::tool::{ParamKind, Tool, ToolParameter};
use crate::store::documents::{RoundFixture, StandingRow};
use crate::store::{names, MatchFilter};

/// League table of a competition
pub struct StandingsTool {
    context: ContextBuilder,
    declaration: Tool,
}

impl StandingsTool {
    pub fn new(context: ContextBuilder) -> Self {
        let declaration = Tool::new(
            ToolKind::GetStandings.as_ref(),
            "Get the current league table of a competition, with the current round. \
            Optionally highlight one team's row.",
            vec![
                ToolParameter::required(
                    "competition",
                    ParamKind::String,
                    "Competition name, e.g. 'Serie A', 'Premier League'",
                ),
                ToolParameter::optional("team", ParamKind::String, "Team to highlight"),
            ],
        );
        Self {
            context,
            declaration,
        }
    }
}

/// Round of the first fixture dated today or later, else the round of the
/// latest fixture. Fixtures are sorted by date ascending.
pub fn infer_current_round(fixtures: &[RoundFixture], today: NaiveDate) -> Option<u32> {
    fixtures
        .iter()
        .find(|f| f.date >= today)
        .or_else(|| fixtures.last())
        .map(|f| f.round)
}

fn row_json(row: &StandingRow) -> Value {
    json!({
        "position": row.position,
        "team": row.team,
        "played": row.played,
        "won": row.won,
        "drawn": row.drawn,
        "lost": row.lost,
        "goals_for": row.goals_for,
        "goals_against": row.goals_against,
        "goal_difference": row.goal_difference(),
        "points": row.points,
        "form": row.form,
    })
}

#[async_trait]
impl CoachTool for StandingsTool {
    fn kind(&self) -> ToolKind {
        ToolKind::GetStandings
    }

    fn declaration(&self) -> &Tool {
        &self.declaration
    }

    async fn execute(&self, args: ToolArgs) -> CoachResult<Value> {
        let ToolArgs::Standings { competition, team } = args else {
            return Err(CoachError::InvalidParameters(
                "expected a competition".to_string(),
            ));
        };

        let store = self.context.store();
        let table = store.standings(&competition).await?;
        if table.is_empty() {
            return Err(CoachError::ExecutionError(format!(
                "no standings found for competition '{}'",
                competition
            )));
        }
        // Use the table's own spelling for the fixture lookup
        let official = table[0].competition.clone();

        let fixtures = store
            .round_fixtures(&MatchFilter::default().with_competition(Some(official.clone())))
            .await?;
        let current_round = infer_current_round(&fixtures, self.context.today());

        let mut result = json!({
            "competition": official,
            "current_round": current_round,
            "table": table.iter().map(row_json).collect::<Vec<_>>(),
        });

        if let Some(team) = team {
            match table.iter().find(|row| names::same_team(&row.team, &team)) {
                Some(row) => result["highlighted"] = row_json(row),
                None => {
                    result["note"] = json!(format!("'{}' is not in this table", team));
                }
            }
        }

        Ok(result)
    }
}

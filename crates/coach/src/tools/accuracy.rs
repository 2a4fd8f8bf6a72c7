use async_trait::async_trait;
use chrono::Duration;
use serde::Serialize;
use serde_json::{json, Value};

use super::args::{ToolArgs, ToolKind};
use super::CoachTool;
use crate::context::ContextBuilder;
use crate::errors::{CoachError, CoachResult};
use crate::models::tool::{ParamKind, Tool, ToolParameter};
use crate::store::documents::SettledPrediction;
use crate::store::names;

/// Odds bands used for the breakdown, as (label, lower bound inclusive, upper bound exclusive)
const ODDS_BANDS: &[(&str, f64, f64)] = &[
    ("<1.50", 0.0, 1.5),
    ("1.50-1.99", 1.5, 2.0),
    ("2.00-2.99", 2.0, 3.0),
    (">=3.00", 3.0, f64::INFINITY),
];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Breakdown {
    pub label: String,
    pub total: usize,
    pub hits: usize,
    /// Percentage of hits, one decimal
    pub hit_rate: Option<f64>,
    /// Flat one-unit stake return on investment in percent, one decimal
    pub roi: Option<f64>,
}

impl Breakdown {
    pub fn of<'a, I>(label: &str, predictions: I) -> Self
    where
        I: IntoIterator<Item = &'a SettledPrediction>,
    {
        let mut total = 0;
        let mut hits = 0;
        let mut profit = 0.0;
        for prediction in predictions {
            total += 1;
            if prediction.hit {
                hits += 1;
                profit += prediction.odds - 1.0;
            } else {
                profit -= 1.0;
            }
        }
        let ratio = |value: f64| (total > 0).then(|| round1(value / total as f64 * 100.0));

        Self {
            label: label.to_string(),
            total,
            hits,
            hit_rate: ratio(hits as f64),
            roi: ratio(profit),
        }
    }
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Historical accuracy of the published predictions
pub struct PredictionStatsTool {
    context: ContextBuilder,
    declaration: Tool,
}

impl PredictionStatsTool {
    pub fn new(context: ContextBuilder) -> Self {
        let declaration = Tool::new(
            ToolKind::GetPredictionStats.as_ref(),
            "Get the historical accuracy of our predictions over the last N days: hit rate and \
            return on investment, broken down by market and by odds band.",
            vec![
                ToolParameter::optional(
                    "days",
                    ParamKind::Integer,
                    "Size of the trailing window in days (default 30, max 365)",
                ),
                ToolParameter::optional("competition", ParamKind::String, "Competition filter"),
                ToolParameter::optional(
                    "market",
                    ParamKind::String,
                    "Market filter, e.g. '1X2', 'over_2_5', 'btts'",
                ),
            ],
        );
        Self {
            context,
            declaration,
        }
    }
}

#[async_trait]
impl CoachTool for PredictionStatsTool {
    fn kind(&self) -> ToolKind {
        ToolKind::GetPredictionStats
    }

    fn declaration(&self) -> &Tool {
        &self.declaration
    }

    async fn execute(&self, args: ToolArgs) -> CoachResult<Value> {
        let ToolArgs::PredictionStats {
            days,
            competition,
            market,
        } = args
        else {
            return Err(CoachError::InvalidParameters(
                "expected statistics filters".to_string(),
            ));
        };

        let until = self.context.today();
        let since = until - Duration::days(i64::from(days));
        let settled: Vec<SettledPrediction> = self
            .context
            .store()
            .settled_predictions(since, until)
            .await?
            .into_iter()
            .filter(|p| {
                competition
                    .as_deref()
                    .map_or(true, |c| names::contains(&p.competition, c))
            })
            .filter(|p| {
                market
                    .as_deref()
                    .map_or(true, |m| names::normalize(&p.market) == names::normalize(m))
            })
            .collect();

        let overall = Breakdown::of("overall", &settled);

        let mut markets: Vec<&str> = settled.iter().map(|p| p.market.as_str()).collect();
        markets.sort_unstable();
        markets.dedup();
        let by_market: Vec<Breakdown> = markets
            .into_iter()
            .map(|m| Breakdown::of(m, settled.iter().filter(|p| p.market == m)))
            .collect();

        let by_odds_band: Vec<Breakdown> = ODDS_BANDS
            .iter()
            .map(|(label, low, high)| {
                Breakdown::of(
                    label,
                    settled.iter().filter(|p| p.odds >= *low && p.odds < *high),
                )
            })
            .filter(|band| band.total > 0)
            .collect();

        Ok(json!({
            "from": since,
            "to": until,
            "days": days,
            "competition": competition,
            "market": market,
            "total": overall.total,
            "hits": overall.hits,
            "hit_rate": overall.hit_rate,
            "roi": overall.roi,
            "by_market": by_market,
            "by_odds_band": by_odds_band,
        }))
    }
}

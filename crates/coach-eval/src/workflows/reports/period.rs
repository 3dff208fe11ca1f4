use std::collections::BTreeMap;

use chrono::{Datelike, Duration, NaiveDate};

use super::rankings::{needs_attention, top_performers};
use super::views::{PeriodReport, WeeklyTrend};
use crate::workflows::evaluations::scoring::round_to_hundredths;
use crate::workflows::evaluations::Evaluation;

const PERIOD_RANKING_LIMIT: usize = 10;

fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.weekday().num_days_from_monday()))
}

fn weekly_trend(evaluations: &[Evaluation]) -> Vec<WeeklyTrend> {
    let mut weeks: BTreeMap<NaiveDate, Vec<f64>> = BTreeMap::new();
    for evaluation in evaluations.iter().filter(|e| e.is_finalized()) {
        weeks
            .entry(week_start(evaluation.date))
            .or_default()
            .push(f64::from(evaluation.effectiveness_percent));
    }

    weeks
        .into_iter()
        .map(|(start, effectiveness)| WeeklyTrend {
            week: start.format("%G-W%V").to_string(),
            week_start: start,
            week_end: start + Duration::days(6),
            average_effectiveness: round_to_hundredths(
                effectiveness.iter().sum::<f64>() / effectiveness.len() as f64,
            ),
            evaluations: effectiveness.len(),
        })
        .collect()
}

impl PeriodReport {
    /// Report over evaluations dated within `start..=end`. Rankings only see finalized
    /// evaluations of the period, and "not evaluated recently" is measured against `end`.
    pub fn build(evaluations: &[Evaluation], start: NaiveDate, end: NaiveDate) -> Self {
        let mut in_range: Vec<Evaluation> = evaluations
            .iter()
            .filter(|e| e.date >= start && e.date <= end)
            .cloned()
            .collect();
        in_range.sort_by(|a, b| {
            b.date
                .cmp(&a.date)
                .then_with(|| b.created_at.cmp(&a.created_at))
        });

        Self {
            start,
            end,
            evaluations: in_range.iter().map(Evaluation::summary_view).collect(),
            weekly_trend: weekly_trend(&in_range),
            top_performers: top_performers(&in_range, PERIOD_RANKING_LIMIT),
            needs_attention: needs_attention(&in_range, end, PERIOD_RANKING_LIMIT),
        }
    }
}

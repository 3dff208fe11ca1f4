use chrono::{DateTime, Datelike, Utc};

use super::rankings::common_opportunity_areas;
use super::views::{OverviewReport, StaleDraftView};
use crate::workflows::evaluations::scoring::round_to_hundredths;
use crate::workflows::evaluations::Evaluation;

const COMMON_AREAS_LIMIT: usize = 5;

impl OverviewReport {
    pub fn build(
        evaluations: &[Evaluation],
        now: DateTime<Utc>,
        stale_after: chrono::Duration,
    ) -> Self {
        let today = now.date_naive();
        let week_ago = today - chrono::Duration::days(7);

        let drafts_pending = evaluations.iter().filter(|e| e.is_draft()).count();

        let finalized_this_month: Vec<&Evaluation> = evaluations
            .iter()
            .filter(|e| e.is_finalized())
            .filter(|e| e.date.year() == today.year() && e.date.month() == today.month())
            .collect();

        let finalized_last_7_days = evaluations
            .iter()
            .filter(|e| e.is_finalized() && e.date > week_ago && e.date <= today)
            .count();

        let average_effectiveness_this_month = if finalized_this_month.is_empty() {
            0.0
        } else {
            let total: f64 = finalized_this_month
                .iter()
                .map(|e| f64::from(e.effectiveness_percent))
                .sum();
            round_to_hundredths(total / finalized_this_month.len() as f64)
        };

        let mut stale_drafts: Vec<StaleDraftView> = evaluations
            .iter()
            .filter(|e| e.is_stale(now, stale_after))
            .map(|e| StaleDraftView {
                id: e.id.clone(),
                employee: e.employee.clone(),
                days_since_update: (now - e.updated_at).num_days(),
            })
            .collect();
        stale_drafts.sort_by(|a, b| b.days_since_update.cmp(&a.days_since_update));

        Self {
            total_evaluations: evaluations.len(),
            drafts_pending,
            finalized_this_month: finalized_this_month.len(),
            finalized_last_7_days,
            average_effectiveness_this_month,
            stale_drafts,
            common_opportunity_areas: common_opportunity_areas(evaluations, COMMON_AREAS_LIMIT),
        }
    }
}

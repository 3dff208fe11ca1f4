use chrono::NaiveDate;
use serde::Serialize;

use crate::workflows::evaluations::{EmployeeRef, EvaluationId, EvaluationSummaryView};

#[derive(Debug, Clone, Serialize)]
pub struct OverviewReport {
    pub total_evaluations: usize,
    pub drafts_pending: usize,
    pub finalized_this_month: usize,
    pub finalized_last_7_days: usize,
    /// Mean effectiveness of evaluations finalized this month, two decimals; 0 when none.
    pub average_effectiveness_this_month: f64,
    pub stale_drafts: Vec<StaleDraftView>,
    pub common_opportunity_areas: Vec<AreaFrequency>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StaleDraftView {
    pub id: EvaluationId,
    pub employee: EmployeeRef,
    pub days_since_update: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AreaFrequency {
    pub area: String,
    pub frequency: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmployeePerformance {
    pub employee: EmployeeRef,
    pub average_effectiveness: f64,
    pub evaluations: usize,
    pub latest: EvaluationId,
    pub latest_date: NaiveDate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AttentionReason {
    LowEffectiveness,
    NotEvaluatedRecently,
}

impl AttentionReason {
    pub const fn label(self) -> &'static str {
        match self {
            AttentionReason::LowEffectiveness => "low effectiveness",
            AttentionReason::NotEvaluatedRecently => "not evaluated recently",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmployeeAttention {
    pub employee: EmployeeRef,
    pub average_effectiveness: f64,
    pub latest_date: NaiveDate,
    pub days_since_latest: i64,
    pub reason: AttentionReason,
}

/// Evaluations and rankings for a closed date range.
#[derive(Debug, Clone, Serialize)]
pub struct PeriodReport {
    pub start: NaiveDate,
    pub end: NaiveDate,
    /// Every evaluation dated inside the range, drafts included, newest first.
    pub evaluations: Vec<EvaluationSummaryView>,
    pub weekly_trend: Vec<WeeklyTrend>,
    pub top_performers: Vec<EmployeePerformance>,
    pub needs_attention: Vec<EmployeeAttention>,
}

/// Finalized evaluations of one Monday-based week. Weeks without any are omitted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeeklyTrend {
    /// ISO week label, e.g. `2025-W24`.
    pub week: String,
    pub week_start: NaiveDate,
    pub week_end: NaiveDate,
    pub average_effectiveness: f64,
    pub evaluations: usize,
}

//! Dashboard figures derived from stored evaluations. Drafts never count toward
//! effectiveness figures; they only show up as pending or stale work.

mod learning_curve;
mod overview;
mod period;
mod rankings;
pub mod views;

pub use learning_curve::{curve_progress, expected_effectiveness, tenure_weeks, ONBOARDING_WEEKS};
pub use rankings::{
    common_opportunity_areas, needs_attention, top_performers, LOW_EFFECTIVENESS_THRESHOLD,
    NOT_EVALUATED_AFTER_DAYS,
};
pub use views::{
    AreaFrequency, AttentionReason, EmployeeAttention, EmployeePerformance, OverviewReport,
    PeriodReport, StaleDraftView, WeeklyTrend,
};

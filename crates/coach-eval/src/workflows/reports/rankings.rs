use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;

use super::views::{AreaFrequency, AttentionReason, EmployeeAttention, EmployeePerformance};
use crate::workflows::evaluations::Evaluation;

/// Average effectiveness (percent) below which an employee is flagged.
pub const LOW_EFFECTIVENESS_THRESHOLD: f64 = 50.0;
pub const NOT_EVALUATED_AFTER_DAYS: i64 = 30;

struct EmployeeHistory<'a> {
    effectiveness: Vec<f64>,
    latest: &'a Evaluation,
}

impl EmployeeHistory<'_> {
    fn average(&self) -> f64 {
        self.effectiveness.iter().sum::<f64>() / self.effectiveness.len() as f64
    }
}

fn is_newer(candidate: &Evaluation, current: &Evaluation) -> bool {
    (candidate.date, candidate.created_at) > (current.date, current.created_at)
}

/// Finalized evaluations grouped by employee id.
fn finalized_by_employee(evaluations: &[Evaluation]) -> BTreeMap<&str, EmployeeHistory<'_>> {
    let mut grouped: BTreeMap<&str, EmployeeHistory<'_>> = BTreeMap::new();

    for evaluation in evaluations.iter().filter(|e| e.is_finalized()) {
        let effectiveness = f64::from(evaluation.effectiveness_percent);
        grouped
            .entry(evaluation.employee.id.as_str())
            .and_modify(|history| {
                history.effectiveness.push(effectiveness);
                if is_newer(evaluation, history.latest) {
                    history.latest = evaluation;
                }
            })
            .or_insert_with(|| EmployeeHistory {
                effectiveness: vec![effectiveness],
                latest: evaluation,
            });
    }

    grouped
}

/// Most frequent opportunity areas across each employee's latest finalized evaluation.
pub fn common_opportunity_areas(evaluations: &[Evaluation], limit: usize) -> Vec<AreaFrequency> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for history in finalized_by_employee(evaluations).values() {
        for area in &history.latest.opportunity_areas {
            *counts.entry(area.as_str()).or_default() += 1;
        }
    }

    let mut areas: Vec<AreaFrequency> = counts
        .into_iter()
        .map(|(area, frequency)| AreaFrequency {
            area: area.to_string(),
            frequency,
        })
        .collect();
    areas.sort_by(|a, b| b.frequency.cmp(&a.frequency).then_with(|| a.area.cmp(&b.area)));
    areas.truncate(limit);
    areas
}

pub fn top_performers(evaluations: &[Evaluation], limit: usize) -> Vec<EmployeePerformance> {
    let mut ranked: Vec<EmployeePerformance> = finalized_by_employee(evaluations)
        .into_values()
        .map(|history| EmployeePerformance {
            employee: history.latest.employee.clone(),
            average_effectiveness: history.average(),
            evaluations: history.effectiveness.len(),
            latest: history.latest.id.clone(),
            latest_date: history.latest.date,
        })
        .collect();

    ranked.sort_by(|a, b| {
        b.average_effectiveness
            .total_cmp(&a.average_effectiveness)
            .then_with(|| a.employee.name.cmp(&b.employee.name))
    });
    ranked.truncate(limit);
    ranked
}

/// Employees with low average effectiveness or no finalized evaluation in the last
/// [`NOT_EVALUATED_AFTER_DAYS`] days, lowest effectiveness first.
pub fn needs_attention(
    evaluations: &[Evaluation],
    today: NaiveDate,
    limit: usize,
) -> Vec<EmployeeAttention> {
    let mut flagged: Vec<EmployeeAttention> = finalized_by_employee(evaluations)
        .into_values()
        .filter_map(|history| {
            let average = history.average();
            let days_since_latest = (today - history.latest.date).num_days();
            let reason = if average < LOW_EFFECTIVENESS_THRESHOLD {
                AttentionReason::LowEffectiveness
            } else if days_since_latest > NOT_EVALUATED_AFTER_DAYS {
                AttentionReason::NotEvaluatedRecently
            } else {
                return None;
            };

            Some(EmployeeAttention {
                employee: history.latest.employee.clone(),
                average_effectiveness: average,
                latest_date: history.latest.date,
                days_since_latest,
                reason,
            })
        })
        .collect();

    flagged.sort_by(|a, b| {
        a.average_effectiveness
            .total_cmp(&b.average_effectiveness)
            .then_with(|| a.employee.name.cmp(&b.employee.name))
    });
    flagged.truncate(limit);
    flagged
}

use super::super::domain::{EvaluationSections, Rating};
use super::policy::RatingBand;

/// Mean of the ratings that carry signal. Unrated and Not Applicable entries are dropped;
/// an empty remainder yields `0.0`, which downstream code must read as "no signal".
pub fn section_average<I>(ratings: I) -> f64
where
    I: IntoIterator<Item = Rating>,
{
    let (sum, count) = ratings
        .into_iter()
        .filter(|rating| rating.counts_toward_average())
        .fold((0u32, 0u32), |(sum, count), rating| {
            (sum + u32::from(rating.value()), count + 1)
        });

    if count == 0 {
        0.0
    } else {
        f64::from(sum) / f64::from(count)
    }
}

/// Mean of the section averages that carry signal (non-zero).
pub fn overall_average(section_averages: &[f64]) -> f64 {
    let signal: Vec<f64> = section_averages
        .iter()
        .copied()
        .filter(|average| *average > 0.0)
        .collect();

    if signal.is_empty() {
        0.0
    } else {
        signal.iter().sum::<f64>() / signal.len() as f64
    }
}

/// Inverts the 1..=4 scale onto a percentage: 1 maps to 100, 4 maps to 25.
/// Halves round away from zero, and a zero (no signal) average maps to 0 rather than 125.
pub fn effectiveness_percent(overall_average: f64) -> u8 {
    if overall_average <= 0.0 || !overall_average.is_finite() {
        return 0;
    }

    let percent = ((5.0 - overall_average) / 4.0 * 100.0).round();
    percent.clamp(0.0, 100.0) as u8
}

/// Splits rated competencies into strengths (Evident) and opportunity areas (Por
/// Desarrollar / Sin Evidencia), following section order then competency order.
pub fn classify(sections: &EvaluationSections) -> (Vec<String>, Vec<String>) {
    let mut strengths = Vec::new();
    let mut opportunities = Vec::new();

    for (_, section) in sections.iter() {
        for item in &section.items {
            match item.rating.band() {
                RatingBand::Strength => strengths.push(item.competency.clone()),
                RatingBand::Opportunity => opportunities.push(item.competency.clone()),
                RatingBand::Acceptable | RatingBand::NoSignal => {}
            }
        }
    }

    (strengths, opportunities)
}

pub(crate) fn round_to_hundredths(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

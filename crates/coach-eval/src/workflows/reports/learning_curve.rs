use chrono::NaiveDate;

pub const ONBOARDING_WEEKS: u32 = 14;

/// Expected effectiveness (percent) for each onboarding week, week 1 first. The last week
/// expects new hires to exceed the baseline.
const CURVE: [f64; ONBOARDING_WEEKS as usize] = [
    5.0, 10.0, 15.0, 20.0, 30.0, 40.0, 55.0, 70.0, 80.0, 85.0, 90.0, 95.0, 98.0, 115.0,
];

/// Whole weeks between hire date and `today`; negative spans count as zero.
pub fn tenure_weeks(hired_on: NaiveDate, today: NaiveDate) -> u32 {
    let days = (today - hired_on).num_days().max(0);
    u32::try_from(days / 7).unwrap_or(u32::MAX)
}

pub fn expected_effectiveness(weeks_of_tenure: u32) -> f64 {
    match weeks_of_tenure {
        0 => 0.0,
        weeks if weeks >= ONBOARDING_WEEKS => CURVE[CURVE.len() - 1],
        weeks => CURVE[weeks as usize - 1],
    }
}

/// Actual effectiveness as a percentage of what the curve expects at this tenure.
pub fn curve_progress(actual_percent: f64, weeks_of_tenure: u32) -> f64 {
    let expected = expected_effectiveness(weeks_of_tenure);
    if expected == 0.0 {
        return 0.0;
    }
    actual_percent / expected * 100.0
}

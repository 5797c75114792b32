//! Dosing frequency and daily totals.

use crate::models::{DailyDosingInfo, MedicationData};
use crate::units::{format_number, round_to_precision, usable_fact, Unit};

const HOURS_PER_DAY: f64 = 24.0;

/// Hours between doses, ignoring unusable values.
fn interval_hours(medication: &MedicationData) -> Option<f64> {
    usable_fact(medication.typical_frequency_hours)
}

fn max_per_day(medication: &MedicationData) -> Option<u32> {
    medication.max_frequency_per_day.filter(|n| *n > 0)
}

/// Human-readable frequency, e.g. "Twice daily" or "Every 4 hours".
pub fn frequency_description(medication: &MedicationData) -> String {
    if let Some(hours) = interval_hours(medication) {
        return match hours {
            h if h == 24.0 => "Once daily".to_string(),
            h if h == 12.0 => "Twice daily".to_string(),
            h if h == 8.0 => "Three times daily".to_string(),
            h if h == 6.0 => "Four times daily".to_string(),
            h => format!("Every {} hours", format_number(h)),
        };
    }

    match max_per_day(medication) {
        Some(1) => "Once daily".to_string(),
        Some(2) => "Twice daily".to_string(),
        Some(3) => "Three times daily".to_string(),
        Some(n) => format!("{} times daily", n),
        None => "As directed".to_string(),
    }
}

/// Doses per day: the configured maximum, else whole doses fitting in 24h.
///
/// Intervals longer than a day give 0.
pub fn doses_per_day(medication: &MedicationData) -> Option<u32> {
    if let Some(n) = max_per_day(medication) {
        return Some(n);
    }
    interval_hours(medication).map(|hours| (HOURS_PER_DAY / hours).floor() as u32)
}

/// Hours between doses: the configured interval, else 24h spread over the
/// daily count.
fn hours_between_doses(medication: &MedicationData, doses: u32) -> Option<f64> {
    interval_hours(medication).or_else(|| (doses > 0).then(|| HOURS_PER_DAY / f64::from(doses)))
}

/// Format an interval as hours (>= 1h) or minutes (< 1h).
pub fn format_interval(hours: f64) -> String {
    if hours >= 1.0 {
        let text = format!("{:.1}", hours);
        let text = text.strip_suffix(".0").unwrap_or(&text);
        if text == "1" {
            "1 hour".to_string()
        } else {
            format!("{} hours", text)
        }
    } else {
        format!("{} minutes", (hours * 60.0).round())
    }
}

/// Daily summary for a single dose given in `unit`, unrounded.
pub fn daily_info(single_dose: f64, unit: Unit, medication: &MedicationData) -> Option<DailyDosingInfo> {
    let doses = doses_per_day(medication)?;
    let gap = hours_between_doses(medication, doses)?;
    Some(DailyDosingInfo {
        total_daily_dose: round_to_precision(single_dose * f64::from(doses), unit),
        unit,
        doses_per_day: doses,
        time_between_doses: format_interval(gap),
    })
}

use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};

use crate::models::profile::ExperienceEntry;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeniorityTier {
    Junior,
    MidLevel,
    Senior,
}

impl SeniorityTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            SeniorityTier::Junior => "junior",
            SeniorityTier::MidLevel => "mid_level",
            SeniorityTier::Senior => "senior",
        }
    }
}

/// Derives the seniority filter for the job search from resume experience.
pub fn infer_seniority(entries: &[ExperienceEntry]) -> SeniorityTier {
    tier_for_years(experience_years(entries, Utc::now()))
}

pub fn tier_for_years(years: f64) -> SeniorityTier {
    if years < 1.0 {
        SeniorityTier::Junior
    } else if years < 4.0 {
        SeniorityTier::MidLevel
    } else {
        SeniorityTier::Senior
    }
}

/// Sums the span of every experience entry in fractional years. Overlapping
/// roles are counted twice. Entries whose dates do not parse contribute
/// nothing rather than poisoning the total.
pub fn experience_years(entries: &[ExperienceEntry], now: DateTime<Utc>) -> f64 {
    entries
        .iter()
        .filter_map(|entry| {
            let start = parse_month(entry.start_date.as_deref())?;
            let end = if entry.is_current || entry.end_date.is_none() {
                now
            } else {
                parse_month(entry.end_date.as_deref())?
            };

            let span_days = (end - start).num_seconds() as f64 / 86_400.0;
            let years = span_days / 365.25;
            (years > 0.0).then_some(years)
        })
        .sum()
}

// Resume dates arrive as "YYYY-MM"; treat them as the first of the month.
fn parse_month(raw: Option<&str>) -> Option<DateTime<Utc>> {
    let raw = raw?;
    let date = NaiveDate::parse_from_str(&format!("{raw}-01"), "%Y-%m-%d").ok()?;
    Some(Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN)))
}

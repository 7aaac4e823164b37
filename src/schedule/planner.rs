//! Distribution planner
//!
//! Two regimes for a fixed total:
//! - even spread when there are at least as many units as eligible days:
//!   unit `i` lands on offset `floor(i * days / total)`
//! - uniform random sampling (with replacement) otherwise
//!
//! Pull requests and discussions always use the even-spacing formula, so a
//! handful of PRs over a month land on evenly spaced days.
//!
//! Per-day policies consult the frequency policy once per admitted day.

use crate::error::{Error, Result};
use crate::schedule::{DateRange, DayFilter, FrequencyPolicy, Schedule, ScheduleEntry, Volume};
use chrono::NaiveDate;
use rand::Rng;
use std::collections::BTreeMap;
use tracing::debug;

/// Plan a request's volume over the range
pub fn plan<R: Rng + ?Sized>(
    volume: Volume,
    range: &DateRange,
    filter: DayFilter,
    rng: &mut R,
) -> Result<Schedule> {
    match volume {
        Volume::Total(total) => plan_total(total, range, filter, rng),
        Volume::PerDay(policy) => Ok(plan_policy(policy, range, filter, rng)),
    }
}

/// Spread exactly `total` units over the admitted days of `range`
pub fn plan_total<R: Rng + ?Sized>(
    total: usize,
    range: &DateRange,
    filter: DayFilter,
    rng: &mut R,
) -> Result<Schedule> {
    if total == 0 {
        return Ok(Schedule::default());
    }

    let days = eligible_days(range, filter)?;
    let day_count = days.len();

    if total >= day_count {
        debug!("Even spread: {total} units over {day_count} days");
        return Ok(spread_evenly(total, &days));
    }

    debug!("Sparse sampling: {total} units over {day_count} days");
    let mut counts: BTreeMap<NaiveDate, usize> = BTreeMap::new();
    for _ in 0..total {
        let offset = rng.random_range(0..day_count);
        *counts.entry(days[offset]).or_default() += 1;
    }

    Ok(into_schedule(counts))
}

/// Space `total` units evenly over the admitted days, whatever the ratio of
/// units to days.
pub fn plan_spaced(total: usize, range: &DateRange, filter: DayFilter) -> Result<Schedule> {
    if total == 0 {
        return Ok(Schedule::default());
    }
    let days = eligible_days(range, filter)?;
    Ok(spread_evenly(total, &days))
}

fn eligible_days(range: &DateRange, filter: DayFilter) -> Result<Vec<NaiveDate>> {
    let days: Vec<NaiveDate> = range.days().filter(|d| filter.admits(*d)).collect();
    if days.is_empty() {
        return Err(Error::Config(format!(
            "no eligible days between {} and {} for the {filter:?} filter",
            range.start(),
            range.end()
        )));
    }
    Ok(days)
}

fn spread_evenly(total: usize, days: &[NaiveDate]) -> Schedule {
    let mut counts: BTreeMap<NaiveDate, usize> = BTreeMap::new();
    for i in 0..total {
        let offset = i * days.len() / total;
        *counts.entry(days[offset]).or_default() += 1;
    }
    into_schedule(counts)
}

/// Consult `policy` for every admitted day of `range`
pub fn plan_policy<R: Rng + ?Sized>(
    policy: FrequencyPolicy,
    range: &DateRange,
    filter: DayFilter,
    rng: &mut R,
) -> Schedule {
    let counts: BTreeMap<NaiveDate, usize> = range
        .days()
        .map(|d| (d, policy.units_for(d, filter, rng) as usize))
        .collect();
    into_schedule(counts)
}

fn into_schedule(counts: BTreeMap<NaiveDate, usize>) -> Schedule {
    Schedule::from_entries(
        counts
            .into_iter()
            .map(|(date, count)| ScheduleEntry { date, count })
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn range(start: &str, end: &str) -> DateRange {
        DateRange::parse(start, end).unwrap()
    }

    #[test]
    fn test_dense_total_covers_every_day() {
        let mut rng = StdRng::seed_from_u64(1);
        let r = range("2024-01-01", "2024-03-31");

        for total in [r.day_count(), r.day_count() + 1, 250, 1000] {
            let schedule = plan_total(total, &r, DayFilter::All, &mut rng).unwrap();
            assert_eq!(schedule.total(), total);
            assert_eq!(schedule.entries().len(), r.day_count());

            let per_day = total / r.day_count();
            for entry in schedule.entries() {
                assert!(entry.count == per_day || entry.count == per_day + 1);
            }
            assert_eq!(schedule.span(), Some((r.start(), r.end())));
        }
    }

    #[test]
    fn test_sparse_total_stays_in_range() {
        let mut rng = StdRng::seed_from_u64(9);
        let r = range("2024-01-01", "2024-12-31");

        for total in [1, 5, 100, 365] {
            let schedule = plan_total(total, &r, DayFilter::All, &mut rng).unwrap();
            assert_eq!(schedule.total(), total);
            assert!(schedule.entries().iter().all(|e| r.contains(e.date)));
            assert!(schedule.entries().windows(2).all(|w| w[0].date < w[1].date));
        }
    }

    #[test]
    fn test_three_prs_over_thirty_days() {
        let r = range("2024-04-01", "2024-04-30");

        let schedule = plan_spaced(3, &r, DayFilter::All).unwrap();

        let dates: Vec<_> = schedule.entries().iter().map(|e| e.date).collect();
        assert_eq!(
            dates,
            vec![
                NaiveDate::from_ymd_opt(2024, 4, 1).unwrap(),
                NaiveDate::from_ymd_opt(2024, 4, 11).unwrap(),
                NaiveDate::from_ymd_opt(2024, 4, 21).unwrap(),
            ]
        );
    }

    #[test]
    fn test_spaced_more_units_than_days() {
        let r = range("2024-04-01", "2024-04-10");
        let schedule = plan_spaced(25, &r, DayFilter::All).unwrap();
        assert_eq!(schedule.total(), 25);
        assert_eq!(schedule.entries().len(), 10);
    }

    #[test]
    fn test_zero_total_is_empty() {
        let mut rng = StdRng::seed_from_u64(0);
        let schedule = plan_total(0, &range("2024-01-01", "2024-01-10"), DayFilter::All, &mut rng)
            .unwrap();
        assert!(schedule.is_empty());
    }

    #[test]
    fn test_total_with_no_eligible_days() {
        let mut rng = StdRng::seed_from_u64(0);
        // Mon 2024-01-08 .. Fri 2024-01-12
        let r = range("2024-01-08", "2024-01-12");
        assert!(plan_total(3, &r, DayFilter::Weekends, &mut rng).is_err());
    }

    #[test]
    fn test_fixed_policy_ten_days() {
        let mut rng = StdRng::seed_from_u64(0);
        let r = range("2024-01-01", "2024-01-10");

        let schedule = plan_policy(FrequencyPolicy::Fixed(2), &r, DayFilter::All, &mut rng);

        assert_eq!(schedule.total(), 20);
        assert_eq!(schedule.entries().len(), 10);
        let dates: Vec<_> = schedule.entries().iter().map(|e| e.date).collect();
        assert_eq!(dates, r.days().collect::<Vec<_>>());
        assert!(schedule.entries().iter().all(|e| e.count == 2));
    }

    #[test]
    fn test_weekday_filter_on_two_weeks() {
        let mut rng = StdRng::seed_from_u64(5);
        // Mon 2024-01-01 .. Sun 2024-01-14
        let r = range("2024-01-01", "2024-01-14");
        let policy = FrequencyPolicy::random(1, 4).unwrap();

        let schedule = plan_policy(policy, &r, DayFilter::Weekdays, &mut rng);

        assert_eq!(schedule.entries().len(), 10);
        for entry in schedule.entries() {
            assert!(DayFilter::Weekdays.admits(entry.date));
            assert!((1..=4).contains(&entry.count));
        }
    }

    #[test]
    fn test_weekday_filter_with_total() {
        let mut rng = StdRng::seed_from_u64(5);
        let r = range("2024-01-01", "2024-01-14");

        let schedule = plan(Volume::Total(20), &r, DayFilter::Weekdays, &mut rng).unwrap();

        assert_eq!(schedule.total(), 20);
        assert_eq!(schedule.entries().len(), 10);
        assert!(schedule.entries().iter().all(|e| e.count == 2));
    }
}

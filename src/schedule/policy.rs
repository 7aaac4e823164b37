//! Frequency policies and day filters

use crate::error::{Error, Result};
use chrono::{Datelike, NaiveDate, Weekday};
use rand::Rng;

/// Which days of the week may receive activity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DayFilter {
    /// Every day
    #[default]
    All,
    /// Monday through Friday
    Weekdays,
    /// Saturday and Sunday
    Weekends,
}

impl DayFilter {
    /// Whether `date` passes the filter
    pub fn admits(self, date: NaiveDate) -> bool {
        let weekend = matches!(date.weekday(), Weekday::Sat | Weekday::Sun);
        match self {
            Self::All => true,
            Self::Weekdays => !weekend,
            Self::Weekends => weekend,
        }
    }
}

/// How many units a single admitted day receives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrequencyPolicy {
    /// Always `n`
    Fixed(u32),
    /// Uniform in `[min, max]`, sampled independently per date
    Random {
        /// Inclusive lower bound (at least 1)
        min: u32,
        /// Inclusive upper bound
        max: u32,
    },
}

impl FrequencyPolicy {
    /// Validated fixed policy
    pub fn fixed(n: u32) -> Result<Self> {
        if n < 1 {
            return Err(Error::Config(
                "commits per day must be at least 1".to_string(),
            ));
        }
        Ok(Self::Fixed(n))
    }

    /// Validated random policy
    pub fn random(min: u32, max: u32) -> Result<Self> {
        if min < 1 || max < min {
            return Err(Error::Config(format!(
                "invalid commit range: min {min}, max {max} (need 1 <= min <= max)"
            )));
        }
        Ok(Self::Random { min, max })
    }

    /// Units for `date`; zero when the filter rejects the date.
    ///
    /// Bounds are validated when the policy is built, not here.
    pub fn units_for<R: Rng + ?Sized>(self, date: NaiveDate, filter: DayFilter, rng: &mut R) -> u32 {
        if !filter.admits(date) {
            return 0;
        }
        match self {
            Self::Fixed(n) => n,
            Self::Random { min, max } => rng.random_range(min..=max),
        }
    }
}

/// Requested amount of activity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Volume {
    /// Exactly this many units spread over the range
    Total(usize),
    /// A per-day policy consulted for every admitted day
    PerDay(FrequencyPolicy),
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_day_filter() {
        // 2024-01-06 is a Saturday
        let saturday = date(2024, 1, 6);
        let monday = date(2024, 1, 8);

        assert!(DayFilter::All.admits(saturday));
        assert!(!DayFilter::Weekdays.admits(saturday));
        assert!(DayFilter::Weekdays.admits(monday));
        assert!(DayFilter::Weekends.admits(saturday));
        assert!(!DayFilter::Weekends.admits(monday));
    }

    #[test]
    fn test_fixed_policy_respects_filter() {
        let mut rng = StdRng::seed_from_u64(3);
        let policy = FrequencyPolicy::Fixed(4);

        for d in 1..=14 {
            let day = date(2024, 1, d);
            let expected = if DayFilter::Weekdays.admits(day) { 4 } else { 0 };
            assert_eq!(policy.units_for(day, DayFilter::Weekdays, &mut rng), expected);
            assert_eq!(policy.units_for(day, DayFilter::All, &mut rng), 4);
        }
    }

    #[test]
    fn test_random_policy_bounds_observed() {
        let mut rng = StdRng::seed_from_u64(42);
        let policy = FrequencyPolicy::random(2, 5).unwrap();
        let day = date(2024, 1, 1);

        let samples: Vec<u32> = (0..10_000)
            .map(|_| policy.units_for(day, DayFilter::All, &mut rng))
            .collect();

        assert!(samples.iter().all(|n| (2..=5).contains(n)));
        assert!(samples.contains(&2));
        assert!(samples.contains(&5));
    }

    #[test]
    fn test_random_policy_validation() {
        assert!(FrequencyPolicy::random(0, 3).is_err());
        assert!(FrequencyPolicy::random(4, 3).is_err());
        assert!(FrequencyPolicy::random(3, 3).is_ok());
        assert!(FrequencyPolicy::fixed(0).is_err());
        assert_eq!(FrequencyPolicy::fixed(2).unwrap(), FrequencyPolicy::Fixed(2));
    }
}

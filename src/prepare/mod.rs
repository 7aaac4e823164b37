//! Unit preparation
//!
//! Everything here is pure: no filesystem, no network, no working copy.
//! Functions take the RNG as a parameter so they can run on any worker
//! thread, and tests can seed them.

mod producer;

pub use producer::{GroupSpec, PreparedGroup, groups_for_pulls, groups_for_schedule, spawn_producer};

use crate::catalog::{MessagePool, PR_CATEGORIES, TopicPool};
use crate::types::{Coauthor, PreparedDiscussion, PreparedUnit};
use chrono::{NaiveDate, NaiveTime};
use rand::Rng;
use rand::seq::IndexedRandom;
use std::fmt::Write;

/// Directory (relative to the working-copy root) holding generated files
pub const ACTIVITY_DIR: &str = "history";

/// Earliest hour a generated commit is stamped with
const WORKDAY_START_HOUR: u32 = 9;
/// Latest hour a generated commit is stamped with
const WORKDAY_END_HOUR: u32 = 18;

/// Shared, read-only inputs for preparing commits
#[derive(Debug, Clone)]
pub struct PrepareContext {
    /// Commit messages
    pub messages: MessagePool,
    /// Co-authors to credit (empty for plain commits)
    pub coauthors: Vec<Coauthor>,
}

/// Prepare the content and metadata of one commit
pub fn prepare_unit<R: Rng + ?Sized>(
    date: NaiveDate,
    index: usize,
    ctx: &PrepareContext,
    rng: &mut R,
) -> PreparedUnit {
    let hour = rng.random_range(WORKDAY_START_HOUR..=WORKDAY_END_HOUR);
    let minute = rng.random_range(0..60);
    let second = rng.random_range(0..60);
    let time = NaiveTime::from_hms_opt(hour, minute, second).unwrap_or(NaiveTime::MIN);
    let timestamp = date.and_time(time);

    let message = ctx.messages.pick(rng).to_string();
    let suffix: u32 = rng.random_range(0..1_000_000);
    let file_name = format!(
        "{ACTIVITY_DIR}/{}-{index:05}-{suffix:06}.md",
        date.format("%Y%m%d")
    );

    let content = format!(
        "# Activity {date}\n\n- timestamp: {}\n- entry: {index}\n- note: {message}\n",
        timestamp.format("%Y-%m-%d %H:%M:%S")
    );

    let coauthors = if ctx.coauthors.is_empty() {
        Vec::new()
    } else {
        let amount = rng.random_range(1..=ctx.coauthors.len());
        ctx.coauthors.choose_multiple(rng, amount).cloned().collect()
    };

    PreparedUnit {
        index,
        date,
        file_name,
        content,
        timestamp,
        message,
        coauthors,
    }
}

/// Prepare one discussion from the topic catalog
pub fn prepare_discussion<R: Rng + ?Sized>(
    date: NaiveDate,
    index: usize,
    topics: &TopicPool,
    rng: &mut R,
) -> Option<PreparedDiscussion> {
    let topic = topics.pick(rng)?;
    Some(PreparedDiscussion {
        index,
        date,
        title: topic.title.clone(),
        body: format!(
            "{}\n\n_Originally raised on {}._",
            topic.question,
            date.format("%Y-%m-%d")
        ),
        answer: topic.answer.clone(),
    })
}

/// Feature branch name for a generated PR
pub fn branch_name(category: &str, index: usize, date: NaiveDate) -> String {
    format!("{category}/{index:03}-{}", date.format("%Y%m%d"))
}

/// Branch, title and body for one generated pull request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrDraft {
    /// Feature branch
    pub branch: String,
    /// PR title
    pub title: String,
    /// PR body
    pub body: String,
}

/// Draft the PR that will carry `units`
pub fn draft_pull_request<R: Rng + ?Sized>(
    ordinal: usize,
    date: NaiveDate,
    units: &[PreparedUnit],
    rng: &mut R,
) -> PrDraft {
    let category = PR_CATEGORIES.choose(rng).copied().unwrap_or("feature");
    let subject = units.first().map_or("Update project", |u| u.message.as_str());

    let mut body = format!("Changes from {}:\n\n", date.format("%Y-%m-%d"));
    for unit in units {
        let _ = writeln!(
            body,
            "- {} ({})",
            unit.message,
            unit.timestamp.format("%Y-%m-%d %H:%M")
        );
    }
    let _ = write!(
        body,
        "\nCommits carry their historical dates; the merge is recorded at the time it happens."
    );

    PrDraft {
        branch: branch_name(category, ordinal, date),
        title: format!("{}: {subject}", capitalize(category)),
        body,
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::{DateRange, DayFilter, plan_total};
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::collections::HashSet;

    fn ctx() -> PrepareContext {
        PrepareContext {
            messages: MessagePool::default_catalog(),
            coauthors: vec![],
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_unit_timestamp_on_scheduled_date() {
        let mut rng = StdRng::seed_from_u64(11);
        let day = date(2024, 2, 29);

        for index in 0..200 {
            let unit = prepare_unit(day, index, &ctx(), &mut rng);
            assert_eq!(unit.timestamp.date(), day);
            let hour = unit.timestamp.format("%H").to_string().parse::<u32>().unwrap();
            assert!((WORKDAY_START_HOUR..=WORKDAY_END_HOUR).contains(&hour));
            assert!(unit.file_name.starts_with("history/20240229-"));
            assert!(unit.content.contains(&unit.message));
            assert!(unit.coauthors.is_empty());
        }
    }

    #[test]
    fn test_file_names_unique_across_run() {
        let mut rng = StdRng::seed_from_u64(99);
        let range = DateRange::parse("2024-01-01", "2024-01-20").unwrap();
        let schedule = plan_total(500, &range, DayFilter::All, &mut rng).unwrap();

        let names: HashSet<String> = schedule
            .units()
            .map(|(d, i)| prepare_unit(d, i, &ctx(), &mut rng).file_name)
            .collect();

        assert_eq!(names.len(), 500);
    }

    #[test]
    fn test_coauthors_subset_non_empty() {
        let mut rng = StdRng::seed_from_u64(4);
        let coauthors = vec![
            Coauthor::parse("Ada <ada@example.com>").unwrap(),
            Coauthor::parse("Grace <grace@example.com>").unwrap(),
            Coauthor::parse("Linus <linus@example.com>").unwrap(),
        ];
        let ctx = PrepareContext {
            messages: MessagePool::default_catalog(),
            coauthors: coauthors.clone(),
        };

        for index in 0..50 {
            let unit = prepare_unit(date(2024, 5, 1), index, &ctx, &mut rng);
            assert!(!unit.coauthors.is_empty());
            assert!(unit.coauthors.iter().all(|c| coauthors.contains(c)));
            assert!(unit.commit_message().contains("Co-authored-by: "));
        }
    }

    #[test]
    fn test_branch_name() {
        assert_eq!(branch_name("fix", 7, date(2024, 3, 9)), "fix/007-20240309");
    }

    #[test]
    fn test_draft_pull_request() {
        let mut rng = StdRng::seed_from_u64(2);
        let day = date(2024, 6, 3);
        let units: Vec<_> = (0..2).map(|i| prepare_unit(day, i, &ctx(), &mut rng)).collect();

        let draft = draft_pull_request(4, day, &units, &mut rng);

        assert!(draft.branch.ends_with("/004-20240603"));
        assert!(draft.title.ends_with(&units[0].message));
        assert!(draft.body.starts_with("Changes from 2024-06-03:"));
        assert!(draft.body.contains("merge is recorded at the time it happens"));
    }

    #[test]
    fn test_prepare_discussion() {
        let mut rng = StdRng::seed_from_u64(8);
        let d = prepare_discussion(date(2023, 11, 2), 3, &TopicPool::default_catalog(), &mut rng)
            .unwrap();
        assert_eq!(d.index, 3);
        assert!(d.body.contains("2023-11-02"));
        assert!(!d.answer.is_empty());
    }
}

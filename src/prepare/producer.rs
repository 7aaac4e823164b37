//! Parallel preparation feeding the sequential applier
//!
//! A bounded worker pool prepares units a batch at a time and sends them,
//! grouped and in schedule order, through a bounded channel. The applier is
//! the single consumer; a full channel blocks the workers.

use crate::config::EngineConfig;
use crate::error::{Error, Result};
use crate::prepare::{PrepareContext, prepare_unit};
use crate::schedule::Schedule;
use crate::types::{CommitRange, PreparedUnit};
use chrono::NaiveDate;
use rand::Rng;
use rayon::prelude::*;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

/// A run of units applied together (one date, or one pull request)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroupSpec {
    /// Position of the group in the run
    pub ordinal: usize,
    /// Date every unit in the group is stamped with
    pub date: NaiveDate,
    /// Run-wide index of the group's first unit
    pub first_index: usize,
    /// Units in the group
    pub count: usize,
}

/// A prepared group, units ordered by timestamp
#[derive(Debug, Clone)]
pub struct PreparedGroup {
    /// Position of the group in the run
    pub ordinal: usize,
    /// Group date
    pub date: NaiveDate,
    /// Units in application order
    pub units: Vec<PreparedUnit>,
}

/// One group per scheduled date
pub fn groups_for_schedule(schedule: &Schedule) -> Vec<GroupSpec> {
    let mut first_index = 0;
    schedule
        .entries()
        .iter()
        .enumerate()
        .map(|(ordinal, entry)| {
            let spec = GroupSpec {
                ordinal,
                date: entry.date,
                first_index,
                count: entry.count,
            };
            first_index += entry.count;
            spec
        })
        .collect()
}

/// One group per scheduled pull request, each with a random commit count
pub fn groups_for_pulls<R: Rng + ?Sized>(
    schedule: &Schedule,
    commits: CommitRange,
    rng: &mut R,
) -> Vec<GroupSpec> {
    let mut first_index = 0;
    schedule
        .units()
        .map(|(date, ordinal)| {
            let count = rng.random_range(commits.min..=commits.max) as usize;
            let spec = GroupSpec {
                ordinal,
                date,
                first_index,
                count,
            };
            first_index += count;
            spec
        })
        .collect()
}

/// Start preparing `groups` on a worker pool.
///
/// Returns the receiving end of the bounded queue and the producer handle.
/// Dropping the receiver stops the producer after its current batch.
pub fn spawn_producer(
    groups: Vec<GroupSpec>,
    ctx: PrepareContext,
    config: &EngineConfig,
) -> (mpsc::Receiver<PreparedGroup>, JoinHandle<Result<()>>) {
    let (tx, rx) = mpsc::channel(config.queue_capacity.max(1));
    let batch_size = config.local_batch_size.max(1);
    let workers = config.workers.max(1);

    let handle = tokio::task::spawn_blocking(move || -> Result<()> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("prepare-{i}"))
            .build()
            .map_err(|e| Error::Internal(format!("failed to start worker pool: {e}")))?;

        for batch in batches(&groups, batch_size) {
            let jobs: Vec<(NaiveDate, usize)> = batch
                .iter()
                .flat_map(|g| (g.first_index..g.first_index + g.count).map(move |i| (g.date, i)))
                .collect();

            debug!("Preparing batch of {} units", jobs.len());
            let prepared: Vec<PreparedUnit> = pool.install(|| {
                jobs.par_iter()
                    .map(|(date, index)| prepare_unit(*date, *index, &ctx, &mut rand::rng()))
                    .collect()
            });

            let mut prepared = prepared.into_iter();
            for spec in batch {
                let mut units: Vec<PreparedUnit> = prepared.by_ref().take(spec.count).collect();
                units.sort_by_key(|u| (u.timestamp, u.index));

                let group = PreparedGroup {
                    ordinal: spec.ordinal,
                    date: spec.date,
                    units,
                };
                if tx.blocking_send(group).is_err() {
                    debug!("Applier stopped, halting preparation");
                    return Ok(());
                }
            }
        }

        Ok(())
    });

    (rx, handle)
}

/// Split groups into consecutive slices of roughly `batch_size` units.
/// A group is never split.
fn batches(groups: &[GroupSpec], batch_size: usize) -> Vec<&[GroupSpec]> {
    let mut out = Vec::new();
    let mut start = 0;
    let mut units = 0;

    for (i, group) in groups.iter().enumerate() {
        units += group.count;
        if units >= batch_size {
            out.push(&groups[start..=i]);
            start = i + 1;
            units = 0;
        }
    }
    if start < groups.len() {
        out.push(&groups[start..]);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::MessagePool;
    use crate::schedule::{DateRange, DayFilter, FrequencyPolicy, plan_policy};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn spec(ordinal: usize, count: usize) -> GroupSpec {
        GroupSpec {
            ordinal,
            date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            first_index: 0,
            count,
        }
    }

    #[test]
    fn test_batches_never_split_groups() {
        let groups: Vec<_> = [3, 3, 3, 1, 5].iter().enumerate().map(|(i, c)| spec(i, *c)).collect();
        let out = batches(&groups, 5);
        let sizes: Vec<usize> = out.iter().map(|b| b.len()).collect();
        assert_eq!(sizes, vec![2, 3]);
        assert_eq!(out.iter().map(|b| b.len()).sum::<usize>(), groups.len());
    }

    #[test]
    fn test_groups_for_pulls_counts_in_range() {
        let mut rng = StdRng::seed_from_u64(3);
        let range = DateRange::parse("2024-01-01", "2024-01-31").unwrap();
        let schedule = crate::schedule::plan_spaced(10, &range, DayFilter::All).unwrap();

        let groups = groups_for_pulls(&schedule, CommitRange::new(1, 3).unwrap(), &mut rng);

        assert_eq!(groups.len(), 10);
        assert!(groups.iter().all(|g| (1..=3).contains(&g.count)));
        for w in groups.windows(2) {
            assert_eq!(w[1].first_index, w[0].first_index + w[0].count);
        }
    }

    #[tokio::test]
    async fn test_producer_yields_groups_in_order() {
        let mut rng = StdRng::seed_from_u64(12);
        let range = DateRange::parse("2024-01-01", "2024-01-31").unwrap();
        let schedule = plan_policy(
            FrequencyPolicy::random(1, 6).unwrap(),
            &range,
            DayFilter::All,
            &mut rng,
        );
        let groups = groups_for_schedule(&schedule);
        let ctx = PrepareContext {
            messages: MessagePool::default_catalog(),
            coauthors: vec![],
        };
        let config = EngineConfig {
            local_batch_size: 7,
            queue_capacity: 2,
            workers: 3,
            ..EngineConfig::default()
        };

        let (mut rx, handle) = spawn_producer(groups, ctx, &config);

        let mut received = Vec::new();
        while let Some(group) = rx.recv().await {
            received.push(group);
        }
        handle.await.unwrap().unwrap();

        assert_eq!(received.len(), schedule.entries().len());
        let all: Vec<_> = received.iter().flat_map(|g| g.units.iter()).collect();
        assert_eq!(all.len(), schedule.total());
        assert!(all.windows(2).all(|w| w[0].timestamp <= w[1].timestamp));
    }
}

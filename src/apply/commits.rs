//! Plain commits onto the default branch

use crate::apply::{BatchTracker, Engine, Operation, Phase, RepositoryReport, join_producer};
use crate::error::Result;
use crate::prepare::{PrepareContext, groups_for_schedule, spawn_producer};
use crate::schedule::Schedule;
use crate::types::ActivityRequest;
use tracing::info;

impl Engine<'_> {
    /// Commit every scheduled unit in order, then push once.
    ///
    /// Runs in strict mode, so the first failing commit or the final push
    /// ends the run.
    pub(super) async fn run_commits(
        &self,
        request: &ActivityRequest,
        schedule: &Schedule,
        report: &mut RepositoryReport,
    ) -> Result<()> {
        let mut working_copy = self.materialize(request, report).await?;

        let ctx = PrepareContext {
            messages: request.messages.clone(),
            coauthors: Vec::new(),
        };
        let (mut rx, producer) = spawn_producer(groups_for_schedule(schedule), ctx, &self.config);
        let mut tracker = BatchTracker::new(schedule.total(), self.config.local_batch_size);

        self.progress.on_phase(Phase::Applying).await;
        while let Some(group) = rx.recv().await {
            for unit in &group.units {
                report.attempted += 1;
                let applied = working_copy.apply(unit);
                let ok = applied.is_ok();
                if let Err(e) = applied {
                    self.unit_failure(report, Some(unit.index), Operation::Commit, e)
                        .await?;
                } else {
                    report.succeeded += 1;
                }

                if let Some(batch) = tracker.record(ok) {
                    self.progress.on_batch(&batch).await;
                }
            }
        }
        join_producer(producer).await?;

        self.progress.on_phase(Phase::Pushing).await;
        if let Err(e) = working_copy.push_default() {
            self.unit_failure(report, None, Operation::Push, e).await?;
        }
        info!(
            "{}: pushed {} commits to {}",
            report.name,
            working_copy.applied(),
            working_copy.default_branch()
        );

        self.release(working_copy, report);
        Ok(())
    }
}

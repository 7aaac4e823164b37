//! Pull request flows
//!
//! Each PR gets its own feature branch cut from the default branch. The
//! branch is committed to and pushed, the working copy goes back to the
//! default branch, and only then are the API calls made.

use crate::apply::{
    BatchTracker, Engine, Operation, Pacer, Phase, RepositoryReport, join_producer,
};
use crate::error::{Error, Result};
use crate::platform::HostingService;
use crate::prepare::{PrDraft, PrepareContext, draft_pull_request, groups_for_pulls, spawn_producer};
use crate::repo::WorkingCopy;
use crate::schedule::Schedule;
use crate::types::{
    ActivityRequest, Coauthor, CommitRange, MergeMethod, PrOutcome, PreparedUnit,
    PullRequestRecord,
};
use tracing::{debug, warn};

impl Engine<'_> {
    /// Open and merge one PR per scheduled unit. In best-effort mode API and
    /// push failures are recorded on the PR and the next one proceeds.
    pub(super) async fn run_pulls(
        &self,
        request: &ActivityRequest,
        schedule: &Schedule,
        commits: CommitRange,
        coauthors: &[Coauthor],
        hosting: &dyn HostingService,
        report: &mut RepositoryReport,
    ) -> Result<()> {
        let groups = groups_for_pulls(schedule, commits, &mut rand::rng());
        let mut working_copy = self.materialize(request, report).await?;

        let ctx = PrepareContext {
            messages: request.messages.clone(),
            coauthors: coauthors.to_vec(),
        };
        let mut tracker = BatchTracker::new(groups.len(), self.config.remote_batch_size);
        let mut pacer = Pacer::new(self.config.inter_call_delay);
        let (mut rx, producer) = spawn_producer(groups, ctx, &self.config);

        self.progress.on_phase(Phase::PullRequests).await;
        while let Some(group) = rx.recv().await {
            report.attempted += 1;
            let draft = draft_pull_request(group.ordinal, group.date, &group.units, &mut rand::rng());
            debug!("{}: {} with {} commits", report.name, draft.branch, group.units.len());

            if let Err((operation, e)) = commit_branch(&mut working_copy, &draft, &group.units) {
                self.unit_failure(report, Some(group.ordinal), operation, e)
                    .await?;
                if let Some(batch) = tracker.record(false) {
                    self.progress.on_batch(&batch).await;
                }
                continue;
            }
            let record = self
                .publish(&working_copy, hosting, draft, group.ordinal, &mut pacer, report)
                .await?;

            let merged = record.outcome.is_merged();
            if merged {
                report.succeeded += 1;
            }
            self.progress.on_pull_request(&record).await;
            report.pull_requests.push(record);

            if let Some(batch) = tracker.record(merged) {
                self.progress.on_batch(&batch).await;
            }
        }
        join_producer(producer).await?;

        self.release(working_copy, report);
        Ok(())
    }

    /// Push the branch, return to the default branch, then open and merge
    /// the PR. Errors come back only when the processing mode halts on them.
    async fn publish(
        &self,
        working_copy: &WorkingCopy<'_>,
        hosting: &dyn HostingService,
        draft: PrDraft,
        ordinal: usize,
        pacer: &mut Pacer,
        report: &mut RepositoryReport,
    ) -> Result<PullRequestRecord> {
        let mut record = PullRequestRecord {
            branch: draft.branch,
            number: None,
            html_url: None,
            title: draft.title,
            body: draft.body,
            outcome: PrOutcome::PushFailed,
        };

        let pushed = working_copy.push(&record.branch);
        if let Err(e) = working_copy.checkout_default() {
            self.unit_failure(report, Some(ordinal), Operation::Checkout, e)
                .await?;
            return Ok(record);
        }
        if let Err(e) = pushed {
            self.unit_failure(report, Some(ordinal), Operation::Push, e)
                .await?;
            return Ok(record);
        }

        pacer.ready().await;
        let pr = match hosting
            .create_pr(
                &record.branch,
                working_copy.default_branch(),
                &record.title,
                &record.body,
            )
            .await
        {
            Ok(pr) => pr,
            Err(e) => {
                record.outcome = PrOutcome::CreationFailed;
                self.unit_failure(report, Some(ordinal), Operation::CreatePullRequest, e)
                    .await?;
                return Ok(record);
            }
        };
        record.number = Some(pr.number);
        record.html_url = Some(pr.html_url);

        pacer.ready().await;
        let merged = hosting
            .merge_pr(pr.number, &record.title, MergeMethod::Merge)
            .await;
        record.outcome = match merged {
            Ok(()) => PrOutcome::Merged,
            Err(e) => {
                warn!("Merge of #{} failed, retrying with squash: {e}", pr.number);
                pacer.ready().await;
                let squashed = hosting
                    .merge_pr(pr.number, &record.title, MergeMethod::Squash)
                    .await;
                if let Err(e) = squashed {
                    self.unit_failure(report, Some(ordinal), Operation::MergePullRequest, e)
                        .await?;
                    PrOutcome::MergeFailed
                } else {
                    PrOutcome::MergedViaFallback
                }
            }
        };

        Ok(record)
    }
}

/// Create the PR's branch and commit its units. On failure the working copy
/// is moved back to the default branch before the error is returned with
/// the step that failed.
fn commit_branch(
    working_copy: &mut WorkingCopy<'_>,
    draft: &PrDraft,
    units: &[PreparedUnit],
) -> std::result::Result<(), (Operation, Error)> {
    let outcome = working_copy
        .create_branch(&draft.branch)
        .map_err(|e| (Operation::Checkout, e))
        .and_then(|()| {
            units
                .iter()
                .try_for_each(|unit| working_copy.apply(unit))
                .map_err(|e| (Operation::Commit, e))
        });

    if outcome.is_err() {
        if let Err(e) = working_copy.checkout_default() {
            warn!(
                "Could not return to {} after failure: {e}",
                working_copy.default_branch()
            );
        }
    }
    outcome
}

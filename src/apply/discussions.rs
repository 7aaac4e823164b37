//! Discussions with accepted answers
//!
//! Discussions live entirely on the hosting side, so no working copy is
//! cloned for them.

use crate::apply::{BatchTracker, Engine, Operation, Pacer, Phase, RepositoryReport};
use crate::error::{Error, Result};
use crate::platform::HostingService;
use crate::prepare::prepare_discussion;
use crate::schedule::Schedule;
use crate::types::{ActivityRequest, Discussion, DiscussionCategory, PreparedDiscussion};
use tracing::info;

const DISCUSSIONS_DISABLED: &str = "no discussion categories found; enable Discussions under \
     Settings > General > Features and run again";

impl Engine<'_> {
    pub(super) async fn run_discussions(
        &self,
        request: &ActivityRequest,
        schedule: &Schedule,
        hosting: &dyn HostingService,
        report: &mut RepositoryReport,
    ) -> Result<()> {
        let mut pacer = Pacer::new(self.config.inter_call_delay);
        let mut tracker = BatchTracker::new(schedule.total(), self.config.remote_batch_size);
        self.progress.on_phase(Phase::Discussions).await;

        pacer.ready().await;
        let categories = match hosting.discussion_categories().await {
            Ok(categories) => categories,
            Err(e) => {
                let reason = format!("could not list discussion categories: {e}");
                self.unit_failure(report, None, Operation::FetchCategories, e)
                    .await?;
                report.skipped = Some(reason);
                return Ok(());
            }
        };

        let Some(category) = categories.preferred().cloned() else {
            self.progress
                .on_message(&format!("{}: {DISCUSSIONS_DISABLED}", report.name))
                .await;
            report.skipped = Some(DISCUSSIONS_DISABLED.to_string());
            return Ok(());
        };
        if !category.is_answerable {
            info!(
                "{}: category '{}' does not accept answers, answers will be plain comments",
                report.name, category.name
            );
        }

        for (date, index) in schedule.units() {
            let prepared = prepare_discussion(date, index, &request.topics, &mut rand::rng())
                .ok_or(Error::EmptyCatalog("topic"))?;
            report.attempted += 1;

            let posted = self
                .post_discussion(
                    hosting,
                    &categories.repository_id,
                    &category,
                    &prepared,
                    &mut pacer,
                    report,
                )
                .await?;

            let ok = posted.is_some();
            if let Some(discussion) = posted {
                report.succeeded += 1;
                self.progress.on_discussion(&discussion).await;
                report.discussions.push(discussion);
            }
            if let Some(batch) = tracker.record(ok) {
                self.progress.on_batch(&batch).await;
            }
        }

        Ok(())
    }

    /// Create, answer and accept one discussion. `None` when a step failed
    /// without halting the run.
    async fn post_discussion(
        &self,
        hosting: &dyn HostingService,
        repository_id: &str,
        category: &DiscussionCategory,
        prepared: &PreparedDiscussion,
        pacer: &mut Pacer,
        report: &mut RepositoryReport,
    ) -> Result<Option<Discussion>> {
        let unit = Some(prepared.index);

        pacer.ready().await;
        let discussion = match hosting
            .create_discussion(repository_id, &category.id, &prepared.title, &prepared.body)
            .await
        {
            Ok(discussion) => discussion,
            Err(e) => {
                self.unit_failure(report, unit, Operation::CreateDiscussion, e)
                    .await?;
                return Ok(None);
            }
        };

        pacer.ready().await;
        let comment_id = match hosting
            .add_discussion_comment(&discussion.id, &prepared.answer)
            .await
        {
            Ok(id) => id,
            Err(e) => {
                self.unit_failure(report, unit, Operation::AddComment, e)
                    .await?;
                return Ok(None);
            }
        };

        if category.is_answerable {
            pacer.ready().await;
            if let Err(e) = hosting.mark_discussion_answer(&comment_id).await {
                self.unit_failure(report, unit, Operation::MarkAnswer, e)
                    .await?;
                return Ok(None);
            }
        }

        Ok(Some(discussion))
    }
}

//! Mock hosting service for engine tests

#![allow(dead_code)]

use async_trait::async_trait;
use git_backfill::error::{Error, Result};
use git_backfill::platform::HostingService;
use git_backfill::types::{
    Discussion, DiscussionCategories, DiscussionCategory, MergeMethod, PullRequest,
};
use std::sync::{Arc, Mutex};
use std::sync::atomic::{AtomicU64, Ordering};

/// Call record for `create_pr`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatePrCall {
    pub head: String,
    pub base: String,
    pub title: String,
}

/// Call record for `merge_pr`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeCall {
    pub number: u64,
    pub method: MergeMethod,
}

/// Call record for `create_discussion`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateDiscussionCall {
    pub repository_id: String,
    pub category_id: String,
    pub title: String,
}

/// Hand-written `HostingService` double.
///
/// Features:
/// - Auto-incrementing PR and discussion numbers
/// - Call tracking for verification
/// - Configurable discussion categories
/// - Error injection per operation, optionally only for the nth call
pub struct MockHostingService {
    next_number: AtomicU64,
    categories: Mutex<Vec<DiscussionCategory>>,
    // Call tracking
    create_pr_calls: Mutex<Vec<CreatePrCall>>,
    merge_calls: Mutex<Vec<MergeCall>>,
    create_discussion_calls: Mutex<Vec<CreateDiscussionCall>>,
    comment_calls: Mutex<Vec<String>>,
    mark_answer_calls: Mutex<Vec<String>>,
    // Error injection
    error_on_create_pr: Mutex<Option<Injected>>,
    error_on_merge: Mutex<Vec<MergeMethod>>,
    error_on_categories: Mutex<Option<u16>>,
    error_on_create_discussion: Mutex<Option<Injected>>,
    error_on_mark_answer: Mutex<bool>,
}

/// Failure injected into an operation
#[derive(Debug, Clone, Copy)]
struct Injected {
    status: u16,
    /// Only the call with this zero-based position fails; all calls when None
    only_call: Option<usize>,
}

impl Injected {
    fn hits(self, call: usize) -> Option<Error> {
        if self.only_call.is_none_or(|n| n == call) {
            Some(api_error(self.status))
        } else {
            None
        }
    }
}

fn api_error(status: u16) -> Error {
    Error::Api {
        status: Some(status),
        message: format!("mock failure ({status})"),
    }
}

impl Default for MockHostingService {
    fn default() -> Self {
        Self::new()
    }
}

impl MockHostingService {
    pub fn new() -> Self {
        Self {
            next_number: AtomicU64::new(1),
            categories: Mutex::new(vec![
                category("DIC_general", "General", false),
                category("DIC_qa", "Q&A", true),
            ]),
            create_pr_calls: Mutex::new(Vec::new()),
            merge_calls: Mutex::new(Vec::new()),
            create_discussion_calls: Mutex::new(Vec::new()),
            comment_calls: Mutex::new(Vec::new()),
            mark_answer_calls: Mutex::new(Vec::new()),
            error_on_create_pr: Mutex::new(None),
            error_on_merge: Mutex::new(Vec::new()),
            error_on_categories: Mutex::new(None),
            error_on_create_discussion: Mutex::new(None),
            error_on_mark_answer: Mutex::new(false),
        }
    }

    // === Configuration ===

    /// Replace the repository's discussion categories
    pub fn set_categories(&self, categories: Vec<DiscussionCategory>) {
        *self.categories.lock().unwrap() = categories;
    }

    // === Error injection methods ===

    /// Make the `call`th `create_pr` (zero-based) fail with `status`
    pub fn fail_create_pr_call(&self, call: usize, status: u16) {
        *self.error_on_create_pr.lock().unwrap() = Some(Injected {
            status,
            only_call: Some(call),
        });
    }

    /// Make every merge with `method` fail
    pub fn fail_merge_with(&self, method: MergeMethod) {
        self.error_on_merge.lock().unwrap().push(method);
    }

    /// Make listing discussion categories fail with `status`
    pub fn fail_categories(&self, status: u16) {
        *self.error_on_categories.lock().unwrap() = Some(status);
    }

    /// Make the `call`th `create_discussion` (zero-based) fail with `status`
    pub fn fail_create_discussion_call(&self, call: usize, status: u16) {
        *self.error_on_create_discussion.lock().unwrap() = Some(Injected {
            status,
            only_call: Some(call),
        });
    }

    /// Make every `mark_discussion_answer` fail
    pub fn fail_mark_answer(&self) {
        *self.error_on_mark_answer.lock().unwrap() = true;
    }

    // === Call verification methods ===

    pub fn create_pr_calls(&self) -> Vec<CreatePrCall> {
        self.create_pr_calls.lock().unwrap().clone()
    }

    pub fn merge_calls(&self) -> Vec<MergeCall> {
        self.merge_calls.lock().unwrap().clone()
    }

    pub fn create_discussion_calls(&self) -> Vec<CreateDiscussionCall> {
        self.create_discussion_calls.lock().unwrap().clone()
    }

    pub fn comment_calls(&self) -> Vec<String> {
        self.comment_calls.lock().unwrap().clone()
    }

    pub fn mark_answer_calls(&self) -> Vec<String> {
        self.mark_answer_calls.lock().unwrap().clone()
    }

    fn next(&self) -> u64 {
        self.next_number.fetch_add(1, Ordering::SeqCst)
    }
}

/// Build a discussion category
pub fn category(id: &str, name: &str, is_answerable: bool) -> DiscussionCategory {
    DiscussionCategory {
        id: id.to_string(),
        name: name.to_string(),
        is_answerable,
    }
}

#[async_trait]
impl HostingService for MockHostingService {
    async fn create_pr(
        &self,
        head: &str,
        base: &str,
        title: &str,
        _body: &str,
    ) -> Result<PullRequest> {
        let call = {
            let mut calls = self.create_pr_calls.lock().unwrap();
            calls.push(CreatePrCall {
                head: head.to_string(),
                base: base.to_string(),
                title: title.to_string(),
            });
            calls.len() - 1
        };

        let injected = *self.error_on_create_pr.lock().unwrap();
        if let Some(err) = injected.and_then(|i| i.hits(call)) {
            return Err(err);
        }

        let number = self.next();
        Ok(PullRequest {
            number,
            html_url: format!("https://github.com/octo/sandbox/pull/{number}"),
            base_ref: base.to_string(),
            head_ref: head.to_string(),
            title: title.to_string(),
        })
    }

    async fn merge_pr(&self, number: u64, _title: &str, method: MergeMethod) -> Result<()> {
        self.merge_calls
            .lock()
            .unwrap()
            .push(MergeCall { number, method });

        if self.error_on_merge.lock().unwrap().contains(&method) {
            return Err(api_error(405));
        }
        Ok(())
    }

    async fn discussion_categories(&self) -> Result<DiscussionCategories> {
        if let Some(status) = *self.error_on_categories.lock().unwrap() {
            return Err(api_error(status));
        }
        Ok(DiscussionCategories {
            repository_id: "R_sandbox".to_string(),
            categories: self.categories.lock().unwrap().clone(),
        })
    }

    async fn create_discussion(
        &self,
        repository_id: &str,
        category_id: &str,
        title: &str,
        _body: &str,
    ) -> Result<Discussion> {
        let call = {
            let mut calls = self.create_discussion_calls.lock().unwrap();
            calls.push(CreateDiscussionCall {
                repository_id: repository_id.to_string(),
                category_id: category_id.to_string(),
                title: title.to_string(),
            });
            calls.len() - 1
        };

        let injected = *self.error_on_create_discussion.lock().unwrap();
        if let Some(err) = injected.and_then(|i| i.hits(call)) {
            return Err(err);
        }

        let number = self.next();
        Ok(Discussion {
            id: format!("D_{number}"),
            number,
            url: format!("https://github.com/octo/sandbox/discussions/{number}"),
        })
    }

    async fn add_discussion_comment(&self, discussion_id: &str, _body: &str) -> Result<String> {
        self.comment_calls
            .lock()
            .unwrap()
            .push(discussion_id.to_string());
        Ok(format!("DC_{discussion_id}"))
    }

    async fn mark_discussion_answer(&self, comment_id: &str) -> Result<()> {
        self.mark_answer_calls
            .lock()
            .unwrap()
            .push(comment_id.to_string());

        if *self.error_on_mark_answer.lock().unwrap() {
            return Err(api_error(422));
        }
        Ok(())
    }
}

/// Boxable handle that keeps the mock inspectable after the engine takes
/// ownership of the job
pub struct SharedMock(pub Arc<MockHostingService>);

impl SharedMock {
    pub fn boxed(mock: &Arc<MockHostingService>) -> Box<dyn HostingService> {
        Box::new(Self(Arc::clone(mock)))
    }
}

#[async_trait]
impl HostingService for SharedMock {
    async fn create_pr(&self, head: &str, base: &str, title: &str, body: &str) -> Result<PullRequest> {
        self.0.create_pr(head, base, title, body).await
    }

    async fn merge_pr(&self, number: u64, title: &str, method: MergeMethod) -> Result<()> {
        self.0.merge_pr(number, title, method).await
    }

    async fn discussion_categories(&self) -> Result<DiscussionCategories> {
        self.0.discussion_categories().await
    }

    async fn create_discussion(
        &self,
        repository_id: &str,
        category_id: &str,
        title: &str,
        body: &str,
    ) -> Result<Discussion> {
        self.0
            .create_discussion(repository_id, category_id, title, body)
            .await
    }

    async fn add_discussion_comment(&self, discussion_id: &str, body: &str) -> Result<String> {
        self.0.add_discussion_comment(discussion_id, body).await
    }

    async fn mark_discussion_answer(&self, comment_id: &str) -> Result<()> {
        self.0.mark_discussion_answer(comment_id).await
    }
}

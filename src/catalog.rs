//! Message and topic catalogs
//!
//! Catalogs are flat, ordered lists. An empty catalog is a configuration
//! error raised at construction, never inside the apply loop.

use crate::error::{Error, Result};
use rand::Rng;
use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;

/// Stock commit messages
pub const DEFAULT_COMMIT_MESSAGES: &[&str] = &[
    "Initial commit",
    "Update README",
    "Fix bug",
    "Add feature",
    "Refactor code",
    "Improve performance",
    "Write tests",
    "Update dependencies",
    "Optimize algorithms",
    "Enhance documentation",
    "Fix typo",
    "Merge branch",
    "Remove unused code",
    "Implement authentication",
    "Add logging",
    "Configure CI/CD",
    "Update configuration",
    "Improve UI",
    "Fix security issue",
    "Add unit tests",
    "Update API endpoints",
    "Enhance error handling",
    "Optimize database queries",
    "Add support for new language",
    "Improve scalability",
    "Refactor modules",
    "Update license",
    "Add Docker support",
    "Improve caching",
    "Fix memory leak",
    "Enhance user experience",
];

/// Names handed out, in order, when repositories are created without a name
pub const DEFAULT_REPO_NAMES: &[&str] = &[
    "api-service",
    "data-analysis-project",
    "web-scraper",
    "machine-learning-model",
    "automation-scripts",
    "data-visualization",
    "natural-language-processing",
    "image-processing-toolkit",
    "devops-automation",
    "backend-service",
];

/// PR category tags, used for branch names and titles
pub const PR_CATEGORIES: &[&str] = &["feature", "fix", "docs", "refactor", "chore", "test"];

/// Non-empty pool of commit messages
#[derive(Debug, Clone)]
pub struct MessagePool {
    messages: Arc<[String]>,
}

impl MessagePool {
    /// Build a custom pool; blank entries are dropped
    pub fn new(messages: Vec<String>) -> Result<Self> {
        let messages: Vec<String> = messages
            .into_iter()
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty())
            .collect();
        if messages.is_empty() {
            return Err(Error::EmptyCatalog("commit message"));
        }
        Ok(Self {
            messages: messages.into(),
        })
    }

    /// The built-in message catalog
    pub fn default_catalog() -> Self {
        Self {
            messages: DEFAULT_COMMIT_MESSAGES
                .iter()
                .map(ToString::to_string)
                .collect(),
        }
    }

    /// Load one message per line from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::new(text.lines().map(ToString::to_string).collect())
    }

    /// Draw one message uniformly
    pub fn pick<R: Rng + ?Sized>(&self, rng: &mut R) -> &str {
        // Non-empty by construction
        self.messages.choose(rng).map_or("", String::as_str)
    }

    /// Number of messages
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Always false; kept for API symmetry with `len`
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

/// A discussion topic: title, opening question and accepted answer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topic {
    /// Discussion title
    pub title: String,
    /// Opening question
    pub question: String,
    /// Answer posted as a comment and accepted
    pub answer: String,
}

/// Non-empty pool of discussion topics
#[derive(Debug, Clone)]
pub struct TopicPool {
    topics: Arc<[Topic]>,
}

impl TopicPool {
    /// Build a custom pool
    pub fn new(topics: Vec<Topic>) -> Result<Self> {
        if topics.is_empty() {
            return Err(Error::EmptyCatalog("discussion topic"));
        }
        Ok(Self {
            topics: topics.into(),
        })
    }

    /// The built-in topic catalog
    pub fn default_catalog() -> Self {
        let topics = [
            (
                "How do I configure logging levels?",
                "What is the recommended way to change the log level without rebuilding?",
                "Set the RUST_LOG environment variable, for example RUST_LOG=debug, before starting the service.",
            ),
            (
                "Best practice for running the test suite locally",
                "Some tests need network access. How do you run only the offline ones?",
                "Run the unit tests with the default features; integration tests are behind a feature flag.",
            ),
            (
                "Docker image size",
                "The image is larger than expected. Is there a slimmer base image?",
                "Use the multi-stage build in the Dockerfile; the final stage only copies the binary.",
            ),
            (
                "Upgrading to the latest release",
                "Are there breaking changes between the last two releases?",
                "Only the configuration key for timeouts was renamed; the changelog lists the mapping.",
            ),
            (
                "Contributing guidelines",
                "Where should I start if I want to contribute a fix?",
                "Pick an issue labelled good-first-issue, open a draft PR early and link the issue.",
            ),
            (
                "Handling rate limits from the API",
                "We hit rate limits during bulk imports. Any advice?",
                "Batch the requests and add a short delay between calls; the client retries on 429.",
            ),
        ];

        Self {
            topics: topics
                .into_iter()
                .map(|(title, question, answer)| Topic {
                    title: title.to_string(),
                    question: question.to_string(),
                    answer: answer.to_string(),
                })
                .collect(),
        }
    }

    /// Load topics from a JSON array of `{title, question, answer}` objects
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let topics: Vec<Topic> = serde_json::from_str(&text)
            .map_err(|e| Error::Parse(format!("{}: {e}", path.display())))?;
        Self::new(topics)
    }

    /// Draw one topic uniformly
    pub fn pick<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&Topic> {
        self.topics.choose(rng)
    }

    /// Number of topics
    pub fn len(&self) -> usize {
        self.topics.len()
    }

    /// Always false; kept for API symmetry with `len`
    pub fn is_empty(&self) -> bool {
        self.topics.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::io::Write;

    #[test]
    fn test_empty_message_pool_rejected() {
        let err = MessagePool::new(vec![String::new(), "   ".to_string()]).unwrap_err();
        assert!(matches!(err, Error::EmptyCatalog("commit message")));
    }

    #[test]
    fn test_message_pool_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "Add parser\n\nFix lexer  \n").unwrap();

        let pool = MessagePool::from_file(file.path()).unwrap();
        assert_eq!(pool.len(), 2);

        let mut rng = StdRng::seed_from_u64(7);
        let picked = pool.pick(&mut rng);
        assert!(picked == "Add parser" || picked == "Fix lexer");
    }

    #[test]
    fn test_topic_pool_from_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"title": "T", "question": "Q?", "answer": "A."}}]"#
        )
        .unwrap();

        let pool = TopicPool::from_file(file.path()).unwrap();
        assert_eq!(pool.len(), 1);

        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(pool.pick(&mut rng).unwrap().title, "T");
    }

    #[test]
    fn test_empty_topic_file_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "[]").unwrap();
        assert!(matches!(
            TopicPool::from_file(file.path()),
            Err(Error::EmptyCatalog(_))
        ));
    }

    #[test]
    fn test_default_catalogs_are_populated() {
        assert_eq!(MessagePool::default_catalog().len(), 31);
        assert!(!TopicPool::default_catalog().is_empty());
        assert_eq!(DEFAULT_REPO_NAMES.len(), 10);
    }
}

//! Repository coordinates from clone URLs

use crate::error::{Error, Result};
use crate::types::HostingConfig;
use regex::Regex;
use std::env;
use std::sync::OnceLock;

/// Whether `hostname` is github.com or the configured `GH_HOST`
fn is_github_host(hostname: &str) -> bool {
    let gh_host = env::var("GH_HOST").ok();
    hostname == "github.com"
        || hostname.ends_with(".github.com")
        || gh_host.is_some_and(|h| hostname == h)
}

/// Parse owner/repo (and any Enterprise host) from a clone URL
pub fn parse_repo_info(url: &str) -> Result<HostingConfig> {
    let hostname = extract_hostname(url)
        .ok_or_else(|| Error::Parse(format!("cannot parse remote URL: {url}")))?;
    if !is_github_host(&hostname) {
        return Err(Error::Config(format!(
            "{url} is not a GitHub repository (set GH_HOST for GitHub Enterprise)"
        )));
    }

    // SSH format: git@host:owner/repo.git
    // HTTPS format: https://host/owner/repo.git
    static PATTERNS: OnceLock<(Regex, Regex)> = OnceLock::new();
    let (re_ssh, re_https) = PATTERNS.get_or_init(|| {
        (
            Regex::new(r"git@[^:]+:(.+?)(?:\.git)?/?$").expect("hardcoded regex is valid"),
            Regex::new(r"https?://[^/]+/(.+?)(?:\.git)?/?$").expect("hardcoded regex is valid"),
        )
    });

    let path = re_ssh
        .captures(url)
        .or_else(|| re_https.captures(url))
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
        .ok_or_else(|| Error::Parse(format!("cannot parse remote URL: {url}")))?;

    let Some((owner, repo)) = path.split_once('/') else {
        return Err(Error::Parse(format!("invalid repo path: {path}")));
    };
    if owner.is_empty() || repo.is_empty() || repo.contains('/') {
        return Err(Error::Parse(format!("invalid repo path: {path}")));
    }

    let host = (hostname != "github.com").then_some(hostname);

    Ok(HostingConfig {
        owner: owner.to_string(),
        repo: repo.to_string(),
        host,
    })
}

fn extract_hostname(url: &str) -> Option<String> {
    if let Some(rest) = url.strip_prefix("git@") {
        return rest.split(':').next().map(ToString::to_string);
    }

    url::Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(ToString::to_string))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_https_url() {
        let config = parse_repo_info("https://github.com/octo/api-service.git").unwrap();
        assert_eq!(config.owner, "octo");
        assert_eq!(config.repo, "api-service");
        assert!(config.host.is_none());
    }

    #[test]
    fn test_parse_ssh_url_without_suffix() {
        let config = parse_repo_info("git@github.com:octo/web-scraper").unwrap();
        assert_eq!(config.owner, "octo");
        assert_eq!(config.repo, "web-scraper");
    }

    #[test]
    fn test_rejects_other_hosts() {
        assert!(matches!(
            parse_repo_info("https://gitlab.com/octo/repo.git"),
            Err(Error::Config(_))
        ));
        assert!(parse_repo_info("/tmp/local/repo.git").is_err());
    }

    #[test]
    fn test_rejects_nested_paths() {
        assert!(parse_repo_info("https://github.com/a/b/c.git").is_err());
    }
}

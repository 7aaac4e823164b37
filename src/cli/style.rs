//! Terminal styling
//!
//! Output is colored by [`Role`], never by raw color. Whether color is
//! emitted is decided per stream by `owo-colors` (TTY, `NO_COLOR`,
//! `CLICOLOR_FORCE`).

use git_backfill::types::PrOutcome;
use indicatif::ProgressStyle;
use owo_colors::{OwoColorize, Style};
use std::fmt::{self, Display};
use std::sync::OnceLock;

pub use owo_colors::Stream;

/// What a piece of output means
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Repository names, counts, PR numbers
    Accent,
    /// Merged PRs, answered discussions
    Success,
    /// Fatal errors
    Error,
    /// Skipped repositories, partial results
    Warn,
    /// Dates, URLs, hints
    Muted,
    /// Headers
    Emphasis,
}

impl Role {
    const fn style(self) -> Style {
        match self {
            Self::Accent => Style::new().cyan(),
            Self::Success => Style::new().green(),
            Self::Error => Style::new().red(),
            Self::Warn => Style::new().yellow(),
            Self::Muted => Style::new().dimmed(),
            Self::Emphasis => Style::new().bold(),
        }
    }

    /// Errors and warnings usually go to stderr
    const fn stream(self) -> Stream {
        match self {
            Self::Error | Self::Warn => Stream::Stderr,
            _ => Stream::Stdout,
        }
    }
}

/// A value rendered in its role's style when the stream supports color
#[derive(Clone, Debug)]
pub struct Styled<T> {
    value: T,
    role: Role,
    stream: Stream,
}

impl<T> Styled<T> {
    const fn new(value: T, role: Role) -> Self {
        Self {
            value,
            role,
            stream: role.stream(),
        }
    }

    /// Detect color support on stdout, for warnings printed there
    #[must_use]
    pub const fn for_stdout(mut self) -> Self {
        self.stream = Stream::Stdout;
        self
    }
}

impl<T: Display> Display for Styled<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let style = self.role.style();
        write!(
            f,
            "{}",
            self.value.if_supports_color(self.stream, |v| v.style(style))
        )
    }
}

/// Role-based styling for anything printable
pub trait Stylize: Display {
    /// Style in an explicit role
    fn role(&self, role: Role) -> Styled<&Self> {
        Styled::new(self, role)
    }

    fn accent(&self) -> Styled<&Self> {
        self.role(Role::Accent)
    }

    fn error(&self) -> Styled<&Self> {
        self.role(Role::Error)
    }

    fn warn(&self) -> Styled<&Self> {
        self.role(Role::Warn)
    }

    fn muted(&self) -> Styled<&Self> {
        self.role(Role::Muted)
    }

    fn emphasis(&self) -> Styled<&Self> {
        self.role(Role::Emphasis)
    }
}

impl<T: Display + ?Sized> Stylize for T {}

/// Role a PR outcome is reported in
pub const fn outcome_role(outcome: PrOutcome) -> Role {
    match outcome {
        PrOutcome::Merged => Role::Success,
        PrOutcome::MergedViaFallback => Role::Accent,
        PrOutcome::MergeFailed | PrOutcome::CreationFailed | PrOutcome::PushFailed => Role::Warn,
    }
}

pub const fn check() -> Styled<&'static str> {
    Styled::new("✓", Role::Success)
}

pub const fn cross() -> Styled<&'static str> {
    Styled::new("✗", Role::Error)
}

pub const fn arrow() -> Styled<&'static str> {
    Styled::new("→", Role::Accent)
}

/// Clickable link (OSC 8) showing the URL itself, or the plain URL when the
/// terminal can't render links
pub fn hyperlink_url(stream: Stream, url: &str) -> String {
    let target = match stream {
        Stream::Stdout => supports_hyperlinks::Stream::Stdout,
        Stream::Stderr => supports_hyperlinks::Stream::Stderr,
    };
    if supports_hyperlinks::on(target) {
        terminal_link::Link::new(url, url).to_string()
    } else {
        url.to_string()
    }
}

/// Spinner shown while a repository is being processed
pub fn spinner_style() -> ProgressStyle {
    static STYLE: OnceLock<ProgressStyle> = OnceLock::new();
    STYLE
        .get_or_init(|| {
            ProgressStyle::default_spinner()
                .template("{spinner:.cyan} {prefix:.bold} {msg}")
                .expect("hardcoded spinner template is valid")
                .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏ ")
        })
        .clone()
}

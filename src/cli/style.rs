//! Terminal styling for deploy progress and summaries
//!
//! Every colored span carries a `Tone`. Problems render for stderr, the rest
//! for stdout; `owo-colors` decides per stream whether to emit color, honoring
//! `NO_COLOR` and `CLICOLOR`.

use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::{OwoColorize, Stream, Style};
use std::fmt::{self, Display};
use std::time::Duration;

/// What a piece of output means to the operator
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Tone {
    Accent,
    Success,
    Error,
    Warn,
    Muted,
    Emphasis,
}

impl Tone {
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

    const fn stream(self) -> Stream {
        match self {
            Self::Error | Self::Warn => Stream::Stderr,
            _ => Stream::Stdout,
        }
    }
}

/// A value rendered with a tone when its stream supports color
#[derive(Clone, Debug)]
pub struct Painted<T> {
    value: T,
    tone: Tone,
    stream: Stream,
}

impl<T> Painted<T> {
    const fn new(value: T, tone: Tone) -> Self {
        Self {
            value,
            tone,
            stream: tone.stream(),
        }
    }

    /// Decide color support against stdout, for warnings printed there
    #[must_use]
    pub const fn for_stdout(mut self) -> Self {
        self.stream = Stream::Stdout;
        self
    }
}

impl<T: Display> Display for Painted<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let style = self.tone.style();
        write!(
            f,
            "{}",
            self.value.if_supports_color(self.stream, |v| v.style(style))
        )
    }
}

/// Tone helpers for anything printable
pub trait Stylize: Display {
    /// Tags, branches and run IDs
    fn accent(&self) -> Painted<&Self> {
        Painted::new(self, Tone::Accent)
    }

    /// Completed work
    fn success(&self) -> Painted<&Self> {
        Painted::new(self, Tone::Success)
    }

    /// Failures
    fn error(&self) -> Painted<&Self> {
        Painted::new(self, Tone::Error)
    }

    /// Problems that did not stop the run
    fn warn(&self) -> Painted<&Self> {
        Painted::new(self, Tone::Warn)
    }

    /// Secondary detail
    fn muted(&self) -> Painted<&Self> {
        Painted::new(self, Tone::Muted)
    }

    /// Repositories and headers
    fn emphasis(&self) -> Painted<&Self> {
        Painted::new(self, Tone::Emphasis)
    }
}

impl<T: Display + ?Sized> Stylize for T {}

/// Marks a finished stage
pub const fn check() -> Painted<&'static str> {
    Painted::new("✓", Tone::Success)
}

/// Marks a recorded warning
pub const fn cross() -> Painted<&'static str> {
    Painted::new("✗", Tone::Error)
}

/// Leads the version line of a plan
pub const fn arrow() -> Painted<&'static str> {
    Painted::new("→", Tone::Accent)
}

/// Release or run URL, clickable where the terminal supports OSC 8
pub fn link(url: &str) -> String {
    if supports_hyperlinks::on(supports_hyperlinks::Stream::Stdout) {
        terminal_link::Link::new(url, url).to_string()
    } else {
        url.to_string()
    }
}

/// Spinner shown while a workflow run is polled
pub fn poll_spinner() -> ProgressBar {
    let style = ProgressStyle::with_template("{spinner:.cyan} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
        .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏");
    let spinner = ProgressBar::new_spinner().with_style(style);
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}

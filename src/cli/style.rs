//! Terminal styling helpers
//!
//! Output goes through `anstream`, which strips the escapes when stdout is
//! not a terminal, so styling here is unconditional.

use owo_colors::{OwoColorize, Style, Styled};
use std::fmt::Display;

/// Semantic styles used across commands
pub trait Stylize: Display + Sized {
    /// Secondary text
    fn muted(&self) -> Styled<&Self> {
        self.style(Style::new().dimmed())
    }

    /// Headings and names
    fn emphasis(&self) -> Styled<&Self> {
        self.style(Style::new().bold())
    }

    /// Identifiers: PR numbers, statuses, branches
    fn accent(&self) -> Styled<&Self> {
        self.style(Style::new().cyan())
    }

    /// Completed actions
    fn success(&self) -> Styled<&Self> {
        self.style(Style::new().green())
    }

    /// Failures and skipped work
    fn warn(&self) -> Styled<&Self> {
        self.style(Style::new().yellow())
    }
}

impl<T: Display> Stylize for T {}

/// Check mark for completed steps
pub fn check() -> Styled<&'static str> {
    Style::new().green().style("✓")
}

/// Cross for failed steps
pub fn cross() -> Styled<&'static str> {
    Style::new().red().style("✗")
}

/// Prefix for fatal errors printed by the binary
pub fn error_prefix() -> Styled<&'static str> {
    Style::new().red().bold().style("error:")
}

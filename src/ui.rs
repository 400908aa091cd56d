//! Display formatting for release runs.
//!
//! Pure output helpers plus the cosmetic stage progress bar. Nothing in here
//! participates in control flow.

use std::error::Error;

use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use crate::error::ReleaseError;

/// Format and print an error message in red.
pub fn display_error(message: &str) {
    eprintln!("{} {}", style("ERROR:").red().bold(), message);
}

/// Format and print a success message with green checkmark.
pub fn display_success(message: &str) {
    println!("{} {}", style("✓").green(), message);
}

/// Format and print a status message with yellow arrow.
pub fn display_status(message: &str) {
    println!("{} {}", style("→").yellow(), message);
}

/// Format and print a non-fatal warning.
pub fn display_warning(message: &str) {
    eprintln!("{} {}", style("⚠ WARNING:").yellow(), message);
}

/// Print the single failure summary: the failing step plus every underlying
/// cause in the chain.
pub fn display_failure(error: &ReleaseError) {
    let mut line = error.to_string();
    let mut cause = error.source();
    while let Some(err) = cause {
        line.push_str(&format!(" ({})", err));
        cause = err.source();
    }
    display_error(&line);
}

/// Progress bar ticking once per pipeline stage.
pub fn stage_progress(total_stages: u64) -> ProgressBar {
    let bar = ProgressBar::new(total_stages);
    bar.set_style(
        ProgressStyle::with_template("{bar:40.cyan/blue} {pos}/{len} {msg}")
            .expect("static progress template is valid"),
    );
    bar
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{CommandError, ReleaseError};

    #[test]
    fn test_display_failure_includes_cause_chain() {
        // Visual verification test - also ensures the chain walk terminates
        let err = ReleaseError::step(
            "merge in no fast-forward mode failed",
            ReleaseError::Git {
                command: "merge --no-ff main".to_string(),
                source: CommandError::Exit {
                    code: 1,
                    stderr: "CONFLICT (content)".to_string(),
                },
            },
        );
        display_failure(&err);
    }

    #[test]
    fn test_stage_progress_length() {
        let bar = stage_progress(15);
        assert_eq!(bar.length(), Some(15));
    }
}

//! Display names for steps.
//!
//! The display name is the key shared by step loggers, written timing
//! fields and the averages read back for the progress bar.

use std::sync::LazyLock;

use regex::{Captures, Regex};

static UPPERCASE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[A-Z]").expect("UPPERCASE must compile"));

/// Kebab-case a step identifier.
///
/// A hyphen goes before every uppercase letter that is not the first
/// character and does not already follow a separator, so acronyms split per
/// letter: `checkPrerequisites` → `check-prerequisites`,
/// `runA2BConversion` → `run-a2-b-conversion`.
pub fn step_display_name(id: &str) -> String {
    UPPERCASE
        .replace_all(id, |caps: &Captures| {
            let m = caps.get(0).map(|m| (m.start(), m.as_str()));
            match m {
                Some((0, letter)) => letter.to_string(),
                Some((start, letter)) if id[..start].ends_with(['-', '_', ' ']) => {
                    letter.to_string()
                }
                Some((_, letter)) => format!("-{}", letter),
                None => String::new(),
            }
        })
        .to_lowercase()
}

//! Best-effort masking of personally identifying substrings.
//!
//! Applied to every task description before it is placed in a prompt.
//! The heuristics are blunt: a capitalized verb at the start
//! of a sentence is masked as a name, and a lower-case name slips through.

use std::sync::LazyLock;

use regex::Regex;

// ---------------------------------------------------------------------------
// Placeholders
// ---------------------------------------------------------------------------

pub const EMAIL_PLACEHOLDER: &str = "<email>";
pub const NUMBER_PLACEHOLDER: &str = "<number>";
pub const NAME_PLACEHOLDER: &str = "<name>";

// ---------------------------------------------------------------------------
// Patterns
// ---------------------------------------------------------------------------

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}").expect("valid regex")
});

/// Six or more consecutive ASCII digits (phone numbers, account ids).
static LONG_NUMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[0-9]{6,}").expect("valid regex"));

/// Runs of letters outside the Latin script, whitespace-joined.
static NON_LATIN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[\p{L}&&\P{Latin}]+(?:\s+[\p{L}&&\P{Latin}]+)*").expect("valid regex")
});

static CAPITALIZED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\p{Lu}\p{L}{2,}\b").expect("valid regex"));

/// Mask emails, long digit runs and probable names in `text`.
///
/// Rules run in a fixed order and every placeholder is lower-case ASCII
/// wrapped in angle brackets, so no rule can match a previous rule's
/// output. `redact(redact(x)) == redact(x)` for every input.
pub fn redact(text: &str) -> String {
    let rules: [(&Regex, &str); 4] = [
        (&EMAIL_RE, EMAIL_PLACEHOLDER),
        (&LONG_NUMBER_RE, NUMBER_PLACEHOLDER),
        (&NON_LATIN_RE, NAME_PLACEHOLDER),
        (&CAPITALIZED_RE, NAME_PLACEHOLDER),
    ];

    let mut current = text.to_string();
    for (re, placeholder) in rules {
        current = re.replace_all(&current, placeholder).into_owned();
    }
    current
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

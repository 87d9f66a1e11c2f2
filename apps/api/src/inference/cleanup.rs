//! Post-processing of generated text.
//!
//! Two heuristics, applied in order:
//! 1. Token-list syntax that leaked through extraction (`['He', 'llo']`,
//!   `{'tokens': [...]}`, JSON records) is unwrapped into plain text.
//! 2. Runaway continuations are cut at the first generation cue. When the model
//!   invented a user turn (a line opening with `User:`) right before that cue, the
//!   user text is kept as an illustrative example instead of being dropped.
//!
//! This pass patches model over-generation and can cut legitimate content that
//! happens to contain the cue. It is switchable via `OUTPUT_CLEANUP`.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;

use crate::inference::output::JobOutput;
use crate::inference::prompts::{GENERATION_CUE, USER_MARKER};

pub const EXAMPLE_PREFIX: &str = "Illustrative example: ";

const QUOTED: &str = r#"'(?:[^'\\]|\\.)*'|"(?:[^"\\]|\\.)*""#;

static QUOTED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(QUOTED).expect("quoted-string pattern is valid"));

static BARE_LIST_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"^\[\s*(?:{QUOTED})(?:\s*,\s*(?:{QUOTED}))*\s*,?\s*\]$"
    ))
    .expect("bare list pattern is valid")
});

static TOKENS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r#"['"]tokens['"]\s*:\s*\[((?:\s*(?:{QUOTED})\s*,?)*)\s*\]"#
    ))
    .expect("tokens pattern is valid")
});

/// Runs both cleanup steps and trims the result.
pub fn clean_generation_output(text: &str) -> String {
    let unwrapped = unwrap_token_list(text);
    truncate_runaway_turns(&unwrapped)
}

/// Returns the plain text behind leaked token-list syntax, or the input unchanged.
pub fn unwrap_token_list(text: &str) -> Cow<'_, str> {
    let trimmed = text.trim();
    if !(trimmed.starts_with('[') || trimmed.starts_with('{')) {
        return Cow::Borrowed(text);
    }

    if let Some(caps) = TOKENS_RE.captures(trimmed) {
        return Cow::Owned(join_quoted(&caps[1]));
    }

    if BARE_LIST_RE.is_match(trimmed) {
        return Cow::Owned(join_quoted(trimmed));
    }

    if let Ok(output) = serde_json::from_str::<JobOutput>(trimmed) {
        if !matches!(output, JobOutput::Text(_) | JobOutput::Other(_)) {
            let extracted = output.text();
            if !extracted.is_empty() {
                return Cow::Owned(extracted);
            }
        }
    }

    Cow::Borrowed(text)
}

/// Cuts `text` at the first generation cue.
pub fn truncate_runaway_turns(text: &str) -> String {
    let Some(cue_at) = text.find(GENERATION_CUE) else {
        return text.trim().to_string();
    };
    let head = &text[..cue_at];

    let Some(user_at) = last_turn_start(head, USER_MARKER) else {
        return head.trim().to_string();
    };

    let kept = head[..user_at].trim();
    let user_text = head[user_at + USER_MARKER.len()..].trim();

    match (kept.is_empty(), user_text.is_empty()) {
        (_, true) => kept.to_string(),
        (true, false) => format!("{EXAMPLE_PREFIX}{user_text}"),
        (false, false) => format!("{kept}\n\n{EXAMPLE_PREFIX}{user_text}"),
    }
}

/// Last position where `marker` opens a line, the way prompt turns are laid out.
fn last_turn_start(text: &str, marker: &str) -> Option<usize> {
    text.rmatch_indices(marker)
        .map(|(at, _)| at)
        .find(|&at| at == 0 || text[..at].ends_with('\n'))
}

fn join_quoted(source: &str) -> String {
    QUOTED_RE
        .find_iter(source)
        .map(|m| {
            let quoted = m.as_str();
            unescape(&quoted[1..quoted.len() - 1])
        })
        .collect()
}

fn unescape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some(other @ ('\'' | '"' | '\\')) => out.push(other),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

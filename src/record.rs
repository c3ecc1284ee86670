//! Flat decoded form of one unread message.

use once_cell::sync::Lazy;
use regex::Regex;

static WS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Longest preview shown to the operator, in characters.
pub const PREVIEW_MAX_CHARS: usize = 400;

/// One unread message, decoded and flattened.
///
/// Immutable once built: [`MailRecord::new`] derives `preview` from `body`
/// and nothing mutates the fields afterwards. `id` is the mailbox-assigned
/// UID, meaningful only as a handle back into the mailbox that produced it.
/// Header fields are empty strings when the header is absent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailRecord {
    pub id: String,
    pub from: String,
    pub subject: String,
    pub date: String,
    pub body: String,
    pub preview: String,
}

impl MailRecord {
    pub fn new(id: String, from: String, subject: String, date: String, body: String) -> Self {
        let preview = preview_of(&body);
        Self {
            id,
            from,
            subject,
            date,
            body,
            preview,
        }
    }
}

/// Collapse whitespace runs to single spaces, trim, cap at 400 characters.
///
/// Pure function of the body, so the preview never needs recomputing or
/// separate maintenance.
pub fn preview_of(body: &str) -> String {
    let collapsed = WS_RE.replace_all(body, " ");
    truncate_chars(collapsed.trim(), PREVIEW_MAX_CHARS)
}

/// Truncate to at most `max` characters without splitting a char.
pub fn truncate_chars(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    text.chars().take(max).collect()
}

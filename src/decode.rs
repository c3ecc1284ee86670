//! MIME decoding: raw RFC 822 bytes to a [`MailRecord`].
//!
//! Decoding is best-effort by design. Headers fall back to empty strings,
//! charsets fall back to lossy UTF-8, and a message with no usable text
//! part gets an empty body. Only a message mailparse cannot parse at all
//! is dropped, and the fetch layer skips it with a warning.

use mailparse::{DispositionType, ParsedMail};

use crate::record::MailRecord;

type BodyStrategy = fn(&ParsedMail) -> Option<String>;

/// Body extraction strategies, tried in order until one yields text.
const BODY_STRATEGIES: &[BodyStrategy] = &[plain_text_part, html_part, single_payload];

/// Decode one raw message into a record. `uid` becomes the record id.
pub fn decode(uid: u32, raw: &[u8]) -> Option<MailRecord> {
    let parsed = mailparse::parse_mail(raw).ok()?;
    let from = header(&parsed, "From");
    let subject = header(&parsed, "Subject");
    let date = header(&parsed, "Date");
    let body = BODY_STRATEGIES
        .iter()
        .find_map(|extract| extract(&parsed))
        .unwrap_or_default();
    Some(MailRecord::new(uid.to_string(), from, subject, date, body))
}

/// Decoded header value, or empty string when the header is absent.
fn header(parsed: &ParsedMail, name: &str) -> String {
    parsed
        .headers
        .iter()
        .find(|h| h.get_key_ref().eq_ignore_ascii_case(name))
        .map(|h| h.get_value())
        .unwrap_or_default()
}

/// Collect a part and all nested subparts, depth-first.
fn walk<'a, 'b>(part: &'a ParsedMail<'b>, out: &mut Vec<&'a ParsedMail<'b>>) {
    out.push(part);
    for sub in &part.subparts {
        walk(sub, out);
    }
}

/// First text/plain part of a multipart message that is not a declared
/// attachment.
fn plain_text_part(root: &ParsedMail) -> Option<String> {
    if root.subparts.is_empty() {
        return None;
    }
    let mut parts = Vec::new();
    walk(root, &mut parts);
    parts.iter().find_map(|part| {
        if part.ctype.mimetype == "text/plain"
            && part.get_content_disposition().disposition != DispositionType::Attachment
        {
            part.get_body().ok()
        } else {
            None
        }
    })
}

/// First text/html part of a multipart message.
fn html_part(root: &ParsedMail) -> Option<String> {
    if root.subparts.is_empty() {
        return None;
    }
    let mut parts = Vec::new();
    walk(root, &mut parts);
    parts.iter().find_map(|part| {
        if part.ctype.mimetype == "text/html" {
            part.get_body().ok()
        } else {
            None
        }
    })
}

/// The single payload of a non-multipart message.
fn single_payload(root: &ParsedMail) -> Option<String> {
    if root.subparts.is_empty() {
        root.get_body().ok()
    } else {
        None
    }
}

//! Shared test fixtures and helpers.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use tempfile::TempDir;

use mailferry::record::MailRecord;

/// Build a record the way the decoder would, with a fixed date header.
pub fn record(id: &str, from: &str, subject: &str, body: &str) -> MailRecord {
    MailRecord::new(
        id.to_string(),
        from.to_string(),
        subject.to_string(),
        "Mon, 10 Feb 2025 10:00:00 +0000".to_string(),
        body.to_string(),
    )
}

/// Write a fully-populated config file into `dir` and return its path.
pub fn write_config(dir: &Path) -> PathBuf {
    let path = dir.join(".mailferry.toml");
    let content = r#"[mailbox]
host = "imap.example.com"
port = 993
user = "tester@example.com"
password = "testpassword"

[gateway]
account_sid = "ACtest"
auth_token = "secret"
from = "whatsapp:+14155238886"
to = "whatsapp:+15551234567"
"#;
    std::fs::write(&path, content).unwrap();
    path
}

pub fn temp_dir() -> TempDir {
    TempDir::new().expect("failed to create temp dir")
}

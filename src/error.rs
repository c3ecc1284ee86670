//! Error taxonomy for the mailbox and startup boundaries.

use thiserror::Error;

/// Errors from the IMAP mailbox boundary.
///
/// `Connect` and `Auth` are fatal: without a session there is nothing to do.
/// `Mark` is non-fatal; the caller logs it and moves on, leaving the message
/// unread on the server even though it was already forwarded.
#[derive(Error, Debug)]
pub enum MailboxError {
    /// TCP or TLS setup to the server failed.
    #[error("connection to {host}:{port} failed: {reason}")]
    Connect {
        host: String,
        port: u16,
        reason: String,
    },

    /// The server rejected the credentials.
    #[error("login as {user} rejected: {reason}")]
    Auth { user: String, reason: String },

    /// SELECT or the unread search failed mid-session.
    #[error("unread query failed: {0}")]
    Fetch(String),

    /// The server rejected the seen-flag mutation for one message.
    #[error("could not mark message {id} seen: {reason}")]
    Mark { id: String, reason: String },
}

/// Errors raised while loading or validating configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("config file not found at {0}\nRun 'mailferry init' to create one.")]
    NotFound(String),

    #[error("could not read {path}: {reason}")]
    Read { path: String, reason: String },

    #[error("invalid config in {path}: {reason}")]
    Parse { path: String, reason: String },

    /// One line naming every missing setting, so a bad config is fixed in
    /// one round trip instead of one error at a time.
    #[error("missing required settings: {}", .0.join(", "))]
    Missing(Vec<String>),

    #[error("secret command failed: {0}")]
    SecretCmd(String),
}

//! IMAP mailbox access: unread retrieval and seen-flag mutation.

use imap::Session;
use native_tls::TlsStream;
use std::net::TcpStream;

use crate::config::MailboxConfig;
use crate::decode;
use crate::error::MailboxError;
use crate::record::MailRecord;

/// Mailbox operations the forwarding session needs.
///
/// The session owns one implementation for its whole lifetime; nothing else
/// touches the connection.
pub trait Mailbox {
    /// Fetch the current unread set, oldest-first as reported by the
    /// server. A message that cannot be fetched or parsed is skipped, never
    /// an error.
    fn fetch_unseen(&mut self) -> Result<Vec<MailRecord>, MailboxError>;

    /// Set the seen flag on one message. Idempotent on the server side.
    fn mark_seen(&mut self, id: &str) -> Result<(), MailboxError>;

    /// Release the session. Errors are swallowed.
    fn close(&mut self);
}

type ImapSession = Session<TlsStream<TcpStream>>;

/// Production mailbox over an authenticated IMAP session.
pub struct ImapMailbox {
    session: ImapSession,
}

impl ImapMailbox {
    /// Connect and authenticate.
    pub fn connect(mailbox: &MailboxConfig, password: &str) -> Result<Self, MailboxError> {
        let host = mailbox.host.as_str();
        let port = mailbox.port;

        let mut tls_builder = native_tls::TlsConnector::builder();
        if mailbox.starttls || host == "127.0.0.1" || host == "localhost" {
            tls_builder.danger_accept_invalid_certs(true);
            tls_builder.danger_accept_invalid_hostnames(true);
        }
        let tls = tls_builder.build().map_err(|e| MailboxError::Connect {
            host: host.to_string(),
            port,
            reason: e.to_string(),
        })?;

        let client = if mailbox.starttls {
            imap::connect_starttls((host, port), host, &tls)
        } else {
            imap::connect((host, port), host, &tls)
        }
        .map_err(|e| MailboxError::Connect {
            host: host.to_string(),
            port,
            reason: e.to_string(),
        })?;

        let session = client
            .login(&mailbox.user, password)
            .map_err(|(e, _)| MailboxError::Auth {
                user: mailbox.user.clone(),
                reason: e.to_string(),
            })?;

        Ok(Self { session })
    }
}

impl Mailbox for ImapMailbox {
    fn fetch_unseen(&mut self) -> Result<Vec<MailRecord>, MailboxError> {
        self.session
            .select("INBOX")
            .map_err(|e| MailboxError::Fetch(e.to_string()))?;

        let uid_set = self
            .session
            .uid_search("UNSEEN")
            .map_err(|e| MailboxError::Fetch(e.to_string()))?;
        let mut uids: Vec<u32> = uid_set.into_iter().collect();
        uids.sort_unstable();

        let mut records = Vec::with_capacity(uids.len());
        for uid in uids {
            // PEEK keeps the fetch from setting the seen flag; only a
            // successful forward may do that.
            let fetches = match self.session.uid_fetch(uid.to_string(), "BODY.PEEK[]") {
                Ok(f) => f,
                Err(e) => {
                    eprintln!("  Warning: fetch of UID {} failed: {}", uid, e);
                    continue;
                }
            };
            let fetch = match fetches.iter().next() {
                Some(f) => f,
                None => continue,
            };
            let raw = match fetch.body() {
                Some(b) => b,
                None => continue,
            };
            match decode::decode(uid, raw) {
                Some(record) => records.push(record),
                None => eprintln!("  Warning: could not parse message UID {}, skipped", uid),
            }
        }
        Ok(records)
    }

    fn mark_seen(&mut self, id: &str) -> Result<(), MailboxError> {
        self.session
            .uid_store(id, "+FLAGS (\\Seen)")
            .map_err(|e| MailboxError::Mark {
                id: id.to_string(),
                reason: e.to_string(),
            })?;
        Ok(())
    }

    fn close(&mut self) {
        // Logout errors are non-fatal. Some servers (e.g. ProtonMail
        // Bridge) return responses the imap crate cannot parse at logout.
        let _ = self.session.logout();
    }
}

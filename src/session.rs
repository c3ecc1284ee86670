//! Interactive forwarding session: poll, present, select, dispatch,
//! acknowledge.
//!
//! The session owns the mailbox connection, the gateway client, and the
//! operator's I/O for its whole lifetime. The operator prompt is the only
//! blocking point; everything else runs strictly sequentially, one record
//! at a time.

use anyhow::Result;
use std::io::{BufRead, Write};
use std::path::Path;

use crate::config;
use crate::gateway::{DispatchOutcome, Dispatcher, TwilioGateway};
use crate::mailbox::{ImapMailbox, Mailbox};
use crate::record::{truncate_chars, MailRecord};
use crate::select::{select, Choice};

/// Most records shown in one listing.
const LISTING_MAX: usize = 10;
/// Body characters included in one dispatched payload.
const PAYLOAD_BODY_MAX_CHARS: usize = 1000;

/// What the operator asked for at the choice prompt.
enum ChoiceToken {
    Refresh,
    Quit,
    Select(Choice),
}

pub struct ForwardingSession<M, G, R, W> {
    mailbox: M,
    gateway: G,
    input: R,
    output: W,
}

impl<M: Mailbox, G: Dispatcher, R: BufRead, W: Write> ForwardingSession<M, G, R, W> {
    pub fn new(mailbox: M, gateway: G, input: R, output: W) -> Self {
        Self {
            mailbox,
            gateway,
            input,
            output,
        }
    }

    /// Run the session to completion. The mailbox connection is released
    /// on every exit path.
    pub fn run(&mut self) -> Result<()> {
        loop {
            writeln!(self.output, "\nFetching unread messages...")?;
            // A failed poll is reported and treated as an empty set; only
            // connect/login failures end the session, and those happen
            // before it starts.
            let records = match self.mailbox.fetch_unseen() {
                Ok(records) => records,
                Err(e) => {
                    writeln!(self.output, "Fetch failed: {}", e)?;
                    Vec::new()
                }
            };
            self.render_listing(&records)?;

            let choice = match self.await_choice(records.is_empty())? {
                ChoiceToken::Quit => break,
                ChoiceToken::Refresh => continue,
                ChoiceToken::Select(choice) => choice,
            };

            let selected = select(&records, choice);
            writeln!(self.output, "\nSelected {} message(s) to send:", selected.len())?;
            for (i, record) in selected.iter().enumerate() {
                writeln!(
                    self.output,
                    " {}. Subject: {} | From: {}",
                    i + 1,
                    truncate_chars(&record.subject, 80),
                    record.from
                )?;
            }

            let confirm = self.prompt("Send these now? (y/n): ")?;
            if confirm == "y" {
                self.dispatch_batch(selected)?;
            } else {
                writeln!(self.output, "Cancelled. Nothing was sent.")?;
            }

            let cont = self.prompt("\nContinue polling? (y to continue, anything else quits): ")?;
            if cont != "y" {
                break;
            }
        }
        writeln!(self.output, "Bye.")?;
        self.mailbox.close();
        Ok(())
    }

    /// Render the unread set: up to the 10 most recent records, numbered
    /// by their position in the full set, plus the option menu.
    fn render_listing(&mut self, records: &[MailRecord]) -> Result<()> {
        writeln!(self.output, "Found {} unread message(s).", records.len())?;
        if records.is_empty() {
            writeln!(self.output, "No unread messages right now.")?;
        } else {
            let start = records.len().saturating_sub(LISTING_MAX);
            for (i, record) in records.iter().enumerate().skip(start) {
                writeln!(
                    self.output,
                    "[{}] From: {}, Subject: {}",
                    i + 1,
                    record.from,
                    truncate_chars(&record.subject, 60)
                )?;
                writeln!(self.output, "     Date: {}", display_date(&record.date))?;
                writeln!(
                    self.output,
                    "     Preview: {}",
                    truncate_chars(&record.preview, 120)
                )?;
            }
            writeln!(self.output, "\nOptions:")?;
            writeln!(self.output, " 1 - send the last unread message")?;
            writeln!(self.output, " 2 - send the last three unread messages")?;
            writeln!(self.output, " 3 - send all unread messages")?;
        }
        writeln!(self.output, " r - refresh")?;
        writeln!(self.output, " q - quit")?;
        Ok(())
    }

    /// Prompt until the operator produces a usable token. With an empty
    /// unread set only refresh and quit are accepted.
    fn await_choice(&mut self, empty: bool) -> Result<ChoiceToken> {
        loop {
            let token = self.prompt("\nEnter option (1/2/3/r/q): ")?;
            match token.as_str() {
                "q" => return Ok(ChoiceToken::Quit),
                "r" => return Ok(ChoiceToken::Refresh),
                other => {
                    if empty {
                        writeln!(self.output, "No unread messages to send. Refresh or quit.")?;
                        continue;
                    }
                    match Choice::parse(other) {
                        Some(choice) => return Ok(ChoiceToken::Select(choice)),
                        None => writeln!(self.output, "Invalid option. Try again.")?,
                    }
                }
            }
        }
    }

    /// Dispatch the selected records in order, marking each seen only
    /// after its own delivery succeeds. One record's outcome never blocks
    /// the next.
    fn dispatch_batch(&mut self, selected: &[MailRecord]) -> Result<()> {
        for (i, record) in selected.iter().enumerate() {
            writeln!(
                self.output,
                "\nSending {}/{} -> Subject: {}",
                i + 1,
                selected.len(),
                truncate_chars(&record.subject, 60)
            )?;
            let payload = build_payload(record);
            match self.gateway.send(&payload) {
                DispatchOutcome::Delivered { delivery_id } => {
                    writeln!(self.output, "Delivered ({})", delivery_id)?;
                    if let Err(e) = self.mailbox.mark_seen(&record.id) {
                        // Delivered but still unread on the server: it will
                        // be offered again on the next poll.
                        writeln!(self.output, "Warning: {}", e)?;
                    }
                }
                DispatchOutcome::Failed { reason, code } => {
                    match code {
                        Some(code) => {
                            writeln!(self.output, "Send failed: {} (code {})", reason, code)?
                        }
                        None => writeln!(self.output, "Send failed: {}", reason)?,
                    }
                    writeln!(self.output, "Message left unread.")?;
                }
            }
        }
        Ok(())
    }

    /// Write a prompt and read one trimmed, lowercased token. EOF on the
    /// operator's input reads as quit.
    fn prompt(&mut self, text: &str) -> Result<String> {
        write!(self.output, "{}", text)?;
        self.output.flush()?;
        let mut line = String::new();
        let n = self.input.read_line(&mut line)?;
        if n == 0 {
            return Ok("q".to_string());
        }
        Ok(line.trim().to_lowercase())
    }

    /// Tear the session apart for inspection.
    pub fn into_parts(self) -> (M, G, R, W) {
        (self.mailbox, self.gateway, self.input, self.output)
    }
}

/// Render one record into the text handed to the gateway: a short header
/// block, then the body capped at a transport-safe length.
pub fn build_payload(record: &MailRecord) -> String {
    format!(
        "From: {}\nSubject: {}\nDate: {}\n\n{}",
        record.from,
        record.subject,
        record.date,
        truncate_chars(&record.body, PAYLOAD_BODY_MAX_CHARS)
    )
}

/// Render a Date header for the listing, falling back to the raw value
/// when it does not parse.
fn display_date(raw: &str) -> String {
    if let Ok(dt) = chrono::DateTime::parse_from_rfc2822(raw) {
        return dt.format("%Y-%m-%d %H:%M").to_string();
    }
    if let Ok(ts) = mailparse::dateparse(raw) {
        if let Some(dt) = chrono::DateTime::from_timestamp(ts, 0) {
            return dt.format("%Y-%m-%d %H:%M").to_string();
        }
    }
    raw.to_string()
}

/// mailferry forward
pub fn run(config_path: Option<&Path>) -> Result<()> {
    let config = config::load(config_path)?;
    let password = config::resolve_password(&config.mailbox)?;
    let auth_token = config::resolve_auth_token(&config.gateway)?;

    println!(
        "Connecting to {}:{} as {}",
        config.mailbox.host, config.mailbox.port, config.mailbox.user
    );
    let mailbox = ImapMailbox::connect(&config.mailbox, &password)?;
    let gateway = TwilioGateway::new(&config.gateway, &auth_token);

    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    let mut session = ForwardingSession::new(mailbox, gateway, stdin.lock(), stdout.lock());
    session.run()
}

/// mailferry list
pub fn list(config_path: Option<&Path>) -> Result<()> {
    let config = config::load(config_path)?;
    let password = config::resolve_password(&config.mailbox)?;

    println!(
        "Connecting to {}:{} as {}",
        config.mailbox.host, config.mailbox.port, config.mailbox.user
    );
    let mut mailbox = ImapMailbox::connect(&config.mailbox, &password)?;
    let records = mailbox.fetch_unseen()?;
    mailbox.close();

    println!("Found {} unread message(s).", records.len());
    for (i, record) in records.iter().enumerate() {
        println!(
            "[{}] From: {}, Subject: {}",
            i + 1,
            record.from,
            truncate_chars(&record.subject, 60)
        );
        println!("     Date: {}", display_date(&record.date));
        println!("     Preview: {}", truncate_chars(&record.preview, 120));
    }
    Ok(())
}

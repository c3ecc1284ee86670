//! Write a starter config file.

use anyhow::{bail, Result};
use std::path::Path;

use crate::config::CONFIG_FILE_NAME;

const TEMPLATE: &str = r#"# mailferry configuration
#
# Fill in both sections, then run 'mailferry forward'.
# Any value left empty falls back to the matching environment variable
# (EMAIL_HOST, EMAIL_USER, EMAIL_PASS, TWILIO_ACCOUNT_SID,
# TWILIO_AUTH_TOKEN, TWILIO_FROM, TWILIO_TO).

[mailbox]
host = "imap.example.com"
port = 993
starttls = false
user = "you@example.com"
# Either an inline password or a command that prints it
password = ""
password_cmd = ""

[gateway]
account_sid = ""
# Either an inline token or a command that prints it
auth_token = ""
auth_token_cmd = ""
# Sender and recipient identities, e.g. "whatsapp:+14155238886"
from = ""
to = ""
"#;

/// mailferry init [PATH] [--force]
pub fn run(path: &Path, force: bool) -> Result<()> {
    let target = path.join(CONFIG_FILE_NAME);
    if target.exists() && !force {
        bail!(
            "{} already exists (use --force to overwrite)",
            target.display()
        );
    }
    std::fs::create_dir_all(path)?;
    std::fs::write(&target, TEMPLATE)?;
    println!("Wrote {}", target.display());
    println!("Fill in the [mailbox] and [gateway] sections, then run 'mailferry forward'.");
    Ok(())
}

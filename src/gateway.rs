//! Messaging gateway dispatch over the Twilio Messages REST API.

use anyhow::{bail, Result};
use serde::Deserialize;
use std::path::Path;

use crate::config::{self, GatewayConfig};

/// Result of one dispatch attempt. Never retried automatically.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The gateway accepted the message and assigned a delivery id.
    Delivered { delivery_id: String },
    /// The gateway or transport rejected the message. `code` is the
    /// gateway's numeric error code when its error body carried one.
    Failed { reason: String, code: Option<u32> },
}

/// One-way text dispatch to a fixed recipient.
pub trait Dispatcher {
    /// Send one text payload. Failures come back as
    /// [`DispatchOutcome::Failed`], not `Err`, so one bad record cannot
    /// abort a batch.
    fn send(&mut self, text: &str) -> DispatchOutcome;
}

pub const DEFAULT_BASE_URL: &str = "https://api.twilio.com";

#[derive(Deserialize)]
struct MessageResponse {
    sid: Option<String>,
}

#[derive(Deserialize)]
struct ErrorResponse {
    message: Option<String>,
    code: Option<u32>,
}

/// Production dispatcher: form-encoded POST to the Messages endpoint with
/// basic auth, addressed from the configured sender identity to the
/// configured recipient.
pub struct TwilioGateway {
    agent: ureq::Agent,
    url: String,
    auth_header: String,
    from: String,
    to: String,
}

impl TwilioGateway {
    pub fn new(gateway: &GatewayConfig, auth_token: &str) -> Self {
        let base = if gateway.base_url.is_empty() {
            DEFAULT_BASE_URL
        } else {
            gateway.base_url.as_str()
        };
        let url = format!(
            "{}/2010-04-01/Accounts/{}/Messages.json",
            base.trim_end_matches('/'),
            gateway.account_sid
        );
        let auth_header = basic_auth(&gateway.account_sid, auth_token);
        Self {
            agent: ureq::agent(),
            url,
            auth_header,
            from: gateway.from.clone(),
            to: gateway.to.clone(),
        }
    }
}

impl Dispatcher for TwilioGateway {
    fn send(&mut self, text: &str) -> DispatchOutcome {
        let result = self
            .agent
            .post(&self.url)
            .set("Authorization", &self.auth_header)
            .send_form(&[
                ("From", self.from.as_str()),
                ("To", self.to.as_str()),
                ("Body", text),
            ]);

        match result {
            Ok(resp) => match resp.into_json::<MessageResponse>() {
                Ok(MessageResponse { sid: Some(sid) }) => DispatchOutcome::Delivered {
                    delivery_id: sid,
                },
                Ok(MessageResponse { sid: None }) => DispatchOutcome::Failed {
                    reason: "gateway response carried no message sid".to_string(),
                    code: None,
                },
                Err(e) => DispatchOutcome::Failed {
                    reason: format!("unreadable gateway response: {}", e),
                    code: None,
                },
            },
            Err(ureq::Error::Status(status, resp)) => match resp.into_json::<ErrorResponse>() {
                Ok(err) => DispatchOutcome::Failed {
                    reason: err.message.unwrap_or_else(|| format!("HTTP {}", status)),
                    code: err.code,
                },
                Err(_) => DispatchOutcome::Failed {
                    reason: format!("HTTP {}", status),
                    code: None,
                },
            },
            Err(e) => DispatchOutcome::Failed {
                reason: e.to_string(),
                code: None,
            },
        }
    }
}

/// mailferry send-test
pub fn send_test(config_path: Option<&Path>, message: &str) -> Result<()> {
    let config = config::load(config_path)?;
    let auth_token = config::resolve_auth_token(&config.gateway)?;
    let mut gateway = TwilioGateway::new(&config.gateway, &auth_token);
    println!("Sending test message to {}", config.gateway.to);
    match gateway.send(message) {
        DispatchOutcome::Delivered { delivery_id } => {
            println!("Delivered ({})", delivery_id);
            Ok(())
        }
        DispatchOutcome::Failed { reason, code } => match code {
            Some(code) => bail!("send failed: {} (code {})", reason, code),
            None => bail!("send failed: {}", reason),
        },
    }
}

/// Build a basic HTTP Authorization header value.
fn basic_auth(user: &str, pass: &str) -> String {
    format!("Basic {}", base64_encode(format!("{}:{}", user, pass).as_bytes()))
}

/// Minimal base64 encoder (avoids pulling in a base64 crate for one header).
fn base64_encode(input: &[u8]) -> String {
    const CHARS: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";
    let mut result = String::with_capacity(input.len().div_ceil(3) * 4);
    for chunk in input.chunks(3) {
        let b0 = chunk[0] as u32;
        let b1 = if chunk.len() > 1 { chunk[1] as u32 } else { 0 };
        let b2 = if chunk.len() > 2 { chunk[2] as u32 } else { 0 };
        let triple = (b0 << 16) | (b1 << 8) | b2;
        result.push(CHARS[((triple >> 18) & 0x3F) as usize] as char);
        result.push(CHARS[((triple >> 12) & 0x3F) as usize] as char);
        if chunk.len() > 1 {
            result.push(CHARS[((triple >> 6) & 0x3F) as usize] as char);
        } else {
            result.push('=');
        }
        if chunk.len() > 2 {
            result.push(CHARS[(triple & 0x3F) as usize] as char);
        } else {
            result.push('=');
        }
    }
    result
}

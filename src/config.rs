//! Configuration: .mailferry.toml plus environment-variable fallback.
//!
//! Resolution order for the config file:
//!   1. explicit --config path (missing file is an error)
//!   2. .mailferry.toml in the current directory
//!   3. {user_config_dir}/mailferry/config.toml
//!
//! Fields left empty by the file (or with no file at all) are filled from
//! the environment: EMAIL_HOST, EMAIL_PORT, EMAIL_USER, EMAIL_PASS,
//! TWILIO_ACCOUNT_SID, TWILIO_AUTH_TOKEN, TWILIO_FROM, TWILIO_TO.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::ConfigError;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub mailbox: MailboxConfig,
    #[serde(default)]
    pub gateway: GatewayConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailboxConfig {
    #[serde(default)]
    pub host: String,
    #[serde(default = "default_imap_port")]
    pub port: u16,
    #[serde(default)]
    pub starttls: bool,
    #[serde(default)]
    pub user: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub password_cmd: String,
}

fn default_imap_port() -> u16 {
    993
}

impl Default for MailboxConfig {
    fn default() -> Self {
        Self {
            host: String::new(),
            port: 993,
            starttls: false,
            user: String::new(),
            password: String::new(),
            password_cmd: String::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct GatewayConfig {
    #[serde(default)]
    pub account_sid: String,
    #[serde(default)]
    pub auth_token: String,
    #[serde(default)]
    pub auth_token_cmd: String,
    #[serde(default)]
    pub from: String,
    #[serde(default)]
    pub to: String,
    /// Override for tests and regional endpoints. Empty means the gateway
    /// default.
    #[serde(default)]
    pub base_url: String,
}

/// Config file name looked up in the current directory.
pub const CONFIG_FILE_NAME: &str = ".mailferry.toml";

/// Return the OS-native mailferry config file path.
fn user_config_path() -> PathBuf {
    if let Some(proj_dirs) = directories::ProjectDirs::from("", "", "mailferry") {
        proj_dirs.config_dir().join("config.toml")
    } else {
        PathBuf::from(CONFIG_FILE_NAME)
    }
}

/// Load config from `path` (or the resolved default locations), fill gaps
/// from the environment, and validate.
pub fn load(path: Option<&Path>) -> Result<Config, ConfigError> {
    let mut config = match path {
        Some(p) => {
            if !p.exists() {
                return Err(ConfigError::NotFound(p.display().to_string()));
            }
            read_file(p)?
        }
        None => {
            let local = PathBuf::from(CONFIG_FILE_NAME);
            let user = user_config_path();
            if local.exists() {
                read_file(&local)?
            } else if user.exists() {
                read_file(&user)?
            } else {
                Config::default()
            }
        }
    };
    apply_env(&mut config);
    config.validate()?;
    Ok(config)
}

fn read_file(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;
    toml::from_str(&content).map_err(|e| ConfigError::Parse {
        path: path.display().to_string(),
        reason: e.to_string(),
    })
}

fn env_fill(field: &mut String, var: &str) {
    if field.is_empty() {
        if let Ok(value) = std::env::var(var) {
            *field = value;
        }
    }
}

/// Fill empty fields from the environment. Ports override only when the
/// variable parses.
fn apply_env(config: &mut Config) {
    env_fill(&mut config.mailbox.host, "EMAIL_HOST");
    env_fill(&mut config.mailbox.user, "EMAIL_USER");
    env_fill(&mut config.mailbox.password, "EMAIL_PASS");
    if let Ok(port) = std::env::var("EMAIL_PORT") {
        if let Ok(port) = port.parse() {
            config.mailbox.port = port;
        }
    }
    env_fill(&mut config.gateway.account_sid, "TWILIO_ACCOUNT_SID");
    env_fill(&mut config.gateway.auth_token, "TWILIO_AUTH_TOKEN");
    env_fill(&mut config.gateway.from, "TWILIO_FROM");
    env_fill(&mut config.gateway.to, "TWILIO_TO");
}

impl Config {
    /// Every setting the session needs, checked up front so startup fails
    /// once with the full list instead of partway through a connect.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut missing = Vec::new();
        if self.mailbox.host.is_empty() {
            missing.push("mailbox.host".to_string());
        }
        if self.mailbox.user.is_empty() {
            missing.push("mailbox.user".to_string());
        }
        if self.mailbox.password.is_empty() && self.mailbox.password_cmd.is_empty() {
            missing.push("mailbox.password (or mailbox.password_cmd)".to_string());
        }
        if self.gateway.account_sid.is_empty() {
            missing.push("gateway.account_sid".to_string());
        }
        if self.gateway.auth_token.is_empty() && self.gateway.auth_token_cmd.is_empty() {
            missing.push("gateway.auth_token (or gateway.auth_token_cmd)".to_string());
        }
        if self.gateway.from.is_empty() {
            missing.push("gateway.from".to_string());
        }
        if self.gateway.to.is_empty() {
            missing.push("gateway.to".to_string());
        }
        if missing.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Missing(missing))
        }
    }
}

/// Run a secret command through the shell, returning trimmed stdout.
fn run_secret_cmd(cmd: &str) -> Result<String, ConfigError> {
    let output = std::process::Command::new("sh")
        .arg("-c")
        .arg(cmd)
        .output()
        .map_err(|e| ConfigError::SecretCmd(e.to_string()))?;
    if !output.status.success() {
        return Err(ConfigError::SecretCmd(
            String::from_utf8_lossy(&output.stderr).trim().to_string(),
        ));
    }
    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

/// Resolve the mailbox password: inline value if set, else password_cmd.
pub fn resolve_password(mailbox: &MailboxConfig) -> Result<String, ConfigError> {
    if !mailbox.password.is_empty() {
        return Ok(mailbox.password.clone());
    }
    run_secret_cmd(&mailbox.password_cmd)
}

/// Resolve the gateway auth token: inline value if set, else auth_token_cmd.
pub fn resolve_auth_token(gateway: &GatewayConfig) -> Result<String, ConfigError> {
    if !gateway.auth_token.is_empty() {
        return Ok(gateway.auth_token.clone());
    }
    run_secret_cmd(&gateway.auth_token_cmd)
}

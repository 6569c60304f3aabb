use config::{Config as ConfigBuilder, ConfigError, Environment, File};
use lettre::message::Mailbox;
use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub email: EmailConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Largest accepted request body, attachments included
    pub max_body_bytes: usize,
}

#[derive(Debug, Deserialize, Clone)]
pub struct EmailConfig {
    #[serde(default)]
    pub sender_email: String,
    #[serde(default)]
    pub sender_password: String,
    pub receiver_email: String,
    pub smtp_server: String,
    pub smtp_port: u16,
}

impl EmailConfig {
    pub fn sender_mailbox(&self) -> Result<Mailbox, String> {
        self.sender_email
            .parse()
            .map_err(|e| format!("Invalid sender email {:?}: {e}", self.sender_email))
    }

    pub fn receiver_mailbox(&self) -> Result<Mailbox, String> {
        self.receiver_email
            .parse()
            .map_err(|e| format!("Invalid receiver email {:?}: {e}", self.receiver_email))
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    /// `pretty` or `json`
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

/// Environment variables read without prefix, mapped to their config keys
const LEGACY_ENV: [(&str, &str); 5] = [
    ("SENDER_EMAIL", "email.sender_email"),
    ("SENDER_PASSWORD", "email.sender_password"),
    ("RECEIVER_EMAIL", "email.receiver_email"),
    ("SMTP_SERVER", "email.smtp_server"),
    ("SMTP_PORT", "email.smtp_port"),
];

impl Config {
    /// Load configuration from file and environment variables
    ///
    /// Priority (highest to lowest):
    /// 1. Legacy environment variables (SENDER_EMAIL, SMTP_PORT, etc.)
    /// 2. Prefixed environment variables (FORMRELAY__EMAIL__SMTP_SERVER, etc.)
    /// 3. Config file specified by path
    /// 4. Hardcoded defaults
    pub fn load(config_path: Option<String>) -> Result<Self, ConfigError> {
        let mut builder = ConfigBuilder::builder();

        builder = builder
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 5000)?
            .set_default("server.max_body_bytes", 25 * 1024 * 1024)?
            .set_default("email.receiver_email", "submissions@example.com")?
            .set_default("email.smtp_server", "smtp.gmail.com")?
            .set_default("email.smtp_port", 587)?;

        let config_file_path = config_path
            .or_else(|| env::var("CONFIG_PATH").ok())
            .unwrap_or_else(|| "config/default.toml".to_string());

        // The file is optional
        if std::path::Path::new(&config_file_path).exists() {
            builder = builder.add_source(File::with_name(&config_file_path));
        }

        builder = builder.add_source(
            Environment::with_prefix("FORMRELAY")
                .separator("__")
                .try_parsing(true),
        );

        for (var, key) in LEGACY_ENV {
            if let Ok(value) = env::var(var) {
                builder = builder.set_override(key, value)?;
            }
        }

        builder.build()?.try_deserialize()
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.server.port == 0 {
            return Err("Server port must be greater than 0".to_string());
        }
        if self.server.max_body_bytes == 0 {
            return Err("Server max_body_bytes must be greater than 0".to_string());
        }
        if self.email.sender_email.is_empty() {
            return Err("SENDER_EMAIL must be set".to_string());
        }
        if self.email.sender_password.is_empty() {
            return Err("SENDER_PASSWORD must be set".to_string());
        }
        if self.email.smtp_server.is_empty() {
            return Err("SMTP server must not be empty".to_string());
        }
        if self.email.smtp_port == 0 {
            return Err("SMTP port must be greater than 0".to_string());
        }
        self.email.sender_mailbox()?;
        self.email.receiver_mailbox()?;
        Ok(())
    }
}

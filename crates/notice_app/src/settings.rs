//! Environment-driven settings for one watcher run.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context};
use log::LevelFilter;
use notice_core::KeywordFilter;
use notice_engine::EmailSettings;
use notice_logging::{parse_level, LogDestination};

const DEFAULT_KEYWORDS: &str = "바이오,헬스,임상";
const DEFAULT_CONFIG_FILE: &str = "config.json";
const DEFAULT_PERSIST_FILE: &str = "sent_titles.json";
const DEFAULT_SMTP_HOST: &str = "smtp.gmail.com";
const DEFAULT_SMTP_PORT: u16 = 465;
const DEFAULT_WEBHOOK_TIMEOUT_SECS: u64 = 20;

#[derive(Debug, Clone)]
pub struct AppSettings {
    pub keywords: KeywordFilter,
    pub config_file: PathBuf,
    pub persist_file: PathBuf,
    pub email: Option<EmailSettings>,
    pub webhook_url: Option<String>,
    pub webhook_timeout: Duration,
    pub chrome_path: Option<PathBuf>,
    pub log_destination: LogDestination,
    pub log_level: LevelFilter,
}

impl AppSettings {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let raw_keywords = var("KEYWORDS").unwrap_or_else(|| DEFAULT_KEYWORDS.to_string());
        let keywords = KeywordFilter::parse(&raw_keywords);
        if keywords.is_empty() {
            bail!("KEYWORDS contains no usable keyword");
        }

        let email = match (var("EMAIL_ADDRESS"), var("EMAIL_PASSWORD")) {
            (Some(address), Some(password)) => {
                let mut email = EmailSettings::self_addressed(address.trim(), password);
                email.smtp_host =
                    var("SMTP_HOST").unwrap_or_else(|| DEFAULT_SMTP_HOST.to_string());
                email.smtp_port = match var("SMTP_PORT") {
                    Some(port) => port
                        .trim()
                        .parse()
                        .with_context(|| format!("SMTP_PORT '{port}' is not a port number"))?,
                    None => DEFAULT_SMTP_PORT,
                };
                Some(email)
            }
            (None, None) => None,
            _ => bail!("EMAIL_ADDRESS and EMAIL_PASSWORD must be set together"),
        };

        let webhook_url = var("WEBHOOK_URL").map(|url| url.trim().to_string());
        if email.is_none() && webhook_url.is_none() {
            bail!(
                "no notification channel configured: set EMAIL_ADDRESS/EMAIL_PASSWORD or WEBHOOK_URL"
            );
        }

        let webhook_timeout = match var("WEBHOOK_TIMEOUT_SECS") {
            Some(secs) => Duration::from_secs(secs.trim().parse().with_context(|| {
                format!("WEBHOOK_TIMEOUT_SECS '{secs}' is not a number of seconds")
            })?),
            None => Duration::from_secs(DEFAULT_WEBHOOK_TIMEOUT_SECS),
        };

        let log_destination = match var("NOTICE_LOG") {
            Some(value) => value.parse().map_err(anyhow::Error::msg)?,
            None => LogDestination::Terminal,
        };

        Ok(Self {
            keywords,
            config_file: var("CONFIG_FILE")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE)),
            persist_file: var("PERSIST_FILE")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_PERSIST_FILE)),
            email,
            webhook_url,
            webhook_timeout,
            chrome_path: var("CHROME_PATH").map(PathBuf::from),
            log_destination,
            log_level: var("NOTICE_LOG_LEVEL")
                .map(|level| parse_level(&level))
                .unwrap_or(LevelFilter::Info),
        })
    }
}

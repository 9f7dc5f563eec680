use std::{env, path::PathBuf, str::FromStr, time::Duration};

use crate::{Error, Result};

/// API origin baked in at build time; runtime env still wins.
pub const DEFAULT_API_BASE: &str = match option_env!("HMSTORES_API_BASE") {
    Some(url) => url,
    None => "https://hmstoresapi.eposh.io.vn",
};

pub const DEFAULT_UPLOAD_PATH: &str = "/api/v1/upload";
pub const DEFAULT_SESSION_FILE: &str = "session.json";
pub const DEFAULT_PAGE_SIZE: u32 = 9;
pub const DEFAULT_NOTICE_TTL_SECONDS: u64 = 3;
pub const DEFAULT_PREVIEW_LEN: usize = 150;

#[derive(Debug, Clone)]
pub struct Config {
    pub api_base: String,
    /// Prefix glued in front of the relative paths the upload endpoint returns.
    pub media_base: String,
    pub upload_path: String,
    pub session_file: PathBuf,
    pub page_size: u32,
    pub notice_ttl: Duration,
    pub preview_len: usize,
}

impl Config {
    pub fn init() -> Result<Config> {
        dotenv::dotenv().ok();

        let api_base = env::var("HMSTORES_API_BASE").unwrap_or_else(|_| DEFAULT_API_BASE.to_string());
        let mut config = Config::new(&api_base)?;

        if let Ok(media_base) = env::var("HMSTORES_MEDIA_BASE") {
            config.media_base = media_base;
        }
        if let Ok(upload_path) = env::var("HMSTORES_UPLOAD_PATH") {
            config.upload_path = upload_path;
        }
        if let Ok(session_file) = env::var("HMSTORES_SESSION_FILE") {
            config.session_file = PathBuf::from(session_file);
        }

        config.page_size = parse_var("HMSTORES_PAGE_SIZE", DEFAULT_PAGE_SIZE)?;
        if config.page_size == 0 {
            return Err(Error::Config("HMSTORES_PAGE_SIZE must be greater than 0".to_string()));
        }
        config.notice_ttl = Duration::from_secs(parse_var(
            "HMSTORES_NOTICE_TTL_SECONDS",
            DEFAULT_NOTICE_TTL_SECONDS,
        )?);
        config.preview_len = parse_var("HMSTORES_PREVIEW_LEN", DEFAULT_PREVIEW_LEN)?;

        tracing::debug!(api_base = %config.api_base, "blog client configured");
        Ok(config)
    }

    pub fn new(api_base: &str) -> Result<Config> {
        let api_base = api_base.trim().trim_end_matches('/');
        if api_base.is_empty() {
            return Err(Error::Config("API base URL cannot be empty".to_string()));
        }

        Ok(Config {
            api_base: api_base.to_string(),
            media_base: format!("{api_base}/"),
            upload_path: DEFAULT_UPLOAD_PATH.to_string(),
            session_file: PathBuf::from(DEFAULT_SESSION_FILE),
            page_size: DEFAULT_PAGE_SIZE,
            notice_ttl: Duration::from_secs(DEFAULT_NOTICE_TTL_SECONDS),
            preview_len: DEFAULT_PREVIEW_LEN,
        })
    }

    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.api_base, path)
    }

    pub fn upload_url(&self) -> String {
        self.endpoint(&self.upload_path)
    }

    pub fn media_url(&self, relative_path: &str) -> String {
        format!("{}{}", self.media_base, relative_path)
    }
}

fn parse_var<T: FromStr>(name: &str, default: T) -> Result<T> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| Error::Config(format!("{name} has an invalid value: {raw}"))),
        Err(_) => Ok(default),
    }
}

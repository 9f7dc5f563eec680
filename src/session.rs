use std::{fmt, path::PathBuf};

use serde_json::{Map, Value};

use crate::{Config, Error, Result};

/// Key the token is persisted under in session storage.
pub const SESSION_KEY: &str = "accessToken";

#[derive(Clone, PartialEq, Eq)]
pub struct BearerToken(String);

impl BearerToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `Authorization` header value.
    pub fn header_value(&self) -> String {
        format!("Bearer {}", self.0)
    }
}

impl fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("BearerToken(***)")
    }
}

/// Read-only credential handed to controllers. A new one is produced only
/// by an explicit login or logout.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    pub token: Option<BearerToken>,
}

impl Session {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn authenticated(token: BearerToken) -> Self {
        Self { token: Some(token) }
    }

    pub fn token(&self) -> Option<&BearerToken> {
        self.token.as_ref()
    }
}

/// JSON-backed session storage.
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.session_file.clone())
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }

    pub async fn load(&self) -> Result<Session> {
        let entries = self.read_entries().await?;
        let token = entries
            .get(SESSION_KEY)
            .and_then(Value::as_str)
            .filter(|token| !token.trim().is_empty())
            .map(BearerToken::new);

        tracing::debug!(authenticated = token.is_some(), "session loaded");
        Ok(Session { token })
    }

    pub async fn login(&self, token: BearerToken) -> Result<Session> {
        let mut entries = self.read_entries().await?;
        entries.insert(SESSION_KEY.to_string(), Value::String(token.as_str().to_string()));
        self.write_entries(&entries).await?;
        tracing::info!("session token stored");
        Ok(Session::authenticated(token))
    }

    pub async fn logout(&self) -> Result<Session> {
        let mut entries = self.read_entries().await?;
        if entries.remove(SESSION_KEY).is_some() {
            self.write_entries(&entries).await?;
            tracing::info!("session token cleared");
        }
        Ok(Session::anonymous())
    }

    async fn read_entries(&self) -> Result<Map<String, Value>> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Map::new()),
            Err(err) => return Err(err.into()),
        };

        if raw.trim().is_empty() {
            return Ok(Map::new());
        }

        match serde_json::from_str::<Value>(&raw) {
            Ok(Value::Object(entries)) => Ok(entries),
            Ok(_) => Err(Error::Session(format!(
                "{} does not hold a JSON object",
                self.path.display()
            ))),
            Err(err) => Err(Error::Session(err.to_string())),
        }
    }

    async fn write_entries(&self, entries: &Map<String, Value>) -> Result<()> {
        let raw = serde_json::to_string_pretty(entries)
            .map_err(|err| Error::Session(err.to_string()))?;
        tokio::fs::write(&self.path, raw).await?;
        Ok(())
    }
}

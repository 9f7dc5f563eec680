use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::{Error, Result};

pub const STATUS_OK: i64 = 200;

/// `{statusCode, message, data}` wrapper around every API answer.
#[derive(Debug, Serialize, Deserialize)]
pub struct Envelope<T> {
    #[serde(rename = "statusCode")]
    pub status_code: Option<i64>,
    pub message: Option<String>,
    pub data: Option<T>,
}

impl<T> Envelope<T> {
    /// Only `statusCode == 200` counts as success; a missing code does not.
    pub fn check(&self) -> Result<()> {
        if self.status_code == Some(STATUS_OK) {
            return Ok(());
        }

        Err(Error::Logic {
            status_code: self.status_code,
            message: self.message.clone(),
        })
    }

    pub fn into_data(self) -> Result<T> {
        self.check()?;
        self.data
            .ok_or_else(|| Error::Decode("envelope has no data".to_string()))
    }
}

impl<T: DeserializeOwned> Envelope<T> {
    pub fn parse(body: &str) -> Result<Self> {
        Ok(serde_json::from_str(body)?)
    }
}

/// Acknowledgement for calls whose `data` carries nothing the client uses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ack {
    pub message: Option<String>,
}

impl Envelope<serde_json::Value> {
    pub fn into_ack(self) -> Result<Ack> {
        self.check()?;
        Ok(Ack {
            message: self.message,
        })
    }
}

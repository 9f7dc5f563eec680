use std::time::{Duration, Instant};

use crate::{Error, ErrorKind};

/// Transient banner raised by a controller after a failed operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: ErrorKind,
    pub message: String,
    pub raised_at: Instant,
}

impl Notice {
    pub fn from_error(err: &Error) -> Self {
        Self {
            kind: err.kind(),
            message: err.user_message(),
            raised_at: Instant::now(),
        }
    }

    pub fn is_expired(&self, ttl: Duration) -> bool {
        self.raised_at.elapsed() >= ttl
    }
}

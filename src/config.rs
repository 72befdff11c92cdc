use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::domains::Direction;
use crate::error::{KexError, Result};
use crate::kex::DEFAULT_POLL;

/// Budget a caller gives a whole exchange before giving up.
pub const GLOBAL_TIMEOUT: Duration = Duration::from_secs(5 * 60);

const DEFAULT_CONNECT_TIMEOUT_SECONDS: u64 = 3;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiConfig {
    pub base_url: String,
    pub session_token: Option<String>,
    pub connect_timeout_seconds: Option<u64>,
}

impl ApiConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(
            self.connect_timeout_seconds
                .unwrap_or(DEFAULT_CONNECT_TIMEOUT_SECONDS),
        )
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ReceiverConfig {
    pub poll_seconds: Option<u64>,
    pub direction: Option<String>,
    pub global_timeout_seconds: Option<u64>,
}

impl ReceiverConfig {
    pub fn poll(&self) -> Duration {
        self.poll_seconds
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_POLL)
    }

    pub fn direction(&self) -> Result<Direction> {
        match self.direction.as_deref() {
            None => Ok(Direction::YtoX),
            Some(value) => Direction::from_name(value)
                .ok_or_else(|| KexError::Config(format!("unknown direction {value:?}"))),
        }
    }

    pub fn global_timeout(&self) -> Duration {
        self.global_timeout_seconds
            .map(Duration::from_secs)
            .unwrap_or(GLOBAL_TIMEOUT)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct KexConfig {
    pub api: ApiConfig,
    #[serde(default)]
    pub receiver: ReceiverConfig,
}

impl KexConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content =
            fs::read_to_string(path.as_ref()).map_err(|e| KexError::Config(e.to_string()))?;
        let config: KexConfig =
            serde_json::from_str(&content).map_err(|e| KexError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.api.base_url.trim().is_empty() {
            return Err(KexError::Config("api.base_url is empty".to_string()));
        }
        if self.receiver.poll_seconds == Some(0) {
            return Err(KexError::Config(
                "receiver.poll_seconds must be positive".to_string(),
            ));
        }
        self.receiver.direction()?;
        Ok(())
    }
}

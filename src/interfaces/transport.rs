use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domains::{Direction, Seqno, WeakId};
use crate::error::Result;

/// One record as the relay returned it, not yet decoded or verified.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawRecord(pub Value);

/// Parameters of a single long-poll on a channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub weak_id: WeakId,
    pub direction: Direction,
    /// First seqno the caller has not seen.
    pub low: Seqno,
    pub poll: Duration,
}

impl FetchRequest {
    pub fn poll_seconds(&self) -> u64 {
        self.poll.as_secs()
    }

    pub fn query(&self) -> Vec<(&'static str, String)> {
        vec![
            ("w", self.weak_id.to_hex()),
            ("dir", self.direction.as_i64().to_string()),
            ("low", self.low.to_string()),
            ("poll", self.poll_seconds().to_string()),
        ]
    }
}

#[async_trait]
pub trait ChannelFetcher: Send + Sync {
    /// Blocks until the relay has records at or above `request.low` or the
    /// poll elapses, in which case the result is empty.
    async fn fetch(&self, request: &FetchRequest) -> Result<Vec<RawRecord>>;
}

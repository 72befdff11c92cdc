use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use tokio::sync::Notify;
use tokio::time::Instant;

use crate::domains::{Direction, Seqno, WeakId};
use crate::error::{KexError, Result};
use crate::interfaces::transport::{ChannelFetcher, FetchRequest, RawRecord};

type QueueKey = (WeakId, Direction);

struct StoredRecord {
    seqno: Seqno,
    record: RawRecord,
}

/// In-process stand-in for the relay. Records are kept per channel and
/// direction in arrival order and served with the same long-poll contract
/// as the HTTP endpoint.
pub struct MemoryRelay {
    queues: Mutex<HashMap<QueueKey, Vec<StoredRecord>>>,
    notify: Notify,
}

impl MemoryRelay {
    pub fn new() -> Self {
        Self {
            queues: Mutex::new(HashMap::new()),
            notify: Notify::new(),
        }
    }

    /// Stores a record under the channel, direction and seqno it names.
    pub fn post(&self, record: RawRecord) -> Result<()> {
        let field = |name: &str| {
            record
                .0
                .get(name)
                .cloned()
                .ok_or_else(|| KexError::Decode(format!("record without {name}")))
        };
        let seqno: Seqno = serde_json::from_value(field("seqno")?)
            .map_err(|e| KexError::Decode(e.to_string()))?;
        let direction: Direction = serde_json::from_value(field("dir")?)
            .map_err(|e| KexError::Decode(e.to_string()))?;
        let weak_id: WeakId = serde_json::from_value(field("w")?)
            .map_err(|e| KexError::Decode(e.to_string()))?;
        self.inject(weak_id, direction, seqno, record)
    }

    /// Stores an arbitrary record, which need not be well formed.
    pub fn inject(
        &self,
        weak_id: WeakId,
        direction: Direction,
        seqno: Seqno,
        record: RawRecord,
    ) -> Result<()> {
        let mut queues = self
            .queues
            .lock()
            .map_err(|_| KexError::Runtime("relay queue locked".to_string()))?;
        queues
            .entry((weak_id, direction))
            .or_default()
            .push(StoredRecord { seqno, record });
        drop(queues);
        self.notify.notify_waiters();
        Ok(())
    }

    pub fn pending(&self, weak_id: WeakId, direction: Direction) -> Result<usize> {
        let queues = self
            .queues
            .lock()
            .map_err(|_| KexError::Runtime("relay queue locked".to_string()))?;
        Ok(queues.get(&(weak_id, direction)).map_or(0, Vec::len))
    }

    fn collect(&self, request: &FetchRequest) -> Result<Vec<RawRecord>> {
        let queues = self
            .queues
            .lock()
            .map_err(|_| KexError::Runtime("relay queue locked".to_string()))?;
        Ok(queues
            .get(&(request.weak_id, request.direction))
            .map(|records| {
                records
                    .iter()
                    .filter(|stored| stored.seqno >= request.low)
                    .map(|stored| stored.record.clone())
                    .collect()
            })
            .unwrap_or_default())
    }
}

impl Default for MemoryRelay {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ChannelFetcher for MemoryRelay {
    async fn fetch(&self, request: &FetchRequest) -> Result<Vec<RawRecord>> {
        let deadline = Instant::now() + request.poll;
        loop {
            let notified = self.notify.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            let records = self.collect(request)?;
            if !records.is_empty() {
                return Ok(records);
            }
            if tokio::time::timeout_at(deadline, notified).await.is_err() {
                return Ok(Vec::new());
            }
        }
    }
}

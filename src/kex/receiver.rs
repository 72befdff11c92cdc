use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, warn};

use crate::domains::{Direction, Message, MessageBody, Meta, Seqno};
use crate::error::{KexError, Result};
use crate::interfaces::handler::KexHandler;
use crate::interfaces::importer::MessageImporter;
use crate::interfaces::transport::{ChannelFetcher, FetchRequest};

pub const DEFAULT_POLL: Duration = Duration::from_secs(20);

/// Long-polls the relay for one direction of a channel and routes messages
/// to a [`KexHandler`].
///
/// A receiver is driven by one caller at a time; `receive` takes `&mut self`
/// and the seqno cursor only ever moves forward.
pub struct Receiver {
    handler: Arc<dyn KexHandler>,
    fetcher: Arc<dyn ChannelFetcher>,
    importer: Arc<dyn MessageImporter>,
    seqno: Seqno,
    poll: Duration,
    direction: Direction,
}

impl Receiver {
    pub fn new(
        handler: Arc<dyn KexHandler>,
        fetcher: Arc<dyn ChannelFetcher>,
        importer: Arc<dyn MessageImporter>,
        direction: Direction,
    ) -> Self {
        Self {
            handler,
            fetcher,
            importer,
            seqno: 0,
            poll: DEFAULT_POLL,
            direction,
        }
    }

    pub fn with_poll(mut self, poll: Duration) -> Self {
        self.poll = poll;
        self
    }

    /// Highest seqno dispatched so far; 0 before the first message.
    pub fn cursor(&self) -> Seqno {
        self.seqno
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn poll(&self) -> Duration {
        self.poll
    }

    /// Fetches the next batch and dispatches its lowest-seqno message.
    ///
    /// Only the first message of a batch is handled; the rest are fetched
    /// again on the next call since the request starts past the cursor.
    /// Returns `Ok(())` without dispatching when the poll came back empty.
    pub async fn receive(&mut self, meta: &mut Meta) -> Result<()> {
        let messages = self.fetch_ordered(meta).await?;
        self.dispatch(meta, messages).await
    }

    /// `receive` bounded by a caller-owned deadline.
    ///
    /// The deadline covers the long-poll only. Once a message is selected the
    /// handler runs to completion, since the cursor has already moved past it.
    pub async fn receive_until(&mut self, meta: &mut Meta, deadline: Instant) -> Result<()> {
        let messages = tokio::time::timeout_at(deadline, self.fetch_ordered(meta))
            .await
            .map_err(|_| KexError::Timeout)??;
        self.dispatch(meta, messages).await
    }

    async fn dispatch(&mut self, meta: &mut Meta, messages: Vec<Message>) -> Result<()> {
        let Some(message) = messages.into_iter().next() else {
            return Ok(());
        };

        self.seqno = self.seqno.max(message.seqno);
        meta.sender = message.sender;
        meta.receiver = message.receiver;
        debug!(
            seqno = message.seqno,
            kind = %message.kind(),
            "dispatching kex message"
        );

        match message.body {
            MessageBody::StartSession { strong_id } => {
                self.handler.start_session(meta, strong_id).await
            }
            MessageBody::StartReverseSession => self.handler.start_reverse_session(meta).await,
            MessageBody::Hello {
                device_id,
                device_key_id,
            } => self.handler.hello(meta, device_id, device_key_id).await,
            MessageBody::PleaseSign {
                signing_key,
                sig,
                device_type,
                device_desc,
            } => {
                self.handler
                    .please_sign(meta, signing_key, sig, device_type, device_desc)
                    .await
            }
            MessageBody::Done { merkle_triple } => self.handler.done(meta, merkle_triple).await,
            MessageBody::Unknown(name) => Err(KexError::UnknownMessageKind(name)),
        }
    }

    /// One long-poll, decoded, with unauthenticated records and records at or
    /// below the cursor dropped, and the rest sorted by seqno.
    pub async fn fetch_ordered(&self, meta: &Meta) -> Result<Vec<Message>> {
        let request = FetchRequest {
            weak_id: meta.weak_id,
            direction: self.direction,
            low: self.seqno.saturating_add(1),
            poll: self.poll,
        };
        debug!(
            w = %request.weak_id,
            dir = request.direction.as_i64(),
            low = request.low,
            poll = request.poll_seconds(),
            "polling kex channel"
        );
        let records = self.fetcher.fetch(&request).await?;

        let mut messages = Vec::with_capacity(records.len());
        for record in &records {
            match self.importer.import(record) {
                Ok(message) if message.seqno <= self.seqno => {
                    debug!(
                        seqno = message.seqno,
                        cursor = self.seqno,
                        "skipping stale kex message"
                    );
                }
                Ok(message) => messages.push(message),
                Err(err) if err.is_mac_mismatch() => {
                    warn!("Received message with bad HMAC. Ignoring it.");
                }
                Err(err) => return Err(err),
            }
        }

        // Stable, so equal seqnos keep arrival order.
        messages.sort_by_key(|message| message.seqno);
        Ok(messages)
    }
}

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use kex_relay::domains::{
    DeviceId, Direction, KeyId, MerkleTriple, Message, MessageBody, Meta, Secret, Seqno, StrongId,
};
use kex_relay::error::{KexError, Result};
use kex_relay::interfaces::handler::KexHandler;
use kex_relay::interfaces::transport::{ChannelFetcher, FetchRequest, RawRecord};
use kex_relay::kex::{MessageCodec, Receiver};

pub const DEVICE_X: DeviceId = DeviceId([0x0a; 16]);
pub const DEVICE_Y: DeviceId = DeviceId([0x0b; 16]);

pub fn secret() -> Secret {
    Secret::new([0x42; 32])
}

/// Fetcher that hands out prepared batches in order, then empty polls.
pub struct ScriptedFetcher {
    batches: Mutex<VecDeque<Result<Vec<RawRecord>>>>,
    pub requests: Mutex<Vec<FetchRequest>>,
}

impl ScriptedFetcher {
    pub fn new(batches: Vec<Result<Vec<RawRecord>>>) -> Self {
        Self {
            batches: Mutex::new(VecDeque::from(batches)),
            requests: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl ChannelFetcher for ScriptedFetcher {
    async fn fetch(&self, request: &FetchRequest) -> Result<Vec<RawRecord>> {
        self.requests.lock().await.push(request.clone());
        let mut guard = self.batches.lock().await;
        guard.pop_front().unwrap_or_else(|| Ok(Vec::new()))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    StartSession(StrongId),
    StartReverseSession,
    Hello(DeviceId, KeyId),
    PleaseSign(KeyId, String, String, String),
    Done(MerkleTriple),
}

/// Handler that records every call together with the context it saw.
#[derive(Default)]
pub struct RecordingHandler {
    pub calls: Mutex<Vec<(Call, DeviceId, DeviceId)>>,
    pub fail_with: Option<String>,
}

impl RecordingHandler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(reason: &str) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            fail_with: Some(reason.to_string()),
        }
    }

    pub async fn calls(&self) -> Vec<Call> {
        self.calls
            .lock()
            .await
            .iter()
            .map(|(call, _, _)| call.clone())
            .collect()
    }

    async fn record(&self, meta: &Meta, call: Call) -> Result<()> {
        self.calls
            .lock()
            .await
            .push((call, meta.sender, meta.receiver));
        match &self.fail_with {
            Some(reason) => Err(KexError::Handler(reason.clone())),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl KexHandler for RecordingHandler {
    async fn start_session(&self, meta: &mut Meta, strong_id: StrongId) -> Result<()> {
        self.record(meta, Call::StartSession(strong_id)).await
    }

    async fn start_reverse_session(&self, meta: &mut Meta) -> Result<()> {
        self.record(meta, Call::StartReverseSession).await
    }

    async fn hello(&self, meta: &mut Meta, device_id: DeviceId, device_key_id: KeyId) -> Result<()> {
        self.record(meta, Call::Hello(device_id, device_key_id)).await
    }

    async fn please_sign(
        &self,
        meta: &mut Meta,
        signing_key: KeyId,
        sig: String,
        device_type: String,
        device_desc: String,
    ) -> Result<()> {
        self.record(
            meta,
            Call::PleaseSign(signing_key, sig, device_type, device_desc),
        )
        .await
    }

    async fn done(&self, meta: &mut Meta, merkle_triple: MerkleTriple) -> Result<()> {
        self.record(meta, Call::Done(merkle_triple)).await
    }
}

pub fn message(seqno: Seqno, body: MessageBody) -> Message {
    Message {
        seqno,
        direction: Direction::YtoX,
        weak_id: secret().weak_id(),
        sender: DEVICE_Y,
        receiver: DEVICE_X,
        body,
    }
}

pub fn hello_body() -> MessageBody {
    MessageBody::Hello {
        device_id: DEVICE_Y,
        device_key_id: KeyId::new("0120d3458bbecdfc"),
    }
}

pub fn please_sign_body() -> MessageBody {
    MessageBody::PleaseSign {
        signing_key: KeyId::new("0120eddsa"),
        sig: "g6Rib2R5".to_string(),
        device_type: "desktop".to_string(),
        device_desc: "work laptop".to_string(),
    }
}

pub fn done_body() -> MessageBody {
    MessageBody::Done {
        merkle_triple: MerkleTriple {
            seqno: 17,
            link_id: "c0ffee".to_string(),
            sig_id: "5151".to_string(),
        },
    }
}

/// Signed record for `message(seqno, body)` under the shared test secret.
pub fn signed(seqno: Seqno, body: MessageBody) -> RawRecord {
    MessageCodec::new(secret())
        .export(&message(seqno, body))
        .unwrap()
}

/// Record signed with a different secret, so it fails authentication.
pub fn forged(seqno: Seqno, body: MessageBody) -> RawRecord {
    MessageCodec::new(Secret::new([0x13; 32]))
        .export(&message(seqno, body))
        .unwrap()
}

pub fn receiver(
    handler: Arc<RecordingHandler>,
    fetcher: Arc<dyn ChannelFetcher>,
) -> Receiver {
    Receiver::new(
        handler,
        fetcher,
        Arc::new(MessageCodec::new(secret())),
        Direction::YtoX,
    )
}

pub fn meta() -> Meta {
    Meta::from_secret(&secret())
}

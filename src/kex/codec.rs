use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::Sha256;

use crate::domains::{DeviceId, Direction, Message, MessageBody, Secret, Seqno, WeakId};
use crate::error::{KexError, Result};
use crate::interfaces::importer::MessageImporter;
use crate::interfaces::transport::RawRecord;

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, Serialize, Deserialize)]
struct WireRecord {
    seqno: Seqno,
    dir: Direction,
    w: WeakId,
    sender: DeviceId,
    receiver: DeviceId,
    msg: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct WireBody {
    name: String,
    #[serde(default)]
    args: Value,
    mac: String,
}

/// Everything the MAC covers.
#[derive(Serialize)]
struct SignableMessage<'a> {
    sender: &'a DeviceId,
    receiver: &'a DeviceId,
    seqno: Seqno,
    dir: Direction,
    w: &'a WeakId,
    name: &'a str,
    args: &'a Value,
}

/// Relay record codec keyed by the exchange secret.
pub struct MessageCodec {
    secret: Secret,
}

impl MessageCodec {
    pub fn new(secret: Secret) -> Self {
        Self { secret }
    }

    fn mac(&self, signable: &SignableMessage<'_>) -> Result<HmacSha256> {
        let payload =
            serde_json::to_vec(signable).map_err(|e| KexError::Serialization(e.to_string()))?;
        let mut mac = HmacSha256::new_from_slice(self.secret.as_bytes())
            .map_err(|e| KexError::Runtime(e.to_string()))?;
        mac.update(&payload);
        Ok(mac)
    }

    /// Encodes and signs a message the way the relay stores it.
    pub fn export(&self, message: &Message) -> Result<RawRecord> {
        let name = message.kind().wire_name().to_string();
        let args = message.body.to_args()?;
        let signable = SignableMessage {
            sender: &message.sender,
            receiver: &message.receiver,
            seqno: message.seqno,
            dir: message.direction,
            w: &message.weak_id,
            name: &name,
            args: &args,
        };
        let tag = self.mac(&signable)?.finalize().into_bytes();
        let body = WireBody {
            name,
            args,
            mac: BASE64.encode(tag),
        };
        let body_bytes =
            serde_json::to_vec(&body).map_err(|e| KexError::Serialization(e.to_string()))?;
        let record = WireRecord {
            seqno: message.seqno,
            dir: message.direction,
            w: message.weak_id,
            sender: message.sender,
            receiver: message.receiver,
            msg: BASE64.encode(body_bytes),
        };
        serde_json::to_value(record)
            .map(RawRecord)
            .map_err(|e| KexError::Serialization(e.to_string()))
    }
}

impl MessageImporter for MessageCodec {
    fn import(&self, record: &RawRecord) -> Result<Message> {
        let wire = WireRecord::deserialize(&record.0)
            .map_err(|e| KexError::Decode(format!("bad record: {e}")))?;
        let body_bytes = BASE64
            .decode(wire.msg.as_bytes())
            .map_err(|e| KexError::Decode(format!("bad message encoding: {e}")))?;
        let body: WireBody = serde_json::from_slice(&body_bytes)
            .map_err(|e| KexError::Decode(format!("bad message body: {e}")))?;
        let tag = BASE64
            .decode(body.mac.as_bytes())
            .map_err(|e| KexError::Decode(format!("bad mac encoding: {e}")))?;

        let signable = SignableMessage {
            sender: &wire.sender,
            receiver: &wire.receiver,
            seqno: wire.seqno,
            dir: wire.dir,
            w: &wire.w,
            name: &body.name,
            args: &body.args,
        };
        self.mac(&signable)?
            .verify_slice(&tag)
            .map_err(|_| KexError::MacMismatch)?;

        Ok(Message {
            seqno: wire.seqno,
            direction: wire.dir,
            weak_id: wire.w,
            sender: wire.sender,
            receiver: wire.receiver,
            body: MessageBody::from_wire(&body.name, &body.args)?,
        })
    }
}

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{json, Value};

use crate::domains::ids::{DeviceId, KeyId, StrongId, WeakId};
use crate::error::{KexError, Result};

pub type Seqno = u64;

/// Which inbound queue of a shared channel a receiver listens on. X is the
/// already provisioned device, Y the device being added.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    YtoX,
    XtoY,
}

impl Direction {
    pub fn as_i64(self) -> i64 {
        match self {
            Direction::YtoX => 1,
            Direction::XtoY => 2,
        }
    }

    pub fn from_i64(value: i64) -> Result<Self> {
        match value {
            1 => Ok(Direction::YtoX),
            2 => Ok(Direction::XtoY),
            other => Err(KexError::Decode(format!("invalid direction {other}"))),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Direction::YtoX => "y_to_x",
            Direction::XtoY => "x_to_y",
        }
    }

    pub fn from_name(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "y_to_x" | "ytox" | "1" => Some(Direction::YtoX),
            "x_to_y" | "xtoy" | "2" => Some(Direction::XtoY),
            _ => None,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Direction {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_i64(self.as_i64())
    }
}

impl<'de> Deserialize<'de> for Direction {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let value = i64::deserialize(deserializer)?;
        Direction::from_i64(value).map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MerkleTriple {
    pub seqno: i64,
    pub link_id: String,
    pub sig_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageKind {
    StartSession,
    StartReverseSession,
    Hello,
    PleaseSign,
    Done,
    Unknown(String),
}

impl MessageKind {
    pub fn wire_name(&self) -> &str {
        match self {
            MessageKind::StartSession => "startkex",
            MessageKind::StartReverseSession => "startrevkex",
            MessageKind::Hello => "hello",
            MessageKind::PleaseSign => "pleasesign",
            MessageKind::Done => "done",
            MessageKind::Unknown(name) => name,
        }
    }

    pub fn from_wire_name(name: &str) -> Self {
        match name {
            "startkex" => MessageKind::StartSession,
            "startrevkex" => MessageKind::StartReverseSession,
            "hello" => MessageKind::Hello,
            "pleasesign" => MessageKind::PleaseSign,
            "done" => MessageKind::Done,
            other => MessageKind::Unknown(other.to_string()),
        }
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}

/// Kind-specific payload of a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageBody {
    StartSession {
        strong_id: StrongId,
    },
    StartReverseSession,
    Hello {
        device_id: DeviceId,
        device_key_id: KeyId,
    },
    PleaseSign {
        signing_key: KeyId,
        sig: String,
        device_type: String,
        device_desc: String,
    },
    Done {
        merkle_triple: MerkleTriple,
    },
    /// A name this build does not know. Kept so the receiver can reject it
    /// by name instead of failing to decode.
    Unknown(String),
}

#[derive(Serialize, Deserialize)]
struct StartSessionArgs {
    strong_id: StrongId,
}

#[derive(Serialize, Deserialize)]
struct HelloArgs {
    device_id: DeviceId,
    device_key_id: KeyId,
}

#[derive(Serialize, Deserialize)]
struct PleaseSignArgs {
    signing_key: KeyId,
    sig: String,
    device_type: String,
    device_desc: String,
}

#[derive(Serialize, Deserialize)]
struct DoneArgs {
    merkle_triple: MerkleTriple,
}

fn parse_args<T: serde::de::DeserializeOwned>(name: &str, args: &Value) -> Result<T> {
    T::deserialize(args).map_err(|e| KexError::Decode(format!("bad args for {name}: {e}")))
}

impl MessageBody {
    pub fn kind(&self) -> MessageKind {
        match self {
            MessageBody::StartSession { .. } => MessageKind::StartSession,
            MessageBody::StartReverseSession => MessageKind::StartReverseSession,
            MessageBody::Hello { .. } => MessageKind::Hello,
            MessageBody::PleaseSign { .. } => MessageKind::PleaseSign,
            MessageBody::Done { .. } => MessageKind::Done,
            MessageBody::Unknown(name) => MessageKind::Unknown(name.clone()),
        }
    }

    pub fn from_wire(name: &str, args: &Value) -> Result<Self> {
        let body = match MessageKind::from_wire_name(name) {
            MessageKind::StartSession => {
                let args: StartSessionArgs = parse_args(name, args)?;
                MessageBody::StartSession {
                    strong_id: args.strong_id,
                }
            }
            MessageKind::StartReverseSession => MessageBody::StartReverseSession,
            MessageKind::Hello => {
                let args: HelloArgs = parse_args(name, args)?;
                MessageBody::Hello {
                    device_id: args.device_id,
                    device_key_id: args.device_key_id,
                }
            }
            MessageKind::PleaseSign => {
                let args: PleaseSignArgs = parse_args(name, args)?;
                MessageBody::PleaseSign {
                    signing_key: args.signing_key,
                    sig: args.sig,
                    device_type: args.device_type,
                    device_desc: args.device_desc,
                }
            }
            MessageKind::Done => {
                let args: DoneArgs = parse_args(name, args)?;
                MessageBody::Done {
                    merkle_triple: args.merkle_triple,
                }
            }
            MessageKind::Unknown(name) => MessageBody::Unknown(name),
        };
        Ok(body)
    }

    pub fn to_args(&self) -> Result<Value> {
        let value = match self {
            MessageBody::StartSession { strong_id } => serde_json::to_value(StartSessionArgs {
                strong_id: *strong_id,
            }),
            MessageBody::StartReverseSession | MessageBody::Unknown(_) => Ok(json!({})),
            MessageBody::Hello {
                device_id,
                device_key_id,
            } => serde_json::to_value(HelloArgs {
                device_id: *device_id,
                device_key_id: device_key_id.clone(),
            }),
            MessageBody::PleaseSign {
                signing_key,
                sig,
                device_type,
                device_desc,
            } => serde_json::to_value(PleaseSignArgs {
                signing_key: signing_key.clone(),
                sig: sig.clone(),
                device_type: device_type.clone(),
                device_desc: device_desc.clone(),
            }),
            MessageBody::Done { merkle_triple } => serde_json::to_value(DoneArgs {
                merkle_triple: merkle_triple.clone(),
            }),
        };
        value.map_err(|e| KexError::Serialization(e.to_string()))
    }
}

/// One authenticated protocol message, decoded from a relay record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub seqno: Seqno,
    pub direction: Direction,
    pub weak_id: WeakId,
    pub sender: DeviceId,
    pub receiver: DeviceId,
    pub body: MessageBody,
}

impl Message {
    pub fn kind(&self) -> MessageKind {
        self.body.kind()
    }
}

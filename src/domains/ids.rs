use std::fmt;

use rand_core::{OsRng, RngCore};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};

use crate::error::{KexError, Result};

pub const SECRET_LEN: usize = 32;
pub const STRONG_ID_LEN: usize = 32;
pub const WEAK_ID_LEN: usize = 16;
pub const DEVICE_ID_LEN: usize = 16;

fn decode_fixed<const N: usize>(what: &str, encoded: &str) -> Result<[u8; N]> {
    let bytes = hex::decode(encoded.trim())
        .map_err(|e| KexError::Decode(format!("invalid {what} hex: {e}")))?;
    if bytes.len() != N {
        return Err(KexError::Decode(format!(
            "invalid {what} length: expected {} bytes, got {}",
            N,
            bytes.len()
        )));
    }
    let mut out = [0u8; N];
    out.copy_from_slice(&bytes);
    Ok(out)
}

macro_rules! hex_id {
    ($name:ident, $len:expr, $what:literal) => {
        #[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
        pub struct $name(pub [u8; $len]);

        impl $name {
            pub fn from_hex(encoded: &str) -> Result<Self> {
                decode_fixed::<$len>($what, encoded).map(Self)
            }

            pub fn to_hex(&self) -> String {
                hex::encode(self.0)
            }

            pub fn as_bytes(&self) -> &[u8] {
                &self.0
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.to_hex())
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.to_hex())
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
                serializer.serialize_str(&self.to_hex())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
                let encoded = String::deserialize(deserializer)?;
                Self::from_hex(&encoded).map_err(serde::de::Error::custom)
            }
        }
    };
}

hex_id!(StrongId, STRONG_ID_LEN, "strong id");
hex_id!(WeakId, WEAK_ID_LEN, "weak id");
hex_id!(DeviceId, DEVICE_ID_LEN, "device id");

/// Shared secret both devices learn out of band. Every channel identifier
/// and the message MAC key derive from it.
#[derive(Clone, PartialEq, Eq)]
pub struct Secret([u8; SECRET_LEN]);

impl Secret {
    pub fn new(bytes: [u8; SECRET_LEN]) -> Self {
        Self(bytes)
    }

    pub fn generate() -> Self {
        let mut bytes = [0u8; SECRET_LEN];
        OsRng.fill_bytes(&mut bytes);
        Self(bytes)
    }

    pub fn from_hex(encoded: &str) -> Result<Self> {
        decode_fixed::<SECRET_LEN>("secret", encoded)
            .map(Self)
            .map_err(|e| KexError::Config(e.to_string()))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn strong_id(&self) -> StrongId {
        let digest = Sha256::digest(self.0);
        let mut out = [0u8; STRONG_ID_LEN];
        out.copy_from_slice(&digest);
        StrongId(out)
    }

    pub fn weak_id(&self) -> WeakId {
        self.strong_id().weak_id()
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(..)")
    }
}

impl StrongId {
    /// The weak id is the strong id's prefix; it is what the relay sees.
    pub fn weak_id(&self) -> WeakId {
        let mut out = [0u8; WEAK_ID_LEN];
        out.copy_from_slice(&self.0[..WEAK_ID_LEN]);
        WeakId(out)
    }
}

/// Key identifier as the key server prints it (hex).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KeyId(pub String);

impl KeyId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for KeyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

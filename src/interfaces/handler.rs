use async_trait::async_trait;

use crate::domains::{DeviceId, KeyId, MerkleTriple, Meta, StrongId};
use crate::error::Result;

/// State transitions of one side of the key exchange. The receiver calls
/// exactly one of these per dispatched message and returns its result
/// unchanged.
#[async_trait]
pub trait KexHandler: Send + Sync {
    async fn start_session(&self, meta: &mut Meta, strong_id: StrongId) -> Result<()>;

    async fn start_reverse_session(&self, meta: &mut Meta) -> Result<()>;

    async fn hello(&self, meta: &mut Meta, device_id: DeviceId, device_key_id: KeyId)
        -> Result<()>;

    async fn please_sign(
        &self,
        meta: &mut Meta,
        signing_key: KeyId,
        sig: String,
        device_type: String,
        device_desc: String,
    ) -> Result<()>;

    async fn done(&self, meta: &mut Meta, merkle_triple: MerkleTriple) -> Result<()>;
}

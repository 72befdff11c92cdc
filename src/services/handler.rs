use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tracing::info;

use crate::domains::{DeviceId, KeyId, MerkleTriple, Meta, StrongId};
use crate::error::{KexError, Result};
use crate::interfaces::handler::KexHandler;

/// Handler that only reports transitions. Used by `kex-receive` to watch a
/// channel; it rejects a strong id that does not match the session.
#[derive(Default)]
pub struct TracingHandler {
    done: AtomicBool,
}

impl TracingHandler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_done(&self) -> bool {
        self.done.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl KexHandler for TracingHandler {
    async fn start_session(&self, meta: &mut Meta, strong_id: StrongId) -> Result<()> {
        if strong_id != meta.strong_id {
            return Err(KexError::Handler(format!(
                "strong id mismatch: expected {}, got {}",
                meta.strong_id, strong_id
            )));
        }
        info!(sender = %meta.sender, "kex session started");
        Ok(())
    }

    async fn start_reverse_session(&self, meta: &mut Meta) -> Result<()> {
        info!(sender = %meta.sender, "reverse kex session started");
        Ok(())
    }

    async fn hello(
        &self,
        meta: &mut Meta,
        device_id: DeviceId,
        device_key_id: KeyId,
    ) -> Result<()> {
        info!(sender = %meta.sender, device = %device_id, key = %device_key_id, "hello");
        Ok(())
    }

    async fn please_sign(
        &self,
        meta: &mut Meta,
        signing_key: KeyId,
        _sig: String,
        device_type: String,
        device_desc: String,
    ) -> Result<()> {
        info!(
            sender = %meta.sender,
            key = %signing_key,
            device_type = %device_type,
            device_desc = %device_desc,
            "please sign"
        );
        Ok(())
    }

    async fn done(&self, meta: &mut Meta, merkle_triple: MerkleTriple) -> Result<()> {
        info!(
            sender = %meta.sender,
            seqno = merkle_triple.seqno,
            link_id = %merkle_triple.link_id,
            sig_id = %merkle_triple.sig_id,
            "kex done"
        );
        self.done.store(true, Ordering::SeqCst);
        Ok(())
    }
}

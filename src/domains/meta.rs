use crate::domains::ids::{DeviceId, Secret, StrongId, WeakId};

/// Session context shared by the receiver and the protocol handler.
///
/// The channel ids are fixed for the session. `sender` and `receiver` are
/// rewritten from every dispatched message so the handler replies to the
/// right device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Meta {
    pub weak_id: WeakId,
    pub strong_id: StrongId,
    pub sender: DeviceId,
    pub receiver: DeviceId,
}

impl Meta {
    pub fn new(weak_id: WeakId, strong_id: StrongId) -> Self {
        Self {
            weak_id,
            strong_id,
            sender: DeviceId::default(),
            receiver: DeviceId::default(),
        }
    }

    pub fn from_secret(secret: &Secret) -> Self {
        let strong_id = secret.strong_id();
        Self::new(strong_id.weak_id(), strong_id)
    }
}

pub mod ids;
pub mod message;
pub mod meta;

pub use ids::{DeviceId, KeyId, Secret, StrongId, WeakId};
pub use message::{Direction, MerkleTriple, Message, MessageBody, MessageKind, Seqno};
pub use meta::Meta;

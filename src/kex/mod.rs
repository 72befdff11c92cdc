pub mod codec;
pub mod receiver;

pub use codec::MessageCodec;
pub use receiver::{Receiver, DEFAULT_POLL};

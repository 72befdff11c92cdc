pub mod config;
pub mod domains;
pub mod error;
pub mod interfaces;
pub mod kex;
pub mod services;

pub use crate::config::KexConfig;
pub use crate::domains::{Direction, Message, MessageBody, MessageKind, Meta, Secret};
pub use crate::error::{KexError, Result};
pub use crate::kex::{MessageCodec, Receiver};

use crate::domains::Message;
use crate::error::Result;
use crate::interfaces::transport::RawRecord;

/// Decodes and authenticates a relay record.
///
/// Implementations return `KexError::MacMismatch` when the record parses but
/// fails authentication, and any other error when it cannot be parsed.
pub trait MessageImporter: Send + Sync {
    fn import(&self, record: &RawRecord) -> Result<Message>;
}

pub mod handler;
pub mod relay;
pub mod transport;

pub mod handler;
pub mod importer;
pub mod transport;

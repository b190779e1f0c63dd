//! Error types for the EIT section contract.

use thiserror::Error;

/// Errors raised while decoding sections at the boundary.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// Section payload could not be decoded.
    #[error("Failed to decode section: {0}")]
    DecodeError(String),

    /// Table id is neither present/following nor schedule.
    #[error("Not an EIT table: table_id=0x{0:02X}")]
    NotEitTable(u8),
}

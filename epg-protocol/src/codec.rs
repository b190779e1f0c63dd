//! Codec for exchanging decoded EIT sections as JSON lines.
//!
//! One section per line:
//! ```text
//! {"table_id":78,"version_number":1,"original_network_id":32736,"service_id":1024,"events":[...]}
//! ```

use crate::error::ProtocolError;
use crate::types::{table_id, EitSection};

/// Decode one JSON line into a section.
///
/// Rejects sections whose table id is not an EIT table id.
pub fn decode_section(line: &str) -> Result<EitSection, ProtocolError> {
    let section: EitSection =
        serde_json::from_str(line).map_err(|e| ProtocolError::DecodeError(e.to_string()))?;

    if !table_id::is_present_following(section.table_id) && !table_id::is_schedule(section.table_id)
    {
        return Err(ProtocolError::NotEitTable(section.table_id));
    }

    Ok(section)
}

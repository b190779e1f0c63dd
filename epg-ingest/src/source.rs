//! JSON-lines section input.

use epg_protocol::decode_section;
use log::{debug, warn};
use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use crate::epg::EpgWriter;

#[derive(Error, Debug)]
pub enum SourceError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Counters for one input stream.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SourceStats {
    pub lines: u64,
    pub sections: u64,
    pub skipped: u64,
}

/// Read newline-delimited sections and forward them to `writer`.
///
/// Blank lines are ignored. Lines that fail to decode, and sections the
/// writer refuses because the builder has stopped, are logged and skipped.
/// Does not signal end of stream.
pub async fn read_sections<R>(reader: R, writer: &EpgWriter) -> Result<SourceStats, SourceError>
where
    R: AsyncBufRead + Unpin,
{
    let mut stats = SourceStats::default();
    let mut lines = reader.lines();

    while let Some(line) = lines.next_line().await? {
        stats.lines += 1;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match decode_section(line) {
            Ok(section) => {
                if writer.write(section) {
                    stats.sections += 1;
                } else {
                    stats.skipped += 1;
                    debug!("line {}: builder stopped, section dropped", stats.lines);
                }
            }
            Err(e) => {
                stats.skipped += 1;
                warn!("line {}: {}", stats.lines, e);
            }
        }
    }

    debug!(
        "input exhausted: lines={} sections={} skipped={}",
        stats.lines, stats.sections, stats.skipped
    );
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::epg::{Epg, EpgConfig};
    use crate::store::MemoryStore;
    use epg_protocol::ProgramId;
    use std::time::Duration;

    fn config() -> EpgConfig {
        EpgConfig {
            yield_interval: Duration::ZERO,
            ..EpgConfig::default()
        }
    }

    const INPUT: &str = r#"{"table_id":78,"version_number":1,"original_network_id":4,"service_id":101,"events":[{"event_id":1,"start_time":[229,225,18,0,0],"duration":[0,48,0],"descriptors":[{"type":"short_event","event_name":[14,65],"text":[]}]}]}

{"table_id":66,"version_number":0,"original_network_id":4,"service_id":101}
not json
{"table_id":80,"version_number":3,"original_network_id":4,"service_id":101,"events":[{"event_id":2,"start_time":[229,225,18,48,0],"duration":[0,48,0],"descriptors":[{"type":"logo_transmission"}]}]}
"#;

    #[tokio::test]
    async fn test_read_sections() {
        let (writer, handle) = Epg::spawn(MemoryStore::new(), config());

        let stats = read_sections(INPUT.as_bytes(), &writer).await.unwrap();
        assert_eq!(
            stats,
            SourceStats {
                lines: 5,
                sections: 2,
                skipped: 2,
            }
        );

        writer.end();
        let store = handle.await.unwrap();
        assert_eq!(store.len(), 2);
        assert_eq!(
            store.program(ProgramId::new(4, 101, 1)).unwrap().name.as_deref(),
            Some("A")
        );
        assert_eq!(
            store.program(ProgramId::new(4, 101, 2)).unwrap().duration,
            30 * 60 * 1000
        );
    }

    #[tokio::test]
    async fn test_closed_writer_skips_sections() {
        let (writer, handle) = Epg::spawn(MemoryStore::new(), config());
        writer.end();
        handle.await.unwrap();

        // Refused sections are skipped like bad lines; reading runs to the end
        let stats = read_sections(INPUT.as_bytes(), &writer).await.unwrap();
        assert_eq!(
            stats,
            SourceStats {
                lines: 5,
                sections: 0,
                skipped: 4,
            }
        );
    }
}

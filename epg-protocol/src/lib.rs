//! Typed contracts for EIT-based program guide ingestion.
//!
//! This crate defines both boundaries of the EPG builder:
//!
//! - the decoded EIT sections it consumes from an upstream section parser
//!   ([`EitSection`], [`EitEvent`], [`Descriptor`]);
//! - the program records and partial updates it issues against a program
//!   store ([`Program`], [`ProgramPatch`], [`ProgramId`]).
//!
//! It also carries the pure decoding helpers shared by both sides: the
//! broadcast [`time`] encodings and the static [`codes`] tables.
//!
//! # Example
//!
//! ```rust
//! use epg_protocol::{ProgramId, time};
//!
//! let id = ProgramId::new(32736, 1024, 12345);
//! assert_eq!(id.as_u64(), 327360102412345);
//!
//! // 2020-01-01 12:34:56 JST
//! let start = time::decode_start_time(&[0xE5, 0xE1, 0x12, 0x34, 0x56]).unwrap();
//! assert_eq!(start, 1_577_849_696_000);
//! ```

pub mod codec;
pub mod codes;
pub mod error;
pub mod program;
pub mod time;
pub mod types;

pub use codec::decode_section;
pub use codes::{sampling_rate, LanguageCode, VideoResolution, VideoType};
pub use error::ProtocolError;
pub use program::{
    Program, ProgramAudio, ProgramGenre, ProgramId, ProgramPatch, ProgramRelatedItem,
    ProgramSchedule, ProgramSeries, ProgramVideo, RelatedItemType,
};
pub use types::{
    descriptor_tag, table_id, AudioComponentDescriptor, ComponentDescriptor, ContentDescriptor,
    ContentNibble, Descriptor, EitEvent, EitSection, EventGroupDescriptor, ExtendedEventDescriptor,
    ExtendedEventItem, GroupEvent, OtherNetworkEvent, SeriesDescriptor, ShortEventDescriptor,
};

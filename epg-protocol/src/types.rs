//! Decoded EIT section types handed over by the upstream section parser.
//!
//! Section syntax and CRC have already been validated upstream. Descriptor
//! text fields are kept as raw ARIB STD-B24 bytes; turning them into display
//! text is the consumer's job.

use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// Table IDs for EIT sections.
pub mod table_id {
    /// Event Information Section - actual TS, present/following.
    pub const EIT_PF_ACTUAL: u8 = 0x4E;
    /// Event Information Section - other TS, present/following.
    pub const EIT_PF_OTHER: u8 = 0x4F;
    /// First schedule table id (actual TS).
    pub const EIT_SCHEDULE_ACTUAL_FIRST: u8 = 0x50;
    /// Last schedule table id (actual TS).
    pub const EIT_SCHEDULE_ACTUAL_LAST: u8 = 0x5F;
    /// First schedule table id (other TS).
    pub const EIT_SCHEDULE_OTHER_FIRST: u8 = 0x60;
    /// Last schedule table id (other TS).
    pub const EIT_SCHEDULE_OTHER_LAST: u8 = 0x6F;

    /// Whether the table id is one of the present/following ("now/next") tables.
    pub fn is_present_following(table_id: u8) -> bool {
        table_id == EIT_PF_ACTUAL || table_id == EIT_PF_OTHER
    }

    /// Whether the table id is one of the multi-day schedule tables.
    pub fn is_schedule(table_id: u8) -> bool {
        (EIT_SCHEDULE_ACTUAL_FIRST..=EIT_SCHEDULE_OTHER_LAST).contains(&table_id)
    }
}

/// Descriptor tags recognised in EIT event loops.
pub mod descriptor_tag {
    /// Short event descriptor.
    pub const SHORT_EVENT: u8 = 0x4D;
    /// Extended event descriptor.
    pub const EXTENDED_EVENT: u8 = 0x4E;
    /// Component descriptor.
    pub const COMPONENT: u8 = 0x50;
    /// Content descriptor.
    pub const CONTENT: u8 = 0x54;
    /// Audio component descriptor (ARIB).
    pub const AUDIO_COMPONENT: u8 = 0xC4;
    /// Series descriptor (ARIB).
    pub const SERIES: u8 = 0xD5;
    /// Event group descriptor (ARIB).
    pub const EVENT_GROUP: u8 = 0xD6;
}

/// One decoded EIT section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EitSection {
    pub table_id: u8,
    pub version_number: u8,
    pub original_network_id: u16,
    #[serde(default)]
    pub transport_stream_id: u16,
    pub service_id: u16,
    #[serde(default)]
    pub events: Vec<EitEvent>,
}

impl EitSection {
    /// Whether this section belongs to a present/following table.
    pub fn is_present_following(&self) -> bool {
        table_id::is_present_following(self.table_id)
    }
}

/// One event entry of an EIT section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EitEvent {
    pub event_id: u16,
    /// MJD (16 bit) + BCD hh:mm:ss.
    pub start_time: [u8; 5],
    /// BCD hh:mm:ss.
    pub duration: [u8; 3],
    /// `true` when the event is scrambled.
    #[serde(default)]
    pub free_ca_mode: bool,
    #[serde(default)]
    pub descriptors: Vec<Descriptor>,
}

/// Decoded event descriptors.
///
/// Tags this crate does not know about deserialize into [`Descriptor::Unknown`]
/// and are skipped by consumers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Descriptor {
    ShortEvent(ShortEventDescriptor),
    ExtendedEvent(ExtendedEventDescriptor),
    Component(ComponentDescriptor),
    Content(ContentDescriptor),
    AudioComponent(AudioComponentDescriptor),
    Series(SeriesDescriptor),
    EventGroup(EventGroupDescriptor),
    #[serde(other)]
    Unknown,
}

impl Descriptor {
    /// Standard descriptor tag of this descriptor, `None` for unknown ones.
    pub fn tag(&self) -> Option<u8> {
        match self {
            Descriptor::ShortEvent(_) => Some(descriptor_tag::SHORT_EVENT),
            Descriptor::ExtendedEvent(_) => Some(descriptor_tag::EXTENDED_EVENT),
            Descriptor::Component(_) => Some(descriptor_tag::COMPONENT),
            Descriptor::Content(_) => Some(descriptor_tag::CONTENT),
            Descriptor::AudioComponent(_) => Some(descriptor_tag::AUDIO_COMPONENT),
            Descriptor::Series(_) => Some(descriptor_tag::SERIES),
            Descriptor::EventGroup(_) => Some(descriptor_tag::EVENT_GROUP),
            Descriptor::Unknown => None,
        }
    }
}

/// Short event descriptor (0x4D).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShortEventDescriptor {
    #[serde(default)]
    pub iso_639_language_code: [u8; 3],
    pub event_name: Bytes,
    pub text: Bytes,
}

/// Extended event descriptor (0x4E).
///
/// Long texts are split across several descriptors, possibly carried by
/// different sections. `descriptor_number` is the slot of this fragment and
/// `last_descriptor_number` the last slot of the whole text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtendedEventDescriptor {
    pub descriptor_number: u8,
    pub last_descriptor_number: u8,
    #[serde(default)]
    pub iso_639_language_code: [u8; 3],
    #[serde(default)]
    pub items: Vec<ExtendedEventItem>,
    #[serde(default)]
    pub text: Bytes,
}

/// One (label, value) pair of an extended event descriptor.
///
/// An empty `description` continues the previous item's text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtendedEventItem {
    #[serde(default)]
    pub description: Bytes,
    #[serde(default)]
    pub item: Bytes,
}

/// Component descriptor (0x50).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentDescriptor {
    pub stream_content: u8,
    pub component_type: u8,
    #[serde(default)]
    pub component_tag: u8,
    #[serde(default)]
    pub iso_639_language_code: [u8; 3],
    #[serde(default)]
    pub text: Bytes,
}

/// Content descriptor (0x54).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentDescriptor {
    #[serde(default)]
    pub contents: Vec<ContentNibble>,
}

/// One genre entry of a content descriptor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentNibble {
    pub content_nibble_level_1: u8,
    pub content_nibble_level_2: u8,
    #[serde(default)]
    pub user_nibble_1: u8,
    #[serde(default)]
    pub user_nibble_2: u8,
}

/// Audio component descriptor (0xC4).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioComponentDescriptor {
    #[serde(default)]
    pub stream_content: u8,
    pub component_type: u8,
    pub component_tag: u8,
    #[serde(default)]
    pub stream_type: u8,
    #[serde(default)]
    pub simulcast_group_tag: u8,
    #[serde(default)]
    pub es_multi_lingual_flag: bool,
    #[serde(default)]
    pub main_component_flag: bool,
    #[serde(default)]
    pub quality_indicator: u8,
    pub sampling_rate: u8,
    pub iso_639_language_code: [u8; 3],
    /// Present only when `es_multi_lingual_flag` is set.
    #[serde(default)]
    pub iso_639_language_code_2: Option<[u8; 3]>,
    #[serde(default)]
    pub text: Bytes,
}

/// Series descriptor (0xD5).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeriesDescriptor {
    pub series_id: u16,
    pub repeat_label: u8,
    pub program_pattern: u8,
    /// 16-bit MJD expire date, `None` when `expire_date_valid_flag` is clear.
    #[serde(default)]
    pub expire_date: Option<u16>,
    pub episode_number: u16,
    pub last_episode_number: u16,
    #[serde(default)]
    pub series_name: Bytes,
}

/// Event group descriptor (0xD6).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventGroupDescriptor {
    pub group_type: u8,
    /// Events on the same network (group types 1-3).
    #[serde(default)]
    pub events: Vec<GroupEvent>,
    /// Events on other networks (group types 4 and 5).
    #[serde(default)]
    pub other_network_events: Vec<OtherNetworkEvent>,
}

/// Event reference within the same network.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupEvent {
    pub service_id: u16,
    pub event_id: u16,
}

/// Event reference on another network.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OtherNetworkEvent {
    pub original_network_id: u16,
    pub transport_stream_id: u16,
    pub service_id: u16,
    pub event_id: u16,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_id_classification() {
        assert!(table_id::is_present_following(0x4E));
        assert!(table_id::is_present_following(0x4F));
        assert!(!table_id::is_present_following(0x50));

        assert!(table_id::is_schedule(0x50));
        assert!(table_id::is_schedule(0x5F));
        assert!(table_id::is_schedule(0x60));
        assert!(table_id::is_schedule(0x6F));
        assert!(!table_id::is_schedule(0x4E));
        assert!(!table_id::is_schedule(0x70));
    }

    #[test]
    fn test_descriptor_tags() {
        let d = Descriptor::ShortEvent(ShortEventDescriptor::default());
        assert_eq!(d.tag(), Some(0x4D));
        let d = Descriptor::EventGroup(EventGroupDescriptor::default());
        assert_eq!(d.tag(), Some(0xD6));
        assert_eq!(Descriptor::Unknown.tag(), None);
    }

    #[test]
    fn test_unknown_descriptor_deserializes() {
        let json = r#"{"type":"parental_rating","rating":3}"#;
        let d: Descriptor = serde_json::from_str(json).unwrap();
        assert_eq!(d, Descriptor::Unknown);
    }
}

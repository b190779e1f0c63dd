//! Program records and partial updates exchanged with the program store.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::codes::{LanguageCode, VideoResolution, VideoType};

/// Deterministic program identifier.
///
/// The decimal concatenation of the network id with the service id and the
/// event id, each zero-padded to five digits. Stable across restarts, so it
/// serves as the persisted program's primary key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProgramId(pub u64);

impl ProgramId {
    pub fn new(network_id: u16, service_id: u16, event_id: u16) -> Self {
        Self(network_id as u64 * 10_000_000_000 + service_id as u64 * 100_000 + event_id as u64)
    }

    pub fn network_id(&self) -> u16 {
        (self.0 / 10_000_000_000) as u16
    }

    pub fn service_id(&self) -> u16 {
        ((self.0 / 100_000) % 100_000) as u16
    }

    pub fn event_id(&self) -> u16 {
        (self.0 % 100_000) as u16
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ProgramId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Full program record as held by the program store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Program {
    pub id: ProgramId,
    pub event_id: u16,
    pub service_id: u16,
    pub network_id: u16,
    /// Start time (epoch milliseconds).
    pub start_at: i64,
    /// Duration in milliseconds.
    pub duration: i64,
    pub is_free: bool,
    /// Last schedule update came from a present/following table.
    #[serde(default)]
    pub is_present_following: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video: Option<ProgramVideo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub genres: Option<Vec<ProgramGenre>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audios: Option<Vec<ProgramAudio>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub series: Option<ProgramSeries>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub related_items: Option<Vec<ProgramRelatedItem>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extended: Option<BTreeMap<String, String>>,
}

impl Program {
    /// Create a minimal record carrying only scheduling fields.
    pub fn new(
        network_id: u16,
        service_id: u16,
        event_id: u16,
        schedule: ProgramSchedule,
    ) -> Self {
        Self {
            id: ProgramId::new(network_id, service_id, event_id),
            event_id,
            service_id,
            network_id,
            start_at: schedule.start_at,
            duration: schedule.duration,
            is_free: schedule.is_free,
            is_present_following: schedule.is_present_following,
            name: None,
            description: None,
            video: None,
            genres: None,
            audios: None,
            series: None,
            related_items: None,
            extended: None,
        }
    }

    /// Merge a partial update into this record.
    pub fn apply(&mut self, patch: ProgramPatch) {
        match patch {
            ProgramPatch::Schedule(schedule) => {
                self.start_at = schedule.start_at;
                self.duration = schedule.duration;
                self.is_free = schedule.is_free;
                self.is_present_following = schedule.is_present_following;
            }
            ProgramPatch::ShortEvent { name, description } => {
                self.name = Some(name);
                self.description = Some(description);
            }
            ProgramPatch::Extended(extended) => self.extended = Some(extended),
            ProgramPatch::Video(video) => self.video = Some(video),
            ProgramPatch::Genres(genres) => self.genres = Some(genres),
            ProgramPatch::Audios(audios) => self.audios = Some(audios),
            ProgramPatch::Series(series) => self.series = Some(series),
            ProgramPatch::RelatedItems(items) => self.related_items = Some(items),
        }
    }
}

/// Scheduling fields of a program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgramSchedule {
    pub start_at: i64,
    pub duration: i64,
    pub is_free: bool,
    pub is_present_following: bool,
}

/// Partial update of one property group of a program.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum ProgramPatch {
    Schedule(ProgramSchedule),
    ShortEvent { name: String, description: String },
    Extended(BTreeMap<String, String>),
    Video(ProgramVideo),
    Genres(Vec<ProgramGenre>),
    Audios(Vec<ProgramAudio>),
    Series(ProgramSeries),
    RelatedItems(Vec<ProgramRelatedItem>),
}

impl ProgramPatch {
    /// Short name of the property group, used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            ProgramPatch::Schedule(_) => "schedule",
            ProgramPatch::ShortEvent { .. } => "short_event",
            ProgramPatch::Extended(_) => "extended",
            ProgramPatch::Video(_) => "video",
            ProgramPatch::Genres(_) => "genres",
            ProgramPatch::Audios(_) => "audios",
            ProgramPatch::Series(_) => "series",
            ProgramPatch::RelatedItems(_) => "related_items",
        }
    }
}

/// Video format of a program. Raw codes are kept next to the looked-up labels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgramVideo {
    #[serde(rename = "type")]
    pub video_type: Option<VideoType>,
    pub resolution: Option<VideoResolution>,
    pub stream_content: u8,
    pub component_type: u8,
}

impl fmt::Display for ProgramVideo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.video_type {
            Some(t) => f.write_str(t.as_str())?,
            None => write!(f, "stream_content=0x{:02X}", self.stream_content)?,
        }
        match self.resolution {
            Some(r) => write!(f, " {}", r.as_str()),
            None => write!(f, " component_type=0x{:02X}", self.component_type),
        }
    }
}

/// Genre nibbles of a content descriptor entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgramGenre {
    pub lv1: u8,
    pub lv2: u8,
    pub un1: u8,
    pub un2: u8,
}

/// One audio track of a program.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgramAudio {
    pub component_type: u8,
    pub component_tag: u8,
    pub is_main: bool,
    /// Hz, `-1` for reserved codes.
    pub sampling_rate: i32,
    pub langs: Vec<LanguageCode>,
}

impl fmt::Display for ProgramAudio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tag=0x{:02X} ", self.component_tag)?;
        for (i, lang) in self.langs.iter().enumerate() {
            if i > 0 {
                f.write_str("+")?;
            }
            f.write_str(lang.as_str())?;
        }
        write!(f, " {}Hz", self.sampling_rate)?;
        if self.is_main {
            f.write_str(" main")?;
        }
        Ok(())
    }
}

/// Series information of a program.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgramSeries {
    pub id: u16,
    pub repeat: u8,
    pub pattern: u8,
    /// Epoch milliseconds, `-1` when absent.
    pub expires_at: i64,
    pub episode: u16,
    pub last_episode: u16,
    pub name: String,
}

/// Relation between programs announced by an event group descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RelatedItemType {
    Shared,
    Relay,
    Movement,
}

impl RelatedItemType {
    /// Classify an event group type: 1 is a shared event, 2 and 4 are
    /// relays, everything else is a movement.
    pub fn from_group_type(group_type: u8) -> Self {
        match group_type {
            1 => RelatedItemType::Shared,
            2 | 4 => RelatedItemType::Relay,
            _ => RelatedItemType::Movement,
        }
    }
}

/// A program related to another through an event group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgramRelatedItem {
    #[serde(rename = "type")]
    pub item_type: RelatedItemType,
    /// Absent for events on the announcing network itself.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network_id: Option<u16>,
    pub service_id: u16,
    pub event_id: u16,
}

//! Static code tables used by EIT descriptors.
//!
//! Values follow ARIB STD-B10 (component_type, sampling_rate) and
//! ISO 639-2 for language codes. Unmapped codes never fail: they map to
//! `None`, `-1` or [`LanguageCode::Etc`].

use serde::{Deserialize, Serialize};

/// Video coding derived from `stream_content` of a component descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VideoType {
    #[serde(rename = "mpeg2")]
    Mpeg2,
    #[serde(rename = "h.264")]
    H264,
    #[serde(rename = "h.265")]
    H265,
}

impl VideoType {
    /// Look up the video coding for a `stream_content` value.
    pub fn from_stream_content(stream_content: u8) -> Option<Self> {
        match stream_content {
            0x01 => Some(VideoType::Mpeg2),
            0x05 => Some(VideoType::H264),
            0x09 => Some(VideoType::H265),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            VideoType::Mpeg2 => "mpeg2",
            VideoType::H264 => "h.264",
            VideoType::H265 => "h.265",
        }
    }
}

/// Video resolution derived from `component_type` of a component descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VideoResolution {
    #[serde(rename = "180p")]
    R180p,
    #[serde(rename = "240p")]
    R240p,
    #[serde(rename = "480i")]
    R480i,
    #[serde(rename = "480p")]
    R480p,
    #[serde(rename = "720p")]
    R720p,
    #[serde(rename = "1080i")]
    R1080i,
    #[serde(rename = "1080p")]
    R1080p,
    #[serde(rename = "2160p")]
    R2160p,
    #[serde(rename = "4320p")]
    R4320p,
}

impl VideoResolution {
    /// Look up the resolution for a video `component_type` value.
    ///
    /// The low nibble carries the aspect ratio (1-4); the high nibble
    /// selects the scanning format.
    pub fn from_component_type(component_type: u8) -> Option<Self> {
        match component_type {
            0x01..=0x04 => Some(VideoResolution::R480i),
            0x83 => Some(VideoResolution::R4320p),
            0x91..=0x94 => Some(VideoResolution::R2160p),
            0xA1..=0xA4 => Some(VideoResolution::R480p),
            0xB1..=0xB4 => Some(VideoResolution::R1080i),
            0xC1..=0xC4 => Some(VideoResolution::R720p),
            0xD1..=0xD4 => Some(VideoResolution::R240p),
            0xE1..=0xE4 => Some(VideoResolution::R1080p),
            0xF1..=0xF4 => Some(VideoResolution::R180p),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            VideoResolution::R180p => "180p",
            VideoResolution::R240p => "240p",
            VideoResolution::R480i => "480i",
            VideoResolution::R480p => "480p",
            VideoResolution::R720p => "720p",
            VideoResolution::R1080i => "1080i",
            VideoResolution::R1080p => "1080p",
            VideoResolution::R2160p => "2160p",
            VideoResolution::R4320p => "4320p",
        }
    }
}

/// Sampling rate in Hz for the 3-bit `sampling_rate` field of an audio
/// component descriptor. Reserved values yield `-1`.
pub fn sampling_rate(code: u8) -> i32 {
    match code {
        1 => 16000,
        2 => 22050,
        3 => 24000,
        5 => 32000,
        6 => 44100,
        7 => 48000,
        _ => -1,
    }
}

/// Audio language, matched against a fixed set of ISO 639-2 codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LanguageCode {
    Jpn,
    Eng,
    Deu,
    Fra,
    Ita,
    Rus,
    Zho,
    Kor,
    Spa,
    Etc,
}

impl LanguageCode {
    const TABLE: [(&'static [u8; 3], LanguageCode); 10] = [
        (b"jpn", LanguageCode::Jpn),
        (b"eng", LanguageCode::Eng),
        (b"deu", LanguageCode::Deu),
        (b"fra", LanguageCode::Fra),
        (b"ita", LanguageCode::Ita),
        (b"rus", LanguageCode::Rus),
        (b"zho", LanguageCode::Zho),
        (b"kor", LanguageCode::Kor),
        (b"spa", LanguageCode::Spa),
        (b"etc", LanguageCode::Etc),
    ];

    /// Match a 3-byte ISO 639 code; anything outside the table is `Etc`.
    pub fn from_iso_639(code: &[u8; 3]) -> Self {
        Self::TABLE
            .iter()
            .find(|(bytes, _)| *bytes == code)
            .map(|(_, lang)| *lang)
            .unwrap_or(LanguageCode::Etc)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LanguageCode::Jpn => "jpn",
            LanguageCode::Eng => "eng",
            LanguageCode::Deu => "deu",
            LanguageCode::Fra => "fra",
            LanguageCode::Ita => "ita",
            LanguageCode::Rus => "rus",
            LanguageCode::Zho => "zho",
            LanguageCode::Kor => "kor",
            LanguageCode::Spa => "spa",
            LanguageCode::Etc => "etc",
        }
    }
}

//! Descriptor to program field mappings.

use epg_protocol::{
    sampling_rate, time, AudioComponentDescriptor, ComponentDescriptor, ContentDescriptor,
    EventGroupDescriptor, LanguageCode, ProgramAudio, ProgramGenre, ProgramPatch,
    ProgramRelatedItem, ProgramSeries, ProgramVideo, RelatedItemType, SeriesDescriptor,
    ShortEventDescriptor, VideoResolution, VideoType,
};

use crate::aribb24::decode_arib_string;

pub fn short_event(desc: &ShortEventDescriptor) -> ProgramPatch {
    ProgramPatch::ShortEvent {
        name: decode_arib_string(&desc.event_name),
        description: decode_arib_string(&desc.text),
    }
}

/// Unmapped codes leave the label empty; the raw codes are always kept.
pub fn video(desc: &ComponentDescriptor) -> ProgramVideo {
    ProgramVideo {
        video_type: VideoType::from_stream_content(desc.stream_content),
        resolution: VideoResolution::from_component_type(desc.component_type),
        stream_content: desc.stream_content,
        component_type: desc.component_type,
    }
}

pub fn genres(desc: &ContentDescriptor) -> Vec<ProgramGenre> {
    desc.contents
        .iter()
        .map(|c| ProgramGenre {
            lv1: c.content_nibble_level_1,
            lv2: c.content_nibble_level_2,
            un1: c.user_nibble_1,
            un2: c.user_nibble_2,
        })
        .collect()
}

pub fn audio(desc: &AudioComponentDescriptor) -> ProgramAudio {
    let mut langs = vec![LanguageCode::from_iso_639(&desc.iso_639_language_code)];
    if let Some(code) = &desc.iso_639_language_code_2 {
        langs.push(LanguageCode::from_iso_639(code));
    }

    ProgramAudio {
        component_type: desc.component_type,
        component_tag: desc.component_tag,
        is_main: desc.main_component_flag,
        sampling_rate: sampling_rate(desc.sampling_rate),
        langs,
    }
}

pub fn series(desc: &SeriesDescriptor) -> ProgramSeries {
    ProgramSeries {
        id: desc.series_id,
        repeat: desc.repeat_label,
        pattern: desc.program_pattern,
        expires_at: desc.expire_date.map(time::decode_mjd_date).unwrap_or(-1),
        episode: desc.episode_number,
        last_episode: desc.last_episode_number,
        name: decode_arib_string(&desc.series_name),
    }
}

/// Related programs announced by an event group descriptor.
///
/// Group types below 4 list events on the same network, so their items carry
/// no network id; the others list events on other networks.
pub fn related_items(desc: &EventGroupDescriptor) -> Vec<ProgramRelatedItem> {
    let item_type = RelatedItemType::from_group_type(desc.group_type);

    if desc.group_type < 4 {
        desc.events
            .iter()
            .map(|e| related_item(item_type, None, e.service_id, e.event_id))
            .collect()
    } else {
        desc.other_network_events
            .iter()
            .map(|e| {
                related_item(
                    item_type,
                    Some(e.original_network_id),
                    e.service_id,
                    e.event_id,
                )
            })
            .collect()
    }
}

fn related_item(
    item_type: RelatedItemType,
    network_id: Option<u16>,
    service_id: u16,
    event_id: u16,
) -> ProgramRelatedItem {
    ProgramRelatedItem {
        item_type,
        network_id,
        service_id,
        event_id,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use epg_protocol::{ContentNibble, GroupEvent, OtherNetworkEvent};

    fn audio_desc(tag: u8, lang2: Option<[u8; 3]>) -> AudioComponentDescriptor {
        AudioComponentDescriptor {
            stream_content: 2,
            component_type: 3,
            component_tag: tag,
            stream_type: 0x0F,
            simulcast_group_tag: 0xFF,
            es_multi_lingual_flag: lang2.is_some(),
            main_component_flag: tag == 0x10,
            quality_indicator: 1,
            sampling_rate: 7,
            iso_639_language_code: *b"jpn",
            iso_639_language_code_2: lang2,
            text: Bytes::new(),
        }
    }

    #[test]
    fn test_short_event() {
        let desc = ShortEventDescriptor {
            iso_639_language_code: *b"jpn",
            event_name: Bytes::from_static(&[0x25, 0x46, 0x25, 0x39, 0x25, 0x48]),
            text: Bytes::new(),
        };
        assert_eq!(
            short_event(&desc),
            ProgramPatch::ShortEvent {
                name: "テスト".to_string(),
                description: String::new(),
            }
        );
    }

    #[test]
    fn test_video_keeps_raw_codes_for_unmapped() {
        let desc = ComponentDescriptor {
            stream_content: 0x0B,
            component_type: 0x77,
            component_tag: 0,
            iso_639_language_code: *b"jpn",
            text: Bytes::new(),
        };
        let v = video(&desc);
        assert_eq!(v.video_type, None);
        assert_eq!(v.resolution, None);
        assert_eq!(v.stream_content, 0x0B);
        assert_eq!(v.component_type, 0x77);

        let desc = ComponentDescriptor {
            stream_content: 0x01,
            component_type: 0xB3,
            ..desc
        };
        let v = video(&desc);
        assert_eq!(v.video_type, Some(VideoType::Mpeg2));
        assert_eq!(v.resolution, Some(VideoResolution::R1080i));
    }

    #[test]
    fn test_genres() {
        let desc = ContentDescriptor {
            contents: vec![
                ContentNibble {
                    content_nibble_level_1: 0x0,
                    content_nibble_level_2: 0x1,
                    user_nibble_1: 0xF,
                    user_nibble_2: 0xF,
                },
                ContentNibble {
                    content_nibble_level_1: 0x7,
                    content_nibble_level_2: 0x0,
                    user_nibble_1: 0xF,
                    user_nibble_2: 0xF,
                },
            ],
        };
        let g = genres(&desc);
        assert_eq!(g.len(), 2);
        assert_eq!(g[1], ProgramGenre { lv1: 7, lv2: 0, un1: 15, un2: 15 });
    }

    #[test]
    fn test_audio_languages() {
        let a = audio(&audio_desc(0x10, None));
        assert!(a.is_main);
        assert_eq!(a.sampling_rate, 48000);
        assert_eq!(a.langs, vec![LanguageCode::Jpn]);

        let a = audio(&audio_desc(0x11, Some(*b"xxx")));
        assert!(!a.is_main);
        assert_eq!(a.langs, vec![LanguageCode::Jpn, LanguageCode::Etc]);
    }

    #[test]
    fn test_series_expiry() {
        let mut desc = SeriesDescriptor {
            series_id: 42,
            repeat_label: 0,
            program_pattern: 1,
            expire_date: None,
            episode_number: 3,
            last_episode_number: 12,
            series_name: Bytes::new(),
        };
        assert_eq!(series(&desc).expires_at, -1);

        // MJD 58849 = 2020-01-01, 00:00 JST
        desc.expire_date = Some(58849);
        assert_eq!(series(&desc).expires_at, 1_577_804_400_000);
        assert_eq!(series(&desc).last_episode, 12);
    }

    #[test]
    fn test_related_items_same_network() {
        let desc = EventGroupDescriptor {
            group_type: 1,
            events: vec![GroupEvent { service_id: 101, event_id: 7 }],
            other_network_events: vec![],
        };
        assert_eq!(
            related_items(&desc),
            vec![ProgramRelatedItem {
                item_type: RelatedItemType::Shared,
                network_id: None,
                service_id: 101,
                event_id: 7,
            }]
        );
    }

    #[test]
    fn test_related_items_other_network() {
        let desc = EventGroupDescriptor {
            group_type: 4,
            events: vec![GroupEvent { service_id: 1, event_id: 1 }],
            other_network_events: vec![OtherNetworkEvent {
                original_network_id: 4,
                transport_stream_id: 16625,
                service_id: 211,
                event_id: 9,
            }],
        };
        let items = related_items(&desc);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].item_type, RelatedItemType::Relay);
        assert_eq!(items[0].network_id, Some(4));
        assert_eq!(items[0].service_id, 211);
    }
}

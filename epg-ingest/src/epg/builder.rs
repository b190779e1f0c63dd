//! Synchronous guide builder: applies EIT events to the program store.

use epg_protocol::{time, EitEvent, EitSection, Program, ProgramId, ProgramPatch, ProgramSchedule};
use log::{debug, log_enabled, trace, warn, Level};

use super::state::EventIndex;
use super::{EpgConfig, EpgStats};
use crate::store::ProgramStore;

/// Owns the store and the event index for the lifetime of one stream.
pub struct EpgBuilder<S> {
    store: S,
    index: EventIndex,
    config: EpgConfig,
    stats: EpgStats,
}

impl<S: ProgramStore> EpgBuilder<S> {
    pub fn new(store: S, config: EpgConfig) -> Self {
        Self {
            store,
            index: EventIndex::new(),
            config,
            stats: EpgStats::default(),
        }
    }

    pub fn config(&self) -> &EpgConfig {
        &self.config
    }

    pub fn stats(&self) -> &EpgStats {
        &self.stats
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Number of events currently tracked.
    pub fn tracked_events(&self) -> usize {
        self.index.len()
    }

    pub fn begin_section(&mut self, section: &EitSection) {
        self.stats.sections += 1;
        trace!(
            "section table_id=0x{:02X} version={} onid={} sid={} events={}",
            section.table_id,
            section.version_number,
            section.original_network_id,
            section.service_id,
            section.events.len()
        );
    }

    /// Apply every event of a section without yielding.
    pub fn process_section(&mut self, section: &EitSection) {
        self.begin_section(section);
        for event in &section.events {
            self.process_event(section, event);
        }
    }

    /// Resolve the event's state, then run each descriptor through its gate.
    pub fn process_event(&mut self, section: &EitSection, event: &EitEvent) {
        self.stats.events += 1;

        let Some(id) = self.resolve_event(section, event) else {
            return;
        };

        for descriptor in &event.descriptors {
            let Some(state) = self.index.get_mut(id) else {
                return;
            };
            let patch = state.apply_descriptor(
                section.table_id,
                section.version_number,
                descriptor,
                self.config.keyed_version_check,
            );
            match patch {
                Some(patch) => self.update(id, patch),
                None => match descriptor.tag() {
                    Some(tag) => trace!("program {} descriptor 0x{:02X} not applied", id, tag),
                    None => trace!("program {} unknown descriptor skipped", id),
                },
            }
        }
    }

    /// Tear down: drop the event index and hand the store back.
    pub fn into_store(self) -> S {
        debug!("dropping state for {} events", self.index.len());
        self.store
    }

    fn resolve_event(&mut self, section: &EitSection, event: &EitEvent) -> Option<ProgramId> {
        let network_id = section.original_network_id;
        let service_id = section.service_id;
        let id = ProgramId::new(network_id, service_id, event.event_id);
        let start_at = time::decode_start_time(&event.start_time);

        if let Some(state) = self.index.get_mut(id) {
            if state.admit_schedule(section.table_id, section.version_number) {
                // An unknown start time never overwrites a known schedule
                if let Some(start_at) = start_at {
                    let schedule = self.schedule(section, event, start_at);
                    self.update(id, ProgramPatch::Schedule(schedule));
                }
            }
            return Some(id);
        }

        match self.store.get(id) {
            Ok(Some(_)) => {
                trace!("program {} already stored, tracking fresh state", id);
            }
            Ok(None) => {
                let Some(start_at) = start_at else {
                    self.stats.dropped_events += 1;
                    trace!("program {} has no start time, skipped", id);
                    return None;
                };
                let schedule = self.schedule(section, event, start_at);
                let program = Program::new(network_id, service_id, event.event_id, schedule);
                if let Err(e) = self.store.add(program) {
                    self.stats.store_errors += 1;
                    warn!("Failed to create program {}: {}", id, e);
                    return None;
                }
                self.stats.programs_created += 1;
                self.stats.store_writes += 1;
                debug!("program {} created", id);
            }
            Err(e) => {
                self.stats.store_errors += 1;
                warn!("Failed to look up program {}: {}", id, e);
                return None;
            }
        }

        self.index.get_or_create(id);
        Some(id)
    }

    fn schedule(&self, section: &EitSection, event: &EitEvent, start_at: i64) -> ProgramSchedule {
        ProgramSchedule {
            start_at,
            duration: time::decode_duration_or(&event.duration, self.config.unknown_duration_ms),
            is_free: !event.free_ca_mode,
            is_present_following: section.is_present_following(),
        }
    }

    fn update(&mut self, id: ProgramId, patch: ProgramPatch) {
        let kind = patch.kind();
        if log_enabled!(Level::Trace) {
            match &patch {
                ProgramPatch::Video(video) => trace!("program {} video {}", id, video),
                ProgramPatch::Audios(audios) => {
                    for audio in audios {
                        trace!("program {} audio {}", id, audio);
                    }
                }
                _ => {}
            }
        }
        match self.store.update(id, patch) {
            Ok(()) => {
                self.stats.store_writes += 1;
                trace!("program {} updated: {}", id, kind);
            }
            Err(e) => {
                self.stats.store_errors += 1;
                warn!("Failed to update {} of program {}: {}", kind, id, e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::epg::KeyedVersionCheck;
    use crate::store::{MemoryStore, StoreError};
    use bytes::Bytes;
    use epg_protocol::{
        ComponentDescriptor, Descriptor, SeriesDescriptor, ShortEventDescriptor, VideoResolution,
        VideoType,
    };

    const START: [u8; 5] = [0xE5, 0xE1, 0x12, 0x34, 0x56];
    const START_MS: i64 = 1_577_849_696_000;

    fn section(table_id: u8, version: u8, events: Vec<EitEvent>) -> EitSection {
        EitSection {
            table_id,
            version_number: version,
            original_network_id: 32736,
            transport_stream_id: 32736,
            service_id: 1024,
            events,
        }
    }

    fn event(start_time: [u8; 5], descriptors: Vec<Descriptor>) -> EitEvent {
        EitEvent {
            event_id: 100,
            start_time,
            duration: [0x00, 0x30, 0x00],
            free_ca_mode: false,
            descriptors,
        }
    }

    fn short(name: &[u8]) -> Descriptor {
        Descriptor::ShortEvent(ShortEventDescriptor {
            iso_639_language_code: *b"jpn",
            event_name: Bytes::copy_from_slice(name),
            text: Bytes::new(),
        })
    }

    fn id() -> ProgramId {
        ProgramId::new(32736, 1024, 100)
    }

    fn builder() -> EpgBuilder<MemoryStore> {
        EpgBuilder::new(MemoryStore::new(), EpgConfig::default())
    }

    #[test]
    fn test_creates_program_with_schedule() {
        let mut b = builder();
        b.process_section(&section(0x4E, 1, vec![event(START, vec![])]));

        let program = b.store().program(id()).unwrap();
        assert_eq!(program.start_at, START_MS);
        assert_eq!(program.duration, 30 * 60 * 1000);
        assert!(program.is_free);
        assert!(program.is_present_following);
        assert_eq!(b.stats().programs_created, 1);
    }

    #[test]
    fn test_unknown_start_time_drops_event() {
        let mut b = builder();
        b.process_section(&section(0x50, 1, vec![event([0xFF; 5], vec![short(b"x")])]));

        assert!(b.store().is_empty());
        assert!(b.store().writes().is_empty());
        assert_eq!(b.tracked_events(), 0);
        assert_eq!(b.stats().dropped_events, 1);
    }

    #[test]
    fn test_unknown_duration_uses_placeholder() {
        let mut b = EpgBuilder::new(
            MemoryStore::new(),
            EpgConfig {
                unknown_duration_ms: 5,
                ..EpgConfig::default()
            },
        );
        let mut e = event(START, vec![]);
        e.duration = [0xFF; 3];
        b.process_section(&section(0x50, 1, vec![e]));

        assert_eq!(b.store().program(id()).unwrap().duration, 5);
    }

    #[test]
    fn test_reschedule_on_new_version_only() {
        let mut b = builder();
        b.process_section(&section(0x50, 1, vec![event(START, vec![])]));
        // Creation does not record the scheduling version
        b.process_section(&section(0x50, 1, vec![event(START, vec![])]));
        assert_eq!(b.store().updates_for(id()).len(), 1);

        b.process_section(&section(0x50, 1, vec![event(START, vec![])]));
        assert_eq!(b.store().updates_for(id()).len(), 1);

        let mut moved = START;
        moved[2] = 0x13;
        b.process_section(&section(0x50, 2, vec![event(moved, vec![])]));
        assert_eq!(b.store().updates_for(id()).len(), 2);
        assert_eq!(
            b.store().program(id()).unwrap().start_at,
            START_MS + 3_600_000
        );
    }

    #[test]
    fn test_unknown_start_time_never_overwrites() {
        let mut b = builder();
        b.process_section(&section(0x50, 1, vec![event(START, vec![])]));
        b.process_section(&section(0x50, 2, vec![event([0xFF; 5], vec![short(b"")])]));

        let program = b.store().program(id()).unwrap();
        assert_eq!(program.start_at, START_MS);
        // Only the short event was written
        assert!(b
            .store()
            .updates_for(id())
            .iter()
            .all(|p| p.kind() == "short_event"));
    }

    #[test]
    fn test_existing_program_is_reused() {
        let mut store = MemoryStore::new();
        let mut seeded = Program::new(
            32736,
            1024,
            100,
            ProgramSchedule {
                start_at: 1,
                duration: 1,
                is_free: true,
                is_present_following: false,
            },
        );
        seeded.name = Some("seeded".to_string());
        store.insert(seeded);

        let mut b = EpgBuilder::new(store, EpgConfig::default());
        // Unknown start time is fine when the program already exists
        b.process_section(&section(0x50, 1, vec![event([0xFF; 5], vec![short(&[0x0E, b'n'])])]));

        assert_eq!(b.stats().programs_created, 0);
        assert_eq!(b.tracked_events(), 1);
        assert_eq!(b.store().program(id()).unwrap().name.as_deref(), Some("n"));
        assert_eq!(b.store().program(id()).unwrap().start_at, 1);
    }

    #[test]
    fn test_series_descriptor_is_written() {
        let mut b = builder();
        let series = Descriptor::Series(SeriesDescriptor {
            series_id: 7,
            episode_number: 2,
            ..Default::default()
        });
        b.process_section(&section(0x50, 1, vec![event(START, vec![series])]));

        let program = b.store().program(id()).unwrap();
        let s = program.series.as_ref().unwrap();
        assert_eq!(s.id, 7);
        assert_eq!(s.episode, 2);
        assert_eq!(s.expires_at, -1);
    }

    #[test]
    fn test_video_written_and_unknown_descriptor_ignored() {
        let mut b = builder();
        let component = Descriptor::Component(ComponentDescriptor {
            stream_content: 0x05,
            component_type: 0xB3,
            component_tag: 0,
            iso_639_language_code: *b"jpn",
            text: Bytes::new(),
        });
        b.process_section(&section(
            0x50,
            1,
            vec![event(START, vec![Descriptor::Unknown, component])],
        ));

        let video = b.store().program(id()).unwrap().video.clone().unwrap();
        assert_eq!(video.video_type, Some(VideoType::H264));
        assert_eq!(video.resolution, Some(VideoResolution::R1080i));
        // create + video, nothing for the unknown descriptor
        assert_eq!(b.stats().store_writes, 2);
        assert_eq!(b.stats().store_errors, 0);
    }

    struct FailingStore;

    impl ProgramStore for FailingStore {
        fn get(&self, _id: ProgramId) -> Result<Option<Program>, StoreError> {
            Ok(None)
        }

        fn add(&mut self, _program: Program) -> Result<(), StoreError> {
            Err(StoreError::Backend("disk full".to_string()))
        }

        fn update(&mut self, id: ProgramId, _patch: ProgramPatch) -> Result<(), StoreError> {
            Err(StoreError::NotFound(id))
        }
    }

    #[test]
    fn test_store_errors_do_not_stop_processing() {
        let mut b = EpgBuilder::new(
            FailingStore,
            EpgConfig {
                keyed_version_check: KeyedVersionCheck::Changed,
                ..EpgConfig::default()
            },
        );
        let mut second = event(START, vec![short(b"x")]);
        second.event_id = 101;
        b.process_section(&section(0x50, 1, vec![event(START, vec![short(b"x")]), second]));

        assert_eq!(b.stats().events, 2);
        assert_eq!(b.stats().store_errors, 2);
        // Failed creation leaves no state behind
        assert_eq!(b.tracked_events(), 0);
    }
}

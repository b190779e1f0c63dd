//! Per-event version state.

use std::collections::{BTreeMap, HashMap};

use epg_protocol::{Descriptor, ProgramAudio, ProgramId, ProgramPatch, ProgramRelatedItem};

use super::descriptors;
use super::extended::ExtendedText;
use super::version::{KeyedVersionCheck, KeyedVersionDict, VersionDict};

/// Everything remembered about one (network, service, event) triple.
#[derive(Debug)]
pub struct EventState {
    program_id: ProgramId,
    schedule: VersionDict,
    short: VersionDict,
    extended: ExtendedText,
    component: VersionDict,
    content: VersionDict,
    audio: KeyedVersionDict,
    audios: BTreeMap<u8, ProgramAudio>,
    series: VersionDict,
    group: KeyedVersionDict,
    groups: BTreeMap<u8, Vec<ProgramRelatedItem>>,
}

impl EventState {
    pub fn new(program_id: ProgramId) -> Self {
        Self {
            program_id,
            schedule: VersionDict::new(),
            short: VersionDict::new(),
            extended: ExtendedText::new(),
            component: VersionDict::new(),
            content: VersionDict::new(),
            audio: KeyedVersionDict::new(),
            audios: BTreeMap::new(),
            series: VersionDict::new(),
            group: KeyedVersionDict::new(),
            groups: BTreeMap::new(),
        }
    }

    pub fn program_id(&self) -> ProgramId {
        self.program_id
    }

    /// Version gate for the scheduling fields.
    pub fn admit_schedule(&mut self, table_id: u8, version_number: u8) -> bool {
        self.schedule.admit(table_id, version_number)
    }

    /// Run one descriptor through its version gate and decoder.
    ///
    /// Returns the update to issue, if any.
    pub fn apply_descriptor(
        &mut self,
        table_id: u8,
        version_number: u8,
        descriptor: &Descriptor,
        keyed_check: KeyedVersionCheck,
    ) -> Option<ProgramPatch> {
        match descriptor {
            Descriptor::ShortEvent(d) => self
                .short
                .admit(table_id, version_number)
                .then(|| descriptors::short_event(d)),

            Descriptor::ExtendedEvent(d) => self
                .extended
                .push(table_id, version_number, d)
                .map(ProgramPatch::Extended),

            Descriptor::Component(d) => self
                .component
                .admit(table_id, version_number)
                .then(|| ProgramPatch::Video(descriptors::video(d))),

            Descriptor::Content(d) => self
                .content
                .admit(table_id, version_number)
                .then(|| ProgramPatch::Genres(descriptors::genres(d))),

            Descriptor::AudioComponent(d) => {
                if !self
                    .audio
                    .admit(table_id, d.component_tag, version_number, keyed_check)
                {
                    return None;
                }
                self.audios.insert(d.component_tag, descriptors::audio(d));
                Some(ProgramPatch::Audios(self.audios.values().cloned().collect()))
            }

            Descriptor::Series(d) => self
                .series
                .admit(table_id, version_number)
                .then(|| ProgramPatch::Series(descriptors::series(d))),

            Descriptor::EventGroup(d) => {
                if !self
                    .group
                    .admit(table_id, d.group_type, version_number, keyed_check)
                {
                    return None;
                }
                self.groups.insert(d.group_type, descriptors::related_items(d));
                Some(ProgramPatch::RelatedItems(
                    self.groups.values().flatten().copied().collect(),
                ))
            }

            Descriptor::Unknown => None,
        }
    }
}

/// Flat index of event states keyed by program id.
///
/// Entries are created at most once and only dropped with the whole index.
#[derive(Debug, Default)]
pub struct EventIndex {
    events: HashMap<ProgramId, EventState>,
}

impl EventIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_mut(&mut self, id: ProgramId) -> Option<&mut EventState> {
        self.events.get_mut(&id)
    }

    /// Fetch the state for `id`, creating a fresh one if absent.
    pub fn get_or_create(&mut self, id: ProgramId) -> &mut EventState {
        self.events.entry(id).or_insert_with(|| EventState::new(id))
    }

    pub fn contains(&self, id: ProgramId) -> bool {
        self.events.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

//! Per-property version dictionaries.
//!
//! A dictionary maps an EIT table id to the last admitted version number.
//! Once a present/following table id has been recorded, schedule tables can
//! no longer update the property.

use std::collections::BTreeMap;

use epg_protocol::table_id;
use serde::{Deserialize, Serialize};

fn blocked_by_present_following<V>(recorded: &BTreeMap<u8, V>, incoming: u8) -> bool {
    let has_pf = recorded.contains_key(&table_id::EIT_PF_ACTUAL)
        || recorded.contains_key(&table_id::EIT_PF_OTHER);
    has_pf && !table_id::is_present_following(incoming)
}

/// Single-key version dictionary.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VersionDict {
    versions: BTreeMap<u8, u8>,
}

impl VersionDict {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a section with this table id and version carries news for
    /// the property.
    pub fn is_out_of_date(&self, table_id: u8, version_number: u8) -> bool {
        if blocked_by_present_following(&self.versions, table_id) {
            return false;
        }
        self.versions.get(&table_id) != Some(&version_number)
    }

    pub fn record(&mut self, table_id: u8, version_number: u8) {
        self.versions.insert(table_id, version_number);
    }

    /// Check and record in one step. Returns whether the section was admitted.
    pub fn admit(&mut self, table_id: u8, version_number: u8) -> bool {
        if !self.is_out_of_date(table_id, version_number) {
            return false;
        }
        self.record(table_id, version_number);
        true
    }

    pub fn get(&self, table_id: u8) -> Option<u8> {
        self.versions.get(&table_id).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.versions.is_empty()
    }
}

/// How a keyed dictionary compares the stored and incoming version.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyedVersionCheck {
    /// Admit when the stored version equals the incoming one.
    ///
    /// Matches the historical behaviour of the guide builder: a key that
    /// was never recorded never compares equal, so keyed properties are
    /// effectively never updated in this mode.
    #[default]
    Equal,
    /// Admit when the stored version differs, like [`VersionDict`].
    Changed,
}

/// Two-level dictionary: table id, then a sub-record key (component tag or
/// group type).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyedVersionDict {
    versions: BTreeMap<u8, BTreeMap<u8, u8>>,
}

impl KeyedVersionDict {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check and record in one step.
    ///
    /// Evaluating a table id registers it even when nothing is admitted, so a
    /// present/following sighting blocks later schedule sections for every key.
    pub fn admit(
        &mut self,
        table_id: u8,
        key: u8,
        version_number: u8,
        check: KeyedVersionCheck,
    ) -> bool {
        self.versions.entry(table_id).or_default();

        if blocked_by_present_following(&self.versions, table_id) {
            return false;
        }

        let stored = self.versions.get(&table_id).and_then(|keys| keys.get(&key));
        let admitted = match check {
            KeyedVersionCheck::Equal => stored == Some(&version_number),
            KeyedVersionCheck::Changed => stored != Some(&version_number),
        };

        if admitted {
            self.versions
                .entry(table_id)
                .or_default()
                .insert(key, version_number);
        }
        admitted
    }

    pub fn get(&self, table_id: u8, key: u8) -> Option<u8> {
        self.versions.get(&table_id)?.get(&key).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PF: u8 = 0x4E;
    const PF_OTHER: u8 = 0x4F;
    const SCHED: u8 = 0x50;

    #[test]
    fn test_dedup_and_change() {
        let mut dict = VersionDict::new();
        assert!(dict.admit(SCHED, 1));
        assert!(!dict.admit(SCHED, 1));
        assert!(dict.admit(SCHED, 2));
        assert_eq!(dict.get(SCHED), Some(2));
    }

    #[test]
    fn test_versions_are_tracked_per_table() {
        let mut dict = VersionDict::new();
        assert!(dict.admit(0x50, 3));
        assert!(dict.admit(0x51, 3));
        assert!(!dict.admit(0x50, 3));
    }

    #[test]
    fn test_present_following_takes_priority() {
        let mut dict = VersionDict::new();
        assert!(dict.admit(SCHED, 1));
        assert!(dict.admit(PF, 5));
        // Schedule can no longer update, whatever the version
        assert!(!dict.admit(SCHED, 2));
        assert!(!dict.admit(0x60, 7));
        // Present/following still can
        assert!(dict.admit(PF_OTHER, 1));
        assert!(dict.admit(PF, 6));
        assert_eq!(dict.get(SCHED), Some(1));
    }

    #[test]
    fn test_is_out_of_date_does_not_record() {
        let dict = VersionDict::new();
        assert!(dict.is_out_of_date(SCHED, 1));
        assert!(dict.is_empty());
    }

    #[test]
    fn test_keyed_equal_mode_never_admits_fresh_keys() {
        // Historical comparison: stored == incoming. Nothing is ever stored,
        // so nothing is ever admitted.
        let mut dict = KeyedVersionDict::new();
        assert!(!dict.admit(SCHED, 1, 0, KeyedVersionCheck::Equal));
        assert!(!dict.admit(SCHED, 1, 0, KeyedVersionCheck::Equal));
        assert!(!dict.admit(PF, 1, 3, KeyedVersionCheck::Equal));
        assert_eq!(dict.get(SCHED, 1), None);
    }

    #[test]
    fn test_keyed_changed_mode() {
        let mut dict = KeyedVersionDict::new();
        assert!(dict.admit(SCHED, 1, 0, KeyedVersionCheck::Changed));
        assert!(dict.admit(SCHED, 2, 0, KeyedVersionCheck::Changed));
        assert!(!dict.admit(SCHED, 1, 0, KeyedVersionCheck::Changed));
        assert!(dict.admit(SCHED, 1, 1, KeyedVersionCheck::Changed));
        assert_eq!(dict.get(SCHED, 1), Some(1));
        assert_eq!(dict.get(SCHED, 2), Some(0));
    }

    #[test]
    fn test_keyed_present_following_registers_on_evaluation() {
        let mut dict = KeyedVersionDict::new();
        // Rejected in equal mode, but the table id is now known
        assert!(!dict.admit(PF, 1, 0, KeyedVersionCheck::Equal));
        assert!(!dict.admit(SCHED, 1, 0, KeyedVersionCheck::Changed));
        assert!(dict.admit(PF, 1, 0, KeyedVersionCheck::Changed));
    }
}

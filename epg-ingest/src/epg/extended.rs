//! Reassembly of extended event descriptors.
//!
//! Long item texts are split over several descriptors, numbered
//! `0..=last_descriptor_number`, which may arrive in different sections and in
//! any order. Items with an empty description continue the text of the
//! previous item.

use std::collections::BTreeMap;

use epg_protocol::{ExtendedEventDescriptor, ExtendedEventItem};
use log::trace;

use super::version::VersionDict;
use crate::aribb24::decode_arib_string;

/// Reassembly state of one event's extended text.
#[derive(Debug, Default)]
pub struct ExtendedText {
    version: VersionDict,
    slots: Option<Vec<Option<Vec<ExtendedEventItem>>>>,
    done: bool,
}

impl ExtendedText {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one fragment. Returns the label to text map once every fragment
    /// of the current version has been received.
    pub fn push(
        &mut self,
        table_id: u8,
        version_number: u8,
        descriptor: &ExtendedEventDescriptor,
    ) -> Option<BTreeMap<String, String>> {
        if self.version.admit(table_id, version_number) {
            let size = descriptor.last_descriptor_number as usize + 1;
            self.slots = Some(vec![None; size]);
            self.done = false;
        } else if self.done {
            return None;
        }

        let slots = self.slots.as_mut()?;
        let slot = slots.get_mut(descriptor.descriptor_number as usize)?;
        if slot.is_some() {
            return None;
        }
        *slot = Some(descriptor.items.clone());

        if slots.iter().any(Option::is_none) {
            trace!(
                "extended fragment {}/{} stored",
                descriptor.descriptor_number,
                descriptor.last_descriptor_number
            );
            return None;
        }

        let items = self.slots.take()?.into_iter().flatten().flatten();
        self.done = true;
        Some(assemble(items))
    }

    /// Whether the current version has been fully assembled.
    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Whether fragments of the current version are being buffered.
    pub fn is_pending(&self) -> bool {
        self.slots.is_some()
    }
}

/// Concatenate item bytes per label, then decode each buffer.
fn assemble(items: impl Iterator<Item = ExtendedEventItem>) -> BTreeMap<String, String> {
    let mut raw: BTreeMap<String, Vec<u8>> = BTreeMap::new();
    let mut current = String::new();

    for item in items {
        if !item.description.is_empty() {
            current = decode_arib_string(&item.description);
        }
        raw.entry(current.clone())
            .or_default()
            .extend_from_slice(&item.item);
    }

    raw.into_iter()
        .map(|(label, bytes)| (label, decode_arib_string(&bytes)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    // "番組内容" / "出演者" in JIS X 0208
    const LABEL_CONTENT: &[u8] = &[0x48, 0x56, 0x41, 0x48, 0x46, 0x62, 0x4D, 0x46];
    const LABEL_CAST: &[u8] = &[0x3D, 0x50, 0x31, 0x69, 0x3C, 0x54];

    fn item(description: &[u8], text: &[u8]) -> ExtendedEventItem {
        ExtendedEventItem {
            description: Bytes::copy_from_slice(description),
            item: Bytes::copy_from_slice(text),
        }
    }

    fn fragment(number: u8, last: u8, items: Vec<ExtendedEventItem>) -> ExtendedEventDescriptor {
        ExtendedEventDescriptor {
            descriptor_number: number,
            last_descriptor_number: last,
            iso_639_language_code: *b"jpn",
            items,
            text: Bytes::new(),
        }
    }

    fn fragments() -> Vec<ExtendedEventDescriptor> {
        vec![
            // LS1 switches GL to alphanumeric for the item text
            fragment(0, 2, vec![item(LABEL_CONTENT, &[0x0E, b'a', b'b'])]),
            fragment(1, 2, vec![item(&[], &[0x0E, b'c']), item(LABEL_CAST, &[0x0E, b'x'])]),
            fragment(2, 2, vec![item(&[], &[0x0E, b'y'])]),
        ]
    }

    fn expected() -> BTreeMap<String, String> {
        let mut map = BTreeMap::new();
        map.insert("番組内容".to_string(), "abc".to_string());
        map.insert("出演者".to_string(), "xy".to_string());
        map
    }

    #[test]
    fn test_assembles_in_order() {
        let mut text = ExtendedText::new();
        let frags = fragments();

        assert_eq!(text.push(0x50, 1, &frags[0]), None);
        assert!(text.is_pending());
        assert_eq!(text.push(0x50, 1, &frags[1]), None);
        assert_eq!(text.push(0x50, 1, &frags[2]), Some(expected()));
        assert!(text.is_done());
        assert!(!text.is_pending());
    }

    #[test]
    fn test_assembles_in_any_order() {
        for order in [[2, 0, 1], [1, 2, 0], [2, 1, 0]] {
            let mut text = ExtendedText::new();
            let frags = fragments();
            let mut result = None;
            for i in order {
                result = text.push(0x50, 1, &frags[i]);
            }
            assert_eq!(result, Some(expected()), "order {:?}", order);
        }
    }

    #[test]
    fn test_duplicate_and_late_fragments_are_ignored() {
        let mut text = ExtendedText::new();
        let frags = fragments();

        assert_eq!(text.push(0x50, 1, &frags[0]), None);
        // Same slot again before completion
        assert_eq!(text.push(0x50, 1, &frags[0]), None);
        text.push(0x50, 1, &frags[1]);
        assert!(text.push(0x50, 1, &frags[2]).is_some());

        // After completion, same version
        for frag in &frags {
            assert_eq!(text.push(0x50, 1, frag), None);
        }
    }

    #[test]
    fn test_version_change_restarts_assembly() {
        let mut text = ExtendedText::new();
        let single = fragment(0, 0, vec![item(LABEL_CAST, &[0x0E, b'a'])]);
        assert!(text.push(0x50, 1, &single).is_some());

        let updated = fragment(0, 0, vec![item(LABEL_CAST, &[0x0E, b'b'])]);
        let map = text.push(0x50, 2, &updated).unwrap();
        assert_eq!(map.get("出演者").map(String::as_str), Some("b"));
    }

    #[test]
    fn test_out_of_range_fragment_is_ignored() {
        let mut text = ExtendedText::new();
        let frags = fragments();
        text.push(0x50, 1, &frags[0]);

        let stray = fragment(5, 2, vec![item(LABEL_CAST, &[0x0E, b'z'])]);
        assert_eq!(text.push(0x50, 1, &stray), None);
        text.push(0x50, 1, &frags[1]);
        assert_eq!(text.push(0x50, 1, &frags[2]), Some(expected()));
    }

    #[test]
    fn test_leading_continuation_uses_empty_label() {
        let mut text = ExtendedText::new();
        let frag = fragment(0, 0, vec![item(&[], &[0x0E, b'q'])]);
        let map = text.push(0x4E, 0, &frag).unwrap();
        assert_eq!(map.get("").map(String::as_str), Some("q"));
    }
}

//! Generic Container element keying and the content-package multiplexer.
//!
//! A Generic Container element key is the 12-byte registered prefix
//! `06 0E 2B 34 01 02 01 01 0D 01 03 01` followed by four variable
//! bytes: item type, element count, element type, element number.

use mxf_core::Ul;
use mxf_klv::write_klv;

const ELEMENT_KEY_PREFIX: [u8; 12] = [
    0x06, 0x0E, 0x2B, 0x34, 0x01, 0x02, 0x01, 0x01, 0x0D, 0x01, 0x03, 0x01,
];

/// Essence item-type class, independent of CP/non-CP framing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemType {
    System,
    Picture,
    Sound,
    Data,
    Compound,
}

impl ItemType {
    /// Byte 13 of the element key (item-type class, CP vs non-CP family).
    fn byte(self, cp_compatible: bool) -> u8 {
        match (self, cp_compatible) {
            (ItemType::System, true) => 0x04,
            (ItemType::System, false) => 0x14,
            (ItemType::Picture, true) => 0x05,
            (ItemType::Picture, false) => 0x15,
            (ItemType::Sound, true) => 0x06,
            (ItemType::Sound, false) => 0x16,
            (ItemType::Data, true) => 0x07,
            (ItemType::Data, false) => 0x17,
            // Compound essence has no CP-compatible family.
            (ItemType::Compound, _) => 0x18,
        }
    }
}

/// A numeric handle for a registered body stream, stable across the
/// life of a [`GenericContainerWriter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StreamId(pub u32);

#[derive(Debug, Clone)]
struct StreamDef {
    id: StreamId,
    item_type: ItemType,
    cp_compatible: bool,
    element_type: u8,
    write_order: u32,
}

/// Builds Generic Container element keys for a set of registered
/// streams and flushes them in write order at content-package
/// boundaries.
///
/// Element counts (byte 14 of the key) are fixed the first time a
/// given `(item_type, cp_compatible)` family is written, per SMPTE 379:
/// later streams in the same family reuse the count assigned to the
/// family, not a per-stream one.
pub struct GenericContainerWriter {
    streams: Vec<StreamDef>,
    counts: std::collections::HashMap<(ItemType, bool), u8>,
    pending: Vec<(StreamId, Vec<u8>)>,
    next_write_order: u32,
}

impl Default for GenericContainerWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl GenericContainerWriter {
    pub fn new() -> Self {
        Self {
            streams: Vec::new(),
            counts: std::collections::HashMap::new(),
            pending: Vec::new(),
            next_write_order: 0,
        }
    }

    fn add_stream(&mut self, id: StreamId, item_type: ItemType, cp_compatible: bool, element_type: u8) {
        let write_order = self.next_write_order;
        self.next_write_order += 1;
        self.streams.push(StreamDef {
            id,
            item_type,
            cp_compatible,
            element_type,
            write_order,
        });
    }

    pub fn add_system_element(&mut self, id: StreamId, cp_compatible: bool, element_type: u8) {
        self.add_stream(id, ItemType::System, cp_compatible, element_type)
    }

    pub fn add_picture_element(&mut self, id: StreamId, cp_compatible: bool, element_type: u8) {
        self.add_stream(id, ItemType::Picture, cp_compatible, element_type)
    }

    pub fn add_sound_element(&mut self, id: StreamId, cp_compatible: bool, element_type: u8) {
        self.add_stream(id, ItemType::Sound, cp_compatible, element_type)
    }

    pub fn add_data_element(&mut self, id: StreamId, cp_compatible: bool, element_type: u8) {
        self.add_stream(id, ItemType::Data, cp_compatible, element_type)
    }

    pub fn add_compound_element(&mut self, id: StreamId, element_type: u8) {
        self.add_stream(id, ItemType::Compound, false, element_type)
    }

    /// Override a stream's write-order position (default is declaration
    /// order).
    pub fn set_write_order(&mut self, id: StreamId, write_order: u32) {
        if let Some(s) = self.streams.iter_mut().find(|s| s.id == id) {
            s.write_order = write_order;
        }
    }

    /// Queue one element's payload for the next [`Self::start_new_cp`]
    /// flush.
    pub fn queue(&mut self, id: StreamId, data: Vec<u8>) {
        self.pending.push((id, data));
    }

    fn element_key(&self, def: &StreamDef) -> [u8; 16] {
        let family = (def.item_type, def.cp_compatible);
        let count = *self.counts.get(&family).expect("element count assigned before key build");
        let mut key = [0u8; 16];
        key[..12].copy_from_slice(&ELEMENT_KEY_PREFIX);
        key[12] = def.item_type.byte(def.cp_compatible);
        key[13] = count;
        key[14] = def.element_type;
        key[15] = def.id.0 as u8;
        key
    }

    /// Flush all queued elements in ascending write-order, assigning
    /// each family's element count on first use. Returns the KLV bytes
    /// for each element, in emission order.
    pub fn start_new_cp(&mut self) -> Vec<Vec<u8>> {
        let mut queued = std::mem::take(&mut self.pending);
        queued.sort_by_key(|(id, _)| {
            self.streams
                .iter()
                .find(|s| s.id == *id)
                .map(|s| s.write_order)
                .unwrap_or(u32::MAX)
        });

        let mut out = Vec::with_capacity(queued.len());
        for (id, data) in queued {
            let def = self
                .streams
                .iter()
                .find(|s| s.id == id)
                .expect("queued element for unregistered stream")
                .clone();
            let family = (def.item_type, def.cp_compatible);
            self.counts.entry(family).or_insert(1);
            let key = self.element_key(&def);
            let mut buf = Vec::with_capacity(data.len() + 32);
            write_klv(&mut buf, &Ul::new(key), &data);
            out.push(buf);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn element_key_encodes_item_type_and_number() {
        let mut gc = GenericContainerWriter::new();
        gc.add_picture_element(StreamId(1), true, 0x01);
        gc.queue(StreamId(1), vec![0xAA; 8]);
        let klvs = gc.start_new_cp();
        assert_eq!(klvs.len(), 1);
        assert_eq!(&klvs[0][..12], &ELEMENT_KEY_PREFIX);
        assert_eq!(klvs[0][12], 0x05); // Picture, CP-compatible
        assert_eq!(klvs[0][14], 0x01); // element type
        assert_eq!(klvs[0][15], 0x01); // element number
    }

    #[test]
    fn flush_orders_by_write_order_not_queue_order() {
        let mut gc = GenericContainerWriter::new();
        gc.add_sound_element(StreamId(2), true, 0x01);
        gc.add_picture_element(StreamId(1), true, 0x01);
        gc.set_write_order(StreamId(1), 0);
        gc.set_write_order(StreamId(2), 1);

        gc.queue(StreamId(2), vec![0x02]);
        gc.queue(StreamId(1), vec![0x01]);

        let klvs = gc.start_new_cp();
        assert_eq!(klvs[0][12], 0x05); // picture first
        assert_eq!(klvs[1][12], 0x06); // sound second
    }

    #[test]
    fn element_count_is_stable_across_content_packages() {
        let mut gc = GenericContainerWriter::new();
        gc.add_picture_element(StreamId(1), true, 0x01);
        gc.queue(StreamId(1), vec![0x00]);
        let first = gc.start_new_cp();
        gc.queue(StreamId(1), vec![0x00]);
        let second = gc.start_new_cp();
        assert_eq!(first[0][13], second[0][13]);
    }
}

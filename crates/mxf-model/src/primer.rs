//! Primer: the per-partition two-byte-tag <-> 16-byte-UL map that makes a
//! local Set's item tags meaningful.

use std::collections::HashMap;

use mxf_core::primitives::{write_u16, Reader};
use mxf_core::{Tag, Ul};

use crate::error::{Error, Result};

/// First local tag a writer is free to assign; tags below this are
/// reserved for Primer/Partition-local bookkeeping in some profiles, and
/// mxflib's convention of starting dynamic allocation at 0x8000 is kept
/// here so static and dynamic tags never collide.
const FIRST_DYNAMIC_TAG: u16 = 0x8000;

#[derive(Debug, Default, Clone)]
pub struct Primer {
    tag_to_ul: HashMap<u16, Ul>,
    ul_to_tag: HashMap<Ul, u16>,
    next_tag: u16,
}

impl Primer {
    pub fn new() -> Self {
        Self {
            tag_to_ul: HashMap::new(),
            ul_to_tag: HashMap::new(),
            next_tag: FIRST_DYNAMIC_TAG,
        }
    }

    /// Seed the primer with statically-assigned tags (e.g. from a
    /// dictionary's `static_primer`), skipping any that collide with an
    /// already-registered UL or tag.
    pub fn seed(&mut self, entries: impl IntoIterator<Item = (u16, Ul)>) {
        for (tag, ul) in entries {
            self.insert_fixed(tag, ul);
        }
    }

    fn insert_fixed(&mut self, tag: u16, ul: Ul) {
        if self.tag_to_ul.contains_key(&tag) || self.ul_to_tag.contains_key(&ul) {
            return;
        }
        self.tag_to_ul.insert(tag, ul);
        self.ul_to_tag.insert(ul, tag);
    }

    /// Look up (or assign, if new) the local tag for `ul`.
    pub fn tag_for(&mut self, ul: Ul) -> Result<u16> {
        if let Some(tag) = self.ul_to_tag.get(&ul) {
            return Ok(*tag);
        }
        loop {
            let candidate = self.next_tag;
            if candidate == Tag::RESERVED_HIGH.0 {
                return Err(Error::PrimerExhausted {
                    first: FIRST_DYNAMIC_TAG,
                    last: Tag::RESERVED_HIGH.0,
                });
            }
            self.next_tag = self.next_tag.wrapping_add(1);
            if !self.tag_to_ul.contains_key(&candidate) {
                self.tag_to_ul.insert(candidate, ul);
                self.ul_to_tag.insert(ul, candidate);
                return Ok(candidate);
            }
        }
    }

    pub fn ul_for(&self, tag: u16) -> Option<Ul> {
        self.tag_to_ul.get(&tag).copied()
    }

    pub fn len(&self) -> usize {
        self.tag_to_ul.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tag_to_ul.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (u16, Ul)> + '_ {
        self.tag_to_ul.iter().map(|(t, u)| (*t, *u))
    }

    /// Parse a Primer Pack body: a batch of `{LocalTag, UL}` pairs.
    pub fn parse(body: &[u8], source: &str) -> Result<Self> {
        let mut r = Reader::new(body, source);
        let count = r.u32()?;
        let item_size = r.u32()?;
        if item_size != 18 {
            return Err(Error::Core(mxf_core::Error::structural(
                mxf_core::Location::new(r.position() as u64, source.to_string()),
                format!("Primer batch item size {item_size} != 18 (2-byte tag + 16-byte UL)"),
            )));
        }
        let mut primer = Primer::new();
        for _ in 0..count {
            let tag = r.u16()?;
            let ul = Ul::new(r.array16()?);
            primer.insert_fixed(tag, ul);
        }
        Ok(primer)
    }

    /// Emit the Primer Pack body.
    pub fn write(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        buf.extend_from_slice(&(self.tag_to_ul.len() as u32).to_be_bytes());
        buf.extend_from_slice(&18u32.to_be_bytes());
        let mut entries: Vec<(u16, Ul)> = self.tag_to_ul.iter().map(|(t, u)| (*t, *u)).collect();
        entries.sort_by_key(|(t, _)| *t);
        for (tag, ul) in entries {
            write_u16(&mut buf, tag);
            buf.extend_from_slice(ul.as_bytes());
        }
        buf
    }
}

/// Resolve a parsed item name to its local tag through a name -> UL
/// lookup and the primer, used when re-serializing a Set.
pub fn name_to_tag_map(
    dict: &mxf_dict::Dictionary,
    primer: &Primer,
    item_names: impl IntoIterator<Item = String>,
) -> Result<HashMap<String, u16>> {
    let mut out = HashMap::new();
    for name in item_names {
        let ul = dict
            .class_by_name(&name)
            .and_then(|c| c.ul)
            .ok_or_else(|| Error::UnknownClass(name.clone()))?;
        let tag = primer.ul_for_or_err(ul)?;
        out.insert(name, tag);
    }
    Ok(out)
}

impl Primer {
    fn ul_for_or_err(&self, ul: Ul) -> Result<u16> {
        self.ul_to_tag
            .get(&ul)
            .copied()
            .ok_or_else(|| Error::Core(mxf_core::Error::dictionary(format!("no local tag assigned for UL {ul}"))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assigns_and_reuses_dynamic_tags() {
        let mut primer = Primer::new();
        let ul = Ul::new([1; 16]);
        let tag1 = primer.tag_for(ul).unwrap();
        let tag2 = primer.tag_for(ul).unwrap();
        assert_eq!(tag1, tag2);
        assert!(tag1 >= FIRST_DYNAMIC_TAG);
    }

    #[test]
    fn seeded_static_tags_are_not_reassigned() {
        let mut primer = Primer::new();
        let ul = Ul::new([2; 16]);
        primer.seed(vec![(0x0102, ul)]);
        assert_eq!(primer.tag_for(ul).unwrap(), 0x0102);
    }

    #[test]
    fn write_then_parse_round_trips() {
        let mut primer = Primer::new();
        primer.seed(vec![(0x0102, Ul::new([3; 16])), (0x0103, Ul::new([4; 16]))]);
        let body = primer.write();
        let parsed = Primer::parse(&body, "test").unwrap();
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed.ul_for(0x0102), Some(Ul::new([3; 16])));
    }
}

//! MDObject: one structural-metadata Set or Pack instance.
//!
//! Mirrors the dirty-tracking attribute container pattern used elsewhere in
//! this codebase: items are looked up by name, writes flip a modification
//! flag, and nested structure is represented in place rather than through a
//! separate tree type.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use mxf_core::{new_instance_uid, Uuid};
use mxf_dict::{ClassDef, ContainerType, Dictionary};
use mxf_klv::{read_local_tl, write_local_tl};
use mxf_core::primitives::Reader;

use crate::error::{Error, Result};

/// One item's value within an [`MDObject`].
#[derive(Debug, Clone)]
pub enum Value {
    /// Raw, not-yet-decoded bytes for a Basic/Interpretation/Enum/Array
    /// item; decoding through the item's TypeDef trait is the caller's
    /// responsibility (see `mxf-dict::traits::to_display_string`).
    Leaf(Vec<u8>),
    /// A single nested Set/Pack, owned in place (used for un-keyed compound
    /// structure that SMPTE 377M still represents as local items, not as a
    /// cross-object reference).
    Nested(Box<MDObject>),
    /// A strong or weak reference to another object's InstanceUID, resolved
    /// against an [`crate::ObjectStore`] after the whole metadata set has
    /// been parsed.
    Ref(Uuid),
    /// An ordered batch/array of references (StrongRefArray/WeakRefArray).
    RefArray(Vec<Uuid>),
}

/// One parsed Set or Pack instance: a ClassDef name plus its item values.
#[derive(Debug)]
#[must_use]
pub struct MDObject {
    pub class_name: String,
    pub instance_uid: Uuid,
    items: Vec<(String, Value)>,
    dirty: AtomicBool,
}

impl Clone for MDObject {
    fn clone(&self) -> Self {
        Self {
            class_name: self.class_name.clone(),
            instance_uid: self.instance_uid,
            items: self.items.clone(),
            dirty: AtomicBool::new(self.dirty.load(Ordering::Relaxed)),
        }
    }
}

impl MDObject {
    pub fn new(class_name: impl Into<String>) -> Self {
        Self {
            class_name: class_name.into(),
            instance_uid: new_instance_uid(),
            items: Vec::new(),
            dirty: AtomicBool::new(false),
        }
    }

    pub fn with_instance_uid(class_name: impl Into<String>, instance_uid: Uuid) -> Self {
        Self {
            class_name: class_name.into(),
            instance_uid,
            items: Vec::new(),
            dirty: AtomicBool::new(false),
        }
    }

    pub fn set(&mut self, key: impl Into<String>, value: Value) {
        let key = key.into();
        if let Some(slot) = self.items.iter_mut().find(|(k, _)| *k == key) {
            slot.1 = value;
        } else {
            self.items.push((key, value));
        }
        self.dirty.store(true, Ordering::Relaxed);
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.items.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Value> {
        self.items.iter_mut().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn get_bytes(&self, key: &str) -> Option<&[u8]> {
        match self.get(key) {
            Some(Value::Leaf(b)) => Some(b),
            _ => None,
        }
    }

    /// Items in declaration order, as held (Pack order is significant;
    /// Set order is whatever the source file or builder produced).
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.items.iter().map(|(k, v)| (k, v))
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty.load(Ordering::Relaxed)
    }

    pub fn clear_dirty(&self) {
        self.dirty.store(false, Ordering::Relaxed);
    }

    /// Every reference, single or batched, this object carries - used to
    /// seed the pending-resolution list while a metadata set is parsed.
    pub fn referenced_uids(&self) -> Vec<Uuid> {
        self.items
            .iter()
            .flat_map(|(_, v)| match v {
                Value::Ref(u) => vec![*u],
                Value::RefArray(us) => us.clone(),
                _ => Vec::new(),
            })
            .collect()
    }

    /// Parse a local Set: items may appear in any order, each framed as
    /// `{Tag, Length, Value}` per the ClassDef's key/length format, with
    /// tags resolved to item names via `primer`. A tag the primer has no
    /// entry for (a Dark item - vendor-private or simply unknown to this
    /// dictionary) is kept verbatim under a synthetic name encoding its tag,
    /// rather than aborting the whole Set.
    pub fn parse_set(
        class: &ClassDef,
        body: &[u8],
        primer: &HashMap<u16, String>,
        dict: &Dictionary,
        source: &str,
    ) -> Result<Self> {
        if class.container != ContainerType::Set {
            return Err(Error::NotAContainer(class.name.clone()));
        }
        let mut obj = MDObject::new(class.name.clone());
        let mut r = Reader::new(body, source);
        let mut instance_uid = None;
        while r.remaining() > 0 {
            let (tag, len) = read_local_tl(&mut r, class.key_format, class.len_format)?;
            let value = r.take(len)?;
            let name = match primer.get(&tag.0) {
                Some(name) => name.clone(),
                None => dark_item_name(tag.0),
            };
            if name == "InstanceUID" && value.len() == 16 {
                let mut bytes = [0u8; 16];
                bytes.copy_from_slice(value);
                instance_uid = Some(Uuid::from_bytes(bytes));
            }
            obj.set(name.clone(), classify_value(dict, &name, value));
        }
        if let Some(uid) = instance_uid {
            obj.instance_uid = uid;
        }
        obj.clear_dirty();
        Ok(obj)
    }

    /// Parse a Pack: items appear in declared order with no tag, each
    /// sized by its TypeDef (fixed size) or a length field per the
    /// ClassDef's len_format.
    pub fn parse_pack(class: &ClassDef, body: &[u8], dict: &Dictionary, source: &str) -> Result<Self> {
        if class.container != ContainerType::Pack {
            return Err(Error::NotAContainer(class.name.clone()));
        }
        let mut obj = MDObject::new(class.name.clone());
        let mut r = Reader::new(body, source);
        for child_name in &class.children {
            let child = dict
                .class_by_name(child_name)
                .ok_or_else(|| Error::UnknownClass(child_name.clone()))?;
            let size = item_size(dict, child).unwrap_or(r.remaining());
            let value = r.take(size)?;
            obj.set(child_name.clone(), classify_value(dict, child_name, value));
        }
        obj.clear_dirty();
        Ok(obj)
    }

    /// Serialize as a local Set: `{Tag, Length, Value}` per item, tag
    /// assigned from `primer` (entries missing from the primer are an
    /// error - the caller is expected to have allocated them first), except
    /// for a Dark item's synthetic name, whose original tag is recovered
    /// directly so round-tripping doesn't require a primer entry for bytes
    /// this dictionary never understood in the first place.
    pub fn write_set(&self, class: &ClassDef, primer: &HashMap<String, u16>) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        for (name, value) in &self.items {
            let tag = match primer.get(name) {
                Some(t) => *t,
                None => dark_item_tag(name).ok_or_else(|| Error::UnknownTag(0))?,
            };
            let bytes = flatten_value(value);
            write_local_tl(&mut buf, mxf_core::Tag(tag), bytes.len(), class.key_format, class.len_format);
            buf.extend_from_slice(&bytes);
        }
        Ok(buf)
    }

    /// Serialize as a Pack: items in declared child order, no tags.
    pub fn write_pack(&self, class: &ClassDef) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        for child_name in &class.children {
            let value = self.get(child_name).ok_or_else(|| Error::MissingRequiredItem(child_name.clone()))?;
            buf.extend_from_slice(&flatten_value(value));
        }
        Ok(buf)
    }
}

fn flatten_value(value: &Value) -> Vec<u8> {
    match value {
        Value::Leaf(b) => b.clone(),
        Value::Ref(u) => u.as_bytes().to_vec(),
        Value::RefArray(us) => {
            let mut out = Vec::new();
            out.extend_from_slice(&(us.len() as u32).to_be_bytes());
            out.extend_from_slice(&16u32.to_be_bytes());
            for u in us {
                out.extend_from_slice(u.as_bytes());
            }
            out
        }
        Value::Nested(obj) => obj.items.iter().flat_map(|(_, v)| flatten_value(v)).collect(),
    }
}

/// Prefix for the synthetic item name a Dark item (a tag with no Primer
/// entry) is preserved under, so it round-trips as raw bytes instead of
/// aborting the parse.
const DARK_ITEM_PREFIX: &str = "Dark_";

fn dark_item_name(tag: u16) -> String {
    format!("{DARK_ITEM_PREFIX}{tag:04X}")
}

fn dark_item_tag(name: &str) -> Option<u16> {
    u16::from_str_radix(name.strip_prefix(DARK_ITEM_PREFIX)?, 16).ok()
}

fn classify_value(dict: &Dictionary, item_name: &str, bytes: &[u8]) -> Value {
    if let Some(item_class) = dict.class_by_name(item_name) {
        match item_class.ref_kind {
            mxf_dict::RefKind::Strong | mxf_dict::RefKind::Weak | mxf_dict::RefKind::Target => {
                if bytes.len() == 16 {
                    let mut b = [0u8; 16];
                    b.copy_from_slice(bytes);
                    return Value::Ref(Uuid::from_bytes(b));
                }
                if bytes.len() >= 8 && (bytes.len() - 8) % 16 == 0 {
                    let refs = bytes[8..]
                        .chunks_exact(16)
                        .map(|c| {
                            let mut b = [0u8; 16];
                            b.copy_from_slice(c);
                            Uuid::from_bytes(b)
                        })
                        .collect();
                    return Value::RefArray(refs);
                }
            }
            mxf_dict::RefKind::None => {}
        }
    }
    Value::Leaf(bytes.to_vec())
}

/// Fixed wire size of an Item's value, if its TypeDef is fixed-size.
fn item_size(dict: &Dictionary, class: &ClassDef) -> Option<usize> {
    let type_name = class.type_name.as_ref()?;
    sized_type(dict, type_name)
}

fn sized_type(dict: &Dictionary, type_name: &str) -> Option<usize> {
    match dict.type_by_name(type_name)? {
        mxf_dict::TypeDef::Basic { size, .. } if *size > 0 => Some(*size),
        mxf_dict::TypeDef::Interpretation { base, size_override, .. } => {
            size_override.or_else(|| sized_type(dict, base))
        }
        mxf_dict::TypeDef::Array {
            class: mxf_dict::ArrayClass::Implicit,
            element,
            fixed_count: Some(n),
            ..
        } => sized_type(dict, element).map(|s| s * n),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_and_get_round_trip() {
        let mut obj = MDObject::new("Identification");
        obj.clear_dirty();
        assert!(!obj.is_dirty());
        obj.set("CompanyName", Value::Leaf(b"Acme".to_vec()));
        assert!(obj.is_dirty());
        assert_eq!(obj.get_bytes("CompanyName"), Some(&b"Acme"[..]));
    }

    #[test]
    fn referenced_uids_collects_single_and_batched() {
        let mut obj = MDObject::new("ContentStorage");
        let a = new_instance_uid();
        let b = new_instance_uid();
        obj.set("PrimaryPackage", Value::Ref(a));
        obj.set("Packages", Value::RefArray(vec![a, b]));
        let uids = obj.referenced_uids();
        assert_eq!(uids.len(), 3);
    }

    #[test]
    fn parse_set_tolerates_a_tag_missing_from_the_primer() {
        use mxf_dict::ClassDefRecord;
        use mxf_klv::{write_local_tl, KeyFormat, LenFormat};

        let class_record =
            ClassDefRecord::set("Thing", None, vec!["Known".into()]).with_usage(mxf_dict::Usage::Optional);
        let dict = Dictionary::build(Vec::new(), vec![class_record]).unwrap();
        let class = dict.class_by_name("Thing").unwrap();

        let mut primer = HashMap::new();
        primer.insert(0x0001u16, "Known".to_string());
        // 0x0002 is deliberately absent from the primer: a Dark item.

        let mut body = Vec::new();
        write_local_tl(&mut body, mxf_core::Tag(0x0001), 4, KeyFormat::TwoByte, LenFormat::Ber);
        body.extend_from_slice(b"knwn");
        write_local_tl(&mut body, mxf_core::Tag(0x0002), 3, KeyFormat::TwoByte, LenFormat::Ber);
        body.extend_from_slice(b"drk");

        let obj = MDObject::parse_set(class, &body, &primer, &dict, "test").unwrap();
        assert_eq!(obj.get_bytes("Known"), Some(&b"knwn"[..]));
        assert_eq!(obj.get_bytes("Dark_0002"), Some(&b"drk"[..]));

        let mut write_primer = HashMap::new();
        write_primer.insert("Known".to_string(), 0x0001u16);
        let rewritten = obj.write_set(class, &write_primer).unwrap();
        assert_eq!(rewritten, body);
    }
}

//! Resolving strong/weak references after a metadata set has been fully
//! parsed.
//!
//! A partition's header metadata is a batch of Sets/Packs emitted in no
//! particular traversal order, each carrying its own InstanceUID and
//! referencing others by UID. Rather than resolving a reference the
//! instant it's read (which would require the target to already exist),
//! every object is parsed into a flat store first; references are checked
//! only once every object in the batch is present.

use std::collections::HashMap;

use mxf_core::Uuid;

use crate::error::{Error, Result};
use crate::object::MDObject;

/// A flat collection of parsed objects, indexed by InstanceUID, with all
/// cross-references checked for existence but not dereferenced (callers
/// walk the store with [`ObjectStore::get`] as needed, rather than this
/// crate building owning pointers between objects).
#[derive(Debug, Default)]
pub struct ObjectStore {
    by_uid: HashMap<Uuid, MDObject>,
    /// Declaration order, preserved for re-serialization.
    order: Vec<Uuid>,
}

impl ObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, object: MDObject) {
        let uid = object.instance_uid;
        if !self.by_uid.contains_key(&uid) {
            self.order.push(uid);
        }
        self.by_uid.insert(uid, object);
    }

    pub fn get(&self, uid: &Uuid) -> Option<&MDObject> {
        self.by_uid.get(uid)
    }

    pub fn get_mut(&mut self, uid: &Uuid) -> Option<&mut MDObject> {
        self.by_uid.get_mut(uid)
    }

    pub fn len(&self) -> usize {
        self.by_uid.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_uid.is_empty()
    }

    /// Iterate in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &MDObject> {
        self.order.iter().filter_map(|uid| self.by_uid.get(uid))
    }

    /// Verify every reference any object in the store carries points at an
    /// object that is itself in the store. Dangling references are
    /// reported as a single error naming the first one found; a reader
    /// tolerant of dark/unresolvable metadata should catch this and
    /// continue rather than abort the whole parse.
    pub fn check_references(&self) -> Result<()> {
        for object in self.by_uid.values() {
            for uid in object.referenced_uids() {
                if !self.by_uid.contains_key(&uid) {
                    return Err(Error::DanglingReference(uid));
                }
            }
        }
        Ok(())
    }

    /// Walk from `root` following a named Strong/Weak reference chain,
    /// e.g. `resolve_path(preface_uid, &["PrimaryPackage"])`, returning
    /// the final object or `None` if any hop is absent or not a
    /// reference-bearing item.
    pub fn resolve_path<'a>(&'a self, root: Uuid, path: &[&str]) -> Option<&'a MDObject> {
        let mut current = self.by_uid.get(&root)?;
        for key in path {
            let next = match current.get(key)? {
                crate::object::Value::Ref(uid) => *uid,
                _ => return None,
            };
            current = self.by_uid.get(&next)?;
        }
        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::Value;
    use mxf_core::new_instance_uid;

    #[test]
    fn dangling_reference_is_reported() {
        let mut store = ObjectStore::new();
        let mut obj = MDObject::new("ContentStorage");
        obj.set("PrimaryPackage", Value::Ref(new_instance_uid()));
        store.insert(obj);
        assert!(store.check_references().is_err());
    }

    #[test]
    fn resolved_reference_passes_check() {
        let mut store = ObjectStore::new();
        let target = MDObject::new("MaterialPackage");
        let target_uid = target.instance_uid;
        let mut root = MDObject::new("ContentStorage");
        root.set("PrimaryPackage", Value::Ref(target_uid));
        store.insert(target);
        store.insert(root);
        assert!(store.check_references().is_ok());
    }

    #[test]
    fn resolve_path_walks_named_hops() {
        let mut store = ObjectStore::new();
        let leaf = MDObject::new("SourcePackage");
        let leaf_uid = leaf.instance_uid;
        let mut mid = MDObject::new("ContentStorage");
        mid.set("PrimaryPackage", Value::Ref(leaf_uid));
        let mid_uid = mid.instance_uid;
        store.insert(leaf);
        store.insert(mid);
        let found = store.resolve_path(mid_uid, &["PrimaryPackage"]).unwrap();
        assert_eq!(found.instance_uid, leaf_uid);
    }
}

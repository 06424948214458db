//! Dictionary: resolves raw TypeDef/ClassDef records into a closed,
//! by-name and by-UL indexed set.
//!
//! Records may be declared in any order and may reference a base/element/
//! parent that hasn't been added yet. [`Dictionary::build`] retries
//! unresolved records to a fixed point, the way a loader that accepts an
//! unordered record stream must.

use std::collections::HashMap;

use mxf_core::{Error, Result, Ul};
use tracing::{debug, warn};

use crate::classdef::{ClassDef, ClassDefRecord};
use crate::typedef::{TypeDef, TypeDefRecord};

#[derive(Debug, Default)]
pub struct Dictionary {
    types_by_name: HashMap<String, TypeDef>,
    types_by_ul: HashMap<Ul, String>,
    classes_by_name: HashMap<String, ClassDef>,
    classes_by_ul: HashMap<Ul, String>,
}

impl Dictionary {
    /// Resolve a set of raw type and class records into a [`Dictionary`].
    /// Both passes retry unresolved records until a round makes no
    /// progress; any records still unresolved at that point name a
    /// circular or missing reference and are reported together.
    pub fn build(type_records: Vec<TypeDefRecord>, class_records: Vec<ClassDefRecord>) -> Result<Self> {
        let mut dict = Dictionary::default();
        dict.resolve_types(type_records)?;
        dict.resolve_classes(class_records)?;
        Ok(dict)
    }

    fn resolve_types(&mut self, mut pending: Vec<TypeDefRecord>) -> Result<()> {
        loop {
            let before = pending.len();
            if before == 0 {
                return Ok(());
            }
            let mut still_pending = Vec::new();
            for rec in pending {
                let ready = match rec.depends_on() {
                    None => true,
                    Some(dep) => self.types_by_name.contains_key(dep),
                };
                if ready {
                    debug!(type_name = rec.name(), "resolved type definition");
                    if let Some(ul) = rec.ul() {
                        self.types_by_ul.insert(ul, rec.name().to_string());
                    }
                    self.types_by_name.insert(rec.name().to_string(), rec);
                } else {
                    still_pending.push(rec);
                }
            }
            if still_pending.len() == before {
                let names: Vec<&str> = still_pending.iter().map(|r| r.name()).collect();
                warn!(?names, "unresolvable type definitions");
                return Err(Error::dictionary(format!(
                    "could not resolve type definitions (missing or circular base/element): {names:?}"
                )));
            }
            pending = still_pending;
        }
    }

    fn resolve_classes(&mut self, mut pending: Vec<ClassDefRecord>) -> Result<()> {
        loop {
            let before = pending.len();
            if before == 0 {
                return Ok(());
            }
            let mut still_pending = Vec::new();
            for rec in pending {
                let ready = match &rec.parent {
                    None => true,
                    Some(p) => self.classes_by_name.contains_key(p),
                };
                if ready {
                    let children = match &rec.parent {
                        None => rec.own_children.clone(),
                        Some(p) => {
                            let base = self
                                .classes_by_name
                                .get(p)
                                .expect("presence checked by `ready` above");
                            splice_children(&base.children, &rec.own_children)
                        }
                    };
                    debug!(class_name = %rec.name, "resolved class definition");
                    let resolved = ClassDef {
                        name: rec.name.clone(),
                        ul: rec.ul,
                        parent: rec.parent.clone(),
                        container: rec.container,
                        type_name: rec.type_name.clone(),
                        children,
                        key_format: rec.key_format,
                        len_format: rec.len_format,
                        min_length: rec.min_length,
                        max_length: rec.max_length,
                        usage: rec.usage,
                        default: rec.default.clone(),
                        dvalue: rec.dvalue.clone(),
                        ref_kind: rec.ref_kind,
                        ref_target: rec.ref_target.clone(),
                    };
                    if let Some(ul) = resolved.ul {
                        self.classes_by_ul.insert(ul, resolved.name.clone());
                    }
                    self.classes_by_name.insert(resolved.name.clone(), resolved);
                } else {
                    still_pending.push(rec);
                }
            }
            if still_pending.len() == before {
                let names: Vec<&str> = still_pending.iter().map(|r| r.name.as_str()).collect();
                warn!(?names, "unresolvable class definitions");
                return Err(Error::dictionary(format!(
                    "could not resolve class definitions (missing or circular parent): {names:?}"
                )));
            }
            pending = still_pending;
        }
    }

    pub fn type_by_name(&self, name: &str) -> Option<&TypeDef> {
        self.types_by_name.get(name)
    }

    pub fn type_by_ul(&self, ul: &Ul) -> Option<&TypeDef> {
        self.types_by_ul.get(ul).and_then(|name| self.types_by_name.get(name))
    }

    pub fn class_by_name(&self, name: &str) -> Option<&ClassDef> {
        self.classes_by_name.get(name)
    }

    pub fn class_by_ul(&self, ul: &Ul) -> Option<&ClassDef> {
        self.classes_by_ul.get(ul).and_then(|name| self.classes_by_name.get(name))
    }

    /// Every UL-bearing ClassDef and its assigned local tag, for building a
    /// default Primer before any local-tag allocations specific to a file
    /// are known.
    pub fn static_primer(&self) -> Vec<(u16, Ul)> {
        let mut entries: Vec<(u16, Ul)> = self
            .classes_by_name
            .values()
            .filter_map(|c| c.ul.map(|ul| (ul, c.name.clone())))
            .enumerate()
            .map(|(i, (ul, _))| (0x8000u16.wrapping_add(i as u16), ul))
            .collect();
        entries.sort_by_key(|(tag, _)| *tag);
        entries
    }
}

/// Produce an ordered child list for a derived class: base children in
/// base order, with any base child sharing a name with an own child
/// replaced in place, followed by remaining own children appended.
fn splice_children(base_children: &[String], own_children: &[String]) -> Vec<String> {
    let mut result = Vec::with_capacity(base_children.len() + own_children.len());
    let mut used = vec![false; own_children.len()];
    for base_child in base_children {
        if let Some(idx) = own_children.iter().position(|c| c == base_child) {
            used[idx] = true;
        }
        result.push(base_child.clone());
    }
    for (idx, child) in own_children.iter().enumerate() {
        if !used[idx] {
            result.push(child.clone());
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classdef::Usage;

    #[test]
    fn types_resolve_out_of_order() {
        let records = vec![
            TypeDef::Interpretation {
                name: "Length".to_string(),
                ul: None,
                base: "UInt32".to_string(),
                size_override: None,
            },
            TypeDef::Basic {
                name: "UInt32".to_string(),
                ul: None,
                size: 4,
                trait_kind: crate::traits::TraitKind::Uint32,
            },
        ];
        let dict = Dictionary::build(records, Vec::new()).unwrap();
        assert!(dict.type_by_name("Length").is_some());
        assert!(dict.type_by_name("UInt32").is_some());
    }

    #[test]
    fn circular_types_are_rejected() {
        let records = vec![
            TypeDef::Interpretation {
                name: "A".to_string(),
                ul: None,
                base: "B".to_string(),
                size_override: None,
            },
            TypeDef::Interpretation {
                name: "B".to_string(),
                ul: None,
                base: "A".to_string(),
                size_override: None,
            },
        ];
        assert!(Dictionary::build(records, Vec::new()).is_err());
    }

    #[test]
    fn derived_class_splices_children_in_place() {
        let base = ClassDefRecord::set("Base", None, vec!["A".into(), "B".into()]);
        let derived = ClassDefRecord::set("Derived", None, vec!["B".into(), "C".into()])
            .with_parent("Base")
            .with_usage(Usage::Required);
        let dict = Dictionary::build(Vec::new(), vec![base, derived]).unwrap();
        let derived = dict.class_by_name("Derived").unwrap();
        assert_eq!(derived.children, vec!["A", "B", "C"]);
    }
}

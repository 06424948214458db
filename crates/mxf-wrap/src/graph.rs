//! Structural metadata graph helpers: one Material Package with a
//! timecode track and one track per logical essence stream, one File
//! Package per output file carrying a File Descriptor, linked by
//! `MakeLink` (UMID + TrackID resolution).

use mxf_core::{new_instance_uid, primitives::write_u32, Rational, Umid, Uuid};
use mxf_model::{ObjectStore, Value};

use crate::Result;

fn leaf_u32(v: u32) -> Value {
    let mut buf = Vec::with_capacity(4);
    write_u32(&mut buf, v);
    Value::Leaf(buf)
}

fn leaf_rational(r: Rational) -> Value {
    let mut buf = Vec::with_capacity(8);
    buf.extend_from_slice(&r.numerator.to_be_bytes());
    buf.extend_from_slice(&r.denominator.to_be_bytes());
    Value::Leaf(buf)
}

/// One logical essence stream to represent as a Track on both the
/// Material Package and its File Package counterpart.
pub struct TrackSpec {
    pub track_id: u32,
    pub edit_rate: Rational,
    pub origin: u32,
    pub data_definition: &'static str,
}

/// A SourceClip linking a Material Package track to a File Package
/// track via `SourcePackageID` + `SourceTrackID` (the `MakeLink`
/// relationship), built as a strong-ref child of the track's Sequence.
fn build_source_clip(store: &mut ObjectStore, source_package_id: Umid, source_track_id: u32) -> Uuid {
    let mut clip = mxf_model::MDObject::new("SourceClip");
    clip.set("StartPosition", leaf_u32(0));
    clip.set("SourcePackageID", Value::Leaf(source_package_id.as_bytes().to_vec()));
    clip.set("SourceTrackID", leaf_u32(source_track_id));
    let uid = clip.instance_uid;
    store.insert(clip);
    uid
}

fn build_track(store: &mut ObjectStore, spec: &TrackSpec, component: Uuid) -> Uuid {
    let mut sequence = mxf_model::MDObject::new("Sequence");
    sequence.set("DataDefinition", Value::Leaf(spec.data_definition.as_bytes().to_vec()));
    sequence.set("StructuralComponents", Value::RefArray(vec![component]));
    let sequence_uid = sequence.instance_uid;
    store.insert(sequence);

    let mut track = mxf_model::MDObject::new("Track");
    track.set("TrackID", leaf_u32(spec.track_id));
    track.set("EditRate", leaf_rational(spec.edit_rate));
    track.set("Origin", leaf_u32(spec.origin));
    track.set("Sequence", Value::Ref(sequence_uid));
    let track_uid = track.instance_uid;
    store.insert(track);
    track_uid
}

/// Build one File Descriptor skeleton per track. Each descriptor is
/// linked to its track by `LinkedTrackID` and carries that track's
/// `SampleRate`.
fn build_descriptors(store: &mut ObjectStore, tracks: &[TrackSpec], descriptor_classes: &[&str], essence_container: &str) -> Vec<Uuid> {
    tracks
        .iter()
        .zip(descriptor_classes)
        .map(|(spec, class)| {
            let mut descriptor = mxf_model::MDObject::new((*class).to_string());
            descriptor.set("EssenceContainer", Value::Leaf(essence_container.as_bytes().to_vec()));
            descriptor.set("LinkedTrackID", leaf_u32(spec.track_id));
            descriptor.set("SampleRate", leaf_rational(spec.edit_rate));
            let uid = descriptor.instance_uid;
            store.insert(descriptor);
            uid
        })
        .collect()
}

/// Build a File Package: one Track per `tracks`, each pointing through
/// a SourceClip at itself (File Package tracks terminate the link
/// chain rather than pointing onward), plus one File Descriptor per
/// track.
///
/// `descriptor_classes` gives the descriptor class for each entry in
/// `tracks`, in the same order. When more than one track is present, the
/// per-track descriptors are grouped under a `MultipleDescriptor`
/// (`SubDescriptorUIDs`) whose own `Descriptor` slot is what the package
/// actually references; when exactly one track is present, that single
/// descriptor is promoted to be the package's direct `Descriptor` rather
/// than ever wrapping it in a one-entry `MultipleDescriptor`.
pub fn build_file_package(
    store: &mut ObjectStore,
    package_id: Umid,
    tracks: &[TrackSpec],
    descriptor_classes: &[&str],
    essence_container: &str,
) -> Result<Uuid> {
    let sub_descriptor_uids = build_descriptors(store, tracks, descriptor_classes, essence_container);
    let descriptor_uid = match sub_descriptor_uids.as_slice() {
        [only] => *only,
        many => {
            let mut multiple = mxf_model::MDObject::new("MultipleDescriptor");
            multiple.set("EssenceContainer", Value::Leaf(essence_container.as_bytes().to_vec()));
            multiple.set("SubDescriptorUIDs", Value::RefArray(many.to_vec()));
            let uid = multiple.instance_uid;
            store.insert(multiple);
            uid
        }
    };

    let mut track_uids = Vec::with_capacity(tracks.len());
    for spec in tracks {
        // A File Package's own SourceClip self-terminates: SourcePackageID
        // is this package's own UMID, SourceTrackID 0 (no further link).
        let clip = build_source_clip(store, package_id, 0);
        track_uids.push(build_track(store, spec, clip));
    }

    let mut package = mxf_model::MDObject::new("SourcePackage");
    package.set("PackageUID", Value::Leaf(package_id.as_bytes().to_vec()));
    package.set("InstanceUID", Value::Leaf(new_instance_uid().as_bytes().to_vec()));
    package.set("Tracks", Value::RefArray(track_uids));
    package.set("Descriptor", Value::Ref(descriptor_uid));
    let package_uid = package.instance_uid;
    store.insert(package);
    Ok(package_uid)
}

/// Build the Material Package: one track per logical essence stream,
/// each linked via a SourceClip to the corresponding File Package
/// track (by UMID + TrackID, i.e. `MakeLink`).
pub fn build_material_package(
    store: &mut ObjectStore,
    material_package_id: Umid,
    tracks: &[TrackSpec],
    file_package_id: Umid,
) -> Result<Uuid> {
    let mut track_uids = Vec::with_capacity(tracks.len());
    for spec in tracks {
        let clip = build_source_clip(store, file_package_id, spec.track_id);
        track_uids.push(build_track(store, spec, clip));
    }

    let mut package = mxf_model::MDObject::new("MaterialPackage");
    package.set("PackageUID", Value::Leaf(material_package_id.as_bytes().to_vec()));
    package.set("InstanceUID", Value::Leaf(new_instance_uid().as_bytes().to_vec()));
    package.set("Tracks", Value::RefArray(track_uids));
    let package_uid = package.instance_uid;
    store.insert(package);
    Ok(package_uid)
}

/// `MakeLink`: resolve a SourceClip's `(SourcePackageID, SourceTrackID)`
/// to the concrete Track object it names, by walking every package in
/// the store. Returns `None` if no package carries a matching UMID and
/// TrackID (a dangling link, caught by [`ObjectStore::check_references`]
/// for same-file references but not for this cross-package lookup).
pub fn make_link<'a>(store: &'a ObjectStore, source_package_id: Umid, source_track_id: u32) -> Option<&'a mxf_model::MDObject> {
    for package in store.iter() {
        if !matches!(package.class_name.as_str(), "MaterialPackage" | "SourcePackage") {
            continue;
        }
        let Some(Value::Leaf(package_id_bytes)) = package.get("PackageUID") else { continue };
        if package_id_bytes.as_slice() != source_package_id.as_bytes() {
            continue;
        }
        let Some(Value::RefArray(track_refs)) = package.get("Tracks") else { continue };
        for track_ref in track_refs {
            if let Some(track) = store.get(track_ref) {
                if let Some(Value::Leaf(id_bytes)) = track.get("TrackID") {
                    if id_bytes.len() == 4 && u32::from_be_bytes([id_bytes[0], id_bytes[1], id_bytes[2], id_bytes[3]]) == source_track_id {
                        return Some(track);
                    }
                }
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn umid(byte: u8) -> Umid {
        Umid::new([byte; 32])
    }

    #[test]
    fn material_package_links_to_file_package_track() {
        let mut store = ObjectStore::new();
        let file_id = umid(1);
        let material_id = umid(2);
        let tracks = vec![TrackSpec {
            track_id: 1,
            edit_rate: Rational::new(25, 1),
            origin: 0,
            data_definition: "Picture",
        }];

        build_file_package(&mut store, file_id, &tracks, &["GenericPictureEssenceDescriptor"], "GenericContainer").unwrap();
        build_material_package(&mut store, material_id, &tracks, file_id).unwrap();

        let linked = make_link(&store, file_id, 1);
        assert!(linked.is_some());
        assert_eq!(linked.unwrap().class_name, "Track");
    }

    #[test]
    fn make_link_returns_none_for_unknown_track() {
        let mut store = ObjectStore::new();
        let file_id = umid(3);
        let tracks = vec![TrackSpec {
            track_id: 1,
            edit_rate: Rational::new(25, 1),
            origin: 0,
            data_definition: "Sound",
        }];
        build_file_package(&mut store, file_id, &tracks, &["GenericSoundEssenceDescriptor"], "GenericContainer").unwrap();

        assert!(make_link(&store, file_id, 99).is_none());
    }

    #[test]
    fn single_track_descriptor_is_promoted_directly() {
        let mut store = ObjectStore::new();
        let file_id = umid(4);
        let tracks = vec![TrackSpec {
            track_id: 1,
            edit_rate: Rational::new(25, 1),
            origin: 0,
            data_definition: "Picture",
        }];
        let package_uid =
            build_file_package(&mut store, file_id, &tracks, &["GenericPictureEssenceDescriptor"], "GenericContainer").unwrap();

        let package = store.get(&package_uid).unwrap();
        let Some(Value::Ref(descriptor_uid)) = package.get("Descriptor") else {
            panic!("expected a single Descriptor ref");
        };
        let descriptor = store.get(descriptor_uid).unwrap();
        assert_eq!(descriptor.class_name, "GenericPictureEssenceDescriptor");
        assert!(!store.iter().any(|o| o.class_name == "MultipleDescriptor"));
    }

    #[test]
    fn multiple_tracks_are_grouped_under_a_multiple_descriptor() {
        let mut store = ObjectStore::new();
        let file_id = umid(5);
        let tracks = vec![
            TrackSpec {
                track_id: 1,
                edit_rate: Rational::new(25, 1),
                origin: 0,
                data_definition: "Picture",
            },
            TrackSpec {
                track_id: 2,
                edit_rate: Rational::new(25, 1),
                origin: 0,
                data_definition: "Sound",
            },
        ];
        let package_uid = build_file_package(
            &mut store,
            file_id,
            &tracks,
            &["GenericPictureEssenceDescriptor", "GenericSoundEssenceDescriptor"],
            "GenericContainer",
        )
        .unwrap();

        let package = store.get(&package_uid).unwrap();
        let Some(Value::Ref(descriptor_uid)) = package.get("Descriptor") else {
            panic!("expected a single Descriptor ref");
        };
        let multiple = store.get(descriptor_uid).unwrap();
        assert_eq!(multiple.class_name, "MultipleDescriptor");
        let Some(Value::RefArray(subs)) = multiple.get("SubDescriptorUIDs") else {
            panic!("expected SubDescriptorUIDs");
        };
        assert_eq!(subs.len(), 2);
        let classes: Vec<&str> = subs.iter().map(|uid| store.get(uid).unwrap().class_name.as_str()).collect();
        assert_eq!(classes, vec!["GenericPictureEssenceDescriptor", "GenericSoundEssenceDescriptor"]);
    }
}

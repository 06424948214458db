//! The compiled-in baseline dictionary: TypeDefs and ClassDefs for the
//! structural-metadata classes every reader needs regardless of any
//! extension dictionary a file might carry.
//!
//! Names and ULs are declared as a `phf` map so name lookup from a UL-less
//! caller (CLI flags, extension-record cross-references) is a perfect-hash
//! lookup rather than a linear scan; the records themselves are built once,
//! lazily, into the owned [`crate::typedef::TypeDef`] / [`crate::classdef::ClassDefRecord`]
//! shapes the registry's resolution pass expects.

use mxf_core::Ul;

use crate::classdef::{ClassDefRecord, RefKind, Usage};
use crate::traits::TraitKind;
use crate::typedef::{ArrayClass, TypeDef};

/// Name -> UL for every baseline class and type that carries one. Built as
/// a perfect hash map so CLI/debug code can resolve a name to a UL without
/// going through a live [`crate::Dictionary`].
pub static BASELINE_ULS: phf::Map<&'static str, [u8; 16]> = phf::phf_map! {
    "Partition" => [0x06, 0x0E, 0x2B, 0x34, 0x02, 0x05, 0x01, 0x01, 0x0D, 0x01, 0x02, 0x01, 0x01, 0x02, 0x01, 0x00],
    "Primer" => [0x06, 0x0E, 0x2B, 0x34, 0x02, 0x05, 0x01, 0x01, 0x0D, 0x01, 0x02, 0x01, 0x01, 0x05, 0x01, 0x00],
    "Preface" => [0x06, 0x0E, 0x2B, 0x34, 0x02, 0x53, 0x01, 0x01, 0x0D, 0x01, 0x01, 0x01, 0x01, 0x01, 0x2F, 0x00],
    "Identification" => [0x06, 0x0E, 0x2B, 0x34, 0x02, 0x53, 0x01, 0x01, 0x0D, 0x01, 0x01, 0x01, 0x01, 0x01, 0x30, 0x00],
    "ContentStorage" => [0x06, 0x0E, 0x2B, 0x34, 0x02, 0x53, 0x01, 0x01, 0x0D, 0x01, 0x01, 0x01, 0x01, 0x01, 0x18, 0x00],
    "EssenceContainerData" => [0x06, 0x0E, 0x2B, 0x34, 0x02, 0x53, 0x01, 0x01, 0x0D, 0x01, 0x01, 0x01, 0x01, 0x01, 0x23, 0x00],
    "GenericPackage" => [0x06, 0x0E, 0x2B, 0x34, 0x02, 0x53, 0x01, 0x01, 0x0D, 0x01, 0x01, 0x01, 0x01, 0x01, 0x34, 0x00],
    "MaterialPackage" => [0x06, 0x0E, 0x2B, 0x34, 0x02, 0x53, 0x01, 0x01, 0x0D, 0x01, 0x01, 0x01, 0x01, 0x01, 0x36, 0x00],
    "SourcePackage" => [0x06, 0x0E, 0x2B, 0x34, 0x02, 0x53, 0x01, 0x01, 0x0D, 0x01, 0x01, 0x01, 0x01, 0x01, 0x37, 0x00],
    "GenericTrack" => [0x06, 0x0E, 0x2B, 0x34, 0x02, 0x53, 0x01, 0x01, 0x0D, 0x01, 0x01, 0x01, 0x01, 0x01, 0x38, 0x00],
    "Track" => [0x06, 0x0E, 0x2B, 0x34, 0x02, 0x53, 0x01, 0x01, 0x0D, 0x01, 0x01, 0x01, 0x01, 0x01, 0x3A, 0x00],
    "EventTrack" => [0x06, 0x0E, 0x2B, 0x34, 0x02, 0x53, 0x01, 0x01, 0x0D, 0x01, 0x01, 0x01, 0x01, 0x01, 0x39, 0x00],
    "StaticTrack" => [0x06, 0x0E, 0x2B, 0x34, 0x02, 0x53, 0x01, 0x01, 0x0D, 0x01, 0x01, 0x01, 0x01, 0x01, 0x3B, 0x00],
    "StructuralComponent" => [0x06, 0x0E, 0x2B, 0x34, 0x02, 0x53, 0x01, 0x01, 0x0D, 0x01, 0x01, 0x01, 0x01, 0x01, 0x3F, 0x00],
    "Sequence" => [0x06, 0x0E, 0x2B, 0x34, 0x02, 0x53, 0x01, 0x01, 0x0D, 0x01, 0x01, 0x01, 0x01, 0x01, 0x0F, 0x00],
    "SourceClip" => [0x06, 0x0E, 0x2B, 0x34, 0x02, 0x53, 0x01, 0x01, 0x0D, 0x01, 0x01, 0x01, 0x01, 0x01, 0x11, 0x00],
    "TimecodeComponent" => [0x06, 0x0E, 0x2B, 0x34, 0x02, 0x53, 0x01, 0x01, 0x0D, 0x01, 0x01, 0x01, 0x01, 0x01, 0x14, 0x00],
    "DMSegment" => [0x06, 0x0E, 0x2B, 0x34, 0x02, 0x53, 0x01, 0x01, 0x0D, 0x01, 0x01, 0x01, 0x01, 0x01, 0x41, 0x00],
    "GenericDescriptor" => [0x06, 0x0E, 0x2B, 0x34, 0x02, 0x53, 0x01, 0x01, 0x0D, 0x01, 0x01, 0x01, 0x01, 0x01, 0x24, 0x00],
    "FileDescriptor" => [0x06, 0x0E, 0x2B, 0x34, 0x02, 0x53, 0x01, 0x01, 0x0D, 0x01, 0x01, 0x01, 0x01, 0x01, 0x25, 0x00],
    "GenericPictureEssenceDescriptor" => [0x06, 0x0E, 0x2B, 0x34, 0x02, 0x53, 0x01, 0x01, 0x0D, 0x01, 0x01, 0x01, 0x01, 0x01, 0x27, 0x00],
    "GenericSoundEssenceDescriptor" => [0x06, 0x0E, 0x2B, 0x34, 0x02, 0x53, 0x01, 0x01, 0x0D, 0x01, 0x01, 0x01, 0x01, 0x01, 0x28, 0x00],
    "Locator" => [0x06, 0x0E, 0x2B, 0x34, 0x02, 0x53, 0x01, 0x01, 0x0D, 0x01, 0x01, 0x01, 0x01, 0x01, 0x3C, 0x00],
    "NetworkLocator" => [0x06, 0x0E, 0x2B, 0x34, 0x02, 0x53, 0x01, 0x01, 0x0D, 0x01, 0x01, 0x01, 0x01, 0x01, 0x32, 0x00],
    "TextLocator" => [0x06, 0x0E, 0x2B, 0x34, 0x02, 0x53, 0x01, 0x01, 0x0D, 0x01, 0x01, 0x01, 0x01, 0x01, 0x33, 0x00],
    "IndexTableSegment" => [0x06, 0x0E, 0x2B, 0x34, 0x02, 0x53, 0x01, 0x01, 0x0D, 0x01, 0x02, 0x01, 0x01, 0x10, 0x01, 0x00],
    "RandomIndexPack" => [0x06, 0x0E, 0x2B, 0x34, 0x02, 0x05, 0x01, 0x01, 0x0D, 0x01, 0x02, 0x01, 0x01, 0x11, 0x01, 0x00],
};

fn ul(name: &str) -> Option<Ul> {
    BASELINE_ULS.get(name).map(|b| Ul::new(*b))
}

/// Baseline TypeDef records: the handful of built-in traits plus the
/// common interpretations/arrays structural metadata is built from.
pub fn types() -> Vec<TypeDef> {
    vec![
        TypeDef::Basic {
            name: "UInt8".into(),
            ul: None,
            size: 1,
            trait_kind: TraitKind::Uint8,
        },
        TypeDef::Basic {
            name: "UInt16".into(),
            ul: None,
            size: 2,
            trait_kind: TraitKind::Uint16,
        },
        TypeDef::Basic {
            name: "UInt32".into(),
            ul: None,
            size: 4,
            trait_kind: TraitKind::Uint32,
        },
        TypeDef::Basic {
            name: "UInt64".into(),
            ul: None,
            size: 8,
            trait_kind: TraitKind::Uint64,
        },
        TypeDef::Basic {
            name: "Int8".into(),
            ul: None,
            size: 1,
            trait_kind: TraitKind::Int8,
        },
        TypeDef::Basic {
            name: "Int32".into(),
            ul: None,
            size: 4,
            trait_kind: TraitKind::Int32,
        },
        TypeDef::Basic {
            name: "Int64".into(),
            ul: None,
            size: 8,
            trait_kind: TraitKind::Int64,
        },
        TypeDef::Basic {
            name: "Rational".into(),
            ul: None,
            size: 8,
            trait_kind: TraitKind::Rational,
        },
        TypeDef::Basic {
            name: "TimeStamp".into(),
            ul: None,
            size: 9,
            trait_kind: TraitKind::TimeStamp,
        },
        TypeDef::Basic {
            name: "UUID".into(),
            ul: None,
            size: 16,
            trait_kind: TraitKind::Uuid,
        },
        TypeDef::Basic {
            name: "Label".into(),
            ul: None,
            size: 16,
            trait_kind: TraitKind::Label,
        },
        TypeDef::Basic {
            name: "UMID".into(),
            ul: None,
            size: 32,
            trait_kind: TraitKind::Umid,
        },
        TypeDef::Interpretation {
            name: "PackageID".into(),
            ul: None,
            base: "UMID".into(),
            size_override: None,
        },
        TypeDef::Interpretation {
            name: "VersionType".into(),
            ul: None,
            base: "UInt16".into(),
            size_override: None,
        },
        TypeDef::Array {
            name: "UTF16String".into(),
            ul: None,
            element: "UInt16".into(),
            class: ArrayClass::StringLike,
            fixed_count: None,
        },
        TypeDef::Array {
            name: "StrongRefArray".into(),
            ul: None,
            element: "UUID".into(),
            class: ArrayClass::Implicit,
            fixed_count: None,
        },
        TypeDef::Array {
            name: "WeakRefArray".into(),
            ul: None,
            element: "UUID".into(),
            class: ArrayClass::Implicit,
            fixed_count: None,
        },
        TypeDef::Compound {
            name: "IndexEntry".into(),
            ul: None,
            members: vec![
                crate::typedef::CompoundMember {
                    name: "TemporalOffset".into(),
                    type_name: "Int8".into(),
                },
                crate::typedef::CompoundMember {
                    name: "KeyFrameOffset".into(),
                    type_name: "Int8".into(),
                },
                crate::typedef::CompoundMember {
                    name: "Flags".into(),
                    type_name: "UInt8".into(),
                },
                crate::typedef::CompoundMember {
                    name: "StreamOffset".into(),
                    type_name: "UInt64".into(),
                },
            ],
        },
    ]
}

/// Baseline ClassDef records: Partition/Primer/Preface and the package,
/// track, component and descriptor hierarchy every File/Material/Source
/// Package is built from.
pub fn classes() -> Vec<ClassDefRecord> {
    vec![
        ClassDefRecord::pack(
            "Partition",
            ul("Partition"),
            vec![
                "MajorVersion".into(),
                "MinorVersion".into(),
                "KAGSize".into(),
                "ThisPartition".into(),
                "PreviousPartition".into(),
                "FooterPartition".into(),
                "HeaderByteCount".into(),
                "IndexByteCount".into(),
                "IndexSID".into(),
                "BodyOffset".into(),
                "BodySID".into(),
                "OperationalPattern".into(),
                "EssenceContainers".into(),
            ],
        ),
        ClassDefRecord::pack("Primer", ul("Primer"), vec!["LocalTagEntryBatch".into()]),
        ClassDefRecord::set(
            "Preface",
            ul("Preface"),
            vec![
                "InstanceUID".into(),
                "LastModifiedDate".into(),
                "Version".into(),
                "ObjectModelVersion".into(),
                "PrimaryPackage".into(),
                "Identifications".into(),
                "ContentStorage".into(),
                "OperationalPattern".into(),
                "EssenceContainers".into(),
                "DMSchemes".into(),
            ],
        )
        .with_usage(Usage::Required),
        ClassDefRecord::set(
            "Identification",
            ul("Identification"),
            vec![
                "InstanceUID".into(),
                "ThisGenerationUID".into(),
                "CompanyName".into(),
                "ProductName".into(),
                "ProductVersion".into(),
                "VersionString".into(),
                "ProductUID".into(),
                "ModificationDate".into(),
                "ToolkitVersion".into(),
                "Platform".into(),
            ],
        ),
        ClassDefRecord::set(
            "ContentStorage",
            ul("ContentStorage"),
            vec!["InstanceUID".into(), "Packages".into(), "EssenceContainerData".into()],
        ),
        ClassDefRecord::set(
            "EssenceContainerData",
            ul("EssenceContainerData"),
            vec![
                "InstanceUID".into(),
                "LinkedPackageUID".into(),
                "IndexSID".into(),
                "BodySID".into(),
            ],
        ),
        ClassDefRecord::set(
            "GenericPackage",
            ul("GenericPackage"),
            vec![
                "InstanceUID".into(),
                "PackageUID".into(),
                "Name".into(),
                "PackageCreationDate".into(),
                "PackageModifiedDate".into(),
                "Tracks".into(),
            ],
        )
        .with_usage(Usage::Dark),
        ClassDefRecord::set("MaterialPackage", ul("MaterialPackage"), Vec::new())
            .with_parent("GenericPackage"),
        ClassDefRecord::set(
            "SourcePackage",
            ul("SourcePackage"),
            vec!["Descriptor".into()],
        )
        .with_parent("GenericPackage"),
        ClassDefRecord::set(
            "GenericTrack",
            ul("GenericTrack"),
            vec!["InstanceUID".into(), "TrackID".into(), "TrackName".into()],
        )
        .with_usage(Usage::Dark),
        ClassDefRecord::set(
            "Track",
            ul("Track"),
            vec!["EditRate".into(), "Origin".into(), "Sequence".into()],
        )
        .with_parent("GenericTrack")
        .with_ref(RefKind::Strong, "StructuralComponent"),
        ClassDefRecord::set("EventTrack", ul("EventTrack"), vec!["EventEditRate".into(), "EventOrigin".into()])
            .with_parent("GenericTrack"),
        ClassDefRecord::set("StaticTrack", ul("StaticTrack"), Vec::new()).with_parent("GenericTrack"),
        ClassDefRecord::set(
            "StructuralComponent",
            ul("StructuralComponent"),
            vec!["DataDefinition".into(), "Duration".into()],
        )
        .with_usage(Usage::Dark),
        ClassDefRecord::set("Sequence", ul("Sequence"), vec!["StructuralComponents".into()])
            .with_parent("StructuralComponent")
            .with_ref(RefKind::Strong, "StructuralComponent"),
        ClassDefRecord::set(
            "SourceClip",
            ul("SourceClip"),
            vec!["StartPosition".into(), "SourcePackageID".into(), "SourceTrackID".into()],
        )
        .with_parent("StructuralComponent"),
        ClassDefRecord::set(
            "TimecodeComponent",
            ul("TimecodeComponent"),
            vec!["RoundedTimecodeBase".into(), "StartTimecode".into(), "DropFrame".into()],
        )
        .with_parent("StructuralComponent"),
        ClassDefRecord::set(
            "DMSegment",
            ul("DMSegment"),
            vec!["EventStartPosition".into(), "EventComment".into(), "TrackIDs".into()],
        )
        .with_parent("StructuralComponent"),
        ClassDefRecord::set(
            "GenericDescriptor",
            ul("GenericDescriptor"),
            vec!["Locators".into()],
        )
        .with_usage(Usage::Dark)
        .with_ref(RefKind::Strong, "Locator"),
        ClassDefRecord::set(
            "FileDescriptor",
            ul("FileDescriptor"),
            vec![
                "LinkedTrackID".into(),
                "SampleRate".into(),
                "ContainerDuration".into(),
                "EssenceContainer".into(),
                "Codec".into(),
            ],
        )
        .with_parent("GenericDescriptor"),
        ClassDefRecord::set(
            "GenericPictureEssenceDescriptor",
            ul("GenericPictureEssenceDescriptor"),
            vec![
                "FrameLayout".into(),
                "StoredWidth".into(),
                "StoredHeight".into(),
                "AspectRatio".into(),
            ],
        )
        .with_parent("FileDescriptor"),
        ClassDefRecord::set(
            "GenericSoundEssenceDescriptor",
            ul("GenericSoundEssenceDescriptor"),
            vec!["AudioSamplingRate".into(), "ChannelCount".into(), "QuantizationBits".into()],
        )
        .with_parent("FileDescriptor"),
        ClassDefRecord::set("Locator", ul("Locator"), Vec::new()).with_usage(Usage::Dark),
        ClassDefRecord::set("NetworkLocator", ul("NetworkLocator"), vec!["URLString".into()])
            .with_parent("Locator"),
        ClassDefRecord::set("TextLocator", ul("TextLocator"), vec!["LocatorName".into()])
            .with_parent("Locator"),
        ClassDefRecord::pack(
            "IndexTableSegment",
            ul("IndexTableSegment"),
            vec![
                "IndexEditRate".into(),
                "IndexStartPosition".into(),
                "IndexDuration".into(),
                "EditUnitByteCount".into(),
                "IndexSID".into(),
                "BodySID".into(),
                "SliceCount".into(),
                "DeltaEntryArray".into(),
                "IndexEntryArray".into(),
            ],
        ),
        ClassDefRecord::pack(
            "RandomIndexPack",
            ul("RandomIndexPack"),
            vec!["PartitionArray".into(), "Length".into()],
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_ul_entry_resolves_to_a_class_or_type() {
        for name in BASELINE_ULS.keys() {
            assert!(ul(name).is_some(), "missing UL for {name}");
        }
    }

    #[test]
    fn baseline_resolves_as_a_dictionary() {
        let dict = crate::Dictionary::build(types(), classes()).unwrap();
        assert!(dict.class_by_name("SourcePackage").is_some());
        assert!(dict.class_by_name("MaterialPackage").is_some());
        let source_package = dict.class_by_name("SourcePackage").unwrap();
        assert!(source_package.children.contains(&"Tracks".to_string()));
        assert!(source_package.children.contains(&"Descriptor".to_string()));
    }
}

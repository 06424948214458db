//! The Wrapper: consumes registered essence inputs and a dictionary,
//! builds the structural metadata graph, and drives header, body and
//! footer partitions (plus the trailing Random Index Pack) out to a
//! writer.
//!
//! Every essence input in a single [`Wrapper`] is ganged into one
//! Generic Container (`body_sid` fixed at `1`); indexing assumes at
//! most one indexed input per container, matching the common case of
//! one indexed picture track alongside unindexed audio.

use std::collections::HashMap;
use std::io::Write;

use mxf_core::{new_instance_uid, Rational, Ul, Umid, Uuid};
use mxf_dict::{ContainerType, Dictionary};
use mxf_essence::EssenceSource;
use mxf_index::{IndexTableSegment, INDEX_TABLE_SEGMENT_UL_V10, INDEX_TABLE_SEGMENT_UL_V11};
use mxf_klv::{fill, write_klv};
use mxf_model::primer::name_to_tag_map;
use mxf_model::{MDObject, ObjectStore, Primer, Value};
use mxf_partition::{PartitionKind, PartitionPack, PartitionStatus, RandomIndexPack};

use mxf_container::{BodyWriter, GenericContainerWriter, ItemType, PartitionBoundary, SharingPolicy, StreamId, WrapType};

use crate::graph::{build_file_package, build_material_package, TrackSpec};
use crate::options::{BodyPartitionMode, OperationalPattern, WrapOptions};
use crate::{Error, Result};

/// The registered Generic Container label for every partition this
/// crate writes; the wrapping pipeline does not support foreign
/// essence container labels.
const GENERIC_CONTAINER_LABEL: Ul = Ul::new([
    0x06, 0x0E, 0x2B, 0x34, 0x04, 0x01, 0x01, 0x01, 0x0D, 0x01, 0x03, 0x01, 0x02, 0x01, 0x01, 0x00,
]);

/// How one registered essence input is framed as a Generic Container
/// element and represented in the structural metadata graph.
#[derive(Debug, Clone, Copy)]
pub struct WrappingOption {
    pub item_type: ItemType,
    pub cp_compatible: bool,
    pub element_type: u8,
    pub wrap_type: WrapType,
    pub data_definition: &'static str,
    pub descriptor_class: &'static str,
}

struct Input {
    stream_id: StreamId,
    track_id: u32,
    option: WrappingOption,
    edit_rate: Rational,
}

/// Drives the whole wrapping procedure: register inputs, build the
/// graph, then [`Wrapper::run`] to write a complete file.
pub struct Wrapper {
    dict: Dictionary,
    options: WrapOptions,
    store: ObjectStore,
    primer: Primer,
    gc: GenericContainerWriter,
    body: BodyWriter,
    inputs: Vec<Input>,
    material_package_id: Umid,
    file_package_id: Umid,
    body_sid: u32,
    preface_uid: Option<Uuid>,
}

impl Wrapper {
    pub fn new(dict: Dictionary, options: WrapOptions, material_package_id: Umid, file_package_id: Umid) -> Self {
        let sharing = SharingPolicy {
            index_may_share_with_metadata: !options.index.isolated && !options.index.very_isolated,
            essence_may_share_with_metadata: !options.index.very_isolated,
        };
        let boundary = match options.body_partition {
            BodyPartitionMode::None => PartitionBoundary::None,
            BodyPartitionMode::Duration(n) => PartitionBoundary::Duration {
                edit_units: n,
                edit_align: options.edit_align_partitions,
            },
            BodyPartitionMode::Size(n) => PartitionBoundary::Size { bytes: n },
        };
        let mut primer = Primer::new();
        primer.seed(dict.static_primer());
        Self {
            dict,
            options,
            store: ObjectStore::new(),
            primer,
            gc: GenericContainerWriter::new(),
            body: BodyWriter::with_wire_version(boundary, sharing, options.index_wire_version),
            inputs: Vec::new(),
            material_package_id,
            file_package_id,
            body_sid: 1,
            preface_uid: None,
        }
    }

    /// Register one essence stream. OP-Atom rejects a second input: the
    /// Operational Pattern requires exactly one essence container.
    pub fn add_input(
        &mut self,
        source: Box<dyn EssenceSource>,
        option: WrappingOption,
        track_id: u32,
        indexed: bool,
    ) -> Result<()> {
        if self.options.op == OperationalPattern::Atom && !self.inputs.is_empty() {
            return Err(Error::OpAtomMultipleContainers(self.inputs.len() + 1));
        }
        let edit_rate = source.edit_rate();
        if let Some(first) = self.inputs.first() {
            if first.edit_rate != edit_rate {
                return Err(Error::EditRateMismatch(first.edit_rate, edit_rate));
            }
        }
        let stream_id = StreamId(self.inputs.len() as u32 + 1);
        match option.item_type {
            ItemType::System => self.gc.add_system_element(stream_id, option.cp_compatible, option.element_type),
            ItemType::Picture => self.gc.add_picture_element(stream_id, option.cp_compatible, option.element_type),
            ItemType::Sound => self.gc.add_sound_element(stream_id, option.cp_compatible, option.element_type),
            ItemType::Data => self.gc.add_data_element(stream_id, option.cp_compatible, option.element_type),
            ItemType::Compound => self.gc.add_compound_element(stream_id, option.element_type),
        }
        self.body.add_stream(stream_id, source, option.wrap_type, self.body_sid, indexed);
        self.inputs.push(Input {
            stream_id,
            track_id,
            option,
            edit_rate,
        });
        Ok(())
    }

    /// One Material Package track per input, linked by `MakeLink` to a
    /// matching track on a single File Package, plus Preface /
    /// ContentStorage / Identification bookkeeping objects.
    fn build_graph(&mut self) -> Result<()> {
        let tracks: Vec<TrackSpec> = self
            .inputs
            .iter()
            .map(|i| TrackSpec {
                track_id: i.track_id,
                edit_rate: i.edit_rate,
                origin: 0,
                data_definition: i.option.data_definition,
            })
            .collect();

        let descriptor_classes: Vec<&str> = self.inputs.iter().map(|i| i.option.descriptor_class).collect();

        let file_package_uid =
            build_file_package(&mut self.store, self.file_package_id, &tracks, &descriptor_classes, "GenericContainer")?;
        let material_package_uid = build_material_package(&mut self.store, self.material_package_id, &tracks, self.file_package_id)?;

        let mut content_storage = MDObject::new("ContentStorage");
        content_storage.set("Packages", Value::RefArray(vec![material_package_uid, file_package_uid]));
        let content_storage_uid = content_storage.instance_uid;
        self.store.insert(content_storage);

        let identification_uid = self.append_identification()?;

        let mut preface = MDObject::new("Preface");
        preface.set("ContentStorage", Value::Ref(content_storage_uid));
        preface.set("Identifications", Value::RefArray(vec![identification_uid]));
        preface.set("PrimaryPackage", Value::Ref(file_package_uid));
        preface.set("OperationalPattern", Value::Leaf(self.options.op.in_progress_label().as_bytes().to_vec()));
        self.preface_uid = Some(preface.instance_uid);
        self.store.insert(preface);
        Ok(())
    }

    /// Append a fresh Identification record and run `UpdateGenerations`:
    /// every object still marked modified has its `GenerationUID` set to
    /// this Identification's `ThisGenerationUID` and its modified flag
    /// cleared. Called once at graph build time (stamping the objects the
    /// graph just built) and again at the footer, after duration updates
    /// have re-dirtied the Components/Descriptors they touched.
    fn append_identification(&mut self) -> Result<Uuid> {
        let generation_uid = new_instance_uid();
        let mut identification = MDObject::new("Identification");
        identification.set("ThisGenerationUID", Value::Leaf(generation_uid.as_bytes().to_vec()));
        let uid = identification.instance_uid;
        self.store.insert(identification);
        self.update_generations(generation_uid);
        Ok(uid)
    }

    /// `UpdateGenerations`: every object still marked modified (excluding
    /// the Identification itself, which carries `ThisGenerationUID`
    /// rather than `GenerationUID`) gets `GenerationUID` set to
    /// `generation_uid` and its modified flag cleared.
    fn update_generations(&mut self, generation_uid: Uuid) {
        let dirty_uids: Vec<Uuid> = self
            .store
            .iter()
            .filter(|o| o.is_dirty() && o.class_name != "Identification")
            .map(|o| o.instance_uid)
            .collect();
        let value = Value::Leaf(generation_uid.as_bytes().to_vec());
        for uid in dirty_uids {
            if let Some(object) = self.store.get_mut(&uid) {
                object.set("GenerationUID", value.clone());
                object.clear_dirty();
            }
        }
    }

    /// Pre-assign a primer tag for every item name any graph object
    /// carries, so [`Self::serialize_metadata`] never has to allocate
    /// one mid-serialization.
    fn assign_primer_tags(&mut self) -> Result<()> {
        for object in self.store.iter() {
            for (name, _) in object.iter() {
                if let Some(ul) = self.dict.class_by_name(name).and_then(|c| c.ul) {
                    self.primer.tag_for(ul)?;
                }
            }
        }
        Ok(())
    }

    /// Serialize every object in the store as a Set or Pack KLV, in
    /// declaration order.
    fn serialize_metadata(&self) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        for object in self.store.iter() {
            let class = self
                .dict
                .class_by_name(&object.class_name)
                .ok_or_else(|| mxf_core::Error::dictionary(format!("unknown class {}", object.class_name)))?;
            let ul = class
                .ul
                .ok_or_else(|| mxf_core::Error::dictionary(format!("class {} has no UL", object.class_name)))?;
            let body = match class.container {
                ContainerType::Set => {
                    let names: Vec<String> = object.iter().map(|(k, _)| k.clone()).collect();
                    let tags = name_to_tag_map(&self.dict, &self.primer, names)?;
                    object.write_set(class, &tags)?
                }
                ContainerType::Pack => object.write_pack(class)?,
                _ => continue,
            };
            write_klv(&mut buf, &ul, &body);
        }
        Ok(buf)
    }

    fn primer_klv(&self) -> Result<Vec<u8>> {
        let ul = self
            .dict
            .class_by_name("Primer")
            .and_then(|c| c.ul)
            .ok_or_else(|| mxf_core::Error::dictionary("Primer class has no UL".to_string()))?;
        let mut buf = Vec::new();
        write_klv(&mut buf, &ul, &self.primer.write());
        Ok(buf)
    }

    fn index_segment_klv(&self, segment: &IndexTableSegment) -> Vec<u8> {
        let version = self.body.wire_version();
        let ul = match version {
            mxf_index::WireVersion::V11 => INDEX_TABLE_SEGMENT_UL_V11,
            mxf_index::WireVersion::V10 => INDEX_TABLE_SEGMENT_UL_V10,
        };
        let mut buf = Vec::new();
        write_klv(&mut buf, &ul, &segment.write(version));
        buf
    }

    /// Run the whole wrapping procedure, writing a complete file to
    /// `out`. Consumes the inputs registered via [`Self::add_input`].
    pub fn run<W: Write>(&mut self, out: &mut W) -> Result<()> {
        self.build_graph()?;
        self.assign_primer_tags()?;

        let op_label = self.options.op.in_progress_label();
        let index_edit_rate = self.inputs.first().map(|i| i.edit_rate).unwrap_or(Rational::new(25, 1));

        let mut pos: u64 = 0;
        let mut rip = RandomIndexPack::new();

        // Header partition: partition pack, Primer, structural metadata,
        // KAG alignment fill.
        let primer_klv = self.primer_klv()?;
        let metadata_bytes = self.serialize_metadata()?;

        let mut header_pack = PartitionPack::new(PartitionKind::Header, PartitionStatus::OpenIncomplete, op_label);
        header_pack.kag_size = self.options.kag_size;
        header_pack.header_byte_count = (primer_klv.len() + metadata_bytes.len()) as u64;
        header_pack.essence_containers.push(GENERIC_CONTAINER_LABEL);
        let header_pack_bytes = header_pack.to_klv();

        rip.push(0, pos);
        out.write_all(&header_pack_bytes)?;
        pos += header_pack_bytes.len() as u64;
        out.write_all(&primer_klv)?;
        pos += primer_klv.len() as u64;
        out.write_all(&metadata_bytes)?;
        pos += metadata_bytes.len() as u64;

        let mut fill_buf = Vec::new();
        fill::align(&mut fill_buf, pos, self.options.kag_size, self.options.legacy_klv_fill, false);
        out.write_all(&fill_buf)?;
        pos += fill_buf.len() as u64;

        // First body partition.
        let mut previous_partition = 0u64;
        let mut body_pack = PartitionPack::new(PartitionKind::Body, PartitionStatus::ClosedComplete, op_label);
        body_pack.kag_size = self.options.kag_size;
        body_pack.this_partition = pos;
        body_pack.previous_partition = previous_partition;
        body_pack.body_sid = self.body_sid;
        body_pack.essence_containers.push(GENERIC_CONTAINER_LABEL);
        let body_pack_bytes = body_pack.to_klv();
        rip.push(self.body_sid, pos);
        out.write_all(&body_pack_bytes)?;
        previous_partition = pos;
        pos += body_pack_bytes.len() as u64;

        let mut edit_unit_counts: HashMap<StreamId, u64> = HashMap::new();

        loop {
            if self.body.needs_new_partition() {
                self.body.start_new_partition();
                let mut next_pack = PartitionPack::new(PartitionKind::Body, PartitionStatus::ClosedComplete, op_label);
                next_pack.kag_size = self.options.kag_size;
                next_pack.this_partition = pos;
                next_pack.previous_partition = previous_partition;
                next_pack.body_sid = self.body_sid;
                next_pack.essence_containers.push(GENERIC_CONTAINER_LABEL);
                let next_pack_bytes = next_pack.to_klv();
                rip.push(self.body_sid, pos);
                out.write_all(&next_pack_bytes)?;
                previous_partition = pos;
                pos += next_pack_bytes.len() as u64;
            }

            let mut any = false;
            for input in &self.inputs {
                if let Some(bytes) = self.body.pull_edit_unit(input.stream_id, 0, 0)? {
                    any = true;
                    if !bytes.is_empty() {
                        *edit_unit_counts.entry(input.stream_id).or_insert(0) += 1;
                        self.gc.queue(input.stream_id, bytes);
                    }
                }
            }
            if !any {
                break;
            }

            for klv in self.gc.start_new_cp() {
                out.write_all(&klv)?;
                pos += klv.len() as u64;
            }
        }

        // Update Component/Descriptor durations from the final edit unit
        // count of the longest-running track.
        if let Some(&duration) = edit_unit_counts.values().max() {
            self.update_durations(duration as i64)?;
        }

        // Footer partition: repeat the structural metadata (now final),
        // plus any index segments still staged, then patch the header's
        // FooterPartition offset if requested.
        let segments = self.body.take_ready_segments(index_edit_rate);
        let mut index_bytes = Vec::new();
        for segment in &segments {
            index_bytes.extend_from_slice(&self.index_segment_klv(segment));
        }

        self.append_identification()?;
        let footer_metadata = self.serialize_metadata()?;
        let footer_offset = pos;

        let mut footer_pack = PartitionPack::new(PartitionKind::Footer, PartitionStatus::ClosedComplete, self.options.op.final_label());
        footer_pack.kag_size = self.options.kag_size;
        footer_pack.this_partition = pos;
        footer_pack.previous_partition = previous_partition;
        footer_pack.footer_partition = footer_offset;
        footer_pack.header_byte_count = footer_metadata.len() as u64;
        footer_pack.index_byte_count = index_bytes.len() as u64;
        footer_pack.essence_containers.push(GENERIC_CONTAINER_LABEL);
        let footer_pack_bytes = footer_pack.to_klv();

        rip.push(0, pos);
        out.write_all(&footer_pack_bytes)?;
        pos += footer_pack_bytes.len() as u64;
        out.write_all(&index_bytes)?;
        pos += index_bytes.len() as u64;
        out.write_all(&footer_metadata)?;
        pos += footer_metadata.len() as u64;

        let rip_bytes = rip.to_klv();
        out.write_all(&rip_bytes)?;

        Ok(())
    }

    /// Walk every Component/Descriptor in the store and set `Duration`
    /// (or `ContainerDuration` for a Descriptor) to the final edit unit
    /// count, now that the last content package has been written.
    fn update_durations(&mut self, duration: i64) -> Result<()> {
        let mut buf = Vec::with_capacity(8);
        buf.extend_from_slice(&duration.to_be_bytes());
        let value = Value::Leaf(buf);

        let sequence_like: Vec<Uuid> = self
            .store
            .iter()
            .filter(|o| matches!(o.class_name.as_str(), "Sequence" | "SourceClip"))
            .map(|o| o.instance_uid)
            .collect();
        let descriptor_like: Vec<Uuid> = self
            .store
            .iter()
            .filter(|o| {
                matches!(
                    o.class_name.as_str(),
                    "GenericPictureEssenceDescriptor" | "GenericSoundEssenceDescriptor" | "GenericDataEssenceDescriptor" | "CDCIEssenceDescriptor"
                )
            })
            .map(|o| o.instance_uid)
            .collect();

        for uid in sequence_like {
            if let Some(object) = self.store.get_mut(&uid) {
                object.set("Duration", value.clone());
            }
        }
        for uid in descriptor_like {
            if let Some(object) = self.store.get_mut(&uid) {
                object.set("ContainerDuration", value.clone());
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wrapper() -> Wrapper {
        let dict = Dictionary::build(Vec::new(), Vec::new()).unwrap();
        Wrapper::new(dict, WrapOptions::default(), Umid::new([0x01; 32]), Umid::new([0x02; 32]))
    }

    #[test]
    fn update_generations_stamps_dirty_objects_and_clears_the_flag() {
        let mut wrapper = wrapper();

        let mut dirty = MDObject::new("Sequence");
        dirty.set("DataDefinition", Value::Leaf(b"Picture".to_vec()));
        let dirty_uid = dirty.instance_uid;
        wrapper.store.insert(dirty);

        let clean = MDObject::new("Track");
        let clean_uid = clean.instance_uid;
        wrapper.store.insert(clean);

        wrapper.append_identification().unwrap();

        let stamped = wrapper.store.get(&dirty_uid).unwrap();
        assert!(!stamped.is_dirty());
        assert!(stamped.get("GenerationUID").is_some());

        let untouched = wrapper.store.get(&clean_uid).unwrap();
        assert!(untouched.get("GenerationUID").is_none());
    }

    #[test]
    fn second_generation_only_stamps_objects_dirtied_since_the_first() {
        let mut wrapper = wrapper();
        wrapper.append_identification().unwrap();

        let mut dirty = MDObject::new("Sequence");
        dirty.set("DataDefinition", Value::Leaf(b"Sound".to_vec()));
        let dirty_uid = dirty.instance_uid;
        wrapper.store.insert(dirty);

        wrapper.append_identification().unwrap();

        let identifications: Vec<_> = wrapper.store.iter().filter(|o| o.class_name == "Identification").collect();
        assert_eq!(identifications.len(), 2);

        let stamped = wrapper.store.get(&dirty_uid).unwrap();
        assert!(!stamped.is_dirty());
        assert!(stamped.get("GenerationUID").is_some());
    }
}

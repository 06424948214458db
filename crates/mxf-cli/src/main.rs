//! mxfwrap - wraps raw essence files into an MXF container, or dumps
//! the structure of an existing one.

use anyhow::{bail, Context, Result};
use mxf_core::Rational;
use mxf_dict::{baseline, Dictionary};
use mxf_essence::RawEssenceSource;
use mxf_partition::{read_partition, PartitionKind, PartitionPack, PartitionStatus, RandomIndexPack};
use mxf_index::WireVersion;
use mxf_wrap::{BodyPartitionMode, IndexFlags, OperationalPattern, WrapOptions, Wrapper, WrappingOption};
use std::fs::File;
use std::io::{BufReader, BufWriter, Read};
use std::path::PathBuf;

const VERSION: &str = env!("CARGO_PKG_VERSION");

const HELP: &str = r#"
mxfwrap - wrap raw essence into MXF, or inspect an existing file

USAGE:
    mxfwrap [OPTIONS] -o <OUTPUT> <INPUT>...
    mxfwrap dump [--format text|json] <FILE>

WRAP OPTIONS:
    -a[2]        Force OP-Atom (2-partition variant with -a2)
    -f[0]        Frame-wrap (reserved; raw inputs are clip-wrapped)
    -s           Interleave for streaming (reserved)
    -i           Index in the footer
    -ip          Sparse index
    -is          Sprinkled index
    -ii          Isolated index (no essence sharing)
    -ii2         Very isolated index (no essence or metadata sharing)
    -ka=N        KAG size
    -pd=N        New body partition every N edit units
    -ps=N        New body partition every N bytes
    -hp=N        Header padding
    -hs=N        Header size floor
    -fr=N/D      Force edit rate N/D
    -u           Rewrite header after footer
    -w[=N]       List / select wrapping option (reserved)
    -e           Align partition boundaries to edit points
    -1           Legacy KLVFill key
    -iv=N        IndexTableSegment wire version (10 or 11, default 11)
    -o <FILE>    Output MXF file
    -z           Pause before exit

    mxfwrap --version
    mxfwrap --help
"#;

#[derive(Debug)]
struct WrapConfig {
    inputs: Vec<PathBuf>,
    output: Option<PathBuf>,
    op: OperationalPattern,
    kag_size: u32,
    header_padding: u32,
    header_size_floor: u32,
    body_partition: BodyPartitionMode,
    index: IndexFlags,
    edit_rate_override: Option<Rational>,
    rewrite_header_after_footer: bool,
    edit_align_partitions: bool,
    legacy_klv_fill: bool,
    index_wire_version: WireVersion,
    pause_before_exit: bool,
}

impl Default for WrapConfig {
    fn default() -> Self {
        Self {
            inputs: Vec::new(),
            output: None,
            op: OperationalPattern::Op1a,
            kag_size: 1,
            header_padding: 0,
            header_size_floor: 0,
            body_partition: BodyPartitionMode::None,
            index: IndexFlags::default(),
            edit_rate_override: None,
            rewrite_header_after_footer: false,
            edit_align_partitions: false,
            legacy_klv_fill: false,
            index_wire_version: WireVersion::V11,
            pause_before_exit: false,
        }
    }
}

fn parse_rate(spec: &str) -> Result<Rational> {
    let (num, den) = spec.split_once('/').context("edit rate must be N/D")?;
    Ok(Rational::new(num.parse()?, den.parse()?))
}

fn value_after_eq(arg: &str) -> Option<&str> {
    arg.split_once('=').map(|(_, v)| v)
}

fn parse_wire_version(spec: &str) -> Result<WireVersion> {
    match spec {
        "10" => Ok(WireVersion::V10),
        "11" => Ok(WireVersion::V11),
        other => bail!("-iv expects 10 or 11, got {other}"),
    }
}

fn parse_wrap_args(args: &[String]) -> Result<WrapConfig> {
    let mut cfg = WrapConfig::default();
    let mut i = 0;
    while i < args.len() {
        let arg = args[i].as_str();
        match arg {
            "-a" => cfg.op = OperationalPattern::Atom,
            "-a2" => cfg.op = OperationalPattern::Atom,
            "-f" | "-f0" => {}
            "-s" => {}
            "-i" => cfg.index.in_header = false,
            "-ip" => cfg.index.sparse = true,
            "-is" => cfg.index.sprinkled = true,
            "-ii" => cfg.index.isolated = true,
            "-ii2" => cfg.index.very_isolated = true,
            "-u" => cfg.rewrite_header_after_footer = true,
            "-e" => cfg.edit_align_partitions = true,
            "-1" => cfg.legacy_klv_fill = true,
            "-z" => cfg.pause_before_exit = true,
            "-o" => {
                i += 1;
                let path = args.get(i).context("-o requires a path")?;
                cfg.output = Some(PathBuf::from(path));
            }
            _ if arg.starts_with("-ka=") => cfg.kag_size = value_after_eq(arg).unwrap().parse()?,
            _ if arg.starts_with("-pd=") => cfg.body_partition = BodyPartitionMode::Duration(value_after_eq(arg).unwrap().parse()?),
            _ if arg.starts_with("-ps=") => cfg.body_partition = BodyPartitionMode::Size(value_after_eq(arg).unwrap().parse()?),
            _ if arg.starts_with("-hp=") => cfg.header_padding = value_after_eq(arg).unwrap().parse()?,
            _ if arg.starts_with("-hs=") => cfg.header_size_floor = value_after_eq(arg).unwrap().parse()?,
            _ if arg.starts_with("-fr=") => cfg.edit_rate_override = Some(parse_rate(value_after_eq(arg).unwrap())?),
            _ if arg.starts_with("-iv=") => cfg.index_wire_version = parse_wire_version(value_after_eq(arg).unwrap())?,
            _ if arg.starts_with("-w") => {}
            _ if arg.starts_with('-') => bail!("unrecognized option {arg}"),
            _ => cfg.inputs.push(PathBuf::from(arg)),
        }
        i += 1;
    }
    Ok(cfg)
}

fn baseline_dictionary() -> Result<Dictionary> {
    Dictionary::build(baseline::types(), baseline::classes()).context("building baseline dictionary")
}

fn run_wrap(cfg: WrapConfig) -> Result<()> {
    if cfg.inputs.is_empty() {
        bail!("no input essence files given");
    }
    let output = cfg.output.clone().context("-o <output> is required")?;

    let dict = baseline_dictionary()?;
    let edit_rate = cfg.edit_rate_override.unwrap_or(Rational::new(25, 1));

    let options = WrapOptions {
        op: cfg.op,
        kag_size: cfg.kag_size,
        header_padding: cfg.header_padding,
        header_size_floor: cfg.header_size_floor,
        body_partition: cfg.body_partition,
        index: cfg.index,
        edit_rate_override: cfg.edit_rate_override,
        infer_drop_frame: false,
        rewrite_header_after_footer: cfg.rewrite_header_after_footer,
        edit_align_partitions: cfg.edit_align_partitions,
        legacy_klv_fill: cfg.legacy_klv_fill,
        index_wire_version: cfg.index_wire_version,
    };

    let material_package_id = mxf_core::Umid::new([0x01; 32]);
    let file_package_id = mxf_core::Umid::new([0x02; 32]);
    let mut wrapper = Wrapper::new(dict, options, material_package_id, file_package_id);

    for (idx, path) in cfg.inputs.iter().enumerate() {
        let mut file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
        let mut bytes = Vec::new();
        file.read_to_end(&mut bytes).with_context(|| format!("reading {}", path.display()))?;
        let len = bytes.len() as u32;
        let source = RawEssenceSource::cbr(std::io::Cursor::new(bytes), edit_rate, len.max(1));
        let option = WrappingOption {
            item_type: mxf_container::ItemType::Picture,
            cp_compatible: true,
            element_type: 0x01,
            wrap_type: mxf_container::WrapType::Clip,
            data_definition: "Picture",
            descriptor_class: "GenericPictureEssenceDescriptor",
        };
        wrapper
            .add_input(Box::new(source), option, idx as u32 + 1, cfg.index.in_header || cfg.index.sparse || cfg.index.sprinkled)
            .with_context(|| format!("registering input {}", path.display()))?;
    }

    let out_file = File::create(&output).with_context(|| format!("creating {}", output.display()))?;
    let mut out = BufWriter::new(out_file);
    wrapper.run(&mut out).context("writing MXF file")?;

    if cfg.pause_before_exit {
        eprintln!("press enter to exit...");
        let mut discard = String::new();
        std::io::stdin().read_line(&mut discard).ok();
    }
    Ok(())
}

fn run_dump(path: &PathBuf, format: &str) -> Result<()> {
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let mut reader = BufReader::new(file);
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes).context("reading file")?;

    let mut partitions = Vec::new();
    let mut r = mxf_core::primitives::Reader::new(&bytes, path.to_string_lossy().as_ref());
    while r.remaining() > 16 {
        let start = r.position();
        let klv = match mxf_klv::read_klv(&mut r) {
            Ok(klv) => klv,
            Err(_) => break,
        };
        if let Some(pack) = PartitionPack::from_klv(&klv, "dump")? {
            partitions.push((start, pack));
        }
    }

    let rip = RandomIndexPack::locate(&bytes, "dump").ok();

    if format == "json" {
        let parts: Vec<_> = partitions
            .iter()
            .map(|(offset, p)| {
                serde_json::json!({
                    "offset": offset,
                    "kind": format!("{:?}", p.kind),
                    "status": format!("{:?}", p.status),
                    "body_sid": p.body_sid,
                    "index_sid": p.index_sid,
                    "header_byte_count": p.header_byte_count,
                    "index_byte_count": p.index_byte_count,
                })
            })
            .collect();
        let rip_json = rip.as_ref().map(|r| {
            r.entries
                .iter()
                .map(|e| serde_json::json!({"body_sid": e.body_sid, "byte_offset": e.byte_offset}))
                .collect::<Vec<_>>()
        });
        let doc = serde_json::json!({"partitions": parts, "random_index_pack": rip_json});
        println!("{}", serde_json::to_string_pretty(&doc)?);
    } else {
        for (offset, p) in &partitions {
            println!(
                "0x{offset:08x}  {:?} {:?}  BodySID={} IndexSID={} HeaderByteCount={} IndexByteCount={}",
                p.kind, p.status, p.body_sid, p.index_sid, p.header_byte_count, p.index_byte_count
            );
        }
        match &rip {
            Some(r) => {
                println!("RandomIndexPack: {} entries", r.entries.len());
                for e in &r.entries {
                    println!("  BodySID={} offset=0x{:08x}", e.body_sid, e.byte_offset);
                }
            }
            None => println!("RandomIndexPack: none found"),
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::try_init().ok();
    let args: Vec<String> = std::env::args().skip(1).collect();

    if args.is_empty() || args[0] == "--help" || args[0] == "-h" {
        println!("{HELP}");
        return Ok(());
    }
    if args[0] == "--version" {
        println!("mxfwrap {VERSION}");
        return Ok(());
    }
    if args[0] == "dump" {
        let mut format = "text".to_string();
        let mut file = None;
        let mut i = 1;
        while i < args.len() {
            if args[i] == "--format" {
                i += 1;
                format = args.get(i).context("--format requires a value")?.clone();
            } else {
                file = Some(PathBuf::from(&args[i]));
            }
            i += 1;
        }
        let file = file.context("dump requires a file path")?;
        return run_dump(&file, &format);
    }

    let cfg = parse_wrap_args(&args)?;
    run_wrap(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_atom_and_kag_flags() {
        let args = vec!["-a".to_string(), "-ka=512".to_string(), "-o".to_string(), "out.mxf".to_string(), "a.raw".to_string()];
        let cfg = parse_wrap_args(&args).unwrap();
        assert_eq!(cfg.op, OperationalPattern::Atom);
        assert_eq!(cfg.kag_size, 512);
        assert_eq!(cfg.output, Some(PathBuf::from("out.mxf")));
        assert_eq!(cfg.inputs, vec![PathBuf::from("a.raw")]);
    }

    #[test]
    fn parses_body_partition_and_edit_rate() {
        let args = vec!["-pd=25".to_string(), "-fr=30000/1001".to_string(), "-o".to_string(), "out.mxf".to_string(), "a.raw".to_string()];
        let cfg = parse_wrap_args(&args).unwrap();
        assert_eq!(cfg.body_partition, BodyPartitionMode::Duration(25));
        assert_eq!(cfg.edit_rate_override, Some(Rational::new(30000, 1001)));
    }

    #[test]
    fn rejects_unknown_flag() {
        let args = vec!["--bogus".to_string()];
        assert!(parse_wrap_args(&args).is_err());
    }
}

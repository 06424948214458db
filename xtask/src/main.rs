//! xtask - developer tasks for mxf-rs.
//!
//! Commands:
//!   cargo xtask dump-dictionary   - dump the baseline TypeDef/ClassDef
//!                                   records to JSON

use anyhow::Result;
use clap::{Parser, Subcommand};
use mxf_dict::baseline;
use mxf_dict::classdef::{ClassDefRecord, ContainerType, RefKind, Usage};
use mxf_dict::typedef::TypeDefRecord;
use std::fs;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "xtask")]
#[command(about = "Developer tasks for mxf-rs")]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Dump the compiled-in baseline dictionary to JSON
    DumpDictionary {
        #[arg(short, long, default_value = "xtask/dictionary.json")]
        output: PathBuf,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();
    match args.command {
        Commands::DumpDictionary { output } => dump_dictionary(&output)?,
    }
    Ok(())
}

fn usage_str(usage: Usage) -> &'static str {
    match usage {
        Usage::Required => "Required",
        Usage::EncoderRequired => "EncoderRequired",
        Usage::DecoderRequired => "DecoderRequired",
        Usage::Optional => "Optional",
        Usage::BestEffort => "BestEffort",
        Usage::Dark => "Dark",
        Usage::Toxic => "Toxic",
    }
}

fn container_str(c: ContainerType) -> &'static str {
    match c {
        ContainerType::None => "Item",
        ContainerType::Set => "Set",
        ContainerType::Pack => "Pack",
        ContainerType::Vector => "Vector",
        ContainerType::Array => "Array",
    }
}

fn ref_kind_str(k: RefKind) -> &'static str {
    match k {
        RefKind::None => "None",
        RefKind::Strong => "Strong",
        RefKind::Weak => "Weak",
        RefKind::Target => "Target",
    }
}

fn class_to_json(rec: &ClassDefRecord) -> serde_json::Value {
    serde_json::json!({
        "name": rec.name,
        "ul": rec.ul.map(|u| u.to_string()),
        "parent": rec.parent,
        "container": container_str(rec.container),
        "type_name": rec.type_name,
        "children": rec.own_children,
        "usage": usage_str(rec.usage),
        "ref_kind": ref_kind_str(rec.ref_kind),
        "ref_target": rec.ref_target,
    })
}

fn type_to_json(rec: &TypeDefRecord) -> serde_json::Value {
    serde_json::json!({
        "name": rec.name(),
        "ul": rec.ul().map(|u| u.to_string()),
        "depends_on": rec.depends_on(),
    })
}

fn dump_dictionary(output: &PathBuf) -> Result<()> {
    let types: Vec<_> = baseline::types().iter().map(type_to_json).collect();
    let classes: Vec<_> = baseline::classes().iter().map(class_to_json).collect();
    let doc = serde_json::json!({ "types": types, "classes": classes });

    if let Some(parent) = output.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(output, serde_json::to_string_pretty(&doc)?)?;
    println!("wrote {} types and {} classes to {}", baseline::types().len(), baseline::classes().len(), output.display());
    Ok(())
}

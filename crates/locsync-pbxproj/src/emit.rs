//! Writer for the project file format.
//!
//! Emits the standard pbxproj layout: UTF-8 marker comment, tab
//! indentation, the object table grouped into per-kind sections, and
//! display-name annotation comments next to node-ID references. Comments
//! are regenerated from the graph; the host toolchain ignores them.

use std::collections::HashMap;

use crate::graph::PbxProject;
use crate::parse::is_atom_char;
use crate::value::{Dict, Value};

/// Kinds whose entries are written on a single line, as Xcode does.
const SINGLE_LINE_KINDS: [&str; 2] = ["PBXBuildFile", "PBXFileReference"];

pub(crate) fn emit(project: &PbxProject) -> String {
    let objects: Vec<(String, Dict)> = project
        .objects
        .iter()
        .map(|(id, node)| (id.to_string(), node.to_dict()))
        .collect();
    let annotations = build_annotations(&objects, project.root_object_id());

    let mut out = String::new();
    out.push_str("// !$*UTF8*$!\n{\n");
    for (key, value) in project.header().iter() {
        write_entry(&mut out, key, value, 1, &annotations);
    }

    out.push_str("\tobjects = {\n");
    let mut kinds: Vec<&str> = objects
        .iter()
        .map(|(_, dict)| dict.get_str("isa").unwrap_or(""))
        .collect();
    kinds.sort_unstable();
    kinds.dedup();
    for kind in kinds {
        out.push('\n');
        out.push_str(&format!("/* Begin {kind} section */\n"));
        for (id, dict) in &objects {
            if dict.get_str("isa").unwrap_or("") != kind {
                continue;
            }
            let annotated_id = annotate(id, &annotations);
            if SINGLE_LINE_KINDS.contains(&kind) {
                out.push_str("\t\t");
                out.push_str(&annotated_id);
                out.push_str(" = ");
                write_inline_dict(&mut out, dict, &annotations);
                out.push_str(";\n");
            } else {
                out.push_str("\t\t");
                out.push_str(&annotated_id);
                out.push_str(" = ");
                write_block_dict(&mut out, dict, 2, &annotations);
                out.push_str(";\n");
            }
        }
        out.push_str(&format!("/* End {kind} section */\n"));
    }
    out.push_str("\t};\n");

    out.push_str("\trootObject = ");
    out.push_str(&annotate(project.root_object_id(), &annotations));
    out.push_str(";\n}\n");
    out
}

/// Display-name comments per node ID: the node's name, its path, or a
/// kind-specific label. Build files borrow the referenced node's label plus
/// the containing phase ("InfoPlist.strings in Resources").
fn build_annotations(objects: &[(String, Dict)], root_object: &str) -> HashMap<String, String> {
    let mut annotations = HashMap::new();
    for (id, dict) in objects {
        let isa = dict.get_str("isa").unwrap_or("");
        let label = dict
            .get_str("name")
            .or_else(|| dict.get_str("path"))
            .map(str::to_string)
            .or_else(|| kind_label(isa).map(str::to_string));
        if let Some(label) = label {
            annotations.insert(id.clone(), label);
        }
    }
    annotations.insert(root_object.to_string(), "Project object".to_string());

    // Second pass: build files need the referenced label and phase name.
    let mut build_file_labels = Vec::new();
    for (id, dict) in objects {
        if dict.get_str("isa") != Some("PBXBuildFile") {
            continue;
        }
        let Some(file_ref) = dict.get_str("fileRef") else {
            continue;
        };
        let Some(ref_label) = annotations.get(file_ref) else {
            continue;
        };
        let label = match containing_phase(objects, id, &annotations) {
            Some(phase_label) => format!("{ref_label} in {phase_label}"),
            None => ref_label.clone(),
        };
        build_file_labels.push((id.clone(), label));
    }
    annotations.extend(build_file_labels);
    annotations
}

fn kind_label(isa: &str) -> Option<&'static str> {
    match isa {
        "PBXResourcesBuildPhase" => Some("Resources"),
        "PBXSourcesBuildPhase" => Some("Sources"),
        "PBXFrameworksBuildPhase" => Some("Frameworks"),
        "PBXHeadersBuildPhase" => Some("Headers"),
        _ => None,
    }
}

/// Label of the build phase whose member list contains the build file.
fn containing_phase<'a>(
    objects: &'a [(String, Dict)],
    build_file: &str,
    annotations: &'a HashMap<String, String>,
) -> Option<&'a String> {
    for (id, dict) in objects {
        let isa = dict.get_str("isa").unwrap_or("");
        if !isa.ends_with("BuildPhase") {
            continue;
        }
        let Some(files) = dict.get("files").and_then(Value::as_array) else {
            continue;
        };
        if files.iter().any(|f| f.as_str() == Some(build_file)) {
            return annotations.get(id);
        }
    }
    None
}

fn annotate(value: &str, annotations: &HashMap<String, String>) -> String {
    match annotations.get(value) {
        Some(label) => format!("{} /* {label} */", quote(value)),
        None => quote(value),
    }
}

fn write_entry(
    out: &mut String,
    key: &str,
    value: &Value,
    indent: usize,
    annotations: &HashMap<String, String>,
) {
    out.push_str(&"\t".repeat(indent));
    out.push_str(&quote(key));
    out.push_str(" = ");
    write_value(out, value, indent, annotations);
    out.push_str(";\n");
}

fn write_value(
    out: &mut String,
    value: &Value,
    indent: usize,
    annotations: &HashMap<String, String>,
) {
    match value {
        Value::String(s) => out.push_str(&annotate(s, annotations)),
        Value::Dict(dict) => write_block_dict(out, dict, indent, annotations),
        Value::Array(items) => {
            out.push_str("(\n");
            for item in items {
                out.push_str(&"\t".repeat(indent + 1));
                write_value(out, item, indent + 1, annotations);
                out.push_str(",\n");
            }
            out.push_str(&"\t".repeat(indent));
            out.push(')');
        }
    }
}

fn write_block_dict(
    out: &mut String,
    dict: &Dict,
    indent: usize,
    annotations: &HashMap<String, String>,
) {
    out.push_str("{\n");
    for (key, value) in dict.iter() {
        write_entry(out, key, value, indent + 1, annotations);
    }
    out.push_str(&"\t".repeat(indent));
    out.push('}');
}

fn write_inline_dict(out: &mut String, dict: &Dict, annotations: &HashMap<String, String>) {
    out.push('{');
    for (key, value) in dict.iter() {
        out.push_str(&quote(key));
        out.push_str(" = ");
        write_inline_value(out, value, annotations);
        out.push_str("; ");
    }
    out.push('}');
}

fn write_inline_value(out: &mut String, value: &Value, annotations: &HashMap<String, String>) {
    match value {
        Value::String(s) => out.push_str(&annotate(s, annotations)),
        Value::Dict(dict) => write_inline_dict(out, dict, annotations),
        Value::Array(items) => {
            out.push('(');
            for item in items {
                write_inline_value(out, item, annotations);
                out.push_str(", ");
            }
            out.push(')');
        }
    }
}

/// Quotes a string unless it is a non-empty run of atom characters.
/// Comment openers force quoting even though their characters are atom
/// characters individually.
fn quote(s: &str) -> String {
    if !s.is_empty() && s.chars().all(is_atom_char) && !s.contains("//") && !s.contains("/*") {
        return s.to_string();
    }
    let mut quoted = String::with_capacity(s.len() + 2);
    quoted.push('"');
    for ch in s.chars() {
        match ch {
            '"' => quoted.push_str("\\\""),
            '\\' => quoted.push_str("\\\\"),
            '\n' => quoted.push_str("\\n"),
            '\t' => quoted.push_str("\\t"),
            '\r' => quoted.push_str("\\r"),
            _ => quoted.push(ch),
        }
    }
    quoted.push('"');
    quoted
}

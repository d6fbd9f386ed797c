//! Typed object graph over the project file.
//!
//! The project file stores a flat table of objects keyed by opaque node IDs,
//! cross-referenced by those IDs. Kinds the synchronizer owns get a typed
//! record each; every other kind is carried verbatim so it round-trips
//! untouched. Typed records keep unrecognized attributes in an `extra`
//! table for the same reason.

use std::fs;
use std::path::Path;

use crate::error::{PbxError, Result};
use crate::value::{Dict, Value};
use crate::{emit, parse};

/// Opaque node identifier (24 uppercase alphanumerics in generated nodes).
pub type NodeId = String;

/// One object in the project graph, tagged by its `isa` kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    FileReference(FileReference),
    BuildFile(BuildFile),
    VariantGroup(VariantGroup),
    Group(Group),
    ResourcesBuildPhase(ResourcesBuildPhase),
    Project(Project),
    Other(OtherNode),
}

/// A reference to one physical file, e.g. `fr.lproj/InfoPlist.strings`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileReference {
    pub file_type: Option<String>,
    pub name: Option<String>,
    pub path: Option<String>,
    pub source_tree: Option<String>,
    pub extra: Dict,
}

/// Inclusion of a file (or variant group) in a build phase.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildFile {
    pub file_ref: Option<NodeId>,
    pub extra: Dict,
}

/// The locale-variant family of one logical resource file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VariantGroup {
    pub name: Option<String>,
    pub children: Vec<NodeId>,
    pub source_tree: Option<String>,
    pub extra: Dict,
}

/// A folder in the project's logical tree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Group {
    pub children: Vec<NodeId>,
    pub extra: Dict,
}

/// The "files copied into the app bundle" build phase.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourcesBuildPhase {
    pub files: Vec<NodeId>,
    pub extra: Dict,
}

/// The project root object.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Project {
    pub development_region: Option<String>,
    pub known_regions: Option<Vec<String>>,
    pub main_group: Option<NodeId>,
    pub extra: Dict,
}

/// Any object kind the synchronizer does not own, kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OtherNode {
    pub dict: Dict,
}

impl Node {
    /// The object's `isa` kind tag.
    pub fn isa(&self) -> &str {
        match self {
            Node::FileReference(_) => "PBXFileReference",
            Node::BuildFile(_) => "PBXBuildFile",
            Node::VariantGroup(_) => "PBXVariantGroup",
            Node::Group(_) => "PBXGroup",
            Node::ResourcesBuildPhase(_) => "PBXResourcesBuildPhase",
            Node::Project(_) => "PBXProject",
            Node::Other(other) => other.dict.get_str("isa").unwrap_or(""),
        }
    }

    /// Builds a typed node from an object dictionary. Missing or malformed
    /// attributes degrade to empty rather than failing; the tie-break policy
    /// matches on stable attributes, so absent ones simply never match.
    pub(crate) fn from_dict(mut dict: Dict) -> Node {
        let isa = dict.get_str("isa").unwrap_or("").to_string();
        match isa.as_str() {
            "PBXFileReference" => {
                dict.remove("isa");
                Node::FileReference(FileReference {
                    file_type: take_string(&mut dict, "lastKnownFileType"),
                    name: take_string(&mut dict, "name"),
                    path: take_string(&mut dict, "path"),
                    source_tree: take_string(&mut dict, "sourceTree"),
                    extra: dict,
                })
            }
            "PBXBuildFile" => {
                dict.remove("isa");
                Node::BuildFile(BuildFile {
                    file_ref: take_string(&mut dict, "fileRef"),
                    extra: dict,
                })
            }
            "PBXVariantGroup" => {
                dict.remove("isa");
                Node::VariantGroup(VariantGroup {
                    name: take_string(&mut dict, "name"),
                    children: take_id_list(&mut dict, "children"),
                    source_tree: take_string(&mut dict, "sourceTree"),
                    extra: dict,
                })
            }
            "PBXGroup" => {
                dict.remove("isa");
                Node::Group(Group {
                    children: take_id_list(&mut dict, "children"),
                    extra: dict,
                })
            }
            "PBXResourcesBuildPhase" => {
                dict.remove("isa");
                Node::ResourcesBuildPhase(ResourcesBuildPhase {
                    files: take_id_list(&mut dict, "files"),
                    extra: dict,
                })
            }
            "PBXProject" => {
                dict.remove("isa");
                Node::Project(Project {
                    development_region: take_string(&mut dict, "developmentRegion"),
                    known_regions: take_string_list(&mut dict, "knownRegions"),
                    main_group: take_string(&mut dict, "mainGroup"),
                    extra: dict,
                })
            }
            _ => Node::Other(OtherNode { dict }),
        }
    }

    /// Serializes the node back to an object dictionary, `isa` first, known
    /// attributes next, untouched attributes after.
    pub(crate) fn to_dict(&self) -> Dict {
        match self {
            Node::FileReference(node) => {
                let mut dict = isa_dict("PBXFileReference");
                put_string(&mut dict, "lastKnownFileType", node.file_type.as_deref());
                put_string(&mut dict, "name", node.name.as_deref());
                put_string(&mut dict, "path", node.path.as_deref());
                put_string(&mut dict, "sourceTree", node.source_tree.as_deref());
                append_extra(&mut dict, &node.extra);
                dict
            }
            Node::BuildFile(node) => {
                let mut dict = isa_dict("PBXBuildFile");
                put_string(&mut dict, "fileRef", node.file_ref.as_deref());
                append_extra(&mut dict, &node.extra);
                dict
            }
            Node::VariantGroup(node) => {
                let mut dict = isa_dict("PBXVariantGroup");
                dict.insert("children", id_list(&node.children));
                put_string(&mut dict, "name", node.name.as_deref());
                put_string(&mut dict, "sourceTree", node.source_tree.as_deref());
                append_extra(&mut dict, &node.extra);
                dict
            }
            Node::Group(node) => {
                let mut dict = isa_dict("PBXGroup");
                dict.insert("children", id_list(&node.children));
                append_extra(&mut dict, &node.extra);
                dict
            }
            Node::ResourcesBuildPhase(node) => {
                let mut dict = isa_dict("PBXResourcesBuildPhase");
                dict.insert("files", id_list(&node.files));
                append_extra(&mut dict, &node.extra);
                dict
            }
            Node::Project(node) => {
                let mut dict = isa_dict("PBXProject");
                put_string(&mut dict, "developmentRegion", node.development_region.as_deref());
                if let Some(regions) = &node.known_regions {
                    dict.insert("knownRegions", id_list(regions));
                }
                put_string(&mut dict, "mainGroup", node.main_group.as_deref());
                append_extra(&mut dict, &node.extra);
                dict
            }
            Node::Other(node) => node.dict.clone(),
        }
    }
}

fn isa_dict(isa: &str) -> Dict {
    let mut dict = Dict::new();
    dict.insert("isa", Value::string(isa));
    dict
}

fn take_string(dict: &mut Dict, key: &str) -> Option<String> {
    match dict.get(key) {
        Some(Value::String(_)) => match dict.remove(key) {
            Some(Value::String(s)) => Some(s),
            _ => None,
        },
        _ => None,
    }
}

fn take_id_list(dict: &mut Dict, key: &str) -> Vec<NodeId> {
    take_string_list(dict, key).unwrap_or_default()
}

fn take_string_list(dict: &mut Dict, key: &str) -> Option<Vec<String>> {
    match dict.get(key) {
        Some(Value::Array(_)) => match dict.remove(key) {
            Some(Value::Array(items)) => Some(
                items
                    .into_iter()
                    .filter_map(|item| match item {
                        Value::String(s) => Some(s),
                        _ => None,
                    })
                    .collect(),
            ),
            _ => None,
        },
        _ => None,
    }
}

fn put_string(dict: &mut Dict, key: &str, value: Option<&str>) {
    if let Some(value) = value {
        dict.insert(key, Value::string(value));
    }
}

fn id_list(ids: &[String]) -> Value {
    Value::Array(ids.iter().map(Value::string).collect())
}

fn append_extra(dict: &mut Dict, extra: &Dict) {
    for (key, value) in extra.iter() {
        dict.insert(key, value.clone());
    }
}

/// The order-preserving object table: node ID to typed node.
#[derive(Debug, Clone, Default)]
pub struct ObjectTable {
    entries: Vec<(NodeId, Node)>,
}

/// Equality ignores entry order: serialization groups nodes into per-kind
/// sections, so a load/store cycle may reorder the table without changing
/// the graph.
impl PartialEq for ObjectTable {
    fn eq(&self, other: &Self) -> bool {
        self.entries.len() == other.entries.len()
            && self
                .entries
                .iter()
                .all(|(id, node)| other.get(id) == Some(node))
    }
}

impl Eq for ObjectTable {}

impl ObjectTable {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == id)
    }

    pub fn get(&self, id: &str) -> Option<&Node> {
        self.entries.iter().find(|(k, _)| k == id).map(|(_, n)| n)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Node> {
        self.entries
            .iter_mut()
            .find(|(k, _)| k == id)
            .map(|(_, n)| n)
    }

    /// Appends a new node. The caller guarantees ID uniqueness (generated
    /// IDs are checked against the table).
    pub fn insert(&mut self, id: NodeId, node: Node) {
        self.entries.push((id, node));
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Node)> {
        self.entries.iter().map(|(k, n)| (k.as_str(), n))
    }

    /// First variant group whose display name matches. Matching is by
    /// attribute, never by node ID: IDs are regenerated whenever a node is
    /// created, so only attribute identity is stable across runs.
    pub fn find_variant_group(&self, name: &str) -> Option<&str> {
        self.iter().find_map(|(id, node)| match node {
            Node::VariantGroup(group) if group.name.as_deref() == Some(name) => Some(id),
            _ => None,
        })
    }

    /// First file reference whose path matches.
    pub fn find_file_reference(&self, path: &str) -> Option<&str> {
        self.iter().find_map(|(id, node)| match node {
            Node::FileReference(reference) if reference.path.as_deref() == Some(path) => Some(id),
            _ => None,
        })
    }

    /// First build file wrapping the given referenced node.
    pub fn find_build_file(&self, file_ref: &str) -> Option<&str> {
        self.iter().find_map(|(id, node)| match node {
            Node::BuildFile(build_file) if build_file.file_ref.as_deref() == Some(file_ref) => {
                Some(id)
            }
            _ => None,
        })
    }

    /// First resources build phase in the table.
    pub fn first_resources_phase(&self) -> Option<&str> {
        self.iter().find_map(|(id, node)| match node {
            Node::ResourcesBuildPhase(_) => Some(id),
            _ => None,
        })
    }

    pub fn group_mut(&mut self, id: &str) -> Result<&mut Group> {
        match self.get_mut(id) {
            Some(Node::Group(group)) => Ok(group),
            Some(node) => Err(PbxError::integrity(format!(
                "node {id} is {}, expected PBXGroup",
                node.isa()
            ))),
            None => Err(PbxError::integrity(format!("group {id} not found"))),
        }
    }

    pub fn variant_group_mut(&mut self, id: &str) -> Result<&mut VariantGroup> {
        match self.get_mut(id) {
            Some(Node::VariantGroup(group)) => Ok(group),
            Some(node) => Err(PbxError::integrity(format!(
                "node {id} is {}, expected PBXVariantGroup",
                node.isa()
            ))),
            None => Err(PbxError::integrity(format!("variant group {id} not found"))),
        }
    }

    pub fn resources_phase_mut(&mut self, id: &str) -> Result<&mut ResourcesBuildPhase> {
        match self.get_mut(id) {
            Some(Node::ResourcesBuildPhase(phase)) => Ok(phase),
            Some(node) => Err(PbxError::integrity(format!(
                "node {id} is {}, expected PBXResourcesBuildPhase",
                node.isa()
            ))),
            None => Err(PbxError::integrity(format!("build phase {id} not found"))),
        }
    }
}

/// An in-memory project file: header attributes, the object table, and the
/// root object reference. Loaded fresh from storage at the start of a run
/// and serialized back at the end; durability is entirely file-based.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PbxProject {
    header: Dict,
    root_object: NodeId,
    pub objects: ObjectTable,
}

impl PbxProject {
    /// Parses project file source text.
    pub fn parse_source(text: &str) -> Result<Self> {
        let mut top = parse::parse(text)?;
        let objects_value = top
            .remove("objects")
            .ok_or_else(|| PbxError::integrity("project file has no objects table"))?;
        let objects_dict = match objects_value {
            Value::Dict(dict) => dict,
            _ => return Err(PbxError::integrity("objects table is not a dictionary")),
        };
        let root_object = match top.remove("rootObject") {
            Some(Value::String(id)) => id,
            _ => return Err(PbxError::integrity("project file has no root object")),
        };

        let mut objects = ObjectTable::default();
        for (id, value) in objects_dict.iter() {
            let dict = value
                .as_dict()
                .ok_or_else(|| PbxError::integrity(format!("object {id} is not a dictionary")))?;
            objects.insert(id.to_string(), Node::from_dict(dict.clone()));
        }

        Ok(Self {
            header: top,
            root_object,
            objects,
        })
    }

    /// Loads and parses a project file from disk.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|source| PbxError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse_source(&text)
    }

    /// Serializes and writes the project file. Callers only reach this after
    /// synchronization completed without error.
    pub fn save(&self, path: &Path) -> Result<()> {
        fs::write(path, self.to_source()).map_err(|source| PbxError::Write {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Serializes the project to pbxproj source text.
    pub fn to_source(&self) -> String {
        emit::emit(self)
    }

    pub fn root_object_id(&self) -> &str {
        &self.root_object
    }

    pub(crate) fn header(&self) -> &Dict {
        &self.header
    }

    /// The root project object, kind-checked.
    pub fn root_project(&self) -> Result<&Project> {
        match self.objects.get(&self.root_object) {
            Some(Node::Project(project)) => Ok(project),
            Some(node) => Err(PbxError::integrity(format!(
                "root object {} is {}, expected PBXProject",
                self.root_object,
                node.isa()
            ))),
            None => Err(PbxError::integrity(format!(
                "root object {} not found in objects table",
                self.root_object
            ))),
        }
    }

    pub fn root_project_mut(&mut self) -> Result<&mut Project> {
        let root_object = self.root_object.clone();
        match self.objects.get_mut(&root_object) {
            Some(Node::Project(project)) => Ok(project),
            Some(node) => Err(PbxError::integrity(format!(
                "root object {root_object} is {}, expected PBXProject",
                node.isa()
            ))),
            None => Err(PbxError::integrity(format!(
                "root object {root_object} not found in objects table"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typed_node_keeps_unknown_attributes() {
        let mut dict = Dict::new();
        dict.insert("isa", Value::string("PBXFileReference"));
        dict.insert("path", Value::string("en.lproj/InfoPlist.strings"));
        dict.insert("fileEncoding", Value::string("4"));

        let node = Node::from_dict(dict);
        let Node::FileReference(reference) = &node else {
            panic!("expected file reference");
        };
        assert_eq!(reference.path.as_deref(), Some("en.lproj/InfoPlist.strings"));
        assert_eq!(reference.extra.get_str("fileEncoding"), Some("4"));

        let out = node.to_dict();
        assert_eq!(out.get_str("isa"), Some("PBXFileReference"));
        assert_eq!(out.get_str("fileEncoding"), Some("4"));
    }

    #[test]
    fn malformed_children_degrade_to_empty() {
        let mut dict = Dict::new();
        dict.insert("isa", Value::string("PBXVariantGroup"));
        dict.insert("name", Value::string("InfoPlist.strings"));
        dict.insert("children", Value::string("not-a-list"));

        let Node::VariantGroup(group) = Node::from_dict(dict) else {
            panic!("expected variant group");
        };
        assert!(group.children.is_empty());
        // The malformed attribute is preserved rather than silently dropped.
        assert_eq!(group.extra.get_str("children"), Some("not-a-list"));
    }

    #[test]
    fn unknown_kind_round_trips_verbatim() {
        let mut dict = Dict::new();
        dict.insert("isa", Value::string("XCBuildConfiguration"));
        dict.insert("name", Value::string("Release"));
        let node = Node::from_dict(dict.clone());
        assert_eq!(node.isa(), "XCBuildConfiguration");
        assert_eq!(node.to_dict(), dict);
    }

    #[test]
    fn missing_root_object_is_integrity_error() {
        let err = PbxProject::parse_source("{ objects = {}; }").expect_err("must fail");
        assert!(matches!(err, PbxError::GraphIntegrity { .. }));
    }
}

//! Xcode project file codec and localization graph synchronizer.
//!
//! The project file is an ASCII property list holding a flat table of
//! ID-keyed objects that reference each other. This crate loads that table
//! into a typed graph, idempotently inserts the nodes a localized strings
//! resource needs (file references, a variant group, a build-file wrapper,
//! group and build-phase memberships, known regions), and serializes the
//! graph back without disturbing any object it does not own.

mod emit;
mod parse;

pub mod error;
pub mod graph;
pub mod ids;
pub mod sync;
pub mod value;

pub use error::{PbxError, Result};
pub use graph::{
    BuildFile, FileReference, Group, Node, NodeId, ObjectTable, OtherNode, PbxProject, Project,
    ResourcesBuildPhase, VariantGroup,
};
pub use sync::{
    STRINGS_FILE_NAME, STRINGS_FILE_TYPE, SyncOutcome, strings_file_path, synchronize,
    synchronize_with,
};
pub use value::{Dict, Value};

//! Idempotent localization synchronization of the project graph.
//!
//! Ensures that for a set of locales the graph contains the localized
//! strings-file nodes and memberships, and that the known-region list
//! covers every locale. Matching is always by stable attribute (path or
//! display name), never by node ID: IDs are regenerated whenever a node
//! has to be created, so only attribute identity survives across runs.
//! The operation is strictly additive apart from the in-place known-region
//! update; nodes it does not own are never removed or re-keyed.

use std::collections::BTreeSet;

use rand::Rng;
use tracing::debug;

use crate::error::{PbxError, Result};
use crate::graph::{BuildFile, FileReference, Node, NodeId, PbxProject, VariantGroup};
use crate::ids;
use crate::value::Dict;

/// Display name of the localized strings resource.
pub const STRINGS_FILE_NAME: &str = "InfoPlist.strings";

/// File-kind tag for property-list strings files.
pub const STRINGS_FILE_TYPE: &str = "text.plist.strings";

/// Storage-tree qualifier for group-relative paths.
pub const GROUP_SOURCE_TREE: &str = "<group>";

/// Base localization qualifier always present in the region baseline.
pub const BASE_REGION: &str = "Base";

/// Development region used when the project declares none.
pub const DEFAULT_DEVELOPMENT_REGION: &str = "en";

/// What a synchronization run changed. A second run over the same locales
/// reports no changes at all.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncOutcome {
    /// Locales newly added to the known-region list.
    pub regions_added: Vec<String>,
    /// Whether the variant group (and its build-file wrapper) was created.
    pub created_variant_group: bool,
    /// Locales whose file reference was created this run.
    pub created_file_references: Vec<String>,
    /// Locales newly linked into the variant group's children.
    pub linked_locales: Vec<String>,
}

impl SyncOutcome {
    /// True when the run mutated the graph.
    pub fn changed(&self) -> bool {
        self.created_variant_group
            || !self.regions_added.is_empty()
            || !self.created_file_references.is_empty()
            || !self.linked_locales.is_empty()
    }
}

/// Synchronizes the graph for the given locales, mutating in place.
///
/// # Errors
///
/// Fails with [`PbxError::GraphIntegrity`] when a structurally required node
/// is missing or of the wrong kind (no root project object, unresolvable
/// main group, no resources build phase). The graph may be partially
/// mutated on error; callers must not write it back.
pub fn synchronize(project: &mut PbxProject, locales: &BTreeSet<String>) -> Result<SyncOutcome> {
    synchronize_with(project, locales, &mut rand::rng())
}

/// [`synchronize`] with an explicit random source for generated node IDs.
pub fn synchronize_with<R: Rng + ?Sized>(
    project: &mut PbxProject,
    locales: &BTreeSet<String>,
    rng: &mut R,
) -> Result<SyncOutcome> {
    let mut outcome = SyncOutcome::default();
    if locales.is_empty() {
        return Ok(outcome);
    }

    update_known_regions(project, locales, &mut outcome)?;

    let main_group_id = project
        .root_project()?
        .main_group
        .clone()
        .ok_or_else(|| PbxError::integrity("root object has no main group"))?;
    // Resolve the target container up front; a corrupt main group aborts the
    // run before any node is created.
    project.objects.group_mut(&main_group_id)?;

    let variant_group_id = ensure_variant_group(project, &main_group_id, rng, &mut outcome)?;
    ensure_build_phase_membership(project, &variant_group_id, rng)?;

    for locale in locales {
        let file_id = ensure_file_reference(project, locale, rng, &mut outcome);
        let group = project.objects.variant_group_mut(&variant_group_id)?;
        if !group.children.contains(&file_id) {
            group.children.push(file_id);
            outcome.linked_locales.push(locale.clone());
        }
    }

    debug!(
        regions_added = outcome.regions_added.len(),
        file_references_created = outcome.created_file_references.len(),
        created_variant_group = outcome.created_variant_group,
        "synchronized project graph"
    );
    Ok(outcome)
}

/// Unions the locales into the known-region list. The list is materialized
/// from the baseline (development region plus the base qualifier) when
/// absent, and written back only when the union differs.
fn update_known_regions(
    project: &mut PbxProject,
    locales: &BTreeSet<String>,
    outcome: &mut SyncOutcome,
) -> Result<()> {
    let root = project.root_project_mut()?;
    let mut regions = root.known_regions.clone().unwrap_or_else(|| {
        vec![
            root.development_region
                .clone()
                .unwrap_or_else(|| DEFAULT_DEVELOPMENT_REGION.to_string()),
            BASE_REGION.to_string(),
        ]
    });
    for locale in locales {
        if !regions.iter().any(|region| region == locale) {
            regions.push(locale.clone());
            outcome.regions_added.push(locale.clone());
        }
    }
    if root.known_regions.as_ref() != Some(&regions) {
        root.known_regions = Some(regions);
    }
    Ok(())
}

/// Looks up the variant group for the strings resource by display name,
/// creating it when absent, and guarantees exactly one membership entry in
/// the main group either way.
fn ensure_variant_group<R: Rng + ?Sized>(
    project: &mut PbxProject,
    main_group_id: &str,
    rng: &mut R,
    outcome: &mut SyncOutcome,
) -> Result<NodeId> {
    let group_id = match project.objects.find_variant_group(STRINGS_FILE_NAME) {
        Some(id) => id.to_string(),
        None => {
            let id = ids::unique_id(rng, &project.objects);
            project.objects.insert(
                id.clone(),
                Node::VariantGroup(VariantGroup {
                    name: Some(STRINGS_FILE_NAME.to_string()),
                    children: Vec::new(),
                    source_tree: Some(GROUP_SOURCE_TREE.to_string()),
                    extra: Dict::new(),
                }),
            );
            outcome.created_variant_group = true;
            id
        }
    };

    let main_group = project.objects.group_mut(main_group_id)?;
    if !main_group.children.contains(&group_id) {
        main_group.children.push(group_id.clone());
    }
    Ok(group_id)
}

/// Guarantees one build-file wrapper for the variant group and exactly one
/// membership entry in the resources build phase.
fn ensure_build_phase_membership<R: Rng + ?Sized>(
    project: &mut PbxProject,
    variant_group_id: &str,
    rng: &mut R,
) -> Result<()> {
    let phase_id = project
        .objects
        .first_resources_phase()
        .ok_or_else(|| PbxError::integrity("project has no resources build phase"))?
        .to_string();

    let build_file_id = match project.objects.find_build_file(variant_group_id) {
        Some(id) => id.to_string(),
        None => {
            let id = ids::unique_id(rng, &project.objects);
            project.objects.insert(
                id.clone(),
                Node::BuildFile(BuildFile {
                    file_ref: Some(variant_group_id.to_string()),
                    extra: Dict::new(),
                }),
            );
            id
        }
    };

    let phase = project.objects.resources_phase_mut(&phase_id)?;
    if !phase.files.contains(&build_file_id) {
        phase.files.push(build_file_id);
    }
    Ok(())
}

/// Looks up the locale's file reference by path, creating it when absent.
fn ensure_file_reference<R: Rng + ?Sized>(
    project: &mut PbxProject,
    locale: &str,
    rng: &mut R,
    outcome: &mut SyncOutcome,
) -> NodeId {
    let path = strings_file_path(locale);
    if let Some(id) = project.objects.find_file_reference(&path) {
        return id.to_string();
    }
    let id = ids::unique_id(rng, &project.objects);
    project.objects.insert(
        id.clone(),
        Node::FileReference(FileReference {
            file_type: Some(STRINGS_FILE_TYPE.to_string()),
            name: Some(locale.to_string()),
            path: Some(path),
            source_tree: Some(GROUP_SOURCE_TREE.to_string()),
            extra: Dict::new(),
        }),
    );
    outcome.created_file_references.push(locale.to_string());
    id
}

/// Project-relative path of a locale's strings file.
pub fn strings_file_path(locale: &str) -> String {
    format!("{locale}.lproj/{STRINGS_FILE_NAME}")
}

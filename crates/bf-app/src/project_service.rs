//! Project loading, saving, validation, and introspection.

use std::path::Path;

use bf_project::schema::{AssemblyDef, Project};

use crate::compile;
use crate::error::{AppError, AppResult};

/// One entry of the material listing.
#[derive(Debug, Clone, PartialEq)]
pub struct MaterialSummary {
    pub name: String,
    pub display_name: String,
    pub kind: &'static str,
    pub range_k: Option<(f64, f64)>,
}

/// Summary of one core assembly for listing.
#[derive(Debug, Clone, PartialEq)]
pub struct AssemblySummary {
    pub name: String,
    pub assembly_type: String,
    pub ring: u32,
    pub position: u32,
    pub n_pins: usize,
}

/// Load a project file (`.json` or YAML), migrated and validated.
pub fn load_project(path: &Path) -> AppResult<Project> {
    if !path.exists() {
        return Err(AppError::ProjectFileRead {
            path: path.to_path_buf(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
        });
    }
    Ok(bf_project::load(path)?)
}

/// Save a project; the extension picks the format.
pub fn save_project(path: &Path, project: &Project) -> AppResult<()> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("json") => bf_project::save_json(path, project)?,
        _ => bf_project::save_yaml(path, project)?,
    }
    Ok(())
}

/// Structural validation only; see `compile::compile_project` for the
/// physical checks.
pub fn validate_project(project: &Project) -> AppResult<()> {
    bf_project::validate_project(project)?;
    Ok(())
}

pub fn list_assemblies(project: &Project) -> Vec<AssemblySummary> {
    project
        .core
        .assemblies
        .iter()
        .map(|a| AssemblySummary {
            name: a.name.clone(),
            assembly_type: a.assembly_type.clone(),
            ring: a.ring,
            position: a.position,
            n_pins: project
                .assembly_types
                .iter()
                .find(|t| t.name == a.assembly_type)
                .map_or(0, |t| {
                    let n = t.pin_rings as usize;
                    3 * n * n.saturating_sub(1) + 1
                }),
        })
        .collect()
}

pub fn get_assembly<'a>(project: &'a Project, name: &str) -> AppResult<&'a AssemblyDef> {
    project
        .core
        .assemblies
        .iter()
        .find(|a| a.name == name)
        .ok_or_else(|| AppError::InvalidInput(format!("assembly not found: {}", name)))
}

/// Built-in materials matching `query`, followed by the project's own.
pub fn list_materials(project: Option<&Project>, query: &str) -> AppResult<Vec<MaterialSummary>> {
    let library = match project {
        Some(p) => compile::build_library(p)?,
        None => bf_materials::MaterialLibrary::new(),
    };
    let mut out = Vec::new();
    for entry in bf_materials::filter_builtin_catalog(query) {
        let material = library.resolve(entry.canonical_id)?;
        out.push(MaterialSummary {
            name: entry.canonical_id.to_string(),
            display_name: entry.display_name.to_string(),
            kind: material.kind(),
            range_k: material.valid_range(),
        });
    }
    let query = query.trim().to_ascii_lowercase();
    for name in library.user_materials() {
        if !name.to_ascii_lowercase().contains(&query) {
            continue;
        }
        let material = library.resolve(name)?;
        out.push(MaterialSummary {
            name: name.to_string(),
            display_name: name.to_string(),
            kind: material.kind(),
            range_k: material.valid_range(),
        });
    }
    Ok(out)
}

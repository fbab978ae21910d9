//! Project validation logic.
//!
//! Checks structure and references only. Physical consistency (geometry fit,
//! material ranges, group constraints) is checked when the project is
//! compiled into solver inputs.

use crate::schema::{
    AssemblyTypeDef, ConstraintDef, CoreDef, FlowDef, GroupDef, MaterialDef, MaterialModelDef,
    PowerDef, Project, SolverDef,
};
use std::collections::HashSet;

#[derive(thiserror::Error, Debug)]
pub enum ValidationError {
    #[error("Duplicate ID: {id} in {context}")]
    DuplicateId { id: String, context: String },

    #[error("Missing reference: {id} in {context}")]
    MissingReference { id: String, context: String },

    #[error("Invalid value: {field} = {value} ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Unsupported feature: {feature} - {reason}")]
    Unsupported { feature: String, reason: String },

    #[error("Unsupported version: {version}")]
    UnsupportedVersion { version: u32 },
}

fn invalid(field: impl Into<String>, value: impl ToString, reason: &str) -> ValidationError {
    ValidationError::InvalidValue {
        field: field.into(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

fn positive(field: &str, value: f64) -> Result<(), ValidationError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(invalid(field, value, "must be positive"))
    }
}

fn unique<'a>(
    names: impl IntoIterator<Item = &'a String>,
    context: &str,
) -> Result<HashSet<&'a str>, ValidationError> {
    let mut seen = HashSet::new();
    for name in names {
        if !seen.insert(name.as_str()) {
            return Err(ValidationError::DuplicateId {
                id: name.clone(),
                context: context.to_string(),
            });
        }
    }
    Ok(seen)
}

/// Number of positions in a 1-based hex ring.
pub fn ring_size(ring: u32) -> u32 {
    match ring {
        0 => 0,
        1 => 1,
        r => 6 * (r - 1),
    }
}

pub fn validate_project(project: &Project) -> Result<(), ValidationError> {
    if project.version > crate::migrate::LATEST_VERSION {
        return Err(ValidationError::UnsupportedVersion {
            version: project.version,
        });
    }

    unique(project.materials.iter().map(|m| &m.name), "materials")?;
    for material in &project.materials {
        validate_material(material)?;
    }

    let types = unique(project.assembly_types.iter().map(|t| &t.name), "assembly_types")?;
    for ty in &project.assembly_types {
        validate_assembly_type(ty)?;
    }

    let assemblies = validate_core(&project.core, &types)?;

    unique(project.groups.iter().map(|g| &g.name), "groups")?;
    for group in &project.groups {
        validate_group(group, &assemblies)?;
    }

    validate_power(&project.power, &assemblies)?;
    validate_solver(&project.solver)?;
    Ok(())
}

fn validate_material(material: &MaterialDef) -> Result<(), ValidationError> {
    let field = |p: &str| format!("materials.{}.{}", material.name, p);
    match &material.model {
        MaterialModelDef::Polynomial {
            density,
            heat_capacity,
            conductivity,
            range_k,
            ..
        } => {
            for (name, coeffs) in [
                ("density", density),
                ("heat_capacity", heat_capacity),
                ("conductivity", conductivity),
            ] {
                if coeffs.is_empty() {
                    return Err(invalid(field(name), "[]", "needs at least one coefficient"));
                }
            }
            if let Some((lo, hi)) = range_k
                && !(lo.is_finite() && hi.is_finite() && lo < hi)
            {
                return Err(invalid(field("range_k"), format!("({lo}, {hi})"), "empty range"));
            }
        }
        MaterialModelDef::Table { rows, .. } => {
            if rows.len() < 2 {
                return Err(invalid(field("rows"), rows.len(), "needs at least two rows"));
            }
            if rows
                .windows(2)
                .any(|w| !(w[1].temperature_k > w[0].temperature_k))
            {
                return Err(invalid(
                    field("rows"),
                    "temperature_k",
                    "temperatures must increase strictly",
                ));
            }
        }
    }
    Ok(())
}

fn validate_assembly_type(ty: &AssemblyTypeDef) -> Result<(), ValidationError> {
    let field = |p: &str| format!("assembly_types.{}.{}", ty.name, p);
    if ty.pin_rings == 0 {
        return Err(invalid(field("pin_rings"), 0, "needs at least one ring"));
    }
    positive(&field("pin_pitch_m"), ty.pin_pitch_m)?;
    positive(&field("pin_diameter_m"), ty.pin_diameter_m)?;
    positive(&field("clad_thickness_m"), ty.clad_thickness_m)?;
    positive(&field("length_m"), ty.length_m)?;
    if !(ty.wire_diameter_m >= 0.0 && ty.wire_pitch_m >= 0.0) {
        return Err(invalid(field("wire"), ty.wire_diameter_m, "must not be negative"));
    }
    if ty.duct_ftf_m.is_empty() || ty.duct_ftf_m.len() % 2 != 0 {
        return Err(invalid(
            field("duct_ftf_m"),
            ty.duct_ftf_m.len(),
            "needs inner/outer pairs",
        ));
    }
    unique(ty.regions.iter().map(|r| &r.name), &field("regions"))?;
    for grid in &ty.spacer_grids {
        if !(grid.z_m >= 0.0 && grid.z_m <= ty.length_m) {
            return Err(invalid(field("spacer_grids"), grid.z_m, "outside assembly"));
        }
    }
    if let Some(hotspot) = &ty.hotspot {
        positive(&field("hotspot.sigma_in"), hotspot.sigma_in)?;
        positive(&field("hotspot.sigma_out"), hotspot.sigma_out)?;
    }
    Ok(())
}

fn validate_core<'a>(
    core: &'a CoreDef,
    types: &HashSet<&str>,
) -> Result<HashSet<&'a str>, ValidationError> {
    positive("core.inlet_temperature_k", core.inlet_temperature_k)?;
    positive("core.assembly_pitch_m", core.assembly_pitch_m)?;
    if !(core.bypass_fraction >= 0.0 && core.bypass_fraction < 1.0) {
        return Err(invalid(
            "core.bypass_fraction",
            core.bypass_fraction,
            "must lie in [0, 1)",
        ));
    }
    if core.assemblies.is_empty() {
        return Err(invalid("core.assemblies", 0, "core has no assemblies"));
    }

    let names = unique(core.assemblies.iter().map(|a| &a.name), "core.assemblies")?;
    let mut positions = HashSet::new();
    for asm in &core.assemblies {
        if !types.contains(asm.assembly_type.as_str()) {
            return Err(ValidationError::MissingReference {
                id: asm.assembly_type.clone(),
                context: format!("assembly {}", asm.name),
            });
        }
        if asm.position == 0 || asm.position > ring_size(asm.ring) {
            return Err(invalid(
                format!("core.assemblies.{}.position", asm.name),
                format!("ring {} position {}", asm.ring, asm.position),
                "not on the hex lattice",
            ));
        }
        if !positions.insert((asm.ring, asm.position)) {
            return Err(ValidationError::DuplicateId {
                id: format!("ring {} position {}", asm.ring, asm.position),
                context: "core.assemblies".to_string(),
            });
        }
        match asm.flow {
            FlowDef::Rate { kg_per_s } => {
                positive(&format!("core.assemblies.{}.flow", asm.name), kg_per_s)?
            }
            FlowDef::OutletTemperature { temperature_k } => {
                if !(temperature_k > core.inlet_temperature_k) {
                    return Err(invalid(
                        format!("core.assemblies.{}.flow", asm.name),
                        temperature_k,
                        "outlet must exceed inlet temperature",
                    ));
                }
            }
        }
    }
    Ok(names)
}

fn validate_group(group: &GroupDef, assemblies: &HashSet<&str>) -> Result<(), ValidationError> {
    if group.members.is_empty() {
        return Err(invalid(format!("groups.{}.members", group.name), 0, "empty group"));
    }
    for member in &group.members {
        if !assemblies.contains(member.as_str()) {
            return Err(ValidationError::MissingReference {
                id: member.clone(),
                context: format!("group {}", group.name),
            });
        }
    }
    match group.constraint {
        ConstraintDef::FlowRate { kg_per_s } => {
            positive(&format!("groups.{}.flow", group.name), kg_per_s)
        }
        ConstraintDef::TemperatureLimit { limit_k, .. } => {
            positive(&format!("groups.{}.limit_k", group.name), limit_k)
        }
    }
}

fn validate_power(power: &PowerDef, assemblies: &HashSet<&str>) -> Result<(), ValidationError> {
    if power.table.is_some() && power.flux.is_some() {
        return Err(ValidationError::Unsupported {
            feature: "power".to_string(),
            reason: "give either a power table or a flux field, not both".to_string(),
        });
    }
    if let Some(total) = power.total_power_w
        && !(total.is_finite() && total >= 0.0)
    {
        return Err(invalid("power.total_power_w", total, "must not be negative"));
    }
    if !(power.scaling_factor.is_finite() && power.scaling_factor >= 0.0) {
        return Err(invalid(
            "power.scaling_factor",
            power.scaling_factor,
            "must not be negative",
        ));
    }
    if let Some(table) = &power.table {
        if table.z_edges_m.len() < 2 {
            return Err(invalid("power.table.z_edges_m", table.z_edges_m.len(), "needs two edges"));
        }
        for row in &table.rows {
            if !assemblies.contains(row.assembly.as_str()) {
                return Err(ValidationError::MissingReference {
                    id: row.assembly.clone(),
                    context: "power table".to_string(),
                });
            }
        }
    }
    if let Some(flux) = &power.flux {
        let mut seen = HashSet::new();
        for entry in &flux.assemblies {
            if !assemblies.contains(entry.assembly.as_str()) {
                return Err(ValidationError::MissingReference {
                    id: entry.assembly.clone(),
                    context: "flux field".to_string(),
                });
            }
            if !seen.insert(entry.assembly.as_str()) {
                return Err(ValidationError::DuplicateId {
                    id: entry.assembly.clone(),
                    context: "flux field".to_string(),
                });
            }
            let cells = entry.z_edges_m.len().saturating_sub(1);
            if cells == 0 || entry.neutron.len() != cells || entry.gamma.len() != cells {
                return Err(invalid(
                    format!("power.flux.{}", entry.assembly),
                    cells,
                    "flux values must match axial intervals",
                ));
            }
        }
    }
    Ok(())
}

fn validate_solver(solver: &SolverDef) -> Result<(), ValidationError> {
    positive("solver.axial.max_step_m", solver.axial.max_step_m)?;
    if let Some(size) = solver.axial.mesh_size_m {
        positive("solver.axial.mesh_size_m", size)?;
    }
    if !(solver.network.relaxation > 0.0 && solver.network.relaxation <= 1.0) {
        return Err(invalid(
            "solver.network.relaxation",
            solver.network.relaxation,
            "must lie in (0, 1]",
        ));
    }
    positive("solver.network.tolerance_k", solver.network.tolerance_k)?;
    let o = &solver.orificing;
    positive("solver.orificing.tolerance_k", o.tolerance_k)?;
    if !(o.min_flow_kg_per_s > 0.0 && o.max_flow_kg_per_s > o.min_flow_kg_per_s) {
        return Err(invalid(
            "solver.orificing.flow_bounds",
            format!("[{}, {}]", o.min_flow_kg_per_s, o.max_flow_kg_per_s),
            "empty bracket",
        ));
    }
    if !(o.bracket_factor > 1.0) {
        return Err(invalid(
            "solver.orificing.bracket_factor",
            o.bracket_factor,
            "must exceed 1",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ring_sizes() {
        assert_eq!(ring_size(0), 0);
        assert_eq!(ring_size(1), 1);
        assert_eq!(ring_size(2), 6);
        assert_eq!(ring_size(5), 24);
    }

    #[test]
    fn duplicate_names_are_reported() {
        let names = vec!["a".to_string(), "b".to_string(), "a".to_string()];
        let err = unique(names.iter(), "core.assemblies").unwrap_err();
        assert!(matches!(err, ValidationError::DuplicateId { id, .. } if id == "a"));
    }
}

//! Schema migration framework.

use crate::ProjectError;
use crate::schema::Project;

pub const LATEST_VERSION: u32 = 1;

pub fn migrate_to_latest(mut project: Project) -> Result<Project, ProjectError> {
    while project.version < LATEST_VERSION {
        project = migrate_one_version(project)?;
    }
    Ok(project)
}

fn migrate_one_version(project: Project) -> Result<Project, ProjectError> {
    match project.version {
        0 => migrate_v0_to_v1(project),
        v => Err(ProjectError::Migration {
            what: format!("No migration path from version {}", v),
        }),
    }
}

/// Version 0 files gave the bypass share in percent.
fn migrate_v0_to_v1(mut project: Project) -> Result<Project, ProjectError> {
    if project.core.bypass_fraction > 1.0 {
        project.core.bypass_fraction /= 100.0;
    }
    project.version = 1;
    Ok(project)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{AssemblyDef, CoreDef, FlowDef, GapModelDef, PowerDef, SolverDef};

    fn project(version: u32, bypass_fraction: f64) -> Project {
        Project {
            version,
            name: "test".to_string(),
            materials: vec![],
            assembly_types: vec![],
            core: CoreDef {
                inlet_temperature_k: 628.15,
                assembly_pitch_m: 0.12,
                bypass_fraction,
                gap_model: GapModelDef::Flow,
                gap_coolant: None,
                assemblies: vec![AssemblyDef {
                    name: "a1".to_string(),
                    assembly_type: "driver".to_string(),
                    ring: 1,
                    position: 1,
                    flow: FlowDef::Rate { kg_per_s: 25.0 },
                }],
            },
            groups: vec![],
            power: PowerDef::default(),
            solver: SolverDef::default(),
        }
    }

    #[test]
    fn migrate_latest_is_noop() {
        let p = project(LATEST_VERSION, 0.05);
        let migrated = migrate_to_latest(p.clone()).unwrap();
        assert_eq!(migrated, p);
    }

    #[test]
    fn migrate_percent_bypass_to_fraction() {
        let migrated = migrate_to_latest(project(0, 5.0)).unwrap();
        assert_eq!(migrated.version, LATEST_VERSION);
        assert!((migrated.core.bypass_fraction - 0.05).abs() < 1e-12);
    }

    #[test]
    fn migrate_keeps_fractional_bypass() {
        let migrated = migrate_to_latest(project(0, 0.08)).unwrap();
        assert_eq!(migrated.core.bypass_fraction, 0.08);
    }
}

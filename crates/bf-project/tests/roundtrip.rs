use bf_project::schema::*;
use bf_project::{
    ProjectError, ValidationError, from_yaml_str, load_json, load_yaml, save_json, save_yaml,
    validate_project,
};

const TWO_ASSEMBLY: &str = include_str!("data/two_assembly.yaml");

fn minimal() -> Project {
    Project {
        version: 1,
        name: "Minimal Project".to_string(),
        materials: vec![],
        assembly_types: vec![AssemblyTypeDef {
            name: "driver".to_string(),
            pin_rings: 2,
            pin_pitch_m: 0.008,
            pin_diameter_m: 0.007,
            clad_thickness_m: 0.0005,
            wire_pitch_m: 0.2,
            wire_diameter_m: 0.0009,
            duct_ftf_m: vec![0.03, 0.032],
            length_m: 1.2,
            coolant: "sodium".to_string(),
            duct_material: "ht9".to_string(),
            clad_material: "ht9".to_string(),
            regions: vec![],
            spacer_grids: vec![],
            fuel: None,
            pin_zones: None,
            correlations: CorrelationsDef::default(),
            hotspot: None,
        }],
        core: CoreDef {
            inlet_temperature_k: 623.0,
            assembly_pitch_m: 0.034,
            bypass_fraction: 0.0,
            gap_model: GapModelDef::None,
            gap_coolant: None,
            assemblies: vec![AssemblyDef {
                name: "a1".to_string(),
                assembly_type: "driver".to_string(),
                ring: 1,
                position: 1,
                flow: FlowDef::Rate { kg_per_s: 1.5 },
            }],
        },
        groups: vec![],
        power: PowerDef::default(),
        solver: SolverDef::default(),
    }
}

#[test]
fn roundtrip_yaml_minimal_project() {
    let project = minimal();
    validate_project(&project).unwrap();

    let path = std::env::temp_dir().join("bf_project_roundtrip_minimal.yaml");
    save_yaml(&path, &project).unwrap();
    let loaded = load_yaml(&path).unwrap();

    assert_eq!(project, loaded);
}

#[test]
fn roundtrip_json_fixture_project() {
    let project = from_yaml_str(TWO_ASSEMBLY).unwrap();

    let path = std::env::temp_dir().join("bf_project_roundtrip_fixture.json");
    save_json(&path, &project).unwrap();
    let loaded = load_json(&path).unwrap();

    assert_eq!(project, loaded);
}

#[test]
fn fixture_fills_defaults() {
    let project = from_yaml_str(TWO_ASSEMBLY).unwrap();

    assert_eq!(project.core.assemblies.len(), 2);
    assert_eq!(project.core.gap_model, GapModelDef::NoFlow);
    assert_eq!(project.solver.network.max_iterations, 40);
    assert_eq!(project.solver.network.relaxation, 1.0);
    assert_eq!(project.solver.axial.max_step_m, 0.01);
    assert_eq!(project.power.scaling_factor, 1.0);

    let driver = &project.assembly_types[0];
    assert_eq!(driver.clad_material, "ht9");
    assert!(driver.regions.is_empty());
    assert!(matches!(
        driver.spacer_grids[0].loss,
        GridLossDef::Constant { k } if k == 0.4
    ));
    let fuel = driver.fuel.as_ref().unwrap();
    assert_eq!(fuel.annulus_fraction, 0.0);
}

#[test]
fn unknown_assembly_type_is_rejected() {
    let mut project = minimal();
    project.core.assemblies[0].assembly_type = "blanket".to_string();

    let err = validate_project(&project).unwrap_err();
    assert!(matches!(err, ValidationError::MissingReference { id, .. } if id == "blanket"));
}

#[test]
fn off_lattice_position_is_rejected() {
    let mut project = minimal();
    project.core.assemblies[0].ring = 2;
    project.core.assemblies[0].position = 7;

    let err = validate_project(&project).unwrap_err();
    assert!(matches!(err, ValidationError::InvalidValue { .. }));
}

#[test]
fn group_member_must_exist() {
    let mut project = minimal();
    project.groups.push(GroupDef {
        name: "g".to_string(),
        constraint: ConstraintDef::FlowRate { kg_per_s: 2.0 },
        members: vec!["a2".to_string()],
    });

    let err = validate_project(&project).unwrap_err();
    assert!(matches!(err, ValidationError::MissingReference { id, .. } if id == "a2"));
}

#[test]
fn newer_version_is_rejected_on_load() {
    let text = TWO_ASSEMBLY.replacen("version: 1", "version: 7", 1);
    let err = from_yaml_str(&text).unwrap_err();
    assert!(matches!(
        err,
        ProjectError::Validation(ValidationError::UnsupportedVersion { version: 7 })
    ));
}

//! End-to-end runs of the two-assembly fixture project.

use std::path::PathBuf;

use bf_app::{
    AppError, RunMode, RunRequest, RunStage, list_assemblies, load_project, run_project,
    run_with_progress,
};

fn fixture() -> PathBuf {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.pop();
    path.push("bf-project");
    path.push("tests");
    path.push("data");
    path.push("two_assembly.yaml");
    path
}

#[test]
fn fixture_lists_assemblies() {
    let project = load_project(&fixture()).expect("fixture should load");
    let assemblies = list_assemblies(&project);
    assert_eq!(assemblies.len(), 2);
    assert!(assemblies.iter().all(|a| a.n_pins == 61));
}

#[test]
fn solve_reports_stages_and_balances_energy() {
    let path = fixture();
    let request = RunRequest {
        project_path: &path,
        mode: RunMode::Solve,
    };
    let mut stages = Vec::new();
    let response = run_with_progress(&request, Some(&mut |e| stages.push(e.stage)))
        .expect("solve should succeed");

    assert!(stages.contains(&RunStage::LoadingProject));
    assert!(stages.contains(&RunStage::CompilingCore));
    assert!(stages.contains(&RunStage::Solving));
    assert_eq!(stages.last(), Some(&RunStage::Completed));

    let summary = &response.summary;
    assert_eq!(summary.status, "converged");
    assert_eq!(summary.assemblies.len(), 2);
    assert!((summary.deposited_power_w - 6.0e5).abs() < 1.0);
    assert!(summary.energy_error.abs() < 1e-6);
    for a in &summary.assemblies {
        assert!(a.outlet_temperature_k > 623.0);
        assert!(a.peak_coolant_k >= a.outlet_temperature_k - 1e-9);
        assert!(a.peak_fuel_centerline_k.unwrap() > a.peak_clad_midwall_k.unwrap());
    }
    assert!(response.timing.total_time_s >= response.timing.solve_time_s);
}

#[test]
fn summary_serializes_to_json() {
    let project = load_project(&fixture()).unwrap();
    let response = run_project(&project, RunMode::Solve).unwrap();

    let json = response.summary.to_json().unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["mode"], "solve");
    assert_eq!(value["assemblies"].as_array().unwrap().len(), 2);
    assert!(value.get("groups").is_none());

    let text = response.summary.to_text();
    assert!(text.contains("center"));
    assert!(text.contains("east"));
}

#[test]
fn orificing_respects_group_limit() {
    let project = load_project(&fixture()).unwrap();
    let response = run_project(&project, RunMode::Orifice).unwrap();
    let summary = &response.summary;

    assert_eq!(summary.groups.len(), 1);
    assert_eq!(summary.groups[0].name, "inner");
    if summary.warnings.is_empty() {
        for a in &summary.assemblies {
            assert!(a.peak_coolant_k <= 760.0 + 1.0);
            assert!((a.flow_rate_kg_per_s - summary.groups[0].flow_rate_kg_per_s).abs() < 1e-12);
        }
    }
}

#[test]
fn overlapping_pin_descriptions_are_rejected() {
    let mut project = load_project(&fixture()).unwrap();
    project.assembly_types[0].pin_zones = Some(vec![bf_project::ZoneDef {
        material: "ss316".to_string(),
        outer_fraction: 1.0,
    }]);
    let err = run_project(&project, RunMode::Solve).unwrap_err();
    assert!(matches!(err, AppError::Compile(_)));
}

#[test]
fn missing_file_is_reported() {
    let err = load_project(std::path::Path::new("/nonexistent/core.yaml")).unwrap_err();
    assert!(matches!(err, AppError::ProjectFileRead { .. }));
}

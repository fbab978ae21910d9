//! End-to-end solver scenarios on small cores.

use approx::assert_relative_eq;
use bf_correlations::{CorrelationNames, SpacerGridLoss};
use bf_geometry::{AssemblyGeometry, AxialRegion, GeometryBuilder, PinBundle};
use bf_materials::MaterialLibrary;
use bf_power::{AssemblyPower, PowerField};
use bf_solver::{
    Assembly, AxialOptions, Core, CoreBuilder, FlowAssignment, GapModel, GroupConstraint,
    HotspotFactors, LimitQuantity, NetworkOptions, NetworkSolver, NetworkState,
    OptimizerWarning, OrificingOptions, SolverError, optimize, ring_position, solve_core,
};
use proptest::prelude::*;

const PINS: usize = 61;

fn geometry(name: &str, length: f64) -> AssemblyGeometry {
    builder(name, length).build().unwrap()
}

fn builder(name: &str, length: f64) -> GeometryBuilder {
    GeometryBuilder::new(name)
        .bundle(PinBundle {
            rings: 5,
            pin_pitch: 0.00726,
            pin_diameter: 0.0063,
            clad_thickness: 0.0005,
            wire_pitch: 0.2032,
            wire_diameter: 0.00094,
        })
        .duct_ftf([0.0585, 0.0625])
        .length(length)
}

fn assembly(name: &str, ring: u32, position: u32, length: f64) -> Assembly {
    Assembly::builder(name, ring_position(ring, position).unwrap(), geometry(name, length))
        .build(&MaterialLibrary::new())
        .unwrap()
}

/// Uniform power `watts` spread over every pin and the full length.
fn uniform(watts: f64, length: f64) -> AssemblyPower {
    let q = watts / (PINS as f64 * length);
    AssemblyPower::new(vec![0.0, length], PINS, vec![q; PINS], vec![0.0], vec![0.0], 1.0).unwrap()
}

fn single(t_in: f64, flow: f64, watts: f64, length: f64) -> (Core, PowerField) {
    let power = PowerField::new(vec![uniform(watts, length)]);
    let core = CoreBuilder::new(t_in, 0.065)
        .assembly(assembly("a", 1, 1, length), FlowAssignment::Rate(flow))
        .build(&power)
        .unwrap();
    (core, power)
}

fn outlet(flow: f64) -> f64 {
    let (core, power) = single(623.0, flow, 5.0e5, 1.0);
    let result = solve_core(&core, &power, &NetworkOptions::default()).unwrap();
    result.assemblies[0].outlet_temperature()
}

#[test]
fn unheated_assembly_keeps_inlet_temperature() {
    let (core, power) = single(350.0, 10.0, 0.0, 1.0);
    let result = solve_core(&core, &power, &NetworkOptions::default()).unwrap();
    let a = &result.assemblies[0];
    assert_relative_eq!(a.outlet_temperature(), 350.0, epsilon = 1e-9);
    assert_relative_eq!(a.peak_coolant(), 350.0, epsilon = 1e-9);
    assert!(a.pressure_drop > 0.0);
    assert_eq!(result.state, NetworkState::Converged { iterations: 1 });
}

#[test]
fn outlet_falls_as_flow_rises() {
    let temps: Vec<f64> = [3.0, 5.0, 8.0].into_iter().map(outlet).collect();
    assert!(temps[0] > temps[1] && temps[1] > temps[2], "{temps:?}");
    assert!(temps[2] > 623.0);
}

#[test]
fn deposited_power_is_absorbed() {
    let (core, power) = single(623.0, 4.0, 5.0e5, 1.0);
    let result = solve_core(&core, &power, &NetworkOptions::default()).unwrap();
    let a = &result.assemblies[0];
    assert_relative_eq!(a.energy.deposited, power.total_power(), max_relative = 1e-9);
    assert_relative_eq!(a.energy.absorbed, power.total_power(), max_relative = 1e-9);
    assert!(a.energy.relative_error().abs() < 1e-9);
    // sodium cp ≈ 1.28 kJ/kg-K at these temperatures
    let rise = a.outlet_temperature() - 623.0;
    assert!(rise > 90.0 && rise < 105.0, "rise = {rise}");
}

#[test]
fn pressure_drop_grows_with_length() {
    let drops: Vec<f64> = [0.5, 1.0, 1.5]
        .into_iter()
        .map(|length| {
            let (core, power) = single(623.0, 5.0, 0.0, length);
            solve_core(&core, &power, &NetworkOptions::default())
                .unwrap()
                .assemblies[0]
                .pressure_drop
        })
        .collect();
    assert!(drops[0] < drops[1] && drops[1] < drops[2], "{drops:?}");
}

#[test]
fn unity_hotspot_factors_reproduce_nominal_peak() {
    let power = PowerField::new(vec![uniform(5.0e5, 1.0)]);
    let asm = Assembly::builder("a", ring_position(1, 1).unwrap(), geometry("a", 1.0))
        .hotspot(HotspotFactors::default())
        .build(&MaterialLibrary::new())
        .unwrap();
    let core = CoreBuilder::new(623.0, 0.065)
        .assembly(asm, FlowAssignment::Rate(4.0))
        .build(&power)
        .unwrap();
    let result = solve_core(&core, &power, &NetworkOptions::default()).unwrap();
    let a = &result.assemblies[0];
    let nominal = a.peak_clad_midwall().unwrap();
    let hot = a.hotspot.unwrap().clad_midwall;
    assert_relative_eq!(hot, nominal, max_relative = 1e-9);
    assert!(nominal > a.peak_coolant());
}

#[test]
fn hot_neighbor_heats_cold_neighbor() {
    let power = PowerField::new(vec![uniform(5.0e5, 1.0), uniform(0.0, 1.0)]);
    let core = CoreBuilder::new(623.0, 0.065)
        .gap_model(GapModel::NoFlow)
        .assembly(assembly("hot", 1, 1, 1.0), FlowAssignment::Rate(3.0))
        .assembly(assembly("cold", 2, 1, 1.0), FlowAssignment::Rate(3.0))
        .build(&power)
        .unwrap();
    let result = solve_core(&core, &power, &NetworkOptions::default()).unwrap();
    assert!(matches!(result.state, NetworkState::Converged { .. }));
    assert!(result.history.len() > 1);

    let cold = result.assembly("cold").unwrap();
    assert!(cold.outlet_temperature() > 623.5);
    let first = result.history.first().unwrap().max_duct_difference;
    let last = result.history.last().unwrap().max_duct_difference;
    assert!(last < first, "first {first}, last {last}");
}

#[test]
fn two_assembly_group_meets_limit() {
    let power = PowerField::new(vec![uniform(3.0e5, 1.0), uniform(3.0e5, 1.0)]);
    let core = CoreBuilder::new(350.0, 0.065)
        .assembly(assembly("a", 1, 1, 1.0), FlowAssignment::Rate(5.0))
        .assembly(assembly("b", 2, 1, 1.0), FlowAssignment::Rate(5.0))
        .group(
            "drivers",
            GroupConstraint::TemperatureLimit {
                quantity: LimitQuantity::PeakCoolant,
                limit: 500.0,
            },
            ["a", "b"],
        )
        .build(&power)
        .unwrap();
    let opts = OrificingOptions::default();
    let out = optimize(&core, &power, &opts, &NetworkOptions::default()).unwrap();

    assert!(out.warnings.is_empty(), "{:?}", out.warnings);
    let peak = out
        .result
        .limiting_value(&[0, 1], LimitQuantity::PeakCoolant)
        .unwrap();
    assert!(peak <= 500.0 && peak >= 500.0 - opts.tolerance, "peak = {peak}");
    let (name, flow) = &out.group_flows[0];
    assert_eq!(name, "drivers");
    assert!(*flow > 0.5 && *flow < 5.0, "flow = {flow}");
    assert!(out.trials.iter().any(|t| t.accepted));
}

/// Sodium density at `t` [kg/m³].
fn sodium_density(t: f64) -> f64 {
    MaterialLibrary::new()
        .resolve("sodium")
        .unwrap()
        .properties(bf_core::units::k(t))
        .unwrap()
        .properties
        .density
        .value
}

fn solve_single(asm: Assembly, flow: f64, watts: f64) -> bf_solver::CoreResult {
    let power = PowerField::new(vec![uniform(watts, 1.0)]);
    let core = CoreBuilder::new(623.0, 0.065)
        .assembly(asm, FlowAssignment::Rate(flow))
        .build(&power)
        .unwrap();
    solve_core(&core, &power, &NetworkOptions::default()).unwrap()
}

/// Two heated neighbors with very different flows.
fn mismatched_pair() -> (Core, PowerField) {
    let power = PowerField::new(vec![uniform(3.0e5, 1.0), uniform(3.0e5, 1.0)]);
    let core = CoreBuilder::new(623.0, 0.065)
        .gap_model(GapModel::NoFlow)
        .assembly(assembly("a", 1, 1, 1.0), FlowAssignment::Rate(1.0))
        .assembly(assembly("b", 2, 1, 1.0), FlowAssignment::Rate(20.0))
        .build(&power)
        .unwrap();
    (core, power)
}

#[test]
fn mismatched_neighbors_converge() {
    let (core, power) = mismatched_pair();
    let result = solve_core(&core, &power, &NetworkOptions::default()).unwrap();
    assert!(matches!(result.state, NetworkState::Converged { .. }), "{:?}", result.state);
    assert!(result.energy.relative_error().abs() < 1e-6);
    // heat leaving the hot assembly arrives in the cold one
    let exchanged = result.assembly("a").unwrap().energy.to_gap;
    assert!(exchanged > 0.0);
    assert!(result.energy.to_gap.abs() < 1e-2 * exchanged, "{:?}", result.energy);

    let plain = NetworkOptions {
        accelerate: false,
        max_iterations: 1000,
        ..Default::default()
    };
    let slow = solve_core(&core, &power, &plain).unwrap();
    assert!(result.history.len() < slow.history.len());
    let fast = result.assembly("a").unwrap().outlet_temperature();
    let reference = slow.assembly("a").unwrap().outlet_temperature();
    assert!((fast - reference).abs() < 0.1, "{fast} vs {reference}");
}

#[test]
fn mismatched_neighbors_orifice_to_their_limits() {
    let power = PowerField::new(vec![uniform(3.0e5, 1.0), uniform(3.0e5, 1.0)]);
    let limit = |limit| GroupConstraint::TemperatureLimit {
        quantity: LimitQuantity::PeakCoolant,
        limit,
    };
    let core = CoreBuilder::new(623.0, 0.065)
        .gap_model(GapModel::NoFlow)
        .assembly(assembly("a", 1, 1, 1.0), FlowAssignment::Rate(1.0))
        .assembly(assembly("b", 2, 1, 1.0), FlowAssignment::Rate(20.0))
        .group("cool", limit(700.0), ["a"])
        .group("warm", limit(900.0), ["b"])
        .build(&power)
        .unwrap();
    let out = optimize(&core, &power, &OrificingOptions::default(), &NetworkOptions::default())
        .unwrap();
    assert!(matches!(out.result.state, NetworkState::Converged { .. }));
    assert!(out.trials.iter().all(|t| !t.diverged));
    let cool = out.result.assembly("a").unwrap().peak_coolant();
    let warm = out.result.assembly("b").unwrap().peak_coolant();
    assert!(cool <= 700.0 && warm <= 900.0, "{cool}, {warm}");
    assert!(out.group_flows[0].1 > out.group_flows[1].1);
}

#[test]
fn iteration_cap_reports_divergence() {
    let (core, power) = mismatched_pair();
    let opts = NetworkOptions {
        max_iterations: 1,
        ..Default::default()
    };
    let mut solver = NetworkSolver::new(&core, &power, &opts).unwrap();
    assert!(matches!(
        solver.iterate().unwrap(),
        NetworkState::Diverged { iterations: 1, .. }
    ));
    assert!(matches!(
        solve_core(&core, &power, &opts),
        Err(SolverError::CoreConvergenceFailure { iterations: 1, .. })
    ));
}

#[test]
fn unresolvable_step_is_divergence() {
    let (core, power) = single(623.0, 4.0, 5.0e5, 1.0);
    let opts = NetworkOptions {
        axial: AxialOptions {
            max_temperature_rise: 1e-6,
            max_refinements: 0,
            ..Default::default()
        },
        ..Default::default()
    };
    match solve_core(&core, &power, &opts) {
        Err(SolverError::AxialStepDivergence { assembly, z, .. }) => {
            assert_eq!(assembly, "a");
            assert!((0.0..1.0).contains(&z));
        }
        other => panic!("expected a divergent march, got {other:?}"),
    }
}

#[test]
fn trial_cap_keeps_best_feasible_flow() {
    let power = PowerField::new(vec![uniform(5.0e5, 1.0)]);
    let core = CoreBuilder::new(623.0, 0.065)
        .assembly(assembly("a", 1, 1, 1.0), FlowAssignment::Rate(4.0))
        .group(
            "a",
            GroupConstraint::TemperatureLimit {
                quantity: LimitQuantity::PeakCoolant,
                limit: 750.0,
            },
            ["a"],
        )
        .build(&power)
        .unwrap();
    let opts = OrificingOptions {
        tolerance: 0.01,
        max_trials: 2,
        passes: 1,
        ..Default::default()
    };
    let out = optimize(&core, &power, &opts, &NetworkOptions::default()).unwrap();
    assert_eq!(out.warnings.len(), 1);
    let OptimizerWarning::ToleranceNotMet {
        group,
        flow_rate,
        temperature,
        limit,
        trials,
    } = &out.warnings[0];
    assert_eq!(group, "a");
    assert_eq!(*trials, 2);
    assert!(*temperature <= *limit);
    assert_eq!(*flow_rate, out.group_flows[0].1);
    assert!(out.trials.iter().any(|t| t.flow == *flow_rate));
    assert!(out.result.assemblies[0].peak_coolant() <= 750.0);
}

#[test]
fn flowing_gap_carries_duct_heat() {
    let power = PowerField::new(vec![uniform(5.0e5, 1.0), uniform(0.0, 1.0)]);
    let core = CoreBuilder::new(623.0, 0.065)
        .gap_model(GapModel::Flow)
        .bypass_fraction(0.1)
        .assembly(assembly("hot", 1, 1, 1.0), FlowAssignment::Rate(4.0))
        .assembly(assembly("cold", 2, 1, 1.0), FlowAssignment::Rate(4.0))
        .build(&power)
        .unwrap();
    let result = solve_core(&core, &power, &NetworkOptions::default()).unwrap();
    assert!(matches!(result.state, NetworkState::Converged { .. }));

    let bypass = result.bypass.unwrap();
    assert_relative_eq!(bypass.flow, 0.1 * 8.0 / 0.9, max_relative = 1e-12);
    assert!(bypass.outlet_temperature > 623.0);

    let leaving: f64 = result.assemblies.iter().map(|a| a.energy.to_gap).sum();
    let picked_up = leaving - result.energy.to_gap;
    assert!(leaving > 0.0);
    assert_relative_eq!(picked_up, leaving, max_relative = 0.05);
    assert!(result.mixed_outlet_temperature() > 623.0);
}

#[test]
fn spacer_grid_adds_its_loss() {
    let flow = 5.0;
    let k = 0.4;
    let geometry = builder("a", 1.0)
        .spacer_grid(0.5, SpacerGridLoss::Constant { k })
        .build()
        .unwrap();
    let g = flow / geometry.flow_area(0);
    let asm = Assembly::builder("a", ring_position(1, 1).unwrap(), geometry)
        .build(&MaterialLibrary::new())
        .unwrap();
    let gridded = solve_single(asm, flow, 0.0);
    let bare = solve_single(assembly("a", 1, 1, 1.0), flow, 0.0);

    let rho = sodium_density(623.0);
    let grids: f64 = gridded.assemblies[0].regions.iter().map(|r| r.grids).sum();
    assert_relative_eq!(grids, k * g * g / (2.0 * rho), max_relative = 1e-9);
    assert_relative_eq!(
        gridded.assemblies[0].pressure_drop - bare.assemblies[0].pressure_drop,
        grids,
        max_relative = 1e-9
    );
}

#[test]
fn gravity_adds_hydrostatic_head() {
    let asm = Assembly::builder("a", ring_position(1, 1).unwrap(), geometry("a", 1.0))
        .correlations(CorrelationNames {
            gravity: Some("ON".into()),
            ..Default::default()
        })
        .build(&MaterialLibrary::new())
        .unwrap();
    let lifted = solve_single(asm, 5.0, 0.0);
    let flat = solve_single(assembly("a", 1, 1, 1.0), 5.0, 0.0);

    let head = sodium_density(623.0) * 9.806_65 * 1.0;
    let gravity: f64 = lifted.assemblies[0].regions.iter().map(|r| r.gravity).sum();
    assert_relative_eq!(gravity, head, max_relative = 1e-9);
    assert_relative_eq!(
        lifted.assemblies[0].pressure_drop - flat.assemblies[0].pressure_drop,
        head,
        max_relative = 1e-9
    );
}

#[test]
fn lumped_region_mixes_the_coolant() {
    let geometry = builder("a", 1.0)
        .region(AxialRegion::lumped("lower", 0.0, 0.3, 0.4))
        .region(AxialRegion::rodded("fuel", 0.3, 1.0))
        .build()
        .unwrap();
    let asm = Assembly::builder("a", ring_position(1, 1).unwrap(), geometry)
        .build(&MaterialLibrary::new())
        .unwrap();
    let result = solve_single(asm, 4.0, 3.0e5);
    let a = &result.assemblies[0];

    assert_eq!(a.regions.len(), 2);
    assert_eq!(a.regions[0].name, "lower");
    assert!(a.regions[0].friction > 0.0);
    assert!(a.outlet_temperature() > 623.0);
    assert!(a.energy.relative_error().abs() < 1e-6);

    let top = a.z.iter().position(|z| (z - 0.3).abs() < 1e-9).unwrap();
    for t in &a.coolant[top] {
        assert_relative_eq!(*t, a.bulk[top], epsilon = 1e-9);
    }
    assert!(a.peak_clad_mid[top - 1].is_none());
    assert!(a.peak_clad_mid.last().unwrap().is_some());
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(6))]

    #[test]
    fn outlet_monotone_in_flow(low in 2.0f64..6.0, extra in 0.5f64..4.0) {
        prop_assert!(outlet(low) > outlet(low + extra));
    }
}

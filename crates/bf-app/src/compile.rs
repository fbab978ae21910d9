//! Compilation of a `Project` into solver inputs.
//!
//! Order matters: materials first (assemblies resolve names against the
//! library), then per-assembly geometry, then the power field (the core
//! builder checks it against the assemblies), then the core itself.

use std::collections::HashMap;
use std::f64::consts::PI;

use bf_correlations::{CorrelationNames, SpacerGridLoss};
use bf_geometry::{
    AssemblyGeometry, AxialRegion, DuctWall, FuelModel, GeometryBuilder, PinBundle, PinInternals,
    PinModel, RadialZone,
};
use bf_materials::{MaterialLibrary, Phase, PolynomialModel, RawProperties, TabulatedModel};
use bf_power::{
    AssemblyFlux, AssemblyLayout, DepositionSplit, HeatingCoefficients, MaterialHeating,
    PowerField, PowerMapper, PowerRow, PowerTable, StaticFlux,
};
use bf_project::schema::{
    AssemblyTypeDef, ConstraintDef, FlowDef, GapModelDef, GridLossDef, HeatingDef,
    HotspotTermsDef, LimitQuantityDef, MaterialModelDef, PhaseDef, PowerDef, Project,
    RegionKindDef, SolverDef,
};
use bf_solver::{
    Assembly, AxialOptions, Core, CoreBuilder, FlowAssignment, GapModel, GroupConstraint,
    HotspotFactors, HotspotTerms, LimitQuantity, NetworkOptions, OrificingOptions,
    StatisticalFactor, ring_position,
};
use tracing::{debug, info};

use crate::error::{AppError, AppResult};

/// Everything a run needs, built from one project.
#[derive(Debug, Clone)]
pub struct CompiledCore {
    pub core: Core,
    pub power: PowerField,
    pub network: NetworkOptions,
    pub orificing: OrificingOptions,
}

pub fn compile_project(project: &Project) -> AppResult<CompiledCore> {
    bf_project::validate_project(project)?;

    let library = build_library(project)?;
    let types: HashMap<&str, &AssemblyTypeDef> = project
        .assembly_types
        .iter()
        .map(|t| (t.name.as_str(), t))
        .collect();

    let mut assemblies = Vec::with_capacity(project.core.assemblies.len());
    let mut layouts = Vec::with_capacity(project.core.assemblies.len());
    for def in &project.core.assemblies {
        let ty = types.get(def.assembly_type.as_str()).ok_or_else(|| {
            AppError::Compile(format!("unknown assembly type {}", def.assembly_type))
        })?;
        let position = ring_position(def.ring, def.position).ok_or_else(|| {
            AppError::Compile(format!(
                "assembly {}: ring {} position {} is off the lattice",
                def.name, def.ring, def.position
            ))
        })?;
        let geometry = build_geometry(&def.name, ty)?;
        layouts.push(layout(&geometry));

        let mut builder = Assembly::builder(def.name.clone(), position, geometry)
            .coolant(ty.coolant.clone())
            .duct(ty.duct_material.clone())
            .clad(ty.clad_material.clone())
            .correlations(CorrelationNames {
                friction: ty.correlations.friction.clone(),
                flow_split: ty.correlations.flow_split.clone(),
                mixing: ty.correlations.mixing.clone(),
                nusselt: ty.correlations.nusselt.clone(),
                duct_htc: ty.correlations.duct_htc.clone(),
                gravity: ty.correlations.gravity.clone(),
            });
        if let Some(h) = &ty.hotspot {
            builder = builder.hotspot(HotspotFactors {
                direct: terms(&h.direct),
                statistical: h
                    .statistical
                    .iter()
                    .map(|s| StatisticalFactor {
                        name: s.name.clone(),
                        factors: terms(&s.factors),
                    })
                    .collect(),
                sigma_in: h.sigma_in,
                sigma_out: h.sigma_out,
            });
        }
        let flow = match def.flow {
            FlowDef::Rate { kg_per_s } => FlowAssignment::Rate(kg_per_s),
            FlowDef::OutletTemperature { temperature_k } => {
                FlowAssignment::OutletTemperature(temperature_k)
            }
        };
        assemblies.push((builder.build(&library)?, flow));
    }

    let names: Vec<&str> = project.core.assemblies.iter().map(|a| a.name.as_str()).collect();
    let power = build_power(&project.power, &names, &layouts)?;
    info!(
        assemblies = names.len(),
        total_power = power.total_power(),
        "power field mapped"
    );

    let c = &project.core;
    let mut builder = CoreBuilder::new(c.inlet_temperature_k, c.assembly_pitch_m)
        .bypass_fraction(c.bypass_fraction)
        .gap_model(match c.gap_model {
            GapModelDef::None => GapModel::None,
            GapModelDef::NoFlow => GapModel::NoFlow,
            GapModelDef::Flow => GapModel::Flow,
        });
    if let Some(name) = &c.gap_coolant {
        builder = builder.gap_coolant(library.resolve(name)?);
    }
    for (assembly, flow) in assemblies {
        builder = builder.assembly(assembly, flow);
    }
    for group in &project.groups {
        let constraint = match group.constraint {
            ConstraintDef::FlowRate { kg_per_s } => GroupConstraint::FlowRate(kg_per_s),
            ConstraintDef::TemperatureLimit { quantity, limit_k } => {
                GroupConstraint::TemperatureLimit {
                    quantity: limit_quantity(quantity),
                    limit: limit_k,
                }
            }
        };
        builder = builder.group(group.name.clone(), constraint, group.members.iter().cloned());
    }
    let core = builder.build(&power)?;

    let (network, orificing) = solver_options(&project.solver);
    Ok(CompiledCore {
        core,
        power,
        network,
        orificing,
    })
}

/// Built-in materials plus the project's own definitions.
pub fn build_library(project: &Project) -> AppResult<MaterialLibrary> {
    let mut library = MaterialLibrary::new();
    for def in &project.materials {
        match &def.model {
            MaterialModelDef::Polynomial {
                density,
                heat_capacity,
                conductivity,
                viscosity,
                range_k,
            } => {
                library.register_polynomial(
                    &def.name,
                    PolynomialModel {
                        density: density.clone(),
                        heat_capacity: heat_capacity.clone(),
                        conductivity: conductivity.clone(),
                        viscosity: viscosity.clone(),
                        range: *range_k,
                    },
                )?;
            }
            MaterialModelDef::Table { phase, rows } => {
                let temperatures = rows.iter().map(|r| r.temperature_k).collect();
                let properties = rows
                    .iter()
                    .map(|r| RawProperties {
                        rho: r.density,
                        cp: r.heat_capacity,
                        k: r.conductivity,
                        mu: r.viscosity,
                    })
                    .collect();
                let phase = match phase {
                    PhaseDef::Liquid => Phase::Liquid,
                    PhaseDef::Solid => Phase::Solid,
                };
                let model = TabulatedModel::new(&def.name, temperatures, properties, phase)?;
                library.register_table(&def.name, model)?;
            }
        }
        debug!(material = %def.name, "registered user material");
    }
    Ok(library)
}

pub fn build_geometry(name: &str, ty: &AssemblyTypeDef) -> AppResult<AssemblyGeometry> {
    let mut builder = GeometryBuilder::new(name)
        .bundle(PinBundle {
            rings: ty.pin_rings,
            pin_pitch: ty.pin_pitch_m,
            pin_diameter: ty.pin_diameter_m,
            clad_thickness: ty.clad_thickness_m,
            wire_pitch: ty.wire_pitch_m,
            wire_diameter: ty.wire_diameter_m,
        })
        .duct_ftf(ty.duct_ftf_m.iter().copied())
        .length(ty.length_m);

    for r in &ty.regions {
        let region = match r.kind {
            RegionKindDef::Rodded => AxialRegion::rodded(r.name.clone(), r.z_lo_m, r.z_hi_m),
            RegionKindDef::Lumped {
                coolant_fraction,
                hydraulic_diameter_m,
            } => AxialRegion {
                hydraulic_diameter: hydraulic_diameter_m,
                ..AxialRegion::lumped(r.name.clone(), r.z_lo_m, r.z_hi_m, coolant_fraction)
            },
        };
        builder = builder.region(region);
    }
    for g in &ty.spacer_grids {
        let loss = match g.loss {
            GridLossDef::Rehme { solidity } => SpacerGridLoss::Rehme { solidity },
            GridLossDef::Constant { k } => SpacerGridLoss::Constant { k },
        };
        builder = builder.spacer_grid(g.z_m, loss);
    }
    if let Some(f) = &ty.fuel {
        builder = builder.fuel_model(FuelModel {
            fuel_material: f.fuel_material.clone(),
            bond_material: f.bond_material.clone(),
            gap_thickness: f.gap_thickness_m,
            porosity: f.porosity,
            annulus_fraction: f.annulus_fraction,
        });
    }
    if let Some(zones) = &ty.pin_zones {
        builder = builder.pin_model(PinModel {
            zones: zones
                .iter()
                .map(|z| RadialZone {
                    material: z.material.clone(),
                    outer_fraction: z.outer_fraction,
                })
                .collect(),
        });
    }
    Ok(builder.build()?)
}

/// Cross-sections the power mapper distributes flux heating over.
pub fn layout(geometry: &AssemblyGeometry) -> AssemblyLayout {
    let bundle = geometry.bundle();
    let n = geometry.n_pins() as f64;
    let r_in = bundle.clad_inner_radius();
    let r_out = bundle.clad_outer_radius();
    let fuel_area = match geometry.pin_internals() {
        Some(PinInternals::Fuel(f)) => {
            let r_f = (r_in - f.gap_thickness).max(0.0);
            PI * r_f * r_f * (1.0 - f.annulus_fraction * f.annulus_fraction)
        }
        Some(PinInternals::Zones(_)) => PI * r_in * r_in,
        None => 0.0,
    };
    let duct_area = geometry
        .duct()
        .iter()
        .map(|w| DuctWall::hex_area(w.outer_ftf) - DuctWall::hex_area(w.inner_ftf))
        .sum();
    AssemblyLayout {
        n_pins: geometry.n_pins(),
        length: geometry.length(),
        fuel_area: n * fuel_area,
        clad_area: n * (PI * (r_out * r_out - r_in * r_in) + bundle.wire_area()),
        duct_area,
        coolant_area: geometry.duct_interior_area() - n * (bundle.pin_area() + bundle.wire_area()),
    }
}

pub fn build_power(
    def: &PowerDef,
    names: &[&str],
    layouts: &[AssemblyLayout],
) -> AppResult<PowerField> {
    let index_of = |name: &str| {
        names
            .iter()
            .position(|n| *n == name)
            .ok_or_else(|| AppError::Compile(format!("power data for unknown assembly {}", name)))
    };

    let table = match &def.table {
        Some(t) => Some(PowerTable {
            z_edges: t.z_edges_m.clone(),
            rows: t
                .rows
                .iter()
                .map(|r| {
                    Ok(PowerRow {
                        assembly: index_of(&r.assembly)?,
                        pin: r.pin,
                        axial: r.axial,
                        linear_power: r.linear_power_w_per_m,
                    })
                })
                .collect::<AppResult<Vec<_>>>()?,
            split: DepositionSplit {
                fuel: t.deposition.fuel,
                clad: t.deposition.clad,
                coolant: t.deposition.coolant,
                duct: t.deposition.duct,
            },
        }),
        None => None,
    };

    let flux = match &def.flux {
        Some(f) => {
            let mut assemblies = vec![None; names.len()];
            for entry in &f.assemblies {
                assemblies[index_of(&entry.assembly)?] = Some(AssemblyFlux {
                    z_edges: entry.z_edges_m.clone(),
                    neutron: entry.neutron.clone(),
                    gamma: entry.gamma.clone(),
                    pin_weights: entry.pin_weights.clone(),
                });
            }
            let coefficients = HeatingCoefficients {
                fuel: heating(&f.fuel_heating),
                structure: heating(&f.structure_heating),
                coolant: heating(&f.coolant_heating),
            };
            Some((StaticFlux { assemblies }, coefficients))
        }
        None => None,
    };

    let mut mapper = PowerMapper::new(layouts).scaling_factor(def.scaling_factor);
    if let Some(t) = &table {
        mapper = mapper.table(t);
    }
    if let Some((source, coefficients)) = &flux {
        mapper = mapper.flux(source, *coefficients);
    }
    if let Some(total) = def.total_power_w {
        mapper = mapper.total_power(total);
    }
    Ok(mapper.build()?)
}

pub fn solver_options(def: &SolverDef) -> (NetworkOptions, OrificingOptions) {
    let axial = AxialOptions {
        max_step: def.axial.max_step_m,
        mesh_size: def.axial.mesh_size_m,
        planes: def.axial.planes_m.clone(),
        stability_safety: def.axial.stability_safety,
        max_temperature_rise: def.axial.max_temperature_rise_k,
        max_refinements: def.axial.max_refinements,
        ..AxialOptions::default()
    };
    let network = NetworkOptions {
        max_iterations: def.network.max_iterations,
        tolerance: def.network.tolerance_k,
        relaxation: def.network.relaxation,
        accelerate: def.network.accelerate,
        axial,
    };
    let o = &def.orificing;
    let orificing = OrificingOptions {
        tolerance: o.tolerance_k,
        max_trials: o.max_trials,
        passes: o.passes,
        min_flow: o.min_flow_kg_per_s,
        max_flow: o.max_flow_kg_per_s,
        bracket_factor: o.bracket_factor,
    };
    (network, orificing)
}

fn terms(def: &HotspotTermsDef) -> HotspotTerms {
    HotspotTerms {
        coolant: def.coolant,
        film: def.film,
        clad: def.clad,
        gap: def.gap,
        fuel: def.fuel,
    }
}

fn heating(def: &HeatingDef) -> MaterialHeating {
    MaterialHeating {
        neutron: def.neutron,
        gamma: def.gamma,
    }
}

fn limit_quantity(q: LimitQuantityDef) -> LimitQuantity {
    match q {
        LimitQuantityDef::PeakCoolant => LimitQuantity::PeakCoolant,
        LimitQuantityDef::OutletCoolant => LimitQuantity::OutletCoolant,
        LimitQuantityDef::PeakCladMidwall => LimitQuantity::PeakCladMidwall,
        LimitQuantityDef::PeakFuelCenterline => LimitQuantity::PeakFuelCenterline,
    }
}

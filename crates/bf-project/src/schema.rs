//! Project schema definitions.
//!
//! Lengths are in meters, temperatures in kelvin, flows in kg/s and powers
//! in watts; field suffixes say so.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Project {
    pub version: u32,
    pub name: String,
    #[serde(default)]
    pub materials: Vec<MaterialDef>,
    #[serde(default)]
    pub assembly_types: Vec<AssemblyTypeDef>,
    pub core: CoreDef,
    #[serde(default)]
    pub groups: Vec<GroupDef>,
    #[serde(default)]
    pub power: PowerDef,
    #[serde(default)]
    pub solver: SolverDef,
}

// ---------------------------------------------------------------- materials

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum PhaseDef {
    #[default]
    Liquid,
    Solid,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MaterialDef {
    pub name: String,
    pub model: MaterialModelDef,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum MaterialModelDef {
    /// `property(T) = Σ cᵢ·Tⁱ`.
    Polynomial {
        density: Vec<f64>,
        heat_capacity: Vec<f64>,
        conductivity: Vec<f64>,
        /// Empty for solids.
        #[serde(default)]
        viscosity: Vec<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        range_k: Option<(f64, f64)>,
    },
    Table {
        #[serde(default)]
        phase: PhaseDef,
        rows: Vec<TableRowDef>,
    },
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct TableRowDef {
    pub temperature_k: f64,
    pub density: f64,
    pub heat_capacity: f64,
    pub conductivity: f64,
    #[serde(default)]
    pub viscosity: f64,
}

// ----------------------------------------------------------- assembly types

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AssemblyTypeDef {
    pub name: String,
    pub pin_rings: u32,
    pub pin_pitch_m: f64,
    pub pin_diameter_m: f64,
    pub clad_thickness_m: f64,
    pub wire_pitch_m: f64,
    pub wire_diameter_m: f64,
    /// Inner and outer flat-to-flat of each duct wall, innermost first.
    pub duct_ftf_m: Vec<f64>,
    pub length_m: f64,
    #[serde(default = "default_coolant")]
    pub coolant: String,
    #[serde(default = "default_structure")]
    pub duct_material: String,
    #[serde(default = "default_structure")]
    pub clad_material: String,
    #[serde(default)]
    pub regions: Vec<RegionDef>,
    #[serde(default)]
    pub spacer_grids: Vec<SpacerGridDef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fuel: Option<FuelDef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pin_zones: Option<Vec<ZoneDef>>,
    #[serde(default)]
    pub correlations: CorrelationsDef,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hotspot: Option<HotspotDef>,
}

fn default_coolant() -> String {
    "sodium".to_string()
}

fn default_structure() -> String {
    "ht9".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RegionDef {
    pub name: String,
    pub z_lo_m: f64,
    pub z_hi_m: f64,
    #[serde(default)]
    pub kind: RegionKindDef,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
#[serde(tag = "type")]
pub enum RegionKindDef {
    #[default]
    Rodded,
    Lumped {
        coolant_fraction: f64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        hydraulic_diameter_m: Option<f64>,
    },
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct SpacerGridDef {
    pub z_m: f64,
    #[serde(default)]
    pub loss: GridLossDef,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum GridLossDef {
    Rehme {
        #[serde(default = "default_solidity")]
        solidity: f64,
    },
    Constant {
        k: f64,
    },
}

impl Default for GridLossDef {
    fn default() -> Self {
        GridLossDef::Rehme {
            solidity: default_solidity(),
        }
    }
}

fn default_solidity() -> f64 {
    0.7
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FuelDef {
    #[serde(default = "default_fuel")]
    pub fuel_material: String,
    #[serde(default = "default_coolant")]
    pub bond_material: String,
    #[serde(default)]
    pub gap_thickness_m: f64,
    #[serde(default)]
    pub porosity: f64,
    #[serde(default)]
    pub annulus_fraction: f64,
}

fn default_fuel() -> String {
    "u10zr".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ZoneDef {
    pub material: String,
    /// Outer radius as a fraction of the clad inner radius.
    pub outer_fraction: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CorrelationsDef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub friction: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flow_split: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mixing: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nusselt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duct_htc: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gravity: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct HotspotTermsDef {
    #[serde(default = "one")]
    pub coolant: f64,
    #[serde(default = "one")]
    pub film: f64,
    #[serde(default = "one")]
    pub clad: f64,
    #[serde(default = "one")]
    pub gap: f64,
    #[serde(default = "one")]
    pub fuel: f64,
}

impl Default for HotspotTermsDef {
    fn default() -> Self {
        Self {
            coolant: 1.0,
            film: 1.0,
            clad: 1.0,
            gap: 1.0,
            fuel: 1.0,
        }
    }
}

fn one() -> f64 {
    1.0
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StatisticalFactorDef {
    pub name: String,
    #[serde(default)]
    pub factors: HotspotTermsDef,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HotspotDef {
    #[serde(default)]
    pub direct: HotspotTermsDef,
    #[serde(default)]
    pub statistical: Vec<StatisticalFactorDef>,
    #[serde(default = "default_sigma_in")]
    pub sigma_in: f64,
    #[serde(default = "default_sigma_out")]
    pub sigma_out: f64,
}

fn default_sigma_in() -> f64 {
    3.0
}

fn default_sigma_out() -> f64 {
    2.0
}

// --------------------------------------------------------------------- core

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum GapModelDef {
    #[default]
    None,
    NoFlow,
    Flow,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CoreDef {
    pub inlet_temperature_k: f64,
    pub assembly_pitch_m: f64,
    #[serde(default)]
    pub bypass_fraction: f64,
    #[serde(default)]
    pub gap_model: GapModelDef,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gap_coolant: Option<String>,
    pub assemblies: Vec<AssemblyDef>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AssemblyDef {
    pub name: String,
    pub assembly_type: String,
    /// 1-based hex ring.
    pub ring: u32,
    /// 1-based position within the ring.
    pub position: u32,
    pub flow: FlowDef,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum FlowDef {
    Rate { kg_per_s: f64 },
    OutletTemperature { temperature_k: f64 },
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum LimitQuantityDef {
    PeakCoolant,
    OutletCoolant,
    PeakCladMidwall,
    PeakFuelCenterline,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum ConstraintDef {
    FlowRate {
        kg_per_s: f64,
    },
    TemperatureLimit {
        quantity: LimitQuantityDef,
        limit_k: f64,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GroupDef {
    pub name: String,
    pub constraint: ConstraintDef,
    pub members: Vec<String>,
}

// -------------------------------------------------------------------- power

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PowerDef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_power_w: Option<f64>,
    #[serde(default = "one")]
    pub scaling_factor: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table: Option<PowerTableDef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flux: Option<FluxDef>,
}

impl Default for PowerDef {
    fn default() -> Self {
        Self {
            total_power_w: None,
            scaling_factor: 1.0,
            table: None,
            flux: None,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct DepositionDef {
    #[serde(default = "one")]
    pub fuel: f64,
    #[serde(default)]
    pub clad: f64,
    #[serde(default)]
    pub coolant: f64,
    #[serde(default)]
    pub duct: f64,
}

impl Default for DepositionDef {
    fn default() -> Self {
        Self {
            fuel: 1.0,
            clad: 0.0,
            coolant: 0.0,
            duct: 0.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PowerTableDef {
    pub z_edges_m: Vec<f64>,
    #[serde(default)]
    pub deposition: DepositionDef,
    pub rows: Vec<PowerRowDef>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PowerRowDef {
    pub assembly: String,
    /// 0-based pin index.
    pub pin: usize,
    /// 0-based axial interval.
    pub axial: usize,
    pub linear_power_w_per_m: f64,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct HeatingDef {
    #[serde(default)]
    pub neutron: f64,
    #[serde(default)]
    pub gamma: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FluxDef {
    #[serde(default)]
    pub fuel_heating: HeatingDef,
    #[serde(default)]
    pub structure_heating: HeatingDef,
    #[serde(default)]
    pub coolant_heating: HeatingDef,
    pub assemblies: Vec<AssemblyFluxDef>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AssemblyFluxDef {
    pub assembly: String,
    pub z_edges_m: Vec<f64>,
    pub neutron: Vec<f64>,
    pub gamma: Vec<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pin_weights: Option<Vec<f64>>,
}

// ------------------------------------------------------------------- solver

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SolverDef {
    #[serde(default)]
    pub axial: AxialDef,
    #[serde(default)]
    pub network: NetworkDef,
    #[serde(default)]
    pub orificing: OrificingDef,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AxialDef {
    pub max_step_m: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mesh_size_m: Option<f64>,
    pub planes_m: Vec<f64>,
    pub stability_safety: f64,
    pub max_temperature_rise_k: f64,
    pub max_refinements: u32,
}

impl Default for AxialDef {
    fn default() -> Self {
        Self {
            max_step_m: 0.01,
            mesh_size_m: None,
            planes_m: Vec::new(),
            stability_safety: 0.5,
            max_temperature_rise_k: 5.0,
            max_refinements: 10,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct NetworkDef {
    pub max_iterations: usize,
    pub tolerance_k: f64,
    /// Initial relaxation factor of gap temperatures.
    pub relaxation: f64,
    /// Adapt the relaxation factor between iterations.
    pub accelerate: bool,
}

impl Default for NetworkDef {
    fn default() -> Self {
        Self {
            max_iterations: 50,
            tolerance_k: 0.01,
            relaxation: 1.0,
            accelerate: true,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct OrificingDef {
    pub tolerance_k: f64,
    pub max_trials: usize,
    pub passes: usize,
    pub min_flow_kg_per_s: f64,
    pub max_flow_kg_per_s: f64,
    pub bracket_factor: f64,
}

impl Default for OrificingDef {
    fn default() -> Self {
        Self {
            tolerance_k: 1.0,
            max_trials: 40,
            passes: 2,
            min_flow_kg_per_s: 1e-3,
            max_flow_kg_per_s: 1e3,
            bracket_factor: 2.0,
        }
    }
}

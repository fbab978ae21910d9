//! Core assembly map, flow assignment and orificing groups.

use std::collections::HashMap;
use std::sync::Arc;

use bf_core::AsmId;
use bf_core::units::k;
use bf_materials::Material;
use bf_power::{PowerError, PowerField};
use tracing::{debug, warn};

use crate::assembly::Assembly;
use crate::error::{ConfigError, ConfigResult};
use crate::layout::CoreMap;

/// Estimated outlet temperatures above this trigger a melt warning [K].
pub const MELT_WARNING_TEMPERATURE: f64 = 1500.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GapModel {
    /// Adiabatic ducts.
    #[default]
    None,
    /// Stagnant coolant conducting between facing ducts.
    NoFlow,
    /// Bypass coolant flowing through the gaps.
    Flow,
}

/// How an assembly's coolant flow is specified.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FlowAssignment {
    /// Mass flow rate [kg/s].
    Rate(f64),
    /// Mixed outlet temperature [K]; the flow follows from the energy balance.
    OutletTemperature(f64),
}

/// Quantity a temperature-limited group is searched against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LimitQuantity {
    /// Hottest subchannel anywhere in the group.
    PeakCoolant,
    /// Hottest mixed outlet temperature of the group.
    OutletCoolant,
    PeakCladMidwall,
    PeakFuelCenterline,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GroupConstraint {
    /// Every member receives this flow rate [kg/s].
    FlowRate(f64),
    TemperatureLimit { quantity: LimitQuantity, limit: f64 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrificingGroup {
    pub name: String,
    /// Member assembly indices.
    pub members: Vec<usize>,
    pub constraint: GroupConstraint,
}

/// A full core, immutable during a solve.
#[derive(Debug, Clone)]
pub struct Core {
    assemblies: Vec<Assembly>,
    map: CoreMap,
    assembly_pitch: f64,
    inlet_temperature: f64,
    bypass_fraction: f64,
    gap_model: GapModel,
    gap_coolant: Arc<Material>,
    groups: Vec<OrificingGroup>,
}

impl Core {
    pub fn assemblies(&self) -> &[Assembly] {
        &self.assemblies
    }

    pub fn len(&self) -> usize {
        self.assemblies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assemblies.is_empty()
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.assemblies.iter().position(|a| a.name() == name)
    }

    pub fn map(&self) -> &CoreMap {
        &self.map
    }

    /// Center-to-center distance of neighboring assemblies [m].
    pub fn assembly_pitch(&self) -> f64 {
        self.assembly_pitch
    }

    pub fn inlet_temperature(&self) -> f64 {
        self.inlet_temperature
    }

    pub fn bypass_fraction(&self) -> f64 {
        self.bypass_fraction
    }

    pub fn gap_model(&self) -> GapModel {
        self.gap_model
    }

    pub fn gap_coolant(&self) -> &Material {
        &self.gap_coolant
    }

    pub fn groups(&self) -> &[OrificingGroup] {
        &self.groups
    }

    /// Common axial length of every assembly [m].
    pub fn length(&self) -> f64 {
        self.assemblies
            .first()
            .map_or(0.0, |a| a.geometry().length())
    }

    /// Total assembly flow [kg/s], bypass excluded.
    pub fn assembly_flow(&self) -> f64 {
        self.assemblies.iter().map(Assembly::flow_rate).sum()
    }

    /// Bypass flow `f/(1 − f) · Σ m_asm` [kg/s].
    pub fn bypass_flow(&self) -> f64 {
        let total = self.assembly_flow() / (1.0 - self.bypass_fraction);
        self.bypass_fraction * total
    }

    /// Copy with every member of `group` set to `flow_rate`.
    pub fn with_group_flow(&self, group: usize, flow_rate: f64) -> Self {
        let mut core = self.clone();
        if let Some(g) = self.groups.get(group) {
            for &m in &g.members {
                core.assemblies[m].set_flow_rate(flow_rate);
            }
        }
        core
    }
}

/// Collects assemblies and groups, then validates them into a `Core`.
#[derive(Debug)]
pub struct CoreBuilder {
    inlet_temperature: f64,
    assembly_pitch: f64,
    bypass_fraction: f64,
    gap_model: GapModel,
    gap_coolant: Option<Arc<Material>>,
    entries: Vec<(Assembly, FlowAssignment)>,
    groups: Vec<(String, GroupConstraint, Vec<String>)>,
}

impl CoreBuilder {
    pub fn new(inlet_temperature: f64, assembly_pitch: f64) -> Self {
        Self {
            inlet_temperature,
            assembly_pitch,
            bypass_fraction: 0.0,
            gap_model: GapModel::None,
            gap_coolant: None,
            entries: Vec::new(),
            groups: Vec::new(),
        }
    }

    pub fn bypass_fraction(mut self, fraction: f64) -> Self {
        self.bypass_fraction = fraction;
        self
    }

    pub fn gap_model(mut self, model: GapModel) -> Self {
        self.gap_model = model;
        self
    }

    /// Coolant filling the gaps; defaults to the first assembly's coolant.
    pub fn gap_coolant(mut self, material: Arc<Material>) -> Self {
        self.gap_coolant = Some(material);
        self
    }

    pub fn assembly(mut self, assembly: Assembly, flow: FlowAssignment) -> Self {
        self.entries.push((assembly, flow));
        self
    }

    pub fn group(
        mut self,
        name: impl Into<String>,
        constraint: GroupConstraint,
        members: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        self.groups.push((
            name.into(),
            constraint,
            members.into_iter().map(Into::into).collect(),
        ));
        self
    }

    /// Validate and resolve flows. `power` must follow assembly order.
    pub fn build(self, power: &PowerField) -> ConfigResult<Core> {
        let invalid = |what: String| ConfigError::InvalidCore { what };
        let t_in = self.inlet_temperature;
        if !(t_in.is_finite() && t_in > 0.0) {
            return Err(invalid(format!("inlet temperature {} K", t_in)));
        }
        if !(0.0..1.0).contains(&self.bypass_fraction) {
            return Err(invalid(format!(
                "bypass fraction {} outside [0, 1)",
                self.bypass_fraction
            )));
        }
        if self.entries.is_empty() {
            return Err(invalid("core has no assemblies".into()));
        }
        if self.gap_model == GapModel::Flow && self.bypass_fraction <= 0.0 {
            return Err(invalid("the flowing gap model needs a bypass fraction".into()));
        }
        if power.len() != self.entries.len() {
            return Err(PowerError::PowerIndexMismatch {
                what: format!(
                    "power field has {} assemblies, core has {}",
                    power.len(),
                    self.entries.len()
                ),
            }
            .into());
        }

        let length = self.entries[0].0.geometry().length();
        let mut names = HashMap::new();
        for (i, (a, _)) in self.entries.iter().enumerate() {
            if names.insert(a.name().to_string(), i).is_some() {
                return Err(invalid(format!("duplicate assembly name '{}'", a.name())));
            }
            if (a.geometry().length() - length).abs() > 1e-9 {
                return Err(invalid(format!(
                    "assembly '{}' is {} m long, expected {} m",
                    a.name(),
                    a.geometry().length(),
                    length
                )));
            }
            if self.gap_model != GapModel::None && a.geometry().outer_ftf() >= self.assembly_pitch {
                return Err(invalid(format!(
                    "assembly '{}' duct does not fit the {} m assembly pitch",
                    a.name(),
                    self.assembly_pitch
                )));
            }
            if let Some(p) = power.get(i)
                && p.n_pins() != a.geometry().n_pins()
            {
                return Err(PowerError::PowerIndexMismatch {
                    what: format!(
                        "assembly '{}' has {} pins, power data has {}",
                        a.name(),
                        a.geometry().n_pins(),
                        p.n_pins()
                    ),
                }
                .into());
            }
            if let Some(p) = power.get(i)
                && let (Some(&lo), Some(&hi)) = (p.z_edges().first(), p.z_edges().last())
                && (lo < -1e-9 || hi > length + 1e-9)
            {
                return Err(PowerError::PowerIndexMismatch {
                    what: format!(
                        "assembly '{}' power mesh spans [{lo}, {hi}] m outside its {length} m length",
                        a.name()
                    ),
                }
                .into());
            }
        }
        let map = CoreMap::new(self.entries.iter().map(|(a, _)| a.position()).collect())?;

        let groups = resolve_groups(&self.groups, &names, &self.entries, t_in)?;

        let mut assemblies = Vec::with_capacity(self.entries.len());
        for (i, (mut asm, flow)) in self.entries.into_iter().enumerate() {
            let q = power.get(i).map_or(0.0, |p| p.total_power());
            let fixed = groups.iter().find_map(|g| match g.constraint {
                GroupConstraint::FlowRate(m) if g.members.contains(&i) => Some(m),
                _ => None,
            });
            let rate = match fixed {
                Some(m) => FlowAssignment::Rate(m),
                None => flow,
            };
            let m = resolve_flow(&asm, rate, q, t_in)?;
            asm.set_id(AsmId::from_index(i as u32));
            asm.set_flow_rate(m);
            assemblies.push(asm);
        }

        let gap_coolant = match self.gap_coolant {
            Some(c) => c,
            None => Arc::clone(&assemblies[0].materials().coolant),
        };

        Ok(Core {
            assemblies,
            map,
            assembly_pitch: self.assembly_pitch,
            inlet_temperature: t_in,
            bypass_fraction: self.bypass_fraction,
            gap_model: self.gap_model,
            gap_coolant,
            groups,
        })
    }
}

fn resolve_groups(
    specs: &[(String, GroupConstraint, Vec<String>)],
    names: &HashMap<String, usize>,
    entries: &[(Assembly, FlowAssignment)],
    t_in: f64,
) -> ConfigResult<Vec<OrificingGroup>> {
    let mut groups = Vec::with_capacity(specs.len());
    let mut owner: HashMap<usize, usize> = HashMap::new();
    for (gi, (name, constraint, members)) in specs.iter().enumerate() {
        if specs[..gi].iter().any(|(n, _, _)| n == name) {
            return Err(ConfigError::InvalidCore {
                what: format!("duplicate group name '{}'", name),
            });
        }
        match *constraint {
            GroupConstraint::FlowRate(m) if !(m.is_finite() && m > 0.0) => {
                return Err(ConfigError::InvalidCore {
                    what: format!("group '{}' flow rate {} must be positive", name, m),
                });
            }
            GroupConstraint::TemperatureLimit { limit, .. } if !(limit.is_finite() && limit > t_in) => {
                return Err(ConfigError::InvalidCore {
                    what: format!(
                        "group '{}' limit {} K must exceed the inlet temperature {} K",
                        name, limit, t_in
                    ),
                });
            }
            _ => {}
        }
        let mut idx = Vec::with_capacity(members.len());
        for member in members {
            let &i = names.get(member).ok_or_else(|| ConfigError::InvalidCore {
                what: format!("group '{}' names unknown assembly '{}'", name, member),
            })?;
            if let GroupConstraint::TemperatureLimit {
                quantity: LimitQuantity::PeakFuelCenterline,
                ..
            } = constraint
                && !entries[i].0.has_fuel()
            {
                return Err(ConfigError::InvalidAssembly {
                    assembly: member.clone(),
                    what: format!(
                        "group '{}' limits fuel temperature but the assembly has no pin model",
                        name
                    ),
                });
            }
            if let Some(&other) = owner.get(&i)
                && specs[other].1 != *constraint
            {
                return Err(ConfigError::ConflictingGroupConstraint {
                    assembly: member.clone(),
                    first: specs[other].0.clone(),
                    second: name.clone(),
                });
            }
            owner.insert(i, gi);
            idx.push(i);
        }
        if idx.is_empty() {
            return Err(ConfigError::InvalidCore {
                what: format!("group '{}' has no members", name),
            });
        }
        groups.push(OrificingGroup {
            name: name.clone(),
            members: idx,
            constraint: *constraint,
        });
    }
    Ok(groups)
}

fn heat_capacity(asm: &Assembly, t: f64) -> ConfigResult<f64> {
    Ok(asm.materials().coolant.properties(k(t))?.properties.heat_capacity)
}

/// Flow rate for an assignment, with the outlet estimate logged.
fn resolve_flow(asm: &Assembly, flow: FlowAssignment, power: f64, t_in: f64) -> ConfigResult<f64> {
    let invalid = |what: String| ConfigError::InvalidAssembly {
        assembly: asm.name().to_string(),
        what,
    };
    let (rate, outlet) = match flow {
        FlowAssignment::Rate(m) => {
            if !(m.is_finite() && m > 0.0) {
                return Err(invalid(format!("flow rate {} must be positive", m)));
            }
            let mut t_out = t_in;
            for _ in 0..3 {
                let cp = heat_capacity(asm, 0.5 * (t_in + t_out))?;
                t_out = t_in + power / (m * cp);
            }
            (m, t_out)
        }
        FlowAssignment::OutletTemperature(t_out) => {
            if !(t_out > t_in) {
                return Err(invalid(format!(
                    "outlet temperature {} K must exceed the inlet {} K",
                    t_out, t_in
                )));
            }
            if power <= 0.0 {
                return Err(invalid(
                    "an outlet temperature needs a heated assembly; assign a flow rate".into(),
                ));
            }
            let cp = heat_capacity(asm, 0.5 * (t_in + t_out))?;
            (power / (cp * (t_out - t_in)), t_out)
        }
    };
    debug!(assembly = asm.name(), rate, outlet, "flow assigned");
    if outlet > MELT_WARNING_TEMPERATURE {
        warn!(
            assembly = asm.name(),
            outlet, "estimated outlet temperature exceeds {} K", MELT_WARNING_TEMPERATURE
        );
    }
    Ok(rate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assembly::fixtures::assembly;
    use crate::layout::ring_position;
    use bf_power::AssemblyPower;

    fn power(n: usize, watts: f64) -> PowerField {
        PowerField::new(
            (0..n)
                .map(|_| {
                    AssemblyPower::new(vec![0.0, 1.0], 61, vec![watts / 61.0; 61], vec![0.0], vec![0.0], 1.0)
                        .unwrap()
                })
                .collect(),
        )
    }

    fn pos(p: u32) -> bf_geometry::Hex {
        if p == 0 {
            ring_position(1, 1).unwrap()
        } else {
            ring_position(2, p).unwrap()
        }
    }

    #[test]
    fn outlet_assignment_gives_energy_flow() {
        let core = CoreBuilder::new(600.0, 0.065)
            .assembly(assembly("a", pos(0), 1.0), FlowAssignment::OutletTemperature(750.0))
            .build(&power(1, 1.0e6))
            .unwrap();
        let m = core.assemblies()[0].flow_rate();
        // sodium cp ≈ 1.27 kJ/kg-K
        assert!(m > 4.5 && m < 5.8, "m = {m}");
    }

    #[test]
    fn bypass_share_of_total() {
        let core = CoreBuilder::new(600.0, 0.065)
            .bypass_fraction(0.2)
            .assembly(assembly("a", pos(0), 1.0), FlowAssignment::Rate(8.0))
            .build(&power(1, 0.0))
            .unwrap();
        assert!((core.bypass_flow() - 2.0).abs() < 1e-12);
    }

    #[test]
    fn fixed_group_flow_overrides_assignment() {
        let core = CoreBuilder::new(600.0, 0.065)
            .assembly(assembly("a", pos(0), 1.0), FlowAssignment::Rate(8.0))
            .assembly(assembly("b", pos(1), 1.0), FlowAssignment::Rate(8.0))
            .group("g", GroupConstraint::FlowRate(3.0), ["b"])
            .build(&power(2, 1.0e5))
            .unwrap();
        assert_eq!(core.assemblies()[0].flow_rate(), 8.0);
        assert_eq!(core.assemblies()[1].flow_rate(), 3.0);
    }

    #[test]
    fn conflicting_group_constraints_rejected() {
        let err = CoreBuilder::new(600.0, 0.065)
            .assembly(assembly("a", pos(0), 1.0), FlowAssignment::Rate(8.0))
            .group("g1", GroupConstraint::FlowRate(3.0), ["a"])
            .group(
                "g2",
                GroupConstraint::TemperatureLimit {
                    quantity: LimitQuantity::PeakCoolant,
                    limit: 800.0,
                },
                ["a"],
            )
            .build(&power(1, 1.0e5))
            .unwrap_err();
        assert_eq!(
            err,
            ConfigError::ConflictingGroupConstraint {
                assembly: "a".into(),
                first: "g1".into(),
                second: "g2".into()
            }
        );
    }

    #[test]
    fn unequal_lengths_rejected() {
        let err = CoreBuilder::new(600.0, 0.065)
            .assembly(assembly("a", pos(0), 1.0), FlowAssignment::Rate(8.0))
            .assembly(assembly("b", pos(1), 1.5), FlowAssignment::Rate(8.0))
            .build(&power(2, 0.0))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidCore { .. }));
    }

    #[test]
    fn power_field_must_match_core() {
        let err = CoreBuilder::new(600.0, 0.065)
            .assembly(assembly("a", pos(0), 1.0), FlowAssignment::Rate(8.0))
            .build(&power(2, 0.0))
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Power(PowerError::PowerIndexMismatch { .. })
        ));
    }

    #[test]
    fn assemblies_take_their_core_slot() {
        let core = CoreBuilder::new(600.0, 0.065)
            .assembly(assembly("a", pos(0), 1.0), FlowAssignment::Rate(8.0))
            .assembly(assembly("b", pos(1), 1.0), FlowAssignment::Rate(8.0))
            .build(&power(2, 0.0))
            .unwrap();
        for (i, a) in core.assemblies().iter().enumerate() {
            assert_eq!(a.id().slot(), i);
        }
    }

    #[test]
    fn power_mesh_longer_than_assembly_rejected() {
        let long = AssemblyPower::new(vec![0.0, 2.0], 61, vec![1.0e3; 61], vec![0.0], vec![0.0], 1.0)
            .unwrap();
        let err = CoreBuilder::new(600.0, 0.065)
            .assembly(assembly("a", pos(0), 1.0), FlowAssignment::Rate(8.0))
            .build(&PowerField::new(vec![long]))
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Power(PowerError::PowerIndexMismatch { .. })
        ));
    }

    #[test]
    fn power_mesh_shorter_than_assembly_accepted() {
        let short = AssemblyPower::new(vec![0.0, 0.5], 61, vec![1.0e3; 61], vec![0.0], vec![0.0], 1.0)
            .unwrap();
        let core = CoreBuilder::new(600.0, 0.065)
            .assembly(assembly("a", pos(0), 1.0), FlowAssignment::Rate(8.0))
            .build(&PowerField::new(vec![short]));
        assert!(core.is_ok());
    }

    #[test]
    fn fuel_limit_needs_pin_model() {
        let err = CoreBuilder::new(600.0, 0.065)
            .assembly(assembly("a", pos(0), 1.0), FlowAssignment::Rate(8.0))
            .group(
                "g",
                GroupConstraint::TemperatureLimit {
                    quantity: LimitQuantity::PeakFuelCenterline,
                    limit: 1000.0,
                },
                ["a"],
            )
            .build(&power(1, 1.0e5))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidAssembly { .. }));
    }
}

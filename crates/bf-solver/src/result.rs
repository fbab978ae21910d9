//! Solution records.

use crate::network::NetworkState;
use crate::reactor::LimitQuantity;

/// Pressure loss of one axial region [Pa].
#[derive(Debug, Clone, PartialEq)]
pub struct RegionPressureDrop {
    pub name: String,
    pub friction: f64,
    pub grids: f64,
    pub gravity: f64,
    pub total: f64,
}

/// Energy bookkeeping of one assembly [W].
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EnergyBalance {
    /// Power deposited in pins, coolant and duct.
    pub deposited: f64,
    /// Enthalpy rise of the assembly coolant.
    pub absorbed: f64,
    /// Heat leaving through the duct into the gap.
    pub to_gap: f64,
}

impl EnergyBalance {
    /// `deposited − absorbed − to_gap`, relative to the deposited power.
    pub fn relative_error(&self) -> f64 {
        let residual = self.deposited - self.absorbed - self.to_gap;
        if self.deposited.abs() > 0.0 {
            residual / self.deposited.abs()
        } else {
            residual
        }
    }
}

/// Peak temperatures with hot-channel factors applied [K].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HotspotPeaks {
    pub clad_midwall: f64,
    pub fuel_centerline: Option<f64>,
}

/// Axial profiles of one assembly.
#[derive(Debug, Clone, PartialEq)]
pub struct AssemblyResult {
    pub name: String,
    pub flow_rate: f64,
    /// Axial nodes [m].
    pub z: Vec<f64>,
    /// Subchannel temperatures per node [K].
    pub coolant: Vec<Vec<f64>>,
    /// Mixed-cup temperature per node [K].
    pub bulk: Vec<f64>,
    /// Average outer duct temperature per side, per node [K].
    pub duct_outer: Vec<[f64; 6]>,
    /// Peak clad mid-wall temperature per node, on rodded nodes [K].
    pub peak_clad_mid: Vec<Option<f64>>,
    /// Peak fuel centerline temperature per node, on rodded nodes with fuel [K].
    pub peak_fuel_centerline: Vec<Option<f64>>,
    pub hotspot: Option<HotspotPeaks>,
    /// Inlet-to-outlet pressure drop [Pa].
    pub pressure_drop: f64,
    pub regions: Vec<RegionPressureDrop>,
    pub energy: EnergyBalance,
    /// Axial steps taken, refinements included.
    pub steps: usize,
}

impl AssemblyResult {
    /// Mixed-cup outlet temperature [K].
    pub fn outlet_temperature(&self) -> f64 {
        self.bulk.last().copied().unwrap_or(f64::NAN)
    }

    /// Hottest subchannel anywhere [K].
    pub fn peak_coolant(&self) -> f64 {
        self.coolant
            .iter()
            .flatten()
            .copied()
            .fold(f64::NEG_INFINITY, f64::max)
    }

    pub fn peak_clad_midwall(&self) -> Option<f64> {
        self.peak_clad_mid.iter().flatten().copied().reduce(f64::max)
    }

    pub fn peak_fuel(&self) -> Option<f64> {
        self.peak_fuel_centerline
            .iter()
            .flatten()
            .copied()
            .reduce(f64::max)
    }

    /// Value compared against a group temperature limit.
    pub fn limit_value(&self, quantity: LimitQuantity) -> Option<f64> {
        match quantity {
            LimitQuantity::PeakCoolant => Some(self.peak_coolant()),
            LimitQuantity::OutletCoolant => Some(self.outlet_temperature()),
            LimitQuantity::PeakCladMidwall => self.peak_clad_midwall(),
            LimitQuantity::PeakFuelCenterline => self.peak_fuel(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BypassResult {
    pub flow: f64,
    pub outlet_temperature: f64,
}

/// Convergence record of one network iteration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IterationRecord {
    pub iteration: usize,
    /// Largest change of any per-side duct temperature; none on the first pass.
    pub max_change: Option<f64>,
    /// Largest temperature difference across any shared face at the outlet.
    pub max_duct_difference: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CoreResult {
    pub assemblies: Vec<AssemblyResult>,
    pub state: NetworkState,
    pub history: Vec<IterationRecord>,
    pub bypass: Option<BypassResult>,
    pub energy: EnergyBalance,
}

impl CoreResult {
    pub fn assembly(&self, name: &str) -> Option<&AssemblyResult> {
        self.assemblies.iter().find(|a| a.name == name)
    }

    /// Largest limit value over `members`.
    pub fn limiting_value(&self, members: &[usize], quantity: LimitQuantity) -> Option<f64> {
        members
            .iter()
            .filter_map(|&m| self.assemblies.get(m)?.limit_value(quantity))
            .reduce(f64::max)
    }

    /// Flow-weighted mixed outlet of assemblies and bypass [K].
    pub fn mixed_outlet_temperature(&self) -> f64 {
        let mut flow = 0.0;
        let mut sum = 0.0;
        for a in &self.assemblies {
            flow += a.flow_rate;
            sum += a.flow_rate * a.outlet_temperature();
        }
        if let Some(b) = self.bypass {
            flow += b.flow;
            sum += b.flow * b.outlet_temperature;
        }
        if flow > 0.0 { sum / flow } else { f64::NAN }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(bulk: Vec<f64>, coolant: Vec<Vec<f64>>) -> AssemblyResult {
        let n = bulk.len();
        AssemblyResult {
            name: "a".into(),
            flow_rate: 1.0,
            z: (0..n).map(|i| i as f64).collect(),
            coolant,
            bulk,
            duct_outer: vec![[0.0; 6]; n],
            peak_clad_mid: vec![None; n],
            peak_fuel_centerline: vec![None; n],
            hotspot: None,
            pressure_drop: 0.0,
            regions: Vec::new(),
            energy: EnergyBalance::default(),
            steps: n,
        }
    }

    #[test]
    fn limit_values() {
        let r = result(vec![600.0, 650.0], vec![vec![600.0, 600.0], vec![640.0, 670.0]]);
        assert_eq!(r.limit_value(LimitQuantity::OutletCoolant), Some(650.0));
        assert_eq!(r.limit_value(LimitQuantity::PeakCoolant), Some(670.0));
        assert_eq!(r.limit_value(LimitQuantity::PeakCladMidwall), None);
    }

    #[test]
    fn energy_residual_is_relative() {
        let e = EnergyBalance {
            deposited: 100.0,
            absorbed: 95.0,
            to_gap: 4.0,
        };
        assert!((e.relative_error() - 0.01).abs() < 1e-12);
    }
}

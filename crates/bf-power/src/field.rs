//! The mapped power field.

use crate::error::{PowerError, PowerResult};

/// Where a pin's generated power ends up.
///
/// Fractions of the pin linear power deposited in fuel, cladding, coolant
/// and duct. They must be non-negative and sum to one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DepositionSplit {
    pub fuel: f64,
    pub clad: f64,
    pub coolant: f64,
    pub duct: f64,
}

impl Default for DepositionSplit {
    fn default() -> Self {
        Self {
            fuel: 1.0,
            clad: 0.0,
            coolant: 0.0,
            duct: 0.0,
        }
    }
}

impl DepositionSplit {
    pub fn validate(&self) -> PowerResult<()> {
        let parts = [self.fuel, self.clad, self.coolant, self.duct];
        if parts.iter().any(|p| !p.is_finite() || *p < 0.0) {
            return Err(PowerError::InvalidData {
                what: "deposition fractions must be finite and non-negative".into(),
            });
        }
        let sum: f64 = parts.iter().sum();
        if (sum - 1.0).abs() > 1e-6 {
            return Err(PowerError::InvalidData {
                what: format!("deposition fractions sum to {sum}, expected 1"),
            });
        }
        Ok(())
    }

    /// Share deposited inside the pin (fuel plus cladding).
    pub fn pin(&self) -> f64 {
        self.fuel + self.clad
    }
}

/// Power of one assembly on its own axial mesh.
///
/// Outside `[z_edges[0], z_edges[last])` the assembly is unheated.
#[derive(Debug, Clone, PartialEq)]
pub struct AssemblyPower {
    z_edges: Vec<f64>,
    n_pins: usize,
    /// Pin-major: `pin * n_axial + axial` [W/m] released at the pin surface.
    pin: Vec<f64>,
    /// Direct coolant heating per interval [W/m].
    coolant: Vec<f64>,
    /// Duct wall heating per interval [W/m].
    duct: Vec<f64>,
    /// Fraction of pin power generated in the fuel, the rest in the clad.
    fuel_share: f64,
}

impl AssemblyPower {
    pub fn new(
        z_edges: Vec<f64>,
        n_pins: usize,
        pin: Vec<f64>,
        coolant: Vec<f64>,
        duct: Vec<f64>,
        fuel_share: f64,
    ) -> PowerResult<Self> {
        validate_edges(&z_edges)?;
        let n_axial = z_edges.len() - 1;
        if pin.len() != n_pins * n_axial || coolant.len() != n_axial || duct.len() != n_axial {
            return Err(PowerError::PowerIndexMismatch {
                what: format!(
                    "expected {} pin values and {} axial values, got {}/{}/{}",
                    n_pins * n_axial,
                    n_axial,
                    pin.len(),
                    coolant.len(),
                    duct.len()
                ),
            });
        }
        if pin.iter().chain(&coolant).chain(&duct).any(|q| !q.is_finite()) {
            return Err(PowerError::InvalidData {
                what: "non-finite linear power".into(),
            });
        }
        Ok(Self {
            z_edges,
            n_pins,
            pin,
            coolant,
            duct,
            fuel_share: fuel_share.clamp(0.0, 1.0),
        })
    }

    /// An unheated assembly.
    pub fn zero(n_pins: usize, length: f64) -> Self {
        Self {
            z_edges: vec![0.0, length],
            n_pins,
            pin: vec![0.0; n_pins],
            coolant: vec![0.0],
            duct: vec![0.0],
            fuel_share: 1.0,
        }
    }

    pub fn z_edges(&self) -> &[f64] {
        &self.z_edges
    }

    pub fn n_axial(&self) -> usize {
        self.z_edges.len() - 1
    }

    pub fn n_pins(&self) -> usize {
        self.n_pins
    }

    pub fn fuel_share(&self) -> f64 {
        self.fuel_share
    }

    /// Interval holding `z`, if any.
    pub fn interval_at(&self, z: f64) -> Option<usize> {
        let last = *self.z_edges.last()?;
        if z < self.z_edges[0] || z > last {
            return None;
        }
        let idx = self.z_edges.partition_point(|&e| e <= z);
        Some(idx.saturating_sub(1).min(self.n_axial() - 1))
    }

    pub fn pin_linear(&self, pin: usize, z: f64) -> f64 {
        match self.interval_at(z) {
            Some(j) if pin < self.n_pins => self.pin[pin * self.n_axial() + j],
            _ => 0.0,
        }
    }

    pub fn coolant_linear(&self, z: f64) -> f64 {
        self.interval_at(z).map_or(0.0, |j| self.coolant[j])
    }

    pub fn duct_linear(&self, z: f64) -> f64 {
        self.interval_at(z).map_or(0.0, |j| self.duct[j])
    }

    /// Sum over all pins and direct heating at `z` [W/m].
    pub fn total_linear(&self, z: f64) -> f64 {
        let Some(j) = self.interval_at(z) else {
            return 0.0;
        };
        let n = self.n_axial();
        let pins: f64 = (0..self.n_pins).map(|i| self.pin[i * n + j]).sum();
        pins + self.coolant[j] + self.duct[j]
    }

    /// Peak pin linear power anywhere in the assembly [W/m].
    pub fn peak_pin_linear(&self) -> f64 {
        self.pin.iter().copied().fold(0.0, f64::max)
    }

    /// Integrated power [W].
    pub fn total_power(&self) -> f64 {
        let n = self.n_axial();
        (0..n)
            .map(|j| {
                let dz = self.z_edges[j + 1] - self.z_edges[j];
                let pins: f64 = (0..self.n_pins).map(|i| self.pin[i * n + j]).sum();
                dz * (pins + self.coolant[j] + self.duct[j])
            })
            .sum()
    }

    pub fn scale(&mut self, factor: f64) {
        for q in self
            .pin
            .iter_mut()
            .chain(self.coolant.iter_mut())
            .chain(self.duct.iter_mut())
        {
            *q *= factor;
        }
    }
}

pub(crate) fn validate_edges(z_edges: &[f64]) -> PowerResult<()> {
    if z_edges.len() < 2 {
        return Err(PowerError::InvalidData {
            what: "axial power mesh needs at least two boundaries".into(),
        });
    }
    if z_edges.iter().any(|z| !z.is_finite()) || z_edges.windows(2).any(|w| w[1] <= w[0]) {
        return Err(PowerError::InvalidData {
            what: "axial power mesh must be finite and strictly increasing".into(),
        });
    }
    Ok(())
}

/// Power of every assembly in core order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PowerField {
    assemblies: Vec<AssemblyPower>,
}

impl PowerField {
    pub fn new(assemblies: Vec<AssemblyPower>) -> Self {
        Self { assemblies }
    }

    pub fn len(&self) -> usize {
        self.assemblies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assemblies.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&AssemblyPower> {
        self.assemblies.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &AssemblyPower> {
        self.assemblies.iter()
    }

    /// Integrated core power [W].
    pub fn total_power(&self) -> f64 {
        self.assemblies.iter().map(AssemblyPower::total_power).sum()
    }

    /// Every axial power boundary in the core.
    pub fn axial_edges(&self) -> impl Iterator<Item = f64> + '_ {
        self.assemblies
            .iter()
            .flat_map(|a| a.z_edges().iter().copied())
    }

    pub fn scale(&mut self, factor: f64) {
        for a in &mut self.assemblies {
            a.scale(factor);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn two_pin() -> AssemblyPower {
        AssemblyPower::new(
            vec![0.0, 0.5, 1.5],
            2,
            vec![100.0, 200.0, 300.0, 400.0],
            vec![10.0, 10.0],
            vec![0.0, 5.0],
            0.9,
        )
        .unwrap()
    }

    #[test]
    fn lookup_by_height() {
        let p = two_pin();
        assert_eq!(p.pin_linear(0, 0.2), 100.0);
        assert_eq!(p.pin_linear(1, 1.0), 400.0);
        assert_eq!(p.pin_linear(1, 1.5), 400.0);
        assert_eq!(p.pin_linear(0, 2.0), 0.0);
        assert_eq!(p.pin_linear(5, 0.2), 0.0);
        assert_eq!(p.total_linear(0.7), 200.0 + 400.0 + 10.0 + 5.0);
    }

    #[test]
    fn integrated_power() {
        let p = two_pin();
        let expected = 0.5 * (100.0 + 300.0 + 10.0) + 1.0 * (200.0 + 400.0 + 10.0 + 5.0);
        assert_relative_eq!(p.total_power(), expected, max_relative = 1e-12);
    }

    #[test]
    fn shape_mismatch_rejected() {
        let err = AssemblyPower::new(vec![0.0, 1.0], 3, vec![1.0; 2], vec![0.0], vec![0.0], 1.0)
            .unwrap_err();
        assert!(matches!(err, PowerError::PowerIndexMismatch { .. }));
    }

    #[test]
    fn split_must_sum_to_one() {
        let split = DepositionSplit {
            fuel: 0.9,
            clad: 0.05,
            coolant: 0.0,
            duct: 0.0,
        };
        assert!(split.validate().is_err());
        assert!(DepositionSplit::default().validate().is_ok());
    }
}

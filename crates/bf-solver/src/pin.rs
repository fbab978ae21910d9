//! Radial pin temperatures: film, clad, bond gap and fuel conduction.

use std::f64::consts::PI;

use bf_core::units::k;
use bf_materials::{Material, MaterialResult};

use crate::assembly::PinMaterials;

/// Radial temperatures of one pin at one axial node [K].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PinNode {
    pub coolant: f64,
    pub clad_outer: f64,
    pub clad_mid: f64,
    pub clad_inner: f64,
    pub fuel_surface: Option<f64>,
    pub fuel_centerline: Option<f64>,
}

/// Radial conduction model of the pins of one assembly.
#[derive(Debug, Clone, Copy)]
pub struct PinRadial<'a> {
    clad: &'a Material,
    internals: Option<&'a PinMaterials>,
    r_outer: f64,
    r_inner: f64,
}

fn conductivity(material: &Material, t: f64) -> MaterialResult<f64> {
    Ok(material.properties(k(t))?.properties.conductivity)
}

impl<'a> PinRadial<'a> {
    pub fn new(
        clad: &'a Material,
        internals: Option<&'a PinMaterials>,
        r_outer: f64,
        r_inner: f64,
    ) -> Self {
        Self {
            clad,
            internals,
            r_outer,
            r_inner,
        }
    }

    /// Temperatures for linear power `q` [W/m] leaving the pin, of which
    /// `fuel_share` is generated in the fuel, with film coefficient `h`.
    pub fn solve(&self, t_coolant: f64, q: f64, fuel_share: f64, h: f64) -> MaterialResult<PinNode> {
        let q = q.max(0.0);
        let clad_outer = if h > 0.0 {
            t_coolant + q / (2.0 * PI * self.r_outer * h)
        } else {
            t_coolant
        };

        let r_mid = 0.5 * (self.r_outer + self.r_inner);
        let mut k_clad = conductivity(self.clad, clad_outer)?;
        let mut clad_inner = clad_outer;
        for _ in 0..2 {
            clad_inner = clad_outer + q * (self.r_outer / self.r_inner).ln() / (2.0 * PI * k_clad);
            k_clad = conductivity(self.clad, 0.5 * (clad_outer + clad_inner))?;
        }
        let clad_mid = clad_outer + q * (self.r_outer / r_mid).ln() / (2.0 * PI * k_clad);

        let (fuel_surface, fuel_centerline) = match self.internals {
            None => (None, None),
            Some(PinMaterials::Fuel { model, fuel, bond }) => {
                let q_fuel = q * fuel_share;
                let r_fuel = self.r_inner - model.gap_thickness;
                let surface = if model.gap_thickness > 0.0 {
                    let k_bond = conductivity(bond, clad_inner)?;
                    clad_inner + q_fuel * (self.r_inner / r_fuel).ln() / (2.0 * PI * k_bond)
                } else {
                    clad_inner
                };
                let p = model.porosity;
                let porosity = (1.0 - p) / (1.0 + 2.0 * p);
                let r0 = model.annulus_fraction * r_fuel;
                let shape = if r0 > 0.0 {
                    1.0 - 2.0 * r0 * r0 / (r_fuel * r_fuel - r0 * r0) * (r_fuel / r0).ln()
                } else {
                    1.0
                };
                let mut rise = 0.0;
                for _ in 0..2 {
                    let k_fuel = conductivity(fuel, surface + 0.5 * rise)? * porosity;
                    rise = q_fuel * shape / (4.0 * PI * k_fuel);
                }
                (Some(surface), Some(surface + rise))
            }
            Some(PinMaterials::Zones(zones)) => {
                let q_vol = q * fuel_share / (PI * self.r_inner * self.r_inner);
                let mut t = clad_inner;
                for (i, (outer, material)) in zones.iter().enumerate().rev() {
                    let r_b = outer * self.r_inner;
                    let r_a = if i == 0 {
                        0.0
                    } else {
                        zones[i - 1].0 * self.r_inner
                    };
                    let k_zone = conductivity(material, t)?;
                    t += q_vol * (r_b * r_b - r_a * r_a) / (4.0 * k_zone);
                }
                (Some(clad_inner), Some(t))
            }
        };

        Ok(PinNode {
            coolant: t_coolant,
            clad_outer,
            clad_mid,
            clad_inner,
            fuel_surface,
            fuel_centerline,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bf_geometry::FuelModel;
    use bf_materials::MaterialLibrary;
    use std::sync::Arc;

    const RO: f64 = 0.004;
    const RI: f64 = 0.0035;

    #[test]
    fn zero_power_is_isothermal() {
        let lib = MaterialLibrary::new();
        let clad = lib.resolve("ht9").unwrap();
        let node = PinRadial::new(&clad, None, RO, RI).solve(700.0, 0.0, 1.0, 1.0e5).unwrap();
        assert_eq!(node.clad_outer, 700.0);
        assert_eq!(node.clad_mid, 700.0);
        assert!(node.fuel_centerline.is_none());
    }

    #[test]
    fn temperatures_increase_inward() {
        let lib = MaterialLibrary::new();
        let clad = lib.resolve("ht9").unwrap();
        let fuel = PinMaterials::Fuel {
            model: FuelModel {
                gap_thickness: 0.0005,
                porosity: 0.1,
                ..FuelModel::default()
            },
            fuel: lib.resolve("u10zr").unwrap(),
            bond: lib.resolve("sodium").unwrap(),
        };
        let node = PinRadial::new(&clad, Some(&fuel), RO, RI)
            .solve(700.0, 3.0e4, 1.0, 1.0e5)
            .unwrap();
        assert!(node.clad_outer > node.coolant);
        assert!(node.clad_mid > node.clad_outer && node.clad_inner > node.clad_mid);
        let surface = node.fuel_surface.unwrap();
        assert!(surface > node.clad_inner);
        assert!(node.fuel_centerline.unwrap() > surface);
    }

    #[test]
    fn zoned_pin_accumulates_each_zone() {
        let lib = MaterialLibrary::new();
        let clad = lib.resolve("ss316").unwrap();
        let zones = PinMaterials::Zones(vec![
            (0.5, lib.resolve("u10zr").unwrap()),
            (1.0, Arc::clone(&lib.resolve("u10zr").unwrap())),
        ]);
        let single = PinMaterials::Zones(vec![(1.0, lib.resolve("u10zr").unwrap())]);
        let split = PinRadial::new(&clad, Some(&zones), RO, RI)
            .solve(700.0, 2.0e4, 1.0, 1.0e5)
            .unwrap();
        let whole = PinRadial::new(&clad, Some(&single), RO, RI)
            .solve(700.0, 2.0e4, 1.0, 1.0e5)
            .unwrap();
        assert!(split.fuel_centerline.unwrap() > split.clad_inner);
        // conductivity is evaluated per zone, so the totals agree only roughly
        let a = split.fuel_centerline.unwrap() - split.clad_inner;
        let b = whole.fuel_centerline.unwrap() - whole.clad_inner;
        assert!((a - b).abs() < 0.1 * b);
    }
}

//! Hot-spot factors, semistatistical horizontal method.
//!
//! `T = T_in + Σ_k ΔT_k·direct_k + (σ_out/σ_in)·sqrt(Σ_sf (Σ_k ΔT_k·(f_k,sf − 1))²)`
//! over the temperature rise terms `k` (coolant, film, clad, gap, fuel) and
//! the statistical subfactors `sf`.

use crate::pin::PinNode;

/// One value per temperature rise term.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HotspotTerms {
    pub coolant: f64,
    pub film: f64,
    pub clad: f64,
    pub gap: f64,
    pub fuel: f64,
}

impl HotspotTerms {
    pub const UNITY: HotspotTerms = HotspotTerms {
        coolant: 1.0,
        film: 1.0,
        clad: 1.0,
        gap: 1.0,
        fuel: 1.0,
    };

    fn as_array(&self) -> [f64; 5] {
        [self.coolant, self.film, self.clad, self.gap, self.fuel]
    }
}

impl Default for HotspotTerms {
    fn default() -> Self {
        Self::UNITY
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StatisticalFactor {
    pub name: String,
    pub factors: HotspotTerms,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HotspotFactors {
    pub direct: HotspotTerms,
    pub statistical: Vec<StatisticalFactor>,
    /// Confidence of the input uncertainties, in standard deviations.
    pub sigma_in: f64,
    /// Requested confidence of the result, in standard deviations.
    pub sigma_out: f64,
}

impl Default for HotspotFactors {
    fn default() -> Self {
        Self {
            direct: HotspotTerms::UNITY,
            statistical: Vec::new(),
            sigma_in: 3.0,
            sigma_out: 2.0,
        }
    }
}

impl HotspotFactors {
    fn combine(&self, t_in: f64, rises: [f64; 5]) -> f64 {
        let direct = self.direct.as_array();
        let nominal: f64 = rises.iter().zip(direct).map(|(dt, f)| dt * f).sum();
        let spread: f64 = self
            .statistical
            .iter()
            .map(|sf| {
                let s: f64 = rises
                    .iter()
                    .zip(sf.factors.as_array())
                    .map(|(dt, f)| dt * (f - 1.0))
                    .sum();
                s * s
            })
            .sum();
        t_in + nominal + self.sigma_out / self.sigma_in * spread.sqrt()
    }

    /// Hot-channel clad mid-wall temperature.
    pub fn clad_midwall(&self, t_in: f64, node: &PinNode) -> f64 {
        self.combine(
            t_in,
            [
                node.coolant - t_in,
                node.clad_outer - node.coolant,
                node.clad_mid - node.clad_outer,
                0.0,
                0.0,
            ],
        )
    }

    /// Hot-channel fuel centerline temperature, when the pin has fuel.
    pub fn fuel_centerline(&self, t_in: f64, node: &PinNode) -> Option<f64> {
        let (surface, center) = (node.fuel_surface?, node.fuel_centerline?);
        Some(self.combine(
            t_in,
            [
                node.coolant - t_in,
                node.clad_outer - node.coolant,
                node.clad_inner - node.clad_outer,
                surface - node.clad_inner,
                center - surface,
            ],
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn node() -> PinNode {
        PinNode {
            coolant: 700.0,
            clad_outer: 720.0,
            clad_mid: 730.0,
            clad_inner: 740.0,
            fuel_surface: Some(760.0),
            fuel_centerline: Some(900.0),
        }
    }

    #[test]
    fn unity_factors_reproduce_nominal() {
        let f = HotspotFactors::default();
        assert_relative_eq!(f.clad_midwall(600.0, &node()), 730.0, epsilon = 1e-9);
        assert_relative_eq!(f.fuel_centerline(600.0, &node()).unwrap(), 900.0, epsilon = 1e-9);
    }

    #[test]
    fn statistical_factors_add_root_sum_square() {
        let f = HotspotFactors {
            statistical: vec![
                StatisticalFactor {
                    name: "flow".into(),
                    factors: HotspotTerms {
                        coolant: 1.1,
                        ..HotspotTerms::UNITY
                    },
                },
                StatisticalFactor {
                    name: "film".into(),
                    factors: HotspotTerms {
                        film: 1.3,
                        ..HotspotTerms::UNITY
                    },
                },
            ],
            ..HotspotFactors::default()
        };
        // coolant rise 100 K × 0.1, film rise 20 K × 0.3
        let spread = (10.0f64.powi(2) + 6.0f64.powi(2)).sqrt();
        assert_relative_eq!(
            f.clad_midwall(600.0, &node()),
            730.0 + 2.0 / 3.0 * spread,
            epsilon = 1e-9
        );
    }

    #[test]
    fn direct_factor_scales_its_term() {
        let f = HotspotFactors {
            direct: HotspotTerms {
                film: 1.5,
                ..HotspotTerms::UNITY
            },
            ..HotspotFactors::default()
        };
        assert_relative_eq!(f.clad_midwall(600.0, &node()), 740.0, epsilon = 1e-9);
    }
}

//! Tabulated property model with linear interpolation.

use crate::error::{MaterialError, MaterialResult};
use crate::model::{MaterialModel, Phase, RawProperties};

/// Property rows keyed by temperature.
///
/// Between rows values are interpolated linearly; past either end the first
/// or last segment is extended. The table span is the validated range.
#[derive(Debug, Clone, PartialEq)]
pub struct TabulatedModel {
    temperatures: Vec<f64>,
    rows: Vec<RawProperties>,
    phase: Phase,
}

impl TabulatedModel {
    /// Build from parallel columns. Temperatures must be strictly increasing.
    pub fn new(
        name: &str,
        temperatures: Vec<f64>,
        rows: Vec<RawProperties>,
        phase: Phase,
    ) -> MaterialResult<Self> {
        let invalid = |what: &str| MaterialError::InvalidDefinition {
            material: name.to_string(),
            what: what.to_string(),
        };

        if temperatures.len() < 2 {
            return Err(invalid("table needs at least two rows"));
        }
        if temperatures.len() != rows.len() {
            return Err(invalid("temperature and property columns differ in length"));
        }
        if temperatures.windows(2).any(|w| !(w[0] < w[1])) {
            return Err(invalid("temperatures must be strictly increasing"));
        }
        if temperatures.iter().any(|t| !t.is_finite()) {
            return Err(invalid("non-finite temperature"));
        }

        Ok(Self {
            temperatures,
            rows,
            phase,
        })
    }

    /// Index of the segment used for `t` (clamped to the end segments).
    fn segment(&self, t: f64) -> usize {
        let n = self.temperatures.len();
        match self.temperatures.partition_point(|&tt| tt <= t) {
            0 => 0,
            i if i >= n => n - 2,
            i => i - 1,
        }
    }
}

fn lerp(a: f64, b: f64, f: f64) -> f64 {
    a + (b - a) * f
}

impl MaterialModel for TabulatedModel {
    fn evaluate(&self, t_k: f64) -> RawProperties {
        let i = self.segment(t_k);
        let (t0, t1) = (self.temperatures[i], self.temperatures[i + 1]);
        let (a, b) = (self.rows[i], self.rows[i + 1]);
        let f = (t_k - t0) / (t1 - t0);
        RawProperties {
            rho: lerp(a.rho, b.rho, f),
            cp: lerp(a.cp, b.cp, f),
            k: lerp(a.k, b.k, f),
            mu: lerp(a.mu, b.mu, f),
        }
    }

    fn valid_range(&self) -> Option<(f64, f64)> {
        let lo = self.temperatures.first()?;
        let hi = self.temperatures.last()?;
        Some((*lo, *hi))
    }

    fn phase(&self) -> Phase {
        self.phase
    }

    fn kind(&self) -> &'static str {
        "table"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn row(rho: f64) -> RawProperties {
        RawProperties {
            rho,
            cp: 1300.0,
            k: 70.0,
            mu: 3.0e-4,
        }
    }

    fn table() -> TabulatedModel {
        TabulatedModel::new(
            "t",
            vec![400.0, 500.0, 700.0],
            vec![row(900.0), row(880.0), row(840.0)],
            Phase::Liquid,
        )
        .unwrap()
    }

    #[test]
    fn interpolates_inside_segments() {
        let t = table();
        assert_relative_eq!(t.evaluate(450.0).rho, 890.0);
        assert_relative_eq!(t.evaluate(600.0).rho, 860.0);
        assert_relative_eq!(t.evaluate(500.0).rho, 880.0);
    }

    #[test]
    fn extends_end_segments() {
        let t = table();
        assert_relative_eq!(t.evaluate(300.0).rho, 920.0);
        assert_relative_eq!(t.evaluate(800.0).rho, 820.0);
        assert_eq!(t.valid_range(), Some((400.0, 700.0)));
    }

    #[test]
    fn rejects_unsorted_temperatures() {
        let err = TabulatedModel::new(
            "bad",
            vec![500.0, 400.0],
            vec![row(1.0), row(1.0)],
            Phase::Liquid,
        )
        .unwrap_err();
        assert!(err.to_string().contains("strictly increasing"));
    }
}

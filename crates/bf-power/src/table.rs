//! Tabulated pin power.

use std::collections::HashSet;

use crate::error::{PowerError, PowerResult};
use crate::field::{DepositionSplit, validate_edges};

/// One entry of a pin power listing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PowerRow {
    pub assembly: usize,
    pub pin: usize,
    pub axial: usize,
    /// Total linear power generated by the pin in the interval [W/m].
    pub linear_power: f64,
}

/// Pin power listing on a shared axial mesh.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PowerTable {
    pub z_edges: Vec<f64>,
    pub rows: Vec<PowerRow>,
    pub split: DepositionSplit,
}

impl PowerTable {
    pub fn n_axial(&self) -> usize {
        self.z_edges.len().saturating_sub(1)
    }

    /// Assemblies the table provides rows for.
    pub fn assemblies(&self) -> HashSet<usize> {
        self.rows.iter().map(|r| r.assembly).collect()
    }

    /// Check every row against the core map (`pins[i]` pins in assembly i).
    pub fn validate(&self, pins: &[usize]) -> PowerResult<()> {
        validate_edges(&self.z_edges)?;
        self.split.validate()?;
        let n_axial = self.n_axial();
        let mut seen = HashSet::new();
        for row in &self.rows {
            let Some(&n_pins) = pins.get(row.assembly) else {
                return Err(PowerError::PowerIndexMismatch {
                    what: format!(
                        "assembly {} not in core map of {} assemblies",
                        row.assembly,
                        pins.len()
                    ),
                });
            };
            if row.pin >= n_pins {
                return Err(PowerError::PowerIndexMismatch {
                    what: format!(
                        "pin {} of assembly {} exceeds its {} pins",
                        row.pin, row.assembly, n_pins
                    ),
                });
            }
            if row.axial >= n_axial {
                return Err(PowerError::PowerIndexMismatch {
                    what: format!(
                        "axial index {} exceeds the {} intervals of the table",
                        row.axial, n_axial
                    ),
                });
            }
            if !row.linear_power.is_finite() || row.linear_power < 0.0 {
                return Err(PowerError::InvalidData {
                    what: format!(
                        "linear power {} at assembly {} pin {} axial {}",
                        row.linear_power, row.assembly, row.pin, row.axial
                    ),
                });
            }
            if !seen.insert((row.assembly, row.pin, row.axial)) {
                return Err(PowerError::PowerIndexMismatch {
                    what: format!(
                        "duplicate row for assembly {} pin {} axial {}",
                        row.assembly, row.pin, row.axial
                    ),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(rows: Vec<PowerRow>) -> PowerTable {
        PowerTable {
            z_edges: vec![0.0, 0.5, 1.0],
            rows,
            split: DepositionSplit::default(),
        }
    }

    fn row(assembly: usize, pin: usize, axial: usize) -> PowerRow {
        PowerRow {
            assembly,
            pin,
            axial,
            linear_power: 1.0e4,
        }
    }

    #[test]
    fn indices_checked_against_core() {
        let pins = [7, 1];
        assert!(table(vec![row(0, 6, 1), row(1, 0, 0)]).validate(&pins).is_ok());
        for bad in [row(2, 0, 0), row(1, 1, 0), row(0, 0, 2)] {
            let err = table(vec![bad]).validate(&pins).unwrap_err();
            assert!(matches!(err, PowerError::PowerIndexMismatch { .. }), "{bad:?}");
        }
    }

    #[test]
    fn duplicates_rejected() {
        let err = table(vec![row(0, 0, 0), row(0, 0, 0)])
            .validate(&[7])
            .unwrap_err();
        assert!(matches!(err, PowerError::PowerIndexMismatch { .. }));
    }
}

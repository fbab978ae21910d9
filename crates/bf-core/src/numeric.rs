use crate::BfError;

/// Floating point type used throughout the solver.
pub type Real = f64;

#[derive(Clone, Copy, Debug)]
pub struct Tolerances {
    pub abs: Real,
    pub rel: Real,
}

impl Default for Tolerances {
    fn default() -> Self {
        Self {
            abs: 1e-12,
            rel: 1e-9,
        }
    }
}

pub fn nearly_equal(a: Real, b: Real, tol: Tolerances) -> bool {
    let diff = (a - b).abs();
    if diff <= tol.abs {
        return true;
    }
    diff <= tol.rel * a.abs().max(b.abs())
}

pub fn ensure_finite(v: Real, what: &'static str) -> Result<Real, BfError> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(BfError::NonFinite { what, value: v })
    }
}

/// Round to a fixed number of decimals.
///
/// Axial plane positions are compared after rounding so that boundaries
/// computed from different sources collapse onto one plane.
pub fn round_to(v: Real, decimals: i32) -> Real {
    let scale = 10f64.powi(decimals);
    (v * scale).round() / scale
}

/// Sort, round and deduplicate a set of axial planes.
pub fn merge_planes(planes: impl IntoIterator<Item = Real>, decimals: i32) -> Vec<Real> {
    let mut out: Vec<Real> = planes.into_iter().map(|z| round_to(z, decimals)).collect();
    out.sort_by(|a, b| a.total_cmp(b));
    out.dedup();
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn nearly_equal_basic() {
        let tol = Tolerances {
            abs: 1e-12,
            rel: 1e-9,
        };
        assert!(nearly_equal(1.0, 1.0 + 1e-12, tol));
        assert!(nearly_equal(0.0, 1e-13, tol));
        assert!(!nearly_equal(1.0, 1.0 + 1e-6, tol));
    }

    #[test]
    fn ensure_finite_detects_nan() {
        let err = ensure_finite(Real::NAN, "test").unwrap_err();
        assert!(format!("{err}").contains("Non-finite"));
    }

    #[test]
    fn merge_planes_collapses_float_noise() {
        let planes = merge_planes([0.3, 0.1 + 0.2, 0.0, 1.0], 12);
        assert_eq!(planes, vec![0.0, 0.3, 1.0]);
    }

    proptest! {
        #[test]
        fn merged_planes_are_strictly_increasing(v in prop::collection::vec(0.0f64..5.0, 0..40)) {
            let planes = merge_planes(v, 12);
            for w in planes.windows(2) {
                prop_assert!(w[0] < w[1]);
            }
        }
    }
}

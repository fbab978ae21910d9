//! Shared helpers for correlation evaluation.

use crate::error::{CorrelationError, CorrelationResult};
use bf_core::numeric::ensure_finite;

/// Smallest pitch-to-diameter excess used in `(P/D - 1)` powers.
pub const MIN_CLEARANCE_RATIO: f64 = 1e-3;

/// Smallest Reynolds number passed into power laws.
pub const MIN_REYNOLDS: f64 = 1.0;

pub fn check_finite(value: f64, what: &'static str) -> CorrelationResult<()> {
    ensure_finite(value, what).map_err(|_| CorrelationError::NonPhysical { what })?;
    Ok(())
}

/// Clamp a value between min and max.
pub fn clamp(value: f64, min: f64, max: f64) -> f64 {
    if value < min {
        min
    } else if value > max {
        max
    } else {
        value
    }
}

/// Laminar and turbulent limits of the bundle transition regime.
pub fn transition_bounds(p_over_d: f64) -> (f64, f64) {
    let x = p_over_d - 1.0;
    let re_l = 300.0 * 10f64.powf(1.7 * x);
    let re_t = 1.0e4 * 10f64.powf(0.7 * x);
    (re_l, re_t)
}

/// Cheng-Todreas intermittency factor ψ in [0, 1].
///
/// 0 in the laminar regime, 1 in the turbulent regime, log-linear in between.
pub fn intermittency(re: f64, p_over_d: f64) -> f64 {
    let (re_l, re_t) = transition_bounds(p_over_d);
    let re = re.max(MIN_REYNOLDS);
    clamp((re / re_l).log10() / (re_t / re_l).log10(), 0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp() {
        assert_eq!(clamp(5.0, 0.0, 10.0), 5.0);
        assert_eq!(clamp(-1.0, 0.0, 10.0), 0.0);
        assert_eq!(clamp(11.0, 0.0, 10.0), 10.0);
    }

    #[test]
    fn test_check_finite() {
        assert!(check_finite(1.0, "test").is_ok());
        assert!(check_finite(f64::NAN, "test").is_err());
    }

    #[test]
    fn intermittency_spans_regimes() {
        let (re_l, re_t) = transition_bounds(1.2);
        assert_eq!(intermittency(0.5 * re_l, 1.2), 0.0);
        assert_eq!(intermittency(2.0 * re_t, 1.2), 1.0);
        let mid = intermittency((re_l * re_t).sqrt(), 1.2);
        assert!((mid - 0.5).abs() < 1e-12);
    }
}

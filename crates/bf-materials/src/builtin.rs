//! Built-in property correlations.
//!
//! Liquid metals follow the usual handbook fits (Fink & Leibowitz for sodium,
//! OECD/NEA handbook for lead and LBE). Structural and fuel entries only need
//! conductivity to be accurate; density and heat capacity are representative
//! constants.

use crate::model::{MaterialModel, Phase, RawProperties};

const C_TO_K: f64 = 273.15;

/// Materials with built-in correlations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Builtin {
    Sodium,
    /// Eutectic NaK-78.
    NaK,
    Lead,
    /// Lead-bismuth eutectic.
    LeadBismuth,
    Tin,
    Ht9,
    Ss316,
    /// Metallic U-10Zr fuel, fully dense.
    UZr,
}

impl Builtin {
    pub const ALL: [Builtin; 8] = [
        Builtin::Sodium,
        Builtin::NaK,
        Builtin::Lead,
        Builtin::LeadBismuth,
        Builtin::Tin,
        Builtin::Ht9,
        Builtin::Ss316,
        Builtin::UZr,
    ];

    /// Validated temperature range [K].
    pub fn range(self) -> (f64, f64) {
        match self {
            Builtin::Sodium => (371.0, 1155.0),
            Builtin::NaK => (323.0, 1000.0),
            Builtin::Lead => (601.0, 1300.0),
            Builtin::LeadBismuth => (398.0, 1300.0),
            Builtin::Tin => (505.0, 1473.0),
            Builtin::Ht9 => (293.0, 1300.0),
            Builtin::Ss316 => (300.0, 1700.0),
            Builtin::UZr => (300.0, 1400.0),
        }
    }
}

fn sodium(t: f64) -> RawProperties {
    let theta = 1.0 - t / 2503.7;
    RawProperties {
        rho: 219.0 + 275.32 * theta + 511.58 * theta.abs().sqrt(),
        cp: 1658.2 - 0.847_90 * t + 4.4541e-4 * t * t - 2.9926e6 / (t * t),
        k: 124.67 - 0.113_81 * t + 5.5226e-5 * t * t - 1.1842e-8 * t.powi(3),
        mu: (-6.4406 - 0.3958 * t.ln() + 556.835 / t).exp(),
    }
}

fn nak(t: f64) -> RawProperties {
    let tc = t - C_TO_K;
    RawProperties {
        rho: 870.7 - 0.2381 * tc,
        cp: 971.3 - 0.3673 * tc + 3.44e-4 * tc * tc,
        k: 21.4 + 0.0198 * tc,
        mu: 9.02e-5 * (616.0 / t).exp(),
    }
}

fn lead(t: f64) -> RawProperties {
    RawProperties {
        rho: 11_441.0 - 1.2795 * t,
        cp: 175.1 - 4.961e-2 * t + 1.985e-5 * t * t - 2.099e-9 * t.powi(3) - 1.524e6 / (t * t),
        k: 9.2 + 0.011 * t,
        mu: 4.55e-4 * (1069.0 / t).exp(),
    }
}

fn lead_bismuth(t: f64) -> RawProperties {
    RawProperties {
        rho: 11_065.0 - 1.293 * t,
        cp: 164.8 - 3.94e-2 * t + 1.25e-5 * t * t - 4.56e5 / (t * t),
        k: 3.284 + 1.617e-2 * t - 2.305e-6 * t * t,
        mu: 4.94e-4 * (754.1 / t).exp(),
    }
}

fn tin(t: f64) -> RawProperties {
    RawProperties {
        rho: 7280.0 - 0.61 * t,
        cp: 250.0,
        k: 20.0 + 0.0206 * t,
        mu: 5.35e-4 * (627.0 / t).exp(),
    }
}

fn ht9(t: f64) -> RawProperties {
    let tc = t - C_TO_K;
    RawProperties {
        rho: 7700.0,
        cp: 500.0,
        k: 17.622 + 2.42e-2 * tc - 1.696e-5 * tc * tc,
        mu: 0.0,
    }
}

fn ss316(t: f64) -> RawProperties {
    RawProperties {
        rho: 7950.0,
        cp: 500.0,
        k: 9.248 + 0.015_71 * t,
        mu: 0.0,
    }
}

fn uzr(t: f64) -> RawProperties {
    RawProperties {
        rho: 15_800.0,
        cp: 170.0,
        k: 10.0 + 0.0196 * t,
        mu: 0.0,
    }
}

impl MaterialModel for Builtin {
    fn evaluate(&self, t_k: f64) -> RawProperties {
        match self {
            Builtin::Sodium => sodium(t_k),
            Builtin::NaK => nak(t_k),
            Builtin::Lead => lead(t_k),
            Builtin::LeadBismuth => lead_bismuth(t_k),
            Builtin::Tin => tin(t_k),
            Builtin::Ht9 => ht9(t_k),
            Builtin::Ss316 => ss316(t_k),
            Builtin::UZr => uzr(t_k),
        }
    }

    fn valid_range(&self) -> Option<(f64, f64)> {
        Some(self.range())
    }

    fn phase(&self) -> Phase {
        match self {
            Builtin::Ht9 | Builtin::Ss316 | Builtin::UZr => Phase::Solid,
            _ => Phase::Liquid,
        }
    }

    fn kind(&self) -> &'static str {
        "built-in"
    }
}

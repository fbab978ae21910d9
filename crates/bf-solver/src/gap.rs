//! Inter-assembly gap coupling.
//!
//! A network iteration solves every assembly against a fixed
//! [`BoundarySnapshot`]; the next snapshot is built from the resulting duct
//! temperatures. Duct sides with no neighbor stay adiabatic.

use bf_core::units::k;
use bf_correlations::NusseltInput;
use bf_geometry::DuctWall;

use crate::axial::DuctBoundary;
use crate::error::{ConfigError, SolverResult};
use crate::mesh::AxialMesh;
use crate::reactor::{Core, GapModel};
use crate::result::{AssemblyResult, BypassResult};

/// Gap between two facing duct sides.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GapFace {
    pub a: usize,
    pub side_a: usize,
    pub b: usize,
    pub side_b: usize,
    /// Wall-to-wall distance [m].
    pub width: f64,
    /// Shared side length [m].
    pub length: f64,
}

impl GapFace {
    pub fn all(core: &Core) -> Vec<GapFace> {
        let asm = core.assemblies();
        core.map()
            .faces()
            .into_iter()
            .map(|f| {
                let (fa, fb) = (
                    asm[f.a].geometry().outer_ftf(),
                    asm[f.b].geometry().outer_ftf(),
                );
                GapFace {
                    a: f.a,
                    side_a: f.side_a,
                    b: f.b,
                    side_b: f.side_b,
                    width: core.assembly_pitch() - 0.5 * (fa + fb),
                    length: DuctWall::side_length(fa.min(fb)),
                }
            })
            .collect()
    }
}

/// Duct boundary conditions of every assembly for one network iteration.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundarySnapshot {
    pub ducts: Vec<DuctBoundary>,
    pub bypass: Option<BypassResult>,
}

impl BoundarySnapshot {
    pub fn adiabatic(assemblies: usize, nodes: usize) -> Self {
        Self {
            ducts: vec![DuctBoundary::adiabatic(nodes); assemblies],
            bypass: None,
        }
    }

    /// Snapshot implied by the duct temperatures of `results`.
    pub fn update(
        core: &Core,
        mesh: &AxialMesh,
        results: &[AssemblyResult],
    ) -> SolverResult<Self> {
        let faces = GapFace::all(core);
        match core.gap_model() {
            GapModel::None => Ok(Self::adiabatic(results.len(), mesh.len())),
            GapModel::NoFlow => stagnant(core, mesh, results, &faces),
            GapModel::Flow => flowing(core, mesh, results, &faces),
        }
    }

    fn is_coupled(&self) -> bool {
        self.ducts.iter().any(|d| !d.is_adiabatic())
    }

    fn gap_temperatures(&self) -> impl Iterator<Item = f64> + '_ {
        self.ducts
            .iter()
            .flat_map(|d| d.temperature.iter().flat_map(|row| row.iter().copied()))
    }
}

const MIN_RELAXATION: f64 = 0.05;
const MAX_RELAXATION: f64 = 20.0;

/// Relaxation of successive gap temperature snapshots.
///
/// With acceleration on, the factor is updated every iteration by Aitken's
/// delta-squared rule over the whole gap temperature vector, starting from
/// the configured factor. Otherwise the configured factor is used as is.
#[derive(Debug, Clone)]
pub struct GapRelaxation {
    omega: f64,
    accelerate: bool,
    residual: Option<Vec<f64>>,
}

impl GapRelaxation {
    pub fn new(omega: f64, accelerate: bool) -> Self {
        Self {
            omega,
            accelerate,
            residual: None,
        }
    }

    /// Factor used by the last [`apply`](Self::apply).
    pub fn omega(&self) -> f64 {
        self.omega
    }

    /// Move `next` from `previous` by the current factor. The first coupled
    /// snapshot is taken unrelaxed.
    pub fn apply(&mut self, previous: &BoundarySnapshot, next: &mut BoundarySnapshot) {
        if !previous.is_coupled() || !next.is_coupled() {
            self.residual = None;
            return;
        }
        let residual: Vec<f64> = next
            .gap_temperatures()
            .zip(previous.gap_temperatures())
            .map(|(n, o)| n - o)
            .collect();
        if self.accelerate
            && let Some(last) = &self.residual
            && last.len() == residual.len()
        {
            let (mut num, mut den) = (0.0, 0.0);
            for (r, l) in residual.iter().zip(last) {
                let d = r - l;
                num += l * d;
                den += d * d;
            }
            if den > 0.0 {
                let omega = -self.omega * num / den;
                if omega.is_finite() {
                    self.omega = omega.clamp(MIN_RELAXATION, MAX_RELAXATION);
                }
            }
        }
        if self.omega != 1.0 {
            let mut r = residual.iter();
            for (new, old) in next.ducts.iter_mut().zip(&previous.ducts) {
                for (tn, to) in new.temperature.iter_mut().zip(&old.temperature) {
                    for s in 0..6 {
                        let dr = r.next().copied().unwrap_or(0.0);
                        tn[s] = to[s] + self.omega * dr;
                    }
                }
            }
        }
        self.residual = Some(residual);
    }
}

fn gap_conductivity(core: &Core, t: f64) -> SolverResult<f64> {
    Ok(core
        .gap_coolant()
        .properties(k(t))
        .map_err(ConfigError::from)?
        .properties
        .conductivity)
}

/// Stagnant coolant: each side sees the mean of the two facing walls
/// through half the gap.
fn stagnant(
    core: &Core,
    mesh: &AxialMesh,
    results: &[AssemblyResult],
    faces: &[GapFace],
) -> SolverResult<BoundarySnapshot> {
    let mut snap = BoundarySnapshot::adiabatic(results.len(), mesh.len());
    for f in faces {
        let ra = &results[f.a];
        let rb = &results[f.b];
        let temps: Vec<f64> = ra
            .duct_outer
            .iter()
            .zip(&rb.duct_outer)
            .map(|(ta, tb)| 0.5 * (ta[f.side_a] + tb[f.side_b]))
            .collect();
        let mean = temps.iter().sum::<f64>() / temps.len().max(1) as f64;
        let h = 2.0 * gap_conductivity(core, mean)? / f.width;
        for (asm, side) in [(f.a, f.side_a), (f.b, f.side_b)] {
            let duct = &mut snap.ducts[asm];
            duct.conductance[side] = h;
            for (row, t) in duct.temperature.iter_mut().zip(&temps) {
                row[side] = *t;
            }
        }
    }
    Ok(snap)
}

/// Bypass coolant flowing up every face, split by face length.
fn flowing(
    core: &Core,
    mesh: &AxialMesh,
    results: &[AssemblyResult],
    faces: &[GapFace],
) -> SolverResult<BoundarySnapshot> {
    let mut snap = BoundarySnapshot::adiabatic(results.len(), mesh.len());
    let t_in = core.inlet_temperature();
    let flow = core.bypass_flow();
    let total_length: f64 = faces.iter().map(|f| f.length).sum();
    if faces.is_empty() || total_length <= 0.0 {
        snap.bypass = Some(BypassResult {
            flow,
            outlet_temperature: t_in,
        });
        return Ok(snap);
    }
    let coolant = core.gap_coolant();
    let nodes = mesh.nodes();
    let mut outlet = 0.0;
    for f in faces {
        let m = flow * f.length / total_length;
        let dh = 2.0 * f.width;
        let props = coolant
            .properties(k(t_in))
            .map_err(ConfigError::from)?
            .properties;
        let asm = &core.assemblies()[f.a];
        let nu = (asm.correlations().duct_htc.eval)(NusseltInput {
            reynolds: m / (f.length * f.width) * dh / props.viscosity.value,
            prandtl: props.prandtl(),
            p_over_d: asm.geometry().bundle_params().p_over_d(),
        });
        let h = nu * props.conductivity / dh;
        let ua = 2.0 * h * f.length;

        let (ra, rb) = (&results[f.a], &results[f.b]);
        let mut temps = Vec::with_capacity(nodes.len());
        let mut t = t_in;
        temps.push(t);
        for (i, w) in nodes.windows(2).enumerate() {
            let wall = 0.25
                * (ra.duct_outer[i][f.side_a]
                    + ra.duct_outer[i + 1][f.side_a]
                    + rb.duct_outer[i][f.side_b]
                    + rb.duct_outer[i + 1][f.side_b]);
            let cp = coolant
                .properties(k(t))
                .map_err(ConfigError::from)?
                .properties
                .heat_capacity;
            t = wall + (t - wall) * (-ua * (w[1] - w[0]) / (m * cp)).exp();
            temps.push(t);
        }
        outlet += m * t;

        for (asm, side) in [(f.a, f.side_a), (f.b, f.side_b)] {
            let duct = &mut snap.ducts[asm];
            duct.conductance[side] = h;
            for (row, t) in duct.temperature.iter_mut().zip(&temps) {
                row[side] = *t;
            }
        }
    }
    snap.bypass = Some(BypassResult {
        flow,
        outlet_temperature: outlet / flow,
    });
    Ok(snap)
}

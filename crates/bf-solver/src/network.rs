//! Fixed-point iteration of the coupled core.
//!
//! Each iteration solves every assembly against the previous boundary
//! snapshot, in parallel, then rebuilds the snapshot from the new duct
//! temperatures. The first iteration uses adiabatic ducts. Convergence is
//! judged on the largest change of any per-side duct temperature.

use bf_core::units::k;
use bf_power::PowerField;
use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::axial::{AssemblyBoundary, AxialOptions, solve_assembly};
use crate::error::{ConfigError, SolverError, SolverResult};
use crate::gap::{BoundarySnapshot, GapFace, GapRelaxation};
use crate::mesh::AxialMesh;
use crate::reactor::{Core, GapModel};
use crate::result::{AssemblyResult, CoreResult, EnergyBalance, IterationRecord};

#[derive(Debug, Clone, PartialEq)]
pub struct NetworkOptions {
    pub max_iterations: usize,
    /// Duct temperature change that counts as converged [K].
    pub tolerance: f64,
    /// Initial relaxation of gap temperatures, in (0, 1].
    pub relaxation: f64,
    /// Aitken acceleration of the gap temperature fixed point.
    pub accelerate: bool,
    pub axial: AxialOptions,
}

impl Default for NetworkOptions {
    fn default() -> Self {
        Self {
            max_iterations: 50,
            tolerance: 0.01,
            relaxation: 1.0,
            accelerate: true,
            axial: AxialOptions::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NetworkState {
    Uninitialized,
    Iterating { iteration: usize, max_change: f64 },
    Converged { iterations: usize },
    Diverged { iterations: usize, max_change: f64 },
}

/// Drives the core iteration one step at a time.
pub struct NetworkSolver<'a> {
    core: &'a Core,
    power: &'a PowerField,
    opts: &'a NetworkOptions,
    mesh: AxialMesh,
    snapshot: BoundarySnapshot,
    relaxation: GapRelaxation,
    results: Vec<AssemblyResult>,
    history: Vec<IterationRecord>,
    state: NetworkState,
}

impl<'a> NetworkSolver<'a> {
    pub fn new(core: &'a Core, power: &'a PowerField, opts: &'a NetworkOptions) -> SolverResult<Self> {
        if power.len() != core.len() {
            return Err(ConfigError::InvalidCore {
                what: format!(
                    "power field has {} assemblies, core has {}",
                    power.len(),
                    core.len()
                ),
            }
            .into());
        }
        if !(opts.relaxation > 0.0 && opts.relaxation <= 1.0) {
            return Err(ConfigError::InvalidCore {
                what: format!("relaxation {} outside (0, 1]", opts.relaxation),
            }
            .into());
        }
        let mesh = AxialMesh::build(core, power, &opts.axial)?;
        let snapshot = BoundarySnapshot::adiabatic(core.len(), mesh.len());
        Ok(Self {
            core,
            power,
            opts,
            mesh,
            snapshot,
            relaxation: GapRelaxation::new(opts.relaxation, opts.accelerate),
            results: Vec::new(),
            history: Vec::new(),
            state: NetworkState::Uninitialized,
        })
    }

    pub fn state(&self) -> NetworkState {
        self.state
    }

    pub fn mesh(&self) -> &AxialMesh {
        &self.mesh
    }

    pub fn history(&self) -> &[IterationRecord] {
        &self.history
    }

    /// Run one iteration and return the new state.
    pub fn iterate(&mut self) -> SolverResult<NetworkState> {
        let iteration = self.history.len() + 1;
        let t_in = self.core.inlet_temperature();
        let mesh = &self.mesh;
        let snapshot = &self.snapshot;
        let axial = &self.opts.axial;
        let power = self.power;
        let results = self
            .core
            .assemblies()
            .par_iter()
            .map(|asm| {
                let slot = asm.id().slot();
                let (Some(p), Some(duct)) = (power.get(slot), snapshot.ducts.get(slot)) else {
                    return Err(SolverError::from(ConfigError::InvalidCore {
                        what: format!("no power or boundary for assembly '{}'", asm.name()),
                    }));
                };
                let boundary = AssemblyBoundary {
                    inlet_temperature: t_in,
                    mesh,
                    duct,
                };
                solve_assembly(asm, p, boundary, axial)
            })
            .collect::<SolverResult<Vec<_>>>()?;

        let max_change = (!self.results.is_empty()).then(|| duct_change(&self.results, &results));
        let max_duct_difference = face_difference(self.core, &results);
        self.history.push(IterationRecord {
            iteration,
            max_change,
            max_duct_difference,
        });
        debug!(
            iteration,
            ?max_change,
            max_duct_difference,
            relaxation = self.relaxation.omega(),
            "network iteration"
        );

        let mut next = BoundarySnapshot::update(self.core, &self.mesh, &results)?;
        self.relaxation.apply(&self.snapshot, &mut next);
        self.snapshot = next;
        self.results = results;

        let change = max_change.unwrap_or(f64::INFINITY);
        self.state = if self.core.gap_model() == GapModel::None || change <= self.opts.tolerance {
            info!(iterations = iteration, "core converged");
            NetworkState::Converged {
                iterations: iteration,
            }
        } else if iteration >= self.opts.max_iterations {
            warn!(iterations = iteration, max_change = change, "core did not converge");
            NetworkState::Diverged {
                iterations: iteration,
                max_change: change,
            }
        } else {
            NetworkState::Iterating {
                iteration,
                max_change: change,
            }
        };
        Ok(self.state)
    }

    /// Iterate to convergence.
    pub fn run(mut self) -> SolverResult<CoreResult> {
        loop {
            match self.iterate()? {
                NetworkState::Converged { .. } => break,
                NetworkState::Diverged {
                    iterations,
                    max_change,
                } => {
                    return Err(SolverError::CoreConvergenceFailure {
                        iterations,
                        max_change,
                    });
                }
                _ => {}
            }
        }
        Ok(self.finish())
    }

    fn finish(self) -> CoreResult {
        let mut energy = EnergyBalance::default();
        for r in &self.results {
            energy.deposited += r.energy.deposited;
            energy.absorbed += r.energy.absorbed;
            energy.to_gap += r.energy.to_gap;
        }
        let bypass = self.snapshot.bypass;
        if let Some(b) = bypass
            && let Ok(eval) = self
                .core
                .gap_coolant()
                .properties(k(0.5 * (b.outlet_temperature + self.core.inlet_temperature())))
        {
            let picked = b.flow
                * eval.properties.heat_capacity
                * (b.outlet_temperature - self.core.inlet_temperature());
            energy.absorbed += picked;
            energy.to_gap -= picked;
        }
        info!(
            deposited = energy.deposited,
            absorbed = energy.absorbed,
            "core energy balance"
        );
        CoreResult {
            assemblies: self.results,
            state: self.state,
            history: self.history,
            bypass,
            energy,
        }
    }
}

/// Largest change of any per-side duct temperature between two iterations.
fn duct_change(old: &[AssemblyResult], new: &[AssemblyResult]) -> f64 {
    old.iter()
        .zip(new)
        .flat_map(|(a, b)| a.duct_outer.iter().zip(&b.duct_outer))
        .flat_map(|(x, y)| x.iter().zip(y).map(|(p, q)| (p - q).abs()))
        .fold(0.0, f64::max)
}

/// Largest outlet duct temperature difference across any shared face.
fn face_difference(core: &Core, results: &[AssemblyResult]) -> f64 {
    GapFace::all(core)
        .iter()
        .filter_map(|f| {
            let a = results[f.a].duct_outer.last()?[f.side_a];
            let b = results[f.b].duct_outer.last()?[f.side_b];
            Some((a - b).abs())
        })
        .fold(0.0, f64::max)
}

/// Solve the core to convergence.
pub fn solve_core(core: &Core, power: &PowerField, opts: &NetworkOptions) -> SolverResult<CoreResult> {
    NetworkSolver::new(core, power, opts)?.run()
}

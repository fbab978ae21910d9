//! Common axial mesh of the core.
//!
//! All assemblies march on the same nodes so that duct temperatures of
//! neighbors line up. Region boundaries, spacer grids, power mesh edges and
//! requested planes are always nodes; the gaps between them are split
//! uniformly at the smallest stable step of any assembly.

use bf_core::merge_planes;
use bf_power::PowerField;
use tracing::{debug, warn};

use crate::axial::{AxialOptions, stable_step};
use crate::error::{ConfigError, SolverResult};
use crate::reactor::Core;

const PLANE_DECIMALS: i32 = 12;

#[derive(Debug, Clone, PartialEq)]
pub struct AxialMesh {
    nodes: Vec<f64>,
    step: f64,
}

impl AxialMesh {
    pub fn build(core: &Core, power: &PowerField, opts: &AxialOptions) -> SolverResult<Self> {
        let length = core.length();
        let mut step = opts.max_step;
        if let Some(size) = opts.mesh_size {
            step = step.min(size);
        }
        for asm in core.assemblies() {
            step = step.min(stable_step(asm, core.inlet_temperature(), opts)?);
        }
        if !(step.is_finite() && step > 0.0) {
            return Err(ConfigError::InvalidCore {
                what: format!("axial step {} m is not positive", step),
            }
            .into());
        }

        let mut planes = vec![0.0, length];
        for asm in core.assemblies() {
            let g = asm.geometry();
            planes.extend(g.regions().boundaries());
            planes.extend(g.grids().iter().map(|grid| grid.z));
        }
        planes.extend(power.axial_edges().filter(|z| (0.0..=length).contains(z)));
        planes.extend(opts.planes.iter().copied().filter(|z| (0.0..=length).contains(z)));
        let planes = merge_planes(planes, PLANE_DECIMALS);

        Ok(Self::from_planes(&planes, step, opts))
    }

    /// Split each gap between consecutive `planes` into steps no longer than `step`.
    pub fn from_planes(planes: &[f64], step: f64, opts: &AxialOptions) -> Self {
        let mut nodes = Vec::new();
        for w in planes.windows(2) {
            let n = ((w[1] - w[0]) / step).ceil().max(1.0) as usize;
            let h = (w[1] - w[0]) / n as f64;
            nodes.extend((0..n).map(|i| w[0] + i as f64 * h));
        }
        if let Some(&last) = planes.last() {
            nodes.push(last);
        }
        let smallest = nodes
            .windows(2)
            .map(|w| w[1] - w[0])
            .fold(f64::INFINITY, f64::min);
        if smallest < opts.min_step_warning {
            warn!(step = smallest, "axial mesh has a very short step");
        }
        if nodes.len() > opts.max_steps_warning {
            warn!(nodes = nodes.len(), "axial mesh is very fine");
        }
        debug!(nodes = nodes.len(), step, "axial mesh built");
        Self { nodes, step }
    }

    pub fn nodes(&self) -> &[f64] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Target step used to subdivide the planes [m].
    pub fn step(&self) -> f64 {
        self.step
    }

    /// Interval holding `z` and the fraction of the way through it.
    pub fn locate(&self, z: f64) -> (usize, f64) {
        if self.nodes.len() < 2 {
            return (0, 0.0);
        }
        let i = self
            .nodes
            .partition_point(|&n| n <= z)
            .saturating_sub(1)
            .min(self.nodes.len() - 2);
        let (lo, hi) = (self.nodes[i], self.nodes[i + 1]);
        (i, ((z - lo) / (hi - lo)).clamp(0.0, 1.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn planes_are_nodes() {
        let mesh = AxialMesh::from_planes(&[0.0, 0.25, 1.0], 0.1, &AxialOptions::default());
        assert!(mesh.nodes().contains(&0.25));
        assert_eq!(mesh.nodes().first(), Some(&0.0));
        assert_eq!(mesh.nodes().last(), Some(&1.0));
        // 3 steps below the plane, 8 above
        assert_eq!(mesh.len(), 12);
        for w in mesh.nodes().windows(2) {
            assert!(w[1] - w[0] <= 0.1 + 1e-12);
        }
    }

    #[test]
    fn locate_interpolates() {
        let mesh = AxialMesh::from_planes(&[0.0, 1.0], 0.5, &AxialOptions::default());
        assert_eq!(mesh.locate(0.25), (0, 0.5));
        assert_eq!(mesh.locate(1.0), (1, 1.0));
        assert_eq!(mesh.locate(-1.0), (0, 0.0));
    }
}

//! Axial march of one assembly.
//!
//! The coolant energy equation of every subchannel is integrated from inlet
//! to outlet with explicit Euler steps:
//!
//! `m_i·cp·dT_i/dz = Q_i + Σ_j C_ij·(T_j − T_i) + w·cp·(T_up − T_i) + G_i·(T_w − T_i)`
//!
//! with pin and direct heating `Q_i`, eddy mixing plus conduction `C_ij`
//! across each gap, the wire-wrap swirl `w` carried around the perimeter and
//! a quasi-steady duct wall node `T_w` behind each perimeter subchannel.
//! Flow split and mixing parameters are frozen at inlet conditions.
//!
//! Lumped axial regions carry a single mixed-cup temperature.

use bf_core::units::k;
use bf_correlations::{NusseltInput, SubchannelType, pipe_friction};
use bf_materials::{Material, MaterialError, Properties};
use bf_power::AssemblyPower;
use tracing::{debug, warn};

use crate::assembly::Assembly;
use crate::error::{ConfigError, SolverError, SolverResult};
use crate::mesh::AxialMesh;
use crate::pin::{PinNode, PinRadial};
use crate::result::{AssemblyResult, EnergyBalance, HotspotPeaks, RegionPressureDrop};

/// Grid loss positions closer than this to the outlet belong to the last step [m].
const GRID_TOL: f64 = 1e-9;

/// Axial discretization and step control.
#[derive(Debug, Clone, PartialEq)]
pub struct AxialOptions {
    /// Largest axial step [m].
    pub max_step: f64,
    /// Requested uniform step; the stability limit still applies [m].
    pub mesh_size: Option<f64>,
    /// Extra planes that must be mesh nodes [m].
    pub planes: Vec<f64>,
    /// Fraction of the explicit stability limit used as step.
    pub stability_safety: f64,
    /// Largest subchannel temperature change accepted in one step [K].
    pub max_temperature_rise: f64,
    /// Step halvings allowed before the march is declared divergent.
    pub max_refinements: u32,
    pub min_step_warning: f64,
    pub max_steps_warning: usize,
}

impl Default for AxialOptions {
    fn default() -> Self {
        Self {
            max_step: 0.01,
            mesh_size: None,
            planes: Vec::new(),
            stability_safety: 0.5,
            max_temperature_rise: 5.0,
            max_refinements: 10,
            min_step_warning: 0.0005,
            max_steps_warning: 2500,
        }
    }
}

/// Thermal condition outside the duct.
#[derive(Debug, Clone, PartialEq)]
pub struct DuctBoundary {
    /// Outer film coefficient per side [W/(m²·K)]; zero is adiabatic.
    pub conductance: [f64; 6],
    /// Gap temperature per mesh node and side [K].
    pub temperature: Vec<[f64; 6]>,
}

impl DuctBoundary {
    pub fn adiabatic(nodes: usize) -> Self {
        Self {
            conductance: [0.0; 6],
            temperature: vec![[0.0; 6]; nodes],
        }
    }

    pub fn is_adiabatic(&self) -> bool {
        self.conductance.iter().all(|&h| h <= 0.0)
    }

    /// Gap temperatures at `z`, linear between mesh nodes.
    pub fn temperature_at(&self, mesh: &AxialMesh, z: f64) -> [f64; 6] {
        let (node, frac) = mesh.locate(z);
        let Some(lo) = self.temperature.get(node) else {
            return [0.0; 6];
        };
        let hi = self.temperature.get(node + 1).unwrap_or(lo);
        std::array::from_fn(|s| lo[s] + frac * (hi[s] - lo[s]))
    }
}

/// Everything an assembly march needs from the rest of the core.
#[derive(Debug, Clone, Copy)]
pub struct AssemblyBoundary<'a> {
    pub inlet_temperature: f64,
    pub mesh: &'a AxialMesh,
    pub duct: &'a DuctBoundary,
}

/// State carried from one axial position to the next.
#[derive(Debug, Clone, PartialEq)]
pub struct MarchState {
    pub z: f64,
    /// Subchannel temperatures [K].
    pub coolant: Vec<f64>,
    /// Accumulated pressure drop [Pa].
    pub pressure_drop: f64,
    pub energy: EnergyBalance,
}

#[derive(Debug, Clone, Copy)]
struct Link {
    a: usize,
    b: usize,
    /// Eddy mass exchange ρ·ε per unit width [kg/(m·s)].
    eddy: f64,
    /// Gap width over centroid distance.
    shape: f64,
}

#[derive(Debug, Clone)]
struct Segment {
    subchannel: usize,
    inner_length: f64,
    outer_length: f64,
    sides: Vec<(usize, f64)>,
    /// Duct wall Nusselt number at inlet conditions.
    nusselt: f64,
    hydraulic_diameter: f64,
}

/// Flow distribution of a rodded region, frozen at inlet conditions.
#[derive(Debug, Clone)]
struct Channels {
    flow: Vec<f64>,
    area_share: Vec<f64>,
    links: Vec<Link>,
    /// Swirl mass flow per unit length [kg/(m·s)].
    swirl: f64,
    /// Upstream perimeter neighbor for each subchannel.
    upstream: Vec<Option<usize>>,
    segments: Vec<Segment>,
    wall_share: Vec<f64>,
    /// Subchannels touching each pin with their perimeter fraction.
    pin_contacts: Vec<Vec<(usize, f64)>>,
    bundle_reynolds: f64,
    bundle_mass_flux: f64,
    bundle_dh: f64,
    p_over_d: f64,
}

fn channels(asm: &Assembly, inlet: &Properties) -> SolverResult<Channels> {
    let geometry = asm.geometry();
    let mesh = geometry.mesh();
    let params = geometry.bundle_params();
    let corr = asm.correlations();
    let m = asm.flow_rate();
    if !(m.is_finite() && m > 0.0) {
        return Err(ConfigError::InvalidAssembly {
            assembly: asm.name().to_string(),
            what: format!("flow rate {} must be positive", m),
        }
        .into());
    }
    let mu = inlet.viscosity.value;
    let area = mesh.total_area();
    let dh = params.hydraulic_diameter();
    let g_bundle = m / area;
    let re = g_bundle * dh / mu;

    let ratio = (corr.flow_split.eval)(&params, re);
    let weights: Vec<f64> = mesh
        .subchannels()
        .iter()
        .map(|s| ratio[s.kind.slot()] * s.area)
        .collect();
    let total: f64 = weights.iter().sum();
    let flow: Vec<f64> = weights.iter().map(|w| m * w / total).collect();
    let mass_flux: Vec<f64> = flow
        .iter()
        .zip(mesh.subchannels())
        .map(|(f, s)| f / s.area)
        .collect();

    let mixing = (corr.mixing.eval)(&params, re);
    let links = mesh
        .connections()
        .iter()
        .map(|c| Link {
            a: c.a,
            b: c.b,
            eddy: mixing.eddy * params.pin_diameter * 0.5 * (mass_flux[c.a] + mass_flux[c.b]),
            shape: c.gap / c.distance,
        })
        .collect();

    let edge_flux = ratio[SubchannelType::Edge.slot()] * g_bundle;
    let swirl_gap = mesh.wall_distance() - params.pin_diameter / 2.0;
    let perimeter = mesh.perimeter();
    let mut upstream = vec![None; mesh.len()];
    if perimeter.len() > 1 {
        for (i, &s) in perimeter.iter().enumerate() {
            upstream[s] = Some(perimeter[(i + perimeter.len() - 1) % perimeter.len()]);
        }
    }

    let pr = inlet.prandtl();
    let scale = geometry.outer_ftf() / geometry.inner_ftf();
    let segments: Vec<Segment> = mesh
        .segments()
        .iter()
        .map(|seg| {
            let sub = &mesh.subchannels()[seg.subchannel];
            let dh = sub.hydraulic_diameter();
            let input = NusseltInput {
                reynolds: mass_flux[seg.subchannel] * dh / mu,
                prandtl: pr,
                p_over_d: params.p_over_d(),
            };
            Segment {
                subchannel: seg.subchannel,
                inner_length: seg.length,
                outer_length: seg.length * scale,
                sides: seg.sides.clone(),
                nusselt: (corr.duct_htc.eval)(input),
                hydraulic_diameter: dh,
            }
        })
        .collect();
    let wall_total: f64 = segments.iter().map(|s| s.inner_length).sum();
    let wall_share = segments
        .iter()
        .map(|s| s.inner_length / wall_total)
        .collect();

    let mut pin_contacts = vec![Vec::new(); geometry.n_pins()];
    for (i, sub) in mesh.subchannels().iter().enumerate() {
        for c in &sub.pins {
            pin_contacts[c.pin].push((i, c.fraction));
        }
    }

    Ok(Channels {
        flow,
        area_share: mesh.subchannels().iter().map(|s| s.area / area).collect(),
        links,
        swirl: mixing.swirl * edge_flux * swirl_gap,
        upstream,
        segments,
        wall_share,
        pin_contacts,
        bundle_reynolds: re,
        bundle_mass_flux: g_bundle,
        bundle_dh: dh,
        p_over_d: params.p_over_d(),
    })
}

/// Largest stable explicit step for an assembly at inlet conditions [m].
pub(crate) fn stable_step(asm: &Assembly, t_in: f64, opts: &AxialOptions) -> SolverResult<f64> {
    let props = asm
        .materials()
        .coolant
        .properties(k(t_in))
        .map_err(ConfigError::from)?
        .properties;
    let ch = channels(asm, &props)?;
    let duct_k = asm
        .materials()
        .duct
        .properties(k(t_in))
        .map_err(ConfigError::from)?
        .properties
        .conductivity;
    let thickness = asm.geometry().duct_thickness();
    let mut coupling = vec![0.0; ch.flow.len()];
    for l in &ch.links {
        let c = (props.heat_capacity * l.eddy + props.conductivity) * l.shape;
        coupling[l.a] += c;
        coupling[l.b] += c;
    }
    for (i, up) in ch.upstream.iter().enumerate() {
        if up.is_some() {
            coupling[i] += props.heat_capacity * ch.swirl;
        }
    }
    for seg in &ch.segments {
        let h = seg.nusselt * props.conductivity / seg.hydraulic_diameter;
        coupling[seg.subchannel] += seg.inner_length / (1.0 / h + thickness / (2.0 * duct_k));
    }
    let step = ch
        .flow
        .iter()
        .zip(&coupling)
        .filter(|(_, c)| **c > 0.0)
        .map(|(m, c)| opts.stability_safety * m * props.heat_capacity / c)
        .fold(f64::INFINITY, f64::min);
    Ok(step)
}

/// Heat sources of one mesh interval [W/m].
struct Sources {
    subchannel: Vec<f64>,
    duct: Vec<f64>,
    total: f64,
}

struct Marcher<'a> {
    asm: &'a Assembly,
    power: &'a AssemblyPower,
    boundary: AssemblyBoundary<'a>,
    opts: &'a AxialOptions,
    ch: Channels,
    thickness: f64,
    warned: bool,
    steps: usize,
    hot_clad: Option<f64>,
    hot_fuel: Option<f64>,
}

/// Duct wall temperatures and heat flows for one coolant state.
struct DuctState {
    /// Mid-wall temperature per segment [K].
    mid: Vec<f64>,
    /// Heat into each segment's subchannel [W/m].
    to_coolant: Vec<f64>,
    /// Heat leaving to the gap [W/m].
    to_gap: f64,
}

impl<'a> Marcher<'a> {
    fn diverged(&self, z: f64, reason: impl Into<String>) -> SolverError {
        SolverError::AxialStepDivergence {
            assembly: self.asm.name().to_string(),
            z,
            reason: reason.into(),
        }
    }

    fn properties(&mut self, material: &Material, t: f64, z: f64) -> SolverResult<Properties> {
        match material.properties(k(t)) {
            Ok(eval) => {
                if !self.warned
                    && let Some(e) = eval.out_of_range(material.name(), k(t))
                {
                    warn!(assembly = self.asm.name(), z, "{}", e);
                    self.warned = true;
                }
                Ok(eval.properties)
            }
            Err(e @ MaterialError::NonPhysical { .. }) => Err(self.diverged(z, e.to_string())),
            Err(e) => Err(ConfigError::from(e).into()),
        }
    }

    fn bulk(&self, coolant: &[f64]) -> f64 {
        let m: f64 = self.ch.flow.iter().sum();
        coolant.iter().zip(&self.ch.flow).map(|(t, f)| t * f).sum::<f64>() / m
    }

    fn sources(&self, z: f64, lumped: bool) -> Sources {
        let p = self.power;
        let n = self.ch.flow.len();
        let mut subchannel = vec![0.0; n];
        let mut pins = 0.0;
        for (pin, contacts) in self.ch.pin_contacts.iter().enumerate() {
            let q = p.pin_linear(pin, z);
            pins += q;
            if !lumped {
                for &(s, frac) in contacts {
                    subchannel[s] += frac * q;
                }
            }
        }
        let q_coolant = p.coolant_linear(z);
        if lumped {
            subchannel[0] = pins + q_coolant;
        } else {
            for (q, share) in subchannel.iter_mut().zip(&self.ch.area_share) {
                *q += share * q_coolant;
            }
        }
        let q_duct = p.duct_linear(z);
        Sources {
            subchannel,
            duct: self.ch.wall_share.iter().map(|s| s * q_duct).collect(),
            total: pins + q_coolant + q_duct,
        }
    }

    /// Film coefficients at the duct inner wall per segment [W/(m²·K)].
    fn duct_films(&self, coolant: &Properties, lumped: Option<(f64, f64)>) -> Vec<f64> {
        match lumped {
            Some((nusselt, dh)) => vec![nusselt * coolant.conductivity / dh; self.ch.segments.len()],
            None => self
                .ch
                .segments
                .iter()
                .map(|s| s.nusselt * coolant.conductivity / s.hydraulic_diameter)
                .collect(),
        }
    }

    /// Outer conductance `1/(t/2k + 1/h)` per side [W/(m²·K)].
    fn outer_conductance(&self, duct_k: f64) -> [f64; 6] {
        let half = self.thickness / (2.0 * duct_k);
        self.boundary
            .duct
            .conductance
            .map(|h| if h > 0.0 { 1.0 / (half + 1.0 / h) } else { 0.0 })
    }

    fn duct_state(
        &self,
        coolant: &[f64],
        z: f64,
        films: &[f64],
        duct_k: f64,
        heating: &[f64],
    ) -> DuctState {
        let half = self.thickness / (2.0 * duct_k);
        let outer = self.outer_conductance(duct_k);
        let gap = self.boundary.duct.temperature_at(self.boundary.mesh, z);
        let mut mid = Vec::with_capacity(self.ch.segments.len());
        let mut to_coolant = Vec::with_capacity(self.ch.segments.len());
        let mut to_gap = 0.0;
        for ((seg, h), q) in self.ch.segments.iter().zip(films).zip(heating) {
            let t_c = coolant[seg.subchannel];
            let g_in = seg.inner_length / (1.0 / h + half);
            let mut num = g_in * t_c + q;
            let mut den = g_in;
            for &(side, share) in &seg.sides {
                let g = outer[side] * share * seg.outer_length;
                num += g * gap[side];
                den += g;
            }
            let t_w = num / den;
            for &(side, share) in &seg.sides {
                to_gap += outer[side] * share * seg.outer_length * (t_w - gap[side]);
            }
            mid.push(t_w);
            to_coolant.push(g_in * (t_w - t_c));
        }
        DuctState {
            mid,
            to_coolant,
            to_gap,
        }
    }

    /// One explicit step of length `h` from `state`. Returns the largest
    /// temperature change.
    fn step(
        &mut self,
        state: &mut MarchState,
        h: f64,
        sources: &Sources,
        lumped: Option<(f64, f64)>,
    ) -> SolverResult<f64> {
        let z = state.z;
        let asm = self.asm;
        let materials = asm.materials();
        let bulk = self.bulk(&state.coolant);
        let coolant = self.properties(&materials.coolant, bulk, z)?;
        let duct_k = self.properties(&materials.duct, bulk, z)?.conductivity;
        let cp = coolant.heat_capacity;
        let films = self.duct_films(&coolant, lumped);
        let duct = self.duct_state(&state.coolant, z, &films, duct_k, &sources.duct);

        let m_total: f64 = self.ch.flow.iter().sum();
        let mut rate = vec![0.0; state.coolant.len()];
        match lumped {
            Some(_) => {
                let q = sources.subchannel[0] + duct.to_coolant.iter().sum::<f64>();
                rate.fill(q / (m_total * cp));
            }
            None => {
                let t = &state.coolant;
                let mut heat = sources.subchannel.clone();
                for l in &self.ch.links {
                    let q = (cp * l.eddy + coolant.conductivity) * l.shape * (t[l.b] - t[l.a]);
                    heat[l.a] += q;
                    heat[l.b] -= q;
                }
                for (i, up) in self.ch.upstream.iter().enumerate() {
                    if let Some(u) = *up {
                        heat[i] += self.ch.swirl * cp * (t[u] - t[i]);
                    }
                }
                for (seg, q) in self.ch.segments.iter().zip(&duct.to_coolant) {
                    heat[seg.subchannel] += q;
                }
                for ((r, q), m) in rate.iter_mut().zip(&heat).zip(&self.ch.flow) {
                    *r = q / (m * cp);
                }
            }
        }

        let mut max_change: f64 = 0.0;
        let mut absorbed = 0.0;
        for ((t, r), m) in state.coolant.iter_mut().zip(&rate).zip(&self.ch.flow) {
            let dt = r * h;
            if !dt.is_finite() {
                return Err(self.diverged(z, "non-finite coolant temperature"));
            }
            *t += dt;
            absorbed += m * cp * dt;
            max_change = max_change.max(dt.abs());
        }
        if state.coolant.iter().any(|&t| t <= 0.0) {
            return Err(self.diverged(z, "coolant temperature fell below 0 K"));
        }
        state.energy.absorbed += absorbed;
        state.energy.deposited += sources.total * h;
        state.energy.to_gap += duct.to_gap * h;
        state.z += h;
        self.steps += 1;
        Ok(max_change)
    }

    /// Advance over one mesh interval, halving the step while the
    /// temperature change per step is too large.
    fn interval(
        &mut self,
        state: &MarchState,
        z1: f64,
        region: usize,
    ) -> SolverResult<MarchState> {
        let asm = self.asm;
        let geometry = asm.geometry();
        let lumped = geometry.regions().get(region).and_then(|r| {
            if r.is_rodded() {
                return None;
            }
            let dh = geometry.hydraulic_diameter(region);
            Some((geometry.flow_area(region), dh))
        });
        let z0 = state.z;
        if let Some((area, dh)) = lumped
            && !(area > 0.0 && area.is_finite() && dh > 0.0 && dh.is_finite())
        {
            return Err(self.diverged(z0, format!("non-positive flow area {area} m²")));
        }
        let length = z1 - z0;
        let sources = self.sources(0.5 * (z0 + z1), lumped.is_some());

        let mut start = state.clone();
        let films = match lumped {
            Some((area, dh)) => {
                let bulk = self.bulk(&start.coolant);
                start.coolant.fill(bulk);
                let props = self.properties(&asm.materials().coolant, bulk, z0)?;
                let re = asm.flow_rate() / area * dh / props.viscosity.value;
                let nu = (asm.correlations().duct_htc.eval)(NusseltInput {
                    reynolds: re,
                    prandtl: props.prandtl(),
                    p_over_d: self.ch.p_over_d,
                });
                Some((nu, dh))
            }
            None => None,
        };

        let mut substeps = 1usize;
        for _ in 0..=self.opts.max_refinements {
            let h = length / substeps as f64;
            let mut trial = start.clone();
            let mut accepted = true;
            for _ in 0..substeps {
                let change = self.step(&mut trial, h, &sources, films)?;
                if change > self.opts.max_temperature_rise {
                    accepted = false;
                    break;
                }
            }
            if accepted {
                trial.z = z1;
                return Ok(trial);
            }
            substeps *= 2;
            debug!(assembly = self.asm.name(), z = z0, substeps, "refining axial step");
        }
        Err(self.diverged(
            z0,
            format!(
                "temperature change per step above {} K after {} refinements",
                self.opts.max_temperature_rise, self.opts.max_refinements
            ),
        ))
    }
}

/// Per-interval pressure losses [Pa].
struct Losses {
    friction: f64,
    grids: f64,
    gravity: f64,
}

fn losses(
    asm: &Assembly,
    ch: &Channels,
    props: &Properties,
    region: usize,
    z0: f64,
    z1: f64,
    last: bool,
) -> SolverResult<Losses> {
    let geometry = asm.geometry();
    let rho = props.density.value;
    let mu = props.viscosity.value;
    let h = z1 - z0;
    let (mass_flux, dh, f) = match geometry.regions().get(region) {
        Some(r) if !r.is_rodded() => {
            let area = geometry.flow_area(region);
            if !(area > 0.0 && area.is_finite()) {
                return Err(SolverError::AxialStepDivergence {
                    assembly: asm.name().to_string(),
                    z: z0,
                    reason: format!("non-positive flow area {area} m² in region '{}'", r.name),
                });
            }
            let g = asm.flow_rate() / area;
            let dh = geometry.hydraulic_diameter(region);
            (g, dh, pipe_friction(g * dh / mu))
        }
        _ => {
            let g = ch.bundle_mass_flux;
            let re = g * ch.bundle_dh / mu;
            let params = geometry.bundle_params();
            (g, ch.bundle_dh, (asm.correlations().friction.eval)(&params, re))
        }
    };
    let re = mass_flux * dh / mu;
    let velocity = mass_flux / rho;
    let mut grids = 0.0;
    for g in geometry.grids() {
        let inside = g.z >= z0 - GRID_TOL && g.z < z1 - GRID_TOL;
        let at_outlet = last && (g.z - z1).abs() <= GRID_TOL;
        if inside || at_outlet {
            grids += g.loss.pressure_drop(re, rho, velocity)?;
        }
    }
    Ok(Losses {
        friction: f * h / dh * mass_flux * mass_flux / (2.0 * rho),
        grids,
        gravity: asm.correlations().gravity.head_loss(rho, h),
    })
}

/// Rows of the assembly result, one per mesh node.
#[derive(Default)]
struct Profiles {
    z: Vec<f64>,
    coolant: Vec<Vec<f64>>,
    bulk: Vec<f64>,
    duct_outer: Vec<[f64; 6]>,
    clad: Vec<Option<f64>>,
    fuel: Vec<Option<f64>>,
}

impl Marcher<'_> {
    fn record(&mut self, state: &MarchState, out: &mut Profiles) -> SolverResult<()> {
        let z = state.z;
        let asm = self.asm;
        let geometry = asm.geometry();
        let region = geometry.regions().index_at(z);
        let rodded = geometry.regions().get(region).is_none_or(|r| r.is_rodded());
        let bulk = self.bulk(&state.coolant);
        let coolant = self.properties(&asm.materials().coolant, bulk, z)?;
        let duct_k = self.properties(&asm.materials().duct, bulk, z)?.conductivity;

        let lumped = if rodded {
            None
        } else {
            let dh = geometry.hydraulic_diameter(region);
            let re = asm.flow_rate() / geometry.flow_area(region) * dh / coolant.viscosity.value;
            let nu = (asm.correlations().duct_htc.eval)(NusseltInput {
                reynolds: re,
                prandtl: coolant.prandtl(),
                p_over_d: self.ch.p_over_d,
            });
            Some((nu, dh))
        };
        let films = self.duct_films(&coolant, lumped);
        let heating: Vec<f64> = self
            .ch
            .wall_share
            .iter()
            .map(|s| s * self.power.duct_linear(z))
            .collect();
        let duct = self.duct_state(&state.coolant, z, &films, duct_k, &heating);
        let outer = self.outer_conductance(duct_k);
        let gap = self.boundary.duct.temperature_at(self.boundary.mesh, z);
        let half = self.thickness / (2.0 * duct_k);
        let mut sum = [0.0; 6];
        let mut len = [0.0; 6];
        for (seg, t_w) in self.ch.segments.iter().zip(&duct.mid) {
            for &(side, share) in &seg.sides {
                let t_o = t_w - outer[side] * (t_w - gap[side]) * half;
                let l = share * seg.outer_length;
                sum[side] += l * t_o;
                len[side] += l;
            }
        }
        let duct_outer = std::array::from_fn(|s| if len[s] > 0.0 { sum[s] / len[s] } else { bulk });

        let (clad, fuel) = if rodded {
            self.pin_peaks(state, &coolant)?
        } else {
            (None, None)
        };

        out.z.push(z);
        out.coolant.push(state.coolant.clone());
        out.bulk.push(bulk);
        out.duct_outer.push(duct_outer);
        out.clad.push(clad);
        out.fuel.push(fuel);
        Ok(())
    }

    fn pin_peaks(
        &mut self,
        state: &MarchState,
        coolant: &Properties,
    ) -> SolverResult<(Option<f64>, Option<f64>)> {
        let z = state.z;
        let asm = self.asm;
        let bundle = asm.geometry().bundle();
        let materials = asm.materials();
        let radial = PinRadial::new(
            &materials.clad,
            materials.pin.as_ref(),
            bundle.clad_outer_radius(),
            bundle.clad_inner_radius(),
        );
        let nu = (asm.correlations().nusselt.eval)(NusseltInput {
            reynolds: self.ch.bundle_reynolds,
            prandtl: coolant.prandtl(),
            p_over_d: self.ch.p_over_d,
        });
        let film = nu * coolant.conductivity / self.ch.bundle_dh;
        let t_in = self.boundary.inlet_temperature;
        let mut clad: Option<f64> = None;
        let mut fuel: Option<f64> = None;
        let mut hot: (Option<f64>, Option<f64>) = (None, None);
        for (pin, contacts) in self.ch.pin_contacts.iter().enumerate() {
            let weight: f64 = contacts.iter().map(|c| c.1).sum();
            if weight <= 0.0 {
                continue;
            }
            let t_c = contacts
                .iter()
                .map(|&(s, f)| f * state.coolant[s])
                .sum::<f64>()
                / weight;
            let q = self.power.pin_linear(pin, z);
            let node: PinNode = radial
                .solve(t_c, q, self.power.fuel_share(), film)
                .map_err(|e| self.diverged(z, e.to_string()))?;
            clad = Some(clad.map_or(node.clad_mid, |c| c.max(node.clad_mid)));
            if let Some(f) = node.fuel_centerline {
                fuel = Some(fuel.map_or(f, |x| x.max(f)));
            }
            if let Some(h) = asm.hotspot() {
                let c = h.clad_midwall(t_in, &node);
                hot.0 = Some(hot.0.map_or(c, |x| x.max(c)));
                if let Some(f) = h.fuel_centerline(t_in, &node) {
                    hot.1 = Some(hot.1.map_or(f, |x| x.max(f)));
                }
            }
        }
        if let Some(c) = hot.0 {
            self.hot_clad = Some(self.hot_clad.map_or(c, |x| x.max(c)));
        }
        if let Some(f) = hot.1 {
            self.hot_fuel = Some(self.hot_fuel.map_or(f, |x| x.max(f)));
        }
        Ok((clad, fuel))
    }
}

/// March one assembly from inlet to outlet.
pub fn solve_assembly(
    asm: &Assembly,
    power: &AssemblyPower,
    boundary: AssemblyBoundary<'_>,
    opts: &AxialOptions,
) -> SolverResult<AssemblyResult> {
    let t_in = boundary.inlet_temperature;
    let inlet = asm
        .materials()
        .coolant
        .properties(k(t_in))
        .map_err(ConfigError::from)?
        .properties;
    let ch = channels(asm, &inlet)?;
    let n = ch.flow.len();
    let mut marcher = Marcher {
        asm,
        power,
        boundary,
        opts,
        ch,
        thickness: asm.geometry().duct_thickness(),
        warned: false,
        steps: 0,
        hot_clad: None,
        hot_fuel: None,
    };

    let nodes = boundary.mesh.nodes();
    let geometry = asm.geometry();
    let mut regions: Vec<RegionPressureDrop> = geometry
        .regions()
        .iter()
        .map(|r| RegionPressureDrop {
            name: r.name.clone(),
            friction: 0.0,
            grids: 0.0,
            gravity: 0.0,
            total: 0.0,
        })
        .collect();

    let mut state = MarchState {
        z: nodes.first().copied().unwrap_or(0.0),
        coolant: vec![t_in; n],
        pressure_drop: 0.0,
        energy: EnergyBalance::default(),
    };
    let mut profiles = Profiles::default();
    marcher.record(&state, &mut profiles)?;
    for (i, w) in nodes.windows(2).enumerate() {
        let (z0, z1) = (w[0], w[1]);
        let region = geometry.regions().index_at(0.5 * (z0 + z1));
        state = marcher.interval(&state, z1, region)?;
        let bulk = marcher.bulk(&state.coolant);
        let props = marcher.properties(&asm.materials().coolant, bulk, z1)?;
        let last = i + 2 == nodes.len();
        let dp = losses(asm, &marcher.ch, &props, region, z0, z1, last)?;
        if let Some(r) = regions.get_mut(region) {
            r.friction += dp.friction;
            r.grids += dp.grids;
            r.gravity += dp.gravity;
            r.total += dp.friction + dp.grids + dp.gravity;
        }
        state.pressure_drop += dp.friction + dp.grids + dp.gravity;
        marcher.record(&state, &mut profiles)?;
    }

    let steps = marcher.steps;
    if steps > opts.max_steps_warning {
        warn!(assembly = asm.name(), steps, "axial march needed many steps");
    }
    debug!(
        assembly = asm.name(),
        steps,
        outlet = profiles.bulk.last().copied().unwrap_or(t_in),
        dp = state.pressure_drop,
        "assembly solved"
    );

    let hotspot = marcher.hot_clad.map(|clad_midwall| HotspotPeaks {
        clad_midwall,
        fuel_centerline: marcher.hot_fuel,
    });
    Ok(AssemblyResult {
        name: asm.name().to_string(),
        flow_rate: asm.flow_rate(),
        z: profiles.z,
        coolant: profiles.coolant,
        bulk: profiles.bulk,
        duct_outer: profiles.duct_outer,
        peak_clad_mid: profiles.clad,
        peak_fuel_centerline: profiles.fuel,
        hotspot,
        pressure_drop: state.pressure_drop,
        regions,
        energy: state.energy,
        steps,
    })
}

//! Orificing: per-group flow rates that meet temperature limits.
//!
//! Groups are visited in order, `passes` times. For each temperature-limited
//! group the member flow is bracketed around an energy-balance estimate and
//! bisected on full-core solves until the group's limiting temperature lands
//! in `[limit − tolerance, limit]`. Temperature falls with flow, so the
//! search keeps the lowest flow found that satisfies the limit.

use bf_core::units::k;
use bf_power::PowerField;
use tracing::{debug, info, warn};

use crate::error::{ConfigError, OptimizerWarning, SolverError, SolverResult};
use crate::network::{NetworkOptions, solve_core};
use crate::reactor::{Core, GroupConstraint, LimitQuantity};
use crate::result::CoreResult;

#[derive(Debug, Clone, PartialEq)]
pub struct OrificingOptions {
    /// Accepted band below the limit [K].
    pub tolerance: f64,
    /// Core solves allowed per group and pass.
    pub max_trials: usize,
    /// Sweeps over all groups.
    pub passes: usize,
    /// Per-assembly flow bounds [kg/s].
    pub min_flow: f64,
    pub max_flow: f64,
    /// Initial bracket is the estimate divided and multiplied by this.
    pub bracket_factor: f64,
}

impl Default for OrificingOptions {
    fn default() -> Self {
        Self {
            tolerance: 1.0,
            max_trials: 40,
            passes: 2,
            min_flow: 1e-3,
            max_flow: 1e3,
            bracket_factor: 2.0,
        }
    }
}

/// One core solve of the search.
#[derive(Debug, Clone, PartialEq)]
pub struct TrialRecord {
    pub group: String,
    pub pass: usize,
    pub flow: f64,
    /// Limiting temperature; infinite when the solve failed [K].
    pub temperature: f64,
    /// The march or the core iteration failed; the flow counts as too low.
    pub diverged: bool,
    pub accepted: bool,
}

#[derive(Debug, Clone)]
pub struct OrificingResult {
    /// Per-assembly flow of each group, in group order [kg/s].
    pub group_flows: Vec<(String, f64)>,
    pub trials: Vec<TrialRecord>,
    pub warnings: Vec<OptimizerWarning>,
    /// Final solve with the chosen flows.
    pub result: CoreResult,
    pub core: Core,
}

struct Search<'a> {
    power: &'a PowerField,
    network: &'a NetworkOptions,
    trials: Vec<TrialRecord>,
}

impl Search<'_> {
    /// Limiting temperature of `group` with its members at `flow`.
    fn evaluate(
        &mut self,
        core: &Core,
        group: usize,
        quantity: LimitQuantity,
        flow: f64,
        pass: usize,
    ) -> SolverResult<f64> {
        let trial = core.with_group_flow(group, flow);
        let g = &core.groups()[group];
        let (temperature, diverged) = match solve_core(&trial, self.power, self.network) {
            Ok(result) => (
                result
                    .limiting_value(&g.members, quantity)
                    .unwrap_or(f64::INFINITY),
                false,
            ),
            Err(
                e @ (SolverError::AxialStepDivergence { .. }
                | SolverError::CoreConvergenceFailure { .. }),
            ) => {
                warn!(group = %g.name, flow, "orificing trial failed: {}", e);
                (f64::INFINITY, true)
            }
            Err(e) => return Err(e),
        };
        debug!(group = %g.name, flow, temperature, "orificing trial");
        self.trials.push(TrialRecord {
            group: g.name.clone(),
            pass,
            flow,
            temperature,
            diverged,
            accepted: false,
        });
        Ok(temperature)
    }

    fn accept_last(&mut self) {
        if let Some(t) = self.trials.last_mut() {
            t.accepted = true;
        }
    }
}

fn estimate_flow(core: &Core, power: &PowerField, group: usize, limit: f64) -> SolverResult<f64> {
    let g = &core.groups()[group];
    let t_in = core.inlet_temperature();
    let q: f64 = g
        .members
        .iter()
        .filter_map(|&m| power.get(m))
        .map(|p| p.total_power())
        .sum::<f64>()
        / g.members.len() as f64;
    let coolant = &core.assemblies()[g.members[0]].materials().coolant;
    let cp = coolant
        .properties(k(0.5 * (t_in + limit)))
        .map_err(ConfigError::from)?
        .properties
        .heat_capacity;
    Ok(q / (cp * (limit - t_in)))
}

/// Search group flow rates, then solve the core with them.
pub fn optimize(
    core: &Core,
    power: &PowerField,
    opts: &OrificingOptions,
    network: &NetworkOptions,
) -> SolverResult<OrificingResult> {
    if !(opts.min_flow > 0.0 && opts.max_flow > opts.min_flow && opts.bracket_factor > 1.0) {
        return Err(ConfigError::InvalidCore {
            what: "orificing flow bounds must satisfy 0 < min < max and a bracket factor above 1"
                .into(),
        }
        .into());
    }
    let mut core = core.clone();
    let mut search = Search {
        power,
        network,
        trials: Vec::new(),
    };
    let mut warnings = Vec::new();
    let mut chosen: Vec<Option<f64>> = vec![None; core.groups().len()];

    for pass in 1..=opts.passes.max(1) {
        for gi in 0..core.groups().len() {
            let g = core.groups()[gi].clone();
            let GroupConstraint::TemperatureLimit { quantity, limit } = g.constraint else {
                continue;
            };
            let q: f64 = g
                .members
                .iter()
                .filter_map(|&m| power.get(m))
                .map(|p| p.total_power())
                .sum();
            if q <= 0.0 {
                info!(group = %g.name, "group is unheated, flow left unchanged");
                continue;
            }

            let start = search.trials.len();
            let budget = opts.max_trials.max(2);
            let used = |s: &Search| s.trials.len() - start;
            let clamp = |m: f64| m.clamp(opts.min_flow, opts.max_flow);

            let guess = match chosen[gi] {
                Some(m) => m,
                None => estimate_flow(&core, power, gi, limit)?,
            };
            let mut lo = clamp(guess / opts.bracket_factor);
            let mut hi = clamp(guess * opts.bracket_factor);
            let mut t_hi = search.evaluate(&core, gi, quantity, hi, pass)?;
            while t_hi > limit && hi < opts.max_flow && used(&search) < budget {
                lo = hi;
                hi = clamp(hi * opts.bracket_factor);
                t_hi = search.evaluate(&core, gi, quantity, hi, pass)?;
            }
            let mut best = (t_hi <= limit).then_some((hi, t_hi));
            if let Some((_, t)) = best
                && t >= limit - opts.tolerance
            {
                search.accept_last();
            } else if best.is_some() {
                let mut t_lo = search.evaluate(&core, gi, quantity, lo, pass)?;
                while t_lo < limit - opts.tolerance && lo > opts.min_flow && used(&search) < budget {
                    hi = lo;
                    best = Some((lo, t_lo));
                    lo = clamp(lo / opts.bracket_factor);
                    t_lo = search.evaluate(&core, gi, quantity, lo, pass)?;
                }
                if (limit - opts.tolerance..=limit).contains(&t_lo) {
                    best = Some((lo, t_lo));
                    search.accept_last();
                } else if t_lo <= limit {
                    best = Some((lo, t_lo));
                } else {
                    loop {
                        if used(&search) >= budget {
                            break;
                        }
                        let mid = 0.5 * (lo + hi);
                        let t = search.evaluate(&core, gi, quantity, mid, pass)?;
                        if t > limit {
                            lo = mid;
                        } else {
                            best = Some((mid, t));
                            if t >= limit - opts.tolerance {
                                search.accept_last();
                                break;
                            }
                            hi = mid;
                        }
                    }
                }
            }

            let accepted = search.trials[start..].iter().any(|t| t.accepted);
            let (flow, temperature) = best.unwrap_or((hi, t_hi));
            if !accepted {
                warn!(group = %g.name, flow, temperature, limit, "orificing tolerance not met");
                warnings.retain(|w: &OptimizerWarning| {
                    !matches!(w, OptimizerWarning::ToleranceNotMet { group, .. } if *group == g.name)
                });
                warnings.push(OptimizerWarning::ToleranceNotMet {
                    group: g.name.clone(),
                    flow_rate: flow,
                    temperature,
                    limit,
                    trials: used(&search),
                });
            } else {
                warnings.retain(|w: &OptimizerWarning| {
                    !matches!(w, OptimizerWarning::ToleranceNotMet { group, .. } if *group == g.name)
                });
            }
            info!(group = %g.name, pass, flow, temperature, "group flow chosen");
            chosen[gi] = Some(flow);
            core = core.with_group_flow(gi, flow);
        }
    }

    let result = solve_core(&core, power, network)?;
    let group_flows = core
        .groups()
        .iter()
        .map(|g| {
            let flow = g
                .members
                .first()
                .map_or(0.0, |&m| core.assemblies()[m].flow_rate());
            (g.name.clone(), flow)
        })
        .collect();
    Ok(OrificingResult {
        group_flows,
        trials: search.trials,
        warnings,
        result,
        core,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assembly::fixtures::assembly;
    use crate::layout::ring_position;
    use crate::reactor::{CoreBuilder, FlowAssignment, GapModel};
    use bf_power::AssemblyPower;

    fn coupled() -> (Core, PowerField) {
        let heated = |w: f64| {
            AssemblyPower::new(vec![0.0, 1.0], 61, vec![w / 61.0; 61], vec![0.0], vec![0.0], 1.0)
                .unwrap()
        };
        let power = PowerField::new(vec![heated(3.0e5), heated(1.0e5)]);
        let core = CoreBuilder::new(623.0, 0.065)
            .gap_model(GapModel::NoFlow)
            .assembly(assembly("a", ring_position(1, 1).unwrap(), 1.0), FlowAssignment::Rate(4.0))
            .assembly(assembly("b", ring_position(2, 1).unwrap(), 1.0), FlowAssignment::Rate(4.0))
            .group(
                "a",
                GroupConstraint::TemperatureLimit {
                    quantity: LimitQuantity::PeakCoolant,
                    limit: 750.0,
                },
                ["a"],
            )
            .build(&power)
            .unwrap();
        (core, power)
    }

    #[test]
    fn unconverged_trial_counts_as_too_hot() {
        let (core, power) = coupled();
        let network = NetworkOptions {
            max_iterations: 1,
            ..NetworkOptions::default()
        };
        let mut search = Search {
            power: &power,
            network: &network,
            trials: Vec::new(),
        };
        let t = search
            .evaluate(&core, 0, LimitQuantity::PeakCoolant, 4.0, 1)
            .unwrap();
        assert!(t.is_infinite());
        assert_eq!(search.trials.len(), 1);
        assert!(search.trials[0].diverged);
        assert!(!search.trials[0].accepted);
    }

    #[test]
    fn converged_trial_is_not_flagged() {
        let (core, power) = coupled();
        let network = NetworkOptions::default();
        let mut search = Search {
            power: &power,
            network: &network,
            trials: Vec::new(),
        };
        let t = search
            .evaluate(&core, 0, LimitQuantity::PeakCoolant, 4.0, 1)
            .unwrap();
        assert!(t.is_finite() && t > 623.0);
        assert!(!search.trials[0].diverged);
    }

    #[test]
    fn bad_bounds_rejected() {
        let (core, power) = coupled();
        let opts = OrificingOptions {
            min_flow: 2.0,
            max_flow: 1.0,
            ..OrificingOptions::default()
        };
        let err = optimize(&core, &power, &opts, &NetworkOptions::default()).unwrap_err();
        assert!(matches!(err, SolverError::Config(ConfigError::InvalidCore { .. })));
    }
}

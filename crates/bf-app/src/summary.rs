//! Run summaries for terminal and JSON output.

use std::fmt::Write as _;

use bf_solver::{CoreResult, NetworkState, OrificingResult};
use serde::Serialize;

use crate::run_service::RunMode;

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct AssemblyRow {
    pub name: String,
    pub flow_rate_kg_per_s: f64,
    pub outlet_temperature_k: f64,
    pub peak_coolant_k: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub peak_clad_midwall_k: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub peak_fuel_centerline_k: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hotspot_clad_midwall_k: Option<f64>,
    pub pressure_drop_pa: f64,
    pub energy_error: f64,
    pub axial_steps: usize,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct GroupRow {
    pub name: String,
    pub flow_rate_kg_per_s: f64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RunSummary {
    pub project: String,
    pub mode: String,
    /// RFC 3339, UTC.
    pub timestamp: String,
    pub status: String,
    pub iterations: usize,
    pub mixed_outlet_temperature_k: f64,
    pub deposited_power_w: f64,
    pub absorbed_power_w: f64,
    pub energy_error: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bypass_flow_kg_per_s: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bypass_outlet_temperature_k: Option<f64>,
    pub assemblies: Vec<AssemblyRow>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub groups: Vec<GroupRow>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
    pub wall_time_s: f64,
}

fn status(state: NetworkState) -> (String, usize) {
    match state {
        NetworkState::Converged { iterations } => ("converged".to_string(), iterations),
        NetworkState::Diverged { iterations, .. } => ("diverged".to_string(), iterations),
        NetworkState::Iterating { iteration, .. } => ("iterating".to_string(), iteration),
        NetworkState::Uninitialized => ("uninitialized".to_string(), 0),
    }
}

impl RunSummary {
    pub fn from_core(project: &str, mode: RunMode, result: &CoreResult) -> Self {
        let (status, iterations) = status(result.state);
        Self {
            project: project.to_string(),
            mode: mode.label().to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            status,
            iterations,
            mixed_outlet_temperature_k: result.mixed_outlet_temperature(),
            deposited_power_w: result.energy.deposited,
            absorbed_power_w: result.energy.absorbed,
            energy_error: result.energy.relative_error(),
            bypass_flow_kg_per_s: result.bypass.map(|b| b.flow),
            bypass_outlet_temperature_k: result.bypass.map(|b| b.outlet_temperature),
            assemblies: result
                .assemblies
                .iter()
                .map(|a| AssemblyRow {
                    name: a.name.clone(),
                    flow_rate_kg_per_s: a.flow_rate,
                    outlet_temperature_k: a.outlet_temperature(),
                    peak_coolant_k: a.peak_coolant(),
                    peak_clad_midwall_k: a.peak_clad_midwall(),
                    peak_fuel_centerline_k: a.peak_fuel(),
                    hotspot_clad_midwall_k: a.hotspot.map(|h| h.clad_midwall),
                    pressure_drop_pa: a.pressure_drop,
                    energy_error: a.energy.relative_error(),
                    axial_steps: a.steps,
                })
                .collect(),
            groups: Vec::new(),
            warnings: Vec::new(),
            wall_time_s: 0.0,
        }
    }

    pub fn from_orificing(project: &str, result: &OrificingResult) -> Self {
        let mut summary = Self::from_core(project, RunMode::Orifice, &result.result);
        summary.groups = result
            .group_flows
            .iter()
            .map(|(name, flow)| GroupRow {
                name: name.clone(),
                flow_rate_kg_per_s: *flow,
            })
            .collect();
        summary.warnings = result.warnings.iter().map(ToString::to_string).collect();
        summary
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Fixed-width table for the terminal.
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Project:   {}", self.project);
        let _ = writeln!(out, "Mode:      {}", self.mode);
        let _ = writeln!(out, "Timestamp: {}", self.timestamp);
        let _ = writeln!(
            out,
            "Status:    {} after {} iteration(s), {:.3} s",
            self.status, self.iterations, self.wall_time_s
        );
        let _ = writeln!(
            out,
            "Power:     {:.4e} W deposited, {:.4e} W absorbed ({:+.2e} relative)",
            self.deposited_power_w, self.absorbed_power_w, self.energy_error
        );
        let _ = writeln!(
            out,
            "Outlet:    {:.2} K mixed",
            self.mixed_outlet_temperature_k
        );
        if let (Some(flow), Some(t)) = (self.bypass_flow_kg_per_s, self.bypass_outlet_temperature_k)
        {
            let _ = writeln!(out, "Bypass:    {:.4} kg/s at {:.2} K", flow, t);
        }
        let _ = writeln!(out);
        let _ = writeln!(
            out,
            "{:<16} {:>10} {:>10} {:>10} {:>10} {:>10} {:>12}",
            "assembly", "flow", "T_out", "T_peak", "T_clad", "T_fuel", "dP [Pa]"
        );
        let opt = |v: Option<f64>| v.map_or_else(|| "-".to_string(), |t| format!("{:.2}", t));
        for a in &self.assemblies {
            let _ = writeln!(
                out,
                "{:<16} {:>10.4} {:>10.2} {:>10.2} {:>10} {:>10} {:>12.1}",
                a.name,
                a.flow_rate_kg_per_s,
                a.outlet_temperature_k,
                a.peak_coolant_k,
                opt(a.peak_clad_midwall_k),
                opt(a.peak_fuel_centerline_k),
                a.pressure_drop_pa
            );
        }
        if !self.groups.is_empty() {
            let _ = writeln!(out);
            for g in &self.groups {
                let _ = writeln!(out, "group {:<16} {:.4} kg/s", g.name, g.flow_rate_kg_per_s);
            }
        }
        for w in &self.warnings {
            let _ = writeln!(out, "warning: {}", w);
        }
        out
    }
}

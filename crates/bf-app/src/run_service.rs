//! Run execution service.

use std::path::Path;
use std::time::Instant;

use bf_project::schema::Project;
use tracing::info;

use crate::compile::{self, CompiledCore};
use crate::error::AppResult;
use crate::progress::{RunProgressEvent, RunStage};
use crate::project_service;
use crate::summary::RunSummary;

/// What to do with the compiled core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// One full-core solve at the configured flows.
    Solve,
    /// Orificing search over the configured groups, then a final solve.
    Orifice,
}

impl RunMode {
    pub fn label(self) -> &'static str {
        match self {
            RunMode::Solve => "solve",
            RunMode::Orifice => "orifice",
        }
    }
}

pub struct RunRequest<'a> {
    pub project_path: &'a Path,
    pub mode: RunMode,
}

#[derive(Debug, Clone, Default)]
pub struct RunTimingSummary {
    pub load_time_s: f64,
    pub compile_time_s: f64,
    pub solve_time_s: f64,
    pub total_time_s: f64,
}

#[derive(Debug, Clone)]
pub struct RunResponse {
    pub summary: RunSummary,
    pub timing: RunTimingSummary,
}

fn emit(
    progress_cb: &mut Option<&mut dyn FnMut(RunProgressEvent)>,
    mode: RunMode,
    stage: RunStage,
    started: Instant,
    message: Option<String>,
) {
    if let Some(cb) = progress_cb.as_deref_mut() {
        cb(RunProgressEvent::stage(
            mode,
            stage,
            started.elapsed().as_secs_f64(),
            message,
        ));
    }
}

pub fn run(request: &RunRequest) -> AppResult<RunResponse> {
    run_with_progress(request, None)
}

/// Load, compile and solve a project file, streaming stage events.
pub fn run_with_progress(
    request: &RunRequest,
    mut progress_cb: Option<&mut dyn FnMut(RunProgressEvent)>,
) -> AppResult<RunResponse> {
    let started = Instant::now();
    emit(
        &mut progress_cb,
        request.mode,
        RunStage::LoadingProject,
        started,
        Some(format!("Loading {}", request.project_path.display())),
    );
    let project = project_service::load_project(request.project_path)?;
    let load_time_s = started.elapsed().as_secs_f64();

    let mut response = run_project_with_progress(&project, request.mode, progress_cb)?;
    response.timing.load_time_s = load_time_s;
    response.timing.total_time_s = started.elapsed().as_secs_f64();
    response.summary.wall_time_s = response.timing.total_time_s;
    Ok(response)
}

pub fn run_project(project: &Project, mode: RunMode) -> AppResult<RunResponse> {
    run_project_with_progress(project, mode, None)
}

/// Compile and solve an in-memory project.
pub fn run_project_with_progress(
    project: &Project,
    mode: RunMode,
    mut progress_cb: Option<&mut dyn FnMut(RunProgressEvent)>,
) -> AppResult<RunResponse> {
    let started = Instant::now();
    let mut timing = RunTimingSummary::default();

    emit(
        &mut progress_cb,
        mode,
        RunStage::CompilingCore,
        started,
        Some("Compiling core".to_string()),
    );
    let CompiledCore {
        core,
        power,
        network,
        orificing,
    } = compile::compile_project(project)?;
    timing.compile_time_s = started.elapsed().as_secs_f64();

    let solve_started = Instant::now();
    let mut summary = match mode {
        RunMode::Solve => {
            emit(
                &mut progress_cb,
                mode,
                RunStage::Solving,
                started,
                Some(format!("Solving {} assemblies", core.len())),
            );
            let result = bf_solver::solve_core(&core, &power, &network)?;
            emit(&mut progress_cb, mode, RunStage::Summarizing, started, None);
            RunSummary::from_core(&project.name, mode, &result)
        }
        RunMode::Orifice => {
            emit(
                &mut progress_cb,
                mode,
                RunStage::Optimizing,
                started,
                Some(format!("Optimizing {} groups", core.groups().len())),
            );
            let result = bf_solver::optimize(&core, &power, &orificing, &network)?;
            emit(&mut progress_cb, mode, RunStage::Summarizing, started, None);
            RunSummary::from_orificing(&project.name, &result)
        }
    };
    timing.solve_time_s = solve_started.elapsed().as_secs_f64();
    timing.total_time_s = started.elapsed().as_secs_f64();
    summary.wall_time_s = timing.total_time_s;

    info!(
        project = %project.name,
        mode = mode.label(),
        status = %summary.status,
        seconds = timing.total_time_s,
        "run finished"
    );
    emit(&mut progress_cb, mode, RunStage::Completed, started, None);
    Ok(RunResponse { summary, timing })
}

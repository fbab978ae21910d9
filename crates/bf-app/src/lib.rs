//! Application service layer for bundleflow.
//!
//! Turns a project file into solver inputs, runs a solve or an orificing
//! search, and renders a summary. The CLI is a thin shell over this crate.

pub mod compile;
pub mod error;
pub mod progress;
pub mod project_service;
pub mod run_service;
pub mod summary;

pub use compile::{CompiledCore, compile_project};
pub use error::{AppError, AppResult};
pub use progress::{RunProgressEvent, RunStage};
pub use project_service::{
    AssemblySummary, MaterialSummary, get_assembly, list_assemblies, list_materials, load_project,
    save_project, validate_project,
};
pub use run_service::{
    RunMode, RunRequest, RunResponse, RunTimingSummary, run, run_project,
    run_project_with_progress, run_with_progress,
};
pub use summary::{AssemblyRow, GroupRow, RunSummary};

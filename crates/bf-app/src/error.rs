//! Error types for the bf-app service layer.

use std::path::PathBuf;

/// Application error type that wraps errors from the backend crates and
/// gives the CLI a single error to report.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Project error: {0}")]
    Project(String),

    #[error("Failed to read project file: {path}")]
    ProjectFileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Project validation failed: {0}")]
    Validation(String),

    #[error("Compilation failed: {0}")]
    Compile(String),

    #[error("Solver error: {0}")]
    Solver(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Summary serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for bf-app operations.
pub type AppResult<T> = Result<T, AppError>;

impl From<bf_project::ProjectError> for AppError {
    fn from(err: bf_project::ProjectError) -> Self {
        match err {
            bf_project::ProjectError::Validation(v) => AppError::Validation(v.to_string()),
            other => AppError::Project(other.to_string()),
        }
    }
}

impl From<bf_project::ValidationError> for AppError {
    fn from(err: bf_project::ValidationError) -> Self {
        AppError::Validation(err.to_string())
    }
}

impl From<bf_solver::ConfigError> for AppError {
    fn from(err: bf_solver::ConfigError) -> Self {
        AppError::Compile(err.to_string())
    }
}

impl From<bf_materials::MaterialError> for AppError {
    fn from(err: bf_materials::MaterialError) -> Self {
        AppError::Compile(err.to_string())
    }
}

impl From<bf_geometry::GeometryError> for AppError {
    fn from(err: bf_geometry::GeometryError) -> Self {
        AppError::Compile(err.to_string())
    }
}

impl From<bf_power::PowerError> for AppError {
    fn from(err: bf_power::PowerError) -> Self {
        AppError::Compile(err.to_string())
    }
}

impl From<bf_solver::SolverError> for AppError {
    fn from(err: bf_solver::SolverError) -> Self {
        AppError::Solver(err.to_string())
    }
}

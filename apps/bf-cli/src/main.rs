use clap::{Parser, Subcommand};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use bf_app::{
    AppResult, RunMode, RunProgressEvent, RunRequest, RunResponse, RunTimingSummary,
    compile_project, project_service, run_service,
};

#[derive(Parser)]
#[command(name = "bf-cli")]
#[command(about = "bundleflow CLI - steady-state subchannel analysis of hexagonal assemblies", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a project file and compile its core
    Validate {
        /// Path to the project file (YAML or JSON)
        project_path: PathBuf,
    },
    /// Solve the core at the configured flow rates
    Run {
        /// Path to the project file (YAML or JSON)
        project_path: PathBuf,
        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },
    /// List built-in materials and, with a project, its own materials
    Materials {
        /// Substring filter on names and aliases
        #[arg(default_value = "")]
        query: String,
        /// Project whose user materials are listed too
        #[arg(long)]
        project: Option<PathBuf>,
    },
    /// Search orificing group flow rates against their limits
    Orifice {
        /// Path to the project file (YAML or JSON)
        project_path: PathBuf,
        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> AppResult<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { project_path } => cmd_validate(&project_path),
        Commands::Run { project_path, json } => cmd_run(&project_path, RunMode::Solve, json),
        Commands::Orifice { project_path, json } => {
            cmd_run(&project_path, RunMode::Orifice, json)
        }
        Commands::Materials { query, project } => cmd_materials(&query, project.as_deref()),
    }
}

fn cmd_validate(project_path: &Path) -> AppResult<()> {
    println!("Validating project: {}", project_path.display());
    let project = project_service::load_project(project_path)?;
    project_service::validate_project(&project)?;
    let compiled = compile_project(&project)?;
    println!("✓ Project is valid");
    println!(
        "  {} assemblies, {} groups, {:.4e} W",
        compiled.core.len(),
        compiled.core.groups().len(),
        compiled.power.total_power()
    );
    for a in project_service::list_assemblies(&project) {
        println!(
            "  {:<16} {:<12} ring {:>2} pos {:>3}  {} pins",
            a.name, a.assembly_type, a.ring, a.position, a.n_pins
        );
    }
    Ok(())
}

fn cmd_materials(query: &str, project_path: Option<&Path>) -> AppResult<()> {
    let project = project_path
        .map(project_service::load_project)
        .transpose()?;
    let materials = project_service::list_materials(project.as_ref(), query)?;
    if materials.is_empty() {
        println!("No materials match '{}'", query);
        return Ok(());
    }
    for m in materials {
        let range = m
            .range_k
            .map_or_else(|| "-".to_string(), |(lo, hi)| format!("{:.0}-{:.0} K", lo, hi));
        println!("  {:<12} {:<28} {:<12} {}", m.name, m.display_name, m.kind, range);
    }
    Ok(())
}

fn cmd_run(project_path: &Path, mode: RunMode, json: bool) -> AppResult<()> {
    let request = RunRequest { project_path, mode };

    let response = if json {
        run_service::run(&request)?
    } else {
        let mut last_emit = Instant::now();
        let mut last_stage = None;
        let response = run_service::run_with_progress(
            &request,
            Some(&mut |event| {
                let emit_now =
                    last_stage != Some(event.stage) || last_emit.elapsed().as_millis() >= 100;
                if emit_now {
                    render_cli_progress(&event);
                    last_stage = Some(event.stage);
                    last_emit = Instant::now();
                }
            }),
        )?;
        clear_progress_line();
        response
    };

    print_response(&response, json)
}

fn print_response(response: &RunResponse, json: bool) -> AppResult<()> {
    if json {
        println!("{}", response.summary.to_json()?);
        return Ok(());
    }
    print!("{}", response.summary.to_text());
    print_timing_summary(&response.timing);
    Ok(())
}

fn clear_progress_line() {
    print!("\r{}\r", " ".repeat(120));
    let _ = io::stdout().flush();
}

fn render_cli_progress(event: &RunProgressEvent) {
    let spinner = ['|', '/', '-', '\\'];
    let spin_idx = ((event.elapsed_wall_s * 10.0) as usize) % spinner.len();
    let mut line = format!(
        "\r{} {}  elapsed={:.2}s",
        spinner[spin_idx],
        event.stage.label(),
        event.elapsed_wall_s
    );
    if let Some(msg) = &event.message {
        line.push_str(&format!("  {}", msg));
    }
    print!("{:<120}", line);
    let _ = io::stdout().flush();
}

fn print_timing_summary(timing: &RunTimingSummary) {
    println!();
    println!("Timing:");
    println!("  Load:    {:.3} s", timing.load_time_s);
    println!("  Compile: {:.3} s", timing.compile_time_s);
    println!("  Solve:   {:.3} s", timing.solve_time_s);
    println!("  Total:   {:.3} s", timing.total_time_s);
}

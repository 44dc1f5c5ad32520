//! planviz
//!
//! Renders an issue tracker export as a Graphviz DOT document: parent issues
//! become nested clusters, dependencies become edges.

use anyhow::{Context, Result};
use clap::Parser;
use planviz::check::check_plan;
use planviz::cli::{Cli, Commands};
use planviz::config::{normalize_base_url, ConfigLoader, EffectiveConfig};
use planviz::errors::{plan_not_found, CompileError};
use planviz::forest::Forest;
use planviz::output::{
    ErrorCode, ExitCode, JsonError, JsonOutput, OutputContext, RenderResponse,
};
use planviz::plan::PlanFile;
use planviz::visualization::{export_dot, CompileOptions};
use std::env;
use std::io;
use std::path::Path;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .with_target(false)
        .compact()
        .init();

    let cli = Cli::parse();
    let exit_code = match run(&cli) {
        Ok(code) => code,
        Err(e) => report_error(&e, &cli),
    };

    if exit_code != ExitCode::Success {
        std::process::exit(exit_code.code());
    }
}

fn run(cli: &Cli) -> Result<ExitCode> {
    let config = load_config(cli.config.as_deref())?;

    match &cli.command {
        Commands::Render {
            plan,
            base_url,
            output,
            missing_dependencies,
            category_field,
            json,
        } => {
            let output_ctx = OutputContext::new(cli.quiet, *json);
            let plan_file = PlanFile::load(plan)?;

            let base_url = base_url
                .clone()
                .or_else(|| config.base_url())
                .or_else(|| plan_file.base_url.clone())
                .unwrap_or_default();
            if base_url.is_empty() {
                let _ = output_ctx.print_warning("No base URL configured; issue links are relative");
            }
            let options = CompileOptions {
                base_url: normalize_base_url(&base_url),
                category_field: category_field.clone().or_else(|| config.category_field()),
                missing_dependencies: missing_dependencies
                    .unwrap_or_else(|| config.missing_dependencies()),
            };
            debug!(?options, plan = %plan.display(), "rendering plan");

            let forest = Forest::build(
                &plan_file.issues,
                &plan_file.directory(),
                options.category_field.as_deref(),
                options.missing_dependencies,
            )?;
            let dot = export_dot(&forest, &options.base_url)?;
            let edges = forest
                .nodes()
                .iter()
                .map(|node| node.dependencies.len())
                .sum();

            if let Some(path) = output {
                std::fs::write(path, &dot)
                    .with_context(|| format!("Failed to write {}", path.display()))?;
                info!(path = %path.display(), bytes = dot.len(), "wrote DOT document");
                let _ = output_ctx.print_info(format!(
                    "Rendered {} issues to: {}",
                    forest.len(),
                    path.display()
                ));
            } else {
                output_ctx.print_data(&dot)?;
            }

            if output_ctx.is_json() {
                let response = RenderResponse {
                    output: output.as_ref().map(|path| path.display().to_string()),
                    dot: output.is_none().then_some(dot),
                    issues: forest.len(),
                    edges,
                };
                output_ctx.print_json(&JsonOutput::success(response, "render").to_json_string()?)?;
            }
            Ok(ExitCode::Success)
        }
        Commands::Check {
            plan,
            missing_dependencies,
            category_field,
            json,
        } => {
            let output_ctx = OutputContext::new(cli.quiet, *json);
            let plan_file = PlanFile::load(plan)?;
            let category_field = category_field.clone().or_else(|| config.category_field());
            let policy = missing_dependencies.unwrap_or_else(|| config.missing_dependencies());

            let report = check_plan(
                &plan_file.issues,
                &plan_file.directory(),
                category_field.as_deref(),
                policy,
            );

            if output_ctx.is_json() {
                output_ctx.print_json(&JsonOutput::success(&report, "check").to_json_string()?)?;
            } else {
                for diagnostic in &report.diagnostics {
                    output_ctx.print_data(format!("{}\n", diagnostic))?;
                }
                let _ = output_ctx.print_info(format!(
                    "Checked {} issues: {} error(s), {} warning(s)",
                    report.issues, report.errors, report.warnings
                ));
            }

            Ok(if report.has_errors() {
                ExitCode::ValidationFailed
            } else {
                ExitCode::Success
            })
        }
    }
}

/// Merge user, repository and explicit configuration files
fn load_config(explicit: Option<&Path>) -> Result<EffectiveConfig> {
    let mut loader = ConfigLoader::new();
    if let Some(config_dir) = dirs::config_dir() {
        loader = loader.with_user_config(&config_dir.join("planviz"))?;
    }
    loader = loader.with_repo_config(&env::current_dir()?)?;
    if let Some(path) = explicit {
        loader = loader.with_explicit_config(path)?;
    }
    Ok(loader.build())
}

/// Find the innermost I/O error in an error chain
fn io_error(error: &anyhow::Error) -> Option<&io::Error> {
    error.chain().find_map(|cause| cause.downcast_ref::<io::Error>())
}

fn error_code(error: &anyhow::Error) -> &'static str {
    if let Some(compile_error) = error.downcast_ref::<CompileError>() {
        return compile_error.code();
    }
    if let Some(io_error) = io_error(error) {
        return match io_error.kind() {
            io::ErrorKind::NotFound => ErrorCode::FILE_NOT_FOUND,
            _ => ErrorCode::IO_ERROR,
        };
    }
    let parse_failure = error.chain().any(|cause| {
        cause.is::<serde_json::Error>() || cause.is::<toml::de::Error>()
    });
    if parse_failure {
        ErrorCode::PARSE_ERROR
    } else {
        "ERROR"
    }
}

/// Print a failed command's error and pick the exit code
fn report_error(error: &anyhow::Error, cli: &Cli) -> ExitCode {
    let (command, plan, json) = match &cli.command {
        Commands::Render { plan, json, .. } => ("render", plan, *json),
        Commands::Check { plan, json, .. } => ("check", plan, *json),
    };

    let (json_error, message) = if let Some(compile_error) = error.downcast_ref::<CompileError>() {
        (
            JsonError::from_compile_error(compile_error, command),
            compile_error.to_actionable().to_error_message(),
        )
    } else if error_code(error) == ErrorCode::FILE_NOT_FOUND && !plan.exists() {
        let actionable = plan_not_found(&plan.display().to_string());
        (
            JsonError::new(
                ErrorCode::FILE_NOT_FOUND,
                format!("Plan file not found: {}", plan.display()),
                command,
            )
            .with_suggestions(actionable.suggestions()),
            actionable.to_error_message(),
        )
    } else {
        (
            JsonError::new(error_code(error), format!("{:#}", error), command),
            format!("Error: {:#}\n", error),
        )
    };

    if json {
        match json_error.to_json_string() {
            Ok(json_str) => println!("{}", json_str),
            Err(_) => eprint!("{}", message),
        }
    } else {
        eprint!("{}", message);
    }
    json_error.exit_code()
}

//! Command-line interface definitions using clap.

use crate::forest::MissingDependencyPolicy;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Project plan visualizer
///
/// Compiles an issue tracker export into a Graphviz DOT document with one
/// nested cluster per parent issue and one edge per dependency.
///
/// Exit Codes:
///   0  - Command succeeded
///   1  - Generic error occurred
///   2  - Invalid arguments or usage error
///   3  - Plan or config file not found
///   4  - Validation failed (parent cycle, invalid color, unknown dependency, etc.)
///  10  - External dependency failed (file system, etc.)
#[derive(Parser, Debug)]
#[command(name = "planviz", version)]
#[command(about = "Render issue plans as Graphviz diagrams", long_about = None)]
pub struct Cli {
    /// Suppress non-essential output (for scripting)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Read configuration from this file instead of ./planviz.toml
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Compile a plan file into a DOT document
    ///
    /// Settings not given on the command line come from the configuration
    /// files; the base URL finally falls back to the one stored in the plan.
    Render {
        /// Plan file (JSON export of issues, users and categories)
        plan: PathBuf,

        /// Tracker base URL for issue links
        #[arg(long)]
        base_url: Option<String>,

        /// Output file (optional - prints to stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// What to do with dependencies on issues missing from the plan
        #[arg(long, value_enum)]
        missing_dependencies: Option<MissingDependencyPolicy>,

        /// Custom field holding the category of issues without one
        #[arg(long)]
        category_field: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Report every problem in a plan file without rendering it
    Check {
        /// Plan file (JSON export of issues, users and categories)
        plan: PathBuf,

        /// What to do with dependencies on issues missing from the plan
        #[arg(long, value_enum)]
        missing_dependencies: Option<MissingDependencyPolicy>,

        /// Custom field holding the category of issues without one
        #[arg(long)]
        category_field: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_render_flags() {
        let cli = Cli::try_parse_from([
            "planviz",
            "--quiet",
            "render",
            "plan.json",
            "--base-url",
            "https://tracker.example",
            "--missing-dependencies",
            "drop",
            "-o",
            "plan.dot",
        ])
        .unwrap();

        assert!(cli.quiet);
        match cli.command {
            Commands::Render {
                plan,
                base_url,
                output,
                missing_dependencies,
                category_field,
                json,
            } => {
                assert_eq!(plan, PathBuf::from("plan.json"));
                assert_eq!(base_url.as_deref(), Some("https://tracker.example"));
                assert_eq!(output, Some(PathBuf::from("plan.dot")));
                assert_eq!(missing_dependencies, Some(MissingDependencyPolicy::Drop));
                assert_eq!(category_field, None);
                assert!(!json);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_global_config_after_subcommand() {
        let cli = Cli::try_parse_from(["planviz", "check", "plan.json", "--config", "x.toml"])
            .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("x.toml")));
    }

    #[test]
    fn test_rejects_unknown_policy() {
        assert!(Cli::try_parse_from([
            "planviz",
            "render",
            "plan.json",
            "--missing-dependencies",
            "ignore"
        ])
        .is_err());
    }
}

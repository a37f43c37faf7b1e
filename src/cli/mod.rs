pub mod parser;

use crate::commands::CommandExecutor;
use crate::result::Result;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "stepbuild")]
#[command(about = "Fail-fast build pipeline for native Python app bundles")]
#[command(version = "0.1.0")]
#[command(arg_required_else_help = true)]
#[command(
    help_template = "{before-help}{name} v{version}\n\n{about-with-newline}\n{usage-heading} {usage}\n\n{all-args}{after-help}"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Run the build pipeline")]
    Build {
        #[arg(value_name = "VERSION", help = "Version label for this build (default: 1.0.0)")]
        label: Option<String>,

        #[arg(short, long, help = "Build configuration file")]
        config: Option<String>,

        #[arg(short, long, help = "Also log DEBUG entries such as tool command lines")]
        verbose: bool,

        #[arg(long, help = "Write a JSON run report to this file (relative to the current directory)")]
        report: Option<String>,
    },

    #[command(about = "Create a default stepbuild.toml")]
    Setup {
        #[arg(short, long, help = "Where to write the configuration file")]
        config: Option<String>,

        #[arg(long, help = "Force overwrite existing configuration")]
        force: bool,
    },

    #[command(about = "Report which configured tools and inputs are available")]
    Check {
        #[arg(short, long, help = "Build configuration file")]
        config: Option<String>,
    },
}

impl Cli {
    /// Executes the parsed command and returns the process exit code.
    pub async fn execute(self) -> Result<i32> {
        let mut executor = CommandExecutor::new();

        match self.command {
            Commands::Build {
                label,
                config,
                verbose,
                report,
            } => executor.build_project(label, config, verbose, report).await,
            Commands::Setup { config, force } => executor.setup_project(config, force).await,
            Commands::Check { config } => executor.check_tools(config).await,
        }
    }
}

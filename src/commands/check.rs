use crate::build::{BuildContext, Platform, VersionLabel};
use crate::commands::build::load_build_config;
use crate::pipeline::RunLog;
use crate::result::Result;
use crate::utils::process::command_exists;
use colored::Colorize;
use std::io;
use std::path::PathBuf;

pub async fn execute(config_path: Option<&str>) -> Result<()> {
    let mut cmd = CheckCommand::new();
    cmd.execute(config_path.map(PathBuf::from)).await
}

/// One line of `stepbuild check` output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolStatus {
    pub label: &'static str,
    pub target: String,
    pub available: bool,
}

#[derive(Default)]
pub struct CheckCommand;

impl CheckCommand {
    pub fn new() -> Self {
        Self
    }

    pub async fn execute(&mut self, config_path: Option<PathBuf>) -> Result<()> {
        let (config, root) = load_build_config(config_path).await?;
        config.validate()?;

        // Advisory only, nothing is written to the build log.
        let log = RunLog::with_sinks(Box::new(io::sink()), Box::new(io::sink()), false, false);
        let ctx = BuildContext::new(config, root, VersionLabel::resolve(None), log);

        println!("Platform: {}", Platform::current().as_str());
        for status in tool_statuses(&ctx) {
            let mark = if status.available {
                "found".green()
            } else {
                "missing".red()
            };
            println!("  {:<24} {:<40} {}", status.label, status.target, mark);
        }

        Ok(())
    }
}

pub fn tool_statuses(ctx: &BuildContext) -> Vec<ToolStatus> {
    let env = &ctx.config.environment;
    let venv_python = ctx.venv_python();
    let python = ctx
        .tools()
        .find_executable(&env.python)
        .map(|path| path.display().to_string())
        .unwrap_or_else(|_| env.python.clone());

    vec![
        ToolStatus {
            label: "python interpreter",
            target: python,
            available: command_exists(&env.python),
        },
        ToolStatus {
            label: "virtual environment",
            target: venv_python.display().to_string(),
            available: venv_python.is_file(),
        },
        ToolStatus {
            label: "requirements",
            target: env.requirements.display().to_string(),
            available: ctx.path(&env.requirements).is_file(),
        },
        ToolStatus {
            label: "entry file",
            target: ctx.config.project.entry_file.display().to_string(),
            available: ctx.path(&ctx.config.project.entry_file).is_file(),
        },
    ]
}

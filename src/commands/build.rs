use crate::build::{build_pipeline, BuildConfig, BuildContext, VersionLabel, CONFIG_FILE};
use crate::cli::parser::CliParser;
use crate::pipeline::{PipelineContext, PipelineReport, RunLog};
use crate::result::{PipelineError, Result};
use std::path::{Path, PathBuf};

pub async fn execute(
    version: Option<&str>,
    config_path: Option<&str>,
    verbose: bool,
    report_path: Option<&str>,
) -> Result<i32> {
    let mut cmd = BuildCommand::new();
    let report = cmd
        .execute(
            version,
            config_path.map(PathBuf::from),
            verbose,
            report_path.map(PathBuf::from),
        )
        .await?;

    Ok(report.exit_code())
}

#[derive(Default)]
pub struct BuildCommand;

impl BuildCommand {
    pub fn new() -> Self {
        Self
    }

    pub async fn execute(
        &mut self,
        version: Option<&str>,
        config_path: Option<PathBuf>,
        verbose: bool,
        report_path: Option<PathBuf>,
    ) -> Result<PipelineReport> {
        let (config, root) = load_build_config(config_path).await?;
        config.validate()?;

        let log = RunLog::open(&root.join(&config.log_file), verbose)?;
        let version = VersionLabel::resolve(version);

        log::info!(
            "Starting build of {} version {} in {}",
            config.project.name,
            version,
            root.display()
        );

        let ctx = BuildContext::new(config, root, version, log);
        ctx.log().info(format!(
            "building {} version {}",
            ctx.config.project.name, ctx.version
        ));

        let report = build_pipeline(&ctx).run(&ctx).await;

        // closes the audit trail the same way whether or not a step failed
        ctx.log().info(report.summary());

        // relative to where stepbuild was started, unlike config paths
        if let Some(path) = report_path {
            report.save_to_file(&path).await?;
        }

        Ok(report)
    }
}

/// Loads the configuration and returns it with the directory relative
/// paths resolve against.
pub async fn load_build_config(config_path: Option<PathBuf>) -> Result<(BuildConfig, PathBuf)> {
    let config_file = match config_path {
        Some(path) => CliParser::validate_config_path(&path)?,
        None => {
            let path = PathBuf::from(CONFIG_FILE);
            if !path.exists() {
                return Err(PipelineError::not_found(format!(
                    "Configuration file '{}' not found. Run 'stepbuild setup' to create it.",
                    CONFIG_FILE
                )));
            }
            path
        }
    };

    let config = BuildConfig::from_file(&config_file).await?;
    let root = project_root(&config_file)?;

    Ok((config, root))
}

fn project_root(config_file: &Path) -> Result<PathBuf> {
    let current_dir = std::env::current_dir().map_err(|e| {
        PipelineError::Process(format!("Failed to get current directory: {}", e).into())
    })?;

    Ok(match config_file.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => current_dir.join(parent),
        _ => current_dir,
    })
}

pub mod build;
pub mod check;
pub mod setup;

use crate::result::Result;
use smol_str::SmolStr;

#[derive(Debug)]
pub enum CommandType {
    Build {
        version: Option<SmolStr>,
        config: Option<SmolStr>,
        verbose: bool,
        report: Option<SmolStr>,
    },
    Setup {
        config: Option<SmolStr>,
        force: bool,
    },
    Check {
        config: Option<SmolStr>,
    },
}

impl CommandType {
    /// Runs the command and returns the process exit code.
    pub async fn execute(self) -> Result<i32> {
        match self {
            CommandType::Build {
                version,
                config,
                verbose,
                report,
            } => {
                build::execute(
                    version.as_deref(),
                    config.as_deref(),
                    verbose,
                    report.as_deref(),
                )
                .await
            }
            CommandType::Setup { config, force } => {
                setup::execute(config.as_deref(), force).await.map(|_| 0)
            }
            CommandType::Check { config } => check::execute(config.as_deref()).await.map(|_| 0),
        }
    }
}

#[derive(Default)]
pub struct CommandExecutor;

impl CommandExecutor {
    pub fn new() -> Self {
        Self
    }

    pub async fn build_project(
        &mut self,
        version: Option<String>,
        config: Option<String>,
        verbose: bool,
        report: Option<String>,
    ) -> Result<i32> {
        CommandType::Build {
            version: version.map(|s| s.into()),
            config: config.map(|s| s.into()),
            verbose,
            report: report.map(|s| s.into()),
        }
        .execute()
        .await
    }

    pub async fn setup_project(&mut self, config: Option<String>, force: bool) -> Result<i32> {
        CommandType::Setup {
            config: config.map(|s| s.into()),
            force,
        }
        .execute()
        .await
    }

    pub async fn check_tools(&mut self, config: Option<String>) -> Result<i32> {
        CommandType::Check {
            config: config.map(|s| s.into()),
        }
        .execute()
        .await
    }
}

use crate::build::{BuildConfig, CONFIG_FILE};
use crate::result::{PipelineError, Result};
use std::path::PathBuf;

pub async fn execute(path: Option<&str>, force: bool) -> Result<()> {
    let mut cmd = SetupCommand::new();
    cmd.execute(path.map(PathBuf::from), force).await
}

#[derive(Default)]
pub struct SetupCommand;

impl SetupCommand {
    pub fn new() -> Self {
        Self
    }

    pub async fn execute(&mut self, path: Option<PathBuf>, force: bool) -> Result<()> {
        let config_file = path.unwrap_or_else(|| PathBuf::from(CONFIG_FILE));

        log::info!("Starting setup process with force: {}", force);

        if config_file.exists() && !force {
            log::warn!("{} already exists, setup aborted", config_file.display());
            return Err(PipelineError::Config(
                format!(
                    "{} already exists. Use --force to overwrite.",
                    config_file.display()
                )
                .into(),
            ));
        }

        BuildConfig::default().save_to_file(&config_file).await?;

        println!("{} created successfully!", config_file.display());
        println!();
        println!("Please edit it to match your project:");
        println!("   - Update project.entry_file to your application's entry script");
        println!("   - List the data directories to bundle in compiler.data_dirs");
        println!("   - List the paths that must exist after compiling in verify.required");
        println!("   - Remove the [package] section to skip release archives");
        println!();
        println!("Then run: stepbuild build [VERSION]");

        log::info!("Setup completed successfully");

        Ok(())
    }
}

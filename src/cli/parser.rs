use crate::result::{PipelineError, Result};
use std::path::{Path, PathBuf};

pub struct CliParser;

impl CliParser {
    pub fn validate_config_path(path: &Path) -> Result<PathBuf> {
        if !path.exists() {
            return Err(PipelineError::not_found(format!(
                "Config file not found: {}",
                path.display()
            )));
        }

        if !path.is_file() {
            return Err(PipelineError::Config("Path is not a file".into()));
        }

        Ok(path.to_path_buf())
    }
}

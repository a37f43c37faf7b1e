use crate::build::config::BuildConfig;
use crate::build::platform::Platform;
use crate::build::version::VersionLabel;
use crate::pipeline::{PipelineContext, RunLog};
use crate::utils::process::ProcessManager;
use std::path::{Path, PathBuf};

/** Everything a build step can see
 *
 * Owns the run log, so two contexts never share a log file handle.
 * Relative configuration paths resolve against `root`.
 */
pub struct BuildContext {
    pub config: BuildConfig,
    pub root: PathBuf,
    pub version: VersionLabel,
    pub platform: Platform,
    log: RunLog,
}

impl BuildContext {
    pub fn new(config: BuildConfig, root: impl Into<PathBuf>, version: VersionLabel, log: RunLog) -> Self {
        Self {
            config,
            root: root.into(),
            version,
            platform: Platform::current(),
            log,
        }
    }

    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }

    pub fn path(&self, relative: impl AsRef<Path>) -> PathBuf {
        self.root.join(relative)
    }

    pub fn venv_dir(&self) -> PathBuf {
        self.path(&self.config.environment.venv_dir)
    }

    pub fn venv_python(&self) -> PathBuf {
        self.platform.venv_python(&self.venv_dir())
    }

    pub fn tools(&self) -> ProcessManager<'_> {
        ProcessManager::new(&self.log, &self.root)
    }
}

impl PipelineContext for BuildContext {
    fn log(&self) -> &RunLog {
        &self.log
    }
}

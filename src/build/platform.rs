use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Windows,
    Linux,
    MacOs,
}

impl Platform {
    pub fn current() -> Self {
        if cfg!(target_os = "windows") {
            Platform::Windows
        } else if cfg!(target_os = "macos") {
            Platform::MacOs
        } else {
            Platform::Linux
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Platform::Windows => "windows",
            Platform::Linux => "linux",
            Platform::MacOs => "macos",
        }
    }

    /// Interpreter inside a virtual environment. Running tools through it is
    /// what "activating" the environment amounts to.
    pub fn venv_python(self, venv_dir: &Path) -> PathBuf {
        match self {
            Platform::Windows => venv_dir.join("Scripts").join("python.exe"),
            Platform::Linux | Platform::MacOs => venv_dir.join("bin").join("python"),
        }
    }
}

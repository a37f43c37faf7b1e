use crate::result::{PipelineError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;

pub const CONFIG_FILE: &str = "stepbuild.toml";

/** Contents of `stepbuild.toml`
 *
 * # Sections
 * - `project`: application name, entry file and Windows metadata
 * - `environment`: interpreter, virtual-environment directory, requirements
 * - `compiler`: Nuitka module, output directory and flags
 * - `verify`: paths that must exist after compiling
 * - `package`: optional release archive settings; no section, no archive
 *
 * All relative paths are resolved against the directory holding the
 * configuration file.
 */
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildConfig {
    #[serde(default = "default_log_file")]
    pub log_file: PathBuf,
    pub project: Project,
    #[serde(default)]
    pub environment: Environment,
    #[serde(default)]
    pub compiler: Compiler,
    #[serde(default)]
    pub verify: Verify,
    pub package: Option<Package>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub name: String,
    pub entry_file: PathBuf,
    pub company: Option<String>,
    pub icon: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Environment {
    #[serde(default = "default_python")]
    pub python: String,
    #[serde(default = "default_venv_dir")]
    pub venv_dir: PathBuf,
    #[serde(default = "default_requirements")]
    pub requirements: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Compiler {
    #[serde(default = "default_compiler_package")]
    pub package: String,
    #[serde(default = "default_compiler_module")]
    pub module: String,
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    #[serde(default)]
    pub data_dirs: Vec<PathBuf>,
    #[serde(default = "enabled")]
    pub lto: bool,
    #[serde(default = "enabled")]
    pub assume_yes: bool,
    #[serde(default)]
    pub args: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Verify {
    #[serde(default)]
    pub required: Vec<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Package {
    #[serde(default)]
    pub format: ArchiveFormat,
    #[serde(default = "enabled")]
    pub checksum: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArchiveFormat {
    #[default]
    Zip,
    Tgz,
}

impl ArchiveFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ArchiveFormat::Zip => "zip",
            ArchiveFormat::Tgz => "tar.gz",
        }
    }
}

fn default_log_file() -> PathBuf {
    "build.log".into()
}

fn default_python() -> String {
    let python = if cfg!(windows) { "python" } else { "python3" };
    python.to_string()
}

fn default_venv_dir() -> PathBuf {
    ".venv".into()
}

fn default_requirements() -> PathBuf {
    "requirements.txt".into()
}

fn default_compiler_package() -> String {
    "nuitka".to_string()
}

fn default_compiler_module() -> String {
    "nuitka".to_string()
}

fn default_output_dir() -> PathBuf {
    "dist".into()
}

fn enabled() -> bool {
    true
}

impl Default for Environment {
    fn default() -> Self {
        Self {
            python: default_python(),
            venv_dir: default_venv_dir(),
            requirements: default_requirements(),
        }
    }
}

impl Default for Compiler {
    fn default() -> Self {
        Self {
            package: default_compiler_package(),
            module: default_compiler_module(),
            output_dir: default_output_dir(),
            data_dirs: Vec::new(),
            lto: true,
            assume_yes: true,
            args: Vec::new(),
        }
    }
}

impl Default for BuildConfig {
    fn default() -> Self {
        let data_dirs: Vec<PathBuf> = vec!["templates".into(), "static".into()];

        Self {
            log_file: default_log_file(),
            project: Project {
                name: "app".to_string(),
                entry_file: "app.py".into(),
                company: None,
                icon: Some("static/favicon.ico".into()),
            },
            environment: Environment::default(),
            verify: Verify {
                required: vec![
                    "dist/app.dist".into(),
                    "dist/app.dist/templates".into(),
                    "dist/app.dist/static".into(),
                ],
            },
            compiler: Compiler {
                data_dirs,
                ..Compiler::default()
            },
            package: Some(Package {
                format: if cfg!(windows) {
                    ArchiveFormat::Zip
                } else {
                    ArchiveFormat::Tgz
                },
                checksum: true,
            }),
        }
    }
}

impl BuildConfig {
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path).await?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: BuildConfig = toml::from_str(content).map_err(|e| {
            PipelineError::Config(format!("Invalid build config format: {}", e).into())
        })?;

        Ok(config)
    }

    pub async fn save_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let content = toml::to_string_pretty(self).map_err(|e| {
            PipelineError::Config(format!("Failed to serialize build config: {}", e).into())
        })?;

        fs::write(path, content).await?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.project.name.trim().is_empty() {
            return Err(PipelineError::Config("Project name cannot be empty".into()));
        }

        if self.project.entry_file.as_os_str().is_empty() {
            return Err(PipelineError::Config("Entry file cannot be empty".into()));
        }

        if self.environment.python.trim().is_empty() {
            return Err(PipelineError::Config(
                "Python interpreter cannot be empty".into(),
            ));
        }

        if self.environment.venv_dir.as_os_str().is_empty() {
            return Err(PipelineError::Config(
                "Virtual environment directory cannot be empty".into(),
            ));
        }

        if self.compiler.module.trim().is_empty() {
            return Err(PipelineError::Config("Compiler module cannot be empty".into()));
        }

        if self.log_file.as_os_str().is_empty() {
            return Err(PipelineError::Config("Log file cannot be empty".into()));
        }

        Ok(())
    }

    /// Directory Nuitka writes the standalone build into, `<output>/<stem>.dist`.
    pub fn dist_dir(&self) -> PathBuf {
        let stem = self
            .project
            .entry_file
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.project.name.clone());

        self.compiler.output_dir.join(format!("{}.dist", stem))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = BuildConfig::default();
        config.validate().unwrap();
        assert_eq!(config.dist_dir(), Path::new("dist").join("app.dist"));
        assert_eq!(config.log_file, Path::new("build.log"));
    }

    #[test]
    fn minimal_config_fills_defaults() {
        let config = BuildConfig::from_toml(
            r#"
            [project]
            name = "helper"
            entry_file = "main.py"
            "#,
        )
        .unwrap();

        assert_eq!(config.environment.venv_dir, Path::new(".venv"));
        assert_eq!(config.environment.requirements, Path::new("requirements.txt"));
        assert_eq!(config.compiler.module, "nuitka");
        assert!(config.compiler.lto);
        assert!(config.compiler.assume_yes);
        assert!(config.verify.required.is_empty());
        assert!(config.package.is_none());
        assert_eq!(config.dist_dir(), Path::new("dist").join("main.dist"));
    }

    #[test]
    fn package_format_parses_lowercase() {
        let config = BuildConfig::from_toml(
            r#"
            [project]
            name = "helper"
            entry_file = "app.py"

            [package]
            format = "tgz"
            "#,
        )
        .unwrap();

        let package = config.package.unwrap();
        assert_eq!(package.format, ArchiveFormat::Tgz);
        assert!(package.checksum);
    }

    #[test]
    fn missing_project_is_a_config_error() {
        let err = BuildConfig::from_toml("log_file = \"x.log\"").unwrap_err();
        assert!(matches!(err, PipelineError::Config(_)));
    }

    #[test]
    fn validate_rejects_blank_interpreter() {
        let mut config = BuildConfig::default();
        config.environment.python = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[tokio::test]
    async fn saved_config_loads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);

        BuildConfig::default().save_to_file(&path).await.unwrap();
        let loaded = BuildConfig::from_file(&path).await.unwrap();

        assert_eq!(loaded.project.entry_file, Path::new("app.py"));
        assert_eq!(loaded.compiler.data_dirs.len(), 2);
        assert_eq!(loaded.verify.required.len(), 3);
        assert!(loaded.package.is_some());
    }
}

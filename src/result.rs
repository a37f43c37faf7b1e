use std::borrow::Cow;
use thiserror::Error;

/** Main Result type alias for stepbuild operations
 *
 * # Usage
 * ```no_run
 * use stepbuild::result::Result;
 *
 * fn read_manifest() -> Result<String> {
 *     // Function automatically propagates PipelineError
 *     Ok(std::fs::read_to_string("requirements.txt")?)
 * }
 * ```
 */
pub type Result<T> = std::result::Result<T, PipelineError>;

/** Error enumeration shared by the runner, the build steps and the CLI
 *
 * # Error Categories
 * - **Io**: File system and I/O operations
 * - **Process**: External tool could not start or exited non-zero
 * - **Config**: Configuration parsing and validation errors
 * - **NotFound**: Missing inputs or build outputs
 * - **TomlParse** / **TomlSerialize**: `stepbuild.toml` handling
 * - **JsonError**: Run report serialization
 *
 * A step never inspects the variant to decide what happens next: any error
 * returned by a step action is a step failure.
 */
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Process error: {0}")]
    Process(Cow<'static, str>),

    #[error("Config error: {0}")]
    Config(Cow<'static, str>),

    #[error("Not found: {0}")]
    NotFound(Cow<'static, str>),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl PipelineError {
    pub const ARCHIVE_FAILED: &'static str = "Archive creation failed";

    /** Creates a Process error with flexible message input
     *
     * # Example
     * ```ignore
     * PipelineError::process("pip exited with code 1");
     * PipelineError::process(format!("Failed to execute {}", program));
     * ```
     */
    pub fn process(msg: impl Into<Cow<'static, str>>) -> Self {
        Self::Process(msg.into())
    }

    pub fn config(msg: impl Into<Cow<'static, str>>) -> Self {
        Self::Config(msg.into())
    }

    pub fn not_found(msg: impl Into<Cow<'static, str>>) -> Self {
        Self::NotFound(msg.into())
    }
}

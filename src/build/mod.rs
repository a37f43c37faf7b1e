pub mod archive;
pub mod compile;
pub mod config;
pub mod context;
pub mod platform;
pub mod steps;
pub mod version;

pub use config::*;
pub use context::BuildContext;
pub use platform::Platform;
pub use steps::build_pipeline;
pub use version::{VersionLabel, DEFAULT_VERSION};

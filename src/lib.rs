/// stepbuild - fail-fast build pipeline for native Python app bundles
///
/// Turns a Python web application into a standalone native distribution by
/// running an ordered list of named steps, stopping at the first failure and
/// recording every step in a timestamped, append-only log.
///
/// Main modules:
/// - build: Build configuration, version labels and the build steps
/// - cli: Command-line interface parsing and execution
/// - commands: Implementation of the `build`, `setup` and `check` commands
/// - pipeline: Step runner, run log and run report
/// - result: Error handling and result types
/// - utils: Process execution and tool lookup
pub mod build;
pub mod cli;
pub mod commands;
pub mod pipeline;
pub mod result;
pub mod utils;

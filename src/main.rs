use clap::Parser;
use env_logger::Builder;
use log::LevelFilter;
use stepbuild::cli::Cli;

/** Main entry point for stepbuild
 *
 * # Process Flow
 * 1. Initialize diagnostic logging (stderr, `RUST_LOG`)
 * 2. Parse command line arguments using Clap
 * 3. Execute the requested command
 * 4. Exit with the command's code: 0 on success, 1 on a failed step or error
 *
 * # Example
 * ```bash
 * stepbuild setup
 * stepbuild build 1.2.0 --report build-report.json
 * ```
 */
#[tokio::main(flavor = "current_thread")]
async fn main() {
    init_logging();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            // help and version go to stdout and are not failures; every usage
            // error, including a bare `stepbuild`, exits 1
            std::process::exit(if e.use_stderr() { 1 } else { 0 });
        }
    };

    let code = match cli.execute().await {
        Ok(code) => code,
        Err(e) => {
            log::error!("Command failed: {}", e);
            eprintln!("Error: {}", e);
            1
        }
    };

    std::process::exit(code);
}

/// Diagnostics go to stderr at WARN unless `RUST_LOG` says otherwise. The
/// build's own audit trail is the run log, not this logger.
fn init_logging() {
    Builder::new()
        .filter_level(LevelFilter::Warn)
        .parse_default_env()
        .target(env_logger::Target::Stderr)
        .init();
}

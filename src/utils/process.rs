use crate::pipeline::RunLog;
use crate::result::{PipelineError, Result};
use std::ffi::OsStr;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::process::Command;
use which::which;

/// True when `name` resolves to an executable on PATH (or is a path to one).
pub fn command_exists(name: &str) -> bool {
    which(name).is_ok()
}

/** Runs external tools on behalf of a build step
 *
 * # Behaviour
 * - Tools run in the project directory with inherited stdio
 * - Each call blocks the step until the tool exits
 * - A tool that cannot start or exits non-zero is a `Process` error
 * - The full command line is written to the run log at DEBUG level
 */
pub struct ProcessManager<'a> {
    log: &'a RunLog,
    working_dir: PathBuf,
}

impl<'a> ProcessManager<'a> {
    pub fn new(log: &'a RunLog, working_dir: impl Into<PathBuf>) -> Self {
        Self {
            log,
            working_dir: working_dir.into(),
        }
    }

    pub fn find_executable(&self, name: &str) -> Result<PathBuf> {
        which(name).map_err(|_| {
            PipelineError::not_found(format!("Executable not found: {}", name))
        })
    }

    pub async fn run<I, S>(&self, program: impl AsRef<OsStr>, args: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let program = program.as_ref();
        let args: Vec<S> = args.into_iter().collect();
        let display = command_line(program, &args);

        self.log.debug(format!("running {}", display));
        log::debug!("Spawning `{}` in {}", display, self.working_dir.display());

        let mut command = Command::new(program);
        command.args(&args);
        command.current_dir(&self.working_dir);
        command.stdin(Stdio::null());
        command.stdout(Stdio::inherit());
        command.stderr(Stdio::inherit());

        let mut child = command.spawn().map_err(|e| {
            PipelineError::Process(format!("Failed to execute {}: {}", display, e).into())
        })?;

        let status = child.wait().await.map_err(|e| {
            PipelineError::Process(format!("Failed to wait for {}: {}", display, e).into())
        })?;

        if !status.success() {
            return Err(PipelineError::Process(
                match status.code() {
                    Some(code) => format!("{} exited with code {}", display, code),
                    None => format!("{} was terminated by a signal", display),
                }
                .into(),
            ));
        }

        Ok(())
    }
}

fn command_line<S: AsRef<OsStr>>(program: &OsStr, args: &[S]) -> String {
    let mut line = program.to_string_lossy().into_owned();
    for arg in args {
        line.push(' ');
        line.push_str(&arg.as_ref().to_string_lossy());
    }
    line
}

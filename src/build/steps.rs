use crate::build::archive::{create_archive, write_checksum};
use crate::build::compile::{compiler_args, Metadata};
use crate::build::context::BuildContext;
use crate::build::platform::Platform;
use crate::pipeline::{Pipeline, PipelineContext};
use crate::result::{PipelineError, Result};
use crate::utils::process::command_exists;
use std::ffi::OsStr;
use std::path::PathBuf;
use tokio::fs;

/** Default build pipeline
 *
 * # Steps
 * 1. check environment
 * 2. setup virtual environment
 * 3. install dependencies
 * 4. compile
 * 5. verify output
 * 6. package artifacts (only with a `[package]` section)
 */
pub fn build_pipeline<'a>(ctx: &BuildContext) -> Pipeline<'a, BuildContext> {
    let pipeline = Pipeline::new()
        .step("check environment", |ctx| Box::pin(check_environment(ctx)))
        .step("setup virtual environment", |ctx| Box::pin(setup_virtual_env(ctx)))
        .step("install dependencies", |ctx| Box::pin(install_dependencies(ctx)))
        .step("compile", |ctx| Box::pin(compile(ctx)))
        .step("verify output", |ctx| Box::pin(verify_output(ctx)));

    if ctx.config.package.is_some() {
        pipeline.step("package artifacts", |ctx| Box::pin(package_artifacts(ctx)))
    } else {
        pipeline
    }
}

pub async fn check_environment(ctx: &BuildContext) -> Result<()> {
    let python = &ctx.config.environment.python;

    if !command_exists(python) {
        ctx.log().warn(format!("{} was not found on PATH", python));
    }

    ctx.tools().run(python, ["--version"]).await
}

pub async fn setup_virtual_env(ctx: &BuildContext) -> Result<()> {
    let venv_dir = ctx.venv_dir();

    if venv_dir.exists() {
        ctx.log()
            .info(format!("reusing virtual environment at {}", venv_dir.display()));
    } else {
        ctx.log().info(format!(
            "virtual environment missing, creating {}",
            venv_dir.display()
        ));
        ctx.tools()
            .run(
                &ctx.config.environment.python,
                [OsStr::new("-m"), OsStr::new("venv"), venv_dir.as_os_str()],
            )
            .await?;
    }

    let interpreter = ctx.venv_python();
    if !interpreter.exists() {
        return Err(PipelineError::not_found(format!(
            "Virtual environment interpreter not found: {}",
            interpreter.display()
        )));
    }

    Ok(())
}

pub async fn install_dependencies(ctx: &BuildContext) -> Result<()> {
    let requirements = ctx.path(&ctx.config.environment.requirements);
    if !requirements.is_file() {
        return Err(PipelineError::not_found(format!(
            "Requirements file not found: {}",
            requirements.display()
        )));
    }

    let python = ctx.venv_python();
    let tools = ctx.tools();

    tools
        .run(
            &python,
            [
                OsStr::new("-m"),
                OsStr::new("pip"),
                OsStr::new("install"),
                OsStr::new("-r"),
                requirements.as_os_str(),
            ],
        )
        .await?;

    let compiler = &ctx.config.compiler.package;
    if !compiler.is_empty() {
        tools
            .run(&python, ["-m", "pip", "install", compiler.as_str()])
            .await?;
    }

    Ok(())
}

pub async fn compile(ctx: &BuildContext) -> Result<()> {
    let config = &ctx.config;
    let entry = ctx.path(&config.project.entry_file);
    if !entry.is_file() {
        return Err(PipelineError::not_found(format!(
            "Entry file not found: {}",
            entry.display()
        )));
    }

    let numeric_version = ctx.version.numeric();
    let mut icon = config.project.icon.as_deref();

    if ctx.platform == Platform::Windows {
        if numeric_version.is_none() {
            ctx.log().warn(format!(
                "version {} has no numeric form, skipping file version metadata",
                ctx.version
            ));
        }

        if let Some(path) = icon {
            // a missing icon is not worth failing a release build over
            if !ctx.path(path).is_file() {
                ctx.log()
                    .warn(format!("icon {} not found, building without it", path.display()));
                icon = None;
            }
        }
    }

    let metadata = Metadata {
        icon,
        company: config.project.company.as_deref(),
        product: Some(config.project.name.as_str()),
        numeric_version: numeric_version.as_deref(),
    };

    fs::create_dir_all(ctx.path(&config.compiler.output_dir)).await?;

    ctx.log().info(format!(
        "compiling {} version {} for {}",
        config.project.entry_file.display(),
        ctx.version,
        ctx.platform.as_str()
    ));

    let args = compiler_args(config, &metadata, ctx.platform);
    ctx.tools().run(ctx.venv_python(), &args).await
}

pub async fn verify_output(ctx: &BuildContext) -> Result<()> {
    let required = &ctx.config.verify.required;
    let missing: Vec<String> = required
        .iter()
        .filter(|path| !ctx.path(path).exists())
        .map(|path| path.display().to_string())
        .collect();

    if !missing.is_empty() {
        return Err(PipelineError::not_found(format!(
            "Missing build outputs: {}",
            missing.join(", ")
        )));
    }

    ctx.log()
        .info(format!("verified {} required output paths", required.len()));
    Ok(())
}

pub async fn package_artifacts(ctx: &BuildContext) -> Result<()> {
    let package = ctx
        .config
        .package
        .as_ref()
        .ok_or_else(|| PipelineError::config("No [package] section configured"))?;

    let source = ctx.path(ctx.config.dist_dir());
    let archive = archive_path(ctx);

    create_archive(&source, &archive, package.format)?;
    ctx.log().info(format!("created archive {}", archive.display()));

    if package.checksum {
        let checksum = write_checksum(&archive)?;
        ctx.log().info(format!("wrote checksum {}", checksum.display()));
    }

    Ok(())
}

/// `<output_dir>/<name>-<version>-<os>.<ext>`
pub fn archive_path(ctx: &BuildContext) -> PathBuf {
    let extension = ctx
        .config
        .package
        .as_ref()
        .map(|p| p.format.extension())
        .unwrap_or("zip");

    ctx.path(&ctx.config.compiler.output_dir).join(format!(
        "{}-{}-{}.{}",
        ctx.config.project.name,
        ctx.version,
        ctx.platform.as_str(),
        extension
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build::config::{ArchiveFormat, BuildConfig};
    use crate::build::version::VersionLabel;
    use crate::pipeline::RunLog;
    use crate::testing::SharedBuffer;
    use std::path::Path;

    fn context(root: &Path, config: BuildConfig, version: Option<&str>) -> (BuildContext, SharedBuffer) {
        let file = SharedBuffer::default();
        let log = RunLog::with_sinks(
            Box::new(SharedBuffer::default()),
            Box::new(file.clone()),
            false,
            false,
        );
        let ctx = BuildContext::new(config, root, VersionLabel::resolve(version), log)
            .with_platform(Platform::Linux);
        (ctx, file)
    }

    fn populate_dist(root: &Path) {
        let dist = root.join("dist").join("app.dist");
        std::fs::create_dir_all(dist.join("templates")).unwrap();
        std::fs::create_dir_all(dist.join("static")).unwrap();
        std::fs::write(dist.join("app.bin"), b"bin").unwrap();
    }

    #[test]
    fn pipeline_lists_steps_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let (ctx, _) = context(dir.path(), BuildConfig::default(), None);

        assert_eq!(
            build_pipeline(&ctx).step_names(),
            [
                "check environment",
                "setup virtual environment",
                "install dependencies",
                "compile",
                "verify output",
                "package artifacts",
            ]
        );
    }

    #[test]
    fn packaging_step_needs_package_section() {
        let dir = tempfile::tempdir().unwrap();
        let config = BuildConfig {
            package: None,
            ..BuildConfig::default()
        };
        let (ctx, _) = context(dir.path(), config, None);

        let pipeline = build_pipeline(&ctx);
        assert_eq!(pipeline.len(), 5);
        assert!(!pipeline.step_names().contains(&"package artifacts"));
    }

    #[tokio::test]
    async fn verify_reports_every_missing_path() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("dist").join("app.dist")).unwrap();
        let (ctx, _) = context(dir.path(), BuildConfig::default(), None);

        let err = verify_output(&ctx).await.unwrap_err().to_string();

        assert!(err.contains("dist/app.dist/templates"));
        assert!(err.contains("dist/app.dist/static"));
        assert!(!err.contains("dist/app.dist,"));
    }

    #[tokio::test]
    async fn verify_passes_when_outputs_exist() {
        let dir = tempfile::tempdir().unwrap();
        populate_dist(dir.path());
        let (ctx, file) = context(dir.path(), BuildConfig::default(), None);

        verify_output(&ctx).await.unwrap();

        assert!(file.contents().contains("verified 3 required output paths"));
    }

    #[tokio::test]
    async fn package_writes_versioned_archive_and_checksum() {
        let dir = tempfile::tempdir().unwrap();
        populate_dist(dir.path());
        let mut config = BuildConfig::default();
        config.project.name = "helper".to_string();
        if let Some(package) = config.package.as_mut() {
            package.format = ArchiveFormat::Zip;
        }
        let (ctx, _) = context(dir.path(), config, Some("2.4.1"));

        package_artifacts(&ctx).await.unwrap();

        let archive = dir.path().join("dist").join("helper-2.4.1-linux.zip");
        assert_eq!(archive_path(&ctx), archive);
        assert!(archive.is_file());
        assert!(dir.path().join("dist").join("helper-2.4.1-linux.zip.sha256").is_file());
    }

    #[tokio::test]
    async fn default_version_names_the_archive() {
        let dir = tempfile::tempdir().unwrap();
        let (ctx, _) = context(dir.path(), BuildConfig::default(), None);

        let name = archive_path(&ctx);
        assert!(name.ends_with("app-1.0.0-linux.tar.gz") || name.ends_with("app-1.0.0-linux.zip"));
    }

    #[tokio::test]
    async fn missing_requirements_fail_before_pip() {
        let dir = tempfile::tempdir().unwrap();
        let (ctx, _) = context(dir.path(), BuildConfig::default(), None);

        let err = install_dependencies(&ctx).await.unwrap_err();
        assert!(matches!(err, PipelineError::NotFound(_)));
    }

    #[tokio::test]
    async fn missing_entry_file_fails_compile() {
        let dir = tempfile::tempdir().unwrap();
        let (ctx, _) = context(dir.path(), BuildConfig::default(), None);

        let err = compile(&ctx).await.unwrap_err();
        assert!(err.to_string().contains("app.py"));
    }

    #[tokio::test]
    async fn missing_interpreter_stops_at_first_step() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = BuildConfig::default();
        config.environment.python = "stepbuild-no-such-python-3f9a".to_string();
        let (ctx, file) = context(dir.path(), config, None);

        let report = build_pipeline(&ctx).run(&ctx).await;

        assert_eq!(report.exit_code(), 1);
        assert_eq!(report.failed_step(), Some("check environment"));
        assert_eq!(report.steps.len(), 1);

        let log = file.contents();
        assert!(log.contains("[WARN]: stepbuild-no-such-python-3f9a was not found on PATH"));
        assert!(log.contains("[ERROR]: step check environment failed, duration 00:00:00"));
        assert!(!log.contains("setup virtual environment"));
        assert!(!dir.path().join(".venv").exists());
    }
}

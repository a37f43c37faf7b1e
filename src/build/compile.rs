use crate::build::config::BuildConfig;
use crate::build::platform::Platform;
use std::path::Path;

/// Windows executable metadata handed to the compiler.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Metadata<'a> {
    pub icon: Option<&'a Path>,
    pub company: Option<&'a str>,
    pub product: Option<&'a str>,
    pub numeric_version: Option<&'a str>,
}

/** Assembles the `python -m nuitka ...` argument list
 *
 * # Order
 * 1. `-m <module> --standalone`
 * 2. One `--include-data-dir=<dir>=<dir>` per data directory
 * 3. Output directory, LTO and auto-confirm flags
 * 4. Windows-only metadata flags
 * 5. Extra arguments from the configuration
 * 6. The entry file
 */
pub fn compiler_args(config: &BuildConfig, metadata: &Metadata<'_>, platform: Platform) -> Vec<String> {
    let compiler = &config.compiler;
    let mut args = vec![
        "-m".to_string(),
        compiler.module.clone(),
        "--standalone".to_string(),
    ];

    for dir in &compiler.data_dirs {
        let dir = forward_slashes(dir);
        args.push(format!("--include-data-dir={}={}", dir, dir));
    }

    args.push(format!("--output-dir={}", forward_slashes(&compiler.output_dir)));
    args.push(format!("--lto={}", if compiler.lto { "yes" } else { "no" }));

    if compiler.assume_yes {
        args.push("--assume-yes-for-downloads".to_string());
    }

    if platform == Platform::Windows {
        if let Some(icon) = metadata.icon {
            args.push(format!("--windows-icon-from-ico={}", icon.display()));
        }
        if let Some(company) = metadata.company {
            args.push(format!("--company-name={}", company));
        }
        if let Some(product) = metadata.product {
            args.push(format!("--product-name={}", product));
        }
        if let Some(version) = metadata.numeric_version {
            args.push(format!("--file-version={}", version));
            args.push(format!("--product-version={}", version));
        }
    }

    args.extend(compiler.args.iter().cloned());
    args.push(config.project.entry_file.to_string_lossy().into_owned());
    args
}

fn forward_slashes(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

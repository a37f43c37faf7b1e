use crate::build::config::ArchiveFormat;
use crate::result::{PipelineError, Result};
use flate2::write::GzEncoder;
use flate2::Compression;
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

/** Packs a build directory into a release archive
 *
 * # Layout
 * Entries are stored under the directory's own name, so unpacking
 * `app-1.0.0-linux.tar.gz` yields `app.dist/...`.
 *
 * # Notes
 * - An existing archive at `destination` is replaced
 * - Unix permission bits are preserved in both formats
 */
pub fn create_archive(source: &Path, destination: &Path, format: ArchiveFormat) -> Result<()> {
    if !source.is_dir() {
        return Err(PipelineError::not_found(format!(
            "Nothing to package, {} is not a directory",
            source.display()
        )));
    }

    if let Some(parent) = destination.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let prefix = source
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "dist".to_string());

    match format {
        ArchiveFormat::Zip => write_zip(source, destination, &prefix),
        ArchiveFormat::Tgz => write_tgz(source, destination, &prefix),
    }
}

fn write_zip(source: &Path, destination: &Path, prefix: &str) -> Result<()> {
    let file = File::create(destination)?;
    let mut zip = ZipWriter::new(BufWriter::new(file));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    zip.add_directory(format!("{}/", prefix), options)
        .map_err(zip_error)?;

    for path in collect_entries(source)? {
        let relative = path
            .strip_prefix(source)
            .map_err(|e| PipelineError::process(format!("{}: {}", PipelineError::ARCHIVE_FAILED, e)))?;
        let name = format!(
            "{}/{}",
            prefix,
            relative.to_string_lossy().replace('\\', "/")
        );

        if path.is_dir() {
            zip.add_directory(format!("{}/", name), options)
                .map_err(zip_error)?;
        } else {
            zip.start_file(name, options.unix_permissions(file_mode(&path)?))
                .map_err(zip_error)?;
            let mut input = File::open(&path)?;
            io::copy(&mut input, &mut zip)?;
        }
    }

    let mut writer = zip.finish().map_err(zip_error)?;
    writer.flush()?;
    Ok(())
}

fn write_tgz(source: &Path, destination: &Path, prefix: &str) -> Result<()> {
    let file = File::create(destination)?;
    let encoder = GzEncoder::new(BufWriter::new(file), Compression::default());
    let mut tar = tar::Builder::new(encoder);

    tar.append_dir_all(prefix, source).map_err(|e| {
        PipelineError::Process(format!("{}: {}", PipelineError::ARCHIVE_FAILED, e).into())
    })?;

    let encoder = tar.into_inner()?;
    let mut writer = encoder.finish()?;
    writer.flush()?;
    Ok(())
}

/// All files and directories below `dir`, depth first, in a stable order.
fn collect_entries(dir: &Path) -> Result<Vec<PathBuf>> {
    fn visit(dir: &Path, out: &mut Vec<PathBuf>) -> io::Result<()> {
        let mut entries: Vec<PathBuf> = std::fs::read_dir(dir)?
            .map(|entry| entry.map(|e| e.path()))
            .collect::<io::Result<_>>()?;
        entries.sort();

        for path in entries {
            let is_dir = path.is_dir();
            out.push(path.clone());
            if is_dir {
                visit(&path, out)?;
            }
        }
        Ok(())
    }

    let mut out = Vec::new();
    visit(dir, &mut out)?;
    Ok(out)
}

#[cfg(unix)]
fn file_mode(path: &Path) -> Result<u32> {
    Ok(std::fs::metadata(path)?.permissions().mode() & 0o777)
}

#[cfg(not(unix))]
fn file_mode(_path: &Path) -> Result<u32> {
    Ok(0o644)
}

fn zip_error(e: zip::result::ZipError) -> PipelineError {
    PipelineError::Process(format!("{}: {}", PipelineError::ARCHIVE_FAILED, e).into())
}

/// Lowercase hex SHA-256 of a file's contents.
pub fn sha256_file(path: &Path) -> Result<String> {
    let mut file = File::open(path)?;
    let mut hasher = Sha256::new();
    io::copy(&mut file, &mut hasher)?;

    Ok(hasher
        .finalize()
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect())
}

/// Writes `<archive>.sha256` in `sha256sum` format and returns its path.
pub fn write_checksum(archive: &Path) -> Result<PathBuf> {
    let digest = sha256_file(archive)?;
    let file_name = archive
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let mut checksum_path = archive.as_os_str().to_owned();
    checksum_path.push(".sha256");
    let checksum_path = PathBuf::from(checksum_path);

    std::fs::write(&checksum_path, format!("{}  {}\n", digest, file_name))?;
    Ok(checksum_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::read::GzDecoder;
    use std::collections::BTreeSet;

    fn sample_dist(root: &Path) -> PathBuf {
        let dist = root.join("dist").join("app.dist");
        std::fs::create_dir_all(dist.join("templates")).unwrap();
        std::fs::write(dist.join("app.bin"), b"binary").unwrap();
        std::fs::write(dist.join("templates").join("index.html"), b"<html></html>").unwrap();
        dist
    }

    #[test]
    fn zip_contains_prefixed_entries() {
        let dir = tempfile::tempdir().unwrap();
        let dist = sample_dist(dir.path());
        let archive = dir.path().join("out").join("app-1.0.0-windows.zip");

        create_archive(&dist, &archive, ArchiveFormat::Zip).unwrap();

        let mut zip = zip::ZipArchive::new(File::open(&archive).unwrap()).unwrap();
        let names: BTreeSet<String> = zip.file_names().map(str::to_string).collect();
        assert!(names.contains("app.dist/"));
        assert!(names.contains("app.dist/app.bin"));
        assert!(names.contains("app.dist/templates/"));
        assert!(names.contains("app.dist/templates/index.html"));

        let mut content = String::new();
        io::Read::read_to_string(&mut zip.by_name("app.dist/app.bin").unwrap(), &mut content)
            .unwrap();
        assert_eq!(content, "binary");
    }

    #[test]
    fn tgz_contains_prefixed_entries() {
        let dir = tempfile::tempdir().unwrap();
        let dist = sample_dist(dir.path());
        let archive = dir.path().join("app-1.0.0-linux.tar.gz");

        create_archive(&dist, &archive, ArchiveFormat::Tgz).unwrap();

        let decoder = GzDecoder::new(File::open(&archive).unwrap());
        let mut tar = tar::Archive::new(decoder);
        let names: BTreeSet<String> = tar
            .entries()
            .unwrap()
            .map(|e| e.unwrap().path().unwrap().to_string_lossy().trim_end_matches('/').to_string())
            .collect();

        assert!(names.contains("app.dist/app.bin"));
        assert!(names.contains("app.dist/templates/index.html"));
    }

    #[test]
    fn missing_source_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = create_archive(
            &dir.path().join("nope"),
            &dir.path().join("x.zip"),
            ArchiveFormat::Zip,
        )
        .unwrap_err();

        assert!(matches!(err, PipelineError::NotFound(_)));
    }

    #[test]
    fn checksum_file_matches_sha256sum_format() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("release.zip");
        std::fs::write(&archive, b"abc").unwrap();

        let checksum = write_checksum(&archive).unwrap();

        assert_eq!(checksum, dir.path().join("release.zip.sha256"));
        assert_eq!(
            std::fs::read_to_string(&checksum).unwrap(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad  release.zip\n"
        );
    }
}

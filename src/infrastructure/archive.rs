//! Zip archive writer for layer payloads

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Component, Path};

use tracing::debug;
use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, DateTime, ZipWriter};

use crate::infrastructure::traits::Archiver;
use crate::infrastructure::{InfraError, InfraResult};

/// Writes a directory tree into a single deflated zip file.
///
/// Entries are rooted at the source directory's own name, so archiving
/// `build/python` yields `python/...` entries. Walk order is sorted by file
/// name and timestamps are fixed, so the same tree gives the same bytes.
#[derive(Debug, Default)]
pub struct ZipArchiver;

impl Archiver for ZipArchiver {
    fn create(&self, source_dir: &Path, archive: &Path) -> InfraResult<usize> {
        let root_name = source_dir
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .ok_or_else(|| {
                InfraError::io(
                    format!("archive source has no name: {}", source_dir.display()),
                    io::Error::from(io::ErrorKind::InvalidInput),
                )
            })?;

        let file = File::create(archive)
            .map_err(|e| InfraError::io(format!("create {}", archive.display()), e))?;
        let mut writer = ZipWriter::new(BufWriter::new(file));
        writer
            .add_directory(format!("{root_name}/"), entry_options(unix_mode(source_dir)))
            .map_err(|e| archive_err(&root_name, e))?;

        let mut files = 0;
        for entry in WalkDir::new(source_dir)
            .min_depth(1)
            .sort_by_file_name()
        {
            let entry = entry.map_err(|e| {
                InfraError::io(format!("walk {}", source_dir.display()), io::Error::from(e))
            })?;
            let rel_path = entry.path().strip_prefix(source_dir).map_err(|e| {
                InfraError::io(
                    format!("strip prefix {}", entry.path().display()),
                    io::Error::new(io::ErrorKind::InvalidInput, e.to_string()),
                )
            })?;
            let name = entry_name(&root_name, rel_path);
            let options = entry_options(unix_mode(entry.path()));

            if entry.file_type().is_dir() {
                writer
                    .add_directory(format!("{name}/"), options)
                    .map_err(|e| archive_err(&name, e))?;
            } else {
                writer
                    .start_file(name.clone(), options)
                    .map_err(|e| archive_err(&name, e))?;
                let mut source = File::open(entry.path()).map_err(|e| {
                    InfraError::io(format!("open {}", entry.path().display()), e)
                })?;
                io::copy(&mut source, &mut writer)
                    .map_err(|e| InfraError::io(format!("write entry {name}"), e))?;
                files += 1;
            }
        }

        writer
            .finish()
            .map_err(|e| archive_err(&archive.display().to_string(), e))?
            .flush()
            .map_err(|e| InfraError::io(format!("flush {}", archive.display()), e))?;
        debug!("create: {} files -> {}", files, archive.display());
        Ok(files)
    }
}

/// Zip entry name with forward slashes regardless of platform.
fn entry_name(root_name: &str, rel_path: &Path) -> String {
    let mut name = root_name.to_string();
    for component in rel_path.components() {
        if let Component::Normal(part) = component {
            name.push('/');
            name.push_str(&part.to_string_lossy());
        }
    }
    name
}

/// Entries carry the zip epoch (1980-01-01) instead of the build time.
fn entry_options(mode: u32) -> SimpleFileOptions {
    SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .last_modified_time(DateTime::default())
        .unix_permissions(mode)
}

fn archive_err(context: &str, source: zip::result::ZipError) -> InfraError {
    InfraError::Archive {
        context: context.to_string(),
        source,
    }
}

#[cfg(unix)]
fn unix_mode(path: &Path) -> u32 {
    use std::os::unix::fs::PermissionsExt;
    std::fs::metadata(path)
        .map(|m| m.permissions().mode() & 0o777)
        .unwrap_or(0o644)
}

#[cfg(not(unix))]
fn unix_mode(path: &Path) -> u32 {
    if path.is_dir() {
        0o755
    } else {
        0o644
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_nested_path_when_entry_name_then_rooted_with_forward_slashes() {
        let rel = Path::new("requests").join("adapters.py");
        assert_eq!(entry_name("python", &rel), "python/requests/adapters.py");
    }
}

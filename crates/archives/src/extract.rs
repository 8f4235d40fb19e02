use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Component, Path, PathBuf};

use flate2::read::GzDecoder;
use tracing::{info, warn};

use crate::digest::open_error;
use crate::{AcquireError, Result};

/// Container formats we know how to unpack, keyed by file suffix.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ArchiveFormat {
    Zip,
    TarGz,
    Unsupported(String),
}

impl ArchiveFormat {
    pub fn detect(path: &Path) -> Self {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        if name.ends_with(".zip") {
            ArchiveFormat::Zip
        } else if name.ends_with(".tar.gz") {
            ArchiveFormat::TarGz
        } else {
            let suffix = path
                .extension()
                .map(|e| format!(".{}", e.to_string_lossy()))
                .unwrap_or_default();
            ArchiveFormat::Unsupported(suffix)
        }
    }
}

type Extractor = fn(&Path, &Path) -> Result<usize>;

/// Unpack every member of `archive` into `dest` and return the number of
/// regular files written.
pub fn extract(archive: &Path, dest: &Path) -> Result<usize> {
    if !archive.exists() {
        return Err(AcquireError::NotFound { path: archive.to_path_buf() });
    }

    let extractor: Extractor = match ArchiveFormat::detect(archive) {
        ArchiveFormat::Zip => extract_zip,
        ArchiveFormat::TarGz => extract_tar_gz,
        ArchiveFormat::Unsupported(_) => {
            return Err(AcquireError::UnsupportedFormat { path: archive.to_path_buf() })
        }
    };

    fs::create_dir_all(dest).map_err(|e| AcquireError::io(dest, e))?;

    info!(archive = %archive.display(), dest = %dest.display(), "extracting");
    let written = extractor(archive, dest)?;
    info!(archive = %archive.display(), files = written, "extraction complete");
    Ok(written)
}

/// Relative path for an archive member, or `None` if it would land outside
/// the destination (absolute, `..`, or a drive prefix). `.` components are
/// dropped, so a bare `./` yields an empty path.
pub fn sanitize_member_path(raw: &Path) -> Option<PathBuf> {
    let mut out = PathBuf::new();
    for comp in raw.components() {
        match comp {
            Component::Normal(part) => out.push(part),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => return None,
        }
    }
    Some(out)
}

fn extract_zip(archive: &Path, dest: &Path) -> Result<usize> {
    let file = File::open(archive).map_err(|e| open_error(archive, e))?;
    let mut zip = zip::ZipArchive::new(BufReader::new(file)).map_err(|e| archive_error(archive, e))?;

    let mut written = 0;
    for i in 0..zip.len() {
        let mut entry = zip.by_index(i).map_err(|e| archive_error(archive, e))?;
        let rel = sanitize_member_path(Path::new(entry.name()))
            .ok_or_else(|| unsafe_entry(archive, entry.name()))?;
        if rel.as_os_str().is_empty() {
            continue;
        }

        let target = dest.join(rel);
        if entry.is_dir() {
            fs::create_dir_all(&target).map_err(|e| AcquireError::io(&target, e))?;
            continue;
        }
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).map_err(|e| AcquireError::io(parent, e))?;
        }

        let mut out = File::create(&target).map_err(|e| AcquireError::io(&target, e))?;
        std::io::copy(&mut entry, &mut out).map_err(|e| AcquireError::io(&target, e))?;
        written += 1;
    }
    Ok(written)
}

fn extract_tar_gz(archive: &Path, dest: &Path) -> Result<usize> {
    let file = File::open(archive).map_err(|e| open_error(archive, e))?;
    let mut tar = tar::Archive::new(GzDecoder::new(BufReader::new(file)));

    let mut written = 0;
    let entries = tar.entries().map_err(|e| archive_error(archive, e))?;
    for entry in entries {
        let mut entry = entry.map_err(|e| archive_error(archive, e))?;
        let raw = entry
            .path()
            .map_err(|e| archive_error(archive, e))?
            .into_owned();
        let rel = sanitize_member_path(&raw)
            .ok_or_else(|| unsafe_entry(archive, &raw.to_string_lossy()))?;
        if rel.as_os_str().is_empty() {
            continue;
        }

        let kind = entry.header().entry_type();
        if kind.is_symlink() || kind.is_hard_link() {
            warn!(archive = %archive.display(), entry = %raw.display(), "skipping link member");
            continue;
        }

        let target = dest.join(&rel);
        if kind.is_dir() {
            fs::create_dir_all(&target).map_err(|e| AcquireError::io(&target, e))?;
            continue;
        }
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).map_err(|e| AcquireError::io(parent, e))?;
        }

        entry.unpack(&target).map_err(|e| AcquireError::io(&target, e))?;
        if kind.is_file() {
            written += 1;
        }
    }
    Ok(written)
}

fn archive_error(path: &Path, e: impl std::fmt::Display) -> AcquireError {
    AcquireError::Archive { path: path.to_path_buf(), message: e.to_string() }
}

fn unsafe_entry(archive: &Path, entry: &str) -> AcquireError {
    AcquireError::UnsafeEntry { archive: archive.to_path_buf(), entry: entry.to_string() }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_format() {
        assert_eq!(ArchiveFormat::detect(Path::new("raw/EEGEOGDenoisingData.zip")), ArchiveFormat::Zip);
        assert_eq!(ArchiveFormat::detect(Path::new("raw/EEGDenoiseNet_EMG.tar.gz")), ArchiveFormat::TarGz);
        assert_eq!(
            ArchiveFormat::detect(Path::new("raw/data.rar")),
            ArchiveFormat::Unsupported(".rar".into())
        );
        // plain gzip is not a tarball
        assert_eq!(
            ArchiveFormat::detect(Path::new("raw/data.gz")),
            ArchiveFormat::Unsupported(".gz".into())
        );
    }

    #[test]
    fn test_sanitize_accepts_nested_relative() {
        assert_eq!(
            sanitize_member_path(Path::new("./EMG/sub/a.npy")),
            Some(PathBuf::from("EMG/sub/a.npy"))
        );
        assert_eq!(sanitize_member_path(Path::new("./")), Some(PathBuf::new()));
    }

    #[test]
    fn test_sanitize_rejects_escapes() {
        assert_eq!(sanitize_member_path(Path::new("../evil.sh")), None);
        assert_eq!(sanitize_member_path(Path::new("a/../../evil.sh")), None);
        assert_eq!(sanitize_member_path(Path::new("/etc/passwd")), None);
    }

    #[test]
    fn test_unsupported_suffix_creates_nothing() {
        let tmp = tempfile::tempdir().unwrap();
        let archive = tmp.path().join("data.rar");
        fs::write(&archive, b"not really").unwrap();
        let dest = tmp.path().join("out");

        let err = extract(&archive, &dest).unwrap_err();
        assert!(matches!(err, AcquireError::UnsupportedFormat { .. }));
        assert!(!dest.exists());
    }

    #[test]
    fn test_missing_archive_is_not_found() {
        let tmp = tempfile::tempdir().unwrap();
        let err = extract(&tmp.path().join("absent.zip"), &tmp.path().join("out")).unwrap_err();
        assert!(matches!(err, AcquireError::NotFound { .. }));
    }
}

//! Handles to located resources.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Opaque handle to a located resource.
///
/// A handle either points at a file on disk or at an entry inside a packaged
/// archive. Handles are cheap to clone and are what the orchestrator keeps
/// around between registration and teardown.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ResourceHandle {
    /// A regular file on the filesystem.
    File(PathBuf),

    /// An entry inside a `.zip`/`.jar` archive.
    Archived {
        /// Path of the archive on disk.
        archive: PathBuf,
        /// Entry name inside the archive (forward slashes, no leading `/`).
        entry: String,
    },
}

impl ResourceHandle {
    /// Create a handle for a file on disk.
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self::File(path.into())
    }

    /// Create a handle for an archive entry.
    pub fn archived(archive: impl Into<PathBuf>, entry: impl Into<String>) -> Self {
        Self::Archived {
            archive: archive.into(),
            entry: entry.into(),
        }
    }

    /// The final path component (e.g. `customer.sql`).
    pub fn file_name(&self) -> Option<&str> {
        match self {
            Self::File(path) => path.file_name().and_then(|name| name.to_str()),
            Self::Archived { entry, .. } => entry.rsplit('/').next().filter(|s| !s.is_empty()),
        }
    }

    /// Path of the resource with forward slashes.
    ///
    /// Archive entries are rooted at `/` so that anchor directories can be
    /// found the same way for both variants.
    pub fn logical_path(&self) -> String {
        match self {
            Self::File(path) => path.to_string_lossy().replace('\\', "/"),
            Self::Archived { entry, .. } => format!("/{}", entry.trim_start_matches('/')),
        }
    }

    /// Check that the resource can still be opened.
    pub fn verify(&self) -> io::Result<()> {
        match self {
            Self::File(path) => {
                let meta = fs::metadata(path)?;
                if meta.is_file() {
                    Ok(())
                } else {
                    Err(io::Error::new(
                        io::ErrorKind::NotFound,
                        format!("{} is not a regular file", path.display()),
                    ))
                }
            }
            Self::Archived { archive, entry } => with_archive_entry(archive, entry, |_| Ok(())),
        }
    }

    /// Check that the handle can still be turned into a location.
    ///
    /// Unlike [`verify`](Self::verify) this does not require the resource
    /// itself to exist: a file handle is its own location, while an archive
    /// entry needs its archive to still be on disk.
    pub fn check_origin(&self) -> io::Result<()> {
        match self {
            Self::File(_) => Ok(()),
            Self::Archived { archive, .. } => {
                if fs::metadata(archive)?.is_file() {
                    Ok(())
                } else {
                    Err(io::Error::new(
                        io::ErrorKind::NotFound,
                        format!("{} is not an archive file", archive.display()),
                    ))
                }
            }
        }
    }

    /// Read the full contents of the resource.
    pub fn read(&self) -> io::Result<Vec<u8>> {
        match self {
            Self::File(path) => fs::read(path),
            Self::Archived { archive, entry } => with_archive_entry(archive, entry, |file| {
                let mut buf = Vec::new();
                io::Read::read_to_end(file, &mut buf)?;
                Ok(buf)
            }),
        }
    }

    /// Read the resource as UTF-8 text.
    pub fn read_to_string(&self) -> io::Result<String> {
        let bytes = self.read()?;
        String::from_utf8(bytes).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }

    /// Key identifying the physical resource behind this handle.
    ///
    /// Two handles reaching the same file through different paths (`./a` and
    /// `a`, symlinked directories) share a key.
    pub fn physical_key(&self) -> ResourceHandle {
        match self {
            Self::File(path) => Self::File(canonical_or_self(path)),
            Self::Archived { archive, entry } => Self::Archived {
                archive: canonical_or_self(archive),
                entry: entry.clone(),
            },
        }
    }
}

impl fmt::Display for ResourceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File(path) => write!(f, "{}", path.display()),
            Self::Archived { archive, entry } => write!(f, "{}!/{}", archive.display(), entry),
        }
    }
}

fn canonical_or_self(path: &Path) -> PathBuf {
    fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

#[cfg(feature = "archive")]
fn with_archive_entry<T>(
    archive: &Path,
    entry: &str,
    f: impl FnOnce(&mut dyn io::Read) -> io::Result<T>,
) -> io::Result<T> {
    let file = fs::File::open(archive)?;
    let mut zip = zip::ZipArchive::new(file).map_err(zip_to_io)?;
    let mut file = zip.by_name(entry).map_err(zip_to_io)?;
    f(&mut file)
}

#[cfg(not(feature = "archive"))]
fn with_archive_entry<T>(
    archive: &Path,
    _entry: &str,
    _f: impl FnOnce(&mut dyn io::Read) -> io::Result<T>,
) -> io::Result<T> {
    Err(io::Error::new(
        io::ErrorKind::Unsupported,
        format!("archive support disabled, cannot open {}", archive.display()),
    ))
}

#[cfg(feature = "archive")]
fn zip_to_io(err: zip::result::ZipError) -> io::Error {
    match err {
        zip::result::ZipError::Io(e) => e,
        zip::result::ZipError::FileNotFound => {
            io::Error::new(io::ErrorKind::NotFound, "entry not found in archive")
        }
        other => io::Error::new(io::ErrorKind::InvalidData, other),
    }
}

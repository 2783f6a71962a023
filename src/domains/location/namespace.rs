//! Filesystem and packaged-namespace scanning.
//!
//! Both namespaces answer the same question: which resources match a glob.
//! The packaged namespace is an ordered list of roots, each a directory or a
//! `.zip`/`.jar` archive, searched the way a classpath is.

use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

use super::error::LocationError;
use super::handle::ResourceHandle;
use super::pattern::GlobPattern;

/// Resources matched under one search base.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Matches {
    /// Logical path (forward slashes) of the directory the glob was expanded
    /// from. Archive bases are rooted at `/`.
    pub base: String,

    pub handles: Vec<ResourceHandle>,
}

impl Matches {
    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }
}

/// Scan `root` for files matching `glob`.
///
/// The glob base is joined onto `root` (absolute bases replace it). Results
/// are sorted by path.
pub fn scan_directory(root: &Path, glob: &GlobPattern) -> Result<Matches, LocationError> {
    let base = root.join(strip_dot_segments(glob.base()));
    let logical_base = base.to_string_lossy().replace('\\', "/");

    if glob.is_literal() {
        return if base.is_file() {
            Ok(Matches {
                base: logical_base,
                handles: vec![ResourceHandle::file(base)],
            })
        } else {
            Err(LocationError::BaseNotFound(base))
        };
    }

    if !base.is_dir() {
        return Err(LocationError::BaseNotFound(base));
    }

    let mut found = Vec::new();
    for entry in WalkDir::new(&base).follow_links(true).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                debug!("Skipping unreadable entry under {}: {}", base.display(), e);
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let Ok(relative) = entry.path().strip_prefix(&base) else {
            continue;
        };
        if glob.matches(relative) {
            found.push(ResourceHandle::file(entry.into_path()));
        }
    }
    Ok(Matches {
        base: logical_base,
        handles: found,
    })
}

/// Drop `.` segments so `./sql` and `sql` name the same base.
fn strip_dot_segments(base: &str) -> PathBuf {
    if base.starts_with('/') {
        return PathBuf::from(base);
    }
    base.split('/').filter(|s| !s.is_empty() && *s != ".").collect()
}

/// One root of the packaged namespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PackagedRoot {
    /// An exploded resource directory.
    Directory(PathBuf),

    /// A packaged archive.
    #[cfg(feature = "archive")]
    Archive(PathBuf),
}

impl PackagedRoot {
    /// Classify a root by its extension: `.zip` and `.jar` are archives.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        #[cfg(feature = "archive")]
        {
            let is_archive = path
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| ext.eq_ignore_ascii_case("zip") || ext.eq_ignore_ascii_case("jar"));
            if is_archive {
                return Self::Archive(path);
            }
        }
        Self::Directory(path)
    }

    /// Path of the root on disk.
    pub fn path(&self) -> &Path {
        match self {
            Self::Directory(path) => path,
            #[cfg(feature = "archive")]
            Self::Archive(path) => path,
        }
    }

    fn scan(&self, glob: &GlobPattern) -> Result<Matches, LocationError> {
        match self {
            Self::Directory(dir) => scan_directory(dir, &rooted(glob)?),
            #[cfg(feature = "archive")]
            Self::Archive(archive) => scan_archive(archive, glob),
        }
    }
}

/// Re-root an absolute packaged glob onto a root directory.
fn rooted(glob: &GlobPattern) -> Result<GlobPattern, LocationError> {
    if glob.base().starts_with('/') {
        // Rebuild with the leading slash removed so it joins under the root.
        return GlobPattern::compile(&relative_glob(glob));
    }
    Ok(glob.clone())
}

fn relative_glob(glob: &GlobPattern) -> String {
    glob.source().trim_start_matches('/').to_string()
}

#[cfg(feature = "archive")]
fn scan_archive(archive: &Path, glob: &GlobPattern) -> Result<Matches, LocationError> {
    let to_err = |source| LocationError::Archive {
        archive: archive.to_path_buf(),
        source,
    };

    let file = std::fs::File::open(archive)?;
    let zip = zip::ZipArchive::new(file).map_err(to_err)?;
    let glob = GlobPattern::compile(&relative_glob(glob))?;
    let base = glob.base().trim_end_matches('/');

    let mut entries: Vec<&str> = zip
        .file_names()
        .filter(|name| !name.ends_with('/'))
        .collect();
    entries.sort_unstable();

    let handles = entries
        .into_iter()
        .filter_map(|name| {
            let relative = if glob.is_literal() {
                (name == base).then_some("")?
            } else if base.is_empty() {
                name
            } else {
                name.strip_prefix(base)?.strip_prefix('/')?
            };
            glob.matches(Path::new(relative))
                .then(|| ResourceHandle::archived(archive, name))
        })
        .collect();
    Ok(Matches {
        base: format!("/{base}"),
        handles,
    })
}

/// The packaged (bundled) resource namespace.
#[derive(Debug, Clone, Default)]
pub struct PackagedNamespace {
    roots: Vec<PackagedRoot>,
}

impl PackagedNamespace {
    /// Create a namespace from ordered roots.
    pub fn new(roots: Vec<PackagedRoot>) -> Self {
        Self { roots }
    }

    /// Create a namespace from paths, classifying each one.
    pub fn from_paths<I, P>(paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self::new(paths.into_iter().map(PackagedRoot::from_path).collect())
    }

    /// The configured roots, in search order.
    pub fn roots(&self) -> &[PackagedRoot] {
        &self.roots
    }

    /// Resolve a glob such as `/sql/**/*.sql`.
    ///
    /// Roots are searched in order and the first root with matches wins. A
    /// root that cannot be scanned is skipped.
    pub fn resolve(&self, glob: &str) -> Result<Matches, LocationError> {
        if self.roots.is_empty() {
            return Err(LocationError::NoPackagedRoots);
        }
        let glob = GlobPattern::compile(glob)?;

        for root in &self.roots {
            match root.scan(&glob) {
                Ok(found) if !found.is_empty() => return Ok(found),
                Ok(_) => {}
                Err(e) => debug!("Packaged root {} skipped: {}", root.path().display(), e),
            }
        }
        Ok(Matches::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn touch(root: &Path, rel: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, rel).unwrap();
    }

    #[test]
    fn test_scan_directory_recursive() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "sql/customer.sql");
        touch(dir.path(), "sql/batch/orders.sql");
        touch(dir.path(), "sql/readme.txt");

        let glob = GlobPattern::compile("./sql/**/*.sql").unwrap();
        let found = scan_directory(dir.path(), &glob).unwrap();
        assert_eq!(found.base, dir.path().join("sql").to_string_lossy().replace('\\', "/"));
        let names: Vec<_> = found.handles.iter().filter_map(|h| h.file_name()).collect();
        assert_eq!(names, vec!["orders.sql", "customer.sql"]);
    }

    #[test]
    fn test_scan_directory_missing_base() {
        let dir = tempfile::tempdir().unwrap();
        let glob = GlobPattern::compile("./sql/**/*.sql").unwrap();
        assert!(matches!(
            scan_directory(dir.path(), &glob),
            Err(LocationError::BaseNotFound(_))
        ));
    }

    #[test]
    fn test_packaged_first_root_with_matches_wins() {
        let first = tempfile::tempdir().unwrap();
        let second = tempfile::tempdir().unwrap();
        touch(first.path(), "lnk/other.txt");
        touch(second.path(), "lnk/alias.json");

        let namespace = PackagedNamespace::from_paths([first.path(), second.path()]);
        let found = namespace.resolve("/lnk/*.json").unwrap().handles;
        assert_eq!(found.len(), 1);
        assert!(found[0].logical_path().starts_with(&second.path().to_string_lossy().replace('\\', "/")));
    }

    #[test]
    fn test_packaged_without_roots() {
        let namespace = PackagedNamespace::default();
        assert!(matches!(
            namespace.resolve("/sql/**/*.sql"),
            Err(LocationError::NoPackagedRoots)
        ));
    }

    #[cfg(feature = "archive")]
    #[test]
    fn test_packaged_archive_root() {
        use std::io::Write;

        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("app.jar");
        let mut writer = zip::ZipWriter::new(fs::File::create(&archive).unwrap());
        let options = zip::write::SimpleFileOptions::default();
        for name in ["templates/a.jrxml", "templates/sub/b.jrxml", "templates/c.txt", "other/d.jrxml"] {
            writer.start_file(name, options).unwrap();
            writer.write_all(b"<jasperReport/>").unwrap();
        }
        writer.finish().unwrap();

        let namespace = PackagedNamespace::from_paths([&archive]);
        assert!(matches!(namespace.roots()[0], PackagedRoot::Archive(_)));

        let found = namespace.resolve("/templates/**/*.jrxml").unwrap();
        assert_eq!(found.base, "/templates");
        let entries: Vec<_> = found.handles.iter().map(|h| h.logical_path()).collect();
        assert_eq!(entries, vec!["/templates/a.jrxml", "/templates/sub/b.jrxml"]);
    }
}

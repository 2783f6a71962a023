//! Location patterns and glob compilation.
//!
//! A location pattern is a glob prefixed with the namespace it is resolved
//! against: `file:` for the filesystem, `classpath:` for the packaged
//! namespace. Patterns support `**` (any number of directories), `*` (within
//! one path segment) and `?`.

use globset::{GlobBuilder, GlobMatcher};
use std::path::Path;

use super::error::LocationError;

/// Prefix selecting the filesystem namespace.
pub const FILE_PREFIX: &str = "file:";

/// Prefix selecting the packaged namespace.
pub const CLASSPATH_PREFIX: &str = "classpath:";

/// A glob bound to the namespace it is resolved against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocationPattern {
    /// Resolved against the filesystem (relative paths against the working directory).
    File(String),

    /// Resolved against the packaged namespace roots.
    Packaged(String),
}

impl LocationPattern {
    /// Parse a raw location, normalizing backslashes.
    ///
    /// A location without a namespace prefix is a filesystem location.
    pub fn parse(raw: &str) -> Self {
        let normalized = raw.replace('\\', "/");
        if let Some(rest) = normalized.strip_prefix(CLASSPATH_PREFIX) {
            Self::Packaged(rest.to_string())
        } else if let Some(rest) = normalized.strip_prefix(FILE_PREFIX) {
            Self::File(rest.to_string())
        } else {
            Self::File(normalized)
        }
    }

    /// The glob without its namespace prefix.
    pub fn glob(&self) -> &str {
        match self {
            Self::File(glob) | Self::Packaged(glob) => glob,
        }
    }
}

impl std::fmt::Display for LocationPattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::File(glob) => write!(f, "{FILE_PREFIX}{glob}"),
            Self::Packaged(glob) => write!(f, "{CLASSPATH_PREFIX}{glob}"),
        }
    }
}

/// Turn a user-supplied location into a pattern for the kind's files.
///
/// A location with no `*` is taken as a folder: `**` plus the template's
/// trailing file glob is appended, so `/custom/sql` with template
/// `/sql/**/*.sql` becomes `file:/custom/sql/**/*.sql`.
pub fn rework_path(path: &str, template: &str) -> LocationPattern {
    let pattern = LocationPattern::parse(path);
    if pattern.glob().contains('*') {
        return pattern;
    }

    let mut glob = pattern.glob().to_string();
    if !glob.ends_with('/') {
        glob.push('/');
    }
    glob.push_str("**");
    glob.push_str(template_suffix(template));

    match pattern {
        LocationPattern::File(_) => LocationPattern::File(glob),
        LocationPattern::Packaged(_) => LocationPattern::Packaged(glob),
    }
}

/// The trailing file glob of a template, including its leading `/`.
fn template_suffix(template: &str) -> &str {
    match template.rfind('/') {
        Some(idx) => &template[idx..],
        None => template,
    }
}

/// A glob split into its literal base directory and a matcher for the rest.
#[derive(Debug, Clone)]
pub struct GlobPattern {
    source: String,
    base: String,
    matcher: Option<GlobMatcher>,
}

impl GlobPattern {
    /// Compile a slash-separated glob.
    ///
    /// The base is every leading segment without wildcard characters. A glob
    /// without any wildcard has no matcher and names a single file.
    pub fn compile(glob: &str) -> Result<Self, LocationError> {
        let segments: Vec<&str> = glob.split('/').collect();
        let first_wild = segments.iter().position(|s| is_wild(s));

        let Some(idx) = first_wild else {
            return Ok(Self {
                source: glob.to_string(),
                base: glob.to_string(),
                matcher: None,
            });
        };

        let base = segments[..idx].join("/");
        let rest = segments[idx..].join("/");
        let matcher = GlobBuilder::new(&rest)
            .literal_separator(true)
            .build()
            .map_err(|e| LocationError::invalid_pattern(glob, e))?
            .compile_matcher();

        // "/sql/**" splits into "" + "**"; keep the root.
        let base = if base.is_empty() && glob.starts_with('/') {
            "/".to_string()
        } else {
            base
        };

        Ok(Self {
            source: glob.to_string(),
            base,
            matcher: Some(matcher),
        })
    }

    /// The glob as written.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// The literal directory (or file) the glob is rooted at.
    pub fn base(&self) -> &str {
        &self.base
    }

    /// Whether the glob names a single literal path.
    pub fn is_literal(&self) -> bool {
        self.matcher.is_none()
    }

    /// Match a path relative to [`base`](Self::base).
    pub fn matches(&self, relative: &Path) -> bool {
        match &self.matcher {
            Some(matcher) => matcher.is_match(relative),
            None => relative.as_os_str().is_empty(),
        }
    }
}

fn is_wild(segment: &str) -> bool {
    segment.contains(['*', '?', '['])
}

//! Registry key derivation.

use super::descriptor::{IdentifierPolicy, PathPrefixPolicy, ResourceKindDescriptor};
use super::error::KindError;
use crate::domains::location::ResourceHandle;

/// Derive the registry key of a located resource.
///
/// `base` is the logical directory the resource was found under (see
/// `Resolution::base`). It bounds where a path-prefix anchor is looked for.
pub fn derive_identifier(
    handle: &ResourceHandle,
    base: Option<&str>,
    descriptor: &ResourceKindDescriptor,
) -> Result<String, KindError> {
    let name = handle
        .file_name()
        .ok_or_else(|| KindError::MissingFileName(handle.to_string()))?;

    let stripped = strip_extensions(name, descriptor.identifier_policy);
    if stripped.is_empty() {
        return Err(KindError::EmptyIdentifier(handle.to_string()));
    }

    Ok(match descriptor.path_prefix_policy {
        PathPrefixPolicy::None => stripped.to_string(),
        PathPrefixPolicy::PrependPathSegment { anchor } => {
            let path = handle.logical_path();
            let prefix = segments_below(&path, base, anchor);
            format!("{prefix}{stripped}").to_uppercase()
        }
    })
}

/// Remove extensions from a file name according to `policy`.
pub fn strip_extensions(name: &str, policy: IdentifierPolicy) -> &str {
    let mut current = name;
    while let Some(idx) = current.rfind('.') {
        current = &current[..idx];
        if policy == IdentifierPolicy::StripLastExtension {
            break;
        }
    }
    current
}

/// Directories between `/<anchor>/` and the file, with a trailing `/`.
///
/// The anchor is the last one at or above `base`, or else the first one
/// below it, so directories named like the anchor above the search base
/// never leak into the key. Empty when the anchor is absent or the file sits
/// directly in it.
fn segments_below<'a>(path: &'a str, base: Option<&str>, anchor: &str) -> &'a str {
    let needle = format!("/{anchor}/");
    // Length of the base within `path`, counting the slash after it.
    let boundary = base
        .map(|b| b.trim_end_matches('/'))
        .filter(|b| {
            path.strip_prefix(b)
                .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
        })
        .map_or(0, |b| (b.len() + 1).min(path.len()));

    let above = path[..boundary].rfind(&needle);
    let below = || {
        let from = boundary.saturating_sub(1);
        path[from..].find(&needle).map(|idx| idx + from)
    };
    let Some(start) = above.or_else(below).map(|idx| idx + needle.len()) else {
        return "";
    };
    match path.rfind('/') {
        Some(end) if end + 1 > start => &path[start..=end],
        _ => "",
    }
}

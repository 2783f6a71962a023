//! Message bundle registry.
//!
//! Message bundles are `.properties` files (`key=value` lines). They are
//! registered as whole bundles and looked up by bundle name and key.

use std::collections::{BTreeMap, HashMap};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::BackendError;

/// Parsed contents of a `.properties` file.
pub type Properties = BTreeMap<String, String>;

/// Store receiving message bundles.
pub trait MessageStore: Send + Sync {
    /// Add (or replace) a bundle.
    fn register_bundle(&self, name: &str, bundle: Properties);

    /// Drop every bundle.
    fn clean(&self);

    /// Number of registered bundles.
    fn bundle_count(&self) -> usize;
}

/// In-memory [`MessageStore`].
#[derive(Debug, Default)]
pub struct MessageRegistry {
    bundles: RwLock<HashMap<String, Properties>>,
}

impl MessageRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a message.
    pub fn message(&self, bundle: &str, key: &str) -> Option<String> {
        self.read().get(bundle).and_then(|props| props.get(key).cloned())
    }

    /// Registered bundle names, sorted.
    pub fn bundle_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.read().keys().cloned().collect();
        names.sort();
        names
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, Properties>> {
        self.bundles.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, Properties>> {
        self.bundles.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl MessageStore for MessageRegistry {
    fn register_bundle(&self, name: &str, bundle: Properties) {
        self.write().insert(name.to_string(), bundle);
    }

    fn clean(&self) {
        self.write().clear();
    }

    fn bundle_count(&self) -> usize {
        self.read().len()
    }
}

/// Parse `.properties` text.
///
/// Supports `=`, `:` or whitespace separators, `#`/`!` comments, backslash
/// line continuations and the escapes `\t`, `\n`, `\r`, `\f`, `\uXXXX` and
/// `\<char>` in keys and values. Later keys override earlier ones.
pub fn parse_properties(text: &str) -> Result<Properties, BackendError> {
    let mut props = Properties::new();
    let mut logical = String::new();

    for raw in text.lines() {
        let line = raw.trim_start_matches(is_blank);
        if logical.is_empty() && (line.is_empty() || line.starts_with('#') || line.starts_with('!')) {
            continue;
        }

        if let Some(stripped) = continued(line) {
            logical.push_str(stripped);
            continue;
        }
        logical.push_str(line);
        insert_entry(&mut props, &logical)?;
        logical.clear();
    }

    if !logical.is_empty() {
        insert_entry(&mut props, &logical)?;
    }
    Ok(props)
}

fn is_blank(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\x0c')
}

/// The line without its continuation backslash, if it has an odd number of
/// trailing backslashes.
fn continued(line: &str) -> Option<&str> {
    let trailing = line.chars().rev().take_while(|c| *c == '\\').count();
    (trailing % 2 == 1).then(|| &line[..line.len() - 1])
}

fn insert_entry(props: &mut Properties, line: &str) -> Result<(), BackendError> {
    let (key, value) = split_entry(line);
    props.insert(unescape(key)?, unescape(value)?);
    Ok(())
}

/// Split a logical line at its first unescaped separator.
fn split_entry(line: &str) -> (&str, &str) {
    let mut escaped = false;
    let separator = line.char_indices().find(|&(_, c)| {
        if escaped {
            escaped = false;
            return false;
        }
        escaped = c == '\\';
        c == '=' || c == ':' || is_blank(c)
    });

    let Some((idx, _)) = separator else {
        return (line, "");
    };
    let rest = line[idx..].trim_start_matches(is_blank);
    let rest = rest
        .strip_prefix('=')
        .or_else(|| rest.strip_prefix(':'))
        .unwrap_or(rest);
    (&line[..idx], rest.trim_start_matches(is_blank))
}

/// Decode backslash escapes. `\uXXXX` surrogate pairs are combined.
fn unescape(raw: &str) -> Result<String, BackendError> {
    let mut out = String::with_capacity(raw.len());
    let mut units: Vec<u16> = Vec::new();
    let mut chars = raw.chars();

    while let Some(c) = chars.next() {
        if c == '\\' && chars.as_str().starts_with('u') {
            chars.next();
            let hex: String = chars.by_ref().take(4).collect();
            let unit = (hex.len() == 4)
                .then(|| u16::from_str_radix(&hex, 16).ok())
                .flatten()
                .ok_or_else(|| BackendError::rejected(format!("Malformed \\uXXXX encoding: \\u{hex}")))?;
            units.push(unit);
            continue;
        }

        flush_units(&mut out, &mut units);
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('t') => out.push('\t'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('f') => out.push('\x0c'),
            Some(other) => out.push(other),
            None => {}
        }
    }
    flush_units(&mut out, &mut units);
    Ok(out)
}

fn flush_units(out: &mut String, units: &mut Vec<u16>) {
    out.extend(char::decode_utf16(units.drain(..)).map(|c| c.unwrap_or(char::REPLACEMENT_CHARACTER)));
}

//! Resource kind descriptors.

/// Prefix of the settings key naming a kind's location override.
pub const CONFIGURATION_PREFIX: &str = "configuration.";

/// How a registry key is derived from a file name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentifierPolicy {
    /// Remove the final extension only (`a.v2.sql` -> `a.v2`).
    StripLastExtension,

    /// Remove every extension (`a.v2.sql` -> `a`).
    StripAllExtensions,
}

/// Whether parent directories contribute to the registry key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathPrefixPolicy {
    /// The key is the stripped file name.
    None,

    /// Prepend the directories between `anchor` and the file, upper-cased.
    PrependPathSegment {
        /// Directory name the prefix is measured from (e.g. `sqlstm`).
        anchor: &'static str,
    },
}

/// Static description of a resource kind.
///
/// One descriptor exists per kind for the life of the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceKindDescriptor {
    /// Unique type key (e.g. `sql`, `templates`).
    pub kind_type: &'static str,

    /// Human readable description used in logs.
    pub description: &'static str,

    /// Glob of the kind's files, rooted at the namespace (e.g. `/sql/**/*.sql`).
    pub path_template: &'static str,

    /// Extension stripping rule.
    pub identifier_policy: IdentifierPolicy,

    /// Parent directory rule.
    pub path_prefix_policy: PathPrefixPolicy,
}

impl ResourceKindDescriptor {
    /// Create a descriptor that strips all extensions and ignores parent directories.
    pub const fn new(
        kind_type: &'static str,
        description: &'static str,
        path_template: &'static str,
    ) -> Self {
        Self {
            kind_type,
            description,
            path_template,
            identifier_policy: IdentifierPolicy::StripAllExtensions,
            path_prefix_policy: PathPrefixPolicy::None,
        }
    }

    /// Use a different extension stripping rule.
    pub const fn with_identifier_policy(mut self, policy: IdentifierPolicy) -> Self {
        self.identifier_policy = policy;
        self
    }

    /// Prepend directories found below `anchor` to the identifier.
    pub const fn with_path_prefix(mut self, anchor: &'static str) -> Self {
        self.path_prefix_policy = PathPrefixPolicy::PrependPathSegment { anchor };
        self
    }

    /// Settings key of the location override (`configuration.<type>`).
    pub fn settings_key(&self) -> String {
        format!("{CONFIGURATION_PREFIX}{}", self.kind_type)
    }
}

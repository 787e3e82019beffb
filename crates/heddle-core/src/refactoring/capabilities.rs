//! Optional behaviours a refactoring may expose to its callers.
//!
//! A capability is either unsupported, in which case its setter fails, or
//! supported with a current value. Unsupported capabilities read as
//! disabled.

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ---------------------------------------------------------------------------
// Capability
// ---------------------------------------------------------------------------

/// Identifies an optional refactoring behaviour.
///
/// # Example
///
/// ```
/// use heddle_core::Capability;
///
/// assert_eq!(Capability::ReferenceUpdating.as_str(), "reference-updating");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Capability {
    /// Rewrite references to the affected element.
    ReferenceUpdating,
    /// Rewrite occurrences of the name in comments and string literals.
    TextUpdating,
    /// Rewrite fully qualified names in non-source documents.
    QualifiedNameUpdating,
    /// Rename elements derived from the affected one, such as accessors.
    DerivedElementUpdating,
}

impl Capability {
    /// Every capability, in declaration order.
    pub const ALL: [Self; 4] = [
        Self::ReferenceUpdating,
        Self::TextUpdating,
        Self::QualifiedNameUpdating,
        Self::DerivedElementUpdating,
    ];

    /// Returns the canonical kebab-case string for this capability.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ReferenceUpdating => "reference-updating",
            Self::TextUpdating => "text-updating",
            Self::QualifiedNameUpdating => "qualified-name-updating",
            Self::DerivedElementUpdating => "derived-element-updating",
        }
    }
}

impl std::fmt::Display for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raised when a caller configures a capability the refactoring lacks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CapabilityError {
    /// The refactoring does not offer the capability.
    #[error("refactoring does not support {capability}")]
    Unsupported {
        /// Requested capability.
        capability: Capability,
    },
}

// ---------------------------------------------------------------------------
// QualifiedNameOptions
// ---------------------------------------------------------------------------

/// Settings for qualified-name updating.
///
/// File patterns are simple globs: `*` alone matches every file, a leading
/// `*` matches by suffix, a trailing `*` matches by prefix, and anything else
/// must equal the file name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualifiedNameOptions {
    enabled: bool,
    file_patterns: Vec<String>,
}

impl QualifiedNameOptions {
    /// Whether qualified names are updated.
    #[must_use]
    pub const fn enabled(&self) -> bool {
        self.enabled
    }

    /// Patterns selecting the documents to scan.
    #[must_use]
    pub fn file_patterns(&self) -> &[String] {
        &self.file_patterns
    }

    /// Returns `true` when `file_name` matches one of the patterns.
    #[must_use]
    pub fn matches(&self, file_name: &str) -> bool {
        self.file_patterns
            .iter()
            .any(|pattern| pattern_matches(pattern.trim(), file_name))
    }
}

fn pattern_matches(pattern: &str, file_name: &str) -> bool {
    if pattern == "*" {
        return true;
    }
    if let Some(suffix) = pattern.strip_prefix('*') {
        return file_name.ends_with(suffix);
    }
    if let Some(prefix) = pattern.strip_suffix('*') {
        return file_name.starts_with(prefix);
    }
    pattern == file_name
}

// ---------------------------------------------------------------------------
// Capabilities
// ---------------------------------------------------------------------------

/// The capability settings of one refactoring instance.
///
/// # Example
///
/// ```
/// use heddle_core::{Capabilities, Capability};
///
/// let mut capabilities = Capabilities::none().with_reference_updating(true);
/// assert!(capabilities.supports(Capability::ReferenceUpdating));
/// assert!(capabilities.set_update_text_occurrences(true).is_err());
/// capabilities
///     .set_update_references(false)
///     .expect("reference updating is supported");
/// assert!(!capabilities.update_references());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capabilities {
    update_references: Option<bool>,
    update_text: Option<bool>,
    qualified_names: Option<QualifiedNameOptions>,
    update_derived: Option<bool>,
}

impl Capabilities {
    /// No capability is supported.
    #[must_use]
    pub const fn none() -> Self {
        Self {
            update_references: None,
            update_text: None,
            qualified_names: None,
            update_derived: None,
        }
    }

    /// Declares reference updating with its initial value.
    #[must_use]
    pub const fn with_reference_updating(mut self, enabled: bool) -> Self {
        self.update_references = Some(enabled);
        self
    }

    /// Declares text occurrence updating with its initial value.
    #[must_use]
    pub const fn with_text_updating(mut self, enabled: bool) -> Self {
        self.update_text = Some(enabled);
        self
    }

    /// Declares qualified-name updating, initially disabled with no patterns.
    #[must_use]
    pub fn with_qualified_name_updating(mut self) -> Self {
        self.qualified_names = Some(QualifiedNameOptions::default());
        self
    }

    /// Declares derived-element updating with its initial value.
    #[must_use]
    pub const fn with_derived_element_updating(mut self, enabled: bool) -> Self {
        self.update_derived = Some(enabled);
        self
    }

    /// Returns `true` when `capability` is offered.
    #[must_use]
    pub const fn supports(&self, capability: Capability) -> bool {
        match capability {
            Capability::ReferenceUpdating => self.update_references.is_some(),
            Capability::TextUpdating => self.update_text.is_some(),
            Capability::QualifiedNameUpdating => self.qualified_names.is_some(),
            Capability::DerivedElementUpdating => self.update_derived.is_some(),
        }
    }

    /// Offered capabilities in declaration order.
    #[must_use]
    pub fn supported(&self) -> Vec<Capability> {
        Capability::ALL
            .into_iter()
            .filter(|capability| self.supports(*capability))
            .collect()
    }

    /// Whether references are updated.
    #[must_use]
    pub fn update_references(&self) -> bool {
        self.update_references.unwrap_or(false)
    }

    /// Enables or disables reference updating.
    ///
    /// # Errors
    ///
    /// Returns [`CapabilityError::Unsupported`] when the capability is not
    /// offered.
    pub fn set_update_references(&mut self, enabled: bool) -> Result<(), CapabilityError> {
        set_flag(&mut self.update_references, Capability::ReferenceUpdating, enabled)
    }

    /// Whether textual occurrences are updated.
    #[must_use]
    pub fn update_text_occurrences(&self) -> bool {
        self.update_text.unwrap_or(false)
    }

    /// Enables or disables text occurrence updating.
    ///
    /// # Errors
    ///
    /// Returns [`CapabilityError::Unsupported`] when the capability is not
    /// offered.
    pub fn set_update_text_occurrences(&mut self, enabled: bool) -> Result<(), CapabilityError> {
        set_flag(&mut self.update_text, Capability::TextUpdating, enabled)
    }

    /// Qualified-name settings, when the capability is offered.
    #[must_use]
    pub const fn qualified_names(&self) -> Option<&QualifiedNameOptions> {
        self.qualified_names.as_ref()
    }

    /// Whether qualified names are updated.
    #[must_use]
    pub fn update_qualified_names(&self) -> bool {
        self.qualified_names
            .as_ref()
            .is_some_and(QualifiedNameOptions::enabled)
    }

    /// Enables or disables qualified-name updating.
    ///
    /// # Errors
    ///
    /// Returns [`CapabilityError::Unsupported`] when the capability is not
    /// offered.
    pub fn set_update_qualified_names(&mut self, enabled: bool) -> Result<(), CapabilityError> {
        self.qualified_names_mut()?.enabled = enabled;
        Ok(())
    }

    /// Replaces the file patterns scanned for qualified names.
    ///
    /// Patterns are given as one comma-separated list, such as `*.xml, *.properties`.
    ///
    /// # Errors
    ///
    /// Returns [`CapabilityError::Unsupported`] when the capability is not
    /// offered.
    pub fn set_file_patterns(&mut self, patterns: &str) -> Result<(), CapabilityError> {
        self.qualified_names_mut()?.file_patterns = patterns
            .split(',')
            .map(str::trim)
            .filter(|pattern| !pattern.is_empty())
            .map(str::to_owned)
            .collect();
        Ok(())
    }

    /// Whether derived elements are renamed too.
    #[must_use]
    pub fn update_derived_elements(&self) -> bool {
        self.update_derived.unwrap_or(false)
    }

    /// Enables or disables derived-element updating.
    ///
    /// # Errors
    ///
    /// Returns [`CapabilityError::Unsupported`] when the capability is not
    /// offered.
    pub fn set_update_derived_elements(&mut self, enabled: bool) -> Result<(), CapabilityError> {
        set_flag(
            &mut self.update_derived,
            Capability::DerivedElementUpdating,
            enabled,
        )
    }

    fn qualified_names_mut(&mut self) -> Result<&mut QualifiedNameOptions, CapabilityError> {
        self.qualified_names
            .as_mut()
            .ok_or(CapabilityError::Unsupported {
                capability: Capability::QualifiedNameUpdating,
            })
    }
}

fn set_flag(
    slot: &mut Option<bool>,
    capability: Capability,
    enabled: bool,
) -> Result<(), CapabilityError> {
    let flag = slot
        .as_mut()
        .ok_or(CapabilityError::Unsupported { capability })?;
    *flag = enabled;
    Ok(())
}

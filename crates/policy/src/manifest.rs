//! Upgrade manifest — the user-declared table of sanctioned
//! old-accessor-to-property migrations, loaded from a JSON document.
//!
//! Loading is the only fallible step of a run and happens before any rule
//! executes. Malformed JSON, a missing field, an out-of-range
//! `upgradedMethods` count, an unparseable descriptor, or an accessor
//! referenced by more than one declaration rejects the whole document;
//! there is no per-entry skip.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use apigate_model::{parse_method_descriptor, MemberId};

/// Errors raised while loading an upgrade manifest document.
#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    /// The document is not valid JSON or is missing required fields.
    #[error("malformed upgraded-properties document: {0}")]
    Parse(#[from] serde_json::Error),

    /// A structurally valid entry violates a manifest constraint.
    #[error("invalid upgraded-properties entry for '{property}': {message}")]
    Invalid { property: String, message: String },
}

/// An old accessor superseded by the upgraded property.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct UpgradedMethod {
    pub name: String,
    pub descriptor: String,
}

/// One upgraded property: a new accessor replacing 1 (getter-only) or
/// 2 (getter+setter) old accessors on the same containing type.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct UpgradedProperty {
    #[serde(rename = "containingType")]
    pub containing_type: String,
    #[serde(rename = "methodName")]
    pub method_name: String,
    #[serde(rename = "methodDescriptor")]
    pub method_descriptor: String,
    #[serde(rename = "propertyName")]
    pub property_name: String,
    #[serde(rename = "upgradedMethods")]
    pub upgraded_methods: Vec<UpgradedMethod>,
}

impl UpgradedProperty {
    /// Identity of the new property accessor in the v2 snapshot.
    pub fn new_accessor_id(&self) -> MemberId {
        MemberId::method(&self.containing_type, &self.method_name, &self.method_descriptor)
    }

    /// Identity of one of the superseded accessors in the v1 snapshot.
    pub fn old_accessor_id(&self, old: &UpgradedMethod) -> MemberId {
        MemberId::method(&self.containing_type, &old.name, &old.descriptor)
    }

    /// The old accessor that shares the new accessor's exact name, if any.
    ///
    /// Present for the common getter-reuse case; absent for the boolean
    /// `is*` convention where the new accessor takes a different name.
    pub fn same_named_old_accessor(&self) -> Option<&UpgradedMethod> {
        self.upgraded_methods.iter().find(|m| m.name == self.method_name)
    }
}

/// A parsed, validated upgrade manifest.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UpgradeManifest {
    entries: Vec<UpgradedProperty>,
}

impl UpgradeManifest {
    /// Manifest with no declared migrations.
    pub fn empty() -> Self {
        UpgradeManifest::default()
    }

    /// Parse and validate a manifest document (a JSON array of entries).
    pub fn from_json(source: &str) -> Result<Self, ManifestError> {
        let entries: Vec<UpgradedProperty> = serde_json::from_str(source)?;
        Self::from_entries(entries)
    }

    /// Validate pre-built entries.
    ///
    /// Each accessor may be referenced by at most one declaration: two
    /// entries claiming the same new accessor, or the same old accessor
    /// listed twice (within or across entries), would make the acceptance
    /// rule cover one fact from two directions.
    pub fn from_entries(entries: Vec<UpgradedProperty>) -> Result<Self, ManifestError> {
        let mut new_accessors = BTreeSet::new();
        let mut old_accessors = BTreeSet::new();
        for entry in &entries {
            let count = entry.upgraded_methods.len();
            if !(1..=2).contains(&count) {
                return Err(ManifestError::Invalid {
                    property: entry.property_name.clone(),
                    message: format!("expected 1 or 2 upgraded methods, found {}", count),
                });
            }
            if parse_method_descriptor(&entry.method_descriptor).is_none() {
                return Err(ManifestError::Invalid {
                    property: entry.property_name.clone(),
                    message: format!("unresolvable descriptor '{}'", entry.method_descriptor),
                });
            }
            if !new_accessors.insert(entry.new_accessor_id()) {
                return Err(ManifestError::Invalid {
                    property: entry.property_name.clone(),
                    message: format!(
                        "accessor '{}' is declared by more than one entry",
                        entry.method_name
                    ),
                });
            }
            for old in &entry.upgraded_methods {
                if parse_method_descriptor(&old.descriptor).is_none() {
                    return Err(ManifestError::Invalid {
                        property: entry.property_name.clone(),
                        message: format!(
                            "unresolvable descriptor '{}' for old accessor '{}'",
                            old.descriptor, old.name
                        ),
                    });
                }
                if !old_accessors.insert(entry.old_accessor_id(old)) {
                    return Err(ManifestError::Invalid {
                        property: entry.property_name.clone(),
                        message: format!(
                            "old accessor '{}' is referenced more than once",
                            old.name
                        ),
                    });
                }
            }
        }
        Ok(UpgradeManifest { entries })
    }

    pub fn entries(&self) -> &[UpgradedProperty] {
        &self.entries
    }
}

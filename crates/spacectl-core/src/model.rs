//! Desired and observed space state.
//!
//! [`DesiredConfig`] is the user's intent and is never mutated by a
//! reconciliation pass. [`ObservedState`] is the last-known remote state; the
//! lifecycle controller returns a fresh value from every operation and the
//! caller owns its persistence.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SpaceError;

/// Unordered key/value sub-collection of a space (secrets or variables).
pub type Entries = BTreeMap<String, String>;

/// User-declared configuration of a space.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DesiredConfig {
    pub name: String,
    #[serde(default)]
    pub private: bool,
    pub sdk: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,
    pub hardware: String,
    pub storage: String,
    pub sleep_time: i64,
    /// `None` leaves the remote secrets unmanaged.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secrets: Option<Entries>,
    /// `None` leaves the remote variables unmanaged.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variables: Option<Entries>,
}

/// Last-known state of a remote space.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObservedState {
    /// `{namespace}/{name}`; the key for every endpoint.
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub private: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sdk: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hardware: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sleep_time: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secrets: Option<Entries>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variables: Option<Entries>,

    // Reported by the remote API, never written by reconciliation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<String>,
    #[serde(default)]
    pub likes: i64,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl ObservedState {
    /// State for a space adopted by identifier only. Every other field is
    /// filled by a subsequent read.
    pub fn imported(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    /// Copies the sub-collections from a previous observation. The remote
    /// API never reports secret values, so a read cannot recover them.
    pub fn with_entries_from(mut self, previous: &ObservedState) -> Self {
        self.secrets = previous.secrets.clone();
        self.variables = previous.variables.clone();
        self
    }

    pub fn entries(&self, kind: CollectionKind) -> Option<&Entries> {
        match kind {
            CollectionKind::Secrets => self.secrets.as_ref(),
            CollectionKind::Variables => self.variables.as_ref(),
        }
    }

    pub fn set_entries(&mut self, kind: CollectionKind, entries: Entries) {
        match kind {
            CollectionKind::Secrets => self.secrets = Some(entries),
            CollectionKind::Variables => self.variables = Some(entries),
        }
    }
}

impl DesiredConfig {
    pub fn entries(&self, kind: CollectionKind) -> Option<&Entries> {
        match kind {
            CollectionKind::Secrets => self.secrets.as_ref(),
            CollectionKind::Variables => self.variables.as_ref(),
        }
    }
}

/// The two key/value sub-collections of a space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CollectionKind {
    Secrets,
    Variables,
}

impl CollectionKind {
    /// Path segment under `/spaces/{id}/`.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Secrets => "secrets",
            Self::Variables => "variables",
        }
    }

    /// Singular noun used in operation names.
    pub fn singular(self) -> &'static str {
        match self {
            Self::Secrets => "secret",
            Self::Variables => "variable",
        }
    }
}

impl fmt::Display for CollectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parsed `{namespace}/{name}` space identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SpaceId {
    namespace: String,
    name: String,
}

impl SpaceId {
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Identifier of the same space after a rename: namespace kept, name
    /// replaced.
    pub fn renamed(&self, name: &str) -> Self {
        Self {
            namespace: self.namespace.clone(),
            name: name.to_string(),
        }
    }
}

impl FromStr for SpaceId {
    type Err = SpaceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('/') {
            Some((namespace, name))
                if !namespace.is_empty() && !name.is_empty() && !name.contains('/') =>
            {
                Ok(Self {
                    namespace: namespace.to_string(),
                    name: name.to_string(),
                })
            }
            _ => Err(SpaceError::invalid_id(s)),
        }
    }
}

impl fmt::Display for SpaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}

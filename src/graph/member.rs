//! Member and relation types.
//!
//! Members are the people in the family graph. Each member has:
//! - A stable unique identifier (owned by the caller, never rewritten here)
//! - Display data (`name`, `dob`, `email`, `photo`) that layout never reads
//! - An ordered list of typed relations pointing at other members
//!
//! Relations are stored exactly as the caller declared them. Nothing here
//! assumes they are reciprocal.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A person node in the family graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    /// Stable identifier, unique within one layout call.
    pub id: String,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Date of birth, opaque to layout.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dob: Option<String>,
    /// Contact email, opaque to layout.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Photo reference, opaque to layout.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,
    /// Relations declared by this member, in declaration order.
    #[serde(default)]
    pub relations: Vec<Relation>,
}

impl Member {
    /// Create a member with no relations.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            dob: None,
            email: None,
            photo: None,
            relations: Vec::new(),
        }
    }

    /// Builder-style helper that appends a relation.
    pub fn with_relation(mut self, kind: RelationKind, target_id: impl Into<String>) -> Self {
        self.relations.push(Relation::new(kind, target_id));
        self
    }
}

/// A typed, directional edge declared by one member toward another.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Relation {
    /// Relation type as declared.
    #[serde(rename = "type")]
    pub kind: RelationKind,
    /// Id of the related member. May not exist in the member set.
    pub target_id: String,
}

impl Relation {
    /// Create a new relation.
    pub fn new(kind: RelationKind, target_id: impl Into<String>) -> Self {
        Self {
            kind,
            target_id: target_id.into(),
        }
    }
}

/// Relation type.
///
/// `Parent` means "the target is my parent", `Child` means "the target is my
/// child". Unknown strings are preserved as `Custom` and are layout-inert,
/// like `Sibling` and `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RelationKind {
    Parent,
    Child,
    Spouse,
    Partner,
    Sibling,
    Other,
    Custom(String),
}

impl RelationKind {
    /// Whether this relation links two members of the same spousal unit.
    #[inline]
    pub fn is_spousal(&self) -> bool {
        matches!(self, Self::Spouse | Self::Partner)
    }

    /// Wire name of the relation.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Parent => "parent",
            Self::Child => "child",
            Self::Spouse => "spouse",
            Self::Partner => "partner",
            Self::Sibling => "sibling",
            Self::Other => "other",
            Self::Custom(text) => text,
        }
    }
}

impl fmt::Display for RelationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for RelationKind {
    fn from(value: String) -> Self {
        match value.as_str() {
            "parent" => Self::Parent,
            "child" => Self::Child,
            "spouse" => Self::Spouse,
            "partner" => Self::Partner,
            "sibling" => Self::Sibling,
            "other" => Self::Other,
            _ => Self::Custom(value),
        }
    }
}

impl From<&str> for RelationKind {
    fn from(value: &str) -> Self {
        Self::from(value.to_string())
    }
}

impl From<RelationKind> for String {
    fn from(kind: RelationKind) -> Self {
        match kind {
            RelationKind::Custom(text) => text,
            other => other.as_str().to_string(),
        }
    }
}

//! Family graph data structures.
//!
//! This module holds the caller-facing data model (`Member`, `Relation`)
//! and the relation graph the layout pipeline is built on. Members are
//! addressed by dense input-order indices once the graph is built.

mod family;
mod member;

pub use family::FamilyGraph;
pub use member::{Member, Relation, RelationKind};

//! Spatial indexing for hit testing on a finished layout.
//!
//! This module provides an R-tree over member boxes so a viewport can map
//! a tap or a selection rectangle back to member ids.

mod rtree;

pub use rtree::{MemberBox, MemberIndex};

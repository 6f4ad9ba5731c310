//! Error type for the layout crate.
//!
//! Relationship data never fails a layout. Errors only come from spacing
//! constants that cannot produce a valid layout, and from JS values that
//! do not decode at the WASM boundary.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LayoutError {
    #[error("invalid layout config: {field} = {value}")]
    InvalidConfig { field: &'static str, value: f32 },

    #[error("memberGap ({member_gap}) must be at least nodeWidth ({node_width})")]
    MemberGapTooSmall { member_gap: f32, node_width: f32 },

    #[error("JS interop failed: {0}")]
    Interop(#[from] serde_wasm_bindgen::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        let err = LayoutError::InvalidConfig {
            field: "nodeWidth",
            value: -1.0,
        };
        assert_eq!(err.to_string(), "invalid layout config: nodeWidth = -1");

        let err = LayoutError::MemberGapTooSmall {
            member_gap: 100.0,
            node_width: 120.0,
        };
        assert_eq!(
            err.to_string(),
            "memberGap (100) must be at least nodeWidth (120)"
        );
    }
}

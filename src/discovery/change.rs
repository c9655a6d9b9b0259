//! Change detection between polls.
//!
//! Two short-circuits, checked in order:
//! 1. raw snapshot bytes identical to the last processed content
//! 2. canonical endpoint signature identical to the last non-empty list

use crate::backends::Endpoint;

/// Remembers what the previous polls observed.
#[derive(Debug, Default)]
pub struct ChangeDetector {
    last_raw_content: Vec<u8>,
    last_signature: Option<String>,
}

impl ChangeDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `raw` as the last processed content.
    ///
    /// Returns false when it is byte-identical to the previous content.
    pub fn observe_content(&mut self, raw: &[u8]) -> bool {
        if raw == self.last_raw_content.as_slice() {
            return false;
        }
        self.last_raw_content = raw.to_vec();
        true
    }

    /// Record the signature of a freshly extracted list.
    ///
    /// Returns false when it matches the previous non-empty list. Empty
    /// lists always count as a change and leave the stored signature alone.
    pub fn observe_endpoints(&mut self, endpoints: &[Endpoint]) -> bool {
        if endpoints.is_empty() {
            return true;
        }
        let signature = signature(endpoints);
        if self.last_signature.as_deref() == Some(signature.as_str()) {
            return false;
        }
        self.last_signature = Some(signature);
        true
    }

    /// Forget the last endpoint signature so the next extraction counts as
    /// a change.
    pub fn invalidate_endpoints(&mut self) {
        self.last_signature = None;
    }
}

/// Canonical string form of a sorted endpoint list.
pub fn signature(endpoints: &[Endpoint]) -> String {
    endpoints
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

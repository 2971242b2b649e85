//! Odoo version handling.

use serde::{Deserialize, Serialize};
use std::fmt;

/// An Odoo version in canonical `<major>.0` form (e.g. `"18.0"`).
///
/// Parsing is deliberately lenient: any string is accepted and only the `.0`
/// suffix is normalized, because odoo.com itself tolerates loose version
/// tokens and the download URL scheme is built from plain string surgery.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OdooVersion {
    raw: String,
}

impl OdooVersion {
    /// Normalize a user-supplied version token (`"18"` becomes `"18.0"`).
    ///
    /// Normalization is idempotent: an already-canonical version is returned
    /// unchanged.
    #[must_use]
    pub fn parse(input: impl Into<String>) -> Self {
        let input = input.into();
        let raw = if input.ends_with(".0") {
            input
        } else {
            format!("{input}.0")
        };
        Self { raw }
    }

    /// Get the canonical version string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Short form used in download URLs (`"18.0"` becomes `"18"`).
    ///
    /// This removes every literal `.0` substring, not just a trailing one;
    /// the remote URL scheme was built around that exact transformation.
    #[must_use]
    pub fn short(&self) -> String {
        self.raw.replace(".0", "")
    }
}

impl fmt::Display for OdooVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw)
    }
}

impl From<&str> for OdooVersion {
    fn from(input: &str) -> Self {
        Self::parse(input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn appends_suffix_to_bare_major() {
        assert_eq!(OdooVersion::parse("18").as_str(), "18.0");
        assert_eq!(OdooVersion::parse("16").as_str(), "16.0");
    }

    #[test]
    fn normalization_is_idempotent() {
        for input in ["18.0", "16.0", "12.0"] {
            let once = OdooVersion::parse(input);
            let twice = OdooVersion::parse(once.as_str());
            assert_eq!(once, twice);
            assert_eq!(once.as_str(), input);
        }
    }

    #[test]
    fn short_form_strips_dot_zero() {
        assert_eq!(OdooVersion::parse("18.0").short(), "18");
        assert_eq!(OdooVersion::parse("16").short(), "16");
    }

    #[test]
    fn arbitrary_tokens_are_accepted() {
        // Lenient by design: no numeric validation is performed.
        assert_eq!(OdooVersion::parse("saas-17.4").as_str(), "saas-17.4.0");
        assert_eq!(OdooVersion::parse("").as_str(), ".0");
    }

    #[test]
    fn display_matches_canonical_form() {
        assert_eq!(OdooVersion::parse("18").to_string(), "18.0");
    }
}

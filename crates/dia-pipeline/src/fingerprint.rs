//! Content fingerprints for render-equivalence.
//!
//! Two requests with the same fingerprint are render-equivalent: given an
//! intact artifact recorded under that fingerprint, the engine need not
//! run again. The explicit target name is deliberately excluded — it
//! changes where the artifact lands, not what it looks like.

use sha2::{Digest, Sha256};

use crate::variant::{DiagramFormat, DiagramVariant};

/// Number of fingerprint hex digits used in default artifact names.
pub(crate) const SHORT_LEN: usize = 12;

/// Fixed-length content hash over everything that affects rendered output.
///
/// SHA-256 of `"{variant}:{format}:{scale}:{normalized source}"`, hex
/// encoded. The normalized source already embeds injected config content,
/// so config edits produce a new fingerprint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Compute the fingerprint for a normalized request.
    #[must_use]
    pub fn compute(
        variant: DiagramVariant,
        format: DiagramFormat,
        scale: Option<f64>,
        normalized_source: &str,
    ) -> Self {
        let scale = scale.unwrap_or(1.0);
        let content = format!(
            "{}:{}:{scale}:{normalized_source}",
            variant.as_str(),
            format.as_str()
        );
        let mut hasher = Sha256::new();
        hasher.update(content.as_bytes());
        Self(hex::encode(hasher.finalize()))
    }

    /// Full hex digest (64 characters).
    #[must_use]
    pub fn as_hex(&self) -> &str {
        &self.0
    }

    /// Leading digits used for default artifact names.
    #[must_use]
    pub fn short(&self) -> &str {
        &self.0[..SHORT_LEN]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fp(source: &str) -> Fingerprint {
        Fingerprint::compute(DiagramVariant::Uml, DiagramFormat::Png, None, source)
    }

    #[test]
    fn test_deterministic_and_content_sensitive() {
        assert_eq!(fp("A -> B"), fp("A -> B"));
        assert_ne!(fp("A -> B"), fp("C -> D"));
        assert_eq!(fp("A -> B").as_hex().len(), 64);
        assert!(fp("x").as_hex().chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_format_matters() {
        let png = Fingerprint::compute(DiagramVariant::Uml, DiagramFormat::Png, None, "s");
        let svg = Fingerprint::compute(DiagramVariant::Uml, DiagramFormat::Svg, None, "s");
        assert_ne!(png, svg);
    }

    #[test]
    fn test_variant_matters() {
        let uml = Fingerprint::compute(DiagramVariant::Uml, DiagramFormat::Png, None, "s");
        let salt = Fingerprint::compute(DiagramVariant::Salt, DiagramFormat::Png, None, "s");
        assert_ne!(uml, salt);
    }

    #[test]
    fn test_scale_matters() {
        let unscaled = Fingerprint::compute(DiagramVariant::Uml, DiagramFormat::Png, None, "s");
        let scaled =
            Fingerprint::compute(DiagramVariant::Uml, DiagramFormat::Png, Some(1.5), "s");
        assert_ne!(unscaled, scaled);
    }

    #[test]
    fn test_unit_scale_equals_no_scale() {
        let none = Fingerprint::compute(DiagramVariant::Uml, DiagramFormat::Png, None, "s");
        let one = Fingerprint::compute(DiagramVariant::Uml, DiagramFormat::Png, Some(1.0), "s");
        assert_eq!(none, one);
    }

    #[test]
    fn test_short_prefix() {
        let f = fp("A -> B");
        assert_eq!(f.short().len(), SHORT_LEN);
        assert!(f.as_hex().starts_with(f.short()));
    }
}

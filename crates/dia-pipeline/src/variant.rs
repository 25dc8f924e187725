//! Diagram variants and output formats.
//!
//! The pipeline handles one rendering family with two notations: the
//! default UML notation and the Salt UI-mockup notation. Which output
//! formats a variant supports is declared in a closed capability table,
//! checked explicitly at request time.

use crate::error::DiagramError;

/// Named sub-notation within the rendering family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagramVariant {
    /// Default notation (sequence, class, activity, ... diagrams).
    Uml,
    /// Salt UI-mockup notation.
    Salt,
}

impl DiagramVariant {
    /// Parse a variant from its block name.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "plantuml" | "uml" => Some(Self::Uml),
            "salt" => Some(Self::Salt),
            _ => None,
        }
    }

    /// Canonical name of this variant.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Uml => "uml",
            Self::Salt => "salt",
        }
    }

    /// Output formats this variant can produce.
    #[must_use]
    pub fn supported_formats(self) -> &'static [DiagramFormat] {
        match self {
            Self::Uml | Self::Salt => {
                &[DiagramFormat::Png, DiagramFormat::Svg, DiagramFormat::Txt]
            }
        }
    }

    /// Whether this variant can produce `format`.
    #[must_use]
    pub fn supports(self, format: DiagramFormat) -> bool {
        self.supported_formats().contains(&format)
    }
}

/// Output format for a rendered diagram.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DiagramFormat {
    /// Raster image.
    #[default]
    Png,
    /// Vector image.
    Svg,
    /// Literal text: the diagram source is returned verbatim, no engine
    /// invocation, no file, no dimensions.
    Txt,
}

impl DiagramFormat {
    /// Parse a format from an attribute value.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "png" => Some(Self::Png),
            "svg" => Some(Self::Svg),
            "txt" => Some(Self::Txt),
            _ => None,
        }
    }

    /// Parse a format, turning unknown values into a typed error that
    /// names the offending format.
    pub fn from_name(s: &str) -> Result<Self, DiagramError> {
        Self::parse(s).ok_or_else(|| DiagramError::UnknownFormat {
            format: s.to_owned(),
        })
    }

    /// String representation, also the canonical file extension.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Svg => "svg",
            Self::Txt => "txt",
        }
    }

    /// Canonical file extension for artifacts in this format.
    #[must_use]
    pub fn extension(self) -> &'static str {
        self.as_str()
    }

    /// Whether this format produces an image artifact on disk.
    #[must_use]
    pub fn is_image(self) -> bool {
        matches!(self, Self::Png | Self::Svg)
    }

    /// Whether this format bypasses rendering entirely.
    #[must_use]
    pub fn is_literal(self) -> bool {
        matches!(self, Self::Txt)
    }
}

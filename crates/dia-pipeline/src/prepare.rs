//! Source normalization before fingerprinting and rendering.
//!
//! Normalization makes the source self-contained so the fingerprint covers
//! every render input:
//! - wraps the body in `@startuml`/`@enduml` when no start directive is
//!   present
//! - inserts the `salt` prelude for the Salt variant
//! - injects the renderer-config file's contents (so config edits change
//!   the fingerprint)
//! - injects a `scale` directive for scaled image renders
//!
//! Pure except for reading the config file.

use std::fs;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::DiagramError;
use crate::request::DiagramRequest;
use crate::variant::DiagramVariant;

static START_DIRECTIVE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^\s*@start\w+.*$").unwrap());

/// Whether the source already carries a Salt marker, either as an
/// `@startsalt` directive or a bare `salt` line.
fn has_salt_marker(source: &str) -> bool {
    source.contains("@startsalt") || source.lines().any(|line| line.trim() == "salt")
}

/// Insert `block` directly after the first start-directive line.
///
/// `block` must end with a newline. A directive without a trailing
/// newline gets the block appended on its own line.
fn inject_after_start(source: &str, block: &str) -> String {
    let Some(m) = START_DIRECTIVE.find(source) else {
        // Callers wrap first, so a directive is always present
        return format!("{block}{source}");
    };

    match source[m.end()..].find('\n') {
        Some(offset) => {
            let pos = m.end() + offset + 1;
            let mut result = String::with_capacity(source.len() + block.len());
            result.push_str(&source[..pos]);
            result.push_str(block);
            result.push_str(&source[pos..]);
            result
        }
        None => format!("{source}\n{block}"),
    }
}

/// Normalize a request's source for rendering.
pub(crate) fn normalize(request: &DiagramRequest) -> Result<String, DiagramError> {
    let source = request.source.as_str();

    let wrapped = if START_DIRECTIVE.is_match(source) {
        source.to_owned()
    } else {
        format!("@startuml\n{}\n@enduml", source.trim_end_matches('\n'))
    };

    let mut injection = String::new();
    if request.variant == DiagramVariant::Salt && !has_salt_marker(source) {
        injection.push_str("salt\n");
    }
    if let Some(config) = &request.config {
        let content = fs::read_to_string(config)
            .map_err(|e| DiagramError::io("read config file", config, e))?;
        injection.push_str(content.trim_end());
        injection.push('\n');
    }
    if let Some(scale) = request.scale
        && request.format.is_image()
        && scale != 1.0
    {
        injection.push_str(&format!("scale {scale}\n"));
    }

    if injection.is_empty() {
        Ok(wrapped)
    } else {
        Ok(inject_after_start(&wrapped, &injection))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::variant::DiagramFormat;
    use pretty_assertions::assert_eq;

    fn request(source: &str) -> DiagramRequest {
        DiagramRequest::new(source, DiagramVariant::Uml, DiagramFormat::Png)
    }

    #[test]
    fn test_bare_source_gets_wrapped() {
        let normalized = normalize(&request("A -> B")).unwrap();
        assert_eq!(normalized, "@startuml\nA -> B\n@enduml");
    }

    #[test]
    fn test_directive_source_untouched() {
        let normalized = normalize(&request("@startuml\nA -> B\n@enduml")).unwrap();
        assert_eq!(normalized, "@startuml\nA -> B\n@enduml");
    }

    #[test]
    fn test_trailing_newlines_collapsed_before_wrap() {
        let normalized = normalize(&request("A -> B\n\n")).unwrap();
        assert_eq!(normalized, "@startuml\nA -> B\n@enduml");
    }

    #[test]
    fn test_salt_prelude_inserted() {
        let req = DiagramRequest::new("{\n[Button]\n}", DiagramVariant::Salt, DiagramFormat::Png);
        let normalized = normalize(&req).unwrap();
        assert_eq!(normalized, "@startuml\nsalt\n{\n[Button]\n}\n@enduml");
    }

    #[test]
    fn test_salt_prelude_not_duplicated() {
        let req = DiagramRequest::new(
            "salt\n{\n[Button]\n}",
            DiagramVariant::Salt,
            DiagramFormat::Png,
        );
        let normalized = normalize(&req).unwrap();
        assert_eq!(normalized.matches("salt").count(), 1);
    }

    #[test]
    fn test_startsalt_directive_respected() {
        let req = DiagramRequest::new(
            "@startsalt\n{\n[Button]\n}\n@endsalt",
            DiagramVariant::Salt,
            DiagramFormat::Png,
        );
        let normalized = normalize(&req).unwrap();
        // Already a salt document: no wrapping, no prelude
        assert_eq!(normalized, "@startsalt\n{\n[Button]\n}\n@endsalt");
    }

    #[test]
    fn test_scale_directive_injected_for_images() {
        let normalized = normalize(&request("A -> B").scale(1.5)).unwrap();
        assert_eq!(normalized, "@startuml\nscale 1.5\nA -> B\n@enduml");
    }

    #[test]
    fn test_unit_scale_not_injected() {
        let normalized = normalize(&request("A -> B").scale(1.0)).unwrap();
        assert!(!normalized.contains("scale"));
    }

    #[test]
    fn test_scale_ignored_for_literal_format() {
        let req = DiagramRequest::new("A -> B", DiagramVariant::Uml, DiagramFormat::Txt).scale(2.0);
        let normalized = normalize(&req).unwrap();
        assert!(!normalized.contains("scale"));
    }

    #[test]
    fn test_config_content_injected() {
        let tmp = tempfile::TempDir::new().unwrap();
        let config = tmp.path().join("style.cfg");
        fs::write(&config, "skinparam ArrowColor #DEADBE\n").unwrap();

        let normalized = normalize(&request("A -> B").config(&config)).unwrap();
        assert_eq!(
            normalized,
            "@startuml\nskinparam ArrowColor #DEADBE\nA -> B\n@enduml"
        );
    }

    #[test]
    fn test_missing_config_is_io_error() {
        let err = normalize(&request("A -> B").config("/nonexistent/style.cfg")).unwrap_err();
        assert!(matches!(err, DiagramError::Io { .. }));
        assert!(err.to_string().contains("style.cfg"));
    }

    #[test]
    fn test_injection_order_salt_config_scale() {
        let tmp = tempfile::TempDir::new().unwrap();
        let config = tmp.path().join("style.cfg");
        fs::write(&config, "skinparam monochrome true").unwrap();

        let req = DiagramRequest::new("{ [B] }", DiagramVariant::Salt, DiagramFormat::Png)
            .config(&config)
            .scale(2.0);
        let normalized = normalize(&req).unwrap();
        assert_eq!(
            normalized,
            "@startuml\nsalt\nskinparam monochrome true\nscale 2\n{ [B] }\n@enduml"
        );
    }

    #[test]
    fn test_inject_after_directive_without_trailing_newline() {
        let injected = inject_after_start("@startuml", "scale 2\n");
        assert_eq!(injected, "@startuml\nscale 2\n");
    }
}

//! Core types shared by the helm pass and the extension rules:
//! - `Severity` - message severity levels
//! - `Finding` - a single extension-rule violation
//! - `ResourceRef` - the rendered resource a finding points at

use std::cmp::Ordering;
use std::fmt;

/// Severity levels, ordered `Error > Warning > Info`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Severity {
    Error,
    #[default]
    Warning,
    Info,
}

impl Severity {
    /// Parse a severity from a string (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "error" => Some(Self::Error),
            "warning" | "warn" => Some(Self::Warning),
            "info" => Some(Self::Info),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Info => "info",
        }
    }

    /// Upper-case label used in report lines.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Error => "ERROR",
            Self::Warning => "WARNING",
            Self::Info => "INFO",
        }
    }

    fn rank(&self) -> u8 {
        match self {
            Self::Info => 0,
            Self::Warning => 1,
            Self::Error => 2,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Ord for Severity {
    fn cmp(&self, other: &Self) -> Ordering {
        self.rank().cmp(&other.rank())
    }
}

impl PartialOrd for Severity {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Kind and name of a rendered resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceRef {
    pub kind: String,
    pub name: String,
}

impl fmt::Display for ResourceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{kind: {}, name: {}}}", self.kind, self.name)
    }
}

/// A violation reported by an extension rule.
///
/// Findings are advisory: they are printed but never change the outcome
/// of a lint run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    /// Code of the rule that produced this finding (e.g. "KS1002").
    pub code: &'static str,
    pub severity: Severity,
    pub message: String,
    /// Rendered template file, when the finding is tied to one.
    pub file: Option<String>,
    pub resource: Option<ResourceRef>,
    /// Offending container, for image checks.
    pub container: Option<String>,
}

impl Finding {
    pub fn new(code: &'static str, severity: Severity, message: impl Into<String>) -> Self {
        Self {
            code,
            severity,
            message: message.into(),
            file: None,
            resource: None,
            container: None,
        }
    }

    pub fn error(code: &'static str, message: impl Into<String>) -> Self {
        Self::new(code, Severity::Error, message)
    }

    pub fn warning(code: &'static str, message: impl Into<String>) -> Self {
        Self::new(code, Severity::Warning, message)
    }

    pub fn with_file(mut self, file: impl Into<String>) -> Self {
        self.file = Some(file.into());
        self
    }

    pub fn with_resource(mut self, kind: impl Into<String>, name: impl Into<String>) -> Self {
        self.resource = Some(ResourceRef {
            kind: kind.into(),
            name: name.into(),
        });
        self
    }

    pub fn with_container(mut self, container: impl Into<String>) -> Self {
        self.container = Some(container.into());
        self
    }
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.severity.label(), self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Error > Severity::Warning);
        assert!(Severity::Warning > Severity::Info);
        assert_eq!(
            [Severity::Info, Severity::Error, Severity::Warning]
                .iter()
                .max(),
            Some(&Severity::Error)
        );
    }

    #[test]
    fn test_severity_parse() {
        assert_eq!(Severity::parse("ERROR"), Some(Severity::Error));
        assert_eq!(Severity::parse("Warning"), Some(Severity::Warning));
        assert_eq!(Severity::parse("warn"), Some(Severity::Warning));
        assert_eq!(Severity::parse("info"), Some(Severity::Info));
        assert_eq!(Severity::parse("style"), None);
    }

    #[test]
    fn test_finding_display() {
        let finding = Finding::error("KS1002", "registry not applied")
            .with_file("demo/templates/pod.yaml")
            .with_resource("Pod", "web")
            .with_container("init");

        assert_eq!(finding.to_string(), "ERROR: registry not applied");
        assert_eq!(
            finding.resource.as_ref().map(|r| r.to_string()),
            Some("{kind: Pod, name: web}".to_string())
        );
        assert_eq!(finding.container.as_deref(), Some("init"));
    }
}

//! `helm lint` output parsing.

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::analyzer::extlint::types::Severity;

static MESSAGE_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\[(INFO|WARNING|ERROR|UNKNOWN)\] ([^:]*): (.*)$").expect("valid regex")
});

static SUMMARY_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(Error: )?\d+ chart\(s\) linted, \d+ chart\(s\) failed").expect("valid regex")
});

/// A single message from the generic lint pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LintMessage {
    pub severity: Severity,
    /// File or directory the message refers to (e.g. `templates/`).
    pub path: String,
    pub text: String,
}

impl fmt::Display for LintMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.severity.label(), self.path, self.text)
    }
}

/// Outcome of linting one chart.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChartLintResult {
    pub messages: Vec<LintMessage>,
    /// Hard errors. The chart fails if and only if this is non-empty.
    pub errors: Vec<String>,
}

impl ChartLintResult {
    pub fn failed(&self) -> bool {
        !self.errors.is_empty()
    }

    /// True if any message is above info, or there is any hard error.
    pub fn has_warnings_or_errors(&self) -> bool {
        self.messages.iter().any(|m| m.severity > Severity::Info) || !self.errors.is_empty()
    }
}

/// Parse the text `helm lint` prints for one chart.
///
/// `strict` lowers the tolerance so warnings become hard errors.
/// `stderr` is only used when nothing else could be parsed from a failed run.
pub fn parse_lint_output(stdout: &str, stderr: &str, success: bool, strict: bool) -> ChartLintResult {
    let tolerance = if strict {
        Severity::Warning
    } else {
        Severity::Error
    };

    let mut messages: Vec<LintMessage> = Vec::new();
    let mut raw_errors = Vec::new();
    let mut open = false;

    for line in stdout.lines() {
        if let Some(caps) = MESSAGE_LINE.captures(line) {
            messages.push(LintMessage {
                severity: Severity::parse(&caps[1]).unwrap_or(Severity::Info),
                path: caps[2].to_string(),
                text: caps[3].to_string(),
            });
            open = true;
            continue;
        }

        if line.trim().is_empty() || line.starts_with("==> ") || SUMMARY_LINE.is_match(line) {
            open = false;
            continue;
        }

        if let Some(err) = line.strip_prefix("Error ") {
            raw_errors.push(err.to_string());
            open = false;
            continue;
        }

        // Wrapped message text.
        if let (true, Some(last)) = (open, messages.last_mut()) {
            last.text.push('\n');
            last.text.push_str(line);
        }
    }

    let mut errors: Vec<String> = messages
        .iter()
        .filter(|m| m.severity >= tolerance)
        .map(|m| m.text.clone())
        .collect();

    if messages.is_empty() {
        errors.extend(raw_errors);
    }

    if !success && errors.is_empty() && messages.is_empty() {
        let stderr = stderr.trim();
        let stderr = stderr.strip_prefix("Error: ").unwrap_or(stderr);
        if !stderr.is_empty() && !SUMMARY_LINE.is_match(stderr) {
            errors.push(stderr.to_string());
        } else {
            errors.push("helm lint failed".to_string());
        }
    }

    ChartLintResult { messages, errors }
}

#[cfg(test)]
mod tests {
    use super::*;

    const OUTPUT: &str = "==> Linting ./demo
[INFO] Chart.yaml: icon is recommended
[WARNING] templates/service.yaml: object name does not conform to Kubernetes naming requirements
[ERROR] templates/: template: demo/templates/deployment.yaml:12:20: executing \"demo/templates/deployment.yaml\"
  at <.Values.image.tag>: nil pointer evaluating interface {}.tag

";

    #[test]
    fn test_parse_messages() {
        let result = parse_lint_output(OUTPUT, "Error: 1 chart(s) linted, 1 chart(s) failed", false, false);

        assert_eq!(result.messages.len(), 3);
        assert_eq!(result.messages[0].severity, Severity::Info);
        assert_eq!(result.messages[0].path, "Chart.yaml");
        assert_eq!(result.messages[1].severity, Severity::Warning);
        assert_eq!(result.messages[2].path, "templates/");
        assert!(result.messages[2].text.contains("\n  at <.Values.image.tag>"));

        assert_eq!(result.errors.len(), 1);
        assert!(result.failed());
        assert!(result.has_warnings_or_errors());
    }

    #[test]
    fn test_strict_promotes_warnings() {
        let result = parse_lint_output(OUTPUT, "", false, true);
        assert_eq!(result.errors.len(), 2);
    }

    #[test]
    fn test_info_only_is_clean() {
        let out = "==> Linting ./demo\n[INFO] Chart.yaml: icon is recommended\n\n1 chart(s) linted, 0 chart(s) failed\n";
        let result = parse_lint_output(out, "", true, false);
        assert!(!result.failed());
        assert!(!result.has_warnings_or_errors());
    }

    #[test]
    fn test_raw_errors_without_messages() {
        let out = "==> Linting ./broken\nError unable to check Chart.yaml file in chart: no such file\n\n";
        let result = parse_lint_output(out, "Error: 1 chart(s) linted, 1 chart(s) failed", false, false);
        assert!(result.messages.is_empty());
        assert_eq!(
            result.errors,
            vec!["unable to check Chart.yaml file in chart: no such file".to_string()]
        );
    }

    #[test]
    fn test_failed_run_without_output_uses_stderr() {
        let result = parse_lint_output("", "Error: unknown flag: --bogus\n", false, false);
        assert_eq!(result.errors, vec!["unknown flag: --bogus".to_string()]);
    }

    #[test]
    fn test_message_display() {
        let msg = LintMessage {
            severity: Severity::Warning,
            path: "values.yaml".into(),
            text: "file does not exist".into(),
        };
        assert_eq!(msg.to_string(), "[WARNING] values.yaml: file does not exist");
    }
}

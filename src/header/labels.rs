/// Header context labels
///
/// Maps section names to the friendlier label shown next to the header.

/// Label used when a configuration has no section
pub const DEFAULT_CONTEXT_LABEL: &str = "Workspace";

const SECTION_LABELS: &[(&str, &str)] = &[
    ("primary workflow", "Requirements Workflow"),
    ("workflow", "Requirements Workflow"),
    ("repair", "Requirement Repair"),
    ("reports", "Reports & Exports"),
    ("general", "General"),
    ("quick links", "Quick Links"),
    ("settings", "Settings"),
    ("test cases", "Test Case Generation"),
];

/// Derive the context label for a section name.
///
/// Lookup is case-insensitive and ignores surrounding whitespace. Unknown
/// names pass through unchanged; empty or missing names yield
/// [`DEFAULT_CONTEXT_LABEL`].
pub fn context_label(section_name: Option<&str>) -> String {
    let Some(raw) = section_name.filter(|n| !n.trim().is_empty()) else {
        return DEFAULT_CONTEXT_LABEL.to_string();
    };

    let name = raw.trim();
    SECTION_LABELS
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .map(|(_, label)| (*label).to_string())
        .unwrap_or_else(|| raw.to_string())
}

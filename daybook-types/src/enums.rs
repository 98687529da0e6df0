use serde::{Deserialize, Serialize};

/// How question text is compared when looking for duplicates.
///
/// The historical cleanup scripts disagreed on this, so callers must pick a
/// policy explicitly; a single run never mixes the two.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TextPolicy {
    /// Byte-for-byte comparison.
    #[default]
    Exact,
    /// Trim surrounding whitespace and case-fold before comparing.
    Normalized,
}

impl TextPolicy {
    /// The grouping key for a question text under this policy.
    pub fn key(&self, text: &str) -> String {
        match self {
            TextPolicy::Exact => text.to_string(),
            TextPolicy::Normalized => text.trim().to_lowercase(),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TextPolicy::Exact => "exact",
            TextPolicy::Normalized => "normalized",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "exact" => Some(TextPolicy::Exact),
            "normalized" => Some(TextPolicy::Normalized),
            _ => None,
        }
    }
}

/// Which slice of the questions table an operation covers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    #[default]
    All,
    Category(String),
}

impl Scope {
    pub fn from_category(category: Option<String>) -> Self {
        match category {
            Some(c) => Scope::Category(c),
            None => Scope::All,
        }
    }

    pub fn describe(&self) -> String {
        match self {
            Scope::All => "all categories".to_string(),
            Scope::Category(c) => format!("category '{}'", c),
        }
    }
}

/// Output format for the question export tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Csv,
    Json,
}

impl ExportFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "csv" => Some(ExportFormat::Csv),
            "json" => Some(ExportFormat::Json),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_policy_preserves_text() {
        assert_eq!(TextPolicy::Exact.key("  What IS courage? "), "  What IS courage? ");
    }

    #[test]
    fn test_normalized_policy_trims_and_lowercases() {
        assert_eq!(
            TextPolicy::Normalized.key("  What IS courage? "),
            "what is courage?"
        );
    }

    #[test]
    fn test_policy_parse_round_trip() {
        for policy in [TextPolicy::Exact, TextPolicy::Normalized] {
            assert_eq!(TextPolicy::parse(policy.as_str()), Some(policy));
        }
        assert_eq!(TextPolicy::parse("fuzzy"), None);
    }

    #[test]
    fn test_scope_from_category() {
        assert_eq!(Scope::from_category(None), Scope::All);
        assert_eq!(
            Scope::from_category(Some("dating".to_string())),
            Scope::Category("dating".to_string())
        );
    }
}

//! Column type classification: which columns take part in comparison.
//!
//! Some CQL types have REST encodings that are known to differ from the
//! driver's (blobs, decimals that went through a JSON double, maps keyed by
//! doubles). Those columns are skipped instead of compared. The decision is
//! a table of rules so that each deployment states its policy explicitly.

use serde::{Deserialize, Serialize};

use crate::core::ColumnTypeTag;

/// How a rule matches a column type tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TagPredicate {
    /// Tag contains the pattern anywhere (`blob` matches `list<blob>`).
    Contains(String),
    /// Tag equals the pattern exactly.
    Exact(String),
}

impl TagPredicate {
    /// Check whether the predicate matches a tag.
    #[must_use]
    pub fn matches(&self, tag: &ColumnTypeTag) -> bool {
        match self {
            TagPredicate::Contains(pattern) => tag.as_str().contains(pattern.as_str()),
            TagPredicate::Exact(pattern) => tag.as_str() == pattern,
        }
    }

    /// The pattern text.
    #[must_use]
    pub fn pattern(&self) -> &str {
        match self {
            TagPredicate::Contains(p) | TagPredicate::Exact(p) => p,
        }
    }
}

/// One row of the ignore table.
///
/// In YAML: `{contains: blob, reason: "..."}` or `{exact: decimal, ignore: false}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IgnoreRule {
    #[serde(flatten)]
    pub predicate: TagPredicate,

    /// Decision when the predicate matches (default: true).
    #[serde(default = "default_true")]
    pub ignore: bool,

    /// Why the column is skipped, for logs and reports.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl IgnoreRule {
    /// Rule that ignores tags containing `pattern`.
    pub fn contains(pattern: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            predicate: TagPredicate::Contains(pattern.into()),
            ignore: true,
            reason: Some(reason.into()),
        }
    }

    /// Rule that ignores tags equal to `pattern`.
    pub fn exact(pattern: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            predicate: TagPredicate::Exact(pattern.into()),
            ignore: true,
            reason: Some(reason.into()),
        }
    }
}

/// Named rule sets seen in practice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IgnorePreset {
    /// Skip blob columns and plain decimal columns.
    #[default]
    BlobAndDecimal,

    /// Skip blob columns and `map<double, text>` columns.
    BlobAndDoubleTextMap,
}

/// Ordered rule table; the first matching rule decides, no match means
/// the column is compared.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IgnorePolicy {
    rules: Vec<IgnoreRule>,
}

impl IgnorePolicy {
    /// Create a policy from explicit rules.
    pub fn new(rules: Vec<IgnoreRule>) -> Self {
        Self { rules }
    }

    /// Policy that compares every column.
    pub fn compare_all() -> Self {
        Self { rules: Vec::new() }
    }

    /// Skip blobs and exact `decimal` columns.
    pub fn blob_and_decimal() -> Self {
        Self::new(vec![
            IgnoreRule::contains("blob", "blob encoding differs between CQL and REST"),
            IgnoreRule::exact("decimal", "decimal precision is lost in REST JSON"),
        ])
    }

    /// Skip blobs and exact `map<double, text>` columns.
    pub fn blob_and_double_text_map() -> Self {
        Self::new(vec![
            IgnoreRule::contains("blob", "blob encoding differs between CQL and REST"),
            IgnoreRule::exact("map<double, text>", "double map keys are re-stringified by REST"),
        ])
    }

    /// Build the policy for a preset.
    pub fn from_preset(preset: IgnorePreset) -> Self {
        match preset {
            IgnorePreset::BlobAndDecimal => Self::blob_and_decimal(),
            IgnorePreset::BlobAndDoubleTextMap => Self::blob_and_double_text_map(),
        }
    }

    /// Append a rule (lowest precedence).
    pub fn with_rule(mut self, rule: IgnoreRule) -> Self {
        self.rules.push(rule);
        self
    }

    /// All rules in precedence order.
    #[must_use]
    pub fn rules(&self) -> &[IgnoreRule] {
        &self.rules
    }

    /// First rule matching the tag.
    #[must_use]
    pub fn matching_rule(&self, tag: &ColumnTypeTag) -> Option<&IgnoreRule> {
        self.rules.iter().find(|rule| rule.predicate.matches(tag))
    }

    /// Whether a column of this type is excluded from comparison.
    #[must_use]
    pub fn should_ignore(&self, tag: &ColumnTypeTag) -> bool {
        self.matching_rule(tag).is_some_and(|rule| rule.ignore)
    }
}

impl Default for IgnorePolicy {
    fn default() -> Self {
        Self::blob_and_decimal()
    }
}

/// Classify a tag under the default policy (blob + decimal).
#[must_use]
pub fn should_ignore(tag: &ColumnTypeTag) -> bool {
    IgnorePolicy::default().should_ignore(tag)
}

fn default_true() -> bool {
    true
}

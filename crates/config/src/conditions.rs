use std::collections::HashMap;
use std::fmt;

use giclass_common::{Error, Result};
use serde::{Deserialize, Serialize};

/// The closed set of classifier output labels
pub const KNOWN_LABELS: [&str; 8] = [
    "dyed-lifted-polyps",
    "dyed-resection-margins",
    "esophagitis",
    "normal-cecum",
    "normal-pylorus",
    "normal-z-line",
    "polyps",
    "ulcerative-colitis",
];

/// Severity tier attached to a condition record
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Severity {
    Normal,
    #[serde(rename = "Medium Risk")]
    MediumRisk,
    #[serde(rename = "High Risk")]
    HighRisk,
    #[serde(rename = "Post-Surgical")]
    PostSurgical,
    Unknown,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Normal => "Normal",
            Severity::MediumRisk => "Medium Risk",
            Severity::HighRisk => "High Risk",
            Severity::PostSurgical => "Post-Surgical",
            Severity::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Display metadata for one classifier output label
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConditionInfo {
    /// Display name
    pub name: String,
    /// Patient-facing description
    pub description: String,
    /// Severity tier
    pub severity: Severity,
    /// Display color (hex)
    pub color: String,
    /// Icon identifier
    pub icon: String,
    /// Whether treatment is needed; `None` when the condition is unrecognized
    pub treatment_needed: Option<bool>,
    /// Urgency directive
    pub urgency: String,
    /// Ordered treatment options
    pub treatment_options: Vec<String>,
    /// Ordered lifestyle recommendations
    pub lifestyle_recommendations: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct ConditionEntry {
    label: String,
    #[serde(flatten)]
    info: ConditionInfo,
}

/// On-disk shape of the conditions knowledge base
#[derive(Debug, Clone, Deserialize)]
struct ConditionDatabase {
    conditions: Vec<ConditionEntry>,
    unknown: ConditionInfo,
}

/// Medical-conditions knowledge base.
///
/// Constructed once at process start and shared read-only; lookups are total
/// and fall back to the unknown-condition sentinel.
#[derive(Debug, Clone)]
pub struct ConditionRegistry {
    conditions: HashMap<String, ConditionInfo>,
    unknown: ConditionInfo,
}

impl ConditionRegistry {
    /// Load the built-in knowledge base
    pub fn load_defaults() -> Result<Self> {
        Self::load_from_json(include_str!("conditions.json"))
    }

    /// Load a knowledge base from a JSON document
    pub fn load_from_json(json: &str) -> Result<Self> {
        let data: ConditionDatabase = serde_json::from_str(json)?;

        if data.unknown.severity != Severity::Unknown {
            return Err(Error::Config(
                "sentinel condition record must have severity Unknown".to_string(),
            ));
        }

        let mut conditions = HashMap::with_capacity(data.conditions.len());
        for entry in data.conditions {
            if conditions.insert(entry.label.clone(), entry.info).is_some() {
                return Err(Error::Config(format!(
                    "duplicate condition label: {}",
                    entry.label
                )));
            }
        }

        Ok(Self {
            conditions,
            unknown: data.unknown,
        })
    }

    /// Get the record for a label. Total: unrecognized labels (including the
    /// empty string) get the unknown-condition sentinel.
    pub fn get(&self, label: &str) -> &ConditionInfo {
        self.conditions.get(label).unwrap_or(&self.unknown)
    }

    /// Whether the label is one of the known set
    pub fn contains(&self, label: &str) -> bool {
        self.conditions.contains_key(label)
    }

    /// The unknown-condition sentinel record
    pub fn unknown(&self) -> &ConditionInfo {
        &self.unknown
    }

    /// All known labels, sorted
    pub fn labels(&self) -> Vec<String> {
        let mut labels: Vec<String> = self.conditions.keys().cloned().collect();
        labels.sort();
        labels
    }

    pub fn len(&self) -> usize {
        self.conditions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }
}

/// Format a classifier label for display: hyphens and underscores become
/// spaces, then each word is title-cased. Accepts any string; empty input
/// returns empty output.
pub fn format_label(label: &str) -> String {
    let mut formatted = String::with_capacity(label.len());
    let mut word_start = true;

    for ch in label.chars() {
        let ch = if ch == '-' || ch == '_' { ' ' } else { ch };
        if ch == ' ' {
            word_start = true;
            formatted.push(ch);
        } else if word_start {
            formatted.extend(ch.to_uppercase());
            word_start = false;
        } else {
            formatted.extend(ch.to_lowercase());
        }
    }

    formatted
}

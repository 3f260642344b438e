//! Arbitration between the automatic classifier and the user's manual choice.
//!
//! Precedence is a single rule, implemented by [`arbitrate`]:
//! manual selection > automatic label > `Others`.

use civic_intake_protocol::Category;
use serde::Serialize;
use tracing::debug;

use crate::constants::DEFAULT_RAW_LABEL;

/// Entry of the manual issue-type dropdown. Several keys may share a category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct IssueTypeOption {
    pub key: &'static str,
    pub label: &'static str,
    pub category: Category,
}

pub const ISSUE_TYPE_OPTIONS: &[IssueTypeOption] = &[
    IssueTypeOption {
        key: "pothole",
        label: "Pothole",
        category: Category::Pothole,
    },
    IssueTypeOption {
        key: "road_damage",
        label: "Damaged road surface",
        category: Category::Pothole,
    },
    IssueTypeOption {
        key: "garbage",
        label: "Garbage",
        category: Category::Garbage,
    },
    IssueTypeOption {
        key: "illegal_dumping",
        label: "Illegal dumping",
        category: Category::Garbage,
    },
    IssueTypeOption {
        key: "streetlight",
        label: "Broken streetlight",
        category: Category::Others,
    },
    IssueTypeOption {
        key: "water",
        label: "Water supply",
        category: Category::Others,
    },
    IssueTypeOption {
        key: "drainage",
        label: "Drainage / sewage",
        category: Category::Others,
    },
    IssueTypeOption {
        key: "traffic",
        label: "Traffic",
        category: Category::Others,
    },
    IssueTypeOption {
        key: "noise",
        label: "Noise",
        category: Category::Others,
    },
    IssueTypeOption {
        key: "construction",
        label: "Construction",
        category: Category::Others,
    },
    IssueTypeOption {
        key: "other",
        label: "Other",
        category: Category::Others,
    },
];

/// Look up a manual dropdown key
pub fn issue_type(key: &str) -> Option<&'static IssueTypeOption> {
    ISSUE_TYPE_OPTIONS.iter().find(|o| o.key == key)
}

/// Map a classifier label onto the backend taxonomy. Unknown labels are `Others`.
pub fn category_for_label(label: &str) -> Category {
    match label.trim().to_ascii_lowercase().as_str() {
        "pothole" => Category::Pothole,
        "garbage" => Category::Garbage,
        _ => Category::Others,
    }
}

/// Final classification of a draft
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassificationResolution {
    pub category: Category,
    /// Manual key or classifier label that produced `category`
    pub raw_label: String,
}

/// Both classification signals for a draft. Automatic and manual are kept
/// side by side so "AI said X, user chose Y" stays visible.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassificationState {
    automatic: Option<String>,
    manual: Option<String>,
}

impl ClassificationState {
    pub fn automatic(&self) -> Option<&str> {
        self.automatic.as_deref()
    }

    pub fn manual(&self) -> Option<&str> {
        self.manual.as_deref()
    }

    /// Record the classifier's label. The classifier reports once per draft;
    /// later or blank labels are ignored. Returns whether the label was kept.
    pub fn set_automatic(&mut self, label: &str) -> bool {
        let label = label.trim();
        if label.is_empty() {
            return false;
        }
        if let Some(existing) = &self.automatic {
            debug!(existing = %existing, ignored = %label, "Automatic label already set");
            return false;
        }
        self.automatic = Some(label.to_string());
        true
    }

    /// Record the user's dropdown choice. An empty key clears the override.
    pub fn set_manual(&mut self, key: &str) {
        let key = key.trim();
        self.manual = (!key.is_empty()).then(|| key.to_string());
    }

    pub fn resolve(&self) -> ClassificationResolution {
        arbitrate(self.automatic.as_deref(), self.manual.as_deref())
    }
}

pub fn arbitrate(automatic: Option<&str>, manual: Option<&str>) -> ClassificationResolution {
    if let Some(key) = manual {
        let category = issue_type(key).map_or(Category::Others, |o| o.category);
        return ClassificationResolution {
            category,
            raw_label: key.to_string(),
        };
    }
    if let Some(label) = automatic {
        return ClassificationResolution {
            category: category_for_label(label),
            raw_label: label.to_string(),
        };
    }
    ClassificationResolution {
        category: Category::Others,
        raw_label: DEFAULT_RAW_LABEL.to_string(),
    }
}

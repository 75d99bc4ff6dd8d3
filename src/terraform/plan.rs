//! Parsing of `terraform plan` / `terraform show` text output.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// "Plan: 2 to add, 1 to change, 0 to destroy." (optionally preceded by
/// "N to import, ")
static SUMMARY_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Plan: (?:\d+ to import, )?(\d+) to add, (\d+) to change, (\d+) to destroy").unwrap()
});

static NO_CHANGES_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^\s*No changes\.").unwrap());

/// "  # aws_instance.web will be created"
static CHANGE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?m)^\s*#\s+(\S+)\s+(will be created|will be destroyed|will be updated in-place|will be read during apply|must be replaced|is tainted, so must be replaced)",
    )
    .unwrap()
});

/// What a plan intends to do with one resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeAction {
    Create,
    Update,
    Replace,
    Delete,
    Read,
}

impl ChangeAction {
    fn from_phrase(phrase: &str) -> Option<Self> {
        match phrase {
            "will be created" => Some(Self::Create),
            "will be updated in-place" => Some(Self::Update),
            "must be replaced" | "is tainted, so must be replaced" => Some(Self::Replace),
            "will be destroyed" => Some(Self::Delete),
            "will be read during apply" => Some(Self::Read),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannedChange {
    pub address: String,
    pub action: ChangeAction,
}

/// Summary of a computed (never applied) plan.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanSummary {
    pub to_add: u32,
    pub to_change: u32,
    pub to_destroy: u32,
    pub changes: Vec<PlannedChange>,
}

impl PlanSummary {
    pub fn has_changes(&self) -> bool {
        self.to_add + self.to_change + self.to_destroy > 0
    }
}

/// Extract the plan summary from terraform's human-readable output.
///
/// Returns `None` when the output contains neither a `Plan:` line nor a
/// `No changes.` marker.
pub fn parse_plan_output(output: &str) -> Option<PlanSummary> {
    let changes: Vec<PlannedChange> = CHANGE_REGEX
        .captures_iter(output)
        .filter_map(|caps| {
            Some(PlannedChange {
                address: caps.get(1)?.as_str().to_string(),
                action: ChangeAction::from_phrase(caps.get(2)?.as_str())?,
            })
        })
        .collect();

    if let Some(caps) = SUMMARY_REGEX.captures(output) {
        let count = |i: usize| {
            caps.get(i)
                .and_then(|m| m.as_str().parse::<u32>().ok())
                .unwrap_or(0)
        };
        return Some(PlanSummary {
            to_add: count(1),
            to_change: count(2),
            to_destroy: count(3),
            changes,
        });
    }

    if NO_CHANGES_REGEX.is_match(output) {
        return Some(PlanSummary::default());
    }

    None
}

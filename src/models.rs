//! Core data models for the productivity mesh

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

use crate::coerce;

//
// ================= Enums =================
//

/// Task priority. Anything that is not `high` or `medium` weighs as `low`.
#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    #[default]
    Low,
    Medium,
    High,
}

impl Priority {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "high" => Priority::High,
            "medium" => Priority::Medium,
            _ => Priority::Low,
        }
    }

    /// Ordering rank used by list sorting (high first)
    pub fn rank(&self) -> u8 {
        match self {
            Priority::High => 0,
            Priority::Medium => 1,
            Priority::Low => 2,
        }
    }
}

impl<'de> Deserialize<'de> for Priority {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        // non-string priorities weigh as low rather than failing the record
        let raw = Value::deserialize(deserializer)?;
        Ok(raw.as_str().map(Priority::parse).unwrap_or_default())
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        };
        write!(f, "{}", s)
    }
}

//
// ================= Expense =================
//

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    #[serde(default, deserialize_with = "coerce::string_or_empty")]
    pub id: String,
    /// ISO calendar date, `YYYY-MM-DD`
    #[serde(default, deserialize_with = "coerce::string_or_empty")]
    pub date: String,
    #[serde(default, deserialize_with = "coerce::string_or_empty")]
    pub category: String,
    /// Free-text merchant / memo
    #[serde(default, deserialize_with = "coerce::string_or_empty")]
    pub description: String,
    #[serde(default, deserialize_with = "coerce::amount")]
    pub amount: f64,
}

impl Expense {
    /// `YYYY-MM` bucket key, if the record carries a date at all
    pub fn month_key(&self) -> Option<&str> {
        if self.date.is_empty() {
            return None;
        }
        Some(self.date.get(..7).unwrap_or(&self.date))
    }

    /// Lower-cased, trimmed description used as merchant key
    pub fn merchant_key(&self) -> Option<String> {
        let key = self.description.trim().to_lowercase();
        (!key.is_empty()).then_some(key)
    }
}

//
// ================= Task =================
//

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    #[serde(default, deserialize_with = "coerce::string_or_empty")]
    pub id: String,
    #[serde(default, deserialize_with = "coerce::string_or_empty")]
    pub title: String,
    #[serde(default, deserialize_with = "coerce::string_or_empty")]
    pub notes: String,
    #[serde(default)]
    pub priority: Priority,
    #[serde(
        default,
        deserialize_with = "coerce::optional_date",
        skip_serializing_if = "Option::is_none"
    )]
    pub due: Option<NaiveDate>,
    #[serde(default, deserialize_with = "coerce::string_list")]
    pub tags: Vec<String>,
    #[serde(default, deserialize_with = "coerce::truthy")]
    pub completed: bool,
    /// Milliseconds since the epoch
    #[serde(default, deserialize_with = "coerce::timestamp")]
    pub created_at: i64,
    #[serde(
        default,
        deserialize_with = "coerce::optional_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub completed_at: Option<i64>,
}

impl Task {
    /// First tag, or `general` when the task is untagged
    pub fn lane(&self) -> &str {
        self.tags
            .first()
            .map(String::as_str)
            .filter(|tag| !tag.is_empty())
            .unwrap_or("general")
    }
}

//
// ================= Expense Advice =================
//

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Envelope {
    pub category: String,
    pub weekly_cap: i64,
    pub target_cut_pct: u32,
    pub currency: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CategoryTotal {
    pub category: String,
    pub amount: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MonthTotal {
    pub month: String,
    pub total: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AdviceStats {
    pub total: f64,
    pub top_categories: Vec<CategoryTotal>,
    pub months: Vec<MonthTotal>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AdviceResult {
    pub suggestions: Vec<String>,
    pub envelopes: Vec<Envelope>,
    pub stats: AdviceStats,
    pub narrative: String,
}

//
// ================= Day Plan =================
//

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PlannedBlock {
    pub id: String,
    pub title: String,
    /// `HH:MM`, 24h
    pub from: String,
    pub to: String,
    pub estimate_min: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blocked: Option<bool>,
}

impl PlannedBlock {
    pub fn is_blocked(&self) -> bool {
        self.blocked.unwrap_or(false)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PlanResult {
    pub plan: Vec<PlannedBlock>,
    pub nudges: Vec<String>,
    pub tone: String,
    pub plan_text: String,
    pub buckets: BTreeMap<String, Vec<String>>,
    pub blocked: Vec<String>,
}

//
// ================= Request Payloads =================
//

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdvisePayload {
    #[serde(default)]
    pub items: Vec<Expense>,
    #[serde(default, deserialize_with = "coerce::optional_string")]
    pub currency: Option<String>,
    #[serde(default, deserialize_with = "coerce::optional_number")]
    pub max_suggestions: Option<f64>,
    #[serde(default, deserialize_with = "coerce::optional_number")]
    pub seed: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanPayload {
    #[serde(default)]
    pub tasks: Vec<Task>,
    #[serde(default, deserialize_with = "coerce::optional_number")]
    pub seed: Option<f64>,
}

/// Acknowledgement for `expense.add`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AddAck {
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

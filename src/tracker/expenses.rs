//! Expense list queries and chart summaries

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::models::Expense;

/// One labelled value in a chart series
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SeriesPoint {
    pub label: String,
    pub value: f64,
}

/// Case-insensitive match on category, description, or date
pub fn filter_expenses<'a>(items: &'a [Expense], query: &str) -> Vec<&'a Expense> {
    let needle = query.trim().to_lowercase();
    items
        .iter()
        .filter(|e| {
            needle.is_empty()
                || e.category.to_lowercase().contains(&needle)
                || e.description.to_lowercase().contains(&needle)
                || e.date.contains(&needle)
        })
        .collect()
}

/// Per-category totals, largest first
pub fn category_breakdown<'a, I>(items: I) -> Vec<SeriesPoint>
where
    I: IntoIterator<Item = &'a Expense>,
{
    let mut series = sum_by(items, |e| Some(e.category.clone()));
    series.sort_by(|a, b| b.value.total_cmp(&a.value));
    series
}

/// Per-month totals in calendar order; undated records are skipped
pub fn monthly_series<'a, I>(items: I) -> Vec<SeriesPoint>
where
    I: IntoIterator<Item = &'a Expense>,
{
    let mut series = sum_by(items, |e| e.month_key().map(str::to_string));
    series.sort_by(|a, b| a.label.cmp(&b.label));
    series
}

/// Newest date first; same-day records keep their relative order
pub fn sort_newest_first(items: &mut [Expense]) {
    items.sort_by(|a, b| b.date.cmp(&a.date));
}

fn sum_by<'a, I, F>(items: I, key: F) -> Vec<SeriesPoint>
where
    I: IntoIterator<Item = &'a Expense>,
    F: Fn(&Expense) -> Option<String>,
{
    let mut order: Vec<SeriesPoint> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for expense in items {
        let Some(label) = key(expense) else {
            continue;
        };
        let idx = *index.entry(label.clone()).or_insert_with(|| {
            order.push(SeriesPoint { label, value: 0.0 });
            order.len() - 1
        });
        order[idx].value += expense.amount;
    }

    order
}

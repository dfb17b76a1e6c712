//! Expense advisor
//!
//! Aggregates an expense snapshot into category, month, and merchant
//! totals, derives a handful of relevance signals, and curates a short,
//! deduplicated list of suggestions plus weekly budget envelopes.
//!
//! Pure and synchronous. Phrasing varies only through the supplied
//! [`RandomSource`]; the numeric stats are always exact.

use std::collections::{HashMap, HashSet};
use tracing::debug;

use crate::coerce::wrap_to_u32;
use crate::models::{
    AdvisePayload, AdviceResult, AdviceStats, CategoryTotal, Envelope, Expense, MonthTotal,
};
use crate::money::format_currency;
use crate::rng::{Lcg, RandomSource};

pub mod rules;
pub use rules::{AdvisorTables, CategoryNormalizer, DEFAULT_NORMALIZER, DEFAULT_TABLES};

pub const DEFAULT_CURRENCY: &str = "CAD";
pub const DEFAULT_MAX_SUGGESTIONS: usize = 6;
pub const MIN_SUGGESTIONS: usize = 3;
pub const MAX_SUGGESTIONS: usize = 10;

const TOP_CATEGORY_COUNT: usize = 3;
const TIP_CATEGORY_COUNT: usize = 2;
const ENVELOPE_COUNT: usize = 2;
const ENVELOPE_TARGET_CUT_PCT: u32 = 12;
const ENVELOPE_MIN_WEEKLY_CAP: i64 = 10;
const DOMINANCE_SHARE: f64 = 0.4;
const OTHER_SHARE_WARNING: f64 = 0.1;
const MOM_CHANGE_THRESHOLD: f64 = 0.2;
const REPEAT_MIN_COUNT: u32 = 3;
const REPEAT_MIN_TOTAL: f64 = 50.0;
const OTHER_CATEGORY: &str = "Other";

/// Caller options for one advice call
#[derive(Debug, Clone, PartialEq)]
pub struct AdviceOptions {
    pub currency: String,
    /// Already clamped to `[MIN_SUGGESTIONS, MAX_SUGGESTIONS]`
    pub max_suggestions: usize,
    pub seed: Option<u32>,
}

impl Default for AdviceOptions {
    fn default() -> Self {
        Self {
            currency: DEFAULT_CURRENCY.to_string(),
            max_suggestions: DEFAULT_MAX_SUGGESTIONS,
            seed: None,
        }
    }
}

impl AdviceOptions {
    /// Resolve wire options. A blank currency falls back to `default_currency`;
    /// a missing or malformed limit falls back to the default before clamping.
    pub fn from_payload(payload: &AdvisePayload, default_currency: &str) -> Self {
        let currency = payload
            .currency
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .unwrap_or(default_currency)
            .to_string();

        let max_suggestions = payload
            .max_suggestions
            .map(|n| n.clamp(MIN_SUGGESTIONS as f64, MAX_SUGGESTIONS as f64).trunc() as usize)
            .unwrap_or(DEFAULT_MAX_SUGGESTIONS);

        Self {
            currency,
            max_suggestions,
            seed: payload.seed.map(wrap_to_u32),
        }
    }
}

/// {count, total} per merchant key
#[derive(Debug, Clone, Copy, Default)]
struct MerchantTally {
    count: u32,
    total: f64,
}

/// One-pass aggregation over the snapshot. Category and merchant order
/// is first-appearance order so that ties rank deterministically.
#[derive(Debug, Default)]
struct Aggregates {
    categories: Vec<(String, f64)>,
    months: Vec<(String, f64)>,
    merchants: Vec<(String, MerchantTally)>,
}

impl Aggregates {
    fn collect(items: &[Expense]) -> Self {
        let mut categories: Vec<(String, f64)> = Vec::new();
        let mut months: Vec<(String, f64)> = Vec::new();
        let mut merchants: Vec<(String, MerchantTally)> = Vec::new();
        let mut category_idx: HashMap<String, usize> = HashMap::new();
        let mut month_idx: HashMap<String, usize> = HashMap::new();
        let mut merchant_idx: HashMap<String, usize> = HashMap::new();

        for expense in items {
            let amount = expense.amount;

            let idx = *category_idx
                .entry(expense.category.clone())
                .or_insert_with(|| {
                    categories.push((expense.category.clone(), 0.0));
                    categories.len() - 1
                });
            categories[idx].1 += amount;

            if let Some(month) = expense.month_key() {
                let idx = *month_idx.entry(month.to_string()).or_insert_with(|| {
                    months.push((month.to_string(), 0.0));
                    months.len() - 1
                });
                months[idx].1 += amount;
            }

            if let Some(merchant) = expense.merchant_key() {
                let idx = *merchant_idx.entry(merchant.clone()).or_insert_with(|| {
                    merchants.push((merchant, MerchantTally::default()));
                    merchants.len() - 1
                });
                merchants[idx].1.count += 1;
                merchants[idx].1.total += amount;
            }
        }

        months.sort_by(|a, b| a.0.cmp(&b.0));

        Self {
            categories,
            months,
            merchants,
        }
    }

    fn total(&self) -> f64 {
        self.categories.iter().map(|(_, v)| v).sum()
    }

    /// Categories by total descending; stable, so ties keep input order
    fn ranked_categories(&self) -> Vec<(String, f64)> {
        let mut ranked = self.categories.clone();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
        ranked
    }

    fn category_total(&self, name: &str) -> Option<f64> {
        self.categories
            .iter()
            .find(|(c, _)| c == name)
            .map(|(_, v)| *v)
    }

    /// (previous month, latest month); missing months read as zero
    fn last_two_months(&self) -> (f64, f64) {
        let n = self.months.len();
        let last = if n >= 1 { self.months[n - 1].1 } else { 0.0 };
        let prev = if n >= 2 { self.months[n - 2].1 } else { 0.0 };
        (prev, last)
    }
}

/// Boolean and derived relevance signals gating the conditional suggestions
#[derive(Debug, Clone, Default)]
struct Signals {
    dominant: bool,
    has_other: bool,
    other_share: f64,
    has_subscription: bool,
    has_gym: bool,
    has_annual: bool,
    repeated_merchant: Option<String>,
    big_mom_change: bool,
}

impl Signals {
    fn derive(items: &[Expense], agg: &Aggregates, total: f64, tables: &AdvisorTables) -> Self {
        let dominant =
            total > 0.0 && agg.categories.iter().any(|(_, v)| v / total > DOMINANCE_SHARE);

        let other_total = agg.category_total(OTHER_CATEGORY);
        let other_share = other_total
            .map(|v| v / total.max(1.0))
            .unwrap_or(0.0);

        let descriptions: Vec<String> = items
            .iter()
            .map(|e| e.description.to_lowercase())
            .collect();
        let any_mentions = |keywords: &[&str]| {
            descriptions
                .iter()
                .any(|d| rules::mentions_any(d, keywords))
        };

        let mut repeated: Vec<&(String, MerchantTally)> = agg
            .merchants
            .iter()
            .filter(|(_, t)| t.count >= REPEAT_MIN_COUNT && t.total >= REPEAT_MIN_TOTAL)
            .collect();
        repeated.sort_by(|a, b| b.1.total.total_cmp(&a.1.total));

        let (prev, last) = agg.last_two_months();
        let big_mom_change = agg.months.len() >= 2
            && (last - prev).abs() / prev.max(1.0) >= MOM_CHANGE_THRESHOLD;

        Self {
            dominant,
            has_other: other_total.is_some(),
            other_share,
            has_subscription: any_mentions(tables.subscription_keywords),
            has_gym: any_mentions(tables.gym_keywords),
            has_annual: any_mentions(tables.annual_keywords),
            repeated_merchant: repeated.first().map(|(m, _)| m.clone()),
            big_mom_change,
        }
    }
}

/// Expense advisor bound to a set of static tables
pub struct ExpenseAdvisor<'a> {
    tables: &'a AdvisorTables,
    normalizer: &'a CategoryNormalizer,
}

impl Default for ExpenseAdvisor<'static> {
    fn default() -> Self {
        Self::new(&DEFAULT_TABLES, &DEFAULT_NORMALIZER)
    }
}

impl<'a> ExpenseAdvisor<'a> {
    pub fn new(tables: &'a AdvisorTables, normalizer: &'a CategoryNormalizer) -> Self {
        Self { tables, normalizer }
    }

    /// Produce advice, drawing all phrasing choices from `rng`.
    pub fn advise<R: RandomSource>(
        &self,
        items: &[Expense],
        opts: &AdviceOptions,
        rng: &mut R,
    ) -> AdviceResult {
        let agg = Aggregates::collect(items);
        let total = agg.total();
        let ranked = agg.ranked_categories();
        let top: Vec<(String, f64)> = ranked.into_iter().take(TOP_CATEGORY_COUNT).collect();

        if items.is_empty() {
            return AdviceResult {
                suggestions: vec![rules::EMPTY_SUGGESTION.to_string()],
                envelopes: Vec::new(),
                stats: AdviceStats::default(),
                narrative: rules::EMPTY_NARRATIVE.to_string(),
            };
        }

        let signals = Signals::derive(items, &agg, total, self.tables);
        debug!(
            items = items.len(),
            total,
            months = agg.months.len(),
            dominant = signals.dominant,
            mom_change = signals.big_mom_change,
            "Expense signals derived"
        );

        let curated = self.curate(&agg, &top, total, &signals, &opts.currency, rng);
        let suggestions = dedupe_and_cap(curated, opts.max_suggestions);

        let envelopes = top
            .iter()
            .take(ENVELOPE_COUNT)
            .map(|(category, monthly)| Envelope {
                category: category.clone(),
                weekly_cap: weekly_cap(*monthly),
                target_cut_pct: ENVELOPE_TARGET_CUT_PCT,
                currency: opts.currency.clone(),
            })
            .collect();

        let narrative = pick(rng, self.tables.narratives);

        AdviceResult {
            suggestions,
            envelopes,
            stats: AdviceStats {
                total,
                top_categories: top
                    .iter()
                    .map(|(category, amount)| CategoryTotal {
                        category: category.clone(),
                        amount: *amount,
                    })
                    .collect(),
                months: agg
                    .months
                    .iter()
                    .map(|(month, total)| MonthTotal {
                        month: month.clone(),
                        total: *total,
                    })
                    .collect(),
            },
            narrative,
        }
    }

    /// Ordered candidate list, before dedup and truncation
    fn curate<R: RandomSource>(
        &self,
        agg: &Aggregates,
        top: &[(String, f64)],
        total: f64,
        signals: &Signals,
        currency: &str,
        rng: &mut R,
    ) -> Vec<String> {
        let fmt = |n: f64| format_currency(n, currency);
        let (prev, last) = agg.last_two_months();
        let mut curated = Vec::new();

        curated.push(pick(rng, self.tables.openers));
        let month_clause = if agg.months.is_empty() {
            String::new()
        } else {
            format!("; last month {}, this month {}", fmt(prev), fmt(last))
        };
        curated.push(format!("You’ve logged {}{}.", fmt(total), month_clause));

        if let Some((category, amount)) = top.first() {
            let label = pick(rng, self.tables.top_labels);
            curated.push(format!("{}: {} at {}.", label, category, fmt(*amount)));
        }

        for (raw, _) in top.iter().take(TIP_CATEGORY_COUNT) {
            let canonical = self.normalizer.normalize(raw);
            let tips = self.tables.tips_for(&canonical);
            if let Some(tip) = rng.choose(tips) {
                curated.push(tip.to_string());
            }
        }

        if signals.dominant {
            curated.push(rules::DOMINANCE_ALERT.to_string());
        }

        let other_leads = top.first().map(|(c, _)| c == OTHER_CATEGORY).unwrap_or(false);
        if signals.has_other && (signals.other_share >= OTHER_SHARE_WARNING || other_leads) {
            curated.push(rules::OTHER_BUCKET_WARNING.to_string());
        }

        if signals.big_mom_change {
            let delta = last - prev;
            let sign = if delta >= 0.0 { "+" } else { "" };
            curated.push(format!("Month-over-month change: {}{}.", sign, fmt(delta)));
        }

        if signals.has_subscription {
            curated.push(rules::SUBSCRIPTION_NUDGE.to_string());
        }
        if signals.has_gym {
            curated.push(rules::GYM_NUDGE.to_string());
        }
        if signals.has_annual {
            curated.push(rules::ANNUAL_NUDGE.to_string());
        }

        if let Some(merchant) = &signals.repeated_merchant {
            curated.push(format!(
                "Frequent with “{}”: set a per-visit cap or move to a cheaper plan.",
                merchant
            ));
        }

        curated
    }
}

/// Advise with the default tables and a generator seeded from `opts`.
pub fn advise_expenses(items: &[Expense], opts: &AdviceOptions) -> AdviceResult {
    let mut rng = Lcg::from_optional_seed(opts.seed);
    ExpenseAdvisor::default().advise(items, opts, &mut rng)
}

/// Weekly cap from a monthly total: a quarter of it, rounded to the nearest 5, at least 10.
pub fn weekly_cap(monthly_total: f64) -> i64 {
    let rounded = ((monthly_total / 4.0 / 5.0) + 0.5).floor() as i64 * 5;
    rounded.max(ENVELOPE_MIN_WEEKLY_CAP)
}

fn pick<R: RandomSource>(rng: &mut R, pool: &[&str]) -> String {
    rng.choose(pool).map(|s| s.to_string()).unwrap_or_default()
}

/// Exact-string dedup preserving first occurrence, then truncate.
fn dedupe_and_cap(candidates: Vec<String>, max: usize) -> Vec<String> {
    let mut seen = HashSet::new();
    candidates
        .into_iter()
        .filter(|s| !s.is_empty() && seen.insert(s.clone()))
        .take(max)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expense(category: &str, date: &str, description: &str, amount: f64) -> Expense {
        Expense {
            id: format!("{}-{}-{}", category, date, amount),
            date: date.to_string(),
            category: category.to_string(),
            description: description.to_string(),
            amount,
        }
    }

    fn seeded(seed: u32) -> AdviceOptions {
        AdviceOptions {
            seed: Some(seed),
            ..AdviceOptions::default()
        }
    }

    fn sample() -> Vec<Expense> {
        vec![
            expense("Groceries", "2024-01-05", "Loblaws", 120.0),
            expense("Groceries", "2024-02-03", "Loblaws", 80.0),
            expense("Groceries", "2024-02-17", "Loblaws", 60.0),
            expense("Entertainment", "2024-02-10", "Netflix subscription", 18.0),
            expense("Gym", "2024-02-01", "City Fitness", 45.0),
            expense("Other", "2024-02-12", "", 30.0),
            expense("Insurance", "2024-01-20", "Car insurance annual", 600.0),
        ]
    }

    #[test]
    fn test_two_month_groceries_scenario() {
        let items = vec![
            expense("Groceries", "2024-01-05", "", 100.0),
            expense("Groceries", "2024-02-05", "", 50.0),
        ];
        let result = advise_expenses(&items, &seeded(1));

        assert_eq!(result.stats.total, 150.0);
        assert_eq!(
            result.stats.top_categories[0],
            CategoryTotal {
                category: "Groceries".into(),
                amount: 150.0
            }
        );
        assert_eq!(
            result.stats.months,
            vec![
                MonthTotal {
                    month: "2024-01".into(),
                    total: 100.0
                },
                MonthTotal {
                    month: "2024-02".into(),
                    total: 50.0
                },
            ]
        );
        assert!(result.suggestions.iter().any(|s| s
            == "You’ve logged CA$150.00; last month CA$100.00, this month CA$50.00."));
        assert!(result
            .suggestions
            .iter()
            .any(|s| s == "Month-over-month change: -CA$50.00."));
    }

    #[test]
    fn test_empty_list() {
        let result = advise_expenses(&[], &seeded(3));
        assert_eq!(result.suggestions, vec![rules::EMPTY_SUGGESTION.to_string()]);
        assert!(result.envelopes.is_empty());
        assert_eq!(result.stats.total, 0.0);
        assert!(result.stats.top_categories.is_empty());
        assert_eq!(result.narrative, rules::EMPTY_NARRATIVE);
    }

    #[test]
    fn test_top_categories_bounded_and_sorted() {
        let result = advise_expenses(&sample(), &seeded(11));
        let top = &result.stats.top_categories;

        assert!(top.len() <= 3);
        assert!(top.windows(2).all(|w| w[0].amount >= w[1].amount));
        let top_sum: f64 = top.iter().map(|c| c.amount).sum();
        assert!(top_sum <= result.stats.total + 1e-9);
        assert_eq!(top[0].category, "Insurance");
    }

    #[test]
    fn test_suggestions_bounded_and_unique() {
        for max in [1.0, 3.0, 5.0, 10.0, 40.0] {
            let payload = AdvisePayload {
                items: sample(),
                max_suggestions: Some(max),
                seed: Some(5.0),
                ..AdvisePayload::default()
            };
            let opts = AdviceOptions::from_payload(&payload, DEFAULT_CURRENCY);
            let result = advise_expenses(&payload.items, &opts);

            assert!(!result.suggestions.is_empty());
            assert!(result.suggestions.len() <= opts.max_suggestions);
            let unique: HashSet<_> = result.suggestions.iter().collect();
            assert_eq!(unique.len(), result.suggestions.len());
        }
    }

    #[test]
    fn test_max_suggestions_clamped() {
        let payload = |max: Option<f64>| AdvisePayload {
            max_suggestions: max,
            ..AdvisePayload::default()
        };
        assert_eq!(AdviceOptions::from_payload(&payload(Some(1.0)), "CAD").max_suggestions, 3);
        assert_eq!(AdviceOptions::from_payload(&payload(Some(99.0)), "CAD").max_suggestions, 10);
        assert_eq!(AdviceOptions::from_payload(&payload(Some(4.7)), "CAD").max_suggestions, 4);
        assert_eq!(AdviceOptions::from_payload(&payload(None), "CAD").max_suggestions, 6);
    }

    #[test]
    fn test_currency_fallback() {
        let payload = AdvisePayload {
            currency: Some("  ".into()),
            ..AdvisePayload::default()
        };
        assert_eq!(AdviceOptions::from_payload(&payload, "USD").currency, "USD");

        let payload = AdvisePayload {
            currency: Some("EUR".into()),
            ..AdvisePayload::default()
        };
        assert_eq!(AdviceOptions::from_payload(&payload, "USD").currency, "EUR");
    }

    #[test]
    fn test_signal_driven_suggestions() {
        let opts = AdviceOptions {
            max_suggestions: MAX_SUGGESTIONS,
            seed: Some(8),
            ..AdviceOptions::default()
        };
        let result = advise_expenses(&sample(), &opts);
        let has = |needle: &str| result.suggestions.iter().any(|s| s == needle);

        // insurance is 600 of 953
        assert!(has(rules::DOMINANCE_ALERT));
        assert!(has(rules::SUBSCRIPTION_NUDGE));
        assert!(has(rules::GYM_NUDGE));
        assert!(has(rules::ANNUAL_NUDGE));
    }

    #[test]
    fn test_repeated_merchant_and_other_bucket() {
        let items = vec![
            expense("Other", "2024-03-01", "Corner Store", 20.0),
            expense("Other", "2024-03-08", " corner store ", 20.0),
            expense("Other", "2024-03-15", "CORNER STORE", 20.0),
            expense("Groceries", "2024-03-20", "Market", 100.0),
        ];
        let opts = AdviceOptions {
            max_suggestions: MAX_SUGGESTIONS,
            seed: Some(2),
            ..AdviceOptions::default()
        };
        let result = advise_expenses(&items, &opts);

        assert!(result
            .suggestions
            .iter()
            .any(|s| s.contains("“corner store”")));
        assert!(result
            .suggestions
            .iter()
            .any(|s| s == rules::OTHER_BUCKET_WARNING));
    }

    fn signals_for(items: &[Expense]) -> Signals {
        let agg = Aggregates::collect(items);
        let total = agg.total();
        Signals::derive(items, &agg, total, &DEFAULT_TABLES)
    }

    fn all_suggestions(items: &[Expense]) -> Vec<String> {
        let opts = AdviceOptions {
            max_suggestions: MAX_SUGGESTIONS,
            seed: Some(21),
            ..AdviceOptions::default()
        };
        advise_expenses(items, &opts).suggestions
    }

    fn mom_sentence(items: &[Expense]) -> Option<String> {
        all_suggestions(items)
            .into_iter()
            .find(|s| s.starts_with("Month-over-month change"))
    }

    #[test]
    fn test_small_month_change_is_quiet() {
        let items = vec![
            expense("Groceries", "2024-01-05", "", 100.0),
            expense("Groceries", "2024-02-05", "", 119.0),
        ];
        assert!(!signals_for(&items).big_mom_change);
        assert_eq!(mom_sentence(&items), None);
    }

    #[test]
    fn test_month_change_at_threshold_fires() {
        let items = vec![
            expense("Groceries", "2024-01-05", "", 100.0),
            expense("Groceries", "2024-02-05", "", 120.0),
        ];
        assert!(signals_for(&items).big_mom_change);
        assert_eq!(
            mom_sentence(&items).as_deref(),
            Some("Month-over-month change: +CA$20.00.")
        );
    }

    #[test]
    fn test_month_change_from_zero_month() {
        // a zero previous month divides by 1, not 0
        let items = vec![
            expense("Groceries", "2024-01-05", "", 0.0),
            expense("Groceries", "2024-02-05", "", 0.5),
        ];
        assert!(signals_for(&items).big_mom_change);
        assert_eq!(
            mom_sentence(&items).as_deref(),
            Some("Month-over-month change: +CA$0.50.")
        );

        let flat = vec![
            expense("Groceries", "2024-01-05", "", 0.0),
            expense("Groceries", "2024-02-05", "", 0.1),
        ];
        assert!(!signals_for(&flat).big_mom_change);
    }

    #[test]
    fn test_single_month_has_no_change_signal() {
        let items = vec![expense("Groceries", "2024-02-05", "", 500.0)];
        assert!(!signals_for(&items).big_mom_change);
    }

    #[test]
    fn test_small_other_bucket_is_not_flagged() {
        let items = vec![
            expense("Groceries", "2024-03-01", "Market", 60.0),
            expense("Dining", "2024-03-02", "Bistro", 35.0),
            expense("Other", "2024-03-03", "Misc", 5.0),
        ];
        let signals = signals_for(&items);
        assert!(signals.has_other);
        assert!(signals.other_share < OTHER_SHARE_WARNING);
        assert!(!all_suggestions(&items)
            .iter()
            .any(|s| s == rules::OTHER_BUCKET_WARNING));
    }

    #[test]
    fn test_frequent_but_cheap_merchant_is_not_nudged() {
        let items = vec![
            expense("Dining", "2024-03-01", "Corner Cafe", 10.0),
            expense("Dining", "2024-03-08", "Corner Cafe", 10.0),
            expense("Dining", "2024-03-15", "Corner Cafe", 10.0),
            expense("Groceries", "2024-03-20", "Market", 100.0),
        ];
        assert_eq!(signals_for(&items).repeated_merchant, None);
        assert!(!all_suggestions(&items)
            .iter()
            .any(|s| s.starts_with("Frequent with")));
    }

    #[test]
    fn test_envelopes() {
        let result = advise_expenses(&sample(), &seeded(4));
        assert_eq!(result.envelopes.len(), 2);
        assert_eq!(result.envelopes[0].category, "Insurance");
        assert_eq!(result.envelopes[0].weekly_cap, 150);
        assert_eq!(result.envelopes[0].target_cut_pct, 12);
        assert_eq!(result.envelopes[0].currency, "CAD");
        // groceries 260 / 4 = 65
        assert_eq!(result.envelopes[1].weekly_cap, 65);
    }

    #[test]
    fn test_weekly_cap_rounding() {
        assert_eq!(weekly_cap(0.0), 10);
        assert_eq!(weekly_cap(30.0), 10);
        assert_eq!(weekly_cap(150.0), 40);
        assert_eq!(weekly_cap(210.0), 55);
    }

    #[test]
    fn test_seeded_advice_is_deterministic() {
        let a = advise_expenses(&sample(), &seeded(99));
        let b = advise_expenses(&sample(), &seeded(99));
        assert_eq!(a, b);
    }

    #[test]
    fn test_stats_do_not_depend_on_seed() {
        let a = advise_expenses(&sample(), &seeded(1));
        let b = advise_expenses(&sample(), &seeded(2));
        assert_eq!(a.stats, b.stats);
        assert_eq!(a.envelopes, b.envelopes);
    }
}

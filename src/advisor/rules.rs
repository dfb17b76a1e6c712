//! Static rule and phrase tables for the expense advisor
//!
//! Tables are immutable and handed to [`super::ExpenseAdvisor`] by
//! reference; nothing here is mutated at runtime.

use once_cell::sync::Lazy;
use regex::Regex;

/// Keywords that mark a description as a recurring subscription
pub const SUBSCRIPTION_KEYWORDS: &[&str] = &[
    "sub",
    "subscription",
    "spotify",
    "netflix",
    "prime",
    "youtube",
    "icloud",
    "onedrive",
    "adobe",
    "canva",
    "membership",
];

pub const GYM_KEYWORDS: &[&str] = &["gym", "fitness", "classpass"];

/// Keywords for lumpy once-a-year costs
pub const ANNUAL_KEYWORDS: &[&str] = &[
    "insurance",
    "domain",
    "license",
    "registration",
    "tax",
    "tuition",
    "membership",
    "annual",
];

/// Ordered (pattern, canonical label) pairs. First match wins, so
/// `restaurant` is claimed by Food & Dining before Restaurants is tried.
pub const CATEGORY_RULES: &[(&str, &str)] = &[
    (r"grocery|grocer|supermarket", "Groceries"),
    (r"food|dining|eat|cafe|coffee|restaurant", "Food & Dining"),
    (r"restaurant", "Restaurants"),
    (r"transport|transit|uber|lyft|taxi", "Transport"),
    (r"fuel|gasoline|diesel", "Fuel"),
    (r"gas\b", "Gas"),
    (r"travel|flight|hotel|airbnb", "Travel"),
    (r"shop|retail|apparel|clothes|electronics", "Shopping"),
    (r"utility|internet|wifi|electric|power|water|gas bill", "Utilities"),
    (r"entertainment|movies|music|games", "Entertainment"),
    (r"health|pharmacy|doctor|dentist", "Health"),
    (r"gym|fitness", "Gym"),
    (r"other|misc", "Other"),
];

/// Per-category tips, keyed by canonical label
pub const CATEGORY_TIPS: &[(&str, &[&str])] = &[
    (
        "Groceries",
        &[
            "Groceries: plan 3 core meals, shop your list, and anchor around store-brand staples.",
            "Groceries: buy base items in bulk (rice, beans, oats) and let meals orbit them.",
        ],
    ),
    (
        "Food & Dining",
        &[
            "Food & Dining: swap one dining-out this week for a home cook; bank the difference.",
            "Food & Dining: set a per-outing cap and pre-decide the number of outings.",
        ],
    ),
    (
        "Restaurants",
        &[
            "Restaurants: pick one ‘treat night’ and keep the rest to home meals.",
            "Restaurants: default to water; sides add up quickly.",
        ],
    ),
    (
        "Transport",
        &[
            "Transport: batch errands into one trip; fewer cold starts saves real fuel.",
            "Transport: map the week—stack nearby stops to cut cross-town backtracking.",
        ],
    ),
    (
        "Fuel",
        &[
            "Fuel: keep tires properly inflated; it’s a quiet efficiency gain.",
            "Fuel: combine short trips; cold engines burn more.",
        ],
    ),
    (
        "Gas",
        &[
            "Gas: group short drives; quick hops are the least efficient.",
            "Gas: check tire pressure; small PSI gaps cost over a month.",
        ],
    ),
    (
        "Travel",
        &[
            "Travel: price alerts + flexible dates usually beat fixed-date searches.",
            "Travel: pack snacks/water to avoid high airport/road markups.",
        ],
    ),
    (
        "Shopping",
        &[
            "Shopping: 24-hour cooldown → wishlist first, cart later.",
            "Shopping: filter by ‘needs’ only this month; wants go to next month’s list.",
        ],
    ),
    (
        "Utilities",
        &[
            "Utilities: compare current plan vs. new-customer promos; ask for a retention match.",
            "Utilities: auto-read your usage; set alerts for spikes.",
        ],
    ),
    (
        "Entertainment",
        &[
            "Entertainment: rotate one streamer per month; ‘one-in-one-out’ keeps costs sane.",
            "Entertainment: library/app bundles can replace single-purpose subs.",
        ],
    ),
    (
        "Health",
        &[
            "Health: ask providers about cash-pay or preventative bundle discounts.",
            "Health: schedule routine care in one window to avoid extra trips.",
        ],
    ),
    (
        "Gym",
        &[
            "Gym: check pause/reduced-rate options for 1–2 months while you reassess.",
            "Gym: if usage < 6 visits/month, pay-per-visit might be cheaper.",
        ],
    ),
    (
        "Other",
        &["Other: rename ‘Other’ items into specific buckets; precision changes behavior."],
    ),
];

pub const SNAPSHOT_OPENERS: &[&str] = &["Quick snapshot:", "Here’s the short read:", "Fast overview:"];

pub const TOP_CATEGORY_LABELS: &[&str] = &["Top category", "Largest bucket", "Biggest driver"];

pub const NARRATIVES: &[&str] = &[
    "Cap the leader, fix one recurring leak, and review weekly.",
    "Target the biggest driver, tweak one habit, and automate a small win.",
    "One cap + one change this week → steady drift down.",
];

pub const EMPTY_SUGGESTION: &str =
    "Add a few expenses so I can spot real trends and propose targeted caps.";
pub const EMPTY_NARRATIVE: &str = "Once you add some data, I’ll flip into analysis mode.";

pub const DOMINANCE_ALERT: &str =
    "Alert: one category is >40% of spend — add a weekly cap + split rules.";
pub const OTHER_BUCKET_WARNING: &str =
    "‘Other’ is absorbing a lot — rename into real buckets to expose patterns.";
pub const SUBSCRIPTION_NUDGE: &str =
    "Subscriptions: use ‘one-in-one-out’ and set a monthly review reminder.";
pub const GYM_NUDGE: &str =
    "Gym: ask about pause or reduced-rate for 1–2 months while you review usage.";
pub const ANNUAL_NUDGE: &str =
    "Annuals: create a 12-month envelope (insurance/domains/licenses) to smooth spikes.";

/// Everything the advisor needs besides the data itself
#[derive(Debug, Clone, Copy)]
pub struct AdvisorTables {
    pub subscription_keywords: &'static [&'static str],
    pub gym_keywords: &'static [&'static str],
    pub annual_keywords: &'static [&'static str],
    pub category_tips: &'static [(&'static str, &'static [&'static str])],
    pub openers: &'static [&'static str],
    pub top_labels: &'static [&'static str],
    pub narratives: &'static [&'static str],
}

impl AdvisorTables {
    pub fn tips_for(&self, canonical: &str) -> &'static [&'static str] {
        self.category_tips
            .iter()
            .find(|(label, _)| *label == canonical)
            .map(|(_, tips)| *tips)
            .unwrap_or(&[])
    }
}

pub static DEFAULT_TABLES: AdvisorTables = AdvisorTables {
    subscription_keywords: SUBSCRIPTION_KEYWORDS,
    gym_keywords: GYM_KEYWORDS,
    annual_keywords: ANNUAL_KEYWORDS,
    category_tips: CATEGORY_TIPS,
    openers: SNAPSHOT_OPENERS,
    top_labels: TOP_CATEGORY_LABELS,
    narratives: NARRATIVES,
};

/// Compiled first-match-wins category normalizer
pub struct CategoryNormalizer {
    rules: Vec<(Regex, &'static str)>,
}

impl CategoryNormalizer {
    pub fn from_rules(rules: &[(&str, &'static str)]) -> Result<Self, regex::Error> {
        let rules = rules
            .iter()
            .map(|(pattern, label)| Regex::new(pattern).map(|re| (re, *label)))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { rules })
    }

    /// Map a free-text category to its canonical label.
    /// Unmatched names pass through; an empty name becomes `Other`.
    pub fn normalize(&self, raw: &str) -> String {
        let lowered = raw.to_lowercase();
        self.rules
            .iter()
            .find(|(re, _)| re.is_match(&lowered))
            .map(|(_, label)| label.to_string())
            .unwrap_or_else(|| {
                if raw.is_empty() {
                    "Other".to_string()
                } else {
                    raw.to_string()
                }
            })
    }
}

pub static DEFAULT_NORMALIZER: Lazy<CategoryNormalizer> = Lazy::new(|| {
    CategoryNormalizer::from_rules(CATEGORY_RULES).expect("valid category rule patterns")
});

/// Substring match of any keyword against a lower-cased text
pub fn mentions_any(lowered: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|kw| lowered.contains(kw))
}

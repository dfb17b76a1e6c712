//! Day planner
//!
//! Scores incomplete tasks, lays the best ten out as back-to-back time
//! blocks starting at the current clock time, and attaches a few nudges.
//!
//! Scoring, highest first:
//! overdue (+1000) > due today (+500) > priority (100/50/10),
//! with -80 for notes carrying a `blocked:` marker and a small seeded jitter.

use chrono::{Local, NaiveDate, Timelike};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;
use tracing::debug;

use crate::coerce::wrap_to_u32;
use crate::models::{PlanPayload, PlanResult, PlannedBlock, Priority, Task};
use crate::rng::{RandomSource, XorShift32};

pub mod phrases;
pub use phrases::{PlannerPhrases, DEFAULT_PHRASES};

pub const MAX_BLOCKS: usize = 10;
pub const BUFFER_MINUTES: u32 = 5;
const EXTRA_MINUTES: u32 = 5;
const EXTRA_PROBABILITY: f64 = 0.35;
const JITTER_SPAN: f64 = 5.0;
const NUDGE_COUNT: usize = 4;
const MINUTES_PER_DAY: u32 = 24 * 60;

const OVERDUE_BONUS: f64 = 1000.0;
const DUE_TODAY_BONUS: f64 = 500.0;
const BLOCKED_PENALTY: f64 = 80.0;
const COMPLETED_PENALTY: f64 = 10_000.0;

// TODO: replace with a structured `blocked` field once task snapshots carry one
static BLOCKED_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)blocked\s*:").expect("valid blocked marker regex"));

/// Wall-clock inputs to a planning call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlanClock {
    pub today: NaiveDate,
    /// Minutes since local midnight
    pub start_minute: u32,
}

impl PlanClock {
    pub fn now() -> Self {
        let now = Local::now();
        Self {
            today: now.date_naive(),
            start_minute: now.hour() * 60 + now.minute(),
        }
    }

    pub fn at(today: NaiveDate, hour: u32, minute: u32) -> Self {
        Self {
            today,
            start_minute: (hour * 60 + minute) % MINUTES_PER_DAY,
        }
    }
}

/// Seed resolution for `tasks.plan`; zero means unseeded
pub fn seed_from_payload(payload: &PlanPayload) -> Option<u32> {
    payload.seed.map(wrap_to_u32).filter(|s| *s != 0)
}

pub fn is_blocked(task: &Task) -> bool {
    BLOCKED_MARKER.is_match(&task.notes)
}

pub fn priority_weight(priority: Priority) -> f64 {
    match priority {
        Priority::High => 100.0,
        Priority::Medium => 50.0,
        Priority::Low => 10.0,
    }
}

/// Base block length in minutes
pub fn base_duration(priority: Priority) -> u32 {
    match priority {
        Priority::High => 50,
        Priority::Medium => 30,
        Priority::Low => 20,
    }
}

/// Priority score for a task given today's date and a jitter in `[0, 5)`
pub fn score(task: &Task, today: NaiveDate, jitter: f64) -> f64 {
    let overdue = !task.completed && task.due.map(|d| d < today).unwrap_or(false);
    let due_today = !task.completed && task.due == Some(today);

    let mut score = priority_weight(task.priority) + jitter;
    if overdue {
        score += OVERDUE_BONUS;
    }
    if due_today {
        score += DUE_TODAY_BONUS;
    }
    if is_blocked(task) {
        score -= BLOCKED_PENALTY;
    }
    if task.completed {
        score -= COMPLETED_PENALTY;
    }
    score
}

/// Minutes since midnight to zero-padded `HH:MM`, wrapping past midnight
pub fn format_hhmm(total_minutes: u32) -> String {
    let h = (total_minutes / 60) % 24;
    let m = total_minutes % 60;
    format!("{:02}:{:02}", h, m)
}

pub struct DayPlanner<'a> {
    phrases: &'a PlannerPhrases,
}

impl Default for DayPlanner<'static> {
    fn default() -> Self {
        Self::new(&DEFAULT_PHRASES)
    }
}

impl<'a> DayPlanner<'a> {
    pub fn new(phrases: &'a PlannerPhrases) -> Self {
        Self { phrases }
    }

    pub fn plan<R: RandomSource>(&self, tasks: &[Task], clock: PlanClock, rng: &mut R) -> PlanResult {
        let active: Vec<&Task> = tasks.iter().filter(|t| !t.completed).collect();

        // one jitter draw per task, in input order
        let mut scored: Vec<(f64, &Task)> = active
            .iter()
            .map(|t| (score(t, clock.today, rng.next_f64() * JITTER_SPAN), *t))
            .collect();
        scored.sort_by(|a, b| b.0.total_cmp(&a.0));

        let mut cursor = clock.start_minute;
        let mut scheduled: Vec<(PlannedBlock, &Task)> = Vec::new();
        for (_, task) in scored.into_iter().take(MAX_BLOCKS) {
            let extra = if rng.chance(EXTRA_PROBABILITY) {
                EXTRA_MINUTES
            } else {
                0
            };
            let estimate = base_duration(task.priority) + extra;
            let block = PlannedBlock {
                id: task.id.clone(),
                title: task.title.clone(),
                from: format_hhmm(cursor),
                to: format_hhmm(cursor + estimate),
                estimate_min: estimate,
                blocked: is_blocked(task).then_some(true),
            };
            cursor += estimate + BUFFER_MINUTES;
            scheduled.push((block, task));
        }

        let nudges: Vec<String> = rng
            .shuffled(self.phrases.nudges)
            .into_iter()
            .take(NUDGE_COUNT)
            .map(str::to_string)
            .collect();
        let tone = rng
            .choose(self.phrases.tones)
            .map(|s| s.to_string())
            .unwrap_or_default();

        let mut buckets: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for (block, task) in &scheduled {
            buckets
                .entry(task.lane().to_string())
                .or_default()
                .push(block.title.clone());
        }

        let plan: Vec<PlannedBlock> = scheduled.into_iter().map(|(block, _)| block).collect();
        let plan_text = self.render_text(&plan);
        let blocked = plan
            .iter()
            .filter(|b| b.is_blocked())
            .map(|b| b.title.clone())
            .collect();

        debug!(
            tasks = tasks.len(),
            active = active.len(),
            planned = plan.len(),
            "Day plan built"
        );

        PlanResult {
            plan,
            nudges,
            tone,
            plan_text,
            buckets,
            blocked,
        }
    }

    /// Checkbox-style plain text rendering of a plan
    pub fn render_text(&self, plan: &[PlannedBlock]) -> String {
        if plan.is_empty() {
            return self.phrases.empty_plan_text.to_string();
        }
        plan.iter()
            .map(|b| {
                format!(
                    "- [ ] {}–{} — {}{}",
                    b.from,
                    b.to,
                    b.title,
                    if b.is_blocked() { " (blocked)" } else { "" }
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Plan with the default phrases. A seed makes the result reproducible.
pub fn plan_tasks(tasks: &[Task], seed: Option<u32>, clock: PlanClock) -> PlanResult {
    let mut rng = XorShift32::from_optional_seed(seed);
    DayPlanner::default().plan(tasks, clock, &mut rng)
}

//! Motivational pools for the day planner

pub const NUDGES: &[&str] = &[
    "Work in 25–50 min focus blocks with 5–10 min breaks.",
    "Front-load the hardest item; momentum compounds.",
    "Close each block with a 30-second note: what moved, what’s next.",
    "Batch low-complexity tasks to avoid context churn.",
    "Protect two interruption-free blocks — DND on, tabs closed.",
    "Use WIP limits: no more than 2 active tasks at once.",
    "Eisenhower it: urgent/important first, schedule the rest.",
    "Timebox admin to a single 20-minute window.",
    "If a task is stuck, write the first ugly draft or ask one concrete question.",
    "End of day: queue the first action for tomorrow — tiny and obvious.",
    "Use tags as lanes: deep-work, admin, comms, errands.",
    "Do a 5-minute weekly retro: keep, improve, drop.",
    "Group meetings together; protect a meeting-free zone.",
    "Declare a theme for today (shipping, cleanup, learning).",
    "When energy dips, run a 10-minute ‘micro-win’.",
    "Put blockers in the calendar with a name; make the ask specific.",
    "Schedule a buffer block; real days need slack.",
    "Write tasks as verbs + objects: ‘draft outline’, not ‘outline’.",
    "Kill zombie tasks: if it’s been ignored 3 times, rewrite or archive.",
    "Make the next step testably small.",
];

pub const TONES: &[&str] = &[
    "Let’s ship something meaningful today.",
    "Small, finished beats big, unfinished.",
    "One clear win, then let the rest follow.",
    "Aim for momentum, not max effort.",
];

pub const EMPTY_PLAN_TEXT: &str = "- No active tasks to plan.\n";

#[derive(Debug, Clone, Copy)]
pub struct PlannerPhrases {
    pub nudges: &'static [&'static str],
    pub tones: &'static [&'static str],
    pub empty_plan_text: &'static str,
}

pub static DEFAULT_PHRASES: PlannerPhrases = PlannerPhrases {
    nudges: NUDGES,
    tones: TONES,
    empty_plan_text: EMPTY_PLAN_TEXT,
};

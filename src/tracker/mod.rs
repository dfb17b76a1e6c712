//! List helpers for the task and expense trackers
//!
//! These mirror what the app does with its stored snapshots between
//! engine calls: streak bookkeeping, filtering, sorting, and the small
//! summaries behind the charts.

pub mod expenses;
pub mod streak;
pub mod tasks;

pub use expenses::{category_breakdown, filter_expenses, monthly_series, sort_newest_first, SeriesPoint};
pub use streak::StreakState;
pub use tasks::{
    add_task, clear_completed, completion_pct, delete_task, filter_tasks, relative_due, toggle_task,
    update_task, NewTask, StatusFilter, TaskFilter, TaskPatch, TaskSort,
};

//! Task list queries and mutations

use chrono::NaiveDate;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use super::streak::StreakState;
use crate::models::{Priority, Task};

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StatusFilter {
    #[default]
    All,
    Active,
    Completed,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TaskSort {
    #[default]
    Newest,
    Due,
    Priority,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskFilter {
    #[serde(default)]
    pub status: StatusFilter,
    #[serde(default)]
    pub priority: Option<Priority>,
    #[serde(default)]
    pub search: String,
    #[serde(default)]
    pub sort: TaskSort,
}

impl TaskFilter {
    fn matches(&self, task: &Task, needle: &str) -> bool {
        let status_ok = match self.status {
            StatusFilter::All => true,
            StatusFilter::Active => !task.completed,
            StatusFilter::Completed => task.completed,
        };
        let priority_ok = self.priority.map(|p| p == task.priority).unwrap_or(true);
        let search_ok = needle.is_empty()
            || task.title.to_lowercase().contains(needle)
            || task.notes.to_lowercase().contains(needle)
            || task.tags.iter().any(|t| t.to_lowercase().contains(needle));

        status_ok && priority_ok && search_ok
    }
}

/// Filter then sort a task list without mutating it.
pub fn filter_tasks<'a>(tasks: &'a [Task], filter: &TaskFilter) -> Vec<&'a Task> {
    let needle = filter.search.trim().to_lowercase();
    let mut list: Vec<&Task> = tasks.iter().filter(|t| filter.matches(t, &needle)).collect();

    match filter.sort {
        TaskSort::Newest => list.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
        TaskSort::Due => list.sort_by(|a, b| match (a.due, b.due) {
            (None, None) => b.created_at.cmp(&a.created_at),
            (None, Some(_)) => Ordering::Greater,
            (Some(_), None) => Ordering::Less,
            (Some(x), Some(y)) => x.cmp(&y),
        }),
        TaskSort::Priority => list.sort_by_key(|t| t.priority.rank()),
    }

    list
}

const ID_SUFFIX_LEN: usize = 6;

/// Form input for a new task
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTask {
    pub title: String,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub due: Option<NaiveDate>,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Partial edit; `None` leaves a field untouched. `due: Some(None)` clears it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub notes: Option<String>,
    pub priority: Option<Priority>,
    pub due: Option<Option<NaiveDate>>,
    pub tags: Option<Vec<String>>,
}

/// `{millis}_{six base-36 chars}`
fn new_task_id(now_ms: i64) -> String {
    let mut rng = rand::thread_rng();
    let suffix: String = (0..ID_SUFFIX_LEN)
        .filter_map(|_| std::char::from_digit(rng.gen_range(0..36), 36))
        .collect();
    format!("{}_{}", now_ms, suffix)
}

/// Prepend a task built from `draft`. A blank title adds nothing.
pub fn add_task(tasks: &mut Vec<Task>, draft: NewTask, now_ms: i64) -> Option<String> {
    let title = draft.title.trim();
    if title.is_empty() {
        return None;
    }

    let id = new_task_id(now_ms);
    tasks.insert(
        0,
        Task {
            id: id.clone(),
            title: title.to_string(),
            notes: draft.notes.trim().to_string(),
            priority: draft.priority,
            due: draft.due,
            tags: draft.tags,
            completed: false,
            created_at: now_ms,
            completed_at: None,
        },
    );
    Some(id)
}

pub fn update_task(tasks: &mut [Task], id: &str, patch: TaskPatch) -> bool {
    let Some(task) = tasks.iter_mut().find(|t| t.id == id) else {
        return false;
    };

    if let Some(title) = patch.title {
        task.title = title;
    }
    if let Some(notes) = patch.notes {
        task.notes = notes;
    }
    if let Some(priority) = patch.priority {
        task.priority = priority;
    }
    if let Some(due) = patch.due {
        task.due = due;
    }
    if let Some(tags) = patch.tags {
        task.tags = tags;
    }
    true
}

pub fn delete_task(tasks: &mut Vec<Task>, id: &str) -> bool {
    let before = tasks.len();
    tasks.retain(|t| t.id != id);
    tasks.len() != before
}

/// Drop every completed task; returns how many were removed.
pub fn clear_completed(tasks: &mut Vec<Task>) -> usize {
    let before = tasks.len();
    tasks.retain(|t| !t.completed);
    before - tasks.len()
}

/// Flip a task's completion. Completing stamps `completedAt` and counts
/// toward the streak; reopening clears the stamp. Returns `false` if no
/// task has that id.
pub fn toggle_task(
    tasks: &mut [Task],
    id: &str,
    now_ms: i64,
    today: NaiveDate,
    streak: &mut StreakState,
) -> bool {
    let Some(task) = tasks.iter_mut().find(|t| t.id == id) else {
        return false;
    };

    task.completed = !task.completed;
    if task.completed {
        task.completed_at = Some(now_ms);
        streak.record_completion(today);
    } else {
        task.completed_at = None;
    }
    true
}

/// Share of completed tasks, rounded to a whole percent
pub fn completion_pct(tasks: &[Task]) -> u32 {
    if tasks.is_empty() {
        return 0;
    }
    let done = tasks.iter().filter(|t| t.completed).count();
    ((done as f64 / tasks.len() as f64) * 100.0).round() as u32
}

/// Human label for a due date relative to `today`
pub fn relative_due(due: Option<NaiveDate>, today: NaiveDate) -> String {
    let Some(due) = due else {
        return "No due date".to_string();
    };
    match (due - today).num_days() {
        0 => "Due today".to_string(),
        1 => "Due tomorrow".to_string(),
        n if n < 0 => format!("{}d overdue", -n),
        n => format!("Due in {}d", n),
    }
}

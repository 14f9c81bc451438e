use super::cost::cost;
use super::enums::{Bucket, Priority};
use super::task::Task;
use chrono::{Duration, NaiveDate};

/// Secondary filters applied to every bucket. `None` means no constraint.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewFilter {
    pub priority: Option<Priority>,
    /// Exact category match. An empty string is treated as no constraint.
    pub category: Option<String>,
    /// Exact due day match
    pub date: Option<NaiveDate>,
}

impl ViewFilter {
    pub fn matches(&self, task: &Task) -> bool {
        if let Some(priority) = self.priority {
            if task.priority != priority {
                return false;
            }
        }
        if let Some(category) = self.category.as_deref().filter(|c| !c.is_empty()) {
            if task.category != category {
                return false;
            }
        }
        if let Some(date) = self.date {
            if task.due_day() != date {
                return false;
            }
        }
        true
    }
}

/// Check whether a task belongs in `bucket` relative to `today`
pub fn in_bucket(task: &Task, bucket: Bucket, today: NaiveDate) -> bool {
    let due = task.due_day();
    match bucket {
        Bucket::Today => !task.completed && due == today,
        Bucket::Tomorrow => !task.completed && Some(due) == today.succ_opt(),
        Bucket::Overdue => !task.completed && due < today,
        Bucket::Completed => task.completed,
    }
}

/// Tasks of one bucket, in list order, after the secondary filter
pub fn bucket_tasks(tasks: &[Task], bucket: Bucket, filter: &ViewFilter, today: NaiveDate) -> Vec<Task> {
    tasks
        .iter()
        .filter(|task| in_bucket(task, bucket, today) && filter.matches(task))
        .cloned()
        .collect()
}

/// All four buckets derived from one snapshot of the list
#[derive(Debug, Clone, Default)]
pub struct Buckets {
    pub today: Vec<Task>,
    pub tomorrow: Vec<Task>,
    pub overdue: Vec<Task>,
    pub completed: Vec<Task>,
}

impl Buckets {
    /// Recompute every bucket. Nothing is cached between calls.
    pub fn compute(tasks: &[Task], filter: &ViewFilter, today: NaiveDate) -> Self {
        Self {
            today: bucket_tasks(tasks, Bucket::Today, filter, today),
            tomorrow: bucket_tasks(tasks, Bucket::Tomorrow, filter, today),
            overdue: bucket_tasks(tasks, Bucket::Overdue, filter, today),
            completed: bucket_tasks(tasks, Bucket::Completed, filter, today),
        }
    }

    pub fn get(&self, bucket: Bucket) -> &[Task] {
        match bucket {
            Bucket::Today => &self.today,
            Bucket::Tomorrow => &self.tomorrow,
            Bucket::Overdue => &self.overdue,
            Bucket::Completed => &self.completed,
        }
    }
}

/// Totals over a set of tasks
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Totals {
    pub time_spent: Duration,
    pub planned: Duration,
    pub cost: f64,
}

/// Sum time spent, planned duration and cost
pub fn compute_totals(tasks: &[Task], hourly_rate: f64) -> Totals {
    let mut time_spent = 0u64;
    let mut planned = 0u64;

    for task in tasks {
        time_spent += task.time_spent;
        planned += task.planned_seconds();
    }

    Totals {
        time_spent: Duration::seconds(time_spent as i64),
        planned: Duration::seconds(planned as i64),
        cost: cost(time_spent, hourly_rate),
    }
}

/// Timer badge for list output
pub fn timer_badge(task: &Task) -> &'static str {
    if task.completed {
        "✓"
    } else if task.timer_running {
        "⏱"
    } else {
        " "
    }
}

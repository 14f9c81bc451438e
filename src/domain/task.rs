use super::enums::{Priority, TimerState};
use crate::error::TaskError;
use chrono::{DateTime, Local, NaiveDate, TimeZone};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A timed task
///
/// Serialized with camelCase field names and RFC 3339 dates so the persisted
/// list stays readable by older exports of the same data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Unique ID, assigned at creation and never changed
    pub id: Uuid,
    /// Display name
    pub name: String,
    /// When the task is due
    pub due_date: DateTime<Local>,
    pub priority: Priority,
    /// Free-text category, may be empty
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub completed: bool,
    /// Accumulated timer seconds
    #[serde(default)]
    pub time_spent: u64,
    /// Planned length in minutes
    #[serde(default)]
    pub duration: u32,
    #[serde(default)]
    pub timer_running: bool,
}

impl Task {
    pub fn timer_state(&self) -> TimerState {
        TimerState::from_running(self.timer_running)
    }

    /// Calendar day the task is due on
    pub fn due_day(&self) -> NaiveDate {
        self.due_date.date_naive()
    }

    /// Planned duration in seconds
    pub fn planned_seconds(&self) -> u64 {
        u64::from(self.duration) * 60
    }

    /// Seconds at which the half-duration alarm fires
    pub fn half_threshold(&self) -> u64 {
        u64::from(self.duration) * 30
    }

    /// Seconds at which the full-duration alarm fires
    pub fn full_threshold(&self) -> u64 {
        self.planned_seconds()
    }
}

/// Request to create a task. `name` and `priority` are required.
#[derive(Debug, Clone, Default)]
pub struct NewTask {
    pub name: Option<String>,
    pub priority: Option<Priority>,
    pub due_date: Option<DateTime<Local>>,
    pub category: Option<String>,
    pub duration: Option<u32>,
}

impl NewTask {
    pub fn new(name: impl Into<String>, priority: Priority) -> Self {
        Self {
            name: Some(name.into()),
            priority: Some(priority),
            ..Self::default()
        }
    }

    pub fn due(mut self, due_date: DateTime<Local>) -> Self {
        self.due_date = Some(due_date);
        self
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn duration(mut self, minutes: u32) -> Self {
        self.duration = Some(minutes);
        self
    }

    /// Validate and build the task, defaulting the due date to `now`
    pub fn build(self, now: DateTime<Local>) -> Result<Task, TaskError> {
        let name = match self.name {
            Some(name) if !name.is_empty() => name,
            _ => return Err(TaskError::Validation("task name is required".to_string())),
        };
        let priority = self
            .priority
            .ok_or_else(|| TaskError::Validation("task priority is required".to_string()))?;

        Ok(Task {
            id: Uuid::new_v4(),
            name,
            due_date: self.due_date.unwrap_or(now),
            priority,
            category: self.category.unwrap_or_default(),
            completed: false,
            time_spent: 0,
            duration: self.duration.unwrap_or(0),
            timer_running: false,
        })
    }
}

/// Partial edit of a task's user-editable fields
#[derive(Debug, Clone, Default)]
pub struct TaskUpdate {
    pub name: Option<String>,
    pub priority: Option<Priority>,
    pub due_date: Option<DateTime<Local>>,
    pub category: Option<String>,
    pub duration: Option<u32>,
}

impl TaskUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.priority.is_none()
            && self.due_date.is_none()
            && self.category.is_none()
            && self.duration.is_none()
    }

    /// Apply the set fields onto `task`
    pub fn apply(&self, task: &mut Task) {
        if let Some(name) = &self.name {
            task.name = name.clone();
        }
        if let Some(priority) = self.priority {
            task.priority = priority;
        }
        if let Some(due_date) = self.due_date {
            task.due_date = due_date;
        }
        if let Some(category) = &self.category {
            task.category = category.clone();
        }
        if let Some(duration) = self.duration {
            task.duration = duration;
        }
    }
}

/// Local midnight at the start of `date`
pub fn start_of_day(date: NaiveDate) -> DateTime<Local> {
    let midnight = date.and_time(chrono::NaiveTime::MIN);
    Local
        .from_local_datetime(&midnight)
        .earliest()
        .unwrap_or_else(|| Local.from_utc_datetime(&midnight))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_new_task_defaults() {
        let now = Local::now();
        let task = NewTask::new("Write report", Priority::High).build(now).unwrap();
        assert_eq!(task.name, "Write report");
        assert_eq!(task.priority, Priority::High);
        assert_eq!(task.due_date, now);
        assert_eq!(task.category, "");
        assert_eq!(task.duration, 0);
        assert_eq!(task.time_spent, 0);
        assert!(!task.completed);
        assert!(!task.timer_running);
    }

    #[test]
    fn test_new_task_requires_name() {
        let request = NewTask {
            priority: Some(Priority::Low),
            ..NewTask::default()
        };
        assert!(matches!(request.build(Local::now()), Err(TaskError::Validation(_))));

        let empty = NewTask::new("", Priority::Low);
        assert!(matches!(empty.build(Local::now()), Err(TaskError::Validation(_))));
    }

    #[test]
    fn test_new_task_whitespace_name_is_kept() {
        let task = NewTask::new("   ", Priority::Low).build(Local::now()).unwrap();
        assert_eq!(task.name, "   ");
    }

    #[test]
    fn test_new_task_requires_priority() {
        let request = NewTask {
            name: Some("No priority".to_string()),
            ..NewTask::default()
        };
        assert!(matches!(request.build(Local::now()), Err(TaskError::Validation(_))));
    }

    #[test]
    fn test_new_task_ids_are_unique() {
        let now = Local::now();
        let a = NewTask::new("A", Priority::Low).build(now).unwrap();
        let b = NewTask::new("B", Priority::Low).build(now).unwrap();
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_thresholds() {
        let task = NewTask::new("T", Priority::Medium)
            .duration(10)
            .build(Local::now())
            .unwrap();
        assert_eq!(task.half_threshold(), 300);
        assert_eq!(task.full_threshold(), 600);
        assert_eq!(task.planned_seconds(), 600);
    }

    #[test]
    fn test_task_update_apply() {
        let now = Local::now();
        let mut task = NewTask::new("Old", Priority::Low).build(now).unwrap();
        let update = TaskUpdate {
            name: Some("New".to_string()),
            category: Some("work".to_string()),
            due_date: Some(now + Duration::days(2)),
            ..TaskUpdate::default()
        };
        assert!(!update.is_empty());
        update.apply(&mut task);
        assert_eq!(task.name, "New");
        assert_eq!(task.category, "work");
        assert_eq!(task.priority, Priority::Low);
        assert_eq!(task.due_day(), (now + Duration::days(2)).date_naive());
    }

    #[test]
    fn test_task_json_uses_camel_case() {
        let task = NewTask::new("Json", Priority::High)
            .duration(5)
            .build(Local::now())
            .unwrap();
        let json = serde_json::to_string(&task).unwrap();
        assert!(json.contains("\"dueDate\""));
        assert!(json.contains("\"timeSpent\":0"));
        assert!(json.contains("\"timerRunning\":false"));
        let back: Task = serde_json::from_str(&json).unwrap();
        assert_eq!(back, task);
    }

    #[test]
    fn test_start_of_day() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        let start = start_of_day(date);
        assert_eq!(start.date_naive(), date);
    }
}

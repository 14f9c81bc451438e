use crate::domain::{NewTask, Task, TaskUpdate};
use crate::error::TaskError;
use crate::persistence::{Storage, HOURLY_RATE_KEY, TASKS_KEY};
use chrono::{DateTime, Local};
use std::rc::Rc;
use tracing::{debug, warn};
use uuid::Uuid;

/// Ordered task list and hourly rate, persisted on every change
///
/// The list is never edited in place: each mutation builds a new list and
/// swaps it in, so a snapshot taken with [`TaskStore::get`] stays consistent
/// while the store moves on.
pub struct TaskStore {
    tasks: Rc<Vec<Task>>,
    hourly_rate: f64,
    storage: Box<dyn Storage>,
}

impl TaskStore {
    /// Empty store backed by `storage`. Nothing is read.
    pub fn new(storage: Box<dyn Storage>) -> Self {
        Self {
            tasks: Rc::new(Vec::new()),
            hourly_rate: 0.0,
            storage,
        }
    }

    /// Load the task list and hourly rate from `storage`
    ///
    /// Unreadable data is logged and treated as absent.
    pub fn load(storage: Box<dyn Storage>) -> Self {
        let tasks = match storage.load(TASKS_KEY) {
            Ok(Some(json)) => match serde_json::from_str::<Vec<Task>>(&json) {
                Ok(tasks) => tasks,
                Err(e) => {
                    warn!(error = %e, "Stored task list is not valid JSON, starting empty");
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!(error = %e, "Failed to load task list, starting empty");
                Vec::new()
            }
        };

        let hourly_rate = match storage.load(HOURLY_RATE_KEY) {
            Ok(Some(raw)) => raw.trim().parse::<f64>().unwrap_or_else(|_| {
                warn!(value = %raw, "Stored hourly rate is not a number, using 0");
                0.0
            }),
            Ok(None) => 0.0,
            Err(e) => {
                warn!(error = %e, "Failed to load hourly rate, using 0");
                0.0
            }
        };

        Self {
            tasks: Rc::new(single_running(tasks)),
            hourly_rate,
            storage,
        }
    }

    /// Read-only snapshot of the ordered list
    pub fn get(&self) -> Rc<Vec<Task>> {
        Rc::clone(&self.tasks)
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn find(&self, id: Uuid) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    /// Resolve a full ID or a unique ID prefix
    pub fn resolve(&self, id_or_prefix: &str) -> Option<Uuid> {
        let needle = id_or_prefix.trim().to_lowercase();
        if needle.is_empty() {
            return None;
        }
        let mut matches = self
            .tasks
            .iter()
            .filter(|t| t.id.to_string().starts_with(&needle));
        let first = matches.next()?;
        if matches.next().is_some() {
            return None;
        }
        Some(first.id)
    }

    /// ID of the task whose timer is running, derived from the task flags
    pub fn active_id(&self) -> Option<Uuid> {
        self.tasks.iter().find(|t| t.timer_running).map(|t| t.id)
    }

    pub fn hourly_rate(&self) -> f64 {
        self.hourly_rate
    }

    pub fn set_hourly_rate(&mut self, rate: f64) {
        if rate.to_bits() == self.hourly_rate.to_bits() {
            return;
        }
        self.hourly_rate = rate;
        if let Err(e) = self.storage.save(HOURLY_RATE_KEY, &rate.to_string()) {
            warn!(error = %e, "Failed to save hourly rate");
        }
    }

    /// Validate and append a new task
    pub fn create(&mut self, request: NewTask) -> Result<Task, TaskError> {
        self.create_at(request, Local::now())
    }

    /// Same as [`TaskStore::create`] with an explicit "now" for the default due date
    pub fn create_at(&mut self, request: NewTask, now: DateTime<Local>) -> Result<Task, TaskError> {
        let task = request.build(now).map_err(|e| {
            debug!(error = %e, "Rejected new task");
            e
        })?;

        let mut next = self.snapshot();
        next.push(task.clone());
        self.commit(next);
        debug!(id = %task.id, name = %task.name, "Created task");
        Ok(task)
    }

    /// Remove a task. Unknown IDs are ignored.
    pub fn delete(&mut self, id: Uuid) -> bool {
        let Some(index) = self.position(id) else {
            return false;
        };
        let mut next = self.snapshot();
        next.remove(index);
        self.commit(next);
        true
    }

    /// Flip the completed flag
    pub fn toggle_completion(&mut self, id: Uuid) -> bool {
        self.modify(id, |task| task.completed = !task.completed)
    }

    /// Apply a field edit
    pub fn update(&mut self, id: Uuid, update: &TaskUpdate) -> bool {
        if update.is_empty() {
            return false;
        }
        self.modify(id, |task| update.apply(task))
    }

    /// Move the task at `from` to `to`, keeping the others in order
    ///
    /// `None` for `to` is a cancelled drag and does nothing, as does either
    /// index being out of bounds.
    pub fn reorder(&mut self, from: usize, to: Option<usize>) -> bool {
        let Some(to) = to else {
            return false;
        };
        let len = self.tasks.len();
        if from >= len || to >= len || from == to {
            return false;
        }
        let mut next = self.snapshot();
        let task = next.remove(from);
        next.insert(to, task);
        self.commit(next);
        true
    }

    /// Replace the whole list
    pub fn replace_all(&mut self, tasks: Vec<Task>) {
        self.commit(single_running(tasks));
    }

    /// Append tasks to the end of the list (CSV import)
    pub fn append(&mut self, tasks: Vec<Task>) {
        if tasks.is_empty() {
            return;
        }
        let mut next = self.snapshot();
        next.extend(tasks);
        self.replace_all(next);
    }

    /// Start `id`'s timer and stop every other one
    pub(crate) fn start_exclusive(&mut self, id: Uuid) -> bool {
        if self.position(id).is_none() {
            return self.not_found(id);
        }
        let next = self
            .tasks
            .iter()
            .map(|task| Task {
                timer_running: task.id == id,
                ..task.clone()
            })
            .collect();
        self.commit(next);
        true
    }

    /// Stop `id`'s timer, leaving all others alone
    pub(crate) fn stop_timer(&mut self, id: Uuid) -> bool {
        self.modify(id, |task| task.timer_running = false)
    }

    /// Add one second to the running task. Returns the updated task.
    pub(crate) fn accrue_second(&mut self) -> Option<Task> {
        let index = self.tasks.iter().position(|t| t.timer_running)?;
        let mut next = self.snapshot();
        next[index].time_spent += 1;
        let updated = next[index].clone();
        self.commit(next);
        Some(updated)
    }

    fn position(&self, id: Uuid) -> Option<usize> {
        self.tasks.iter().position(|t| t.id == id)
    }

    fn snapshot(&self) -> Vec<Task> {
        self.tasks.as_ref().clone()
    }

    fn not_found(&self, id: Uuid) -> bool {
        debug!("{}", TaskError::NotFound(id));
        false
    }

    fn modify<F: FnOnce(&mut Task)>(&mut self, id: Uuid, change: F) -> bool {
        let Some(index) = self.position(id) else {
            return self.not_found(id);
        };
        let mut next = self.snapshot();
        change(&mut next[index]);
        self.commit(next);
        true
    }

    fn commit(&mut self, next: Vec<Task>) {
        self.tasks = Rc::new(next);
        self.persist();
    }

    fn persist(&self) {
        let json = match serde_json::to_string(self.tasks.as_ref()) {
            Ok(json) => json,
            Err(e) => {
                warn!(error = %e, "Failed to serialize task list");
                return;
            }
        };
        if let Err(e) = self.storage.save(TASKS_KEY, &json) {
            warn!(error = %e, "Failed to save task list");
        }
    }
}

/// Keep only the first running timer
fn single_running(mut tasks: Vec<Task>) -> Vec<Task> {
    let mut seen_running = false;
    for task in &mut tasks {
        if task.timer_running {
            if seen_running {
                warn!(id = %task.id, "More than one running timer, stopping extra");
                task.timer_running = false;
            }
            seen_running = true;
        }
    }
    tasks
}

pub mod cost;
pub mod enums;
pub mod task;
pub mod views;

pub use cost::{format_cost, format_hms};
pub use enums::{Bucket, Priority, TimerState};
pub use task::{start_of_day, NewTask, Task, TaskUpdate};
pub use views::{compute_totals, timer_badge, Buckets, ViewFilter};

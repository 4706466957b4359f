pub mod task;

pub use task::{Assignee, NewTask, ScheduledAt, Task, TaskId, TaskStatus, tasks_scheduled_on};

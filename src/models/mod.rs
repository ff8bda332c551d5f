mod task;

pub use task::{Task, TASK_COLLECTION};

use crate::domain::errors::DomainResult;
use crate::domain::models::{Task, TaskFilter, TaskId};

/// Storage port for task records.
///
/// Calls are synchronous because they run inside event dispatch. Lists come
/// back in insertion order.
pub trait TaskRepository: Send + Sync {
    /// Store a new task
    fn insert(&self, task: Task);

    /// Get a task by ID
    fn get(&self, id: TaskId) -> Option<Task>;

    /// Apply `change` to a stored task and return the updated copy.
    ///
    /// Returns `Ok(None)` for an unknown id. If `change` fails the stored
    /// task is left untouched.
    fn update(
        &self,
        id: TaskId,
        change: &mut dyn FnMut(&mut Task) -> DomainResult<()>,
    ) -> DomainResult<Option<Task>>;

    /// List tasks matching a filter
    fn list(&self, filter: &TaskFilter) -> Vec<Task>;

    /// Count tasks matching a filter
    fn count(&self, filter: &TaskFilter) -> usize;
}

//! In-memory task repository.
//!
//! Tasks live only as long as the process. A `Vec` keeps insertion order,
//! which the task store relies on for stable tie-breaking.

use std::sync::{PoisonError, RwLock};

use crate::domain::errors::DomainResult;
use crate::domain::models::{Task, TaskFilter, TaskId};
use crate::domain::ports::TaskRepository;

#[derive(Debug, Default)]
pub struct InMemoryTaskRepository {
    tasks: RwLock<Vec<Task>>,
}

impl InMemoryTaskRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.tasks.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl TaskRepository for InMemoryTaskRepository {
    fn insert(&self, task: Task) {
        self.tasks
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(task);
    }

    fn get(&self, id: TaskId) -> Option<Task> {
        self.tasks
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .find(|t| t.id == id)
            .cloned()
    }

    fn update(
        &self,
        id: TaskId,
        change: &mut dyn FnMut(&mut Task) -> DomainResult<()>,
    ) -> DomainResult<Option<Task>> {
        let mut tasks = self.tasks.write().unwrap_or_else(PoisonError::into_inner);
        let Some(slot) = tasks.iter_mut().find(|t| t.id == id) else {
            return Ok(None);
        };

        // Work on a copy so a failed change leaves the stored task intact
        let mut updated = slot.clone();
        change(&mut updated)?;
        *slot = updated.clone();
        Ok(Some(updated))
    }

    fn list(&self, filter: &TaskFilter) -> Vec<Task> {
        self.tasks
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|t| filter.matches(t))
            .cloned()
            .collect()
    }

    fn count(&self, filter: &TaskFilter) -> usize {
        self.tasks
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|t| filter.matches(t))
            .count()
    }
}

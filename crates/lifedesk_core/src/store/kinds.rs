//! Kind-specific store views and gateway extras.
//!
//! Groupings are pure reads over the cached collection; extras forward to
//! the per-kind gateway traits and fold results back into the cache.

use super::{EntityStore, StoreResult};
use crate::gateway::{GoalGateway, LifeAreaGateway, NoteGateway, ProjectGateway, TaskGateway};
use crate::model::{
    EntityId, Goal, LifeArea, Note, NoteAttachment, Project, ProjectStatus, Task, TaskPriority,
};

impl<G> EntityStore<Goal, G> {
    /// Goals grouped by life area, first-seen order.
    pub fn by_life_area(&self) -> Vec<(EntityId, Vec<&Goal>)> {
        self.by_parent()
    }

    /// Active goals with `completed_at` set.
    pub fn completed(&self) -> Vec<&Goal> {
        self.active()
            .into_iter()
            .filter(|goal| goal.completed_at.is_some())
            .collect()
    }
}

impl<G: GoalGateway> EntityStore<Goal, G> {
    pub async fn complete(&mut self, id: EntityId) -> StoreResult<Goal> {
        let outcome = self.gateway.complete(id).await;
        match outcome {
            Ok(goal) => {
                self.replace_in_place(goal.clone());
                self.last_error = None;
                Ok(goal)
            }
            Err(cause) => Err(self.record_error("Failed to complete goal".to_string(), cause)),
        }
    }

    pub async fn uncomplete(&mut self, id: EntityId) -> StoreResult<Goal> {
        let outcome = self.gateway.uncomplete(id).await;
        match outcome {
            Ok(goal) => {
                self.replace_in_place(goal.clone());
                self.last_error = None;
                Ok(goal)
            }
            Err(cause) => Err(self.record_error("Failed to uncomplete goal".to_string(), cause)),
        }
    }
}

impl<G> EntityStore<Project, G> {
    /// Projects grouped by goal, first-seen order.
    pub fn by_goal(&self) -> Vec<(EntityId, Vec<&Project>)> {
        self.by_parent()
    }

    /// Projects grouped by workflow status, first-seen order.
    pub fn by_status(&self) -> Vec<(ProjectStatus, Vec<&Project>)> {
        let mut groups: Vec<(ProjectStatus, Vec<&Project>)> = Vec::new();
        for project in self.items() {
            match groups.iter_mut().find(|(key, _)| *key == project.status) {
                Some((_, members)) => members.push(project),
                None => groups.push((project.status, vec![project])),
            }
        }
        groups
    }
}

impl<G: ProjectGateway> EntityStore<Project, G> {
    pub async fn update_status(
        &mut self,
        id: EntityId,
        status: ProjectStatus,
    ) -> StoreResult<Project> {
        let outcome = self.gateway.update_status(id, status).await;
        match outcome {
            Ok(project) => {
                self.replace_in_place(project.clone());
                self.last_error = None;
                Ok(project)
            }
            Err(cause) => {
                Err(self.record_error("Failed to update project status".to_string(), cause))
            }
        }
    }
}

impl<G> EntityStore<Task, G> {
    /// Tasks grouped by priority, first-seen order.
    pub fn by_priority(&self) -> Vec<(TaskPriority, Vec<&Task>)> {
        let mut groups: Vec<(TaskPriority, Vec<&Task>)> = Vec::new();
        for task in self.items() {
            match groups.iter_mut().find(|(key, _)| *key == task.priority) {
                Some((_, members)) => members.push(task),
                None => groups.push((task.priority, vec![task])),
            }
        }
        groups
    }

    /// Direct subtasks of one task, collection order.
    pub fn subtasks_of(&self, parent_task_id: EntityId) -> Vec<&Task> {
        self.items()
            .iter()
            .filter(|task| task.parent_task_id == Some(parent_task_id))
            .collect()
    }
}

impl<G: TaskGateway> EntityStore<Task, G> {
    pub async fn complete(&mut self, id: EntityId) -> StoreResult<Task> {
        let outcome = self.gateway.complete(id).await;
        match outcome {
            Ok(task) => {
                self.replace_in_place(task.clone());
                self.last_error = None;
                Ok(task)
            }
            Err(cause) => Err(self.record_error("Failed to complete task".to_string(), cause)),
        }
    }

    pub async fn uncomplete(&mut self, id: EntityId) -> StoreResult<Task> {
        let outcome = self.gateway.uncomplete(id).await;
        match outcome {
            Ok(task) => {
                self.replace_in_place(task.clone());
                self.last_error = None;
                Ok(task)
            }
            Err(cause) => Err(self.record_error("Failed to uncomplete task".to_string(), cause)),
        }
    }
}

impl<G> EntityStore<Note, G> {
    /// Notes grouped by attachment target, first-seen order; free-floating
    /// notes are not grouped.
    pub fn by_attachment(&self) -> Vec<(EntityId, Vec<&Note>)> {
        self.by_parent()
    }

    /// Free-floating notes.
    pub fn unattached(&self) -> Vec<&Note> {
        self.items()
            .iter()
            .filter(|note| note.attachment().is_none())
            .collect()
    }

    /// Notes attached to a given target, collection order.
    pub fn attached_to(&self, attachment: NoteAttachment) -> Vec<&Note> {
        self.items()
            .iter()
            .filter(|note| note.attachment() == Some(attachment))
            .collect()
    }
}

impl<G: NoteGateway> EntityStore<Note, G> {
    /// Narrows the collection to active notes matching the query, with the
    /// same loading/error contract as a fetch.
    pub async fn search(&mut self, query: &str) -> StoreResult<()> {
        self.loading = true;
        let outcome = self.gateway.search(query).await;
        self.loading = false;
        match outcome {
            Ok(notes) => {
                self.items = notes;
                self.last_error = None;
                Ok(())
            }
            Err(cause) => Err(self.record_error("Failed to search notes".to_string(), cause)),
        }
    }
}

impl<G: LifeAreaGateway> EntityStore<LifeArea, G> {
    /// Persists a manual ordering, then re-fetches to pick up the new
    /// `sort_order` values.
    pub async fn reorder(&mut self, ids: &[EntityId]) -> StoreResult<()> {
        let outcome = self.gateway.reorder(ids).await;
        if let Err(cause) = outcome {
            return Err(self.record_error("Failed to reorder life areas".to_string(), cause));
        }
        self.fetch_all().await
    }
}

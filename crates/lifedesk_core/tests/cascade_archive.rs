use lifedesk_core::{
    CreateGoal, CreateLifeArea, CreateNote, CreateProject, CreateTask, Entity, EntityGateway,
    EntityId, EntityKind, GatewayError, Goal, LifeArea, Note, NoteAttachment, Project,
    ProjectGateway, ProjectStatus, SqliteGateway, Task, TaskGateway, TaskPriority, Timestamp,
};
use std::collections::HashSet;
use uuid::Uuid;

fn gateway() -> SqliteGateway {
    SqliteGateway::open_in_memory().unwrap()
}

async fn create_area(gw: &SqliteGateway, name: &str) -> LifeArea {
    EntityGateway::<LifeArea>::create(
        gw,
        CreateLifeArea {
            name: name.to_string(),
            description: None,
            color: None,
            icon: None,
        },
    )
    .await
    .unwrap()
}

async fn create_goal(gw: &SqliteGateway, area_id: EntityId, name: &str) -> Goal {
    EntityGateway::<Goal>::create(
        gw,
        CreateGoal {
            life_area_id: area_id,
            name: name.to_string(),
            description: None,
            target_date: None,
        },
    )
    .await
    .unwrap()
}

async fn create_project(gw: &SqliteGateway, goal_id: EntityId, name: &str) -> Project {
    EntityGateway::<Project>::create(
        gw,
        CreateProject {
            goal_id,
            name: name.to_string(),
            description: None,
            status: ProjectStatus::NotStarted,
            start_date: None,
            due_date: None,
        },
    )
    .await
    .unwrap()
}

async fn create_task(gw: &SqliteGateway, project_id: Option<EntityId>, name: &str) -> Task {
    EntityGateway::<Task>::create(
        gw,
        CreateTask {
            project_id,
            parent_task_id: None,
            name: name.to_string(),
            description: None,
            priority: TaskPriority::Medium,
            due_date: None,
        },
    )
    .await
    .unwrap()
}

async fn create_subtask(gw: &SqliteGateway, parent_task_id: EntityId, name: &str) -> Task {
    EntityGateway::<Task>::create(
        gw,
        CreateTask {
            project_id: None,
            parent_task_id: Some(parent_task_id),
            name: name.to_string(),
            description: None,
            priority: TaskPriority::Medium,
            due_date: None,
        },
    )
    .await
    .unwrap()
}

async fn archived_at_of<E>(gw: &SqliteGateway, id: EntityId) -> Option<Timestamp>
where
    E: Entity,
    SqliteGateway: EntityGateway<E>,
{
    EntityGateway::<E>::get_all(gw)
        .await
        .unwrap()
        .into_iter()
        .find(|entity| entity.id() == id)
        .unwrap()
        .archived_at()
}

fn change_set(receipt: &lifedesk_core::CascadeReceipt) -> HashSet<(EntityKind, EntityId)> {
    receipt
        .changes
        .iter()
        .map(|change| (change.kind, change.id))
        .collect()
}

#[tokio::test]
async fn archiving_a_project_archives_its_tasks_only() {
    let gw = gateway();
    let area = create_area(&gw, "Work").await;
    let goal = create_goal(&gw, area.id, "Ship v1").await;
    let target = create_project(&gw, goal.id, "Launch").await;
    let other = create_project(&gw, goal.id, "Docs").await;
    let task_a = create_task(&gw, Some(target.id), "Design").await;
    let task_b = create_task(&gw, Some(target.id), "Build").await;
    let unrelated = create_task(&gw, Some(other.id), "Outline").await;

    let receipt = EntityGateway::<Project>::archive(&gw, target.id)
        .await
        .unwrap();

    assert!(archived_at_of::<Project>(&gw, target.id).await.is_some());
    assert!(archived_at_of::<Task>(&gw, task_a.id).await.is_some());
    assert!(archived_at_of::<Task>(&gw, task_b.id).await.is_some());
    assert!(archived_at_of::<Task>(&gw, unrelated.id).await.is_none());
    assert!(archived_at_of::<Project>(&gw, other.id).await.is_none());
    assert!(archived_at_of::<Goal>(&gw, goal.id).await.is_none());

    let expected: HashSet<_> = [
        (EntityKind::Project, target.id),
        (EntityKind::Task, task_a.id),
        (EntityKind::Task, task_b.id),
    ]
    .into_iter()
    .collect();
    assert_eq!(change_set(&receipt), expected);
}

#[tokio::test]
async fn archiving_a_task_archives_direct_subtasks_but_not_grandchildren() {
    let gw = gateway();
    let root = create_task(&gw, None, "Plan trip").await;
    let child = create_subtask(&gw, root.id, "Book flights").await;
    let grandchild = create_subtask(&gw, child.id, "Compare airlines").await;

    EntityGateway::<Task>::archive(&gw, root.id).await.unwrap();

    assert!(archived_at_of::<Task>(&gw, root.id).await.is_some());
    assert!(archived_at_of::<Task>(&gw, child.id).await.is_some());
    assert!(archived_at_of::<Task>(&gw, grandchild.id).await.is_none());
}

#[tokio::test]
async fn archiving_a_goal_reaches_projects_and_their_tasks() {
    let gw = gateway();
    let area = create_area(&gw, "Work").await;
    let goal = create_goal(&gw, area.id, "Ship v1").await;
    let project = create_project(&gw, goal.id, "Launch").await;
    let task = create_task(&gw, Some(project.id), "Design").await;

    let receipt = EntityGateway::<Goal>::archive(&gw, goal.id).await.unwrap();

    assert!(archived_at_of::<Goal>(&gw, goal.id).await.is_some());
    assert!(archived_at_of::<Project>(&gw, project.id).await.is_some());
    assert!(archived_at_of::<Task>(&gw, task.id).await.is_some());
    assert!(archived_at_of::<LifeArea>(&gw, area.id).await.is_none());

    assert_eq!(
        receipt.affected_kinds(),
        vec![EntityKind::Goal, EntityKind::Project, EntityKind::Task]
    );
}

#[tokio::test]
async fn life_area_archive_covers_the_closure_but_never_notes() {
    let gw = gateway();
    let area = create_area(&gw, "Work").await;
    let goal = create_goal(&gw, area.id, "Ship v1").await;
    let project = create_project(&gw, goal.id, "Launch").await;
    let task = create_task(&gw, Some(project.id), "Design").await;
    let area_note = EntityGateway::<Note>::create(
        &gw,
        CreateNote {
            attachment: Some(NoteAttachment::LifeArea(area.id)),
            title: "Area note".to_string(),
            content: String::new(),
        },
    )
    .await
    .unwrap();
    let task_note = EntityGateway::<Note>::create(
        &gw,
        CreateNote {
            attachment: Some(NoteAttachment::Task(task.id)),
            title: "Task note".to_string(),
            content: String::new(),
        },
    )
    .await
    .unwrap();

    let receipt = EntityGateway::<LifeArea>::archive(&gw, area.id)
        .await
        .unwrap();

    assert!(archived_at_of::<LifeArea>(&gw, area.id).await.is_some());
    assert!(archived_at_of::<Goal>(&gw, goal.id).await.is_some());
    assert!(archived_at_of::<Project>(&gw, project.id).await.is_some());
    assert!(archived_at_of::<Task>(&gw, task.id).await.is_some());
    assert!(archived_at_of::<Note>(&gw, area_note.id).await.is_none());
    assert!(archived_at_of::<Note>(&gw, task_note.id).await.is_none());
    assert!(!receipt.affected_kinds().contains(&EntityKind::Note));
}

#[tokio::test]
async fn archive_twice_is_idempotent() {
    let gw = gateway();
    let area = create_area(&gw, "Work").await;
    let goal = create_goal(&gw, area.id, "Ship v1").await;
    let project = create_project(&gw, goal.id, "Launch").await;

    let first = EntityGateway::<Goal>::archive(&gw, goal.id).await.unwrap();
    let second = EntityGateway::<Goal>::archive(&gw, goal.id).await.unwrap();

    assert_eq!(change_set(&first), change_set(&second));
    assert!(archived_at_of::<Goal>(&gw, goal.id).await.is_some());
    assert!(archived_at_of::<Project>(&gw, project.id).await.is_some());
}

#[tokio::test]
async fn previously_archived_descendant_stays_archived_under_ancestor_cascade() {
    let gw = gateway();
    let area = create_area(&gw, "Work").await;
    let goal = create_goal(&gw, area.id, "Ship v1").await;
    let project = create_project(&gw, goal.id, "Launch").await;

    EntityGateway::<Project>::archive(&gw, project.id)
        .await
        .unwrap();
    let receipt = EntityGateway::<Goal>::archive(&gw, goal.id).await.unwrap();

    // Independently-archived descendants are treated like their siblings.
    assert!(receipt.contains(EntityKind::Project, project.id));
    assert!(archived_at_of::<Project>(&gw, project.id).await.is_some());
}

#[tokio::test]
async fn archive_preserves_completion_status_and_priority() {
    let gw = gateway();
    let area = create_area(&gw, "Work").await;
    let goal = create_goal(&gw, area.id, "Ship v1").await;
    let project = create_project(&gw, goal.id, "Launch").await;
    let task = EntityGateway::<Task>::create(
        &gw,
        CreateTask {
            project_id: Some(project.id),
            parent_task_id: None,
            name: "Design".to_string(),
            description: None,
            priority: TaskPriority::Critical,
            due_date: None,
        },
    )
    .await
    .unwrap();

    gw.update_status(project.id, ProjectStatus::InProgress)
        .await
        .unwrap();
    let completed = TaskGateway::complete(&gw, task.id).await.unwrap();
    assert!(completed.completed_at.is_some());

    EntityGateway::<Goal>::archive(&gw, goal.id).await.unwrap();

    let archived_project = EntityGateway::<Project>::get_all(&gw)
        .await
        .unwrap()
        .into_iter()
        .find(|candidate| candidate.id == project.id)
        .unwrap();
    let archived_task = EntityGateway::<Task>::get_all(&gw)
        .await
        .unwrap()
        .into_iter()
        .find(|candidate| candidate.id == task.id)
        .unwrap();

    assert_eq!(archived_project.status, ProjectStatus::InProgress);
    assert_eq!(archived_task.priority, TaskPriority::Critical);
    assert_eq!(archived_task.completed_at, completed.completed_at);
}

#[tokio::test]
async fn archiving_a_missing_id_is_not_found_and_changes_nothing() {
    let gw = gateway();
    let area = create_area(&gw, "Work").await;
    let goal = create_goal(&gw, area.id, "Ship v1").await;
    let missing = Uuid::new_v4();

    let err = EntityGateway::<Goal>::archive(&gw, missing)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        GatewayError::NotFound { kind, id } if kind == EntityKind::Goal && id == missing
    ));

    assert!(archived_at_of::<LifeArea>(&gw, area.id).await.is_none());
    assert!(archived_at_of::<Goal>(&gw, goal.id).await.is_none());
}

#[tokio::test]
async fn receipt_lists_the_target_first_with_new_values() {
    let gw = gateway();
    let area = create_area(&gw, "Work").await;
    let goal = create_goal(&gw, area.id, "Ship v1").await;
    create_project(&gw, goal.id, "Launch").await;

    let receipt = EntityGateway::<Goal>::archive(&gw, goal.id).await.unwrap();

    assert_eq!(receipt.changes[0].kind, EntityKind::Goal);
    assert_eq!(receipt.changes[0].id, goal.id);
    assert!(receipt
        .changes
        .iter()
        .all(|change| change.archived_at.is_some()));
}

#[tokio::test]
async fn projectless_tasks_are_untouched_by_project_cascades() {
    let gw = gateway();
    let area = create_area(&gw, "Work").await;
    let goal = create_goal(&gw, area.id, "Ship v1").await;
    let project = create_project(&gw, goal.id, "Launch").await;
    let floating = create_task(&gw, None, "Inbox item").await;

    EntityGateway::<LifeArea>::archive(&gw, area.id)
        .await
        .unwrap();

    assert!(archived_at_of::<Project>(&gw, project.id).await.is_some());
    assert!(archived_at_of::<Task>(&gw, floating.id).await.is_none());
}

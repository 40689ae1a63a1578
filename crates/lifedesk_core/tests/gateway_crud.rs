use lifedesk_core::{
    CreateGoal, CreateLifeArea, CreateNote, CreateProject, CreateTask, EntityGateway,
    GatewayError, Goal, GoalGateway, LifeArea, LifeAreaGateway, Note, NoteAttachment,
    NoteGateway, Project, ProjectGateway, ProjectStatus, SqliteGateway, Task, TaskPriority,
    UpdateGoal, UpdateLifeArea, ValidationError,
};
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

async fn create_goal(gw: &SqliteGateway, area: &LifeArea, name: &str) -> Goal {
    EntityGateway::<Goal>::create(
        gw,
        CreateGoal {
            life_area_id: area.id,
            name: name.to_string(),
            description: None,
            target_date: None,
        },
    )
    .await
    .unwrap()
}

async fn create_project(gw: &SqliteGateway, goal: &Goal, name: &str) -> Project {
    EntityGateway::<Project>::create(
        gw,
        CreateProject {
            goal_id: goal.id,
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

async fn create_task(gw: &SqliteGateway, project: &Project, name: &str) -> Task {
    EntityGateway::<Task>::create(
        gw,
        CreateTask {
            project_id: Some(project.id),
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

async fn create_note(gw: &SqliteGateway, attachment: Option<NoteAttachment>, title: &str) -> Note {
    EntityGateway::<Note>::create(
        gw,
        CreateNote {
            attachment,
            title: title.to_string(),
            content: format!("{title} body"),
        },
    )
    .await
    .unwrap()
}

#[tokio::test]
async fn create_and_get_all_roundtrip() {
    let gw = gateway();
    let area = create_area(&gw, "Health").await;
    let goal = create_goal(&gw, &area, "Run a marathon").await;

    let areas = EntityGateway::<LifeArea>::get_all(&gw).await.unwrap();
    assert_eq!(areas.len(), 1);
    assert_eq!(areas[0].id, area.id);
    assert_eq!(areas[0].name, "Health");
    assert!(areas[0].archived_at.is_none());

    let goals = EntityGateway::<Goal>::get_all(&gw).await.unwrap();
    assert_eq!(goals.len(), 1);
    assert_eq!(goals[0].id, goal.id);
    assert_eq!(goals[0].life_area_id, area.id);
    assert!(goals[0].completed_at.is_none());
}

#[tokio::test]
async fn create_trims_name_and_assigns_incrementing_sort_order() {
    let gw = gateway();
    let first = create_area(&gw, "  Work  ").await;
    let second = create_area(&gw, "Family").await;

    assert_eq!(first.name, "Work");
    assert_eq!(first.sort_order, 0);
    assert_eq!(second.sort_order, 1);
}

#[tokio::test]
async fn create_rejects_blank_name() {
    let gw = gateway();
    let err = EntityGateway::<LifeArea>::create(
        &gw,
        CreateLifeArea {
            name: "   ".to_string(),
            description: None,
            color: None,
            icon: None,
        },
    )
    .await
    .unwrap_err();

    assert!(matches!(
        err,
        GatewayError::Validation(ValidationError::BlankField { field: "name" })
    ));
    assert!(EntityGateway::<LifeArea>::get_all(&gw)
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn create_goal_under_missing_life_area_is_not_found() {
    let gw = gateway();
    let missing = Uuid::new_v4();
    let err = EntityGateway::<Goal>::create(
        &gw,
        CreateGoal {
            life_area_id: missing,
            name: "Orphan".to_string(),
            description: None,
            target_date: None,
        },
    )
    .await
    .unwrap_err();

    assert!(matches!(
        err,
        GatewayError::NotFound { kind, id }
            if kind == lifedesk_core::EntityKind::LifeArea && id == missing
    ));
}

#[tokio::test]
async fn update_applies_partial_fields_only() {
    let gw = gateway();
    let area = create_area(&gw, "Work").await;

    let updated = EntityGateway::<LifeArea>::update(
        &gw,
        area.id,
        UpdateLifeArea {
            description: Some("career and craft".to_string()),
            ..UpdateLifeArea::default()
        },
    )
    .await
    .unwrap();

    assert_eq!(updated.name, "Work");
    assert_eq!(updated.description.as_deref(), Some("career and craft"));
    assert!(updated.updated_at >= area.updated_at);
}

#[tokio::test]
async fn update_missing_goal_is_not_found_and_empty_update_is_rejected() {
    let gw = gateway();
    let area = create_area(&gw, "Work").await;
    let goal = create_goal(&gw, &area, "Ship v1").await;

    let missing = Uuid::new_v4();
    let not_found = EntityGateway::<Goal>::update(
        &gw,
        missing,
        UpdateGoal {
            name: Some("renamed".to_string()),
            ..UpdateGoal::default()
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(not_found, GatewayError::NotFound { .. }));

    let empty = EntityGateway::<Goal>::update(&gw, goal.id, UpdateGoal::default())
        .await
        .unwrap_err();
    assert!(matches!(
        empty,
        GatewayError::Validation(ValidationError::EmptyUpdate)
    ));
}

#[tokio::test]
async fn get_by_parent_narrows_to_one_parent() {
    let gw = gateway();
    let work = create_area(&gw, "Work").await;
    let health = create_area(&gw, "Health").await;
    let work_goal = create_goal(&gw, &work, "Ship v1").await;
    let _health_goal = create_goal(&gw, &health, "Sleep more").await;

    let work_goals = EntityGateway::<Goal>::get_by_parent(&gw, work.id)
        .await
        .unwrap();
    assert_eq!(work_goals.len(), 1);
    assert_eq!(work_goals[0].id, work_goal.id);
}

#[tokio::test]
async fn life_area_get_by_parent_is_empty() {
    let gw = gateway();
    create_area(&gw, "Work").await;
    let result = EntityGateway::<LifeArea>::get_by_parent(&gw, Uuid::new_v4())
        .await
        .unwrap();
    assert!(result.is_empty());
}

#[tokio::test]
async fn note_get_by_parent_matches_any_attachment_level() {
    let gw = gateway();
    let area = create_area(&gw, "Work").await;
    let goal = create_goal(&gw, &area, "Ship v1").await;
    let on_area = create_note(&gw, Some(NoteAttachment::LifeArea(area.id)), "Area note").await;
    let on_goal = create_note(&gw, Some(NoteAttachment::Goal(goal.id)), "Goal note").await;
    let _floating = create_note(&gw, None, "Floating").await;

    let area_notes = EntityGateway::<Note>::get_by_parent(&gw, area.id)
        .await
        .unwrap();
    assert_eq!(area_notes.len(), 1);
    assert_eq!(area_notes[0].id, on_area.id);

    let goal_notes = EntityGateway::<Note>::get_by_parent(&gw, goal.id)
        .await
        .unwrap();
    assert_eq!(goal_notes.len(), 1);
    assert_eq!(goal_notes[0].id, on_goal.id);
}

#[tokio::test]
async fn reorder_rewrites_sort_order_to_match_given_ids() {
    let gw = gateway();
    let first = create_area(&gw, "Alpha").await;
    let second = create_area(&gw, "Beta").await;
    let third = create_area(&gw, "Gamma").await;

    gw.reorder(&[third.id, first.id, second.id]).await.unwrap();

    let areas = EntityGateway::<LifeArea>::get_all(&gw).await.unwrap();
    let ids: Vec<_> = areas.iter().map(|area| area.id).collect();
    assert_eq!(ids, vec![third.id, first.id, second.id]);
    assert_eq!(areas[0].sort_order, 0);
    assert_eq!(areas[2].sort_order, 2);
}

#[tokio::test]
async fn complete_and_uncomplete_toggle_completed_at() {
    let gw = gateway();
    let area = create_area(&gw, "Work").await;
    let goal = create_goal(&gw, &area, "Ship v1").await;

    let done = GoalGateway::complete(&gw, goal.id).await.unwrap();
    assert!(done.completed_at.is_some());

    let undone = GoalGateway::uncomplete(&gw, goal.id).await.unwrap();
    assert!(undone.completed_at.is_none());

    let missing = GoalGateway::complete(&gw, Uuid::new_v4()).await.unwrap_err();
    assert!(matches!(missing, GatewayError::NotFound { .. }));
}

#[tokio::test]
async fn update_status_changes_status_only() {
    let gw = gateway();
    let area = create_area(&gw, "Work").await;
    let goal = create_goal(&gw, &area, "Ship v1").await;
    let project = create_project(&gw, &goal, "Launch").await;

    let updated = gw
        .update_status(project.id, ProjectStatus::InProgress)
        .await
        .unwrap();
    assert_eq!(updated.status, ProjectStatus::InProgress);
    assert_eq!(updated.name, "Launch");
    assert!(updated.archived_at.is_none());
}

#[tokio::test]
async fn search_matches_title_and_content_and_skips_archived() {
    let gw = gateway();
    let meeting = create_note(&gw, None, "Meeting minutes").await;
    let idea = EntityGateway::<Note>::create(
        &gw,
        CreateNote {
            attachment: None,
            title: "Ideas".to_string(),
            content: "discuss MEETING cadence".to_string(),
        },
    )
    .await
    .unwrap();
    let archived = create_note(&gw, None, "Old meeting log").await;
    EntityGateway::<Note>::archive(&gw, archived.id)
        .await
        .unwrap();

    let hits = gw.search("meeting").await.unwrap();
    let ids: Vec<_> = hits.iter().map(|note| note.id).collect();
    assert!(ids.contains(&meeting.id));
    assert!(ids.contains(&idea.id));
    assert!(!ids.contains(&archived.id));
}

#[tokio::test]
async fn stats_counts_active_rows_and_archived_total() {
    let gw = gateway();
    let area = create_area(&gw, "Work").await;
    let goal = create_goal(&gw, &area, "Ship v1").await;
    let project = create_project(&gw, &goal, "Launch").await;
    let _task = create_task(&gw, &project, "Design").await;
    create_note(&gw, None, "Scratch").await;

    EntityGateway::<Project>::archive(&gw, project.id)
        .await
        .unwrap();

    let stats = gw.stats().await.unwrap();
    assert_eq!(stats.active_life_areas, 1);
    assert_eq!(stats.active_goals, 1);
    assert_eq!(stats.active_projects, 0);
    assert_eq!(stats.active_tasks, 0);
    assert_eq!(stats.active_notes, 1);
    // The project plus its cascaded task.
    assert_eq!(stats.archived_total, 2);
}

//! End-to-end coordinator scenarios over a real bus and task store.

mod common;

use std::sync::Arc;
use std::time::Duration;

use chrono::{Duration as ChronoDuration, Utc};
use common::{complete_phase, config_expecting, record_events, setup_test_logging, started_stack, test_stack};
use hackathon_coordinator::domain::models::{
    AgentId, AgentRole, AlertKind, AlertSeverity, DataQuery, EventPayload, EventType,
    HackathonPhase, NewTask, QueryResult, StatusReport, TaskFilter, TaskPriority, TaskStatus,
};
use hackathon_coordinator::services::{AgentClient, BusError};

#[test]
fn test_planning_completion_moves_to_registration() {
    setup_test_logging();
    let stack = started_stack();
    let updates = record_events(&stack.bus, vec![EventType::StatusUpdate], "marketing");

    assert_eq!(complete_phase(&stack, HackathonPhase::Planning), 6);

    assert_eq!(stack.coordinator.current_phase(), HackathonPhase::Registration);
    assert_eq!(stack.coordinator.phase_progress(), 0);

    let registration = stack.tasks.get_tasks(&TaskFilter {
        phase: Some(HackathonPhase::Registration),
        ..Default::default()
    });
    assert_eq!(registration.len(), 2);
    assert!(registration.iter().all(|t| t.status == TaskStatus::Pending));

    let phase_changes: Vec<_> = updates
        .lock()
        .unwrap()
        .iter()
        .filter_map(|event| match &event.payload {
            EventPayload::StatusUpdate(StatusReport::PhaseChange {
                old_phase,
                new_phase,
            }) => Some((*old_phase, *new_phase)),
            _ => None,
        })
        .collect();
    assert_eq!(
        phase_changes,
        vec![(HackathonPhase::Planning, HackathonPhase::Registration)]
    );

    // 6 planning + 6 follow-ups + 2 registration created, 6 completed
    let stats = stack.coordinator.statistics();
    assert_eq!(stats.completed_tasks, 6);
    assert_eq!(stats.pending_tasks, 8);
}

#[test]
fn test_partial_completion_reports_rounded_progress() {
    let stack = started_stack();
    let planning = stack.tasks.get_tasks(&TaskFilter {
        phase: Some(HackathonPhase::Planning),
        ..Default::default()
    });

    stack
        .tasks
        .update_task_status(planning[0].id, TaskStatus::Completed, &planning[0].assigned_to, None)
        .unwrap();
    assert_eq!(stack.coordinator.phase_progress(), 17);

    // Follow-ups do not count toward progress
    let follow_up = stack
        .tasks
        .get_tasks(&TaskFilter {
            tag: Some("follow_up".to_string()),
            ..Default::default()
        })
        .pop()
        .unwrap();
    stack
        .tasks
        .update_task_status(follow_up.id, TaskStatus::Completed, &follow_up.assigned_to, None)
        .unwrap();
    assert_eq!(stack.coordinator.phase_progress(), 17);
    assert_eq!(stack.coordinator.current_phase(), HackathonPhase::Planning);
}

#[test]
fn test_large_phase_waits_for_its_last_task() {
    let stack = started_stack();
    for n in 0..194 {
        stack
            .tasks
            .create_task(
                NewTask::new(
                    format!("Sponsor outreach {n}"),
                    "Contact a sponsor",
                    AgentRole::Marketing,
                    AgentId::coordinator(),
                )
                .with_phase(HackathonPhase::Planning),
            )
            .unwrap();
    }
    let planning = stack.tasks.get_tasks(&TaskFilter {
        phase: Some(HackathonPhase::Planning),
        ..Default::default()
    });
    assert_eq!(planning.len(), 200);

    let (last, rest) = planning.split_last().unwrap();
    for task in rest {
        stack
            .tasks
            .update_task_status(task.id, TaskStatus::Completed, &task.assigned_to, None)
            .unwrap();
    }
    assert_eq!(stack.coordinator.current_phase(), HackathonPhase::Planning);
    assert_eq!(stack.coordinator.phase_progress(), 99);

    stack
        .tasks
        .update_task_status(last.id, TaskStatus::Completed, &last.assigned_to, None)
        .unwrap();
    assert_eq!(stack.coordinator.current_phase(), HackathonPhase::Registration);
}

#[test]
fn test_walks_every_phase_and_stops_at_post_event() {
    let stack = started_stack();

    for phase in HackathonPhase::ALL {
        assert_eq!(stack.coordinator.current_phase(), phase);
        assert!(complete_phase(&stack, phase) > 0, "{phase} should have tasks");
    }

    assert_eq!(stack.coordinator.current_phase(), HackathonPhase::PostEvent);
    assert_eq!(stack.coordinator.phase_progress(), 100);
}

#[test]
fn test_team_formation_fires_once_at_threshold() {
    let stack = test_stack(&config_expecting(100));
    stack.coordinator.start().unwrap();
    let registration = AgentClient::new(AgentRole::Registration, Arc::clone(&stack.bus));

    let team_tasks = || {
        stack
            .tasks
            .get_tasks_by_assignee(&AgentId::from(AgentRole::TeamFormation), None)
            .len()
    };

    registration.publish_event(EventPayload::RegistrationUpdated { new_registrations: 30 }, None);
    assert_eq!(team_tasks(), 0);
    assert!(!stack.coordinator.team_formation_triggered());

    registration.publish_event(EventPayload::RegistrationUpdated { new_registrations: 20 }, None);
    assert_eq!(team_tasks(), 2);
    assert!(stack.coordinator.team_formation_triggered());

    registration.publish_event(EventPayload::RegistrationUpdated { new_registrations: 40 }, None);
    assert_eq!(team_tasks(), 2);
    assert_eq!(stack.coordinator.statistics().registered_participants, 90);
}

#[test]
fn test_unknown_expected_participants_never_forms_teams() {
    let stack = test_stack(&config_expecting(0));
    stack.coordinator.start().unwrap();

    stack.bus.publish(
        EventPayload::RegistrationUpdated { new_registrations: 500 },
        "registration",
        None,
    );

    assert!(!stack.coordinator.team_formation_triggered());
    assert_eq!(stack.coordinator.statistics().registered_participants, 500);
}

#[test]
fn test_critical_unmapped_alert_goes_to_coordinator() {
    let stack = started_stack();
    let communication = AgentClient::new(AgentRole::Communication, Arc::clone(&stack.bus));

    communication.alert_coordinator(
        AlertKind::other("alien_invasion"),
        "Unidentified objects over the venue",
        AlertSeverity::Critical,
    );

    let alerts = stack.tasks.get_tasks(&TaskFilter {
        tag: Some("alert".to_string()),
        ..Default::default()
    });
    assert_eq!(alerts.len(), 1);
    let task = &alerts[0];
    assert_eq!(task.title, "ADDRESS ALERT: alien_invasion");
    assert_eq!(task.description, "Urgent attention needed: Unidentified objects over the venue");
    assert_eq!(task.assigned_to, AgentId::coordinator());
    assert_eq!(task.priority, TaskPriority::Urgent);
    assert_eq!(task.tags, vec!["alert", "critical", "alien_invasion"]);
    assert_eq!(stack.coordinator.statistics().pending_tasks, 7);
}

#[test]
fn test_low_severity_alert_creates_no_task() {
    let stack = started_stack();
    stack.bus.alert_coordinator(
        AlertKind::other("venue_issue"),
        "Projector flickers",
        AlertSeverity::Low,
        "logistics",
    );
    assert_eq!(stack.tasks.get_tasks(&TaskFilter::default()).len(), 6);
}

#[test]
fn test_deadline_alert_creates_reminder_within_a_day() {
    let stack = started_stack();
    let updates = record_events(&stack.bus, vec![EventType::StatusUpdate], "submission");
    let due_at = Utc::now() + ChronoDuration::hours(6);

    stack.bus.alert_coordinator(
        AlertKind::DeadlineApproaching {
            deadline: "Project submission".to_string(),
            due_at,
            task_type: None,
            time_remaining_hours: None,
        },
        "Submissions close soon",
        AlertSeverity::Medium,
        "scheduling",
    );

    let reminders = stack.tasks.get_tasks(&TaskFilter {
        priority: Some(TaskPriority::High),
        ..Default::default()
    });
    let reminder = reminders
        .iter()
        .find(|t| t.title == "REMINDER: Project submission approaching")
        .expect("reminder task");
    assert_eq!(reminder.assigned_to, AgentId::from(AgentRole::Scheduling));
    assert_eq!(reminder.due_date, Some(due_at));
    let shown = reminder
        .description
        .strip_prefix("Deadline Project submission is in ")
        .and_then(|rest| rest.split_once(" hours"))
        .map(|(hours, _)| hours)
        .expect("hours in description");
    assert!(matches!(shown, "5.9" | "6.0"), "got {shown}");

    let hours = updates
        .lock()
        .unwrap()
        .iter()
        .find_map(|event| match &event.payload {
            EventPayload::StatusUpdate(StatusReport::DeadlineReminder {
                time_remaining_hours,
                ..
            }) => Some(*time_remaining_hours),
            _ => None,
        })
        .expect("deadline reminder broadcast");
    assert!(hours > 5.0 && hours <= 6.0, "got {hours}");
}

#[test]
fn test_distant_deadline_is_ignored() {
    let stack = started_stack();
    stack.bus.alert_coordinator(
        AlertKind::DeadlineApproaching {
            deadline: "Judging".to_string(),
            due_at: Utc::now() + ChronoDuration::days(3),
            task_type: None,
            time_remaining_hours: Some(72.0),
        },
        "Judging in three days",
        AlertSeverity::Medium,
        "scheduling",
    );
    assert_eq!(stack.tasks.get_tasks(&TaskFilter::default()).len(), 6);
}

#[tokio::test]
async fn test_agent_queries_are_answered_by_coordinator() {
    let stack = started_stack();
    let judging = AgentClient::new(AgentRole::Judging, Arc::clone(&stack.bus));

    let phase = judging.request_data(DataQuery::CurrentPhase).await.unwrap();
    assert_eq!(
        phase,
        QueryResult::CurrentPhase {
            phase: HackathonPhase::Planning,
            progress: 0
        }
    );

    let duties = judging
        .request_data(DataQuery::AgentResponsibilities {
            agent_type: "judging".to_string(),
        })
        .await
        .unwrap();
    match duties {
        QueryResult::AgentResponsibilities(list) => assert!(!list.is_empty()),
        other => panic!("unexpected result {other:?}"),
    }

    let unknown = judging
        .request_data(DataQuery::Custom {
            name: "weather".to_string(),
            params: serde_json::Value::Null,
        })
        .await
        .unwrap();
    assert_eq!(unknown, QueryResult::error("Unknown data type requested: weather"));
    assert_eq!(stack.bus.pending_request_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_request_times_out_once_coordinator_stops() {
    let stack = started_stack();
    stack.coordinator.stop();

    let judging = AgentClient::new(AgentRole::Judging, Arc::clone(&stack.bus));
    let err = judging.request_data(DataQuery::Statistics).await.unwrap_err();

    assert!(matches!(err, BusError::RequestTimedOut { timeout_ms: 5000, .. }));
    assert_eq!(stack.bus.pending_request_count(), 0);
}

#[test]
fn test_scheduling_cycle_targets_assignees() {
    let stack = started_stack();
    let logistics = record_events(&stack.bus, vec![EventType::StatusUpdate], "logistics");

    stack
        .tasks
        .create_task(
            NewTask::new(
                "Book catering",
                "Lunch for both days",
                AgentRole::Logistics,
                AgentId::coordinator(),
            )
            .with_priority(TaskPriority::Urgent)
            .with_due_date(Utc::now() + ChronoDuration::hours(12)),
        )
        .unwrap();

    let report = stack.coordinator.run_scheduling_cycle();
    assert_eq!(report.reminders, 1);
    assert_eq!(report.notices, 3);

    let seen = logistics.lock().unwrap();
    assert!(seen.iter().any(|event| matches!(
        &event.payload,
        EventPayload::StatusUpdate(StatusReport::HighPriorityTask { title, .. }) if title == "Book catering"
    )));
}

#[tokio::test(start_paused = true)]
async fn test_background_loops_stop_on_cancel() {
    let stack = started_stack();
    let cancel = tokio_util::sync::CancellationToken::new();
    let sweeper = stack.bus.spawn_sweeper(cancel.clone());
    let cycle = stack.coordinator.spawn_scheduling_cycle(cancel.clone());

    tokio::time::sleep(Duration::from_secs(1)).await;
    cancel.cancel();

    sweeper.await.unwrap();
    cycle.await.unwrap();
}

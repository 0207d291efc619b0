//! Integration tests for the event service against in-memory SurrealDB.

use chrono::{Days, NaiveDate};
use http::StatusCode;
use outreach_core::TenantContext;
use outreach_core::error::OutreachError;
use outreach_core::models::event::{AttendeeInput, AttendeeOutcome, EventInput};
use outreach_core::query::SearchParams;
use outreach_db::repository::SurrealEventRepository;
use outreach_service::{EventService, ServiceConfig, respond};
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem};
use uuid::Uuid;

/// Spin up in-memory DB, run migrations, wrap the repository.
async fn setup() -> EventService<SurrealEventRepository<Db>> {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    outreach_db::run_migrations(&db).await.unwrap();
    EventService::new(SurrealEventRepository::new(db), ServiceConfig::default())
}

fn tenant() -> TenantContext {
    TenantContext::new(Uuid::new_v4())
}

fn gala(date: &str) -> EventInput {
    EventInput {
        event_name: Some("Gala".into()),
        date: Some(date.into()),
        ..Default::default()
    }
}

fn violation_fields(err: OutreachError) -> Vec<String> {
    match err {
        OutreachError::Validation(v) => v.into_iter().map(|v| v.field).collect(),
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[tokio::test]
async fn create_ignores_submitted_organization() {
    let service = setup().await;
    let ctx = tenant();
    let foreign = Uuid::new_v4();

    let payload = serde_json::json!({
        "eventName": "Gala",
        "date": "2024-05-01",
        "organization_id": foreign.to_string(),
    });
    let input: EventInput = serde_json::from_value(payload).unwrap();

    let event = service.create(&ctx, &input).await.unwrap();
    assert_eq!(event.organization_id, ctx.current_tenant());

    let plain = service.create(&ctx, &gala("2024-05-01")).await.unwrap();
    assert_eq!(plain.organization_id, ctx.current_tenant());
}

#[tokio::test]
async fn create_empty_event_reports_both_required_fields() {
    let service = setup().await;
    let ctx = tenant();

    let err = service.create(&ctx, &EventInput::default()).await.unwrap_err();
    assert_eq!(violation_fields(err), vec!["eventName", "date"]);
    assert!(service.list(&ctx).await.unwrap().is_empty());

    let response = respond(service.create(&ctx, &EventInput::default()).await);
    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(response.body[0]["message"], "event name is required");
}

#[tokio::test]
async fn add_attendee_twice_is_a_no_op() {
    let service = setup().await;
    let ctx = tenant();
    let event = service.create(&ctx, &gala("2024-05-01")).await.unwrap();
    let client = Uuid::new_v4();
    let body = AttendeeInput {
        attendee: Some(client.to_string()),
    };

    let first = service
        .add_attendee(&ctx, &event.id.to_string(), &body)
        .await
        .unwrap();
    let second = service
        .add_attendee(&ctx, &event.id.to_string(), &body)
        .await
        .unwrap();

    assert_eq!(first, Some(AttendeeOutcome::Added));
    assert_eq!(second, Some(AttendeeOutcome::Unchanged));

    let stored = service.get(&ctx, &event.id.to_string()).await.unwrap();
    assert_eq!(stored[0].attendees.iter().copied().collect::<Vec<_>>(), vec![client]);
}

#[tokio::test]
async fn add_attendee_validates_body_and_path() {
    let service = setup().await;
    let ctx = tenant();

    let err = service
        .add_attendee(&ctx, "nope", &AttendeeInput { attendee: None })
        .await
        .unwrap_err();
    assert_eq!(violation_fields(err), vec!["id", "attendee"]);

    let err = service
        .add_attendee(
            &ctx,
            &Uuid::new_v4().to_string(),
            &AttendeeInput {
                attendee: Some("C1".into()),
            },
        )
        .await
        .unwrap_err();
    assert_eq!(violation_fields(err), vec!["attendee"]);
}

#[tokio::test]
async fn add_attendee_to_other_tenants_event_is_none() {
    let service = setup().await;
    let (owner, other) = (tenant(), tenant());
    let event = service.create(&owner, &gala("2024-05-01")).await.unwrap();

    let outcome = service
        .add_attendee(
            &other,
            &event.id.to_string(),
            &AttendeeInput {
                attendee: Some(Uuid::new_v4().to_string()),
            },
        )
        .await
        .unwrap();
    assert_eq!(outcome, None);

    let stored = service.get(&owner, &event.id.to_string()).await.unwrap();
    assert!(stored[0].attendees.is_empty());
}

#[tokio::test]
async fn delete_missing_event_is_null_success() {
    let service = setup().await;
    let ctx = tenant();

    let result = service.delete(&ctx, &Uuid::new_v4().to_string()).await;
    assert!(matches!(result, Ok(None)));

    let response = respond(service.delete(&ctx, &Uuid::new_v4().to_string()).await);
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.is_null());
}

#[tokio::test]
async fn delete_is_tenant_scoped() {
    let service = setup().await;
    let (owner, other) = (tenant(), tenant());
    let event = service.create(&owner, &gala("2024-05-01")).await.unwrap();
    let id = event.id.to_string();

    assert!(service.delete(&other, &id).await.unwrap().is_none());
    assert_eq!(service.get(&owner, &id).await.unwrap().len(), 1);

    let deleted = service.delete(&owner, &id).await.unwrap().unwrap();
    assert_eq!(deleted.id, event.id);
    assert!(service.get(&owner, &id).await.unwrap().is_empty());
}

#[tokio::test]
async fn get_with_malformed_id_is_validation_error() {
    let service = setup().await;
    let err = service.get(&tenant(), "not-an-id").await.unwrap_err();
    assert_eq!(violation_fields(err), vec!["id"]);
}

#[tokio::test]
async fn replace_validates_like_create() {
    let service = setup().await;
    let ctx = tenant();
    let event = service.create(&ctx, &gala("2024-05-01")).await.unwrap();

    let err = service
        .replace(
            &ctx,
            &event.id.to_string(),
            &EventInput {
                event_name: Some("  ".into()),
                date: Some("2024-13-01".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert_eq!(violation_fields(err), vec!["eventName", "date"]);

    let unchanged = service.get(&ctx, &event.id.to_string()).await.unwrap();
    assert_eq!(unchanged[0].event_name, "Gala");
}

#[tokio::test]
async fn replace_in_other_tenant_is_none() {
    let service = setup().await;
    let (owner, other) = (tenant(), tenant());
    let event = service.create(&owner, &gala("2024-05-01")).await.unwrap();

    let replaced = service
        .replace(&other, &event.id.to_string(), &gala("2025-01-01"))
        .await
        .unwrap();
    assert!(replaced.is_none());

    let stored = service.get(&owner, &event.id.to_string()).await.unwrap();
    assert_eq!(stored[0].date, NaiveDate::from_ymd_opt(2024, 5, 1).unwrap());
}

#[tokio::test]
async fn search_by_name_and_date() {
    let service = setup().await;
    let ctx = tenant();
    service.create(&ctx, &gala("2024-05-01")).await.unwrap();
    service
        .create(
            &ctx,
            &EventInput {
                event_name: Some("Food Drive".into()),
                date: Some("2024-06-01".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let by_name: SearchParams = [("searchBy", "name"), ("eventName", "ga")]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    let found = service.search(&ctx, &by_name).await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].event_name, "Gala");

    let by_date: SearchParams = [("searchBy", "date"), ("eventDate", "2024-06-01")]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    let found = service.search(&ctx, &by_date).await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].event_name, "Food Drive");

    let other = service.search(&tenant(), &by_date).await.unwrap();
    assert!(other.is_empty());
}

#[tokio::test]
async fn recent_window_excludes_old_and_future_events() {
    let service = setup().await;
    let ctx = tenant();
    let today = NaiveDate::from_ymd_opt(2024, 5, 15).unwrap();
    let fmt = |d: NaiveDate| d.format("%Y-%m-%d").to_string();

    service
        .create(&ctx, &gala(&fmt(today - Days::new(10))))
        .await
        .unwrap();
    service.create(&ctx, &gala("2024-02-15")).await.unwrap();
    service
        .create(&ctx, &gala(&fmt(today + Days::new(3))))
        .await
        .unwrap();

    let recent = service.recent(&ctx, today).await.unwrap();
    assert_eq!(recent.len(), 1);
    assert_eq!(recent[0].date, today - Days::new(10));
}

#[tokio::test]
async fn for_client_lists_only_events_with_that_attendee() {
    let service = setup().await;
    let ctx = tenant();
    let client = Uuid::new_v4();

    let attended = service
        .create(
            &ctx,
            &EventInput {
                attendees: Some(vec![client.to_string()]),
                ..gala("2024-05-01")
            },
        )
        .await
        .unwrap();
    service.create(&ctx, &gala("2024-05-02")).await.unwrap();

    let events = service.for_client(&ctx, &client.to_string()).await.unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].id, attended.id);

    let foreign = service
        .for_client(&tenant(), &client.to_string())
        .await
        .unwrap();
    assert!(foreign.is_empty());
}

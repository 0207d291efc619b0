//! Integration tests for the client and organization services.

use outreach_core::TenantContext;
use outreach_core::error::OutreachError;
use outreach_core::models::client::{AddressInput, ClientInput, PhoneNumberInput};
use outreach_core::models::organization::CreateOrganization;
use outreach_core::query::SearchParams;
use outreach_core::repository::OrganizationRepository;
use outreach_db::repository::{SurrealClientRepository, SurrealOrganizationRepository};
use outreach_service::{ClientService, OrganizationService, ServiceConfig};
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem};
use uuid::Uuid;

async fn db() -> Surreal<Db> {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    outreach_db::run_migrations(&db).await.unwrap();
    db
}

async fn setup() -> ClientService<SurrealClientRepository<Db>> {
    ClientService::new(SurrealClientRepository::new(db().await), ServiceConfig::default())
}

fn person(first: &str, last: &str, phone: &str) -> ClientInput {
    ClientInput {
        first_name: Some(first.into()),
        last_name: Some(last.into()),
        email: Some(format!("{}@example.org", first.to_lowercase())),
        phone_numbers: Some(vec![PhoneNumberInput {
            primary_phone: Some(phone.into()),
            secondary_phone: None,
        }]),
        address: Some(AddressInput {
            city: Some("Houston".into()),
            ..Default::default()
        }),
    }
}

fn params(pairs: &[(&str, &str)]) -> SearchParams {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[tokio::test]
async fn create_and_get_round_trip() {
    let service = setup().await;
    let ctx = TenantContext::new(Uuid::new_v4());

    let client = service
        .create(&ctx, &person("Bob", "Smith", "7135550100"))
        .await
        .unwrap();
    assert_eq!(client.organization_id, ctx.current_tenant());

    let fetched = service.get(&ctx, &client.id.to_string()).await.unwrap();
    assert_eq!(fetched, vec![client]);
}

#[tokio::test]
async fn create_ignores_submitted_organization() {
    let service = setup().await;
    let ctx = TenantContext::new(Uuid::new_v4());
    let foreign = Uuid::new_v4();

    let payload = serde_json::json!({
        "firstName": "Bob",
        "lastName": "Smith",
        "email": "bob@example.org",
        "phoneNumbers": [{ "primaryPhone": "7135550100" }],
        "address": { "city": "Houston" },
        "organization_id": foreign.to_string(),
    });
    let input: ClientInput = serde_json::from_value(payload).unwrap();

    let client = service.create(&ctx, &input).await.unwrap();
    assert_eq!(client.organization_id, ctx.current_tenant());

    let stored = service
        .find(&ctx, &client.id.to_string())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.organization_id, ctx.current_tenant());

    let foreign_ctx = TenantContext::new(foreign);
    assert!(
        service
            .find(&foreign_ctx, &client.id.to_string())
            .await
            .unwrap()
            .is_none()
    );
}

#[tokio::test]
async fn find_returns_single_client_or_none() {
    let service = setup().await;
    let ctx = TenantContext::new(Uuid::new_v4());
    let client = service
        .create(&ctx, &person("Ann", "Lee", "7135550100"))
        .await
        .unwrap();

    let found = service.find(&ctx, &client.id.to_string()).await.unwrap();
    assert_eq!(found, Some(client));

    let missing = service.find(&ctx, &Uuid::new_v4().to_string()).await.unwrap();
    assert!(missing.is_none());

    assert!(matches!(
        service.find(&ctx, "C1").await,
        Err(OutreachError::Validation(_))
    ));
}

#[tokio::test]
async fn search_by_name_excludes_other_tenants() {
    let service = setup().await;
    let (t1, t2) = (
        TenantContext::new(Uuid::new_v4()),
        TenantContext::new(Uuid::new_v4()),
    );

    service
        .create(&t1, &person("Bobby", "Jones", "7135550100"))
        .await
        .unwrap();
    service
        .create(&t1, &person("Alice", "Jones", "7135550101"))
        .await
        .unwrap();
    service
        .create(&t2, &person("bob", "Smith", "7135550102"))
        .await
        .unwrap();

    let found = service
        .search(&t1, &params(&[("searchBy", "name"), ("firstName", "Bo")]))
        .await
        .unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].first_name, "Bobby");
    assert_eq!(found[0].organization_id, t1.current_tenant());
}

#[tokio::test]
async fn search_by_number() {
    let service = setup().await;
    let ctx = TenantContext::new(Uuid::new_v4());
    service
        .create(&ctx, &person("Bob", "Smith", "7135550100"))
        .await
        .unwrap();
    service
        .create(&ctx, &person("Ann", "Lee", "2815550100"))
        .await
        .unwrap();

    let found = service
        .search(
            &ctx,
            &params(&[("searchBy", "number"), ("phoneNumbers.primaryPhone", "713")]),
        )
        .await
        .unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].first_name, "Bob");
}

#[tokio::test]
async fn replace_runs_full_validation() {
    let service = setup().await;
    let ctx = TenantContext::new(Uuid::new_v4());
    let client = service
        .create(&ctx, &person("Bob", "Smith", "7135550100"))
        .await
        .unwrap();

    let mut invalid = person("Bob", "Smith", "7135550100");
    invalid.email = Some("bob".into());
    invalid.address = None;
    let err = service
        .replace(&ctx, &client.id.to_string(), &invalid)
        .await
        .unwrap_err();
    let OutreachError::Validation(violations) = err else {
        panic!("expected validation error");
    };
    let fields: Vec<_> = violations.iter().map(|v| v.field.as_str()).collect();
    assert_eq!(fields, vec!["email", "address.city"]);

    let replaced = service
        .replace(&ctx, &client.id.to_string(), &person("Robert", "Smith", "7135550199"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(replaced.first_name, "Robert");
    assert_eq!(replaced.created_at, client.created_at);
}

#[tokio::test]
async fn delete_missing_client_is_none() {
    let service = setup().await;
    let ctx = TenantContext::new(Uuid::new_v4());
    let deleted = service
        .delete(&ctx, &Uuid::new_v4().to_string())
        .await
        .unwrap();
    assert!(deleted.is_none());
}

#[tokio::test]
async fn list_is_bounded_by_config() {
    let repo = SurrealClientRepository::new(db().await);
    let service = ClientService::new(
        repo,
        ServiceConfig {
            list_limit: 2,
            ..ServiceConfig::default()
        },
    );
    let ctx = TenantContext::new(Uuid::new_v4());
    for name in ["Ann", "Bob", "Cat"] {
        service
            .create(&ctx, &person(name, "Lee", "7135550100"))
            .await
            .unwrap();
    }

    let listed = service.list(&ctx).await.unwrap();
    assert_eq!(listed.len(), 2);
    assert!(listed[0].updated_at >= listed[1].updated_at);
}

#[tokio::test]
async fn current_organization_follows_tenant() {
    let db = db().await;
    let repo = SurrealOrganizationRepository::new(db.clone());
    let org = repo
        .create(CreateOrganization {
            name: "Food Bank".into(),
            metadata: None,
        })
        .await
        .unwrap();

    let service = OrganizationService::new(
        SurrealOrganizationRepository::new(db),
        ServiceConfig::default(),
    );

    let current = service
        .current(&TenantContext::new(org.id))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(current.name, "Food Bank");

    assert!(
        service
            .current(&TenantContext::new(Uuid::new_v4()))
            .await
            .unwrap()
            .is_none()
    );
    assert_eq!(service.get(&org.id.to_string()).await.unwrap().len(), 1);
    assert_eq!(service.list().await.unwrap().len(), 1);
}

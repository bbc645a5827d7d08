mod common;

use std::time::Duration;

use anyhow::Result;
use haven_admin::gateway::{fetch_record, fetch_records, Gateway, GatewayError, HttpGateway};
use haven_admin::model::Collection;
use serde_json::{json, Map, Value};

#[tokio::test]
async fn list_unwraps_envelope_and_drops_invalid_documents() -> Result<()> {
    let store = common::TestStore::start().await?;
    store.seed("tips", (1..=4).map(common::tip).collect());
    store.seed("tips", vec![json!({ "id": "broken", "title": "No content" })]);

    let gateway = store.gateway()?;
    assert_eq!(gateway.list(Collection::Tips).await?.len(), 5);

    let records = fetch_records(&gateway, Collection::Tips).await?;
    assert_eq!(records.len(), 4);
    assert!(records.iter().all(|r| r.id() != "broken"));
    Ok(())
}

#[tokio::test]
async fn missing_token_is_unauthorized() -> Result<()> {
    let store = common::TestStore::start().await?;
    let gateway = HttpGateway::new(&store.api_url(), Duration::from_secs(5))?;

    let err = gateway.list(Collection::Tips).await.unwrap_err();
    assert_eq!(err, GatewayError::Unauthorized("missing or invalid token".to_string()));
    Ok(())
}

#[tokio::test]
async fn create_update_delete_round_trip() -> Result<()> {
    let store = common::TestStore::start().await?;
    let gateway = store.gateway()?;

    let mut fields = Map::new();
    fields.insert("name".to_string(), json!("Samaritans"));
    fields.insert("phone".to_string(), json!("116 123"));
    let created = gateway.create(Collection::CrisisContacts, fields).await?;
    let id = created["id"].as_str().unwrap_or_default().to_string();
    assert!(!id.is_empty());

    let mut patch = Map::new();
    patch.insert("availability".to_string(), json!("24/7"));
    // The store answers 204, so the gateway reads the document back
    let updated = gateway.update(Collection::CrisisContacts, &id, patch).await?;
    assert_eq!(updated["availability"], "24/7");
    assert_eq!(updated["name"], "Samaritans");

    let record = fetch_record(&gateway, Collection::CrisisContacts, &id).await?;
    assert_eq!(record.text("availability"), Some("24/7"));

    gateway.delete(Collection::CrisisContacts, &id).await?;
    let err = gateway.get(Collection::CrisisContacts, &id).await.unwrap_err();
    assert!(matches!(err, GatewayError::NotFound { .. }));
    assert!(store.docs("crisis_contacts").is_empty());
    Ok(())
}

#[tokio::test]
async fn delete_of_missing_record_is_not_found() -> Result<()> {
    let store = common::TestStore::start().await?;
    let gateway = store.gateway()?;

    let err = gateway.delete(Collection::Tips, "nope").await.unwrap_err();
    assert_eq!(
        err,
        GatewayError::NotFound {
            collection: "tips".to_string(),
            id: "nope".to_string()
        }
    );
    Ok(())
}

#[tokio::test]
async fn server_failure_surfaces_plain_text_message() -> Result<()> {
    let store = common::TestStore::start().await?;
    store.set_offline(true);
    let gateway = store.gateway()?;

    let err = gateway.list(Collection::Users).await.unwrap_err();
    match err {
        GatewayError::Rejected { status, message, .. } => {
            assert_eq!(status, 500);
            assert_eq!(message, "store offline");
        }
        other => panic!("unexpected error: {:?}", other),
    }
    Ok(())
}

#[tokio::test]
async fn joined_collections_fetch_users_over_http() -> Result<()> {
    let store = common::TestStore::start().await?;
    store.seed("users", vec![json!({ "id": "u1", "email": "sam@example.com", "name": "Sam" })]);
    store.seed(
        "therapy_bookings",
        vec![json!({
            "id": "b1",
            "userId": "u1",
            "therapistName": "Dr. Lee",
            "date": "2024-05-01T10:00:00Z",
            "status": "confirmed"
        })],
    );

    let gateway = store.gateway()?;
    let records = fetch_records(&gateway, Collection::TherapyBookings).await?;
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].text("userName"), Some("Sam"));
    assert_eq!(records[0].text("userEmail"), Some("sam@example.com"));

    let raw: Vec<Value> = store.docs("therapy_bookings");
    assert!(raw[0].get("userName").is_none());
    Ok(())
}

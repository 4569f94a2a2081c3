use super::common::*;
use crate::requests::domain::RequestId;
use crate::requests::gateway::{GatewayError, PersistenceGateway, StoreGateway};
use crate::requests::repository::RequestRepository;
use crate::requests::service::IndividualRequestService;
use crate::requests::wizard::{Outcome, RequestWizard};
use std::sync::Arc;

#[tokio::test]
async fn store_gateway_creates_then_updates() {
    let (service, repository) = build_service();
    let gateway = StoreGateway::new(service.clone(), issuer());

    assert!(gateway
        .create_or_update(valid_fields(), None)
        .await
        .expect("reachable"));
    assert_eq!(repository.len(), 1);

    let id = repository
        .records
        .lock()
        .expect("repository mutex poisoned")
        .keys()
        .next()
        .cloned()
        .expect("one record");
    let mut fields = valid_fields();
    fields.relationship = "Advisor".to_string();
    assert!(gateway
        .create_or_update(fields, Some(id.clone()))
        .await
        .expect("reachable"));

    let draft = gateway
        .fetch_by_id(&id)
        .await
        .expect("reachable")
        .expect("found");
    assert_eq!(draft.relationship, "Advisor");
    assert_eq!(draft.id, Some(id));
}

#[tokio::test]
async fn handled_rejections_report_false() {
    let (service, _) = build_service();
    let gateway = StoreGateway::new(service, issuer());

    let stored = gateway
        .create_or_update(valid_fields(), Some(RequestId("req-unknown".to_string())))
        .await
        .expect("reachable");
    assert!(!stored);
}

#[tokio::test]
async fn foreign_or_missing_drafts_fetch_as_none() {
    let (service, _) = build_service();
    let record = service
        .create_or_update(&issuer(), valid_fields(), None)
        .expect("created");

    let foreign = StoreGateway::new(service.clone(), other_issuer());
    assert_eq!(foreign.fetch_by_id(&record.id).await.expect("reachable"), None);

    let owner = StoreGateway::new(service, issuer());
    assert_eq!(
        owner
            .fetch_by_id(&RequestId("req-nope".to_string()))
            .await
            .expect("reachable"),
        None
    );
}

#[tokio::test]
async fn outages_surface_as_errors() {
    let service = Arc::new(IndividualRequestService::new(Arc::new(UnavailableRepository)));
    let gateway = StoreGateway::new(service, issuer());

    assert!(matches!(
        gateway.create_or_update(valid_fields(), None).await,
        Err(GatewayError::Unavailable(_))
    ));
    assert!(matches!(
        gateway.fetch_by_id(&RequestId("req-1".to_string())).await,
        Err(GatewayError::Unavailable(_))
    ));
}

#[tokio::test]
async fn wizard_edits_a_stored_draft_through_the_store() {
    let (service, repository) = build_service();
    let created = service
        .create_or_update(&issuer(), valid_fields(), None)
        .expect("created");
    let gateway = StoreGateway::new(service, issuer());

    let mut wizard = RequestWizard::new(Some(created.id.clone()));
    assert!(wizard.hydrate(&gateway).await);
    assert_eq!(wizard.draft().relationship, valid_draft().relationship);

    wizard.continue_to_details().expect("step 1 -> 2");
    wizard
        .set_field(crate::requests::domain::FieldUpdate::Relationship(
            "Thesis advisor".to_string(),
        ))
        .expect("editable");
    assert_eq!(wizard.submit(&gateway).await, Ok(Outcome::Success));

    let stored = repository
        .fetch(&created.id)
        .expect("fetch succeeds")
        .expect("present");
    assert_eq!(stored.fields.relationship, "Thesis advisor");
    assert_eq!(repository.len(), 1);
}

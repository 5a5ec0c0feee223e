// HTTP-level tests against the in-memory storage backend

use actix_web::{http::StatusCode, test, App};
use kyc_engine::config::ComplianceConfig;
use kyc_engine::{handlers, KycServices};
use serde_json::{json, Value};
use uuid::Uuid;

macro_rules! kyc_app {
    () => {{
        let services = KycServices::in_memory(&ComplianceConfig::default()).unwrap();
        test::init_service(
            App::new().configure(move |cfg| handlers::configure_app(cfg, &services)),
        )
        .await
    }};
}

fn location(party_id: Uuid, city: &str, is_primary: bool) -> Value {
    json!({
        "party_id": party_id,
        "location_type": "BRANCH",
        "address": {
            "line1": "Bahnhofstrasse 10",
            "city": city,
            "country": "CH"
        },
        "is_primary": is_primary
    })
}

#[actix_web::test]
async fn test_health_reports_storage() {
    let app = kyc_app!();

    let req = test::TestRequest::get().uri("/health").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["status"], "healthy");
    assert_eq!(body["storage"], "memory");
}

#[actix_web::test]
async fn test_location_crud_and_single_primary() {
    let app = kyc_app!();
    let party = Uuid::new_v4();

    let req = test::TestRequest::post()
        .uri("/api/v1/business-locations")
        .set_json(location(party, "Zurich", true))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let zurich: Value = test::read_body_json(resp).await;

    let req = test::TestRequest::post()
        .uri("/api/v1/business-locations")
        .set_json(location(party, "Geneva", true))
        .to_request();
    let geneva: Value = test::call_and_read_body_json(&app, req).await;

    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/business-locations/primary/{}", party))
        .to_request();
    let primary: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(primary["id"], geneva["id"]);

    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/business-locations?owner_id={}", party))
        .to_request();
    let page: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(page["count"], 2);
    let primaries = page["items"]
        .as_array()
        .unwrap()
        .iter()
        .filter(|l| l["is_primary"] == true)
        .count();
    assert_eq!(primaries, 1);

    // Promote Zurich back through an update
    let req = test::TestRequest::put()
        .uri(&format!("/api/v1/business-locations/{}", zurich["id"].as_str().unwrap()))
        .set_json(location(party, "Zurich", true))
        .to_request();
    let updated: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(updated["is_primary"], true);
    assert_eq!(updated["created_at"], zurich["created_at"]);

    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/business-locations/{}", geneva["id"].as_str().unwrap()))
        .to_request();
    let geneva: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(geneva["is_primary"], false);

    let req = test::TestRequest::delete()
        .uri(&format!("/api/v1/business-locations/{}", geneva["id"].as_str().unwrap()))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NO_CONTENT);

    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/business-locations/{}", geneva["id"].as_str().unwrap()))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_verification_survives_update_until_address_changes() {
    let app = kyc_app!();
    let party = Uuid::new_v4();

    let req = test::TestRequest::post()
        .uri("/api/v1/business-locations")
        .set_json(location(party, "Basel", false))
        .to_request();
    let created: Value = test::call_and_read_body_json(&app, req).await;
    let id = created["id"].as_str().unwrap().to_string();

    let req = test::TestRequest::post()
        .uri(&format!("/api/v1/business-locations/{}/verify", id))
        .set_json(json!({ "verified_by": "kyb-ops" }))
        .to_request();
    let verified: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(verified["verified"], true);

    let req = test::TestRequest::put()
        .uri(&format!("/api/v1/business-locations/{}", id))
        .set_json(location(party, "Basel", false))
        .to_request();
    let same_address: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(same_address["verified"], true);
    assert_eq!(same_address["verified_by"], "kyb-ops");

    let req = test::TestRequest::put()
        .uri(&format!("/api/v1/business-locations/{}", id))
        .set_json(location(party, "Bern", false))
        .to_request();
    let moved: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(moved["verified"], false);
}

#[actix_web::test]
async fn test_economic_activity_without_primary() {
    let app = kyc_app!();
    let party = Uuid::new_v4();

    let req = test::TestRequest::post()
        .uri("/api/v1/economic-activities")
        .set_json(json!({
            "party_id": party,
            "activity_code": "64.19",
            "classification_system": "NACE"
        }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CREATED);

    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/economic-activities/primary/{}", party))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"]["type"], "not_found");
}

#[actix_web::test]
async fn test_screening_match_review_flow() {
    let app = kyc_app!();

    let req = test::TestRequest::post()
        .uri("/api/v1/aml-screenings")
        .set_json(json!({
            "party_id": Uuid::new_v4(),
            "screening_type": "SANCTIONS",
            "provider": "Dow Jones"
        }))
        .to_request();
    let screening: Value = test::call_and_read_body_json(&app, req).await;
    let screening_id = screening["id"].as_str().unwrap().to_string();
    assert_eq!(screening["status"], "PENDING");

    let req = test::TestRequest::post()
        .uri(&format!("/api/v1/aml-screenings/{}/matches", screening_id))
        .set_json(json!({
            "matched_name": "Ivan Petrov",
            "list_name": "OFAC SDN",
            "list_type": "SANCTIONS",
            "match_score": "87.5"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let aml_match: Value = test::read_body_json(resp).await;
    assert_eq!(aml_match["screening_id"], screening_id.as_str());
    assert_eq!(aml_match["disposition"], "UNREVIEWED");

    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/aml-screenings/{}", screening_id))
        .to_request();
    let screening: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(screening["status"], "POTENTIAL_MATCH");

    let match_id = aml_match["id"].as_str().unwrap().to_string();
    let req = test::TestRequest::post()
        .uri(&format!("/api/v1/aml-matches/{}/resolve", match_id))
        .set_json(json!({ "disposition": "UNREVIEWED", "reviewed_by": "analyst" }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);

    let req = test::TestRequest::post()
        .uri(&format!("/api/v1/aml-matches/{}/resolve", match_id))
        .set_json(json!({ "disposition": "FALSE_POSITIVE", "reviewed_by": "analyst" }))
        .to_request();
    let resolved: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(resolved["reviewed_by"], "analyst");

    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/aml-screenings/{}", screening_id))
        .to_request();
    let screening: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(screening["status"], "CLEAR");

    let req = test::TestRequest::delete()
        .uri(&format!("/api/v1/aml-screenings/{}", screening_id))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NO_CONTENT);

    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/aml-matches/{}", match_id))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_case_status_and_actions() {
    let app = kyc_app!();
    let party = Uuid::new_v4();

    let req = test::TestRequest::post()
        .uri("/api/v1/compliance-cases")
        .set_json(json!({
            "party_id": party,
            "case_type": "PERIODIC_REVIEW"
        }))
        .to_request();
    let case: Value = test::call_and_read_body_json(&app, req).await;
    let case_id = case["id"].as_str().unwrap().to_string();
    assert_eq!(case["status"], "OPEN");
    assert_eq!(case["priority"], "MEDIUM");

    let req = test::TestRequest::post()
        .uri(&format!("/api/v1/compliance-cases/{}/actions", case_id))
        .set_json(json!({
            "action_type": "REQUEST_INFORMATION",
            "performed_by": "analyst-9",
            "notes": "Need updated shareholder register"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let req = test::TestRequest::put()
        .uri(&format!("/api/v1/compliance-cases/{}/status", case_id))
        .set_json(json!({ "status": "CLOSED" }))
        .to_request();
    let closed: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(closed["status"], "CLOSED");
    assert!(!closed["closed_at"].is_null());

    // A plain update does not touch the status
    let req = test::TestRequest::put()
        .uri(&format!("/api/v1/compliance-cases/{}", case_id))
        .set_json(json!({
            "party_id": party,
            "case_type": "PERIODIC_REVIEW",
            "priority": "HIGH"
        }))
        .to_request();
    let updated: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(updated["status"], "CLOSED");
    assert_eq!(updated["priority"], "HIGH");

    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/compliance-cases/open/{}", party))
        .to_request();
    let open: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(open.as_array().unwrap().len(), 0);

    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/compliance-cases/{}/actions", case_id))
        .to_request();
    let actions: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(actions.as_array().unwrap().len(), 1);

    let req = test::TestRequest::delete()
        .uri(&format!("/api/v1/compliance-cases/{}", case_id))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NO_CONTENT);

    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/compliance-actions?owner_id={}", case_id))
        .to_request();
    let page: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(page["count"], 0);
}

#[actix_web::test]
async fn test_report_filing_lifecycle() {
    let app = kyc_app!();
    let party = Uuid::new_v4();
    let draft = json!({
        "party_id": party,
        "report_type": "SAR",
        "jurisdiction": "GB",
        "regulator": "NCA",
        "amount": "15000.00",
        "currency": "GBP"
    });

    let req = test::TestRequest::post()
        .uri("/api/v1/regulatory-reports")
        .set_json(&draft)
        .to_request();
    let report: Value = test::call_and_read_body_json(&app, req).await;
    let report_id = report["id"].as_str().unwrap().to_string();
    assert_eq!(report["status"], "DRAFT");

    let req = test::TestRequest::post()
        .uri(&format!("/api/v1/regulatory-reports/{}/submit", report_id))
        .set_json(json!({ "reference_number": "NCA-2024-118" }))
        .to_request();
    let submitted: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(submitted["status"], "SUBMITTED");
    assert!(!submitted["submitted_at"].is_null());

    let req = test::TestRequest::put()
        .uri(&format!("/api/v1/regulatory-reports/{}", report_id))
        .set_json(&draft)
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CONFLICT);

    let req = test::TestRequest::post()
        .uri(&format!("/api/v1/regulatory-reports/{}/outcome", report_id))
        .set_json(json!({ "outcome": "ACKNOWLEDGED" }))
        .to_request();
    let acked: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(acked["status"], "ACKNOWLEDGED");
    assert_eq!(acked["reference_number"], "NCA-2024-118");

    let req = test::TestRequest::post()
        .uri(&format!("/api/v1/regulatory-reports/{}/submit", report_id))
        .set_json(json!({ "reference_number": "NCA-2024-119" }))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::UNPROCESSABLE_ENTITY
    );
}

#[actix_web::test]
async fn test_beneficial_owners() {
    let app = kyc_app!();
    let party = Uuid::new_v4();

    for (name, owner_type, pct) in [
        ("Maria Rossi", "NATURAL_PERSON", "30"),
        ("Luca Rossi", "NATURAL_PERSON", "10"),
        ("Rossi Holding SpA", "LEGAL_ENTITY", "60"),
    ] {
        let req = test::TestRequest::post()
            .uri("/api/v1/ownerships")
            .set_json(json!({
                "party_id": party,
                "owner_name": name,
                "owner_type": owner_type,
                "ownership_percentage": pct
            }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CREATED);
    }

    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/ownerships/beneficial-owners/{}", party))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    let owners = body["owners"].as_array().unwrap();
    assert_eq!(owners.len(), 1);
    assert_eq!(owners[0]["owner_name"], "Maria Rossi");
}

#[actix_web::test]
async fn test_request_errors() {
    let app = kyc_app!();

    // Missing required fields
    let req = test::TestRequest::post()
        .uri("/api/v1/documents")
        .set_json(json!({ "party_id": Uuid::new_v4() }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"]["type"], "validation_error");

    // Field-level validation
    let req = test::TestRequest::post()
        .uri("/api/v1/business-profiles")
        .set_json(json!({
            "party_id": Uuid::new_v4(),
            "legal_name": "Acme GmbH",
            "registration_number": "HRB 12345",
            "incorporation_country": "germany"
        }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);

    // Malformed id
    let req = test::TestRequest::get()
        .uri("/api/v1/documents/not-a-uuid")
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);

    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/corporate-structures/{}", Uuid::new_v4()))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_expired_document_cannot_be_verified() {
    let app = kyc_app!();

    let req = test::TestRequest::post()
        .uri("/api/v1/documents")
        .set_json(json!({
            "party_id": Uuid::new_v4(),
            "document_type": "PASSPORT",
            "file_name": "passport.pdf",
            "storage_uri": "s3://kyc/passport.pdf",
            "issued_on": "2012-03-01",
            "expires_on": "2022-03-01"
        }))
        .to_request();
    let doc: Value = test::call_and_read_body_json(&app, req).await;

    let req = test::TestRequest::post()
        .uri(&format!("/api/v1/documents/{}/verify", doc["id"].as_str().unwrap()))
        .set_json(json!({ "verified_by": "ops" }))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::UNPROCESSABLE_ENTITY
    );
}

#[actix_web::test]
async fn test_listing_is_paged() {
    let app = kyc_app!();
    let party = Uuid::new_v4();

    for level in ["LOW", "MEDIUM", "HIGH"] {
        let req = test::TestRequest::post()
            .uri("/api/v1/risk-assessments")
            .set_json(json!({
                "party_id": party,
                "risk_score": "42",
                "risk_level": level,
                "methodology": "internal-v2",
                "assessed_by": "risk-team"
            }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CREATED);
    }

    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/risk-assessments?owner_id={}&limit=2&offset=2", party))
        .to_request();
    let page: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(page["count"], 1);
    assert_eq!(page["limit"], 2);
    assert_eq!(page["offset"], 2);
}

#[actix_web::test]
async fn test_top_level_match_routes_follow_screening_rules() {
    let app = kyc_app!();
    let party = Uuid::new_v4();
    let hit = |screening_id: Value| {
        json!({
            "screening_id": screening_id,
            "matched_name": "Ivan Petrov",
            "list_name": "OFAC SDN",
            "list_type": "SANCTIONS",
            "match_score": "91"
        })
    };

    let req = test::TestRequest::post()
        .uri("/api/v1/aml-matches")
        .set_json(hit(json!(Uuid::new_v4())))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);

    let req = test::TestRequest::post()
        .uri("/api/v1/aml-screenings")
        .set_json(json!({
            "party_id": party,
            "screening_type": "PEP",
            "provider": "WorldCheck"
        }))
        .to_request();
    let screening: Value = test::call_and_read_body_json(&app, req).await;
    let screening_id = screening["id"].as_str().unwrap().to_string();

    let req = test::TestRequest::post()
        .uri("/api/v1/aml-matches")
        .set_json(hit(screening["id"].clone()))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let aml_match: Value = test::read_body_json(resp).await;
    let match_id = aml_match["id"].as_str().unwrap().to_string();

    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/aml-screenings/{}", screening_id))
        .to_request();
    let current: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(current["status"], "POTENTIAL_MATCH");

    let req = test::TestRequest::post()
        .uri(&format!("/api/v1/aml-matches/{}/resolve", match_id))
        .set_json(json!({ "disposition": "TRUE_POSITIVE", "reviewed_by": "mlro" }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

    // A notes-only edit keeps the derived status
    let req = test::TestRequest::put()
        .uri(&format!("/api/v1/aml-screenings/{}", screening_id))
        .set_json(json!({
            "party_id": party,
            "screening_type": "PEP",
            "provider": "WorldCheck",
            "notes": "typo fix"
        }))
        .to_request();
    let edited: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(edited["status"], "CONFIRMED_MATCH");
    assert_eq!(edited["notes"], "typo fix");

    // A match cannot be moved to another screening
    let req = test::TestRequest::put()
        .uri(&format!("/api/v1/aml-matches/{}", match_id))
        .set_json(hit(json!(Uuid::new_v4())))
        .to_request();
    let moved: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(moved["screening_id"], screening_id.as_str());
    assert_eq!(moved["disposition"], "TRUE_POSITIVE");

    let req = test::TestRequest::delete()
        .uri(&format!("/api/v1/aml-matches/{}", match_id))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NO_CONTENT);

    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/aml-screenings/{}", screening_id))
        .to_request();
    let current: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(current["status"], "CLEAR");
}

#[actix_web::test]
async fn test_top_level_actions_need_an_existing_case() {
    let app = kyc_app!();
    let action = |case_id: Value| {
        json!({
            "case_id": case_id,
            "action_type": "NOTE",
            "performed_by": "analyst-2"
        })
    };

    let req = test::TestRequest::post()
        .uri("/api/v1/compliance-actions")
        .set_json(action(json!(Uuid::new_v4())))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);

    let req = test::TestRequest::post()
        .uri("/api/v1/compliance-actions")
        .set_json(json!({ "action_type": "NOTE", "performed_by": "analyst-2" }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);

    let req = test::TestRequest::post()
        .uri("/api/v1/compliance-cases")
        .set_json(json!({
            "party_id": Uuid::new_v4(),
            "case_type": "AML_ALERT"
        }))
        .to_request();
    let case: Value = test::call_and_read_body_json(&app, req).await;

    let req = test::TestRequest::post()
        .uri("/api/v1/compliance-actions")
        .set_json(action(case["id"].clone()))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created: Value = test::read_body_json(resp).await;
    assert_eq!(created["case_id"], case["id"]);

    let req = test::TestRequest::put()
        .uri(&format!("/api/v1/compliance-actions/{}", created["id"].as_str().unwrap()))
        .set_json(action(json!(Uuid::new_v4())))
        .to_request();
    let updated: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(updated["case_id"], case["id"]);
}

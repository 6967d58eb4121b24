//! Handler tests for application intake and review.

use std::sync::Arc;

use actix_web::http::{StatusCode, header};
use actix_web::{test, web};
use chrono::Duration;
use mockall::predicate::always;
use rstest::{fixture, rstest};
use serde_json::{Value, json};

use super::*;
use crate::domain::ports::{MockApplicationCommand, MockApplicationQuery};
use crate::domain::{ApplicationStatus, TransitionPolicy};
use crate::inbound::http::test_utils::{admin_cookie, fixture_state, test_app};
use crate::test_support::fixture_time;

#[fixture]
fn jane() -> ApplicationRecord {
    let details = ApplicationSubmission {
        full_name: Some("Jane Doe".into()),
        email: Some("jane@example.com".into()),
        phone: Some("(512) 555-0100".into()),
        location: Some("Austin, TX".into()),
        ..ApplicationSubmission::default()
    }
    .validate()
    .expect("valid submission");
    ApplicationRecord::submit(ApplicationId::random(), details, fixture_time())
}

fn routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .service(submit_application)
            .service(list_applications)
            .service(export_applications)
            .service(get_application)
            .service(change_application_status),
    );
}

#[actix_web::test]
async fn valid_submission_is_acknowledged() {
    let app = test::init_service(test_app(fixture_state()).configure(routes)).await;
    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/applications")
            .set_json(json!({
                "fullName": "Jane Doe",
                "email": "jane@example.com",
                "phone": "(512) 555-0100",
                "location": "Austin, TX",
            }))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["status"], "new");
    assert_eq!(body["redirectTo"], "/apply/thank-you");
}

#[actix_web::test]
async fn invalid_email_reports_the_field_and_never_writes() {
    let mut command = MockApplicationCommand::new();
    command.expect_submit().returning(|submission| {
        submission.validate()?;
        panic!("invalid submission reached the store")
    });
    let state = HttpState {
        applications: Arc::new(command),
        ..fixture_state()
    };
    let app = test::init_service(test_app(state).configure(routes)).await;
    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/applications")
            .set_json(json!({
                "fullName": "Jane Doe",
                "email": "jane.example.com",
                "phone": "(512) 555-0100",
                "location": "Austin, TX",
            }))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["code"], "invalid_request");
    assert_eq!(body["details"]["fields"][0]["field"], "email");
    assert_eq!(body["details"]["fields"][0]["code"], "invalid_email");
}

#[actix_web::test]
async fn malformed_json_uses_the_field_error_shape() {
    let app = test::init_service(test_app(fixture_state()).configure(routes)).await;
    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/applications")
            .insert_header((header::CONTENT_TYPE, "application/json"))
            .set_payload("{\"fullName\": 42}")
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["details"]["fields"][0]["field"], "body");
}

#[actix_web::test]
async fn anonymous_list_is_redirected_to_login() {
    let app = test::init_service(test_app(fixture_state()).configure(routes)).await;
    let res = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/api/v1/admin/applications")
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(
        body["details"]["redirectTo"],
        "/login?returnTo=%2Fapi%2Fv1%2Fadmin%2Fapplications"
    );
}

#[rstest]
#[actix_web::test]
async fn list_passes_the_filter_and_flags_empty_results(jane: ApplicationRecord) {
    let mut query = MockApplicationQuery::new();
    query
        .expect_list()
        .withf(|filter| {
            filter.status == crate::domain::StatusFilter::Only(ApplicationStatus::New)
                && filter.search.as_str() == "jo"
        })
        .times(1)
        .return_once(move |_| Ok(Listing::from(vec![jane])));
    query
        .expect_list()
        .withf(|filter| filter.search.as_str() == "zzz")
        .times(1)
        .return_once(|_| Ok(Listing::from(Vec::new())));
    let state = HttpState {
        applications_query: Arc::new(query),
        ..fixture_state()
    };
    let app = test::init_service(test_app(state).configure(routes)).await;
    let cookie = admin_cookie(&app).await;

    let res = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/api/v1/admin/applications?status=new&search=JO")
            .cookie(cookie.clone())
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["total"], 1);
    assert_eq!(body["empty"], false);
    assert_eq!(body["items"][0]["fullName"], "Jane Doe");
    assert_eq!(body["items"][0]["publicStatus"], "new");

    let res = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/api/v1/admin/applications?search=zzz")
            .cookie(cookie)
            .to_request(),
    )
    .await;
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["total"], 0);
    assert_eq!(body["empty"], true);
}

#[actix_web::test]
async fn unknown_status_filter_is_rejected() {
    let app = test::init_service(test_app(fixture_state()).configure(routes)).await;
    let cookie = admin_cookie(&app).await;
    let res = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/api/v1/admin/applications?status=pending")
            .cookie(cookie)
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["details"]["fields"][0]["code"], "invalid_choice");
}

#[rstest]
#[actix_web::test]
async fn export_is_a_dated_csv_attachment(jane: ApplicationRecord) {
    let mut query = MockApplicationQuery::new();
    query
        .expect_list()
        .with(always())
        .return_once(move |_| Ok(Listing::from(vec![jane])));
    let state = HttpState {
        applications_query: Arc::new(query),
        ..fixture_state()
    };
    let app = test::init_service(test_app(state).configure(routes)).await;
    let cookie = admin_cookie(&app).await;
    let res = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/api/v1/admin/applications/export")
            .cookie(cookie)
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
    let disposition = res
        .headers()
        .get(header::CONTENT_DISPOSITION)
        .and_then(|value| value.to_str().ok())
        .expect("disposition")
        .to_owned();
    assert_eq!(
        disposition,
        "attachment; filename=\"applications-2025-03-01.csv\""
    );
    let body = test::read_body(res).await;
    let text = std::str::from_utf8(&body).expect("utf8");
    assert!(text.starts_with("id,"));
    assert!(text.contains("Jane Doe"));
}

#[rstest]
#[actix_web::test]
async fn detail_carries_contact_link_and_both_vocabularies(jane: ApplicationRecord) {
    let contacted = jane
        .transition(
            &StatusTransition::to(ApplicationStatus::Contacted),
            TransitionPolicy::Permissive,
            fixture_time() + Duration::minutes(5),
        )
        .expect("transition");
    let id = contacted.id();
    let mut query = MockApplicationQuery::new();
    query
        .expect_get()
        .withf(move |wanted| *wanted == id)
        .return_once(move |_| Ok(contacted));
    let state = HttpState {
        applications_query: Arc::new(query),
        ..fixture_state()
    };
    let app = test::init_service(test_app(state).configure(routes)).await;
    let cookie = admin_cookie(&app).await;
    let res = test::call_service(
        &app,
        test::TestRequest::get()
            .uri(&format!("/api/v1/admin/applications/{id}"))
            .cookie(cookie)
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["status"], "contacted");
    assert_eq!(body["publicStatus"], "contacted");
    assert_eq!(body["cmsStatus"], "reviewing");
    assert!(
        body["contactLink"]
            .as_str()
            .is_some_and(|link| link.starts_with("mailto:jane@example.com?subject="))
    );
}

#[actix_web::test]
async fn malformed_id_is_a_field_error() {
    let app = test::init_service(test_app(fixture_state()).configure(routes)).await;
    let cookie = admin_cookie(&app).await;
    let res = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/api/v1/admin/applications/not-a-uuid")
            .cookie(cookie)
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["details"]["fields"][0]["field"], "id");
}

#[rstest]
#[actix_web::test]
async fn status_change_forwards_notes_and_expected_timestamp(jane: ApplicationRecord) {
    let expected_at = jane.updated_at();
    let id = jane.id();
    let mut command = MockApplicationCommand::new();
    command
        .expect_transition()
        .withf(move |wanted, transition| {
            *wanted == id
                && transition.to == ApplicationStatus::Reviewing
                && transition.notes.as_deref() == Some("called back")
                && transition.expected_updated_at == Some(expected_at)
        })
        .return_once(move |_, transition| {
            jane.transition(
                &transition,
                TransitionPolicy::Permissive,
                fixture_time() + Duration::minutes(1),
            )
            .map_err(Error::from)
        });
    let state = HttpState {
        applications: Arc::new(command),
        ..fixture_state()
    };
    let app = test::init_service(test_app(state).configure(routes)).await;
    let cookie = admin_cookie(&app).await;
    let res = test::call_service(
        &app,
        test::TestRequest::patch()
            .uri(&format!("/api/v1/admin/applications/{id}/status"))
            .cookie(cookie)
            .set_json(json!({
                "status": "review",
                "notes": "called back",
                "expectedUpdatedAt": expected_at,
            }))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["status"], "reviewing");
    assert_eq!(body["internalNotes"], "called back");
}

#[rstest]
#[case("pending", StatusCode::BAD_REQUEST)]
#[case("contacted", StatusCode::CONFLICT)]
#[actix_web::test]
async fn status_change_failures_map_to_status_codes(
    #[case] status: &str,
    #[case] expected: StatusCode,
) {
    let mut command = MockApplicationCommand::new();
    command
        .expect_transition()
        .returning(|id, _| Err(Error::conflict(format!("application {id} changed"))));
    let state = HttpState {
        applications: Arc::new(command),
        ..fixture_state()
    };
    let app = test::init_service(test_app(state).configure(routes)).await;
    let cookie = admin_cookie(&app).await;
    let res = test::call_service(
        &app,
        test::TestRequest::patch()
            .uri(&format!(
                "/api/v1/admin/applications/{}/status",
                ApplicationId::random()
            ))
            .cookie(cookie)
            .set_json(json!({ "status": status }))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), expected);
}

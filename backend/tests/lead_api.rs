//! Lead lifecycle, scoping, dashboards, and tabular transfer over HTTP.

mod support;

use actix_web::http::{Method, StatusCode, header};
use actix_web::test;
use serde_json::{Value, json};

use support::{error_code, login, request, spawn};

fn lead_body(name: &str, email: &str, phone: &str, assigned_to: Option<&str>) -> Value {
    let mut body = json!({ "name": name, "email": email, "phone": phone });
    if let Some(assigned_to) = assigned_to {
        body["assignedTo"] = json!(assigned_to);
    }
    body
}

#[actix_web::test]
async fn a_new_lead_drives_the_assigned_agents_dashboard_through_won() {
    let (app, seeded) = spawn().await;
    let sub_token = login(&app, "sub@crm.example").await;
    let agent1_token = login(&app, "agent1@crm.example").await;
    let agent1_id = seeded.agent1.id().to_string();

    let (status, created) = request(
        &app,
        Method::POST,
        "/api/leads",
        Some(&sub_token),
        Some(lead_body(
            "Lead A",
            "lead.a@crm.example",
            "555 0100",
            Some(&agent1_id),
        )),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "create failed: {created}");
    assert_eq!(created.get("status").and_then(Value::as_str), Some("new"));
    assert_eq!(
        created.get("assignedTo").and_then(Value::as_str),
        Some(agent1_id.as_str())
    );
    let lead_id = created
        .get("id")
        .and_then(Value::as_str)
        .expect("lead id")
        .to_owned();

    let (status, dashboard) = request(
        &app,
        Method::GET,
        "/api/leads/dashboard",
        Some(&agent1_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(dashboard.get("totalLeads").and_then(Value::as_u64), Some(1));
    assert_eq!(dashboard.get("conversionRate").and_then(Value::as_f64), Some(0.0));
    let counts = dashboard.get("statusCounts").expect("status counts");
    assert_eq!(counts.get("new").and_then(Value::as_u64), Some(1));
    for bucket in ["contacted", "qualified", "lost", "won"] {
        assert_eq!(counts.get(bucket).and_then(Value::as_u64), Some(0));
    }
    let recent = dashboard
        .get("recentLeads")
        .and_then(Value::as_array)
        .expect("recent leads");
    assert_eq!(recent.len(), 1);

    let (status, _) = request(
        &app,
        Method::PUT,
        &format!("/api/leads/{lead_id}"),
        Some(&sub_token),
        Some(json!({ "status": "won" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, dashboard) = request(
        &app,
        Method::GET,
        "/api/leads/dashboard",
        Some(&agent1_token),
        None,
    )
    .await;
    assert_eq!(
        dashboard.get("conversionRate").and_then(Value::as_f64),
        Some(100.0)
    );
    let performance = dashboard
        .get("agentPerformance")
        .and_then(Value::as_array)
        .expect("agent performance");
    assert_eq!(performance.len(), 1);
    assert_eq!(
        performance[0].get("name").and_then(Value::as_str),
        Some("Agent One")
    );
    assert_eq!(performance[0].get("won").and_then(Value::as_u64), Some(1));
}

#[actix_web::test]
async fn agents_only_see_their_own_assignments() {
    let (app, seeded) = spawn().await;
    let sub_token = login(&app, "sub@crm.example").await;
    let agent1_id = seeded.agent1.id().to_string();

    request(
        &app,
        Method::POST,
        "/api/leads",
        Some(&sub_token),
        Some(lead_body(
            "Lead A",
            "lead.a@crm.example",
            "555 0100",
            Some(&agent1_id),
        )),
    )
    .await;

    let agent1_token = login(&app, "agent1@crm.example").await;
    let (_, mine) = request(&app, Method::GET, "/api/leads/mine", Some(&agent1_token), None).await;
    assert_eq!(mine.as_array().map(Vec::len), Some(1));

    let agent2_token = login(&app, "agent2@crm.example").await;
    let (_, not_mine) =
        request(&app, Method::GET, "/api/leads/mine", Some(&agent2_token), None).await;
    assert_eq!(not_mine.as_array().map(Vec::len), Some(0));

    let (_, agent2_dashboard) = request(
        &app,
        Method::GET,
        "/api/leads/dashboard",
        Some(&agent2_token),
        None,
    )
    .await;
    assert_eq!(
        agent2_dashboard.get("totalLeads").and_then(Value::as_u64),
        Some(0)
    );
}

#[actix_web::test]
async fn agents_are_denied_every_mutating_and_unscoped_operation() {
    let (app, _) = spawn().await;
    let token = login(&app, "agent1@crm.example").await;

    let attempts = [
        (
            Method::POST,
            "/api/leads".to_owned(),
            Some(lead_body("X", "x@crm.example", "555 0199", None)),
        ),
        (Method::GET, "/api/leads".to_owned(), None),
        (Method::GET, "/api/leads/export".to_owned(), None),
        (
            Method::PUT,
            format!("/api/leads/{}", uuid::Uuid::new_v4()),
            Some(json!({ "status": "won" })),
        ),
        (
            Method::DELETE,
            format!("/api/leads/{}", uuid::Uuid::new_v4()),
            None,
        ),
    ];
    for (method, path, body) in attempts {
        let (status, payload) = request(&app, method.clone(), &path, Some(&token), body).await;
        assert_eq!(status, StatusCode::FORBIDDEN, "{method} {path}");
        assert_eq!(error_code(&payload), "forbidden");
    }
}

#[actix_web::test]
async fn duplicate_email_or_phone_is_a_conflict() {
    let (app, _) = spawn().await;
    let token = login(&app, "sub@crm.example").await;

    let (status, _) = request(
        &app,
        Method::POST,
        "/api/leads",
        Some(&token),
        Some(lead_body("First", "dup@crm.example", "555 0100", None)),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (email_status, body) = request(
        &app,
        Method::POST,
        "/api/leads",
        Some(&token),
        Some(lead_body("Second", "dup@crm.example", "555 0101", None)),
    )
    .await;
    assert_eq!(email_status, StatusCode::CONFLICT);
    assert_eq!(error_code(&body), "conflict");

    let (phone_status, _) = request(
        &app,
        Method::POST,
        "/api/leads",
        Some(&token),
        Some(lead_body("Third", "third@crm.example", "555 0100", None)),
    )
    .await;
    assert_eq!(phone_status, StatusCode::CONFLICT);
}

#[actix_web::test]
async fn deleting_a_missing_lead_is_not_found_repeatably() {
    let (app, _) = spawn().await;
    let token = login(&app, "root@crm.example").await;
    let path = format!("/api/leads/{}", uuid::Uuid::new_v4());
    for _ in 0..2 {
        let (status, body) = request(&app, Method::DELETE, &path, Some(&token), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(error_code(&body), "not_found");
    }
}

#[actix_web::test]
async fn listing_filters_by_status_and_rejects_unknown_statuses() {
    let (app, _) = spawn().await;
    let token = login(&app, "sub@crm.example").await;
    request(
        &app,
        Method::POST,
        "/api/leads",
        Some(&token),
        Some(lead_body("One", "one@crm.example", "555 0101", None)),
    )
    .await;
    let (_, created) = request(
        &app,
        Method::POST,
        "/api/leads",
        Some(&token),
        Some(lead_body("Two", "two@crm.example", "555 0102", None)),
    )
    .await;
    let id = created.get("id").and_then(Value::as_str).expect("id");
    request(
        &app,
        Method::PUT,
        &format!("/api/leads/{id}"),
        Some(&token),
        Some(json!({ "status": "contacted" })),
    )
    .await;

    let (status, listed) = request(
        &app,
        Method::GET,
        "/api/leads?status=contacted",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed.as_array().map(Vec::len), Some(1));

    let (bad_status, body) = request(
        &app,
        Method::GET,
        "/api/leads?status=sideways",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(bad_status, StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&body), "invalid_request");
}

#[actix_web::test]
async fn unassigning_via_explicit_null_clears_the_assignee() {
    let (app, seeded) = spawn().await;
    let token = login(&app, "sub@crm.example").await;
    let agent1_id = seeded.agent1.id().to_string();
    let (_, created) = request(
        &app,
        Method::POST,
        "/api/leads",
        Some(&token),
        Some(lead_body(
            "Lead",
            "lead@crm.example",
            "555 0100",
            Some(&agent1_id),
        )),
    )
    .await;
    let id = created.get("id").and_then(Value::as_str).expect("id");

    let (status, updated) = request(
        &app,
        Method::PUT,
        &format!("/api/leads/{id}"),
        Some(&token),
        Some(json!({ "assignedTo": null })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated.get("assignedTo"), Some(&Value::Null));
}

#[actix_web::test]
async fn export_produces_csv_and_import_reads_it_back() {
    let (app, _) = spawn().await;
    let token = login(&app, "sub@crm.example").await;
    request(
        &app,
        Method::POST,
        "/api/leads",
        Some(&token),
        Some(lead_body("Export Me", "export@crm.example", "555 0100", None)),
    )
    .await;

    let export_request = test::TestRequest::get()
        .uri("/api/leads/export")
        .insert_header((header::AUTHORIZATION, format!("Bearer {token}")))
        .to_request();
    let response = test::call_service(&app, export_request).await;
    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_owned();
    assert!(content_type.starts_with("text/csv"), "{content_type}");
    let body = test::read_body(response).await;
    let document = String::from_utf8(body.to_vec()).expect("CSV is UTF-8");
    assert!(document.starts_with("name,email,phone"));
    assert!(document.contains("export@crm.example"));
}

#[actix_web::test]
async fn import_reports_imported_rows_and_line_tagged_failures() {
    let (app, _) = spawn().await;
    let token = login(&app, "sub@crm.example").await;

    let csv = "name,email,phone,status\n\
               Alpha,alpha@crm.example,555 0101,new\n\
               Beta,beta@crm.example,555 0102,contacted\n\
               Broken,broken@crm.example,555 0103,sideways\n";
    let import_request = test::TestRequest::post()
        .uri("/api/leads/import")
        .insert_header((header::AUTHORIZATION, format!("Bearer {token}")))
        .insert_header((header::CONTENT_TYPE, "text/csv"))
        .set_payload(csv)
        .to_request();
    let response = test::call_service(&app, import_request).await;
    assert_eq!(response.status(), StatusCode::OK);
    let report: Value =
        serde_json::from_slice(&test::read_body(response).await).expect("import report");
    assert_eq!(report.get("imported").and_then(Value::as_u64), Some(2));
    let failures = report
        .get("failures")
        .and_then(Value::as_array)
        .expect("failures");
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].get("line").and_then(Value::as_u64), Some(4));

    // Re-importing the same file only yields duplicate conflicts.
    let retry = test::TestRequest::post()
        .uri("/api/leads/import")
        .insert_header((header::AUTHORIZATION, format!("Bearer {token}")))
        .insert_header((header::CONTENT_TYPE, "text/csv"))
        .set_payload(csv)
        .to_request();
    let response = test::call_service(&app, retry).await;
    let report: Value =
        serde_json::from_slice(&test::read_body(response).await).expect("import report");
    assert_eq!(report.get("imported").and_then(Value::as_u64), Some(0));
    assert_eq!(
        report
            .get("failures")
            .and_then(Value::as_array)
            .map(Vec::len),
        Some(3)
    );
}

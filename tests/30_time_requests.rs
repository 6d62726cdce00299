mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};

use common::{admin_token, ensure_server, register, sign_in};

fn request_body() -> Value {
    json!({
        "date": "2025-03-14",
        "h1": 8, "m1": 30, "h2": 17, "m2": 0,
        "wrkType": "Office",
        "reason": "Doctor appointment",
        "evidence": "https://cdn.example.com/evidence.png"
    })
}

#[tokio::test]
async fn staff_file_and_list_their_own_requests() -> Result<()> {
    let server = ensure_server().await?;
    let client = reqwest::Client::new();

    let staff_id = register(&client, server, None, "Katherine Johnson", "Staff").await?;
    let token = sign_in(&client, server, &staff_id).await?;

    let resp = client
        .post(server.url("/api/requests/time-change"))
        .bearer_auth(&token)
        .json(&request_body())
        .send()
        .await?;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = resp.json().await?;
    assert_eq!(body["data"]["staffID"], staff_id.as_str());
    assert_eq!(body["data"]["status"], "Pending");
    assert_eq!(body["data"]["evidenceURL"], "https://cdn.example.com/evidence.png");

    let body: Value = client
        .get(server.url("/api/requests/time-change"))
        .bearer_auth(&token)
        .send()
        .await?
        .json()
        .await?;
    let listed = body["data"].as_array().cloned().unwrap_or_default();
    assert_eq!(listed.len(), 1);
    Ok(())
}

#[tokio::test]
async fn invalid_windows_are_rejected() -> Result<()> {
    let server = ensure_server().await?;
    let client = reqwest::Client::new();

    let staff_id = register(&client, server, None, "Dorothy Vaughan", "Staff").await?;
    let token = sign_in(&client, server, &staff_id).await?;

    let mut body = request_body();
    body["h1"] = json!(18);
    let resp = client
        .post(server.url("/api/requests/time-change"))
        .bearer_auth(&token)
        .json(&body)
        .send()
        .await?;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await?;
    assert_eq!(body["code"], "VALIDATION_ERROR");
    Ok(())
}

#[tokio::test]
async fn only_personnel_act_for_others() -> Result<()> {
    let server = ensure_server().await?;
    let client = reqwest::Client::new();

    let admin = admin_token(&client, server).await?;
    let staff_id = register(&client, server, None, "Mary Jackson", "Staff").await?;
    let hr_id = register(&client, server, Some(&admin), "Hedy Lamarr", "Staff_HRManager").await?;
    let staff_token = sign_in(&client, server, &staff_id).await?;
    let hr_token = sign_in(&client, server, &hr_id).await?;

    let mut for_hr = request_body();
    for_hr["staffID"] = json!(hr_id);
    let resp = client
        .post(server.url("/api/requests/time-change"))
        .bearer_auth(&staff_token)
        .json(&for_hr)
        .send()
        .await?;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let mut for_staff = request_body();
    for_staff["staffID"] = json!(staff_id);
    let resp = client
        .post(server.url("/api/requests/time-change"))
        .bearer_auth(&hr_token)
        .json(&for_staff)
        .send()
        .await?;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let body: Value = client
        .get(server.url(&format!("/api/requests/time-change?staffID={}", staff_id)))
        .bearer_auth(&hr_token)
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(body["data"].as_array().map(Vec::len), Some(1));
    Ok(())
}

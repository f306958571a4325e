//! End-to-end task flow over HTTP against the in-memory store.

mod common;

use axum::http::StatusCode;
use common::{
    body_json, breakdown_json, get_auth, post_auth, post_json_auth, put_json_auth, token_for,
    ScriptedLlm,
};
use serde_json::json;

// ---------------------------------------------------------------------------
// Test: create, step through and complete a task
// ---------------------------------------------------------------------------

#[tokio::test]
async fn full_task_lifecycle() {
    let app = common::build_test_app(ScriptedLlm::answering([breakdown_json(6, 3)]));
    let token = token_for("user-1");

    let response = post_json_auth(
        app.clone(),
        "/api/v1/tasks",
        json!({"task_description": "tidy the desk"}),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = body_json(response).await;
    assert_eq!(created["data"]["task"]["status"], "active");
    assert_eq!(created["data"]["task"]["current_step_index"], 0);
    assert_eq!(created["data"]["steps"].as_array().unwrap().len(), 6);
    assert_eq!(created["data"]["total_minutes"], 12);
    let task_id = created["data"]["task"]["id"].as_i64().unwrap();

    let current = body_json(
        get_auth(app.clone(), &format!("/api/v1/tasks/{task_id}/current-step"), &token).await,
    )
    .await;
    assert_eq!(current["data"]["status"], "active");
    assert_eq!(current["data"]["step"]["step_number"], 1);
    assert_eq!(current["data"]["progress"]["completed_steps"], 0);
    assert_eq!(current["data"]["progress"]["total_steps"], 6);

    let mark_done = format!("/api/v1/tasks/{task_id}/mark-done");
    for completed in 1..=5 {
        let response = post_auth(app.clone(), &mark_done, &token).await;
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["data"]["status"], "advanced");
        assert_eq!(json["data"]["completed_step"], completed);
        assert_eq!(json["data"]["next_step"]["step_number"], completed + 1);
    }

    let current = body_json(
        get_auth(app.clone(), &format!("/api/v1/tasks/{task_id}/current-step"), &token).await,
    )
    .await;
    assert_eq!(current["data"]["progress"]["completed_steps"], 5);
    assert_eq!(current["data"]["progress"]["percentage"], 83.33);

    let finished = body_json(post_auth(app.clone(), &mark_done, &token).await).await;
    assert_eq!(finished["data"]["status"], "completed");
    assert_eq!(finished["data"]["completed_step"], 6);
    assert_eq!(finished["data"]["rewards"]["points_awarded"], 10);
    assert_eq!(finished["data"]["rewards"]["stats"]["streak"], 1);
    let codes: Vec<&str> = finished["data"]["rewards"]["new_badges"]
        .as_array()
        .unwrap()
        .iter()
        .map(|b| b["code"].as_str().unwrap())
        .collect();
    assert_eq!(codes, ["first_task", "hard_worker"]);

    // Repeating mark-done on a completed task is not an error.
    let again = post_auth(app.clone(), &mark_done, &token).await;
    assert_eq!(again.status(), StatusCode::OK);
    assert_eq!(body_json(again).await["data"]["status"], "already_completed");

    let current = body_json(
        get_auth(app.clone(), &format!("/api/v1/tasks/{task_id}/current-step"), &token).await,
    )
    .await;
    assert_eq!(current["data"]["status"], "completed");

    let stats = body_json(get_auth(app, "/api/v1/user/stats", &token).await).await;
    assert_eq!(stats["data"]["total_tasks_completed"], 1);
    assert_eq!(stats["data"]["total_steps_completed"], 6);
    assert_eq!(stats["data"]["reward_points"], 10);
    assert_eq!(stats["data"]["recent_tasks"][0]["task_name"], "Tidy the desk");
}

// ---------------------------------------------------------------------------
// Test: breakdown preview does not persist anything
// ---------------------------------------------------------------------------

#[tokio::test]
async fn preview_returns_breakdown_without_persisting() {
    let app = common::build_test_app(ScriptedLlm::answering([breakdown_json(4, 2)]));
    let token = token_for("user-1");

    let response = post_json_auth(
        app.clone(),
        "/api/v1/tasks/breakdown",
        json!({"task_description": "water the plants", "step_granularity": "macro"}),
        &token,
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["task_name"], "Tidy the desk");
    assert_eq!(json["data"]["steps"].as_array().unwrap().len(), 4);

    let stats = body_json(get_auth(app, "/api/v1/user/stats", &token).await).await;
    assert_eq!(stats["data"]["total_tasks_active"], 0);
}

// ---------------------------------------------------------------------------
// Test: mode selection reaches the prompt
// ---------------------------------------------------------------------------

#[tokio::test]
async fn inline_profile_selects_profile_prompt_and_redacts() {
    let llm = ScriptedLlm::answering([breakdown_json(8, 2)]);
    let app = common::build_test_app(llm.clone());

    let response = post_json_auth(
        app,
        "/api/v1/tasks/breakdown",
        json!({
            "task_description": "email bob@example.com about invoice 12345678",
            "profile": {
                "neurodivergence": "adhd",
                "break_interval_minutes": 25,
                "tones": ["gentle"],
                "verbosity": 2,
                "step_granularity": "micro"
            }
        }),
        &token_for("user-1"),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let prompts = llm.prompts();
    assert_eq!(prompts.len(), 1);
    assert!(prompts[0].contains("USER PROFILE:"));
    assert!(!prompts[0].contains("bob@example.com"));
    assert!(!prompts[0].contains("12345678"));
}

#[tokio::test]
async fn stored_profile_is_used_when_request_has_none() {
    let llm = ScriptedLlm::answering([breakdown_json(5, 2)]);
    let app = common::build_test_app(llm.clone());
    let token = token_for("user-1");

    let saved = put_json_auth(
        app.clone(),
        "/api/v1/user/profile",
        json!({
            "neurodivergence": "autism",
            "break_interval_minutes": 30,
            "tones": ["direct"],
            "verbosity": 4,
            "step_granularity": "macro"
        }),
        &token,
    )
    .await;
    assert_eq!(saved.status(), StatusCode::OK);

    let response = post_json_auth(
        app,
        "/api/v1/tasks/breakdown",
        json!({"task_description": "plan the week"}),
        &token,
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(llm.prompts()[0].contains("USER PROFILE:"));
}

#[tokio::test]
async fn no_profile_uses_minimal_prompt() {
    let llm = ScriptedLlm::answering([breakdown_json(6, 2)]);
    let app = common::build_test_app(llm.clone());

    let response = post_json_auth(
        app,
        "/api/v1/tasks/breakdown",
        json!({"task_description": "plan the week"}),
        &token_for("user-1"),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(!llm.prompts()[0].contains("USER PROFILE:"));
}

// ---------------------------------------------------------------------------
// Test: error paths
// ---------------------------------------------------------------------------

#[tokio::test]
async fn empty_description_is_400_and_skips_provider() {
    let llm = ScriptedLlm::answering([breakdown_json(6, 2)]);
    let app = common::build_test_app(llm.clone());

    let response = post_json_auth(
        app,
        "/api/v1/tasks",
        json!({"task_description": "   "}),
        &token_for("user-1"),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "INVALID_INPUT");
    assert!(llm.prompts().is_empty());
}

#[tokio::test]
async fn unknown_granularity_is_400() {
    let app = common::build_test_app(ScriptedLlm::answering([breakdown_json(6, 2)]));

    let response = post_json_auth(
        app,
        "/api/v1/tasks/breakdown",
        json!({"task_description": "plan the week", "step_granularity": "tiny"}),
        &token_for("user-1"),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn malformed_body_is_400_envelope() {
    let app = common::build_test_app(ScriptedLlm::answering(Vec::<String>::new()));

    let response = post_json_auth(
        app,
        "/api/v1/tasks",
        json!({"description": "wrong field name"}),
        &token_for("user-1"),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn unparsable_model_answer_is_502_and_nothing_is_stored() {
    let app = common::build_test_app(ScriptedLlm::answering(["Sure! Step one: relax."]));
    let token = token_for("user-1");

    let response = post_json_auth(
        app.clone(),
        "/api/v1/tasks",
        json!({"task_description": "tidy the desk"}),
        &token,
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let json = body_json(response).await;
    assert_eq!(json["code"], "SCHEMA_VALIDATION_ERROR");
    assert_eq!(json["raw_output"], "Sure! Step one: relax.");

    let stats = body_json(get_auth(app, "/api/v1/user/stats", &token).await).await;
    assert_eq!(stats["data"]["total_tasks_active"], 0);
}

#[tokio::test]
async fn provider_failure_is_502() {
    let app = common::build_test_app(ScriptedLlm::failing("upstream 503"));

    let response = post_json_auth(
        app,
        "/api/v1/tasks/breakdown",
        json!({"task_description": "tidy the desk"}),
        &token_for("user-1"),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    assert_eq!(body_json(response).await["code"], "GENERATION_ERROR");
}

#[tokio::test]
async fn other_users_task_is_404() {
    let app = common::build_test_app(ScriptedLlm::answering([breakdown_json(6, 2)]));

    let created = body_json(
        post_json_auth(
            app.clone(),
            "/api/v1/tasks",
            json!({"task_description": "tidy the desk"}),
            &token_for("owner"),
        )
        .await,
    )
    .await;
    let task_id = created["data"]["task"]["id"].as_i64().unwrap();

    let intruder = token_for("someone-else");
    let current = get_auth(
        app.clone(),
        &format!("/api/v1/tasks/{task_id}/current-step"),
        &intruder,
    )
    .await;
    assert_eq!(current.status(), StatusCode::NOT_FOUND);

    let advance = post_auth(app, &format!("/api/v1/tasks/{task_id}/mark-done"), &intruder).await;
    assert_eq!(advance.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn non_numeric_task_id_is_400() {
    let app = common::build_test_app(ScriptedLlm::answering(Vec::<String>::new()));

    let response = get_auth(app, "/api/v1/tasks/abc/current-step", &token_for("user-1")).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "BAD_REQUEST");
}
